//! Stripe Event Bridge - Verified Stripe webhooks onto the internal event bus
//!
//! This crate authenticates Stripe webhook deliveries, normalizes the
//! business events they carry and republishes them for downstream consumers.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
