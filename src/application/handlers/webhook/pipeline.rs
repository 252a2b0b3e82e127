//! WebhookPipeline - Orchestrates one webhook invocation end to end.
//!
//! verify → parse → normalize → dispatch, tracked through `PipelineState`.
//! Every invocation ends in a `WebhookOutcome`; errors never escape.

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;

use super::dispatcher::{DispatchError, DispatchReceipt, EventDispatcher};
use crate::config::AppConfig;
use crate::domain::foundation::StateMachine;
use crate::domain::webhook::{
    ErrorCategory, EventNormalizer, EventParser, NormalizeError, PipelineState,
    RawWebhookRequest, SignatureVerifier, VerificationError, VerifiedPayload, WebhookError,
    DEFAULT_TOLERANCE,
};
use crate::ports::{SecretError, SecretProvider};

impl From<SecretError> for WebhookError {
    fn from(err: SecretError) -> Self {
        WebhookError::SecretUnavailable(err.to_string())
    }
}

impl From<DispatchError> for WebhookError {
    fn from(err: DispatchError) -> Self {
        WebhookError::DispatchFailed(err.to_string())
    }
}

/// Settings for one pipeline instance.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub secret_name: String,
    pub secret_version: String,
    /// Header carrying the vendor signature.
    pub signature_header: String,
    pub tolerance: Duration,
    /// Budget for a whole invocation.
    pub timeout: Duration,
    pub event_bus_name: String,
    pub source: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            secret_name: "dev/StripeApp/stripe/secret".to_string(),
            secret_version: "AWSCURRENT".to_string(),
            signature_header: "Stripe-Signature".to_string(),
            tolerance: DEFAULT_TOLERANCE,
            timeout: Duration::from_secs(8),
            event_bus_name: "stripeAppEventBus".to_string(),
            source: "stripeWebHookHandler.lambda".to_string(),
        }
    }
}

impl PipelineConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            secret_name: config.secrets.name.clone(),
            secret_version: config.secrets.version.clone(),
            signature_header: config.webhook.signature_header.clone(),
            tolerance: config.webhook.tolerance(),
            timeout: config.webhook.invocation_timeout(),
            event_bus_name: config.bus.event_bus_name.clone(),
            source: config.bus.source.clone(),
        }
    }
}

/// Result of one invocation, ready to become an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookOutcome {
    pub status: StatusCode,
    /// Stable machine-readable code.
    pub code: &'static str,
    /// Short message safe to return to the caller.
    pub message: &'static str,
    /// Terminal state the invocation ended in.
    pub state: PipelineState,
    /// Present only when an envelope was published.
    pub receipt: Option<DispatchReceipt>,
}

impl WebhookOutcome {
    fn accepted(receipt: DispatchReceipt) -> Self {
        Self {
            status: StatusCode::OK,
            code: "ACCEPTED",
            message: "Event accepted",
            state: PipelineState::Responded,
            receipt: Some(receipt),
        }
    }

    fn from_error(err: &WebhookError, state: PipelineState) -> Self {
        Self {
            status: err.status_code(),
            code: err.code(),
            message: err.public_message(),
            state,
            receipt: None,
        }
    }

    /// True when the caller should not redeliver.
    pub fn is_acknowledged(&self) -> bool {
        self.status.is_success()
    }

    pub fn was_dispatched(&self) -> bool {
        self.receipt.is_some()
    }
}

/// The webhook verification and dispatch pipeline.
///
/// Stateless between invocations; share it behind an `Arc`.
pub struct WebhookPipeline {
    secrets: Arc<dyn SecretProvider>,
    verifier: SignatureVerifier,
    parser: EventParser,
    normalizer: EventNormalizer,
    dispatcher: EventDispatcher,
    config: PipelineConfig,
}

impl WebhookPipeline {
    pub fn new(
        secrets: Arc<dyn SecretProvider>,
        dispatcher: EventDispatcher,
        config: PipelineConfig,
    ) -> Self {
        Self {
            secrets,
            verifier: SignatureVerifier::new(config.tolerance),
            parser: EventParser::new(),
            normalizer: EventNormalizer::new(&config.event_bus_name, &config.source),
            dispatcher,
            config,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs one invocation.
    pub async fn process(&self, request: RawWebhookRequest) -> WebhookOutcome {
        let mut state = PipelineState::Received;

        let result = match tokio::time::timeout(self.config.timeout, self.run(&request, &mut state))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(WebhookError::Timeout(self.config.timeout)),
        };

        match result {
            Ok(receipt) => {
                advance(&mut state, PipelineState::Responded);
                WebhookOutcome::accepted(receipt)
            }
            Err(err) => {
                let terminal = if err.category() == ErrorCategory::UnsupportedEvent {
                    PipelineState::Responded
                } else {
                    PipelineState::Rejected
                };
                advance(&mut state, terminal);
                log_failure(&err, state);
                WebhookOutcome::from_error(&err, state)
            }
        }
    }

    async fn run(
        &self,
        request: &RawWebhookRequest,
        state: &mut PipelineState,
    ) -> Result<DispatchReceipt, WebhookError> {
        let signature = self.signature_header(request)?;
        let verified = self.verify(request, signature).await?;
        advance(state, PipelineState::Verified);

        let event = self.parser.parse_verified(&verified)?;
        advance(state, PipelineState::Parsed);
        tracing::debug!(
            event_id = event.id.as_deref().unwrap_or("-"),
            event_type = %event.event_type,
            "Webhook payload parsed"
        );

        let envelope = match self.normalizer.normalize(&event, request.received_at()) {
            Ok(envelope) => envelope,
            Err(NormalizeError::UnsupportedEvent(event_type)) => {
                tracing::info!(event_type = %event_type, "Ignoring unmapped webhook event");
                return Err(NormalizeError::UnsupportedEvent(event_type).into());
            }
            Err(e) => return Err(e.into()),
        };
        advance(state, PipelineState::Normalized);

        let receipt = self.dispatcher.dispatch(envelope).await?;
        advance(state, PipelineState::Dispatched);

        Ok(receipt)
    }

    /// Reads the signature header, rejecting absent or non-ASCII values.
    fn signature_header<'r>(
        &self,
        request: &'r RawWebhookRequest,
    ) -> Result<&'r str, VerificationError> {
        let value = request
            .header(&self.config.signature_header)
            .ok_or(VerificationError::SignatureMissing)?;
        let value = value.to_str().map_err(|_| {
            VerificationError::SignatureMalformed("header is not visible ASCII".to_string())
        })?;
        if value.trim().is_empty() {
            return Err(VerificationError::SignatureMissing);
        }
        Ok(value)
    }

    /// Verifies against the current key, retrying once with a refetched
    /// key on mismatch in case the secret was rotated.
    async fn verify<'r>(
        &self,
        request: &'r RawWebhookRequest,
        signature: &str,
    ) -> Result<VerifiedPayload<'r>, WebhookError> {
        let name = &self.config.secret_name;
        let version = &self.config.secret_version;

        let key = self.secrets.get_secret(name, version).await?;
        let first = self.verifier.verify(
            request.body(),
            Some(signature),
            key.expose_bytes(),
            request.received_at(),
        );

        match first {
            Err(VerificationError::SignatureMismatch) => {
                tracing::debug!(
                    secret_name = %name,
                    "Signature mismatch, retrying with refreshed secret"
                );
                self.secrets.invalidate(name, version).await;
                let fresh = self.secrets.get_secret(name, version).await?;
                Ok(self.verifier.verify(
                    request.body(),
                    Some(signature),
                    fresh.expose_bytes(),
                    request.received_at(),
                )?)
            }
            other => Ok(other?),
        }
    }
}

impl std::fmt::Debug for WebhookPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookPipeline")
            .field("secrets", &self.secrets.provider_type())
            .field("dispatcher", &self.dispatcher)
            .field("config", &self.config)
            .finish()
    }
}

fn advance(state: &mut PipelineState, next: PipelineState) {
    match state.transition_to(next) {
        Ok(next) => {
            tracing::debug!(from = state.as_str(), to = next.as_str(), "Pipeline transition");
            *state = next;
        }
        Err(e) => tracing::error!(error = %e, "Invalid pipeline transition"),
    }
}

fn log_failure(err: &WebhookError, state: PipelineState) {
    match err.category() {
        ErrorCategory::AuthenticationFailure | ErrorCategory::ValidationFailure => {
            tracing::warn!(code = err.code(), state = state.as_str(), error = %err, "Webhook rejected");
        }
        ErrorCategory::UnsupportedEvent => {}
        ErrorCategory::DependencyFailure => {
            tracing::error!(code = err.code(), state = state.as_str(), error = %err, "Webhook processing failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::events::InMemoryEventBus;
    use crate::adapters::secrets::{CachedSecretProvider, InMemorySecretProvider};
    use crate::domain::foundation::Timestamp;
    use crate::domain::webhook::signature_header_value;
    use crate::ports::BusError;
    use http::{HeaderMap, HeaderValue};

    const SECRET: &str = "whsec_test_secret";
    const BODY: &str = r#"{"id":"evt_1","type":"customer.subscription.created","data":{"object":{"id":"cus_123"}}}"#;

    struct Harness {
        secrets: Arc<InMemorySecretProvider>,
        bus: Arc<InMemoryEventBus>,
        pipeline: WebhookPipeline,
    }

    fn harness() -> Harness {
        let config = PipelineConfig::default();
        let secrets = Arc::new(InMemorySecretProvider::with_secret(
            &config.secret_name,
            &config.secret_version,
            SECRET,
        ));
        let bus = Arc::new(InMemoryEventBus::new());
        let pipeline =
            WebhookPipeline::new(secrets.clone(), EventDispatcher::new(bus.clone()), config);
        Harness {
            secrets,
            bus,
            pipeline,
        }
    }

    fn signed_request(secret: &str, body: &str) -> RawWebhookRequest {
        let now = Timestamp::now();
        let header = signature_header_value(secret.as_bytes(), now.as_unix_secs(), body.as_bytes());
        let mut headers = HeaderMap::new();
        headers.insert("stripe-signature", HeaderValue::from_str(&header).unwrap());
        RawWebhookRequest::new(body, headers, now)
    }

    // ══════════════════════════════════════════════════════════════
    // Outcome Tests
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn valid_mapped_event_is_dispatched() {
        let h = harness();

        let outcome = h.pipeline.process(signed_request(SECRET, BODY)).await;

        assert_eq!(outcome.status, StatusCode::OK);
        assert_eq!(outcome.code, "ACCEPTED");
        assert_eq!(outcome.state, PipelineState::Responded);
        assert!(outcome.was_dispatched());
        assert_eq!(h.bus.event_count(), 1);
    }

    #[tokio::test]
    async fn missing_header_is_rejected_without_fetching_secret() {
        let h = harness();
        let request = RawWebhookRequest::new(BODY, HeaderMap::new(), Timestamp::now());

        let outcome = h.pipeline.process(request).await;

        assert_eq!(outcome.status, StatusCode::UNAUTHORIZED);
        assert_eq!(outcome.state, PipelineState::Rejected);
        assert_eq!(h.secrets.fetch_count(), 0);
        assert_eq!(h.bus.event_count(), 0);
    }

    #[tokio::test]
    async fn non_ascii_header_is_rejected() {
        let h = harness();
        let mut headers = HeaderMap::new();
        headers.insert(
            "stripe-signature",
            HeaderValue::from_bytes(b"t=1,v1=\xff").unwrap(),
        );
        let request = RawWebhookRequest::new(BODY, headers, Timestamp::now());

        let outcome = h.pipeline.process(request).await;

        assert_eq!(outcome.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn unmapped_event_is_acknowledged_without_dispatch() {
        let h = harness();
        let body = r#"{"id":"evt_2","type":"invoice.paid","data":{"object":{"id":"in_1"}}}"#;

        let outcome = h.pipeline.process(signed_request(SECRET, body)).await;

        assert_eq!(outcome.status, StatusCode::OK);
        assert_eq!(outcome.code, "EVENT_IGNORED");
        assert_eq!(outcome.state, PipelineState::Responded);
        assert!(!outcome.was_dispatched());
        assert_eq!(h.bus.event_count(), 0);
    }

    #[tokio::test]
    async fn secret_failure_is_service_unavailable() {
        let h = harness();
        h.secrets.fail_with(SecretError::Unavailable {
            name: "stripe".into(),
            reason: "throttled".into(),
        });

        let outcome = h.pipeline.process(signed_request(SECRET, BODY)).await;

        assert_eq!(outcome.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(outcome.state, PipelineState::Rejected);
    }

    #[tokio::test]
    async fn bus_failure_is_bad_gateway() {
        let h = harness();
        h.bus.fail_with(BusError::Transport("down".into()));

        let outcome = h.pipeline.process(signed_request(SECRET, BODY)).await;

        assert_eq!(outcome.status, StatusCode::BAD_GATEWAY);
        assert_eq!(outcome.code, "DISPATCH_FAILED");
        assert_eq!(outcome.state, PipelineState::Rejected);
    }

    // ══════════════════════════════════════════════════════════════
    // Secret Rotation Tests
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn mismatch_triggers_one_refetch() {
        let h = harness();

        let outcome = h.pipeline.process(signed_request("whsec_wrong", BODY)).await;

        assert_eq!(outcome.status, StatusCode::UNAUTHORIZED);
        assert_eq!(h.secrets.fetch_count(), 2);
    }

    #[tokio::test]
    async fn rotated_secret_is_accepted_after_refetch() {
        let config = PipelineConfig::default();
        let store = Arc::new(InMemorySecretProvider::with_secret(
            &config.secret_name,
            &config.secret_version,
            SECRET,
        ));
        let cached = Arc::new(CachedSecretProvider::new(store.clone(), Duration::from_secs(300)));
        let bus = Arc::new(InMemoryEventBus::new());
        let pipeline =
            WebhookPipeline::new(cached, EventDispatcher::new(bus.clone()), config.clone());

        // Warm the cache with the old key
        assert_eq!(
            pipeline.process(signed_request(SECRET, BODY)).await.status,
            StatusCode::OK
        );
        store.rotate(&config.secret_name, &config.secret_version, "whsec_rotated");

        let outcome = pipeline.process(signed_request("whsec_rotated", BODY)).await;

        assert_eq!(outcome.status, StatusCode::OK);
        assert_eq!(store.fetch_count(), 2);
        assert_eq!(bus.event_count(), 2);
    }

    // ══════════════════════════════════════════════════════════════
    // Timeout Tests
    // ══════════════════════════════════════════════════════════════

    #[tokio::test(start_paused = true)]
    async fn slow_bus_times_out() {
        let h = harness();
        h.bus.set_latency(Duration::from_secs(30));

        let outcome = h.pipeline.process(signed_request(SECRET, BODY)).await;

        assert_eq!(outcome.status, StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(outcome.code, "TIMEOUT");
        assert_eq!(outcome.state, PipelineState::Rejected);
        assert_eq!(h.bus.event_count(), 0);
    }
}
