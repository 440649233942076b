//! The endpoint gate.
//!
//! Takes the transport's view of a request (headers and raw body), checks the
//! signature before anything is parsed, runs the handler, publishes the
//! handoff when one is needed, and answers with an HTTP-equivalent response.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;

use oumodules_core::{signed_message, verify_signature, CodeCatalog, CoreError, Interaction};

use crate::config::InteractionConfig;
use crate::error::{InteractionError, Result};
use crate::handler::{InteractionHandler, Outcome};
use crate::publisher::HandoffPublisher;

pub const HEADER_TIMESTAMP: &str = "x-signature-timestamp";
pub const HEADER_SIGNATURE: &str = "x-signature-ed25519";

const CONTENT_TYPE_JSON: &str = "application/json";

/// An inbound request as handed over by the transport.
#[derive(Debug, Clone, Default)]
pub struct InboundRequest {
    pub method: String,
    /// Header names are stored lowercase.
    headers: HashMap<String, String>,
    /// Unparsed body. The signature covers these exact bytes.
    pub body: Bytes,
}

impl InboundRequest {
    pub fn post(body: impl Into<Bytes>) -> Self {
        Self {
            method: "POST".to_string(),
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    /// Set a header. A later value replaces an earlier one under any casing.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Header value, matching the name case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }
}

/// An HTTP-equivalent response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub content_type: Option<&'static str>,
    pub body: Bytes,
}

impl HttpResponse {
    pub const OK: u16 = 200;
    pub const BAD_REQUEST: u16 = 400;
    pub const UNAUTHORIZED: u16 = 401;
    pub const NOT_FOUND: u16 = 404;

    fn json(body: Vec<u8>) -> Self {
        Self {
            status: Self::OK,
            content_type: Some(CONTENT_TYPE_JSON),
            body: Bytes::from(body),
        }
    }

    fn unauthorized() -> Self {
        Self {
            status: Self::UNAUTHORIZED,
            content_type: None,
            body: Bytes::from_static(b"invalid request signature"),
        }
    }

    fn not_found() -> Self {
        Self {
            status: Self::NOT_FOUND,
            content_type: None,
            body: Bytes::new(),
        }
    }

    fn bad_request(reason: String) -> Self {
        Self {
            status: Self::BAD_REQUEST,
            content_type: None,
            body: Bytes::from(reason),
        }
    }
}

/// The interaction endpoint.
///
/// Holds the read-only catalog and key; one instance serves every
/// invocation for the life of the process.
pub struct InteractionService<P: HandoffPublisher> {
    config: InteractionConfig,
    handler: InteractionHandler<Arc<CodeCatalog>>,
    publisher: P,
}

impl<P: HandoffPublisher> InteractionService<P> {
    pub fn new(config: InteractionConfig, catalog: Arc<CodeCatalog>, publisher: P) -> Self {
        let handler = InteractionHandler::new(catalog, &config);
        Self {
            config,
            handler,
            publisher,
        }
    }

    /// Load the catalog from `config.catalog_path` and build the service.
    pub fn open(config: InteractionConfig, publisher: P) -> Result<Self> {
        let catalog = CodeCatalog::open(&config.catalog_path)?;
        Ok(Self::new(config, Arc::new(catalog), publisher))
    }

    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Arc<CodeCatalog> {
        self.handler.catalog()
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Check the platform signature over `timestamp || body`.
    pub fn authenticate(&self, request: &InboundRequest) -> bool {
        let (Some(timestamp), Some(signature)) = (
            request.header(HEADER_TIMESTAMP),
            request.header(HEADER_SIGNATURE),
        ) else {
            return false;
        };
        verify_signature(
            &self.config.public_key,
            signature,
            &signed_message(timestamp, &request.body),
        )
    }

    /// Serve one request.
    ///
    /// `Err` is returned only when the handoff could not be published or the
    /// reply could not be encoded.
    pub async fn handle(&self, request: &InboundRequest) -> Result<HttpResponse> {
        if !self.authenticate(request) {
            tracing::warn!(method = %request.method, "rejecting request with invalid signature");
            return Ok(HttpResponse::unauthorized());
        }

        let interaction = match Interaction::from_slice(&request.body) {
            Ok(interaction) => interaction,
            Err(CoreError::MalformedRequest(reason)) => {
                tracing::warn!(%reason, "rejecting malformed request");
                return Ok(HttpResponse::bad_request(reason));
            }
            Err(e) => return Err(e.into()),
        };

        let handled = match self.handler.handle(&interaction) {
            Outcome::Handled(handled) => handled,
            Outcome::Unrecognized(kind) => {
                tracing::warn!(kind, "unrecognized interaction type");
                return Ok(HttpResponse::not_found());
            }
        };

        let (reply, handoff) = handled.into_parts();
        if let Some(handoff) = handoff {
            let data = Bytes::from(handoff.to_json()?);
            let message_id = self
                .publisher
                .publish(&self.config.handoff_topic, data)
                .await
                .map_err(|e| match e {
                    InteractionError::Publish(_) => e,
                    other => InteractionError::Publish(other.to_string()),
                })?;
            tracing::info!(
                %message_id,
                claim_key = %handoff.claim_key(),
                "handoff published"
            );
        }

        tracing::info!(callback_type = reply.callback_type(), "replying");
        Ok(HttpResponse::json(serde_json::to_vec(&reply)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_ignores_case() {
        let request = InboundRequest::post("{}").with_header("X-Signature-Timestamp", "1");
        assert_eq!(request.header(HEADER_TIMESTAMP), Some("1"));
        assert_eq!(request.header("X-SIGNATURE-TIMESTAMP"), Some("1"));
        assert_eq!(request.header(HEADER_SIGNATURE), None);
    }

    #[test]
    fn test_repeated_header_keeps_last_value() {
        let request = InboundRequest::post("{}")
            .with_header("X-Signature-Ed25519", "first")
            .with_header("x-signature-ed25519", "second");
        assert_eq!(request.header(HEADER_SIGNATURE), Some("second"));

        let request = InboundRequest::post("{}")
            .with_header("x-signature-ed25519", "first")
            .with_header("X-SIGNATURE-ED25519", "second");
        assert_eq!(request.header(HEADER_SIGNATURE), Some("second"));
    }
}
