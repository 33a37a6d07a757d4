//! Resource protocol handler and its registration with the host runtime.
//!
//! Request flow:
//! parse URL → extract identifier (400) → ensure initialized (503) →
//! look up variant (404) → read binary (500) → respond.
//!
//! Successful responses are immutable: an identifier always names the same
//! bytes, so clients may cache them indefinitely.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use url::Url;

use crate::error::{FontError, Result};
use crate::font_service::{FontService, read_variant};
use crate::normalize::extract_request_identifier;
use crate::single_flight::SingleFlight;

pub const CACHE_CONTROL_IMMUTABLE: &str = "public, max-age=31536000, immutable";
pub const CACHE_CONTROL_NO_STORE: &str = "no-store";

/// A request delivered by the host for a URL under the font scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolRequest {
    pub url: String,
}

impl ProtocolRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Response handed back to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl ProtocolResponse {
    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    fn ok(body: Vec<u8>, mime: &str) -> Self {
        Self {
            status: 200,
            headers: vec![
                ("Content-Type".to_string(), mime.to_string()),
                ("Content-Length".to_string(), body.len().to_string()),
                ("Cache-Control".to_string(), CACHE_CONTROL_IMMUTABLE.to_string()),
                ("Access-Control-Allow-Origin".to_string(), "*".to_string()),
            ],
            body,
        }
    }

    fn error(status: u16, message: &str) -> Self {
        Self {
            status,
            headers: vec![
                (
                    "Content-Type".to_string(),
                    "text/plain; charset=utf-8".to_string(),
                ),
                ("Cache-Control".to_string(), CACHE_CONTROL_NO_STORE.to_string()),
            ],
            body: message.as_bytes().to_vec(),
        }
    }
}

/// Serves font binaries for URLs of the form `<scheme>://<variantId>`.
#[derive(Debug, Clone)]
pub struct FontProtocolHandler {
    service: FontService,
}

impl FontProtocolHandler {
    pub fn new(service: FontService) -> Self {
        Self { service }
    }

    pub async fn handle(&self, request: &ProtocolRequest) -> ProtocolResponse {
        let scheme = self.service.scheme();
        match Url::parse(&request.url) {
            Ok(url) if url.scheme().eq_ignore_ascii_case(scheme) => {}
            Ok(url) => {
                log::warn!(
                    "Font request with foreign scheme '{}': {}",
                    url.scheme(),
                    request.url
                );
                return ProtocolResponse::error(400, "Unsupported scheme");
            }
            Err(e) => {
                log::warn!("Malformed font request URL '{}': {}", request.url, e);
                return ProtocolResponse::error(400, "Malformed URL");
            }
        }

        let Some(ident) = extract_request_identifier(&request.url) else {
            log::warn!("Font request without identifier: {}", request.url);
            return ProtocolResponse::error(400, "Missing font identifier");
        };
        if ident.extra_segments > 0 {
            log::warn!(
                "Font request '{}' has {} extra path segment(s); serving '{}'",
                request.url,
                ident.extra_segments,
                ident.id
            );
        }

        let index = match self.service.ready_index().await {
            Ok(index) => index,
            Err(e) => {
                log::error!("Font service unavailable for '{}': {}", request.url, e);
                return ProtocolResponse::error(503, "Font service unavailable");
            }
        };
        let Some(variant) = index.variant(&ident.id).cloned() else {
            log::debug!("Font variant '{}' not found", ident.id);
            return ProtocolResponse::error(404, "Font not found");
        };

        match read_variant(&variant).await {
            Ok(binary) => ProtocolResponse::ok(binary.bytes, binary.format.mime_type()),
            Err(e) => {
                log::error!("{}", e);
                ProtocolResponse::error(500, "Failed to read font")
            }
        }
    }

    /// Wrap the handler in the callback shape hosts register.
    pub fn into_handler_fn(self) -> ProtocolHandlerFn {
        let handler = Arc::new(self);
        Arc::new(move |request: ProtocolRequest| {
            let handler = Arc::clone(&handler);
            Box::pin(async move { handler.handle(&request).await }) as ProtocolFuture
        })
    }
}

pub type ProtocolFuture = Pin<Box<dyn Future<Output = ProtocolResponse> + Send>>;
pub type ProtocolHandlerFn = Arc<dyn Fn(ProtocolRequest) -> ProtocolFuture + Send + Sync>;

/// Host capability for installing a custom URL scheme handler.
pub trait SchemeRegistry: Send + Sync {
    /// Install `handler` for `scheme`. Errors are reported as plain messages.
    fn register_scheme(
        &self,
        scheme: &str,
        handler: ProtocolHandlerFn,
    ) -> std::result::Result<(), String>;
}

/// Registers the font protocol handler exactly once.
///
/// Concurrent calls share one attempt; a failed attempt is retried on the
/// next call.
pub struct ProtocolRegistrar {
    registry: Arc<dyn SchemeRegistry>,
    service: FontService,
    guard: Arc<SingleFlight>,
}

impl std::fmt::Debug for ProtocolRegistrar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProtocolRegistrar")
            .field("scheme", &self.service.scheme())
            .field("guard", &self.guard)
            .finish()
    }
}

impl ProtocolRegistrar {
    pub fn new(registry: Arc<dyn SchemeRegistry>, service: FontService) -> Self {
        Self {
            registry,
            service,
            guard: Arc::new(SingleFlight::new()),
        }
    }

    pub fn service(&self) -> &FontService {
        &self.service
    }

    pub async fn ensure_registered(&self) -> Result<()> {
        let registry = Arc::clone(&self.registry);
        let service = self.service.clone();
        self.guard
            .run(move |_| async move {
                let scheme = service.scheme().to_string();
                let handler = FontProtocolHandler::new(service).into_handler_fn();
                registry
                    .register_scheme(&scheme, handler)
                    .map_err(FontError::Registration)?;
                log::info!("Registered font protocol handler for '{}://'", scheme);
                Ok(())
            })
            .await
            .map_err(|e| match e.as_ref() {
                FontError::Registration(msg) => FontError::Registration(msg.clone()),
                other => FontError::Registration(other.to_string()),
            })
    }

    pub fn is_registered(&self) -> bool {
        self.guard.is_done()
    }

    /// Forget the registration and shut the service down.
    pub fn shutdown(&self) {
        self.guard.reset(|| {});
        self.service.shutdown();
    }
}
