//! In-process host runtime for custom URL schemes.
//!
//! Plays the part a webview runtime plays in an embedding application:
//! handlers are registered per scheme and requests are dispatched to the
//! handler owning the URL's scheme.

use std::collections::HashMap;

use folio_fonts::{ProtocolHandlerFn, ProtocolRequest, ProtocolResponse, SchemeRegistry};
use parking_lot::RwLock;

/// Scheme → handler table.
#[derive(Default)]
pub struct LocalSchemeRegistry {
    handlers: RwLock<HashMap<String, ProtocolHandlerFn>>,
}

impl LocalSchemeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_registered(&self, scheme: &str) -> bool {
        self.handlers
            .read()
            .contains_key(&scheme.to_ascii_lowercase())
    }

    pub fn schemes(&self) -> Vec<String> {
        let mut schemes: Vec<String> = self.handlers.read().keys().cloned().collect();
        schemes.sort();
        schemes
    }

    /// Route a request to the handler for its scheme.
    ///
    /// Requests for unknown schemes get a plain 404 without reaching any
    /// handler.
    pub async fn dispatch(&self, url: &str) -> ProtocolResponse {
        let scheme = url
            .split_once("://")
            .map(|(scheme, _)| scheme.to_ascii_lowercase())
            .unwrap_or_default();
        // Clone out so the lock is not held across the handler
        let handler = self.handlers.read().get(&scheme).cloned();
        match handler {
            Some(handler) => handler(ProtocolRequest::new(url)).await,
            None => {
                log::warn!("No handler registered for scheme '{}' ({})", scheme, url);
                ProtocolResponse {
                    status: 404,
                    headers: vec![(
                        "Content-Type".to_string(),
                        "text/plain; charset=utf-8".to_string(),
                    )],
                    body: b"Unknown scheme".to_vec(),
                }
            }
        }
    }
}

impl SchemeRegistry for LocalSchemeRegistry {
    fn register_scheme(&self, scheme: &str, handler: ProtocolHandlerFn) -> Result<(), String> {
        let scheme = scheme.trim().to_ascii_lowercase();
        if scheme.is_empty() {
            return Err("scheme must not be empty".to_string());
        }
        let mut handlers = self.handlers.write();
        if handlers.contains_key(&scheme) {
            return Err(format!("scheme '{scheme}' already has a handler"));
        }
        log::debug!("Installed handler for '{}://'", scheme);
        handlers.insert(scheme, handler);
        Ok(())
    }
}
