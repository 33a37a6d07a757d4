//! Integration tests for the font protocol handler and its registration.

mod common;

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use common::{CountingResolver, FontFixture, WOFF2_BYTES, service_with, write_pretendard};
use folio_fonts::protocol::CACHE_CONTROL_IMMUTABLE;
use folio_fonts::{
    FontError, FontProtocolHandler, ProtocolHandlerFn, ProtocolRegistrar, ProtocolRequest,
    SchemeRegistry,
};
use parking_lot::Mutex;
use serde_json::json;

const PRETENDARD_URL: &str = "folio-font://pretendard-400-normal-regular.woff2";

fn handler_for(fixture: &FontFixture) -> FontProtocolHandler {
    FontProtocolHandler::new(fixture.service())
}

#[tokio::test]
async fn test_serves_font_with_immutable_headers() {
    let fixture = FontFixture::new();
    write_pretendard(&fixture);
    let handler = handler_for(&fixture);

    let response = handler.handle(&ProtocolRequest::new(PRETENDARD_URL)).await;
    assert_eq!(response.status, 200);
    assert_eq!(response.body, WOFF2_BYTES);
    assert_eq!(response.header("content-type"), Some("font/woff2"));
    assert_eq!(
        response.header("Content-Length"),
        Some(WOFF2_BYTES.len().to_string().as_str())
    );
    assert_eq!(response.header("Cache-Control"), Some(CACHE_CONTROL_IMMUTABLE));
    assert_eq!(response.header("Access-Control-Allow-Origin"), Some("*"));
}

#[tokio::test]
async fn test_identifier_normalization_on_request() {
    let fixture = FontFixture::new();
    write_pretendard(&fixture);
    let handler = handler_for(&fixture);

    for url in [
        "folio-font://Pretendard-400-Normal-Regular.WOFF2/",
        "FOLIO-FONT://pretendard-400-normal-regular.woff2?v=2",
        "folio-font://pretendard-400-normal-regular.woff2#frag",
        "folio-font://pretendard%2D400-normal-regular.woff2",
    ] {
        let response = handler.handle(&ProtocolRequest::new(url)).await;
        assert_eq!(response.status, 200, "url {url}");
    }
}

#[tokio::test]
async fn test_extra_segments_use_first_only() {
    let fixture = FontFixture::new();
    write_pretendard(&fixture);
    let handler = handler_for(&fixture);

    let response = handler
        .handle(&ProtocolRequest::new(format!("{PRETENDARD_URL}/ignored/more")))
        .await;
    assert_eq!(response.status, 200);
    assert_eq!(response.body, WOFF2_BYTES);
}

#[tokio::test]
async fn test_bad_requests() {
    let fixture = FontFixture::new();
    write_pretendard(&fixture);
    let handler = handler_for(&fixture);

    for url in ["folio-font://", "folio-font:///", "not a url", "https://pretendard-400-normal-regular.woff2"] {
        let response = handler.handle(&ProtocolRequest::new(url)).await;
        assert_eq!(response.status, 400, "url {url}");
        assert_eq!(response.header("Cache-Control"), Some("no-store"));
        assert!(response.header("Content-Type").unwrap().starts_with("text/plain"));
    }
}

#[tokio::test]
async fn test_unknown_variant_is_404() {
    let fixture = FontFixture::new();
    write_pretendard(&fixture);
    let handler = handler_for(&fixture);

    let response = handler
        .handle(&ProtocolRequest::new("folio-font://nope-400-normal"))
        .await;
    assert_eq!(response.status, 404);
}

#[tokio::test]
async fn test_initialization_failure_is_503_and_retried() {
    let resolver = CountingResolver::failing_first(1);
    let handler = FontProtocolHandler::new(service_with(Arc::clone(&resolver)));

    let response = handler
        .handle(&ProtocolRequest::new("folio-font://anything"))
        .await;
    assert_eq!(response.status, 503);

    // The next request re-runs initialization; the id itself is unknown
    let response = handler
        .handle(&ProtocolRequest::new("folio-font://anything"))
        .await;
    assert_eq!(response.status, 404);
    assert_eq!(resolver.calls(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_request_overlapping_reload_is_not_503() {
    let resolver = CountingResolver::new(std::time::Duration::from_millis(300));
    let service = service_with(Arc::clone(&resolver));
    let handler = FontProtocolHandler::new(service.clone());

    let early = tokio::spawn(async move {
        handler
            .handle(&ProtocolRequest::new("folio-font://anything"))
            .await
    });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    service.reload().await.unwrap();

    let response = early.await.unwrap();
    assert_eq!(response.status, 404);
    assert_eq!(resolver.calls(), 2);
}

#[tokio::test]
async fn test_read_failure_is_500_and_isolated() {
    let fixture = FontFixture::new();
    let doomed = fixture.write("fonts/a/doomed.woff2", WOFF2_BYTES);
    fixture.write("fonts/a/kept.woff2", WOFF2_BYTES);
    fixture.write_manifest(
        "fonts/font-manifest.json",
        &json!({
            "families": [{
                "id": "a",
                "variants": [
                    { "id": "doomed", "file": "a/doomed.woff2" },
                    { "id": "kept", "file": "a/kept.woff2", "weight": 700 }
                ]
            }]
        }),
    );
    let handler = handler_for(&fixture);
    assert_eq!(
        handler.handle(&ProtocolRequest::new("folio-font://doomed")).await.status,
        200
    );

    std::fs::remove_file(doomed).unwrap();
    let response = handler.handle(&ProtocolRequest::new("folio-font://doomed")).await;
    assert_eq!(response.status, 500);
    assert_eq!(response.header("Cache-Control"), Some("no-store"));

    let response = handler.handle(&ProtocolRequest::new("folio-font://kept")).await;
    assert_eq!(response.status, 200);
}

/// Registry that records handlers and can refuse the first attempts.
#[derive(Default)]
struct RecordingRegistry {
    attempts: AtomicUsize,
    refuse_first: usize,
    handlers: Mutex<HashMap<String, ProtocolHandlerFn>>,
}

impl SchemeRegistry for RecordingRegistry {
    fn register_scheme(&self, scheme: &str, handler: ProtocolHandlerFn) -> Result<(), String> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.refuse_first {
            return Err(format!("scheme '{scheme}' refused"));
        }
        self.handlers.lock().insert(scheme.to_string(), handler);
        Ok(())
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_registration_is_idempotent() {
    let fixture = FontFixture::new();
    write_pretendard(&fixture);
    let registry = Arc::new(RecordingRegistry::default());
    let registrar = Arc::new(ProtocolRegistrar::new(registry.clone(), fixture.service()));

    let mut handles = Vec::new();
    for _ in 0..8 {
        let registrar = Arc::clone(&registrar);
        handles.push(tokio::spawn(
            async move { registrar.ensure_registered().await },
        ));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }
    registrar.ensure_registered().await.unwrap();
    assert!(registrar.is_registered());
    assert_eq!(registry.attempts.load(Ordering::SeqCst), 1);

    // The registered callback serves fonts
    let handler = registry.handlers.lock().get("folio-font").cloned().unwrap();
    let response = handler(ProtocolRequest::new(PRETENDARD_URL)).await;
    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn test_registration_failure_allows_retry() {
    let fixture = FontFixture::new();
    let registry = Arc::new(RecordingRegistry {
        refuse_first: 1,
        ..Default::default()
    });
    let registrar = ProtocolRegistrar::new(registry.clone(), fixture.service());

    let err = registrar.ensure_registered().await.unwrap_err();
    assert!(matches!(err, FontError::Registration(ref msg) if msg.contains("refused")));
    assert!(!registrar.is_registered());

    registrar.ensure_registered().await.unwrap();
    assert!(registrar.is_registered());
    assert_eq!(registry.attempts.load(Ordering::SeqCst), 2);

    registrar.shutdown();
    assert!(!registrar.is_registered());
    assert!(!registrar.service().is_initialized());
}
