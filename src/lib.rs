// Library exports for the folio host and its tests
//
// # Mutex Usage Policy
//
//   - `parking_lot::Mutex` / `RwLock`: sync-only state that is never held
//     across an `.await` (scheme table, log sink, single-flight guard state).
//   - `tokio::sync::watch`: one async outcome shared by many waiters
//     (single-flight runs).

/// Application version (root crate version, for use by sub-crates).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod debug;
pub mod host;
