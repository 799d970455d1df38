//! # ifsc-ledger
//!
//! Resolve IFSC bank branch codes against public lookup services and keep a CSV
//! ledger of every lookup, including the ones that could not be resolved.
//!
//! ## Pipeline
//!
//! 1. [`Resolver::resolve`] tries each endpoint in priority order, retrying
//!    failed requests with exponential backoff. It never fails; an unresolved
//!    lookup is `None`.
//! 2. [`normalize`] turns the outcome into a [`ResolvedRecord`], filling every
//!    missing field with [`NOT_AVAILABLE`].
//! 3. [`RecordStore::append`] adds the record to the CSV file without touching
//!    existing rows.
//!
//! ## Quick Start
//!
//! ```no_run
//! use ifsc_ledger::{Config, RecordStore, Resolver, resolve_and_record};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let resolver = Resolver::from_config(&config)?;
//!     let store = RecordStore::new(&config.store.path);
//!
//!     let record = resolve_and_record(&resolver, &store, &"SBIN0000001".into()).await?;
//!     println!("IFSC saved: {record}");
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Lookup response normalization
pub mod normalize;
/// Endpoint fallback and HTTP fetching
pub mod resolver;
/// Retry logic with exponential backoff
pub mod retry;
/// CSV record store
pub mod store;
/// Core types
pub mod types;

// Re-export commonly used types
pub use config::{Config, EndpointConfig, RetryConfig, StoreConfig};
pub use error::{Error, FetchError, Result, StoreError};
pub use normalize::{normalize, normalize_at};
pub use resolver::{Fetcher, HttpFetcher, Resolver};
pub use retry::{Sleeper, TokioSleeper};
pub use store::RecordStore;
pub use types::{LookupCode, NOT_AVAILABLE, RawResult, ResolvedRecord};

/// Resolve `code`, normalize the outcome, and append it to `store`
///
/// Lookup failures never surface here; they become a record of
/// [`NOT_AVAILABLE`] fields. Only record store failures are returned.
pub async fn resolve_and_record(
    resolver: &Resolver,
    store: &RecordStore,
    code: &LookupCode,
) -> Result<ResolvedRecord> {
    let raw = resolver.resolve(code).await;
    let record = normalize(raw.as_ref(), code);

    if !record.is_resolved() {
        tracing::warn!(code = %code, "Recording unresolved lookup");
    }

    let writer = store.clone();
    let row = record.clone();
    tokio::task::spawn_blocking(move || writer.append(&row))
        .await
        .map_err(|e| Error::Io(std::io::Error::other(e)))??;

    tracing::info!(
        code = %record.code,
        path = %store.path().display(),
        resolved = record.is_resolved(),
        "Lookup recorded"
    );
    Ok(record)
}
