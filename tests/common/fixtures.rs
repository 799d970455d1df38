//! Lookup payloads, mock endpoints and a clock-free sleeper

use async_trait::async_trait;
use ifsc_ledger::{
    Config, EndpointConfig, HttpFetcher, RecordStore, Resolver, RetryConfig, Sleeper,
};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::MockServer;

/// Response body the primary provider returns for SBIN0000001
pub fn sbi_payload() -> Value {
    json!({
        "IFSC": "SBIN0000001",
        "BANK": "State Bank of India",
        "BRANCH": "CORPORATE",
        "STATE": "Maharashtra",
        "CITY": "MUMBAI",
        "MICR": "400002000"
    })
}

/// Records backoff delays without waiting
///
/// Same behavior as the crate-internal test sleeper, which integration tests
/// cannot reach.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    delays: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays.lock().map(|d| d.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, delay: Duration) {
        if let Ok(mut delays) = self.delays.lock() {
            delays.push(delay);
        }
    }
}

/// Endpoint template pointing at `server`, under `/ifsc/{code}`
pub fn endpoint_for(name: &str, server: &MockServer) -> EndpointConfig {
    EndpointConfig::new(name, format!("{}/ifsc/{{code}}", server.uri()))
}

/// Resolver over the given endpoints with a short request timeout and no real waiting
pub fn test_resolver(endpoints: Vec<EndpointConfig>, sleeper: Arc<RecordingSleeper>) -> Resolver {
    let config = Config {
        endpoints,
        request_timeout: Duration::from_secs(2),
        ..Default::default()
    };
    config.validate().unwrap();
    Resolver::new(
        config.endpoints,
        RetryConfig::default(),
        Arc::new(HttpFetcher::new(config.request_timeout).unwrap()),
        sleeper,
    )
}

/// Record store inside a fresh temporary directory
pub fn temp_store() -> (RecordStore, TempDir) {
    let dir = TempDir::new().unwrap();
    let store = RecordStore::new(dir.path().join("IFSC_CODE.csv"));
    (store, dir)
}
