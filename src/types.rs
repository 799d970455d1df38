//! Core types for ifsc-ledger

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Placeholder stored for any field the lookup could not provide
pub const NOT_AVAILABLE: &str = "N/A";

/// Canonical header of the record store, in column order
pub const RECORD_HEADER: [&str; 5] = ["IFSC", "Bank", "Branch", "State", "Timestamp"];

/// Bank branch code supplied by the caller
///
/// Opaque and case-sensitive: the core never validates or rewrites it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LookupCode(String);

impl LookupCode {
    /// Wrap a caller-supplied code
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    /// Borrow the code as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LookupCode {
    fn from(code: &str) -> Self {
        Self::new(code)
    }
}

impl From<String> for LookupCode {
    fn from(code: String) -> Self {
        Self(code)
    }
}

impl std::fmt::Display for LookupCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fields recognized in a successful lookup response
///
/// Every field is optional; providers disagree on casing and sometimes omit
/// fields entirely. Missing fields are filled in by the normalizer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RawResult {
    ifsc: Option<String>,
    bank: Option<String>,
    branch: Option<String>,
    state: Option<String>,
}

impl RawResult {
    /// Build a result from explicit field values
    pub fn new(
        ifsc: Option<String>,
        bank: Option<String>,
        branch: Option<String>,
        state: Option<String>,
    ) -> Self {
        Self {
            ifsc,
            bank,
            branch,
            state,
        }
    }

    /// Extract the recognized fields from a JSON response body
    ///
    /// Returns `None` when the body is not a JSON object. Keys match
    /// case-insensitively, with the all-uppercase spelling taking precedence.
    pub fn from_json(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        Some(Self {
            ifsc: field(map, "IFSC"),
            bank: field(map, "BANK"),
            branch: field(map, "BRANCH"),
            state: field(map, "STATE"),
        })
    }

    /// Branch code echoed by the provider
    pub fn ifsc(&self) -> Option<&str> {
        self.ifsc.as_deref()
    }

    /// Bank name
    pub fn bank(&self) -> Option<&str> {
        self.bank.as_deref()
    }

    /// Branch name
    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    /// State the branch is located in
    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }
}

fn field(map: &Map<String, Value>, key: &str) -> Option<String> {
    let value = map.get(key).or_else(|| {
        map.iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    })?;

    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// One row of the record store
///
/// All fields are always populated; an unresolved lookup carries
/// [`NOT_AVAILABLE`] in its descriptive fields.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRecord {
    /// Code that was looked up
    #[serde(rename = "IFSC")]
    pub code: LookupCode,

    /// Bank name
    #[serde(rename = "Bank")]
    pub bank: String,

    /// Branch name
    #[serde(rename = "Branch")]
    pub branch: String,

    /// State
    #[serde(rename = "State")]
    pub state: String,

    /// Local time at which the record was produced
    #[serde(rename = "Timestamp", with = "timestamp_format")]
    pub resolved_at: NaiveDateTime,
}

impl ResolvedRecord {
    /// Whether any descriptive field came from a lookup service
    pub fn is_resolved(&self) -> bool {
        [&self.bank, &self.branch, &self.state]
            .iter()
            .any(|value| value.as_str() != NOT_AVAILABLE)
    }

    /// Fields in store column order
    pub fn to_row(&self) -> [String; 5] {
        [
            self.code.to_string(),
            self.bank.clone(),
            self.branch.clone(),
            self.state.clone(),
            timestamp_format::render(&self.resolved_at),
        ]
    }
}

impl std::fmt::Display for ResolvedRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "IFSC={} Bank={} Branch={} State={} Timestamp={}",
            self.code,
            self.bank,
            self.branch,
            self.state,
            timestamp_format::render(&self.resolved_at)
        )
    }
}

// ISO-8601 without offset, microsecond precision on output; any precision on input
mod timestamp_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

    pub fn render(at: &NaiveDateTime) -> String {
        at.format(FORMAT).to_string()
    }

    pub fn serialize<S>(at: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&render(at))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.parse::<NaiveDateTime>()
            .map_err(serde::de::Error::custom)
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 19)
            .unwrap()
            .and_hms_micro_opt(14, 3, 7, 123_456)
            .unwrap()
    }

    #[test]
    fn lookup_code_is_case_sensitive() {
        assert_ne!(LookupCode::from("sbin0000001"), LookupCode::from("SBIN0000001"));
        assert_eq!(LookupCode::from("SBIN0000001").as_str(), "SBIN0000001");
    }

    #[test]
    fn from_json_reads_uppercase_provider_keys() {
        let body = json!({
            "IFSC": "SBIN0000001",
            "BANK": "State Bank of India",
            "BRANCH": "CORPORATE",
            "STATE": "Maharashtra",
            "CITY": "MUMBAI"
        });
        let raw = RawResult::from_json(&body).unwrap();
        assert_eq!(raw.ifsc(), Some("SBIN0000001"));
        assert_eq!(raw.bank(), Some("State Bank of India"));
        assert_eq!(raw.branch(), Some("CORPORATE"));
        assert_eq!(raw.state(), Some("Maharashtra"));
    }

    #[test]
    fn from_json_matches_keys_case_insensitively() {
        let body = json!({"ifsc": "HDFC0000001", "Bank": "HDFC Bank", "branch": "FORT"});
        let raw = RawResult::from_json(&body).unwrap();
        assert_eq!(raw.ifsc(), Some("HDFC0000001"));
        assert_eq!(raw.bank(), Some("HDFC Bank"));
        assert_eq!(raw.branch(), Some("FORT"));
        assert_eq!(raw.state(), None);
    }

    #[test]
    fn uppercase_key_wins_over_other_casing() {
        let body = json!({"bank": "lower", "BANK": "upper"});
        let raw = RawResult::from_json(&body).unwrap();
        assert_eq!(raw.bank(), Some("upper"));
    }

    #[test]
    fn blank_null_and_nested_values_count_as_missing() {
        let body = json!({"BANK": "   ", "BRANCH": null, "STATE": {"name": "Goa"}, "IFSC": 42});
        let raw = RawResult::from_json(&body).unwrap();
        assert_eq!(raw.bank(), None);
        assert_eq!(raw.branch(), None);
        assert_eq!(raw.state(), None);
        assert_eq!(raw.ifsc(), Some("42"));
    }

    #[test]
    fn from_json_rejects_non_objects() {
        assert!(RawResult::from_json(&json!("Not Found")).is_none());
        assert!(RawResult::from_json(&json!([1, 2, 3])).is_none());
    }

    #[test]
    fn record_row_follows_header_order() {
        let record = ResolvedRecord {
            code: "SBIN0000001".into(),
            bank: "State Bank of India".into(),
            branch: "CORPORATE".into(),
            state: "Maharashtra".into(),
            resolved_at: at(),
        };
        assert_eq!(
            record.to_row(),
            [
                "SBIN0000001".to_string(),
                "State Bank of India".to_string(),
                "CORPORATE".to_string(),
                "Maharashtra".to_string(),
                "2026-10-19T14:03:07.123456".to_string(),
            ]
        );
        assert!(record.is_resolved());
    }

    #[test]
    fn sentinel_record_is_not_resolved() {
        let record = ResolvedRecord {
            code: "XXXX0000000".into(),
            bank: NOT_AVAILABLE.into(),
            branch: NOT_AVAILABLE.into(),
            state: NOT_AVAILABLE.into(),
            resolved_at: at(),
        };
        assert!(!record.is_resolved());
        assert_eq!(
            record.to_string(),
            "IFSC=XXXX0000000 Bank=N/A Branch=N/A State=N/A Timestamp=2026-10-19T14:03:07.123456"
        );
    }

    #[test]
    fn timestamp_accepts_second_precision_on_input() {
        let record: ResolvedRecord = serde_json::from_value(json!({
            "IFSC": "SBIN0000001",
            "Bank": "B",
            "Branch": "C",
            "State": "D",
            "Timestamp": "2026-10-19T14:03:07"
        }))
        .unwrap();
        assert_eq!(
            record.resolved_at,
            NaiveDate::from_ymd_opt(2026, 10, 19)
                .unwrap()
                .and_hms_opt(14, 3, 7)
                .unwrap()
        );
    }
}
