//! Job records as the remote service returns them, and the normalized
//! [`Candidate`] derived from them.
//!
//! Service responses are kept as generic JSON: the service is inconsistent
//! about field names, so values are pulled out with the ordered probes in
//! [`fields`](crate::fields) rather than a fixed struct layout.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Short identifier of a job on the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// One entry of the open-jobs listing, in service order (newest first).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobSummary(pub Value);

/// Per-job detail response. Fresher than the summary, so its fields win
/// whenever both carry the same information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobDetail(pub Value);

impl JobDetail {
    /// Stand-in used when the detail fetch fails or returns nothing.
    pub fn empty() -> Self {
        Self(Value::Object(Default::default()))
    }
}

impl Default for JobDetail {
    fn default() -> Self {
        Self::empty()
    }
}

/// A job eligible for presentation to the operator.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub id: JobId,
    pub display_name: String,
    /// Reward per action, always finite and non-negative.
    pub reward: f64,
    pub action_url: String,
    pub poster: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_id_serializes_as_plain_string() {
        let id = JobId::new("ab12");
        assert_eq!(serde_json::to_value(&id).unwrap(), serde_json::json!("ab12"));
        assert_eq!(id.to_string(), "ab12");
    }

    #[test]
    fn empty_detail_is_an_object() {
        assert!(JobDetail::empty().0.is_object());
    }

    #[test]
    fn summary_deserializes_from_any_json() {
        let summary: JobSummary =
            serde_json::from_str(r#"{"short_id":"x1","title":"hello"}"#).unwrap();
        assert_eq!(summary.0["short_id"], "x1");
    }
}
