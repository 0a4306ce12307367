//! Response types for the geodata sample endpoint.

use std::collections::BTreeMap;

use serde::Deserialize;

/// Body returned by `GET /datasets/{identifier}/sample`.
///
/// `variables` maps each requested variable to its grid cells; cells the
/// provider could not compute are `null`.
#[derive(Debug, Deserialize)]
pub struct SampleResponse {
    /// `"ok"` on success, `"error"` otherwise.
    pub status: String,

    /// Detail accompanying an error status.
    #[serde(default)]
    pub message: Option<String>,

    /// Grid cells per variable.
    #[serde(default)]
    pub variables: BTreeMap<String, Vec<Option<f64>>>,
}

impl SampleResponse {
    /// Check if the response indicates success.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialise_success_response() {
        let json = r#"{
            "status": "ok",
            "variables": {"ndvi": [0.4, null, 0.6]}
        }"#;

        let response: SampleResponse = serde_json::from_str(json).expect("should deserialise");

        assert!(response.is_ok());
        assert!(response.message.is_none());
        assert_eq!(
            response.variables.get("ndvi"),
            Some(&vec![Some(0.4), None, Some(0.6)])
        );
    }

    #[test]
    fn deserialise_error_response() {
        let json = r#"{"status": "error", "message": "dataset offline"}"#;

        let response: SampleResponse = serde_json::from_str(json).expect("should deserialise");

        assert!(!response.is_ok());
        assert_eq!(response.message.as_deref(), Some("dataset offline"));
        assert!(response.variables.is_empty());
    }
}
