//! Response envelope returned by every adapter call.
//!
//! Success: `{"success": true, "prontuario": "...", "data": [...]}`
//! Failure: `{"success": false, "prontuario": "...", "error": "..."}`

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub prontuario: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<T>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> Envelope<T> {
    pub fn success(prontuario: impl Into<String>, data: Vec<T>) -> Self {
        Self {
            success: true,
            prontuario: prontuario.into(),
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(prontuario: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            prontuario: prontuario.into(),
            data: None,
            error: Some(error.into()),
        }
    }

    /// Fold a fallible fetch into an envelope; the error's display text becomes `error`.
    pub fn from_result<E: std::fmt::Display>(
        prontuario: impl Into<String>,
        result: Result<Vec<T>, E>,
    ) -> Self {
        match result {
            Ok(data) => Self::success(prontuario, data),
            Err(e) => Self::failure(prontuario, e.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Records on success, empty on failure.
    pub fn records(&self) -> &[T] {
        self.data.as_deref().unwrap_or(&[])
    }
}

impl<T: Serialize> Envelope<T> {
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
