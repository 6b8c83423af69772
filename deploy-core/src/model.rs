use serde::{Deserialize, Serialize};

/// Parameters of a single advisory request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestParameters {
    pub timezone: String,
    /// Free-form date, forwarded to the service untouched.
    pub date: Option<String>,
}

impl RequestParameters {
    /// An empty date is treated the same as no date at all.
    pub fn new(timezone: impl Into<String>, date: Option<String>) -> Self {
        Self {
            timezone: timezone.into(),
            date: date.filter(|d| !d.is_empty()),
        }
    }

    /// Same date, different timezone. Used after an interactive selection.
    pub fn with_timezone(&self, timezone: impl Into<String>) -> Self {
        Self {
            timezone: timezone.into(),
            date: self.date.clone(),
        }
    }
}

/// Successful answer from the advisory service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdvisoryResult {
    #[serde(rename = "Timezone")]
    pub timezone: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(rename = "Shouldideploy")]
    pub should_deploy: bool,
}
