//! JSON bodies exchanged with the job backend.

use serde::{Deserialize, Deserializer, Serialize};

const TERMINAL_STATUSES: [&str; 3] = ["Completed", "Error", "Aborted"];

/// Body of `POST /api/start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartRequest {
    pub keyword: String,
    pub location: String,
    pub max_results: u32,
    pub headless: bool,
    pub no_website: bool,
}

/// Reply to `POST /api/start`. Anything without `error` is an acceptance.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct StartResponse {
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of `GET /api/stats`. Missing or null counters read as zero.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct StatsReport {
    #[serde(default, deserialize_with = "count")]
    pub total: u64,
    #[serde(default, deserialize_with = "count")]
    pub with_website: u64,
    #[serde(default, deserialize_with = "count")]
    pub with_phone: u64,
    #[serde(default, deserialize_with = "count")]
    pub with_social: u64,
    #[serde(default, deserialize_with = "count")]
    pub with_pixels: u64,
    #[serde(default, deserialize_with = "count")]
    pub with_email: u64,
    #[serde(default, deserialize_with = "percent")]
    pub progress: u8,
    #[serde(default, deserialize_with = "label")]
    pub status: String,
}

impl StatsReport {
    pub fn is_terminal(&self) -> bool {
        TERMINAL_STATUSES.contains(&self.status.trim())
    }
}

fn count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value.filter(|v| v.is_finite() && *v > 0.0).map_or(0, |v| v as u64))
}

fn percent<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value
        .filter(|v| v.is_finite() && *v > 0.0)
        .map_or(0, |v| v.min(100.0).round() as u8))
}

fn label<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
