//! Job parameter validation against the licence ceiling.
//!
//! The ceiling is a usability aid for the operator, not a security boundary;
//! the backend performs its own check.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Input bound advertised when the licence has no ceiling.
pub const UNLIMITED_DISPLAY_BOUND: u32 = 10_000;

/// How long the clamp highlight stays raised.
pub const CLAMP_HIGHLIGHT: Duration = Duration::from_secs(1);

const DEFAULT_CEILING: u32 = 100;
const DEFAULT_MAX_RESULTS: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LicenseTier {
    Developer,
    Client,
    Other(String),
}

impl LicenseTier {
    pub fn as_str(&self) -> &str {
        match self {
            LicenseTier::Developer => "developer",
            LicenseTier::Client => "client",
            LicenseTier::Other(name) => name,
        }
    }

    /// Capitalised name used in tooltips ("Developer", "Client").
    pub fn label(&self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl From<String> for LicenseTier {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "developer" => LicenseTier::Developer,
            "client" => LicenseTier::Client,
            _ => LicenseTier::Other(value),
        }
    }
}

impl From<LicenseTier> for String {
    fn from(value: LicenseTier) -> Self {
        value.as_str().to_string()
    }
}

/// Upper bound on `max_results`. Any negative number on the wire means unlimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub enum ResultCeiling {
    Limited(u32),
    Unlimited,
}

impl ResultCeiling {
    /// Returns the effective value and whether it had to be lowered.
    pub fn clamp(self, requested: u32) -> (u32, bool) {
        match self {
            ResultCeiling::Limited(max) if requested > max => (max, true),
            _ => (requested, false),
        }
    }
}

impl From<i64> for ResultCeiling {
    fn from(value: i64) -> Self {
        if value < 0 {
            ResultCeiling::Unlimited
        } else {
            ResultCeiling::Limited(u32::try_from(value).unwrap_or(u32::MAX))
        }
    }
}

impl From<ResultCeiling> for i64 {
    fn from(value: ResultCeiling) -> Self {
        match value {
            ResultCeiling::Limited(max) => i64::from(max),
            ResultCeiling::Unlimited => -1,
        }
    }
}

/// Entitlement injected by the host once per session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicensePolicy {
    pub tier: LicenseTier,
    #[serde(rename = "max_results")]
    pub ceiling: ResultCeiling,
}

impl Default for LicensePolicy {
    fn default() -> Self {
        Self {
            tier: LicenseTier::Other("unknown".to_string()),
            ceiling: ResultCeiling::Limited(DEFAULT_CEILING),
        }
    }
}

/// Presentation state of the max results input for a policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputAffordance {
    pub lock_visible: bool,
    pub display_bound: u32,
    pub tooltip: String,
    pub lock_tooltip: Option<String>,
}

impl InputAffordance {
    pub fn for_policy(policy: &LicensePolicy) -> Self {
        match policy.ceiling {
            ResultCeiling::Unlimited => Self {
                lock_visible: false,
                display_bound: UNLIMITED_DISPLAY_BOUND,
                tooltip: format!("Unlimited ({} License)", policy.tier.label()),
                lock_tooltip: None,
            },
            ResultCeiling::Limited(max) => Self {
                lock_visible: true,
                display_bound: max,
                tooltip: format!("Maximum: {max} results"),
                lock_tooltip: Some(format!(
                    "Maximum: {max} results ({} License)",
                    policy.tier.as_str().to_uppercase()
                )),
            },
        }
    }

    /// Clamp a value typed into the input against the advertised bound.
    pub fn clamp_draft(&self, value: u32) -> (u32, bool) {
        if value > self.display_bound {
            (self.display_bound, true)
        } else {
            (value, false)
        }
    }
}

impl Default for InputAffordance {
    fn default() -> Self {
        Self::for_policy(&LicensePolicy::default())
    }
}

/// Job parameters as typed by the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawJobConfig {
    pub keyword: String,
    pub location: String,
    pub max_results: u32,
    pub headless: bool,
    pub exclude_website: bool,
}

impl Default for RawJobConfig {
    fn default() -> Self {
        Self {
            keyword: String::new(),
            location: String::new(),
            max_results: DEFAULT_MAX_RESULTS,
            headless: true,
            exclude_website: false,
        }
    }
}

/// Job parameters that passed the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobConfig {
    pub keyword: String,
    pub location: String,
    pub max_results: u32,
    pub headless: bool,
    pub exclude_website: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Validated {
    pub config: JobConfig,
    pub was_clamped: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Keyword,
    Location,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Keyword => write!(f, "Keyword"),
            Field::Location => write!(f, "Location"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(Field),
}

/// Check required fields and clamp `max_results` to the licence ceiling.
pub fn validate(raw: &RawJobConfig, policy: &LicensePolicy) -> Result<Validated, ValidationError> {
    let keyword = required(&raw.keyword, Field::Keyword)?;
    let location = required(&raw.location, Field::Location)?;
    let (max_results, was_clamped) = policy.ceiling.clamp(raw.max_results);

    Ok(Validated {
        config: JobConfig {
            keyword,
            location,
            max_results,
            headless: raw.headless,
            exclude_website: raw.exclude_website,
        },
        was_clamped,
    })
}

fn required(value: &str, field: Field) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(trimmed.to_string())
}
