//! Wire types shared by the request coordinator, the form helpers and the CLI.
//!
//! Field names follow the service's camelCase JSON. The response envelope is
//! discriminated by a boolean `success` field, which serde cannot use as an
//! enum tag directly, so [`CookingResponse`] goes through a flat
//! [`RawCookingResponse`] on both directions.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Outbound payload for `POST /cooking`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookingRequest {
    /// Free-form ingredient or preference description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Bare base64 JPEG payload (no `data:` prefix).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Number of recipes to suggest, 1-5.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipe_count: Option<u8>,
    /// Ask the service to use every listed ingredient.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_all_ingredients: Option<bool>,
}

/// Recipe difficulty.
///
/// The service historically emitted Japanese labels; those are accepted on
/// input and normalized to the English variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[serde(alias = "簡単")]
    Easy,
    #[serde(alias = "普通")]
    Normal,
    #[serde(alias = "難しい")]
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        };
        f.write_str(label)
    }
}

/// A single suggested dish.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    /// Dish name; also the display key within one response.
    pub title: String,
    pub difficulty: Difficulty,
    /// Minutes.
    pub cooking_time: u32,
    pub ingredients: Vec<String>,
    /// Steps in order, usually prefixed `"N. "`.
    pub instructions: Vec<String>,
}

impl Recipe {
    /// Instructions split into ordinal and text for display.
    pub fn steps(&self) -> Vec<InstructionStep<'_>> {
        self.instructions
            .iter()
            .map(|s| InstructionStep::parse(s))
            .collect()
    }
}

static STEP_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\.\s*(.*)$").expect("step prefix pattern is valid"));

/// One instruction with its cosmetic `"N. "` prefix separated out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstructionStep<'a> {
    pub number: Option<u32>,
    pub text: &'a str,
}

impl<'a> InstructionStep<'a> {
    /// Parse `"3. Simmer"` into `(Some(3), "Simmer")`. Unprefixed lines, or
    /// ordinals too large for `u32`, keep the whole line as text.
    pub fn parse(line: &'a str) -> Self {
        STEP_PREFIX
            .captures(line)
            .and_then(|caps| {
                let number = caps.get(1)?.as_str().parse().ok()?;
                let text = caps.get(2).map_or("", |m| m.as_str());
                Some(Self {
                    number: Some(number),
                    text,
                })
            })
            .unwrap_or(Self {
                number: None,
                text: line,
            })
    }
}

/// Per-field validation message reported by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

/// Response envelope of `POST /cooking`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCookingResponse", into = "RawCookingResponse")]
pub enum CookingResponse {
    Success {
        message: String,
        recipes: Vec<Recipe>,
        /// Served from the service's cache rather than freshly generated.
        cached: bool,
    },
    Failure {
        message: String,
        /// Machine-readable code such as `NO_INGREDIENTS`.
        code: Option<String>,
        errors: Option<Vec<ValidationError>>,
        /// Free-form diagnostic.
        error: Option<String>,
    },
}

impl CookingResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, CookingResponse::Success { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            CookingResponse::Success { message, .. } | CookingResponse::Failure { message, .. } => {
                message
            }
        }
    }
}

/// Flat wire shape of [`CookingResponse`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCookingResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<Recipe>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ValidationError>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TryFrom<RawCookingResponse> for CookingResponse {
    type Error = String;

    fn try_from(raw: RawCookingResponse) -> Result<Self, Self::Error> {
        if raw.success {
            let recipes = raw
                .data
                .ok_or_else(|| "success response is missing `data`".to_string())?;
            Ok(CookingResponse::Success {
                message: raw.message,
                recipes,
                cached: raw.cached.unwrap_or(false),
            })
        } else {
            Ok(CookingResponse::Failure {
                message: raw.message,
                code: raw.code,
                errors: raw.errors,
                error: raw.error,
            })
        }
    }
}

impl From<CookingResponse> for RawCookingResponse {
    fn from(response: CookingResponse) -> Self {
        match response {
            CookingResponse::Success {
                message,
                recipes,
                cached,
            } => RawCookingResponse {
                success: true,
                message,
                data: Some(recipes),
                cached: Some(cached),
                code: None,
                errors: None,
                error: None,
            },
            CookingResponse::Failure {
                message,
                code,
                errors,
                error,
            } => RawCookingResponse {
                success: false,
                message,
                data: None,
                cached: None,
                code,
                errors,
                error,
            },
        }
    }
}
