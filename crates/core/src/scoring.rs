//! Coach score schema, reply normalization and XP thresholds.
//!
//! The upstream model is asked for JSON but nothing about its reply is
//! trusted: every field is defaulted, clamped or dropped here, and a reply
//! that cannot be read at all degrades to a neutral, still-valid result.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Highest total a score can report.
pub const MAX_TOTAL: i64 = 100;
/// Total at or above which a submission earns [`XP_HIGH`].
pub const HIGH_SCORE_THRESHOLD: i64 = 80;
/// Total at or above which a submission earns [`XP_PASS`].
pub const PASS_SCORE_THRESHOLD: i64 = 60;

pub const XP_HIGH: i64 = 150;
pub const XP_PASS: i64 = 60;
pub const XP_BASE: i64 = 20;

/// Total reported when the reply could not be read.
pub const FALLBACK_TOTAL: i64 = 50;

/// XP awarded for a scored submission.
pub fn xp_for_total(total: i64) -> i64 {
    if total >= HIGH_SCORE_THRESHOLD {
        XP_HIGH
    } else if total >= PASS_SCORE_THRESHOLD {
        XP_PASS
    } else {
        XP_BASE
    }
}

/// Clamp a total into `[0, MAX_TOTAL]`.
pub fn clamp_total(total: i64) -> i64 {
    total.clamp(0, MAX_TOTAL)
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// One named rubric criterion with its maximum points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RubricItem {
    pub name: String,
    /// Fractional maxima from the client are rounded to whole points.
    #[serde(deserialize_with = "whole_points")]
    pub max: i64,
}

fn whole_points<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let points = f64::deserialize(deserializer)?;
    if !points.is_finite() {
        return Err(serde::de::Error::custom("rubric max must be a finite number"));
    }
    Ok(points.round() as i64)
}

/// A deliverable to score. Fields are optional so that missing input is
/// reported as a validation error rather than a body-parsing failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoreRequest {
    #[serde(default)]
    pub deliverable: Option<String>,
    #[serde(default)]
    pub rubric: Option<Vec<RubricItem>>,
    #[serde(default)]
    pub context: Option<Value>,
    #[serde(default)]
    pub model: Option<String>,
}

impl ScoreRequest {
    /// Check that a non-blank deliverable and a usable rubric are present.
    pub fn validate(&self) -> Result<(&str, &[RubricItem]), CoreError> {
        let deliverable = self
            .deliverable
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .ok_or_else(|| CoreError::Validation("Missing deliverable".into()))?;

        let rubric = self
            .rubric
            .as_deref()
            .filter(|r| !r.is_empty())
            .ok_or_else(|| CoreError::Validation("Missing rubric".into()))?;

        if let Some(bad) = rubric
            .iter()
            .find(|item| item.name.trim().is_empty() || item.max <= 0)
        {
            return Err(CoreError::Validation(format!(
                "Rubric item '{}' needs a name and a positive max",
                bad.name
            )));
        }

        Ok((deliverable, rubric))
    }

    /// Context object sent upstream; an absent context becomes `{}`.
    pub fn context_or_empty(&self) -> Value {
        match &self.context {
            Some(Value::Null) | None => Value::Object(Map::new()),
            Some(ctx) => ctx.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemScore {
    pub name: String,
    pub score: i64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResult {
    pub scores: Vec<ItemScore>,
    pub total: i64,
    pub summary: String,
    pub actions: Vec<String>,
    pub xp_awarded: i64,
}

impl ScoreResult {
    /// Zero-score result for when scoring could not run at all.
    pub fn unavailable(summary: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            scores: Vec::new(),
            total: 0,
            summary: summary.into(),
            actions: vec![action.into()],
            xp_awarded: 0,
        }
    }

    /// Neutral result for a reply that could not be read.
    pub fn degraded(rubric: &[RubricItem]) -> Self {
        Self {
            scores: neutral_scores(rubric),
            total: FALLBACK_TOTAL,
            summary: "The coach reply could not be read, so a neutral score was recorded."
                .into(),
            actions: vec!["Resubmit to get detailed feedback.".into()],
            xp_awarded: xp_for_total(FALLBACK_TOTAL),
        }
    }
}

fn neutral_scores(rubric: &[RubricItem]) -> Vec<ItemScore> {
    rubric
        .iter()
        .map(|item| ItemScore {
            name: item.name.clone(),
            score: item.max / 2,
            reason: "Not scored".into(),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Reply normalization
// ---------------------------------------------------------------------------

/// Turn the raw model reply into a [`ScoreResult`].
///
/// Per-item scores are clamped to `[0, rubric max]`; items not in the rubric
/// are clamped to `[0, MAX_TOTAL]`. A missing total falls back to the sum of
/// the item scores, or [`FALLBACK_TOTAL`] if there are none. Anything that is
/// not a JSON object yields [`ScoreResult::degraded`].
pub fn normalize_reply(raw: &str, rubric: &[RubricItem]) -> ScoreResult {
    let obj = match serde_json::from_str::<Value>(strip_code_fence(raw)) {
        Ok(Value::Object(obj)) => obj,
        _ => return ScoreResult::degraded(rubric),
    };

    let parsed = parse_scores(obj.get("scores"), rubric);

    let total = match obj.get("total").and_then(as_number) {
        Some(total) => clamp_total(total.round() as i64),
        None if !parsed.is_empty() => clamp_total(
            parsed
                .iter()
                .fold(0i64, |sum, item| sum.saturating_add(item.score)),
        ),
        None => FALLBACK_TOTAL,
    };

    let scores = if parsed.is_empty() {
        neutral_scores(rubric)
    } else {
        parsed
    };

    let summary = obj
        .get("summary")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string();

    let actions = obj
        .get("actions")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default();

    ScoreResult {
        scores,
        total,
        summary,
        actions,
        xp_awarded: xp_for_total(total),
    }
}

fn parse_scores(value: Option<&Value>, rubric: &[RubricItem]) -> Vec<ItemScore> {
    let Some(items) = value.and_then(Value::as_array) else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| {
            let obj = item.as_object()?;
            let name = obj.get("name")?.as_str()?.trim();
            if name.is_empty() {
                return None;
            }
            let raw = obj.get("score").and_then(as_number).unwrap_or(0.0).round() as i64;
            let max = rubric
                .iter()
                .find(|r| r.name == name)
                .map_or(MAX_TOTAL, |r| r.max);
            let reason = obj
                .get("reason")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
            Some(ItemScore {
                name: name.to_string(),
                score: raw.clamp(0, max),
                reason,
            })
        })
        .collect()
}

/// Numbers sometimes come back as strings ("85").
fn as_number(value: &Value) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
        .filter(|n: &f64| n.is_finite())
}

/// Remove a surrounding Markdown code fence, if any.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}
