//! Tiered recovery of structured data from raw model text.
//!
//! The prompt demands strict JSON but the model is free to wrap it in prose
//! or truncate. Three tiers, first success wins: parse the whole text,
//! parse the widest brace-delimited span, then synthesize a default. The
//! caller always gets a well-formed result; malformed output never becomes
//! an error response.

use serde::{Deserialize, Deserializer};

use crate::riddle::{Mode, RiddleResult};

pub const FALLBACK_RIDDLE: &str = "I couldn't generate a riddle for this one.";
pub const FALLBACK_HINT: &str = "Try a clearer image with a distinct subject.";
const UNKNOWN_FOCUS: &str = "unknown";

/// The shape we try to pull out of the raw text. Only `riddle` is
/// mandatory; the model occasionally drops a key even when told not to,
/// and a missing or bogus `difficulty` falls back to the requested mode.
#[derive(Debug, Deserialize)]
struct ModelRiddle {
    riddle: String,
    #[serde(default)]
    solution: String,
    #[serde(default)]
    focus: String,
    #[serde(default, deserialize_with = "lenient_mode")]
    difficulty: Option<Mode>,
    #[serde(default)]
    answer: String,
}

fn lenient_mode<'de, D>(deserializer: D) -> Result<Option<Mode>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .and_then(Mode::parse))
}

pub fn recover(raw_text: &str, mode: Mode, include_solution: bool) -> RiddleResult {
    let raw = raw_text.trim();
    let parsed = parse_direct(raw)
        .or_else(|| parse_embedded(raw))
        .unwrap_or_else(|| synthetic(raw, mode, include_solution));
    finish(parsed, mode, include_solution)
}

fn parse_direct(raw: &str) -> Option<ModelRiddle> {
    serde_json::from_str(raw).ok()
}

/// Greedy span: leftmost `{` to rightmost `}`. A second JSON fragment or a
/// stray trailing brace poisons the span and drops us to the synthetic
/// tier; that matches how the service has always behaved.
fn parse_embedded(raw: &str) -> Option<ModelRiddle> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&raw[start..=end]).ok()
}

fn synthetic(raw: &str, mode: Mode, include_solution: bool) -> ModelRiddle {
    ModelRiddle {
        riddle: if raw.is_empty() {
            FALLBACK_RIDDLE.to_string()
        } else {
            raw.to_string()
        },
        solution: if include_solution {
            FALLBACK_HINT.to_string()
        } else {
            String::new()
        },
        focus: UNKNOWN_FOCUS.to_string(),
        difficulty: Some(mode),
        answer: String::new(),
    }
}

fn finish(parsed: ModelRiddle, mode: Mode, include_solution: bool) -> RiddleResult {
    let difficulty = parsed.difficulty.unwrap_or(mode);
    if include_solution {
        RiddleResult::WithSolution {
            riddle: parsed.riddle,
            solution: parsed.solution,
            focus: parsed.focus,
            difficulty,
            answer: parsed.answer,
        }
    } else {
        RiddleResult::WithoutSolution {
            riddle: parsed.riddle,
            focus: parsed.focus,
            difficulty,
        }
    }
}
