//! Reshapes a match's flat metadata into the response record.

use serde::{Deserialize, Serialize};

use crate::types::{Metadata, ScoredMatch};

pub const SUBSTITUTE_PREFIX: &str = "substitute";
pub const SIDE_EFFECT_PREFIX: &str = "sideEffect";
pub const USE_PREFIX: &str = "use";

pub const NO_SUBSTITUTES: &str = "No specific substitutes listed.";
pub const NO_SIDE_EFFECTS: &str = "No specific side effects listed.";
pub const NO_USES: &str = "No specific uses listed.";

/// Value used for absent scalar fields
pub const NOT_AVAILABLE: &str = "N/A";

/// How many indexed keys are probed per list field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeBounds {
    pub substitutes: usize,
    pub side_effects: usize,
    pub uses: usize,
}

impl ProbeBounds {
    /// Column counts of the medicine catalog: `substitute0..4`,
    /// `sideEffect0..41`, `use0..4`
    pub const DEFAULT: Self = Self {
        substitutes: 5,
        side_effects: 42,
        uses: 5,
    };

    /// Bounds implied by a header row (highest index seen + 1 per prefix)
    pub fn from_headers<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut bounds = Self {
            substitutes: 0,
            side_effects: 0,
            uses: 0,
        };

        for header in headers {
            let header = header.as_ref().trim();
            for (prefix, slot) in [
                (SUBSTITUTE_PREFIX, &mut bounds.substitutes),
                (SIDE_EFFECT_PREFIX, &mut bounds.side_effects),
                (USE_PREFIX, &mut bounds.uses),
            ] {
                if let Some(index) = indexed_suffix(header, prefix) {
                    *slot = (*slot).max(index + 1);
                }
            }
        }

        bounds
    }

    /// Whether every indexed column described by `other` is probed by `self`
    pub fn covers(&self, other: &Self) -> bool {
        self.substitutes >= other.substitutes
            && self.side_effects >= other.side_effects
            && self.uses >= other.uses
    }
}

impl Default for ProbeBounds {
    fn default() -> Self {
        Self::DEFAULT
    }
}

fn indexed_suffix(header: &str, prefix: &str) -> Option<usize> {
    let digits = header.strip_prefix(prefix)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Non-empty values of `{prefix}0..{bound}`, in index order
pub fn probe_indexed(metadata: &Metadata, prefix: &str, bound: usize) -> Vec<String> {
    (0..bound)
        .filter_map(|i| metadata.get(&format!("{}{}", prefix, i)))
        .filter(|v| !v.trim().is_empty())
        .cloned()
        .collect()
}

/// Score with exactly two decimals
pub fn format_score(score: f64) -> String {
    format!("{:.2}", score)
}

fn or_placeholder(values: Vec<String>, placeholder: &str) -> Vec<String> {
    if values.is_empty() {
        vec![placeholder.to_string()]
    } else {
        values
    }
}

/// Normalized lookup result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub id: String,
    pub name: String,
    pub substitutes: Vec<String>,
    pub side_effects: Vec<String>,
    pub uses: Vec<String>,
    pub chemical_class: String,
    pub habit_forming: String,
    pub therapeutic_class: String,
    pub action_class: String,
    pub match_score: String,
}

impl ResponseRecord {
    /// Build the record for a match
    ///
    /// `fallback_name` is used when the stored metadata has no `name`.
    /// List fields are never empty.
    pub fn from_match(hit: &ScoredMatch, fallback_name: &str, bounds: &ProbeBounds) -> Self {
        let metadata = &hit.metadata;
        let scalar = |key: &str| {
            metadata
                .get(key)
                .cloned()
                .unwrap_or_else(|| NOT_AVAILABLE.to_string())
        };

        Self {
            id: scalar("id"),
            name: metadata
                .get("name")
                .cloned()
                .unwrap_or_else(|| fallback_name.to_string()),
            substitutes: or_placeholder(
                probe_indexed(metadata, SUBSTITUTE_PREFIX, bounds.substitutes),
                NO_SUBSTITUTES,
            ),
            side_effects: or_placeholder(
                probe_indexed(metadata, SIDE_EFFECT_PREFIX, bounds.side_effects),
                NO_SIDE_EFFECTS,
            ),
            uses: or_placeholder(probe_indexed(metadata, USE_PREFIX, bounds.uses), NO_USES),
            chemical_class: scalar("Chemical Class"),
            habit_forming: scalar("Habit Forming"),
            therapeutic_class: scalar("Therapeutic Class"),
            action_class: scalar("Action Class"),
            match_score: format_score(hit.score),
        }
    }
}
