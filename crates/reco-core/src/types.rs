//! Core types for reco — the backend wire contract and score formatting.
//!
//! Field names follow the backend's JSON (`entidad`, `score`); everything
//! else in the codebase uses these structs, never raw JSON values.

use serde::{Deserialize, Serialize};

/// One ranked candidate returned by the recommendation backend.
///
/// The backend determines the ordering of the list; the client never sorts
/// or filters. `score` is a confidence value in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Label of the suggested entity.
    pub entidad: String,
    /// Confidence that the entity is relevant to the submitted query.
    pub score: f64,
}

/// Request body for `POST /recomendar`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendRequest {
    /// The product or category label the user submitted.
    pub producto: String,
}

/// Render a `[0, 1]` confidence score as a fixed-point percentage.
///
/// Two decimals, no locale: `0.87 → "87.00%"`, `0.0 → "0.00%"`,
/// `1.0 → "100.00%"`.
pub fn format_score(score: f64) -> String {
    format!("{:.2}%", score * 100.0)
}

impl std::fmt::Display for Recommendation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} — {}", self.entidad, format_score(self.score))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
