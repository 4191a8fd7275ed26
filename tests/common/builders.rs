//! Test builders — ergonomic constructors for recommendation fixtures.
//!
//! These helpers are designed for readability in test assertions, not for
//! production use.

use reco_core::Recommendation;

/// Shorthand constructor for a [`Recommendation`].
pub fn recommendation(entidad: &str, score: f64) -> Recommendation {
    Recommendation {
        entidad: entidad.to_string(),
        score,
    }
}

/// A plausible ranked list with descending scores, `n` entries long.
pub fn ranked_list(n: usize) -> Vec<Recommendation> {
    (0..n)
        .map(|i| recommendation(&format!("ENTIDAD {}", i + 1), 1.0 - i as f64 / n as f64))
        .collect()
}
