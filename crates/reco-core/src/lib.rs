//! reco-core — shared types, configuration, and the backend client for reco.
//!
//! # Architecture
//!
//! ```text
//! Query form ──► RecommendClient ──► backend POST /recomendar
//!                      │
//!                      └──► Vec<Recommendation> ──► UI
//! ```
//!
//! The client is the only component that talks to the network. The UI drives
//! the main thread; the in-flight request runs on a background tokio task and
//! reports back over a channel.

pub mod client;
pub mod config;
pub mod types;

pub use client::{RecommendClient, RequestError};
pub use types::{format_score, Recommendation};
