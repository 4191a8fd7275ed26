//! Shared test utilities for reco integration harnesses.
//!
//! Declare `mod common;` at the top of each harness file and import the
//! helpers it needs by path (`common::fake_backend::FakeBackend`, ...).

#![allow(dead_code)]

pub mod builders;
pub mod fake_backend;
