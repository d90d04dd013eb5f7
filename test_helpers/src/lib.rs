//! Test helpers shared across crates.
//!
//! This crate provides temporary layer directories and utilities for
//! exercising deeply nested documents.

pub mod deep;
pub mod layers;
