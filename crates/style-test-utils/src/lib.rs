//! Shared test fixtures for the Style Sync workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`fixture`]: [`StyleFixture`] working directory builder
//! - [`samples`]: small rule and catalog files used across suites

pub mod fixture;
pub mod samples;

pub use fixture::StyleFixture;
