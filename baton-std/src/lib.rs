//! # baton-std
//!
//! Standard implementations for the baton dispatch engine.
//!
//! This crate provides:
//! - **Path matching**: [`routing::MatchitMatcher`] (feature `matchit`)
//! - **Standard middleware**: [`middleware::Logging`], [`middleware::Timeout`]
//!   (feature `timeout`)
//! - **Testing helpers**: [`testing::Recorder`], [`testing::ExactMatcher`]

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use baton_core;

// Modules
pub mod middleware;
pub mod routing;
pub mod testing;
