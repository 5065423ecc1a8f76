//! Foundational types: configuration, paths, outcomes, errors.

pub mod config;
pub mod error;
pub mod path;
pub mod result;
