//! # stride-core
//!
//! Core types, traits, configuration, and error handling for Stride.

pub mod config;
pub mod error;
pub mod links;
pub mod model;
pub mod traits;
