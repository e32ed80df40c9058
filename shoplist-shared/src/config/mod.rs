//! # Configuration
//!
//! Client configuration: where the API lives, where durable client state is
//! kept, and how chatty logging should be.

pub mod client;

pub use client::{ClientConfig, ConfigError, ConfigFormat};
