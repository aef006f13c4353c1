//! Core engine services

pub mod config;

pub use config::{ConfigError, PhysicsConfig};
