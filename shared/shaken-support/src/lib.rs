//! Shaken Support - Shared service infrastructure for STIR/SHAKEN components
//!
//! This crate provides:
//! - Standard service trait all daemons built on `shaken-core` implement
//! - Error handling utilities
//! - Configuration management

pub mod config;
pub mod error;
pub mod service;

pub use config::ServiceConfig;
pub use error::{Result, ShakenSupportError};
pub use service::{DependencyStatus, HealthStatus, MicroserviceRuntime, ReadinessStatus, ShakenService};
