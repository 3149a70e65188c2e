//! Core library for the Kruize MCP mock tuning service
//!
//! This crate provides:
//! - The workload request and recommendation data model
//! - The JVM tunable catalog and configuration sampling
//! - The simulated HPO loop that produces recommendations
//! - Health checks and observability

pub mod engine;
pub mod error;
pub mod experiment;
pub mod health;
pub mod models;
pub mod observability;
pub mod tunables;

pub use engine::{HpoEngine, TRIALS};
pub use error::{HpoError, Result};
pub use experiment::ExperimentDescriptor;
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{ServiceMetrics, StructuredLogger};
pub use tunables::{Tunable, TunableConfig, TunableKind, TunableValue};
