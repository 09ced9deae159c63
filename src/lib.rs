//! softbonk: per-tick contact arbitration with a grace-period leniency window

pub mod types;
pub mod error;
pub mod config;
pub mod api;
pub mod world;
pub mod narrowphase;
pub mod spatial;
pub mod culling;
pub mod sampler;
pub mod classifier;
pub mod grace;
pub mod recency;
pub mod engine;

pub use crate::types::*;
pub use crate::api::*;
pub use crate::config::{AgentBody, DetectionMode, EngineConfig};
pub use crate::engine::{Collaborators, CollisionEngine, ObserverId};
pub use crate::error::ConfigError;
pub use crate::grace::{GraceDecision, GraceState, Refusal};
pub use crate::world::ProxyWorld;
