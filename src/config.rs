//! Engine configuration and its load-time validation.
//!
//! Every field has a default so partial JSON documents load. Nothing here is
//! clamped: an out-of-range value is a [`ConfigError`] before any tick runs.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{CategoryMask, ProxyId, Seconds};

pub const MIN_DETECTION_POINTS: usize = 3;
pub const MAX_DETECTION_POINTS: usize = 12;
/// Widest query, in grid cells from the center cell, a config may ask for.
pub const MAX_QUERY_REACH_CELLS: i32 = 64;

/// Detection strategy used by the sampler.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMode {
    #[default]
    MultiPoint,
    SinglePoint,
}

/// Physical extents of the agent, used by single-point detection.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentBody {
    /// Controller radius (world units).
    pub radius: f32,
    /// Height of the body center above the agent position.
    pub center_height: f32,
}

impl Default for AgentBody {
    fn default() -> Self {
        Self {
            radius: 0.5,
            center_height: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // --- Detection ---------------------------------------------------------
    pub detection_mode: DetectionMode,
    pub detection_points: usize,
    /// Ring radius for the multi-point sampler.
    pub detection_radius: f32,
    /// Per-point query radius is `detection_radius * multi_point_radius_scale`.
    pub multi_point_radius_scale: f32,
    /// Single-point query radius is `body.radius * single_point_radius_scale`.
    pub single_point_radius_scale: f32,
    pub body: AgentBody,
    /// The agent's own proxy, if it is registered in the world.
    pub self_proxy: Option<ProxyId>,

    // --- Classification ----------------------------------------------------
    pub obstacle_mask: CategoryMask,
    pub collectible_mask: CategoryMask,
    pub ground_mask: CategoryMask,
    /// Window in which the last processed proxy is ignored.
    pub repeat_window: Seconds,
    /// Orchestrator-level recency window per proxy.
    pub recency_window: Seconds,

    // --- Grace period ------------------------------------------------------
    pub enable_grace_period: bool,
    /// Configured but not consumed by arbitration.
    pub horizontal_grace_distance: f32,
    pub vertical_grace_time: Seconds,
    pub grace_cooldown: Seconds,
    /// 0 means unlimited.
    pub max_grace_periods_per_run: u32,

    // --- Partitioning & culling --------------------------------------------
    pub grid_size: f32,
    pub culling_distance: f32,
    pub rear_margin: f32,
    /// Direction the agent runs in; culling measures distance along it.
    pub forward_axis: Vec3,

    // --- Feedback ----------------------------------------------------------
    pub death_shake_intensity: f32,
    pub death_shake_duration: f32,

    /// Enable internal timing instrumentation (adds small overhead when true).
    pub enable_timing: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            detection_mode: DetectionMode::MultiPoint,
            detection_points: 8,
            detection_radius: 0.5,
            multi_point_radius_scale: 0.5,
            single_point_radius_scale: 0.8,
            body: AgentBody::default(),
            self_proxy: None,
            obstacle_mask: CategoryMask::OBSTACLE,
            collectible_mask: CategoryMask::COLLECTIBLE,
            ground_mask: CategoryMask::GROUND,
            repeat_window: 0.1,
            recency_window: 0.5,
            enable_grace_period: true,
            horizontal_grace_distance: 0.3,
            vertical_grace_time: 0.2,
            grace_cooldown: 1.0,
            max_grace_periods_per_run: 3,
            grid_size: 10.0,
            culling_distance: 100.0,
            rear_margin: 10.0,
            forward_axis: Vec3::Z,
            death_shake_intensity: 0.5,
            death_shake_duration: 0.3,
            enable_timing: false,
        }
    }
}

impl EngineConfig {
    /// Parse a JSON document and validate it.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: EngineConfig = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Categories that can produce contacts at all.
    pub fn collision_mask(&self) -> CategoryMask {
        self.obstacle_mask.union(self.collectible_mask)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_point_count(self.detection_points)?;
        positive("detection_radius", self.detection_radius as f64)?;
        positive("multi_point_radius_scale", self.multi_point_radius_scale as f64)?;
        positive("single_point_radius_scale", self.single_point_radius_scale as f64)?;
        positive("body.radius", self.body.radius as f64)?;
        finite("body.center_height", self.body.center_height as f64)?;
        positive("grid_size", self.grid_size as f64)?;
        positive("culling_distance", self.culling_distance as f64)?;
        non_negative("rear_margin", self.rear_margin as f64)?;
        non_negative("repeat_window", self.repeat_window)?;
        non_negative("recency_window", self.recency_window)?;
        non_negative("grace_cooldown", self.grace_cooldown)?;
        finite("horizontal_grace_distance", self.horizontal_grace_distance as f64)?;
        finite("death_shake_intensity", self.death_shake_intensity as f64)?;
        finite("death_shake_duration", self.death_shake_duration as f64)?;
        if self.enable_grace_period {
            finite("vertical_grace_time", self.vertical_grace_time)?;
            if !(self.vertical_grace_time > 0.0) {
                return Err(ConfigError::NonPositiveGraceDuration(self.vertical_grace_time));
            }
        }
        if self.forward_axis.length_squared() <= f32::EPSILON || !self.forward_axis.is_finite() {
            return Err(ConfigError::ZeroForwardAxis);
        }
        validate_query_reach(
            self.detection_radius * self.multi_point_radius_scale,
            self.grid_size,
        )?;
        validate_query_reach(
            self.body.radius * self.single_point_radius_scale,
            self.grid_size,
        )?;
        Ok(())
    }
}

pub(crate) fn validate_point_count(count: usize) -> Result<(), ConfigError> {
    if !(MIN_DETECTION_POINTS..=MAX_DETECTION_POINTS).contains(&count) {
        return Err(ConfigError::DetectionPointCount {
            count,
            min: MIN_DETECTION_POINTS,
            max: MAX_DETECTION_POINTS,
        });
    }
    Ok(())
}

/// Reject query radii that would make the grid walk more than
/// [`MAX_QUERY_REACH_CELLS`] cells out from the center cell.
pub(crate) fn validate_query_reach(radius: f32, cell_size: f32) -> Result<(), ConfigError> {
    // Also catches an infinite ratio from a vanishing cell size.
    if !(radius / cell_size <= MAX_QUERY_REACH_CELLS as f32) {
        return Err(ConfigError::QueryReach {
            radius,
            cell_size,
            max: MAX_QUERY_REACH_CELLS,
        });
    }
    Ok(())
}

fn finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NonFinite { field, value });
    }
    Ok(())
}

pub(crate) fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value <= 0.0 {
        return Err(ConfigError::NonPositive { field, value });
    }
    Ok(())
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value < 0.0 {
        return Err(ConfigError::Negative { field, value });
    }
    Ok(())
}
