use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Seconds on the engine clock. The clock only advances through `tick(dt)`.
pub type Seconds = f64;

/// Handle to a proxy owned by the surrounding world.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProxyId(pub u64);

/// Classification category carried by every proxy.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    None,
    Obstacle,
    Collectible,
    Ground,
}

impl Category {
    /// Bit this category occupies in a [`CategoryMask`].
    pub const fn bit(self) -> u32 {
        match self {
            Category::None => 1 << 0,
            Category::Obstacle => 1 << 1,
            Category::Collectible => 1 << 2,
            Category::Ground => 1 << 3,
        }
    }
}

/// Bitmask-based category membership.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryMask(pub u32);

impl CategoryMask {
    pub const EMPTY: Self = Self(0);
    pub const OBSTACLE: Self = Self(Category::Obstacle.bit());
    pub const COLLECTIBLE: Self = Self(Category::Collectible.bit());
    pub const GROUND: Self = Self(Category::Ground.bit());

    pub const fn union(self, other: CategoryMask) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn contains(self, category: Category) -> bool {
        (self.0 & category.bit()) != 0
    }
}

/// Power-up flavours. The engine only cares that they are power-ups.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerUpKind {
    Magnet,
    Shield,
    SpeedBoost,
    ScoreMultiplier,
}

/// Sub-type of a collectible proxy.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectibleKind {
    Coin,
    Gem,
    PowerUp(PowerUpKind),
}

impl CollectibleKind {
    pub fn is_power_up(self) -> bool {
        matches!(self, CollectibleKind::PowerUp(_))
    }
}

/// One physical proxy as the engine sees it.
#[derive(Copy, Clone, Debug)]
pub struct Proxy {
    pub position: Vec3,
    /// Bounding sphere radius used by the exact overlap re-filter.
    pub radius: f32,
    pub enabled: bool,
    pub category: Category,
    pub is_trigger: bool,
    /// Only meaningful for `Category::Collectible`.
    pub collectible: Option<CollectibleKind>,
}

impl Proxy {
    pub fn obstacle(position: Vec3, radius: f32) -> Self {
        Self {
            position,
            radius,
            enabled: true,
            category: Category::Obstacle,
            is_trigger: false,
            collectible: None,
        }
    }

    pub fn collectible(position: Vec3, radius: f32, kind: CollectibleKind) -> Self {
        Self {
            position,
            radius,
            enabled: true,
            category: Category::Collectible,
            is_trigger: false,
            collectible: Some(kind),
        }
    }

    pub fn ground(position: Vec3, radius: f32) -> Self {
        Self {
            position,
            radius,
            enabled: true,
            category: Category::Ground,
            is_trigger: false,
            collectible: None,
        }
    }

    /// Builder-style trigger flag.
    pub fn as_trigger(mut self) -> Self {
        self.is_trigger = true;
        self
    }
}

/// A single detected overlap, valid for one tick.
#[derive(Copy, Clone, Debug)]
pub struct Contact {
    pub proxy: ProxyId,
    /// Representative point on the sample sphere's surface (approximate).
    pub point: Vec3,
    pub timestamp: Seconds,
    pub category: Category,
}

/// Overlap result between two spheres.
#[derive(Copy, Clone, Debug)]
pub struct Overlap {
    /// Separating normal pointing from B into A (zero for coincident centers).
    pub normal: Vec3,
    /// Penetration depth (≥ 0).
    pub depth: f32,
    pub contact: Vec3,
}

/// Label produced by the classifier.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ContactLabel {
    Obstacle,
    Collectible,
    PowerUp,
    Unknown,
}

/// Snapshot of the agent's dodge actions, taken once per contact resolution.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ActionContext {
    pub sliding: bool,
    pub crouching: bool,
    pub jumping: bool,
}

impl ActionContext {
    /// True when any dodge-type action is in progress.
    pub fn is_dodging(self) -> bool {
        self.sliding || self.crouching || self.jumping
    }
}

/// How an obstacle contact was resolved.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ObstacleOutcome {
    ShieldAbsorbed,
    Broken,
    GraceGranted,
    /// Tolerated inside an already active grace window.
    GraceWindow,
    Lethal,
}

/// Outward events, delivered to observers in registration order.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum CollisionEvent {
    /// An accepted contact was dispatched. For obstacles this fires on the lethal path.
    CollisionOccurred { proxy: ProxyId, label: ContactLabel, at: Seconds },
    GraceUsed { proxy: ProxyId, uses_this_run: u32, at: Seconds },
    PlayerDied { proxy: ProxyId, at: Seconds },
    ShieldAbsorbed { proxy: ProxyId, at: Seconds },
    ObstacleBroken { proxy: ProxyId, at: Seconds },
    Collected { proxy: ProxyId, kind: CollectibleKind, at: Seconds },
}

/// Per-run totals. Only `reset()` clears them.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunCounters {
    pub total_collisions: u32,
    pub obstacles_hit: u32,
    pub collectibles_collected: u32,
    pub power_ups_collected: u32,
    pub grace_periods_used: u32,
    pub shield_absorbs: u32,
    pub obstacles_broken: u32,
}

/// Debug statistics for the current spatial index.
#[derive(Copy, Clone, Debug, Default)]
pub struct IndexStats {
    pub tracked: usize,
    pub indexed: usize,
    pub cells: usize,
    /// Largest single-cell population.
    pub max_cell_len: usize,
}

/// Result of one culling pass.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct CullStats {
    pub enabled: usize,
    pub disabled: usize,
    /// Tracked ids that no longer resolve in the world.
    pub stale: usize,
}

/// Timing breakdown for the last tick.
#[derive(Copy, Clone, Debug, Default)]
pub struct TickTiming {
    pub tick_ms: f64,
    pub cull_ms: f64,
    pub rebuild_ms: f64,
    pub sample_ms: f64,
    pub dispatch_ms: f64,
}

/// Summary of what a tick did.
#[derive(Clone, Debug, Default)]
pub struct TickReport {
    pub now: Seconds,
    pub cull: CullStats,
    pub raw_contacts: usize,
    pub accepted: usize,
    pub obstacle_outcomes: Vec<(ProxyId, ObstacleOutcome)>,
    /// True once a lethal resolution ended the run.
    pub agent_dead: bool,
    pub timing: Option<TickTiming>,
}
