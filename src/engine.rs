use std::time::Instant;

use glam::Vec3;
use tracing::{debug, trace};

use crate::api::{Agent, CameraFeedback, CollisionObserver, ShieldCapability};
use crate::classifier::ContactClassifier;
use crate::config::{positive, validate_query_reach, DetectionMode, EngineConfig};
use crate::culling::CullingPolicy;
use crate::error::ConfigError;
use crate::grace::{GraceArbiter, GraceDecision, GraceState};
use crate::recency::RecencySet;
use crate::sampler::ContactSampler;
use crate::spatial::SpatialIndex;
use crate::types::*;
use crate::world::ProxyWorld;

/// External collaborators, injected at construction.
pub struct Collaborators {
    pub agent: Box<dyn Agent>,
    pub shield: Option<Box<dyn ShieldCapability>>,
    pub camera: Option<Box<dyn CameraFeedback>>,
}

impl Collaborators {
    pub fn new(agent: impl Agent + 'static) -> Self {
        Self {
            agent: Box::new(agent),
            shield: None,
            camera: None,
        }
    }

    pub fn with_shield(mut self, shield: impl ShieldCapability + 'static) -> Self {
        self.shield = Some(Box::new(shield));
        self
    }

    pub fn with_camera(mut self, camera: impl CameraFeedback + 'static) -> Self {
        self.camera = Some(Box::new(camera));
        self
    }
}

/// Handle returned by [`CollisionEngine::add_observer`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// Composition root: runs the per-tick pipeline and owns all per-run state.
///
/// Tick order is fixed: grace countdown and recency purge, culling, index
/// rebuild, sampling, classification, arbitration, dispatch.
pub struct CollisionEngine {
    cfg: EngineConfig,
    now: Seconds,

    index: SpatialIndex,
    culling: CullingPolicy,
    sampler: ContactSampler,
    classifier: ContactClassifier,
    arbiter: GraceArbiter,
    recency: RecencySet,

    counters: RunCounters,
    agent_dead: bool,

    collaborators: Collaborators,
    observers: Vec<(ObserverId, Box<dyn CollisionObserver>)>,
    next_observer: u64,

    // Event buffer, drained by the caller
    events: Vec<CollisionEvent>,
    last_timing: Option<TickTiming>,
}

impl CollisionEngine {
    pub fn new(cfg: EngineConfig, collaborators: Collaborators) -> Result<Self, ConfigError> {
        cfg.validate()?;
        Ok(Self {
            index: SpatialIndex::new(cfg.grid_size),
            culling: CullingPolicy::new(cfg.culling_distance, cfg.rear_margin, cfg.forward_axis),
            sampler: ContactSampler::new(&cfg)?,
            classifier: ContactClassifier::new(&cfg),
            arbiter: GraceArbiter::new(&cfg),
            recency: RecencySet::new(cfg.recency_window),
            cfg,
            now: 0.0,
            counters: RunCounters::default(),
            agent_dead: false,
            collaborators,
            observers: Vec::new(),
            next_observer: 0,
            events: Vec::new(),
            last_timing: None,
        })
    }

    // --- Registration ------------------------------------------------------

    /// Start tracking a proxy. Double registration is a no-op returning false.
    pub fn register(&mut self, id: ProxyId) -> bool {
        self.index.register(id)
    }

    pub fn unregister(&mut self, id: ProxyId) -> bool {
        self.index.unregister(id)
    }

    /// Observers are invoked in registration order.
    pub fn add_observer(&mut self, observer: impl CollisionObserver + 'static) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn remove_observer(&mut self, id: ObserverId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(oid, _)| *oid != id);
        self.observers.len() != before
    }

    // --- Detection tuning ----------------------------------------------------

    pub fn set_detection_points(&mut self, count: usize) -> Result<(), ConfigError> {
        self.sampler.set_point_count(count)?;
        self.cfg.detection_points = count;
        Ok(())
    }

    pub fn set_detection_radius(&mut self, radius: f32) -> Result<(), ConfigError> {
        positive("detection_radius", radius as f64)?;
        validate_query_reach(radius * self.cfg.multi_point_radius_scale, self.cfg.grid_size)?;
        self.sampler.set_detection_radius(radius)?;
        self.cfg.detection_radius = radius;
        Ok(())
    }

    pub fn set_detection_mode(&mut self, mode: DetectionMode) {
        self.sampler.set_mode(mode);
        self.cfg.detection_mode = mode;
    }

    // --- Tick ------------------------------------------------------------------

    /// Advance the engine clock by `dt` seconds and run one detection pass.
    ///
    /// Once the agent has died, ticks only advance the clock until [`CollisionEngine::reset`].
    pub fn tick(&mut self, world: &mut ProxyWorld, agent: Vec3, dt: Seconds) -> TickReport {
        let dt = dt.max(0.0);
        self.now += dt;
        let now = self.now;
        let mut report = TickReport {
            now,
            ..Default::default()
        };
        if self.agent_dead {
            report.agent_dead = true;
            return report;
        }

        let timing = self.cfg.enable_timing;
        let t_all = if timing { Some(Instant::now()) } else { None };

        self.arbiter.tick(dt);
        self.recency.purge(now);

        let t0 = if timing { Some(Instant::now()) } else { None };
        report.cull = self.culling.cull(agent, self.index.tracked(), world);
        let cull_ms = elapsed_ms(t0);

        let t1 = if timing { Some(Instant::now()) } else { None };
        self.index.rebuild(world);
        let rebuild_ms = elapsed_ms(t1);

        let t2 = if timing { Some(Instant::now()) } else { None };
        let contacts = self.sampler.sample(agent, &self.index, world, now);
        report.raw_contacts = contacts.len();
        let sample_ms = elapsed_ms(t2);

        let t3 = if timing { Some(Instant::now()) } else { None };
        for contact in &contacts {
            if self.agent_dead {
                break;
            }
            self.process_contact(world, contact, now, &mut report);
        }
        let dispatch_ms = elapsed_ms(t3);

        report.agent_dead = self.agent_dead;
        if let Some(t_all) = t_all {
            let t = TickTiming {
                tick_ms: t_all.elapsed().as_secs_f64() * 1000.0,
                cull_ms,
                rebuild_ms,
                sample_ms,
                dispatch_ms,
            };
            self.last_timing = Some(t);
            report.timing = Some(t);
        }
        trace!(
            now,
            raw = report.raw_contacts,
            accepted = report.accepted,
            indexed = self.index.stats().indexed,
            "tick"
        );
        report
    }

    fn process_contact(
        &mut self,
        world: &mut ProxyWorld,
        contact: &Contact,
        now: Seconds,
        report: &mut TickReport,
    ) {
        // May have been broken or despawned earlier in this tick
        let Some(proxy) = world.get(contact.proxy).copied() else {
            return;
        };
        let Some(label) = self.classifier.accept(contact, &proxy, now) else {
            return;
        };
        if !self.recency.insert(contact.proxy, now) {
            return;
        }
        report.accepted += 1;
        self.counters.total_collisions += 1;

        match label {
            ContactLabel::Obstacle => {
                let outcome = self.resolve_obstacle(world, contact.proxy, now);
                report.obstacle_outcomes.push((contact.proxy, outcome));
            }
            ContactLabel::Collectible | ContactLabel::PowerUp => {
                self.counters.collectibles_collected += 1;
                if label == ContactLabel::PowerUp {
                    self.counters.power_ups_collected += 1;
                }
                self.emit(CollisionEvent::CollisionOccurred {
                    proxy: contact.proxy,
                    label,
                    at: now,
                });
                if let Some(kind) = proxy.collectible {
                    self.emit(CollisionEvent::Collected {
                        proxy: contact.proxy,
                        kind,
                        at: now,
                    });
                }
            }
            // Unreachable while `should_process` gates on the collision mask;
            // kept for direct `ContactClassifier::label` callers.
            ContactLabel::Unknown => {
                self.emit(CollisionEvent::CollisionOccurred {
                    proxy: contact.proxy,
                    label,
                    at: now,
                });
            }
        }
    }

    /// Shield, then special break, then grace arbitration; otherwise lethal.
    fn resolve_obstacle(
        &mut self,
        world: &mut ProxyWorld,
        id: ProxyId,
        now: Seconds,
    ) -> ObstacleOutcome {
        let absorbed = self
            .collaborators
            .shield
            .as_mut()
            .is_some_and(|shield| shield.try_absorb_damage());
        if absorbed {
            self.counters.shield_absorbs += 1;
            debug!(?id, "shield absorbed obstacle");
            self.emit(CollisionEvent::ShieldAbsorbed { proxy: id, at: now });
            return ObstacleOutcome::ShieldAbsorbed;
        }

        let action = self.collaborators.agent.action_context();
        let broken = world
            .breakable_mut(id)
            .is_some_and(|b| b.handle_special_break(&action));
        if broken {
            world.despawn(id);
            self.index.unregister(id);
            self.counters.obstacles_broken += 1;
            debug!(?id, "obstacle broken");
            self.emit(CollisionEvent::ObstacleBroken { proxy: id, at: now });
            return ObstacleOutcome::Broken;
        }

        match self.arbiter.arbitrate(now, action) {
            GraceDecision::Granted => {
                self.counters.grace_periods_used += 1;
                let uses_this_run = self.arbiter.state().uses_this_run;
                self.emit(CollisionEvent::GraceUsed { proxy: id, uses_this_run, at: now });
                ObstacleOutcome::GraceGranted
            }
            GraceDecision::WithinWindow => ObstacleOutcome::GraceWindow,
            GraceDecision::Refused(_) => {
                self.kill(id, now);
                ObstacleOutcome::Lethal
            }
        }
    }

    fn kill(&mut self, id: ProxyId, now: Seconds) {
        self.counters.obstacles_hit += 1;
        self.emit(CollisionEvent::CollisionOccurred {
            proxy: id,
            label: ContactLabel::Obstacle,
            at: now,
        });
        self.collaborators.agent.die();
        self.agent_dead = true;
        debug!(?id, now, "agent killed by obstacle");
        self.emit(CollisionEvent::PlayerDied { proxy: id, at: now });
        if let Some(camera) = self.collaborators.camera.as_mut() {
            camera.shake(self.cfg.death_shake_intensity, self.cfg.death_shake_duration);
        }
    }

    fn emit(&mut self, event: CollisionEvent) {
        for (_, observer) in self.observers.iter_mut() {
            observer.on_event(&event);
        }
        self.events.push(event);
    }

    // --- Lifecycle -------------------------------------------------------------

    /// Clear counters, recency, grace and last-contact state, and revive the run. Idempotent.
    pub fn reset(&mut self) {
        self.counters = RunCounters::default();
        self.recency.clear();
        self.arbiter.reset();
        self.classifier.reset();
        self.events.clear();
        self.agent_dead = false;
        debug!(now = self.now, "collision engine reset");
    }

    /// Drain and return the events emitted since the last drain.
    pub fn drain_events(&mut self) -> Vec<CollisionEvent> {
        std::mem::take(&mut self.events)
    }

    // --- Inspection ------------------------------------------------------------

    pub fn now(&self) -> Seconds {
        self.now
    }

    pub fn counters(&self) -> RunCounters {
        self.counters
    }

    pub fn grace_state(&self) -> GraceState {
        self.arbiter.state()
    }

    pub fn is_agent_dead(&self) -> bool {
        self.agent_dead
    }

    pub fn last_collision_time(&self) -> Option<Seconds> {
        self.classifier.last_collision_time()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.cfg
    }

    /// World-space sample origins for debug drawing.
    pub fn query_origins(&self, agent: Vec3) -> Vec<Vec3> {
        self.sampler.query_origins(agent)
    }

    pub fn index_stats(&self) -> IndexStats {
        self.index.stats()
    }

    /// Return timing breakdown for the last tick, when instrumentation is enabled.
    pub fn timing(&self) -> Option<TickTiming> {
        self.last_timing
    }
}

fn elapsed_ms(start: Option<Instant>) -> f64 {
    start.map(|t| t.elapsed().as_secs_f64() * 1000.0).unwrap_or(0.0)
}
