use std::f32::consts::TAU;

use glam::Vec3;
use tracing::trace;

use crate::config::{validate_point_count, positive, AgentBody, DetectionMode, EngineConfig};
use crate::error::ConfigError;
use crate::narrowphase::Narrowphase;
use crate::spatial::SpatialIndex;
use crate::types::{Contact, Seconds};
use crate::world::ProxyWorld;

/// Samples the agent's surroundings against the spatial index.
pub struct ContactSampler {
    mode: DetectionMode,
    point_count: usize,
    detection_radius: f32,
    multi_point_radius_scale: f32,
    single_point_radius_scale: f32,
    body: AgentBody,
    // Local offsets on the XZ ring, regenerated when count or radius change
    points: Vec<Vec3>,
}

impl ContactSampler {
    pub fn new(cfg: &EngineConfig) -> Result<Self, ConfigError> {
        validate_point_count(cfg.detection_points)?;
        positive("detection_radius", cfg.detection_radius as f64)?;
        let mut sampler = Self {
            mode: cfg.detection_mode,
            point_count: cfg.detection_points,
            detection_radius: cfg.detection_radius,
            multi_point_radius_scale: cfg.multi_point_radius_scale,
            single_point_radius_scale: cfg.single_point_radius_scale,
            body: cfg.body,
            points: Vec::new(),
        };
        sampler.regenerate();
        Ok(sampler)
    }

    fn regenerate(&mut self) {
        let n = self.point_count;
        let r = self.detection_radius;
        self.points = (0..n)
            .map(|i| {
                let angle = TAU * i as f32 / n as f32;
                Vec3::new(angle.cos() * r, 0.0, angle.sin() * r)
            })
            .collect();
    }

    pub fn set_mode(&mut self, mode: DetectionMode) {
        self.mode = mode;
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn set_point_count(&mut self, count: usize) -> Result<(), ConfigError> {
        validate_point_count(count)?;
        if count != self.point_count {
            self.point_count = count;
            self.regenerate();
        }
        Ok(())
    }

    pub fn set_detection_radius(&mut self, radius: f32) -> Result<(), ConfigError> {
        positive("detection_radius", radius as f64)?;
        if radius != self.detection_radius {
            self.detection_radius = radius;
            self.regenerate();
        }
        Ok(())
    }

    /// Radius of each overlap query in the current mode.
    pub fn query_radius(&self) -> f32 {
        match self.mode {
            DetectionMode::MultiPoint => self.detection_radius * self.multi_point_radius_scale,
            DetectionMode::SinglePoint => self.body.radius * self.single_point_radius_scale,
        }
    }

    /// World-space query origins for the current mode.
    pub fn query_origins(&self, agent: Vec3) -> Vec<Vec3> {
        match self.mode {
            DetectionMode::MultiPoint => self.points.iter().map(|&o| agent + o).collect(),
            DetectionMode::SinglePoint => vec![agent + Vec3::Y * self.body.center_height],
        }
    }

    /// Union of per-origin overlap results.
    ///
    /// A proxy hit from several origins appears once per origin.
    pub fn sample(
        &self,
        agent: Vec3,
        index: &SpatialIndex,
        world: &ProxyWorld,
        now: Seconds,
    ) -> Vec<Contact> {
        let radius = self.query_radius();
        let mut out = Vec::new();
        for origin in self.query_origins(agent) {
            for id in index.query(origin, radius) {
                let Some(proxy) = world.get(id) else {
                    trace!(?id, "skipping stale proxy during sampling");
                    continue;
                };
                if !proxy.enabled {
                    continue;
                }
                if let Some(ov) =
                    Narrowphase::overlap_sphere_sphere(origin, radius, proxy.position, proxy.radius)
                {
                    out.push(Contact {
                        proxy: id,
                        point: ov.contact,
                        timestamp: now,
                        category: proxy.category,
                    });
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Proxy, ProxyId};

    fn sampler(points: usize, radius: f32) -> ContactSampler {
        let cfg = EngineConfig {
            detection_points: points,
            detection_radius: radius,
            ..Default::default()
        };
        ContactSampler::new(&cfg).unwrap()
    }

    fn indexed(world: &ProxyWorld, ids: &[ProxyId]) -> SpatialIndex {
        let mut index = SpatialIndex::new(10.0);
        for &id in ids {
            index.register(id);
        }
        index.rebuild(world);
        index
    }

    #[test]
    fn test_ring_geometry() {
        let s = sampler(4, 2.0);
        let origins = s.query_origins(Vec3::new(1.0, 5.0, 1.0));
        assert_eq!(origins.len(), 4);
        assert!((origins[0] - Vec3::new(3.0, 5.0, 1.0)).length() < 1e-5);
        assert!((origins[1] - Vec3::new(1.0, 5.0, 3.0)).length() < 1e-5);
        assert!((origins[2] - Vec3::new(-1.0, 5.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn test_rejects_out_of_range_counts() {
        let mut s = sampler(6, 0.3);
        assert!(s.set_point_count(2).is_err());
        assert!(s.set_point_count(13).is_err());
        assert_eq!(s.points().len(), 6);
        s.set_point_count(12).unwrap();
        assert_eq!(s.points().len(), 12);
        assert!(s.set_detection_radius(0.0).is_err());
        s.set_detection_radius(1.5).unwrap();
        assert!((s.points()[0].length() - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_query_radius_scalars_are_independent() {
        let mut s = sampler(6, 0.3);
        assert!((s.query_radius() - 0.15).abs() < 1e-6);
        s.set_mode(DetectionMode::SinglePoint);
        // body radius 0.5 * 0.8
        assert!((s.query_radius() - 0.4).abs() < 1e-6);
        assert_eq!(s.query_origins(Vec3::ZERO), vec![Vec3::new(0.0, 1.0, 0.0)]);
    }

    #[test]
    fn test_sample_keeps_duplicates_across_points() {
        let mut world = ProxyWorld::new();
        let id = world.spawn(Proxy::obstacle(Vec3::new(0.3, 0.0, 0.0), 0.5));
        let index = indexed(&world, &[id]);
        let s = sampler(6, 0.3);
        let contacts = s.sample(Vec3::ZERO, &index, &world, 1.0);
        assert!(contacts.len() > 1);
        assert!(contacts.iter().all(|c| c.proxy == id && c.timestamp == 1.0));
    }

    #[test]
    fn test_sample_refilters_exactly() {
        let mut world = ProxyWorld::new();
        // Same grid cell as the agent but far outside every sample sphere
        let id = world.spawn(Proxy::obstacle(Vec3::new(8.0, 0.0, 8.0), 0.5));
        let index = indexed(&world, &[id]);
        assert_eq!(index.query(Vec3::ZERO, 0.15), vec![id]);
        let s = sampler(6, 0.3);
        assert!(s.sample(Vec3::ZERO, &index, &world, 0.0).is_empty());
    }

    #[test]
    fn test_sample_skips_proxies_disabled_or_removed_after_rebuild() {
        let mut world = ProxyWorld::new();
        let a = world.spawn(Proxy::obstacle(Vec3::new(0.3, 0.0, 0.0), 0.2));
        let b = world.spawn(Proxy::obstacle(Vec3::new(-0.3, 0.0, 0.0), 0.2));
        let index = indexed(&world, &[a, b]);
        world.set_enabled(a, false);
        world.despawn(b);
        let s = sampler(6, 0.3);
        assert!(s.sample(Vec3::ZERO, &index, &world, 0.0).is_empty());
    }

    #[test]
    fn test_single_point_mode_uses_body_center() {
        let mut world = ProxyWorld::new();
        let head = world.spawn(Proxy::obstacle(Vec3::new(0.0, 1.2, 0.0), 0.1));
        let index = indexed(&world, &[head]);
        let mut s = sampler(6, 0.3);
        // Ring is at foot level; the proxy sits above it
        assert!(s.sample(Vec3::ZERO, &index, &world, 0.0).is_empty());
        s.set_mode(DetectionMode::SinglePoint);
        let contacts = s.sample(Vec3::ZERO, &index, &world, 0.0);
        assert_eq!(contacts.len(), 1);
        assert_eq!(contacts[0].proxy, head);
    }
}
