use glam::Vec3;
use tracing::trace;

use crate::types::{CullStats, ProxyId};
use crate::world::ProxyWorld;

/// Enables proxies inside `[-rear_margin, culling_distance)` along the forward axis.
#[derive(Copy, Clone, Debug)]
pub struct CullingPolicy {
    pub culling_distance: f32,
    pub rear_margin: f32,
    forward: Vec3,
}

impl CullingPolicy {
    pub fn new(culling_distance: f32, rear_margin: f32, forward_axis: Vec3) -> Self {
        Self {
            culling_distance,
            rear_margin,
            forward: forward_axis.normalize_or(Vec3::Z),
        }
    }

    /// Signed distance of `p` ahead of `agent` along the forward axis.
    pub fn forward_distance(&self, agent: Vec3, p: Vec3) -> f32 {
        (p - agent).dot(self.forward)
    }

    /// Forward bound exclusive, rear bound inclusive.
    pub fn is_relevant(&self, agent: Vec3, p: Vec3) -> bool {
        let d = self.forward_distance(agent, p);
        d < self.culling_distance && d >= -self.rear_margin
    }

    /// Toggle `enabled` on every tracked proxy. Ids that no longer resolve are counted as stale.
    pub fn cull(&self, agent: Vec3, tracked: &[ProxyId], world: &mut ProxyWorld) -> CullStats {
        let mut stats = CullStats::default();
        for &id in tracked {
            let Some(proxy) = world.get_mut(id) else {
                stats.stale += 1;
                continue;
            };
            let keep = self.is_relevant(agent, proxy.position);
            proxy.enabled = keep;
            if keep {
                stats.enabled += 1;
            } else {
                stats.disabled += 1;
            }
        }
        trace!(enabled = stats.enabled, disabled = stats.disabled, stale = stats.stale, "cull");
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Proxy;

    fn policy() -> CullingPolicy {
        CullingPolicy::new(50.0, 10.0, Vec3::Z)
    }

    #[test]
    fn test_forward_bound_is_exclusive() {
        let p = policy();
        assert!(!p.is_relevant(Vec3::ZERO, Vec3::new(0.0, 0.0, 50.0)));
        assert!(p.is_relevant(Vec3::ZERO, Vec3::new(0.0, 0.0, 50.0 - 1e-3)));
    }

    #[test]
    fn test_rear_margin() {
        let p = policy();
        assert!(p.is_relevant(Vec3::ZERO, Vec3::new(0.0, 0.0, -10.0)));
        assert!(!p.is_relevant(Vec3::ZERO, Vec3::new(0.0, 0.0, -10.5)));
        // Lateral offset does not count toward forward distance
        assert!(p.is_relevant(Vec3::ZERO, Vec3::new(500.0, 0.0, 1.0)));
    }

    #[test]
    fn test_distance_is_relative_to_agent() {
        let p = policy();
        let agent = Vec3::new(0.0, 0.0, 100.0);
        assert!(p.is_relevant(agent, Vec3::new(0.0, 0.0, 120.0)));
        assert!(!p.is_relevant(agent, Vec3::new(0.0, 0.0, 20.0)));
    }

    #[test]
    fn test_cull_toggles_and_reenables() {
        let mut world = ProxyWorld::new();
        let near = world.spawn(Proxy::obstacle(Vec3::new(0.0, 0.0, 5.0), 0.5));
        let far = world.spawn(Proxy::obstacle(Vec3::new(0.0, 0.0, 80.0), 0.5));
        let tracked = [near, far, ProxyId(77)];

        let stats = policy().cull(Vec3::ZERO, &tracked, &mut world);
        assert_eq!(stats, CullStats { enabled: 1, disabled: 1, stale: 1 });
        assert!(world.get(near).unwrap().enabled);
        assert!(!world.get(far).unwrap().enabled);

        // Agent advances; the far proxy comes into range and the near one falls behind
        let stats = policy().cull(Vec3::new(0.0, 0.0, 40.0), &tracked, &mut world);
        assert_eq!(stats.enabled, 1);
        assert!(!world.get(near).unwrap().enabled);
        assert!(world.get(far).unwrap().enabled);
    }

    #[test]
    fn test_custom_forward_axis_is_normalized() {
        let p = CullingPolicy::new(50.0, 10.0, Vec3::new(3.0, 0.0, 0.0));
        assert_eq!(p.forward_distance(Vec3::ZERO, Vec3::new(20.0, 0.0, 0.0)), 20.0);
        assert!(!p.is_relevant(Vec3::ZERO, Vec3::new(50.0, 0.0, 0.0)));
    }
}
