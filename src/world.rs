use std::collections::HashMap;

use glam::Vec3;

use crate::api::BreakableCapability;
use crate::types::{Proxy, ProxyId};

/// Proxy store owned by the surrounding game world.
///
/// The engine reads proxies from here, toggles `enabled` during culling and
/// despawns obstacles that report a successful special break. Everything else
/// (spawning, moving, despawning on pickup) belongs to the caller.
#[derive(Default)]
pub struct ProxyWorld {
    next_id: u64,
    proxies: HashMap<ProxyId, Proxy>,
    breakables: HashMap<ProxyId, Box<dyn BreakableCapability>>,
}

impl ProxyWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a proxy under a freshly allocated id.
    pub fn spawn(&mut self, proxy: Proxy) -> ProxyId {
        let id = ProxyId(self.next_id);
        self.next_id += 1;
        self.proxies.insert(id, proxy);
        id
    }

    /// Convenience: spawn an obstacle that can be broken by a special action.
    pub fn spawn_breakable(
        &mut self,
        proxy: Proxy,
        breakable: Box<dyn BreakableCapability>,
    ) -> ProxyId {
        let id = self.spawn(proxy);
        self.breakables.insert(id, breakable);
        id
    }

    /// Remove a proxy and any capability attached to it.
    pub fn despawn(&mut self, id: ProxyId) -> Option<Proxy> {
        self.breakables.remove(&id);
        self.proxies.remove(&id)
    }

    pub fn attach_breakable(
        &mut self,
        id: ProxyId,
        breakable: Box<dyn BreakableCapability>,
    ) -> bool {
        if !self.proxies.contains_key(&id) {
            return false;
        }
        self.breakables.insert(id, breakable);
        true
    }

    pub fn get(&self, id: ProxyId) -> Option<&Proxy> {
        self.proxies.get(&id)
    }

    pub fn get_mut(&mut self, id: ProxyId) -> Option<&mut Proxy> {
        self.proxies.get_mut(&id)
    }

    pub fn breakable_mut(
        &mut self,
        id: ProxyId,
    ) -> Option<&mut (dyn BreakableCapability + 'static)> {
        self.breakables.get_mut(&id).map(|b| &mut **b)
    }

    /// Returns false when `id` does not resolve.
    pub fn set_position(&mut self, id: ProxyId, position: Vec3) -> bool {
        match self.proxies.get_mut(&id) {
            Some(p) => {
                p.position = position;
                true
            }
            None => false,
        }
    }

    pub fn set_enabled(&mut self, id: ProxyId, enabled: bool) -> bool {
        match self.proxies.get_mut(&id) {
            Some(p) => {
                p.enabled = enabled;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }
}
