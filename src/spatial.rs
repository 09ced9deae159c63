use std::collections::{HashMap, HashSet};

use glam::Vec3;
use tracing::trace;

use crate::config::MAX_QUERY_REACH_CELLS;
use crate::types::{IndexStats, ProxyId};
use crate::world::ProxyWorld;

/// Uniform XZ grid over the tracked, enabled proxies.
///
/// The grid is rebuilt wholesale every tick and never patched in between, so
/// moving proxies only need their position updated in the world.
pub struct SpatialIndex {
    cell_size: f32,
    // Registration order is kept so rebuilds are deterministic.
    tracked: Vec<ProxyId>,
    tracked_set: HashSet<ProxyId>,
    // Uniform grid: cell coord -> proxies whose position falls inside
    cells: HashMap<(i32, i32), Vec<ProxyId>>,
    indexed: usize,
}

impl SpatialIndex {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(1e-5),
            tracked: Vec::new(),
            tracked_set: HashSet::new(),
            cells: HashMap::new(),
            indexed: 0,
        }
    }

    // --- Registration ------------------------------------------------------

    /// Start tracking `id`. Returns false if it was already tracked.
    pub fn register(&mut self, id: ProxyId) -> bool {
        if !self.tracked_set.insert(id) {
            return false;
        }
        self.tracked.push(id);
        true
    }

    /// Stop tracking `id`. It stays in the grid until the next rebuild.
    pub fn unregister(&mut self, id: ProxyId) -> bool {
        if !self.tracked_set.remove(&id) {
            return false;
        }
        self.tracked.retain(|t| *t != id);
        true
    }

    pub fn is_registered(&self, id: ProxyId) -> bool {
        self.tracked_set.contains(&id)
    }

    pub fn tracked(&self) -> &[ProxyId] {
        &self.tracked
    }

    // --- Grid ----------------------------------------------------------------

    /// Clear the grid and insert every tracked proxy that still exists and is enabled.
    pub fn rebuild(&mut self, world: &ProxyWorld) {
        self.cells.clear();
        self.indexed = 0;
        let cs = self.cell_size;
        for &id in &self.tracked {
            let Some(proxy) = world.get(id) else {
                trace!(?id, "skipping stale proxy during rebuild");
                continue;
            };
            if !proxy.enabled {
                continue;
            }
            self.cells
                .entry(world_to_cell(proxy.position, cs))
                .or_default()
                .push(id);
            self.indexed += 1;
        }
    }

    /// Union of all cells within `ceil(radius / cell_size)` of the cell containing `center`.
    ///
    /// Cell-granular: results may lie farther than `radius`. Callers that need
    /// an exact answer must re-filter. The reach is capped at
    /// [`MAX_QUERY_REACH_CELLS`], which validated configs never exceed.
    pub fn query(&self, center: Vec3, radius: f32) -> Vec<ProxyId> {
        let cs = self.cell_size;
        let (cx, cz) = world_to_cell(center, cs);
        let reach = ((radius.max(0.0) / cs).ceil() as i32).min(MAX_QUERY_REACH_CELLS);
        let mut out = Vec::new();
        // Cell coords saturate at the i32 range far from the origin
        for iz in cz.saturating_sub(reach)..=cz.saturating_add(reach) {
            for ix in cx.saturating_sub(reach)..=cx.saturating_add(reach) {
                if let Some(list) = self.cells.get(&(ix, iz)) {
                    out.extend_from_slice(list);
                }
            }
        }
        out
    }

    pub fn cell_of(&self, p: Vec3) -> (i32, i32) {
        world_to_cell(p, self.cell_size)
    }

    /// Return debug stats for the current grid.
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            tracked: self.tracked.len(),
            indexed: self.indexed,
            cells: self.cells.len(),
            max_cell_len: self.cells.values().map(Vec::len).max().unwrap_or(0),
        }
    }
}

// Float-to-int `as` saturates, so out-of-range positions land in the edge cells.
fn world_to_cell(p: Vec3, cs: f32) -> (i32, i32) {
    ((p.x / cs).floor() as i32, (p.z / cs).floor() as i32)
}
