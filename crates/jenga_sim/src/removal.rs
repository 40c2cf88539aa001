//! Deferred block removal
//!
//! Picked blocks are not removed immediately. Each pick queues the mesh with a
//! due time on the simulation clock and the loop drains whatever is due at the
//! start of the next frame.

use std::time::Duration;

use jenga_render::MeshId;

/// One queued removal
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PendingRemoval {
    pub mesh: MeshId,
    /// Clock value at which the removal fires
    pub due: Duration,
}

/// Removal timers, at most one per mesh
#[derive(Clone, Debug, Default)]
pub struct RemovalQueue {
    pending: Vec<PendingRemoval>,
}

impl RemovalQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `mesh` for removal at `due`. Returns `false` when it is already queued.
    pub fn schedule(&mut self, mesh: MeshId, due: Duration) -> bool {
        if self.is_pending(mesh) {
            return false;
        }
        self.pending.push(PendingRemoval { mesh, due });
        true
    }

    /// Drop the timer of `mesh`. Returns `false` when none was queued.
    pub fn cancel(&mut self, mesh: MeshId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|entry| entry.mesh != mesh);
        self.pending.len() != before
    }

    pub fn is_pending(&self, mesh: MeshId) -> bool {
        self.pending.iter().any(|entry| entry.mesh == mesh)
    }

    /// Due time of the timer for `mesh`
    pub fn due_time(&self, mesh: MeshId) -> Option<Duration> {
        self.pending.iter().find(|entry| entry.mesh == mesh).map(|entry| entry.due)
    }

    /// Earliest due time
    pub fn next_due(&self) -> Option<Duration> {
        self.pending.iter().map(|entry| entry.due).min()
    }

    /// Remove and return every mesh due at `now`, earliest first
    ///
    /// Equal due times keep scheduling order.
    pub fn take_due(&mut self, now: Duration) -> Vec<MeshId> {
        let (mut due, waiting): (Vec<_>, Vec<_>) = self.pending.drain(..).partition(|entry| entry.due <= now);
        self.pending = waiting;
        due.sort_by_key(|entry| entry.due);
        due.into_iter().map(|entry| entry.mesh).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingRemoval> {
        self.pending.iter()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
