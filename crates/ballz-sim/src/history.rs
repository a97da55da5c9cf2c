//! Snapshot history for render interpolation.
//!
//! A bounded FIFO of world snapshots, one per tick, spaced by a fixed
//! logical interval. Renderers ask for the world at a time slightly behind
//! the head and get a blend of the two snapshots around it.

use std::collections::VecDeque;

use tracing::trace;

use ballz_core::state::WorldSnapshot;

pub struct SnapshotHistory {
    capacity: usize,
    interval: f64,
    head_time: f64,
    snapshots: VecDeque<WorldSnapshot>,
}

impl SnapshotHistory {
    /// Capacity is at least one; the interval must be positive.
    pub fn new(capacity: usize, interval_secs: f64) -> Self {
        debug_assert!(interval_secs > 0.0);
        let capacity = capacity.max(1);
        Self {
            capacity,
            interval: interval_secs,
            head_time: 0.0,
            snapshots: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a snapshot, advancing the head time by one interval and
    /// evicting the oldest snapshot when full. The snapshot is stamped with
    /// the new head time.
    pub fn push(&mut self, mut snapshot: WorldSnapshot) {
        self.head_time += self.interval;
        snapshot.time_secs = self.head_time;
        if self.snapshots.len() == self.capacity {
            self.snapshots.pop_front();
            trace!(capacity = self.capacity, "oldest snapshot evicted");
        }
        self.snapshots.push_back(snapshot);
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn interval(&self) -> f64 {
        self.interval
    }

    /// Logical time of the newest snapshot.
    pub fn head_time(&self) -> f64 {
        self.head_time
    }

    pub fn head_snapshot(&self) -> Option<&WorldSnapshot> {
        self.snapshots.back()
    }

    /// Snapshots from oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &WorldSnapshot> + '_ {
        self.snapshots.iter()
    }

    /// Fractional snapshot index for `time`.
    fn fractional_index(&self, time: f64) -> f64 {
        (self.snapshots.len() - 1) as f64 - (self.head_time - time) / self.interval
    }

    /// The stored snapshot at or just before `time`, clamped to the
    /// oldest and newest.
    pub fn discrete_snapshot(&self, time: f64) -> Option<&WorldSnapshot> {
        if self.snapshots.is_empty() {
            return None;
        }
        let last = self.snapshots.len() - 1;
        let idx = self.fractional_index(time).floor().max(0.0) as usize;
        self.snapshots.get(idx.min(last))
    }

    /// The world as it should be drawn at `render_time`.
    ///
    /// Entities present in both surrounding snapshots are blended. Entities
    /// that only exist in the earlier one pass through unchanged; entities
    /// that only exist in the later one are left out.
    pub fn interpolated_view(&self, render_time: f64) -> Option<WorldSnapshot> {
        match self.snapshots.len() {
            0 => return None,
            1 => return self.snapshots.back().cloned(),
            _ => {}
        }
        if render_time >= self.head_time {
            return self.snapshots.back().cloned();
        }

        let last = self.snapshots.len() - 1;
        let t = self.fractional_index(render_time);
        let pre_idx = (t.floor().max(0.0) as usize).min(last);
        let alpha = (t - pre_idx as f64).clamp(0.0, 1.0) as f32;
        let post_idx = (pre_idx + 1).min(last);
        let pre = &self.snapshots[pre_idx];
        let post = &self.snapshots[post_idx];

        let entities = pre
            .entities
            .iter()
            .map(|e| match post.entity(e.id) {
                Some(p) => e.lerp(p, alpha),
                None => *e,
            })
            .collect();

        Some(WorldSnapshot {
            time_secs: render_time,
            terrain_revision: pre.terrain_revision,
            entities,
        })
    }
}
