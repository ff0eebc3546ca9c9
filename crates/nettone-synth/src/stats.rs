//! Engine health counters.
//!
//! Collaborator failures never stop the render loop. They are counted here
//! so a supervisor (the CLI, a status endpoint) can observe them.

use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};

/// Shared, lock-free counters updated by the control and render tasks.
#[derive(Debug, Default)]
pub struct EngineStats {
    blocks_rendered: AtomicU64,
    commands_applied: AtomicU64,
    commands_rejected: AtomicU64,
    fm_events_dropped: AtomicU64,
    short_fm_renders: AtomicU64,
    sink_errors: AtomicU64,
    short_writes: AtomicU64,
}

/// Point-in-time copy of [`EngineStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Blocks produced by the renderer.
    pub blocks_rendered: u64,
    /// Commands applied to the voice bank.
    pub commands_applied: u64,
    /// Commands rejected (target voice out of range).
    pub commands_rejected: u64,
    /// FM triggers dropped because the event queue was full.
    pub fm_events_dropped: u64,
    /// FM renders that returned fewer samples than requested.
    pub short_fm_renders: u64,
    /// Sink writes that failed outright.
    pub sink_errors: u64,
    /// Sink writes that accepted only part of a block.
    pub short_writes: u64,
}

macro_rules! counter {
    ($record:ident, $field:ident) => {
        /// Increment the counter and return its new value.
        #[inline]
        pub fn $record(&self) -> u64 {
            self.$field.fetch_add(1, Ordering::Relaxed) + 1
        }
    };
}

impl EngineStats {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    counter!(record_block, blocks_rendered);
    counter!(record_applied, commands_applied);
    counter!(record_rejected, commands_rejected);
    counter!(record_fm_dropped, fm_events_dropped);
    counter!(record_short_fm_render, short_fm_renders);
    counter!(record_sink_error, sink_errors);
    counter!(record_short_write, short_writes);

    /// Read every counter.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            blocks_rendered: self.blocks_rendered.load(Ordering::Relaxed),
            commands_applied: self.commands_applied.load(Ordering::Relaxed),
            commands_rejected: self.commands_rejected.load(Ordering::Relaxed),
            fm_events_dropped: self.fm_events_dropped.load(Ordering::Relaxed),
            short_fm_renders: self.short_fm_renders.load(Ordering::Relaxed),
            sink_errors: self.sink_errors.load(Ordering::Relaxed),
            short_writes: self.short_writes.load(Ordering::Relaxed),
        }
    }
}

impl StatsSnapshot {
    /// Whether any collaborator failure has been recorded.
    pub fn has_faults(&self) -> bool {
        self.fm_events_dropped + self.short_fm_renders + self.sink_errors + self.short_writes > 0
    }
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "blocks={} applied={} rejected={} fm_dropped={} fm_short={} sink_errors={} short_writes={}",
            self.blocks_rendered,
            self.commands_applied,
            self.commands_rejected,
            self.fm_events_dropped,
            self.short_fm_renders,
            self.sink_errors,
            self.short_writes,
        )
    }
}
