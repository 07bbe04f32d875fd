//! Query surface (C8): status snapshot and upcoming-actions computation for
//! prefetch layers and UI. Every function here is read-only — it simulates
//! on temporary cursors rather than mutating `RunState`.

use serde::Serialize;

use crate::cursor::PlaybackStateEntry;
use crate::events::{PlayAction, PlaybackLogDetail};
use crate::item::PlaybackItem;
use crate::run_state::RunState;

/// One stack entry's current position, top-first, as returned by
/// `get_status_snapshot`.
#[derive(Debug, Clone, Serialize)]
pub struct PlaybackStateSnapshot {
    pub schedule_id: Option<String>,
    pub request_id: Option<String>,
    pub priority_tier: u8,
    pub stack_depth: usize,
    pub suspended: bool,
    pub current_time: i64,
    pub sched_start_time: i64,
    pub sched_end_time: i64,
}

impl PlaybackStateSnapshot {
    fn from_entry(entry: &PlaybackStateEntry, stack_depth: usize) -> Self {
        Self {
            schedule_id: entry.item.schedule_id.clone(),
            request_id: entry.item.request_id.clone(),
            priority_tier: entry.item.priority_tier,
            stack_depth,
            suspended: entry.suspend_time.is_some(),
            current_time: entry.current_time,
            sched_start_time: entry.sched_start_time,
            sched_end_time: entry.sched_end_time,
        }
    }
}

/// `get_status_snapshot()`: dump the preemption stack top-first.
pub fn get_status_snapshot(run_state: &RunState) -> Vec<PlaybackStateSnapshot> {
    let stack = run_state.stack();
    stack
        .iter()
        .rev()
        .enumerate()
        .map(|(i, entry)| PlaybackStateSnapshot::from_entry(entry, stack.len() - i))
        .collect()
}

/// One item in the `get_upcoming_items` readahead stream: which container it
/// came from, plus the simulated [`PlayAction`]s it would produce.
#[derive(Debug, Clone, Serialize)]
pub struct UpcomingItem {
    pub source: UpcomingSource,
    pub schedule_id: Option<String>,
    pub request_id: Option<String>,
    pub actions: Vec<PlayAction>,
}

/// Which container an [`UpcomingItem`] was read from. Per §9's noted source
/// quirk, interactive queue entries are surfaced under the same
/// `upcomingSchedules` wire bucket as genuine future schedule occurrences —
/// mirrored here as a shared `UpcomingSource::UpcomingSchedules` variant
/// rather than inventing a separate `Interactive` bucket the source never
/// actually emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UpcomingSource {
    StackTop,
    StackBelow,
    Heap,
    UpcomingSchedules,
}

/// `get_upcoming_items(readahead, schedahead, maxItems)`: a prefetch-facing
/// stream covering, in order: the current stack top, items below it on the
/// stack, heap entries (each simulated with a fresh cursor at `t`), upcoming
/// occurrences within `schedahead`, and the interactive queue. No side
/// effects on `run_state` — every simulated cursor is a scratch copy.
pub fn get_upcoming_items(run_state: &RunState, readahead_ms: i64, schedahead_ms: i64, max_items: usize) -> Vec<UpcomingItem> {
    let t = run_state.current_time;
    let mut out = Vec::new();

    for (i, entry) in run_state.stack().iter().rev().enumerate() {
        if out.len() >= max_items {
            return out;
        }
        let source = if i == 0 { UpcomingSource::StackTop } else { UpcomingSource::StackBelow };
        out.push(simulate_entry(entry.item.clone(), entry.current_time, entry.current_time + readahead_ms, source));
    }

    for item in run_state.heap().iter() {
        if out.len() >= max_items {
            return out;
        }
        out.push(simulate_entry(item.clone(), t, t + readahead_ms, UpcomingSource::Heap));
    }

    for item in run_state.upcoming() {
        if out.len() >= max_items {
            return out;
        }
        if item.sched_start > t + schedahead_ms {
            break; // `upcoming` is sorted by sched_start
        }
        out.push(UpcomingItem {
            source: UpcomingSource::UpcomingSchedules,
            schedule_id: item.schedule_id.clone(),
            request_id: item.request_id.clone(),
            actions: Vec::new(),
        });
    }

    for cmd in run_state.interactive_queue() {
        if out.len() >= max_items {
            return out;
        }
        out.push(UpcomingItem {
            source: UpcomingSource::UpcomingSchedules,
            schedule_id: None,
            request_id: Some(cmd.request_id.clone()),
            actions: Vec::new(),
        });
    }

    out
}

/// Drive a scratch cursor over `item` from `from` to `to`, discarding the
/// log it produces (the caller only wants the play-action stream).
fn simulate_entry(item: PlaybackItem, from: i64, to: i64, source: UpcomingSource) -> UpcomingItem {
    let schedule_id = item.schedule_id.clone();
    let request_id = item.request_id.clone();
    let mut entry = PlaybackStateEntry::new(item, from);
    let mut log: Vec<PlaybackLogDetail> = Vec::new();
    let mut actions = Vec::new();
    entry.advance_to_time(to, 0, &mut log, &mut actions);
    UpcomingItem {
        source,
        schedule_id,
        request_id,
        actions,
    }
}
