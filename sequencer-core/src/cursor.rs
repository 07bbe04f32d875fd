//! Per-active-item cursor state machine (§4.6) — the hardest part of the
//! scheduler. A cursor walks `pre -> main (loop) -> post`, enforcing one of
//! four end-policies on the main section, and supports pause/suspend/resume.
//!
//! Recast per §9 design notes as a sum type (`CursorPhase`) instead of the
//! source's `part in {-1..3}` / `item_cursor in {-1..len}` pair of magic
//! numbers; `base_time`, `offset_into`, and `ending_part_early` remain as
//! siblings alongside it.

use crate::events::{PlaybackLogDetail, PlaylistPart};
use crate::item::PlaybackItem;
use crate::model::EndPolicy;

use crate::events::EventType::{
    PlaylistEnded, PlaylistStarted, ScheduleEnded, ScheduleResumed, ScheduleStopped, ScheduleSuspended, SequenceEnded, SequencePaused, SequenceResumed, SequenceStarted,
};
use crate::events::PlayAction;

/// Which sub-playlist a cursor is walking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Part {
    Pre,
    Main,
    Post,
}

impl Part {
    fn wire(self) -> PlaylistPart {
        match self {
            Part::Pre => PlaylistPart::Pre,
            Part::Main => PlaylistPart::Main,
            Part::Post => PlaylistPart::Post,
        }
    }
}

/// `pre -> main (loop) -> post -> done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorPhase {
    NotStarted,
    InPart(Part, i64),
    Done,
}

/// Cursor state: which phase/index we're at, how far into the current
/// sequence we are, and whether the main section's end policy has already
/// decided to wrap up early.
#[derive(Debug, Clone)]
pub struct PlaybackCursor {
    pub phase: CursorPhase,
    pub offset_into_ms: i64,
    pub base_time_ms: i64,
    pub ending_part_early: bool,
}

impl PlaybackCursor {
    pub fn new(start_time: i64) -> Self {
        Self {
            phase: CursorPhase::NotStarted,
            offset_into_ms: 0,
            base_time_ms: start_time,
            ending_part_early: false,
        }
    }
}

/// One active (pushed) occurrence: a [`PlaybackItem`] plus its cursor and
/// scheduling/suspension bookkeeping.
#[derive(Debug, Clone)]
pub struct PlaybackStateEntry {
    pub item: PlaybackItem,
    pub cursor: PlaybackCursor,
    pub sched_start_time: i64,
    pub sched_end_time: i64,
    pub start_time_adjust: i64,
    pub suspend_time: Option<i64>,
    /// Clock time this entry's cursor has been advanced to so far.
    pub current_time: i64,
}

impl PlaybackStateEntry {
    pub fn new(item: PlaybackItem, started_at: i64) -> Self {
        let sched_start_time = item.sched_start;
        let sched_end_time = item.sched_end;
        Self {
            cursor: PlaybackCursor::new(started_at),
            sched_start_time,
            sched_end_time,
            start_time_adjust: 0,
            suspend_time: None,
            current_time: started_at,
            item,
        }
    }

    fn section_len(&self, part: Part) -> usize {
        match part {
            Part::Pre => self.item.pre_section.seq_ids.len(),
            Part::Main => self.item.main_section.seq_ids.len(),
            Part::Post => self.item.post_section.seq_ids.len(),
        }
    }

    fn seq_id_at(&self, part: Part, idx: usize) -> Option<&str> {
        let ids = match part {
            Part::Pre => &self.item.pre_section.seq_ids,
            Part::Main => &self.item.main_section.seq_ids,
            Part::Post => &self.item.post_section.seq_ids,
        };
        ids.get(idx).map(String::as_str)
    }

    fn dur_at(&self, part: Part, idx: usize) -> i64 {
        let durs = match part {
            Part::Pre => &self.item.pre_section.durations_ms,
            Part::Main => &self.item.main_section.durations_ms,
            Part::Post => &self.item.post_section.durations_ms,
        };
        durs[idx]
    }

    fn loops(&self) -> bool {
        self.item.main_section.loop_playback
    }

    fn post_total(&self) -> i64 {
        self.item.post_section.total_ms
    }

    fn longest_main(&self) -> i64 {
        self.item.main_section.longest_ms
    }

    /// `should_start_outro` from the §4.6 end-policy table: `None` means
    /// keep playing; `Some(x)` means truncate the current item to `x` ms
    /// (clamped to `[0, item_left]` by the caller) and move to the outro.
    fn should_start_outro(&self, cur_time: i64, item_left: i64, post_total: i64) -> Option<i64> {
        let sched_end = self.sched_end_time;
        match self.item.end_policy {
            EndPolicy::HardCut => {
                if cur_time + item_left > sched_end - post_total {
                    Some(sched_end - cur_time - post_total)
                } else {
                    None
                }
            }
            EndPolicy::SeqBoundEarly => {
                if cur_time + item_left > sched_end - post_total {
                    Some(0)
                } else {
                    None
                }
            }
            EndPolicy::SeqBoundNearest => {
                if cur_time + self.longest_main() / 2 > sched_end - post_total {
                    Some(0)
                } else {
                    None
                }
            }
            EndPolicy::SeqBoundLate => {
                if cur_time >= sched_end - post_total {
                    Some(0)
                } else {
                    None
                }
            }
        }
    }

    /// Whether RunState should treat this entry as finished: either the
    /// cursor has run to completion, or a `hardcut` schedule has reached
    /// its nominal end regardless of cursor position.
    pub fn should_abort(&self, t: i64) -> bool {
        matches!(self.cursor.phase, CursorPhase::Done) || (self.item.end_policy == EndPolicy::HardCut && t >= self.sched_end_time)
    }

    /// Time of the next natural stopping point (sequence boundary or
    /// end-policy trigger) from `cur_time`, without mutating state. Used by
    /// `RunState::run_until` to compute its next decision instant.
    pub fn next_decision_time(&self, cur_time: i64) -> i64 {
        match self.cursor.phase {
            CursorPhase::Done => cur_time,
            CursorPhase::NotStarted => cur_time,
            CursorPhase::InPart(Part::Pre, idx) | CursorPhase::InPart(Part::Post, idx) => {
                let part = if matches!(self.cursor.phase, CursorPhase::InPart(Part::Pre, _)) { Part::Pre } else { Part::Post };
                let len = self.section_len(part);
                if idx < 0 || idx as usize >= len {
                    return cur_time;
                }
                let dur = self.dur_at(part, idx as usize);
                cur_time + (dur - self.cursor.offset_into_ms).max(0)
            }
            CursorPhase::InPart(Part::Main, idx) => {
                if self.cursor.ending_part_early {
                    return cur_time;
                }
                let len = self.section_len(Part::Main);
                if len == 0 || (!self.loops() && idx as usize >= len) {
                    return cur_time;
                }
                let looped_idx = (idx as usize) % len;
                let dur = self.dur_at(Part::Main, looped_idx);
                let item_left = dur - self.cursor.offset_into_ms;
                match self.should_start_outro(cur_time, item_left, self.post_total()) {
                    None => cur_time + item_left.max(0),
                    Some(x) => cur_time + x.max(0).min(item_left.max(0)),
                }
            }
        }
    }

    /// Boundary time of the currently-playing sequence, ignoring end-policy
    /// truncation — used by `RunState` to decide whether "now" is a valid
    /// graceful cut-in point (a sequence boundary). Sitting at `offset == 0`
    /// already *is* a boundary (nothing has been played into the current
    /// item yet), so that returns `cur_time` itself rather than the *next*
    /// boundary ahead — otherwise a preemption arriving exactly on a
    /// boundary would wait a full extra item before cutting in.
    pub fn next_graceful_interruption_time(&self, cur_time: i64) -> i64 {
        match self.cursor.phase {
            CursorPhase::Done | CursorPhase::NotStarted => cur_time,
            CursorPhase::InPart(_, _) if self.cursor.offset_into_ms == 0 => cur_time,
            CursorPhase::InPart(part, idx) => {
                let len = self.section_len(part);
                if len == 0 {
                    return cur_time;
                }
                let looped_idx = if part == Part::Main && self.loops() { (idx as usize) % len } else { idx as usize };
                if looped_idx >= len {
                    return cur_time;
                }
                let dur = self.dur_at(part, looped_idx);
                cur_time + (dur - self.cursor.offset_into_ms).max(0)
            }
        }
    }

    fn current_sequence(&self) -> Option<(Part, i64, String)> {
        match self.cursor.phase {
            CursorPhase::InPart(part, idx) => {
                let len = self.section_len(part);
                if len == 0 {
                    return None;
                }
                let looped_idx = if part == Part::Main && self.loops() { (idx as usize) % len } else { idx as usize };
                if looped_idx >= len {
                    return None;
                }
                self.seq_id_at(part, looped_idx).map(|id| (part, idx, id.to_string()))
            }
            _ => None,
        }
    }

    /// Advance the cursor to `run_to`, writing every transition crossed
    /// along the way into `log`, and every partial/full play instruction
    /// into `actions`. Returns the time actually reached (`run_to`, unless
    /// the cursor finished the whole item before then).
    pub fn advance_to_time(&mut self, run_to: i64, stack_depth: usize, log: &mut Vec<PlaybackLogDetail>, actions: &mut Vec<PlayAction>) -> i64 {
        let mut cur_time = self.current_time;

        // Zero-duration transitions (entering the first part, closing a
        // part once its end-policy has decided to wrap up) must fire even
        // when `cur_time == run_to`, since `run_to` is frequently computed
        // as exactly that boundary. Resolve every such pending transition
        // before considering whether there's time budget left to step a
        // sequence forward.
        let mut guard = 0u32;
        loop {
            guard += 1;
            if guard > 1_000_000 {
                log::warn!("advance_to_time: runaway cursor at t={cur_time}, aborting");
                break;
            }

            if self.resolve_pending_transition(cur_time, stack_depth, log) {
                continue;
            }
            if matches!(self.cursor.phase, CursorPhase::Done) || cur_time >= run_to {
                break;
            }

            match self.cursor.phase {
                CursorPhase::InPart(Part::Pre, idx) => {
                    cur_time = self.step_linear(Part::Pre, idx, cur_time, run_to, stack_depth, log, actions);
                }
                CursorPhase::InPart(Part::Post, idx) => {
                    cur_time = self.step_linear(Part::Post, idx, cur_time, run_to, stack_depth, log, actions);
                }
                CursorPhase::InPart(Part::Main, idx) => {
                    cur_time = self.step_main(idx, cur_time, run_to, stack_depth, log, actions);
                }
                CursorPhase::NotStarted | CursorPhase::Done => unreachable!("resolved above"),
            }
        }

        self.current_time = cur_time;
        cur_time
    }

    /// Resolve any transition that costs no time: entering the first
    /// non-empty part from `NotStarted`, or closing out the current part
    /// because its end-policy decided to wrap up early or it ran off the
    /// end of a non-looping section. Returns whether a transition fired, so
    /// the caller can keep resolving until the cursor is genuinely blocked
    /// on needing more clock time.
    fn resolve_pending_transition(&mut self, cur_time: i64, stack_depth: usize, log: &mut Vec<PlaybackLogDetail>) -> bool {
        match self.cursor.phase {
            CursorPhase::Done => false,
            CursorPhase::NotStarted => {
                self.enter_first_nonempty_part(Part::Pre, cur_time, stack_depth, log);
                true
            }
            CursorPhase::InPart(Part::Main, idx) if self.cursor.ending_part_early => {
                let _ = idx;
                self.finish_part(Part::Main, cur_time, stack_depth, log);
                true
            }
            CursorPhase::InPart(part, idx) => {
                let len = self.section_len(part);
                let looping_main = part == Part::Main && self.loops();
                let overran = len == 0 || (!looping_main && (idx < 0 || idx as usize >= len));
                if overran {
                    self.finish_part(part, cur_time, stack_depth, log);
                }
                overran
            }
        }
    }

    /// Enter the first non-empty part starting at `from`, logging
    /// `Playlist Started` for it. Parts with no items are skipped silently
    /// (no log entries) rather than emitting a no-op `Started`/`Ended`
    /// pair — this keeps a schedule with no pre/post configured at exactly
    /// one `Playlist Started`/`Ended` pair (the main section's), matching
    /// §8's literal one-song scenario.
    fn enter_first_nonempty_part(&mut self, from: Part, cur_time: i64, stack_depth: usize, log: &mut Vec<PlaybackLogDetail>) {
        let mut part = from;
        loop {
            let len = self.section_len(part);
            if len > 0 {
                log.push(PlaybackLogDetail::playlist_level(PlaylistStarted, cur_time, stack_depth, &self.item, part.wire(), 0));
                self.cursor.phase = CursorPhase::InPart(part, 0);
                self.cursor.offset_into_ms = 0;
                self.cursor.base_time_ms = cur_time;
                return;
            }
            part = match part {
                Part::Pre => Part::Main,
                Part::Main => Part::Post,
                Part::Post => {
                    self.cursor.phase = CursorPhase::Done;
                    return;
                }
            };
        }
    }

    /// Close out `part` (`Playlist Ended`) and move on to the next part (or
    /// `Done`), skipping empty parts along the way.
    fn finish_part(&mut self, part: Part, cur_time: i64, stack_depth: usize, log: &mut Vec<PlaybackLogDetail>) {
        let idx = match self.cursor.phase {
            CursorPhase::InPart(p, i) if p == part => i,
            _ => 0,
        };
        log.push(PlaybackLogDetail::playlist_level(PlaylistEnded, cur_time, stack_depth, &self.item, part.wire(), idx));
        self.cursor.ending_part_early = false;

        let next_part = match part {
            Part::Pre => Part::Main,
            Part::Main => Part::Post,
            Part::Post => {
                self.cursor.phase = CursorPhase::Done;
                return;
            }
        };
        self.enter_first_nonempty_part(next_part, cur_time, stack_depth, log);
    }

    /// Walk one step of a non-looping (pre/post) section. Only called once
    /// `resolve_pending_transition` has confirmed `idx` is in bounds and
    /// there is real time budget (`cur_time < run_to`).
    fn step_linear(&mut self, part: Part, idx: i64, mut cur_time: i64, run_to: i64, stack_depth: usize, log: &mut Vec<PlaybackLogDetail>, actions: &mut Vec<PlayAction>) -> i64 {
        let idx_u = idx as usize;
        let seq_id = self.seq_id_at(part, idx_u).unwrap().to_string();
        let dur = self.dur_at(part, idx_u);

        if self.cursor.offset_into_ms == 0 {
            log.push(PlaybackLogDetail::sequence_level(SequenceStarted, cur_time, stack_depth, &self.item, part.wire(), idx, &seq_id, 0));
        }

        let remaining_in_seq = dur - self.cursor.offset_into_ms;
        let available = run_to - cur_time;

        if available < remaining_in_seq {
            if available > 0 {
                actions.push(PlayAction::play(cur_time, &seq_id, self.cursor.offset_into_ms, available));
            }
            self.cursor.offset_into_ms += available;
            return run_to;
        }

        if remaining_in_seq > 0 {
            actions.push(PlayAction::play(cur_time, &seq_id, self.cursor.offset_into_ms, remaining_in_seq));
        }
        cur_time += remaining_in_seq;
        log.push(PlaybackLogDetail::sequence_level(SequenceEnded, cur_time, stack_depth, &self.item, part.wire(), idx, &seq_id, dur));
        self.cursor.base_time_ms = cur_time;
        self.cursor.offset_into_ms = 0;
        self.cursor.phase = CursorPhase::InPart(part, idx + 1);
        cur_time
    }

    /// Walk one step of the looping main section, applying the end-policy
    /// truncation rule before committing to playing the next item. Only
    /// called once `resolve_pending_transition` has confirmed the section
    /// is non-empty, in bounds, not ending early, and there is real time
    /// budget (`cur_time < run_to`).
    fn step_main(&mut self, idx: i64, mut cur_time: i64, run_to: i64, stack_depth: usize, log: &mut Vec<PlaybackLogDetail>, actions: &mut Vec<PlayAction>) -> i64 {
        let len = self.section_len(Part::Main);
        let looped_idx = (idx as usize) % len;
        let seq_id = self.seq_id_at(Part::Main, looped_idx).unwrap().to_string();
        let dur = self.dur_at(Part::Main, looped_idx);

        if self.cursor.offset_into_ms == 0 {
            log.push(PlaybackLogDetail::sequence_level(SequenceStarted, cur_time, stack_depth, &self.item, PlaylistPart::Main, idx, &seq_id, 0));
        }

        let item_left = dur - self.cursor.offset_into_ms;
        let decision = self.should_start_outro(cur_time, item_left, self.post_total());
        let remaining_in_seq = match decision {
            None => item_left,
            Some(x) => x.max(0).min(item_left.max(0)),
        };

        let available = run_to - cur_time;
        if available < remaining_in_seq {
            if available > 0 {
                actions.push(PlayAction::play(cur_time, &seq_id, self.cursor.offset_into_ms, available));
            }
            self.cursor.offset_into_ms += available;
            return run_to;
        }

        if remaining_in_seq > 0 {
            actions.push(PlayAction::play(cur_time, &seq_id, self.cursor.offset_into_ms, remaining_in_seq));
        }
        cur_time += remaining_in_seq;
        log.push(PlaybackLogDetail::sequence_level(SequenceEnded, cur_time, stack_depth, &self.item, PlaylistPart::Main, idx, &seq_id, self.cursor.offset_into_ms + remaining_in_seq));
        self.cursor.base_time_ms = cur_time;
        self.cursor.offset_into_ms = 0;

        if decision.is_some() {
            self.cursor.ending_part_early = true;
        }
        self.cursor.phase = CursorPhase::InPart(Part::Main, idx + 1);
        cur_time
    }

    /// `pause(t)`/`suspend(t)`: bring the cursor up to `t`, record the
    /// suspension instant, and log `Sequence Paused` (if mid-sequence) then
    /// `Schedule Suspended`.
    pub fn suspend(&mut self, t: i64, stack_depth: usize, log: &mut Vec<PlaybackLogDetail>, actions: &mut Vec<PlayAction>) {
        self.advance_to_time(t, stack_depth, log, actions);
        self.suspend_time = Some(t);
        if self.cursor.offset_into_ms > 0 {
            if let Some((part, idx, seq_id)) = self.current_sequence() {
                log.push(PlaybackLogDetail::sequence_level(SequencePaused, t, stack_depth, &self.item, part.wire(), idx, &seq_id, self.cursor.offset_into_ms));
            }
        }
        log.push(PlaybackLogDetail::schedule_level(ScheduleSuspended, t, stack_depth, &self.item));
    }

    /// `resume(t)` / `advance_paused_time(t)`: if `keep_to_schedule_when_preempted`,
    /// lost time stays lost; otherwise the suspended interval is added back
    /// onto `base_time`/`start_time_adjust` so content resumes where it left
    /// off. Logs `Schedule Resumed`, then `Sequence Resumed` if mid-sequence.
    pub fn resume(&mut self, t: i64, stack_depth: usize, log: &mut Vec<PlaybackLogDetail>) {
        let Some(suspended_at) = self.suspend_time.take() else {
            return;
        };
        let delta = t - suspended_at;
        if !self.item.keep_to_schedule_when_preempted {
            self.cursor.base_time_ms += delta;
            self.start_time_adjust += delta;
        }
        self.current_time = t;

        log.push(PlaybackLogDetail::schedule_level(ScheduleResumed, t, stack_depth, &self.item));
        if self.cursor.offset_into_ms > 0 {
            if let Some((part, idx, seq_id)) = self.current_sequence() {
                log.push(PlaybackLogDetail::sequence_level(SequenceResumed, t, stack_depth, &self.item, part.wire(), idx, &seq_id, self.cursor.offset_into_ms));
            }
        }
    }

    /// Alias for [`Self::resume`], named to match §4.6's "resume(t) /
    /// advance_paused_time(t)" — used when a parent entry on the stack is
    /// un-suspended because the child above it stopped, rather than by an
    /// explicit user resume.
    pub fn advance_paused_time(&mut self, t: i64, stack_depth: usize, log: &mut Vec<PlaybackLogDetail>) {
        self.resume(t, stack_depth, log);
    }

    /// `stop(t)`: advance to `t`; emit `Sequence Ended`/`Playlist Ended` if
    /// mid-flight, then `Schedule Stopped` (aborted) or `Schedule Ended`
    /// (already finished cleanly).
    pub fn stop(&mut self, t: i64, stack_depth: usize, log: &mut Vec<PlaybackLogDetail>, actions: &mut Vec<PlayAction>) {
        self.advance_to_time(t, stack_depth, log, actions);

        let finished_cleanly = matches!(self.cursor.phase, CursorPhase::Done);
        if !finished_cleanly {
            if let CursorPhase::InPart(part, idx) = self.cursor.phase {
                if let Some((seq_part, seq_idx, seq_id)) = self.current_sequence() {
                    let _ = (seq_part, seq_idx);
                    log.push(PlaybackLogDetail::sequence_level(SequenceEnded, t, stack_depth, &self.item, part.wire(), idx, &seq_id, self.cursor.offset_into_ms));
                }
                log.push(PlaybackLogDetail::playlist_level(PlaylistEnded, t, stack_depth, &self.item, part.wire(), idx));
            }
            self.cursor.phase = CursorPhase::Done;
            log.push(PlaybackLogDetail::schedule_level(ScheduleStopped, t, stack_depth, &self.item));
        } else {
            log.push(PlaybackLogDetail::schedule_level(ScheduleEnded, t, stack_depth, &self.item));
        }
        actions.push(PlayAction::end(t));
    }
}
