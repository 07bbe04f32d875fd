//! `RunState` (§4.7, C7): the top-level scheduler. Owns the future queue,
//! priority heap, preemption stack, and interactive command slots, and
//! drives `run_until` — the one place all mutation happens (§5).

use log::{debug, info};

use crate::error::ValidationWarning;
use crate::events::{EventType, PlaybackLogDetail, PlayAction};
use crate::heap::PriorityHeap;
use crate::item::{self, CommandTarget, InteractiveCommand, PlaybackItem};
use crate::library::{set_up_sequences, Libraries};
use crate::model::{ItemType, Playlist, ScheduledPlaylist, Sequence};

use crate::cursor::PlaybackStateEntry;

/// Fallback iteration cap used when `run_until`'s `limit` is `None` or `<= 0`
/// (§9 design notes).
const DEFAULT_ITERATION_CAP: usize = 10_000;

/// Current time, the three containers, and the installed libraries.
pub struct RunState {
    pub current_time: i64,
    upcoming: Vec<PlaybackItem>,
    heap: PriorityHeap,
    stack: Vec<PlaybackStateEntry>,
    interactive_queue: Vec<InteractiveCommand>,
    immediate_item: Option<InteractiveCommand>,
    libraries: Libraries,
}

impl RunState {
    pub fn new(current_time: i64) -> Self {
        Self {
            current_time,
            upcoming: Vec::new(),
            heap: PriorityHeap::new(),
            stack: Vec::new(),
            interactive_queue: Vec::new(),
            immediate_item: None,
            libraries: Libraries::default(),
        }
    }

    pub fn libraries(&self) -> &Libraries {
        &self.libraries
    }

    pub fn stack(&self) -> &[PlaybackStateEntry] {
        &self.stack
    }

    pub fn heap(&self) -> &PriorityHeap {
        &self.heap
    }

    pub fn upcoming(&self) -> &[PlaybackItem] {
        &self.upcoming
    }

    pub fn interactive_queue(&self) -> &[InteractiveCommand] {
        &self.interactive_queue
    }

    /// Rebuild the library maps. Does not mutate the stack (§3 lifecycle 1).
    pub fn set_up_sequences(&mut self, seqs: Vec<Sequence>, playlists: Vec<Playlist>, schedules: Vec<ScheduledPlaylist>, warnings: &mut Vec<ValidationWarning>) {
        self.libraries = set_up_sequences(seqs, playlists, schedules, warnings);
    }

    /// Whether `id` is already occupying a slot in upcoming, the heap, or
    /// the stack — the dedup check every promotion step performs before
    /// admitting a newly-materialized item (§9: avoid duplicating the item).
    fn id_is_active(&self, id: &str) -> bool {
        self.upcoming.iter().any(|i| i.item_id == id) || self.heap.iter().any(|i| i.item_id == id) || self.stack.iter().any(|e| e.item.item_id == id)
    }

    /// `add_time_range_to_schedule(start, end, prefer_starting_new)` (§6):
    /// scan non-deleted schedules whose window intersects `[start, end)`,
    /// materializing strictly-future ones into `upcoming` and
    /// now-or-already-past ones directly into the heap (where a past one is
    /// purged with `Schedule Prevented` on the next `run_until` call).
    pub fn add_time_range_to_schedule(&mut self, start: i64, end: i64, prefer_starting_new: bool, warnings: &mut Vec<ValidationWarning>) {
        let schedules: Vec<ScheduledPlaylist> = self.libraries.schedules.values().cloned().collect();
        for sched in &schedules {
            let (s_start, s_end) = match sched.window_ms() {
                Ok(window) => window,
                Err(e) => {
                    log::warn!("skipping schedule {:?}: {}", sched.id, e);
                    continue;
                }
            };
            if s_end <= s_start {
                continue; // never matches any instant
            }
            if !(s_start < end && s_end > start) {
                continue; // no overlap with the requested window
            }
            if self.id_is_active(&sched.id) {
                continue;
            }

            let item = item::build_from_scheduled(sched, s_start, s_end, &self.libraries.playlists, &self.libraries.sequences, prefer_starting_new, warnings);
            if s_start > self.current_time {
                let pos = self.upcoming.partition_point(|i| i.sched_start <= item.sched_start);
                self.upcoming.insert(pos, item);
            } else {
                self.heap.insert(item);
            }
        }
    }

    /// `playsong`/`playplaylist`/etc. (§6): route an interactive command to
    /// `immediate_item` or the sorted `interactive_queue`.
    pub fn add_interactive_command(&mut self, cmd: InteractiveCommand) {
        if cmd.immediate {
            self.immediate_item = Some(cmd);
        } else {
            let pos = self.interactive_queue.partition_point(|c| c.start_time <= cmd.start_time);
            self.interactive_queue.insert(pos, cmd);
        }
    }

    /// Convenience wrapper over [`Self::add_interactive_command`] for a
    /// single sequence id.
    pub fn playsong(&mut self, seq_id: &str, immediate: bool, request_id: &str, start_time: i64) {
        self.add_interactive_command(InteractiveCommand {
            request_id: request_id.to_string(),
            immediate,
            start_time,
            target: CommandTarget::Sequence(seq_id.to_string()),
        });
    }

    /// Convenience wrapper over [`Self::add_interactive_command`] for a
    /// whole playlist.
    pub fn playplaylist(&mut self, playlist_id: &str, immediate: bool, request_id: &str, start_time: i64) {
        self.add_interactive_command(InteractiveCommand {
            request_id: request_id.to_string(),
            immediate,
            start_time,
            target: CommandTarget::Playlist(playlist_id.to_string()),
        });
    }

    /// `deleterequest(request_id)` (§6): remove `request_id` from every
    /// container it might be sitting in. The stack entry (if any) is
    /// removed in place, not re-ordered.
    pub fn delete_request(&mut self, request_id: &str) {
        self.interactive_queue.retain(|c| c.request_id != request_id);
        if self.immediate_item.as_ref().map(|c| c.request_id.as_str()) == Some(request_id) {
            self.immediate_item = None;
        }
        self.upcoming.retain(|i| i.item_id != request_id);
        if let Some(idx) = self.heap.find_index(|i| i.item_id == request_id) {
            self.heap.delete_at(idx);
        }
        self.stack.retain(|e| e.item.item_id != request_id);
    }

    /// `clearrequests` (§6): drop every queued interactive item. Heap/stack
    /// remnants of already-materialized requests are left to play out and
    /// are handled by the next `run_until` cycle.
    pub fn clear_requests(&mut self) {
        self.interactive_queue.clear();
        self.immediate_item = None;
    }

    /// `stop_all` (§3 lifecycle 5): pop the entire stack, logging a
    /// synthetic `Schedule Stopped`/`Ended` for each entry at `t`.
    pub fn stop_all(&mut self, t: i64, log: &mut Vec<PlaybackLogDetail>, actions: &mut Vec<PlayAction>) {
        self.current_time = self.current_time.max(t);
        while let Some(mut entry) = self.stack.pop() {
            let depth = self.stack.len() + 1;
            entry.stop(t, depth, log, actions);
        }
    }

    /// `pause(t)`: suspend the current stack top in place.
    pub fn pause(&mut self, t: i64, log: &mut Vec<PlaybackLogDetail>, actions: &mut Vec<PlayAction>) {
        self.current_time = self.current_time.max(t);
        if let Some(top) = self.stack.last_mut() {
            let depth = self.stack.len();
            top.suspend(t, depth, log, actions);
        }
    }

    /// `resume(t)`: resume the current stack top.
    pub fn resume(&mut self, t: i64, log: &mut Vec<PlaybackLogDetail>) {
        self.current_time = self.current_time.max(t);
        if let Some(top) = self.stack.last_mut() {
            let depth = self.stack.len();
            top.resume(t, depth, log);
        }
    }

    /// `run_until(et, limit?, log)` (§4.7): the scheduler's main loop.
    /// Advances `current_time` toward `et`, mutating `log`/`actions` in
    /// place. Stops early once `log.len() >= limit` (when `limit` is set)
    /// or an internal iteration ceiling is hit.
    pub fn run_until(&mut self, et: i64, limit: Option<usize>, log: &mut Vec<PlaybackLogDetail>, actions: &mut Vec<PlayAction>, warnings: &mut Vec<ValidationWarning>) {
        self.run_until_with_cap(et, limit, None, log, actions, warnings)
    }

    /// Like [`Self::run_until`] but lets a caller override the defensive
    /// `10*limit+100` iteration ceiling directly (§9 tuning knob).
    pub fn run_until_with_cap(
        &mut self,
        et: i64,
        limit: Option<usize>,
        iteration_cap_override: Option<usize>,
        log: &mut Vec<PlaybackLogDetail>,
        actions: &mut Vec<PlayAction>,
        warnings: &mut Vec<ValidationWarning>,
    ) {
        let iteration_cap = iteration_cap_override.unwrap_or_else(|| match limit {
            Some(n) if n > 0 => 10 * n + 100,
            _ => DEFAULT_ITERATION_CAP,
        });
        let mut iterations = 0usize;

        while self.current_time < et {
            iterations += 1;
            if iterations > iteration_cap {
                debug!("run_until: iteration cap {} reached at t={}", iteration_cap, self.current_time);
                break;
            }
            if let Some(n) = limit {
                if n > 0 && log.len() >= n {
                    break;
                }
            }

            // 1. Purge dead heap entries.
            while let Some(top) = self.heap.top() {
                if top.sched_end <= self.current_time {
                    let dead = self.heap.delete_top().unwrap();
                    log.push(PlaybackLogDetail::schedule_level(EventType::SchedulePrevented, self.current_time, self.stack.len(), &dead));
                } else {
                    break;
                }
            }

            // 2. Promote upcoming occurrences that have come due.
            while let Some(first) = self.upcoming.first() {
                if first.sched_start > self.current_time {
                    break;
                }
                let candidate = self.upcoming.remove(0);
                if !self.id_is_active(&candidate.item_id) {
                    self.heap.insert(candidate);
                }
            }

            // 3. Promote the immediate slot.
            let immediate_ready = matches!(&self.immediate_item, Some(cmd) if cmd.start_time <= self.current_time);
            if immediate_ready {
                let cmd = self.immediate_item.take().unwrap();
                let materialized = item::build_from_interactive(&cmd, self.current_time, &self.libraries.schedules, &self.libraries.playlists, &self.libraries.sequences, warnings);
                if !self.id_is_active(&materialized.item_id) {
                    self.heap.insert(materialized);
                }
            }

            // 4. Promote due queued interactive commands.
            while let Some(first) = self.interactive_queue.first() {
                if first.start_time > self.current_time {
                    break;
                }
                let cmd = self.interactive_queue.remove(0);
                let materialized = item::build_from_interactive(&cmd, self.current_time, &self.libraries.schedules, &self.libraries.playlists, &self.libraries.sequences, warnings);
                if !self.id_is_active(&materialized.item_id) {
                    self.heap.insert(materialized);
                }
            }

            // 5. Drain finished stack items.
            loop {
                let should_abort = matches!(self.stack.last(), Some(top) if top.should_abort(self.current_time));
                if !should_abort {
                    break;
                }
                let depth = self.stack.len();
                let mut finished = self.stack.pop().unwrap();
                finished.stop(self.current_time, depth, log, actions);
                if let Some(parent) = self.stack.last_mut() {
                    let parent_depth = self.stack.len();
                    parent.advance_paused_time(self.current_time, parent_depth, log);
                }
            }

            // 6. Decide preemption.
            let mut heap_cut_in: Option<i64> = None;
            if !self.heap.is_empty() {
                let ranks_above = {
                    let h = self.heap.top().unwrap();
                    match self.stack.last() {
                        None => true,
                        Some(s) => PriorityHeap::ranks_above(h, &s.item),
                    }
                };

                if ranks_above {
                    let push_now = {
                        let h = self.heap.top().unwrap();
                        match self.stack.last() {
                            None => true,
                            Some(s) => s.item.prefer_hard_cut_in || h.hard_cut_in || s.next_graceful_interruption_time(self.current_time) == self.current_time,
                        }
                    };

                    if push_now {
                        if let Some(mut prev) = self.stack.pop() {
                            let depth = self.stack.len() + 1;
                            let keep = prev.item.item_type != ItemType::Immediate;
                            if keep {
                                prev.suspend(self.current_time, depth, log, actions);
                                self.stack.push(prev);
                            } else {
                                prev.stop(self.current_time, depth, log, actions);
                            }
                        }
                        let h_item = self.heap.delete_top().unwrap();
                        let new_entry = PlaybackStateEntry::new(h_item, self.current_time);
                        let new_depth = self.stack.len() + 1;
                        log.push(PlaybackLogDetail::schedule_level(EventType::ScheduleStarted, self.current_time, new_depth, &new_entry.item));
                        info!("schedule {:?} started at t={}", new_entry.item.schedule_id, self.current_time);
                        self.stack.push(new_entry);
                    } else {
                        let s = self.stack.last().unwrap();
                        heap_cut_in = Some(s.next_graceful_interruption_time(self.current_time));
                    }
                } else {
                    let h = self.heap.top().unwrap();
                    if h.sched_start == self.current_time {
                        log.push(PlaybackLogDetail::schedule_level(EventType::ScheduleDeferred, self.current_time, self.stack.len(), h));
                    }
                }
            }

            // 7. Compute next decision time.
            let mut next = et;
            if let Some(top) = self.stack.last() {
                next = next.min(top.next_decision_time(self.current_time));
            }
            if let Some(cut_in) = heap_cut_in {
                next = next.min(cut_in);
            }
            if let Some(first) = self.upcoming.first() {
                next = next.min(first.sched_start);
            }
            if let Some(cmd) = &self.immediate_item {
                next = next.min(cmd.start_time.max(self.current_time));
            }
            if let Some(cmd) = self.interactive_queue.first() {
                next = next.min(cmd.start_time);
            }
            if let Some(h) = self.heap.top() {
                next = next.min(h.sched_end);
            }
            next = next.max(self.current_time);

            // 8. Advance.
            if let Some(top) = self.stack.last_mut() {
                let depth = self.stack.len();
                top.advance_to_time(next, depth, log, actions);
            }
            self.current_time = next;

            // 9. Stop conditions are re-checked at the top of the loop.
        }
    }

    /// `read_out_schedule_until(et, limit?)`: drive `run_until` and return
    /// the accumulated log and action stream as fresh vectors, for callers
    /// that don't want to pre-allocate sinks themselves.
    pub fn read_out_schedule_until(&mut self, et: i64, limit: Option<usize>, warnings: &mut Vec<ValidationWarning>) -> (Vec<PlaybackLogDetail>, Vec<PlayAction>) {
        let mut log = Vec::new();
        let mut actions = Vec::new();
        self.run_until(et, limit, &mut log, &mut actions, warnings);
        (log, actions)
    }

    /// Like [`Self::read_out_schedule_until`] but with an iteration-cap override.
    pub fn read_out_schedule_until_with_cap(
        &mut self,
        et: i64,
        limit: Option<usize>,
        iteration_cap_override: Option<usize>,
        warnings: &mut Vec<ValidationWarning>,
    ) -> (Vec<PlaybackLogDetail>, Vec<PlayAction>) {
        let mut log = Vec::new();
        let mut actions = Vec::new();
        self.run_until_with_cap(et, limit, iteration_cap_override, &mut log, &mut actions, warnings);
        (log, actions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EndPolicy, Priority, SequenceSettings, SequenceWork};
    use crate::model::{Playlist as PlaylistModel, PlaylistItem};

    fn bt() -> i64 {
        0 // midnight epoch of an arbitrary date
    }

    fn one_song_fixtures() -> (Vec<Sequence>, Vec<PlaylistModel>, Vec<ScheduledPlaylist>) {
        let seqs = vec![Sequence {
            id: "rec1".into(),
            instance_id: None,
            work: SequenceWork { length: 200.0 },
            settings: SequenceSettings {
                lead_time: Some(0.1),
                trail_time: Some(-0.2),
            },
            deleted: false,
        }];
        let playlists = vec![PlaylistModel {
            id: "pl1".into(),
            title: "pl1".into(),
            items: vec![PlaylistItem {
                seq_id: "rec1".into(),
                ordinal: 0,
            }],
            deleted: false,
        }];
        let schedules = vec![ScheduledPlaylist {
            id: "ps1NoLoop".into(),
            playlist_id: "pl1".into(),
            pre_playlist_id: None,
            post_playlist_id: None,
            date: bt(),
            from_time: "18:00".into(),
            to_time: "19:00".into(),
            shuffle: false,
            loop_playback: false,
            hard_cut_in: false,
            prefer_hard_cut_in: false,
            keep_to_schedule_when_preempted: false,
            end_policy: EndPolicy::SeqBoundNearest,
            priority: Priority::Medium,
            deleted: false,
        }];
        (seqs, playlists, schedules)
    }

    #[test]
    fn linear_one_song_emits_exactly_six_events_at_the_right_times() {
        let (seqs, playlists, schedules) = one_song_fixtures();
        let mut warnings = Vec::new();
        let mut rs = RunState::new(bt());
        rs.set_up_sequences(seqs, playlists, schedules, &mut warnings);
        rs.add_time_range_to_schedule(bt(), bt() + crate::time::DAY_MS, true, &mut warnings);

        let (log, _actions) = rs.read_out_schedule_until(bt() + 24 * 3_600_000, None, &mut warnings);

        assert_eq!(log.len(), 6, "{log:#?}");
        let eighteen_h = 18 * 3_600_000;
        assert_eq!(log[0].event_type, EventType::ScheduleStarted);
        assert_eq!(log[0].event_time_ms, eighteen_h);
        assert_eq!(log[1].event_type, EventType::PlaylistStarted);
        assert_eq!(log[2].event_type, EventType::SequenceStarted);
        assert_eq!(log[3].event_type, EventType::SequenceEnded);
        assert_eq!(log[3].event_time_ms, eighteen_h + 199_900);
        assert_eq!(log[4].event_type, EventType::PlaylistEnded);
        assert_eq!(log[5].event_type, EventType::ScheduleEnded);
        assert_eq!(log[5].event_time_ms, eighteen_h + 199_900);
    }

    #[test]
    fn half_and_stop_appends_three_events_at_the_stop_instant() {
        let (seqs, playlists, schedules) = one_song_fixtures();
        let mut warnings = Vec::new();
        let mut rs = RunState::new(bt());
        rs.set_up_sequences(seqs, playlists, schedules, &mut warnings);
        rs.add_time_range_to_schedule(bt(), bt() + crate::time::DAY_MS, true, &mut warnings);

        let eighteen_h = 18 * 3_600_000;
        let mut log = Vec::new();
        let mut actions = Vec::new();
        rs.run_until(eighteen_h + 10_000, None, &mut log, &mut actions, &mut warnings);
        assert_eq!(log.len(), 3);

        rs.stop_all(eighteen_h + 10_000, &mut log, &mut actions);
        assert_eq!(log.len(), 6);
        assert!(log[3..].iter().all(|e| e.event_time_ms == eighteen_h + 10_000));
        assert_eq!(log[5].event_type, EventType::ScheduleStopped);
    }

    #[test]
    fn a_schedule_entirely_in_the_past_is_prevented_not_started() {
        let (seqs, playlists, mut schedules) = one_song_fixtures();
        schedules[0].to_time = "18:00:01".into();
        let mut warnings = Vec::new();
        let mut rs = RunState::new(19 * 3_600_000); // already past the window
        rs.set_up_sequences(seqs, playlists, schedules, &mut warnings);
        rs.add_time_range_to_schedule(0, 24 * 3_600_000, true, &mut warnings);

        let (log, _actions) = rs.read_out_schedule_until(20 * 3_600_000, None, &mut warnings);
        assert!(log.iter().any(|e| e.event_type == EventType::SchedulePrevented));
        assert!(!log.iter().any(|e| e.event_type == EventType::ScheduleStarted));
    }

    #[test]
    fn preemption_suspends_the_low_priority_item_and_resumes_it() {
        let mut seqs = Vec::new();
        for i in 1..=2 {
            seqs.push(Sequence {
                id: format!("s{i}"),
                instance_id: None,
                work: SequenceWork { length: 600.0 },
                settings: SequenceSettings::default(),
                deleted: false,
            });
        }
        let playlists = vec![
            PlaylistModel {
                id: "a".into(),
                title: "a".into(),
                items: vec![PlaylistItem {
                    seq_id: "s1".into(),
                    ordinal: 0,
                }],
                deleted: false,
            },
            PlaylistModel {
                id: "b".into(),
                title: "b".into(),
                items: vec![PlaylistItem {
                    seq_id: "s2".into(),
                    ordinal: 0,
                }],
                deleted: false,
            },
        ];
        let schedules = vec![
            ScheduledPlaylist {
                id: "A".into(),
                playlist_id: "a".into(),
                pre_playlist_id: None,
                post_playlist_id: None,
                date: bt(),
                from_time: "18:00".into(),
                to_time: "18:10".into(),
                shuffle: false,
                loop_playback: true,
                hard_cut_in: false,
                prefer_hard_cut_in: false,
                keep_to_schedule_when_preempted: false,
                end_policy: EndPolicy::SeqBoundNearest,
                priority: Priority::Low,
                deleted: false,
            },
            ScheduledPlaylist {
                id: "B".into(),
                playlist_id: "b".into(),
                pre_playlist_id: None,
                post_playlist_id: None,
                date: bt(),
                from_time: "18:01".into(),
                to_time: "18:05".into(),
                shuffle: false,
                loop_playback: false,
                hard_cut_in: true,
                prefer_hard_cut_in: false,
                keep_to_schedule_when_preempted: false,
                end_policy: EndPolicy::SeqBoundNearest,
                priority: Priority::Medium,
                deleted: false,
            },
        ];
        let mut warnings = Vec::new();
        let mut rs = RunState::new(bt());
        rs.set_up_sequences(seqs, playlists, schedules, &mut warnings);
        rs.add_time_range_to_schedule(bt(), bt() + crate::time::DAY_MS, true, &mut warnings);

        let (log, _actions) = rs.read_out_schedule_until(18 * 3_600_000 + 6 * 60_000, None, &mut warnings);
        assert!(log.iter().any(|e| e.event_type == EventType::ScheduleSuspended));
        assert!(log.iter().any(|e| e.event_type == EventType::ScheduleResumed));
        let suspended_at = log.iter().find(|e| e.event_type == EventType::ScheduleSuspended).unwrap().event_time_ms;
        assert_eq!(suspended_at, 18 * 3_600_000 + 60_000);
    }

    /// Runs the A/B preemption fixture with `A.keep_to_schedule_when_preempted`
    /// set as given, reads out past B's run, and returns A's `base_time_ms`
    /// once it's back on top of the stack.
    fn run_preemption_and_get_resumed_base_time(keep_to_schedule_when_preempted: bool) -> i64 {
        let mut seqs = Vec::new();
        for i in 1..=2 {
            seqs.push(Sequence {
                id: format!("s{i}"),
                instance_id: None,
                work: SequenceWork { length: 600.0 },
                settings: SequenceSettings::default(),
                deleted: false,
            });
        }
        let playlists = vec![
            PlaylistModel {
                id: "a".into(),
                title: "a".into(),
                items: vec![PlaylistItem {
                    seq_id: "s1".into(),
                    ordinal: 0,
                }],
                deleted: false,
            },
            PlaylistModel {
                id: "b".into(),
                title: "b".into(),
                items: vec![PlaylistItem {
                    seq_id: "s2".into(),
                    ordinal: 0,
                }],
                deleted: false,
            },
        ];
        let schedules = vec![
            ScheduledPlaylist {
                id: "A".into(),
                playlist_id: "a".into(),
                pre_playlist_id: None,
                post_playlist_id: None,
                date: bt(),
                from_time: "18:00".into(),
                to_time: "18:10".into(),
                shuffle: false,
                loop_playback: true,
                hard_cut_in: false,
                prefer_hard_cut_in: false,
                keep_to_schedule_when_preempted,
                end_policy: EndPolicy::SeqBoundNearest,
                priority: Priority::Low,
                deleted: false,
            },
            ScheduledPlaylist {
                id: "B".into(),
                playlist_id: "b".into(),
                pre_playlist_id: None,
                post_playlist_id: None,
                date: bt(),
                from_time: "18:01".into(),
                to_time: "18:05".into(),
                shuffle: false,
                loop_playback: false,
                hard_cut_in: true,
                prefer_hard_cut_in: false,
                keep_to_schedule_when_preempted: false,
                end_policy: EndPolicy::SeqBoundNearest,
                priority: Priority::Medium,
                deleted: false,
            },
        ];
        let mut warnings = Vec::new();
        let mut rs = RunState::new(bt());
        rs.set_up_sequences(seqs, playlists, schedules, &mut warnings);
        rs.add_time_range_to_schedule(bt(), bt() + crate::time::DAY_MS, true, &mut warnings);

        let (log, _actions) = rs.read_out_schedule_until(18 * 3_600_000 + 6 * 60_000, None, &mut warnings);
        assert!(log.iter().any(|e| e.event_type == EventType::ScheduleResumed));

        let top = rs.stack().last().expect("A should be back on top once B finishes");
        assert_eq!(top.item.schedule_id.as_deref(), Some("A"));
        top.cursor.base_time_ms
    }

    #[test]
    fn keep_to_schedule_when_preempted_resumes_a_at_a_later_cursor_than_the_default() {
        // Default (`false`): the suspended interval is added back onto
        // `base_time_ms`, so content resumes exactly where A left off.
        let default_base_time = run_preemption_and_get_resumed_base_time(false);
        // `true`: lost time stays lost, so `base_time_ms` is never shifted
        // forward — at the same resume instant, that's an earlier
        // `base_time_ms`, meaning more elapsed content time, i.e. a later
        // cursor position within A.
        let kept_base_time = run_preemption_and_get_resumed_base_time(true);
        assert!(
            kept_base_time < default_base_time,
            "keep_to_schedule_when_preempted=true should resume A at a later cursor \
             (smaller base_time_ms) than the default; got kept={kept_base_time} default={default_base_time}"
        );
    }

    #[test]
    fn delete_request_removes_a_queued_interactive_command() {
        let mut rs = RunState::new(bt());
        rs.playsong("s1", false, "req1", bt() + 5_000);
        assert_eq!(rs.interactive_queue.len(), 1);
        rs.delete_request("req1");
        assert!(rs.interactive_queue.is_empty());
    }

    #[test]
    fn clear_requests_drops_immediate_and_queued_but_not_the_stack() {
        let mut rs = RunState::new(bt());
        rs.playsong("s1", true, "immediate1", 0);
        rs.playsong("s2", false, "queued1", bt() + 5_000);
        rs.clear_requests();
        assert!(rs.immediate_item.is_none());
        assert!(rs.interactive_queue.is_empty());
    }
}
