//! `PlaybackItem` builder (§4.5): materializes a schedule occurrence or an
//! interactive command into a concrete pre/main/post triple with expanded
//! shuffle and resolved durations.

use crate::duration::resolve_duration_ms;
use crate::error::ValidationWarning;
use crate::library::Library;
use crate::model::{EndPolicy, ItemType, Playlist, ScheduledPlaylist, Sequence};
use crate::shuffle::create_shuffle_list;
use crate::time::DAY_MS;

/// A resolved, ordered run of sequences with per-item and total durations.
#[derive(Debug, Clone, Default)]
pub struct Section {
    pub seq_ids: Vec<String>,
    pub durations_ms: Vec<i64>,
    pub total_ms: i64,
}

/// The main (loopable) section, which additionally tracks the longest
/// single item (used by the `seqboundnearest` end policy) and whether it
/// loops.
#[derive(Debug, Clone, Default)]
pub struct MainSection {
    pub seq_ids: Vec<String>,
    pub durations_ms: Vec<i64>,
    pub total_ms: i64,
    pub longest_ms: i64,
    pub loop_playback: bool,
}

/// A materialized occurrence: a schedule or an interactive command, resolved
/// into concrete pre/main/post sections ready to be driven by a cursor.
#[derive(Debug, Clone)]
pub struct PlaybackItem {
    pub item_type: ItemType,
    pub priority_tier: u8,
    pub time_based_pri: i64,
    pub cut_off_previous: bool,
    pub hard_cut_in: bool,
    pub prefer_hard_cut_in: bool,
    pub keep_to_schedule_when_preempted: bool,
    pub end_policy: EndPolicy,
    /// Schedule id or request id, per §3.
    pub item_id: String,
    pub schedule_id: Option<String>,
    pub request_id: Option<String>,
    /// Originating playlist ids, carried for event-log enrichment only —
    /// not part of the spec's `PlaybackItem` shape, but needed to populate
    /// `PlaybackLogDetail.playlist_id`.
    pub pre_playlist_id: Option<String>,
    pub main_playlist_id: Option<String>,
    pub post_playlist_id: Option<String>,
    pub pre_section: Section,
    pub main_section: MainSection,
    pub post_section: Section,
    pub sched_start: i64,
    pub sched_end: i64,
}

fn resolve_section(playlist_id: Option<&str>, playlists: &Library<Playlist>, seqs: &Library<Sequence>, warnings: &mut Vec<ValidationWarning>) -> Section {
    let Some(pid) = playlist_id else {
        return Section::default();
    };
    let Some(playlist) = playlists.get(pid) else {
        warnings.push(ValidationWarning::DanglingPlaylistReference(String::new(), pid.to_string()));
        return Section::default();
    };

    let mut seq_ids = Vec::new();
    let mut durations_ms = Vec::new();
    let mut total_ms = 0;
    for item in playlist.ordered_items() {
        let dur = resolve_duration_ms(&item.seq_id, seqs, warnings);
        seq_ids.push(item.seq_id.clone());
        durations_ms.push(dur);
        total_ms += dur;
    }
    Section {
        seq_ids,
        durations_ms,
        total_ms,
    }
}

/// Build the main section: shuffled (seeded by `seed`) if `shuffle`,
/// otherwise the playlist's own order. `loop_playback` is set whenever the
/// caller asked to loop OR to shuffle, per §4.5.
fn build_main_section(playlist: &Playlist, seqs: &Library<Sequence>, shuffle: bool, loop_playback: bool, seed: i64, min_ms: i64, warnings: &mut Vec<ValidationWarning>) -> MainSection {
    let ordered: Vec<String> = playlist
        .ordered_items()
        .into_iter()
        .map(|item| item.seq_id.clone())
        .collect();

    let seq_ids = if shuffle {
        create_shuffle_list(&ordered, &playlist.id, seed, min_ms, seqs, warnings)
    } else {
        ordered
    };

    let mut durations_ms = Vec::new();
    let mut total_ms = 0i64;
    let mut longest_ms = 0i64;
    for id in &seq_ids {
        let dur = resolve_duration_ms(id, seqs, warnings);
        durations_ms.push(dur);
        total_ms += dur;
        longest_ms = longest_ms.max(dur);
    }

    MainSection {
        seq_ids,
        durations_ms,
        total_ms,
        longest_ms,
        loop_playback: loop_playback || shuffle,
    }
}

/// Materialize a [`ScheduledPlaylist`] into a [`PlaybackItem`] covering
/// `[start_ms, end_ms)`. `cut_off_previous` comes from the caller (e.g.
/// `add_time_range_to_schedule`'s `prefer_starting_new`).
pub fn build_from_scheduled(sched: &ScheduledPlaylist, start_ms: i64, end_ms: i64, playlists: &Library<Playlist>, seqs: &Library<Sequence>, cut_off_previous: bool, warnings: &mut Vec<ValidationWarning>) -> PlaybackItem {
    let pre_section = resolve_section(sched.pre_playlist_id.as_deref(), playlists, seqs, warnings);
    let post_section = resolve_section(sched.post_playlist_id.as_deref(), playlists, seqs, warnings);

    let main_section = match playlists.get(&sched.playlist_id) {
        Some(playlist) => {
            if playlist.id != sched.playlist_id {
                // `Library` keys by `record.id`, so this can only fire if a caller
                // hands us a `Library` built outside `set_up_sequences`'s own
                // install step; warn and proceed with whatever we resolved (§7).
                warnings.push(ValidationWarning::PolicyInconsistency(sched.id.clone()));
            }
            build_main_section(playlist, seqs, sched.shuffle, sched.loop_playback, start_ms, (end_ms - start_ms).max(0), warnings)
        }
        None => {
            warnings.push(ValidationWarning::DanglingPlaylistReference(sched.id.clone(), sched.playlist_id.clone()));
            MainSection::default()
        }
    };

    PlaybackItem {
        item_type: ItemType::Scheduled,
        priority_tier: sched.priority.tier(),
        time_based_pri: start_ms,
        cut_off_previous,
        hard_cut_in: sched.hard_cut_in,
        prefer_hard_cut_in: sched.prefer_hard_cut_in,
        keep_to_schedule_when_preempted: sched.keep_to_schedule_when_preempted,
        end_policy: sched.end_policy,
        item_id: sched.id.clone(),
        schedule_id: Some(sched.id.clone()),
        request_id: None,
        pre_playlist_id: sched.pre_playlist_id.clone(),
        main_playlist_id: Some(sched.playlist_id.clone()),
        post_playlist_id: sched.post_playlist_id.clone(),
        pre_section,
        main_section,
        post_section,
        sched_start: start_ms,
        sched_end: end_ms,
    }
}

/// What an interactive command targets (§4.5 "From interactive command").
#[derive(Debug, Clone)]
pub enum CommandTarget {
    Schedule(String),
    Playlist(String),
    Sequence(String),
}

/// A `playsong`/`playplaylist`-style interactive request.
#[derive(Debug, Clone)]
pub struct InteractiveCommand {
    pub request_id: String,
    pub immediate: bool,
    /// `> 0` for an explicit start time; `0` means "start now".
    pub start_time: i64,
    pub target: CommandTarget,
}

/// Materialize an [`InteractiveCommand`] at logical time `t`.
pub fn build_from_interactive(cmd: &InteractiveCommand, t: i64, schedules: &Library<ScheduledPlaylist>, playlists: &Library<Playlist>, seqs: &Library<Sequence>, warnings: &mut Vec<ValidationWarning>) -> PlaybackItem {
    let sched_start = if cmd.start_time > 0 { cmd.start_time } else { t };
    let sched_end = sched_start + DAY_MS;
    let priority_tier = if cmd.immediate { 1 } else { 2 };
    let cut_off_previous = cmd.immediate;
    let hard_cut_in = cmd.immediate;

    let mut item = match &cmd.target {
        CommandTarget::Schedule(id) => match schedules.get(id) {
            Some(sched) => {
                let mut item = build_from_scheduled(sched, sched_start, sched_end, playlists, seqs, cut_off_previous, warnings);
                item.hard_cut_in = hard_cut_in;
                item
            }
            None => {
                warnings.push(ValidationWarning::DanglingScheduleReference(id.clone()));
                bare_item(sched_start, sched_end)
            }
        },
        CommandTarget::Playlist(id) => match playlists.get(id) {
            Some(playlist) => {
                let main_section = build_main_section(playlist, seqs, false, false, sched_start, 0, warnings);
                let mut item = bare_item(sched_start, sched_end);
                item.main_playlist_id = Some(id.clone());
                item.main_section = main_section;
                item
            }
            None => {
                warnings.push(ValidationWarning::DanglingPlaylistReference(cmd.request_id.clone(), id.clone()));
                bare_item(sched_start, sched_end)
            }
        },
        CommandTarget::Sequence(id) => {
            let dur = resolve_duration_ms(id, seqs, warnings);
            let mut item = bare_item(sched_start, sched_end);
            item.main_section = MainSection {
                seq_ids: vec![id.clone()],
                durations_ms: vec![dur],
                total_ms: dur,
                longest_ms: dur,
                loop_playback: false,
            };
            item
        }
    };

    item.item_type = if cmd.immediate { ItemType::Immediate } else { ItemType::Queued };
    item.priority_tier = priority_tier;
    item.time_based_pri = sched_start;
    item.cut_off_previous = cut_off_previous;
    item.hard_cut_in = hard_cut_in;
    item.item_id = cmd.request_id.clone();
    item.request_id = Some(cmd.request_id.clone());
    item
}

fn bare_item(sched_start: i64, sched_end: i64) -> PlaybackItem {
    PlaybackItem {
        item_type: ItemType::Queued,
        priority_tier: 2,
        time_based_pri: sched_start,
        cut_off_previous: false,
        hard_cut_in: false,
        prefer_hard_cut_in: false,
        keep_to_schedule_when_preempted: false,
        end_policy: EndPolicy::SeqBoundLate,
        item_id: String::new(),
        schedule_id: None,
        request_id: None,
        pre_playlist_id: None,
        main_playlist_id: None,
        post_playlist_id: None,
        pre_section: Section::default(),
        main_section: MainSection::default(),
        post_section: Section::default(),
        sched_start,
        sched_end,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::set_up_sequences;
    use crate::model::{Playlist, PlaylistItem, Priority, SequenceSettings, SequenceWork};

    fn fixture() -> (Library<Sequence>, Library<Playlist>) {
        let mut warnings = Vec::new();
        let seqs = vec![
            Sequence {
                id: "s1".into(),
                instance_id: None,
                work: SequenceWork { length: 10.0 },
                settings: SequenceSettings::default(),
                deleted: false,
            },
            Sequence {
                id: "s2".into(),
                instance_id: None,
                work: SequenceWork { length: 10.0 },
                settings: SequenceSettings::default(),
                deleted: false,
            },
        ];
        let playlists = vec![Playlist {
            id: "pl1".into(),
            title: "pl1".into(),
            items: vec![
                PlaylistItem {
                    seq_id: "s1".into(),
                    ordinal: 0,
                },
                PlaylistItem {
                    seq_id: "s2".into(),
                    ordinal: 1,
                },
            ],
            deleted: false,
        }];
        let libs = set_up_sequences(seqs, playlists, vec![], &mut warnings);
        (libs.sequences, libs.playlists)
    }

    #[test]
    fn non_looping_non_shuffled_schedule_keeps_playlist_order() {
        let (seqs, playlists) = fixture();
        let sched = ScheduledPlaylist {
            id: "ps1".into(),
            playlist_id: "pl1".into(),
            pre_playlist_id: None,
            post_playlist_id: None,
            date: 0,
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
        };
        let mut warnings = Vec::new();
        let item = build_from_scheduled(&sched, 0, 3_600_000, &playlists, &seqs, true, &mut warnings);
        assert_eq!(item.main_section.seq_ids, vec!["s1", "s2"]);
        assert!(!item.main_section.loop_playback);
        assert_eq!(item.main_section.total_ms, 20_000);
        assert_eq!(item.priority_tier, 5);
        assert!(item.cut_off_previous);
    }

    #[test]
    fn shuffle_forces_loop_playback_on() {
        let (seqs, playlists) = fixture();
        let sched = ScheduledPlaylist {
            id: "ps2".into(),
            playlist_id: "pl1".into(),
            pre_playlist_id: None,
            post_playlist_id: None,
            date: 0,
            from_time: "18:00".into(),
            to_time: "18:01".into(),
            shuffle: true,
            loop_playback: false,
            hard_cut_in: false,
            prefer_hard_cut_in: false,
            keep_to_schedule_when_preempted: false,
            end_policy: EndPolicy::SeqBoundNearest,
            priority: Priority::Medium,
            deleted: false,
        };
        let mut warnings = Vec::new();
        let item = build_from_scheduled(&sched, 0, 60_000, &playlists, &seqs, false, &mut warnings);
        assert!(item.main_section.loop_playback);
        assert!(item.main_section.total_ms >= 60_000);
    }

    #[test]
    fn interactive_sequence_command_has_a_single_main_item_and_no_pre_post() {
        let (seqs, playlists) = fixture();
        let schedules = Library::<ScheduledPlaylist>::default();
        let cmd = InteractiveCommand {
            request_id: "req1".into(),
            immediate: true,
            start_time: 0,
            target: CommandTarget::Sequence("s1".into()),
        };
        let mut warnings = Vec::new();
        let item = build_from_interactive(&cmd, 1_000, &schedules, &playlists, &seqs, &mut warnings);
        assert_eq!(item.main_section.seq_ids, vec!["s1"]);
        assert!(item.pre_section.seq_ids.is_empty());
        assert!(item.post_section.seq_ids.is_empty());
        assert_eq!(item.priority_tier, 1);
        assert!(item.hard_cut_in);
        assert_eq!(item.sched_start, 1_000);
        assert_eq!(item.item_id, "req1");
    }

    #[test]
    fn playlist_id_mismatch_against_the_resolved_library_key_is_a_warning_not_fatal() {
        let (seqs, mut playlists) = fixture();
        // Model a library built out-of-band, where the lookup key diverges
        // from the resolved playlist's own `id` field.
        let aliased = playlists.get("pl1").unwrap().clone();
        playlists.insert_for_test("pl1-alias", aliased);

        let sched = ScheduledPlaylist {
            id: "ps3".into(),
            playlist_id: "pl1-alias".into(),
            pre_playlist_id: None,
            post_playlist_id: None,
            date: 0,
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
        };
        let mut warnings = Vec::new();
        let item = build_from_scheduled(&sched, 0, 3_600_000, &playlists, &seqs, false, &mut warnings);

        assert_eq!(item.main_section.seq_ids, vec!["s1", "s2"]);
        assert!(warnings
            .iter()
            .any(|w| matches!(w, ValidationWarning::PolicyInconsistency(id) if id == "ps3")));
    }

    #[test]
    fn queued_playlist_command_has_tier_two_and_does_not_cut_off() {
        let (seqs, playlists) = fixture();
        let schedules = Library::<ScheduledPlaylist>::default();
        let cmd = InteractiveCommand {
            request_id: "req2".into(),
            immediate: false,
            start_time: 5_000,
            target: CommandTarget::Playlist("pl1".into()),
        };
        let mut warnings = Vec::new();
        let item = build_from_interactive(&cmd, 1_000, &schedules, &playlists, &seqs, &mut warnings);
        assert_eq!(item.priority_tier, 2);
        assert!(!item.cut_off_previous);
        assert_eq!(item.sched_start, 5_000);
        assert_eq!(item.main_section.seq_ids, vec!["s1", "s2"]);
    }
}
