//! Event log and play-action wire formats (§6).

use serde::{Deserialize, Serialize};

use crate::item::PlaybackItem;

/// The closed set of state-transition events the scheduler can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    ScheduleStarted,
    ScheduleStopped,
    ScheduleEnded,
    SchedulePrevented,
    ScheduleDeferred,
    ScheduleSuspended,
    ScheduleResumed,
    PlaylistStarted,
    PlaylistEnded,
    SequenceStarted,
    SequenceEnded,
    SequencePaused,
    SequenceResumed,
}

/// Which sub-playlist an entry/index pair refers to, for
/// `entry_into_playlist`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistPart {
    Pre,
    Main,
    Post,
}

impl PlaylistPart {
    fn as_i64(self) -> i64 {
        match self {
            PlaylistPart::Pre => 0,
            PlaylistPart::Main => 1,
            PlaylistPart::Post => 2,
        }
    }
}

/// One entry in the event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackLogDetail {
    pub event_type: EventType,
    pub event_time_ms: i64,
    pub stack_depth: usize,
    pub schedule_id: Option<String>,
    pub playlist_id: Option<String>,
    pub sequence_id: Option<String>,
    pub request_id: Option<String>,
    pub entry_into_playlist: Option<(i64, i64)>,
    pub time_into_seq_ms: Option<i64>,
}

impl PlaybackLogDetail {
    /// Build a schedule-level log entry (no playlist/sequence context).
    pub fn schedule_level(event_type: EventType, event_time_ms: i64, stack_depth: usize, item: &PlaybackItem) -> Self {
        Self {
            event_type,
            event_time_ms,
            stack_depth,
            schedule_id: item.schedule_id.clone(),
            playlist_id: None,
            sequence_id: None,
            request_id: item.request_id.clone(),
            entry_into_playlist: None,
            time_into_seq_ms: None,
        }
    }

    /// Build a playlist-level log entry (`Playlist Started`/`Ended`).
    pub fn playlist_level(event_type: EventType, event_time_ms: i64, stack_depth: usize, item: &PlaybackItem, part: PlaylistPart, index: i64) -> Self {
        let playlist_id = match part {
            PlaylistPart::Pre => item.pre_playlist_id.clone(),
            PlaylistPart::Main => item.main_playlist_id.clone(),
            PlaylistPart::Post => item.post_playlist_id.clone(),
        };
        Self {
            event_type,
            event_time_ms,
            stack_depth,
            schedule_id: item.schedule_id.clone(),
            playlist_id,
            sequence_id: None,
            request_id: item.request_id.clone(),
            entry_into_playlist: Some((part.as_i64(), index)),
            time_into_seq_ms: None,
        }
    }

    /// Build a sequence-level log entry (`Sequence Started`/`Ended`/etc.).
    pub fn sequence_level(event_type: EventType, event_time_ms: i64, stack_depth: usize, item: &PlaybackItem, part: PlaylistPart, index: i64, seq_id: &str, time_into_seq_ms: i64) -> Self {
        let playlist_id = match part {
            PlaylistPart::Pre => item.pre_playlist_id.clone(),
            PlaylistPart::Main => item.main_playlist_id.clone(),
            PlaylistPart::Post => item.post_playlist_id.clone(),
        };
        Self {
            event_type,
            event_time_ms,
            stack_depth,
            schedule_id: item.schedule_id.clone(),
            playlist_id,
            sequence_id: Some(seq_id.to_string()),
            request_id: item.request_id.clone(),
            entry_into_playlist: Some((part.as_i64(), index)),
            time_into_seq_ms: Some(time_into_seq_ms),
        }
    }
}

/// A pending instruction to render a specific sequence at a specific offset
/// for a specific duration, or a terminal `{ end: true }` marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayAction {
    pub end: bool,
    pub at_time_ms: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seq_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset_ms: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<i64>,
}

impl PlayAction {
    pub fn play(at_time_ms: i64, seq_id: &str, offset_ms: i64, duration_ms: i64) -> Self {
        Self {
            end: false,
            at_time_ms,
            seq_id: Some(seq_id.to_string()),
            offset_ms: Some(offset_ms),
            duration_ms: Some(duration_ms),
        }
    }

    pub fn end(at_time_ms: i64) -> Self {
        Self {
            end: true,
            at_time_ms,
            seq_id: None,
            offset_ms: None,
            duration_ms: None,
        }
    }
}
