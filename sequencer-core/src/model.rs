//! Library record shapes: sequences, playlists, and scheduled playlists.
//!
//! Every record is `serde`-round-trippable so a caller (the CLI, or any
//! future transport) can load and dump libraries as JSON, the same way the
//! teacher's `container::play_settings` module versions and serializes its
//! settings file.

use serde::{Deserialize, Serialize};

/// A single time-bounded media item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sequence {
    pub id: String,
    #[serde(default)]
    pub instance_id: Option<String>,
    pub work: SequenceWork,
    #[serde(default)]
    pub settings: SequenceSettings,
    #[serde(default)]
    pub deleted: bool,
}

/// The playable payload of a [`Sequence`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceWork {
    /// Length in seconds.
    pub length: f64,
}

/// Per-sequence lead/trail padding (or trim, via negative values).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SequenceSettings {
    /// Seconds; negative trims from the head instead of padding it.
    #[serde(default)]
    pub lead_time: Option<f64>,
    /// Seconds; negative trims from the tail instead of padding it.
    #[serde(default)]
    pub trail_time: Option<f64>,
}

/// A single entry in a playlist's ordered item list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistItem {
    pub seq_id: String,
    pub ordinal: i64,
}

/// An ordered reference to sequences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub items: Vec<PlaylistItem>,
    #[serde(default)]
    pub deleted: bool,
}

impl Playlist {
    /// Items sorted by `ordinal`, ascending.
    pub fn ordered_items(&self) -> Vec<&PlaylistItem> {
        let mut items: Vec<&PlaylistItem> = self.items.iter().collect();
        items.sort_by_key(|item| item.ordinal);
        items
    }
}

/// Playback priority tier; lower numeric tier wins at the priority heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    #[serde(rename = "highest")]
    Highest,
    #[serde(rename = "vhigh")]
    VHigh,
    #[serde(rename = "high")]
    High,
    #[serde(rename = "medhigh")]
    MedHigh,
    #[serde(rename = "medium", alias = "normal")]
    Medium,
    #[serde(rename = "medlow")]
    MedLow,
    #[serde(rename = "low")]
    Low,
    #[serde(rename = "vlow")]
    VLow,
    #[serde(rename = "lowest")]
    Lowest,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl Priority {
    /// `priority_tier` in `1..=9`; 1 is highest priority.
    pub fn tier(self) -> u8 {
        match self {
            Priority::Highest => 1,
            Priority::VHigh => 2,
            Priority::High => 3,
            Priority::MedHigh => 4,
            Priority::Medium => 5,
            Priority::MedLow => 6,
            Priority::Low => 7,
            Priority::VLow => 8,
            Priority::Lowest => 9,
        }
    }
}

/// How a schedule truncates its looping main section to meet its end time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndPolicy {
    #[serde(rename = "hardcut")]
    HardCut,
    #[serde(rename = "seqboundearly")]
    SeqBoundEarly,
    #[serde(rename = "seqboundlate")]
    SeqBoundLate,
    #[serde(rename = "seqboundnearest")]
    SeqBoundNearest,
}

impl Default for EndPolicy {
    fn default() -> Self {
        EndPolicy::SeqBoundNearest
    }
}

/// A playlist bound to a day and time window with recurrence/priority/
/// preemption flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduledPlaylist {
    pub id: String,
    pub playlist_id: String,
    #[serde(default)]
    pub pre_playlist_id: Option<String>,
    #[serde(default)]
    pub post_playlist_id: Option<String>,
    /// Midnight epoch ms of the nominal day.
    pub date: i64,
    pub from_time: String,
    pub to_time: String,
    #[serde(default)]
    pub shuffle: bool,
    #[serde(default, rename = "loop")]
    pub loop_playback: bool,
    #[serde(default)]
    pub hard_cut_in: bool,
    #[serde(default)]
    pub prefer_hard_cut_in: bool,
    #[serde(default)]
    pub keep_to_schedule_when_preempted: bool,
    #[serde(default)]
    pub end_policy: EndPolicy,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub deleted: bool,
}

impl ScheduledPlaylist {
    /// Resolve `date`/`from_time`/`to_time` into `[start_ms, end_ms)`.
    pub fn window_ms(&self) -> Result<(i64, i64), crate::error::ScheduleError> {
        crate::time::resolve_window(self.date, &self.from_time, &self.to_time)
    }
}

/// Which container an occurrence's `item_id` originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemType {
    Scheduled,
    Immediate,
    Queued,
}
