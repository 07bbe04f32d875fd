//! Deterministic playback scheduler core.
//!
//! Takes a library of sequences, playlists, and scheduled playlists and
//! produces, as a pure function of a logical clock and interactive
//! commands, an event log, a play-action stream, and status/upcoming
//! queries. See each module for the component of the design it implements.

pub mod cursor;
pub mod duration;
pub mod error;
pub mod events;
pub mod heap;
pub mod item;
pub mod library;
pub mod model;
pub mod query;
pub mod rng;
pub mod run_state;
pub mod shuffle;
pub mod time;

pub use error::{ScheduleError, ValidationWarning};
pub use events::{EventType, PlayAction, PlaybackLogDetail};
pub use item::{CommandTarget, InteractiveCommand, PlaybackItem};
pub use model::{EndPolicy, Playlist, PlaylistItem, Priority, ScheduledPlaylist, Sequence, SequenceSettings, SequenceWork};
pub use query::{get_status_snapshot, get_upcoming_items, PlaybackStateSnapshot, UpcomingItem, UpcomingSource};
pub use run_state::RunState;
