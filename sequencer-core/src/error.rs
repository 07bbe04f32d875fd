//! Error and warning types for the scheduler core.

/// Fatal, caller-input errors that must short-circuit whatever call produced them.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ScheduleError {
    #[error("invalid time string {0:?}: expected HH:MM[:SS] with hours in 0..=168")]
    InvalidTimeString(String),
}

/// Non-fatal validation findings surfaced through the `errs` sink in
/// `set_up_sequences` and the `PlaybackItem` builders. The core always also
/// logs these via `log::warn!` at the point of detection; the sink lets a
/// caller additionally collect and report them however it likes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationWarning {
    #[error("duplicate sequence id {0:?}; later entry skipped")]
    DuplicateSequenceId(String),
    #[error("duplicate playlist id {0:?}; later entry skipped")]
    DuplicatePlaylistId(String),
    #[error("duplicate scheduled playlist id {0:?}; later entry skipped")]
    DuplicateScheduleId(String),
    #[error("playlist {0:?} references unknown sequence {1:?}")]
    DanglingSequenceReference(String, String),
    #[error("schedule {0:?} references unknown playlist {1:?}")]
    DanglingPlaylistReference(String, String),
    #[error("sequence {0:?} missing at runtime; assuming {1}ms duration")]
    MissingSequenceAtRuntime(String, i64),
    #[error("schedule {0:?} references unknown scheduled-playlist id")]
    DanglingScheduleReference(String),
    #[error("schedule {0:?}.playlist_id does not match resolved playlist id; using best-effort mapping")]
    PolicyInconsistency(String),
}
