//! Per-sequence / per-playlist duration calculus (§4.2).

use log::warn;

use crate::error::ValidationWarning;
use crate::library::Library;
use crate::model::{Playlist, Sequence};

/// Assumed duration for a sequence referenced by a playlist but absent from
/// the sequence library.
pub const DEFAULT_MISSING_SEQ_MS: i64 = 1000;

/// Lead/trail padding and trim derived from a sequence's settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeqTimesMs {
    pub lead_ms: i64,
    pub trim_in_ms: i64,
    pub trail_ms: i64,
    pub trim_out_ms: i64,
    pub total_ms: i64,
}

/// `get_seq_times_ms`: lead/trail/trim breakdown plus total duration.
pub fn get_seq_times_ms(seq: &Sequence) -> SeqTimesMs {
    let lead_time = seq.settings.lead_time.unwrap_or(0.0);
    let trail_time = seq.settings.trail_time.unwrap_or(0.0);
    let length_ms = (seq.work.length * 1000.0).round() as i64;
    let lead_time_ms = (lead_time * 1000.0).round() as i64;
    let trail_time_ms = (trail_time * 1000.0).round() as i64;

    SeqTimesMs {
        lead_ms: lead_time_ms.max(0),
        trim_in_ms: (-lead_time_ms).max(0),
        trail_ms: trail_time_ms.max(0),
        trim_out_ms: (-trail_time_ms).max(0),
        // Trims reduce the total via the raw (possibly negative) lead/trail
        // values, not the clamped lead_ms/trail_ms above.
        total_ms: (length_ms + lead_time_ms + trail_time_ms).max(0),
    }
}

/// `get_total_seq_time_ms`: `max(0, length*1000 + lead*1000 + trail*1000)`.
pub fn get_total_seq_time_ms(seq: &Sequence) -> i64 {
    get_seq_times_ms(seq).total_ms
}

/// Resolve a sequence id's duration, defaulting to
/// [`DEFAULT_MISSING_SEQ_MS`] and emitting a warning if it is absent from
/// the library (§7 "missing sequence at runtime").
pub fn resolve_duration_ms(seq_id: &str, seqs: &Library<Sequence>, warnings: &mut Vec<ValidationWarning>) -> i64 {
    match seqs.get(seq_id) {
        Some(seq) => get_total_seq_time_ms(seq),
        None => {
            let w = ValidationWarning::MissingSequenceAtRuntime(seq_id.to_string(), DEFAULT_MISSING_SEQ_MS);
            warn!("{}", w);
            warnings.push(w);
            DEFAULT_MISSING_SEQ_MS
        }
    }
}

/// `(sum, longest)` duration in ms over a playlist's items, in ordinal
/// order, resolving each sequence via [`resolve_duration_ms`].
pub fn playlist_duration_ms(playlist: &Playlist, seqs: &Library<Sequence>, warnings: &mut Vec<ValidationWarning>) -> (i64, i64) {
    let mut sum = 0i64;
    let mut longest = 0i64;
    for item in playlist.ordered_items() {
        let dur = resolve_duration_ms(&item.seq_id, seqs, warnings);
        sum += dur;
        longest = longest.max(dur);
    }
    (sum, longest)
}
