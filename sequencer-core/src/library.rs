//! In-memory libraries of sequences, playlists, and scheduled playlists,
//! and the `set_up_sequences` installation step that builds them.

use std::collections::HashMap;

use log::warn;

use crate::error::ValidationWarning;
use crate::model::{Playlist, ScheduledPlaylist, Sequence};

/// `id -> record` index over a non-deleted set.
#[derive(Debug, Clone)]
pub struct Library<T> {
    by_id: HashMap<String, T>,
}

impl<T> Default for Library<T> {
    fn default() -> Self {
        Self {
            by_id: HashMap::new(),
        }
    }
}

impl<T> Library<T> {
    pub fn get(&self, id: &str) -> Option<&T> {
        self.by_id.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.by_id.values()
    }

    /// Insert a record under an arbitrary key, bypassing `set_up_sequences`'s
    /// own install step. Only exists so tests can model a library built
    /// out-of-band, where a lookup key and a record's own `id` field can
    /// diverge (§7's "schedule.playlist_id != resolved.pl.id" case).
    #[cfg(test)]
    pub(crate) fn insert_for_test(&mut self, key: &str, value: T) {
        self.by_id.insert(key.to_string(), value);
    }
}

fn install_sequences(records: Vec<Sequence>, warnings: &mut Vec<ValidationWarning>) -> Library<Sequence> {
    let mut by_id = HashMap::new();
    for record in records {
        if record.deleted {
            continue;
        }
        if by_id.contains_key(&record.id) {
            let w = ValidationWarning::DuplicateSequenceId(record.id.clone());
            warn!("{}", w);
            warnings.push(w);
            continue;
        }
        by_id.insert(record.id.clone(), record);
    }
    Library { by_id }
}

fn install_playlists(records: Vec<Playlist>, warnings: &mut Vec<ValidationWarning>) -> Library<Playlist> {
    let mut by_id = HashMap::new();
    for record in records {
        if record.deleted {
            continue;
        }
        if by_id.contains_key(&record.id) {
            let w = ValidationWarning::DuplicatePlaylistId(record.id.clone());
            warn!("{}", w);
            warnings.push(w);
            continue;
        }
        by_id.insert(record.id.clone(), record);
    }
    Library { by_id }
}

fn install_schedules(records: Vec<ScheduledPlaylist>, warnings: &mut Vec<ValidationWarning>) -> Library<ScheduledPlaylist> {
    let mut by_id = HashMap::new();
    for record in records {
        if record.deleted {
            continue;
        }
        if by_id.contains_key(&record.id) {
            let w = ValidationWarning::DuplicateScheduleId(record.id.clone());
            warn!("{}", w);
            warnings.push(w);
            continue;
        }
        by_id.insert(record.id.clone(), record);
    }
    Library { by_id }
}

/// Result of [`set_up_sequences`]: the three installed libraries.
#[derive(Debug, Clone, Default)]
pub struct Libraries {
    pub sequences: Library<Sequence>,
    pub playlists: Library<Playlist>,
    pub schedules: Library<ScheduledPlaylist>,
}

/// Rebuild the library maps from deletable record sets. Soft-deleted
/// records (`deleted: true`) are filtered out; duplicate ids within a set
/// are reported via `warnings` and the later entry is skipped. Does not
/// mutate the preemption stack.
pub fn set_up_sequences(
    seqs: Vec<Sequence>,
    playlists: Vec<Playlist>,
    schedules: Vec<ScheduledPlaylist>,
    warnings: &mut Vec<ValidationWarning>,
) -> Libraries {
    let sequences = install_sequences(seqs, warnings);
    let playlists = install_playlists(playlists, warnings);
    let schedules = install_schedules(schedules, warnings);

    for playlist in playlists.values() {
        for item in &playlist.items {
            if !sequences.contains(&item.seq_id) {
                let w = ValidationWarning::DanglingSequenceReference(playlist.id.clone(), item.seq_id.clone());
                warn!("{}", w);
                warnings.push(w);
            }
        }
    }

    for schedule in schedules.values() {
        if !playlists.contains(&schedule.playlist_id) {
            let w = ValidationWarning::DanglingPlaylistReference(schedule.id.clone(), schedule.playlist_id.clone());
            warn!("{}", w);
            warnings.push(w);
        }
        for pl_id in [&schedule.pre_playlist_id, &schedule.post_playlist_id]
            .into_iter()
            .flatten()
        {
            if !playlists.contains(pl_id) {
                let w = ValidationWarning::DanglingPlaylistReference(schedule.id.clone(), pl_id.clone());
                warn!("{}", w);
                warnings.push(w);
            }
        }
    }

    Libraries {
        sequences,
        playlists,
        schedules,
    }
}
