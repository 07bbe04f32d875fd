//! CLI argument definitions (§6 ambient CLI surface).

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "sequencer-cli", version, about = "Drive the playback scheduler core over a JSON library and a requested time range.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Shared library-loading flags used by every subcommand that drives the
/// scheduler (everything except `shuffle`, which only needs one playlist).
#[derive(Debug, clap::Args)]
pub struct LibraryArgs {
    /// Path to a JSON array of `Sequence` records.
    #[arg(long)]
    pub sequences: String,
    /// Path to a JSON array of `Playlist` records.
    #[arg(long)]
    pub playlists: String,
    /// Path to a JSON array of `ScheduledPlaylist` records.
    #[arg(long)]
    pub schedules: String,
    /// Logical clock instant (ms) the run starts from.
    #[arg(long)]
    pub from: i64,
    /// Window schedules up to this instant (ms) before driving the clock.
    #[arg(long)]
    pub until: i64,
    /// Stop early once the event log reaches this many entries.
    #[arg(long)]
    pub limit: Option<usize>,
    /// Override the `10*limit+100` defensive iteration ceiling (§9).
    #[arg(long)]
    pub iteration_cap: Option<usize>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load libraries, window the requested range, drive `run_until`, and
    /// print `{ events: [...], actions: [...] }` as JSON.
    Run(LibraryArgs),
    /// Drive the same inputs to `--query-at`, then print `get_status_snapshot()`.
    Status {
        #[command(flatten)]
        library: LibraryArgs,
        /// Instant (ms) at which to snapshot the preemption stack.
        #[arg(long)]
        query_at: i64,
    },
    /// Drive the same inputs to `--query-at`, then print `get_upcoming_items()`.
    Upcoming {
        #[command(flatten)]
        library: LibraryArgs,
        /// Instant (ms) at which to compute the upcoming-items stream.
        #[arg(long)]
        query_at: i64,
        /// How far ahead (ms) to simulate the stack/heap.
        #[arg(long, default_value_t = 60_000)]
        readahead: i64,
        /// How far ahead (ms) to include upcoming schedule occurrences.
        #[arg(long, default_value_t = 3_600_000)]
        schedahead: i64,
        /// Cap on the number of items returned.
        #[arg(long, default_value_t = 50)]
        max_items: usize,
    },
    /// Expose the shuffle generator (C3) directly for debugging reproducibility.
    Shuffle {
        /// Path to a JSON array of `Playlist` records (the first entry is used).
        #[arg(long)]
        playlist: String,
        /// Path to a JSON array of `Sequence` records, for duration lookups.
        #[arg(long)]
        sequences: String,
        #[arg(long)]
        seed: i64,
        #[arg(long)]
        min_ms: i64,
    },
}
