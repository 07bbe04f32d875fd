//! Runner: load JSON library files, drive the scheduler, print results.

use std::fs;

use log::info;
use sequencer_core::model::{Playlist, ScheduledPlaylist, Sequence};
use sequencer_core::{query, RunState, ValidationWarning};
use serde::Serialize;

use crate::cli::{Command, LibraryArgs};
use crate::error::{CliError, CliResult};

fn read_json<T: for<'de> serde::Deserialize<'de>>(path: &str) -> CliResult<T> {
    let raw = fs::read_to_string(path).map_err(|source| CliError::Io { path: path.to_string(), source })?;
    serde_json::from_str(&raw).map_err(|source| CliError::Json { path: path.to_string(), source })
}

/// Build and window a `RunState` from `args`, returning it alongside any
/// validation warnings collected during setup.
fn build_run_state(args: &LibraryArgs) -> CliResult<(RunState, Vec<ValidationWarning>)> {
    let seqs: Vec<Sequence> = read_json(&args.sequences)?;
    let playlists: Vec<Playlist> = read_json(&args.playlists)?;
    let schedules: Vec<ScheduledPlaylist> = read_json(&args.schedules)?;

    let mut warnings = Vec::new();
    let mut rs = RunState::new(args.from);
    rs.set_up_sequences(seqs, playlists, schedules, &mut warnings);
    rs.add_time_range_to_schedule(args.from, args.until, true, &mut warnings);
    Ok((rs, warnings))
}

#[derive(Debug, Serialize)]
struct RunOutput {
    events: Vec<sequencer_core::PlaybackLogDetail>,
    actions: Vec<sequencer_core::PlayAction>,
    warnings: Vec<String>,
}

pub fn run(command: Command) -> CliResult<i32> {
    match command {
        Command::Run(args) => {
            let until = args.until;
            let limit = args.limit;
            let cap_override = args.iteration_cap;
            let (mut rs, mut warnings) = build_run_state(&args)?;
            let (events, actions) = rs.read_out_schedule_until_with_cap(until, limit, cap_override, &mut warnings);
            info!("produced {} events, {} actions", events.len(), actions.len());
            let output = RunOutput {
                events,
                actions,
                warnings: warnings.iter().map(ToString::to_string).collect(),
            };
            println!("{}", serde_json::to_string_pretty(&output).expect("RunOutput is always serializable"));
            Ok(0)
        }
        Command::Status { library, query_at } => {
            let (mut rs, mut warnings) = build_run_state(&library)?;
            let mut log = Vec::new();
            let mut actions = Vec::new();
            rs.run_until(query_at, None, &mut log, &mut actions, &mut warnings);
            let snapshot = query::get_status_snapshot(&rs);
            println!("{}", serde_json::to_string_pretty(&snapshot).expect("snapshot is always serializable"));
            Ok(0)
        }
        Command::Upcoming {
            library,
            query_at,
            readahead,
            schedahead,
            max_items,
        } => {
            let (mut rs, mut warnings) = build_run_state(&library)?;
            let mut log = Vec::new();
            let mut actions = Vec::new();
            rs.run_until(query_at, None, &mut log, &mut actions, &mut warnings);
            let upcoming = query::get_upcoming_items(&rs, readahead, schedahead, max_items);
            println!("{}", serde_json::to_string_pretty(&upcoming).expect("upcoming items are always serializable"));
            Ok(0)
        }
        Command::Shuffle { playlist, sequences, seed, min_ms } => {
            let playlists: Vec<Playlist> = read_json(&playlist)?;
            let seqs: Vec<Sequence> = read_json(&sequences)?;
            let Some(pl) = playlists.into_iter().next() else {
                eprintln!("no playlist found in {playlist:?}");
                return Ok(1);
            };
            let mut warnings = Vec::new();
            let libs = sequencer_core::library::set_up_sequences(seqs, vec![], vec![], &mut warnings);
            let item_ids: Vec<String> = pl.ordered_items().into_iter().map(|item| item.seq_id.clone()).collect();
            let list = sequencer_core::shuffle::create_shuffle_list(&item_ids, &pl.id, seed, min_ms, &libs.sequences, &mut warnings);
            println!("{}", serde_json::to_string_pretty(&list).expect("shuffle list is always serializable"));
            Ok(0)
        }
    }
}
