// VDB - Source-level Debugger Front-end
// Copyright (C) 2024 Zhuo Zhang and Wuqi Zhang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! VDB - line-oriented breakpoint front-end
//!
//! Reads breakpoint commands from stdin, keeps them in a breakpoint store and
//! forwards them to the debugger engine while it is linked.

mod engine;
mod session;

use clap::Parser;
use eyre::Result;
use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    sync::Arc,
};
use tracing::{error, info};
use vdb_common::logging;
use vdb_store::{BreakpointStore, Config, MemoryEditor};

use crate::{
    engine::StreamEngine,
    session::{Flow, Session},
};

/// VDB breakpoint front-end
#[derive(Debug, Parser)]
#[command(name = "vdb")]
#[command(about = "Breakpoint front-end for source-level debuggers", version)]
struct Args {
    /// Config file path (uses ~/.vdb.toml if not specified)
    #[arg(long, env = "VDB_CONFIG")]
    config: Option<PathBuf>,

    /// Write engine commands to this file instead of stdout
    #[arg(long)]
    engine_log: Option<PathBuf>,

    /// Initial cursor file
    #[arg(long)]
    file: Option<PathBuf>,

    /// Initial cursor row
    #[arg(long, default_value = "1")]
    row: usize,

    /// Link the engine before reading commands
    #[arg(long)]
    link: bool,

    /// Verbosity level (repeat for more: -v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Set RUST_LOG based on verbosity
    if std::env::var("RUST_LOG").is_err() {
        let level = match args.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        };
        std::env::set_var("RUST_LOG", level);
    }

    let config = match &args.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load().unwrap_or_default(),
    };

    logging::init_logging("vdb", config.logging.file_logging)?;

    let engine = Arc::new(match &args.engine_log {
        Some(path) => StreamEngine::to_file(path)?,
        None => StreamEngine::stdout(),
    });

    let editor = MemoryEditor::new(args.file.clone().unwrap_or_default(), args.row);
    let mut store = BreakpointStore::with_config(editor.clone(), &config);
    if args.link {
        store.link_engine(&engine)?;
    }

    info!("Starting VDB session (first breakpoint id {})", store.next_id());
    let session = Session::new(store, editor, engine, io::stdout());

    match run(session, io::stdin().lock()) {
        Ok(()) => {
            info!("Session ended");
            Ok(())
        }
        Err(e) => {
            error!("Session error: {e}");
            Err(e)
        }
    }
}

fn run<W: Write>(mut session: Session<StreamEngine, W>, input: impl BufRead) -> Result<()> {
    for line in input.lines() {
        match session.execute(&line?) {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(e) => writeln!(session.out(), "error: {e}")?,
        }
    }
    session.out().flush()?;
    Ok(())
}
