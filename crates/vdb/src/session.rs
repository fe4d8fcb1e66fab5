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

//! Line-oriented command session driving a breakpoint store.

use std::{io::Write, path::Path, sync::Arc};

use eyre::{bail, eyre, Context, Result};
use tracing::debug;
use vdb_common::{types::BreakpointId, EngineConnection};
use vdb_store::{BreakpointStore, MemoryEditor, Toggle};

const HELP: &str = "\
commands:
  cursor <file> <row>   move the editor cursor
  break [args]          set a breakpoint (empty, conditional <expr>, exception <name>,
                        call <function>, return <function>)
  toggle                toggle a line breakpoint at the cursor
  remove <id>           remove a breakpoint
  clear                 remove every breakpoint
  find <file> <line>    id of the line breakpoint at file:line
  list                  list breakpoints with their engine commands
  link | unlink         attach or detach the debugger engine
  quit                  leave";

/// What the caller should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next command
    Continue,
    /// Stop reading commands
    Quit,
}

/// A store, the editor it renders to, and the engine it can be linked to.
#[derive(Debug)]
pub struct Session<E, W> {
    store: BreakpointStore,
    editor: MemoryEditor,
    engine: Arc<E>,
    out: W,
}

impl<E, W> Session<E, W>
where
    E: EngineConnection + 'static,
    W: Write,
{
    /// Creates a session. `editor` must be the editor `store` renders to.
    pub fn new(store: BreakpointStore, editor: MemoryEditor, engine: Arc<E>, out: W) -> Self {
        Self { store, editor, engine, out }
    }

    /// Output stream of the session.
    pub fn out(&mut self) -> &mut W {
        &mut self.out
    }

    /// Runs one command line.
    pub fn execute(&mut self, line: &str) -> Result<Flow> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(Flow::Continue);
        }

        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };
        debug!("Executing command '{command}' with arguments '{rest}'");

        match command {
            "cursor" => {
                let (file, row) = file_and_number(rest, "cursor <file> <row>")?;
                self.editor.move_cursor(file, row);
                writeln!(self.out, "cursor at {file}:{row}")?;
            }
            "break" => {
                let id = self.store.create(rest)?;
                self.report_added(id)?;
            }
            "toggle" => match self.store.toggle_line_breakpoint()? {
                Toggle::Added(id) => self.report_added(id)?,
                Toggle::Removed(id) => writeln!(self.out, "removed [line] {id}")?,
            },
            "remove" => {
                let id: BreakpointId = rest.parse()?;
                let breakpoint = self.store.remove_by_id(id)?;
                writeln!(self.out, "removed {breakpoint}")?;
            }
            "clear" => {
                let count = self.store.len();
                self.store.clear()?;
                writeln!(self.out, "cleared {count} breakpoints")?;
            }
            "find" => {
                let (file, line) = file_and_number(rest, "find <file> <line>")?;
                match self.store.find_line_breakpoint(Path::new(file), line) {
                    Some(id) => writeln!(self.out, "{id}")?,
                    None => writeln!(self.out, "not found")?,
                }
            }
            "list" => {
                if self.store.is_empty() {
                    writeln!(self.out, "no breakpoints")?;
                }
                for breakpoint in self.store.iter() {
                    writeln!(
                        self.out,
                        "{breakpoint} {} ({})",
                        breakpoint.target(),
                        breakpoint.serialize()
                    )?;
                }
            }
            "link" => {
                self.store.link_engine(&self.engine)?;
                writeln!(self.out, "linked ({} breakpoints)", self.store.len())?;
            }
            "unlink" => {
                self.store.unlink_engine();
                writeln!(self.out, "unlinked")?;
            }
            "help" => writeln!(self.out, "{HELP}")?,
            "quit" | "exit" => return Ok(Flow::Quit),
            other => bail!("unknown command: {other} (try 'help')"),
        }

        Ok(Flow::Continue)
    }

    fn report_added(&mut self, id: BreakpointId) -> Result<()> {
        let breakpoint = self.store.get(id).ok_or_else(|| eyre!("breakpoint {id} vanished"))?;
        writeln!(self.out, "added {breakpoint}")?;
        Ok(())
    }
}

fn file_and_number<'a>(args: &'a str, usage: &str) -> Result<(&'a str, usize)> {
    let mut parts = args.split_whitespace();
    let (Some(file), Some(number), None) = (parts.next(), parts.next(), parts.next()) else {
        bail!("usage: {usage}");
    };
    let number = number.parse::<usize>().with_context(|| format!("invalid number: {number}"))?;
    Ok((file, number))
}
