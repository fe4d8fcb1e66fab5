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

//! In-memory collaborators.
//!
//! [`MemoryEditor`] stands in for an editor: it keeps a cursor and a table of
//! breakpoint markers. [`RecordingEngine`] stands in for an engine session and keeps
//! every command it receives. Both are cheap to share, so a caller can hand one to a
//! [`crate::BreakpointStore`] and keep another handle to inspect or drive it.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
    sync::Arc,
};

use eyre::{bail, Result};
use parking_lot::Mutex;
use vdb_common::{types::BreakpointId, CursorContext, EditorSurface, EngineConnection};

#[derive(Debug, Default)]
struct EditorState {
    file: PathBuf,
    row: usize,
    markers: BTreeMap<BreakpointId, (PathBuf, usize)>,
    fail_markers: bool,
}

/// Editor stand-in with a movable cursor and a marker table.
///
/// Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryEditor {
    state: Arc<Mutex<EditorState>>,
}

impl MemoryEditor {
    /// Creates an editor with the cursor at `file:row`.
    pub fn new(file: impl Into<PathBuf>, row: usize) -> Self {
        let editor = Self::default();
        editor.move_cursor(file, row);
        editor
    }

    /// Moves the cursor.
    pub fn move_cursor(&self, file: impl Into<PathBuf>, row: usize) {
        let mut state = self.state.lock();
        state.file = file.into();
        state.row = row;
    }

    /// Current markers, keyed by breakpoint id.
    pub fn markers(&self) -> BTreeMap<BreakpointId, (PathBuf, usize)> {
        self.state.lock().markers.clone()
    }

    /// Whether a marker exists for `id`.
    pub fn has_marker(&self, id: BreakpointId) -> bool {
        self.state.lock().markers.contains_key(&id)
    }

    /// Makes every following marker operation fail.
    pub fn fail_markers(&self, fail: bool) {
        self.state.lock().fail_markers = fail;
    }
}

impl CursorContext for MemoryEditor {
    fn current_file(&self) -> PathBuf {
        self.state.lock().file.clone()
    }

    fn current_row(&self) -> usize {
        self.state.lock().row
    }
}

impl EditorSurface for MemoryEditor {
    fn place_marker(&mut self, id: BreakpointId, file: &Path, line: usize) -> Result<()> {
        let mut state = self.state.lock();
        if state.fail_markers {
            bail!("cannot place marker for breakpoint {id}");
        }
        state.markers.insert(id, (file.to_path_buf(), line));
        Ok(())
    }

    fn remove_marker(&mut self, id: BreakpointId) -> Result<()> {
        let mut state = self.state.lock();
        if state.fail_markers {
            bail!("cannot remove marker for breakpoint {id}");
        }
        state.markers.remove(&id);
        Ok(())
    }
}

/// Engine stand-in that records every command it is sent.
#[derive(Debug, Default)]
pub struct RecordingEngine {
    commands: Mutex<Vec<String>>,
    reject: Mutex<Option<String>>,
}

impl RecordingEngine {
    /// Creates an engine that accepts everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands received so far, in order.
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().clone()
    }

    /// Forgets the recorded commands.
    pub fn reset(&self) {
        self.commands.lock().clear();
    }

    /// Rejects every following command that contains `pattern`.
    pub fn reject_matching(&self, pattern: impl Into<String>) {
        *self.reject.lock() = Some(pattern.into());
    }

    /// Accepts every following command again.
    pub fn accept_all(&self) {
        *self.reject.lock() = None;
    }
}

impl EngineConnection for RecordingEngine {
    fn set_breakpoint(&self, command: &str) -> Result<()> {
        if let Some(pattern) = self.reject.lock().as_deref() {
            if command.contains(pattern) {
                bail!("engine rejected command: {command}");
            }
        }
        self.commands.lock().push(command.to_string());
        Ok(())
    }
}
