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

//! Collaborator traits for the breakpoint core.
//!
//! The breakpoint core never talks to a terminal, an editor or a socket directly.
//! Everything outside the core is reached through the traits in this module:
//!
//! - [`CursorContext`] - Reports the file and row the user is currently looking at
//! - [`EditorSurface`] - Extends [`CursorContext`] with breakpoint marker rendering
//! - [`EngineConnection`] - Forwards serialized breakpoint commands to the debugger engine
//!
//! Implementations are called synchronously and must not call back into the
//! breakpoint store while one of their methods is running.

use std::path::{Path, PathBuf};

use eyre::Result;

use crate::types::BreakpointId;

/// Source of the "current file and line" used to place location breakpoints.
pub trait CursorContext {
    /// Path of the file shown at the cursor.
    fn current_file(&self) -> PathBuf;

    /// Row of the cursor (1-based).
    fn current_row(&self) -> usize;
}

/// Editor-side view of breakpoints.
///
/// Only breakpoints that carry a file and line (line and conditional breakpoints)
/// ever reach [`EditorSurface::place_marker`] and [`EditorSurface::remove_marker`].
pub trait EditorSurface: CursorContext {
    /// Render a marker for breakpoint `id` at `file:line`.
    fn place_marker(&mut self, id: BreakpointId, file: &Path, line: usize) -> Result<()>;

    /// Remove the marker previously placed for breakpoint `id`.
    fn remove_marker(&mut self, id: BreakpointId) -> Result<()>;
}

/// Handle to a live debugger engine session.
///
/// The breakpoint store only keeps a non-owning reference to the connection;
/// its lifetime is managed by whoever negotiated the session.
pub trait EngineConnection: Send + Sync {
    /// Send one breakpoint command (see [`crate::types::serialize_breakpoint`]).
    ///
    /// Timeouts and framing are the connection's business. An error means the
    /// engine did not accept the breakpoint.
    fn set_breakpoint(&self, command: &str) -> Result<()>;
}

/// A fixed cursor position, handy when the caller already knows the location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedCursor {
    /// File at the cursor.
    pub file: PathBuf,
    /// Row at the cursor (1-based).
    pub row: usize,
}

impl FixedCursor {
    /// Creates a cursor pointing at `file:row`.
    pub fn new(file: impl Into<PathBuf>, row: usize) -> Self {
        Self { file: file.into(), row }
    }
}

impl CursorContext for FixedCursor {
    fn current_file(&self) -> PathBuf {
        self.file.clone()
    }

    fn current_row(&self) -> usize {
        self.row
    }
}
