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

//! The breakpoint registry.
//!
//! [`BreakpointStore`] owns every live breakpoint and keeps the two sides of the
//! debugger in step:
//!
//! - the editor, through each breakpoint's `on_add`/`on_remove` hooks (markers)
//! - the engine, by forwarding serialized commands while a connection is linked
//!
//! The store holds only a weak reference to the engine connection. Linking a new
//! connection replays the whole registry, so the engine never has to be told about
//! breakpoints created while it was away. Removal is not forwarded to the engine:
//! the command format has no removal form and carries no id.

use std::{
    collections::BTreeMap,
    fmt,
    path::Path,
    sync::{Arc, Weak},
};

use thiserror::Error;
use tracing::{debug, info, warn};
use vdb_common::{
    parse_breakpoint,
    types::{Breakpoint, BreakpointId, BreakpointIdGenerator, BreakpointTarget},
    EditorSurface, EngineConnection, ParseError,
};

use crate::Config;

/// Errors raised by [`BreakpointStore`] operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No live breakpoint has this id
    #[error("no breakpoint with id {0}")]
    NotFound(BreakpointId),

    /// The request could not be parsed
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The editor failed to place or remove a marker
    #[error("editor failed on breakpoint {0}: {1}")]
    Editor(BreakpointId, eyre::Report),

    /// The linked engine did not accept a breakpoint
    #[error("engine rejected breakpoint {0}: {1}")]
    Engine(BreakpointId, eyre::Report),

    /// A line or conditional target on line 0; source lines start at 1
    #[error("invalid line in breakpoint target {0}: lines start at 1")]
    InvalidLine(BreakpointTarget),
}

/// Result of [`BreakpointStore::toggle_line_breakpoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    /// A line breakpoint was created at the cursor
    Added(BreakpointId),
    /// The line breakpoint at the cursor was removed
    Removed(BreakpointId),
}

/// Registry of live breakpoints.
pub struct BreakpointStore {
    /// Live breakpoints. Ids only grow, so key order is insertion order.
    breakpoints: BTreeMap<BreakpointId, Breakpoint>,
    ids: BreakpointIdGenerator,
    editor: Box<dyn EditorSurface + Send>,
    engine: Option<Weak<dyn EngineConnection>>,
    replay_on_link: bool,
}

impl fmt::Debug for BreakpointStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BreakpointStore")
            .field("breakpoints", &self.breakpoints)
            .field("ids", &self.ids)
            .field("linked", &self.is_linked())
            .field("replay_on_link", &self.replay_on_link)
            .finish_non_exhaustive()
    }
}

impl BreakpointStore {
    /// Creates an empty store rendering markers in `editor`.
    pub fn new(editor: impl EditorSurface + Send + 'static) -> Self {
        Self::with_config(editor, &Config::default())
    }

    /// Creates an empty store using the id and engine settings from `config`.
    pub fn with_config(editor: impl EditorSurface + Send + 'static, config: &Config) -> Self {
        Self {
            breakpoints: BTreeMap::new(),
            ids: config.id_generator(),
            editor: Box::new(editor),
            engine: None,
            replay_on_link: config.engine.replay_on_link,
        }
    }

    /// Links an engine connection and replays every live breakpoint to it.
    ///
    /// Any previous connection is replaced. If the engine rejects a command the error
    /// is returned, the connection stays linked and the remaining breakpoints are not
    /// sent; the next link replays everything again.
    pub fn link_engine<C>(&mut self, connection: &Arc<C>) -> Result<(), StoreError>
    where
        C: EngineConnection + 'static,
    {
        let weak = Arc::downgrade(connection);
        let weak: Weak<dyn EngineConnection> = weak;
        self.engine = Some(weak);

        if !self.replay_on_link {
            info!("Linked debugger engine without replaying {} breakpoints", self.len());
            return Ok(());
        }

        info!("Registering {} breakpoints with the debugger", self.len());
        for breakpoint in self.breakpoints.values() {
            connection
                .set_breakpoint(&breakpoint.serialize())
                .map_err(|e| StoreError::Engine(breakpoint.id(), e))?;
        }
        Ok(())
    }

    /// Drops the engine connection. Breakpoints are kept for the next link.
    ///
    /// Returns whether a connection was linked.
    pub fn unlink_engine(&mut self) -> bool {
        let was_linked = self.engine.take().is_some();
        debug!("Unlinked debugger engine (was linked: {was_linked})");
        was_linked
    }

    /// Whether a live engine connection is linked.
    pub fn is_linked(&self) -> bool {
        self.engine.as_ref().is_some_and(|engine| engine.strong_count() > 0)
    }

    /// Inserts a breakpoint, places its marker and forwards it to a linked engine.
    ///
    /// A breakpoint with the same id is replaced, and its marker cleared first. A
    /// target on line 0 is rejected before anything changes. Otherwise the breakpoint
    /// stays in the registry even when the editor or the engine fails.
    pub fn add(&mut self, breakpoint: Breakpoint) -> Result<(), StoreError> {
        if !breakpoint.target().has_valid_line() {
            return Err(StoreError::InvalidLine(breakpoint.target().clone()));
        }

        debug!("Adding breakpoint {breakpoint}");
        let id = breakpoint.id();
        let command = breakpoint.serialize();

        if let Some(replaced) = self.breakpoints.get(&id) {
            warn!("Replacing breakpoint with duplicate id {id}");
            replaced.on_remove(&mut *self.editor).map_err(|e| StoreError::Editor(id, e))?;
        }
        self.breakpoints.insert(id, breakpoint.clone());
        breakpoint.on_add(&mut *self.editor).map_err(|e| StoreError::Editor(id, e))?;

        if let Some(engine) = self.linked_engine() {
            engine.set_breakpoint(&command).map_err(|e| StoreError::Engine(id, e))?;
        }
        Ok(())
    }

    /// Parses a user request against the editor's cursor and adds the result.
    ///
    /// Returns the id of the new breakpoint.
    pub fn create(&mut self, args: &str) -> Result<BreakpointId, StoreError> {
        let breakpoint = parse_breakpoint(args, &*self.editor, &mut self.ids)?;
        let id = breakpoint.id();
        self.add(breakpoint)?;
        Ok(id)
    }

    /// Creates a breakpoint for `target` with the next id and adds it.
    ///
    /// A target on line 0 is rejected without drawing an id.
    pub fn add_target(&mut self, target: BreakpointTarget) -> Result<BreakpointId, StoreError> {
        if !target.has_valid_line() {
            return Err(StoreError::InvalidLine(target));
        }
        let breakpoint = Breakpoint::with_next_id(&mut self.ids, target);
        let id = breakpoint.id();
        self.add(breakpoint)?;
        Ok(id)
    }

    /// Removes `breakpoint` from the registry.
    pub fn remove(&mut self, breakpoint: &Breakpoint) -> Result<Breakpoint, StoreError> {
        self.remove_by_id(breakpoint.id())
    }

    /// Clears the marker of breakpoint `id` and drops it from the registry.
    ///
    /// If the editor fails the breakpoint stays in the registry.
    pub fn remove_by_id(&mut self, id: BreakpointId) -> Result<Breakpoint, StoreError> {
        let breakpoint = self.breakpoints.get(&id).ok_or(StoreError::NotFound(id))?;
        debug!("Removing breakpoint {breakpoint}");

        breakpoint.on_remove(&mut *self.editor).map_err(|e| StoreError::Editor(id, e))?;
        self.breakpoints.remove(&id).ok_or(StoreError::NotFound(id))
    }

    /// Removes every live breakpoint.
    pub fn clear(&mut self) -> Result<(), StoreError> {
        let ids: Vec<BreakpointId> = self.breakpoints.keys().copied().collect();
        debug!("Clearing {} breakpoints", ids.len());

        for id in ids {
            self.remove_by_id(id)?;
        }
        Ok(())
    }

    /// Id of the first line breakpoint at `file:line`.
    ///
    /// Conditional breakpoints are not considered even when their location matches.
    pub fn find_line_breakpoint(&self, file: &Path, line: usize) -> Option<BreakpointId> {
        self.breakpoints.values().find_map(|breakpoint| match breakpoint.target() {
            BreakpointTarget::Line { file: bp_file, line: bp_line }
                if bp_file == file && *bp_line == line =>
            {
                Some(breakpoint.id())
            }
            _ => None,
        })
    }

    /// Removes the line breakpoint at the cursor, or creates one if there is none.
    pub fn toggle_line_breakpoint(&mut self) -> Result<Toggle, StoreError> {
        let file = self.editor.current_file();
        let row = self.editor.current_row();

        match self.find_line_breakpoint(&file, row) {
            Some(id) => {
                self.remove_by_id(id)?;
                Ok(Toggle::Removed(id))
            }
            None => self.create("").map(Toggle::Added),
        }
    }

    /// The live breakpoint with this id.
    pub fn get(&self, id: BreakpointId) -> Option<&Breakpoint> {
        self.breakpoints.get(&id)
    }

    /// Whether a breakpoint with this id is live.
    pub fn contains(&self, id: BreakpointId) -> bool {
        self.breakpoints.contains_key(&id)
    }

    /// Live breakpoints in registry order.
    pub fn iter(&self) -> impl Iterator<Item = &Breakpoint> + '_ {
        self.breakpoints.values()
    }

    /// Engine commands for every live breakpoint, in registry order.
    pub fn commands(&self) -> Vec<(BreakpointId, String)> {
        self.iter().map(|breakpoint| (breakpoint.id(), breakpoint.serialize())).collect()
    }

    /// Number of live breakpoints.
    pub fn len(&self) -> usize {
        self.breakpoints.len()
    }

    /// Whether no breakpoint is live.
    pub fn is_empty(&self) -> bool {
        self.breakpoints.is_empty()
    }

    /// The id the next created breakpoint will get.
    pub fn next_id(&self) -> BreakpointId {
        self.ids.peek()
    }

    fn linked_engine(&mut self) -> Option<Arc<dyn EngineConnection>> {
        let engine = self.engine.as_ref()?.upgrade();
        if engine.is_none() {
            warn!("Debugger engine connection was dropped without being unlinked");
            self.engine = None;
        }
        engine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryEditor, RecordingEngine};

    #[test]
    fn test_dropped_connection_counts_as_unlinked() {
        let mut store = BreakpointStore::new(MemoryEditor::new("a.py", 1));
        let engine = Arc::new(RecordingEngine::new());

        store.link_engine(&engine).unwrap();
        assert!(store.is_linked());

        drop(engine);
        assert!(!store.is_linked());

        // Adding without a live engine still tracks the breakpoint.
        let id = store.create("").unwrap();
        assert!(store.contains(id));
        assert!(!store.unlink_engine());
    }

    #[test]
    fn test_link_without_replay() {
        let config = Config {
            engine: crate::EngineConfig { replay_on_link: false },
            ..Default::default()
        };
        let mut store = BreakpointStore::with_config(MemoryEditor::new("a.py", 1), &config);
        store.create("call f").unwrap();

        let engine = Arc::new(RecordingEngine::new());
        store.link_engine(&engine).unwrap();
        assert!(engine.commands().is_empty());

        store.create("call g").unwrap();
        assert_eq!(engine.commands(), vec!["-t call -m g".to_string()]);
    }

    #[test]
    fn test_first_id_from_config() {
        let config =
            Config { breakpoints: crate::BreakpointConfig { first_id: 1 }, ..Default::default() };
        let mut store = BreakpointStore::with_config(MemoryEditor::new("a.py", 1), &config);

        assert_eq!(store.next_id(), BreakpointId::new(1));
        assert_eq!(store.create("").unwrap(), BreakpointId::new(1));
        assert_eq!(store.next_id(), BreakpointId::new(2));
    }

    #[test]
    fn test_add_replaces_duplicate_id() {
        let editor = MemoryEditor::new("a.py", 1);
        let mut store = BreakpointStore::new(editor.clone());
        let id = BreakpointId::new(5);

        store.add(Breakpoint::new(id, BreakpointTarget::line("a.py", 1))).unwrap();
        store.add(Breakpoint::new(id, BreakpointTarget::line("a.py", 2))).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(id).and_then(Breakpoint::line), Some(2));
        assert_eq!(editor.markers().get(&id), Some(&(std::path::PathBuf::from("a.py"), 2)));
    }

    #[test]
    fn test_replacing_clears_old_marker() {
        let editor = MemoryEditor::new("a.py", 1);
        let mut store = BreakpointStore::new(editor.clone());
        let id = BreakpointId::new(5);

        store.add(Breakpoint::new(id, BreakpointTarget::line("a.py", 1))).unwrap();
        store.add(Breakpoint::new(id, BreakpointTarget::call("main"))).unwrap();
        assert!(!editor.has_marker(id));

        store.remove_by_id(id).unwrap();
        assert!(store.is_empty());
        assert!(editor.markers().is_empty());
    }
}
