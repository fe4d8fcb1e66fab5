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

//! Thread-safe handle to a breakpoint store.

use std::{path::Path, sync::Arc};

use parking_lot::Mutex;
use vdb_common::types::{Breakpoint, BreakpointId, BreakpointTarget};
use vdb_common::EngineConnection;

use crate::{BreakpointStore, StoreError, Toggle};

/// Shared breakpoint store for callers on several threads.
///
/// One lock guards both the registry and its id counter, so ids stay unique and
/// every operation sees a consistent registry.
#[derive(Debug, Clone)]
pub struct SharedBreakpointStore {
    inner: Arc<Mutex<BreakpointStore>>,
}

impl SharedBreakpointStore {
    /// Wraps `store`.
    pub fn new(store: BreakpointStore) -> Self {
        Self { inner: Arc::new(Mutex::new(store)) }
    }

    /// Runs `f` with exclusive access to the store.
    ///
    /// `f` must not call back into this handle.
    pub fn with<R>(&self, f: impl FnOnce(&mut BreakpointStore) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// See [`BreakpointStore::link_engine`].
    pub fn link_engine<C>(&self, connection: &Arc<C>) -> Result<(), StoreError>
    where
        C: EngineConnection + 'static,
    {
        self.inner.lock().link_engine(connection)
    }

    /// See [`BreakpointStore::unlink_engine`].
    pub fn unlink_engine(&self) -> bool {
        self.inner.lock().unlink_engine()
    }

    /// See [`BreakpointStore::add`].
    pub fn add(&self, breakpoint: Breakpoint) -> Result<(), StoreError> {
        self.inner.lock().add(breakpoint)
    }

    /// See [`BreakpointStore::create`].
    pub fn create(&self, args: &str) -> Result<BreakpointId, StoreError> {
        self.inner.lock().create(args)
    }

    /// See [`BreakpointStore::add_target`].
    pub fn add_target(&self, target: BreakpointTarget) -> Result<BreakpointId, StoreError> {
        self.inner.lock().add_target(target)
    }

    /// See [`BreakpointStore::remove_by_id`].
    pub fn remove_by_id(&self, id: BreakpointId) -> Result<Breakpoint, StoreError> {
        self.inner.lock().remove_by_id(id)
    }

    /// See [`BreakpointStore::clear`].
    pub fn clear(&self) -> Result<(), StoreError> {
        self.inner.lock().clear()
    }

    /// See [`BreakpointStore::toggle_line_breakpoint`].
    pub fn toggle_line_breakpoint(&self) -> Result<Toggle, StoreError> {
        self.inner.lock().toggle_line_breakpoint()
    }

    /// See [`BreakpointStore::find_line_breakpoint`].
    pub fn find_line_breakpoint(&self, file: &Path, line: usize) -> Option<BreakpointId> {
        self.inner.lock().find_line_breakpoint(file, line)
    }

    /// Copy of the live breakpoints, in registry order.
    pub fn snapshot(&self) -> Vec<Breakpoint> {
        self.inner.lock().iter().cloned().collect()
    }

    /// Number of live breakpoints.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Whether no breakpoint is live.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}
