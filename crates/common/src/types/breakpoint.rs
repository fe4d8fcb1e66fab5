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

use std::{
    fmt::Display,
    path::{Path, PathBuf},
    str::FromStr,
};

use eyre::{eyre, Error, Result};
use serde::{Deserialize, Serialize};

use crate::{interface::EditorSurface, types::serialize_breakpoint};

/// Identity of a breakpoint, unique for the lifetime of the generator that issued it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct BreakpointId(u64);

impl BreakpointId {
    /// Wraps a raw id. Ids should normally come from a [`BreakpointIdGenerator`].
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw numeric value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for BreakpointId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl Display for BreakpointId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for BreakpointId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.trim().parse::<u64>().map(Self).map_err(|e| eyre!("Invalid breakpoint id '{s}': {e}"))
    }
}

/// Monotonic source of [`BreakpointId`]s.
///
/// The counter only moves forward, so an id is never handed out twice even after
/// the breakpoint that held it has been removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakpointIdGenerator {
    next: u64,
}

impl BreakpointIdGenerator {
    /// First id issued by a default generator.
    pub const DEFAULT_FIRST_ID: u64 = 11000;

    /// Creates a generator starting at [`Self::DEFAULT_FIRST_ID`].
    pub fn new() -> Self {
        Self::starting_at(Self::DEFAULT_FIRST_ID)
    }

    /// Creates a generator whose first id is `first`.
    pub fn starting_at(first: u64) -> Self {
        Self { next: first }
    }

    /// Issues the next id.
    pub fn next_id(&mut self) -> BreakpointId {
        let id = BreakpointId(self.next);
        self.next += 1;
        id
    }

    /// The id the next call to [`Self::next_id`] will return.
    pub fn peek(&self) -> BreakpointId {
        BreakpointId(self.next)
    }
}

impl Default for BreakpointIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Variant tag of a breakpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakpointKind {
    /// Stop when execution reaches a file and line.
    Line,
    /// Stop at a file and line when a condition holds.
    Conditional,
    /// Stop when an exception is raised.
    Exception,
    /// Stop on entry to a function.
    Call,
    /// Stop on return from a function.
    Return,
}

impl BreakpointKind {
    /// All kinds, in declaration order.
    pub const ALL: [Self; 5] =
        [Self::Line, Self::Conditional, Self::Exception, Self::Call, Self::Return];

    /// Lowercase tag used on the wire and in summaries.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Line => "line",
            Self::Conditional => "conditional",
            Self::Exception => "exception",
            Self::Call => "call",
            Self::Return => "return",
        }
    }

    /// Looks up a kind by tag, ignoring ASCII case.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str().eq_ignore_ascii_case(tag))
    }

    /// Whether breakpoints of this kind carry a file and line.
    pub const fn has_location(self) -> bool {
        matches!(self, Self::Line | Self::Conditional)
    }
}

impl Display for BreakpointKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BreakpointKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_tag(s).ok_or_else(|| eyre!("Unknown breakpoint kind: {s}"))
    }
}

/// What a breakpoint stops on, one variant per [`BreakpointKind`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BreakpointTarget {
    /// A source line.
    Line {
        /// Path of the source file.
        file: PathBuf,
        /// Line number in the source file (1-based).
        line: usize,
    },
    /// A source line guarded by an expression in the debuggee's language.
    Conditional {
        /// Path of the source file.
        file: PathBuf,
        /// Line number in the source file (1-based).
        line: usize,
        /// Expression text, passed to the engine untouched.
        condition: String,
    },
    /// A raised exception.
    Exception {
        /// Exception name as the debuggee spells it.
        exception: String,
    },
    /// Entry to a function.
    Call {
        /// Function name.
        function: String,
    },
    /// Return from a function.
    Return {
        /// Function name.
        function: String,
    },
}

impl BreakpointTarget {
    /// Line breakpoint target.
    pub fn line(file: impl Into<PathBuf>, line: usize) -> Self {
        Self::Line { file: file.into(), line }
    }

    /// Conditional breakpoint target.
    pub fn conditional(file: impl Into<PathBuf>, line: usize, condition: impl Into<String>) -> Self {
        Self::Conditional { file: file.into(), line, condition: condition.into() }
    }

    /// Exception breakpoint target.
    pub fn exception(exception: impl Into<String>) -> Self {
        Self::Exception { exception: exception.into() }
    }

    /// Function-entry breakpoint target.
    pub fn call(function: impl Into<String>) -> Self {
        Self::Call { function: function.into() }
    }

    /// Function-return breakpoint target.
    pub fn return_from(function: impl Into<String>) -> Self {
        Self::Return { function: function.into() }
    }

    /// The variant tag.
    pub const fn kind(&self) -> BreakpointKind {
        match self {
            Self::Line { .. } => BreakpointKind::Line,
            Self::Conditional { .. } => BreakpointKind::Conditional,
            Self::Exception { .. } => BreakpointKind::Exception,
            Self::Call { .. } => BreakpointKind::Call,
            Self::Return { .. } => BreakpointKind::Return,
        }
    }

    /// File and line, for kinds that have them.
    pub fn location(&self) -> Option<(&Path, usize)> {
        match self {
            Self::Line { file, line } | Self::Conditional { file, line, .. } => {
                Some((file.as_path(), *line))
            }
            Self::Exception { .. } | Self::Call { .. } | Self::Return { .. } => None,
        }
    }

    /// False for a line or conditional target on line 0. Engines reject such commands.
    pub fn has_valid_line(&self) -> bool {
        self.location().is_none_or(|(_, line)| line > 0)
    }
}

impl Display for BreakpointTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Line { file, line } => write!(f, "{}:{line}", file.display()),
            Self::Conditional { file, line, condition } => {
                write!(f, "{}:{line} if {condition}", file.display())
            }
            Self::Exception { exception } => write!(f, "on {exception}"),
            Self::Call { function } => write!(f, "call {function}"),
            Self::Return { function } => write!(f, "return {function}"),
        }
    }
}

/// A breakpoint requested by the user.
///
/// Breakpoints are immutable once created. The id is fixed at construction and the
/// only way to change what a breakpoint stops on is to remove it and create another.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Breakpoint {
    id: BreakpointId,
    #[serde(flatten)]
    target: BreakpointTarget,
}

impl Breakpoint {
    /// Creates a breakpoint with an already issued id.
    pub fn new(id: BreakpointId, target: BreakpointTarget) -> Self {
        Self { id, target }
    }

    /// Creates a breakpoint, drawing its id from `ids`.
    pub fn with_next_id(ids: &mut BreakpointIdGenerator, target: BreakpointTarget) -> Self {
        Self::new(ids.next_id(), target)
    }

    /// The breakpoint's id.
    pub fn id(&self) -> BreakpointId {
        self.id
    }

    /// The breakpoint's kind.
    pub fn kind(&self) -> BreakpointKind {
        self.target.kind()
    }

    /// What the breakpoint stops on.
    pub fn target(&self) -> &BreakpointTarget {
        &self.target
    }

    /// Source file (line and conditional breakpoints only).
    pub fn file(&self) -> Option<&Path> {
        self.location().map(|(file, _)| file)
    }

    /// Source line (line and conditional breakpoints only).
    pub fn line(&self) -> Option<usize> {
        self.location().map(|(_, line)| line)
    }

    /// File and line (line and conditional breakpoints only).
    pub fn location(&self) -> Option<(&Path, usize)> {
        self.target.location()
    }

    /// Condition text (conditional breakpoints only).
    pub fn condition(&self) -> Option<&str> {
        match &self.target {
            BreakpointTarget::Conditional { condition, .. } => Some(condition),
            _ => None,
        }
    }

    /// Exception name (exception breakpoints only).
    pub fn exception(&self) -> Option<&str> {
        match &self.target {
            BreakpointTarget::Exception { exception } => Some(exception),
            _ => None,
        }
    }

    /// Function name (call and return breakpoints only).
    pub fn function(&self) -> Option<&str> {
        match &self.target {
            BreakpointTarget::Call { function } | BreakpointTarget::Return { function } => {
                Some(function)
            }
            _ => None,
        }
    }

    /// Engine command for this breakpoint.
    pub fn serialize(&self) -> String {
        serialize_breakpoint(self)
    }

    /// Called by the store once the breakpoint is live.
    pub fn on_add<E>(&self, editor: &mut E) -> Result<()>
    where
        E: EditorSurface + ?Sized,
    {
        match &self.target {
            BreakpointTarget::Line { file, line }
            | BreakpointTarget::Conditional { file, line, .. } => {
                editor.place_marker(self.id, file, *line)
            }
            BreakpointTarget::Exception { .. }
            | BreakpointTarget::Call { .. }
            | BreakpointTarget::Return { .. } => Ok(()),
        }
    }

    /// Called by the store right before the breakpoint is dropped from the registry.
    pub fn on_remove<E>(&self, editor: &mut E) -> Result<()>
    where
        E: EditorSurface + ?Sized,
    {
        match &self.target {
            BreakpointTarget::Line { .. } | BreakpointTarget::Conditional { .. } => {
                editor.remove_marker(self.id)
            }
            BreakpointTarget::Exception { .. }
            | BreakpointTarget::Call { .. }
            | BreakpointTarget::Return { .. } => Ok(()),
        }
    }
}

impl Display for Breakpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.kind(), self.id)
    }
}
