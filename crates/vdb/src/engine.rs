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

//! Engine connection backed by a byte stream.

use std::{
    fmt,
    fs::File,
    io::{self, Write},
    path::Path,
};

use eyre::{Context, Result};
use parking_lot::Mutex;
use vdb_common::EngineConnection;

/// Writes every breakpoint command as one line to a stream.
pub struct StreamEngine {
    writer: Mutex<Box<dyn Write + Send>>,
    prefix: &'static str,
}

impl fmt::Debug for StreamEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamEngine").field("prefix", &self.prefix).finish_non_exhaustive()
    }
}

impl StreamEngine {
    /// Prefix used when commands share stdout with the session output.
    pub const STDOUT_PREFIX: &'static str = "engine> ";

    /// Wraps `writer`, prepending `prefix` to each command line.
    pub fn new(writer: impl Write + Send + 'static, prefix: &'static str) -> Self {
        Self { writer: Mutex::new(Box::new(writer)), prefix }
    }

    /// Commands go to stdout, prefixed with [`Self::STDOUT_PREFIX`].
    pub fn stdout() -> Self {
        Self::new(io::stdout(), Self::STDOUT_PREFIX)
    }

    /// Commands go to `path`, one raw command per line.
    pub fn to_file(path: &Path) -> Result<Self> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create engine log: {path:?}"))?;
        Ok(Self::new(file, ""))
    }
}

impl EngineConnection for StreamEngine {
    fn set_breakpoint(&self, command: &str) -> Result<()> {
        let mut writer = self.writer.lock();
        writeln!(writer, "{}{command}", self.prefix)?;
        writer.flush()?;
        Ok(())
    }
}
