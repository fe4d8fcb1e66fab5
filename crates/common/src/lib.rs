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

// Copyright (C) 2024 Zhuo Zhang and Wuqi Zhang
// SPDX-License-Identifier: AGPL-3.0
//! VDB Common - Breakpoint model shared by VDB components
//!
//! This crate holds everything about a breakpoint that does not depend on where
//! breakpoints are stored: the entity and its kinds, request parsing, the engine
//! command format, and the traits the editor and the engine connection implement.

/// Breakpoint entity, kinds, ids and the engine command encoding
pub mod types;

/// Editor and engine-connection traits consumed by the breakpoint core
pub mod interface;
/// Logging setup and utilities for consistent logging across VDB components
pub mod logging;
/// Parsing of free-form breakpoint requests typed by the user
pub mod parser;

pub use interface::*;
pub use logging::*;
pub use parser::*;
