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
//! VDB Store - Breakpoint registry
//!
//! This crate owns the live breakpoints of a debugging session and mediates
//! between the editor (markers) and the debugger engine (commands).

/// Configuration loaded from `~/.vdb.toml`
pub mod config;
/// In-memory editor and engine stand-ins
pub mod memory;
/// Thread-safe store handle
pub mod shared;
/// The breakpoint registry
pub mod store;

pub use config::*;
pub use memory::*;
pub use shared::*;
pub use store::*;
