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

//! Parsing of user breakpoint requests.
//!
//! A request is the free-form text typed after the "set breakpoint" command:
//!
//! - `` (empty) - Line breakpoint at the cursor
//! - `conditional <expr...>` - Conditional breakpoint at the cursor
//! - `exception <name>` - Break when `<name>` is raised
//! - `call <function>` - Break on entry to `<function>`
//! - `return <function>` - Break on return from `<function>`
//!
//! The kind keyword is case-insensitive. Extra tokens after an exception or
//! function name are ignored.

use thiserror::Error;

use crate::{
    interface::CursorContext,
    types::{Breakpoint, BreakpointIdGenerator, BreakpointKind, BreakpointTarget},
};

/// Errors raised when a breakpoint request cannot be turned into a breakpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// `conditional` without an expression
    #[error("Conditional breakpoints require a condition to be specified")]
    MissingCondition,

    /// `exception` without a name
    #[error("Exception breakpoints require an exception name to be specified")]
    MissingExceptionName,

    /// `call` or `return` without a function name
    #[error("{} breakpoints require a function name to be specified", capitalize(.0.as_str()))]
    MissingFunctionName(BreakpointKind),

    /// The first token is not a breakpoint kind
    #[error("Unknown breakpoint type: {0}")]
    UnrecognizedKind(String),

    /// The editor reported row 0 for the cursor
    #[error("Cannot place a breakpoint: the cursor is not on a line")]
    InvalidCursorRow,

    /// The editor reported no file for the cursor
    #[error("Cannot place a breakpoint: no file is open at the cursor")]
    MissingCursorFile,
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Parses `args` into a target, reading the location from `cursor` when needed.
pub fn parse_target<C>(args: &str, cursor: &C) -> Result<BreakpointTarget, ParseError>
where
    C: CursorContext + ?Sized,
{
    let mut tokens = args.split_whitespace();

    let Some(keyword) = tokens.next() else {
        let (file, line) = cursor_location(cursor)?;
        return Ok(BreakpointTarget::Line { file, line });
    };

    match keyword.to_ascii_lowercase().as_str() {
        "conditional" => {
            let condition = tokens.collect::<Vec<_>>().join(" ");
            if condition.is_empty() {
                return Err(ParseError::MissingCondition);
            }
            let (file, line) = cursor_location(cursor)?;
            Ok(BreakpointTarget::Conditional { file, line, condition })
        }
        "exception" => tokens
            .next()
            .map(BreakpointTarget::exception)
            .ok_or(ParseError::MissingExceptionName),
        "call" => tokens
            .next()
            .map(BreakpointTarget::call)
            .ok_or(ParseError::MissingFunctionName(BreakpointKind::Call)),
        "return" => tokens
            .next()
            .map(BreakpointTarget::return_from)
            .ok_or(ParseError::MissingFunctionName(BreakpointKind::Return)),
        _ => Err(ParseError::UnrecognizedKind(keyword.to_string())),
    }
}

/// Parses `args` into a breakpoint.
///
/// The id is drawn from `ids` only when parsing succeeds.
pub fn parse_breakpoint<C>(
    args: &str,
    cursor: &C,
    ids: &mut BreakpointIdGenerator,
) -> Result<Breakpoint, ParseError>
where
    C: CursorContext + ?Sized,
{
    let target = parse_target(args, cursor)?;
    Ok(Breakpoint::with_next_id(ids, target))
}

fn cursor_location<C>(cursor: &C) -> Result<(std::path::PathBuf, usize), ParseError>
where
    C: CursorContext + ?Sized,
{
    let file = cursor.current_file();
    if file.as_os_str().is_empty() {
        return Err(ParseError::MissingCursorFile);
    }

    match cursor.current_row() {
        0 => Err(ParseError::InvalidCursorRow),
        row => Ok((file, row)),
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::{interface::FixedCursor, types::BreakpointId};

    fn parse(args: &str) -> Result<Breakpoint, ParseError> {
        let mut ids = BreakpointIdGenerator::new();
        parse_breakpoint(args, &FixedCursor::new("b.py", 7), &mut ids)
    }

    #[test]
    fn test_empty_request_is_line_at_cursor() {
        for args in ["", "   ", "\t\n"] {
            let bp = parse(args).unwrap();
            assert_eq!(bp.kind(), BreakpointKind::Line);
            assert_eq!(bp.location(), Some((Path::new("b.py"), 7)));
        }
    }

    #[test]
    fn test_conditional_joins_tokens() {
        let bp = parse("conditional   x  >   5 and y").unwrap();
        assert_eq!(bp.kind(), BreakpointKind::Conditional);
        assert_eq!(bp.condition(), Some("x > 5 and y"));
        assert_eq!(bp.location(), Some((Path::new("b.py"), 7)));
    }

    #[test]
    fn test_conditional_requires_condition() {
        assert_eq!(parse("conditional").unwrap_err(), ParseError::MissingCondition);
        assert_eq!(parse("conditional   ").unwrap_err(), ParseError::MissingCondition);
    }

    #[test]
    fn test_exception() {
        assert_eq!(parse("exception").unwrap_err(), ParseError::MissingExceptionName);

        let bp = parse("exception ValueError").unwrap();
        assert_eq!(bp.kind(), BreakpointKind::Exception);
        assert_eq!(bp.exception(), Some("ValueError"));

        let bp = parse("exception KeyError ignored").unwrap();
        assert_eq!(bp.exception(), Some("KeyError"));
    }

    #[test]
    fn test_call_and_return() {
        assert_eq!(
            parse("call").unwrap_err(),
            ParseError::MissingFunctionName(BreakpointKind::Call)
        );
        assert_eq!(
            parse("return").unwrap_err(),
            ParseError::MissingFunctionName(BreakpointKind::Return)
        );

        let bp = parse("call main").unwrap();
        assert_eq!((bp.kind(), bp.function()), (BreakpointKind::Call, Some("main")));

        let bp = parse("return main").unwrap();
        assert_eq!((bp.kind(), bp.function()), (BreakpointKind::Return, Some("main")));
    }

    #[test]
    fn test_keyword_is_case_insensitive() {
        assert_eq!(parse("EXCEPTION E").unwrap().kind(), BreakpointKind::Exception);
        assert_eq!(parse("Conditional a").unwrap().kind(), BreakpointKind::Conditional);
        assert_eq!(parse("  cAlL f  ").unwrap().kind(), BreakpointKind::Call);
    }

    #[test]
    fn test_unrecognized_kind() {
        assert_eq!(
            parse("watch x").unwrap_err(),
            ParseError::UnrecognizedKind("watch".to_string())
        );
        assert_eq!(parse("line").unwrap_err(), ParseError::UnrecognizedKind("line".to_string()));
    }

    #[test]
    fn test_invalid_cursor() {
        let mut ids = BreakpointIdGenerator::new();

        let no_row = FixedCursor::new("a.py", 0);
        assert_eq!(
            parse_breakpoint("", &no_row, &mut ids).unwrap_err(),
            ParseError::InvalidCursorRow
        );

        let no_file = FixedCursor::new("", 3);
        assert_eq!(
            parse_breakpoint("conditional x", &no_file, &mut ids).unwrap_err(),
            ParseError::MissingCursorFile
        );

        // Kinds without a location never look at the cursor.
        assert!(parse_breakpoint("call f", &no_file, &mut ids).is_ok());
    }

    #[test]
    fn test_failed_parse_does_not_consume_id() {
        let mut ids = BreakpointIdGenerator::new();
        let cursor = FixedCursor::new("a.py", 1);

        assert!(parse_breakpoint("exception", &cursor, &mut ids).is_err());
        assert!(parse_breakpoint("bogus", &cursor, &mut ids).is_err());

        let bp = parse_breakpoint("", &cursor, &mut ids).unwrap();
        assert_eq!(bp.id(), BreakpointId::new(BreakpointIdGenerator::DEFAULT_FIRST_ID));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ParseError::MissingFunctionName(BreakpointKind::Return).to_string(),
            "Return breakpoints require a function name to be specified"
        );
        assert_eq!(
            ParseError::UnrecognizedKind("foo".to_string()).to_string(),
            "Unknown breakpoint type: foo"
        );
    }
}
