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

//! Engine command encoding for breakpoints.
//!
//! A command is a sequence of flag/value pairs separated by single spaces:
//!
//! ```text
//! -t <kind>                 always
//! -f <file>                 line, conditional
//! -n <line>                 line, conditional
//! -- <base64(condition)>    conditional
//! -x <exception>            exception
//! -m <function>             call, return
//! ```
//!
//! The condition is the only free-text field that may contain whitespace, so it is
//! base64 encoded (standard alphabet, padded, no line wrapping) to keep it a single token.
//! [`BreakpointTarget`] implements [`FromStr`] for the reverse direction, which is what
//! an engine does with the command.

use std::{path::PathBuf, str::FromStr};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

use super::{Breakpoint, BreakpointKind, BreakpointTarget};

/// Flag introducing the breakpoint kind.
pub const FLAG_KIND: &str = "-t";
/// Flag introducing the source file.
pub const FLAG_FILE: &str = "-f";
/// Flag introducing the source line.
pub const FLAG_LINE: &str = "-n";
/// Flag introducing the base64 encoded condition.
pub const FLAG_CONDITION: &str = "--";
/// Flag introducing the exception name.
pub const FLAG_EXCEPTION: &str = "-x";
/// Flag introducing the function name.
pub const FLAG_FUNCTION: &str = "-m";

/// Serializes a breakpoint into the command understood by the engine.
///
/// The id is not part of the command.
pub fn serialize_breakpoint(breakpoint: &Breakpoint) -> String {
    serialize_target(breakpoint.target())
}

/// Serializes a breakpoint target into an engine command.
pub fn serialize_target(target: &BreakpointTarget) -> String {
    let mut cmd = format!("{FLAG_KIND} {}", target.kind());

    match target {
        BreakpointTarget::Line { file, line } => {
            push_location(&mut cmd, file, *line);
        }
        BreakpointTarget::Conditional { file, line, condition } => {
            push_location(&mut cmd, file, *line);
            push_flag(&mut cmd, FLAG_CONDITION, &STANDARD.encode(condition.as_bytes()));
        }
        BreakpointTarget::Exception { exception } => {
            push_flag(&mut cmd, FLAG_EXCEPTION, exception);
        }
        BreakpointTarget::Call { function } | BreakpointTarget::Return { function } => {
            push_flag(&mut cmd, FLAG_FUNCTION, function);
        }
    }

    cmd
}

fn push_location(cmd: &mut String, file: &std::path::Path, line: usize) {
    push_flag(cmd, FLAG_FILE, &file.display().to_string());
    push_flag(cmd, FLAG_LINE, &line.to_string());
}

fn push_flag(cmd: &mut String, flag: &str, value: &str) {
    cmd.push(' ');
    cmd.push_str(flag);
    cmd.push(' ');
    cmd.push_str(value);
}

/// Errors raised while decoding an engine command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The command has no `-t` flag
    #[error("command does not specify a breakpoint kind")]
    MissingKind,

    /// The `-t` value is not a known kind
    #[error("unknown breakpoint kind: {0}")]
    UnknownKind(String),

    /// A token that is not one of the known flags
    #[error("unknown flag: {0}")]
    UnknownFlag(String),

    /// A flag appears as the last token
    #[error("flag {0} has no value")]
    MissingValue(&'static str),

    /// A flag appears twice
    #[error("flag {0} given more than once")]
    DuplicateFlag(&'static str),

    /// The `-n` value is not a positive integer
    #[error("invalid line number: {0}")]
    InvalidLine(String),

    /// The `--` value is not valid base64
    #[error("invalid condition encoding: {0}")]
    InvalidCondition(String),

    /// A flag the kind requires is absent
    #[error("{kind} command requires flag {flag}")]
    MissingField {
        /// Kind named by the command
        kind: BreakpointKind,
        /// Missing flag
        flag: &'static str,
    },

    /// A flag the kind does not accept is present
    #[error("{kind} command does not accept flag {flag}")]
    UnexpectedField {
        /// Kind named by the command
        kind: BreakpointKind,
        /// Offending flag
        flag: &'static str,
    },
}

#[derive(Default)]
struct RawFields<'a> {
    kind: Option<&'a str>,
    file: Option<&'a str>,
    line: Option<&'a str>,
    condition: Option<&'a str>,
    exception: Option<&'a str>,
    function: Option<&'a str>,
}

impl<'a> RawFields<'a> {
    fn slot(&mut self, flag: &str) -> Result<(&'static str, &mut Option<&'a str>), CommandError> {
        Ok(match flag {
            FLAG_KIND => (FLAG_KIND, &mut self.kind),
            FLAG_FILE => (FLAG_FILE, &mut self.file),
            FLAG_LINE => (FLAG_LINE, &mut self.line),
            FLAG_CONDITION => (FLAG_CONDITION, &mut self.condition),
            FLAG_EXCEPTION => (FLAG_EXCEPTION, &mut self.exception),
            FLAG_FUNCTION => (FLAG_FUNCTION, &mut self.function),
            other => return Err(CommandError::UnknownFlag(other.to_string())),
        })
    }

    fn present(&self) -> [(&'static str, bool); 5] {
        [
            (FLAG_FILE, self.file.is_some()),
            (FLAG_LINE, self.line.is_some()),
            (FLAG_CONDITION, self.condition.is_some()),
            (FLAG_EXCEPTION, self.exception.is_some()),
            (FLAG_FUNCTION, self.function.is_some()),
        ]
    }
}

fn required<'a>(
    kind: BreakpointKind,
    flag: &'static str,
    value: Option<&'a str>,
) -> Result<&'a str, CommandError> {
    value.ok_or(CommandError::MissingField { kind, flag })
}

fn decode_line(value: &str) -> Result<usize, CommandError> {
    match value.parse::<usize>() {
        Ok(line) if line > 0 => Ok(line),
        _ => Err(CommandError::InvalidLine(value.to_string())),
    }
}

fn decode_condition(value: &str) -> Result<String, CommandError> {
    let bytes =
        STANDARD.decode(value).map_err(|e| CommandError::InvalidCondition(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| CommandError::InvalidCondition(e.to_string()))
}

impl FromStr for BreakpointTarget {
    type Err = CommandError;

    /// Decodes an engine command produced by [`serialize_target`].
    ///
    /// Tokens are split on whitespace, so file paths containing spaces do not survive
    /// the round trip.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut fields = RawFields::default();
        let mut tokens = s.split_whitespace();

        while let Some(token) = tokens.next() {
            let (flag, slot) = fields.slot(token)?;
            let value = tokens.next().ok_or(CommandError::MissingValue(flag))?;
            if slot.replace(value).is_some() {
                return Err(CommandError::DuplicateFlag(flag));
            }
        }

        let tag = fields.kind.ok_or(CommandError::MissingKind)?;
        let kind = BreakpointKind::from_tag(tag)
            .filter(|kind| kind.as_str() == tag)
            .ok_or_else(|| CommandError::UnknownKind(tag.to_string()))?;

        let allowed: &[&str] = match kind {
            BreakpointKind::Line => &[FLAG_FILE, FLAG_LINE],
            BreakpointKind::Conditional => &[FLAG_FILE, FLAG_LINE, FLAG_CONDITION],
            BreakpointKind::Exception => &[FLAG_EXCEPTION],
            BreakpointKind::Call | BreakpointKind::Return => &[FLAG_FUNCTION],
        };
        if let Some((flag, _)) =
            fields.present().into_iter().find(|(flag, present)| *present && !allowed.contains(flag))
        {
            return Err(CommandError::UnexpectedField { kind, flag });
        }

        let target = match kind {
            BreakpointKind::Line => Self::Line {
                file: PathBuf::from(required(kind, FLAG_FILE, fields.file)?),
                line: decode_line(required(kind, FLAG_LINE, fields.line)?)?,
            },
            BreakpointKind::Conditional => Self::Conditional {
                file: PathBuf::from(required(kind, FLAG_FILE, fields.file)?),
                line: decode_line(required(kind, FLAG_LINE, fields.line)?)?,
                condition: decode_condition(required(kind, FLAG_CONDITION, fields.condition)?)?,
            },
            BreakpointKind::Exception => Self::Exception {
                exception: required(kind, FLAG_EXCEPTION, fields.exception)?.to_string(),
            },
            BreakpointKind::Call => Self::Call {
                function: required(kind, FLAG_FUNCTION, fields.function)?.to_string(),
            },
            BreakpointKind::Return => Self::Return {
                function: required(kind, FLAG_FUNCTION, fields.function)?.to_string(),
            },
        };

        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use base64::Engine as _;

    use super::*;
    use crate::types::BreakpointId;

    fn bp(target: BreakpointTarget) -> Breakpoint {
        Breakpoint::new(BreakpointId::new(11000), target)
    }

    #[test]
    fn test_serialize_line() {
        assert_eq!(bp(BreakpointTarget::line("a.py", 42)).serialize(), "-t line -f a.py -n 42");
    }

    #[test]
    fn test_serialize_conditional() {
        let cmd = bp(BreakpointTarget::conditional("a.py", 10, "x > 5")).serialize();
        assert_eq!(cmd, "-t conditional -f a.py -n 10 -- eCA+IDU=");

        let encoded = cmd.rsplit(' ').next().unwrap();
        assert_eq!(STANDARD.decode(encoded).unwrap(), b"x > 5");
    }

    #[test]
    fn test_serialize_conditional_multiline_condition_is_one_token() {
        let condition = "a == 1 and\n    b in (2, 3)\n";
        let cmd = bp(BreakpointTarget::conditional("src/m.py", 3, condition)).serialize();

        assert!(!cmd.contains('\n'));
        assert_eq!(cmd.split(' ').count(), 8);
        let target: BreakpointTarget = cmd.parse().unwrap();
        assert_eq!(target, BreakpointTarget::conditional("src/m.py", 3, condition));
    }

    #[test]
    fn test_serialize_exception_call_return() {
        assert_eq!(
            bp(BreakpointTarget::exception("ValueError")).serialize(),
            "-t exception -x ValueError"
        );
        assert_eq!(bp(BreakpointTarget::call("main")).serialize(), "-t call -m main");
        assert_eq!(bp(BreakpointTarget::return_from("main")).serialize(), "-t return -m main");
    }

    #[test]
    fn test_serialize_ignores_id() {
        let a = Breakpoint::new(BreakpointId::new(1), BreakpointTarget::call("f"));
        let b = Breakpoint::new(BreakpointId::new(2), BreakpointTarget::call("f"));
        assert_eq!(a.serialize(), b.serialize());
    }

    #[test]
    fn test_decode_every_kind() {
        let targets = [
            BreakpointTarget::line("pkg/mod.py", 7),
            BreakpointTarget::conditional("pkg/mod.py", 8, "len(items) > 0"),
            BreakpointTarget::exception("KeyError"),
            BreakpointTarget::call("handler"),
            BreakpointTarget::return_from("handler"),
        ];

        for target in targets {
            let decoded: BreakpointTarget = serialize_target(&target).parse().unwrap();
            assert_eq!(decoded, target);
        }
    }

    #[test]
    fn test_decode_errors() {
        assert_eq!("-f a.py -n 1".parse::<BreakpointTarget>(), Err(CommandError::MissingKind));
        assert_eq!(
            "-t watch -f a.py".parse::<BreakpointTarget>(),
            Err(CommandError::UnknownKind("watch".to_string()))
        );
        assert_eq!(
            "-t line -f a.py -n 1 -z 3".parse::<BreakpointTarget>(),
            Err(CommandError::UnknownFlag("-z".to_string()))
        );
        assert_eq!(
            "-t line -f a.py -n".parse::<BreakpointTarget>(),
            Err(CommandError::MissingValue(FLAG_LINE))
        );
        assert_eq!(
            "-t line -t call -m f".parse::<BreakpointTarget>(),
            Err(CommandError::DuplicateFlag(FLAG_KIND))
        );
        assert_eq!(
            "-t line -f a.py -n 0".parse::<BreakpointTarget>(),
            Err(CommandError::InvalidLine("0".to_string()))
        );
        assert!(matches!(
            "-t conditional -f a.py -n 1 -- !!!".parse::<BreakpointTarget>(),
            Err(CommandError::InvalidCondition(_))
        ));
        assert_eq!(
            "-t line -f a.py".parse::<BreakpointTarget>(),
            Err(CommandError::MissingField { kind: BreakpointKind::Line, flag: FLAG_LINE })
        );
        assert_eq!(
            "-t call -m f -x E".parse::<BreakpointTarget>(),
            Err(CommandError::UnexpectedField { kind: BreakpointKind::Call, flag: FLAG_EXCEPTION })
        );
    }

    #[test]
    fn test_decode_kind_is_case_sensitive() {
        assert_eq!(
            "-t LINE -f a.py -n 1".parse::<BreakpointTarget>(),
            Err(CommandError::UnknownKind("LINE".to_string()))
        );
    }
}
