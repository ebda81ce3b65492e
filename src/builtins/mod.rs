//! The bundled intrinsics, grouped by namespace the way the surface
//! language exposes them: bare operators in `core`, everything else behind
//! `list:`, `str:`, `math:`, `io:`, and `flow:` prefixes.

pub mod core;
pub mod flow;
pub mod io;
pub mod list;
pub mod math;
pub mod str;

use crate::error::{Error, ErrorCode};
use crate::value::{Value, ValueKind};

/// Unwraps a numeric argument or fails at the argument's position.
pub(crate) fn number_arg(op: &str, value: &Value<'_>) -> Result<f64, Error> {
    match value.kind {
        ValueKind::Number(number) => Ok(number),
        _ => Err(Error::at(
            ErrorCode::RuntimeErrorUnexpectedType,
            value.position,
            format!("{} requires numbers. Got {}.", op, value.type_name()),
        )),
    }
}

/// Unwraps a boolean argument or fails at the argument's position.
pub(crate) fn boolean_arg(op: &str, value: &Value<'_>) -> Result<bool, Error> {
    match value.kind {
        ValueKind::Boolean(boolean) => Ok(boolean),
        _ => Err(Error::at(
            ErrorCode::RuntimeErrorUnexpectedType,
            value.position,
            format!("{} requires booleans. Got {}.", op, value.type_name()),
        )),
    }
}
