//! String intrinsics. Indices are character-based; negative slice indices
//! count from the end and clamp to the string bounds.

use crate::error::{Error, ErrorCode};
use crate::position::Position;
use crate::value::{Value, ValueKind};
use crate::vm::Vm;

pub const STR_LENGTH: &str = "str:length";
pub const STR_JOIN: &str = "str:join";
pub const STR_SLICE: &str = "str:slice";
pub const STR_INCLUDE: &str = "str:include?";
pub const STR_TRIM_LEFT: &str = "str:trimLeft";
pub const STR_TRIM_RIGHT: &str = "str:trimRight";

fn string_arg<'a, 'k>(
    op: &str,
    ordinal: &str,
    value: &'a Value<'k>,
) -> Result<&'a str, Error> {
    match &value.kind {
        ValueKind::Str(text) => Ok(text),
        _ => Err(Error::at(
            ErrorCode::RuntimeErrorUnexpectedType,
            value.position,
            format!(
                "{} requires a string as {} argument. Got {}.",
                op,
                ordinal,
                value.type_name()
            ),
        )),
    }
}

/// `(str:length "hello")` — number of characters.
pub fn length<'k>(
    _vm: &Vm<'k>,
    arguments: &[Value<'k>],
    position: Position,
) -> Result<Value<'k>, Error> {
    if arguments.len() != 1 {
        return Err(Error::at(
            ErrorCode::RuntimeError,
            position,
            format!("{} requires 1 argument. Got {}", STR_LENGTH, arguments.len()),
        ));
    }
    let text = string_arg(STR_LENGTH, "first", &arguments[0])?;
    Ok(Value::number(text.chars().count() as f64, position))
}

/// `(str:join "," ("a" "b" "c"))` — concatenates with a separator.
pub fn join<'k>(
    _vm: &Vm<'k>,
    arguments: &[Value<'k>],
    position: Position,
) -> Result<Value<'k>, Error> {
    if arguments.len() != 2 {
        return Err(Error::at(
            ErrorCode::RuntimeError,
            position,
            format!("{} requires 2 arguments. Got {}", STR_JOIN, arguments.len()),
        ));
    }

    let separator = string_arg(STR_JOIN, "first", &arguments[0])?;
    let items = match &arguments[1].kind {
        ValueKind::List(items) => items,
        _ => {
            return Err(Error::at(
                ErrorCode::RuntimeErrorUnexpectedType,
                arguments[1].position,
                format!(
                    "{} requires a list of strings as second argument. Got {}.",
                    STR_JOIN,
                    arguments[1].type_name()
                ),
            ));
        }
    };

    let mut parts = Vec::with_capacity(items.len());
    for item in items {
        match &item.kind {
            ValueKind::Str(text) => parts.push(text.as_str()),
            _ => {
                return Err(Error::at(
                    ErrorCode::RuntimeErrorUnexpectedType,
                    item.position,
                    format!(
                        "{} requires a list of strings. Got {}.",
                        STR_JOIN,
                        item.type_name()
                    ),
                ));
            }
        }
    }

    Ok(Value::string(parts.join(separator), position))
}

/// `(str:slice "abcdef" 1 4)` — substring from start to end (exclusive).
/// Negative indices count from the end; everything clamps.
pub fn slice<'k>(
    _vm: &Vm<'k>,
    arguments: &[Value<'k>],
    position: Position,
) -> Result<Value<'k>, Error> {
    if arguments.len() != 2 && arguments.len() != 3 {
        return Err(Error::at(
            ErrorCode::RuntimeError,
            position,
            format!(
                "{} requires 2 or 3 arguments. Got {}",
                STR_SLICE,
                arguments.len()
            ),
        ));
    }

    let text = string_arg(STR_SLICE, "first", &arguments[0])?;
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len() as i64;

    let index_of = |value: &Value<'k>, ordinal: &str| -> Result<i64, Error> {
        match value.kind {
            ValueKind::Number(number) => {
                let index = if number < 0.0 {
                    len + number as i64
                } else {
                    number as i64
                };
                Ok(index.clamp(0, len))
            }
            _ => Err(Error::at(
                ErrorCode::RuntimeErrorUnexpectedType,
                value.position,
                format!(
                    "{} requires a number as {} argument. Got {}.",
                    STR_SLICE,
                    ordinal,
                    value.type_name()
                ),
            )),
        }
    };

    let mut start = index_of(&arguments[1], "second")?;
    let end = match arguments.get(2) {
        Some(argument) => index_of(argument, "third")?,
        None => len,
    };
    if start > end {
        start = end;
    }

    let sliced: String = chars[start as usize..end as usize].iter().collect();
    Ok(Value::string(sliced, position))
}

/// `(str:include? "hello world" "world")` — substring test.
pub fn include<'k>(
    _vm: &Vm<'k>,
    arguments: &[Value<'k>],
    position: Position,
) -> Result<Value<'k>, Error> {
    if arguments.len() != 2 {
        return Err(Error::at(
            ErrorCode::RuntimeError,
            position,
            format!("{} requires 2 arguments. Got {}", STR_INCLUDE, arguments.len()),
        ));
    }
    let text = string_arg(STR_INCLUDE, "first", &arguments[0])?;
    let search = string_arg(STR_INCLUDE, "second", &arguments[1])?;
    Ok(Value::boolean(text.contains(search), position))
}

/// `(str:trimLeft "   foo")` — strips leading whitespace.
pub fn trim_left<'k>(
    _vm: &Vm<'k>,
    arguments: &[Value<'k>],
    position: Position,
) -> Result<Value<'k>, Error> {
    if arguments.len() != 1 {
        return Err(Error::at(
            ErrorCode::RuntimeError,
            position,
            format!(
                "{} requires 1 argument. Got {}",
                STR_TRIM_LEFT,
                arguments.len()
            ),
        ));
    }
    let text = string_arg(STR_TRIM_LEFT, "first", &arguments[0])?;
    Ok(Value::string(text.trim_start().to_string(), position))
}

/// `(str:trimRight "foo   ")` — strips trailing whitespace.
pub fn trim_right<'k>(
    _vm: &Vm<'k>,
    arguments: &[Value<'k>],
    position: Position,
) -> Result<Value<'k>, Error> {
    if arguments.len() != 1 {
        return Err(Error::at(
            ErrorCode::RuntimeError,
            position,
            format!(
                "{} requires 1 argument. Got {}",
                STR_TRIM_RIGHT,
                arguments.len()
            ),
        ));
    }
    let text = string_arg(STR_TRIM_RIGHT, "first", &arguments[0])?;
    Ok(Value::string(text.trim_end().to_string(), position))
}
