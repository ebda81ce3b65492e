//! List intrinsics: construction, access, and the higher-order forms. The
//! higher-order forms reuse one argument buffer across iterations and call
//! back into the evaluator through `invoke_closure`.

use std::rc::Rc;

use crate::error::{Error, ErrorCode};
use crate::interpreter::invoke_closure;
use crate::position::Position;
use crate::value::{Closure, Value, ValueKind};
use crate::vm::Vm;

pub const LIST_COUNT: &str = "list:count";
pub const LIST_FROM: &str = "list:from";
pub const LIST_NTH: &str = "list:nth";
pub const LIST_MAP: &str = "list:map";
pub const LIST_EACH: &str = "list:each";
pub const LIST_FILTER: &str = "list:filter";
pub const LIST_TIMES: &str = "list:times";
pub const LIST_REDUCE: &str = "list:reduce";

fn closure_arg<'a, 'k>(op: &str, value: &'a Value<'k>) -> Result<&'a Rc<Closure<'k>>, Error> {
    match &value.kind {
        ValueKind::Closure(closure) => Ok(closure),
        _ => Err(Error::at(
            ErrorCode::RuntimeErrorUnexpectedType,
            value.position,
            format!(
                "{} requires a function as first argument. Got {}.",
                op,
                value.type_name()
            ),
        )),
    }
}

fn list_arg<'a, 'k>(
    op: &str,
    ordinal: &str,
    value: &'a Value<'k>,
) -> Result<&'a Vec<Value<'k>>, Error> {
    match &value.kind {
        ValueKind::List(items) => Ok(items),
        _ => Err(Error::at(
            ErrorCode::RuntimeErrorUnexpectedType,
            value.position,
            format!(
                "{} requires a list as {} argument. Got {}.",
                op,
                ordinal,
                value.type_name()
            ),
        )),
    }
}

/// `(list:count (1 2 3))` — the number of elements.
pub fn count<'k>(
    _vm: &Vm<'k>,
    arguments: &[Value<'k>],
    position: Position,
) -> Result<Value<'k>, Error> {
    if arguments.is_empty() {
        return Err(Error::at(
            ErrorCode::RuntimeError,
            position,
            format!("{} requires 1 argument. Got {}", LIST_COUNT, arguments.len()),
        ));
    }
    let items = list_arg(LIST_COUNT, "first", &arguments[0])?;
    Ok(Value::number(items.len() as f64, position))
}

/// `(list:from 1 2 3)` — a list of its (copied) arguments.
pub fn from<'k>(
    _vm: &Vm<'k>,
    arguments: &[Value<'k>],
    position: Position,
) -> Result<Value<'k>, Error> {
    if arguments.is_empty() {
        return Err(Error::at(
            ErrorCode::RuntimeError,
            position,
            format!(
                "{} requires at least 1 argument. Got {}",
                LIST_FROM,
                arguments.len()
            ),
        ));
    }
    Ok(Value::list(arguments.to_vec(), position))
}

/// `(list:nth 1 (10 20 30))` — the element at the index, or nil when the
/// index is negative, fractional, or out of range.
pub fn nth<'k>(
    _vm: &Vm<'k>,
    arguments: &[Value<'k>],
    position: Position,
) -> Result<Value<'k>, Error> {
    if arguments.len() != 2 {
        return Err(Error::at(
            ErrorCode::RuntimeError,
            position,
            format!("{} requires 2 arguments. Got {}", LIST_NTH, arguments.len()),
        ));
    }

    let index = match arguments[0].kind {
        ValueKind::Number(number) => number,
        _ => {
            return Err(Error::at(
                ErrorCode::RuntimeErrorUnexpectedType,
                arguments[0].position,
                format!(
                    "{} requires a number as first argument. Got {}.",
                    LIST_NTH,
                    arguments[0].type_name()
                ),
            ));
        }
    };
    let items = list_arg(LIST_NTH, "second", &arguments[1])?;

    if index < 0.0 || index >= items.len() as f64 || index.fract() != 0.0 {
        return Ok(Value::nil(position));
    }

    Ok(items[index as usize].clone())
}

/// `(list:map (fn (x i) (* x 2)) (1 2 3))` — a new list of mapped values.
pub fn map<'k>(
    vm: &Vm<'k>,
    arguments: &[Value<'k>],
    position: Position,
) -> Result<Value<'k>, Error> {
    if arguments.len() != 2 {
        return Err(Error::at(
            ErrorCode::RuntimeError,
            position,
            format!("{} requires 2 arguments. Got {}", LIST_MAP, arguments.len()),
        ));
    }

    let closure = closure_arg(LIST_MAP, &arguments[0])?;
    let items = list_arg(LIST_MAP, "second", &arguments[1])?;

    let mut mapped = Vec::with_capacity(items.len());
    let mut closure_args = Vec::with_capacity(2);
    for (index, item) in items.iter().enumerate() {
        closure_args.clear();
        closure_args.push(item.clone());
        closure_args.push(Value::number(index as f64, item.position));
        mapped.push(invoke_closure(vm, closure, &closure_args)?);
    }

    Ok(Value::list(mapped, position))
}

/// `(list:each (fn (x i) (io:stdout! x)) (1 2 3))` — side effects only,
/// returns nil.
pub fn each<'k>(
    vm: &Vm<'k>,
    arguments: &[Value<'k>],
    position: Position,
) -> Result<Value<'k>, Error> {
    if arguments.len() != 2 {
        return Err(Error::at(
            ErrorCode::RuntimeError,
            position,
            format!("{} requires 2 arguments. Got {}", LIST_EACH, arguments.len()),
        ));
    }

    let closure = closure_arg(LIST_EACH, &arguments[0])?;
    let items = list_arg(LIST_EACH, "second", &arguments[1])?;

    let mut closure_args = Vec::with_capacity(2);
    for (index, item) in items.iter().enumerate() {
        closure_args.clear();
        closure_args.push(item.clone());
        closure_args.push(Value::number(index as f64, item.position));
        invoke_closure(vm, closure, &closure_args)?;
    }

    Ok(Value::nil(position))
}

/// `(list:filter (fn (x i) (> x 1)) (1 2 3))` — the elements whose
/// predicate came back true.
pub fn filter<'k>(
    vm: &Vm<'k>,
    arguments: &[Value<'k>],
    position: Position,
) -> Result<Value<'k>, Error> {
    if arguments.len() != 2 {
        return Err(Error::at(
            ErrorCode::RuntimeError,
            position,
            format!(
                "{} requires 2 arguments. Got {}",
                LIST_FILTER,
                arguments.len()
            ),
        ));
    }

    let closure = closure_arg(LIST_FILTER, &arguments[0])?;
    let items = list_arg(LIST_FILTER, "second", &arguments[1])?;

    let mut filtered = Vec::with_capacity(items.len());
    let mut closure_args = Vec::with_capacity(2);
    for (index, item) in items.iter().enumerate() {
        closure_args.clear();
        closure_args.push(item.clone());
        closure_args.push(Value::number(index as f64, item.position));

        let verdict = invoke_closure(vm, closure, &closure_args)?;
        let selected = match verdict.kind {
            ValueKind::Boolean(value) => value,
            _ => {
                return Err(Error::at(
                    ErrorCode::RuntimeErrorUnexpectedType,
                    arguments[1].position,
                    format!(
                        "{} requires a function returning a boolean as first argument. \
                         Got return type {}.",
                        LIST_FILTER,
                        verdict.type_name()
                    ),
                ));
            }
        };

        if selected {
            filtered.push(item.clone());
        }
    }

    Ok(Value::list(filtered, position))
}

/// `(list:times (fn (i) (* i 2)) 3)` — calls the function `count` times,
/// collecting the results.
pub fn times<'k>(
    vm: &Vm<'k>,
    arguments: &[Value<'k>],
    position: Position,
) -> Result<Value<'k>, Error> {
    if arguments.len() != 2 {
        return Err(Error::at(
            ErrorCode::RuntimeError,
            position,
            format!(
                "{} requires 2 arguments. Got {}",
                LIST_TIMES,
                arguments.len()
            ),
        ));
    }

    let closure = closure_arg(LIST_TIMES, &arguments[0])?;
    let repeats = match arguments[1].kind {
        ValueKind::Number(number) => number,
        _ => {
            return Err(Error::at(
                ErrorCode::RuntimeErrorUnexpectedType,
                arguments[1].position,
                format!(
                    "{} requires a number as second argument. Got {}.",
                    LIST_TIMES,
                    arguments[1].type_name()
                ),
            ));
        }
    };
    if repeats < 0.0 {
        return Err(Error::at(
            ErrorCode::RuntimeError,
            arguments[1].position,
            format!("{} requires a non-negative count.", LIST_TIMES),
        ));
    }

    let repeats = repeats as usize;
    let mut collected = Vec::with_capacity(repeats);
    let mut closure_args = Vec::with_capacity(1);
    for index in 0..repeats {
        closure_args.clear();
        closure_args.push(Value::number(index as f64, position));
        collected.push(invoke_closure(vm, closure, &closure_args)?);
    }

    Ok(Value::list(collected, position))
}

/// `(list:reduce (fn (acc cur idx) (+ acc cur)) 0 (1 2 3))` — folds the
/// list over a deep-copied initial value.
pub fn reduce<'k>(
    vm: &Vm<'k>,
    arguments: &[Value<'k>],
    position: Position,
) -> Result<Value<'k>, Error> {
    if arguments.len() != 3 {
        return Err(Error::at(
            ErrorCode::RuntimeError,
            position,
            format!(
                "{} requires 3 arguments. Got {}",
                LIST_REDUCE,
                arguments.len()
            ),
        ));
    }

    let closure = closure_arg(LIST_REDUCE, &arguments[0])?;
    let items = match &arguments[2].kind {
        ValueKind::List(items) => items,
        _ => {
            return Err(Error::at(
                ErrorCode::RuntimeErrorUnexpectedType,
                arguments[2].position,
                format!(
                    "{} requires a list as third argument. Got {}.",
                    LIST_REDUCE,
                    arguments[2].type_name()
                ),
            ));
        }
    };

    let mut accumulator = arguments[1].clone();
    let mut closure_args = Vec::with_capacity(3);
    for (index, item) in items.iter().enumerate() {
        closure_args.clear();
        closure_args.push(accumulator);
        closure_args.push(item.clone());
        closure_args.push(Value::number(index as f64, item.position));
        accumulator = invoke_closure(vm, closure, &closure_args)?;
    }

    Ok(accumulator)
}
