//! Core operators: arithmetic, comparison, and logic. For all intents and
//! purposes these behave like language keywords.

use super::{boolean_arg, number_arg};
use crate::error::{Error, ErrorCode};
use crate::position::Position;
use crate::value::Value;
use crate::vm::Vm;

pub const SUM: &str = "+";
pub const SUB: &str = "-";
pub const MUL: &str = "*";
pub const DIV: &str = "/";
pub const MOD: &str = "%";
pub const EQUAL: &str = "=";
pub const NEQ: &str = "<>";
pub const LESS_THAN: &str = "<";
pub const GREATER_THAN: &str = ">";
pub const LEQ: &str = "<=";
pub const GEQ: &str = ">=";
pub const LOGICAL_AND: &str = "and";
pub const LOGICAL_OR: &str = "or";

/// `(+ 1 2 3)` — sums its arguments.
pub fn sum<'k>(
    _vm: &Vm<'k>,
    arguments: &[Value<'k>],
    position: Position,
) -> Result<Value<'k>, Error> {
    let mut total = 0.0;
    for argument in arguments {
        total += number_arg(SUM, argument)?;
    }
    Ok(Value::number(total, position))
}

/// `(- 6 3 2)` — subtracts the rest from the first argument.
pub fn subtract<'k>(
    _vm: &Vm<'k>,
    arguments: &[Value<'k>],
    position: Position,
) -> Result<Value<'k>, Error> {
    if arguments.is_empty() {
        return Err(Error::at(
            ErrorCode::RuntimeError,
            position,
            format!("{} requires at least 1 argument. Got 0", SUB),
        ));
    }

    let mut result = number_arg(SUB, &arguments[0])?;
    for argument in &arguments[1..] {
        result -= number_arg(SUB, argument)?;
    }
    Ok(Value::number(result, position))
}

/// `(* 1 2 3)` — multiplies its arguments.
pub fn multiply<'k>(
    _vm: &Vm<'k>,
    arguments: &[Value<'k>],
    position: Position,
) -> Result<Value<'k>, Error> {
    let mut product = 1.0;
    for argument in arguments {
        product *= number_arg(MUL, argument)?;
    }
    Ok(Value::number(product, position))
}

/// `(/ 6 3 2)` — divides the first argument by the rest. Zero divisors fail.
pub fn divide<'k>(
    _vm: &Vm<'k>,
    arguments: &[Value<'k>],
    position: Position,
) -> Result<Value<'k>, Error> {
    if arguments.is_empty() {
        return Err(Error::at(
            ErrorCode::RuntimeError,
            position,
            format!("{} requires at least 1 argument. Got 0", DIV),
        ));
    }

    let mut result = number_arg(DIV, &arguments[0])?;
    for argument in &arguments[1..] {
        let divisor = number_arg(DIV, argument)?;
        if divisor == 0.0 {
            return Err(Error::at(
                ErrorCode::RuntimeError,
                argument.position,
                format!("{} division by zero", DIV),
            ));
        }
        result /= divisor;
    }
    Ok(Value::number(result, position))
}

/// `(% 6 4)` — floating modulo of exactly two arguments.
pub fn modulo<'k>(
    _vm: &Vm<'k>,
    arguments: &[Value<'k>],
    position: Position,
) -> Result<Value<'k>, Error> {
    if arguments.len() != 2 {
        return Err(Error::at(
            ErrorCode::RuntimeError,
            position,
            format!("{} requires 2 arguments. Got {}", MOD, arguments.len()),
        ));
    }

    let dividend = number_arg(MOD, &arguments[0])?;
    let divisor = number_arg(MOD, &arguments[1])?;
    if divisor == 0.0 {
        return Err(Error::at(
            ErrorCode::RuntimeError,
            arguments[1].position,
            format!("{} modulo by zero", MOD),
        ));
    }

    Ok(Value::number(dividend % divisor, position))
}

/// `(= 6 6)` — structural equality over two arguments.
pub fn equal<'k>(
    _vm: &Vm<'k>,
    arguments: &[Value<'k>],
    position: Position,
) -> Result<Value<'k>, Error> {
    if arguments.len() != 2 {
        return Err(Error::at(
            ErrorCode::RuntimeError,
            position,
            format!("{} requires 2 arguments. Got {}", EQUAL, arguments.len()),
        ));
    }
    Ok(Value::boolean(arguments[0].equals(&arguments[1]), position))
}

/// `(<> 6 6)` — negated equality over two arguments.
pub fn not_equal<'k>(
    _vm: &Vm<'k>,
    arguments: &[Value<'k>],
    position: Position,
) -> Result<Value<'k>, Error> {
    if arguments.len() != 2 {
        return Err(Error::at(
            ErrorCode::RuntimeError,
            position,
            format!("{} requires 2 arguments. Got {}", NEQ, arguments.len()),
        ));
    }
    Ok(Value::boolean(!arguments[0].equals(&arguments[1]), position))
}

fn chain_compare<'k>(
    op: &'static str,
    arguments: &[Value<'k>],
    position: Position,
    satisfied: fn(f64, f64) -> bool,
) -> Result<Value<'k>, Error> {
    if arguments.len() < 2 {
        return Err(Error::at(
            ErrorCode::RuntimeError,
            position,
            format!("{} requires at least 2 arguments. Got {}", op, arguments.len()),
        ));
    }

    for pair in arguments.windows(2) {
        let left = number_arg(op, &pair[0])?;
        let right = number_arg(op, &pair[1])?;
        if !satisfied(left, right) {
            return Ok(Value::boolean(false, position));
        }
    }
    Ok(Value::boolean(true, position))
}

/// `(< 1 2 3)` — true when every adjacent pair is strictly increasing.
pub fn less_than<'k>(
    _vm: &Vm<'k>,
    arguments: &[Value<'k>],
    position: Position,
) -> Result<Value<'k>, Error> {
    chain_compare(LESS_THAN, arguments, position, |a, b| a < b)
}

/// `(> 3 2 1)` — true when every adjacent pair is strictly decreasing.
pub fn greater_than<'k>(
    _vm: &Vm<'k>,
    arguments: &[Value<'k>],
    position: Position,
) -> Result<Value<'k>, Error> {
    chain_compare(GREATER_THAN, arguments, position, |a, b| a > b)
}

/// `(<= 1 1 2)` — non-decreasing chain.
pub fn less_equal<'k>(
    _vm: &Vm<'k>,
    arguments: &[Value<'k>],
    position: Position,
) -> Result<Value<'k>, Error> {
    chain_compare(LEQ, arguments, position, |a, b| a <= b)
}

/// `(>= 2 1 1)` — non-increasing chain.
pub fn greater_equal<'k>(
    _vm: &Vm<'k>,
    arguments: &[Value<'k>],
    position: Position,
) -> Result<Value<'k>, Error> {
    chain_compare(GEQ, arguments, position, |a, b| a >= b)
}

/// `(and true false)` — strict conjunction: every argument is evaluated
/// before the call; the fold stops at the first false.
pub fn logical_and<'k>(
    _vm: &Vm<'k>,
    arguments: &[Value<'k>],
    position: Position,
) -> Result<Value<'k>, Error> {
    if arguments.len() < 2 {
        return Err(Error::at(
            ErrorCode::RuntimeError,
            position,
            format!(
                "{} requires at least 2 arguments. Got {}.",
                LOGICAL_AND,
                arguments.len()
            ),
        ));
    }

    for argument in arguments {
        if !boolean_arg(LOGICAL_AND, argument)? {
            return Ok(Value::boolean(false, position));
        }
    }
    Ok(Value::boolean(true, position))
}

/// `(or false true)` — strict disjunction: the fold stops at the first true.
pub fn logical_or<'k>(
    _vm: &Vm<'k>,
    arguments: &[Value<'k>],
    position: Position,
) -> Result<Value<'k>, Error> {
    if arguments.len() < 2 {
        return Err(Error::at(
            ErrorCode::RuntimeError,
            position,
            format!(
                "{} requires at least 2 arguments. Got {}",
                LOGICAL_OR,
                arguments.len()
            ),
        ));
    }

    for argument in arguments {
        if boolean_arg(LOGICAL_OR, argument)? {
            return Ok(Value::boolean(true, position));
        }
    }
    Ok(Value::boolean(false, position))
}
