//! Math intrinsics: extrema, rounding, and a wall-clock-seeded uniform
//! random source.

use std::cell::RefCell;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::number_arg;
use crate::error::{Error, ErrorCode};
use crate::position::Position;
use crate::value::Value;
use crate::vm::Vm;

pub const MATH_MAX: &str = "math:max";
pub const MATH_MIN: &str = "math:min";
pub const MATH_CEIL: &str = "math:ceil";
pub const MATH_FLOOR: &str = "math:floor";
pub const MATH_RANDOM: &str = "math:random!";

thread_local! {
    static RNG: RefCell<Option<StdRng>> = RefCell::new(None);
}

/// `(math:max 1 2 3)` — the largest of its arguments.
pub fn max<'k>(
    _vm: &Vm<'k>,
    arguments: &[Value<'k>],
    position: Position,
) -> Result<Value<'k>, Error> {
    fold_extremum(MATH_MAX, arguments, position, f64::max)
}

/// `(math:min 1 2 3)` — the smallest of its arguments.
pub fn min<'k>(
    _vm: &Vm<'k>,
    arguments: &[Value<'k>],
    position: Position,
) -> Result<Value<'k>, Error> {
    fold_extremum(MATH_MIN, arguments, position, f64::min)
}

fn fold_extremum<'k>(
    op: &'static str,
    arguments: &[Value<'k>],
    position: Position,
    pick: fn(f64, f64) -> f64,
) -> Result<Value<'k>, Error> {
    if arguments.is_empty() {
        return Err(Error::at(
            ErrorCode::RuntimeError,
            position,
            format!("{} requires 1 argument. Got 0", op),
        ));
    }

    let mut extremum = number_arg(op, &arguments[0])?;
    for argument in &arguments[1..] {
        extremum = pick(extremum, number_arg(op, argument)?);
    }
    Ok(Value::number(extremum, position))
}

/// `(math:ceil 2.3)` — smallest integer not below the argument.
pub fn ceil<'k>(
    _vm: &Vm<'k>,
    arguments: &[Value<'k>],
    position: Position,
) -> Result<Value<'k>, Error> {
    if arguments.len() != 1 {
        return Err(Error::at(
            ErrorCode::RuntimeError,
            position,
            format!("{} requires 1 argument. Got {}", MATH_CEIL, arguments.len()),
        ));
    }
    let number = number_arg(MATH_CEIL, &arguments[0])?;
    Ok(Value::number(number.ceil(), position))
}

/// `(math:floor 2.7)` — largest integer not above the argument.
pub fn floor<'k>(
    _vm: &Vm<'k>,
    arguments: &[Value<'k>],
    position: Position,
) -> Result<Value<'k>, Error> {
    if arguments.len() != 1 {
        return Err(Error::at(
            ErrorCode::RuntimeError,
            position,
            format!("{} requires 1 argument. Got {}", MATH_FLOOR, arguments.len()),
        ));
    }
    let number = number_arg(MATH_FLOOR, &arguments[0])?;
    Ok(Value::number(number.floor(), position))
}

/// `(math:random!)` — uniform in [0, 1). The generator is seeded once per
/// thread from the wall clock on first use.
pub fn random<'k>(
    _vm: &Vm<'k>,
    arguments: &[Value<'k>],
    position: Position,
) -> Result<Value<'k>, Error> {
    if !arguments.is_empty() {
        return Err(Error::at(
            ErrorCode::RuntimeError,
            position,
            format!(
                "{} requires no arguments. Got {}",
                MATH_RANDOM,
                arguments.len()
            ),
        ));
    }

    let sample = RNG.with(|cell| {
        let mut slot = cell.borrow_mut();
        let rng = slot.get_or_insert_with(|| {
            let seed = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|elapsed| elapsed.as_secs())
                .unwrap_or(0);
            StdRng::seed_from_u64(seed)
        });
        rng.gen::<f64>()
    });

    Ok(Value::number(sample, position))
}
