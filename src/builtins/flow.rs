//! Flow control intrinsics. `flow:sleep!` blocks the interpreter thread;
//! that is its contract.

use std::thread;
use std::time::Duration;

use super::number_arg;
use crate::error::{Error, ErrorCode};
use crate::position::Position;
use crate::value::Value;
use crate::vm::Vm;

pub const FLOW_SLEEP: &str = "flow:sleep!";

/// `(flow:sleep! 1000)` — suspends the calling thread for the given number
/// of milliseconds, rounded to the nearest integer.
pub fn sleep<'k>(
    _vm: &Vm<'k>,
    arguments: &[Value<'k>],
    position: Position,
) -> Result<Value<'k>, Error> {
    if arguments.is_empty() {
        return Err(Error::at(
            ErrorCode::RuntimeError,
            position,
            format!("{} requires 1 argument. Got {}", FLOW_SLEEP, arguments.len()),
        ));
    }

    let milliseconds = number_arg(FLOW_SLEEP, &arguments[0])?.round();
    if milliseconds < 0.0 {
        return Err(Error::at(
            ErrorCode::RuntimeError,
            arguments[0].position,
            format!("{} requires a non-negative number.", FLOW_SLEEP),
        ));
    }

    thread::sleep(Duration::from_millis(milliseconds as u64));
    Ok(Value::nil(position))
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use crate::arena::Arena;
    use crate::error::ErrorCode;
    use crate::interpreter::interpret;
    use crate::value::ValueKind;
    use crate::vm::{Vm, VmOptions};

    #[test]
    fn sleep_blocks_for_roughly_the_requested_time() {
        let keep = Arena::new();
        let vm = Vm::new(&keep, VmOptions::default());
        let started = Instant::now();
        let value = interpret(&vm, "(flow:sleep! 20)").unwrap().unwrap();
        assert!(matches!(value.kind, ValueKind::Nil));
        assert!(started.elapsed().as_millis() >= 20);
    }

    #[test]
    fn sleep_rejects_negative_durations() {
        let keep = Arena::new();
        let vm = Vm::new(&keep, VmOptions::default());
        let error = interpret(&vm, "(flow:sleep! -1)").unwrap_err();
        assert_eq!(error.code, ErrorCode::RuntimeError);
        assert!(error.message.contains("non-negative"));
    }

    #[test]
    fn sleep_requires_a_number() {
        let keep = Arena::new();
        let vm = Vm::new(&keep, VmOptions::default());
        let error = interpret(&vm, "(flow:sleep! \"soon\")").unwrap_err();
        assert_eq!(error.code, ErrorCode::RuntimeErrorUnexpectedType);
    }
}
