//! Console IO intrinsics. Strings print without their quotes; every other
//! value goes through the formatter.

use std::io::{BufRead, Write};

use crate::error::{Error, ErrorCode};
use crate::formatter::format_value;
use crate::position::Position;
use crate::value::{Value, ValueKind};
use crate::vm::Vm;

pub const IO_STDOUT: &str = "io:stdout!";
pub const IO_STDERR: &str = "io:stderr!";
pub const IO_PRINTF: &str = "io:printf!";
pub const IO_READLINE: &str = "io:readline!";
pub const IO_CLEAR: &str = "io:clear!";

const PLACEHOLDER: &str = "{}";

fn display_text(value: &Value<'_>) -> String {
    match &value.kind {
        ValueKind::Str(text) => text.clone(),
        _ => format_value(value),
    }
}

/// `(io:stdout! "hello")` — prints one value and a newline to stdout.
pub fn stdout<'k>(
    _vm: &Vm<'k>,
    arguments: &[Value<'k>],
    position: Position,
) -> Result<Value<'k>, Error> {
    if arguments.len() != 1 {
        return Err(Error::at(
            ErrorCode::RuntimeError,
            position,
            format!("{} requires 1 argument. Got {}", IO_STDOUT, arguments.len()),
        ));
    }
    println!("{}", display_text(&arguments[0]));
    Ok(Value::nil(position))
}

/// `(io:stderr! "oops")` — prints one value and a newline to stderr.
pub fn stderr<'k>(
    _vm: &Vm<'k>,
    arguments: &[Value<'k>],
    position: Position,
) -> Result<Value<'k>, Error> {
    if arguments.len() != 1 {
        return Err(Error::at(
            ErrorCode::RuntimeError,
            position,
            format!("{} requires 1 argument. Got {}", IO_STDERR, arguments.len()),
        ));
    }
    eprintln!("{}", display_text(&arguments[0]));
    Ok(Value::nil(position))
}

/// `(io:printf! "Hello, {}!" ("world"))` — replaces `{}` placeholders
/// left-to-right. No trailing newline.
pub fn printf<'k>(
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
                IO_PRINTF,
                arguments.len()
            ),
        ));
    }

    let format = match &arguments[0].kind {
        ValueKind::Str(text) => text,
        _ => {
            return Err(Error::at(
                ErrorCode::RuntimeErrorUnexpectedType,
                arguments[0].position,
                format!(
                    "{} requires a format string as the first argument. Got {}.",
                    IO_PRINTF,
                    arguments[0].type_name()
                ),
            ));
        }
    };
    let inputs = match &arguments[1].kind {
        ValueKind::List(items) => items,
        _ => {
            return Err(Error::at(
                ErrorCode::RuntimeErrorUnexpectedType,
                arguments[1].position,
                format!(
                    "{} requires a list as the second argument. Got {}.",
                    IO_PRINTF,
                    arguments[1].type_name()
                ),
            ));
        }
    };

    let placeholder_count = format.matches(PLACEHOLDER).count();
    if placeholder_count > inputs.len() {
        return Err(Error::at(
            ErrorCode::RuntimeError,
            arguments[0].position,
            format!(
                "Cannot have more placeholders than values. \
                 Got {} placeholders and {} values.",
                placeholder_count,
                inputs.len()
            ),
        ));
    }

    let mut output = String::with_capacity(format.len());
    let mut rest = format.as_str();
    let mut index = 0;
    while let Some(found) = rest.find(PLACEHOLDER) {
        output.push_str(&rest[..found]);
        output.push_str(&display_text(&inputs[index]));
        index += 1;
        rest = &rest[found + PLACEHOLDER.len()..];
    }
    output.push_str(rest);

    print!("{}", output);
    std::io::stdout().flush().ok();

    Ok(Value::nil(position))
}

/// `(io:readline! "name? ")` — prints the prompt, reads one line from
/// stdin, and returns it without its trailing newline. EOF reads as the
/// empty string.
pub fn readline<'k>(
    _vm: &Vm<'k>,
    arguments: &[Value<'k>],
    position: Position,
) -> Result<Value<'k>, Error> {
    if arguments.is_empty() {
        return Err(Error::at(
            ErrorCode::RuntimeError,
            position,
            format!("{} requires 1 argument. Got {}", IO_READLINE, arguments.len()),
        ));
    }

    let prompt = match &arguments[0].kind {
        ValueKind::Str(text) => text,
        _ => {
            return Err(Error::at(
                ErrorCode::RuntimeErrorUnexpectedType,
                arguments[0].position,
                format!(
                    "{} requires a string. Got {}.",
                    IO_READLINE,
                    arguments[0].type_name()
                ),
            ));
        }
    };

    print!("{}", prompt);
    std::io::stdout().flush().ok();

    let mut line = String::new();
    if std::io::stdin().lock().read_line(&mut line).is_err() {
        line.clear();
    }
    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }

    Ok(Value::string(line, position))
}

/// `(io:clear!)` — clears the terminal.
pub fn clear<'k>(
    _vm: &Vm<'k>,
    arguments: &[Value<'k>],
    position: Position,
) -> Result<Value<'k>, Error> {
    if !arguments.is_empty() {
        return Err(Error::at(
            ErrorCode::RuntimeError,
            position,
            format!("{} requires no arguments. Got {}", IO_CLEAR, arguments.len()),
        ));
    }
    println!("\x1b[1;1H\x1b[2J");
    Ok(Value::nil(position))
}

#[cfg(test)]
mod tests {
    use crate::arena::Arena;
    use crate::error::ErrorCode;
    use crate::interpreter::interpret;
    use crate::value::ValueKind;
    use crate::vm::{Vm, VmOptions};

    #[test]
    fn stdout_returns_nil() {
        let keep = Arena::new();
        let vm = Vm::new(&keep, VmOptions::default());
        let value = interpret(&vm, "(io:stdout! \"hello\")").unwrap().unwrap();
        assert!(matches!(value.kind, ValueKind::Nil));
    }

    #[test]
    fn stdout_requires_exactly_one_argument() {
        let keep = Arena::new();
        let vm = Vm::new(&keep, VmOptions::default());
        for source in ["(io:stdout!)", "(io:stdout! 1 2)"] {
            let error = interpret(&vm, source).unwrap_err();
            assert_eq!(error.code, ErrorCode::RuntimeError, "{}", source);
        }
    }

    #[test]
    fn printf_rejects_placeholder_overflow() {
        let keep = Arena::new();
        let vm = Vm::new(&keep, VmOptions::default());
        let error = interpret(&vm, "(io:printf! \"{} {}\" (\"one\"))").unwrap_err();
        assert_eq!(error.code, ErrorCode::RuntimeError);
        assert!(error.message.contains("more placeholders"));
    }

    #[test]
    fn printf_accepts_surplus_values() {
        let keep = Arena::new();
        let vm = Vm::new(&keep, VmOptions::default());
        let value = interpret(&vm, "(io:printf! \"{}\" (\"one\" \"two\"))")
            .unwrap()
            .unwrap();
        assert!(matches!(value.kind, ValueKind::Nil));
    }

    #[test]
    fn printf_requires_a_format_string() {
        let keep = Arena::new();
        let vm = Vm::new(&keep, VmOptions::default());
        let error = interpret(&vm, "(io:printf! 1 (2))").unwrap_err();
        assert_eq!(error.code, ErrorCode::RuntimeErrorUnexpectedType);
    }

    #[test]
    fn clear_rejects_arguments() {
        let keep = Arena::new();
        let vm = Vm::new(&keep, VmOptions::default());
        let error = interpret(&vm, "(io:clear! 1)").unwrap_err();
        assert_eq!(error.code, ErrorCode::RuntimeError);
    }
}
