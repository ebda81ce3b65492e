//! Canonical textual rendering of values and errors.

use crate::node::{Node, NodeKind};
use crate::position::Position;
use crate::value::{Value, ValueKind};

/// Renders a value the way the REPL echoes results: strings quoted, lists
/// space-separated, closures as their defining form.
pub fn format_value(value: &Value<'_>) -> String {
    let mut output = String::new();
    write_value(&mut output, value);
    output
}

fn write_value(output: &mut String, value: &Value<'_>) {
    match &value.kind {
        ValueKind::Nil => output.push_str("nil"),
        ValueKind::Boolean(true) => output.push_str("true"),
        ValueKind::Boolean(false) => output.push_str("false"),
        ValueKind::Number(number) => output.push_str(&format_number(*number)),
        ValueKind::Str(text) => {
            output.push('"');
            output.push_str(text);
            output.push('"');
        }
        ValueKind::Builtin(_) => output.push_str("#<builtin>"),
        ValueKind::Special(_) => output.push_str("#<special>"),
        ValueKind::List(items) => {
            output.push('(');
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    output.push(' ');
                }
                write_value(output, item);
            }
            output.push(')');
        }
        ValueKind::Closure(closure) => {
            output.push_str("(fn (");
            for (index, param) in closure.params.iter().enumerate() {
                if index > 0 {
                    output.push(' ');
                }
                output.push_str(param);
            }
            output.push_str(") ");
            write_node(output, closure.form);
            output.push(')');
        }
    }
}

/// Renders a syntax node; used for closure bodies.
pub fn format_node(node: &Node<'_>) -> String {
    let mut output = String::new();
    write_node(&mut output, node);
    output
}

fn write_node(output: &mut String, node: &Node<'_>) {
    match node.kind {
        NodeKind::Nil => output.push_str("nil"),
        NodeKind::Boolean(true) => output.push_str("true"),
        NodeKind::Boolean(false) => output.push_str("false"),
        NodeKind::Number(number) => output.push_str(&format_number(number)),
        NodeKind::Symbol(name) => output.push_str(name),
        NodeKind::Str(text) => {
            output.push('"');
            output.push_str(text);
            output.push('"');
        }
        NodeKind::List(children) => {
            output.push('(');
            for (index, child) in children.iter().enumerate() {
                if index > 0 {
                    output.push(' ');
                }
                write_node(output, child);
            }
            output.push(')');
        }
    }
}

fn format_number(number: f64) -> String {
    format!("{}", number)
}

/// Renders a positioned error with the offending source line and a caret:
///
/// ```text
/// Error: <msg>
///
/// <line> | <source line>
///          ^
///   at <filename>:<line>:<col>
/// ```
///
/// Errors without a position render as the first line only.
pub fn format_error_message(
    message: &str,
    position: Option<Position>,
    file_name: &str,
    input: &str,
) -> String {
    let mut output = format!("Error: {}", message);

    if let Some(position) = position {
        let source_line = input.lines().nth(position.line - 1).unwrap_or("");
        let prefix = format!("{} | ", position.line);

        output.push_str("\n\n");
        output.push_str(&prefix);
        output.push_str(source_line);
        output.push('\n');
        output.push_str(&" ".repeat(prefix.len() + position.column.saturating_sub(1)));
        output.push_str("^\n");
        output.push_str(&format!(
            "  at {}:{}:{}",
            file_name, position.line, position.column
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::Arena;
    use crate::interpreter::interpret;
    use crate::vm::{Vm, VmOptions};

    fn format_result(vm: &Vm<'_>, source: &str) -> String {
        format_value(&interpret(vm, source).unwrap().unwrap())
    }

    #[test]
    fn scalars_render_canonically() {
        let keep = Arena::new();
        let vm = Vm::new(&keep, VmOptions::default());
        assert_eq!(format_result(&vm, "6"), "6");
        assert_eq!(format_result(&vm, "2.5"), "2.5");
        assert_eq!(format_result(&vm, "true"), "true");
        assert_eq!(format_result(&vm, "false"), "false");
        assert_eq!(format_result(&vm, "nil"), "nil");
        assert_eq!(format_result(&vm, "\"hi\""), "\"hi\"");
    }

    #[test]
    fn whole_numbers_render_without_fraction() {
        let keep = Arena::new();
        let vm = Vm::new(&keep, VmOptions::default());
        assert_eq!(format_result(&vm, "(+ 2 4)"), "6");
        assert_eq!(format_result(&vm, "(/ 5 2)"), "2.5");
    }

    #[test]
    fn lists_render_space_separated() {
        let keep = Arena::new();
        let vm = Vm::new(&keep, VmOptions::default());
        assert_eq!(format_result(&vm, "(1 2 3)"), "(1 2 3)");
        assert_eq!(format_result(&vm, "()"), "()");
        assert_eq!(format_result(&vm, "(1 (2 3))"), "(1 (2 3))");
    }

    #[test]
    fn natives_render_opaquely() {
        let keep = Arena::new();
        let vm = Vm::new(&keep, VmOptions::default());
        assert_eq!(format_result(&vm, "+"), "#<builtin>");
        assert_eq!(format_result(&vm, "cond"), "#<special>");
    }

    #[test]
    fn closures_render_as_their_defining_form() {
        let keep = Arena::new();
        let vm = Vm::new(&keep, VmOptions::default());
        assert_eq!(
            format_result(&vm, "(fn (a b) (+ a b))"),
            "(fn (a b) (+ a b))"
        );
        assert_eq!(format_result(&vm, "(fn () 1)"), "(fn () 1)");
    }

    #[test]
    fn error_rendering_aligns_the_caret() {
        let rendered = format_error_message(
            "Symbol 'x' cannot be found in the current environment",
            Some(Position::new(1, 6)),
            "repl",
            "(+ 1 x)",
        );
        assert_eq!(
            rendered,
            "Error: Symbol 'x' cannot be found in the current environment\n\
             \n\
             1 | (+ 1 x)\n\
             \x20        ^\n\
             \x20 at repl:1:6"
        );
    }

    #[test]
    fn error_rendering_picks_the_right_line() {
        let rendered =
            format_error_message("boom", Some(Position::new(2, 1)), "file.lp", "(+ 1\n   2)");
        assert!(rendered.contains("2 |    2)"));
        assert!(rendered.contains("at file.lp:2:1"));
    }

    #[test]
    fn unpositioned_errors_render_bare() {
        let rendered = format_error_message("boom", None, "repl", "");
        assert_eq!(rendered, "Error: boom");
    }
}
