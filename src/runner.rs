//! Whole-file execution: split the source into top-level statements,
//! evaluate each against one global environment, stop at the first error.

use std::fs;
use std::path::Path;

use crate::arena::Arena;
use crate::error::Error;
use crate::formatter::format_error_message;
use crate::interpreter::evaluate;
use crate::lexer::tokenize;
use crate::parser::parse;
use crate::style::Style;
use crate::vm::{Vm, VmOptions};

/// Reads and evaluates a program file. Evaluation errors come back already
/// rendered with the offending source line.
pub fn run_file(path: &Path, options: VmOptions) -> Result<(), Box<dyn std::error::Error>> {
    let source = fs::read_to_string(path).map_err(|_| {
        format!("{}: cannot open '{}'", Style::bold_red("parens"), path.display())
    })?;
    if source.trim().is_empty() {
        return Err(format!("{}: provided file is empty", Style::bold_red("parens")).into());
    }

    let keep = Arena::new();
    let vm = Vm::new(&keep, options);
    let file_name = path.display().to_string();

    let mut arena = Arena::new();
    for statement in split_statements(&source) {
        if statement.trim().is_empty() {
            continue;
        }
        arena.reset();

        let outcome: Result<(), Error> = (|| {
            let tokens = tokenize(&arena, statement)?;
            let mut offset = 0;
            let mut depth = 0;
            if let Some(node) = parse(&arena, &tokens, &mut offset, &mut depth)? {
                evaluate(&vm, &node, &vm.global)?;
            }
            Ok(())
        })();

        if let Err(error) = outcome {
            return Err(format_error_message(
                &error.message,
                error.position,
                &file_name,
                statement,
            )
            .into());
        }
    }

    Ok(())
}

/// Splits a program into top-level statements: a statement ends at a newline
/// at paren depth 0, or at the paren that closes a top-level list. Newlines
/// and parens inside string literals don't count.
pub fn split_statements(source: &str) -> Vec<&str> {
    let mut statements = Vec::new();
    let bytes = source.as_bytes();
    let mut start = 0;
    let mut depth: i64 = 0;
    let mut in_string = false;
    let mut index = 0;

    while index < bytes.len() {
        let byte = bytes[index];

        if in_string {
            match byte {
                b'\\' => index += 1,
                b'"' => in_string = false,
                _ => {}
            }
        } else {
            match byte {
                b'"' => in_string = true,
                b'\n' if depth == 0 => {
                    statements.push(&source[start..index]);
                    start = index + 1;
                }
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        statements.push(&source[start..=index]);
                        start = index + 1;
                    }
                }
                _ => {}
            }
        }

        index += 1;
    }

    if start < source.len() {
        statements.push(&source[start..]);
    }
    statements
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trimmed(source: &str) -> Vec<&str> {
        split_statements(source)
            .into_iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect()
    }

    #[test]
    fn splits_at_top_level_newlines() {
        assert_eq!(trimmed("1\n2\n3"), vec!["1", "2", "3"]);
    }

    #[test]
    fn a_top_level_list_ends_at_its_closing_paren() {
        assert_eq!(trimmed("(+ 1 2) (+ 3 4)"), vec!["(+ 1 2)", "(+ 3 4)"]);
    }

    #[test]
    fn newlines_inside_lists_do_not_split() {
        assert_eq!(
            trimmed("(def! x\n  (+ 1\n     2))\nx"),
            vec!["(def! x\n  (+ 1\n     2))", "x"]
        );
    }

    #[test]
    fn parens_and_newlines_inside_strings_are_opaque() {
        assert_eq!(
            trimmed("(io:stdout! \"smile :)\")\n(io:stdout! \"a\nb\")"),
            vec!["(io:stdout! \"smile :)\")", "(io:stdout! \"a\nb\")"]
        );
    }

    #[test]
    fn escaped_quotes_stay_inside_the_string() {
        assert_eq!(
            trimmed(r#"(io:stdout! "say \"hi\" (now)")"#),
            vec![r#"(io:stdout! "say \"hi\" (now)")"#]
        );
    }

    #[test]
    fn blank_lines_produce_no_statements() {
        assert_eq!(trimmed("\n\n(+ 1 2)\n\n"), vec!["(+ 1 2)"]);
    }

    #[test]
    fn trailing_statement_without_newline_is_kept() {
        assert_eq!(trimmed("(+ 1\n2)"), vec!["(+ 1\n2)"]);
    }
}
