//! The interactive read-eval-print loop. One global environment lives for
//! the whole session; the syntax arena is reset per input.

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::arena::Arena;
use crate::error::Error;
use crate::formatter::{format_error_message, format_value};
use crate::interpreter::evaluate;
use crate::lexer::tokenize;
use crate::parser::parse;
use crate::style::Style;
use crate::vm::{Vm, VmOptions};

const COMMAND_CLEAR: &str = "clear";
const COMMAND_HELP: &str = "help";
const COMMAND_MORE: &str = "?";

pub fn run(options: VmOptions) -> Result<(), Box<dyn std::error::Error>> {
    let keep = Arena::new();
    let vm = Vm::new(&keep, options);
    let mut editor = DefaultEditor::new()?;

    let banner = format!("parens - v{}", env!("CARGO_PKG_VERSION"));
    println!("{}", Style::bold(&banner));
    println!("Type 'help' for help. Press Ctrl+C to exit.\n");

    let mut arena = Arena::new();
    loop {
        arena.reset();

        let input = match editor.readline("> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(error) => return Err(error.into()),
        };

        if input.is_empty() {
            continue;
        }

        match input.as_str() {
            COMMAND_CLEAR => {
                print!("\x1b[1;1H\x1b[2J");
                continue;
            }
            COMMAND_HELP => {
                help();
                continue;
            }
            COMMAND_MORE => {
                println!("Error: not implemented yet!");
                continue;
            }
            _ => {}
        }

        let tokens = match tokenize(&arena, &input) {
            Ok(tokens) => tokens,
            Err(error) => {
                print_error(&error, &input);
                continue;
            }
        };

        // Only inputs that tokenize enter the history.
        let _ = editor.add_history_entry(&input);

        let mut offset = 0;
        let mut depth = 0;
        let node = match parse(&arena, &tokens, &mut offset, &mut depth) {
            Ok(Some(node)) => node,
            Ok(None) => continue,
            Err(error) => {
                print_error(&error, &input);
                continue;
            }
        };

        match evaluate(&vm, &node, &vm.global) {
            Ok(value) => println!("~> {}", format_value(&value)),
            Err(error) => print_error(&error, &input),
        }
    }

    Ok(())
}

/// REPL errors go to stdout and the session continues; definitions made
/// before the failure stay in the environment.
fn print_error(error: &Error, input: &str) {
    println!(
        "{}",
        format_error_message(&error.message, error.position, "repl", input)
    );
}

fn help() {
    println!(
        "parens is a LISP dialect. Its syntax is made of expressions enclosed \
         in parentheses.\n\
         Here's your first program:\n\
         \n\
         \x20   (io:stdout! (+ 1 2)) ; prints 3\n\
         \n\
         Definitions persist for the whole session:\n\
         \n\
         \x20   (def! double (fn (x) (* x 2)))\n\
         \x20   (double 21) ; prints 42\n"
    );
}
