//! Command-line surface: `parens run <file>` and `parens repl`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::repl;
use crate::runner;
use crate::vm::{VmOptions, DEFAULT_ENVIRONMENT_SIZE, DEFAULT_MAX_CALL_STACK_SIZE};

#[derive(Parser)]
#[command(name = "parens")]
#[command(about = "A small Lisp dialect", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate a program file
    Run {
        /// Path to the program
        file: PathBuf,

        /// Initial capacity of the global environment
        #[arg(long, default_value_t = DEFAULT_ENVIRONMENT_SIZE)]
        environment_size: usize,

        /// Evaluator recursion limit
        #[arg(long, default_value_t = DEFAULT_MAX_CALL_STACK_SIZE)]
        call_stack_size: usize,
    },
    /// Start an interactive session
    Repl {
        /// Initial capacity of the global environment
        #[arg(long, default_value_t = DEFAULT_ENVIRONMENT_SIZE)]
        environment_size: usize,

        /// Evaluator recursion limit
        #[arg(long, default_value_t = DEFAULT_MAX_CALL_STACK_SIZE)]
        call_stack_size: usize,
    },
}

/// Entry point for the CLI.
pub fn run_cli() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            file,
            environment_size,
            call_stack_size,
        } => runner::run_file(
            &file,
            VmOptions {
                environment_size,
                max_call_stack_size: call_stack_size,
            },
        ),
        Commands::Repl {
            environment_size,
            call_stack_size,
        } => repl::run(VmOptions {
            environment_size,
            max_call_stack_size: call_stack_size,
        }),
    }
}
