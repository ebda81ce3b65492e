//! parens entry point: dispatches to the CLI and maps failures to a
//! non-zero exit code.

fn main() {
    if let Err(error) = parens::cli::run_cli() {
        eprintln!("{}", error);
        std::process::exit(1);
    }
}
