//! `truc` entry point: dispatches straight into the CLI.

fn main() {
    if let Err(e) = truclang::cli::run_cli() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
