//! Performance Orchestrator - Main CLI Application
//!
//! Runs the benchmark probe suite in a fixed order, extracts metrics from
//! each probe's output and prints a consolidated report.

use clap::Parser;
use perf_orchestrator::{
    app::App,
    cli::Cli,
    error::{AppError, ErrorReporter},
};
use std::process;

#[tokio::main]
async fn main() {
    // Report panics but leave unwinding alone so the server handle's drop
    // still kills the background probe
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
    }));

    let cli = Cli::parse();
    let reporter = ErrorReporter::new(cli.use_colors(), false);

    let result = match App::new(cli) {
        Ok(app) => app.run().await,
        Err(e) => Err(e),
    };

    if let Err(e) = result {
        reporter.report_error(&e);
        print_error_suggestions(&e);
        process::exit(e.exit_code());
    }
}

/// Print helpful suggestions for common errors
fn print_error_suggestions(error: &AppError) {
    if let AppError::Config(_) = error {
        eprintln!();
        eprintln!("Configuration help:");
        eprintln!("  - Check your .env file format (see --help-topic config)");
        eprintln!("  - PROBE_DIR / --probe-dir must name an existing directory");
        eprintln!("  - Timing values are whole milliseconds");
    }
}
