use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

/// Check a user-profile JSON document and print a report.
#[derive(Parser)]
#[command(name = "profile-check", version)]
struct Cli {
    /// File to check. Reads stdin when omitted.
    path: Option<PathBuf>,

    /// Print the JSON-Schema of a profile instead of checking anything.
    #[arg(long)]
    schema: bool,
}

fn read_input(path: Option<&PathBuf>) -> std::io::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.schema {
        println!("{}", serde_json::to_string_pretty(&profile_check::schema())?);
        return Ok(ExitCode::SUCCESS);
    }

    let text = read_input(cli.path.as_ref())?;
    let report = profile_check::check(&text)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    // 1 = well-formed JSON that is not a valid profile
    Ok(if report.valid { ExitCode::SUCCESS } else { ExitCode::from(1) })
}
