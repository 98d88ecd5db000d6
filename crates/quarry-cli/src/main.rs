// SPDX-License-Identifier: MIT OR Apache-2.0
//! quarry CLI binary - select nodes from JSON documents with path expressions

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, Subcommand};
use quarry::{JsonPath, Settings};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "quarry")]
#[command(version, about, long_about = None)]
struct Args {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Output file (default: stdout)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Subcommands for quarry CLI
#[derive(Subcommand)]
enum Commands {
    /// Select nodes matching a path
    Select {
        /// Path expression
        path: String,

        /// JSON file (reads from stdin if not provided)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,

        /// Expect at most one match; print it or `null`
        #[arg(long)]
        one: bool,

        /// Compact output
        #[arg(short = 'c', long)]
        compact: bool,

        /// Fail when a property, index or slice finds nothing
        #[arg(short = 'e', long = "error-when-no-match")]
        error_when_no_match: bool,

        /// Abort regex predicates that run longer than this
        #[arg(long = "regex-timeout-ms", value_name = "MS")]
        regex_timeout_ms: Option<u64>,
    },
    /// Print the parsed filter pipeline as JSON
    Explain {
        /// Path expression
        path: String,
    },
    /// Check that a path parses
    Check {
        /// Path expression
        path: String,
    },
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    match args.command {
        Commands::Select { .. } => handle_select(&args),
        Commands::Explain { .. } => handle_explain(&args),
        Commands::Check { .. } => handle_check(&args),
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn fail(e: &anyhow::Error) -> ! {
    eprintln!("Error: {e:#}");
    std::process::exit(1);
}

fn handle_select(args: &Args) {
    if let Commands::Select {
        path,
        file,
        one,
        compact,
        error_when_no_match,
        regex_timeout_ms,
    } = &args.command
    {
        let mut settings = Settings::new().with_error_when_no_match(*error_when_no_match);
        if let Some(ms) = regex_timeout_ms {
            settings = settings.with_regex_match_timeout(Duration::from_millis(*ms));
        }
        if let Err(e) = run_select(
            path,
            file.as_deref(),
            *one,
            *compact,
            &settings,
            args.output.as_deref(),
        ) {
            fail(&e);
        }
    }
}

fn run_select(
    path_str: &str,
    file: Option<&Path>,
    one: bool,
    compact: bool,
    settings: &Settings,
    output: Option<&Path>,
) -> Result<()> {
    let path = JsonPath::parse(path_str).with_context(|| format!("invalid path `{path_str}`"))?;
    let input = read_input(file)?;
    let document: Value = serde_json::from_str(&input).context("input is not valid JSON")?;

    let rendered = if one {
        let node = path.select_one(&document, settings)?;
        render(&node, compact)?
    } else {
        let nodes = path.select_all(&document, settings)?;
        debug!(matches = nodes.len(), "selection complete");
        nodes
            .iter()
            .map(|node| render(node, compact))
            .collect::<Result<Vec<_>>>()?
            .join("\n")
    };
    write_output(output, &rendered)
}

fn handle_explain(args: &Args) {
    if let Commands::Explain { path } = &args.command
        && let Err(e) = run_explain(path, args.output.as_deref())
    {
        fail(&e);
    }
}

fn run_explain(path_str: &str, output: Option<&Path>) -> Result<()> {
    let path = JsonPath::parse(path_str).with_context(|| format!("invalid path `{path_str}`"))?;
    let rendered = render(&path.filters(), false)?;
    write_output(output, &rendered)
}

fn handle_check(args: &Args) {
    if let Commands::Check { path } = &args.command
        && let Err(e) = run_check(path, args.output.as_deref())
    {
        fail(&e);
    }
}

fn run_check(path_str: &str, output: Option<&Path>) -> Result<()> {
    match JsonPath::parse(path_str) {
        Ok(path) => write_output(output, &format!("ok: {} step(s)", path.filters().len())),
        Err(e) => {
            let marker = " ".repeat(e.position());
            bail!("{e}\n  {path_str}\n  {marker}^ while parsing {}", e.context())
        }
    }
}

fn render<T: Serialize>(value: &T, compact: bool) -> Result<String> {
    let rendered = if compact {
        serde_json::to_string(value)?
    } else {
        serde_json::to_string_pretty(value)?
    };
    Ok(rendered)
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(p) = path {
        fs::read_to_string(p).with_context(|| format!("failed to read {}", p.display()))
    } else {
        let mut input = String::new();
        io::stdin()
            .read_to_string(&mut input)
            .context("failed to read stdin")?;
        Ok(input)
    }
}

fn write_output(path: Option<&Path>, output: &str) -> Result<()> {
    if let Some(p) = path {
        fs::write(p, format!("{output}\n"))
            .with_context(|| format!("failed to write {}", p.display()))?;
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        writeln!(handle, "{output}")?;
    }
    Ok(())
}
