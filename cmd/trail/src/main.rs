//! `trail`: build, inspect and compare error records
//!
//! # Usage
//!
//! ```text
//! trail new "quota exceeded" 42 '"user-7"' '{"limit":10}'
//! trail inspect '{"code":"X","reason":[["new"]],"where":["main(main.rs:3)"]}'
//! some-service 2>&1 | trail inspect
//! trail eq "$(cat a.err)" "$(cat b.err)"
//! ```
//!
//! # Environment Variables
//!
//! - `ERRTRAIL_LOG=<filter>` - env_logger filter (default `warn`)
//! - `ERRTRAIL_FULL_PATHS=1` - keep full paths in recorded locations

use std::io::{self, BufRead};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use errtrail::env::env_get_str;
use errtrail::{equals, parse, ErrorRecord, Reason};
use serde_json::Value;

#[derive(Parser, Debug)]
#[command(name = "trail")]
#[command(version)]
#[command(about = "Build, inspect and compare errtrail records", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Indent JSON output
    #[arg(long, global = true)]
    pretty: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Build a record and print it as JSON
    New {
        code: String,
        /// One annotation; each item is read as JSON, or kept as a string
        reason: Vec<String>,
    },
    /// Parse error text (argument or stdin lines) and print its trail
    Inspect { text: Option<String> },
    /// Compare two error texts by code
    Eq { a: String, b: String },
}

fn main() -> ExitCode {
    env_logger::Builder::new()
        .parse_filters(&env_get_str("ERRTRAIL_LOG", "warn"))
        .format_timestamp(None)
        .init();

    let args = Args::parse();
    match run(args) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run(args: Args) -> anyhow::Result<ExitCode> {
    match args.command {
        Command::New { code, reason } => {
            let rec = ErrorRecord::new(code);
            if !reason.is_empty() {
                rec.annotate(reason.iter().map(|s| read_item(s)).collect());
            }
            println!("{}", render(&rec, args.pretty));
            Ok(ExitCode::SUCCESS)
        }
        Command::Inspect { text: Some(text) } => {
            inspect(&text);
            Ok(ExitCode::SUCCESS)
        }
        Command::Inspect { text: None } => {
            for line in io::stdin().lock().lines() {
                let line = line.context("reading stdin")?;
                inspect(line.trim_end());
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Eq { a, b } => {
            let same = same_code(&a, &b);
            println!("{}", same);
            Ok(ExitCode::from(eq_status(same)))
        }
    }
}

/// Empty text on either side means "no error".
fn same_code(a: &str, b: &str) -> bool {
    let (a, b) = (parse(a), parse(b));
    equals(
        a.as_ref().map(|r| r as &(dyn std::error::Error + 'static)),
        b.as_ref().map(|r| r as &(dyn std::error::Error + 'static)),
    )
}

fn eq_status(same: bool) -> u8 {
    if same {
        0
    } else {
        1
    }
}

/// JSON if it parses, otherwise the raw string.
fn read_item(s: &str) -> Value {
    serde_json::from_str(s).unwrap_or_else(|_| Value::from(s))
}

fn render(rec: &ErrorRecord, pretty: bool) -> String {
    if pretty {
        rec.to_json_pretty()
    } else {
        rec.to_json()
    }
}

fn inspect(text: &str) {
    let Some(rec) = parse(text) else {
        return;
    };
    println!("code:  {}", rec.code());
    println!("depth: {}", rec.depth());
    for (location, reason) in rec.locations().iter().zip(rec.reasons()) {
        println!("  {:<40} {}", location, format_reason(&reason));
    }
}

fn format_reason(reason: &Reason) -> String {
    let items: Vec<String> = reason.iter().map(Value::to_string).collect();
    items.join(", ")
}
