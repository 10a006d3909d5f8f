use std::fs;
use std::io::{self, BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use serde_json::Value as Json;

use fql_subscriptions::{generate_fql, parse_fql, validate, FqlConfig, Subscription, SubscriptionSet};

#[derive(Debug, Parser)]
#[command(name = "fql", version, about = "Parse, check and dispatch FQL event filters")]
struct Cli {
    /// Log at info level instead of warn
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the condition tree and canonical text of a filter
    Parse {
        fql: String,
        /// Print the tree as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check one JSON event against a filter
    Check {
        fql: String,
        /// Event file, `-` for stdin
        #[arg(short, long)]
        event: PathBuf,
    },
    /// Route JSON Lines events through configured subscriptions
    Dispatch {
        #[arg(short, long, env = "FQL_CONFIG")]
        config: PathBuf,
        /// JSON Lines file, `-` for stdin
        #[arg(short, long)]
        events: PathBuf,
    },
    /// Interactive filter prompt
    Repl,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        tracing::Level::INFO
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Parse { fql, json } => run_parse(&fql, json),
        Command::Check { fql, event } => run_check(&fql, &event),
        Command::Dispatch { config, events } => run_dispatch(&config, &events),
        Command::Repl => run_repl(),
    }
}

fn run_parse(fql: &str, json: bool) -> Result<()> {
    let subscription = parse_fql(fql);
    let Some(group) = subscription.as_group() else {
        if let Some(message) = describe_error(fql, &subscription) {
            println!("error: {message}");
        }
        return Ok(());
    };

    if json {
        let tree = serde_json::to_string_pretty(group).context("CLI: Failed to serialize tree")?;
        println!("{tree}");
    } else {
        println!("{group:#?}");
    }
    if let Ok(text) = generate_fql(&subscription) {
        println!("{text}");
    }
    Ok(())
}

fn run_check(fql: &str, event: &Path) -> Result<()> {
    let content = read_input(event)?;
    let event: Json = serde_json::from_str(&content)
        .with_context(|| format!("CLI: Event {} is not valid JSON", event.display()))?;

    let subscription = parse_fql(fql);
    if subscription.is_error() {
        if let Some(message) = describe_error(fql, &subscription) {
            eprintln!("{message}");
        }
    }
    println!("{}", if validate(&subscription, &event) { "match" } else { "no match" });
    Ok(())
}

fn run_dispatch(config: &Path, events: &Path) -> Result<()> {
    let config = FqlConfig::from_json_file(config)?;
    let options = config.parse_options();
    let set = SubscriptionSet::new(config.subscriptions, &options);
    tracing::info!(
        subscriptions = set.len(),
        valid = set.valid_count(),
        "loaded subscriptions"
    );

    let reader: Box<dyn BufRead> = if events.as_os_str() == "-" {
        Box::new(BufReader::new(io::stdin()))
    } else {
        let file = fs::File::open(events)
            .with_context(|| format!("CLI: Failed to open events {}", events.display()))?;
        Box::new(BufReader::new(file))
    };

    for (index, line) in reader.lines().enumerate() {
        let line = line.context("CLI: Failed to read events")?;
        if line.trim().is_empty() {
            continue;
        }
        let event: Json = match serde_json::from_str(&line) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(line = index + 1, error = %e, "skipping malformed event");
                continue;
            }
        };
        for decision in set.route(&event) {
            println!(
                "{}\t{}\t{}\t{}",
                index + 1,
                decision.name,
                decision.partner_action,
                decision.state
            );
        }
    }
    Ok(())
}

fn run_repl() -> Result<()> {
    let mut editor = DefaultEditor::new().context("CLI: Failed to start line editor")?;
    let mut event: Option<Json> = None;

    println!("FQL prompt. `:event <json>` sets the event, `:quit` exits.");
    loop {
        let line = match editor.readline("fql> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("CLI: Failed to read line"),
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Err(e) = editor.add_history_entry(line) {
            tracing::debug!(error = %e, "failed to record history entry");
        }

        if line == ":quit" {
            break;
        }
        if let Some(json) = line.strip_prefix(":event") {
            match serde_json::from_str::<Json>(json.trim()) {
                Ok(value) => {
                    println!("event set");
                    event = Some(value);
                }
                Err(e) => println!("invalid event: {e}"),
            }
            continue;
        }

        let subscription = parse_fql(line);
        match generate_fql(&subscription) {
            Ok(text) => println!("{text}"),
            Err(_) => {
                if let Some(message) = describe_error(line, &subscription) {
                    println!("{message}");
                }
                continue;
            }
        }
        if let Some(event) = &event {
            println!("{}", if validate(&subscription, event) { "match" } else { "no match" });
        }
    }
    Ok(())
}

/// Formats a parse error with a caret under the offending span.
fn describe_error(fql: &str, subscription: &Subscription) -> Option<String> {
    let cause = subscription.error()?;
    let Some(span) = cause.span else {
        return Some(cause.to_string());
    };
    let start = fql.get(..span.start).map_or(0, |s| s.chars().count());
    let width = fql
        .get(span.start..span.end)
        .map(|s| s.chars().count())
        .unwrap_or(0)
        .max(1);
    Some(format!(
        "{cause}\n  {fql}\n  {}{}",
        " ".repeat(start),
        "^".repeat(width)
    ))
}

fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut content = String::new();
        io::stdin()
            .read_to_string(&mut content)
            .context("CLI: Failed to read stdin")?;
        Ok(content)
    } else {
        fs::read_to_string(path).with_context(|| format!("CLI: Failed to read {}", path.display()))
    }
}
