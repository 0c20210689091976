use add_to_search::commands::{self, ActiveDocument, AddRequest, CommandId, CommandOutcome};
use add_to_search::config::Config;
use add_to_search::config_io::DirectoryContext;
use add_to_search::model::selection::{ExtractMode, SelectionRange};
use add_to_search::services::host::FsHost;
use add_to_search::services::{log_dirs, tracing_setup};
use add_to_search::session::{SessionState, SessionStore};
use anyhow::{Context, Result as AnyhowResult};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Collect selected lines into a search-results document
#[derive(Parser, Debug)]
#[command(name = "add-to-search")]
#[command(about = "Merge selected lines into a search-results document", long_about = None)]
#[command(version)]
struct Args {
    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Path to log file (default: XDG state dir)
    #[arg(long, value_name = "PATH", global = true)]
    log_file: Option<PathBuf>,

    /// Directory identifiers are resolved against and session state is kept in
    #[arg(short = 'C', long, value_name = "DIR", global = true)]
    working_dir: Option<PathBuf>,

    /// Print outcomes as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    dump_config: bool,

    /// Print the directories used and exit
    #[arg(long)]
    show_paths: bool,

    #[command(subcommand)]
    command: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Use a search-results document as the target
    Use {
        /// Document identifier (path)
        path: String,
    },
    /// Print the current target document
    Open,
    /// Add selected lines of a document to the target
    Add {
        /// Source document identifier (path)
        source: String,

        /// Selected lines, 1-based and inclusive: `N` or `A-B`, comma-separated
        #[arg(short, long, value_name = "RANGES", value_delimiter = ',', value_parser = parse_range, required = true)]
        lines: Vec<SelectionRange>,

        /// Treat the source as a search-results document
        #[arg(long, conflicts_with = "flat")]
        structured: bool,

        /// Treat the source as plain text
        #[arg(long)]
        flat: bool,

        /// Host language id of the source (e.g. `search-result`)
        #[arg(long, value_name = "ID")]
        language_id: Option<String>,

        /// Print the insertion plan instead of editing the target
        #[arg(long)]
        dry_run: bool,
    },
    /// Show the current target and which commands apply to a document
    Status {
        /// Active document identifier
        path: Option<String>,
    },
}

/// Parse `N` or `A-B` (1-based, inclusive) into a 0-based range
fn parse_range(s: &str) -> Result<SelectionRange, String> {
    let one_based = |v: &str| -> Result<usize, String> {
        let n: usize = v
            .trim()
            .parse()
            .map_err(|_| format!("invalid line number {v:?}"))?;
        n.checked_sub(1)
            .ok_or_else(|| "line numbers start at 1".to_string())
    };
    match s.split_once('-') {
        Some((a, b)) => Ok(SelectionRange::new(one_based(a)?, one_based(b)?)),
        None => Ok(SelectionRange::single(one_based(s)?)),
    }
}

fn main() -> AnyhowResult<()> {
    let args = Args::parse();

    let working_dir = match &args.working_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("Failed to determine working directory")?,
    };

    let log_path = args
        .log_file
        .clone()
        .unwrap_or_else(log_dirs::main_log_path);
    if tracing_setup::init_global(&log_path) {
        log_dirs::cleanup_stale_logs();
    } else {
        eprintln!("Warning: could not open log file {}", log_path.display());
    }
    tracing::info!("Started in {}", working_dir.display());

    let dir_context =
        DirectoryContext::from_system().context("Failed to determine system directories")?;

    if args.show_paths {
        log_dirs::print_all_paths(&dir_context, &working_dir);
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => Config::load_explicit(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::load_for_working_dir(&working_dir, &dir_context),
    };

    if args.dump_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    let Some(command) = args.command else {
        anyhow::bail!("no command given; try --help");
    };

    let store = SessionStore::for_working_dir(&working_dir);
    let mut session = store.load();
    let mut host = FsHost::new(working_dir);

    let outcome = match command {
        Cmd::Use { path } => {
            let active = ActiveDocument::new(&path);
            let outcome = commands::use_as_target(&mut session, &config, &active);
            if matches!(outcome, CommandOutcome::TargetSet { .. }) {
                store.save(&session).context("Failed to save session")?;
            }
            outcome
        }
        Cmd::Open => commands::open_target(&mut host, &session)?,
        Cmd::Add {
            source,
            lines,
            structured,
            flat,
            language_id,
            dry_run,
        } => {
            let mut active = ActiveDocument::new(&source);
            if let Some(id) = language_id.as_deref() {
                active = active.with_language_id(id);
            }
            let mode = if structured {
                Some(ExtractMode::Structured)
            } else if flat {
                Some(ExtractMode::Flat)
            } else {
                None
            };
            let request = AddRequest {
                source: active,
                selections: lines,
                mode,
                dry_run,
            };
            commands::add_selection(&mut host, &session, &config, &request)?
        }
        Cmd::Status { path } => {
            print_status(&session, &config, path.as_deref());
            return Ok(());
        }
    };

    tracing::info!("Outcome: {:?}", outcome);
    report(&outcome, args.json)
}

fn print_status(
    session: &SessionState,
    config: &Config,
    path: Option<&str>,
) {
    println!("Target: {}", session.target().unwrap_or("(none)"));
    let active = path.map(ActiveDocument::new);
    for command in CommandId::all() {
        let enabled = command.is_enabled(session, config, active.as_ref());
        println!(
            "  {:<18} {:<8} {}",
            command.name(),
            if enabled { "enabled" } else { "disabled" },
            command.description()
        );
    }
}

fn report(outcome: &CommandOutcome, json: bool) -> AnyhowResult<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
        if let CommandOutcome::Opened { document, .. } = outcome {
            print!("{}", document.to_text());
        }
        return Ok(());
    }

    match outcome {
        CommandOutcome::TargetSet { target } => println!("Target set to {target}"),
        CommandOutcome::NotLineFormat => {
            println!("Not a search-results document; target unchanged")
        }
        CommandOutcome::NoTarget => println!("No target set"),
        CommandOutcome::NoSource => println!("Source document has no identifier"),
        CommandOutcome::SourceIsTarget => println!("Source is the target; nothing to add"),
        CommandOutcome::NothingSelected => println!("Nothing selected"),
        CommandOutcome::Opened { target, document } => {
            eprintln!("{target}");
            print!("{}", document.to_text());
        }
        CommandOutcome::Planned { plan, .. } => {
            println!("{}", serde_json::to_string_pretty(plan)?);
        }
        CommandOutcome::Merged {
            target,
            inserted,
            selection,
        } => {
            println!("Inserted {inserted} line(s) into {target}");
            if !selection.is_empty() {
                let lines: Vec<String> = selection.iter().map(|i| (i + 1).to_string()).collect();
                println!("Selected lines: {}", lines.join(", "));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range() {
        assert_eq!(parse_range("3"), Ok(SelectionRange::single(2)));
        assert_eq!(parse_range("3-5"), Ok(SelectionRange::new(2, 4)));
        assert_eq!(parse_range("5-3"), Ok(SelectionRange::new(2, 4)));
        assert!(parse_range("0").is_err());
        assert!(parse_range("x").is_err());
        assert!(parse_range("1-").is_err());
    }

    #[test]
    fn test_args_parse_add() {
        let args = Args::try_parse_from([
            "add-to-search",
            "add",
            "src/lib.rs",
            "--lines",
            "1-2,7",
            "--lines",
            "9",
            "--dry-run",
        ])
        .unwrap();
        match args.command {
            Some(Cmd::Add {
                source,
                lines,
                dry_run,
                ..
            }) => {
                assert_eq!(source, "src/lib.rs");
                assert_eq!(
                    lines,
                    vec![
                        SelectionRange::new(0, 1),
                        SelectionRange::single(6),
                        SelectionRange::single(8)
                    ]
                );
                assert!(dry_run);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_structured_conflicts_with_flat() {
        let result = Args::try_parse_from([
            "add-to-search",
            "add",
            "a.search",
            "-l",
            "1",
            "--structured",
            "--flat",
        ]);
        assert!(result.is_err());
    }
}
