//! loopcheck - step through prefix-scan loops with live invariant checks
//!
//! Thin front end over the `loopcheck` library: parses input, drives a
//! [`LoopSession`] and renders its snapshots.

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use loopcheck::{
    annotate, LoopCheckError, LoopMode, LoopSession, LoopStateSnapshot, RunStatus, Sequence,
    VerifierConfig,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "loopcheck")]
#[command(version = "0.1.0")]
#[command(about = "Step prefix-scan loops while re-verifying their invariants", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Project directory holding .loopcheck/settings.json (defaults to current directory)
    #[arg(short, long, global = true, default_value = ".")]
    project: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit diagnostics on stderr as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a loop to completion, pausing between steps (Ctrl-C stops)
    Run {
        /// Sequence, e.g. "1, 5, 3, 6, 2"
        #[arg(long, allow_hyphen_values = true)]
        values: String,

        /// Loop mode: prefix-sum, count-above-threshold or prefix-max
        #[arg(short, long, value_enum)]
        mode: Option<LoopMode>,

        /// Threshold T for count-above-threshold
        #[arg(short, long, allow_hyphen_values = true)]
        threshold: Option<i64>,

        /// Pause between steps in milliseconds
        #[arg(long, value_name = "MS")]
        delay_ms: Option<u64>,

        /// Print snapshots as JSON lines
        #[arg(long)]
        json: bool,

        /// Print the run log afterwards
        #[arg(long)]
        log: bool,
    },

    /// Execute a fixed number of manual steps
    Step {
        /// Sequence, e.g. "1, 5, 3, 6, 2"
        #[arg(long, allow_hyphen_values = true)]
        values: String,

        /// Loop mode: prefix-sum, count-above-threshold or prefix-max
        #[arg(short, long, value_enum)]
        mode: Option<LoopMode>,

        /// Threshold T for count-above-threshold
        #[arg(short, long, allow_hyphen_values = true)]
        threshold: Option<i64>,

        /// Number of steps to take
        #[arg(short, long, default_value = "1")]
        count: usize,

        /// Print snapshots as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Show the invariant, variant function and weakest precondition of a mode
    Describe {
        /// Loop mode: prefix-sum, count-above-threshold or prefix-max
        #[arg(short, long, value_enum)]
        mode: Option<LoopMode>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show or validate configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate configuration file
    Validate,

    /// Show configuration file path
    Paths,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "loopcheck=debug,info"
    } else {
        "loopcheck=info,warn"
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    if let Err(e) = dispatch(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(exit_code(&e));
    }
}

/// Process status for an error, taken from the library error when present.
fn exit_code(error: &anyhow::Error) -> i32 {
    error
        .downcast_ref::<LoopCheckError>()
        .map_or(1, LoopCheckError::exit_code)
}

async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    let project_path = cli.project.canonicalize().unwrap_or(cli.project.clone());

    match cli.command {
        Commands::Run {
            values,
            mode,
            threshold,
            delay_ms,
            json,
            log,
        } => {
            let mut config = load_config(&project_path)?;
            if let Some(ms) = delay_ms {
                config = config.with_step_delay_ms(ms);
            }
            config.validate()?;

            let sequence = values
                .parse::<Sequence>()
                .context("Failed to parse --values")?;
            let mode = mode.unwrap_or(config.default_mode);
            let threshold = threshold.unwrap_or(config.default_threshold);

            let session = LoopSession::new(&config);
            let initial = session.initialize(sequence.clone(), mode, threshold).await;
            print_header(&sequence, mode, threshold, json);
            print_snapshot(&initial, json);

            let stopper = session.clone();
            let ctrl_c = tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    stopper.stop();
                }
            });

            let result = session.run(|snapshot| print_snapshot(snapshot, json)).await;
            ctrl_c.abort();

            if log {
                print_log(&session).await;
            }

            let outcome = result?;
            if !json {
                match outcome.status {
                    RunStatus::Completed => println!(
                        "{} after {} steps",
                        "Loop completed".green().bold(),
                        outcome.steps
                    ),
                    RunStatus::Cancelled => println!(
                        "{} after {} steps",
                        "Run stopped".yellow().bold(),
                        outcome.steps
                    ),
                    RunStatus::AlreadyRunning => {}
                }
            }
        }

        Commands::Step {
            values,
            mode,
            threshold,
            count,
            json,
        } => {
            let config = load_config(&project_path)?;
            config.validate()?;
            let sequence = values
                .parse::<Sequence>()
                .context("Failed to parse --values")?;
            let mode = mode.unwrap_or(config.default_mode);
            let threshold = threshold.unwrap_or(config.default_threshold);

            let session = LoopSession::new(&config);
            let initial = session.initialize(sequence.clone(), mode, threshold).await;
            print_header(&sequence, mode, threshold, json);
            print_snapshot(&initial, json);

            for _ in 0..count {
                let snapshot = session.step().await?;
                print_snapshot(&snapshot, json);
                if snapshot.completed {
                    break;
                }
            }
        }

        Commands::Describe { mode, json } => {
            let config = load_config(&project_path)?;
            let mode = mode.unwrap_or(config.default_mode);
            let descriptor = LoopSession::describe(mode);
            let annotation = annotate(mode);

            if json {
                let out = serde_json::json!({
                    "descriptor": descriptor,
                    "wp": annotation,
                });
                println!("{}", serde_json::to_string_pretty(&out)?);
            } else {
                println!("{} {}", "Mode:".bold(), mode);
                println!("{} {}", "Invariant:".bold(), descriptor.invariant_words);
                println!("{} {}", "Formula:".bold(), descriptor.invariant_formula);
                println!("{} {}", "Variant:".bold(), descriptor.variant_formula);
                println!("{} {}", "Guard:".bold(), descriptor.loop_guard);
                println!("{} {}", "Body:".bold(), descriptor.loop_body);
                println!("{} {}", "wp:".bold(), annotation.symbolic_formula);
                println!("   {}", annotation.natural_language.dimmed());
            }
        }

        Commands::Config { action } => match action {
            ConfigAction::Show { json } => {
                let config = load_config(&project_path)?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&config)?);
                } else {
                    println!("{}", "loopcheck configuration".bold());
                    println!("  Step delay:        {} ms", config.step_delay_ms);
                    println!("  Log capacity:      {}", config.log_capacity);
                    println!("  Default mode:      {}", config.default_mode);
                    println!("  Default threshold: {}", config.default_threshold);
                }
            }
            ConfigAction::Validate => {
                let config = load_config(&project_path)?;
                config.validate()?;
                println!("{} Configuration is valid", "✓".green());
            }
            ConfigAction::Paths => {
                let path = VerifierConfig::settings_path(&project_path);
                let status = if path.exists() { "found" } else { "not found" };
                println!("{} ({})", path.display(), status);
            }
        },
    }

    Ok(())
}

fn load_config(project_path: &Path) -> anyhow::Result<VerifierConfig> {
    if !project_path.exists() {
        return Err(LoopCheckError::config(format!(
            "Project directory does not exist: {}",
            project_path.display()
        ))
        .into());
    }
    let config = VerifierConfig::load(project_path)?;
    Ok(config)
}

fn print_header(sequence: &Sequence, mode: LoopMode, threshold: i64, json: bool) {
    if json {
        return;
    }
    let descriptor = mode.describe();
    println!("{} {} (n = {})", "Sequence:".bold(), sequence, sequence.len());
    if mode == LoopMode::CountAboveThreshold {
        println!("{} {}  T = {}", "Mode:".bold(), mode, threshold);
    } else {
        println!("{} {}", "Mode:".bold(), mode);
    }
    println!("{} {}", "Invariant:".bold(), descriptor.invariant_formula);
    println!("{} {}", "Variant:".bold(), descriptor.variant_formula);
}

fn print_snapshot(snapshot: &LoopStateSnapshot, json: bool) {
    if json {
        match serde_json::to_string(snapshot) {
            Ok(line) => println!("{}", line),
            Err(e) => eprintln!("{} {}", "Error:".red().bold(), e),
        }
        return;
    }

    let mark = |held: bool| {
        if held {
            "✓".green()
        } else {
            "✗".red()
        }
    };
    let mut line = format!(
        "  {}  inv before {} after {}",
        snapshot.summary(),
        mark(snapshot.invariant_held_before),
        mark(snapshot.invariant_held_after)
    );
    if snapshot.mode == LoopMode::CountAboveThreshold {
        line.push_str(&format!("  found {:?}", snapshot.auxiliary));
    }
    if snapshot.contaminated {
        line.push_str(&format!("  {}", "CONTAMINATED".red().bold()));
    }
    println!("{}", line);
}

async fn print_log(session: &LoopSession) {
    println!("{}", "Run log:".bold());
    for entry in session.log().await {
        println!("  {}", entry.render());
    }
}
