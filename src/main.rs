//! Binary entrypoint for the CodeXP CLI.
//!
//! Commands:
//! - `init` - write a starter `config.toml`
//! - `record <event> [--count <n>]` - record editor events for the active profile
//! - `status` - print the dashboard (level, XP, counters, challenges)
//! - `challenges` - list active challenges
//! - `level <xp>` - show the level curve for an XP total
//! - `nickname <name>` / `configure ...` - update profile preferences
//! - `export [path]` / `import <path>` / `reset` / `profiles` - manage stored profiles
//!
//! See the library crate docs for module-level details: `codexp::`.
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};

use codexp::config::Config;
use codexp::progression::{
    format_challenge_line, format_dashboard, format_notice, format_number_with_commas,
    level_info, GainedXpPosition, ProgressionEngine, ProgressionNotice, ProgressionStore,
};

#[derive(Parser)]
#[command(name = "codexp")]
#[command(about = "Experience points and challenges for editor actions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Profile to operate on (defaults to `storage.profile` from the config)
    #[arg(short, long, global = true)]
    profile: Option<String>,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init,
    /// Record one or more occurrences of an event (typing, save, build, ...)
    Record {
        /// Event key
        event: String,
        /// Number of occurrences
        #[arg(short = 'n', long, default_value_t = 1)]
        count: u32,
        /// Print every notice instead of a summary
        #[arg(long)]
        notices: bool,
    },
    /// Show level, XP, event counters and challenges
    Status,
    /// List active challenges
    Challenges,
    /// Show level information for an XP total
    Level {
        xp: u64,
    },
    /// Set the profile nickname
    Nickname {
        name: String,
    },
    /// Update display and notification preferences
    Configure {
        #[arg(long)]
        show_level_up: Option<bool>,
        #[arg(long)]
        show_challenge_complete: Option<bool>,
        #[arg(long)]
        show_gained_xp: Option<bool>,
        #[arg(long)]
        show_completed: Option<bool>,
        /// Gained XP label position (top, top-left, ..., top-right)
        #[arg(long)]
        position: Option<String>,
    },
    /// Print the profile as JSON, or write it to a file
    Export {
        path: Option<String>,
    },
    /// Replace the profile with an exported JSON document
    Import {
        path: String,
    },
    /// Delete the stored profile
    Reset,
    /// List stored profiles
    Profiles,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Init = cli.command {
        init_logging(&None, cli.verbose);
        Config::create_default(&cli.config).await?;
        info!("Configuration file created at {}", cli.config);
        return Ok(());
    }

    let config = Config::load_or_default(&cli.config).await?;
    init_logging(&Some(config.clone()), cli.verbose);

    let profile = cli
        .profile
        .clone()
        .unwrap_or_else(|| config.storage.profile.clone());
    let store = ProgressionStore::open(config.storage.database_path())?;

    match cli.command {
        // Handled before the store is opened
        Commands::Init => {}
        Commands::Record {
            event,
            count,
            notices,
        } => {
            let mut engine = ProgressionEngine::new(store.load_or_default(&profile)?);
            engine.initialize();
            let level_before = engine.level_info().level;
            let xp_before = engine.state().total_xp;
            let mut emitted: Vec<ProgressionNotice> = Vec::new();
            for _ in 0..count {
                emitted.extend(engine.record_event_key(&event)?);
            }
            store.save_state(&profile, engine.state())?;

            let state = engine.state();
            let configuration = &state.configuration;
            if notices {
                for notice in &emitted {
                    println!("{}", format_notice(&state.nickname, notice));
                }
            } else {
                for notice in emitted.iter().filter(|n| {
                    matches!(
                        n,
                        ProgressionNotice::LevelUp { .. } | ProgressionNotice::ChallengeCompleted { .. }
                    ) && configuration.allows(n)
                }) {
                    println!("{}", format_notice(&state.nickname, notice));
                }
                let level = engine.level_info();
                println!(
                    "+{} XP -> {} XP total (level {}{}, {}%)",
                    format_number_with_commas(state.total_xp.saturating_sub(xp_before)),
                    format_number_with_commas(state.total_xp),
                    level.level,
                    if level.level != level_before { ", up" } else { "" },
                    level.progress_percent
                );
            }
        }
        Commands::Status => {
            let state = store.load_or_default(&profile)?;
            print!("{}", format_dashboard(&state));
        }
        Commands::Challenges => {
            let state = store.load_or_default(&profile)?;
            for challenge in state.active_challenges.values() {
                println!("{}", format_challenge_line(challenge));
            }
        }
        Commands::Level { xp } => {
            let level = level_info(xp);
            println!(
                "Level {}: {}/{} XP into level ({}%), {} XP to next level",
                level.level,
                format_number_with_commas(level.xp_into_current_level),
                format_number_with_commas(level.xp_required_for_next_level),
                level.progress_percent,
                format_number_with_commas(level.xp_to_next_level())
            );
        }
        Commands::Nickname { name } => {
            let mut state = store.load_or_default(&profile)?;
            state.set_nickname(name.trim());
            store.save_state(&profile, &state)?;
            println!("Nickname set to '{}'.", state.nickname);
        }
        Commands::Configure {
            show_level_up,
            show_challenge_complete,
            show_gained_xp,
            show_completed,
            position,
        } => {
            let mut state = store.load_or_default(&profile)?;
            let mut configuration = state.configuration.clone();
            if let Some(value) = show_level_up {
                configuration.show_level_up_notification = value;
            }
            if let Some(value) = show_challenge_complete {
                configuration.show_complete_challenge_notification = value;
            }
            if let Some(value) = show_gained_xp {
                configuration.show_gained_xp = value;
            }
            if let Some(position) = position {
                configuration.position_to_display_gained_xp = position
                    .parse::<GainedXpPosition>()
                    .map_err(|e| anyhow!(e))?;
            }
            state.set_configuration(configuration);
            if let Some(show) = show_completed {
                state.set_show_completed_challenges(show);
            }
            store.save_state(&profile, &state)?;
            println!("{}", toml::to_string_pretty(&state.configuration)?);
            println!("show_completed_challenges = {}", state.show_completed_challenges);
        }
        Commands::Export { path } => {
            let json = store.export_json(&profile)?;
            match path {
                Some(path) => {
                    tokio::fs::write(&path, json).await?;
                    info!("Exported profile '{}' to {}", profile, path);
                }
                None => println!("{}", json),
            }
        }
        Commands::Import { path } => {
            let json = tokio::fs::read_to_string(&path)
                .await
                .map_err(|e| anyhow!("Failed to read {}: {}", path, e))?;
            let state = store.import_json(&profile, &json)?;
            println!(
                "Imported profile '{}': {} XP, {} completed challenges",
                profile,
                format_number_with_commas(state.total_xp),
                state.completed_challenges.len()
            );
        }
        Commands::Reset => {
            if store.delete_state(&profile)? {
                warn!("Profile '{}' deleted", profile);
                println!("Profile '{}' reset.", profile);
            } else {
                println!("Profile '{}' has no saved progress.", profile);
            }
        }
        Commands::Profiles => {
            for name in store.list_profiles()? {
                println!("{}", name);
            }
        }
    }

    Ok(())
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let base_level = match verbosity {
        0 => config
            .as_ref()
            .map(|cfg| cfg.logging.level_filter())
            .unwrap_or(log::LevelFilter::Warn),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config
        .as_ref()
        .and_then(|cfg| cfg.logging.file.as_ref())
        .and_then(|file| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(file)
                .ok()
        });

    if let Some(f) = log_file {
        let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
        // Mirror to the console only when someone is watching it
        let is_tty = atty::is(atty::Stream::Stderr);
        builder.format(move |fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            let line = format!("{} [{}] {}", ts, record.level(), record.args());
            if let Ok(mut guard) = write_mutex.lock() {
                let _ = writeln!(guard, "{}", line);
            }
            if is_tty {
                writeln!(fmt, "{}", line)
            } else {
                Ok(())
            }
        });
    } else {
        builder.format(|fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
        });
    }
    let _ = builder.try_init();
}
