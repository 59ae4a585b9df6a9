//! Vidshooter input tool
//!
//! Inspect, calibrate and monitor the arcade shooter's input mappings from the
//! command line.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use std::ops::ControlFlow;
use std::path::PathBuf;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vidshooter_input::config::AppConfig;
use vidshooter_input::frame_loop::FrameLoop;
use vidshooter_input::input::{GameAction, GamepadSource, InputManager, Unsubscribe};
use vidshooter_input::paths::AppPaths;
use vidshooter_input::storage::SledStore;

/// Vidshooter input mapping tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (defaults to the application data dir)
    #[arg(short, long, env = "VIDSHOOTER_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the stored mappings of every action
    Summary,
    /// Replace stored mappings with the default key bindings
    Reset,
    /// Learn the mapping of one action from the connected gamepads
    Learn {
        /// Action name (fire, moveUp, moveDown, moveLeft, moveRight, pause, start)
        action: String,
    },
    /// Print dispatched actions until Ctrl+C
    Monitor,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_logging(&args.log_level)?;

    let paths = AppPaths::detect();
    paths.ensure_directories()?;

    let config_path = args.config.clone().unwrap_or_else(|| paths.config.clone());
    let config = AppConfig::load_or_default(&config_path).await?;
    info!("Configuration: {}", config_path.display());

    let db_path = paths.mapping_db_path(&config.storage);
    let store = SledStore::open(&db_path)
        .with_context(|| format!("Failed to open mapping storage at {}", db_path.display()))?;

    let mut manager = InputManager::with_settings(config.input.clone());
    manager.load_mappings_from_storage(&store);

    match args.command {
        Command::Summary => print_summary(&manager),
        Command::Reset => {
            manager.clear_all_mappings();
            manager.clear_resting_input_values();
            manager.initialize_wasd();
            manager.save_mappings_to_storage(&store)?;
            println!("{}", "Mappings reset to default key bindings".green());
            print_summary(&manager);
        }
        Command::Learn { action } => {
            learn(&mut manager, &config, &action).await?;
            manager.save_mappings_to_storage(&store)?;
            print_summary(&manager);
        }
        Command::Monitor => monitor(&mut manager, &config).await?,
    }

    Ok(())
}

async fn learn(manager: &mut InputManager, config: &AppConfig, action: &str) -> Result<()> {
    if GameAction::from_name(action).is_none() {
        warn!("'{}' is not a built-in action", action);
    }

    let mut source = open_gamepads()?;
    manager.record_resting_values_from(source.as_mut());

    println!("{} {}", "Press any key or button for".bold(), action.yellow());
    let options = manager
        .default_learning_options()
        .on_first_input(|input_type, index_or_key| {
            println!("  {} {} {}", "→".cyan(), input_type, index_or_key.bright_white());
        })
        .on_done(|name| println!("{} {}", "Done mapping:".green(), name));
    manager.start_learning_mode(action, options)?;

    let (_tx, rx) = mpsc::channel(1);
    let frames = FrameLoop::from_rate(config.frame_rate_hz);
    tokio::select! {
        _ = frames.run(manager, source.as_mut(), rx, |m, _| {
            if m.is_learning() { ControlFlow::Continue(()) } else { ControlFlow::Break(()) }
        }) => {}
        _ = shutdown_signal() => {}
    }

    manager.stop_learning_mode();
    Ok(())
}

async fn monitor(manager: &mut InputManager, config: &AppConfig) -> Result<()> {
    let mut source = open_gamepads()?;
    manager.record_resting_values_from(source.as_mut());

    let _handles: Vec<Unsubscribe> = GameAction::all()
        .iter()
        .map(|action| {
            let name = action.as_str();
            manager.add_event_listener(name, move |intensity| {
                println!("{:>10} {:.3}", name.yellow(), intensity);
            })
        })
        .collect();

    println!("{}", "Monitoring actions, press Ctrl+C to stop".bold());
    let (_tx, rx) = mpsc::channel(1);
    let frames = FrameLoop::from_rate(config.frame_rate_hz);
    tokio::select! {
        stats = frames.run(manager, source.as_mut(), rx, |_, _| ControlFlow::Continue(())) => {
            info!("Monitor stopped after {} frame(s)", stats.frames);
        }
        _ = shutdown_signal() => {}
    }

    Ok(())
}

fn print_summary(manager: &InputManager) {
    println!("\n{}", "=== Input Mappings ===".bold().cyan());
    for action in GameAction::all() {
        let lines = manager.get_mapping_summary_for_action(action.as_str());
        if lines.is_empty() {
            println!("  {:<10} {}", action.as_str().yellow(), "(unmapped)".dimmed());
            continue;
        }
        for line in lines {
            println!("  {:<10} {}", action.as_str().yellow(), line);
        }
    }
    println!(
        "\n  Resting values: {}",
        manager.resting_values().len().to_string().green()
    );
}

#[cfg(feature = "gamepad")]
fn open_gamepads() -> Result<Box<dyn GamepadSource>> {
    let gamepads = vidshooter_input::input::GilrsGamepads::new()?;
    Ok(Box::new(gamepads))
}

#[cfg(not(feature = "gamepad"))]
fn open_gamepads() -> Result<Box<dyn GamepadSource>> {
    anyhow::bail!("gamepad support is disabled; rebuild with `--features gamepad`")
}

fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .init();

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
