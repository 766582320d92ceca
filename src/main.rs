use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};

use touchremote::Config;
use touchremote::dispatch::{self, DispatchDependencies, Dispatcher, PasswordPrefix};
use touchremote::input::{Effect, RemoteEvent, RemoteState};
use touchremote::protocol::KeyAction;
use touchremote::replay::{self, Scenario};

#[derive(Parser, Debug)]
#[command(name = "touchremote")]
#[command(
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("TOUCHREMOTE_GIT_HASH"), ")"),
    about = "Touchscreen keypad and mouse-pad remote control client"
)]
struct Cli {
    /// Read settings from FILE instead of ~/.config/touchremote/config.toml
    #[arg(long, short = 'c', value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the agent host
    #[arg(long, value_name = "HOST")]
    host: Option<String>,

    /// Override the agent UDP port
    #[arg(long, value_name = "PORT")]
    port: Option<u16>,

    /// Replay a touch scenario and send the resulting commands
    #[arg(long, short = 'r', value_name = "FILE")]
    replay: Option<PathBuf>,

    /// Print the commands of a replay instead of sending them
    #[arg(long, action = ArgAction::SetTrue, requires = "replay")]
    dry_run: bool,

    /// Check that the agent answers a ping
    #[arg(long, short = 'p', action = ArgAction::SetTrue)]
    probe: bool,

    /// Write the example configuration to the config directory
    #[arg(long, action = ArgAction::SetTrue)]
    init_config: bool,

    /// List every key name usable in a layout
    #[arg(long, action = ArgAction::SetTrue)]
    list_actions: bool,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    if cli.init_config {
        let path = Config::create_default_file()?;
        println!("Created {}", path.display());
        return Ok(());
    }

    if cli.list_actions {
        list_actions();
        return Ok(());
    }

    if cli.replay.is_none() && !cli.probe {
        print_usage();
        return Ok(());
    }

    let config = load_config(&cli)?;
    let connection = &config.connection;
    let target = format!("{}:{}", connection.host, connection.port);
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;

    if cli.probe {
        let cipher = PasswordPrefix::new(connection.password.clone());
        let timeout = Duration::from_millis(connection.probe_timeout_ms);
        runtime
            .block_on(dispatch::probe(
                &connection.host,
                connection.port,
                &cipher,
                timeout,
            ))
            .with_context(|| format!("Agent at {target} did not answer"))?;
        println!("Agent at {target} is reachable");
    }

    if let Some(path) = &cli.replay {
        let scenario = Scenario::load(path)?;
        let effects = replay_session(&config, &scenario)?;

        if cli.dry_run {
            for effect in &effects {
                match effect {
                    Effect::Send(command) => println!("{command}"),
                    Effect::Vibrate => log::debug!("Vibrate"),
                }
            }
        } else {
            let dispatcher = Dispatcher::new(
                runtime.handle(),
                DispatchDependencies::for_connection(connection),
            );
            dispatcher.dispatch_effects(&effects)?;
            runtime.block_on(dispatcher.shutdown());
            log::info!("Replayed {} steps to {target}", scenario.steps.len());
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file {} does not exist", path.display());
            }
            Config::load_from(path)?
        }
        None => Config::load()?,
    };

    if let Some(host) = &cli.host {
        config.connection.host = host.clone();
    }
    if let Some(port) = cli.port {
        config.connection.port = port;
    }
    config.validate_and_clamp();
    Ok(config)
}

/// Runs a scenario as one foreground session: resume, steps, pause.
fn replay_session(config: &Config, scenario: &Scenario) -> Result<Vec<Effect>> {
    let mut state = RemoteState::new(config);
    state.apply(RemoteEvent::Resume);
    let mut effects = state.take_effects();

    effects.extend(replay::run(&mut state, scenario)?);

    state.apply(RemoteEvent::Pause);
    effects.extend(state.take_effects());
    Ok(effects)
}

fn list_actions() {
    for action in KeyAction::all() {
        let press = action.press().map(|c| c.to_string()).unwrap_or_default();
        let release = action.release().map(|c| c.to_string()).unwrap_or_default();
        println!(
            "{:<20} {:<10} {:<8} {}",
            action.config_name(),
            action.label(),
            press,
            release
        );
    }
}

fn print_usage() {
    println!("touchremote: Touchscreen keypad and mouse-pad remote control client");
    println!();
    println!("Usage:");
    println!("  touchremote --replay FILE            Replay a touch scenario to the agent");
    println!("  touchremote --replay FILE --dry-run  Print the commands a scenario produces");
    println!("  touchremote --probe                  Check that the agent answers");
    println!("  touchremote --init-config            Write the example configuration");
    println!("  touchremote --list-actions           List key names for layouts");
    println!("  touchremote --help                   Show help");
    println!();
    println!("Settings are read from ~/.config/touchremote/config.toml.");
    println!("Set RUST_LOG=debug to trace gestures and key latching.");
}
