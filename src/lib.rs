// src/lib.rs
pub mod application;
pub mod cli;
pub mod constants;
pub mod domain;
pub mod infrastructure;
pub mod ports;
pub mod util;

use anyhow::{bail, Context, Result};
use application::{
    readiness, AnkiTransport, Background, FlashcardClient, PageBridge, Practice, ReadySignal, Relay,
};
use infrastructure::{config, Config, HttpTransport, MessageBus};
use ports::StatusPresenter;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cli::args::{Args, Command};
use crate::domain::{BridgeError, Card, Outcome};

pub async fn run(args: Args) -> Result<()> {
    debug!(?args, "Starting ankibridge with arguments");
    let presenter = StatusPresenter::new();
    let config_path = args.config.as_deref();

    match args.command {
        Command::InitConfig { force } => init_config(config_path, force),
        Command::Status => {
            // Direct call, like the extension popup: no bridge involved
            let config = Config::resolve(config_path)?;
            let transport = HttpTransport::new(&config.anki.url, config.request_timeout())?;
            let result = FlashcardClient::new(transport).version().await;
            println!("{}", presenter.connection(&result));
            Ok(())
        }
        Command::Check => {
            let (bridge, relay) = open_bridge(config_path, args.origin).await?;
            info!(origin = %bridge.origin(), "Checking Anki connection");
            let result = bridge.check_connection().await;
            println!("{}", presenter.connection(&result));
            relay.abort();
            Ok(())
        }
        Command::Save { front, back, level } => {
            let (bridge, relay) = open_bridge(config_path, args.origin).await?;
            let card = Card { front, back, level };
            info!(?card, "Saving card");
            let result = bridge.save_card(card).await;
            debug!(?result, "Save result");
            println!("{}", presenter.save(&result));
            relay.abort();
            Ok(())
        }
        Command::Practice { rounds, save } => {
            let (bridge, relay) = open_bridge(config_path, args.origin).await?;
            let mut practice = Practice::new(StdRng::from_entropy());
            if save {
                let status = bridge.check_connection().await;
                println!("{}", presenter.connection(&status));
                if is_connected(&status) {
                    practice = practice.saving_to(&bridge);
                } else {
                    info!("Anki not connected, practicing without saving");
                }
            }
            let stdin = std::io::stdin();
            let mut stdout = std::io::stdout();
            let board = practice.run(stdin.lock(), &mut stdout, rounds).await?;
            println!("Final {}", presenter.scoreboard(&board));
            relay.abort();
            Ok(())
        }
    }
}

/// Start the bridge stack against the configured AnkiConnect endpoint and
/// wait until the page side is announced
async fn open_bridge(
    config_path: Option<&Path>,
    origin: Option<String>,
) -> Result<(PageBridge, JoinHandle<()>)> {
    let config = Config::resolve(config_path)?;
    let transport = HttpTransport::new(&config.anki.url, config.request_timeout())?;
    let origin = origin.unwrap_or_else(|| config.bridge.origin.clone());

    let (signal, mut ready) = readiness();
    let relay = start_bridge(&config, transport, &origin, &signal);
    let bridge = ready.wait().await?;
    Ok((bridge, relay))
}

/// Wire bus, background worker, relay and page bridge for one page origin.
///
/// The bridge is announced through `signal`; the returned handle is the relay task.
pub fn start_bridge<T>(
    config: &Config,
    transport: T,
    origin: &str,
    signal: &ReadySignal,
) -> JoinHandle<()>
where
    T: AnkiTransport + 'static,
{
    let bus = MessageBus::new();
    let client = FlashcardClient::with_template(transport, config.note_template());
    let background = Background::spawn(client);
    let relay = Relay::new(config.origin_guard(), background).spawn(bus.clone());
    PageBridge::install(bus, origin, config.bridge_timeout(), signal);
    relay
}

/// Saving during practice only starts after a granted connection check
fn is_connected(status: &std::result::Result<Outcome, BridgeError>) -> bool {
    matches!(status, Ok(outcome) if outcome.success)
}

fn init_config(path: Option<&Path>, force: bool) -> Result<()> {
    let path: PathBuf = match path {
        Some(path) => path.to_path_buf(),
        None => config::default_config_path().context("Could not find config directory")?,
    };
    if path.exists() && !force {
        bail!("Config file already exists: {} (use --force to overwrite)", path.display());
    }
    Config::create_default(&path)?;
    println!("Wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
/// must be public to be used from integration tests
mod tests {
    use super::*;
    use crate::util::testing;
    use serde_json::json;
    use std::time::Duration;

    #[ctor::ctor]
    fn init() {
        testing::init_test_setup().expect("Failed to initialize test setup");
    }

    #[test]
    fn given_connection_status_when_deciding_to_save_then_only_granted_counts() {
        assert!(is_connected(&Ok(Outcome::succeeded(json!({})))));
        assert!(!is_connected(&Ok(Outcome::failed(json!({}), None))));
        assert!(!is_connected(&Ok(Outcome::from_error(&BridgeError::Transport(
            "connection refused".into()
        )))));
        assert!(!is_connected(&Err(BridgeError::Timeout(Duration::from_secs(5)))));
    }
}
