//! Randomizer bot console binary
//!
//! Reads events from stdin, one per line, and prints the bot's replies.

use randomizer_bot::catalog::MenuCatalog;
use randomizer_bot::config::BotConfig;
use randomizer_bot::console::{parse_console_line, ConsoleTransport};
use randomizer_bot::runtime::{ConversationProfile, RuntimeManager};
use randomizer_bot::state_machine::{Command, Event};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they never interleave with bot output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "randomizer_bot=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = BotConfig::from_env()?;
    tracing::info!(
        dice_policy = ?config.dice_policy,
        seeded = config.rng_seed.is_some(),
        output = ?config.output,
        "Configuration loaded"
    );

    let catalog = Arc::new(MenuCatalog::standard());
    let transport = Arc::new(ConsoleTransport::stdout(catalog.clone(), config.output));
    let manager = RuntimeManager::new(catalog, transport, config);

    let conversation_id = format!("console-{}", uuid::Uuid::new_v4());
    let profile = ConversationProfile {
        user_name: std::env::var("USER").ok().filter(|name| !name.is_empty()),
    };
    manager.open(&conversation_id, &profile).await;
    manager
        .send_event(&conversation_id, Event::command(Command::Start))
        .await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match parse_console_line(&line) {
            Some(event) => manager.send_event(&conversation_id, event).await?,
            None => tracing::debug!(line = %line, "Skipping unrecognized console line"),
        }
    }

    // EOF: let queued events finish before exiting
    manager.shutdown().await;
    tracing::info!("Console closed");
    Ok(())
}
