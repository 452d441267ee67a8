//! `wurk-agent` -- manual repost desk for the Wurk job board.
//!
//! Polls the open-jobs listing, shows the newest eligible job, copies its
//! action URL and waits for ENTER before running the two verification
//! calls once.
//!
//! # Environment variables
//!
//! | Variable               | Required | Default             | Description                          |
//! |------------------------|----------|---------------------|--------------------------------------|
//! | `WURK_BASE_URL`        | no       | `https://wurk.fun`  | Job service base URL                 |
//! | `POLL_MS`              | no       | `1000`              | Milliseconds between listing polls   |
//! | `HEARTBEAT_SECS`       | no       | `30`                | Seconds between heartbeat lines      |
//! | `REQUEST_TIMEOUT_SECS` | no       | `20`                | Per-request HTTP timeout             |
//! | `COOKIE_FILE`          | no       | `cookies_wurk.json` | Exported browser cookies             |
//! | `WURK_COOKIE`          | no       | --                  | Raw `Cookie` header fallback         |
//! | `TG_ENABLED`           | no       | `false`             | Enable Telegram notifications        |
//! | `TG_BOT_TOKEN`         | with TG  | --                  | Bot token                            |
//! | `TG_CHAT_ID`           | with TG  | --                  | Destination chat                     |

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use wurk_agent::clipboard::Clipboard;
use wurk_agent::config::AgentConfig;
use wurk_agent::console::{self, ConsoleDesk};
use wurk_agent::poller;
use wurk_client::{Credentials, WurkApi};
use wurk_core::JobSelector;
use wurk_events::{TelegramConfig, TelegramDelivery};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "wurk_agent=info,wurk_core=info,wurk_client=info,wurk_events=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AgentConfig::from_env();

    let credentials = Credentials::load(&config.cookie_file, config.cookie_header.as_deref())
        .unwrap_or_else(|e| {
            tracing::error!(error = %e, "No usable session credentials");
            std::process::exit(1);
        });

    let api = WurkApi::new(config.base_url.clone(), &credentials, config.request_timeout)?;

    let telegram = match TelegramConfig::from_env() {
        Some(tg) => Some(Arc::new(TelegramDelivery::new(tg)?)),
        None => None,
    };

    let clipboard = Clipboard::detect();

    tracing::info!(
        base_url = %config.base_url,
        poll_ms = config.poll_interval.as_millis() as u64,
        xsrf = credentials.xsrf.is_some(),
        telegram = telegram.is_some(),
        clipboard = ?clipboard.backend(),
        "Starting wurk-agent",
    );

    let stdin = std::io::BufReader::new(std::io::stdin());
    let confirmations = console::spawn_line_confirmations(stdin);
    let desk = ConsoleDesk::new(clipboard, telegram, confirmations);
    let selector = Arc::new(JobSelector::new(Arc::new(api), Arc::new(desk)));

    console::print_banner(&config.base_url);

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutdown signal received");
                cancel.cancel();
            }
        });
    }

    poller::run(selector, config.poll_config(), cancel).await;

    Ok(())
}
