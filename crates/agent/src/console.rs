//! Terminal operator surface.
//!
//! [`ConsoleDesk`] is the [`PresentationSink`] used by the binary: it prints
//! the job card, copies the action URL, fans the notification out to
//! Telegram and turns each line read from stdin into one confirmation.

use std::io::BufRead;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, Mutex};
use wurk_core::{Candidate, PresentationSink};
use wurk_events::TelegramDelivery;

use crate::clipboard::Clipboard;

const SEPARATOR_WIDTH: usize = 60;

pub const IDLE_MESSAGE: &str = "All jobs done. Waiting for new jobs...";

/// Read lines from `reader` on a dedicated thread, one `()` per line.
///
/// The channel closes when the reader hits EOF or an error.
pub fn spawn_line_confirmations<R>(reader: R) -> mpsc::Receiver<()>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel(16);
    let spawned = std::thread::Builder::new()
        .name("stdin-confirmations".into())
        .spawn(move || {
            for line in reader.lines() {
                if line.is_err() || tx.blocking_send(()).is_err() {
                    break;
                }
            }
        });
    if let Err(e) = spawned {
        tracing::error!(error = %e, "Failed to start stdin reader");
    }
    rx
}

pub fn separator() -> String {
    "-".repeat(SEPARATOR_WIDTH)
}

/// Multi-line card shown when a job becomes active.
pub fn job_card(candidate: &Candidate) -> String {
    let mut lines = vec![
        separator(),
        "ACTIVE JOB (LATEST)".to_string(),
        format!("ID        : {}", candidate.id),
        format!("Name      : {}", candidate.display_name),
    ];
    if let Some(poster) = &candidate.poster {
        lines.push(format!("Listed by : {poster}"));
    }
    lines.push(format!("Reward    : {} SOL", candidate.reward));
    lines.push(format!("URL       : {}", candidate.action_url));
    lines.push("Action: perform the repost, then press ENTER to verify once.".to_string());
    lines.join("\n")
}

pub fn print_banner(base_url: &str) {
    println!("{}", separator());
    println!("wurk-agent: manual repost desk for {base_url}");
    println!("The newest open job is shown and its URL copied to the clipboard.");
    println!(
        "Perform the repost by hand, then press ENTER: verify-retweet then verify-status (once)."
    );
    println!("When nothing is left you will see: {IDLE_MESSAGE}");
    println!("{}", separator());
}

pub struct ConsoleDesk {
    clipboard: Clipboard,
    telegram: Option<Arc<TelegramDelivery>>,
    confirmations: Mutex<mpsc::Receiver<()>>,
}

impl ConsoleDesk {
    pub fn new(
        clipboard: Clipboard,
        telegram: Option<Arc<TelegramDelivery>>,
        confirmations: mpsc::Receiver<()>,
    ) -> Self {
        Self {
            clipboard,
            telegram,
            confirmations: Mutex::new(confirmations),
        }
    }

    /// Discard confirmations entered before the current job was shown.
    async fn drain_stale(&self) -> usize {
        let mut rx = self.confirmations.lock().await;
        let mut drained = 0;
        while rx.try_recv().is_ok() {
            drained += 1;
        }
        drained
    }
}

#[async_trait]
impl PresentationSink for ConsoleDesk {
    async fn present(&self, candidate: &Candidate) {
        let drained = self.drain_stale().await;
        if drained > 0 {
            tracing::debug!(drained, "Discarded early confirmations");
        }
        println!("{}", job_card(candidate));
    }

    async fn copy_to_clipboard(&self, text: &str) -> bool {
        self.clipboard.copy(text).await
    }

    async fn notify(&self, message: &str) {
        let Some(telegram) = self.telegram.clone() else {
            return;
        };
        let message = message.to_string();
        tokio::spawn(async move {
            if let Err(e) = telegram.send(&message).await {
                tracing::debug!(error = %e, "Telegram notification failed");
            }
        });
    }

    async fn wait_for_confirmation(&self) {
        let mut rx = self.confirmations.lock().await;
        if rx.recv().await.is_none() {
            tracing::warn!("Stdin closed, no further confirmations possible");
            drop(rx);
            std::future::pending::<()>().await;
        }
    }

    async fn announce_idle(&self) {
        println!("{}", separator());
        println!("{IDLE_MESSAGE}");
    }
}
