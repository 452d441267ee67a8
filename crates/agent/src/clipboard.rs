//! OS clipboard integration.
//!
//! Shells out to the first available clipboard tool. The text is written
//! to the tool's stdin, never interpolated into a command line.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Upper bound on a single clipboard command.
const COPY_TIMEOUT: Duration = Duration::from_secs(5);

const TERMUX_CLIPBOARD_SET: &str = "/data/data/com.termux/files/usr/bin/termux-clipboard-set";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipboardBackend {
    Termux,
    Pbcopy,
    WlCopy,
    Xclip,
    Xsel,
    PowerShell,
}

impl ClipboardBackend {
    /// Detect the backend for the running host.
    pub fn detect() -> Option<Self> {
        Self::detect_with(
            |key| std::env::var(key).ok(),
            |path| path.exists(),
            std::env::consts::OS,
        )
    }

    /// Detection over injectable environment, filesystem and OS name.
    ///
    /// Termux wins over everything else, then the platform tools, then the
    /// Linux desktop tools in Wayland → X11 order.
    pub fn detect_with(
        env: impl Fn(&str) -> Option<String>,
        exists: impl Fn(&Path) -> bool,
        os: &str,
    ) -> Option<Self> {
        let installed = |tool: &str| {
            ["/usr/bin", "/bin"]
                .iter()
                .any(|dir| exists(&Path::new(dir).join(tool)))
        };

        if env("TERMUX_VERSION").is_some() || exists(Path::new(TERMUX_CLIPBOARD_SET)) {
            Some(Self::Termux)
        } else if os == "macos" {
            Some(Self::Pbcopy)
        } else if installed("wl-copy") {
            Some(Self::WlCopy)
        } else if installed("xclip") {
            Some(Self::Xclip)
        } else if installed("xsel") {
            Some(Self::Xsel)
        } else if os == "windows" {
            Some(Self::PowerShell)
        } else {
            None
        }
    }

    /// Program and arguments; the text goes to stdin.
    pub fn command(self) -> (&'static str, &'static [&'static str]) {
        match self {
            Self::Termux => ("termux-clipboard-set", &[]),
            Self::Pbcopy => ("pbcopy", &[]),
            Self::WlCopy => ("wl-copy", &[]),
            Self::Xclip => ("xclip", &["-selection", "clipboard"]),
            Self::Xsel => ("xsel", &["--clipboard", "--input"]),
            Self::PowerShell => (
                "powershell",
                &["-NoProfile", "-Command", "$input | Set-Clipboard"],
            ),
        }
    }
}

/// Clipboard handle with the backend chosen once at startup.
#[derive(Debug, Clone, Copy)]
pub struct Clipboard {
    backend: Option<ClipboardBackend>,
}

impl Clipboard {
    pub fn detect() -> Self {
        Self::with_backend(ClipboardBackend::detect())
    }

    pub fn with_backend(backend: Option<ClipboardBackend>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> Option<ClipboardBackend> {
        self.backend
    }

    /// Copy `text`. Returns `false` when no backend exists or the command
    /// fails, is missing, or times out.
    pub async fn copy(&self, text: &str) -> bool {
        let Some(backend) = self.backend else {
            return false;
        };
        let (program, args) = backend.command();

        match tokio::time::timeout(COPY_TIMEOUT, run_with_stdin(program, args, text)).await {
            Ok(Ok(success)) => success,
            Ok(Err(e)) => {
                tracing::debug!(program, error = %e, "Clipboard command failed");
                false
            }
            Err(_) => {
                tracing::debug!(program, "Clipboard command timed out");
                false
            }
        }
    }
}

async fn run_with_stdin(program: &str, args: &[&str], text: &str) -> std::io::Result<bool> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(text.as_bytes()).await?;
    }

    Ok(child.wait().await?.success())
}
