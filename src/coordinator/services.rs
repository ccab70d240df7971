use std::process::Stdio;

use async_trait::async_trait;
use tokio::{io::AsyncWriteExt, process::Command};
use tracing::{debug, info};

use crate::{
    config::ClipboardConfig,
    error::{Error, Result},
};

#[async_trait]
pub trait Clipboard: Send {
    async fn write(&mut self, text: &str) -> Result<()>;
}

/// Blocking user notice.
pub trait Notifier: Send {
    fn notify(&mut self, message: &str);
}

/// Pipes text into an external clipboard tool such as `pbcopy` or `wl-copy`.
#[derive(Debug, Clone)]
pub struct CommandClipboard {
    program: String,
    args: Vec<String>,
}

impl CommandClipboard {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self { program: program.into(), args }
    }

    pub fn from_config(config: &ClipboardConfig) -> Self {
        Self::new(config.command.clone(), config.args.clone())
    }
}

#[async_trait]
impl Clipboard for CommandClipboard {
    async fn write(&mut self, text: &str) -> Result<()> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Error::Clipboard(format!("{}: {e}", self.program)))?;

        let mut stdin =
            child.stdin.take().ok_or_else(|| Error::Clipboard("stdin unavailable".to_string()))?;
        stdin.write_all(text.as_bytes()).await?;
        drop(stdin);

        let output = child.wait_with_output().await?;
        if !output.status.success() {
            return Err(Error::Clipboard(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        debug!(program = %self.program, bytes = text.len(), "Clipboard written");
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&mut self, message: &str) {
        info!(message, "Notice");
        eprintln!("{message}");
    }
}
