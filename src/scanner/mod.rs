mod camera;
mod decode;

pub use camera::{FrameSource, ImageSequence, StreamScanner};
pub use decode::QrDecoder;

use std::{fmt, path::Path, time::Duration};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::trace;

use crate::{
    config::ScannerConfig,
    error::{Error, Result},
};

/// Raw image handed to a file scan.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageBlob {
    pub name: Option<String>,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for ImageBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageBlob").field("name", &self.name).field("len", &self.bytes.len()).finish()
    }
}

impl ImageBlob {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { name: None, bytes }
    }

    pub async fn read(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned());
        Ok(Self { name, bytes })
    }
}

#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    #[default]
    Environment,
    User,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CameraConstraints {
    pub facing_mode: FacingMode,
}

/// Centred region of each frame that is searched for a code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QrBox {
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanConfig {
    pub fps: u32,
    pub qrbox: Option<QrBox>,
}

impl ScanConfig {
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.fps.max(1)
    }
}

impl From<&ScannerConfig> for CameraConstraints {
    fn from(config: &ScannerConfig) -> Self {
        Self { facing_mode: config.facing_mode }
    }
}

impl From<&ScannerConfig> for ScanConfig {
    fn from(config: &ScannerConfig) -> Self {
        Self {
            fps: config.fps,
            qrbox: Some(QrBox { width: config.qrbox_width, height: config.qrbox_height }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraHit {
    pub session: u64,
    pub text: String,
}

/// Success and frame-error callbacks of one camera session.
#[derive(Debug, Clone)]
pub struct DecodeSink {
    session: u64,
    tx: mpsc::UnboundedSender<CameraHit>,
}

impl DecodeSink {
    pub fn new(session: u64, tx: mpsc::UnboundedSender<CameraHit>) -> Self {
        Self { session, tx }
    }

    pub fn session(&self) -> u64 {
        self.session
    }

    /// Returns false once nobody is listening anymore.
    pub fn success(&self, text: String) -> bool {
        self.tx.send(CameraHit { session: self.session, text }).is_ok()
    }

    // Most frames carry no readable code
    pub fn frame_error(&self, err: &Error) {
        trace!(session = self.session, %err, "Frame not decoded");
    }
}

#[async_trait]
pub trait FileDecoder: Send + Sync {
    async fn decode_file(&self, blob: &ImageBlob) -> Result<String>;
}

/// Continuous scanner. Every decoded frame is reported through the sink until `stop`.
#[async_trait]
pub trait CameraScanner: Send {
    async fn start(
        &mut self,
        constraints: &CameraConstraints,
        config: &ScanConfig,
        sink: DecodeSink,
    ) -> Result<()>;

    async fn stop(&mut self) -> Result<()>;

    fn is_scanning(&self) -> bool;
}
