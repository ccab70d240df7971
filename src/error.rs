use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Generator
    #[error("QR encoding failed: {0}")]
    Encode(#[from] qrcode::types::QrError),

    #[error("Canvas {width}x{height} cannot fit {modules} modules")]
    CanvasTooSmall { width: u32, height: u32, modules: usize },

    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Invalid data URI")]
    InvalidDataUri,

    #[error("Base64 decoding failed: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Preview does not reflect the latest request, the last render failed")]
    StalePreview,

    // Scanner
    #[error("No QR code found in image")]
    NoCode,

    #[error("QR code could not be decoded: {0}")]
    Decode(String),

    #[error("Camera unavailable: {0}")]
    CameraUnavailable(String),

    #[error("Camera is already running")]
    CameraBusy,

    #[error("Camera is not running")]
    CameraNotRunning,

    #[error("Scan task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    // Services
    #[error("Clipboard write failed: {0}")]
    Clipboard(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
