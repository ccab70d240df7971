//! # qrpad
//!
//! Generate styled QR codes and scan QR codes from images or a live frame stream.
//!
//! Symbol encoding is delegated to [`qrcode`], symbol decoding to [`rqrr`]. What this crate adds
//! is the styling layer on top of the encoded module matrix and the [`Coordinator`], a single
//! owner of page state that keeps file scanning and camera scanning mutually exclusive.
//!
//! ## Features
//!
//! - **Styled generation**: `square`, `rounded`, `dots` and `classy` presets, SVG or PNG output,
//!   optional centred logo
//! - **Live preview**: text edits are debounced so only the last edit in a quiet window renders
//! - **File scanning**: decode a code from any image format the `image` crate reads
//! - **Camera scanning**: continuous frame decoding that stops at the first successful read
//!
//! ## Quick Start
//!
//! ### Rendering a styled code
//!
//! ```rust
//! use qrpad::{config::GeneratorConfig, generator::{render, OutputFormat, RenderOptions}, StyleSelection};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut options = RenderOptions::from_config(&GeneratorConfig::default(), StyleSelection::Dots);
//! options.data = "Hello, World!".to_string();
//! options.format = OutputFormat::Svg;
//!
//! let artifact = render(&options)?;
//! assert!(artifact.as_bytes().starts_with(b"<svg"));
//! # Ok(())
//! # }
//! ```
//!
//! ### Scanning an image
//!
//! ```rust,no_run
//! use qrpad::scanner::QrDecoder;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let img = image::open("qr_code.png")?;
//! let text = QrDecoder::decode_image(&img)?;
//! println!("Decoded: {text}");
//! # Ok(())
//! # }
//! ```
//!
//! ### Driving the coordinator
//!
//! ```rust,no_run
//! use qrpad::{
//!     config::Config,
//!     coordinator::{CommandClipboard, ConsoleNotifier, Coordinator, Providers, UiEvent},
//!     generator::{FileTarget, RenderOptions, StyledRenderer},
//!     scanner::{ImageSequence, QrDecoder, StreamScanner},
//!     StyleSelection,
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let options = RenderOptions::from_config(&config.generator, StyleSelection::default());
//! let providers = Providers {
//!     renderer: Box::new(StyledRenderer::new(options)?),
//!     file_decoder: Box::new(QrDecoder),
//!     camera: Box::new(StreamScanner::new(ImageSequence::new("frames"))),
//!     clipboard: Box::new(CommandClipboard::from_config(&config.clipboard)),
//!     notifier: Box::new(ConsoleNotifier),
//! };
//!
//! let mut coordinator = Coordinator::new(&config, providers);
//! coordinator.mount(Box::new(FileTarget::new("preview.svg")))?;
//!
//! let (tx, rx) = tokio::sync::mpsc::channel(16);
//! tx.send(UiEvent::SelectStyle("rounded".to_string())).await?;
//! tx.send(UiEvent::EditText("https://example.com".to_string())).await?;
//! drop(tx);
//! coordinator.run(rx).await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod coordinator;
pub mod error;
pub mod generator;
pub mod logger;
pub mod scanner;
pub mod style;

pub use config::Config;
pub use coordinator::{Coordinator, PageView, Providers, ScanSession, UiEvent};
pub use error::{Error, Result};
pub use style::{CornerShape, DotShape, StyleSelection};
