//! # qr-wifi
//!
//! Generate WiFi QR codes that phones can scan to join a network.
//!
//! `qr-wifi` validates a network's credentials, turns them into the standard
//! `WIFI:` payload (with the reserved characters escaped), and renders that
//! payload as a PNG or SVG file. The QR matrix is produced by the
//! [`qrcodegen`](https://docs.rs/qrcodegen) crate; this library decides what
//! goes into it and how it is painted.
//!
//! ## Features
//!
//! - Credential validation for WPA, WPA2, WEP and open networks.
//! - Exact `WIFI:S:...;T:...;P:...;H:true;;` payload serialization.
//! - Four error correction levels: L, M, Q, H.
//! - PNG (8-bit grayscale) or SVG output with configurable box size and border.
//! - Typed errors for every validation rule.
//!
//! ## Example
//!
//! Write a QR code for a WPA2 network into a directory:
//!
//! ```rust
//! use qr_wifi::{render, Credential, RenderOptions};
//!
//! # fn main() -> qr_wifi::Result<()> {
//! let credential = Credential::new("MyNetwork", "WPA2", "password123", false)?;
//! assert_eq!(credential.to_payload(), "WIFI:S:MyNetwork;T:WPA2;P:password123;;");
//!
//! let dir = tempfile::TempDir::new().expect("temp dir");
//! let options = RenderOptions::new("M", 10, 4, "png", dir.path())?;
//! let path = render(&credential.to_payload(), &options, "MyNetwork")?;
//! assert_eq!(path, dir.path().join("MyNetwork.png"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`wifi`]: Credentials and payload encoding.
//! - [`render`]: Rendering options and image output.
//! - [`error`]: Error types.

#![forbid(unsafe_code)]

pub mod error;
pub mod render;
pub mod wifi;

pub use error::{CredentialError, Error, OptionsError, RenderError, Result};
pub use render::{render, ErrorCorrection, OutputFormat, RenderOptions};
pub use wifi::{Credential, Security};
