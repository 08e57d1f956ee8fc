//! Error types for qr-wifi.
//!
//! Validation failures are split by what was being validated: the network
//! credential ([`CredentialError`]) or the rendering options
//! ([`OptionsError`]). Anything that goes wrong while encoding or writing the
//! image is a [`RenderError`]. [`Error`] wraps all three so callers can match
//! on the family without looking at message text.

use std::path::PathBuf;

use thiserror::Error;

use crate::wifi::Security;

/// Result type alias for qr-wifi operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for all qr-wifi operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The WiFi credential failed validation.
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// The rendering options failed validation.
    #[error(transparent)]
    Options(#[from] OptionsError),

    /// Encoding or writing the QR image failed.
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl Error {
    /// Short, user-facing heading for this error family.
    pub fn category(&self) -> &'static str {
        match self {
            Error::Credential(_) => "Invalid WiFi configuration",
            Error::Options(_) | Error::Render(_) => "Failed to generate QR code",
        }
    }
}

/// WiFi credential validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    #[error("SSID cannot be empty")]
    EmptySsid,

    #[error("SSID too long: {len} characters (max {max})", max = crate::wifi::MAX_SSID_LEN)]
    SsidTooLong { len: usize },

    #[error(
        "Security type '{value}' not supported. Valid options: {options}",
        options = Security::SUPPORTED.join(", ")
    )]
    UnsupportedSecurity { value: String },

    #[error("Password required for {security} security")]
    MissingPassword { security: Security },

    #[error("WPA/WPA2 password must be at least {min} characters (got {len})", min = crate::wifi::MIN_WPA_PASSWORD_LEN)]
    PasswordTooShort { len: usize },

    #[error("WPA/WPA2 password must be at most {max} characters (got {len})", max = crate::wifi::MAX_WPA_PASSWORD_LEN)]
    PasswordTooLong { len: usize },

    #[error("WEP password must be hexadecimal")]
    NonHexWepKey,

    #[error("WEP password must be 10, 26, or 58 hex characters (got {len})")]
    InvalidWepKeyLength { len: usize },
}

/// Rendering option validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OptionsError {
    #[error("Invalid error correction: {value}. Valid options: L, M, Q, H")]
    InvalidErrorCorrection { value: String },

    #[error("Box size must be >= 1 (got {value})")]
    InvalidBoxSize { value: i64 },

    #[error("Border must be >= 0 (got {value})")]
    InvalidBorder { value: i64 },

    #[error("Invalid format: {value}. Valid options: png, svg")]
    InvalidFormat { value: String },

    #[error("Output directory does not exist: {}", path.display())]
    OutputDirMissing { path: PathBuf },

    #[error("Output path is not a directory: {}", path.display())]
    OutputDirNotADirectory { path: PathBuf },
}

/// Failures while turning a payload into an image file.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The encoder could not fit the payload into any QR version.
    #[error("Failed to generate QR code: {reason}")]
    Encode { reason: String },

    /// Box size and border produce an image too large to render.
    #[error("Failed to generate QR code: image of {modules} modules at box size {box_size} is too large")]
    TooLarge { modules: u64, box_size: u32 },

    #[error("Failed to generate QR code: {source}")]
    Image {
        #[from]
        source: image::ImageError,
    },

    #[error("Failed to generate QR code: could not write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
