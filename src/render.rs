//! Rendering options and QR image output.
//!
//! The QR matrix itself comes from the `qrcodegen` crate. This module only
//! decides how that matrix is painted (pixels per module, quiet zone width,
//! PNG or SVG) and where the result is written.

use std::fmt;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use image::{ImageBuffer, Luma};
use qrcodegen::{QrCode, QrCodeEcc, QrSegment, Version};
use tracing::{debug, info};

use crate::error::{OptionsError, RenderError};

/// Grayscale image holding a painted QR code.
pub type QrImage = ImageBuffer<Luma<u8>, Vec<u8>>;

/// QR error correction level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorCorrection {
    /// Tolerates ~7% erroneous codewords.
    #[default]
    L,
    /// Tolerates ~15% erroneous codewords.
    M,
    /// Tolerates ~25% erroneous codewords.
    Q,
    /// Tolerates ~30% erroneous codewords.
    H,
}

impl FromStr for ErrorCorrection {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "L" => Ok(ErrorCorrection::L),
            "M" => Ok(ErrorCorrection::M),
            "Q" => Ok(ErrorCorrection::Q),
            "H" => Ok(ErrorCorrection::H),
            _ => Err(OptionsError::InvalidErrorCorrection {
                value: s.to_string(),
            }),
        }
    }
}

/// Output file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Png,
    Svg,
}

impl OutputFormat {
    /// File extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = OptionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "png" => Ok(OutputFormat::Png),
            "svg" => Ok(OutputFormat::Svg),
            _ => Err(OptionsError::InvalidFormat {
                value: s.to_string(),
            }),
        }
    }
}

/// Validated rendering configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    error_correction: ErrorCorrection,
    box_size: u32,
    border: u32,
    format: OutputFormat,
    output_dir: PathBuf,
}

impl RenderOptions {
    pub const DEFAULT_BOX_SIZE: u32 = 10;
    pub const DEFAULT_BORDER: u32 = 4;

    /// Validates raw option values.
    ///
    /// The first invalid value is reported; nothing is replaced by a
    /// default. The output directory is checked against the filesystem now,
    /// not when rendering.
    ///
    /// # Example
    ///
    /// ```rust
    /// use qr_wifi::render::{OutputFormat, RenderOptions};
    ///
    /// let dir = std::env::temp_dir();
    /// let options = RenderOptions::new("M", 8, 2, "svg", &dir).unwrap();
    /// assert_eq!(options.format(), OutputFormat::Svg);
    ///
    /// assert!(RenderOptions::new("M", 0, 2, "svg", &dir).is_err());
    /// ```
    pub fn new(
        error_correction: &str,
        box_size: i64,
        border: i64,
        format: &str,
        output_dir: impl Into<PathBuf>,
    ) -> Result<Self, OptionsError> {
        let error_correction: ErrorCorrection = error_correction.parse()?;
        let box_size = u32::try_from(box_size)
            .ok()
            .filter(|&size| size >= 1)
            .ok_or(OptionsError::InvalidBoxSize { value: box_size })?;
        let border =
            u32::try_from(border).map_err(|_| OptionsError::InvalidBorder { value: border })?;
        let format: OutputFormat = format.parse()?;

        let output_dir = output_dir.into();
        if !output_dir.exists() {
            return Err(OptionsError::OutputDirMissing { path: output_dir });
        }
        if !output_dir.is_dir() {
            return Err(OptionsError::OutputDirNotADirectory { path: output_dir });
        }

        Ok(Self {
            error_correction,
            box_size,
            border,
            format,
            output_dir,
        })
    }

    pub fn error_correction(&self) -> ErrorCorrection {
        self.error_correction
    }

    /// Pixels per QR module.
    pub fn box_size(&self) -> u32 {
        self.box_size
    }

    /// Quiet zone width, in modules.
    pub fn border(&self) -> u32 {
        self.border
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Path the rendered file for `output_name` is written to.
    pub fn output_path(&self, output_name: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}.{}", output_name, self.format.extension()))
    }
}

fn to_ecc(level: ErrorCorrection) -> QrCodeEcc {
    match level {
        ErrorCorrection::L => QrCodeEcc::Low,
        ErrorCorrection::M => QrCodeEcc::Medium,
        ErrorCorrection::Q => QrCodeEcc::Quartile,
        ErrorCorrection::H => QrCodeEcc::High,
    }
}

/// Encodes `payload` at exactly the requested level, in the smallest version that fits.
fn encode(payload: &str, level: ErrorCorrection) -> Result<QrCode, RenderError> {
    let segments = QrSegment::make_segments(payload);
    let qr = QrCode::encode_segments_advanced(
        &segments,
        to_ecc(level),
        Version::MIN,
        Version::MAX,
        None,
        false,
    )
    .map_err(|e| RenderError::Encode {
        reason: e.to_string(),
    })?;
    debug!(
        payload_len = payload.len(),
        version = qr.version().value(),
        size = qr.size(),
        "encoded QR matrix"
    );
    Ok(qr)
}

/// Largest PNG accepted, in pixels (16384 x 16384, 256 MiB of grayscale).
pub const MAX_IMAGE_PIXELS: u64 = 1 << 28;

/// Side length in modules including the quiet zone on both sides.
fn dimension_in_modules(qr: &QrCode, border: u32) -> u64 {
    u64::from(qr.size().unsigned_abs()) + 2 * u64::from(border)
}

/// Side length in modules and in pixels, rejecting sides that do not fit in a `u32`.
fn pixel_dimension(qr: &QrCode, box_size: u32, border: u32) -> Result<(u32, u32), RenderError> {
    let modules = dimension_in_modules(qr, border);
    let too_large = || RenderError::TooLarge { modules, box_size };
    let pixels = modules
        .checked_mul(u64::from(box_size))
        .and_then(|pixels| u32::try_from(pixels).ok())
        .ok_or_else(too_large)?;
    let modules = u32::try_from(modules).map_err(|_| too_large())?;
    Ok((modules, pixels))
}

// Returns an SVG document depicting the given QR Code, with `border` light
// modules around it. Coordinates are in modules; width and height are in
// pixels so the SVG opens at the same size as the PNG would.
// The string always uses Unix newlines (\n), regardless of the platform.
fn to_svg_string(qr: &QrCode, box_size: u32, border: u32) -> Result<String, RenderError> {
    let (modules, pixels) = pixel_dimension(qr, box_size, border)?;
    let offset = i64::from(border);

    let mut result = String::new();
    result += "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
    result += "<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">\n";
    result += &format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" width=\"{1}\" height=\"{1}\" viewBox=\"0 0 {0} {0}\" stroke=\"none\">\n",
        modules, pixels
    );
    result += "\t<rect width=\"100%\" height=\"100%\" fill=\"#FFFFFF\"/>\n";
    result += "\t<path d=\"";
    let mut first = true;
    for y in 0..qr.size() {
        for x in 0..qr.size() {
            if qr.get_module(x, y) {
                if !first {
                    result += " ";
                }
                first = false;
                result += &format!(
                    "M{},{}h1v1h-1z",
                    i64::from(x) + offset,
                    i64::from(y) + offset
                );
            }
        }
    }
    result += "\" fill=\"#000000\"/>\n";
    result += "</svg>\n";
    Ok(result)
}

fn to_image(qr: &QrCode, box_size: u32, border: u32) -> Result<QrImage, RenderError> {
    let (modules, pixels) = pixel_dimension(qr, box_size, border)?;
    let too_large = || RenderError::TooLarge {
        modules: u64::from(modules),
        box_size,
    };

    let area = u64::from(pixels) * u64::from(pixels);
    if area > MAX_IMAGE_PIXELS {
        return Err(too_large());
    }
    let mut data: Vec<u8> = Vec::new();
    data.try_reserve_exact(usize::try_from(area).map_err(|_| too_large())?)
        .map_err(|_| too_large())?;

    let border = i64::from(border);
    for y in 0..pixels {
        let qr_y = i64::from(y / box_size) - border;
        for x in 0..pixels {
            let qr_x = i64::from(x / box_size) - border;
            // Modules outside the symbol (the quiet zone) read as light.
            let dark = match (i32::try_from(qr_x), i32::try_from(qr_y)) {
                (Ok(qx), Ok(qy)) => qr.get_module(qx, qy),
                _ => false,
            };
            data.push(if dark { 0u8 } else { 255u8 }); // Black / White
        }
    }

    ImageBuffer::from_raw(pixels, pixels, data).ok_or_else(too_large)
}

/// Renders `payload` as an in-memory PNG-ready image buffer.
///
/// # Example
///
/// ```rust
/// use qr_wifi::render::{render_to_image, RenderOptions};
///
/// let options = RenderOptions::new("L", 1, 4, "png", std::env::temp_dir()).unwrap();
/// let img = render_to_image("Hello, world!", &options).unwrap();
///
/// // Version 1 is 21 modules wide, plus a 4-module border on each side.
/// assert_eq!(img.dimensions(), (29, 29));
/// ```
pub fn render_to_image(payload: &str, options: &RenderOptions) -> Result<QrImage, RenderError> {
    let qr = encode(payload, options.error_correction)?;
    to_image(&qr, options.box_size, options.border)
}

/// Renders `payload` as an SVG document string.
pub fn render_to_string(payload: &str, options: &RenderOptions) -> Result<String, RenderError> {
    let qr = encode(payload, options.error_correction)?;
    to_svg_string(&qr, options.box_size, options.border)
}

/// Renders `payload` and writes it to `<output_dir>/<output_name>.<format>`.
///
/// An existing file at that path is overwritten. The image is fully encoded
/// before the file is opened, so an encoding failure never truncates an
/// existing file.
///
/// # Errors
///
/// Returns a [`RenderError`] if the payload does not fit in a QR code, a PNG
/// would exceed [`MAX_IMAGE_PIXELS`], the image cannot be encoded, or the file
/// cannot be written.
pub fn render(
    payload: &str,
    options: &RenderOptions,
    output_name: &str,
) -> Result<PathBuf, RenderError> {
    let output_path = options.output_path(output_name);
    debug!(
        error_correction = ?options.error_correction,
        box_size = options.box_size,
        border = options.border,
        format = %options.format,
        "rendering QR code"
    );

    let bytes = match options.format {
        OutputFormat::Svg => render_to_string(payload, options)?.into_bytes(),
        OutputFormat::Png => {
            let img = render_to_image(payload, options)?;
            let mut bytes = Vec::new();
            img.write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)?;
            bytes
        }
    };

    fs::write(&output_path, &bytes).map_err(|source| RenderError::Io {
        path: output_path.clone(),
        source,
    })?;
    info!(path = %output_path.display(), bytes = bytes.len(), "wrote QR code");
    Ok(output_path)
}

// Tests
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn options(dir: &Path, format: &str) -> RenderOptions {
        RenderOptions::new("L", 10, 4, format, dir).unwrap()
    }

    #[test]
    fn test_options_defaults_accepted() {
        let dir = TempDir::new().unwrap();
        let opts = options(dir.path(), "png");
        assert_eq!(opts.error_correction(), ErrorCorrection::L);
        assert_eq!(opts.box_size(), RenderOptions::DEFAULT_BOX_SIZE);
        assert_eq!(opts.border(), RenderOptions::DEFAULT_BORDER);
        assert_eq!(opts.format(), OutputFormat::Png);
        assert_eq!(opts.output_dir(), dir.path());
    }

    #[test]
    fn test_options_reject_invalid_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path();

        assert_eq!(
            RenderOptions::new("X", 10, 4, "png", path).unwrap_err(),
            OptionsError::InvalidErrorCorrection { value: "X".into() }
        );
        assert_eq!(
            RenderOptions::new("L", 0, 4, "png", path).unwrap_err(),
            OptionsError::InvalidBoxSize { value: 0 }
        );
        assert_eq!(
            RenderOptions::new("L", -3, 4, "png", path).unwrap_err(),
            OptionsError::InvalidBoxSize { value: -3 }
        );
        assert_eq!(
            RenderOptions::new("L", 10, -1, "png", path).unwrap_err(),
            OptionsError::InvalidBorder { value: -1 }
        );
        assert_eq!(
            RenderOptions::new("L", 10, 4, "jpg", path).unwrap_err(),
            OptionsError::InvalidFormat { value: "jpg".into() }
        );
        assert!(RenderOptions::new("L", 10, 0, "svg", path).is_ok());
    }

    #[test]
    fn test_options_output_dir_checks() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert_eq!(
            RenderOptions::new("L", 10, 4, "png", &missing).unwrap_err(),
            OptionsError::OutputDirMissing { path: missing }
        );

        let file = dir.path().join("file.txt");
        fs::write(&file, "x").unwrap();
        assert_eq!(
            RenderOptions::new("L", 10, 4, "png", &file).unwrap_err(),
            OptionsError::OutputDirNotADirectory { path: file }
        );
    }

    #[test]
    fn test_image_dimensions_follow_box_size_and_border() {
        let dir = TempDir::new().unwrap();
        let opts = RenderOptions::new("L", 3, 2, "png", dir.path()).unwrap();
        let img = render_to_image("Hello, world!", &opts).unwrap();
        // Version 1: 21 modules + 2 * 2 border = 25 modules, 3 px each.
        assert_eq!(img.dimensions(), (75, 75));
        // The corner is quiet zone, the finder pattern starts right after it.
        assert_eq!(img.get_pixel(0, 0), &Luma([255u8]));
        assert_eq!(img.get_pixel(6, 6), &Luma([0u8]));
    }

    #[test]
    fn test_zero_border_starts_with_finder_pattern() {
        let dir = TempDir::new().unwrap();
        let opts = RenderOptions::new("H", 1, 0, "png", dir.path()).unwrap();
        let img = render_to_image("WIFI:S:Net;T:nopass;;", &opts).unwrap();
        assert_eq!(img.get_pixel(0, 0), &Luma([0u8]));
    }

    #[test]
    fn test_svg_document() {
        let dir = TempDir::new().unwrap();
        let opts = RenderOptions::new("L", 10, 4, "svg", dir.path()).unwrap();
        let svg = render_to_string("HELLO WORLD", &opts).unwrap();

        assert!(svg.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(svg.contains("viewBox=\"0 0 29 29\""));
        assert!(svg.contains("width=\"290\""));
        // Top-left finder pattern module sits just inside the border.
        assert!(svg.contains("M4,4h1v1h-1z"));
        assert!(svg.ends_with("</svg>\n"));
    }

    #[test]
    fn test_render_writes_png_and_overwrites() {
        let dir = TempDir::new().unwrap();
        let opts = options(dir.path(), "png");

        let path = render("WIFI:S:Net;T:WPA2;P:password123;;", &opts, "Net").unwrap();
        assert_eq!(path, dir.path().join("Net.png"));
        let first = fs::read(&path).unwrap();
        assert!(first.starts_with(b"\x89PNG"));

        let again = render("WIFI:S:Other;T:nopass;;", &opts, "Net").unwrap();
        assert_eq!(again, path);
        let second = fs::read(&path).unwrap();
        assert!(!second.is_empty());
        assert_ne!(first, second);
    }

    #[test]
    fn test_render_writes_svg() {
        let dir = TempDir::new().unwrap();
        let opts = options(dir.path(), "svg");
        let path = render("WIFI:S:Net;T:nopass;;", &opts, "guest").unwrap();
        assert_eq!(path, dir.path().join("guest.svg"));
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("<svg"));
    }

    #[test]
    fn test_payload_too_long() {
        let dir = TempDir::new().unwrap();
        let opts = RenderOptions::new("H", 1, 4, "png", dir.path()).unwrap();
        let payload = "x".repeat(5000);
        let err = render(&payload, &opts, "big").unwrap_err();
        assert!(matches!(err, RenderError::Encode { .. }));
        assert!(!dir.path().join("big.png").exists());
    }

    #[test]
    fn test_oversized_image_rejected() {
        let dir = TempDir::new().unwrap();
        let opts = RenderOptions::new("L", i64::from(u32::MAX), 4, "png", dir.path()).unwrap();
        let err = render_to_image("hi", &opts).unwrap_err();
        assert!(matches!(err, RenderError::TooLarge { .. }));
    }

    #[test]
    fn test_png_over_pixel_limit_rejected_before_allocating() {
        let dir = TempDir::new().unwrap();
        let opts = RenderOptions::new("L", 200_000, 4, "png", dir.path()).unwrap();
        let err = render("WIFI:S:Net;T:nopass;;", &opts, "huge").unwrap_err();
        assert!(matches!(
            err,
            RenderError::TooLarge {
                modules: 29,
                box_size: 200_000
            }
        ));
        assert!(!dir.path().join("huge.png").exists());
    }

    #[test]
    fn test_huge_border_reports_real_module_count() {
        let dir = TempDir::new().unwrap();
        let opts = RenderOptions::new("L", 1, i64::from(u32::MAX), "svg", dir.path()).unwrap();
        let err = render_to_string("hi", &opts).unwrap_err();
        let expected = 21 + 2 * u64::from(u32::MAX);
        assert!(matches!(
            err,
            RenderError::TooLarge { modules, box_size: 1 } if modules == expected
        ));
    }

    #[test]
    fn test_svg_has_no_pixel_limit() {
        let dir = TempDir::new().unwrap();
        let opts = RenderOptions::new("L", 200_000, 4, "svg", dir.path()).unwrap();
        let svg = render_to_string("hi", &opts).unwrap();
        assert!(svg.contains("width=\"5800000\""));
    }

    #[test]
    fn test_write_failure_is_render_error() {
        let dir = TempDir::new().unwrap();
        let opts = options(dir.path(), "png");
        // A directory already occupies the target path.
        fs::create_dir(dir.path().join("taken.png")).unwrap();
        let err = render("WIFI:S:Net;T:nopass;;", &opts, "taken").unwrap_err();
        assert!(matches!(err, RenderError::Io { .. }));
    }
}
