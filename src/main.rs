use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use clap_verbosity_flag::{Verbosity, WarnLevel};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use qr_wifi::{render, Credential, Error, RenderOptions};

const UNEXPECTED_ERROR: &str = "Unexpected error occurred";

#[derive(Parser, Debug)]
#[command(name = "qr-wifi")]
#[command(about = "Generate QR codes for WiFi credentials", version)]
#[command(after_help = "\
Examples:
  qr-wifi --ssid MyNetwork --security WPA2 --password mypassword
  qr-wifi --ssid FreeWiFi --security nopass
  qr-wifi --ssid HiddenNet --security WPA2 --password secret123 --hidden
  qr-wifi --ssid MyNet --security WPA --password pass1234 --format svg --box-size 15 --output-dir ./qrcodes")]
struct Cli {
    #[command(flatten)]
    verbosity: Verbosity<WarnLevel>,

    /// WiFi network SSID (1-32 characters)
    #[arg(long)]
    ssid: String,

    /// Security type: WPA, WPA2, WEP, or nopass for open networks (case-insensitive)
    #[arg(long)]
    security: String,

    /// WiFi password (required for WPA/WPA2/WEP, ignored for nopass)
    #[arg(long, default_value = "")]
    password: String,

    /// Network is hidden
    #[arg(long)]
    hidden: bool,

    /// Error correction level: L (7%), M (15%), Q (25%), H (30%)
    #[arg(long, default_value = "L")]
    error_correction: String,

    /// Size of each QR code box in pixels
    #[arg(long, default_value_t = i64::from(RenderOptions::DEFAULT_BOX_SIZE), allow_negative_numbers = true)]
    box_size: i64,

    /// Border size in boxes
    #[arg(long, default_value_t = i64::from(RenderOptions::DEFAULT_BORDER), allow_negative_numbers = true)]
    border: i64,

    /// Output format: png or svg
    #[arg(long, env = "QR_WIFI_FORMAT", default_value = "png")]
    format: String,

    /// Output directory
    #[arg(long, env = "QR_WIFI_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Output filename without extension (default: SSID)
    #[arg(long)]
    output_name: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.verbosity);
    install_panic_hook();

    match run(&cli) {
        Ok((credential, path)) => {
            println!("QR code generated successfully!");
            println!("  Network: {}", credential.ssid());
            println!("  Security: {}", credential.security());
            if credential.is_hidden() {
                println!("  Hidden: Yes");
            }
            println!("  File: {}", path.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            report(err.category(), &err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(Credential, PathBuf), Error> {
    let credential = Credential::new(
        cli.ssid.as_str(),
        &cli.security,
        cli.password.as_str(),
        cli.hidden,
    )?;
    let payload = credential.to_payload();
    debug!(?credential, payload_len = payload.len(), "validated credential");

    let options = RenderOptions::new(
        &cli.error_correction,
        cli.box_size,
        cli.border,
        &cli.format,
        cli.output_dir.clone(),
    )?;

    let output_name = cli
        .output_name
        .as_deref()
        .filter(|name| !name.is_empty())
        .unwrap_or(credential.ssid());
    let path = render(&payload, &options, output_name)?;

    Ok((credential, path))
}

fn report(category: &str, detail: &dyn fmt::Display) {
    // Nothing useful can be done if stderr itself is gone.
    let _ = write_report(&mut io::stderr().lock(), category, detail);
}

fn write_report(out: &mut impl Write, category: &str, detail: &dyn fmt::Display) -> io::Result<()> {
    writeln!(out, "Error: {category}")?;
    writeln!(out, "  {detail}")
}

fn init_tracing(verbosity: &Verbosity<WarnLevel>) {
    let level = verbosity.tracing_level_filter().to_string();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

// Anything that escapes `run` still gets the two-line report and exit code 1.
fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        report(UNEXPECTED_ERROR, info);
        std::process::exit(1);
    }));
}
