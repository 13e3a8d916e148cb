//! SSD1306 Panel Control Tool
//!
//! Attaches to an SSD1306 panel on a Linux I2C bus and feeds it text, the way
//! writes to a character device would.

mod config;
mod screenshot;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ssd1306_panel_hw::oled::{FONT_6X8, INTAKE_CAPACITY};
use ssd1306_panel_hw::{Panel, Ssd1306, TraceTransport, Transport};
use std::io::{BufRead, Read};
use std::path::PathBuf;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use config::Config;

type BoxedTransport = Box<dyn Transport + Send>;

#[derive(Parser)]
#[command(name = "ssd1306ctl")]
#[command(about = "Control tool for SSD1306 OLED panels")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Configuration file (defaults are used if it does not exist)
    #[arg(short, long, default_value = "/etc/ssd1306ctl.toml")]
    config: PathBuf,

    /// I2C bus number, overrides the configuration file
    #[arg(long)]
    bus: Option<u8>,

    /// 7-bit slave address (e.g. 0x3C), overrides the configuration file
    #[arg(long, value_parser = parse_address)]
    address: Option<u16>,

    /// Log transactions instead of touching the bus
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialise the panel and draw the header and banner
    Init,
    /// Write each argument as one line of text
    Write {
        /// Lines to write
        #[arg(required = true)]
        text: Vec<String>,

        /// Save the resulting screen as a PNG
        #[arg(long)]
        screenshot: Option<PathBuf>,
    },
    /// Forward standard input to the panel until end of file
    Stream {
        /// Forward raw chunks instead of lines; a lone NUL byte clears the text area
        #[arg(long)]
        raw: bool,

        /// Save the final screen as a PNG
        #[arg(long)]
        screenshot: Option<PathBuf>,
    },
    /// Turn the display off
    Off,
    /// Show the effective configuration
    Config {
        /// Also write it to this file
        #[arg(long)]
        save: Option<PathBuf>,
    },
}

fn parse_address(value: &str) -> std::result::Result<u16, String> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed.map_err(|e| format!("invalid address '{}': {}", value, e))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    if let Some(bus) = cli.bus {
        config.i2c.bus = bus;
    }
    if let Some(address) = cli.address {
        config.i2c.address = address;
    }

    match cli.command {
        Commands::Init => handle_init(&config, cli.dry_run),
        Commands::Write { text, screenshot } => {
            handle_write(&config, cli.dry_run, &text, screenshot)
        }
        Commands::Stream { raw, screenshot } => {
            handle_stream(&config, cli.dry_run, raw, screenshot)
        }
        Commands::Off => handle_off(&config, cli.dry_run),
        Commands::Config { save } => handle_config(&config, save),
    }
}

fn open_transport(config: &Config, dry_run: bool) -> Result<BoxedTransport> {
    if dry_run {
        info!("Dry run: transactions are logged, not sent");
        return Ok(Box::new(TraceTransport::new()));
    }
    open_bus(config)
}

#[cfg(target_os = "linux")]
fn open_bus(config: &Config) -> Result<BoxedTransport> {
    let transport = ssd1306_panel_hw::I2cDevTransport::open(config.i2c.bus, config.i2c.address)
        .context("Failed to open panel. Check the bus number and permissions.")?;
    debug!(
        "Using {} at address {:#04X}",
        transport.path(),
        transport.address()
    );
    Ok(Box::new(transport))
}

#[cfg(not(target_os = "linux"))]
fn open_bus(_config: &Config) -> Result<BoxedTransport> {
    anyhow::bail!("I2C access needs Linux i2c-dev; use --dry-run on this platform")
}

fn attach(config: &Config, dry_run: bool) -> Result<Panel<BoxedTransport>> {
    let options = config.panel_options()?;
    let transport = open_transport(config, dry_run)?;
    let panel = Panel::attach(transport, &options).context("Failed to attach panel")?;
    if panel.attach_failures() > 0 {
        warn!(
            "{} transactions failed during init; the panel may be blank",
            panel.attach_failures()
        );
    }
    if let Some(contrast) = config.display.contrast {
        panel
            .set_contrast(contrast)
            .context("Failed to set contrast")?;
    }
    Ok(panel)
}

fn finish(panel: &Panel<BoxedTransport>, screenshot: Option<PathBuf>) -> Result<()> {
    if let Some(path) = screenshot {
        screenshot::save_png(&panel.snapshot(), &path)?;
        println!("Screenshot saved to: {}", path.display());
    }
    Ok(())
}

fn handle_init(config: &Config, dry_run: bool) -> Result<()> {
    let panel = attach(config, dry_run)?;
    println!(
        "Panel initialised ({} failed transactions)",
        panel.attach_failures()
    );
    Ok(())
}

fn handle_write(
    config: &Config,
    dry_run: bool,
    lines: &[String],
    screenshot: Option<PathBuf>,
) -> Result<()> {
    let panel = attach(config, dry_run)?;
    let mut failed = 0;
    for line in lines {
        let report = panel.write(line.as_bytes());
        if report.accepted < line.len() {
            warn!("Line truncated to {} bytes", report.accepted);
        }
        failed += report.failed_transactions;
    }
    if failed > 0 {
        warn!("{} transactions failed while updating the screen", failed);
    }
    finish(&panel, screenshot)
}

fn handle_stream(
    config: &Config,
    dry_run: bool,
    raw: bool,
    screenshot: Option<PathBuf>,
) -> Result<()> {
    let panel = attach(config, dry_run)?;
    let stdin = std::io::stdin();
    let mut failed = 0;

    if raw {
        let mut input = stdin.lock();
        let mut chunk = [0u8; INTAKE_CAPACITY - 1];
        loop {
            let n = input.read(&mut chunk).context("Failed to read stdin")?;
            if n == 0 {
                break;
            }
            failed += panel.write(&chunk[..n]).failed_transactions;
        }
    } else {
        for line in stdin.lock().split(b'\n') {
            let line = line.context("Failed to read stdin")?;
            failed += panel.write(&line).failed_transactions;
        }
    }

    if failed > 0 {
        warn!("{} transactions failed while updating the screen", failed);
    }
    finish(&panel, screenshot)
}

fn handle_off(config: &Config, dry_run: bool) -> Result<()> {
    let options = config.panel_options()?;
    let transport = open_transport(config, dry_run)?;
    let mut device = Ssd1306::new(transport, options.geometry, &FONT_6X8);
    device.display_off().context("Failed to turn off display")?;
    println!("Display turned off");
    Ok(())
}

fn handle_config(config: &Config, save: Option<PathBuf>) -> Result<()> {
    print!("{}", config.to_toml()?);
    if let Some(path) = save {
        config.save(&path)?;
        println!("# Saved to: {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use ssd1306_panel_hw::Geometry;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_address() {
        assert_eq!(parse_address("0x3C"), Ok(0x3C));
        assert_eq!(parse_address("0X3d"), Ok(0x3D));
        assert_eq!(parse_address("60"), Ok(60));
        assert!(parse_address("0xZZ").is_err());
    }

    #[test]
    fn test_dry_run_write() {
        let config = Config::default();
        let panel = attach(&config, true).unwrap();
        assert_eq!(panel.attach_failures(), 0);
        assert_eq!(panel.write(b"dry").failed_transactions, 0);
        let geometry: Geometry = panel.snapshot().geometry();
        assert_eq!(geometry, Geometry::default());
    }
}
