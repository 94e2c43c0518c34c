use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use matrixdriver::{image_frames, pattern, Bus, Config, MatrixDriver, Packet, RecordingBus};

/// Iterations per frame for the test pattern
const PATTERN_ITERATIONS: u32 = 2;
/// Iterations per frame when showing images
const IMAGE_ITERATIONS: u32 = 50;

#[derive(Parser)]
#[command(name = "matrixdriver")]
#[command(about = "Driver for the 8x8 RGB LED matrix based on the 74HC595 chip", long_about = None)]
struct Cli {
    /// Path to configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// SPI bus number
    #[arg(long)]
    bus: Option<u8>,

    /// SPI device (chip select) number
    #[arg(long)]
    device: Option<u8>,

    /// Debug level: 1 prints frames, 2 also prints every packet
    #[arg(long)]
    debug: Option<u8>,

    /// Limit the SPI clock
    #[arg(long)]
    max_speed_hz: Option<u32>,

    /// Draw repetitions per frame
    #[arg(long)]
    iterations: Option<u32>,

    /// Do not mirror the row order of frames
    #[arg(long)]
    no_mirror: bool,

    /// Send packets to an in-memory bus instead of the SPI device
    #[arg(long)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Walk a single lit pixel over every position of every channel
    TestPattern {
        /// Repeat until interrupted
        #[arg(long = "loop")]
        repeat: bool,
    },
    /// Show every .png image of a directory (8 pixels high, scrolled if wider)
    Images {
        dir: PathBuf,
    },
    /// Decode a captured packet (red, blue, green, column bytes)
    Decode {
        #[arg(value_parser = parse_byte, num_args = 4, required = true)]
        bytes: Vec<u8>,
    },
}

fn parse_byte(value: &str) -> Result<u8, String> {
    let parsed = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed.map_err(|e| format!("invalid byte `{value}`: {e}"))
}

impl Cli {
    fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => {
                let data = fs::read_to_string(path)
                    .context(format!("Failed to read {}", path.display()))?;
                Config::from_json(&data).context(format!("Invalid config {}", path.display()))?
            }
            None => Config::default(),
        };

        // Command line flags win over the file
        if let Some(bus) = self.bus {
            config.bus = bus;
        }
        if let Some(device) = self.device {
            config.device = device;
        }
        if let Some(debug) = self.debug {
            config.debug = debug;
        }
        if self.max_speed_hz.is_some() {
            config.max_speed_hz = self.max_speed_hz;
        }
        if self.iterations.is_some() {
            config.iterations = self.iterations;
        }
        if self.no_mirror {
            config.mirror = false;
        }
        Ok(config)
    }
}

fn init_tracing(debug: u8) {
    let level = match debug {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(feature = "spidev")]
fn hardware_bus() -> Result<Box<dyn Bus>> {
    Ok(Box::new(matrixdriver::SpidevBus::new()))
}

#[cfg(not(feature = "spidev"))]
fn hardware_bus() -> Result<Box<dyn Bus>> {
    anyhow::bail!("Built without the `spidev` feature, use --dry-run")
}

fn open_bus(dry_run: bool) -> Result<Box<dyn Bus>> {
    if dry_run {
        Ok(Box::new(RecordingBus::counting()))
    } else {
        hardware_bus()
    }
}

fn run_test_pattern(
    driver: &mut MatrixDriver<Box<dyn Bus>>,
    repeat: bool,
    running: &AtomicBool,
) -> Result<()> {
    let iterations = driver.config().iterations.unwrap_or(PATTERN_ITERATIONS);
    println!("Testing the driver and the LED matrix.");
    loop {
        let mut current = None;
        for (channel, frame) in pattern::full_sweep() {
            if !running.load(Ordering::Relaxed) {
                return Ok(());
            }
            if current != Some(channel) {
                println!("Sequence of {} LEDs.", channel.name().to_uppercase());
                current = Some(channel);
            }
            driver.set_frame(frame);
            driver.draw(iterations).context("Failed to draw test pattern")?;
        }
        if !repeat {
            return Ok(());
        }
    }
}

fn run_images(
    driver: &mut MatrixDriver<Box<dyn Bus>>,
    dir: &Path,
    running: &AtomicBool,
) -> Result<()> {
    let iterations = driver.config().iterations.unwrap_or(IMAGE_ITERATIONS);
    let files = image_frames::list_images(dir)
        .context(format!("Failed to list images in {}", dir.display()))?;
    if files.is_empty() {
        warn!(dir = %dir.display(), "no .png images found");
    }

    for path in files {
        println!("{}", path.display());
        let frames = match image_frames::load_frames(&path) {
            Ok(frames) => frames,
            Err(e) => {
                println!(" * skipping ({})", e);
                continue;
            }
        };
        info!(path = %path.display(), frames = frames.len(), "showing image");

        for frame in frames {
            if !running.load(Ordering::Relaxed) {
                return Ok(());
            }
            driver.set_frame(frame);
            driver
                .draw(iterations)
                .context(format!("Failed to draw {}", path.display()))?;
        }
    }
    Ok(())
}

fn run_decode(bytes: &[u8]) -> Result<()> {
    let packet = Packet::try_from(bytes)?;
    let decoded = matrixdriver::decode_packet(&packet);
    println!("{packet}");
    match decoded.column {
        Some(column) => println!("active column: {column}"),
        None => println!("active column: none (column byte {:08b})", packet.column()),
    }
    print!("{decoded}");
    Ok(())
}

fn start(dry_run: bool, config: Config) -> Result<(MatrixDriver<Box<dyn Bus>>, Arc<AtomicBool>)> {
    let bus = open_bus(dry_run)?;
    let driver = MatrixDriver::new(bus, config);

    // Set up Ctrl-C handler; checked between frames
    let running = Arc::new(AtomicBool::new(true));
    let handler_flag = Arc::clone(&running);
    if let Err(e) = ctrlc::set_handler(move || {
        handler_flag.store(false, Ordering::Relaxed);
    }) {
        eprintln!("Warning: Could not set Ctrl-C handler: {}", e);
    }

    Ok((driver, running))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.load_config()?;
    init_tracing(config.debug);

    match &cli.command {
        Command::Decode { bytes } => run_decode(bytes),
        Command::TestPattern { repeat } => {
            let (mut driver, running) = start(cli.dry_run, config)?;
            run_test_pattern(&mut driver, *repeat, &running)
        }
        Command::Images { dir } => {
            let (mut driver, running) = start(cli.dry_run, config)?;
            run_images(&mut driver, dir, &running)
        }
    }
}
