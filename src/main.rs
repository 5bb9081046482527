use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::Rng;

mod color;
mod config;
mod grid;
mod protocol;
mod raster;
mod transport;

use color::PaletteColor;
use config::Config;
use protocol::{packet, Command, DEFAULT_PRESET_SPEED};
use transport::{FrameDump, SerialBridge, Transport};

/// Control characteristic the vendor firmware exposes.
const DEFAULT_CHAR_UUID: &str = "49535343-8841-43f4-a8d4-ecbe34729bb3";

#[derive(Parser)]
#[command(name = "curtain_ctl")]
#[command(about = "CLI for 20x20 LED curtain panels.\n\nEncodes commands into the controller's framed wire protocol and writes them through a BLE-UART bridge.", long_about = None)]
struct Cli {
    /// BLE device MAC address
    device_address: String,

    /// Characteristic UUID (defaults to the device's control UUID)
    #[arg(short = 'c', long, default_value = DEFAULT_CHAR_UUID)]
    char_uuid: String,

    /// Path to bridge configuration file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Serial port of the BLE-UART bridge (skips the config lookup)
    #[arg(long)]
    port: Option<String>,

    /// Baud rate for --port
    #[arg(long, default_value_t = 115200)]
    baud: u32,

    /// Print encoded frames instead of writing to a device
    #[arg(long)]
    dry_run: bool,

    /// Enable debug output
    #[arg(long)]
    debug: bool,

    /// Enable detailed debug (hex dump every frame)
    #[arg(long)]
    ddebug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Turn the lights on
    On,
    /// Turn the lights off
    Off,
    /// Pause the running preset animation
    Pause,
    /// Select a preset animation
    Preset {
        /// Preset from 1 to 109
        id: u8,
        /// Brightness level from 0 to 255
        #[arg(short, long, default_value_t = 255)]
        brightness: u8,
        /// Animation speed from 0 to 255
        #[arg(short, long, default_value_t = DEFAULT_PRESET_SPEED)]
        speed: u8,
    },
    /// Set the whole curtain to one color
    Rgb {
        /// Red component (0-255)
        red: u8,
        /// Green component (0-255)
        green: u8,
        /// Blue component (0-255)
        blue: u8,
    },
    /// Frame and send a raw type+payload, given as hex (e.g. 0201030d)
    Write { payload: String },
    /// Pixel operations
    Pixel {
        #[command(subcommand)]
        command: PixelCommands,
    },
}

#[derive(Subcommand)]
enum PixelCommands {
    /// Set a single pixel to a palette color
    Single {
        /// X coordinate (0-19)
        x: u8,
        /// Y coordinate (0-19)
        y: u8,
        /// red, orange, yellow, green, blue, purple, white or off
        color: String,
    },
    /// Clear the pixel buffer
    Clear,
    /// Fill pixels from an offset with one color, or "random"
    Fill {
        #[arg(default_value = "off")]
        color: String,
        /// Starting offset (0-399)
        #[arg(short, long, default_value_t = 0)]
        offset: u16,
    },
    /// Enter drawing mode
    Draw,
    /// Rasterize a 20x20 image onto the pixels
    Image { path: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ddebug implies debug
    let debug = cli.debug || cli.ddebug;

    let mut rng = rand::thread_rng();
    let frames = build_frames(&cli.command, &mut rng)?;

    if debug {
        println!(
            "Target {} (characteristic {})",
            cli.device_address, cli.char_uuid
        );
    }

    let mut transport = open_transport(&cli)?;
    transport.connect()?;

    for frame in &frames {
        if cli.ddebug {
            eprintln!("[DEBUG] {} bytes: {}", frame.len(), packet::render_hex(frame));
        }
        transport.write_frame(frame)?;
    }

    transport.disconnect()?;

    if debug {
        println!("✓ Sent {} frame(s)", frames.len());
    }

    Ok(())
}

/// Translate a subcommand into the frames to deliver, in order.
fn build_frames<R: Rng>(command: &Commands, rng: &mut R) -> Result<Vec<Vec<u8>>> {
    let commands = match command {
        Commands::On => vec![Command::Power { on: true }],
        Commands::Off => vec![Command::Power { on: false }],
        Commands::Pause => vec![Command::Pause],
        Commands::Preset { id, brightness, speed } => vec![Command::Preset {
            id: *id,
            brightness: *brightness,
            speed: *speed,
        }],
        Commands::Rgb { red, green, blue } => vec![Command::full_color(*red, *green, *blue)],
        Commands::Write { payload } => {
            let bytes = hex::decode(payload).context("Payload must be hex, e.g. 0201030d")?;
            let (&packet_type, payload) = bytes
                .split_first()
                .context("Payload needs at least a type byte")?;
            return Ok(vec![packet::build_frame(packet_type, payload)?]);
        }
        Commands::Pixel { command } => match command {
            PixelCommands::Single { x, y, color } => vec![Command::PixelSingle {
                x: *x,
                y: *y,
                color: PaletteColor::from_name(color)?,
            }],
            PixelCommands::Clear => vec![Command::PixelClear],
            PixelCommands::Draw => vec![Command::PixelDraw],
            PixelCommands::Fill { color, offset } => {
                if color == "random" {
                    vec![Command::PixelFillRandom { offset: *offset }]
                } else {
                    vec![Command::solid_fill(PaletteColor::from_name(color)?, *offset)?]
                }
            }
            PixelCommands::Image { path } => {
                let image = image::open(path)
                    .context(format!("Failed to open image {}", path.display()))?
                    .to_rgb8();
                let cells = raster::rasterize(&image)?;

                // The panel only shows pixel traffic in draw mode
                let mut commands = vec![Command::PixelDraw];
                commands.extend(raster::fill_commands(&cells));
                commands
            }
        },
    };

    commands
        .iter()
        .map(|command| command.encode(&mut *rng).map_err(anyhow::Error::from))
        .collect()
}

/// Pick the transport for this invocation: dry-run dump, an explicit
/// serial port, or a config lookup by device address.
fn open_transport(cli: &Cli) -> Result<Box<dyn Transport>> {
    if cli.dry_run {
        return Ok(Box::new(FrameDump));
    }

    if let Some(port) = &cli.port {
        return Ok(Box::new(SerialBridge::new(port.as_str(), cli.baud)));
    }

    let config_path = cli.config.as_deref().context(
        "No transport selected: pass --port, --dry-run, or --config with a bridge entry for the device",
    )?;
    let config = Config::load(config_path)?;
    let bridge = config.bridge_for(&cli.device_address).context(format!(
        "No bridge entry for {} in {}",
        cli.device_address,
        config_path.display()
    ))?;

    Ok(Box::new(SerialBridge::new(bridge.port.as_str(), bridge.baud_rate)))
}
