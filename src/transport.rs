//! Write-side transport boundary.

use std::io::Write;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use serialport::SerialPort;

use crate::protocol::render_hex;

/// One outbound link to a curtain controller. Implementations own the
/// connection lifecycle; the codec hands over finished frames and nothing
/// more. Reads and notification handling stay inside the implementation.
pub trait Transport {
    fn connect(&mut self) -> Result<()>;
    fn write_frame(&mut self, frame: &[u8]) -> Result<()>;
    fn disconnect(&mut self) -> Result<()>;
}

/// Serial link to the BLE-UART bridge carrying controller traffic.
pub struct SerialBridge {
    port_name: String,
    baud_rate: u32,
    port: Option<Box<dyn SerialPort>>,
}

impl SerialBridge {
    pub fn new(port_name: impl Into<String>, baud_rate: u32) -> Self {
        SerialBridge {
            port_name: port_name.into(),
            baud_rate,
            port: None,
        }
    }
}

impl Transport for SerialBridge {
    fn connect(&mut self) -> Result<()> {
        let mut port = serialport::new(&self.port_name, self.baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .open()
            .context(format!("Failed to open serial port {}", self.port_name))?;

        port.set_timeout(Duration::from_millis(1000))
            .context("Failed to set serial port timeout")?;

        if let Err(e) = port.write_data_terminal_ready(true) {
            eprintln!("Warning: Failed to set DTR on {}: {}", self.port_name, e);
        }

        // Give the bridge time to settle before the first frame
        thread::sleep(Duration::from_millis(100));

        self.port = Some(port);
        Ok(())
    }

    fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        let port = self
            .port
            .as_mut()
            .context("Serial bridge is not connected")?;

        port.write_all(frame)
            .context(format!("Serial write failed on {}", self.port_name))?;
        port.flush()
            .context(format!("Serial flush failed on {}", self.port_name))?;
        Ok(())
    }

    fn disconnect(&mut self) -> Result<()> {
        self.port = None;
        Ok(())
    }
}

/// Dry-run sink that prints frames instead of sending them.
pub struct FrameDump;

impl Transport for FrameDump {
    fn connect(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_frame(&mut self, frame: &[u8]) -> Result<()> {
        println!("{}", render_hex(frame));
        Ok(())
    }

    fn disconnect(&mut self) -> Result<()> {
        Ok(())
    }
}
