//! Serial channel to the instrument, over the `serialport` crate.

use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::time::Duration;

use log::trace;
use serialport::SerialPort;

use super::Transport;
use crate::error::{Cs2000Error, Result};

const BAUD_RATE: u32 = 9600;
const READ_TIMEOUT: Duration = Duration::from_secs(1);

/// RS-232 channel to the CS-2000A, fixed at 9600 baud 8N1 with a one-second
/// read timeout. The port closes when this is dropped.
pub struct SerialTransport {
    reader: BufReader<Box<dyn SerialPort>>,
}

impl SerialTransport {
    /// Open `port` with the instrument's fixed framing.
    pub fn open(port: &str) -> Result<Self> {
        let handle = serialport::new(port, BAUD_RATE)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(|source| Cs2000Error::Connection {
                port: port.to_string(),
                source,
            })?;
        Ok(Self {
            reader: BufReader::new(handle),
        })
    }
}

impl Transport for SerialTransport {
    fn send_line(&mut self, line: &str) -> Result<()> {
        trace!("-> '{}'", line);
        let port = self.reader.get_mut();
        port.write_all(format!("{line}\r\n").as_bytes())?;
        port.flush()?;
        Ok(())
    }

    fn read_line(&mut self) -> Result<String> {
        let mut raw = Vec::new();
        match self.reader.read_until(b'\n', &mut raw) {
            Ok(_) => {}
            // A timed-out read hands back whatever arrived so far; to the
            // caller that is a quiet device, not a failure.
            Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => {}
            Err(e) => return Err(e.into()),
        }
        let line = String::from_utf8_lossy(&raw).trim().to_string();
        trace!("<- '{}'", line);
        Ok(line)
    }
}
