//! CS-2000A device session.
//!
//! Protocol overview (CS-2000/CS-2000A remote control, RS-232):
//! - Format: ASCII command/response, CRLF command terminator
//! - Baud: 9600, 8N1, no flow control
//! - `RMTS,1`    -> `OK00...`           enable remote mode
//! - `MEAS,1`    -> `OK00,<seconds>`    trigger, seconds = exposure time
//! - (no command) -> exact line `OK00`  measurement complete
//! - `MEDR,1,0,<band>` -> `OK00,<v1>,<v2>,...` for band 01..04
//! - `RMTS,0`    -> (none awaited)      release remote mode
//!
//! The exchange is strictly sequential: each command must be acknowledged
//! before the next is issued, so the session is a one-shot state machine
//! (Connected -> RemoteEnabled -> Measuring -> DataReady) with a single
//! unconditional cleanup path back to released.

use std::thread;
use std::time::Duration;

use log::{debug, info, warn};

use crate::error::{Cs2000Error, Result};
use crate::transport::{SerialTransport, Transport};

/// Status token opening every successful acknowledgement.
const STATUS_OK: &str = "OK00";
const CMD_REMOTE_ON: &str = "RMTS,1";
const CMD_REMOTE_OFF: &str = "RMTS,0";
const CMD_MEASURE: &str = "MEAS,1";
/// The four spectral data bands, fetched in this order.
const DATA_BANDS: [&str; 4] = ["01", "02", "03", "04"];

/// Delay schedule for the command exchange.
///
/// The instrument needs a short settle time between a command write and the
/// response read, and reports its own exposure time in whole seconds. Every
/// wait is an explicit field here so tests can collapse them to zero.
#[derive(Debug, Clone)]
pub struct Timing {
    /// Pause between writing a command and reading its response.
    pub settle: Duration,
    /// Pause between completion polls while a measurement runs.
    pub poll_interval: Duration,
    /// Completion polls attempted before giving up.
    pub poll_limit: u32,
    /// Length of one second of device-reported exposure time.
    pub duration_unit: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            settle: Duration::from_millis(500),
            poll_interval: Duration::from_secs(1),
            poll_limit: 120,
            duration_unit: Duration::from_secs(1),
        }
    }
}

impl Timing {
    /// Every delay collapsed to zero, polling bound kept. For tests.
    pub fn immediate() -> Self {
        Self {
            settle: Duration::ZERO,
            poll_interval: Duration::ZERO,
            duration_unit: Duration::ZERO,
            ..Self::default()
        }
    }
}

/// One measurement session against a CS-2000A.
///
/// The session owns the channel for its whole lifetime. [`Cs2000::measure`]
/// drives the full sequence and guarantees the remote lock is released on
/// every exit path; the individual protocol steps are public for callers
/// that need finer control.
pub struct Cs2000<T: Transport> {
    transport: T,
    timing: Timing,
}

impl Cs2000<SerialTransport> {
    /// Open the serial channel to the instrument on `port`.
    pub fn open(port: &str) -> Result<Self> {
        let transport = SerialTransport::open(port)?;
        info!("CS-2000A connected on {}", port);
        Ok(Self::with_transport(transport, Timing::default()))
    }
}

impl<T: Transport> Cs2000<T> {
    /// Build a session over an arbitrary transport.
    pub fn with_transport(transport: T, timing: Timing) -> Self {
        Self { transport, timing }
    }

    /// Run the full measurement sequence and return the spectrum.
    ///
    /// Remote mode is released whether or not the sequence succeeds; the
    /// device must not be left remote-locked. An error from the measurement
    /// steps takes precedence over one from the release.
    pub fn measure(&mut self) -> Result<Vec<f64>> {
        let outcome = self.run_sequence();
        let released = self.close_connection();
        match outcome {
            Ok(spectrum) => {
                released?;
                Ok(spectrum)
            }
            Err(err) => {
                if let Err(close_err) = released {
                    warn!("failed to release remote mode after error: {}", close_err);
                }
                Err(err)
            }
        }
    }

    fn run_sequence(&mut self) -> Result<Vec<f64>> {
        self.enable_remote_mode()?;
        self.start_measurement()?;
        self.read_measurement_data()
    }

    /// Put the instrument under remote control.
    pub fn enable_remote_mode(&mut self) -> Result<()> {
        let response = self.exchange(CMD_REMOTE_ON)?;
        if !response.contains(STATUS_OK) {
            return Err(Cs2000Error::Protocol(format!(
                "remote mode not acknowledged: '{response}'"
            )));
        }
        info!("Remote mode enabled");
        Ok(())
    }

    /// Trigger one measurement and block out its reported exposure time.
    ///
    /// Returns the exposure time, in seconds, the instrument announced.
    pub fn start_measurement(&mut self) -> Result<u32> {
        let response = self.exchange(CMD_MEASURE)?;
        if !response.contains(STATUS_OK) {
            return Err(Cs2000Error::Protocol(format!(
                "measurement not acknowledged: '{response}'"
            )));
        }
        let seconds = response
            .split_once(',')
            .map(|(_, field)| field.trim())
            .ok_or_else(|| {
                Cs2000Error::Protocol(format!("no measurement duration in '{response}'"))
            })?
            .parse::<u32>()
            .map_err(|_| {
                Cs2000Error::Protocol(format!("bad measurement duration in '{response}'"))
            })?;
        info!("Measurement started, {} s exposure", seconds);
        sleep(self.timing.duration_unit * seconds);
        Ok(seconds)
    }

    /// Wait for completion, then pull the four data bands.
    ///
    /// The band payloads are accumulated in request order into one flat
    /// spectrum. Length is not checked here; persistence enforces the
    /// 401-sample invariant.
    pub fn read_measurement_data(&mut self) -> Result<Vec<f64>> {
        self.await_completion()?;

        let mut spectrum = Vec::new();
        for band in DATA_BANDS {
            let response = self.exchange(&format!("MEDR,1,0,{band}"))?;
            let payload = response
                .strip_prefix(STATUS_OK)
                .and_then(|rest| rest.strip_prefix(','))
                .ok_or_else(|| {
                    Cs2000Error::Protocol(format!("band {band} read failed: '{response}'"))
                })?;
            for field in payload.split(',') {
                let value = field.trim().parse::<f64>().map_err(|_| {
                    Cs2000Error::Protocol(format!(
                        "band {band} returned non-numeric field '{field}'"
                    ))
                })?;
                spectrum.push(value);
            }
        }
        debug!("Collected {} spectral samples", spectrum.len());
        Ok(spectrum)
    }

    /// Release remote mode. No acknowledgement is awaited; the channel
    /// itself closes when the session is dropped.
    pub fn close_connection(&mut self) -> Result<()> {
        self.transport.send_line(CMD_REMOTE_OFF)?;
        sleep(self.timing.settle);
        info!("Connection closed");
        Ok(())
    }

    /// Poll until the instrument reports the running measurement finished.
    ///
    /// Completion is the exact line `OK00`, not a substring match: while
    /// measuring, the device may emit other status chatter. A device that
    /// never answers would otherwise hang this loop, so the poll gives up
    /// after `Timing::poll_limit` reads.
    fn await_completion(&mut self) -> Result<()> {
        for _ in 0..self.timing.poll_limit {
            let line = self.transport.read_line()?;
            if line == STATUS_OK {
                debug!("Measurement complete");
                return Ok(());
            }
            sleep(self.timing.poll_interval);
        }
        Err(Cs2000Error::CompletionTimeout {
            polls: self.timing.poll_limit,
        })
    }

    /// One command/response exchange: write, settle, read.
    fn exchange(&mut self, command: &str) -> Result<String> {
        self.transport.send_line(command)?;
        sleep(self.timing.settle);
        self.transport.read_line()
    }
}

fn sleep(delay: Duration) {
    if !delay.is_zero() {
        thread::sleep(delay);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MockTransport;

    fn session(responses: &[&str]) -> Cs2000<MockTransport> {
        Cs2000::with_transport(
            MockTransport::new(responses.iter().copied()),
            Timing::immediate(),
        )
    }

    #[test]
    fn enable_remote_mode_accepts_token_with_trailing_fields() {
        let mut device = session(&["OK00,0"]);
        assert!(device.enable_remote_mode().is_ok());
    }

    #[test]
    fn enable_remote_mode_rejects_missing_token() {
        let mut device = session(&["ER10"]);
        assert!(matches!(
            device.enable_remote_mode(),
            Err(Cs2000Error::Protocol(_))
        ));
    }

    #[test]
    fn start_measurement_parses_exposure_time() {
        let mut device = session(&["OK00,7"]);
        assert_eq!(device.start_measurement().unwrap(), 7);
    }

    #[test]
    fn start_measurement_rejects_non_integer_duration() {
        let mut device = session(&["OK00,abc"]);
        assert!(matches!(
            device.start_measurement(),
            Err(Cs2000Error::Protocol(_))
        ));
    }

    #[test]
    fn start_measurement_rejects_missing_duration_field() {
        let mut device = session(&["OK00"]);
        assert!(matches!(
            device.start_measurement(),
            Err(Cs2000Error::Protocol(_))
        ));
    }

    #[test]
    fn read_collects_bands_in_request_order() {
        let mut device = session(&[
            "OK00",
            "OK00,1.0,2.0",
            "OK00,3.0",
            "OK00,4.0",
            "OK00,5.0,6.0",
        ]);
        let spectrum = device.read_measurement_data().unwrap();
        assert_eq!(spectrum, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn completion_poll_ignores_status_chatter() {
        // Two non-completion lines (chatter, then a silent second) before
        // the exact token arrives.
        let mut device = session(&["BUSY", "", "OK00", "OK00,1.5", "OK00,2.5", "OK00,3.5", "OK00,4.5"]);
        let spectrum = device.read_measurement_data().unwrap();
        assert_eq!(spectrum, vec![1.5, 2.5, 3.5, 4.5]);
    }

    #[test]
    fn completion_poll_does_not_match_substrings() {
        // "OK00,..." is a band-style line, not the bare completion token;
        // the poll must keep waiting and eventually time out.
        let timing = Timing {
            poll_limit: 3,
            ..Timing::immediate()
        };
        let mut device =
            Cs2000::with_transport(MockTransport::new(["OK00,1.0", "OK00,2.0"]), timing);
        assert!(matches!(
            device.read_measurement_data(),
            Err(Cs2000Error::CompletionTimeout { polls: 3 })
        ));
    }

    #[test]
    fn silent_device_times_out_after_poll_limit() {
        let timing = Timing {
            poll_limit: 5,
            ..Timing::immediate()
        };
        let mut device = Cs2000::with_transport(MockTransport::default(), timing);
        assert!(matches!(
            device.read_measurement_data(),
            Err(Cs2000Error::CompletionTimeout { polls: 5 })
        ));
    }

    #[test]
    fn band_read_without_token_is_a_protocol_error() {
        let mut device = session(&["OK00", "ER00"]);
        assert!(matches!(
            device.read_measurement_data(),
            Err(Cs2000Error::Protocol(_))
        ));
    }

    #[test]
    fn band_read_with_non_numeric_field_is_a_protocol_error() {
        let mut device = session(&["OK00", "OK00,1.0,oops"]);
        assert!(matches!(
            device.read_measurement_data(),
            Err(Cs2000Error::Protocol(_))
        ));
    }

    #[test]
    fn measure_releases_remote_mode_after_a_failure() {
        // Remote enable succeeds, the trigger is refused; the release
        // command must still go out.
        let mock = MockTransport::new(["OK00", "ER17"]);
        let log = mock.sent_log();
        let mut device = Cs2000::with_transport(mock, Timing::immediate());

        assert!(device.measure().is_err());

        let sent = log.lock().unwrap();
        assert_eq!(*sent, ["RMTS,1", "MEAS,1", "RMTS,0"]);
    }
}
