//! Control and capture for the Konica Minolta CS-2000A spectroradiometer.
//!
//! The instrument speaks a line-oriented ASCII protocol over RS-232: every
//! command is a CRLF-terminated line, every successful acknowledgement opens
//! with the `OK00` status token, and a finished measurement is read back as
//! four comma-separated data bands that concatenate into one 401-point
//! spectrum covering 380-780 nm.
//!
//! [`Cs2000`] owns the serial channel and walks the fixed protocol sequence
//! (remote enable, trigger, completion poll, band reads, remote release);
//! [`storage::save_spectrum`] pairs the intensities with their wavelengths
//! and writes the CSV. The channel behind the session is the [`transport`]
//! trait seam, so the whole sequence also runs against
//! [`transport::MockTransport`] in tests.
//!
//! ```no_run
//! use std::path::Path;
//!
//! use cs2000ctrl::{storage, Cs2000};
//!
//! fn main() -> anyhow::Result<()> {
//!     let mut device = Cs2000::open("/dev/ttyUSB0")?;
//!     let spectrum = device.measure()?;
//!     storage::save_spectrum(Path::new("./captures"), &spectrum)?;
//!     Ok(())
//! }
//! ```

pub mod device;
pub mod error;
pub mod storage;
pub mod transport;

pub use device::{Cs2000, Timing};
pub use error::{Cs2000Error, Result};
