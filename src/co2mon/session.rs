use std::error::Error as StdError;

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::co2mon::{
    Accumulator, Device, FrameRejection, MagicTable, Measurement, RawFrame, Reading,
    decode_measurement, parse_frame,
};

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Fatal session failures. The `Display` strings are the reasons reported to
/// the caller; the transport error is kept as the source.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("device open failed")]
    DeviceOpenFailed(#[source] BoxError),

    #[error("key exchange failed")]
    KeyExchangeFailed(#[source] BoxError),

    #[error("read error")]
    FrameReadFailed(#[source] BoxError),
}

/// Opens the device, sends the magic table and reads until both temperature
/// and CO2 have been seen. The device is dropped before returning, whatever the
/// outcome.
pub fn run_session<D, F>(open: F, magic_table: &MagicTable) -> Result<Reading, SessionError>
where
    D: Device,
    F: FnOnce() -> Result<D, D::Error>,
{
    let mut device = open().map_err(|e| {
        error!("failed to open CO2 device: {e}");
        SessionError::DeviceOpenFailed(Box::new(e))
    })?;

    send_magic_table(&mut device, magic_table)?;

    read_measurements(&mut device, magic_table)
}

pub fn send_magic_table<D: Device>(
    device: &mut D,
    magic_table: &MagicTable,
) -> Result<(), SessionError> {
    device.send_magic_table(magic_table).map_err(|e| {
        error!("failed to send magic table to CO2 device: {e}");
        SessionError::KeyExchangeFailed(Box::new(e))
    })?;

    debug!(%magic_table, "sent magic table");

    Ok(())
}

pub fn read_measurements<D: Device>(
    device: &mut D,
    magic_table: &MagicTable,
) -> Result<Reading, SessionError> {
    let mut acc = Accumulator::default();

    loop {
        let raw = device.read_frame(magic_table).map_err(|e| {
            error!("failed to read data from CO2 device: {e}");
            SessionError::FrameReadFailed(Box::new(e))
        })?;

        match accept_frame(&raw) {
            Ok(Some(measurement)) => {
                debug!(?measurement, "accepted frame");
                acc.record(measurement);
            }
            Ok(None) => {}
            Err(rejection) if rejection.is_expected() => debug!("ignoring frame: {rejection}"),
            Err(rejection) => warn!(frame = ?raw, "discarding frame: {rejection}"),
        }

        if let Some(reading) = acc.reading() {
            info!(
                temperature_celsius = reading.temperature_celsius,
                co2_ppm = reading.co2_ppm,
                "read CO2 monitor"
            );
            return Ok(reading);
        }
    }
}

fn accept_frame(raw: &RawFrame) -> Result<Option<Measurement>, FrameRejection> {
    let frame = parse_frame(raw)?;
    decode_measurement(&frame)
}
