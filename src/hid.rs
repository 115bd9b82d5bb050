use std::{ffi::CString, time::Duration};

use hidapi::{HidApi, HidDevice};
use thiserror::Error;
use tracing::debug;

use crate::co2mon::{Device, FRAME_LEN, MAGIC_TABLE_LEN, MagicTable, RawFrame};

// Holtek Semiconductor, Inc. USB-zyTemp
pub const VENDOR_ID: u16 = 0x04d9;
pub const PRODUCT_ID: u16 = 0xa052;

pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(5000);

const FEATURE_REPORT_ID: u8 = 0x00;

#[derive(Debug, Error)]
pub enum HidError {
    #[error(transparent)]
    Hid(#[from] hidapi::HidError),

    #[error("invalid device path: {0:?}")]
    InvalidPath(String),

    #[error("no data from device within {0:?}")]
    Timeout(Duration),

    #[error("short read: expected 8 bytes, got {0}")]
    ShortRead(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HidConfig {
    pub read_timeout: Duration,
}

impl Default for HidConfig {
    fn default() -> Self {
        Self {
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

/// A CO2 monitor reached through hidapi.
pub struct Co2Monitor {
    // Dropped before `_api`.
    device: HidDevice,
    _api: HidApi,
    config: HidConfig,
}

impl Co2Monitor {
    /// Opens the monitor at `path`, or the first one matching the vendor and
    /// product id when no path is given.
    pub fn open(path: Option<&str>, config: HidConfig) -> Result<Self, HidError> {
        let api = HidApi::new()?;

        let device = match path {
            Some(path) => {
                let c_path =
                    CString::new(path).map_err(|_| HidError::InvalidPath(path.to_owned()))?;
                api.open_path(&c_path)?
            }
            None => api.open(VENDOR_ID, PRODUCT_ID)?,
        };

        debug!(
            path = path.unwrap_or("<default>"),
            "opened CO2 device {VENDOR_ID:04x}:{PRODUCT_ID:04x}"
        );

        Ok(Self {
            device,
            _api: api,
            config,
        })
    }

    fn read_timeout_ms(&self) -> i32 {
        i32::try_from(self.config.read_timeout.as_millis()).unwrap_or(i32::MAX)
    }
}

impl Device for Co2Monitor {
    type Error = HidError;

    fn send_magic_table(&mut self, magic_table: &MagicTable) -> Result<(), Self::Error> {
        self.device
            .send_feature_report(&feature_report(magic_table))?;

        Ok(())
    }

    fn read_frame(&mut self, magic_table: &MagicTable) -> Result<RawFrame, Self::Error> {
        let mut report = [0u8; FRAME_LEN];
        let n = self
            .device
            .read_timeout(&mut report, self.read_timeout_ms())?;

        frame_from_read(n, &report, magic_table, self.config.read_timeout)
    }
}

fn feature_report(magic_table: &MagicTable) -> [u8; MAGIC_TABLE_LEN + 1] {
    let mut report = [0u8; MAGIC_TABLE_LEN + 1];
    report[0] = FEATURE_REPORT_ID;
    report[1..].copy_from_slice(magic_table.as_bytes());
    report
}

fn frame_from_read(
    n: usize,
    report: &RawFrame,
    magic_table: &MagicTable,
    read_timeout: Duration,
) -> Result<RawFrame, HidError> {
    match n {
        0 => Err(HidError::Timeout(read_timeout)),
        FRAME_LEN => Ok(magic_table.decode_report(report)),
        n => Err(HidError::ShortRead(n)),
    }
}

impl Drop for Co2Monitor {
    fn drop(&mut self) {
        debug!("closing CO2 device");
    }
}
