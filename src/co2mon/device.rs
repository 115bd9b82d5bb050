use std::error::Error;

use crate::co2mon::{MagicTable, RawFrame};

/// Transport to a CO2 monitor. Implementations release the device on drop.
pub trait Device {
    type Error: Error + Send + Sync + 'static;

    fn send_magic_table(&mut self, magic_table: &MagicTable) -> Result<(), Self::Error>;

    /// Blocks until one report arrives and returns it descrambled with
    /// `magic_table`. Timeouts and short reads are errors.
    fn read_frame(&mut self, magic_table: &MagicTable) -> Result<RawFrame, Self::Error>;
}
