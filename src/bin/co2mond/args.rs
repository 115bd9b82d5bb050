use clap::Parser;
use co2mon::co2mon::MagicTable;

/// Reads temperature and CO2 concentration from a USB CO2 monitor and prints
/// them as JSON.
#[derive(Debug, Parser)]
#[command(name = "co2mond", version)]
pub struct Args {
    /// HID device path; defaults to the first monitor found
    #[arg(long, env = "CO2MON_DEVICE")]
    pub device: Option<String>,

    /// Timeout for a single read from the device, in milliseconds
    #[arg(
        long,
        env = "CO2MON_TIMEOUT_MS",
        default_value_t = 5000,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_ms: u64,

    /// Session key as 16 hex digits
    #[arg(long, env = "CO2MON_MAGIC_TABLE", default_value_t = MagicTable::default())]
    pub magic_table: MagicTable,
}
