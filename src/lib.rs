pub mod co2mon;
pub mod hid;
pub mod report;
