mod device;
mod frame;
mod magic_table;
mod measurement;
mod session;

pub use device::*;
pub use frame::*;
pub use magic_table::*;
pub use measurement::*;
pub use session::*;
