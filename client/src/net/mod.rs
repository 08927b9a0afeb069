//! Network module: connectivity monitoring and the remote task service
//! transport.

mod monitor;
mod remote;

pub use monitor::*;
pub use remote::*;
