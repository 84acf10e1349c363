//! Control Shelly smart plugs over their local HTTP API
//!
//! ```no_run
//! use shelly_relay::{capabilities::{PowerMeter, Relay}, devices::Shelly1PM};
//!
//! let plug = Shelly1PM::new("192.168.1.40").unwrap();
//! plug.switch_on(None).unwrap();
//! println!("{} W", plug.current_power_usage().unwrap());
//! ```
#[macro_use]
extern crate serde_derive;

pub mod capabilities;
pub mod datatypes;
pub mod devices;
pub mod discovery;
pub mod error;
mod protocol;
#[cfg(feature = "async")]
pub mod tokio;

pub use discovery::{discover, scan_network};
pub use protocol::{DefaultProtocol, Protocol};
