use std::{
    net::{AddrParseError, IpAddr, SocketAddr},
    result,
    str::FromStr,
};

use serde::de::DeserializeOwned;

use crate::{
    capabilities::{DeviceActions, PowerMeter, Relay},
    discovery::DiscoveredDevice,
    error::Result,
    protocol::{DefaultProtocol, Protocol},
};

const DEFAULT_PORT: u16 = 80;

// Accepts "a.b.c.d" or "a.b.c.d:port"
fn parse_addr(addr: &str) -> result::Result<SocketAddr, AddrParseError> {
    match SocketAddr::from_str(addr) {
        Ok(addr) => Ok(addr),
        Err(_) => Ok(SocketAddr::new(IpAddr::from_str(addr)?, DEFAULT_PORT)),
    }
}

// DEVICES

pub struct RawDevice {
    addr: SocketAddr,
    protocol: Box<dyn Protocol>,
}

impl RawDevice {
    pub fn new(addr: &str) -> result::Result<RawDevice, AddrParseError> {
        Ok(Self::from_addr(parse_addr(addr)?))
    }

    pub fn from_addr(addr: SocketAddr) -> Self {
        Self::with_protocol(addr, Box::new(DefaultProtocol::new()))
    }

    pub fn with_protocol(addr: SocketAddr, protocol: Box<dyn Protocol>) -> Self {
        Self { addr, protocol }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

impl DeviceActions for RawDevice {
    fn send<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        Ok(serde_json::from_str::<T>(&self.protocol.get(self.addr, path)?)?)
    }
}

// The raw device makes no assumptions about the hardware, so it offers every
// capability and lets the device report what it lacks.
impl Relay for RawDevice {}
impl PowerMeter for RawDevice {}

macro_rules! new_device {
    ( $x:ident ) => {
        pub struct $x {
            raw: RawDevice,
        }

        impl $x {
            pub fn new(addr: &str) -> std::result::Result<Self, AddrParseError> {
                Ok(Self {
                    raw: RawDevice::new(addr)?,
                })
            }

            pub fn from_addr(addr: SocketAddr) -> Self {
                Self {
                    raw: RawDevice::from_addr(addr),
                }
            }

            pub fn addr(&self) -> SocketAddr {
                self.raw.addr()
            }
        }

        impl DeviceActions for $x {
            fn send<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
                self.raw.send(path)
            }
        }
    };
}

new_device!(Shelly1);

impl Relay for Shelly1 {}

new_device!(Shelly1PM);

impl Relay for Shelly1PM {}
impl PowerMeter for Shelly1PM {}

new_device!(ShellyPlugS);

impl Relay for ShellyPlugS {}
impl PowerMeter for ShellyPlugS {}

pub enum Device {
    Shelly1(Shelly1),
    Shelly1PM(Shelly1PM),
    ShellyPlugS(ShellyPlugS),
    Unknown(RawDevice),
}

impl Device {
    /// Pick a device type from the host name the device announces, e.g.
    /// `shelly1pm-A4CF12F45A1B`.
    pub fn from_discovered(device: &DiscoveredDevice) -> Device {
        let addr = SocketAddr::new(IpAddr::V4(device.ip), DEFAULT_PORT);
        let name = device.name.to_lowercase();
        if name.contains("shelly1pm") {
            Device::Shelly1PM(Shelly1PM::from_addr(addr))
        } else if name.contains("shelly1-") {
            Device::Shelly1(Shelly1::from_addr(addr))
        } else if name.contains("shellyplug-s") {
            Device::ShellyPlugS(ShellyPlugS::from_addr(addr))
        } else {
            Device::Unknown(RawDevice::from_addr(addr))
        }
    }

    pub fn addr(&self) -> SocketAddr {
        match self {
            Device::Shelly1(device) => device.addr(),
            Device::Shelly1PM(device) => device.addr(),
            Device::ShellyPlugS(device) => device.addr(),
            Device::Unknown(device) => device.addr(),
        }
    }
}
