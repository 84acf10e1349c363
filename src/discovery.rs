//! Discover devices on the local network by reverse DNS
//!
//! Shelly devices register a host name such as `shelly1pm-A4CF12F45A1B` with
//! the local DHCP/DNS server, so a reverse lookup over the subnet is enough to
//! find them. The sweep is best effort: an address that does not resolve is
//! skipped, so the result can only ever under-report.
use std::{
    fmt, io,
    net::{IpAddr, Ipv4Addr},
    str::FromStr,
};

use log::{info, trace};
use rayon::prelude::*;

use crate::error::{Error, Result};

/// Host name fragment every Shelly device announces
pub const SHELLY_NAME_PATTERN: &str = "shelly";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredDevice {
    pub ip: Ipv4Addr,
    pub name: String,
}

pub trait Resolver: Sync {
    /// Resolve an address to a host name
    fn lookup_addr(&self, ip: Ipv4Addr) -> io::Result<String>;
}

/// Uses the operating system's resolver
pub struct SystemResolver;

impl Resolver for SystemResolver {
    fn lookup_addr(&self, ip: Ipv4Addr) -> io::Result<String> {
        dns_lookup::lookup_addr(&IpAddr::V4(ip))
    }
}

/// Network address the candidate host numbers are added to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasePrefix(Ipv4Addr);

impl BasePrefix {
    pub fn new(network: Ipv4Addr) -> Self {
        BasePrefix(network)
    }

    /// Mask `addr` down to its first `prefix_len` bits
    pub fn from_addr(addr: Ipv4Addr, prefix_len: u8) -> Result<Self> {
        if prefix_len > 32 {
            return Err(Error::Other(format!("Invalid prefix length /{}", prefix_len)));
        }
        let mask = if prefix_len == 0 {
            0
        } else {
            u32::MAX << (32 - u32::from(prefix_len))
        };
        Ok(BasePrefix(Ipv4Addr::from(u32::from(addr) & mask)))
    }

    pub fn network(&self) -> Ipv4Addr {
        self.0
    }

    /// Address of host number `host`, or `None` past 255.255.255.255
    pub fn host(&self, host: u32) -> Option<Ipv4Addr> {
        u32::from(self.0).checked_add(host).map(Ipv4Addr::from)
    }

    pub fn candidates(&self, start: u32, end: u32) -> impl Iterator<Item = Ipv4Addr> + '_ {
        (start..=end).filter_map(move |host| self.host(host))
    }
}

impl FromStr for BasePrefix {
    type Err = Error;

    /// Accepts `"192.168.1."`, `"192.168.1"` and `"192.168.1.0"`; missing
    /// trailing octets are zero.
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim().trim_end_matches('.');
        let parts: Vec<&str> = trimmed.split('.').collect();
        if trimmed.is_empty() || parts.len() > 4 {
            return Err(Error::Other(format!("Invalid base prefix: {:?}", s)));
        }

        let mut octets = [0_u8; 4];
        for (octet, part) in octets.iter_mut().zip(parts) {
            *octet = part
                .parse()
                .map_err(|_| Error::Other(format!("Invalid base prefix: {:?}", s)))?;
        }

        Ok(BasePrefix(Ipv4Addr::from(octets)))
    }
}

impl fmt::Display for BasePrefix {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Base network; inferred from the local host name when `None`
    pub base: Option<BasePrefix>,
    /// Prefix length used when inferring the base
    pub prefix_len: u8,
    pub start: u32,
    pub end: u32,
    /// Concurrent reverse lookups; 1 sweeps sequentially
    pub threads: usize,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions {
            base: None,
            prefix_len: 24,
            start: 1,
            end: 255,
            threads: 32,
        }
    }
}

/// Base network of the address the local host name resolves to
pub fn local_prefix(prefix_len: u8) -> Result<BasePrefix> {
    let hostname = dns_lookup::get_hostname()?;
    let addrs: Vec<Ipv4Addr> = dns_lookup::lookup_host(&hostname)?
        .into_iter()
        .filter_map(|addr| match addr {
            IpAddr::V4(addr) => Some(addr),
            IpAddr::V6(_) => None,
        })
        .collect();

    // Some distributions map the host name to 127.0.1.1
    let addr = addrs
        .iter()
        .find(|addr| !addr.is_loopback())
        .or_else(|| addrs.first())
        .ok_or_else(|| Error::Other(format!("No IPv4 address found for {}", hostname)))?;

    BasePrefix::from_addr(*addr, prefix_len)
}

fn probe(resolver: &dyn Resolver, ip: Ipv4Addr) -> io::Result<DiscoveredDevice> {
    let name = resolver.lookup_addr(ip)?;
    // Some resolvers answer with the address itself instead of failing
    if name == ip.to_string() {
        return Err(io::Error::new(io::ErrorKind::NotFound, "no host name"));
    }
    Ok(DiscoveredDevice { ip, name })
}

/// Reverse resolve every candidate address, in ascending order
pub fn scan(options: &ScanOptions, resolver: &dyn Resolver) -> Result<Vec<DiscoveredDevice>> {
    let base = match options.base {
        Some(base) => base,
        None => local_prefix(options.prefix_len)?,
    };
    let candidates: Vec<Ipv4Addr> = base.candidates(options.start, options.end).collect();
    info!(
        "Scanning {} addresses from {} with {} workers",
        candidates.len(),
        base,
        options.threads
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.threads.max(1))
        .build()?;

    let mut devices: Vec<DiscoveredDevice> = pool.install(|| {
        candidates
            .par_iter()
            .map(|ip| (*ip, probe(resolver, *ip)))
            .filter_map(|(ip, result)| match result {
                Ok(device) => Some(device),
                Err(err) => {
                    trace!("Skipping {}: {}", ip, err);
                    None
                }
            })
            .collect()
    });
    devices.sort_by_key(|device| device.ip);

    info!("Resolved {} of {} addresses", devices.len(), candidates.len());
    Ok(devices)
}

/// Every device on the network with a host name, using the system resolver
pub fn scan_network(end: u32, base: Option<&str>) -> Result<Vec<DiscoveredDevice>> {
    let options = ScanOptions {
        base: base.map(BasePrefix::from_str).transpose()?,
        end,
        ..Default::default()
    };
    scan(&options, &SystemResolver)
}

/// Keep the records whose name contains `pattern` (case-sensitive)
pub fn filter_by_name(devices: Vec<DiscoveredDevice>, pattern: &str) -> Vec<DiscoveredDevice> {
    devices
        .into_iter()
        .filter(|device| device.name.contains(pattern))
        .collect()
}

/// Find Shelly devices on the local network
pub fn discover() -> Result<Vec<DiscoveredDevice>> {
    discover_with(&ScanOptions::default())
}

pub fn discover_with(options: &ScanOptions) -> Result<Vec<DiscoveredDevice>> {
    Ok(filter_by_name(
        scan(options, &SystemResolver)?,
        SHELLY_NAME_PATTERN,
    ))
}
