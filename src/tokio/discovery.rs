//! Discover devices on the local network asynchronously
//!
use std::sync::Arc;

use ::tokio::task;

use crate::{
    discovery::{self, DiscoveredDevice, Resolver, ScanOptions, SystemResolver},
    error::{Error, Result},
};

/// Sweep the network on tokio's blocking pool
pub async fn scan(options: ScanOptions) -> Result<Vec<DiscoveredDevice>> {
    scan_with(options, Arc::new(SystemResolver)).await
}

pub async fn scan_with(
    options: ScanOptions,
    resolver: Arc<dyn Resolver + Send>,
) -> Result<Vec<DiscoveredDevice>> {
    task::spawn_blocking(move || discovery::scan(&options, resolver.as_ref()))
        .await
        .map_err(|err| Error::Other(format!("Scan task failed: {}", err)))?
}

/// Find Shelly devices on the local network
///
/// Uses the default options: the local /24 with 32 workers.
pub async fn discover() -> Result<Vec<DiscoveredDevice>> {
    discover_with(ScanOptions::default(), Arc::new(SystemResolver)).await
}

pub async fn discover_with(
    options: ScanOptions,
    resolver: Arc<dyn Resolver + Send>,
) -> Result<Vec<DiscoveredDevice>> {
    Ok(discovery::filter_by_name(
        scan_with(options, resolver).await?,
        discovery::SHELLY_NAME_PATTERN,
    ))
}
