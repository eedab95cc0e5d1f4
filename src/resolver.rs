use std::net::IpAddr;

use tokio::net::lookup_host;
use tracing::debug;

use crate::error::ScanError;

/// Resolve the scan target to a single address, once, before any probe is
/// dispatched.
///
/// Resolution is a target-level operation, not a port-level one: failing
/// here aborts the whole scan instead of surfacing per port. Prefers an
/// IPv4 address when the name maps to several.
pub async fn resolve(target: &str) -> Result<IpAddr, ScanError> {
    // lookup_host wants a (host, port) pair; the port is irrelevant here.
    let addrs: Vec<IpAddr> = lookup_host((target, 0u16))
        .await
        .map_err(|source| ScanError::ResolutionFailed {
            target: target.to_owned(),
            source,
        })?
        .map(|saddr| saddr.ip())
        .collect();

    let ip = addrs
        .iter()
        .copied()
        .find(IpAddr::is_ipv4)
        .or_else(|| addrs.first().copied())
        .ok_or_else(|| ScanError::UnresolvedTarget {
            target: target.to_owned(),
        })?;

    debug!(host = %target, %ip, "resolved scan target");
    Ok(ip)
}
