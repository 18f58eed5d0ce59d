//! Network interface listing (user-space `ifconfig` view).

use std::io::{self, Write};

use bytesize::ByteSize;
use serde::Serialize;
use sysinfo::Networks;

/// Counters and hardware address of one interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceInfo {
    pub name: String,
    pub mac_address: String,
    pub received: u64,
    pub transmitted: u64,
    pub packets_received: u64,
    pub packets_transmitted: u64,
}

/// List every network interface, sorted by name.
#[must_use]
pub fn interfaces() -> Vec<InterfaceInfo> {
    let networks = Networks::new_with_refreshed_list();
    let mut list: Vec<InterfaceInfo> = networks
        .iter()
        .map(|(name, data)| InterfaceInfo {
            name: name.clone(),
            mac_address: data.mac_address().to_string(),
            received: data.total_received(),
            transmitted: data.total_transmitted(),
            packets_received: data.total_packets_received(),
            packets_transmitted: data.total_packets_transmitted(),
        })
        .collect();
    list.sort_by(|a, b| a.name.cmp(&b.name));
    log::debug!("Found {} network interfaces", list.len());
    list
}

/// Print one block per interface.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_interfaces<W: Write>(writer: &mut W, list: &[InterfaceInfo]) -> io::Result<()> {
    writeln!(writer, "Network Interfaces (User Space)")?;
    writeln!(writer, "{}", "=".repeat(70))?;

    if list.is_empty() {
        writeln!(writer, "No network interfaces found")?;
        return Ok(());
    }

    for iface in list {
        writeln!(writer)?;
        writeln!(writer, "{}:", iface.name)?;
        writeln!(writer, "  MAC: {}", iface.mac_address)?;
        writeln!(
            writer,
            "  Received: {} ({} packets)",
            ByteSize(iface.received),
            iface.packets_received
        )?;
        writeln!(
            writer,
            "  Transmitted: {} ({} packets)",
            ByteSize(iface.transmitted),
            iface.packets_transmitted
        )?;
    }
    Ok(())
}
