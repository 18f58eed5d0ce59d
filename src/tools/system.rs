//! OS, CPU and memory overview, and a sampling resource monitor.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use bytesize::ByteSize;
use serde::Serialize;
use sysinfo::{System, MINIMUM_CPU_UPDATE_INTERVAL};

use super::ToolError;

/// How often a waiting monitor checks the shutdown flag.
const SHUTDOWN_POLL: Duration = Duration::from_millis(50);

/// Snapshot of the host.
#[derive(Debug, Clone, Serialize)]
pub struct SystemInfo {
    /// Operating system name
    pub os_name: String,
    /// Operating system version
    pub os_version: String,
    /// Kernel version
    pub kernel_version: String,
    /// Host name
    pub host_name: String,
    /// CPU architecture (e.g. `x86_64`)
    pub arch: String,
    /// Logical CPUs
    pub logical_cores: usize,
    /// Physical cores, when known
    pub physical_cores: Option<usize>,
    /// Total memory in bytes
    pub total_memory: u64,
    /// Available memory in bytes
    pub available_memory: u64,
    /// Used memory in bytes
    pub used_memory: u64,
}

/// Collect a [`SystemInfo`] snapshot.
#[must_use]
pub fn system_info() -> SystemInfo {
    let mut sys = System::new();
    sys.refresh_memory();
    sys.refresh_cpu();

    let unknown = || "unknown".to_string();

    SystemInfo {
        os_name: System::name().unwrap_or_else(unknown),
        os_version: System::os_version().unwrap_or_else(unknown),
        kernel_version: System::kernel_version().unwrap_or_else(unknown),
        host_name: System::host_name().unwrap_or_else(unknown),
        arch: std::env::consts::ARCH.to_string(),
        logical_cores: sys.cpus().len(),
        physical_cores: sys.physical_core_count(),
        total_memory: sys.total_memory(),
        available_memory: sys.available_memory(),
        used_memory: sys.used_memory(),
    }
}

/// Print the snapshot as aligned `key: value` lines.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_system_info<W: Write>(writer: &mut W, info: &SystemInfo) -> io::Result<()> {
    writeln!(writer, "System Information")?;
    writeln!(writer, "{}", "=".repeat(60))?;
    writeln!(writer, "{:<18}{} {}", "OS:", info.os_name, info.os_version)?;
    writeln!(writer, "{:<18}{}", "Kernel:", info.kernel_version)?;
    writeln!(writer, "{:<18}{}", "Hostname:", info.host_name)?;
    writeln!(writer, "{:<18}{}", "Architecture:", info.arch)?;
    match info.physical_cores {
        Some(physical) => writeln!(
            writer,
            "{:<18}{} logical, {} physical",
            "CPU cores:", info.logical_cores, physical
        )?,
        None => writeln!(writer, "{:<18}{} logical", "CPU cores:", info.logical_cores)?,
    }

    let percent = if info.total_memory == 0 {
        0.0
    } else {
        info.used_memory as f64 / info.total_memory as f64 * 100.0
    };
    writeln!(writer, "{:<18}{}", "Memory total:", ByteSize(info.total_memory))?;
    writeln!(writer, "{:<18}{}", "Memory available:", ByteSize(info.available_memory))?;
    writeln!(
        writer,
        "{:<18}{} ({:.1}%)",
        "Memory used:",
        ByteSize(info.used_memory),
        percent
    )
}

/// One sample taken by [`monitor`].
#[derive(Debug, Clone, Serialize)]
pub struct MonitorReading {
    /// 1-based sample number
    pub index: u32,
    /// Total samples requested
    pub count: u32,
    /// Global CPU usage over the last interval, in percent
    pub cpu_percent: f32,
    /// Used memory in bytes
    pub used_memory: u64,
    /// Total memory in bytes
    pub total_memory: u64,
}

impl MonitorReading {
    /// Used memory as a percentage of the total.
    #[must_use]
    pub fn memory_percent(&self) -> f64 {
        if self.total_memory == 0 {
            return 0.0;
        }
        self.used_memory as f64 / self.total_memory as f64 * 100.0
    }
}

/// Take `count` CPU and memory samples, `interval` apart.
///
/// The interval is raised to sysinfo's minimum CPU update interval so
/// every sample measures a real window. Each sample is handed to
/// `on_reading` as soon as it is taken. Returns the number of samples.
///
/// # Errors
///
/// Returns [`ToolError::Interrupted`] once the shutdown flag is set, and
/// passes through any error from `on_reading`.
pub fn monitor<F, E>(
    interval: Duration,
    count: u32,
    shutdown: Option<&AtomicBool>,
    mut on_reading: F,
) -> Result<u32, E>
where
    F: FnMut(&MonitorReading) -> Result<(), E>,
    E: From<ToolError>,
{
    let interval = interval.max(MINIMUM_CPU_UPDATE_INTERVAL);
    let mut sys = System::new();
    sys.refresh_cpu();

    log::debug!("Monitoring {} samples every {:?}", count, interval);

    for index in 1..=count {
        if !wait(interval, shutdown) {
            log::info!("Monitor stopped after {} of {} samples", index - 1, count);
            return Err(ToolError::Interrupted.into());
        }

        sys.refresh_cpu();
        sys.refresh_memory();

        on_reading(&MonitorReading {
            index,
            count,
            cpu_percent: sys.global_cpu_info().cpu_usage(),
            used_memory: sys.used_memory(),
            total_memory: sys.total_memory(),
        })?;
    }

    Ok(count)
}

/// Sleep for `duration`; `false` if shutdown was requested meanwhile.
fn wait(duration: Duration, shutdown: Option<&AtomicBool>) -> bool {
    let requested = || shutdown.is_some_and(|f| f.load(Ordering::SeqCst));
    let deadline = Instant::now() + duration;

    loop {
        if requested() {
            return false;
        }
        let now = Instant::now();
        if now >= deadline {
            return true;
        }
        std::thread::sleep(SHUTDOWN_POLL.min(deadline - now));
    }
}

/// Print the monitor banner.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_monitor_header<W: Write>(writer: &mut W) -> io::Result<()> {
    writeln!(writer, "System Resource Monitor")?;
    writeln!(writer, "{}", "=".repeat(50))?;
    writeln!(writer, "Press Ctrl+C to stop")
}

/// Print one monitor sample.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_monitor_reading<W: Write>(writer: &mut W, reading: &MonitorReading) -> io::Result<()> {
    writeln!(writer)?;
    writeln!(writer, "Reading {}/{}:", reading.index, reading.count)?;
    writeln!(writer, "  CPU Usage: {:.1}%", reading.cpu_percent)?;
    writeln!(
        writer,
        "  Memory Usage: {:.1}% ({} / {})",
        reading.memory_percent(),
        ByteSize(reading.used_memory),
        ByteSize(reading.total_memory)
    )
}
