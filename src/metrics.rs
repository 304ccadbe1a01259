//! Memory and elapsed-time reporting.
use std::time::Duration;

use nix::sys::resource::{UsageWho, getrusage};
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

use crate::constants::{GBYTE, KBYTE, MBYTE};

/// Memory used by the current process, in bytes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryUsage {
    /// Highest resident set size reached so far.
    pub peak: u64,
    /// Current resident set size.
    pub current: u64,
}

impl MemoryUsage {
    /// Samples the current process.
    ///
    /// Values that cannot be read are reported as zero.
    pub fn sample() -> Self {
        let current = current_rss().unwrap_or(0);
        let peak = peak_rss().unwrap_or(0).max(current);
        Self { peak, current }
    }
}

fn current_rss() -> Option<u64> {
    let pid = Pid::from_u32(std::process::id());
    let mut system = System::new();
    system.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[pid]),
        true,
        ProcessRefreshKind::nothing().with_memory(),
    );
    system.process(pid).map(|process| process.memory())
}

fn peak_rss() -> Option<u64> {
    let usage = getrusage(UsageWho::RUSAGE_SELF).ok()?;
    let max_rss = u64::try_from(usage.max_rss()).ok()?;
    // Linux reports kilobytes, macOS reports bytes.
    if cfg!(target_os = "macos") {
        Some(max_rss)
    } else {
        Some(max_rss * KBYTE)
    }
}

/// Human readable byte count, e.g. `"1.50 Mbytes"`.
pub fn format_bytes(bytes: u64) -> String {
    let scaled = |unit: u64| bytes as f64 / unit as f64;
    if bytes > GBYTE {
        format!("{:.2} Gbytes", scaled(GBYTE))
    } else if bytes > MBYTE {
        format!("{:.2} Mbytes", scaled(MBYTE))
    } else if bytes > KBYTE {
        format!("{:.2} Kbytes", scaled(KBYTE))
    } else {
        format!("{bytes} bytes")
    }
}

const UNITS: [(char, u64, &str); 7] = [
    ('y', 365 * 86_400, "year"),
    ('m', 31 * 86_400, "month"),
    ('w', 7 * 86_400, "week"),
    ('d', 86_400, "day"),
    ('h', 3_600, "hour"),
    ('i', 60, "minute"),
    ('s', 1, "second"),
];

/// Describes `elapsed` using the units selected in `units`.
///
/// Unit letters: `y` year (365 days), `m` month (31 days), `w` week, `d` day,
/// `h` hour, `i` minute, `s` second, `S` millisecond. Each selected unit takes
/// what the larger ones left over; unselected units roll into the next
/// selected one. Zero parts are omitted and an all-zero result is `"none"`.
pub fn format_elapsed(elapsed: Duration, units: &str) -> String {
    let mut left = elapsed.as_secs();
    let mut parts = Vec::new();

    for (letter, seconds, name) in UNITS {
        if !units.contains(letter) {
            continue;
        }
        let value = left / seconds;
        left %= seconds;
        if value > 0 {
            parts.push(plural(value, name));
        }
    }

    if units.contains('S') {
        let millis = u64::from(elapsed.subsec_millis()) + left * 1_000;
        if millis > 0 {
            parts.push(plural(millis, "millisecond"));
        }
    }

    if parts.is_empty() {
        "none".to_string()
    } else {
        parts.join(" ")
    }
}

fn plural(value: u64, name: &str) -> String {
    if value > 1 {
        format!("{value} {name}s")
    } else {
        format!("{value} {name}")
    }
}
