// src/globals.rs

/// Per-core listing, one `cpu MHz : <value>` line per logical cpu.
pub const CPUINFO_PATH: &str = "/proc/cpuinfo";

/// Range list of online cpus, e.g. `0-7` or `0,2-5`. Matches the records in
/// [`CPUINFO_PATH`] regardless of the process's affinity.
pub const CPU_ONLINE_PATH: &str = "/sys/devices/system/cpu/online";

/// Hardware ceiling of cpu0, in kHz.
pub const CPU_MAX_FREQ_PATH: &str = "/sys/devices/system/cpu/cpu0/cpufreq/cpuinfo_max_freq";

/// Minimum time between two frequency samples, in seconds.
pub const SAMPLE_INTERVAL_SECS: f64 = 0.100;

/// Returned by max frequency discovery when the ceiling can't be read.
/// Callers treat it as "no known upper bound".
pub const MAX_FREQUENCY_SENTINEL: u32 = 10_000_000;

/// Space added above the maximum frequency on the graph's y axis, in MHz.
pub const GRAPH_HEADROOM_MHZ: u32 = 1000;

/// Width of the graph's sliding time window, in seconds.
pub const GRAPH_WINDOW_SECS: f64 = 8.0;

/// Field marker identifying a frequency line in the listing.
pub const MHZ_MARKER: &str = "MHz";

#[cfg(target_arch = "x86_64")]
pub const ARCH_LABEL: &str = "x86-64";
#[cfg(target_arch = "x86")]
pub const ARCH_LABEL: &str = "x86";
#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
pub const ARCH_LABEL: &str = std::env::consts::ARCH;
