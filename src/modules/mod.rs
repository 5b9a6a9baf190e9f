pub mod cadence;
pub mod cpu_monitor;
pub mod cpuid;
pub mod frequency_sampler;
pub mod hardware_info;
pub mod terminal_display;

// Re-export commonly used items
pub use cadence::should_sample;
pub use cpu_monitor::{CpuMonitor, FailureLatch, FrequencyDisplay, GraphBounds};
pub use cpuid::CpuidSource;
pub use frequency_sampler::{parse_mhz_line, FrequencySample, FrequencySampler};
pub use hardware_info::{identify, max_frequency_mhz, HardwareProfile, IdentificationSource};
pub use terminal_display::TerminalDisplay;
