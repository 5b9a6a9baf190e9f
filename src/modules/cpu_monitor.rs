// src/modules/cpu_monitor.rs

use std::time::Instant;

use log::{info, warn};

use crate::config::MonitorSettings;
use crate::error::Result;
use crate::modules::cadence::should_sample;
use crate::modules::frequency_sampler::{FrequencySample, FrequencySampler};
use crate::modules::hardware_info::HardwareProfile;

/// Axis ranges for a frequency-over-time graph.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphBounds {
    pub min_mhz: u32,
    pub max_mhz: u32,
    pub window_seconds: f64,
}

impl GraphBounds {
    pub fn new(profile: &HardwareProfile, settings: &MonitorSettings) -> Self {
        Self {
            min_mhz: profile.min_frequency_mhz,
            max_mhz: profile.max_frequency_mhz.saturating_add(settings.headroom_mhz),
            window_seconds: settings.window_seconds,
        }
    }

    /// Visible time range when the newest point is at `now`.
    pub fn time_range(&self, now: f64) -> (f64, f64) {
        (now - self.window_seconds, now)
    }
}

/// Rendering side of the monitor. Receives plain data, owns any buffering.
pub trait FrequencyDisplay {
    fn show_profile(&mut self, profile: &HardwareProfile);
    fn configure_axes(&mut self, bounds: &GraphBounds);
    fn add_samples(&mut self, time: f64, sample: &FrequencySample);
    fn render(&mut self, now: f64);
}

/// Ties the sampler, the cadence gate and a display together.
pub struct CpuMonitor<D: FrequencyDisplay> {
    profile: HardwareProfile,
    sampler: FrequencySampler,
    bounds: GraphBounds,
    display: D,
    started: Instant,
    last_sample: f64,
}

impl<D: FrequencyDisplay> CpuMonitor<D> {
    pub fn new(profile: HardwareProfile, settings: &MonitorSettings, mut display: D) -> Self {
        let sampler = FrequencySampler::new(settings.cpuinfo_path.clone(), profile.logical_cores);
        let bounds = GraphBounds::new(&profile, settings);

        display.show_profile(&profile);
        display.configure_axes(&bounds);

        Self {
            profile,
            sampler,
            bounds,
            display,
            started: Instant::now(),
            last_sample: 0.0,
        }
    }

    pub fn profile(&self) -> &HardwareProfile {
        &self.profile
    }

    pub fn sample(&self) -> &FrequencySample {
        self.sampler.sample()
    }

    pub fn bounds(&self) -> &GraphBounds {
        &self.bounds
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    /// Runs one tick at the monitor's elapsed wall-clock time.
    pub fn tick(&mut self) -> Result<bool> {
        let now = self.started.elapsed().as_secs_f64();
        self.tick_at(now)
    }

    /// Samples if the cadence allows, then renders. Returns whether a sample
    /// was taken. On a failed sample the display still renders the previous
    /// values before the error is returned.
    pub fn tick_at(&mut self, now: f64) -> Result<bool> {
        let mut sampled = Ok(false);

        if should_sample(self.last_sample, now) {
            sampled = match self.sampler.sample_once() {
                Ok(sample) => {
                    self.display.add_samples(now, sample);
                    self.last_sample = now;
                    Ok(true)
                }
                Err(e) => Err(e),
            };
        }

        self.display.render(now);
        sampled
    }
}

/// Turns a stream of tick results into one warning per outage.
#[derive(Debug, Default)]
pub struct FailureLatch {
    failing: bool,
}

impl FailureLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_failing(&self) -> bool {
        self.failing
    }

    /// Logs on ok->failing and failing->ok transitions only. Returns true
    /// when `result` started a new outage.
    pub fn observe<T>(&mut self, result: &Result<T>) -> bool {
        match result {
            Err(e) if !self.failing => {
                warn!("{}", e);
                self.failing = true;
                true
            }
            Ok(_) if self.failing => {
                info!("frequency sampling recovered");
                self.failing = false;
                false
            }
            _ => false,
        }
    }
}
