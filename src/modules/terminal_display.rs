// src/modules/terminal_display.rs

use std::io::Write;

use log::warn;

use crate::modules::cpu_monitor::{FrequencyDisplay, GraphBounds};
use crate::modules::frequency_sampler::FrequencySample;
use crate::modules::hardware_info::HardwareProfile;

const BAR_WIDTH: usize = 40;

/// Text rendering of the profile and the latest per-core frequencies.
pub struct TerminalDisplay<W: Write> {
    out: W,
    header: Vec<String>,
    bounds: Option<GraphBounds>,
    latest: Option<(f64, Vec<f64>)>,
    dirty: bool,
    clear_screen: bool,
}

impl<W: Write> TerminalDisplay<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            header: Vec::new(),
            bounds: None,
            latest: None,
            dirty: false,
            clear_screen: true,
        }
    }

    /// Disables the clear-screen escape before each frame.
    pub fn without_clear(mut self) -> Self {
        self.clear_screen = false;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn frame(&self, now: f64) -> Vec<String> {
        let mut lines = self.header.clone();
        lines.push(String::new());

        let max_mhz = self.bounds.map(|b| b.max_mhz).unwrap_or(0);
        match self.bounds {
            Some(bounds) => {
                let (from, to) = bounds.time_range(now);
                lines.push(format!(
                    "Frequency, MHz ({} - {})   Time, sec ({:.1} - {:.1})",
                    bounds.min_mhz, bounds.max_mhz, from, to
                ));
            }
            None => lines.push("Frequency, MHz".into()),
        }
        lines.push(String::new());

        if let Some((time, values)) = &self.latest {
            for (core, mhz) in values.iter().enumerate() {
                lines.push(format!("CPU{:<3} {:>9.1} MHz  {}", core, mhz, bar(*mhz, max_mhz)));
            }
            lines.push(String::new());
            lines.push(format!("Sampled at {:.2} s", time));
        } else {
            lines.push("Waiting for first sample...".into());
        }

        lines
    }
}

fn bar(mhz: f64, max_mhz: u32) -> String {
    if max_mhz == 0 {
        return String::new();
    }
    let ratio = (mhz / f64::from(max_mhz)).clamp(0.0, 1.0);
    let filled = (ratio * BAR_WIDTH as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), " ".repeat(BAR_WIDTH - filled))
}

impl<W: Write> FrequencyDisplay for TerminalDisplay<W> {
    fn show_profile(&mut self, profile: &HardwareProfile) {
        self.header = profile.to_string().lines().map(String::from).collect();
        self.dirty = true;
    }

    fn configure_axes(&mut self, bounds: &GraphBounds) {
        self.bounds = Some(*bounds);
        self.dirty = true;
    }

    fn add_samples(&mut self, time: f64, sample: &FrequencySample) {
        self.latest = Some((time, sample.values().to_vec()));
        self.dirty = true;
    }

    fn render(&mut self, now: f64) {
        if !self.dirty {
            return;
        }
        self.dirty = false;

        let mut text = String::new();
        if self.clear_screen {
            text.push_str("\x1B[2J\x1B[1;1H");
        }
        for line in self.frame(now) {
            text.push_str(&line);
            text.push('\n');
        }

        if let Err(e) = self.out.write_all(text.as_bytes()).and_then(|_| self.out.flush()) {
            warn!("failed to draw frame: {}", e);
        }
    }
}
