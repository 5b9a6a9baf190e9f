// src/modules/frequency_sampler.rs

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::ops::Index;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::error::{MonitorError, Result};
use crate::globals::MHZ_MARKER;

/// Latest frequency of every logical core, in MHz.
///
/// The length is fixed when the sample is created and never changes.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencySample {
    values: Vec<f64>,
}

impl FrequencySample {
    pub fn new(logical_cores: usize) -> Self {
        Self { values: vec![0.0; logical_cores] }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, core: usize) -> Option<f64> {
        self.values.get(core).copied()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.values.iter().copied()
    }
}

impl Index<usize> for FrequencySample {
    type Output = f64;

    fn index(&self, core: usize) -> &f64 {
        &self.values[core]
    }
}

/// Extracts the value of a `... MHz ... : <value>` line.
///
/// Returns `None` for lines without the marker or the separator, and for
/// lines whose value isn't a finite number.
pub fn parse_mhz_line(line: &str) -> Option<f64> {
    if !line.contains(MHZ_MARKER) {
        return None;
    }

    let (_, value) = line.split_once(':')?;
    let value = value.trim();

    match value.parse::<f64>() {
        Ok(mhz) if mhz.is_finite() => Some(mhz),
        _ => {
            warn!("skipping malformed frequency line: {:?}", line);
            None
        }
    }
}

/// Periodically reads the per-core listing into a [`FrequencySample`].
///
/// The write cursor persists across samples and wraps at the core count, so a
/// listing with more frequency lines than cores keeps cycling over the same
/// slots.
#[derive(Debug, Clone)]
pub struct FrequencySampler {
    source: PathBuf,
    sample: FrequencySample,
    cursor: usize,
}

impl FrequencySampler {
    pub fn new(source: impl Into<PathBuf>, logical_cores: usize) -> Self {
        Self {
            source: source.into(),
            sample: FrequencySample::new(logical_cores),
            cursor: 0,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn sample(&self) -> &FrequencySample {
        &self.sample
    }

    /// Core slot the next parsed value will be written to.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Reads the listing once and updates the sample in place.
    pub fn sample_once(&mut self) -> Result<&FrequencySample> {
        let file = File::open(&self.source).map_err(|source| MonitorError::SourceUnavailable {
            path: self.source.clone(),
            source,
        })?;

        let written = self.ingest(BufReader::new(file));
        debug!("sampled {} core frequencies from {}", written, self.source.display());

        Ok(&self.sample)
    }

    /// Feeds every line of `reader` through the parser. Returns the number of
    /// values written. Lines that aren't valid UTF-8 are decoded lossily so
    /// they still count as lines; reading stops at the first I/O error.
    pub fn ingest<R: BufRead>(&mut self, mut reader: R) -> usize {
        let mut buf = Vec::new();
        let mut written = 0;

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(_) => {
                    if self.ingest_line(&String::from_utf8_lossy(&buf)) {
                        written += 1;
                    }
                }
                Err(e) => {
                    warn!("stopped reading frequency listing: {}", e);
                    break;
                }
            }
        }

        written
    }

    /// Writes the value of one frequency line at the cursor. Lines that don't
    /// carry a value leave the cursor where it is.
    pub fn ingest_line(&mut self, line: &str) -> bool {
        if self.sample.is_empty() {
            return false;
        }

        let Some(mhz) = parse_mhz_line(line) else {
            return false;
        };

        self.sample.values[self.cursor] = mhz;
        self.cursor += 1;
        if self.cursor >= self.sample.len() {
            self.cursor = 0;
        }
        true
    }
}
