// src/error.rs

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures surfaced by identification and sampling.
///
/// Per-line parse problems in the frequency listing are not errors; those
/// lines are skipped and the previous value for that core is kept.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("Your CPU doesn't support CPUID")]
    HardwareUnsupported,

    #[error("Can't get the CPUID raw data: {0}")]
    IdentificationRead(String),

    #[error("CPU identification failed: {0}")]
    IdentificationParse(String),

    #[error("Can't read cpu frequency listing {}: {source}", .path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, MonitorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_unavailable_message_names_path() {
        let err = MonitorError::SourceUnavailable {
            path: PathBuf::from("/proc/cpuinfo"),
            source: io::Error::new(io::ErrorKind::NotFound, "gone"),
        };
        let msg = err.to_string();
        assert!(msg.contains("/proc/cpuinfo"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn test_identification_messages() {
        assert_eq!(
            MonitorError::HardwareUnsupported.to_string(),
            "Your CPU doesn't support CPUID"
        );
        assert!(MonitorError::IdentificationParse("no signature".into())
            .to_string()
            .starts_with("CPU identification failed"));
    }
}
