// src/modules/hardware_info.rs

use std::fmt;
use std::fs;
use std::path::Path;

use log::{info, warn};

use crate::error::{MonitorError, Result};
use crate::globals::{ARCH_LABEL, MAX_FREQUENCY_SENTINEL};

/// Static description of the processor, collected once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HardwareProfile {
    pub architecture: String,
    pub vendor: String,
    pub code_name: String,
    pub brand: String,
    /// L1 data cache, KB.
    pub l1_cache: u32,
    /// L2 cache, KB.
    pub l2_cache: u32,
    pub physical_cores: usize,
    pub logical_cores: usize,
    /// Always zero; kept so the graph's lower bound has a named source.
    pub min_frequency_mhz: u32,
    pub max_frequency_mhz: u32,
}

impl fmt::Display for HardwareProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Architecture: {}", self.architecture)?;
        writeln!(f, "Vendor: {}", self.vendor)?;
        writeln!(f, "Model: {}", self.code_name)?;
        writeln!(f, "Brand: {}", self.brand)?;
        writeln!(f, "Hardware cores: {}", self.physical_cores)?;
        writeln!(f, "Logical cores: {}", self.logical_cores)?;
        writeln!(f, "L1 cache: {} KB", self.l1_cache)?;
        write!(f, "L2 cache: {} KB", self.l2_cache)
    }
}

/// Family/model/stepping triple reported by the processor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuSignature {
    pub family: u32,
    pub model: u32,
    pub stepping: u32,
}

/// Unprocessed identification data, as collected from the facility.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawIdentification {
    pub vendor: String,
    pub brand: Option<String>,
    pub signature: Option<CpuSignature>,
    pub l1_data_cache_kb: Option<u32>,
    pub l2_cache_kb: Option<u32>,
    pub physical_cores: usize,
    pub logical_cores: usize,
}

/// Structured identification derived from [`RawIdentification`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CpuIdentity {
    pub vendor: String,
    pub code_name: String,
    pub brand: String,
    pub l1_cache: u32,
    pub l2_cache: u32,
    pub physical_cores: usize,
    pub logical_cores: usize,
}

/// A cpu identification facility.
pub trait IdentificationSource {
    fn is_present(&self) -> bool;
    fn read_raw(&self) -> Result<RawIdentification>;
    fn derive(&self, raw: RawIdentification) -> Result<CpuIdentity>;
}

/// Runs the identification path against `source` and reads the frequency
/// ceiling from `max_freq_path`.
pub fn identify<S: IdentificationSource>(source: &S, max_freq_path: &Path) -> Result<HardwareProfile> {
    if !source.is_present() {
        return Err(MonitorError::HardwareUnsupported);
    }

    let raw = source.read_raw()?;
    let identity = source.derive(raw)?;

    let profile = HardwareProfile {
        architecture: ARCH_LABEL.to_string(),
        vendor: identity.vendor,
        code_name: identity.code_name,
        brand: identity.brand,
        l1_cache: identity.l1_cache,
        l2_cache: identity.l2_cache,
        physical_cores: identity.physical_cores,
        logical_cores: identity.logical_cores,
        min_frequency_mhz: 0,
        max_frequency_mhz: max_frequency_mhz(max_freq_path),
    };

    info!(
        "identified {} ({}), {} logical cores, max {} MHz",
        profile.brand, profile.vendor, profile.logical_cores, profile.max_frequency_mhz
    );

    Ok(profile)
}

/// Reads the kHz ceiling at `path` and converts it to MHz.
///
/// Never fails: an unreadable or unparsable file yields
/// [`MAX_FREQUENCY_SENTINEL`] unchanged.
pub fn max_frequency_mhz(path: &Path) -> u32 {
    let khz = fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|s| s.trim().parse::<u32>().map_err(|e| e.to_string()));

    match khz {
        Ok(khz) => khz / 1000,
        Err(e) => {
            warn!(
                "can't read max frequency from {} ({}), assuming {}",
                path.display(),
                e,
                MAX_FREQUENCY_SENTINEL
            );
            MAX_FREQUENCY_SENTINEL
        }
    }
}

/// Counts the cpus in a kernel range list such as `0-3,8-11`.
pub fn parse_cpu_list(list: &str) -> Option<usize> {
    let list = list.trim();
    if list.is_empty() {
        return None;
    }

    list.split(',').try_fold(0usize, |count, range| {
        let range = range.trim();
        let span = match range.split_once('-') {
            Some((first, last)) => {
                let first: usize = first.trim().parse().ok()?;
                let last: usize = last.trim().parse().ok()?;
                last.checked_sub(first)? + 1
            }
            None => {
                range.parse::<usize>().ok()?;
                1
            }
        };
        Some(count + span)
    })
}

/// Number of online cpus listed at `path`, if it can be read.
pub fn online_cpu_count(path: &Path) -> Option<usize> {
    fs::read_to_string(path)
        .ok()
        .and_then(|list| parse_cpu_list(&list))
}

/// Default derivation shared by identification sources.
pub fn derive_identity(raw: RawIdentification) -> Result<CpuIdentity> {
    let vendor = raw.vendor.trim().to_string();
    if vendor.is_empty() {
        return Err(MonitorError::IdentificationParse("empty vendor string".into()));
    }

    let signature = raw
        .signature
        .ok_or_else(|| MonitorError::IdentificationParse("no family/model signature".into()))?;

    if raw.logical_cores == 0 {
        return Err(MonitorError::IdentificationParse("no logical cores reported".into()));
    }

    let brand = raw
        .brand
        .map(|b| b.trim().to_string())
        .filter(|b| !b.is_empty())
        .unwrap_or_else(|| vendor.clone());

    Ok(CpuIdentity {
        code_name: code_name(&vendor, signature),
        vendor,
        brand,
        l1_cache: raw.l1_data_cache_kb.unwrap_or(0),
        l2_cache: raw.l2_cache_kb.unwrap_or(0),
        physical_cores: raw.physical_cores.clamp(1, raw.logical_cores),
        logical_cores: raw.logical_cores,
    })
}

/// Microarchitecture name for well known signatures.
pub fn code_name(vendor: &str, sig: CpuSignature) -> String {
    let known = match (vendor, sig.family, sig.model, sig.stepping) {
        ("GenuineIntel", 6, 0x2A | 0x2D, _) => Some("Sandy Bridge"),
        ("GenuineIntel", 6, 0x3A | 0x3E, _) => Some("Ivy Bridge"),
        ("GenuineIntel", 6, 0x3C | 0x3F | 0x45 | 0x46, _) => Some("Haswell"),
        ("GenuineIntel", 6, 0x3D | 0x47 | 0x4F | 0x56, _) => Some("Broadwell"),
        ("GenuineIntel", 6, 0x4E | 0x5E | 0x55, _) => Some("Skylake"),
        ("GenuineIntel", 6, 0x9E, 10..) => Some("Coffee Lake"),
        ("GenuineIntel", 6, 0x8E | 0x9E, _) => Some("Kaby Lake"),
        ("GenuineIntel", 6, 0xA5 | 0xA6, _) => Some("Comet Lake"),
        ("GenuineIntel", 6, 0x7D | 0x7E, _) => Some("Ice Lake"),
        ("GenuineIntel", 6, 0x8C | 0x8D, _) => Some("Tiger Lake"),
        ("GenuineIntel", 6, 0x97 | 0x9A, _) => Some("Alder Lake"),
        ("GenuineIntel", 6, 0xB7 | 0xBA | 0xBF, _) => Some("Raptor Lake"),
        ("AuthenticAMD", 0x15, _, _) => Some("Bulldozer"),
        ("AuthenticAMD", 0x16, _, _) => Some("Jaguar"),
        ("AuthenticAMD", 0x17, 0x00..=0x0F, _) => Some("Zen"),
        ("AuthenticAMD", 0x17, 0x10..=0x2F, _) => Some("Zen+"),
        ("AuthenticAMD", 0x17, _, _) => Some("Zen 2"),
        ("AuthenticAMD", 0x19, 0x00..=0x5F, _) => Some("Zen 3"),
        ("AuthenticAMD", 0x19, _, _) => Some("Zen 4"),
        ("AuthenticAMD", 0x1A, _, _) => Some("Zen 5"),
        _ => None,
    };

    match known {
        Some(name) => name.to_string(),
        None => format!("Family {} Model {}", sig.family, sig.model),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    struct FakeSource {
        present: bool,
        raw: Option<RawIdentification>,
    }

    impl IdentificationSource for FakeSource {
        fn is_present(&self) -> bool {
            self.present
        }

        fn read_raw(&self) -> Result<RawIdentification> {
            self.raw
                .clone()
                .ok_or_else(|| MonitorError::IdentificationRead("no leaves".into()))
        }

        fn derive(&self, raw: RawIdentification) -> Result<CpuIdentity> {
            derive_identity(raw)
        }
    }

    fn intel_raw() -> RawIdentification {
        RawIdentification {
            vendor: "GenuineIntel".into(),
            brand: Some("  Intel(R) Core(TM) i7-8700 CPU @ 3.20GHz  ".into()),
            signature: Some(CpuSignature { family: 6, model: 0x9E, stepping: 10 }),
            l1_data_cache_kb: Some(32),
            l2_cache_kb: Some(256),
            physical_cores: 6,
            logical_cores: 12,
        }
    }

    fn max_freq_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_max_frequency_converts_khz() {
        let file = max_freq_file("3800000\n");
        assert_eq!(max_frequency_mhz(file.path()), 3800);
    }

    #[test]
    fn test_max_frequency_missing_file_is_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("cpuinfo_max_freq");
        assert_eq!(max_frequency_mhz(&missing), 10_000_000);
    }

    #[test]
    fn test_max_frequency_garbage_is_sentinel() {
        let file = max_freq_file("fast");
        assert_eq!(max_frequency_mhz(file.path()), MAX_FREQUENCY_SENTINEL);
    }

    #[test]
    fn test_identify_builds_profile() {
        let file = max_freq_file("4600000");
        let source = FakeSource { present: true, raw: Some(intel_raw()) };

        let profile = identify(&source, file.path()).unwrap();
        assert_eq!(profile.architecture, ARCH_LABEL);
        assert_eq!(profile.vendor, "GenuineIntel");
        assert_eq!(profile.code_name, "Coffee Lake");
        assert_eq!(profile.brand, "Intel(R) Core(TM) i7-8700 CPU @ 3.20GHz");
        assert_eq!(profile.l1_cache, 32);
        assert_eq!(profile.l2_cache, 256);
        assert_eq!(profile.physical_cores, 6);
        assert_eq!(profile.logical_cores, 12);
        assert_eq!(profile.min_frequency_mhz, 0);
        assert_eq!(profile.max_frequency_mhz, 4600);
    }

    #[test]
    fn test_identify_unsupported() {
        let source = FakeSource { present: false, raw: Some(intel_raw()) };
        let err = identify(&source, Path::new("/nonexistent")).unwrap_err();
        assert!(matches!(err, MonitorError::HardwareUnsupported));
    }

    #[test]
    fn test_identify_read_error() {
        let source = FakeSource { present: true, raw: None };
        let err = identify(&source, Path::new("/nonexistent")).unwrap_err();
        assert!(matches!(err, MonitorError::IdentificationRead(_)));
    }

    #[test]
    fn test_identify_parse_error() {
        let mut raw = intel_raw();
        raw.signature = None;
        let source = FakeSource { present: true, raw: Some(raw) };
        let err = identify(&source, Path::new("/nonexistent")).unwrap_err();
        assert!(matches!(err, MonitorError::IdentificationParse(_)));

        let mut raw = intel_raw();
        raw.logical_cores = 0;
        assert!(matches!(
            derive_identity(raw),
            Err(MonitorError::IdentificationParse(_))
        ));
    }

    #[test]
    fn test_derive_fills_gaps() {
        let raw = RawIdentification {
            vendor: "AuthenticAMD".into(),
            brand: None,
            signature: Some(CpuSignature { family: 0x19, model: 0x61, stepping: 2 }),
            l1_data_cache_kb: None,
            l2_cache_kb: Some(1024),
            physical_cores: 0,
            logical_cores: 16,
        };
        let identity = derive_identity(raw).unwrap();
        assert_eq!(identity.brand, "AuthenticAMD");
        assert_eq!(identity.code_name, "Zen 4");
        assert_eq!(identity.l1_cache, 0);
        assert_eq!(identity.physical_cores, 1);
    }

    #[test]
    fn test_parse_cpu_list() {
        assert_eq!(parse_cpu_list("0-7\n"), Some(8));
        assert_eq!(parse_cpu_list("0"), Some(1));
        assert_eq!(parse_cpu_list("0,2-5,9"), Some(6));
        assert_eq!(parse_cpu_list(""), None);
        assert_eq!(parse_cpu_list("5-2"), None);
        assert_eq!(parse_cpu_list("a-b"), None);
    }

    #[test]
    fn test_online_cpu_count_file() {
        let file = max_freq_file("0-11\n");
        assert_eq!(online_cpu_count(file.path()), Some(12));
        assert_eq!(online_cpu_count(Path::new("/nonexistent/online")), None);
    }

    #[test]
    fn test_code_name_uses_stepping() {
        let kaby = CpuSignature { family: 6, model: 0x9E, stepping: 9 };
        let coffee = CpuSignature { family: 6, model: 0x9E, stepping: 10 };
        let kaby_mobile = CpuSignature { family: 6, model: 0x8E, stepping: 10 };
        assert_eq!(code_name("GenuineIntel", kaby), "Kaby Lake");
        assert_eq!(code_name("GenuineIntel", coffee), "Coffee Lake");
        assert_eq!(code_name("GenuineIntel", kaby_mobile), "Kaby Lake");
    }

    #[test]
    fn test_unknown_code_name() {
        let sig = CpuSignature { family: 7, model: 1, stepping: 0 };
        assert_eq!(code_name("CentaurHauls", sig), "Family 7 Model 1");
    }

    #[test]
    fn test_profile_display() {
        let file = max_freq_file("3000000");
        let source = FakeSource { present: true, raw: Some(intel_raw()) };
        let text = identify(&source, file.path()).unwrap().to_string();
        assert!(text.contains("Logical cores: 12"));
        assert!(text.contains("L2 cache: 256 KB"));
    }
}
