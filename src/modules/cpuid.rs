// src/modules/cpuid.rs
//! Identification backed by the processor's CPUID instruction.

use std::path::PathBuf;

use crate::error::{MonitorError, Result};
use crate::globals::CPU_ONLINE_PATH;
use crate::modules::hardware_info::{derive_identity, CpuIdentity, IdentificationSource, RawIdentification};

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
use crate::modules::hardware_info::{online_cpu_count, CpuSignature};
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
use raw_cpuid::{CacheType, CpuId};

/// CPUID for vendor, model and caches; core counts come from the OS so they
/// agree with the per-core frequency listing.
#[derive(Debug, Clone)]
pub struct CpuidSource {
    online_path: PathBuf,
}

impl CpuidSource {
    pub fn new() -> Self {
        Self::with_online_path(CPU_ONLINE_PATH)
    }

    pub fn with_online_path(online_path: impl Into<PathBuf>) -> Self {
        Self { online_path: online_path.into() }
    }

    /// Every online cpu, not just the ones this process may run on.
    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    fn logical_cores(&self) -> usize {
        online_cpu_count(&self.online_path).unwrap_or_else(num_cpus::get)
    }
}

impl Default for CpuidSource {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
impl IdentificationSource for CpuidSource {
    fn is_present(&self) -> bool {
        true
    }

    fn read_raw(&self) -> Result<RawIdentification> {
        let cpuid = CpuId::new();

        let vendor = cpuid
            .get_vendor_info()
            .map(|v| v.as_str().to_string())
            .ok_or_else(|| MonitorError::IdentificationRead("vendor leaf unavailable".into()))?;

        let brand = cpuid
            .get_processor_brand_string()
            .map(|b| b.as_str().to_string());

        let signature = cpuid.get_feature_info().map(|f| CpuSignature {
            family: u32::from(f.family_id()),
            model: u32::from(f.model_id()),
            stepping: u32::from(f.stepping_id()),
        });

        // Intel describes caches through leaf 4, AMD through 0x8000_0005.
        let l1_data_cache_kb = cpuid
            .get_cache_parameters()
            .and_then(|mut caches| {
                caches
                    .find(|c| c.level() == 1 && c.cache_type() == CacheType::Data)
                    .map(|c| {
                        let bytes = c.associativity()
                            * c.physical_line_partitions()
                            * c.coherency_line_size()
                            * c.sets();
                        (bytes / 1024) as u32
                    })
            })
            .or_else(|| {
                cpuid
                    .get_l1_cache_and_tlb_info()
                    .map(|l1| u32::from(l1.dcache_size()))
            });

        let l2_cache_kb = cpuid
            .get_l2_l3_cache_and_tlb_info()
            .map(|l2| u32::from(l2.l2cache_size()))
            .filter(|&kb| kb > 0);

        Ok(RawIdentification {
            vendor,
            brand,
            signature,
            l1_data_cache_kb,
            l2_cache_kb,
            physical_cores: num_cpus::get_physical(),
            logical_cores: self.logical_cores(),
        })
    }

    fn derive(&self, raw: RawIdentification) -> Result<CpuIdentity> {
        derive_identity(raw)
    }
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
impl IdentificationSource for CpuidSource {
    fn is_present(&self) -> bool {
        false
    }

    fn read_raw(&self) -> Result<RawIdentification> {
        Err(MonitorError::HardwareUnsupported)
    }

    fn derive(&self, raw: RawIdentification) -> Result<CpuIdentity> {
        derive_identity(raw)
    }
}
