//! CPU-feature detection and one-time kernel dispatch.
//!
//! Grounded on the `CpuFeatures`/`CpuDispatcher` pair from the kernel the
//! rest of this crate is imitating: detect once via a `OnceLock`, pick a
//! function-pointer table, and make the selection idempotent so that
//! calling it from multiple threads (or multiple times on one thread) is
//! harmless.

pub mod scalar;

#[cfg(target_arch = "x86_64")]
mod x86;

#[cfg(target_arch = "aarch64")]
mod aarch64;

use std::sync::OnceLock;

/// Detected host capabilities. Every bit is recorded even when this crate
/// ships no kernel body for it (AVX-512, SVE, SVE2) — see DESIGN.md's
/// "AVX-512 / SVE / SVE2 kernels" note.
#[derive(Debug, Clone, Copy, Default)]
pub struct CpuFeatures {
    pub has_sse42: bool,
    pub has_avx2: bool,
    pub has_avx512f: bool,
    pub has_neon: bool,
    pub has_sve: bool,
    pub has_sve2: bool,
    pub arch_name: &'static str,
}

impl CpuFeatures {
    fn detect() -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            CpuFeatures {
                has_sse42: is_x86_feature_detected!("sse4.2"),
                has_avx2: is_x86_feature_detected!("avx2"),
                has_avx512f: is_x86_feature_detected!("avx512f"),
                has_neon: false,
                has_sve: false,
                has_sve2: false,
                arch_name: "x86_64",
            }
        }
        #[cfg(target_arch = "aarch64")]
        {
            CpuFeatures {
                has_sse42: false,
                has_avx2: false,
                has_avx512f: false,
                has_neon: std::arch::is_aarch64_feature_detected!("neon"),
                has_sve: std::arch::is_aarch64_feature_detected!("sve"),
                has_sve2: false,
                arch_name: "aarch64",
            }
        }
        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
        {
            CpuFeatures {
                arch_name: "generic",
                ..Default::default()
            }
        }
    }

    pub fn get() -> &'static CpuFeatures {
        static FEATURES: OnceLock<CpuFeatures> = OnceLock::new();
        FEATURES.get_or_init(CpuFeatures::detect)
    }

    pub fn log(&self) {
        tracing::debug!(
            arch = self.arch_name,
            sse42 = self.has_sse42,
            avx2 = self.has_avx2,
            avx512f = self.has_avx512f,
            neon = self.has_neon,
            sve = self.has_sve,
            sve2 = self.has_sve2,
            "detected CPU features"
        );
    }
}

type ScanStringFn = fn(&[u8]) -> usize;
type FindStructuralFn = fn(&[u8]) -> (u64, usize);
type ParseIntFn = fn(&[u8]) -> (i64, usize);

/// The selected kernel set for this process. `Copy` function pointers, no
/// interior mutability needed once chosen.
#[derive(Clone, Copy)]
pub struct Dispatch {
    pub scan_string: ScanStringFn,
    pub find_structural: FindStructuralFn,
    pub parse_int: ParseIntFn,
}

#[cfg(target_arch = "x86_64")]
fn scan_string_avx2_checked(bytes: &[u8]) -> usize {
    unsafe { x86::scan_string_avx2(bytes) }
}
#[cfg(target_arch = "x86_64")]
fn find_structural_avx2_checked(bytes: &[u8]) -> (u64, usize) {
    unsafe { x86::find_structural_avx2(bytes) }
}
#[cfg(target_arch = "x86_64")]
fn parse_int_avx2_checked(bytes: &[u8]) -> (i64, usize) {
    unsafe { x86::parse_int_avx2(bytes) }
}
#[cfg(target_arch = "x86_64")]
fn scan_string_sse42_checked(bytes: &[u8]) -> usize {
    unsafe { x86::scan_string_sse42(bytes) }
}
#[cfg(target_arch = "x86_64")]
fn find_structural_sse42_checked(bytes: &[u8]) -> (u64, usize) {
    unsafe { x86::find_structural_sse42(bytes) }
}
#[cfg(target_arch = "x86_64")]
fn parse_int_sse42_checked(bytes: &[u8]) -> (i64, usize) {
    unsafe { x86::parse_int_sse42(bytes) }
}

#[cfg(target_arch = "aarch64")]
fn scan_string_neon_checked(bytes: &[u8]) -> usize {
    unsafe { aarch64::scan_string_neon(bytes) }
}
#[cfg(target_arch = "aarch64")]
fn find_structural_neon_checked(bytes: &[u8]) -> (u64, usize) {
    unsafe { aarch64::find_structural_neon(bytes) }
}
#[cfg(target_arch = "aarch64")]
fn parse_int_neon_checked(bytes: &[u8]) -> (i64, usize) {
    unsafe { aarch64::parse_int_neon(bytes) }
}

impl Dispatch {
    fn select(features: &CpuFeatures) -> Self {
        #[cfg(target_arch = "x86_64")]
        {
            if features.has_avx2 {
                return Dispatch {
                    scan_string: scan_string_avx2_checked,
                    find_structural: find_structural_avx2_checked,
                    parse_int: parse_int_avx2_checked,
                };
            }
            if features.has_sse42 {
                return Dispatch {
                    scan_string: scan_string_sse42_checked,
                    find_structural: find_structural_sse42_checked,
                    parse_int: parse_int_sse42_checked,
                };
            }
        }
        #[cfg(target_arch = "aarch64")]
        {
            if features.has_neon {
                return Dispatch {
                    scan_string: scan_string_neon_checked,
                    find_structural: find_structural_neon_checked,
                    parse_int: parse_int_neon_checked,
                };
            }
        }
        let _ = features;
        Dispatch {
            scan_string: scalar::scan_string,
            find_structural: scalar::find_structural,
            parse_int: scalar::parse_int,
        }
    }
}

/// The process-wide kernel selection, computed once. Safe to call
/// concurrently: `OnceLock::get_or_init` serializes the one real
/// computation and every other caller just reads the cached result.
pub fn dispatch() -> &'static Dispatch {
    static DISPATCH: OnceLock<Dispatch> = OnceLock::new();
    DISPATCH.get_or_init(|| {
        let features = CpuFeatures::get();
        features.log();
        Dispatch::select(features)
    })
}

/// Forces dispatch-table initialization. Idempotent; calling it is
/// optional since every kernel call already goes through [`dispatch()`].
pub fn init() {
    dispatch();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_is_idempotent_and_cached() {
        let a = CpuFeatures::get() as *const CpuFeatures;
        let b = CpuFeatures::get() as *const CpuFeatures;
        assert_eq!(a, b);
    }

    #[test]
    fn dispatch_init_is_idempotent() {
        init();
        init();
        let d1 = dispatch() as *const Dispatch;
        let d2 = dispatch() as *const Dispatch;
        assert_eq!(d1, d2);
    }

    #[test]
    fn dispatched_kernels_agree_with_scalar_reference() {
        let d = dispatch();
        let samples: &[&[u8]] = &[b"", b"hello world", b"\"quoted\"", b"123456"];
        for sample in samples {
            assert_eq!((d.scan_string)(sample), scalar::scan_string(sample));
            assert_eq!((d.find_structural)(sample), scalar::find_structural(sample));
            assert_eq!((d.parse_int)(sample), scalar::parse_int(sample));
        }
    }
}
