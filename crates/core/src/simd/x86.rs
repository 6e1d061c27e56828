//! x86-64 vector kernels (SSE4.2, AVX2).
//!
//! Each variant must be observationally equivalent to
//! [`super::scalar`]'s reference implementation for every input; the
//! vector work here only locates stop bytes / digit runs faster, it never
//! changes which answer is correct. `parse_int`'s vector variants use SIMD
//! to find the boundary of the digit run and fall back to the same
//! scalar multiply-accumulate the reference uses, since a correct
//! horizontal weighted-sum reduction buys little over a 19-digit scalar
//! loop.

use std::arch::x86_64::*;

/// # Safety
/// Caller must have confirmed `is_x86_feature_detected!("sse4.2")`.
#[target_feature(enable = "sse4.2")]
pub unsafe fn scan_string_sse42(bytes: &[u8]) -> usize {
    let quote = unsafe { _mm_set1_epi8(b'"' as i8) };
    let backslash = unsafe { _mm_set1_epi8(b'\\' as i8) };
    let ctrl_threshold = unsafe { _mm_set1_epi8(0x20) };

    let mut i = 0;
    while i + 16 <= bytes.len() {
        let chunk = unsafe { _mm_loadu_si128(bytes.as_ptr().add(i) as *const __m128i) };
        let is_quote = unsafe { _mm_cmpeq_epi8(chunk, quote) };
        let is_backslash = unsafe { _mm_cmpeq_epi8(chunk, backslash) };
        // Unsigned "less than 0x20" via: min(chunk, 0x20-1 threshold) == chunk trick
        // is awkward with signed compares, so compare against 0x20 using the
        // unsigned-min idiom: a < b  <=>  min_epu8(a, b) == a  &&  a != b.
        let min_with_threshold = unsafe { _mm_min_epu8(chunk, ctrl_threshold) };
        let is_ctrl = unsafe {
            _mm_andnot_si128(
                _mm_cmpeq_epi8(chunk, ctrl_threshold),
                _mm_cmpeq_epi8(min_with_threshold, chunk),
            )
        };
        let stop = unsafe { _mm_or_si128(_mm_or_si128(is_quote, is_backslash), is_ctrl) };
        let mask = unsafe { _mm_movemask_epi8(stop) } as u32;
        if mask != 0 {
            return i + mask.trailing_zeros() as usize;
        }
        i += 16;
    }
    i + super::scalar::scan_string(&bytes[i..])
}

/// # Safety
/// Caller must have confirmed `is_x86_feature_detected!("avx2")`.
#[target_feature(enable = "avx2")]
pub unsafe fn scan_string_avx2(bytes: &[u8]) -> usize {
    let quote = unsafe { _mm256_set1_epi8(b'"' as i8) };
    let backslash = unsafe { _mm256_set1_epi8(b'\\' as i8) };
    let ctrl_threshold = unsafe { _mm256_set1_epi8(0x20) };

    let mut i = 0;
    while i + 32 <= bytes.len() {
        let chunk = unsafe { _mm256_loadu_si256(bytes.as_ptr().add(i) as *const __m256i) };
        let is_quote = unsafe { _mm256_cmpeq_epi8(chunk, quote) };
        let is_backslash = unsafe { _mm256_cmpeq_epi8(chunk, backslash) };
        let min_with_threshold = unsafe { _mm256_min_epu8(chunk, ctrl_threshold) };
        let is_ctrl = unsafe {
            _mm256_andnot_si256(
                _mm256_cmpeq_epi8(chunk, ctrl_threshold),
                _mm256_cmpeq_epi8(min_with_threshold, chunk),
            )
        };
        let stop = unsafe { _mm256_or_si256(_mm256_or_si256(is_quote, is_backslash), is_ctrl) };
        let mask = unsafe { _mm256_movemask_epi8(stop) } as u32;
        if mask != 0 {
            return i + mask.trailing_zeros() as usize;
        }
        i += 32;
    }
    i + super::scalar::scan_string(&bytes[i..])
}

#[target_feature(enable = "sse4.2")]
pub unsafe fn find_structural_sse42(bytes: &[u8]) -> (u64, usize) {
    unsafe { find_structural_x86_common(bytes) }
}

#[target_feature(enable = "avx2")]
pub unsafe fn find_structural_avx2(bytes: &[u8]) -> (u64, usize) {
    unsafe { find_structural_x86_common(bytes) }
}

/// Shared implementation: the structural-byte set is small and the input
/// window is capped at 64 bytes by contract, so both feature levels use
/// the same 16-byte-at-a-time SSE routine; AVX2 gains nothing extra here
/// since the window never exceeds two 32-byte loads.
#[target_feature(enable = "sse4.2")]
unsafe fn find_structural_x86_common(bytes: &[u8]) -> (u64, usize) {
    let count = bytes.len().min(64);
    let mut mask = 0u64;
    let chars: [u8; 7] = [b'{', b'}', b'[', b']', b':', b',', b'"'];
    let needles: [__m128i; 7] = chars.map(|c| unsafe { _mm_set1_epi8(c as i8) });

    let mut i = 0;
    while i + 16 <= count {
        let chunk = unsafe { _mm_loadu_si128(bytes.as_ptr().add(i) as *const __m128i) };
        let mut acc = unsafe { _mm_setzero_si128() };
        for needle in &needles {
            acc = unsafe { _mm_or_si128(acc, _mm_cmpeq_epi8(chunk, *needle)) };
        }
        let bits = unsafe { _mm_movemask_epi8(acc) } as u64;
        mask |= bits << i;
        i += 16;
    }
    if i < count {
        let (tail_mask, _) = super::scalar::find_structural(&bytes[i..count]);
        mask |= tail_mask << i;
    }
    (mask, count)
}

#[target_feature(enable = "sse4.2")]
pub unsafe fn parse_int_sse42(bytes: &[u8]) -> (i64, usize) {
    unsafe { parse_int_x86_common(bytes) }
}

#[target_feature(enable = "avx2")]
pub unsafe fn parse_int_avx2(bytes: &[u8]) -> (i64, usize) {
    unsafe { parse_int_x86_common(bytes) }
}

#[target_feature(enable = "sse4.2")]
unsafe fn parse_int_x86_common(bytes: &[u8]) -> (i64, usize) {
    let negative = bytes.first() == Some(&b'-');
    let digits_start = if negative { 1 } else { 0 };
    let digits = &bytes[digits_start..];

    let zero = unsafe { _mm_set1_epi8(b'0' as i8) };
    let nine = unsafe { _mm_set1_epi8(b'9' as i8) };
    let mut run_len = 0usize;
    let mut i = 0;
    'outer: while i + 16 <= digits.len() {
        let chunk = unsafe { _mm_loadu_si128(digits.as_ptr().add(i) as *const __m128i) };
        let ge_zero = unsafe { _mm_cmpeq_epi8(_mm_max_epu8(chunk, zero), chunk) };
        let le_nine = unsafe { _mm_cmpeq_epi8(_mm_min_epu8(chunk, nine), chunk) };
        let is_digit = unsafe { _mm_and_si128(ge_zero, le_nine) };
        let mask = unsafe { _mm_movemask_epi8(is_digit) } as u32;
        if mask != 0xFFFF {
            run_len += (!mask).trailing_zeros() as usize;
            break 'outer;
        }
        run_len += 16;
        i += 16;
    }
    if run_len == i {
        // The vector scan exhausted full chunks without finding a
        // non-digit; finish counting scalarly into the remainder.
        while run_len < digits.len() && digits[run_len].is_ascii_digit() {
            run_len += 1;
        }
    }

    if run_len == 0 {
        return (0, 0);
    }
    let mut result: i64 = 0;
    for &b in &digits[..run_len] {
        result = result.saturating_mul(10).saturating_add((b - b'0') as i64);
    }
    (if negative { -result } else { result }, digits_start + run_len)
}
