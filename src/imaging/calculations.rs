//! Pure calculation functions for fit-and-pad geometry.
//!
//! All functions here are pure and testable without any I/O or images.
//! Ratios are compared and scaled in exact integer arithmetic so the same
//! inputs always produce the same geometry on every platform.

/// Divide and round to nearest; exact halves round down.
///
/// Rounding ties toward the smaller value keeps `1920×1080 → 1080×1080` at a
/// 607px inner height rather than 608, matching the truncating behaviour of
/// the original form on ties while staying nearest everywhere else.
fn round_div(num: u64, den: u64) -> u64 {
    let q = num / den;
    let r = num % den;
    if 2 * r > den { q + 1 } else { q }
}

/// Calculate the largest size with the source's aspect ratio that fits inside
/// the target canvas.
///
/// The axis that is relatively larger fills the canvas exactly; the other is
/// scaled proportionally and clamped to `1..=target`, so extreme aspect ratios
/// never yield a zero-pixel dimension.
///
/// # Arguments
/// * `source` - Source dimensions (width, height), both non-zero
/// * `target` - Canvas dimensions (width, height), both non-zero
///
/// # Returns
/// * `(width, height)` - Inner image dimensions
pub fn calculate_fit_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = (source.0 as u64, source.1 as u64);
    let (tgt_w, tgt_h) = (target.0 as u64, target.1 as u64);

    // src_w / src_h > tgt_w / tgt_h, without floats
    let (w, h) = if src_w * tgt_h > tgt_w * src_h {
        // Source is wider: width fills, height shrinks
        (tgt_w, round_div(tgt_w * src_h, src_w))
    } else {
        // Source is taller or equal: height fills, width shrinks
        (round_div(tgt_h * src_w, src_h), tgt_h)
    };

    (w.clamp(1, tgt_w) as u32, h.clamp(1, tgt_h) as u32)
}

/// Offset that centers `inner` on `canvas`, flooring odd remainders.
///
/// The left/top margin is never larger than the right/bottom one, and the two
/// differ by at most one pixel.
pub fn calculate_center_offset(canvas: (u32, u32), inner: (u32, u32)) -> (u32, u32) {
    (
        canvas.0.saturating_sub(inner.0) / 2,
        canvas.1.saturating_sub(inner.1) / 2,
    )
}
