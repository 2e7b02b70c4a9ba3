//! Lossy numeric casts used by the grid and sampling code.
/// Convert a count to `f64`.
#[must_use]
pub const fn usize_to_f64(value: usize) -> f64 {
    #[allow(clippy::cast_precision_loss)]
    let newval = value as f64;
    newval
}

/// Truncate towards zero. Negative values give 0.
#[must_use]
pub const fn f64_to_usize(value: f64) -> usize {
    #[allow(clippy::cast_possible_truncation)]
    #[allow(clippy::cast_sign_loss)]
    let newval = value as usize;
    newval
}

/// Round to the nearest integer and convert. Saturates at the `i32` bounds.
#[must_use]
pub fn f64_to_i32(value: f64) -> i32 {
    #[allow(clippy::cast_possible_truncation)]
    let newval = value.round() as i32;
    newval
}
