//! Physical size strings ("2.3cm", "na") to pixel measurements.

/// Marker the archive uses for items without a recorded size.
pub const NO_DIMENSION: &str = "na";

/// True when `raw` carries no usable size: absent, blank, or `"na"`.
pub fn is_unknown(raw: Option<&str>) -> bool {
    match raw.map(str::trim) {
        None => true,
        Some(s) => s.is_empty() || s.eq_ignore_ascii_case(NO_DIMENSION),
    }
}

/// Convert a size such as `"2.3cm"` into pixels at `scale` pixels per unit.
///
/// Unknown sizes and anything that does not parse yield `fallback` unscaled.
/// Only the numeric literal is used; the unit suffix is stripped, not
/// converted. Zero and negative values pass through.
pub fn parse_dimension(raw: Option<&str>, fallback: f64, scale: f64) -> f64 {
    if is_unknown(raw) {
        return fallback;
    }
    let s = raw.unwrap_or_default().trim();
    let numeric = s.trim_end_matches(|c: char| c.is_alphabetic()).trim_end();
    match numeric.parse::<f64>() {
        Ok(v) if v.is_finite() => v * scale,
        _ => fallback,
    }
}
