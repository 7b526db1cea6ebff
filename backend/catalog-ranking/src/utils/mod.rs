// Utility functions for catalog-ranking

/// `num / den`, or 0.0 when the denominator is zero
pub fn ratio_or_zero(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

/// Arithmetic mean, 0.0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    ratio_or_zero(values.iter().sum(), values.len() as f64)
}

/// Parse a comma separated list of floats, e.g. `"0.1,0.2, 0.3"`
pub fn parse_f64_list(raw: &str) -> Result<Vec<f64>, std::num::ParseFloatError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}
