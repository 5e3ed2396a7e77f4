//! Kubernetes resource quantities (`3Gi`, `500M`, `100m`, `1e3`)

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
#[error("invalid quantity {0:?}")]
pub struct QuantityError(pub String);

const BINARY_SUFFIXES: [(&str, f64); 6] = [
    ("Ki", 1024.0),
    ("Mi", 1_048_576.0),
    ("Gi", 1_073_741_824.0),
    ("Ti", 1_099_511_627_776.0),
    ("Pi", 1_125_899_906_842_624.0),
    ("Ei", 1_152_921_504_606_846_976.0),
];

const DECIMAL_SUFFIXES: [(&str, f64); 9] = [
    ("n", 1e-9),
    ("u", 1e-6),
    ("m", 1e-3),
    ("k", 1e3),
    ("M", 1e6),
    ("G", 1e9),
    ("T", 1e12),
    ("P", 1e15),
    ("E", 1e18),
];

/// Parse a quantity into its value in base units
pub fn parse_quantity(raw: &str) -> Result<f64, QuantityError> {
    let value = raw.trim();
    let invalid = || QuantityError(raw.to_string());

    let (number, multiplier) = BINARY_SUFFIXES
        .iter()
        .chain(DECIMAL_SUFFIXES.iter())
        .find_map(|(suffix, multiplier)| {
            value
                .strip_suffix(suffix)
                .map(|number| (number, *multiplier))
        })
        .unwrap_or((value, 1.0));

    let numeric_start = |c: char| c.is_ascii_digit() || matches!(c, '.' | '+' | '-');
    if number.is_empty() || !number.starts_with(numeric_start) {
        return Err(invalid());
    }

    let number: f64 = number.parse().map_err(|_| invalid())?;
    if !number.is_finite() || number < 0.0 {
        return Err(invalid());
    }

    Ok(number * multiplier)
}
