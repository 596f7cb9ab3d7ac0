/// Parse a source decimal that uses `,` as the fractional separator.
///
/// Blank input is `0`. So is anything that still fails to parse after the
/// separator swap, or that parses to a non-finite value; the dataset is
/// sparse and rows are zero-filled rather than rejected.
pub fn parse_decimal(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed
        .replacen(',', ".", 1)
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comma_and_dot_parse_identically() {
        for (comma, dot) in [
            ("2,6", "2.6"),
            ("-200", "-200"),
            ("0,7578", "0.7578"),
            ("13,6", "13.6"),
            ("1360", "1360"),
            ("-0,5", "-0.5"),
        ] {
            assert_eq!(parse_decimal(comma), parse_decimal(dot), "{comma}");
            assert_eq!(parse_decimal(dot), dot.parse::<f64>().unwrap());
        }
    }

    #[test]
    fn blank_is_zero() {
        assert_eq!(parse_decimal(""), 0.0);
        assert_eq!(parse_decimal("   "), 0.0);
    }

    #[test]
    fn malformed_is_zero() {
        assert_eq!(parse_decimal("abc"), 0.0);
        assert_eq!(parse_decimal("1,2,3"), 0.0);
        assert_eq!(parse_decimal("NaN"), 0.0);
        assert_eq!(parse_decimal("inf"), 0.0);
    }
}
