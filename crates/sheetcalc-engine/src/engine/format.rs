/// Format a number the way formulas and values are shown to users.
///
/// Finite values use the shortest text that round-trips (`22`, `1.5`, `0.1`).
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n == f64::INFINITY {
        "Infinity".to_string()
    } else if n == f64::NEG_INFINITY {
        "-Infinity".to_string()
    } else {
        format!("{}", n)
    }
}

#[cfg(test)]
mod tests {
    use super::format_number;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(22.0), "22");
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(format_number(-0.25), "-0.25");
        assert_eq!(format_number(1.0 / 0.0), "Infinity");
        assert_eq!(format_number(f64::NAN), "NaN");
    }
}
