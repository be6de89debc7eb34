//! Display formatting for large numbers, percentages and ratios.

/// Formats a number with a `B`/`M`/`K` suffix and two decimals.
///
/// ```
/// use ticker_analytics::format::format_with_suffix;
///
/// assert_eq!(format_with_suffix(1_234_000_000.0, "$"), "$1.23B");
/// assert_eq!(format_with_suffix(85_000_000.0, ""), "85.00M");
/// assert_eq!(format_with_suffix(999.0, ""), "999.00");
/// ```
#[must_use]
pub fn format_with_suffix(value: f64, prefix: &str) -> String {
    let (scaled, suffix) = if value >= 1e9 {
        (value / 1e9, "B")
    } else if value >= 1e6 {
        (value / 1e6, "M")
    } else if value >= 1e3 {
        (value / 1e3, "K")
    } else {
        (value, "")
    };
    format!("{prefix}{scaled:.2}{suffix}")
}

/// Parses a formatted display value back to a number.
///
/// Strips `$`, `,`, `%` and a trailing `x`, and expands `B`/`M`/`K` suffixes in
/// either case. Returns `None` for `"N/A"` and anything else that is not a
/// number.
#[must_use]
pub fn parse_suffixed(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '%'))
        .collect();
    let cleaned = cleaned.trim_end_matches(['x', 'X']);

    let (number, multiplier) = match cleaned.chars().last()? {
        'B' | 'b' => (&cleaned[..cleaned.len() - 1], 1e9),
        'M' | 'm' => (&cleaned[..cleaned.len() - 1], 1e6),
        'K' | 'k' => (&cleaned[..cleaned.len() - 1], 1e3),
        _ => (cleaned, 1.0),
    };

    number
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v * multiplier)
}

/// Formats a percentage sent as a fraction (`0.153` -> `"15.30%"`).
///
/// Values of 1.0 or more are assumed to be whole percents already.
#[must_use]
pub fn format_percent(value: f64) -> String {
    let scaled = if value < 1.0 { value * 100.0 } else { value };
    format!("{scaled:.2}%")
}

/// Formats a percentage sent as a whole percent (`15` -> `"15.00%"`).
#[must_use]
pub fn format_whole_percent(value: f64) -> String {
    format!("{value:.2}%")
}

/// Formats a number with two decimals.
#[must_use]
pub fn format_decimal(value: f64) -> String {
    format!("{value:.2}")
}

/// Formats a rounded number with `,` thousands separators.
#[must_use]
pub fn format_thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}

/// Formats a change with an explicit sign (`1.5` -> `"+1.50"`).
#[must_use]
pub fn format_signed(value: f64) -> String {
    format!("{value:+.2}")
}

/// Formats a whole-percent change with an explicit sign (`-3.1` -> `"-3.10%"`).
#[must_use]
pub fn format_signed_percent(value: f64) -> String {
    format!("{value:+.2}%")
}

/// Formats a share volume with a `M`/`K` suffix; below a thousand it stays whole.
///
/// ```
/// use ticker_analytics::format::format_volume;
///
/// assert_eq!(format_volume(12_345_678), "12.35M");
/// assert_eq!(format_volume(950), "950");
/// ```
#[must_use]
pub fn format_volume(volume: u64) -> String {
    let value = volume as f64;
    if volume >= 1_000_000 {
        format!("{:.2}M", value / 1e6)
    } else if volume >= 1_000 {
        format!("{:.2}K", value / 1e3)
    } else {
        volume.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_with_suffix() {
        assert_eq!(format_with_suffix(1_234_000_000.0, "$"), "$1.23B");
        assert_eq!(format_with_suffix(2_500_000.0, "$"), "$2.50M");
        assert_eq!(format_with_suffix(1_000.0, ""), "1.00K");
        assert_eq!(format_with_suffix(12.345, ""), "12.35");
        assert_eq!(format_with_suffix(-5_000_000.0, ""), "-5000000.00");
    }

    #[test]
    fn test_parse_suffixed() {
        assert_eq!(parse_suffixed("$1.23B"), Some(1.23e9));
        assert_eq!(parse_suffixed("85.00m"), Some(85e6));
        assert_eq!(parse_suffixed("1,234"), Some(1234.0));
        assert_eq!(parse_suffixed("15.00%"), Some(15.0));
        assert_eq!(parse_suffixed("1.15x"), Some(1.15));
        assert_eq!(parse_suffixed("2k"), Some(2000.0));
        assert_eq!(parse_suffixed("N/A"), None);
        assert_eq!(parse_suffixed(""), None);
    }

    #[test]
    fn test_suffix_round_trip() {
        let formatted = format_with_suffix(1_234_000_000.0, "$");
        assert_eq!(parse_suffixed(&formatted), Some(1.23e9));
    }

    #[test]
    fn test_percentages() {
        assert_eq!(format_percent(0.153), "15.30%");
        assert_eq!(format_percent(-0.02), "-2.00%");
        assert_eq!(format_percent(12.0), "12.00%");
        assert_eq!(format_whole_percent(15.0), "15.00%");
        assert_eq!(format_whole_percent(0.5), "0.50%");
    }

    #[test]
    fn test_signed_changes() {
        assert_eq!(format_signed(1.5), "+1.50");
        assert_eq!(format_signed(-0.123), "-0.12");
        assert_eq!(format_signed(0.0), "+0.00");
        assert_eq!(format_signed_percent(12.3456), "+12.35%");
        assert_eq!(format_signed_percent(-3.1), "-3.10%");
    }

    #[test]
    fn test_format_volume() {
        assert_eq!(format_volume(2_500_000_000), "2500.00M");
        assert_eq!(format_volume(1_000_000), "1.00M");
        assert_eq!(format_volume(45_600), "45.60K");
        assert_eq!(format_volume(999), "999");
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(5_500_000.0), "5,500,000");
        assert_eq!(format_thousands(4_799_999.6), "4,800,000");
        assert_eq!(format_thousands(999.0), "999");
        assert_eq!(format_thousands(0.0), "0");
        assert_eq!(format_thousands(-1234.0), "-1,234");
    }
}
