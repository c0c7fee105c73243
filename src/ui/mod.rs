pub mod charts;
pub mod panels;
pub mod tables;

/// Format a number with `,` thousands separators and fixed decimals.
pub fn format_thousands(value: f64, decimals: usize) -> String {
    let text = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && text.chars().any(|c| c != '0' && c != '.') {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

/// KPI text for an optional mean; undefined means show "no data".
pub fn format_optional(value: Option<f64>, render: impl Fn(f64) -> String) -> String {
    value.map_or_else(|| "no data".to_string(), render)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0.0, 0, "0")]
    #[case(270.0, 0, "270")]
    #[case(1234.0, 0, "1,234")]
    #[case(1234567.891, 2, "1,234,567.89")]
    #[case(-98765.4, 1, "-98,765.4")]
    #[case(999.999, 2, "1,000.00")]
    fn groups_thousands(#[case] value: f64, #[case] decimals: usize, #[case] expected: &str) {
        assert_eq!(format_thousands(value, decimals), expected);
    }

    #[test]
    fn undefined_means_say_no_data() {
        assert_eq!(format_optional(None, |v| format!("{v:.2}")), "no data");
        assert_eq!(format_optional(Some(2.5), |v| format!("{v:.2}")), "2.50");
    }
}
