//! Number formatting for the report renderer.
//!
//! Mirrors the presentation of the original dashboard: day averages with two
//! decimals, currency rounded to whole units with thousands separators.

/// Format a floating-point number with thousands separators and a fixed
/// number of decimal places.
///
/// # Examples
///
/// ```
/// use absentia_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.56, 2), "1,234.56");
/// assert_eq!(format_number(1000000.0, 0), "1,000,000");
/// assert_eq!(format_number(-42.0, 1), "-42.0");
/// ```
pub fn format_number(value: f64, decimals: usize) -> String {
    let negative = value < 0.0;
    let fixed = format!("{:.*}", decimals, value.abs());

    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let grouped = group_thousands(int_part);
    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Format a monetary amount rounded to whole currency units.
///
/// # Examples
///
/// ```
/// use absentia_core::formatting::format_currency;
///
/// assert_eq!(format_currency(2500.0), "$2,500");
/// assert_eq!(format_currency(0.0), "$0");
/// ```
pub fn format_currency(amount: f64) -> String {
    if amount < 0.0 {
        format!("-${}", format_number(amount.abs(), 0))
    } else {
        format!("${}", format_number(amount, 0))
    }
}

/// Insert a comma every three digits, counting from the right.
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    let offset = digits.len() % 3;
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && idx % 3 == offset % 3 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
