/// Placeholder shown for a statistic that has no contributing data.
pub const NOT_AVAILABLE: &str = "N/A";

/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// # Examples
///
/// ```
/// use liftlog_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5,  1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    // Group on the absolute value; the sign is re-attached at the end.
    let negative = value < 0.0;
    let abs_value = value.abs();

    // Nudge by a tiny epsilon so exact binary midpoints round up.
    let factor = 10_f64.powi(decimals as i32);
    let epsilon = f64::EPSILON * abs_value * factor;
    let rounded = ((abs_value * factor) + epsilon).round() / factor;

    let integer_part = rounded.trunc() as u64;
    let frac_part = rounded - rounded.trunc();

    let grouped = group_thousands(&integer_part.to_string());

    let result = if decimals == 0 {
        grouped
    } else {
        let frac_str = format!("{:.prec$}", frac_part, prec = decimals as usize);
        // `frac_str` is "0.50"; keep ".50".
        format!("{}{}", grouped, &frac_str[1..])
    };

    if negative && rounded != 0.0 {
        format!("-{}", result)
    } else {
        result
    }
}

/// Round `value` to `decimals` places.
///
/// ```
/// use liftlog_core::formatting::round_to;
///
/// assert_eq!(round_to(5.2 + 3.1, 2), 8.3);
/// assert_eq!(round_to(1049.6, 0), 1050.0);
/// ```
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10_f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Percent change from `previous` to `current`.
///
/// Returns `None` unless both values are positive; zero is the
/// "no data" sentinel for monthly averages, so a change against it is
/// meaningless.
///
/// ```
/// use liftlog_core::formatting::percent_change;
///
/// assert_eq!(percent_change(12.0, 10.0), Some(20.0));
/// assert_eq!(percent_change(12.0, 0.0), None);
/// assert_eq!(percent_change(0.0, 10.0), None);
/// ```
pub fn percent_change(current: f64, previous: f64) -> Option<f64> {
    if current > 0.0 && previous > 0.0 {
        Some((current - previous) / previous * 100.0)
    } else {
        None
    }
}

/// Format an average, or [`NOT_AVAILABLE`] when it is zero.
///
/// ```
/// use liftlog_core::formatting::format_average;
///
/// assert_eq!(format_average(11.25, 1), "11.3");
/// assert_eq!(format_average(0.0, 1), "N/A");
/// ```
pub fn format_average(value: f64, decimals: u32) -> String {
    if value > 0.0 {
        format_number(value, decimals)
    } else {
        NOT_AVAILABLE.to_string()
    }
}

/// Format a month-over-month change as `"+12.5% vs last month"`.
///
/// ```
/// use liftlog_core::formatting::format_change;
///
/// assert_eq!(format_change(Some(12.46)), "+12.5% vs last month");
/// assert_eq!(format_change(Some(-3.0)), "-3.0% vs last month");
/// assert_eq!(format_change(None), "");
/// ```
pub fn format_change(change: Option<f64>) -> String {
    match change {
        Some(pct) => {
            let sign = if pct > 0.0 { "+" } else { "" };
            format!("{}{:.1}% vs last month", sign, pct)
        }
        None => String::new(),
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────
