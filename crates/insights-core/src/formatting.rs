/// Format a floating-point number with thousands separators and a fixed number
/// of decimal places.
///
/// # Examples
///
/// ```
/// use insights_core::formatting::format_number;
///
/// assert_eq!(format_number(1234.5,  1), "1,234.5");
/// assert_eq!(format_number(1234567.0, 0), "1,234,567");
/// assert_eq!(format_number(0.0, 2), "0.00");
/// assert_eq!(format_number(-9876.5, 1), "-9,876.5");
/// ```
pub fn format_number(value: f64, decimals: u32) -> String {
    let scale = 10_u64.pow(decimals);
    let scaled = value.abs() * scale as f64;
    // Relative nudge so values printed as exact midpoints round away from zero.
    let units = (scaled + scaled * f64::EPSILON).round() as u64;

    let mut out = String::new();
    if value < 0.0 && units != 0 {
        out.push('-');
    }
    out.push_str(&group_thousands(units / scale));
    if decimals > 0 {
        out.push('.');
        out.push_str(&format!("{:0width$}", units % scale, width = decimals as usize));
    }
    out
}

/// Like [`format_number`] but always carries a sign: `"+1.5"`, `"-0.8"`,
/// `"0.0"` for zero.
///
/// ```
/// use insights_core::formatting::format_signed;
///
/// assert_eq!(format_signed(1.25, 1), "+1.3");
/// assert_eq!(format_signed(-1200.0, 0), "-1,200");
/// assert_eq!(format_signed(0.0, 1), "0.0");
/// ```
pub fn format_signed(value: f64, decimals: u32) -> String {
    let body = format_number(value, decimals);
    if body.starts_with('-') || value == 0.0 || body.chars().all(|c| c == '0' || c == '.') {
        body
    } else {
        format!("+{}", body)
    }
}

/// Render a weight compactly: at most one decimal, no trailing `.0`.
///
/// ```
/// use insights_core::formatting::format_weight;
///
/// assert_eq!(format_weight(140.0), "140");
/// assert_eq!(format_weight(62.5), "62.5");
/// assert_eq!(format_weight(61.234), "61.2");
/// ```
pub fn format_weight(weight: f64) -> String {
    let rounded = (weight * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{:.1}", rounded)
    }
}

/// A value followed by its unit, e.g. `"81.6 kg"`. An empty unit is omitted.
pub fn format_with_unit(value: f64, decimals: u32, unit: &str) -> String {
    if unit.is_empty() {
        format_number(value, decimals)
    } else {
        format!("{} {}", format_number(value, decimals), unit)
    }
}

/// Relative-day phrase used next to dates: `"today"`, `"yesterday"`,
/// `"N days ago"`, or `"in N days"` for future dates.
pub fn format_days_ago(days: i64) -> String {
    match days {
        0 => "today".to_string(),
        1 => "yesterday".to_string(),
        d if d < 0 => format!("in {} days", -d),
        d => format!("{} days ago", d),
    }
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Digits of `n` with a comma between each group of three.
fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let lead = match digits.len() % 3 {
        0 => 3,
        r => r,
    };
    let mut out = String::from(&digits[..lead.min(digits.len())]);
    for chunk in digits.as_bytes()[lead.min(digits.len())..].chunks(3) {
        out.push(',');
        out.extend(chunk.iter().map(|&b| b as char));
    }
    out
}

// ── Tests ──────────────────────────────────────────────────────────────────────
