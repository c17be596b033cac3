//! Number formatting for the terminal panels.

/// Format a price as Indonesian Rupiah, e.g. `Rp 9.075,00`.
pub fn format_idr(value: f64) -> String {
    if !value.is_finite() {
        return "Rp --".to_string();
    }

    let cents = (value.abs() * 100.0).round() as u64;
    let whole = group_thousands(cents / 100);
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };

    format!("{sign}Rp {whole},{:02}", cents % 100)
}

/// Format a share volume in millions with one decimal, e.g. `250.0M`.
pub fn format_millions(value: f64) -> String {
    format!("{:.1}M", value / 1_000_000.0)
}

/// Signed percentage change with a direction arrow, e.g. `▲ +1.25%`.
pub fn format_change(change_percent: f64) -> String {
    let arrow = if change_percent >= 0.0 { "▲" } else { "▼" };
    format!("{arrow} {change_percent:+.2}%")
}

/// Volume ratio label, `--` when the ratio is undefined.
pub fn format_ratio(volume_ratio: Option<f64>) -> String {
    match volume_ratio {
        Some(ratio) if ratio.is_finite() => format!("{ratio:.2}x Avg"),
        _ => "--".to_string(),
    }
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }
    grouped
}
