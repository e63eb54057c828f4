// filters.rs
// Custom askama filters available to all templates.

/// Thousands-grouped money display; decimals only when the value has
/// cents (matching the locale formatting the UI used before).
pub fn money(value: &f64, _: &dyn askama::Values) -> askama::Result<String> {
    Ok(format_money(*value))
}

pub fn format_money(value: f64) -> String {
    let negative = value < 0.0;
    let cents = (value.abs() * 100.0).round() as i64;
    let whole = cents / 100;
    let frac = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let mut out = if frac == 0 {
        grouped
    } else {
        format!("{}.{:02}", grouped, frac)
    };
    if negative {
        out.insert(0, '-');
    }
    out
}
