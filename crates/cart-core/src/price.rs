//! Price display helpers.

/// Format a price the way the storefront shows it, e.g. `R$ 1.279,90`.
pub fn format_price(value: f64) -> String {
    let (negative, whole, cents) = split_cents(value);

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    format!("{sign}R$ {grouped},{cents:02}")
}

/// Format a price with two decimals and no currency, e.g. `1279.90`.
pub fn format_plain(value: f64) -> String {
    let (negative, whole, cents) = split_cents(value);
    let sign = if negative { "-" } else { "" };
    format!("{sign}{whole}.{cents:02}")
}

fn split_cents(value: f64) -> (bool, u64, u64) {
    // Saturating float-to-int cast; NaN becomes zero.
    let cents = (value * 100.0).round() as i64;
    let abs = cents.unsigned_abs();
    (cents < 0, abs / 100, abs % 100)
}
