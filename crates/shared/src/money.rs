//! Currency helpers. Amounts travel in major units (reais) except for payment
//! intents, which the processor expects in cents.

/// Formats an amount the way the dashboard shows it: `R$ 1.234,56`.
pub fn format_brl(amount: f64) -> String {
    let cents = to_cents(amount);
    let sign = if cents < 0 { "-" } else { "" };
    let cents = cents.unsigned_abs();
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("R$ {sign}{grouped},{fraction:02}")
}

pub fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}
