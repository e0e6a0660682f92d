use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("`{input}` is not a valid amount")]
pub struct AmountParseError {
    pub input: String,
}

/// Formats an amount as dollars with thousands separators, e.g. `$1,234.56`.
/// Negative amounts keep the sign after the currency symbol (`$-5.00`).
pub fn format_money(amount: f64) -> String {
    if !amount.is_finite() {
        return format!("${amount}");
    }

    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let rounds_to_zero = fixed.bytes().all(|b| matches!(b, b'0' | b'.'));
    let sign = if amount < 0.0 && !rounds_to_zero { "-" } else { "" };
    format!("${sign}{grouped}.{cents}")
}

/// Parses user-entered amounts such as `"$1,000.50"`. Blank input is zero.
pub fn parse_amount(text: &str) -> Result<f64, AmountParseError> {
    let cleaned: String = text.chars().filter(|c| !matches!(c, '$' | ',')).collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Ok(0.0);
    }

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| AmountParseError {
            input: text.to_string(),
        })
}
