//! Форматирование для рынков KRW (правила ko-KR).

/// `50000.0` → `₩50,000`. Rounds half away from zero, no fraction digits.
pub fn format_price(price: f64) -> String {
    if !price.is_finite() {
        return "₩-".to_string();
    }
    let rounded = price.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{}₩{}", sign, group_thousands(rounded.abs() as u64))
}

/// Upbit change rate is a fraction: `0.0123` → `+1.23%`.
pub fn format_change_rate(rate: f64) -> String {
    let sign = if rate >= 0.0 { "+" } else { "" };
    format!("{}{:.2}%", sign, rate * 100.0)
}

/// Trade value in 억 (10^8 KRW): `12_345_678_900.0` → `123.46억원`.
pub fn format_trade_price(price: f64) -> String {
    format!("{:.2}억원", price / 100_000_000.0)
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
