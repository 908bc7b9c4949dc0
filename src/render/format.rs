use chrono::NaiveDate;

/// Group thousands and keep between `min_frac` and `max_frac` fraction digits.
///
/// `amount(1234.5, 1, 2)` is `1,234.5`; `amount(1234.0, 1, 2)` is `1,234.0`.
pub fn amount(value: f64, min_frac: usize, max_frac: usize) -> String {
    let fixed = format!("{:.*}", max_frac, value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let mut frac = frac_part.trim_end_matches('0').to_string();
    while frac.len() < min_frac {
        frac.push('0');
    }

    let negative = value < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0');
    let sign = if negative { "-" } else { "" };
    let grouped = group_thousands(int_part);
    if frac.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac}")
    }
}

/// Money as printed on invoices and delivery notes.
pub fn money(value: f64) -> String {
    amount(value, 1, 2)
}

/// Money with exactly two decimals, as printed on statements.
pub fn money2(value: f64) -> String {
    amount(value, 2, 2)
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `31/12/2026`
pub fn date_gb(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// `31/12/26`
pub fn date_gb_short(date: NaiveDate) -> String {
    date.format("%d/%m/%y").to_string()
}

/// Escape text for SVG/HTML element content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
