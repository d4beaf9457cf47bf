/// Insert thousands separators into the integer part of a non-negative
/// decimal string: "1234567.89" -> "1,234,567.89".
fn group_thousands(digits: &str) -> String {
    let (int_part, dec_part) = digits.split_once('.').unwrap_or((digits, ""));

    let mut with_commas = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            with_commas.push(',');
        }
        with_commas.push(c);
    }
    let with_commas: String = with_commas.chars().rev().collect();

    if dec_part.is_empty() {
        with_commas
    } else {
        format!("{with_commas}.{dec_part}")
    }
}

/// Format an amount with thousands separators, two decimals and a currency
/// suffix: `1,234.56 USD`.
pub fn money(val: f64, suffix: &str) -> String {
    let negative = val < 0.0;
    let grouped = group_thousands(&format!("{:.2}", val.abs()));
    let sign = if negative { "-" } else { "" };
    if suffix.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped} {suffix}")
    }
}

/// Two fixed decimals, no grouping: `6.97`.
pub fn fixed2(val: f64) -> String {
    format!("{val:.2}")
}

/// Integer with thousands separators.
pub fn number(n: usize) -> String {
    group_thousands(&n.to_string())
}

/// Share as a percentage with one decimal: `0.1234` -> `12.3%`.
pub fn percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}
