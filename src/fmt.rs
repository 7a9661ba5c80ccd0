/// Format a float as a dollar amount with thousands separators: $1,234.56
pub fn money(val: f64) -> String {
    let cents = format!("{:.2}", val.abs());
    let (whole, frac) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if val < 0.0 { "-" } else { "" };
    format!("{sign}${grouped}.{frac}")
}

pub fn tag_list(tags: Option<&[String]>) -> String {
    tags.map(|t| t.join(", ")).unwrap_or_default()
}

/// Rule amount range as shown in listings, e.g. "100 – 500" or "– 20".
pub fn amount_range(min: Option<f64>, max: Option<f64>) -> String {
    if min.is_none() && max.is_none() {
        return String::new();
    }
    let side = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
    format!("{} \u{2013} {}", side(min), side(max)).trim().to_string()
}
