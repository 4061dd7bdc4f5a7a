//! Number rounding and label/tooltip text.
//!
//! [`round`] works on the shortest decimal representation of the value, so ties that are not
//! exactly representable in binary (`3.455`) still round away from zero.

use crate::globals::{self, GlobalOptions};
use num_format::{CustomFormat, Grouping, Locale, ToFormattedString};

/// A value to round: either a number or numeric text.
#[derive(Debug, Clone, PartialEq)]
pub enum Numeric {
    Number(f64),
    Text(String),
}

impl From<f64> for Numeric {
    fn from(v: f64) -> Self {
        Numeric::Number(v)
    }
}

impl From<i64> for Numeric {
    fn from(v: i64) -> Self {
        Numeric::Number(v as f64)
    }
}

impl From<i32> for Numeric {
    fn from(v: i32) -> Self {
        Numeric::Number(v as f64)
    }
}

impl From<&str> for Numeric {
    fn from(s: &str) -> Self {
        Numeric::Text(s.to_string())
    }
}

impl From<String> for Numeric {
    fn from(s: String) -> Self {
        Numeric::Text(s)
    }
}

impl Numeric {
    fn to_f64(&self) -> f64 {
        match self {
            Numeric::Number(v) => *v,
            Numeric::Text(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
        }
    }
}

/// Round `value` to `decimal_places` fractional digits, ties away from zero.
///
/// Negative places round to tens, hundreds, ...; fractional places are truncated toward zero.
/// Text that is not a number yields `NaN`; non-finite values come back unchanged.
pub fn round(value: impl Into<Numeric>, decimal_places: f64) -> f64 {
    let v = value.into().to_f64();
    if !v.is_finite() {
        return v;
    }
    if decimal_places.is_nan() {
        return f64::NAN;
    }
    let places = decimal_places.trunc().clamp(-400.0, 400.0) as i64;
    let r = round_magnitude(v.abs(), places);
    if r == 0.0 {
        0.0
    } else if v.is_sign_negative() {
        -r
    } else {
        r
    }
}

/// Decimal-string rounding of a non-negative finite value.
fn round_magnitude(v: f64, places: i64) -> f64 {
    // f64 Display yields the shortest round-tripping decimal, never exponent notation.
    let repr = format!("{v}");
    let (int_part, frac_part) = repr.split_once('.').unwrap_or((repr.as_str(), ""));
    let mut digits: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes())
        .map(|b| b - b'0')
        .collect();
    let mut point = int_part.len();

    let keep = point as i64 + places;
    if keep < 0 {
        return 0.0;
    }
    let keep = keep as usize;
    if keep >= digits.len() {
        return v;
    }

    let round_up = digits[keep] >= 5;
    digits.truncate(keep);
    if round_up {
        let mut i = digits.len();
        loop {
            if i == 0 {
                digits.insert(0, 1);
                point += 1;
                break;
            }
            i -= 1;
            if digits[i] == 9 {
                digits[i] = 0;
            } else {
                digits[i] += 1;
                break;
            }
        }
    }

    let mut text = String::with_capacity(point + digits.len() + 2);
    if digits.len() <= point {
        text.extend(digits.iter().map(|d| char::from(b'0' + d)));
        text.extend(std::iter::repeat_n('0', point - digits.len()));
    } else {
        text.extend(digits[..point].iter().map(|d| char::from(b'0' + d)));
        text.push('.');
        text.extend(digits[point..].iter().map(|d| char::from(b'0' + d)));
    }
    if text.is_empty() || text.starts_with('.') {
        text.insert(0, '0');
    }
    text.parse::<f64>().unwrap_or(0.0)
}

/// Render `value` with `decimals` fixed fraction digits and grouped thousands.
pub fn format_number(value: f64, decimals: usize, opts: &GlobalOptions) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rounded = round(value, decimals as f64);
    let fixed = format!("{:.*}", decimals, rounded.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let grouped = match int_part.parse::<u128>() {
        Ok(n) => group_thousands(n, opts.thousands_sep),
        Err(_) => int_part.to_string(),
    };

    let mut out = String::new();
    if rounded < 0.0 {
        out.push('-');
    }
    out.push_str(&grouped);
    if !frac_part.is_empty() {
        out.push(opts.decimal_point);
        out.push_str(frac_part);
    }
    out
}

fn group_thousands(n: u128, sep: char) -> String {
    match CustomFormat::builder()
        .grouping(Grouping::Standard)
        .separator(sep.to_string())
        .build()
    {
        Ok(fmt) => n.to_formatted_string(&fmt),
        Err(_) => n.to_formatted_string(&Locale::en),
    }
}

/// Whole-number value plus unit suffix, as shown in tooltips and data labels. Gaps render empty.
pub fn format_value(y: Option<f64>, suffix: &str) -> String {
    match y {
        Some(v) => format!("{}{}", format_number(v, 0, &globals::options()), suffix),
        None => String::new(),
    }
}

/// Text of a visible data label.
pub fn data_label_html(color: &str, y: Option<f64>, suffix: &str) -> String {
    format!(
        r#"<span style="color: {color}">{}</span>"#,
        format_value(y, suffix)
    )
}

/// One series' entry in a shared tooltip.
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipRow {
    pub series_name: String,
    pub y: Option<f64>,
    pub color: String,
}

/// Series names are shown without their parenthesised qualifier.
pub fn short_series_name(name: &str) -> &str {
    name.split(" (").next().unwrap_or(name)
}

fn visible_rows(rows: &[TooltipRow]) -> impl Iterator<Item = &TooltipRow> {
    rows.iter().filter(|r| !r.series_name.is_empty() && r.y.is_some())
}

/// Shared tooltip markup for one category.
pub fn tooltip_html(category: &str, rows: &[TooltipRow], suffix: &str) -> String {
    let body: String = visible_rows(rows)
        .map(|r| {
            let name = short_series_name(&r.series_name);
            let label = if name.is_empty() {
                String::new()
            } else {
                format!("{name}: ")
            };
            format!(
                r#"<div><span class="tooltip_label" style="color: {}">{label}</span><span class="tooltip_value">{}</span></div>"#,
                r.color,
                format_value(r.y, suffix)
            )
        })
        .collect();
    format!(
        r#"<div class="tooltip_container"><h3 class="tooltip_header">{category}</h3>{body}</div>"#
    )
}

/// Plain-text variant of [`tooltip_html`] for surfaces without markup.
pub fn tooltip_text(category: &str, rows: &[TooltipRow], suffix: &str) -> String {
    let mut lines = vec![category.to_string()];
    lines.extend(visible_rows(rows).map(|r| {
        format!(
            "{}: {}",
            short_series_name(&r.series_name),
            format_value(r.y, suffix)
        )
    }));
    lines.join("\n")
}

/// Primary x-axis tick text: first word of the category (`"Q1 2018"` -> `"Q1"`).
pub fn category_label(label: &str) -> &str {
    label.split_whitespace().next().unwrap_or("")
}

/// Y-axis tick text, or `None` when decimals are not allowed and the tick is fractional.
pub fn axis_label(value: f64, suffix: &str, allow_decimals: bool) -> Option<String> {
    let whole = (value - value.round()).abs() < 1e-9;
    if !allow_decimals && !whole {
        return None;
    }
    let text = if whole {
        format_number(value.round(), 0, &globals::options())
    } else {
        let s = format!("{:.2}", round(value, 2.0));
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    };
    Some(format!("{text}{suffix}"))
}
