use marginkit_core::{Breakeven, Margin, Projection};
use thiserror::Error;

/// Shown where a margin cannot be computed (zero price).
pub const UNDEFINED_PLACEHOLDER: &str = "—";
pub const UNREACHABLE_MESSAGE: &str = "Not reachable with current pricing";

#[derive(Debug, Error, PartialEq)]
pub enum LocaleError {
    #[error("Unsupported locale: {0} (expected en, zh, de, fr or ru)")]
    Unsupported(String),
}

/// Separators used when displaying numbers. Never affects computed values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberFormat {
    group_sep: char,
    decimal_sep: char,
}

impl Default for NumberFormat {
    fn default() -> Self {
        NumberFormat {
            group_sep: ',',
            decimal_sep: '.',
        }
    }
}

impl NumberFormat {
    pub fn from_locale(locale: Option<&str>) -> Result<Self, LocaleError> {
        let Some(raw) = locale else {
            return Ok(NumberFormat::default());
        };
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(NumberFormat::default());
        }
        let base = trimmed
            .split(['-', '_'])
            .next()
            .unwrap_or(trimmed)
            .to_ascii_lowercase();

        match base.as_str() {
            "en" | "zh" => Ok(NumberFormat::default()),
            "de" => Ok(NumberFormat {
                group_sep: '.',
                decimal_sep: ',',
            }),
            "fr" | "ru" => Ok(NumberFormat {
                group_sep: ' ',
                decimal_sep: ',',
            }),
            _ => Err(LocaleError::Unsupported(trimmed.to_string())),
        }
    }

    fn group(&self, digits: &str) -> String {
        let mut out = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, c) in digits.chars().rev().enumerate() {
            if i > 0 && i % 3 == 0 {
                out.push(self.group_sep);
            }
            out.push(c);
        }
        out.chars().rev().collect()
    }

    /// Non-negative value with a fixed number of decimals, integer part grouped.
    fn fixed(&self, value: f64, decimals: usize) -> String {
        let s = format!("{:.*}", decimals, value);
        match s.split_once('.') {
            Some((int, frac)) => format!("{}{}{}", self.group(int), self.decimal_sep, frac),
            None => self.group(&s),
        }
    }
}

/// Currency with precision adapted to magnitude: per-user API costs are
/// often fractions of a cent.
pub fn fmt_usd(n: f64, nf: NumberFormat) -> String {
    if !n.is_finite() {
        return UNDEFINED_PLACEHOLDER.to_string();
    }
    let abs = n.abs();
    let decimals = if abs > 0.0 && abs < 0.001 {
        6
    } else if abs < 1.0 {
        4
    } else {
        2
    };
    let body = nf.fixed(abs, decimals);
    if n < 0.0 && body.chars().any(|c| c.is_ascii_digit() && c != '0') {
        format!("-${}", body)
    } else {
        format!("${}", body)
    }
}

pub fn fmt_pct(margin: Margin, nf: NumberFormat) -> String {
    match margin {
        Margin::Percent(p) if p.is_finite() => {
            let body = nf.fixed(p.abs(), 1);
            let sign = if p < 0.0 && body.chars().any(|c| c.is_ascii_digit() && c != '0') {
                "-"
            } else {
                ""
            };
            format!("{}{}%", sign, body)
        }
        _ => UNDEFINED_PLACEHOLDER.to_string(),
    }
}

pub fn fmt_count(n: u64, nf: NumberFormat) -> String {
    nf.group(&n.to_string())
}

/// User counts typed by hand may be fractional; display rounds.
pub fn fmt_users(n: f64, nf: NumberFormat) -> String {
    nf.fixed(n.max(0.0).round(), 0)
}

pub fn fmt_breakeven(breakeven: Breakeven, nf: NumberFormat) -> String {
    match breakeven {
        Breakeven::Users(1) => "1 user".to_string(),
        Breakeven::Users(n) => format!("{} users", fmt_count(n, nf)),
        Breakeven::Unreachable => UNREACHABLE_MESSAGE.to_string(),
    }
}

pub fn fmt_projection(projection: &Projection, nf: NumberFormat) -> String {
    format!(
        "{} / mo at {} users",
        fmt_usd(projection.total_api_cost, nf),
        fmt_users(projection.users, nf)
    )
}

/// Provider price per 1M tokens, as listed in the catalog.
pub fn fmt_mtok(price: Option<f64>, nf: NumberFormat) -> String {
    match price {
        Some(p) => format!("${}", nf.fixed(p, if p < 0.1 { 3 } else { 2 })),
        None => "-".to_string(),
    }
}
