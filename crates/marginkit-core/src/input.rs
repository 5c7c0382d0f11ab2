use serde::{Deserialize, Serialize};

const TOKENS_PER_MTOK: f64 = 1_000_000.0;

/// Result of parsing one raw form field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Parsed<T> {
    Value(T),
    Missing,
}

impl<T> Parsed<T> {
    pub fn value(self) -> Option<T> {
        match self {
            Parsed::Value(v) => Some(v),
            Parsed::Missing => None,
        }
    }

    pub fn or(self, default: T) -> T {
        self.value().unwrap_or(default)
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Parsed::Missing)
    }
}

/// Longest leading slice that reads as a decimal number: optional sign,
/// digits with an optional fraction, optional exponent. Empty when the
/// text does not start with a number.
fn numeric_prefix(s: &str) -> &str {
    let b = s.as_bytes();
    let digits = |mut i: usize| {
        while i < b.len() && b[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut i = 0;
    if matches!(b.first(), Some(b'+') | Some(b'-')) {
        i = 1;
    }
    let int_end = digits(i);
    let mut end = int_end;
    let mut mantissa_digits = int_end - i;
    if b.get(end) == Some(&b'.') {
        let frac_end = digits(end + 1);
        mantissa_digits += frac_end - end - 1;
        end = frac_end;
    }
    if mantissa_digits == 0 {
        return "";
    }

    if matches!(b.get(end), Some(b'e') | Some(b'E')) {
        let mut j = end + 1;
        if matches!(b.get(j), Some(b'+') | Some(b'-')) {
            j += 1;
        }
        let exp_end = digits(j);
        if exp_end > j {
            end = exp_end;
        }
    }
    &s[..end]
}

/// Parse a non-negative amount from the start of the text, so `20 USD`
/// reads as 20. Thousands separators are ignored and negative values
/// clamp to zero.
pub fn parse_amount(raw: &str) -> Parsed<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',').collect();
    match numeric_prefix(cleaned.trim()).parse::<f64>() {
        Ok(n) if n.is_finite() => Parsed::Value(n.max(0.0)),
        _ => Parsed::Missing,
    }
}

/// Parse a token count: an amount floored to a whole number.
pub fn parse_count(raw: &str) -> Parsed<u64> {
    match parse_amount(raw) {
        Parsed::Value(n) => Parsed::Value(n.floor() as u64),
        Parsed::Missing => Parsed::Missing,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Field {
    Price,
    Requests,
    TokensIn,
    TokensOut,
    CostIn,
    CostOut,
    FixedCosts,
    OtherVariable,
    ProjectedUsers,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::Price,
        Field::Requests,
        Field::TokensIn,
        Field::TokensOut,
        Field::CostIn,
        Field::CostOut,
        Field::FixedCosts,
        Field::OtherVariable,
        Field::ProjectedUsers,
    ];

    /// Fields without which no result is produced.
    pub fn is_core_required(self) -> bool {
        matches!(
            self,
            Field::Requests | Field::TokensIn | Field::TokensOut | Field::CostIn | Field::CostOut
        )
    }

    pub fn is_count(self) -> bool {
        matches!(self, Field::TokensIn | Field::TokensOut)
    }

    pub fn description(self) -> &'static str {
        match self {
            Field::Price => "price per user",
            Field::Requests => "requests per user",
            Field::TokensIn => "input tokens per request",
            Field::TokensOut => "output tokens per request",
            Field::CostIn => "input cost (USD per 1M tokens)",
            Field::CostOut => "output cost (USD per 1M tokens)",
            Field::FixedCosts => "fixed costs",
            Field::OtherVariable => "other variable cost per user",
            Field::ProjectedUsers => "projected users",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Field::Price => "price",
            Field::Requests => "requests",
            Field::TokensIn => "tokens-in",
            Field::TokensOut => "tokens-out",
            Field::CostIn => "cost-in",
            Field::CostOut => "cost-out",
            Field::FixedCosts => "fixed-costs",
            Field::OtherVariable => "other-variable",
            Field::ProjectedUsers => "projected-users",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for Field {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "price" | "price-per-user" => Ok(Field::Price),
            "requests" | "requests-per-user" => Ok(Field::Requests),
            "tokens-in" | "tin" => Ok(Field::TokensIn),
            "tokens-out" | "tout" => Ok(Field::TokensOut),
            "cost-in" | "cin" => Ok(Field::CostIn),
            "cost-out" | "cout" => Ok(Field::CostOut),
            "fixed-costs" | "fixed" => Ok(Field::FixedCosts),
            "other-variable" | "variable" => Ok(Field::OtherVariable),
            "projected-users" | "users" => Ok(Field::ProjectedUsers),
            _ => Err(format!("Unknown field: {}", s)),
        }
    }
}

/// Raw text of every form field, exactly as typed. Empty means blank.
/// Costs are entered in USD per 1M tokens.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawInput {
    pub price: String,
    pub requests: String,
    pub tokens_in: String,
    pub tokens_out: String,
    pub cost_in: String,
    pub cost_out: String,
    pub fixed_costs: String,
    pub other_variable: String,
    pub projected_users: String,
}

impl RawInput {
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Price => &self.price,
            Field::Requests => &self.requests,
            Field::TokensIn => &self.tokens_in,
            Field::TokensOut => &self.tokens_out,
            Field::CostIn => &self.cost_in,
            Field::CostOut => &self.cost_out,
            Field::FixedCosts => &self.fixed_costs,
            Field::OtherVariable => &self.other_variable,
            Field::ProjectedUsers => &self.projected_users,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::Price => &mut self.price,
            Field::Requests => &mut self.requests,
            Field::TokensIn => &mut self.tokens_in,
            Field::TokensOut => &mut self.tokens_out,
            Field::CostIn => &mut self.cost_in,
            Field::CostOut => &mut self.cost_out,
            Field::FixedCosts => &mut self.fixed_costs,
            Field::OtherVariable => &mut self.other_variable,
            Field::ProjectedUsers => &mut self.projected_users,
        };
        *slot = value.into();
    }
}

/// Validated numbers consumed by the engine. Costs are per token.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarginInput {
    pub price_per_user: f64,
    pub requests_per_user: f64,
    pub tokens_in_per_request: u64,
    pub tokens_out_per_request: u64,
    pub cost_in_per_token: f64,
    pub cost_out_per_token: f64,
    pub fixed_costs: f64,
    pub other_variable_cost_per_user: f64,
    pub projected_users: Option<f64>,
}

/// Core-required fields were blank or unparseable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsufficientInput {
    pub missing: Vec<Field>,
}

impl MarginInput {
    /// Apply the required/optional policy to raw form text.
    pub fn resolve(raw: &RawInput) -> Result<Self, InsufficientInput> {
        let requests = parse_amount(&raw.requests);
        let tokens_in = parse_count(&raw.tokens_in);
        let tokens_out = parse_count(&raw.tokens_out);
        let cost_in = parse_amount(&raw.cost_in);
        let cost_out = parse_amount(&raw.cost_out);

        let mut missing = Vec::new();
        if requests.is_missing() {
            missing.push(Field::Requests);
        }
        if tokens_in.is_missing() {
            missing.push(Field::TokensIn);
        }
        if tokens_out.is_missing() {
            missing.push(Field::TokensOut);
        }
        if cost_in.is_missing() {
            missing.push(Field::CostIn);
        }
        if cost_out.is_missing() {
            missing.push(Field::CostOut);
        }

        match (
            requests.value(),
            tokens_in.value(),
            tokens_out.value(),
            cost_in.value(),
            cost_out.value(),
        ) {
            (Some(r), Some(tin), Some(tout), Some(cin), Some(cout)) => Ok(MarginInput {
                price_per_user: parse_amount(&raw.price).or(0.0),
                requests_per_user: r,
                tokens_in_per_request: tin,
                tokens_out_per_request: tout,
                cost_in_per_token: cin / TOKENS_PER_MTOK,
                cost_out_per_token: cout / TOKENS_PER_MTOK,
                fixed_costs: parse_amount(&raw.fixed_costs).or(0.0),
                other_variable_cost_per_user: parse_amount(&raw.other_variable).or(0.0),
                projected_users: parse_amount(&raw.projected_users).value(),
            }),
            _ => Err(InsufficientInput { missing }),
        }
    }
}
