use serde::{Deserialize, Serialize};

use crate::input::{Field, InsufficientInput, MarginInput, RawInput};

/// Gross margin, undefined when the price is zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "percent", rename_all = "snake_case")]
pub enum Margin {
    Percent(f64),
    Undefined,
}

/// Users needed to recover fixed costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "users", rename_all = "snake_case")]
pub enum Breakeven {
    Users(u64),
    /// Gross profit per user is zero or negative.
    Unreachable,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    pub users: f64,
    pub total_api_cost: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarginResult {
    pub api_cost_per_user: f64,
    pub variable_cost_per_user: f64,
    pub gross_profit_per_user: f64,
    pub gross_margin: Margin,
    pub breakeven: Breakeven,
    pub projection: Option<Projection>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Computed(MarginResult),
    InsufficientInput { missing: Vec<Field> },
}

impl Outcome {
    pub fn result(&self) -> Option<&MarginResult> {
        match self {
            Outcome::Computed(r) => Some(r),
            Outcome::InsufficientInput { .. } => None,
        }
    }
}

impl From<InsufficientInput> for Outcome {
    fn from(e: InsufficientInput) -> Self {
        Outcome::InsufficientInput { missing: e.missing }
    }
}

pub fn api_cost_per_user(
    requests: f64,
    tokens_in: u64,
    tokens_out: u64,
    cost_in_per_token: f64,
    cost_out_per_token: f64,
) -> f64 {
    requests * tokens_in as f64 * cost_in_per_token + requests * tokens_out as f64 * cost_out_per_token
}

pub fn variable_cost_per_user(api_cost: f64, other_variable_cost: f64) -> f64 {
    api_cost + other_variable_cost
}

/// Negative when each user costs more than they pay.
pub fn gross_profit_per_user(price: f64, variable_cost: f64) -> f64 {
    price - variable_cost
}

pub fn gross_margin_pct(gross_profit: f64, price: f64) -> Margin {
    if price == 0.0 {
        return Margin::Undefined;
    }
    Margin::Percent(gross_profit / price * 100.0)
}

/// Smallest user count whose cumulative gross profit covers `fixed_costs`.
pub fn breakeven_users(fixed_costs: f64, gross_profit: f64) -> Breakeven {
    if gross_profit <= 0.0 {
        return Breakeven::Unreachable;
    }
    Breakeven::Users((fixed_costs / gross_profit).ceil() as u64)
}

pub fn total_api_cost_at(users: f64, api_cost_per_user: f64) -> f64 {
    users * api_cost_per_user
}

pub fn compute(input: &MarginInput) -> MarginResult {
    let api_cost = api_cost_per_user(
        input.requests_per_user,
        input.tokens_in_per_request,
        input.tokens_out_per_request,
        input.cost_in_per_token,
        input.cost_out_per_token,
    );
    let variable_cost = variable_cost_per_user(api_cost, input.other_variable_cost_per_user);
    let gross_profit = gross_profit_per_user(input.price_per_user, variable_cost);

    let projection = input
        .projected_users
        .filter(|n| *n > 0.0)
        .map(|users| Projection {
            users,
            total_api_cost: total_api_cost_at(users, api_cost),
        });

    MarginResult {
        api_cost_per_user: api_cost,
        variable_cost_per_user: variable_cost,
        gross_profit_per_user: gross_profit,
        gross_margin: gross_margin_pct(gross_profit, input.price_per_user),
        breakeven: breakeven_users(input.fixed_costs, gross_profit),
        projection,
    }
}

/// Parse raw form text and compute, or report which required fields are missing.
pub fn evaluate(raw: &RawInput) -> Outcome {
    match MarginInput::resolve(raw) {
        Ok(input) => Outcome::Computed(compute(&input)),
        Err(e) => e.into(),
    }
}
