use anyhow::{bail, Result};
use clap::Args;
use marginkit_core::{Field, Outcome, PricingForm};
use marginkit_report::{html as html_report, json as jreport, terminal};
use std::path::PathBuf;
use tracing::{debug, warn};

use super::{write_or_print, Context, OutputFormat};

#[derive(Args)]
pub struct CalcArgs {
    /// Model preset ID (see `marginkit models`); `custom` to enter prices
    #[arg(long)]
    pub model: Option<String>,

    /// Allow advanced models
    #[arg(long)]
    pub advanced: bool,

    /// Price charged per user (per month)
    #[arg(long, allow_hyphen_values = true)]
    pub price: Option<String>,

    /// API requests per user (per month)
    #[arg(long, allow_hyphen_values = true)]
    pub requests: Option<String>,

    /// Input tokens per request
    #[arg(long, allow_hyphen_values = true)]
    pub tokens_in: Option<String>,

    /// Output tokens per request
    #[arg(long, allow_hyphen_values = true)]
    pub tokens_out: Option<String>,

    /// Input price in USD per 1M tokens (custom model only)
    #[arg(long, allow_hyphen_values = true)]
    pub cost_in: Option<String>,

    /// Output price in USD per 1M tokens (custom model only)
    #[arg(long, allow_hyphen_values = true)]
    pub cost_out: Option<String>,

    /// Fixed costs to recover (per month)
    #[arg(long, allow_hyphen_values = true)]
    pub fixed_costs: Option<String>,

    /// Other variable cost per user (hosting, support, payments)
    #[arg(long, allow_hyphen_values = true)]
    pub other_variable: Option<String>,

    /// Projected user count for a total API cost figure
    #[arg(long, allow_hyphen_values = true)]
    pub users: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Output file (html defaults to margin-report.html)
    #[arg(long)]
    pub out: Option<PathBuf>,
}

impl CalcArgs {
    fn values(&self) -> [(Field, Option<&str>); 9] {
        [
            (Field::Price, self.price.as_deref()),
            (Field::Requests, self.requests.as_deref()),
            (Field::TokensIn, self.tokens_in.as_deref()),
            (Field::TokensOut, self.tokens_out.as_deref()),
            (Field::CostIn, self.cost_in.as_deref()),
            (Field::CostOut, self.cost_out.as_deref()),
            (Field::FixedCosts, self.fixed_costs.as_deref()),
            (Field::OtherVariable, self.other_variable.as_deref()),
            (Field::ProjectedUsers, self.users.as_deref()),
        ]
    }
}

pub fn run(args: CalcArgs, ctx: &Context) -> Result<()> {
    let mut form = PricingForm::new(&ctx.catalog, &ctx.default_model);
    form.set_show_advanced(args.advanced || ctx.show_advanced);
    if let Some(model) = &args.model {
        form.select(model)?;
    }

    let custom = form.is_custom();
    for (field, value) in args.values() {
        let Some(value) = value else { continue };
        if matches!(field, Field::CostIn | Field::CostOut) && !custom {
            warn!(
                "ignoring --{} {}: prices come from model '{}' (use --model custom)",
                field,
                value,
                form.selected_id().unwrap_or("-")
            );
            continue;
        }
        form.set_field(field, value)?;
    }

    let outcome = form.evaluate();
    debug!(?outcome, model = form.selected_id(), "evaluated");
    let preset = form.selected_preset();

    match args.format {
        OutputFormat::Json => {
            let content = jreport::render_outcome(&outcome, preset, form.fields())?;
            write_or_print(&format!("{}\n", content), args.out.as_deref(), None)?;
        }
        OutputFormat::Html => {
            let content = html_report::render_outcome(&outcome, preset, form.fields(), ctx.nf)?;
            write_or_print(&content, args.out.as_deref(), Some("margin-report.html"))?;
        }
        OutputFormat::Table => {
            terminal::print_outcome(&outcome, preset, ctx.nf);
            if let Outcome::InsufficientInput { missing } = &outcome {
                let names: Vec<String> = missing.iter().map(|f| format!("--{}", flag_name(*f))).collect();
                bail!("insufficient input: missing {}", names.join(", "));
            }
        }
    }
    Ok(())
}

fn flag_name(field: Field) -> String {
    match field {
        Field::ProjectedUsers => "users".to_string(),
        other => other.to_string(),
    }
}
