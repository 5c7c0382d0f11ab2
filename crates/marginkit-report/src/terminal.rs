use colored::{ColoredString, Colorize};
use marginkit_core::*;

use crate::format::*;

// ── helpers ───────────────────────────────────────────────────────────────────

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", kept)
    }
}

fn model_line(preset: Option<&PricingPreset>) -> String {
    match preset {
        Some(p) if p.is_custom() => "custom prices".to_string(),
        Some(p) => format!("{} ({})", p.label, p.id),
        None => "-".to_string(),
    }
}

/// Padded before colouring so escape codes never count toward the width.
fn id_cell(p: &PricingPreset, width: usize) -> ColoredString {
    let padded = format!("{:<width$}", truncate(&p.id, width), width = width);
    if p.is_custom() {
        padded.dimmed()
    } else if p.advanced {
        padded.magenta()
    } else {
        padded.cyan()
    }
}

// ── margin outcome ────────────────────────────────────────────────────────────

/// Render an outcome as the lines printed to the terminal.
pub fn render_outcome(outcome: &Outcome, preset: Option<&PricingPreset>, nf: NumberFormat) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "\n{}\n",
        "── Unit Economics ──────────────────────────────────────────────".bold()
    ));
    out.push_str(&format!("  Model              : {}\n", model_line(preset).cyan()));

    let r = match outcome {
        Outcome::Computed(r) => r,
        Outcome::InsufficientInput { missing } => {
            out.push_str(&format!(
                "\n  {}\n",
                "Enter request volume, token counts and token prices to see results.".yellow()
            ));
            for field in missing {
                out.push_str(&format!("    · missing {} ({})\n", field.description(), field.to_string().dimmed()));
            }
            return out;
        }
    };

    let profit = fmt_usd(r.gross_profit_per_user, nf);
    let profit = if r.gross_profit_per_user < 0.0 {
        profit.red().bold().to_string()
    } else {
        profit.green().bold().to_string()
    };

    let margin = fmt_pct(r.gross_margin, nf);
    let margin = match r.gross_margin {
        Margin::Percent(p) if p < 0.0 => margin.red().to_string(),
        Margin::Percent(_) => margin.green().to_string(),
        Margin::Undefined => format!("{} {}", margin, "(price is zero)".dimmed()),
    };

    let breakeven = fmt_breakeven(r.breakeven, nf);
    let breakeven = match r.breakeven {
        Breakeven::Users(_) => breakeven.yellow().bold().to_string(),
        Breakeven::Unreachable => breakeven.red().to_string(),
    };

    out.push_str(&format!("  API cost / user    : {}\n", fmt_usd(r.api_cost_per_user, nf)));
    out.push_str(&format!("  Var. cost / user   : {}\n", fmt_usd(r.variable_cost_per_user, nf)));
    out.push_str(&format!("  Gross profit / user: {}\n", profit));
    out.push_str(&format!("  Gross margin       : {}\n", margin));
    out.push_str(&format!("  Breakeven          : {}\n", breakeven));
    if let Some(p) = &r.projection {
        out.push_str(&format!("  Total API cost     : {}\n", fmt_projection(p, nf)));
    }
    out
}

pub fn print_outcome(outcome: &Outcome, preset: Option<&PricingPreset>, nf: NumberFormat) {
    println!("{}", render_outcome(outcome, preset, nf));
}

// ── preset list ───────────────────────────────────────────────────────────────

pub fn render_preset_list(presets: &[&PricingPreset], selected: Option<&str>, nf: NumberFormat) -> String {
    if presets.is_empty() {
        return format!("{}\n", "No models available.".yellow());
    }

    let (w_id, w_label, w_in, w_out) = (18, 32, 10, 10);
    let mut out = String::new();
    out.push_str(&format!(
        "  {:<w0$}  {:<w1$}  {:>w2$}  {:>w3$}\n",
        "ID".bold(),
        "MODEL".bold(),
        "IN $/1M".bold(),
        "OUT $/1M".bold(),
        w0 = w_id,
        w1 = w_label,
        w2 = w_in,
        w3 = w_out,
    ));
    out.push_str(&format!("{}\n", "─".repeat(w_id + w_label + w_in + w_out + 8)));

    for p in presets {
        let marker = if selected == Some(p.id.as_str()) { "*" } else { " " };
        out.push_str(&format!(
            "{} {}  {:<w1$}  {:>w2$}  {:>w3$}\n",
            marker,
            id_cell(p, w_id),
            truncate(&p.label, w_label),
            fmt_mtok(p.input_per_mtok, nf),
            fmt_mtok(p.output_per_mtok, nf),
            w1 = w_label,
            w2 = w_in,
            w3 = w_out,
        ));
    }
    out.push_str(&format!("\n{} models\n", presets.len()));
    out
}

pub fn print_preset_list(presets: &[&PricingPreset], selected: Option<&str>, nf: NumberFormat) {
    print!("{}", render_preset_list(presets, selected, nf));
}
