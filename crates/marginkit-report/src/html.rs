use anyhow::Result;
use marginkit_core::*;

use crate::format::*;

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn kpi(label: &str, value: &str, class: &str) -> String {
    format!(
        r#"<div class="kpi"><div class="label">{}</div><div class="value {}">{}</div></div>"#,
        label,
        class,
        escape(value)
    )
}

fn render_inputs(inputs: &RawInput) -> String {
    Field::ALL
        .iter()
        .map(|f| {
            let raw = inputs.get(*f);
            format!(
                "<tr><td>{}</td><td>{}</td></tr>",
                f.description(),
                if raw.trim().is_empty() { "-".to_string() } else { escape(raw) }
            )
        })
        .collect()
}

fn render_body(outcome: &Outcome, nf: NumberFormat) -> String {
    let r = match outcome {
        Outcome::Computed(r) => r,
        Outcome::InsufficientInput { missing } => {
            let items: String = missing
                .iter()
                .map(|f| format!("<li>{}</li>", f.description()))
                .collect();
            return format!(
                r#"<div class="section"><div class="section-header">Insufficient input</div>
    <div class="empty">Enter request volume, token counts and token prices to see results.<ul>{}</ul></div></div>"#,
                items
            );
        }
    };

    let profit_class = if r.gross_profit_per_user < 0.0 { "red" } else { "green" };
    let margin_class = match r.gross_margin {
        Margin::Percent(p) if p < 0.0 => "red",
        Margin::Percent(_) => "green",
        Margin::Undefined => "muted",
    };
    let breakeven_class = match r.breakeven {
        Breakeven::Users(_) => "yellow",
        Breakeven::Unreachable => "red",
    };

    let mut cards = vec![
        kpi("API cost / user", &fmt_usd(r.api_cost_per_user, nf), "cyan"),
        kpi("Variable cost / user", &fmt_usd(r.variable_cost_per_user, nf), ""),
        kpi("Gross profit / user", &fmt_usd(r.gross_profit_per_user, nf), profit_class),
        kpi("Gross margin", &fmt_pct(r.gross_margin, nf), margin_class),
        kpi("Breakeven", &fmt_breakeven(r.breakeven, nf), breakeven_class),
    ];
    if let Some(p) = &r.projection {
        cards.push(kpi("Total API cost", &fmt_projection(p, nf), ""));
    }
    format!(r#"<div class="kpi-grid">{}</div>"#, cards.join("\n    "))
}

pub fn render_outcome(
    outcome: &Outcome,
    preset: Option<&PricingPreset>,
    inputs: &RawInput,
    nf: NumberFormat,
) -> Result<String> {
    let model = match preset {
        Some(p) if p.is_custom() => "custom prices".to_string(),
        Some(p) => escape(&p.label),
        None => "-".to_string(),
    };

    Ok(format!(r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>marginkit — {model}</title>
<style>
  :root {{
    --bg: #0f1117; --surface: #1a1d27; --border: #2a2d3a;
    --text: #e2e8f0; --muted: #64748b; --accent: #7c6af7;
    --green: #4ade80; --yellow: #facc15; --red: #f87171;
    --cyan: #22d3ee;
    font-family: 'JetBrains Mono', 'Fira Code', monospace;
  }}
  * {{ box-sizing: border-box; margin: 0; padding: 0; }}
  body {{ background: var(--bg); color: var(--text); min-height: 100vh; }}
  .header {{ background: var(--surface); border-bottom: 1px solid var(--border);
    padding: 1.5rem 2rem; display: flex; align-items: center; gap: 1rem; }}
  .header h1 {{ font-size: 1.25rem; font-weight: 700; color: var(--accent); }}
  .header .badge {{ background: var(--border); padding: 0.2rem 0.6rem;
    border-radius: 4px; font-size: 0.75rem; color: var(--cyan); }}
  .container {{ max-width: 1100px; margin: 0 auto; padding: 2rem; }}
  .kpi-grid {{ display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr));
    gap: 1rem; margin-bottom: 2rem; }}
  .kpi {{ background: var(--surface); border: 1px solid var(--border);
    border-radius: 8px; padding: 1.25rem; }}
  .kpi .label {{ font-size: 0.7rem; text-transform: uppercase; letter-spacing: 0.1em;
    color: var(--muted); margin-bottom: 0.4rem; }}
  .kpi .value {{ font-size: 1.35rem; font-weight: 700; }}
  .value.green {{ color: var(--green); }}
  .value.yellow {{ color: var(--yellow); }}
  .value.red {{ color: var(--red); }}
  .value.cyan {{ color: var(--cyan); }}
  .value.muted {{ color: var(--muted); }}
  .section {{ background: var(--surface); border: 1px solid var(--border);
    border-radius: 8px; margin-bottom: 1.5rem; overflow: hidden; }}
  .section-header {{ padding: 0.875rem 1.25rem; border-bottom: 1px solid var(--border);
    font-size: 0.8rem; font-weight: 600; text-transform: uppercase;
    letter-spacing: 0.08em; color: var(--muted); }}
  .empty {{ padding: 1.25rem; color: var(--yellow); font-size: 0.9rem; }}
  .empty ul {{ margin-top: 0.5rem; padding-left: 1.25rem; color: var(--muted); }}
  table {{ width: 100%; border-collapse: collapse; }}
  td {{ padding: 0.45rem 1.25rem; border-bottom: 1px solid var(--border); font-size: 0.85rem; }}
  tr:last-child td {{ border-bottom: none; }}
  tr td:first-child {{ color: var(--muted); width: 260px; }}
  footer {{ text-align: center; padding: 2rem; color: var(--muted); font-size: 0.75rem; }}
</style>
</head>
<body>
<div class="header">
  <h1>marginkit</h1>
  <span class="badge">{model}</span>
</div>
<div class="container">

  {body}

  <div class="section">
    <div class="section-header">Inputs</div>
    <table>{inputs_html}</table>
  </div>

</div>
<footer>Generated by marginkit · {timestamp}</footer>
</body>
</html>
"#,
        model = model,
        body = render_body(outcome, nf),
        inputs_html = render_inputs(inputs),
        timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M UTC"),
    ))
}
