use anyhow::Result;
use marginkit_core::*;

pub fn render_outcome(outcome: &Outcome, preset: Option<&PricingPreset>, inputs: &RawInput) -> Result<String> {
    let doc = serde_json::json!({
        "model": preset,
        "inputs": inputs,
        "result": outcome,
    });
    Ok(serde_json::to_string_pretty(&doc)?)
}

pub fn render_preset_list(presets: &[&PricingPreset]) -> Result<String> {
    let rows: Vec<serde_json::Value> = presets
        .iter()
        .map(|p| {
            serde_json::json!({
                "id": p.id,
                "label": p.label,
                "input_per_mtok": p.input_per_mtok,
                "output_per_mtok": p.output_per_mtok,
                "cost_in_per_token": p.cost_in_per_token(),
                "cost_out_per_token": p.cost_out_per_token(),
                "advanced": p.advanced,
                "custom": p.is_custom(),
            })
        })
        .collect();
    Ok(serde_json::to_string_pretty(&rows)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outcome_document_shape() {
        let catalog = Catalog::builtin();
        let raw = RawInput {
            price: "20".into(),
            requests: "100".into(),
            tokens_in: "500".into(),
            tokens_out: "200".into(),
            cost_in: "0.15".into(),
            cost_out: "0.6".into(),
            fixed_costs: "1000".into(),
            other_variable: "2".into(),
            projected_users: String::new(),
        };
        let text = render_outcome(&evaluate(&raw), catalog.find_preset("gpt-4o-mini"), &raw).unwrap();
        let v: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["model"]["id"], "gpt-4o-mini");
        assert_eq!(v["inputs"]["tokens_in"], "500");
        assert_eq!(v["result"]["outcome"], "computed");
        assert_eq!(v["result"]["breakeven"]["status"], "users");
        assert_eq!(v["result"]["breakeven"]["users"], 56);
        assert!(v["result"]["projection"].is_null());
    }

    #[test]
    fn preset_list_includes_per_token_costs() {
        let catalog = Catalog::builtin();
        let text = render_preset_list(&catalog.list_presets(false)).unwrap();
        let v: serde_json::Value = serde_json::from_str(&text).unwrap();
        let rows = v.as_array().unwrap();
        assert_eq!(rows.len(), 6);
        let custom = rows.iter().find(|r| r["id"] == "custom").unwrap();
        assert!(custom["cost_in_per_token"].is_null());
        assert_eq!(custom["custom"], true);
    }
}
