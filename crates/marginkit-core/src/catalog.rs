/// Model pricing catalog (USD per 1M tokens, as published by each provider).
/// DeepSeek input prices use the cache-miss rate so cost is never understated.
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CUSTOM_PRESET_ID: &str = "custom";
pub const DEFAULT_PRESET_ID: &str = "gpt-4o-mini";

const TOKENS_PER_MTOK: f64 = 1_000_000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingPreset {
    pub id: String,
    pub label: String,
    /// `None` only for the custom entry.
    pub input_per_mtok: Option<f64>,
    pub output_per_mtok: Option<f64>,
    #[serde(default)]
    pub advanced: bool,
}

impl PricingPreset {
    pub fn new(id: &str, label: &str, input_per_mtok: f64, output_per_mtok: f64, advanced: bool) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            input_per_mtok: Some(input_per_mtok),
            output_per_mtok: Some(output_per_mtok),
            advanced,
        }
    }

    pub fn custom() -> Self {
        Self {
            id: CUSTOM_PRESET_ID.to_string(),
            label: "Custom (enter manually)".to_string(),
            input_per_mtok: None,
            output_per_mtok: None,
            advanced: false,
        }
    }

    pub fn is_custom(&self) -> bool {
        self.id == CUSTOM_PRESET_ID
    }

    pub fn cost_in_per_token(&self) -> Option<f64> {
        self.input_per_mtok.map(|p| p / TOKENS_PER_MTOK)
    }

    pub fn cost_out_per_token(&self) -> Option<f64> {
        self.output_per_mtok.map(|p| p / TOKENS_PER_MTOK)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum CatalogError {
    #[error("preset with empty id")]
    EmptyId,

    #[error("duplicate preset id '{0}'")]
    DuplicateId(String),

    #[error("catalog must contain exactly one 'custom' preset, found {0}")]
    CustomCount(usize),

    #[error("the 'custom' preset must not carry prices")]
    PricedCustom,

    #[error("preset '{0}' is missing an input or output price")]
    MissingPrice(String),

    #[error("preset '{id}' has invalid price {value} (must be a finite number >= 0)")]
    InvalidPrice { id: String, value: f64 },
}

/// Ordered, read-only list of pricing presets.
#[derive(Debug, Clone)]
pub struct Catalog {
    presets: Vec<PricingPreset>,
}

impl Catalog {
    pub fn new(presets: Vec<PricingPreset>) -> Result<Self, CatalogError> {
        validate(&presets)?;
        Ok(Self { presets })
    }

    /// The built-in provider price table.
    pub fn builtin() -> Self {
        Self {
            presets: builtin_presets(),
        }
    }

    /// Append deployment-supplied presets after the built-in ones.
    pub fn with_extra(self, extra: Vec<PricingPreset>) -> Result<Self, CatalogError> {
        let mut presets = self.presets;
        presets.extend(extra);
        Self::new(presets)
    }

    pub fn list_presets(&self, include_advanced: bool) -> Vec<&PricingPreset> {
        self.presets
            .iter()
            .filter(|p| include_advanced || !p.advanced)
            .collect()
    }

    pub fn find_preset(&self, id: &str) -> Option<&PricingPreset> {
        self.presets.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Pick the preset to show after the visible list changes.
///
/// Keeps `previous` when it is still listed, otherwise falls back to
/// `default_id`, then to the first priced preset.
pub fn choose_selection<'a>(
    visible: &[&'a PricingPreset],
    previous: Option<&str>,
    default_id: &str,
) -> Option<&'a PricingPreset> {
    if let Some(prev) = previous {
        if let Some(p) = visible.iter().find(|p| p.id == prev) {
            return Some(*p);
        }
    }
    visible
        .iter()
        .find(|p| p.id == default_id)
        .or_else(|| visible.iter().find(|p| !p.is_custom()))
        .copied()
}

fn validate(presets: &[PricingPreset]) -> Result<(), CatalogError> {
    let mut seen = std::collections::HashSet::new();
    let mut custom_count = 0usize;

    for p in presets {
        if p.id.trim().is_empty() {
            return Err(CatalogError::EmptyId);
        }
        if !seen.insert(p.id.as_str()) {
            return Err(CatalogError::DuplicateId(p.id.clone()));
        }
        if p.is_custom() {
            custom_count += 1;
            if p.input_per_mtok.is_some() || p.output_per_mtok.is_some() {
                return Err(CatalogError::PricedCustom);
            }
            continue;
        }
        match (p.input_per_mtok, p.output_per_mtok) {
            (Some(input), Some(output)) => {
                for value in [input, output] {
                    if !value.is_finite() || value < 0.0 {
                        return Err(CatalogError::InvalidPrice {
                            id: p.id.clone(),
                            value,
                        });
                    }
                }
            }
            _ => return Err(CatalogError::MissingPrice(p.id.clone())),
        }
    }

    if custom_count != 1 {
        return Err(CatalogError::CustomCount(custom_count));
    }
    Ok(())
}

fn builtin_presets() -> Vec<PricingPreset> {
    let m = PricingPreset::new;
    vec![
        // Common models
        m("gpt-4o", "GPT-4o", 2.50, 10.00, false),
        m("gpt-4o-mini", "GPT-4o mini", 0.15, 0.60, false),
        m("claude-sonnet-4", "Claude Sonnet 4", 3.00, 15.00, false),
        m("gemini-1.5-flash", "Gemini 1.5 Flash", 0.075, 0.30, false),
        m("llama-3.1-70b", "Llama 3.1 70B (hosted)", 0.52, 0.75, false),
        PricingPreset::custom(),
        // OpenAI
        m("o1", "o1 (advanced reasoning)", 15.00, 60.00, true),
        m("o1-mini", "o1-mini (advanced reasoning)", 3.00, 12.00, true),
        m("o3-mini", "o3-mini (advanced reasoning)", 1.10, 4.40, true),
        // Anthropic
        m("claude-opus-4", "Claude Opus 4", 15.00, 75.00, true),
        m("claude-haiku-4", "Claude Haiku 4", 0.80, 4.00, true),
        // Google
        m("gemini-1.5-pro", "Gemini 1.5 Pro", 1.25, 5.00, true),
        m("gemini-2.0-flash", "Gemini 2.0 Flash (early)", 0.10, 0.40, true),
        // Meta (hosted)
        m("llama-3.1-405b", "Llama 3.1 405B (hosted)", 3.00, 3.00, true),
        // Mistral
        m("mistral-large", "Mistral Large 2", 2.00, 6.00, true),
        // DeepSeek
        m("deepseek-chat", "DeepSeek V3 (deepseek-chat)", 0.27, 1.10, true),
        m("deepseek-reasoner", "DeepSeek R1 (deepseek-reasoner)", 0.55, 2.19, true),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(list: &[&PricingPreset]) -> Vec<String> {
        list.iter().map(|p| p.id.clone()).collect()
    }

    #[test]
    fn builtin_catalog_is_valid() {
        let catalog = Catalog::builtin();
        assert!(validate(&catalog.presets).is_ok());
        assert_eq!(catalog.len(), 17);
    }

    #[test]
    fn list_hides_advanced_by_default() {
        let catalog = Catalog::builtin();
        let basic = catalog.list_presets(false);
        assert_eq!(
            ids(&basic),
            vec!["gpt-4o", "gpt-4o-mini", "claude-sonnet-4", "gemini-1.5-flash", "llama-3.1-70b", "custom"]
        );
        assert!(basic.iter().all(|p| !p.advanced));
    }

    #[test]
    fn list_with_advanced_keeps_insertion_order() {
        let catalog = Catalog::builtin();
        let all = catalog.list_presets(true);
        assert_eq!(all.len(), catalog.len());
        let custom_pos = all.iter().position(|p| p.is_custom()).unwrap();
        assert_eq!(custom_pos, 5);
        assert_eq!(all[6].id, "o1");
        assert_eq!(all.last().unwrap().id, "deepseek-reasoner");
    }

    #[test]
    fn find_preset_converts_to_per_token() {
        let catalog = Catalog::builtin();
        let mini = catalog.find_preset("gpt-4o-mini").unwrap();
        assert!((mini.cost_in_per_token().unwrap() - 0.15e-6).abs() < 1e-18);
        assert!((mini.cost_out_per_token().unwrap() - 0.60e-6).abs() < 1e-18);

        let custom = catalog.find_preset(CUSTOM_PRESET_ID).unwrap();
        assert_eq!(custom.cost_in_per_token(), None);
        assert_eq!(custom.cost_out_per_token(), None);

        assert!(catalog.find_preset("gpt-9").is_none());
    }

    #[test]
    fn choose_selection_keeps_previous_when_visible() {
        let catalog = Catalog::builtin();
        let visible = catalog.list_presets(false);
        let chosen = choose_selection(&visible, Some("gpt-4o"), DEFAULT_PRESET_ID);
        assert_eq!(chosen.map(|p| p.id.as_str()), Some("gpt-4o"));
    }

    #[test]
    fn choose_selection_falls_back_to_default() {
        let catalog = Catalog::builtin();
        let visible = catalog.list_presets(false);
        // o1 is advanced and therefore not in the basic list
        let chosen = choose_selection(&visible, Some("o1"), DEFAULT_PRESET_ID);
        assert_eq!(chosen.map(|p| p.id.as_str()), Some(DEFAULT_PRESET_ID));
    }

    #[test]
    fn choose_selection_falls_back_to_first_priced() {
        let catalog = Catalog::new(vec![
            PricingPreset::custom(),
            PricingPreset::new("a", "A", 1.0, 2.0, false),
            PricingPreset::new("b", "B", 1.0, 2.0, false),
        ])
        .unwrap();
        let visible = catalog.list_presets(false);
        let chosen = choose_selection(&visible, None, DEFAULT_PRESET_ID);
        assert_eq!(chosen.map(|p| p.id.as_str()), Some("a"));
    }

    #[test]
    fn choose_selection_empty_or_custom_only() {
        assert!(choose_selection(&[], None, DEFAULT_PRESET_ID).is_none());

        let custom = PricingPreset::custom();
        assert!(choose_selection(&[&custom], None, DEFAULT_PRESET_ID).is_none());
        // an explicit previous custom selection is preserved
        let kept = choose_selection(&[&custom], Some(CUSTOM_PRESET_ID), DEFAULT_PRESET_ID);
        assert_eq!(kept.map(|p| p.id.as_str()), Some(CUSTOM_PRESET_ID));
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = Catalog::builtin()
            .with_extra(vec![PricingPreset::new("gpt-4o", "dup", 1.0, 1.0, false)])
            .unwrap_err();
        assert_eq!(err, CatalogError::DuplicateId("gpt-4o".to_string()));
    }

    #[test]
    fn rejects_missing_or_priced_custom() {
        let err = Catalog::new(vec![PricingPreset::new("a", "A", 1.0, 1.0, false)]).unwrap_err();
        assert_eq!(err, CatalogError::CustomCount(0));

        let mut priced = PricingPreset::custom();
        priced.input_per_mtok = Some(1.0);
        assert_eq!(Catalog::new(vec![priced]).unwrap_err(), CatalogError::PricedCustom);
    }

    #[test]
    fn rejects_negative_and_missing_prices() {
        let err = Catalog::new(vec![
            PricingPreset::custom(),
            PricingPreset::new("neg", "Neg", -1.0, 1.0, false),
        ])
        .unwrap_err();
        assert!(matches!(err, CatalogError::InvalidPrice { ref id, .. } if id == "neg"));

        let mut half = PricingPreset::new("half", "Half", 1.0, 1.0, false);
        half.output_per_mtok = None;
        let err = Catalog::new(vec![PricingPreset::custom(), half]).unwrap_err();
        assert_eq!(err, CatalogError::MissingPrice("half".to_string()));
    }

    #[test]
    fn with_extra_appends_after_builtin() {
        let catalog = Catalog::builtin()
            .with_extra(vec![PricingPreset::new("in-house", "In-house 8B", 0.05, 0.05, false)])
            .unwrap();
        let basic = catalog.list_presets(false);
        assert_eq!(basic.last().unwrap().id, "in-house");
        assert!(catalog.find_preset("in-house").is_some());
    }
}
