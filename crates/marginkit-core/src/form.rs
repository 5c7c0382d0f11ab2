//! Pricing form state: which preset is selected, what the user typed, and
//! the one-slot memory of the last manually entered custom prices.
//!
//! The engine stays stateless; everything that survives between
//! recomputations lives here and is owned by the caller.

use thiserror::Error;

use crate::catalog::{choose_selection, Catalog, PricingPreset, CUSTOM_PRESET_ID};
use crate::engine::{evaluate, Outcome};
use crate::input::{Field, RawInput};

#[derive(Debug, Error, PartialEq)]
pub enum FormError {
    #[error("Unknown model: {0}")]
    UnknownPreset(String),

    #[error("'{0}' is an advanced model; enable advanced models to select it")]
    HiddenPreset(String),

    #[error("{field} is set by the '{preset}' model; select 'custom' to enter prices manually")]
    PricedByPreset { field: Field, preset: String },
}

/// Last custom input/output prices, as typed (USD per 1M tokens).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomCosts {
    pub cost_in: String,
    pub cost_out: String,
}

#[derive(Debug, Clone)]
pub struct PricingForm<'c> {
    catalog: &'c Catalog,
    default_id: String,
    show_advanced: bool,
    selected: Option<String>,
    /// Set once `select` succeeds; until then the default id wins on repopulate.
    chosen: bool,
    /// Preset whose prices are currently in the cost fields.
    applied: Option<String>,
    last_custom: CustomCosts,
    fields: RawInput,
}

impl<'c> PricingForm<'c> {
    pub fn new(catalog: &'c Catalog, default_id: &str) -> Self {
        let mut form = Self {
            catalog,
            default_id: default_id.to_string(),
            show_advanced: false,
            selected: None,
            chosen: false,
            applied: None,
            last_custom: CustomCosts::default(),
            fields: RawInput::default(),
        };
        form.repopulate();
        form.apply_selection();
        form
    }

    pub fn visible_presets(&self) -> Vec<&'c PricingPreset> {
        let catalog = self.catalog;
        catalog.list_presets(self.show_advanced)
    }

    pub fn show_advanced(&self) -> bool {
        self.show_advanced
    }

    pub fn set_show_advanced(&mut self, show: bool) {
        self.show_advanced = show;
        self.repopulate();
        self.apply_selection();
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected_preset(&self) -> Option<&'c PricingPreset> {
        let catalog = self.catalog;
        self.selected.as_deref().and_then(|id| catalog.find_preset(id))
    }

    /// Manual price entry is only open when no priced preset is active.
    pub fn is_custom(&self) -> bool {
        self.selected_preset().map_or(true, |p| p.is_custom())
    }

    pub fn select(&mut self, id: &str) -> Result<&'c PricingPreset, FormError> {
        let catalog = self.catalog;
        let preset = catalog
            .find_preset(id)
            .ok_or_else(|| FormError::UnknownPreset(id.to_string()))?;
        if preset.advanced && !self.show_advanced {
            return Err(FormError::HiddenPreset(id.to_string()));
        }
        self.selected = Some(preset.id.clone());
        self.chosen = true;
        self.apply_selection();
        Ok(preset)
    }

    pub fn field(&self, field: Field) -> &str {
        self.fields.get(field)
    }

    pub fn fields(&self) -> &RawInput {
        &self.fields
    }

    pub fn last_custom(&self) -> &CustomCosts {
        &self.last_custom
    }

    pub fn set_field(&mut self, field: Field, value: &str) -> Result<(), FormError> {
        if matches!(field, Field::CostIn | Field::CostOut) && !self.is_custom() {
            return Err(FormError::PricedByPreset {
                field,
                preset: self.selected.clone().unwrap_or_default(),
            });
        }
        self.fields.set(field, value);
        Ok(())
    }

    pub fn clear_field(&mut self, field: Field) -> Result<(), FormError> {
        self.set_field(field, "")
    }

    pub fn evaluate(&self) -> Outcome {
        evaluate(&self.fields)
    }

    fn repopulate(&mut self) {
        let visible = self.visible_presets();
        let previous = if self.chosen { self.selected.as_deref() } else { None };
        self.selected = choose_selection(&visible, previous, &self.default_id).map(|p| p.id.clone());
    }

    fn apply_selection(&mut self) {
        if self.applied.as_deref() == Some(CUSTOM_PRESET_ID) {
            // blank fields keep the previous memory
            if !self.fields.cost_in.is_empty() {
                self.last_custom.cost_in = self.fields.cost_in.clone();
            }
            if !self.fields.cost_out.is_empty() {
                self.last_custom.cost_out = self.fields.cost_out.clone();
            }
        }

        match self.selected_preset() {
            Some(p) if !p.is_custom() => {
                self.fields.cost_in = p.input_per_mtok.map(|v| v.to_string()).unwrap_or_default();
                self.fields.cost_out = p.output_per_mtok.map(|v| v.to_string()).unwrap_or_default();
            }
            _ => {
                self.fields.cost_in = self.last_custom.cost_in.clone();
                self.fields.cost_out = self.last_custom.cost_out.clone();
            }
        }

        self.applied = self.selected.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DEFAULT_PRESET_ID;
    use crate::engine::Breakeven;

    fn fill_usage(form: &mut PricingForm<'_>) {
        form.set_field(Field::Price, "20").unwrap();
        form.set_field(Field::Requests, "100").unwrap();
        form.set_field(Field::TokensIn, "500").unwrap();
        form.set_field(Field::TokensOut, "200").unwrap();
        form.set_field(Field::FixedCosts, "1000").unwrap();
        form.set_field(Field::OtherVariable, "2").unwrap();
    }

    #[test]
    fn starts_on_default_preset_with_its_prices() {
        let catalog = Catalog::builtin();
        let form = PricingForm::new(&catalog, DEFAULT_PRESET_ID);
        assert_eq!(form.selected_id(), Some("gpt-4o-mini"));
        assert_eq!(form.field(Field::CostIn), "0.15");
        assert_eq!(form.field(Field::CostOut), "0.6");
        assert!(!form.show_advanced());
    }

    #[test]
    fn default_preset_yields_scenario_a() {
        let catalog = Catalog::builtin();
        let mut form = PricingForm::new(&catalog, DEFAULT_PRESET_ID);
        fill_usage(&mut form);
        let outcome = form.evaluate();
        let r = outcome.result().unwrap();
        assert!((r.api_cost_per_user - 0.0195).abs() < 1e-9);
        assert_eq!(r.breakeven, Breakeven::Users(56));
    }

    #[test]
    fn custom_prices_survive_a_round_trip() {
        let catalog = Catalog::builtin();
        let mut form = PricingForm::new(&catalog, DEFAULT_PRESET_ID);

        form.select(CUSTOM_PRESET_ID).unwrap();
        assert_eq!(form.field(Field::CostIn), "");
        form.set_field(Field::CostIn, "5").unwrap();
        form.set_field(Field::CostOut, "10").unwrap();

        form.select("gpt-4o").unwrap();
        assert_eq!(form.field(Field::CostIn), "2.5");
        assert_eq!(form.field(Field::CostOut), "10");

        form.select(CUSTOM_PRESET_ID).unwrap();
        assert_eq!(form.field(Field::CostIn), "5");
        assert_eq!(form.field(Field::CostOut), "10");
    }

    #[test]
    fn blank_custom_field_keeps_previous_memory() {
        let catalog = Catalog::builtin();
        let mut form = PricingForm::new(&catalog, DEFAULT_PRESET_ID);

        form.select(CUSTOM_PRESET_ID).unwrap();
        form.set_field(Field::CostIn, "5").unwrap();
        form.set_field(Field::CostOut, "10").unwrap();
        form.select("gpt-4o").unwrap();

        form.select(CUSTOM_PRESET_ID).unwrap();
        form.clear_field(Field::CostIn).unwrap();
        form.set_field(Field::CostOut, "12").unwrap();
        form.select("gpt-4o").unwrap();

        assert_eq!(
            form.last_custom(),
            &CustomCosts {
                cost_in: "5".to_string(),
                cost_out: "12".to_string(),
            }
        );
    }

    #[test]
    fn cost_fields_locked_while_priced_preset_active() {
        let catalog = Catalog::builtin();
        let mut form = PricingForm::new(&catalog, DEFAULT_PRESET_ID);
        let err = form.set_field(Field::CostIn, "9").unwrap_err();
        assert_eq!(
            err,
            FormError::PricedByPreset {
                field: Field::CostIn,
                preset: "gpt-4o-mini".to_string(),
            }
        );
        assert_eq!(form.field(Field::CostIn), "0.15");
    }

    #[test]
    fn advanced_presets_need_the_toggle() {
        let catalog = Catalog::builtin();
        let mut form = PricingForm::new(&catalog, DEFAULT_PRESET_ID);
        assert_eq!(form.select("o1").unwrap_err(), FormError::HiddenPreset("o1".to_string()));
        assert_eq!(
            form.select("gpt-9").unwrap_err(),
            FormError::UnknownPreset("gpt-9".to_string())
        );

        form.set_show_advanced(true);
        assert_eq!(form.visible_presets().len(), catalog.len());
        form.select("o1").unwrap();
        assert_eq!(form.field(Field::CostOut), "60");
    }

    #[test]
    fn hiding_advanced_reselects_default() {
        let catalog = Catalog::builtin();
        let mut form = PricingForm::new(&catalog, DEFAULT_PRESET_ID);
        form.set_show_advanced(true);
        form.select("claude-opus-4").unwrap();

        form.set_show_advanced(false);
        assert_eq!(form.selected_id(), Some(DEFAULT_PRESET_ID));
        assert_eq!(form.field(Field::CostIn), "0.15");
    }

    #[test]
    fn toggling_advanced_keeps_visible_selection() {
        let catalog = Catalog::builtin();
        let mut form = PricingForm::new(&catalog, DEFAULT_PRESET_ID);
        form.select("claude-sonnet-4").unwrap();
        form.set_show_advanced(true);
        assert_eq!(form.selected_id(), Some("claude-sonnet-4"));
        form.set_show_advanced(false);
        assert_eq!(form.selected_id(), Some("claude-sonnet-4"));
    }

    #[test]
    fn toggling_advanced_while_custom_keeps_typed_prices() {
        let catalog = Catalog::builtin();
        let mut form = PricingForm::new(&catalog, DEFAULT_PRESET_ID);
        form.select(CUSTOM_PRESET_ID).unwrap();
        form.set_field(Field::CostIn, "1.5").unwrap();
        form.set_field(Field::CostOut, "4").unwrap();

        form.set_show_advanced(true);
        assert_eq!(form.selected_id(), Some(CUSTOM_PRESET_ID));
        assert_eq!(form.field(Field::CostIn), "1.5");
        assert_eq!(form.field(Field::CostOut), "4");
    }

    #[test]
    fn advanced_default_applies_once_visible() {
        let catalog = Catalog::builtin();
        let mut form = PricingForm::new(&catalog, "o1");
        assert_eq!(form.selected_id(), Some("gpt-4o"));

        form.set_show_advanced(true);
        assert_eq!(form.selected_id(), Some("o1"));
        assert_eq!(form.field(Field::CostIn), "15");
        assert_eq!(form.field(Field::CostOut), "60");
    }

    #[test]
    fn explicit_choice_outranks_default_on_toggle() {
        let catalog = Catalog::builtin();
        let mut form = PricingForm::new(&catalog, "o1");
        form.select("claude-sonnet-4").unwrap();
        form.set_show_advanced(true);
        assert_eq!(form.selected_id(), Some("claude-sonnet-4"));
    }

    #[test]
    fn unknown_default_falls_back_to_first_priced() {
        let catalog = Catalog::builtin();
        let form = PricingForm::new(&catalog, "not-a-model");
        assert_eq!(form.selected_id(), Some("gpt-4o"));
    }

    #[test]
    fn custom_without_prices_is_insufficient() {
        let catalog = Catalog::builtin();
        let mut form = PricingForm::new(&catalog, DEFAULT_PRESET_ID);
        fill_usage(&mut form);
        form.select(CUSTOM_PRESET_ID).unwrap();
        assert_eq!(
            form.evaluate(),
            Outcome::InsufficientInput {
                missing: vec![Field::CostIn, Field::CostOut]
            }
        );
    }
}
