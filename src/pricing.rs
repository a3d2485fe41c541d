//! Price computation behind the calculator form.
//!
//! The form hands over whatever the user typed as a [`CalculationInput`]
//! map; a [`PriceFormula`] turns it into a [`Quote`]. The bundled
//! [`RateCardFormula`] prices Auto mode from a material rate card and
//! Manual mode from an entered unit price. Any other formula can be
//! injected into the UI through the trait.

use crate::config::{
    MAX_DIMENSION_CM, MAX_DISCOUNT_PCT, MAX_QUANTITY, MAX_UNIT_PRICE, MIN_DIMENSION_CM,
    MIN_QUANTITY,
};
use crate::error::PriceError;
use crate::utils::{round_amount, validate_count, validate_numeric_input};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Well-known input keys.
pub mod fields {
    pub const WIDTH: &str = "width";
    pub const HEIGHT: &str = "height";
    pub const QUANTITY: &str = "quantity";
    pub const MATERIAL: &str = "material";
    pub const UNIT_PRICE: &str = "unit_price";
    pub const DISCOUNT: &str = "discount";
}

const CM2_PER_M2: f64 = 10_000.0;

/// Which formula/input set is active.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Auto,
    Manual,
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Mode::Auto),
            "manual" => Ok(Mode::Manual),
            other => Err(format!("unknown mode '{other}'")),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Auto => f.write_str("auto"),
            Mode::Manual => f.write_str("manual"),
        }
    }
}

/// Raw form values keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CalculationInput(BTreeMap<String, String>);

impl CalculationInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.0.insert(key.to_string(), value.to_string());
    }

    /// The value for `key`, or `""` when the field was never touched.
    pub fn get(&self, key: &str) -> &str {
        self.0.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn is_blank(&self, key: &str) -> bool {
        self.get(key).trim().is_empty()
    }
}

/// Result of a price computation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub unit_price: f64,
    pub quantity: u32,
    pub setup_fee: f64,
    pub subtotal: f64,
    pub discount: f64,
    pub total: f64,
}

/// A pure pricing function `(inputs, mode) -> quote`.
pub trait PriceFormula {
    fn compute(&self, inputs: &CalculationInput, mode: Mode) -> Result<Quote, PriceError>;
}

/// One row of the rate card.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Material {
    pub id: String,
    pub name_en: String,
    pub name_ar: String,
    pub rate_per_m2: f64,
    pub min_area_m2: f64,
    pub setup_fee: f64,
}

/// Per-material rates, in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct RateCard {
    materials: Vec<Material>,
}

impl RateCard {
    /// Parse a rate card from CSV with a header row.
    pub fn from_csv(csv_content: &str) -> Result<Self, PriceError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(csv_content.as_bytes());

        let mut materials = Vec::new();
        for (i, row) in reader.deserialize::<Material>().enumerate() {
            let material =
                row.map_err(|e| PriceError::RateCard(format!("row {}: {}", i + 1, e)))?;
            if material.rate_per_m2 < 0.0 || material.min_area_m2 < 0.0 || material.setup_fee < 0.0 {
                return Err(PriceError::RateCard(format!(
                    "row {}: negative rate for '{}'",
                    i + 1,
                    material.id
                )));
            }
            if materials.iter().any(|m: &Material| m.id == material.id) {
                return Err(PriceError::RateCard(format!(
                    "row {}: duplicate material '{}'",
                    i + 1,
                    material.id
                )));
            }
            materials.push(material);
        }

        if materials.is_empty() {
            return Err(PriceError::RateCard("no materials defined".to_string()));
        }
        debug!("Loaded {} materials from rate card", materials.len());
        Ok(Self { materials })
    }

    /// The rate card compiled into the binary.
    pub fn bundled() -> Result<Self, PriceError> {
        Self::from_csv(include_str!("rates.csv"))
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn get(&self, id: &str) -> Option<&Material> {
        self.materials.iter().find(|m| m.id == id)
    }

    /// The material preselected in the form.
    pub fn default_material(&self) -> &Material {
        // from_csv guarantees at least one row
        &self.materials[0]
    }
}

/// Default formula.
///
/// - Auto: `max(width * height, min_area) * rate` per piece, times quantity,
///   plus the material's one-off setup fee.
/// - Manual: entered unit price times quantity.
///
/// Both apply an optional percentage discount to the subtotal.
#[derive(Debug, Clone, PartialEq)]
pub struct RateCardFormula {
    rates: RateCard,
}

impl RateCardFormula {
    pub fn new(rates: RateCard) -> Self {
        Self { rates }
    }

    pub fn bundled() -> Result<Self, PriceError> {
        RateCard::bundled().map(Self::new)
    }

    pub fn rates(&self) -> &RateCard {
        &self.rates
    }

    fn auto_unit(&self, inputs: &CalculationInput) -> Result<(f64, f64), PriceError> {
        let width = validate_numeric_input(
            inputs.get(fields::WIDTH),
            MIN_DIMENSION_CM,
            MAX_DIMENSION_CM,
            fields::WIDTH,
        )?;
        let height = validate_numeric_input(
            inputs.get(fields::HEIGHT),
            MIN_DIMENSION_CM,
            MAX_DIMENSION_CM,
            fields::HEIGHT,
        )?;

        let material = if inputs.is_blank(fields::MATERIAL) {
            self.rates.default_material()
        } else {
            let id = inputs.get(fields::MATERIAL).trim();
            self.rates
                .get(id)
                .ok_or_else(|| PriceError::UnknownMaterial(id.to_string()))?
        };

        let area = width * height / CM2_PER_M2;
        let billable = area.max(material.min_area_m2);
        Ok((round_amount(billable * material.rate_per_m2), material.setup_fee))
    }

    fn manual_unit(&self, inputs: &CalculationInput) -> Result<f64, PriceError> {
        validate_numeric_input(
            inputs.get(fields::UNIT_PRICE),
            0.0,
            MAX_UNIT_PRICE,
            fields::UNIT_PRICE,
        )
    }
}

impl PriceFormula for RateCardFormula {
    fn compute(&self, inputs: &CalculationInput, mode: Mode) -> Result<Quote, PriceError> {
        let (unit_price, setup_fee) = match mode {
            Mode::Auto => self.auto_unit(inputs)?,
            Mode::Manual => (self.manual_unit(inputs)?, 0.0),
        };
        let quantity = validate_count(
            inputs.get(fields::QUANTITY),
            MIN_QUANTITY,
            MAX_QUANTITY,
            fields::QUANTITY,
        )?;
        let discount_pct = if inputs.is_blank(fields::DISCOUNT) {
            0.0
        } else {
            validate_numeric_input(inputs.get(fields::DISCOUNT), 0.0, MAX_DISCOUNT_PCT, fields::DISCOUNT)?
        };

        let subtotal = round_amount(unit_price * quantity as f64 + setup_fee);
        let discount = round_amount(subtotal * discount_pct / 100.0);
        Ok(Quote {
            unit_price,
            quantity,
            setup_fee,
            subtotal,
            discount,
            total: round_amount(subtotal - discount),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formula() -> RateCardFormula {
        RateCardFormula::bundled().unwrap()
    }

    #[test]
    fn bundled_rate_card_loads() {
        let card = RateCard::bundled().unwrap();
        assert_eq!(card.default_material().id, "vinyl");
        assert!(card.get("banner").is_some());
        assert!(card.materials().iter().all(|m| !m.name_ar.is_empty()));
    }

    #[test]
    fn auto_mode_prices_by_area() {
        // 100cm x 50cm = 0.5 m2 of vinyl at 45/m2, plus a 15 setup fee
        let inputs = CalculationInput::new()
            .with(fields::WIDTH, "100")
            .with(fields::HEIGHT, "50")
            .with(fields::QUANTITY, "4")
            .with(fields::MATERIAL, "vinyl");
        let quote = formula().compute(&inputs, Mode::Auto).unwrap();
        assert_eq!(quote.unit_price, 22.5);
        assert_eq!(quote.setup_fee, 15.0);
        assert_eq!(quote.subtotal, 105.0);
        assert_eq!(quote.total, 105.0);
    }

    #[test]
    fn auto_mode_bills_minimum_area() {
        // 10cm x 10cm = 0.01 m2, banner minimum is 1 m2
        let inputs = CalculationInput::new()
            .with(fields::WIDTH, "10")
            .with(fields::HEIGHT, "10")
            .with(fields::QUANTITY, "1")
            .with(fields::MATERIAL, "banner");
        let quote = formula().compute(&inputs, Mode::Auto).unwrap();
        assert_eq!(quote.unit_price, 35.0);
        assert_eq!(quote.total, 55.0);
    }

    #[test]
    fn auto_mode_defaults_material() {
        let inputs = CalculationInput::new()
            .with(fields::WIDTH, "100")
            .with(fields::HEIGHT, "100")
            .with(fields::QUANTITY, "1");
        let quote = formula().compute(&inputs, Mode::Auto).unwrap();
        assert_eq!(quote.unit_price, 45.0);
    }

    #[test]
    fn manual_mode_ignores_dimensions() {
        let inputs = CalculationInput::new()
            .with(fields::UNIT_PRICE, "12.5")
            .with(fields::QUANTITY, "3")
            .with(fields::DISCOUNT, "10")
            .with(fields::WIDTH, "not a number");
        let quote = formula().compute(&inputs, Mode::Manual).unwrap();
        assert_eq!(quote.subtotal, 37.5);
        assert_eq!(quote.discount, 3.75);
        assert_eq!(quote.total, 33.75);
        assert_eq!(quote.setup_fee, 0.0);
    }

    #[test]
    fn arabic_digits_are_accepted() {
        let inputs = CalculationInput::new()
            .with(fields::UNIT_PRICE, "١٠٠")
            .with(fields::QUANTITY, "٢");
        let quote = formula().compute(&inputs, Mode::Manual).unwrap();
        assert_eq!(quote.total, 200.0);
    }

    #[test]
    fn missing_and_invalid_fields_are_reported() {
        let f = formula();
        let empty = CalculationInput::new();
        assert_eq!(
            f.compute(&empty, Mode::Manual),
            Err(PriceError::Missing { field: fields::UNIT_PRICE })
        );

        let bad_material = CalculationInput::new()
            .with(fields::WIDTH, "10")
            .with(fields::HEIGHT, "10")
            .with(fields::QUANTITY, "1")
            .with(fields::MATERIAL, "marble");
        assert_eq!(
            f.compute(&bad_material, Mode::Auto),
            Err(PriceError::UnknownMaterial("marble".to_string()))
        );

        let too_much_discount = CalculationInput::new()
            .with(fields::UNIT_PRICE, "10")
            .with(fields::QUANTITY, "1")
            .with(fields::DISCOUNT, "150");
        assert!(matches!(
            f.compute(&too_much_discount, Mode::Manual),
            Err(PriceError::OutOfRange { field: fields::DISCOUNT, .. })
        ));
    }

    #[test]
    fn rate_card_rejects_bad_rows() {
        let header = "id,name_en,name_ar,rate_per_m2,min_area_m2,setup_fee\n";
        assert!(RateCard::from_csv(header).is_err());

        let dup = format!("{header}a,A,أ,1,0,0\na,A,أ,2,0,0\n");
        assert!(matches!(RateCard::from_csv(&dup), Err(PriceError::RateCard(_))));

        let negative = format!("{header}a,A,أ,-1,0,0\n");
        assert!(matches!(RateCard::from_csv(&negative), Err(PriceError::RateCard(_))));

        let garbage = format!("{header}a,A,أ,cheap,0,0\n");
        assert!(matches!(RateCard::from_csv(&garbage), Err(PriceError::RateCard(_))));
    }

    #[test]
    fn mode_parses_case_insensitively() {
        assert_eq!("Manual".parse::<Mode>(), Ok(Mode::Manual));
        assert_eq!("auto".parse::<Mode>(), Ok(Mode::Auto));
        assert!("hybrid".parse::<Mode>().is_err());
    }
}
