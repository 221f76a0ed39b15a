#![deny(warnings)]

//! Core domain models and invariants for the construction cost estimator.
//!
//! This crate defines the serializable types shared across the workspace:
//! the externally supplied pricing configuration, the simulation input
//! surface, and the immutable simulation records kept in the history, with
//! validation helpers to guarantee basic invariants.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Bricks laid per m² of wall, common (solid) brick.
pub const BRICKS_PER_M2_COMMON: u64 = 60;
/// Bricks laid per m² of wall, hollow brick.
pub const BRICKS_PER_M2_HOLLOW: u64 = 45;
/// Bricks shipped per pallet, common brick.
pub const BRICKS_PER_PALLET_COMMON: u64 = 1000;
/// Bricks shipped per pallet, hollow brick.
pub const BRICKS_PER_PALLET_HOLLOW: u64 = 144;
/// 25 kg cement bags per m² (one bag covers 5 m²).
pub const CEMENT_BAGS_PER_M2: f64 = 0.2;
/// 25 kg sand bags per m² (one bag covers ~3.3 m²).
pub const SAND_BAGS_PER_M2: f64 = 0.3;

/// The two supported brick kinds. Anything else on the input surface is a
/// contract violation, rejected at parse time rather than defaulted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BrickType {
    /// Solid clay brick.
    #[serde(rename = "comun")]
    Common,
    /// Hollow ceramic brick.
    #[serde(rename = "hueco")]
    Hollow,
}

impl BrickType {
    /// Fixed domain ratio: bricks needed per m² of wall.
    pub fn bricks_per_m2(self) -> u64 {
        match self {
            BrickType::Common => BRICKS_PER_M2_COMMON,
            BrickType::Hollow => BRICKS_PER_M2_HOLLOW,
        }
    }

    /// Fixed domain ratio: bricks per purchasable pallet.
    pub fn bricks_per_pallet(self) -> u64 {
        match self {
            BrickType::Common => BRICKS_PER_PALLET_COMMON,
            BrickType::Hollow => BRICKS_PER_PALLET_HOLLOW,
        }
    }
}

impl fmt::Display for BrickType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BrickType::Common => write!(f, "comun"),
            BrickType::Hollow => write!(f, "hueco"),
        }
    }
}

/// Error for brick-type values outside the two-member enum.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown brick type: {0:?} (expected \"comun\" or \"hueco\")")]
pub struct ParseBrickTypeError(pub String);

impl FromStr for BrickType {
    type Err = ParseBrickTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "comun" | "común" => Ok(BrickType::Common),
            "hueco" => Ok(BrickType::Hollow),
            _ => Err(ParseBrickTypeError(s.to_string())),
        }
    }
}

/// Unit prices for the bagged materials, from the configuration source.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MaterialPrices {
    /// Price of a 25 kg cement bag.
    #[serde(rename = "cemento25kg")]
    pub cement_bag_25kg: Decimal,
    /// Price of a 25 kg sand bag.
    #[serde(rename = "arena25kg")]
    pub sand_bag_25kg: Decimal,
}

/// Pallet prices per brick type, from the configuration source.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FixedCosts {
    /// Price of one pallet of common bricks.
    #[serde(rename = "palletLadrilloComun")]
    pub common_brick_pallet: Decimal,
    /// Price of one pallet of hollow bricks.
    #[serde(rename = "palletLadrilloHueco")]
    pub hollow_brick_pallet: Decimal,
}

impl FixedCosts {
    /// Pallet unit price for the given brick type. Always selected from the
    /// configured table, never computed.
    pub fn pallet_price(&self, brick_type: BrickType) -> Decimal {
        match brick_type {
            BrickType::Common => self.common_brick_pallet,
            BrickType::Hollow => self.hollow_brick_pallet,
        }
    }
}

/// Per-bag shipping surcharges for one province. A missing sub-rate means
/// no surcharge for that material, not an error.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ShippingRates {
    /// Surcharge per cement bag.
    #[serde(rename = "cemento", default)]
    pub cement_per_bag: Decimal,
    /// Surcharge per sand bag.
    #[serde(rename = "arena", default)]
    pub sand_per_bag: Decimal,
}

/// A deliverable province. `shipping` is absent when the province has no
/// shipping data at all.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Province {
    /// Stable province identifier used on the input surface.
    pub id: String,
    /// Human-readable province name.
    #[serde(rename = "nombre")]
    pub name: String,
    /// Per-bag shipping rates, if the province ships at all.
    #[serde(rename = "envio", default)]
    pub shipping: Option<ShippingRates>,
}

/// Externally supplied configuration, read-only for the whole session.
/// Absence of any top-level field is a deserialization failure, which the
/// caller treats as a fatal configuration error.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// Unit prices for cement and sand bags.
    #[serde(rename = "preciosMateriales")]
    pub material_prices: MaterialPrices,
    /// Pallet prices per brick type.
    #[serde(rename = "costosFijos")]
    pub fixed_costs: FixedCosts,
    /// Ordered list of deliverable provinces.
    #[serde(rename = "provincias")]
    pub provinces: Vec<Province>,
}

impl AppConfig {
    /// Look up a province by id. An unmatched id is not an error; the caller
    /// degrades to "no shipping data".
    pub fn find_province(&self, id: &str) -> Option<&Province> {
        self.provinces.iter().find(|p| p.id == id)
    }
}

/// One priced material line of a simulation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaterialLine {
    /// Display name of the material.
    pub name: String,
    /// Whole units to purchase.
    pub quantity: u64,
    /// Configured price per unit.
    pub unit_price: Decimal,
}

impl MaterialLine {
    /// Line subtotal, always derived as quantity × unit price.
    pub fn subtotal(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }
}

/// A validated simulation submission, as collected by the frontend.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SimulationInput {
    /// Built area in m², must be finite and > 0.
    pub area_m2: f64,
    /// Brick type to build with.
    pub brick_type: BrickType,
    /// Selected province id, if any.
    pub province_id: Option<String>,
    /// Whether the shipping surcharge was requested.
    pub include_shipping: bool,
}

/// One computed simulation, immutable once created. The history only ever
/// prepends new records or clears entirely; past records are never edited.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimulationRecord {
    /// Time-based identifier (epoch milliseconds), unique enough for dedup.
    pub id: i64,
    /// Creation instant (serialized as ISO 8601).
    pub timestamp: DateTime<Utc>,
    /// Built area in m².
    pub area_m2: f64,
    /// Brick type used.
    pub brick_type: BrickType,
    /// Selected province id, if a province was chosen.
    pub province_id: Option<String>,
    /// Resolved province name, if the id matched the configuration.
    pub province_name: Option<String>,
    /// The priced material lines.
    pub materials: Vec<MaterialLine>,
    /// Sum of line subtotals.
    pub materials_subtotal: Decimal,
    /// Shipping surcharge, 0 when not requested or no data.
    pub shipping_cost: Decimal,
    /// materials_subtotal + shipping_cost.
    pub grand_total: Decimal,
}

/// Validation errors for domain invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Area must be strictly positive.
    #[error("area must be > 0 m², got {0}")]
    NonPositiveArea(f64),
    /// Numeric field must be finite.
    #[error("non-finite numeric value encountered")]
    NonFinite,
    /// Price or rate must be non-negative.
    #[error("negative monetary value is invalid")]
    NegativeMoney,
    /// Province ids and names must be non-blank.
    #[error("province with blank id or name")]
    BlankProvince,
    /// Province ids must be unique.
    #[error("duplicate province id: {0}")]
    DuplicateProvince(String),
}

/// Validate a simulation submission. Runs at the boundary, before the
/// calculator is ever reached.
pub fn validate_input(input: &SimulationInput) -> Result<(), ValidationError> {
    if !input.area_m2.is_finite() {
        return Err(ValidationError::NonFinite);
    }
    if input.area_m2 <= 0.0 {
        return Err(ValidationError::NonPositiveArea(input.area_m2));
    }
    Ok(())
}

/// Validate the configuration, including province uniqueness.
pub fn validate_config(config: &AppConfig) -> Result<(), ValidationError> {
    if config.material_prices.cement_bag_25kg < Decimal::ZERO
        || config.material_prices.sand_bag_25kg < Decimal::ZERO
        || config.fixed_costs.common_brick_pallet < Decimal::ZERO
        || config.fixed_costs.hollow_brick_pallet < Decimal::ZERO
    {
        return Err(ValidationError::NegativeMoney);
    }
    let mut ids: BTreeSet<&str> = BTreeSet::new();
    for p in &config.provinces {
        if p.id.trim().is_empty() || p.name.trim().is_empty() {
            return Err(ValidationError::BlankProvince);
        }
        if !ids.insert(&p.id) {
            return Err(ValidationError::DuplicateProvince(p.id.clone()));
        }
        if let Some(rates) = &p.shipping {
            if rates.cement_per_bag < Decimal::ZERO || rates.sand_per_bag < Decimal::ZERO {
                return Err(ValidationError::NegativeMoney);
            }
        }
    }
    Ok(())
}
