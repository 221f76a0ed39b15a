#![deny(warnings)]

//! Pure calculation functions for the construction cost estimator.
//!
//! This crate provides validated utilities for:
//! - Material quantities from built area and brick type (whole pallets/bags)
//! - Province shipping surcharge over the bagged materials
//! - Pricing the quantities into a full simulation record

use chrono::{DateTime, Utc};
use estimator_core::{
    AppConfig, BrickType, FixedCosts, MaterialLine, MaterialPrices, Province, SimulationInput,
    SimulationRecord, CEMENT_BAGS_PER_M2, SAND_BAGS_PER_M2,
};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

/// Errors produced by the calculators.
#[derive(Debug, Error, PartialEq)]
pub enum CalcError {
    /// Area must be a finite number of m², strictly positive.
    #[error("invalid area: {0} m²")]
    InvalidArea(f64),
}

/// Material quantities for one simulation, before pricing the bags.
/// `pallet_unit_price` is carried along because it is selected by brick
/// type, unlike the bag prices which are flat.
#[derive(Clone, Debug, PartialEq)]
pub struct MaterialQuantities {
    /// Whole brick pallets to purchase.
    pub pallet_count: u64,
    /// Whole 25 kg cement bags.
    pub cement_bag_count: u64,
    /// Whole 25 kg sand bags.
    pub sand_bag_count: u64,
    /// Configured price of one pallet for the chosen brick type.
    pub pallet_unit_price: Decimal,
}

/// Compute material quantities for a built area.
///
/// Quantities always round up: partial pallets and bags cannot be purchased.
///
/// Example:
/// let costs = FixedCosts { common_brick_pallet: 1.into(), hollow_brick_pallet: 1.into() };
/// let q = compute_materials(50.0, BrickType::Hollow, &costs).unwrap();
/// assert_eq!(q.pallet_count, 16); // ceil(2250 / 144)
pub fn compute_materials(
    area_m2: f64,
    brick_type: BrickType,
    fixed_costs: &FixedCosts,
) -> Result<MaterialQuantities, CalcError> {
    if !area_m2.is_finite() || area_m2 <= 0.0 {
        return Err(CalcError::InvalidArea(area_m2));
    }
    let bricks_needed = area_m2 * brick_type.bricks_per_m2() as f64;
    let pallet_count = (bricks_needed / brick_type.bricks_per_pallet() as f64).ceil() as u64;
    let cement_bag_count = (area_m2 * CEMENT_BAGS_PER_M2).ceil() as u64;
    let sand_bag_count = (area_m2 * SAND_BAGS_PER_M2).ceil() as u64;
    debug!(
        area_m2,
        %brick_type,
        pallet_count,
        cement_bag_count,
        sand_bag_count,
        "materials computed"
    );
    Ok(MaterialQuantities {
        pallet_count,
        cement_bag_count,
        sand_bag_count,
        pallet_unit_price: fixed_costs.pallet_price(brick_type),
    })
}

/// Shipping surcharge for the bagged materials.
///
/// Returns 0 when there is no province or the province has no shipping
/// data; missing sub-rates are already defaulted to 0 by the schema. The
/// result is never negative for a valid configuration.
pub fn compute_shipping(
    province: Option<&Province>,
    cement_bag_count: u64,
    sand_bag_count: u64,
) -> Decimal {
    let Some(rates) = province.and_then(|p| p.shipping.as_ref()) else {
        return Decimal::ZERO;
    };
    rates.cement_per_bag * Decimal::from(cement_bag_count)
        + rates.sand_per_bag * Decimal::from(sand_bag_count)
}

/// Price the quantities into the three material lines: brick pallets,
/// cement bags, sand bags.
pub fn material_lines(
    quantities: &MaterialQuantities,
    brick_type: BrickType,
    prices: &MaterialPrices,
) -> Vec<MaterialLine> {
    vec![
        MaterialLine {
            name: format!("Pallet de ladrillo {brick_type}"),
            quantity: quantities.pallet_count,
            unit_price: quantities.pallet_unit_price,
        },
        MaterialLine {
            name: "Bolsa de cemento 25kg".to_string(),
            quantity: quantities.cement_bag_count,
            unit_price: prices.cement_bag_25kg,
        },
        MaterialLine {
            name: "Bolsa de arena 25kg".to_string(),
            quantity: quantities.sand_bag_count,
            unit_price: prices.sand_bag_25kg,
        },
    ]
}

/// Build the full simulation record for a validated submission.
///
/// Invariants guaranteed on the returned record:
/// - `materials_subtotal` = Σ quantity × unit price over all lines
/// - `shipping_cost` = 0 unless shipping was requested and the selected
///   province has shipping data
/// - `grand_total` = `materials_subtotal` + `shipping_cost`, exactly
pub fn build_record(
    input: &SimulationInput,
    config: &AppConfig,
    now: DateTime<Utc>,
) -> Result<SimulationRecord, CalcError> {
    let quantities = compute_materials(input.area_m2, input.brick_type, &config.fixed_costs)?;
    let materials = material_lines(&quantities, input.brick_type, &config.material_prices);
    let materials_subtotal: Decimal = materials.iter().map(MaterialLine::subtotal).sum();

    // an unmatched province id degrades to "no shipping data"
    let province = input
        .province_id
        .as_deref()
        .and_then(|id| config.find_province(id));
    let shipping_cost = if input.include_shipping {
        compute_shipping(province, quantities.cement_bag_count, quantities.sand_bag_count)
    } else {
        Decimal::ZERO
    };

    Ok(SimulationRecord {
        id: now.timestamp_millis(),
        timestamp: now,
        area_m2: input.area_m2,
        brick_type: input.brick_type,
        province_id: input.province_id.clone(),
        province_name: province.map(|p| p.name.clone()),
        materials,
        materials_subtotal,
        shipping_cost,
        grand_total: materials_subtotal + shipping_cost,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use estimator_core::ShippingRates;
    use proptest::prelude::*;

    fn config() -> AppConfig {
        AppConfig {
            material_prices: MaterialPrices {
                cement_bag_25kg: Decimal::new(9800, 0),
                sand_bag_25kg: Decimal::new(4200, 0),
            },
            fixed_costs: FixedCosts {
                common_brick_pallet: Decimal::new(185_000, 0),
                hollow_brick_pallet: Decimal::new(92_000, 0),
            },
            provinces: vec![
                Province {
                    id: "bsas".to_string(),
                    name: "Buenos Aires".to_string(),
                    shipping: Some(ShippingRates {
                        cement_per_bag: Decimal::new(350, 0),
                        sand_per_bag: Decimal::new(280, 0),
                    }),
                },
                Province {
                    id: "caba".to_string(),
                    name: "CABA".to_string(),
                    shipping: None,
                },
            ],
        }
    }

    fn input(area: f64, brick: BrickType) -> SimulationInput {
        SimulationInput {
            area_m2: area,
            brick_type: brick,
            province_id: None,
            include_shipping: false,
        }
    }

    #[test]
    fn ten_m2_common_fits_one_pallet() {
        // 600 bricks needed, pallet holds 1000, still a whole pallet
        let q = compute_materials(10.0, BrickType::Common, &config().fixed_costs).unwrap();
        assert_eq!(q.pallet_count, 1);
        assert_eq!(q.cement_bag_count, 2);
        assert_eq!(q.sand_bag_count, 3);
        assert_eq!(q.pallet_unit_price, Decimal::new(185_000, 0));
    }

    #[test]
    fn fifty_m2_hollow_reference_quantities() {
        // 2250 bricks / 144 per pallet = 15.625 -> 16 pallets
        let q = compute_materials(50.0, BrickType::Hollow, &config().fixed_costs).unwrap();
        assert_eq!(q.pallet_count, 16);
        assert_eq!(q.cement_bag_count, 10);
        assert_eq!(q.sand_bag_count, 15);
        assert_eq!(q.pallet_unit_price, Decimal::new(92_000, 0));
    }

    #[test]
    fn invalid_area_rejected() {
        let costs = config().fixed_costs;
        assert_eq!(
            compute_materials(0.0, BrickType::Common, &costs),
            Err(CalcError::InvalidArea(0.0))
        );
        assert!(compute_materials(-10.0, BrickType::Hollow, &costs).is_err());
        assert!(compute_materials(f64::INFINITY, BrickType::Common, &costs).is_err());
    }

    #[test]
    fn shipping_zero_without_data() {
        let config = config();
        assert_eq!(compute_shipping(None, 10, 15), Decimal::ZERO);
        let caba = config.find_province("caba");
        assert_eq!(compute_shipping(caba, 10, 15), Decimal::ZERO);
    }

    #[test]
    fn shipping_sums_both_rates() {
        let config = config();
        let bsas = config.find_province("bsas");
        // 10 × 350 + 15 × 280
        assert_eq!(compute_shipping(bsas, 10, 15), Decimal::new(7700, 0));
    }

    #[test]
    fn shipping_missing_sub_rate_defaults_to_zero() {
        let province = Province {
            id: "mza".to_string(),
            name: "Mendoza".to_string(),
            shipping: Some(ShippingRates {
                cement_per_bag: Decimal::new(650, 0),
                sand_per_bag: Decimal::ZERO,
            }),
        };
        assert_eq!(compute_shipping(Some(&province), 4, 100), Decimal::new(2600, 0));
    }

    #[test]
    fn record_totals_hold() {
        let mut submission = input(50.0, BrickType::Hollow);
        submission.province_id = Some("bsas".to_string());
        submission.include_shipping = true;
        let now: DateTime<Utc> = "2026-08-29T12:00:00Z".parse().unwrap();
        let record = build_record(&submission, &config(), now).unwrap();

        assert_eq!(record.id, now.timestamp_millis());
        assert_eq!(record.materials.len(), 3);
        assert_eq!(record.province_name.as_deref(), Some("Buenos Aires"));
        // 16 × 92000 + 10 × 9800 + 15 × 4200
        assert_eq!(record.materials_subtotal, Decimal::new(1_633_000, 0));
        assert_eq!(record.shipping_cost, Decimal::new(7700, 0));
        assert_eq!(record.grand_total, Decimal::new(1_640_700, 0));
    }

    #[test]
    fn shipping_not_requested_is_zero_even_with_data() {
        let mut submission = input(50.0, BrickType::Hollow);
        submission.province_id = Some("bsas".to_string());
        submission.include_shipping = false;
        let record = build_record(&submission, &config(), Utc::now()).unwrap();
        assert_eq!(record.shipping_cost, Decimal::ZERO);
        assert_eq!(record.grand_total, record.materials_subtotal);
    }

    #[test]
    fn unmatched_province_degrades_to_no_shipping() {
        let mut submission = input(20.0, BrickType::Common);
        submission.province_id = Some("nowhere".to_string());
        submission.include_shipping = true;
        let record = build_record(&submission, &config(), Utc::now()).unwrap();
        assert_eq!(record.shipping_cost, Decimal::ZERO);
        assert_eq!(record.province_name, None);
        assert_eq!(record.province_id.as_deref(), Some("nowhere"));
    }

    proptest! {
        #[test]
        fn pallets_cover_bricks_needed(area in 0.1f64..10_000.0, hollow in proptest::bool::ANY) {
            let brick = if hollow { BrickType::Hollow } else { BrickType::Common };
            let q = compute_materials(area, brick, &config().fixed_costs).unwrap();
            let bricks_needed = area * brick.bricks_per_m2() as f64;
            prop_assert!(q.pallet_count >= 1);
            // capacity covers the need, and one pallet fewer would not
            prop_assert!((q.pallet_count * brick.bricks_per_pallet()) as f64 >= bricks_needed);
            prop_assert!((((q.pallet_count - 1) * brick.bricks_per_pallet()) as f64) < bricks_needed);
        }

        #[test]
        fn bag_counts_round_up(area in 0.1f64..10_000.0) {
            let q = compute_materials(area, BrickType::Common, &config().fixed_costs).unwrap();
            prop_assert_eq!(q.cement_bag_count, (area * CEMENT_BAGS_PER_M2).ceil() as u64);
            prop_assert_eq!(q.sand_bag_count, (area * SAND_BAGS_PER_M2).ceil() as u64);
            prop_assert!(q.cement_bag_count as f64 >= area * CEMENT_BAGS_PER_M2);
            prop_assert!(q.sand_bag_count as f64 >= area * SAND_BAGS_PER_M2);
        }

        #[test]
        fn grand_total_invariant(area in 0.1f64..5_000.0,
                                 hollow in proptest::bool::ANY,
                                 with_shipping in proptest::bool::ANY) {
            let brick = if hollow { BrickType::Hollow } else { BrickType::Common };
            let submission = SimulationInput {
                area_m2: area,
                brick_type: brick,
                province_id: Some("bsas".to_string()),
                include_shipping: with_shipping,
            };
            let record = build_record(&submission, &config(), Utc::now()).unwrap();
            let lines: Decimal = record.materials.iter().map(MaterialLine::subtotal).sum();
            prop_assert_eq!(record.materials_subtotal, lines);
            prop_assert_eq!(record.grand_total, record.materials_subtotal + record.shipping_cost);
            prop_assert!(record.shipping_cost >= Decimal::ZERO);
            if !with_shipping {
                prop_assert_eq!(record.shipping_cost, Decimal::ZERO);
            }
        }
    }
}
