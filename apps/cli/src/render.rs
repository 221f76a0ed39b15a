//! Pure rendering: records and history become view models of formatted
//! strings. The terminal sink in `main` only prints what is built here.

use chrono::{DateTime, Local, Utc};
use estimator_core::SimulationRecord;
use rust_decimal::Decimal;

/// One formatted material line.
pub struct LineView {
    pub label: String,
    pub subtotal: String,
}

/// The freshly computed simulation, ready for display.
pub struct ResultView {
    pub area: String,
    pub brick_type: String,
    pub province: String,
    pub lines: Vec<LineView>,
    pub materials_subtotal: String,
    pub shipping_cost: String,
    pub grand_total: String,
}

/// One row of the history table.
pub struct HistoryRowView {
    pub date: String,
    pub area: String,
    pub brick_type: String,
    pub province: String,
    pub grand_total: String,
}

/// Format an amount the es-AR way: dot thousands separators, comma decimals.
pub fn format_pesos(amount: Decimal) -> String {
    let text = amount.round_dp(2).normalize().to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", int_part),
    };
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    match frac_part {
        Some(f) => format!("{sign}{grouped},{f}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Short local date-time, `dd/mm/yy HH:MM`.
pub fn format_fecha(timestamp: DateTime<Utc>) -> String {
    timestamp
        .with_timezone(&Local)
        .format("%d/%m/%y %H:%M")
        .to_string()
}

pub fn result_view(record: &SimulationRecord) -> ResultView {
    ResultView {
        area: format!("{} m²", record.area_m2),
        brick_type: record.brick_type.to_string(),
        province: record.province_name.clone().unwrap_or_else(|| "-".to_string()),
        lines: record
            .materials
            .iter()
            .map(|line| LineView {
                label: format!("{}: {}", line.name, line.quantity),
                subtotal: format!("$ {}", format_pesos(line.subtotal())),
            })
            .collect(),
        materials_subtotal: format!("$ {}", format_pesos(record.materials_subtotal)),
        shipping_cost: format!("$ {}", format_pesos(record.shipping_cost)),
        grand_total: format!("$ {}", format_pesos(record.grand_total)),
    }
}

pub fn history_rows(history: &[SimulationRecord]) -> Vec<HistoryRowView> {
    history
        .iter()
        .map(|record| HistoryRowView {
            date: format_fecha(record.timestamp),
            area: format!("{}", record.area_m2),
            brick_type: record.brick_type.to_string(),
            province: record.province_id.clone().unwrap_or_else(|| "-".to_string()),
            grand_total: format!("$ {}", format_pesos(record.grand_total)),
        })
        .collect()
}
