#![deny(warnings)]

//! Headless CLI for the construction materials cost estimator.
//!
//! Commands: `simulate`, `history`, `list-provinces`, `clear-history`.
//! Configuration is loaded once per run; if it cannot be loaded, every
//! calculation command is disabled and the run fails.

mod render;
mod workflow;

use anyhow::Result;
use estimator_core::{validate_input, BrickType, SimulationInput};
use persistence::HistoryStore;
use render::{HistoryRowView, ResultView};
use std::path::PathBuf;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;
use workflow::ConfigState;

const EXIT_CONFIG: i32 = 1;
const EXIT_INPUT: i32 = 2;

#[derive(Debug, Default)]
struct Args {
    command: Option<String>,
    config: Option<PathBuf>,
    history: Option<PathBuf>,
    area: Option<f64>,
    brick: Option<String>,
    province: Option<String>,
    shipping: bool,
}

fn parse_args() -> Args {
    let mut args = Args::default();
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => args.config = it.next().map(PathBuf::from),
            "--history" => args.history = it.next().map(PathBuf::from),
            "--area" => args.area = it.next().and_then(|s| s.parse().ok()),
            "--brick" => args.brick = it.next(),
            "--province" => args.province = it.next(),
            "--shipping" => args.shipping = true,
            other if args.command.is_none() && !other.starts_with("--") => {
                args.command = Some(other.to_string())
            }
            _ => {}
        }
    }
    args
}

fn usage() {
    println!("Simulador de costos de construcción");
    println!();
    println!("Uso:");
    println!("  cli simulate --area M2 --brick comun|hueco [--province ID] [--shipping]");
    println!("  cli history");
    println!("  cli list-provinces");
    println!("  cli clear-history");
    println!();
    println!("Opciones:");
    println!("  --config PATH   archivo de configuración (default: data/config.json)");
    println!("  --history PATH  archivo de historial (default: {})", persistence::default_history_path().display());
}

fn reject_input(reason: &str) -> ! {
    eprintln!("Entrada inválida: {reason}");
    std::process::exit(EXIT_INPUT);
}

/// Build the validated submission from raw flags, rejecting malformed input
/// before anything reaches the calculator or the store.
fn build_input(args: &Args) -> SimulationInput {
    let Some(area) = args.area else {
        reject_input("falta --area (m², número positivo)");
    };
    let Some(raw_brick) = args.brick.as_deref() else {
        reject_input("falta --brick (comun o hueco)");
    };
    let brick_type = match raw_brick.parse::<BrickType>() {
        Ok(b) => b,
        Err(e) => reject_input(&e.to_string()),
    };
    let input = SimulationInput {
        area_m2: area,
        brick_type,
        province_id: args.province.clone(),
        include_shipping: args.shipping,
    };
    if let Err(e) = validate_input(&input) {
        reject_input(&e.to_string());
    }
    input
}

fn print_result(view: &ResultView) {
    println!("Resumen de la simulación");
    println!("  Superficie: {}", view.area);
    println!("  Ladrillo:   {}", view.brick_type);
    println!("  Provincia:  {}", view.province);
    println!("  Materiales:");
    for line in &view.lines {
        println!("    {:<40} {:>14}", line.label, line.subtotal);
    }
    println!("  {:<42} {:>14}", "Subtotal materiales", view.materials_subtotal);
    println!("  {:<42} {:>14}", "Envío", view.shipping_cost);
    println!("  {:<42} {:>14}", "Total", view.grand_total);
}

fn print_history(rows: &[HistoryRowView]) {
    if rows.is_empty() {
        println!("Todavía no hay simulaciones guardadas.");
        return;
    }
    println!(
        "{:<16} {:>8} {:<8} {:<10} {:>16}",
        "Fecha", "m²", "Ladrillo", "Provincia", "Total"
    );
    for row in rows {
        println!(
            "{:<16} {:>8} {:<8} {:<10} {:>16}",
            row.date, row.area, row.brick_type, row.province, row.grand_total
        );
    }
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let args = parse_args();
    let Some(command) = args.command.clone() else {
        usage();
        return Ok(());
    };

    let store = HistoryStore::new(
        args.history
            .clone()
            .unwrap_or_else(persistence::default_history_path),
    );

    // history commands work even without configuration
    match command.as_str() {
        "history" => {
            print_history(&render::history_rows(&store.load()));
            return Ok(());
        }
        "clear-history" => {
            store.clear()?;
            println!("Historial limpiado.");
            return Ok(());
        }
        _ => {}
    }

    // hard gate: calculation commands need the configuration
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from("data/config.json"));
    let config = match workflow::load_config(&config_path) {
        ConfigState::Ready(config) => config,
        ConfigState::Failed(reason) => {
            error!(%reason, "configuration unavailable, calculation disabled");
            eprintln!("Error cargando la configuración: {reason}");
            std::process::exit(EXIT_CONFIG);
        }
    };

    match command.as_str() {
        "list-provinces" => {
            println!(
                "Precios de referencia: cemento $ {} | arena $ {}",
                render::format_pesos(config.material_prices.cement_bag_25kg),
                render::format_pesos(config.material_prices.sand_bag_25kg)
            );
            for p in &config.provinces {
                match &p.shipping {
                    Some(rates) => println!(
                        "  {:<8} {:<20} envío: cemento $ {} / arena $ {} por bolsa",
                        p.id,
                        p.name,
                        render::format_pesos(rates.cement_per_bag),
                        render::format_pesos(rates.sand_per_bag)
                    ),
                    None => println!("  {:<8} {:<20} sin datos de envío", p.id, p.name),
                }
            }
        }
        "simulate" => {
            let input = build_input(&args);
            let (record, history) = workflow::run_simulation(&input, &config, &store)?;
            print_result(&render::result_view(&record));
            println!();
            print_history(&render::history_rows(&history));
        }
        other => {
            info!(command = other, "unknown command");
            usage();
        }
    }

    Ok(())
}
