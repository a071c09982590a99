// CLI entry point for the headless ecosystem runner.
//
// Loads a terrain-code map (a JSON array of rows), an optional JSON config,
// builds a world, and runs it for a fixed number of ticks, printing a
// per-species count line every `--report-every` ticks and a final summary.
// There is no window and no clock: the run is as fast as the sim allows, and
// the same map, config, and seed always print the same report.
//
// Log output goes through `tracing`; set `RUST_LOG` (default `info`) to see
// births, deaths, and claims (`debug`) or search misses (`trace`).
//
// Usage:
//   ecosim_headless --map <FILE> [OPTIONS]
//     --map <FILE>            Map file: JSON rows of terrain codes (required)
//     --config <FILE>         JSON SimConfig; missing fields keep defaults
//     --seed <N>              PRNG seed (default: 1)
//     --ticks <N>             Ticks to run (default: 1000)
//     --report-every <N>      Ticks between count lines (default: 100, 0 = off)

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ecosim_sim::config::SimConfig;
use ecosim_sim::error::SimError;
use ecosim_sim::grid::MapLayout;
use ecosim_sim::sim::SimState;
use ecosim_sim::types::Species;
use tracing::info;
use tracing_subscriber::EnvFilter;

struct RunArgs {
    map: PathBuf,
    config: Option<PathBuf>,
    seed: u64,
    ticks: u64,
    report_every: u64,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = parse_args();

    let layout = match load_map(&args.map) {
        Ok(layout) => layout,
        Err(e) => {
            eprintln!("Failed to load map {}: {e}", args.map.display());
            std::process::exit(1);
        }
    };
    let config = match args.config.as_deref().map(load_config).transpose() {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };

    let mut sim = match SimState::new(layout, config, args.seed) {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("Failed to build world: {e}");
            std::process::exit(1);
        }
    };

    let mut deaths: BTreeMap<String, usize> = BTreeMap::new();
    let mut births = 0usize;

    println!("{}", count_line(0, &sim.counts()));
    for _ in 0..args.ticks {
        let report = match sim.tick() {
            Ok(report) => report,
            Err(e) => {
                eprintln!("Tick {} failed: {e}", sim.tick);
                std::process::exit(1);
            }
        };
        for (_, cause) in report.deaths() {
            *deaths.entry(format!("{cause:?}")).or_default() += 1;
        }
        births += report.births().count();

        if args.report_every > 0 && report.tick % args.report_every == 0 {
            println!("{}", count_line(report.tick, &sim.counts()));
        }
        if sim.total() == 0 {
            info!(tick = report.tick, "population extinct");
            break;
        }
    }

    println!();
    println!("{}", count_line(sim.tick, &sim.counts()));
    println!("births: {births}");
    for (cause, n) in &deaths {
        println!("deaths ({cause}): {n}");
    }
}

/// Read a map file: a JSON array of equal-length rows of terrain codes.
fn load_map(path: &Path) -> Result<MapLayout, String> {
    let text = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    parse_map(&text).map_err(|e| e.to_string())
}

fn parse_map(json: &str) -> Result<MapLayout, SimError> {
    let rows: Vec<Vec<u8>> = serde_json::from_str(json)?;
    MapLayout::from_codes(&rows)
}

fn load_config(path: &Path) -> Result<SimConfig, String> {
    let text = std::fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
    SimConfig::from_json(&text).map_err(|e| format!("{}: {e}", path.display()))
}

fn count_line(tick: u64, counts: &BTreeMap<Species, usize>) -> String {
    let mut line = format!("tick {tick:>6}");
    for (species, n) in counts {
        line.push_str(&format!("  {species}: {n:>4}"));
    }
    line
}

/// Parse command-line arguments. Uses simple `std::env::args()` matching.
fn parse_args() -> RunArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut map = None;
    let mut run = RunArgs {
        map: PathBuf::new(),
        config: None,
        seed: 1,
        ticks: 1000,
        report_every: 100,
    };
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--map" => {
                i += 1;
                map = Some(args.get(i).map(PathBuf::from).unwrap_or_else(|| {
                    eprintln!("--map requires a file path");
                    std::process::exit(1);
                }));
            }
            "--config" => {
                i += 1;
                run.config = args.get(i).map(PathBuf::from).or_else(|| {
                    eprintln!("--config requires a file path");
                    std::process::exit(1);
                });
            }
            "--seed" => {
                i += 1;
                run.seed = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--seed requires a valid number");
                    std::process::exit(1);
                });
            }
            "--ticks" => {
                i += 1;
                run.ticks = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--ticks requires a valid number");
                    std::process::exit(1);
                });
            }
            "--report-every" => {
                i += 1;
                run.report_every =
                    args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                        eprintln!("--report-every requires a valid number");
                        std::process::exit(1);
                    });
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    run.map = map.unwrap_or_else(|| {
        eprintln!("--map is required");
        print_usage();
        std::process::exit(1);
    });
    run
}

fn print_usage() {
    println!("Usage: ecosim_headless --map <FILE> [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --map <FILE>            Map file: JSON rows of terrain codes (required)");
    println!("  --config <FILE>         JSON SimConfig; missing fields keep defaults");
    println!("  --seed <N>              PRNG seed (default: 1)");
    println!("  --ticks <N>             Ticks to run (default: 1000)");
    println!("  --report-every <N>      Ticks between count lines (default: 100, 0 = off)");
    println!("  --help, -h              Show this help");
}
