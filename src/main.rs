mod display;
mod planner;
mod store;
mod web;

use std::path::PathBuf;

use display::{print_move_plan, write_plan_to_file};
use planner::{plan_between, Seat};
use store::SeatStore;

const DEFAULT_SEAT_COUNT: Seat = 16;

fn seat_count_from_env() -> Seat {
    std::env::var("SEAT_COUNT")
        .ok()
        .and_then(|v| v.parse::<Seat>().ok())
        .filter(|&n| n >= 1)
        .unwrap_or(DEFAULT_SEAT_COUNT)
}

fn load_or_create_store(path: &PathBuf, seat_count: Seat) -> SeatStore {
    if path.exists() {
        match SeatStore::load(path) {
            Ok(store) => return store,
            Err(e) => {
                log::warn!("could not load store from {}: {}", path.display(), e);
            }
        }
    }
    SeatStore::new(seat_count)
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  seat-shuffle web [port]");
    eprintln!("  seat-shuffle plan <store.json> <from-layout> <to-layout> [--out <file>]");
    eprintln!();
    eprintln!("Layouts are looked up by numeric id first, then by name.");
    eprintln!("Environment: SEAT_COUNT (default 16), SEAT_DATA_FILE (default seatstore.json)");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let seat_count = seat_count_from_env();

    match args.get(1).map(String::as_str) {
        Some("web") => {
            let port = args
                .get(2)
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(8080);
            let data_path = PathBuf::from(
                std::env::var("SEAT_DATA_FILE").unwrap_or_else(|_| "seatstore.json".to_string()),
            );
            let store = load_or_create_store(&data_path, seat_count);

            println!("Starting web server on port {}...", port);
            println!("Seat grid: {} seats, data file: {}", store.seat_count(), data_path.display());
            println!("Access the site at http://localhost:{}", port);

            web::start_server(port, store, data_path).await?;
            Ok(())
        }
        Some("plan") => {
            let (store_path, from_key, to_key) = match (args.get(2), args.get(3), args.get(4)) {
                (Some(p), Some(f), Some(t)) => (p, f, t),
                _ => {
                    print_usage();
                    std::process::exit(2);
                }
            };
            let out_file = args
                .iter()
                .position(|a| a == "--out")
                .and_then(|i| args.get(i + 1));

            let store = SeatStore::load(store_path)?;
            let from = store
                .find_layout(from_key)
                .ok_or_else(|| format!("layout '{}' not found in {}", from_key, store_path))?;
            let to = store
                .find_layout(to_key)
                .ok_or_else(|| format!("layout '{}' not found in {}", to_key, store_path))?;

            println!("Planning moves: '{}' -> '{}'", from.name, to.name);
            let plan = plan_between(&store, from.id, to.id)?;
            print_move_plan(&plan, &store);

            if let Some(out) = out_file {
                write_plan_to_file(&plan, &store, out)?;
                println!("Plan written to {}", out);
            }
            Ok(())
        }
        _ => {
            print_usage();
            std::process::exit(2);
        }
    }
}
