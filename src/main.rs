use std::fs::File;
use std::path::Path;

use anyhow::Context;
use tracing::info;

use room_allotment::config::Config;
use room_allotment::display::{print_allotment, write_allotment_to_file};
use room_allotment::parser::load_students;
use room_allotment::service::AllotmentService;
use room_allotment::{logging, web};

const DEFAULT_SHEET: &str = "data/sample_students.csv";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();
    let mut config = Config::from_env();

    // Check if we should run in web mode
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "web" {
        if let Some(port) = args.get(2).and_then(|p| p.parse::<u16>().ok()) {
            config.port = port;
        }

        println!("Access the site at http://localhost:{}", config.port);
        web::start_server(config).await?;
        return Ok(());
    }

    // CLI mode: allot rooms for one sheet and write the reports
    let sheet_path = args.get(1).map(String::as_str).unwrap_or(DEFAULT_SHEET);
    if !Path::new(sheet_path).exists() {
        anyhow::bail!(
            "Student sheet not found: {} (run `generate_sample` or pass a path)",
            sheet_path
        );
    }

    println!("Loading students from {}...", sheet_path);
    let students = load_students(sheet_path).with_context(|| format!("failed to load {}", sheet_path))?;
    println!("Loaded {} students", students.len());

    let service = AllotmentService::new();
    service.allocate(&students);
    let allocation = service.state().snapshot();

    print_allotment(&allocation);

    write_allotment_to_file(&allocation, "room_allotment.txt").context("failed to write room_allotment.txt")?;
    let json_file = File::create("room_allotment.json").context("failed to create room_allotment.json")?;
    serde_json::to_writer_pretty(json_file, &service.allotment_data())?;

    info!(
        groups = allocation.records.len(),
        rooms = allocation.occupied_rooms.len(),
        "wrote room_allotment.txt and room_allotment.json"
    );
    Ok(())
}
