use std::path::Path;

use anyhow::Context;
use chrono::{Duration, NaiveDate};
use csv::Writer;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use room_allotment::allocation::{GROUP_SIZE, TOTAL_ROOMS};

const DEFAULT_OUTPUT: &str = "data/sample_students_grouped.csv";
const DEFAULT_GROUPS: usize = 20;

#[derive(Serialize)]
struct SampleRow {
    #[serde(rename = "Student Name")]
    name: String,
    #[serde(rename = "Preference 1")]
    preference1: u8,
    #[serde(rename = "Preference 2")]
    preference2: u8,
    #[serde(rename = "Preference 3")]
    preference3: u8,
    #[serde(rename = "Fee Paid Date")]
    fee_paid_date: String,
    #[serde(rename = "Fees Photo")]
    fees_photo: String,
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let output = args.get(1).map(String::as_str).unwrap_or(DEFAULT_OUTPUT);
    let groups = args
        .get(2)
        .and_then(|g| g.parse::<usize>().ok())
        .unwrap_or(DEFAULT_GROUPS);

    if let Some(parent) = Path::new(output).parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let first_fee_day = NaiveDate::from_ymd_opt(2024, 6, 1).context("invalid base date")?;
    let rooms: Vec<u8> = (1..=TOTAL_ROOMS).collect();
    let mut rng = rand::thread_rng();
    let mut wtr = Writer::from_path(output).with_context(|| format!("failed to create {}", output))?;

    let mut student = 0;
    for _ in 0..groups {
        // Members of a group share the same three choices
        let mut choices = rooms.clone();
        choices.shuffle(&mut rng);

        for _ in 0..GROUP_SIZE {
            student += 1;
            let paid = first_fee_day + Duration::days(rng.gen_range(0..=30));
            wtr.serialize(SampleRow {
                name: format!("Student {}", student),
                preference1: choices[0],
                preference2: choices[1],
                preference3: choices[2],
                fee_paid_date: paid.format("%Y-%m-%d").to_string(),
                fees_photo: format!("student_{}_receipt.jpg", student),
            })?;
        }
    }

    wtr.flush()?;
    println!("Wrote {} students in {} groups to {}", student, groups, output);
    Ok(())
}
