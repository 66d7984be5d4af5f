use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::allocation::{Allocation, AllotmentRecord, TOTAL_ROOMS};

/// Formats a group's member names, e.g. "Asha, Ben, Chitra"
pub fn format_group_members(record: &AllotmentRecord) -> String {
    record
        .members
        .iter()
        .map(|member| member.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn format_room(room: Option<u8>) -> String {
    match room {
        Some(room) => format!("Room {:02}", room),
        None => "[NO ROOM]".to_string(),
    }
}

/// Writes one line per room: `Room NN GroupX [names]` or `Room NN [EMPTY]`
pub fn write_allotment_to_file<P: AsRef<Path>>(allocation: &Allocation, path: P) -> io::Result<()> {
    let mut file = File::create(path)?;

    writeln!(file, "** Room Allotment **")?;

    for room in 1..=TOTAL_ROOMS {
        match allocation.group_in_room(room) {
            Some(record) => writeln!(
                file,
                "{} {} [{}]",
                format_room(Some(room)),
                record.group_id,
                format_group_members(record)
            )?,
            None => writeln!(file, "{} [EMPTY]", format_room(Some(room)))?,
        }
    }

    Ok(())
}

/// Prints the allotment in processing order, followed by the room table
pub fn print_allotment(allocation: &Allocation) {
    println!("\n=== Room Allotment ===");
    println!(
        "Groups: {}, rooms allotted: {}/{}",
        allocation.records.len(),
        allocation.occupied_rooms.len(),
        TOTAL_ROOMS
    );

    let unassigned: Vec<&AllotmentRecord> = allocation.unassigned().collect();
    if !unassigned.is_empty() {
        println!("Groups without a room ({}):", unassigned.len());
        for record in unassigned {
            println!("  - {} ({})", record.group_id, format_group_members(record));
        }
    }

    println!("\nBy priority (earliest fee payment first):");
    for record in &allocation.records {
        println!(
            "  {} (paid {}) -> {} [{}]",
            record.group_id,
            record.earliest_fee_date.as_deref().unwrap_or("N/A"),
            format_room(record.assigned_room),
            format_group_members(record)
        );
    }

    println!("\nRooms (all {}):", TOTAL_ROOMS);
    for room in 1..=TOTAL_ROOMS {
        match allocation.group_in_room(room) {
            Some(record) => println!("  {} -> {}", format_room(Some(room)), record.group_id),
            None => println!("  {} -> [EMPTY]", format_room(Some(room))),
        }
    }
}
