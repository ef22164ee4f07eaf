use dotenv::dotenv;
use std::env;

use pawsport::prelude::*;

/// Usage: history_demo <pet id> [vaccine] [administered date]
#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    pretty_env_logger::init();

    let pet_id: u64 = env::args().nth(1).unwrap_or_else(|| "1".to_string()).parse()?;
    let dashboard = Pawsport::from_env()?;
    let history = dashboard.history(pet_id);

    if let (Some(vaccine), Some(date)) = (env::args().nth(2), env::args().nth(3)) {
        match history.add_vaccination(&vaccine, &date).await {
            Ok(rows) => println!("Recorded {}; {} vaccination(s) on file", vaccine, rows.len()),
            Err(e) => println!("Could not record vaccination: {}", e),
        }
    }

    println!("Vaccinations:");
    for row in history.vaccinations(SortDirection::Descending).await {
        let flag = if row.due_soon { "  (due soon)" } else { "" };
        let record = &row.record;
        println!("  {} given {} due {}{}", record.vaccine, record.date, record.due, flag);
    }

    println!("Grooming:");
    for visit in history.grooming(SortDirection::Descending).await {
        println!("  {} {} {}", visit.date, visit.service, visit.notes);
    }

    println!("Bookings:");
    for booking in history.bookings().await {
        println!(
            "  {} {} -> {} [{:?}: {:?}]",
            booking.kind,
            booking.start,
            booking.end,
            booking.status,
            BadgeVariant::from(booking.status)
        );
    }

    dashboard.shutdown().await;
    Ok(())
}
