use dotenv::dotenv;
use log::info;
use std::env;

use pawsport::prelude::*;

/// Usage: dashboard_demo [search] [new weight]
#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    pretty_env_logger::init();

    let search = env::args().nth(1).unwrap_or_default();
    let new_weight = env::args().nth(2);

    let dashboard = Pawsport::from_env()?;
    println!("Using API at {}", dashboard.options().base_url);

    let directory = dashboard.directory().await;
    let view = directory.view(&search, false).await;
    println!("\n{} client(s) matching {:?}", view.len(), search);
    for entry in &view {
        println!("  {} <{}>", entry.client.name, entry.client.email);
        for pet in &entry.pets {
            println!("    - {} ({}, {})", pet.name, pet.breed, pet.weight_label());
        }
    }

    let pet_id = match view.first() {
        Some(entry) => directory.first_visible_pet(entry.client.id, false).await,
        None => None,
    };
    let Some(pet_id) = pet_id else {
        println!("\nNo active pet to edit");
        return Ok(());
    };

    let profile = dashboard.pet_profile(pet_id);
    let pet = profile.open().await?;
    let age = profile.age().await.unwrap_or_default();
    println!("\nOpened {}: {}, {}", pet.name, age, pet.weight_label());

    let weight = new_weight.unwrap_or_else(|| format!("{:.2}", pet.weight_kg + 0.5));
    profile.begin_edit().await?;
    profile.set_field(PetField::WeightKg, &weight).await?;
    info!("Saving weight {} for pet {}", weight, pet_id);

    match profile.save().await {
        Ok(saved) => println!("Saved: {}", saved.weight_label()),
        Err(Error::Validation(errors)) => println!("Not saved: {}", errors),
        Err(e) => {
            let shown = profile.pet().await.map(|p| p.weight_label()).unwrap_or_default();
            let state = profile.state().await;
            println!("Save failed ({}); showing {} again, still {:?}", e, shown, state);
        }
    }

    if let Some(pet) = directory.pet(pet_id).await {
        println!("Directory now shows {}", pet.weight_label());
    }

    for toast in dashboard.toasts().list().await {
        println!("[{:?}] {}", toast.kind, toast.message);
    }

    dashboard.shutdown().await;
    Ok(())
}
