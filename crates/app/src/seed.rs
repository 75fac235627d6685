//! Loads the starter catalog from JSON files.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use seaside_models::{ReviewInput, TourInput};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::info;
use validator::Validate;

#[derive(Deserialize)]
struct SeedTour {
    id: i64,
    #[serde(flatten)]
    fields: TourInput,
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    let contents = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
}

/// Replaces every collection with the contents of `tours.json` and
/// `reviews.json` in `data_dir`, then provisions the admin.
pub async fn run(pool: &SqlitePool, data_dir: &Path, username: &str, password: &str) -> Result<()> {
    let tours: Vec<SeedTour> = read_json(&data_dir.join("tours.json"))?;
    let reviews: Vec<ReviewInput> = read_json(&data_dir.join("reviews.json"))?;

    for tour in &tours {
        tour.fields
            .validate()
            .with_context(|| format!("tour {} in seed data", tour.id))?;
    }

    let mut reviews_by_tour: HashMap<i64, Vec<ReviewInput>> = HashMap::new();
    for review in reviews {
        reviews_by_tour.entry(review.tour_id).or_default().push(review);
    }

    seaside_db::clear_all(pool).await?;

    let mut review_count = 0;
    for tour in &tours {
        let reviews = reviews_by_tour.remove(&tour.id).unwrap_or_default();
        review_count += reviews.len();
        seaside_db::insert_tour_with_id(pool, tour.id, &tour.fields, &reviews).await?;
    }

    let hash = seaside_server::auth::hash_password(password)?;
    seaside_db::set_admin(pool, username, &hash).await?;

    info!("{} tours, {} reviews imported; admin is {username}", tours.len(), review_count);
    Ok(())
}
