use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use seaside_models::{AdditionalInfo, Review, ReviewInput, Tour, TourInput};
use sqlx::types::Json;
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::{new_key, timestamp};

const TOUR_COLUMNS: &str = "uid, id, name, price, description, image, images, duration, \
    additional_info, created_at, updated_at";

const REVIEW_COLUMNS: &str = "uid, tour_uid, tour_id, author, rating, comment, created_at, updated_at";

#[derive(FromRow)]
struct TourRow {
    uid: String,
    id: i64,
    name: String,
    price: f64,
    description: String,
    image: String,
    images: Json<Vec<String>>,
    duration: String,
    additional_info: Json<AdditionalInfo>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TourRow {
    fn into_tour(self, reviews: Vec<Review>) -> Tour {
        Tour {
            key: self.uid,
            id: self.id,
            name: self.name,
            price: self.price,
            description: self.description,
            image: self.image,
            images: self.images.0,
            duration: self.duration,
            additional_info: self.additional_info.0,
            reviews,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct OwnedReview {
    tour_uid: String,
    #[sqlx(flatten)]
    review: Review,
}

pub async fn list_tours(pool: &SqlitePool) -> Result<Vec<Tour>> {
    let rows = sqlx::query_as::<_, TourRow>(&format!("SELECT {TOUR_COLUMNS} FROM tours ORDER BY seq"))
        .fetch_all(pool)
        .await?;
    let reviews =
        sqlx::query_as::<_, OwnedReview>(&format!("SELECT {REVIEW_COLUMNS} FROM tour_reviews ORDER BY seq"))
            .fetch_all(pool)
            .await?;

    let mut by_tour: HashMap<String, Vec<Review>> = HashMap::new();
    for owned in reviews {
        by_tour.entry(owned.tour_uid).or_default().push(owned.review);
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let reviews = by_tour.remove(&row.uid).unwrap_or_default();
            row.into_tour(reviews)
        })
        .collect())
}

pub async fn get_tour(pool: &SqlitePool, key: &str) -> Result<Option<Tour>> {
    let row = sqlx::query_as::<_, TourRow>(&format!("SELECT {TOUR_COLUMNS} FROM tours WHERE uid = ?"))
        .bind(key)
        .fetch_optional(pool)
        .await?;
    let Some(row) = row else {
        return Ok(None);
    };
    let reviews = reviews_for(pool, key).await?;
    Ok(Some(row.into_tour(reviews)))
}

/// Inserts a tour under the next public id: one past the larger of the
/// current maximum and every id ever handed out.
pub async fn create_tour(pool: &SqlitePool, input: &TourInput) -> Result<Tour> {
    let mut tx = pool.begin().await?;
    let id: i64 = sqlx::query_scalar(
        "UPDATE sequences \
         SET value = MAX(value, COALESCE((SELECT MAX(id) FROM tours), 0)) + 1 \
         WHERE name = 'tours' \
         RETURNING value",
    )
    .fetch_one(&mut *tx)
    .await?;
    let tour = insert_tour(&mut tx, id, input).await?;
    tx.commit().await?;
    debug!("Tour {} created with id {}", tour.key, tour.id);
    Ok(tour)
}

/// Inserts a tour under a caller-chosen public id, together with its
/// reviews in the given order. Used by the seeder.
pub async fn insert_tour_with_id(
    pool: &SqlitePool,
    id: i64,
    input: &TourInput,
    reviews: &[ReviewInput],
) -> Result<Tour> {
    let mut tx = pool.begin().await?;
    sqlx::query("UPDATE sequences SET value = MAX(value, ?) WHERE name = 'tours'")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let mut tour = insert_tour(&mut tx, id, input).await?;
    for review in reviews {
        let review = insert_review(&mut tx, &tour.key, review).await?;
        tour.reviews.push(review);
    }
    tx.commit().await?;
    Ok(tour)
}

async fn insert_tour(conn: &mut SqliteConnection, id: i64, input: &TourInput) -> Result<Tour> {
    let key = new_key();
    let now = Utc::now();
    sqlx::query(
        "INSERT INTO tours (uid, id, name, price, description, image, images, duration, \
            additional_info, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&key)
    .bind(id)
    .bind(&input.name)
    .bind(input.price)
    .bind(&input.description)
    .bind(&input.image)
    .bind(Json(&input.images))
    .bind(&input.duration)
    .bind(Json(&input.additional_info))
    .bind(timestamp(now))
    .bind(timestamp(now))
    .execute(&mut *conn)
    .await?;

    Ok(Tour {
        key,
        id,
        name: input.name.clone(),
        price: input.price,
        description: input.description.clone(),
        image: input.image.clone(),
        images: input.images.clone(),
        duration: input.duration.clone(),
        additional_info: input.additional_info.clone(),
        reviews: Vec::new(),
        created_at: now,
        updated_at: now,
    })
}

/// Replaces the mutable fields. The public id and reviews are untouched.
pub async fn update_tour(pool: &SqlitePool, key: &str, input: &TourInput) -> Result<Option<Tour>> {
    let result = sqlx::query(
        "UPDATE tours SET name = ?, price = ?, description = ?, image = ?, images = ?, \
            duration = ?, additional_info = ?, updated_at = ? \
         WHERE uid = ?",
    )
    .bind(&input.name)
    .bind(input.price)
    .bind(&input.description)
    .bind(&input.image)
    .bind(Json(&input.images))
    .bind(&input.duration)
    .bind(Json(&input.additional_info))
    .bind(timestamp(Utc::now()))
    .bind(key)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_tour(pool, key).await
}

/// Removes the tour; its reviews go with it through the foreign key.
pub async fn delete_tour(pool: &SqlitePool, key: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM tours WHERE uid = ?")
        .bind(key)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn list_reviews(pool: &SqlitePool, key: &str) -> Result<Option<Vec<Review>>> {
    if !tour_exists(pool, key).await? {
        return Ok(None);
    }
    Ok(Some(reviews_for(pool, key).await?))
}

/// Appends a review with a single `INSERT .. SELECT`, so concurrent
/// submissions to the same tour take one write lock each and never
/// overwrite each other. `None` when the tour does not exist.
pub async fn add_review(pool: &SqlitePool, key: &str, input: &ReviewInput) -> Result<Option<Review>> {
    let review_key = new_key();
    let now = Utc::now();
    let result = sqlx::query(
        "INSERT INTO tour_reviews (uid, tour_uid, tour_id, author, rating, comment, created_at, updated_at) \
         SELECT ?, uid, ?, ?, ?, ?, ?, ? FROM tours WHERE uid = ?",
    )
    .bind(&review_key)
    .bind(input.tour_id)
    .bind(&input.author)
    .bind(input.rating)
    .bind(&input.comment)
    .bind(timestamp(now))
    .bind(timestamp(now))
    .bind(key)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }
    Ok(Some(review_from_input(review_key, input, now)))
}

async fn insert_review(conn: &mut SqliteConnection, tour_key: &str, input: &ReviewInput) -> Result<Review> {
    let key = new_key();
    let now = Utc::now();
    sqlx::query(
        "INSERT INTO tour_reviews (uid, tour_uid, tour_id, author, rating, comment, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&key)
    .bind(tour_key)
    .bind(input.tour_id)
    .bind(&input.author)
    .bind(input.rating)
    .bind(&input.comment)
    .bind(timestamp(now))
    .bind(timestamp(now))
    .execute(&mut *conn)
    .await?;

    Ok(review_from_input(key, input, now))
}

fn review_from_input(key: String, input: &ReviewInput, now: DateTime<Utc>) -> Review {
    Review {
        key,
        tour_id: input.tour_id,
        author: input.author.clone(),
        rating: input.rating,
        comment: input.comment.clone(),
        created_at: now,
        updated_at: now,
    }
}

async fn reviews_for(pool: &SqlitePool, key: &str) -> Result<Vec<Review>> {
    let reviews = sqlx::query_as::<_, Review>(&format!(
        "SELECT {REVIEW_COLUMNS} FROM tour_reviews WHERE tour_uid = ? ORDER BY seq"
    ))
    .bind(key)
    .fetch_all(pool)
    .await?;
    Ok(reviews)
}

async fn tour_exists(pool: &SqlitePool, key: &str) -> Result<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM tours WHERE uid = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;
    Ok(found.is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_pool;

    fn sample(name: &str) -> TourInput {
        TourInput {
            name: name.to_string(),
            price: 160.0,
            description: "Lighthouse and fishing village".to_string(),
            image: "data:image/jpeg;base64,/9j/4AAQSkZJRgABAQ==".to_string(),
            images: vec!["data:image/jpeg;base64,AAAA".to_string()],
            duration: "4 Hours".to_string(),
            additional_info: AdditionalInfo {
                group_size: "Up to 6 passengers".to_string(),
                included: vec!["Bottled water".to_string()],
                not_included: vec!["Gratuities".to_string()],
            },
        }
    }

    fn review(author: &str, tour_id: i64) -> ReviewInput {
        ReviewInput {
            author: author.to_string(),
            rating: 5.0,
            comment: "Wonderful".to_string(),
            tour_id,
        }
    }

    #[tokio::test]
    async fn first_tour_gets_id_one() {
        let pool = test_pool().await;
        let tour = create_tour(&pool, &sample("Peggy's Cove")).await.unwrap();
        assert_eq!(tour.id, 1);
        assert!(tour.reviews.is_empty());
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_deleting_the_highest() {
        let pool = test_pool().await;
        create_tour(&pool, &sample("A")).await.unwrap();
        let second = create_tour(&pool, &sample("B")).await.unwrap();
        assert_eq!(second.id, 2);

        assert!(delete_tour(&pool, &second.key).await.unwrap());
        let third = create_tour(&pool, &sample("C")).await.unwrap();
        assert_eq!(third.id, 3);
    }

    #[tokio::test]
    async fn seeded_ids_advance_the_sequence() {
        let pool = test_pool().await;
        insert_tour_with_id(&pool, 7, &sample("Seeded"), &[]).await.unwrap();
        let next = create_tour(&pool, &sample("Next")).await.unwrap();
        assert_eq!(next.id, 8);
    }

    #[tokio::test]
    async fn get_returns_stored_fields_verbatim() {
        let pool = test_pool().await;
        let input = sample("Lunenburg");
        let created = create_tour(&pool, &input).await.unwrap();

        let fetched = get_tour(&pool, &created.key).await.unwrap().unwrap();
        assert_eq!(fetched.image, input.image);
        assert_eq!(fetched.images, input.images);
        assert_eq!(fetched.additional_info, input.additional_info);
        assert!(get_tour(&pool, "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_replaces_fields_but_keeps_id_and_reviews() {
        let pool = test_pool().await;
        let created = create_tour(&pool, &sample("Old")).await.unwrap();
        add_review(&pool, &created.key, &review("Emily", created.id)).await.unwrap();

        let mut input = sample("New");
        input.price = 199.0;
        let updated = update_tour(&pool, &created.key, &input).await.unwrap().unwrap();
        assert_eq!(updated.name, "New");
        assert_eq!(updated.price, 199.0);
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.reviews.len(), 1);

        assert!(update_tour(&pool, "missing", &input).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn reviews_keep_submission_order() {
        let pool = test_pool().await;
        let tour = create_tour(&pool, &sample("Halifax")).await.unwrap();
        for author in ["first", "second", "third"] {
            add_review(&pool, &tour.key, &review(author, tour.id)).await.unwrap();
        }
        let reviews = list_reviews(&pool, &tour.key).await.unwrap().unwrap();
        let authors: Vec<_> = reviews.iter().map(|r| r.author.as_str()).collect();
        assert_eq!(authors, ["first", "second", "third"]);

        let listed = list_tours(&pool).await.unwrap();
        assert_eq!(listed[0].reviews.len(), 3);
    }

    #[tokio::test]
    async fn deleting_a_tour_drops_its_reviews() {
        let pool = test_pool().await;
        let tour = create_tour(&pool, &sample("Gone")).await.unwrap();
        add_review(&pool, &tour.key, &review("Brian", tour.id)).await.unwrap();

        assert!(delete_tour(&pool, &tour.key).await.unwrap());
        assert!(!delete_tour(&pool, &tour.key).await.unwrap());
        assert!(list_reviews(&pool, &tour.key).await.unwrap().is_none());
        assert!(add_review(&pool, &tour.key, &review("Late", tour.id)).await.unwrap().is_none());

        let orphans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM tour_reviews")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(orphans, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_reviews_on_a_file_database_are_all_stored() {
        let path = std::env::temp_dir().join(format!("seaside-reviews-{}.db", new_key()));
        let pool = crate::connect(&format!("sqlite:{}", path.display())).await.unwrap();
        crate::migrate(&pool).await.unwrap();
        let tour = create_tour(&pool, &sample("Busy")).await.unwrap();

        let mut handles = Vec::new();
        for n in 0..64 {
            let pool = pool.clone();
            let key = tour.key.clone();
            let input = review(&format!("guest {n}"), tour.id);
            handles.push(tokio::spawn(async move { add_review(&pool, &key, &input).await }));
        }
        for handle in handles {
            let stored = handle.await.unwrap().unwrap();
            assert!(stored.is_some());
        }

        let reviews = list_reviews(&pool, &tour.key).await.unwrap().unwrap();
        assert_eq!(reviews.len(), 64);

        pool.close().await;
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
        }
    }
}
