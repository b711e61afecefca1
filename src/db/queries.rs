//! Database queries for users and the tariff catalog

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Tariff, TariffStatus, User};

/// Get a user by id
pub async fn get_user_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, password_hash, is_moderator
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Get a user by username (login path)
pub async fn get_user_by_username(pool: &PgPool, username: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, password_hash, is_moderator
        FROM users
        WHERE username = $1
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Create a user account
pub async fn create_user(
    pool: &PgPool,
    username: &str,
    password_hash: &str,
    is_moderator: bool,
) -> Result<User> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (id, username, password_hash, is_moderator)
        VALUES ($1, $2, $3, $4)
        RETURNING id, username, password_hash, is_moderator
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(password_hash)
    .bind(is_moderator)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

/// Partially update a user profile. `None` fields are left untouched.
pub async fn update_user(
    pool: &PgPool,
    id: Uuid,
    username: Option<&str>,
    password_hash: Option<&str>,
) -> Result<User> {
    let user = sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET username = COALESCE($2, username),
            password_hash = COALESCE($3, password_hash)
        WHERE id = $1
        RETURNING id, username, password_hash, is_moderator
        "#,
    )
    .bind(id)
    .bind(username)
    .bind(password_hash)
    .fetch_one(pool)
    .await?;

    Ok(user)
}

/// Search active tariffs, optionally by case-insensitive name substring
pub async fn search_active_tariffs(pool: &PgPool, name: Option<&str>) -> Result<Vec<Tariff>> {
    let tariffs = sqlx::query_as::<_, Tariff>(
        r#"
        SELECT id, name, description, price, image, status
        FROM tariffs
        WHERE status = $1
          AND ($2::text IS NULL OR name ILIKE '%' || $2 || '%')
        ORDER BY name
        "#,
    )
    .bind(TariffStatus::Active.as_i16())
    .bind(name)
    .fetch_all(pool)
    .await?;

    Ok(tariffs)
}

/// Get a tariff by id, regardless of status
pub async fn get_tariff(pool: &PgPool, id: Uuid) -> Result<Option<Tariff>> {
    let tariff = sqlx::query_as::<_, Tariff>(
        r#"
        SELECT id, name, description, price, image, status
        FROM tariffs
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(tariff)
}

/// Create an active tariff
pub async fn create_tariff(
    pool: &PgPool,
    name: &str,
    description: &str,
    price: Decimal,
) -> Result<Tariff> {
    let tariff = sqlx::query_as::<_, Tariff>(
        r#"
        INSERT INTO tariffs (id, name, description, price, status)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING id, name, description, price, image, status
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(name)
    .bind(description)
    .bind(price)
    .bind(TariffStatus::Active.as_i16())
    .fetch_one(pool)
    .await?;

    Ok(tariff)
}

/// Partially update a tariff. `None` fields are left untouched.
pub async fn update_tariff(
    pool: &PgPool,
    id: Uuid,
    name: Option<&str>,
    description: Option<&str>,
    price: Option<Decimal>,
) -> Result<Tariff> {
    let tariff = sqlx::query_as::<_, Tariff>(
        r#"
        UPDATE tariffs
        SET name = COALESCE($2, name),
            description = COALESCE($3, description),
            price = COALESCE($4, price)
        WHERE id = $1
        RETURNING id, name, description, price, image, status
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(description)
    .bind(price)
    .fetch_one(pool)
    .await?;

    Ok(tariff)
}

/// Soft-delete a tariff by flipping its status to Retired
pub async fn retire_tariff(pool: &PgPool, id: Uuid) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE tariffs
        SET status = $2
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(TariffStatus::Retired.as_i16())
    .execute(pool)
    .await?;

    Ok(())
}

/// Replace a tariff's stored image (base64 data URL)
pub async fn set_tariff_image(pool: &PgPool, id: Uuid, image: &str) -> Result<Tariff> {
    let tariff = sqlx::query_as::<_, Tariff>(
        r#"
        UPDATE tariffs
        SET image = $2
        WHERE id = $1
        RETURNING id, name, description, price, image, status
        "#,
    )
    .bind(id)
    .bind(image)
    .fetch_one(pool)
    .await?;

    Ok(tariff)
}
