//! Seed the database with demo catalogue data.
//!
//! Inserts a small Moscow catalogue (restaurants, categories, products and
//! the menu availability matrix) for local development. The command is
//! idempotent: if any restaurant already exists it does nothing, so it is
//! safe to run on every dev-environment start.

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use thiserror::Error;
use tracing::info;

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Seed demo data.
///
/// # Errors
///
/// Returns `SeedError` if the database URL is missing or a statement fails;
/// on failure the transaction is rolled back and nothing is inserted.
pub async fn run() -> Result<(), SeedError> {
    dotenvy::dotenv().ok();

    let database_url =
        super::database_url().ok_or(SeedError::MissingEnvVar("FOODCART_DATABASE_URL"))?;

    info!("Connecting to database...");
    let pool = PgPool::connect(&database_url).await?;

    let populated: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM restaurant)")
        .fetch_one(&pool)
        .await?;
    if populated {
        info!("Restaurants already present, nothing to seed");
        return Ok(());
    }

    let mut tx = pool.begin().await?;

    let pizza = insert_category(&mut tx, "Pizza").await?;
    let drinks = insert_category(&mut tx, "Drinks").await?;
    let desserts = insert_category(&mut tx, "Desserts").await?;

    let margherita = insert_product(
        &mut tx,
        "Margherita",
        pizza,
        Decimal::new(54000, 2),
        "Tomato, mozzarella, basil",
    )
    .await?;
    let pepperoni = insert_product(
        &mut tx,
        "Pepperoni",
        pizza,
        Decimal::new(62000, 2),
        "Spicy pepperoni and mozzarella",
    )
    .await?;
    let four_cheese = insert_product(
        &mut tx,
        "Four Cheese",
        pizza,
        Decimal::new(68000, 2),
        "Mozzarella, gorgonzola, parmesan, emmental",
    )
    .await?;
    let cola = insert_product(&mut tx, "Cola", drinks, Decimal::new(9000, 2), "0.5 l").await?;
    let juice = insert_product(
        &mut tx,
        "Orange juice",
        drinks,
        Decimal::new(14000, 2),
        "Freshly squeezed, 0.3 l",
    )
    .await?;
    let cheesecake = insert_product(
        &mut tx,
        "Cheesecake",
        desserts,
        Decimal::new(21000, 2),
        "New York style",
    )
    .await?;

    let arbat = insert_restaurant(
        &mut tx,
        "Foodcart Arbat",
        "Moscow, Arbat St 21",
        "+79030000001",
    )
    .await?;
    let tverskaya = insert_restaurant(
        &mut tx,
        "Foodcart Tverskaya",
        "Moscow, Tverskaya St 7",
        "+79030000002",
    )
    .await?;
    let taganka = insert_restaurant(
        &mut tx,
        "Foodcart Taganka",
        "Moscow, Taganskaya St 3",
        "+79030000003",
    )
    .await?;

    // Arbat makes everything; Tverskaya is out of Four Cheese; Taganka has
    // no dessert rows at all (absent means unavailable).
    let menu: &[(i32, i32, bool)] = &[
        (arbat, margherita, true),
        (arbat, pepperoni, true),
        (arbat, four_cheese, true),
        (arbat, cola, true),
        (arbat, juice, true),
        (arbat, cheesecake, true),
        (tverskaya, margherita, true),
        (tverskaya, pepperoni, true),
        (tverskaya, four_cheese, false),
        (tverskaya, cola, true),
        (tverskaya, juice, true),
        (tverskaya, cheesecake, true),
        (taganka, margherita, true),
        (taganka, pepperoni, true),
        (taganka, four_cheese, true),
        (taganka, cola, true),
        (taganka, juice, true),
    ];
    for &(restaurant_id, product_id, availability) in menu {
        insert_menu_item(&mut tx, restaurant_id, product_id, availability).await?;
    }

    tx.commit().await?;

    info!(
        restaurants = 3,
        products = 6,
        menu_items = menu.len(),
        "Demo data seeded"
    );
    Ok(())
}

async fn insert_category(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar("INSERT INTO product_category (name) VALUES ($1) RETURNING id")
        .bind(name)
        .fetch_one(&mut **tx)
        .await
}

async fn insert_product(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
    category_id: i32,
    price: Decimal,
    description: &str,
) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar(
        r"
        INSERT INTO product (name, category_id, price, description, special_offer)
        VALUES ($1, $2, $3, $4, FALSE)
        RETURNING id
        ",
    )
    .bind(name)
    .bind(category_id)
    .bind(price)
    .bind(description)
    .fetch_one(&mut **tx)
    .await
}

async fn insert_restaurant(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
    address: &str,
    contact_phone: &str,
) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar(
        r"
        INSERT INTO restaurant (name, address, contact_phone)
        VALUES ($1, $2, $3)
        RETURNING id
        ",
    )
    .bind(name)
    .bind(address)
    .bind(contact_phone)
    .fetch_one(&mut **tx)
    .await
}

async fn insert_menu_item(
    tx: &mut Transaction<'_, Postgres>,
    restaurant_id: i32,
    product_id: i32,
    availability: bool,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r"
        INSERT INTO restaurant_menu_item (restaurant_id, product_id, availability)
        VALUES ($1, $2, $3)
        ",
    )
    .bind(restaurant_id)
    .bind(product_id)
    .bind(availability)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
