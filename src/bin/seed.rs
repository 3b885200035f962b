use catalog_store::{
    config::AppConfig,
    db,
    error::StoreError,
    store::{
        accounts::{self, NewUser},
        products::{self, NewProduct, thumbnail_path},
    },
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;

    ensure_superuser(&pool, "admin@example.com", "Admin", "admin123").await?;
    ensure_user(&pool, "user@example.com", "Sample User", "user123").await?;
    seed_products(&pool).await?;

    tracing::info!("seed completed");
    Ok(())
}

async fn ensure_superuser(
    pool: &db::DbPool,
    email: &str,
    name: &str,
    password: &str,
) -> anyhow::Result<()> {
    match accounts::create_superuser(pool, NewUser::new(email, name, password)).await {
        Ok(user) => tracing::info!(user_id = %user.id, email, "superuser created"),
        // Re-running the seed against an existing database is fine.
        Err(StoreError::Conflict(_)) => tracing::info!(email, "superuser already present"),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

async fn ensure_user(
    pool: &db::DbPool,
    email: &str,
    name: &str,
    password: &str,
) -> anyhow::Result<()> {
    match accounts::create_user(pool, NewUser::new(email, name, password)).await {
        Ok(user) => tracing::info!(user_id = %user.id, email, "user created"),
        Err(StoreError::Conflict(_)) => tracing::info!(email, "user already present"),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

async fn seed_products(pool: &db::DbPool) -> anyhow::Result<()> {
    let products = vec![
        ("Walnut Desk Organizer", "Keeps pens and cables in one place", 450_000),
        ("Ceramic Pour-Over Set", "Hand-glazed dripper and carafe", 620_000),
        ("Linen Tote Bag", "Everyday carry, machine washable", 180_000),
        ("Field Notebook 3-Pack", "Dot grid, lay-flat binding", 95_000),
    ];

    for (name, description, price) in products {
        let existing: Option<(uuid::Uuid,)> =
            sqlx::query_as("SELECT id FROM products WHERE name = $1")
                .bind(name)
                .fetch_optional(pool)
                .await?;
        if existing.is_some() {
            continue;
        }

        products::create_product(
            pool,
            NewProduct {
                thumbnail: thumbnail_path(&format!("{}.jpg", name.to_lowercase().replace(' ', "-"))),
                name: name.to_string(),
                price,
                description: description.to_string(),
            },
        )
        .await?;
    }

    tracing::info!("products seeded");
    Ok(())
}
