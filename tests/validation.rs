// Checks that need no database: constructor validation short-circuits before
// any query runs, so a lazy pool that never connects is enough.

use std::sync::Mutex;

use catalog_store::{
    error::StoreError,
    mail::{Mailer, OutgoingEmail},
    models::User,
    store::{
        accounts::{self, NewUser},
        carts,
        products::{self, NewProduct, UpdateProduct, thumbnail_path},
        reviews::{self, NewReview},
    },
};
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

fn lazy_pool() -> sqlx::PgPool {
    PgPoolOptions::new()
        .connect_lazy("postgres://localhost/unreachable")
        .expect("lazy pool")
}

fn sample_product(name: &str) -> NewProduct {
    NewProduct {
        thumbnail: thumbnail_path("sample.jpg"),
        name: name.to_string(),
        price: 100,
        description: "sample".to_string(),
    }
}

fn sample_user(email: &str) -> User {
    User {
        id: Uuid::new_v4(),
        email: email.to_string(),
        name: "Sample".to_string(),
        password_hash: "x".to_string(),
        is_staff: false,
        is_superuser: false,
        is_active: true,
        date_joined: Utc::now(),
    }
}

#[tokio::test]
async fn create_user_requires_email() {
    let pool = lazy_pool();
    let err = accounts::create_user(&pool, NewUser::new("", "Nobody", "pw"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
}

#[tokio::test]
async fn create_user_rejects_overlong_fields() {
    let pool = lazy_pool();
    let long = "x".repeat(151);

    let err = accounts::create_user(&pool, NewUser::new(long.clone(), "Name", "pw"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));

    let err = accounts::create_user(&pool, NewUser::new("a@b.com", long, "pw"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
}

#[tokio::test]
async fn create_superuser_rejects_contradictory_flags() {
    let pool = lazy_pool();
    let new = NewUser {
        is_staff: Some(false),
        ..NewUser::new("root@example.com", "Root", "pw")
    };
    let err = accounts::create_superuser(&pool, new).await.unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));

    let new = NewUser {
        is_superuser: Some(false),
        ..NewUser::new("root@example.com", "Root", "pw")
    };
    let err = accounts::create_superuser(&pool, new).await.unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
}

#[tokio::test]
async fn create_product_rejects_bad_names() {
    let pool = lazy_pool();

    let err = products::create_product(&pool, sample_product(""))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));

    let err = products::create_product(&pool, sample_product(&"x".repeat(151)))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
}

#[tokio::test]
async fn update_product_rejects_empty_name() {
    let pool = lazy_pool();
    let update = UpdateProduct {
        name: Some(String::new()),
        ..UpdateProduct::default()
    };
    let err = products::update_product(&pool, Uuid::new_v4(), update)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
}

#[tokio::test]
async fn add_review_rejects_overlong_title() {
    let pool = lazy_pool();
    let new = NewReview {
        user_id: Uuid::new_v4(),
        product_id: Uuid::new_v4(),
        rating: 3,
        title: "x".repeat(256),
        comment: None,
    };
    let err = reviews::add_review(&pool, new).await.unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
}

#[tokio::test]
async fn cart_add_item_rejects_nonpositive_amount() {
    let pool = lazy_pool();
    let err = carts::add_item(&pool, Uuid::new_v4(), Uuid::new_v4(), 0)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Validation(_)));
}

#[test]
fn username_is_always_the_email() {
    let user = sample_user("carol@example.com");
    assert_eq!(user.username(), user.email);
}

#[test]
fn password_hash_round_trip() {
    let hash = accounts::hash_password("secret").expect("hash");
    assert_ne!(hash, "secret");

    let mut user = sample_user("dave@example.com");
    user.password_hash = hash;
    assert!(accounts::verify_password(&user, "secret").expect("verify"));
    assert!(!accounts::verify_password(&user, "other").expect("verify"));
}

#[test]
fn thumbnail_paths_are_namespaced_and_unique() {
    let a = thumbnail_path("cover.jpg");
    let b = thumbnail_path("cover.jpg");
    assert!(a.starts_with("thumbnails/"));
    assert!(a.ends_with("cover.jpg"));
    assert_ne!(a, b);
}

#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<OutgoingEmail>>,
}

impl Mailer for RecordingMailer {
    async fn send(&self, mail: OutgoingEmail) -> anyhow::Result<()> {
        self.sent.lock().expect("mailer lock").push(mail);
        Ok(())
    }
}

struct FailingMailer;

impl Mailer for FailingMailer {
    async fn send(&self, _mail: OutgoingEmail) -> anyhow::Result<()> {
        anyhow::bail!("transport down")
    }
}

#[tokio::test]
async fn email_user_targets_the_account_address() {
    let mailer = RecordingMailer::default();
    let user = sample_user("erin@example.com");

    accounts::email_user(
        &mailer,
        &user,
        "Welcome",
        "Hello!",
        Some("shop@example.com"),
        None,
    )
    .await
    .expect("send");

    let sent = mailer.sent.lock().expect("mailer lock");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, vec!["erin@example.com".to_string()]);
    assert_eq!(sent[0].from.as_deref(), Some("shop@example.com"));
    assert_eq!(sent[0].subject, "Welcome");
}

#[tokio::test]
async fn email_user_propagates_transport_failures() {
    let user = sample_user("frank@example.com");
    let err = accounts::email_user(&FailingMailer, &user, "Hi", "Body", None, None).await;
    assert!(err.is_err());
}
