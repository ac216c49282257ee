use axum::{
    routing::{delete, get, post},
    Router,
};
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use std::env;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commerce_backend::{handlers, services::payments::PaymentProcessor, AppState};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,commerce_backend=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    // Connect to database
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    tracing::info!("Connecting to database...");
    let db = Database::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    tracing::info!("Running migrations...");
    migration::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    let state = AppState {
        db,
        payments: PaymentProcessor::new(),
    };

    // Build router
    let app = Router::new()
        .route("/", get(hello_commerce))
        .route("/carts", post(handlers::cart::create_cart))
        .route("/carts/{id}", get(handlers::cart::get_cart))
        .route("/carts/{id}/items", post(handlers::cart::add_item))
        .route(
            "/carts/{id}/items/{item_id}",
            delete(handlers::cart::remove_item),
        )
        .route("/carts/{id}/checkout", post(handlers::cart::checkout))
        .route("/orders/{id}", get(handlers::order::get_order))
        .route("/orders/{id}/process", post(handlers::order::process_order))
        .route("/orders/{id}/refund", post(handlers::order::refund_order))
        .route("/point-orders/{id}", get(handlers::order::get_point_order))
        .route(
            "/point-orders/{id}/complete",
            post(handlers::order::complete_point_order),
        )
        .route(
            "/point-orders/{id}/refund",
            post(handlers::order::refund_point_order),
        )
        .route(
            "/point-grants",
            post(handlers::point_account::grant_points),
        )
        .route(
            "/organisations/{id}/point-account",
            get(handlers::point_account::get_point_account),
        )
        .route(
            "/organisations/{id}/point-transactions",
            get(handlers::point_account::list_point_transactions),
        )
        .route("/bids/{id}/accept", post(handlers::bid::accept_bid))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    // Start server
    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap();

    tracing::info!("Server listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}

async fn hello_commerce() -> &'static str {
    "Commerce settlement backend is up"
}
