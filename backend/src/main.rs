use axum::extract::{DefaultBodyLimit, State};
use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::{middleware, Router};
use diesel::prelude::*;
use std::net::SocketAddr;
use std::sync::Arc;

mod auth;
mod comments;
mod config;
mod db;
mod error;
mod images;
mod listings;
mod models;
mod purchases;
mod schema;
mod storage;
mod users;

// Multipart bodies carry image uploads; the axum default of 2 MiB is too
// small for phone photos.
const MAX_BODY_BYTES: usize = 25 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub config: config::AppConfig,
    pub store: Arc<dyn storage::ImageStore>,
}

async fn authenticate(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: axum::http::Request<axum::body::Body>,
    next: middleware::Next,
) -> Result<axum::response::Response, error::ApiError> {
    let user_id = auth::user_from_headers(&headers, &state.config.jwt_secret)?.ok_or_else(|| {
        error::ApiError::Unauthorized("Missing Authorization header".to_string())
    })?;
    request.extensions_mut().insert(auth::AuthUser(user_id));
    Ok(next.run(request).await)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let config = config::AppConfig::load()?;
    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));

    let mut conn = db::establish_connection(&config.database_url)?;
    let test_query: i32 = diesel::select(diesel::dsl::sql::<diesel::sql_types::Integer>("1"))
        .get_result(&mut conn)?;
    log::info!("Database test query result: {}", test_query);

    let store = Arc::new(storage::FsImageStore::new(
        config.media_root.clone(),
        &config.media_base_url,
    ));
    log::info!("Serving media from {} at {}", config.media_root, config.media_base_url);
    log::info!("Starting server on {}", addr);

    let state = AppState { config, store };
    let protected_routes = Router::new()
        .route("/api/listings", post(listings::create_listing))
        .route(
            "/api/listings/:id",
            get(listings::get_listing)
                .put(listings::update_listing)
                .patch(listings::update_listing)
                .delete(listings::delete_listing),
        )
        .route("/api/listings/:id/purchase", post(purchases::purchase_listing))
        .route(
            "/api/listings/:id/comments",
            get(comments::list_comments).post(comments::create_comment),
        )
        .route("/api/purchases", get(purchases::list_purchases))
        .route("/api/mylistings/:status", get(listings::my_listings))
        .route("/api/users/me", get(users::me))
        .layer(middleware::from_fn_with_state(state.clone(), authenticate));

    let app = Router::new()
        .route("/", get(|| async { "Furniture Marketplace API" }))
        .route("/api/user/register", post(users::register))
        .route("/api/token", post(users::login))
        .route("/api/homepage", get(listings::homepage))
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state);

    axum::serve(
        tokio::net::TcpListener::bind(addr).await?,
        app.into_make_service(),
    )
    .await?;

    Ok(())
}
