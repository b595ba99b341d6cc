use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use shared::{
    domain::{Genre, GenreId, Movie, MovieId},
    error::{ApiError, ErrorCode},
    protocol::{genres_route, movies_route, NewGenre, NewMovie},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod api;
mod app_state;
mod config;

use api::CatalogRepository;
use app_state::AppState;
use config::load_settings;

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = load_settings();
    let repository = if settings.seed_data {
        CatalogRepository::seeded()
    } else {
        CatalogRepository::new()
    };
    let app = build_router(Arc::new(AppState { repository }));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, seed_data = settings.seed_data, "catalog server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    let movie_route = format!("{}/:id", movies_route());
    let genre_route = format!("{}/:id", genres_route());
    Router::new()
        .route("/healthz", get(healthz))
        .route(movies_route(), get(list_movies).post(create_movie))
        .route(
            &movie_route,
            get(get_movie).put(update_movie).delete(delete_movie),
        )
        .route(genres_route(), get(list_genres).post(create_genre))
        .route(&genre_route, delete(delete_genre))
        .with_state(state)
}

fn reject(err: ApiError) -> (StatusCode, Json<ApiError>) {
    let status = match err.code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_client_error() {
        warn!(%status, message = %err.message, "request rejected");
    }
    (status, Json(err))
}

async fn healthz() -> &'static str {
    "ok"
}

async fn list_movies(State(state): State<Arc<AppState>>) -> Json<Vec<Movie>> {
    Json(state.repository.list_movies().await)
}

async fn get_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Movie>> {
    state
        .repository
        .get_movie(&MovieId::new(id))
        .await
        .map(Json)
        .map_err(reject)
}

async fn create_movie(
    State(state): State<Arc<AppState>>,
    Json(new_movie): Json<NewMovie>,
) -> ApiResult<(StatusCode, Json<Movie>)> {
    let movie = state
        .repository
        .create_movie(new_movie)
        .await
        .map_err(reject)?;
    Ok((StatusCode::CREATED, Json(movie)))
}

async fn update_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(movie): Json<Movie>,
) -> ApiResult<Json<Movie>> {
    state
        .repository
        .update_movie(&MovieId::new(id), movie)
        .await
        .map(Json)
        .map_err(reject)
}

async fn delete_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .repository
        .delete_movie(&MovieId::new(id))
        .await
        .map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_genres(State(state): State<Arc<AppState>>) -> Json<Vec<Genre>> {
    Json(state.repository.list_genres().await)
}

async fn create_genre(
    State(state): State<Arc<AppState>>,
    Json(new_genre): Json<NewGenre>,
) -> ApiResult<(StatusCode, Json<Genre>)> {
    let genre = state
        .repository
        .create_genre(new_genre)
        .await
        .map_err(reject)?;
    Ok((StatusCode::CREATED, Json(genre)))
}

async fn delete_genre(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .repository
        .delete_genre(&GenreId::new(id))
        .await
        .map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
