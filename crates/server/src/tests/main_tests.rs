use super::*;
use axum::{body, body::Body, http::Request, response::Response};
use shared::seed::SEED_GENRE_ID;
use tower::ServiceExt;

fn test_app() -> (Router, CatalogRepository) {
    let repository = CatalogRepository::seeded();
    let app = build_router(Arc::new(AppState {
        repository: repository.clone(),
    }));
    (app, repository)
}

fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

async fn read_json<T: serde::de::DeserializeOwned>(response: Response) -> T {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

#[tokio::test]
async fn healthz_reports_ok() {
    let (app, _repository) = test_app();
    let response = app
        .oneshot(empty_request("GET", "/healthz"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(body.as_ref(), b"ok");
}

#[tokio::test]
async fn lists_seeded_movies_in_camel_case() {
    let (app, _repository) = test_app();
    let response = app
        .oneshot(empty_request("GET", "/movies"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let movies: Vec<serde_json::Value> = read_json(response).await;
    assert_eq!(movies.len(), 1);
    assert_eq!(movies[0]["title"], "Spider Man");
    assert_eq!(movies[0]["releaseYear"], 2008);
    assert_eq!(movies[0]["genre"], serde_json::json!([SEED_GENRE_ID]));
}

#[tokio::test]
async fn create_then_fetch_movie() {
    let (app, repository) = test_app();
    let create = json_request(
        "POST",
        "/movies",
        serde_json::json!({
            "title": "Jaws",
            "description": "Shark",
            "releaseYear": 1975,
            "imageUrl": "https://example.com/jaws.jpg",
            "genre": [SEED_GENRE_ID]
        }),
    );
    let response = app.clone().oneshot(create).await.expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Movie = read_json(response).await;
    assert_eq!(created.title, "Jaws");
    assert!(!created.watched);

    let response = app
        .oneshot(empty_request("GET", &format!("/movies/{}", created.id)))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let fetched: Movie = read_json(response).await;
    assert_eq!(fetched, created);
    assert_eq!(repository.list_movies().await.len(), 2);
}

#[tokio::test]
async fn put_updates_watched_flag() {
    let (app, repository) = test_app();
    let mut movie = repository
        .get_movie(&MovieId::from("1"))
        .await
        .expect("seed");
    movie.watched = true;

    let response = app
        .oneshot(json_request(
            "PUT",
            "/movies/1",
            serde_json::to_value(&movie).expect("json"),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let saved: Movie = read_json(response).await;
    assert!(saved.watched);
}

#[tokio::test]
async fn unknown_movie_answers_not_found_body() {
    let (app, _repository) = test_app();
    let response = app
        .oneshot(empty_request("DELETE", "/movies/does-not-exist"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let err: ApiError = read_json(response).await;
    assert!(matches!(err.code, ErrorCode::NotFound));
    assert!(err.message.contains("does-not-exist"));
}

#[tokio::test]
async fn blank_title_is_bad_request() {
    let (app, _repository) = test_app();
    let response = app
        .oneshot(json_request(
            "POST",
            "/movies",
            serde_json::json!({ "title": "", "releaseYear": 2000 }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn genre_create_and_delete() {
    let (app, repository) = test_app();
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/genres",
            serde_json::json!({ "name": "Western" }),
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Genre = read_json(response).await;
    assert_eq!(created.name, "Western");

    let response = app
        .clone()
        .oneshot(empty_request("DELETE", &format!("/genres/{SEED_GENRE_ID}")))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(empty_request("GET", "/genres"))
        .await
        .expect("response");
    let genres: Vec<Genre> = read_json(response).await;
    assert_eq!(genres, vec![created]);
    assert!(repository
        .list_movies()
        .await
        .iter()
        .all(|movie| movie.genre.is_empty()));
}
