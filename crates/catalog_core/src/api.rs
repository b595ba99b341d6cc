use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Genre, GenreId, Movie, MovieId},
    error::ApiError,
    protocol::{genres_route, movies_route, NewGenre, NewMovie},
};
use url::Url;

use crate::{config::ClientSettings, error::CatalogError};

/// Remote collaborator the store proxies its mutations through.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn list_movies(&self) -> Result<Vec<Movie>, CatalogError>;
    async fn create_movie(&self, movie: &NewMovie) -> Result<Movie, CatalogError>;
    async fn update_movie(&self, movie: &Movie) -> Result<Movie, CatalogError>;
    async fn delete_movie(&self, id: &MovieId) -> Result<(), CatalogError>;
    async fn list_genres(&self) -> Result<Vec<Genre>, CatalogError>;
    async fn create_genre(&self, genre: &NewGenre) -> Result<Genre, CatalogError>;
    async fn delete_genre(&self, id: &GenreId) -> Result<(), CatalogError>;
}

/// JSON-over-HTTP client for the `/movies` and `/genres` endpoints.
pub struct HttpCatalogApi {
    http: Client,
    base_url: Url,
}

impl HttpCatalogApi {
    pub fn new(base_url: &str) -> Result<Self, CatalogError> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, CatalogError> {
        let parsed = Url::parse(base_url.trim()).map_err(|e| CatalogError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        if parsed.cannot_be_a_base() {
            return Err(CatalogError::InvalidBaseUrl {
                url: base_url.to_string(),
                reason: "url cannot carry a path".to_string(),
            });
        }
        Ok(Self {
            http,
            base_url: parsed,
        })
    }

    /// `Ok(None)` when no base url is configured, i.e. the store runs locally.
    pub fn from_settings(settings: &ClientSettings) -> Result<Option<Self>, CatalogError> {
        let Some(base_url) = settings.api_base_url.as_deref() else {
            return Ok(None);
        };
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;
        Self::with_client(http, base_url).map(Some)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, route: &str, id: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        // Checked in the constructor: the base url always accepts path segments.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty();
            segments.push(route.trim_start_matches('/'));
            if let Some(id) = id {
                segments.push(id);
            }
        }
        url
    }
}

async fn ensure_success(response: Response) -> Result<Response, CatalogError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ApiError>(&body) {
        Ok(api_error) => api_error.message,
        Err(_) if !body.trim().is_empty() => body,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("unknown status")
            .to_string(),
    };
    Err(CatalogError::Status {
        status: status.as_u16(),
        message,
    })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, CatalogError> {
    Ok(ensure_success(response).await?.json().await?)
}

#[async_trait]
impl CatalogApi for HttpCatalogApi {
    async fn list_movies(&self) -> Result<Vec<Movie>, CatalogError> {
        let response = self
            .http
            .get(self.endpoint(movies_route(), None))
            .send()
            .await?;
        read_json(response).await
    }

    async fn create_movie(&self, movie: &NewMovie) -> Result<Movie, CatalogError> {
        let response = self
            .http
            .post(self.endpoint(movies_route(), None))
            .json(movie)
            .send()
            .await?;
        read_json(response).await
    }

    async fn update_movie(&self, movie: &Movie) -> Result<Movie, CatalogError> {
        let response = self
            .http
            .put(self.endpoint(movies_route(), Some(movie.id.as_str())))
            .json(movie)
            .send()
            .await?;
        read_json(response).await
    }

    async fn delete_movie(&self, id: &MovieId) -> Result<(), CatalogError> {
        let response = self
            .http
            .delete(self.endpoint(movies_route(), Some(id.as_str())))
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }

    async fn list_genres(&self) -> Result<Vec<Genre>, CatalogError> {
        let response = self
            .http
            .get(self.endpoint(genres_route(), None))
            .send()
            .await?;
        read_json(response).await
    }

    async fn create_genre(&self, genre: &NewGenre) -> Result<Genre, CatalogError> {
        let response = self
            .http
            .post(self.endpoint(genres_route(), None))
            .json(genre)
            .send()
            .await?;
        read_json(response).await
    }

    async fn delete_genre(&self, id: &GenreId) -> Result<(), CatalogError> {
        let response = self
            .http
            .delete(self.endpoint(genres_route(), Some(id.as_str())))
            .send()
            .await?;
        ensure_success(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_tolerates_trailing_slash_and_prefix() {
        let api = HttpCatalogApi::new("http://localhost:3000/api/").expect("api");
        assert_eq!(
            api.endpoint(movies_route(), Some("42")).as_str(),
            "http://localhost:3000/api/movies/42"
        );

        let api = HttpCatalogApi::new("http://localhost:3000").expect("api");
        assert_eq!(
            api.endpoint(genres_route(), None).as_str(),
            "http://localhost:3000/genres"
        );
    }

    #[test]
    fn endpoint_escapes_ids() {
        let api = HttpCatalogApi::new("http://localhost:3000").expect("api");
        assert_eq!(
            api.endpoint(movies_route(), Some("a b/c")).as_str(),
            "http://localhost:3000/movies/a%20b%2Fc"
        );
    }

    #[test]
    fn rejects_unusable_base_urls() {
        assert!(matches!(
            HttpCatalogApi::new("not a url"),
            Err(CatalogError::InvalidBaseUrl { .. })
        ));
        assert!(matches!(
            HttpCatalogApi::new("mailto:someone@example.com"),
            Err(CatalogError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn settings_without_url_mean_local_mode() {
        let settings = ClientSettings::default();
        assert!(HttpCatalogApi::from_settings(&settings)
            .expect("settings")
            .is_none());
    }
}
