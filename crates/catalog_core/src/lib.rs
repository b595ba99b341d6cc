use std::sync::Arc;

use rand::Rng;
use shared::{
    domain::{CatalogView, Genre, GenreId, Movie, MovieId},
    protocol::{NewGenre, NewMovie},
};
use tokio::sync::{broadcast, Mutex};
use tracing::{error, info, warn};

pub mod api;
mod catalog;
pub mod config;
pub mod error;

pub use api::{CatalogApi, HttpCatalogApi};
pub use catalog::Catalog;
pub use error::CatalogError;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Notification sent after every state change of a [`CatalogStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    MoviesChanged,
    GenresChanged,
    ViewChanged(CatalogView),
    FilterChanged,
    RecommendationChanged(Option<MovieId>),
    Error(String),
}

/// Movies of one genre within the current view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenreGroup {
    pub genre: Genre,
    pub movies: Vec<Movie>,
}

struct StoreState {
    catalog: Catalog,
    error: Option<String>,
}

/// Shared catalog state with optional remote persistence.
///
/// Without an API every mutation is applied straight to the in-memory
/// [`Catalog`]. With one, mutations go through the API first and the
/// server's answer is written back. Failures never reach the caller: they
/// land in [`CatalogStore::error`], are logged, and are broadcast as
/// [`StoreEvent::Error`]. The lock is never held across a request, so
/// concurrent edits race and the last response wins.
pub struct CatalogStore {
    api: Option<Arc<dyn CatalogApi>>,
    inner: Mutex<StoreState>,
    events: broadcast::Sender<StoreEvent>,
}

impl CatalogStore {
    pub fn local(catalog: Catalog) -> Arc<Self> {
        Self::new_with_dependencies(catalog, None)
    }

    pub fn with_api(api: Arc<dyn CatalogApi>) -> Arc<Self> {
        Self::new_with_dependencies(Catalog::default(), Some(api))
    }

    pub fn new_with_dependencies(
        catalog: Catalog,
        api: Option<Arc<dyn CatalogApi>>,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            api,
            inner: Mutex::new(StoreState {
                catalog,
                error: None,
            }),
            events,
        })
    }

    pub fn is_remote(&self) -> bool {
        self.api.is_some()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: StoreEvent) {
        let _ = self.events.send(event);
    }

    async fn record_error(&self, action: &str, err: CatalogError) {
        error!(action, %err, "catalog request failed");
        let message = format!("failed to {action}: {err}");
        self.inner.lock().await.error = Some(message.clone());
        self.emit(StoreEvent::Error(message));
    }

    async fn begin_request(&self) {
        self.inner.lock().await.error = None;
    }

    pub async fn error(&self) -> Option<String> {
        self.inner.lock().await.error.clone()
    }

    pub async fn clear_error(&self) {
        self.inner.lock().await.error = None;
    }

    /// Copy of the whole in-memory catalog, view state included.
    pub async fn snapshot(&self) -> Catalog {
        self.inner.lock().await.catalog.clone()
    }

    pub async fn movies(&self) -> Vec<Movie> {
        self.inner.lock().await.catalog.movies().to_vec()
    }

    pub async fn genres(&self) -> Vec<Genre> {
        self.inner.lock().await.catalog.genres().to_vec()
    }

    pub async fn movie(&self, id: &MovieId) -> Option<Movie> {
        self.inner.lock().await.catalog.movie(id).cloned()
    }

    pub async fn current_view(&self) -> CatalogView {
        self.inner.lock().await.catalog.current_view()
    }

    pub async fn selected_genre(&self) -> Option<GenreId> {
        self.inner.lock().await.catalog.selected_genre().cloned()
    }

    pub async fn search_query(&self) -> String {
        self.inner.lock().await.catalog.search_query().to_string()
    }

    pub async fn watched_movies(&self) -> Vec<Movie> {
        cloned(self.inner.lock().await.catalog.watched_movies())
    }

    pub async fn unwatched_movies(&self) -> Vec<Movie> {
        cloned(self.inner.lock().await.catalog.unwatched_movies())
    }

    pub async fn current_movies(&self) -> Vec<Movie> {
        cloned(self.inner.lock().await.catalog.current_movies())
    }

    pub async fn filtered_movies(&self) -> Vec<Movie> {
        cloned(self.inner.lock().await.catalog.filtered_movies())
    }

    pub async fn movies_by_genre(&self) -> Vec<GenreGroup> {
        let guard = self.inner.lock().await;
        guard
            .catalog
            .movies_by_genre()
            .into_iter()
            .map(|(genre, movies)| GenreGroup {
                genre: genre.clone(),
                movies: cloned(movies),
            })
            .collect()
    }

    pub async fn recommended_movie(&self) -> Option<Movie> {
        self.inner.lock().await.catalog.recommended_movie().cloned()
    }

    pub async fn set_view(&self, view: CatalogView) {
        self.inner.lock().await.catalog.set_view(view);
        self.emit(StoreEvent::ViewChanged(view));
        self.emit(StoreEvent::RecommendationChanged(None));
    }

    pub async fn set_selected_genre(&self, genre_id: Option<GenreId>) {
        self.inner.lock().await.catalog.set_selected_genre(genre_id);
        self.emit(StoreEvent::FilterChanged);
        self.emit(StoreEvent::RecommendationChanged(None));
    }

    pub async fn set_search_query(&self, query: impl Into<String>) {
        self.inner.lock().await.catalog.set_search_query(query);
        self.emit(StoreEvent::FilterChanged);
    }

    pub async fn generate_recommendation(&self, genre_id: &GenreId) -> Option<Movie> {
        let picked = self
            .inner
            .lock()
            .await
            .catalog
            .generate_recommendation(genre_id)
            .cloned();
        self.announce_recommendation(picked)
    }

    pub async fn generate_recommendation_with<R>(
        &self,
        rng: &mut R,
        genre_id: &GenreId,
    ) -> Option<Movie>
    where
        R: Rng + ?Sized,
    {
        let picked = self
            .inner
            .lock()
            .await
            .catalog
            .generate_recommendation_with(rng, genre_id)
            .cloned();
        self.announce_recommendation(picked)
    }

    fn announce_recommendation(&self, picked: Option<Movie>) -> Option<Movie> {
        self.emit(StoreEvent::RecommendationChanged(
            picked.as_ref().map(|movie| movie.id.clone()),
        ));
        picked
    }

    /// Replaces both collections with the server's contents.
    pub async fn load(&self) {
        if let Err(err) = self.load_impl().await {
            self.record_error("load catalog", err).await;
        }
    }

    pub async fn add_movie(&self, movie: Movie) {
        if let Err(err) = self.add_movie_impl(movie).await {
            self.record_error("add movie", err).await;
        }
    }

    pub async fn update_movie(&self, movie: Movie) {
        if let Err(err) = self.update_movie_impl(movie).await {
            self.record_error("update movie", err).await;
        }
    }

    pub async fn remove_movie(&self, id: &MovieId) {
        if let Err(err) = self.remove_movie_impl(id).await {
            self.record_error("remove movie", err).await;
        }
    }

    pub async fn toggle_watched(&self, id: &MovieId) {
        if let Err(err) = self.toggle_watched_impl(id).await {
            self.record_error("update watched status", err).await;
        }
    }

    pub async fn add_genre(&self, genre: Genre) {
        if let Err(err) = self.add_genre_impl(genre).await {
            self.record_error("add genre", err).await;
        }
    }

    pub async fn remove_genre(&self, id: &GenreId) {
        if let Err(err) = self.remove_genre_impl(id).await {
            self.record_error("remove genre", err).await;
        }
    }

    async fn load_impl(&self) -> Result<(), CatalogError> {
        let Some(api) = &self.api else {
            warn!("load requested on a local catalog store; nothing to fetch");
            return Ok(());
        };
        self.begin_request().await;

        let movies = api.list_movies().await?;
        let genres = api.list_genres().await?;
        info!(movies = movies.len(), genres = genres.len(), "catalog loaded");

        {
            let mut guard = self.inner.lock().await;
            guard.catalog.replace_movies(movies);
            guard.catalog.replace_genres(genres);
        }
        self.emit(StoreEvent::MoviesChanged);
        self.emit(StoreEvent::GenresChanged);
        Ok(())
    }

    async fn add_movie_impl(&self, movie: Movie) -> Result<(), CatalogError> {
        match &self.api {
            None => self.inner.lock().await.catalog.add_movie(movie),
            Some(api) => {
                self.begin_request().await;
                let created = api.create_movie(&NewMovie::from(movie)).await?;
                info!(movie_id = %created.id, "movie created");
                self.inner.lock().await.catalog.insert_movie(created);
            }
        }
        self.emit(StoreEvent::MoviesChanged);
        Ok(())
    }

    async fn update_movie_impl(&self, movie: Movie) -> Result<(), CatalogError> {
        let movie = match &self.api {
            None => movie,
            Some(api) => {
                if self.inner.lock().await.catalog.movie(&movie.id).is_none() {
                    warn!(movie_id = %movie.id, "update skipped: movie not in catalog");
                    return Ok(());
                }
                self.begin_request().await;
                api.update_movie(&movie).await?
            }
        };

        let movie_id = movie.id.clone();
        if self.inner.lock().await.catalog.update_movie(movie) {
            self.emit(StoreEvent::MoviesChanged);
        } else {
            warn!(%movie_id, "update skipped: movie not in catalog");
        }
        Ok(())
    }

    async fn remove_movie_impl(&self, id: &MovieId) -> Result<(), CatalogError> {
        if let Some(api) = &self.api {
            self.begin_request().await;
            api.delete_movie(id).await?;
        }
        if self.inner.lock().await.catalog.remove_movie(id) {
            self.emit(StoreEvent::MoviesChanged);
        }
        Ok(())
    }

    async fn toggle_watched_impl(&self, id: &MovieId) -> Result<(), CatalogError> {
        // Optimistic: the flip stays in place even if persisting it fails.
        let toggled = self.inner.lock().await.catalog.toggle_watched(id).cloned();
        let Some(toggled) = toggled else {
            warn!(movie_id = %id, "toggle skipped: movie not in catalog");
            return Ok(());
        };
        self.emit(StoreEvent::MoviesChanged);

        if let Some(api) = &self.api {
            self.begin_request().await;
            let saved = api.update_movie(&toggled).await?;
            if self.inner.lock().await.catalog.update_movie(saved) {
                self.emit(StoreEvent::MoviesChanged);
            }
        }
        Ok(())
    }

    async fn add_genre_impl(&self, genre: Genre) -> Result<(), CatalogError> {
        let genre = match &self.api {
            None => genre,
            Some(api) => {
                self.begin_request().await;
                let created = api.create_genre(&NewGenre::from(genre)).await?;
                info!(genre_id = %created.id, "genre created");
                created
            }
        };
        self.inner.lock().await.catalog.add_genre(genre);
        self.emit(StoreEvent::GenresChanged);
        Ok(())
    }

    async fn remove_genre_impl(&self, id: &GenreId) -> Result<(), CatalogError> {
        if let Some(api) = &self.api {
            self.begin_request().await;
            api.delete_genre(id).await?;
        }
        self.inner.lock().await.catalog.remove_genre(id);
        self.emit(StoreEvent::GenresChanged);
        self.emit(StoreEvent::MoviesChanged);
        Ok(())
    }
}

fn cloned(movies: Vec<&Movie>) -> Vec<Movie> {
    movies.into_iter().cloned().collect()
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
