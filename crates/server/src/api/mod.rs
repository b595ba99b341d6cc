use std::sync::Arc;

use shared::{
    domain::{Genre, GenreId, Movie, MovieId},
    error::ApiError,
    protocol::{NewGenre, NewMovie},
    seed::{seed_genres, seed_movies},
};
use tokio::sync::RwLock;
use tracing::info;

#[derive(Default)]
struct CatalogTables {
    movies: Vec<Movie>,
    genres: Vec<Genre>,
}

/// In-memory backing store for the catalog routes. Clones share the tables.
#[derive(Clone, Default)]
pub struct CatalogRepository {
    tables: Arc<RwLock<CatalogTables>>,
}

impl CatalogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seeded() -> Self {
        Self::with_data(seed_movies(), seed_genres())
    }

    pub fn with_data(movies: Vec<Movie>, genres: Vec<Genre>) -> Self {
        Self {
            tables: Arc::new(RwLock::new(CatalogTables { movies, genres })),
        }
    }

    pub async fn list_movies(&self) -> Vec<Movie> {
        self.tables.read().await.movies.clone()
    }

    pub async fn get_movie(&self, id: &MovieId) -> Result<Movie, ApiError> {
        self.tables
            .read()
            .await
            .movies
            .iter()
            .find(|movie| &movie.id == id)
            .cloned()
            .ok_or_else(|| movie_not_found(id))
    }

    pub async fn create_movie(&self, new_movie: NewMovie) -> Result<Movie, ApiError> {
        validate_title(&new_movie.title)?;
        let movie = new_movie.into_movie(MovieId::generate());
        self.tables.write().await.movies.push(movie.clone());
        info!(movie_id = %movie.id, title = %movie.title, "movie created");
        Ok(movie)
    }

    /// The path id wins over whatever id the body carries.
    pub async fn update_movie(&self, id: &MovieId, movie: Movie) -> Result<Movie, ApiError> {
        validate_title(&movie.title)?;
        let movie = Movie {
            id: id.clone(),
            ..movie
        };
        let mut tables = self.tables.write().await;
        let slot = tables
            .movies
            .iter_mut()
            .find(|existing| &existing.id == id)
            .ok_or_else(|| movie_not_found(id))?;
        *slot = movie.clone();
        Ok(movie)
    }

    pub async fn delete_movie(&self, id: &MovieId) -> Result<(), ApiError> {
        let mut tables = self.tables.write().await;
        let before = tables.movies.len();
        tables.movies.retain(|movie| &movie.id != id);
        if tables.movies.len() == before {
            return Err(movie_not_found(id));
        }
        info!(movie_id = %id, "movie deleted");
        Ok(())
    }

    pub async fn list_genres(&self) -> Vec<Genre> {
        self.tables.read().await.genres.clone()
    }

    pub async fn create_genre(&self, new_genre: NewGenre) -> Result<Genre, ApiError> {
        let name = new_genre.name.trim();
        if name.is_empty() {
            return Err(ApiError::validation("genre name must not be empty"));
        }
        let genre = NewGenre {
            name: name.to_string(),
        }
        .into_genre(GenreId::generate());
        self.tables.write().await.genres.push(genre.clone());
        info!(genre_id = %genre.id, name = %genre.name, "genre created");
        Ok(genre)
    }

    /// Removes the genre and every movie's reference to it.
    pub async fn delete_genre(&self, id: &GenreId) -> Result<(), ApiError> {
        let mut tables = self.tables.write().await;
        let before = tables.genres.len();
        tables.genres.retain(|genre| &genre.id != id);
        if tables.genres.len() == before {
            return Err(ApiError::not_found(format!("genre {id} not found")));
        }
        for movie in &mut tables.movies {
            movie.genre.retain(|genre_id| genre_id != id);
        }
        info!(genre_id = %id, "genre deleted");
        Ok(())
    }
}

fn validate_title(title: &str) -> Result<(), ApiError> {
    if title.trim().is_empty() {
        return Err(ApiError::validation("movie title must not be empty"));
    }
    Ok(())
}

fn movie_not_found(id: &MovieId) -> ApiError {
    ApiError::not_found(format!("movie {id} not found"))
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
