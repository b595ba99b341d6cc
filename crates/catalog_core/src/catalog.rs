use std::collections::{HashMap, HashSet};

use rand::{seq::SliceRandom, Rng};
use shared::{
    domain::{CatalogView, Genre, GenreId, Movie, MovieId},
    seed::{seed_genres, seed_movies},
};

/// In-memory movie/genre collections plus the view state derived from them.
///
/// Derived views are recomputed on every call, so they always reflect the
/// latest mutation. Nothing here performs I/O; [`crate::CatalogStore`] wraps
/// it for the remote-backed case.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    movies: Vec<Movie>,
    genres: Vec<Genre>,
    search_query: String,
    selected_genre: Option<GenreId>,
    current_view: CatalogView,
    recommended: Option<MovieId>,
}

impl Catalog {
    pub fn new(movies: Vec<Movie>, genres: Vec<Genre>) -> Self {
        Self {
            movies,
            genres,
            ..Self::default()
        }
    }

    pub fn with_seed_data() -> Self {
        Self::new(seed_movies(), seed_genres())
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn genres(&self) -> &[Genre] {
        &self.genres
    }

    pub fn movie(&self, id: &MovieId) -> Option<&Movie> {
        self.movies.iter().find(|movie| &movie.id == id)
    }

    pub fn genre(&self, id: &GenreId) -> Option<&Genre> {
        self.genres.iter().find(|genre| &genre.id == id)
    }

    pub fn current_view(&self) -> CatalogView {
        self.current_view
    }

    pub fn selected_genre(&self) -> Option<&GenreId> {
        self.selected_genre.as_ref()
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn replace_movies(&mut self, movies: Vec<Movie>) {
        self.movies = movies;
    }

    pub fn replace_genres(&mut self, genres: Vec<Genre>) {
        self.genres = genres;
    }

    pub fn set_view(&mut self, view: CatalogView) {
        self.current_view = view;
        self.recommended = None;
    }

    pub fn set_selected_genre(&mut self, genre_id: Option<GenreId>) {
        self.selected_genre = genre_id;
        self.recommended = None;
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
    }

    /// Appends a movie as unwatched, whatever flag the caller passed.
    pub fn add_movie(&mut self, movie: Movie) {
        self.movies.push(Movie {
            watched: false,
            ..movie
        });
    }

    /// Appends a movie exactly as given, e.g. a record echoed by the server.
    pub fn insert_movie(&mut self, movie: Movie) {
        self.movies.push(movie);
    }

    /// Returns `false` when no movie carries the id.
    pub fn update_movie(&mut self, movie: Movie) -> bool {
        match self.movies.iter_mut().find(|m| m.id == movie.id) {
            Some(slot) => {
                *slot = movie;
                true
            }
            None => false,
        }
    }

    pub fn remove_movie(&mut self, id: &MovieId) -> bool {
        let before = self.movies.len();
        self.movies.retain(|movie| &movie.id != id);
        self.movies.len() != before
    }

    pub fn toggle_watched(&mut self, id: &MovieId) -> Option<&Movie> {
        let movie = self.movies.iter_mut().find(|movie| &movie.id == id)?;
        movie.watched = !movie.watched;
        Some(&*movie)
    }

    pub fn add_genre(&mut self, genre: Genre) {
        self.genres.push(genre);
    }

    /// Drops the genre and strips its id from every movie.
    pub fn remove_genre(&mut self, id: &GenreId) -> bool {
        let before = self.genres.len();
        self.genres.retain(|genre| &genre.id != id);
        for movie in &mut self.movies {
            movie.genre.retain(|genre_id| genre_id != id);
        }
        self.genres.len() != before
    }

    pub fn watched_movies(&self) -> Vec<&Movie> {
        self.movies.iter().filter(|movie| movie.watched).collect()
    }

    pub fn unwatched_movies(&self) -> Vec<&Movie> {
        self.movies.iter().filter(|movie| !movie.watched).collect()
    }

    pub fn current_movies(&self) -> Vec<&Movie> {
        self.movies
            .iter()
            .filter(|movie| self.current_view.includes(movie))
            .collect()
    }

    /// Current-view movies grouped under each genre, in genre order.
    /// Genres without any movie in the view are left out, and a repeated
    /// genre id is grouped once under its first entry.
    pub fn movies_by_genre(&self) -> Vec<(&Genre, Vec<&Movie>)> {
        let current = self.current_movies();
        let mut seen = HashSet::new();
        self.genres
            .iter()
            .filter(|genre| seen.insert(&genre.id))
            .filter_map(|genre| {
                let movies: Vec<&Movie> = current
                    .iter()
                    .copied()
                    .filter(|movie| movie.has_genre(&genre.id))
                    .collect();
                (!movies.is_empty()).then_some((genre, movies))
            })
            .collect()
    }

    /// Current view narrowed by the selected genre, then by the search query
    /// against titles and genre names (case-insensitive substring).
    pub fn filtered_movies(&self) -> Vec<&Movie> {
        let mut filtered = self.current_movies();

        if let Some(genre_id) = &self.selected_genre {
            filtered.retain(|movie| movie.has_genre(genre_id));
        }

        if !self.search_query.is_empty() {
            let query = self.search_query.to_lowercase();
            let mut genre_names: HashMap<&GenreId, String> = HashMap::new();
            for genre in &self.genres {
                genre_names
                    .entry(&genre.id)
                    .or_insert_with(|| genre.name.to_lowercase());
            }

            filtered.retain(|movie| {
                movie.title.to_lowercase().contains(&query)
                    || movie.genre.iter().any(|genre_id| {
                        genre_names
                            .get(genre_id)
                            .is_some_and(|name| name.contains(&query))
                    })
            });
        }

        filtered
    }

    pub fn recommended_movie(&self) -> Option<&Movie> {
        self.recommended.as_ref().and_then(|id| self.movie(id))
    }

    pub fn clear_recommendation(&mut self) {
        self.recommended = None;
    }

    pub fn generate_recommendation(&mut self, genre_id: &GenreId) -> Option<&Movie> {
        self.generate_recommendation_with(&mut rand::thread_rng(), genre_id)
    }

    /// Picks uniformly among unwatched current-view movies of the genre.
    /// Clears the recommendation when nothing qualifies.
    pub fn generate_recommendation_with<R>(
        &mut self,
        rng: &mut R,
        genre_id: &GenreId,
    ) -> Option<&Movie>
    where
        R: Rng + ?Sized,
    {
        let eligible: Vec<&Movie> = self
            .current_movies()
            .into_iter()
            .filter(|movie| !movie.watched && movie.has_genre(genre_id))
            .collect();

        self.recommended = eligible.choose(rng).map(|movie| movie.id.clone());
        self.recommended_movie()
    }
}

#[cfg(test)]
#[path = "tests/catalog_tests.rs"]
mod tests;
