use crate::domain::{Genre, GenreId, Movie, MovieId};

pub const SEED_GENRE_ID: &str = "test-genre";

const SEED_IMAGE_URL: &str = "https://image.tmdb.org/t/p/w500/gh4cZbhZxyTbgxQPxD0dOudNPTn.jpg";

/// Catalog contents used when nothing has been fetched yet.
pub fn seed_movies() -> Vec<Movie> {
    vec![Movie {
        id: MovieId::from("1"),
        title: "Spider Man".to_string(),
        description: "This is a test description".to_string(),
        release_year: 2008,
        image_url: SEED_IMAGE_URL.to_string(),
        genre: vec![GenreId::from(SEED_GENRE_ID)],
        watched: false,
    }]
}

pub fn seed_genres() -> Vec<Genre> {
    vec![Genre {
        id: GenreId::from(SEED_GENRE_ID),
        name: "Test Genre".to_string(),
    }]
}
