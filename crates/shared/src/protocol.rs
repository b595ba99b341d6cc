use serde::{Deserialize, Serialize};

use crate::domain::{Genre, GenreId, Movie, MovieId};

/// Body of `POST /movies`; the server assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMovie {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub release_year: i32,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub genre: Vec<GenreId>,
    #[serde(default)]
    pub watched: bool,
}

impl NewMovie {
    pub fn into_movie(self, id: MovieId) -> Movie {
        Movie {
            id,
            title: self.title,
            description: self.description,
            release_year: self.release_year,
            image_url: self.image_url,
            genre: self.genre,
            watched: self.watched,
        }
    }
}

/// New movies always start unwatched.
impl From<Movie> for NewMovie {
    fn from(movie: Movie) -> Self {
        Self {
            title: movie.title,
            description: movie.description,
            release_year: movie.release_year,
            image_url: movie.image_url,
            genre: movie.genre,
            watched: false,
        }
    }
}

/// Body of `POST /genres`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGenre {
    pub name: String,
}

impl NewGenre {
    pub fn into_genre(self, id: GenreId) -> Genre {
        Genre {
            id,
            name: self.name,
        }
    }
}

impl From<Genre> for NewGenre {
    fn from(genre: Genre) -> Self {
        Self { name: genre.name }
    }
}

pub fn movies_route() -> &'static str {
    "/movies"
}

pub fn genres_route() -> &'static str {
    "/genres"
}
