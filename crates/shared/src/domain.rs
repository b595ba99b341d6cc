use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Identifiers arrive as JSON strings from some servers and as integers from
/// others; both collapse into the same textual id.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Text(value) => value,
            RawId::Signed(value) => value.to_string(),
            RawId::Unsigned(value) => value.to_string(),
        }
    }
}

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Fresh random id, used when no server assigns one.
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                RawId::deserialize(deserializer).map(|raw| Self(raw.into_string()))
            }
        }
    };
}

id_newtype!(MovieId);
id_newtype!(GenreId);

/// Which slice of the catalog is shown before genre/search filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogView {
    #[default]
    All,
    Watched,
    Unwatched,
}

impl CatalogView {
    pub fn as_str(self) -> &'static str {
        match self {
            CatalogView::All => "all",
            CatalogView::Watched => "watched",
            CatalogView::Unwatched => "unwatched",
        }
    }

    pub fn includes(self, movie: &Movie) -> bool {
        match self {
            CatalogView::All => true,
            CatalogView::Watched => movie.watched,
            CatalogView::Unwatched => !movie.watched,
        }
    }
}

impl fmt::Display for CatalogView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CatalogView {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(CatalogView::All),
            "watched" => Ok(CatalogView::Watched),
            "unwatched" => Ok(CatalogView::Unwatched),
            other => Err(format!(
                "unknown view '{other}', expected one of: all, watched, unwatched"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub release_year: i32,
    #[serde(default)]
    pub image_url: String,
    #[serde(default, deserialize_with = "genre_list")]
    pub genre: Vec<GenreId>,
    #[serde(default)]
    pub watched: bool,
}

impl Movie {
    pub fn has_genre(&self, genre_id: &GenreId) -> bool {
        self.genre.iter().any(|id| id == genre_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: GenreId,
    pub name: String,
}

/// Older payloads carry a single genre id instead of a list.
fn genre_list<'de, D>(deserializer: D) -> Result<Vec<GenreId>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<GenreId>),
        One(GenreId),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::Many(ids)) => ids,
        Some(OneOrMany::One(id)) => vec![id],
        None => Vec::new(),
    })
}
