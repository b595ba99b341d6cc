use std::sync::Arc;

use anyhow::{bail, Result};
use catalog_core::{
    config::load_settings, Catalog, CatalogStore, GenreGroup, HttpCatalogApi,
};
use clap::{Parser, Subcommand};
use shared::domain::{CatalogView, Genre, GenreId, Movie, MovieId};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Browse and edit the movie catalog")]
struct Args {
    /// Catalog API base url; overrides catalog.toml and CATALOG_API_URL.
    /// Without one the seeded in-memory catalog is used.
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List movies, optionally narrowed by view, genre and search text.
    List {
        #[arg(long, default_value = "all")]
        view: CatalogView,
        #[arg(long)]
        genre: Option<String>,
        #[arg(long)]
        search: Option<String>,
    },
    Genres,
    /// Movies grouped by genre.
    Grouped {
        #[arg(long, default_value = "all")]
        view: CatalogView,
    },
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        year: i32,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        image_url: String,
        #[arg(long = "genre")]
        genres: Vec<String>,
    },
    Remove {
        id: String,
    },
    Toggle {
        id: String,
    },
    AddGenre {
        name: String,
    },
    RemoveGenre {
        id: String,
    },
    /// Pick a random unwatched movie of the genre.
    Recommend {
        genre: String,
        #[arg(long, default_value = "all")]
        view: CatalogView,
    },
}

const LOCAL_MODE_NOTE: &str =
    "note: no api url configured; changes apply to the local seeded catalog and are not kept";

impl Command {
    fn mutates(&self) -> bool {
        matches!(
            self,
            Command::Add { .. }
                | Command::Remove { .. }
                | Command::Toggle { .. }
                | Command::AddGenre { .. }
                | Command::RemoveGenre { .. }
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings();
    if let Some(url) = args.api_url.clone() {
        settings.api_base_url = Some(url);
    }

    let store = match HttpCatalogApi::from_settings(&settings)? {
        Some(api) => {
            info!(base_url = %api.base_url(), "using remote catalog");
            let store = CatalogStore::with_api(Arc::new(api));
            store.load().await;
            store
        }
        None => {
            info!("no api url configured; using the local seeded catalog");
            CatalogStore::local(Catalog::with_seed_data())
        }
    };
    ensure_no_store_error(&store).await?;

    if !store.is_remote() && args.command.mutates() {
        eprintln!("{LOCAL_MODE_NOTE}");
    }

    run(&store, args.command, args.json).await?;
    ensure_no_store_error(&store).await
}

async fn run(store: &CatalogStore, command: Command, json: bool) -> Result<()> {
    match command {
        Command::List {
            view,
            genre,
            search,
        } => {
            store.set_view(view).await;
            store.set_selected_genre(genre.map(GenreId::from)).await;
            store.set_search_query(search.unwrap_or_default()).await;
            let movies = store.filtered_movies().await;
            print_movies(&movies, &store.genres().await, json)?;
        }
        Command::Genres => {
            let genres = store.genres().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&genres)?);
            } else {
                for genre in genres {
                    println!("{}  {}", genre.id, genre.name);
                }
            }
        }
        Command::Grouped { view } => {
            store.set_view(view).await;
            print_groups(&store.movies_by_genre().await, json)?;
        }
        Command::Add {
            title,
            year,
            description,
            image_url,
            genres,
        } => {
            store
                .add_movie(Movie {
                    id: MovieId::generate(),
                    title,
                    description,
                    release_year: year,
                    image_url,
                    genre: genres.into_iter().map(GenreId::from).collect(),
                    watched: false,
                })
                .await;
            ensure_no_store_error(store).await?;
            if let Some(added) = store.movies().await.pop() {
                print_movies(&[added], &store.genres().await, json)?;
            }
        }
        Command::Remove { id } => {
            let id = MovieId::from(id);
            require_movie(store, &id).await?;
            store.remove_movie(&id).await;
            ensure_no_store_error(store).await?;
            println!("removed movie {id}");
        }
        Command::Toggle { id } => {
            let id = MovieId::from(id);
            require_movie(store, &id).await?;
            store.toggle_watched(&id).await;
            ensure_no_store_error(store).await?;
            if let Some(movie) = store.movie(&id).await {
                print_movies(&[movie], &store.genres().await, json)?;
            }
        }
        Command::AddGenre { name } => {
            store
                .add_genre(Genre {
                    id: GenreId::generate(),
                    name,
                })
                .await;
            ensure_no_store_error(store).await?;
            if let Some(genre) = store.genres().await.pop() {
                println!("added genre {}  {}", genre.id, genre.name);
            }
        }
        Command::RemoveGenre { id } => {
            let id = GenreId::from(id);
            store.remove_genre(&id).await;
            ensure_no_store_error(store).await?;
            println!("removed genre {id}");
        }
        Command::Recommend { genre, view } => {
            store.set_view(view).await;
            let genre = GenreId::from(genre);
            match store.generate_recommendation(&genre).await {
                Some(movie) => print_movies(&[movie], &store.genres().await, json)?,
                None => println!("{}", no_recommendation_message(view, &genre)),
            }
        }
    }
    Ok(())
}

fn no_recommendation_message(view: CatalogView, genre: &GenreId) -> String {
    match view {
        CatalogView::All => format!("no unwatched movie in genre {genre}"),
        view => format!("no unwatched movie in genre {genre} ({view} view)"),
    }
}

async fn ensure_no_store_error(store: &CatalogStore) -> Result<()> {
    match store.error().await {
        Some(message) => bail!(message),
        None => Ok(()),
    }
}

async fn require_movie(store: &CatalogStore, id: &MovieId) -> Result<()> {
    if store.movie(id).await.is_none() {
        bail!("no movie with id {id}");
    }
    Ok(())
}

fn genre_names(movie: &Movie, genres: &[Genre]) -> String {
    movie
        .genre
        .iter()
        .map(|id| {
            genres
                .iter()
                .find(|genre| &genre.id == id)
                .map_or_else(|| id.to_string(), |genre| genre.name.clone())
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn print_movies(movies: &[Movie], genres: &[Genre], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(movies)?);
        return Ok(());
    }
    if movies.is_empty() {
        println!("no movies");
    }
    for movie in movies {
        let mark = if movie.watched { 'x' } else { ' ' };
        println!(
            "[{mark}] {}  {} ({})  {}",
            movie.id,
            movie.title,
            movie.release_year,
            genre_names(movie, genres)
        );
    }
    Ok(())
}

fn print_groups(groups: &[GenreGroup], json: bool) -> Result<()> {
    if json {
        let value: Vec<serde_json::Value> = groups
            .iter()
            .map(|group| {
                serde_json::json!({
                    "genre": group.genre,
                    "movies": group.movies,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }
    for group in groups {
        println!("{} ({})", group.genre.name, group.movies.len());
        for movie in &group.movies {
            let mark = if movie.watched { 'x' } else { ' ' };
            println!("  [{mark}] {}  {} ({})", movie.id, movie.title, movie.release_year);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
