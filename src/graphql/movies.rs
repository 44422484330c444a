use super::types::*;
use super::{key, Raise};
use crate::cursor::{decode_cursor, encode_cursor};
use crate::database::{GenreDb, MovieDb, Store, SuggestFilter};
use crate::error::Error;
use crate::model;
use crate::tmdb::TmdbClient;
use async_graphql::{Context, Object, Result};
use chrono::NaiveDate;

const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Default)]
pub struct MovieQuery;

#[Object]
impl MovieQuery {
    async fn movies(&self, ctx: &Context<'_>, featured: Option<bool>) -> Result<Vec<Movie>> {
        let store = ctx.data::<Store>()?;
        let movies = store.all_movies(featured).raise()?;
        Ok(movies.into_iter().map(Movie::from).collect())
    }

    async fn movie(&self, ctx: &Context<'_>, id: i64) -> Result<Option<Movie>> {
        let store = ctx.data::<Store>()?;
        Ok(store.movies.find_by_key(key(id)).raise()?.map(Movie::from))
    }

    /// Case-insensitive title search over stored movies.
    async fn search(
        &self,
        ctx: &Context<'_>,
        term: Option<String>,
        limit: Option<i32>,
    ) -> Result<Vec<Movie>> {
        let store = ctx.data::<Store>()?;
        let limit = limit.map(non_negative("limit")).transpose().raise()?;
        let found = store
            .search_movies(term.as_deref().unwrap_or(""), limit)
            .raise()?;
        Ok(found.into_iter().map(Movie::from).collect())
    }

    /// A random stored movie matching every given filter.
    async fn suggest(
        &self,
        ctx: &Context<'_>,
        filters: Option<SuggestFiltersInput>,
    ) -> Result<SuggestPayload> {
        let store = ctx.data::<Store>()?;
        Ok(suggest(store, filters.unwrap_or_default()).into())
    }

    async fn all_movies_cursor(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        first: Option<i32>,
    ) -> Result<MoviesResultCursor> {
        let store = ctx.data::<Store>()?;
        let after = after
            .map(|cursor| {
                decode_cursor(&cursor)
                    .ok_or_else(|| Error::Validation(format!("Invalid cursor {:?}.", cursor)))
            })
            .transpose()
            .raise()?;
        let first = first
            .map(non_negative("first"))
            .transpose()
            .raise()?
            .unwrap_or(DEFAULT_PAGE_SIZE);

        let page = store.movies_page(after, first).raise()?;
        let edges: Vec<Edge> = page
            .movies
            .into_iter()
            .map(|row| Edge {
                cursor: encode_cursor(row.id),
                node: Movie::from(row),
            })
            .collect();
        Ok(MoviesResultCursor {
            page_info: PageInfo {
                end_cursor: edges.last().map(|edge| edge.cursor.clone()),
                has_next_page: page.has_next_page,
            },
            edges,
            total_count: store.movies.count() as i64,
        })
    }
}

#[derive(Default)]
pub struct MovieMutation;

#[Object]
impl MovieMutation {
    async fn add_movie(
        &self,
        ctx: &Context<'_>,
        title: String,
        poster: Option<String>,
        external_id: Option<i64>,
        vote_average: Option<f64>,
        description: Option<String>,
    ) -> Result<AddMoviePayload> {
        let store = ctx.data::<Store>()?;
        let movie = model::Movie {
            title,
            poster,
            external_id,
            vote_average,
            description,
            ..model::Movie::default()
        };
        Ok(store
            .create_movie(movie, &[])
            .map(Movie::from)
            .map_err(Error::from)
            .into())
    }

    /// Imports a movie from the metadata provider, together with its genres.
    async fn add_external_movie(
        &self,
        ctx: &Context<'_>,
        external_id: i64,
    ) -> Result<AddMoviePayload> {
        let store = ctx.data::<Store>()?;
        let tmdb = ctx.data::<TmdbClient>()?;
        Ok(import_movie(store, tmdb, external_id).await.into())
    }

    async fn update_movie(
        &self,
        ctx: &Context<'_>,
        movie_id: i64,
        featured: Option<bool>,
    ) -> Result<AddMoviePayload> {
        let store = ctx.data::<Store>()?;
        Ok(update_movie(store, key(movie_id), featured).into())
    }
}

fn non_negative(name: &'static str) -> impl Fn(i32) -> std::result::Result<usize, Error> {
    move |value| {
        usize::try_from(value)
            .map_err(|_| Error::Validation(format!("{} must not be negative.", name)))
    }
}

/// A year bound means January 1st of that year. Blank bounds are ignored.
fn year_start(year: Option<&str>) -> std::result::Result<Option<NaiveDate>, Error> {
    let year = match year.map(str::trim) {
        Some(year) if !year.is_empty() => year,
        _ => return Ok(None),
    };
    year.parse::<i32>()
        .ok()
        .and_then(|year| NaiveDate::from_ymd_opt(year, 1, 1))
        .map(Some)
        .ok_or_else(|| Error::Validation(format!("Invalid year {:?}.", year)))
}

fn suggest(
    store: &Store,
    filters: SuggestFiltersInput,
) -> std::result::Result<Option<Movie>, Error> {
    let filter = SuggestFilter {
        genres: filters
            .genre
            .unwrap_or_default()
            .into_iter()
            .map(key)
            .collect(),
        min_rating: filters.min_rating.map(f64::from),
        released_from: year_start(filters.start_year.as_deref())?,
        released_until: year_start(filters.end_year.as_deref())?,
    };
    Ok(store.suggest_movie(&filter)?.map(Movie::from))
}

async fn import_movie(
    store: &Store,
    tmdb: &TmdbClient,
    external_id: i64,
) -> std::result::Result<Movie, Error> {
    let found = tmdb.movie(external_id).await?;

    let mut genres = found.genres.clone();
    if genres.is_empty() && !found.genre_ids.is_empty() {
        genres = tmdb
            .genres()
            .await
            .into_iter()
            .filter(|genre| found.genre_ids.contains(&genre.id))
            .collect();
    }
    let mut genre_ids = Vec::with_capacity(genres.len());
    for genre in &genres {
        genre_ids.push(store.find_or_create_genre(genre.id, &genre.name)?.id);
    }

    let row = store.create_movie(found.to_movie(), &genre_ids)?;
    Ok(Movie::from(row))
}

fn update_movie(
    store: &Store,
    movie_id: u64,
    featured: Option<bool>,
) -> std::result::Result<Movie, Error> {
    let updated = match featured {
        Some(featured) => store
            .movies
            .update(movie_id, |movie| movie.featured = featured)?,
        None => store.movies.find_by_key(movie_id)?,
    };
    updated.map(Movie::from).ok_or(Error::NotFound("movie"))
}
