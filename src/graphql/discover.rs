use super::types::*;
use super::Raise;
use crate::database::{MovieDb, Store};
use crate::error::Error;
use crate::tmdb::{ProviderMovie, TmdbClient};
use async_graphql::{Context, Object, Result};

/// Movies the provider returned, with already imported ones replaced by
/// their stored row so they surface the local id.
fn cross_reference(
    store: &Store,
    found: Vec<ProviderMovie>,
) -> std::result::Result<Vec<Movie>, Error> {
    found
        .iter()
        .map(|movie| {
            Ok(match store.movie_by_external_id(movie.id)? {
                Some(row) => Movie::from(row),
                None => Movie::from_provider(movie),
            })
        })
        .collect()
}

#[derive(Default)]
pub struct DiscoverQuery;

#[Object]
impl DiscoverQuery {
    async fn similar(&self, ctx: &Context<'_>, external_id: i64) -> Result<Vec<Movie>> {
        let store = ctx.data::<Store>()?;
        let tmdb = ctx.data::<TmdbClient>()?;
        cross_reference(store, tmdb.similar(external_id).await).raise()
    }

    async fn upcoming(&self, ctx: &Context<'_>) -> Result<UpcomingPayload> {
        let store = ctx.data::<Store>()?;
        let tmdb = ctx.data::<TmdbClient>()?;
        Ok(cross_reference(store, tmdb.upcoming().await).into())
    }

    async fn now_playing(&self, ctx: &Context<'_>) -> Result<NowPlayingPayload> {
        let store = ctx.data::<Store>()?;
        let tmdb = ctx.data::<TmdbClient>()?;
        Ok(cross_reference(store, tmdb.now_playing().await).into())
    }

    /// Reviews by the provider's id of the movie.
    async fn reviews(&self, ctx: &Context<'_>, movie_id: i64) -> Result<ReviewsResponse> {
        let tmdb = ctx.data::<TmdbClient>()?;
        let reviews = tmdb.reviews(movie_id).await;
        Ok(ReviewsResponse {
            reviews: Some(reviews.into_iter().map(Review::from).collect()),
            error: None,
        })
    }

    async fn videos(&self, ctx: &Context<'_>, external_movie_id: i64) -> Result<VideosPayload> {
        let tmdb = ctx.data::<TmdbClient>()?;
        let videos = tmdb.videos(external_movie_id).await;
        Ok(VideosPayload {
            videos: Some(videos.into_iter().map(Video::from).collect()),
            error: None,
        })
    }
}

#[derive(Default)]
pub struct DiscoverMutation;

#[Object]
impl DiscoverMutation {
    /// Title search at the metadata provider.
    async fn find_movies(&self, ctx: &Context<'_>, title: Option<String>) -> Result<Vec<Movie>> {
        let title = match title {
            Some(title) if !title.trim().is_empty() => title,
            _ => return Ok(Vec::new()),
        };
        let store = ctx.data::<Store>()?;
        let tmdb = ctx.data::<TmdbClient>()?;
        cross_reference(store, tmdb.search(&title).await).raise()
    }
}
