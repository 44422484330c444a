use super::types::Genre;
use super::{key, Raise};
use crate::database::{GenreDb, Store};
use crate::error::Error;
use crate::model;
use async_graphql::{Context, Object, Result};

#[derive(Default)]
pub struct GenreQuery;

#[Object]
impl GenreQuery {
    async fn genres(&self, ctx: &Context<'_>) -> Result<Vec<Genre>> {
        let store = ctx.data::<Store>()?;
        let genres = store.genres.find_all().raise()?;
        Ok(genres.into_iter().map(Genre::from).collect())
    }

    async fn genre(&self, ctx: &Context<'_>, id: i64) -> Result<Option<Genre>> {
        let store = ctx.data::<Store>()?;
        Ok(store.genres.find_by_key(key(id)).raise()?.map(Genre::from))
    }
}

#[derive(Default)]
pub struct GenreMutation;

#[Object]
impl GenreMutation {
    async fn add_genre(&self, ctx: &Context<'_>, name: String) -> Result<Genre> {
        let store = ctx.data::<Store>()?;
        let genre = store
            .genres
            .create(model::Genre {
                name,
                external_id: None,
            })
            .raise()?;
        Ok(Genre::from(genre))
    }

    async fn update_genre(&self, ctx: &Context<'_>, id: i64, name: String) -> Result<Genre> {
        let store = ctx.data::<Store>()?;
        store
            .genres
            .update(key(id), |genre| genre.name = name.clone())
            .raise()?
            .map(Genre::from)
            .ok_or(Error::NotFound("genre"))
            .raise()
    }

    async fn remove_genre(&self, ctx: &Context<'_>, id: i64) -> Result<Genre> {
        let store = ctx.data::<Store>()?;
        store
            .remove_genre(key(id))
            .raise()?
            .map(Genre::from)
            .ok_or(Error::NotFound("genre"))
            .raise()
    }
}
