use super::types::*;
use super::{key, Raise};
use crate::auth::{AuthGuard, Identity};
use crate::database::{ListDb, Store};
use crate::error::Error;
use crate::model::{self, Row};
use async_graphql::{Context, Object, Result};

#[derive(Default)]
pub struct ListQuery;

#[Object]
impl ListQuery {
    /// The caller's lists; empty for anonymous requests.
    async fn lists(&self, ctx: &Context<'_>) -> Result<Vec<List>> {
        let identity = match ctx.data_opt::<Identity>() {
            Some(identity) => identity,
            None => return Ok(Vec::new()),
        };
        let store = ctx.data::<Store>()?;
        let lists = store.lists_of(identity.id).raise()?;
        Ok(lists.into_iter().map(List::from).collect())
    }

    /// One of the caller's lists. Other users' lists read as missing.
    async fn list(&self, ctx: &Context<'_>, list_id: i64) -> Result<Option<List>> {
        let identity = match ctx.data_opt::<Identity>() {
            Some(identity) => identity,
            None => return Ok(None),
        };
        let store = ctx.data::<Store>()?;
        Ok(store
            .lists
            .find_by_key(key(list_id))
            .raise()?
            .filter(|list| list.value.user_id == identity.id)
            .map(List::from))
    }
}

#[derive(Default)]
pub struct ListMutation;

#[Object]
impl ListMutation {
    #[graphql(guard = "AuthGuard")]
    async fn add_list(&self, ctx: &Context<'_>, title: String) -> Result<AddListPayload> {
        let store = ctx.data::<Store>()?;
        let identity = ctx.data::<Identity>()?;
        Ok(add_list(store, identity, title).into())
    }

    #[graphql(guard = "AuthGuard")]
    async fn remove_list(&self, ctx: &Context<'_>, list_id: i64) -> Result<RemoveListPayload> {
        let store = ctx.data::<Store>()?;
        let identity = ctx.data::<Identity>()?;
        Ok(remove_list(store, identity, key(list_id)).into())
    }

    #[graphql(guard = "AuthGuard")]
    async fn add_to_list(
        &self,
        ctx: &Context<'_>,
        list_id: i64,
        movie_id: i64,
    ) -> Result<AddToListPayload> {
        let store = ctx.data::<Store>()?;
        let identity = ctx.data::<Identity>()?;
        Ok(change_membership(store, identity, key(list_id), key(movie_id), true).into())
    }

    #[graphql(guard = "AuthGuard")]
    async fn remove_from_list(
        &self,
        ctx: &Context<'_>,
        list_id: i64,
        movie_id: i64,
    ) -> Result<RemoveFromListPayload> {
        let store = ctx.data::<Store>()?;
        let identity = ctx.data::<Identity>()?;
        Ok(change_membership(store, identity, key(list_id), key(movie_id), false).into())
    }
}

/// Lists of other users are reported as missing.
fn owned_list(
    store: &Store,
    identity: &Identity,
    list_id: u64,
) -> std::result::Result<Row<model::List>, Error> {
    store
        .lists
        .find_by_key(list_id)?
        .filter(|list| list.value.user_id == identity.id)
        .ok_or(Error::NotFound("list"))
}

fn add_list(
    store: &Store,
    identity: &Identity,
    title: String,
) -> std::result::Result<List, Error> {
    if title.trim().is_empty() {
        return Err(Error::Validation("A list needs a title.".to_owned()));
    }
    let list = store.lists.create(model::List {
        title,
        user_id: identity.id,
    })?;
    Ok(List::from(list))
}

fn remove_list(
    store: &Store,
    identity: &Identity,
    list_id: u64,
) -> std::result::Result<List, Error> {
    let list = owned_list(store, identity, list_id)?;
    store.remove_list(list.id)?;
    Ok(List::from(list))
}

fn change_membership(
    store: &Store,
    identity: &Identity,
    list_id: u64,
    movie_id: u64,
    member: bool,
) -> std::result::Result<List, Error> {
    let list = owned_list(store, identity, list_id)?;
    if store.movies.find_by_key(movie_id)?.is_none() {
        return Err(Error::NotFound("movie"));
    }
    if member {
        store.list_movies.add_related(list.id, movie_id)?;
    } else {
        store.list_movies.remove_related(list.id, movie_id)?;
    }
    Ok(List::from(list))
}
