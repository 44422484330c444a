//! GraphQL schema and resolvers.
//!
//! Fields return their value directly and raise execution errors, except the
//! mutations and provider queries typed as a payload: those report business
//! failures in-band through the payload's `error`. Fields that need a caller
//! carry [`AuthGuard`](crate::auth::AuthGuard) in their metadata.

mod authors;
mod discover;
mod forum;
mod genres;
mod lists;
mod movies;
mod types;
mod users;


use crate::auth::Authenticator;
use crate::database::Store;
use crate::error::{Error, ErrorKind};
use crate::tmdb::TmdbClient;
use async_graphql::{EmptySubscription, ErrorExtensions, MergedObject, Object, Schema};
use log::error;

pub type AppSchema = Schema<Query, Mutation, EmptySubscription>;

#[derive(MergedObject, Default)]
pub struct Query(
    movies::MovieQuery,
    discover::DiscoverQuery,
    genres::GenreQuery,
    users::UserQuery,
    lists::ListQuery,
    forum::ForumQuery,
    authors::AuthorQuery,
    ServerQuery,
);

#[derive(MergedObject, Default)]
pub struct Mutation(
    movies::MovieMutation,
    discover::DiscoverMutation,
    genres::GenreMutation,
    users::UserMutation,
    lists::ListMutation,
    forum::ForumMutation,
    authors::AuthorMutation,
);

pub fn build_schema(store: Store, tmdb: TmdbClient, auth: Authenticator) -> AppSchema {
    Schema::build(Query::default(), Mutation::default(), EmptySubscription)
        .data(store)
        .data(tmdb)
        .data(auth)
        .finish()
}

#[derive(Default)]
pub struct ServerQuery;

#[Object]
impl ServerQuery {
    async fn server_time(&self) -> String {
        chrono::Utc::now().to_rfc3339()
    }
}

/// Row key for a GraphQL id. Generated ids start at 1, so negative ids map
/// to 0 and match nothing.
pub(crate) fn key(id: i64) -> u64 {
    u64::try_from(id).unwrap_or(0)
}

pub(crate) fn id_of(key: u64) -> i64 {
    i64::try_from(key).unwrap_or(i64::MAX)
}

/// Turns a domain failure into a raised GraphQL error with a `code` extension.
pub(crate) trait Raise<T> {
    fn raise(self) -> async_graphql::Result<T>;
}

impl<T, E: Into<Error>> Raise<T> for Result<T, E> {
    fn raise(self) -> async_graphql::Result<T> {
        self.map_err(|err| {
            let err = err.into();
            if err.kind() == ErrorKind::Internal {
                error!("{:?}", err);
            }
            err.extend()
        })
    }
}
