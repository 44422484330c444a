use super::types::Author;
use super::{key, Raise};
use crate::database::Store;
use crate::model;
use async_graphql::{Context, Object, Result};

#[derive(Default)]
pub struct AuthorQuery;

#[Object]
impl AuthorQuery {
    async fn authors(&self, ctx: &Context<'_>) -> Result<Vec<Author>> {
        let store = ctx.data::<Store>()?;
        let authors = store.authors.find_all().raise()?;
        Ok(authors.into_iter().map(Author::from).collect())
    }

    /// Without an id, the first author.
    async fn author(&self, ctx: &Context<'_>, id: Option<i64>) -> Result<Option<Author>> {
        let store = ctx.data::<Store>()?;
        let author = match id {
            Some(id) => store.authors.find_by_key(key(id)),
            None => store.authors.find_one(|_| true),
        };
        Ok(author.raise()?.map(Author::from))
    }
}

#[derive(Default)]
pub struct AuthorMutation;

#[Object]
impl AuthorMutation {
    async fn add_author(
        &self,
        ctx: &Context<'_>,
        first_name: String,
        last_name: String,
    ) -> Result<Author> {
        let store = ctx.data::<Store>()?;
        let author = store
            .authors
            .create(model::Author {
                first_name,
                last_name,
            })
            .raise()?;
        Ok(Author::from(author))
    }
}
