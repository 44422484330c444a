use super::types::{ForumCategory, ForumPost, ForumTopic};
use super::{key, Raise};
use crate::auth::{AuthGuard, Identity};
use crate::database::{ForumDb, Store};
use crate::error::Error;
use crate::model;
use async_graphql::{Context, Object, Result};
use chrono::Utc;

#[derive(Default)]
pub struct ForumQuery;

#[Object]
impl ForumQuery {
    async fn forum_categories(&self, ctx: &Context<'_>) -> Result<Vec<ForumCategory>> {
        let store = ctx.data::<Store>()?;
        let categories = store.forum_categories.find_all().raise()?;
        Ok(categories.into_iter().map(ForumCategory::from).collect())
    }

    /// Counts as a view of the category.
    async fn forum_category(&self, ctx: &Context<'_>, id: i64) -> Result<Option<ForumCategory>> {
        let store = ctx.data::<Store>()?;
        Ok(store.view_category(key(id)).raise()?.map(ForumCategory::from))
    }

    async fn forum_topics(&self, ctx: &Context<'_>) -> Result<Vec<ForumTopic>> {
        let store = ctx.data::<Store>()?;
        let topics = store.forum_topics.find_all().raise()?;
        Ok(topics.into_iter().map(ForumTopic::from).collect())
    }

    /// Counts as a view of the topic.
    async fn forum_topic(&self, ctx: &Context<'_>, id: i64) -> Result<Option<ForumTopic>> {
        let store = ctx.data::<Store>()?;
        Ok(store.view_topic(key(id)).raise()?.map(ForumTopic::from))
    }
}

#[derive(Default)]
pub struct ForumMutation;

#[Object]
impl ForumMutation {
    async fn add_forum_category(
        &self,
        ctx: &Context<'_>,
        title: String,
        description: Option<String>,
    ) -> Result<ForumCategory> {
        let store = ctx.data::<Store>()?;
        let category = store
            .forum_categories
            .create(model::ForumCategory::new(title, description))
            .raise()?;
        Ok(ForumCategory::from(category))
    }

    #[graphql(guard = "AuthGuard")]
    async fn add_forum_topic(
        &self,
        ctx: &Context<'_>,
        title: String,
        message: String,
        category_id: i64,
    ) -> Result<ForumTopic> {
        let store = ctx.data::<Store>()?;
        let identity = ctx.data::<Identity>()?;
        let category = store
            .forum_categories
            .find_by_key(key(category_id))
            .raise()?
            .ok_or(Error::NotFound("forum category"))
            .raise()?;
        let topic = store
            .add_topic(model::ForumTopic {
                title,
                message,
                views: 0,
                category_id: category.id,
                user_id: Some(identity.id),
                created_at: Utc::now(),
            })
            .raise()?;
        Ok(ForumTopic::from(topic))
    }

    #[graphql(guard = "AuthGuard")]
    async fn add_forum_post(
        &self,
        ctx: &Context<'_>,
        message: String,
        topic_id: i64,
    ) -> Result<ForumPost> {
        let store = ctx.data::<Store>()?;
        let identity = ctx.data::<Identity>()?;
        let topic = store
            .forum_topics
            .find_by_key(key(topic_id))
            .raise()?
            .ok_or(Error::NotFound("forum topic"))
            .raise()?;
        let post = store
            .add_post(model::ForumPost {
                message,
                topic_id: topic.id,
                user_id: Some(identity.id),
                created_at: Utc::now(),
            })
            .raise()?;
        Ok(ForumPost::from(post))
    }
}
