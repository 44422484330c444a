use super::Store;
use crate::error::StoreResult;
use crate::model::*;
use chrono::Utc;

pub trait ForumDb {
    fn category_of_movie(&self, movie: &Row<Movie>) -> StoreResult<Option<Row<ForumCategory>>>;
    /// Stores the topic and counts it against its category.
    fn add_topic(&self, topic: ForumTopic) -> StoreResult<Row<ForumTopic>>;
    /// Stores the post and counts it against the category of its topic.
    fn add_post(&self, post: ForumPost) -> StoreResult<Row<ForumPost>>;
    /// Looks up a category and counts the view.
    fn view_category(&self, id: u64) -> StoreResult<Option<Row<ForumCategory>>>;
    /// Looks up a topic and counts the view.
    fn view_topic(&self, id: u64) -> StoreResult<Option<Row<ForumTopic>>>;
    fn topics_in(&self, category_id: u64) -> StoreResult<Vec<Row<ForumTopic>>>;
    fn posts_in(&self, topic_id: u64) -> StoreResult<Vec<Row<ForumPost>>>;
}

impl Store {
    fn count_post(&self, category_id: u64) -> StoreResult<()> {
        self.forum_categories.update(category_id, |category| {
            category.posts += 1;
            category.updated_at = Utc::now();
        })?;
        Ok(())
    }
}

impl ForumDb for Store {
    fn category_of_movie(&self, movie: &Row<Movie>) -> StoreResult<Option<Row<ForumCategory>>> {
        match movie.value.forum_category_id {
            Some(id) => self.forum_categories.find_by_key(id),
            None => Ok(None),
        }
    }

    fn add_topic(&self, topic: ForumTopic) -> StoreResult<Row<ForumTopic>> {
        let category_id = topic.category_id;
        let row = self.forum_topics.create(topic)?;
        self.count_post(category_id)?;
        Ok(row)
    }

    fn add_post(&self, post: ForumPost) -> StoreResult<Row<ForumPost>> {
        let topic = self.forum_topics.find_by_key(post.topic_id)?;
        let row = self.forum_posts.create(post)?;
        if let Some(topic) = topic {
            self.count_post(topic.value.category_id)?;
        }
        Ok(row)
    }

    fn view_category(&self, id: u64) -> StoreResult<Option<Row<ForumCategory>>> {
        self.forum_categories
            .update(id, |category| category.views += 1)
    }

    fn view_topic(&self, id: u64) -> StoreResult<Option<Row<ForumTopic>>> {
        self.forum_topics.update(id, |topic| topic.views += 1)
    }

    fn topics_in(&self, category_id: u64) -> StoreResult<Vec<Row<ForumTopic>>> {
        self.forum_topics
            .find_all_by(|topic| topic.category_id == category_id)
    }

    fn posts_in(&self, topic_id: u64) -> StoreResult<Vec<Row<ForumPost>>> {
        self.forum_posts.find_all_by(|post| post.topic_id == topic_id)
    }
}
