use super::{id_of, key, Raise};
use crate::database::{ForumDb, ListDb, MovieDb, Store, UserDb};
use crate::error::{Error, ErrorKind};
use crate::model::{self, Role, Row};
use crate::tmdb::{resize_image_url, ImageSize, ProviderMovie, ProviderReview, ProviderVideo};
use async_graphql::{ComplexObject, Context, InputObject, Result, SimpleObject};
use log::error;

/// The in-band error of a payload type.
#[derive(SimpleObject, Debug, Clone, PartialEq)]
#[graphql(name = "Error")]
pub struct PayloadError {
    pub message: String,
    pub kind: ErrorKind,
}

impl From<Error> for PayloadError {
    fn from(err: Error) -> Self {
        if err.kind() == ErrorKind::Internal {
            error!("{:?}", err);
        }
        PayloadError {
            message: err.to_string(),
            kind: err.kind(),
        }
    }
}

/// Declares a payload type holding either `$field` or `error`, never both.
macro_rules! payload {
    ($name:ident, $field:ident: $ty:ty) => {
        #[derive(SimpleObject)]
        pub struct $name {
            pub $field: Option<$ty>,
            pub error: Option<PayloadError>,
        }

        impl From<std::result::Result<$ty, Error>> for $name {
            fn from(result: std::result::Result<$ty, Error>) -> Self {
                match result {
                    Ok(value) => $name {
                        $field: Some(value),
                        error: None,
                    },
                    Err(err) => $name {
                        $field: None,
                        error: Some(err.into()),
                    },
                }
            }
        }
    };
}

payload!(LoginPayload, user: User);
payload!(SignupPayload, user: User);
payload!(AddMoviePayload, movie: Movie);
payload!(AddFavoritePayload, favorites: Vec<Movie>);
payload!(AddListPayload, list: List);
payload!(RemoveListPayload, list: List);
payload!(AddToListPayload, list: List);
payload!(RemoveFromListPayload, list: List);
payload!(VideosPayload, videos: Vec<Video>);
payload!(ReviewsResponse, reviews: Vec<Review>);
payload!(UpcomingPayload, movies: Vec<Movie>);
payload!(NowPlayingPayload, movies: Vec<Movie>);

/// `movie` may be empty without an error when nothing matched.
#[derive(SimpleObject)]
pub struct SuggestPayload {
    pub movie: Option<Movie>,
    pub error: Option<PayloadError>,
}

impl From<std::result::Result<Option<Movie>, Error>> for SuggestPayload {
    fn from(result: std::result::Result<Option<Movie>, Error>) -> Self {
        match result {
            Ok(movie) => SuggestPayload { movie, error: None },
            Err(err) => SuggestPayload {
                movie: None,
                error: Some(err.into()),
            },
        }
    }
}

#[derive(SimpleObject, Clone, Debug)]
#[graphql(complex)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub external_id: Option<i64>,
    pub release_date: Option<String>,
    pub vote_average: Option<f64>,
    pub featured: Option<bool>,
    #[graphql(skip)]
    pub poster: Option<String>,
    #[graphql(skip)]
    pub backdrop_path: Option<String>,
    #[graphql(skip)]
    pub forum_category_id: Option<u64>,
    /// False for movies that only exist at the metadata provider.
    #[graphql(skip)]
    pub stored: bool,
}

impl Movie {
    fn build(id: i64, movie: model::Movie, stored: bool) -> Self {
        Movie {
            id,
            title: movie.title,
            description: movie.description,
            poster: movie.poster,
            backdrop_path: movie.backdrop_path,
            external_id: movie.external_id,
            release_date: movie
                .release_date
                .map(|date| date.format("%Y-%m-%d").to_string()),
            vote_average: movie.vote_average,
            featured: if stored { Some(movie.featured) } else { None },
            forum_category_id: movie.forum_category_id,
            stored,
        }
    }

    /// A movie known only to the provider, identified by the provider's id.
    pub fn from_provider(movie: &ProviderMovie) -> Self {
        Self::build(movie.id, movie.to_movie(), false)
    }
}

impl From<Row<model::Movie>> for Movie {
    fn from(row: Row<model::Movie>) -> Self {
        Self::build(id_of(row.id), row.value, true)
    }
}

#[ComplexObject]
impl Movie {
    /// Provider posters default to the large size.
    async fn poster(&self, size: Option<ImageSize>) -> Option<String> {
        let poster = self.poster.as_deref()?;
        Some(resize_image_url(poster, size.unwrap_or_default()))
    }

    /// Without a size, the backdrop as stored.
    async fn backdrop_path(&self, size: Option<ImageSize>) -> Option<String> {
        let backdrop = self.backdrop_path.as_deref()?;
        Some(match size {
            Some(size) => resize_image_url(backdrop, size),
            None => backdrop.to_owned(),
        })
    }

    async fn genres(&self, ctx: &Context<'_>) -> Result<Vec<Genre>> {
        if !self.stored {
            return Ok(Vec::new());
        }
        let store = ctx.data::<Store>()?;
        let genres = store.genres_of(key(self.id)).raise()?;
        Ok(genres.into_iter().map(Genre::from).collect())
    }

    async fn forum_category(&self, ctx: &Context<'_>) -> Result<Option<ForumCategory>> {
        let id = match self.forum_category_id {
            Some(id) => id,
            None => return Ok(None),
        };
        let store = ctx.data::<Store>()?;
        Ok(store
            .forum_categories
            .find_by_key(id)
            .raise()?
            .map(ForumCategory::from))
    }
}

#[derive(SimpleObject, Clone, Debug)]
pub struct Genre {
    pub id: i64,
    pub name: String,
    pub external_id: Option<i64>,
}

impl From<Row<model::Genre>> for Genre {
    fn from(row: Row<model::Genre>) -> Self {
        Genre {
            id: id_of(row.id),
            name: row.value.name,
            external_id: row.value.external_id,
        }
    }
}

#[derive(SimpleObject, Clone, Debug)]
#[graphql(complex)]
pub struct List {
    pub id: i64,
    pub title: String,
}

impl From<Row<model::List>> for List {
    fn from(row: Row<model::List>) -> Self {
        List {
            id: id_of(row.id),
            title: row.value.title,
        }
    }
}

#[ComplexObject]
impl List {
    async fn movies(&self, ctx: &Context<'_>) -> Result<Vec<Movie>> {
        let store = ctx.data::<Store>()?;
        let movies = store.movies_in(key(self.id)).raise()?;
        Ok(movies.into_iter().map(Movie::from).collect())
    }
}

#[derive(SimpleObject, Clone, Debug)]
#[graphql(complex)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    /// Only set in login and signup payloads.
    pub token: Option<String>,
}

impl User {
    pub fn with_token(self, token: String) -> Self {
        User {
            token: Some(token),
            ..self
        }
    }
}

impl From<Row<model::User>> for User {
    fn from(row: Row<model::User>) -> Self {
        User {
            id: id_of(row.id),
            first_name: row.value.first_name,
            last_name: row.value.last_name,
            email: row.value.email,
            role: row.value.role,
            token: None,
        }
    }
}

#[ComplexObject]
impl User {
    async fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    async fn movies(&self, ctx: &Context<'_>) -> Result<Vec<Movie>> {
        let store = ctx.data::<Store>()?;
        let movies = store.favorites_of(key(self.id)).raise()?;
        Ok(movies.into_iter().map(Movie::from).collect())
    }

    async fn lists(&self, ctx: &Context<'_>) -> Result<Vec<List>> {
        let store = ctx.data::<Store>()?;
        let lists = store.lists_of(key(self.id)).raise()?;
        Ok(lists.into_iter().map(List::from).collect())
    }

    async fn topics(&self, ctx: &Context<'_>) -> Result<Vec<ForumTopic>> {
        let store = ctx.data::<Store>()?;
        let user_id = Some(key(self.id));
        let topics = store
            .forum_topics
            .find_all_by(|topic| topic.user_id == user_id)
            .raise()?;
        Ok(topics.into_iter().map(ForumTopic::from).collect())
    }

    async fn posts(&self, ctx: &Context<'_>) -> Result<Vec<ForumPost>> {
        let store = ctx.data::<Store>()?;
        let user_id = Some(key(self.id));
        let posts = store
            .forum_posts
            .find_all_by(|post| post.user_id == user_id)
            .raise()?;
        Ok(posts.into_iter().map(ForumPost::from).collect())
    }
}

async fn author_of(ctx: &Context<'_>, user_id: Option<u64>) -> Result<Option<User>> {
    let user_id = match user_id {
        Some(id) => id,
        None => return Ok(None),
    };
    let store = ctx.data::<Store>()?;
    Ok(store.get_user(user_id).raise()?.map(User::from))
}

#[derive(SimpleObject, Clone, Debug)]
#[graphql(complex)]
pub struct ForumCategory {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub views: u32,
    pub posts: u32,
    pub created_at: String,
    pub updated_at: String,
    #[graphql(skip)]
    pub movie_id: Option<u64>,
}

impl From<Row<model::ForumCategory>> for ForumCategory {
    fn from(row: Row<model::ForumCategory>) -> Self {
        ForumCategory {
            id: id_of(row.id),
            title: row.value.title,
            description: row.value.description,
            views: row.value.views,
            posts: row.value.posts,
            created_at: row.value.created_at.to_rfc3339(),
            updated_at: row.value.updated_at.to_rfc3339(),
            movie_id: row.value.movie_id,
        }
    }
}

#[ComplexObject]
impl ForumCategory {
    async fn topics(&self, ctx: &Context<'_>) -> Result<Vec<ForumTopic>> {
        let store = ctx.data::<Store>()?;
        let topics = store.topics_in(key(self.id)).raise()?;
        Ok(topics.into_iter().map(ForumTopic::from).collect())
    }

    async fn movie(&self, ctx: &Context<'_>) -> Result<Option<Movie>> {
        let movie_id = match self.movie_id {
            Some(id) => id,
            None => return Ok(None),
        };
        let store = ctx.data::<Store>()?;
        Ok(store.movies.find_by_key(movie_id).raise()?.map(Movie::from))
    }
}

#[derive(SimpleObject, Clone, Debug)]
#[graphql(complex)]
pub struct ForumTopic {
    pub id: i64,
    pub title: String,
    pub message: String,
    pub views: u32,
    pub created_at: String,
    #[graphql(skip)]
    pub category_id: u64,
    #[graphql(skip)]
    pub user_id: Option<u64>,
}

impl From<Row<model::ForumTopic>> for ForumTopic {
    fn from(row: Row<model::ForumTopic>) -> Self {
        ForumTopic {
            id: id_of(row.id),
            title: row.value.title,
            message: row.value.message,
            views: row.value.views,
            created_at: row.value.created_at.to_rfc3339(),
            category_id: row.value.category_id,
            user_id: row.value.user_id,
        }
    }
}

#[ComplexObject]
impl ForumTopic {
    async fn category(&self, ctx: &Context<'_>) -> Result<Option<ForumCategory>> {
        let store = ctx.data::<Store>()?;
        Ok(store
            .forum_categories
            .find_by_key(self.category_id)
            .raise()?
            .map(ForumCategory::from))
    }

    async fn user(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        author_of(ctx, self.user_id).await
    }

    async fn posts(&self, ctx: &Context<'_>) -> Result<Vec<ForumPost>> {
        let store = ctx.data::<Store>()?;
        let posts = store.posts_in(key(self.id)).raise()?;
        Ok(posts.into_iter().map(ForumPost::from).collect())
    }
}

#[derive(SimpleObject, Clone, Debug)]
#[graphql(complex)]
pub struct ForumPost {
    pub id: i64,
    pub message: String,
    pub created_at: String,
    #[graphql(skip)]
    pub user_id: Option<u64>,
}

impl From<Row<model::ForumPost>> for ForumPost {
    fn from(row: Row<model::ForumPost>) -> Self {
        ForumPost {
            id: id_of(row.id),
            message: row.value.message,
            created_at: row.value.created_at.to_rfc3339(),
            user_id: row.value.user_id,
        }
    }
}

#[ComplexObject]
impl ForumPost {
    async fn user(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        author_of(ctx, self.user_id).await
    }
}

#[derive(SimpleObject, Clone, Debug)]
#[graphql(complex)]
pub struct Author {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

impl From<Row<model::Author>> for Author {
    fn from(row: Row<model::Author>) -> Self {
        Author {
            id: id_of(row.id),
            first_name: row.value.first_name,
            last_name: row.value.last_name,
        }
    }
}

#[ComplexObject]
impl Author {
    async fn posts(&self, ctx: &Context<'_>) -> Result<Vec<Post>> {
        let store = ctx.data::<Store>()?;
        let author_id = Some(key(self.id));
        let posts = store
            .posts
            .find_all_by(|post| post.author_id == author_id)
            .raise()?;
        Ok(posts.into_iter().map(Post::from).collect())
    }
}

#[derive(SimpleObject, Clone, Debug)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub text: String,
}

impl From<Row<model::Post>> for Post {
    fn from(row: Row<model::Post>) -> Self {
        Post {
            id: id_of(row.id),
            title: row.value.title,
            text: row.value.text,
        }
    }
}

#[derive(SimpleObject, Clone, Debug)]
pub struct Video {
    pub id: String,
    pub key: String,
    pub name: String,
    pub site: String,
    #[graphql(name = "type")]
    pub kind: String,
    pub size: Option<i32>,
}

impl From<ProviderVideo> for Video {
    fn from(video: ProviderVideo) -> Self {
        Video {
            id: video.id,
            key: video.key,
            name: video.name,
            site: video.site,
            kind: video.kind,
            size: video.size,
        }
    }
}

#[derive(SimpleObject, Clone, Debug)]
pub struct Review {
    pub id: String,
    pub author: String,
    pub content: String,
    pub url: Option<String>,
}

impl From<ProviderReview> for Review {
    fn from(review: ProviderReview) -> Self {
        Review {
            id: review.id,
            author: review.author,
            content: review.content,
            url: review.url,
        }
    }
}

#[derive(SimpleObject)]
pub struct Edge {
    pub cursor: String,
    pub node: Movie,
}

#[derive(SimpleObject)]
pub struct PageInfo {
    pub end_cursor: Option<String>,
    pub has_next_page: bool,
}

#[derive(SimpleObject)]
pub struct MoviesResultCursor {
    pub edges: Vec<Edge>,
    pub page_info: PageInfo,
    pub total_count: i64,
}

#[derive(InputObject, Default)]
pub struct SuggestFiltersInput {
    pub start_year: Option<String>,
    pub end_year: Option<String>,
    /// Genre ids; a movie matches if it has any of them.
    pub genre: Option<Vec<i64>>,
    pub min_rating: Option<i32>,
}
