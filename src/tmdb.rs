//! Read-only client for the TMDB movie metadata API.
//!
//! List endpoints never fail: transport and status errors are logged and
//! answered with an empty list. Only [`TmdbClient::movie`] hands the error to
//! the caller, because importing a movie has to tell the user why it failed.

use crate::config::Config;
use crate::error::TmdbError;
use crate::model::Movie;
use chrono::NaiveDate;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Deserialize;

const IMAGE_BASE_URL: &str = "http://image.tmdb.org/t/p/";

#[derive(async_graphql::Enum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSize {
    Tiny,
    Small,
    Medium,
    Large,
    ExtraLarge,
    Huge,
    Original,
}

impl Default for ImageSize {
    fn default() -> Self {
        ImageSize::Large
    }
}

impl ImageSize {
    pub fn token(self) -> &'static str {
        match self {
            ImageSize::Tiny => "w92",
            ImageSize::Small => "w154",
            ImageSize::Medium => "w185",
            ImageSize::Large => "w342",
            ImageSize::ExtraLarge => "w500",
            ImageSize::Huge => "w780",
            ImageSize::Original => "original",
        }
    }
}

/// `path` is the fragment the provider returns, including its leading slash.
pub fn image_url(path: &str, size: ImageSize) -> String {
    format!("{}{}{}", IMAGE_BASE_URL, size.token(), path)
}

/// Points a provider image URL at another size. URLs that don't come from the
/// provider are returned unchanged.
pub fn resize_image_url(url: &str, size: ImageSize) -> String {
    match url
        .strip_prefix(IMAGE_BASE_URL)
        .and_then(|rest| rest.find('/').map(|slash| &rest[slash..]))
    {
        Some(path) => image_url(path, size),
        None => url.to_owned(),
    }
}

#[derive(Debug, Deserialize)]
struct Page<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct GenreList {
    #[serde(default)]
    genres: Vec<ProviderGenre>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ProviderGenre {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderMovie {
    pub id: i64,
    pub title: String,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub vote_average: Option<f64>,
    pub release_date: Option<String>,
    /// Present on list endpoints.
    #[serde(default)]
    pub genre_ids: Vec<i64>,
    /// Present on the details endpoint.
    #[serde(default)]
    pub genres: Vec<ProviderGenre>,
}

impl ProviderMovie {
    pub fn to_movie(&self) -> Movie {
        Movie {
            title: self.title.clone(),
            poster: self
                .poster_path
                .as_deref()
                .map(|path| image_url(path, ImageSize::default())),
            backdrop_path: self
                .backdrop_path
                .as_deref()
                .map(|path| image_url(path, ImageSize::Huge)),
            description: self.overview.clone(),
            external_id: Some(self.id),
            vote_average: self.vote_average,
            release_date: self
                .release_date
                .as_deref()
                .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()),
            featured: false,
            forum_category_id: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ProviderVideo {
    pub id: String,
    pub key: String,
    pub name: String,
    pub site: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub size: Option<i32>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ProviderReview {
    pub id: String,
    pub author: String,
    pub content: String,
    pub url: Option<String>,
}

#[derive(Clone)]
pub struct TmdbClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    pub fn new<U: Into<String>, K: Into<String>>(base_url: U, api_key: K) -> Self {
        TmdbClient {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            api_key: api_key.into(),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.tmdb_base_url.as_str(), config.tmdb_api_key.as_str())
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, TmdbError> {
        debug!("GET {}{}", self.base_url, path);
        let response = self
            .http
            .get(format!("{}{}", self.base_url, path))
            .query(&[("api_key", self.api_key.as_str()), ("language", "en-US")])
            .query(query)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TmdbError::Status(status.as_u16()));
        }
        Ok(response.json().await?)
    }

    async fn list<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Vec<T> {
        match self.get::<Page<T>>(path, query).await {
            Ok(page) => page.results,
            Err(err) => {
                warn!("Metadata request {} failed: {}", path, err);
                Vec::new()
            }
        }
    }

    pub async fn search(&self, title: &str) -> Vec<ProviderMovie> {
        self.list(
            "/search/movie",
            &[("query", title), ("page", "1"), ("include_adult", "false")],
        )
        .await
    }

    pub async fn movie(&self, external_id: i64) -> Result<ProviderMovie, TmdbError> {
        self.get(&format!("/movie/{}", external_id), &[]).await
    }

    pub async fn similar(&self, external_id: i64) -> Vec<ProviderMovie> {
        self.list(&format!("/movie/{}/similar", external_id), &[])
            .await
    }

    pub async fn upcoming(&self) -> Vec<ProviderMovie> {
        self.list("/movie/upcoming", &[]).await
    }

    pub async fn now_playing(&self) -> Vec<ProviderMovie> {
        self.list("/movie/now_playing", &[]).await
    }

    pub async fn videos(&self, external_id: i64) -> Vec<ProviderVideo> {
        self.list(&format!("/movie/{}/videos", external_id), &[])
            .await
    }

    pub async fn reviews(&self, external_id: i64) -> Vec<ProviderReview> {
        self.list(&format!("/movie/{}/reviews", external_id), &[])
            .await
    }

    pub async fn genres(&self) -> Vec<ProviderGenre> {
        match self.get::<GenreList>("/genre/movie/list", &[]).await {
            Ok(list) => list.genres,
            Err(err) => {
                warn!("Metadata genre list failed: {}", err);
                Vec::new()
            }
        }
    }
}
