use super::relation::pair_key;
use super::table::{abort, deserialize_id, serialize_id, Table};
use super::{Store, MOVIES_EXTERNAL_ID};
use crate::error::{StoreError, StoreResult};
use crate::model::*;
use chrono::NaiveDate;
use log::info;
use rand::Rng;
use sled::Transactional;

/// Constraints for a random pick. Empty `genres` means any genre.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuggestFilter {
    pub genres: Vec<u64>,
    pub min_rating: Option<f64>,
    pub released_from: Option<NaiveDate>,
    pub released_until: Option<NaiveDate>,
}

impl SuggestFilter {
    fn matches(&self, movie: &Movie) -> bool {
        if let Some(min) = self.min_rating {
            if movie.vote_average.map_or(true, |rating| rating < min) {
                return false;
            }
        }
        if let Some(from) = self.released_from {
            if movie.release_date.map_or(true, |date| date < from) {
                return false;
            }
        }
        if let Some(until) = self.released_until {
            if movie.release_date.map_or(true, |date| date > until) {
                return false;
            }
        }
        true
    }
}

#[derive(Debug)]
pub struct MoviePage {
    pub movies: Vec<Row<Movie>>,
    pub has_next_page: bool,
}

pub trait MovieDb {
    /// Creates the movie, its forum category and its genre links in one
    /// transaction. Fails with `Duplicate` if the title is taken.
    fn create_movie(&self, movie: Movie, genre_ids: &[u64]) -> StoreResult<Row<Movie>>;
    fn movie_by_external_id(&self, external_id: i64) -> StoreResult<Option<Row<Movie>>>;
    fn all_movies(&self, featured: Option<bool>) -> StoreResult<Vec<Row<Movie>>>;
    fn search_movies(&self, term: &str, limit: Option<usize>) -> StoreResult<Vec<Row<Movie>>>;
    fn suggest_movie(&self, filter: &SuggestFilter) -> StoreResult<Option<Row<Movie>>>;
    fn movies_page(&self, after: Option<u64>, first: usize) -> StoreResult<MoviePage>;
    fn genres_of(&self, movie_id: u64) -> StoreResult<Vec<Row<Genre>>>;
}

impl MovieDb for Store {
    fn create_movie(&self, mut movie: Movie, genre_ids: &[u64]) -> StoreResult<Row<Movie>> {
        let movie_id = self.movies.next_id()?;
        let category_id = self.forum_categories.next_id()?;

        let mut category = ForumCategory::new(movie.title.clone(), None);
        category.movie_id = Some(movie_id);
        movie.forum_category_id = Some(category_id);

        let movie_key = serialize_id(movie_id);
        let category_key = serialize_id(category_id);
        let movie_bytes = Table::encode(&movie)?;
        let category_bytes = Table::encode(&category)?;
        let genre_keys: Vec<[u8; 16]> = genre_ids
            .iter()
            .map(|genre_id| pair_key(movie_id, *genre_id))
            .collect();

        (
            self.movies.tree(),
            &self.movies_title,
            &self.movies_external_id,
            self.forum_categories.tree(),
            self.movie_genres.tree(),
        )
            .transaction(|(movies, titles, external_ids, categories, movie_genres)| {
                if titles.get(movie.title.as_bytes())?.is_some() {
                    return Err(abort(StoreError::Duplicate {
                        entity: "movie",
                        field: "title",
                    }));
                }
                titles.insert(movie.title.as_bytes(), &movie_key[..])?;
                if let Some(external_id) = movie.external_id {
                    let external_key = external_id.to_be_bytes();
                    if external_ids.get(&external_key[..])?.is_some() {
                        return Err(abort(StoreError::Duplicate {
                            entity: "movie",
                            field: "externalId",
                        }));
                    }
                    external_ids.insert(&external_key[..], &movie_key[..])?;
                }
                movies.insert(&movie_key[..], movie_bytes.as_slice())?;
                categories.insert(&category_key[..], category_bytes.as_slice())?;
                for key in &genre_keys {
                    movie_genres.insert(&key[..], &b""[..])?;
                }
                Ok(())
            })?;

        info!(
            "Created movie {} {:?} with forum category {}",
            movie_id, movie.title, category_id
        );
        Ok(Row {
            id: movie_id,
            value: movie,
        })
    }

    fn movie_by_external_id(&self, external_id: i64) -> StoreResult<Option<Row<Movie>>> {
        match self.movies_external_id.get(external_id.to_be_bytes())? {
            Some(id) => self
                .movies
                .find_by_key(deserialize_id(id, MOVIES_EXTERNAL_ID)?),
            None => Ok(None),
        }
    }

    fn all_movies(&self, featured: Option<bool>) -> StoreResult<Vec<Row<Movie>>> {
        match featured {
            Some(featured) => self.movies.find_all_by(|movie| movie.featured == featured),
            None => self.movies.find_all(),
        }
    }

    fn search_movies(&self, term: &str, limit: Option<usize>) -> StoreResult<Vec<Row<Movie>>> {
        let needle = term.to_lowercase();
        let mut found = self
            .movies
            .find_all_by(|movie| movie.title.to_lowercase().contains(&needle))?;
        if let Some(limit) = limit {
            found.truncate(limit);
        }
        Ok(found)
    }

    fn suggest_movie(&self, filter: &SuggestFilter) -> StoreResult<Option<Row<Movie>>> {
        let mut candidates = Vec::new();
        for row in self.movies.find_all_by(|movie| filter.matches(movie))? {
            if !filter.genres.is_empty() {
                let genres = self.movie_genres.get_related(row.id)?;
                if !genres.iter().any(|genre| filter.genres.contains(genre)) {
                    continue;
                }
            }
            candidates.push(row);
        }
        if candidates.is_empty() {
            return Ok(None);
        }
        let pick = rand::thread_rng().gen_range(0..candidates.len());
        Ok(Some(candidates.swap_remove(pick)))
    }

    fn movies_page(&self, after: Option<u64>, first: usize) -> StoreResult<MoviePage> {
        let movies = self.movies.after(after, first)?;
        let has_next_page = match movies.last() {
            Some(last) => self.movies.any_after(last.id)?,
            None => false,
        };
        Ok(MoviePage {
            movies,
            has_next_page,
        })
    }

    fn genres_of(&self, movie_id: u64) -> StoreResult<Vec<Row<Genre>>> {
        let ids = self.movie_genres.get_related(movie_id)?;
        self.genres.find_many(&ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::ForumDb;
    use std::collections::HashSet;

    fn movie(title: &str) -> Movie {
        Movie {
            title: title.to_owned(),
            ..Movie::default()
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn creating_a_movie_creates_its_category() {
        let store = Store::temporary();
        let row = store.create_movie(movie("Heat"), &[]).unwrap();
        let categories = store.forum_categories.find_all().unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].value.title, "Heat");
        assert_eq!(categories[0].value.movie_id, Some(row.id));
        assert_eq!(row.value.forum_category_id, Some(categories[0].id));
        assert_eq!(store.category_of_movie(&row).unwrap().unwrap().id, categories[0].id);
    }

    #[test]
    fn duplicate_title_is_rejected_without_side_effects() {
        let store = Store::temporary();
        store.create_movie(movie("Heat"), &[]).unwrap();
        let err = store.create_movie(movie("Heat"), &[]).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Duplicate {
                entity: "movie",
                field: "title"
            }
        ));
        assert_eq!(store.movies.count(), 1);
        assert_eq!(store.forum_categories.count(), 1);
    }

    #[test]
    fn external_id_lookup() {
        let store = Store::temporary();
        let row = store
            .create_movie(
                Movie {
                    external_id: Some(122),
                    ..movie("The Return of the King")
                },
                &[],
            )
            .unwrap();
        assert_eq!(store.movie_by_external_id(122).unwrap().map(|m| m.id), Some(row.id));
        assert_eq!(store.movie_by_external_id(123).unwrap(), None);
    }

    #[test]
    fn external_id_is_unique() {
        let store = Store::temporary();
        let heat = store
            .create_movie(
                Movie {
                    external_id: Some(949),
                    ..movie("Heat")
                },
                &[],
            )
            .unwrap();
        let err = store
            .create_movie(
                Movie {
                    external_id: Some(949),
                    ..movie("Other")
                },
                &[],
            )
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::Duplicate {
                entity: "movie",
                field: "externalId"
            }
        ));
        assert_eq!(store.movie_by_external_id(949).unwrap().map(|m| m.id), Some(heat.id));
        assert_eq!(store.movies.count(), 1);
        assert_eq!(store.forum_categories.count(), 1);
    }

    #[test]
    fn search_is_case_insensitive_and_limited() {
        let store = Store::temporary();
        store
            .create_movie(movie("The Lord of the Rings: The Return of the King"), &[])
            .unwrap();
        store.create_movie(movie("Heat"), &[]).unwrap();
        for term in &["ring", "RING", "Ring"] {
            let found = store.search_movies(term, None).unwrap();
            assert_eq!(found.len(), 1);
            assert_eq!(found[0].value.title, "The Lord of the Rings: The Return of the King");
        }
        assert_eq!(store.search_movies("", None).unwrap().len(), 2);
        assert_eq!(store.search_movies("", Some(1)).unwrap().len(), 1);
    }

    #[test]
    fn suggestion_respects_filters() {
        let store = Store::temporary();
        let drama = store
            .genres
            .create(Genre {
                name: "Drama".to_owned(),
                external_id: None,
            })
            .unwrap();
        let old = store
            .create_movie(
                Movie {
                    vote_average: Some(8.5),
                    release_date: ymd(1972, 3, 24),
                    ..movie("The Godfather")
                },
                &[drama.id],
            )
            .unwrap();
        store
            .create_movie(
                Movie {
                    vote_average: Some(6.0),
                    release_date: ymd(2010, 7, 16),
                    ..movie("Something Else")
                },
                &[],
            )
            .unwrap();

        let by_genre = SuggestFilter {
            genres: vec![drama.id],
            ..SuggestFilter::default()
        };
        assert_eq!(store.suggest_movie(&by_genre).unwrap().map(|m| m.id), Some(old.id));

        let by_rating = SuggestFilter {
            min_rating: Some(8.0),
            ..SuggestFilter::default()
        };
        assert_eq!(store.suggest_movie(&by_rating).unwrap().map(|m| m.id), Some(old.id));

        let by_year = SuggestFilter {
            released_from: ymd(1970, 1, 1),
            released_until: ymd(1980, 1, 1),
            ..SuggestFilter::default()
        };
        assert_eq!(store.suggest_movie(&by_year).unwrap().map(|m| m.id), Some(old.id));

        let nothing = SuggestFilter {
            min_rating: Some(9.5),
            ..SuggestFilter::default()
        };
        assert_eq!(store.suggest_movie(&nothing).unwrap(), None);
    }

    #[test]
    fn unfiltered_suggestion_picks_from_everything() {
        let store = Store::temporary();
        let ids: HashSet<u64> = (0..4)
            .map(|i| store.create_movie(movie(&format!("Movie {}", i)), &[]).unwrap().id)
            .collect();
        for _ in 0..20 {
            let pick = store.suggest_movie(&SuggestFilter::default()).unwrap().unwrap();
            assert!(ids.contains(&pick.id));
        }
    }

    #[test]
    fn pages_never_repeat() {
        let store = Store::temporary();
        for i in 0..3 {
            store.create_movie(movie(&format!("Movie {}", i)), &[]).unwrap();
        }
        let mut seen = HashSet::new();
        let mut after = None;
        loop {
            let page = store.movies_page(after, 1).unwrap();
            assert_eq!(page.movies.len(), 1);
            assert!(seen.insert(page.movies[0].id));
            after = Some(page.movies[0].id);
            if !page.has_next_page {
                break;
            }
        }
        assert_eq!(seen.len(), 3);
        assert!(store.movies_page(after, 1).unwrap().movies.is_empty());
    }

    #[test]
    fn featured_filter() {
        let store = Store::temporary();
        store
            .create_movie(
                Movie {
                    featured: true,
                    ..movie("Featured")
                },
                &[],
            )
            .unwrap();
        store.create_movie(movie("Plain"), &[]).unwrap();
        assert_eq!(store.all_movies(Some(true)).unwrap().len(), 1);
        assert_eq!(store.all_movies(Some(false)).unwrap().len(), 1);
        assert_eq!(store.all_movies(None).unwrap().len(), 2);
    }
}
