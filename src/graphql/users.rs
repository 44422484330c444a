use super::types::*;
use super::{key, Raise};
use crate::auth::{AuthGuard, Authenticator, Identity};
use crate::database::{Store, UserDb};
use crate::error::Error;
use crate::model::{self, Role};
use async_graphql::{Context, Object, Result};
use log::info;

#[derive(Default)]
pub struct UserQuery;

#[Object]
impl UserQuery {
    async fn users(&self, ctx: &Context<'_>) -> Result<Vec<User>> {
        let store = ctx.data::<Store>()?;
        let users = store.users.find_all().raise()?;
        Ok(users.into_iter().map(User::from).collect())
    }

    #[graphql(guard = "AuthGuard")]
    async fn me(&self, ctx: &Context<'_>) -> Result<Option<User>> {
        let store = ctx.data::<Store>()?;
        let identity = ctx.data::<Identity>()?;
        Ok(store.get_user(identity.id).raise()?.map(User::from))
    }

    /// The caller's favorite movies; empty for anonymous requests.
    async fn favorites(&self, ctx: &Context<'_>) -> Result<Vec<Movie>> {
        let identity = match ctx.data_opt::<Identity>() {
            Some(identity) => identity,
            None => return Ok(Vec::new()),
        };
        let store = ctx.data::<Store>()?;
        let movies = store.favorites_of(identity.id).raise()?;
        Ok(movies.into_iter().map(Movie::from).collect())
    }
}

#[derive(Default)]
pub struct UserMutation;

#[Object]
impl UserMutation {
    async fn login(
        &self,
        ctx: &Context<'_>,
        email: String,
        password: String,
    ) -> Result<LoginPayload> {
        let store = ctx.data::<Store>()?;
        let auth = ctx.data::<Authenticator>()?;
        Ok(login(store, auth, &email, &password).into())
    }

    async fn signup(
        &self,
        ctx: &Context<'_>,
        email: String,
        password: String,
        first_name: String,
        last_name: String,
    ) -> Result<SignupPayload> {
        let store = ctx.data::<Store>()?;
        let auth = ctx.data::<Authenticator>()?;
        let user = model::User {
            email: email.trim().to_owned(),
            password_hash: String::new(),
            first_name,
            last_name,
            role: Role::User,
        };
        Ok(signup(store, auth, user, &password).into())
    }

    /// Adds the movie to the caller's favorites, or removes it if it already
    /// is one.
    #[graphql(guard = "AuthGuard")]
    async fn add_favorite(&self, ctx: &Context<'_>, movie_id: i64) -> Result<AddFavoritePayload> {
        let store = ctx.data::<Store>()?;
        let identity = ctx.data::<Identity>()?;
        Ok(toggle_favorite(store, identity, key(movie_id)).into())
    }
}

fn login(
    store: &Store,
    auth: &Authenticator,
    email: &str,
    password: &str,
) -> std::result::Result<User, Error> {
    let user = store
        .get_user_by_email(email)?
        .ok_or(Error::InvalidCredentials)?;
    if !auth.check_password(password, &user.value.password_hash) {
        return Err(Error::InvalidCredentials);
    }
    let token = auth.issue(&user)?;
    info!("User {} logged in", user.id);
    Ok(User::from(user).with_token(token))
}

fn signup(
    store: &Store,
    auth: &Authenticator,
    mut user: model::User,
    password: &str,
) -> std::result::Result<User, Error> {
    if user.email.is_empty() || password.is_empty() {
        return Err(Error::Validation(
            "Email and password must not be empty.".to_owned(),
        ));
    }
    user.password_hash = auth.hash_password(password)?;
    let user = store.add_user(user)?;
    let token = auth.issue(&user)?;
    info!("User {} signed up", user.id);
    Ok(User::from(user).with_token(token))
}

fn toggle_favorite(
    store: &Store,
    identity: &Identity,
    movie_id: u64,
) -> std::result::Result<Vec<Movie>, Error> {
    if store.movies.find_by_key(movie_id)?.is_none() {
        return Err(Error::NotFound("movie"));
    }
    store.toggle_favorite(identity.id, movie_id)?;
    let favorites = store.favorites_of(identity.id)?;
    Ok(favorites.into_iter().map(Movie::from).collect())
}
