use crate::config::{Config, MAX_TOKEN_TTL_HOURS};
use crate::database::{Store, UserDb};
use crate::error::Error;
use crate::graphql::Raise;
use crate::model::{Role, Row, User};
use async_graphql::{Context, ErrorExtensions, Guard};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use log::debug;
use serde::{Deserialize, Serialize};

/// The verified caller of a request.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub id: u64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: Role,
}

impl From<&Row<User>> for Identity {
    fn from(user: &Row<User>) -> Self {
        Identity {
            id: user.id,
            email: user.value.email.clone(),
            first_name: user.value.first_name.clone(),
            last_name: user.value.last_name.clone(),
            role: user.value.role,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
struct Claims {
    #[serde(flatten)]
    identity: Identity,
    exp: i64,
}

#[derive(Clone)]
pub struct Authenticator {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl: Duration,
    bcrypt_cost: u32,
}

impl Authenticator {
    pub fn new(secret: &[u8], token_ttl: Duration, bcrypt_cost: u32) -> Self {
        Authenticator {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            token_ttl,
            bcrypt_cost,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.jwt_secret.as_bytes(),
            Duration::hours(config.token_ttl_hours.clamp(1, MAX_TOKEN_TTL_HOURS)),
            config.bcrypt_cost,
        )
    }

    /// Only login and signup mint tokens.
    pub(crate) fn issue(&self, user: &Row<User>) -> Result<String, Error> {
        let exp = Utc::now()
            .checked_add_signed(self.token_ttl)
            .ok_or(Error::TokenExpiry)?;
        let claims = Claims {
            identity: Identity::from(user),
            exp: exp.timestamp(),
        };
        Ok(encode(&Header::default(), &claims, &self.encoding_key)?)
    }

    /// Any token that is malformed, expired or signed with another secret
    /// yields `None`.
    pub fn verify(&self, token: &str) -> Option<Identity> {
        match decode::<Claims>(token, &self.decoding_key, &Validation::default()) {
            Ok(data) => Some(data.claims.identity),
            Err(err) => {
                debug!("Rejected token: {}", err);
                None
            }
        }
    }

    /// Resolves an `Authorization` header value. A missing or non-bearer
    /// header is an anonymous request, not an error.
    pub fn identity_from_header(&self, header: Option<&str>) -> Option<Identity> {
        let token = header?.strip_prefix("Bearer ")?.trim();
        if token.is_empty() {
            return None;
        }
        self.verify(token)
    }

    pub fn hash_password(&self, password: &str) -> Result<String, Error> {
        Ok(bcrypt::hash(password, self.bcrypt_cost)?)
    }

    pub fn check_password(&self, password: &str, hash: &str) -> bool {
        bcrypt::verify(password, hash).unwrap_or(false)
    }
}

/// Rejects the field before its resolver runs unless the request carries a
/// verified [`Identity`] whose user still exists.
pub struct AuthGuard;

impl Guard for AuthGuard {
    async fn check(&self, ctx: &Context<'_>) -> async_graphql::Result<()> {
        let identity = match ctx.data_opt::<Identity>() {
            Some(identity) => identity,
            None => return Err(Error::Unauthenticated.extend()),
        };
        let store = ctx.data::<Store>()?;
        match store.get_user(identity.id).raise()? {
            Some(_) => Ok(()),
            None => {
                debug!("Token names missing user {}", identity.id);
                Err(Error::Unauthenticated.extend())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn authenticator() -> Authenticator {
        Authenticator::new(b"test-secret", Duration::hours(1), 4)
    }

    fn user() -> Row<User> {
        Row {
            id: 7,
            value: User {
                email: "admin@email.com".to_owned(),
                password_hash: String::new(),
                first_name: "James".to_owned(),
                last_name: "Bond".to_owned(),
                role: Role::Sysadmin,
            },
        }
    }

    #[test]
    fn issued_tokens_verify() {
        let auth = authenticator();
        let token = auth.issue(&user()).unwrap();
        let identity = auth.verify(&token).unwrap();
        assert_eq!(identity, Identity::from(&user()));
        assert_eq!(
            auth.identity_from_header(Some(&format!("Bearer {}", token))),
            Some(identity)
        );
    }

    #[test]
    fn bad_tokens_are_anonymous() {
        let auth = authenticator();
        let token = auth.issue(&user()).unwrap();
        let other = Authenticator::new(b"other-secret", Duration::hours(1), 4);
        assert_eq!(other.verify(&token), None);
        assert_eq!(auth.verify("not a token"), None);
        assert_eq!(auth.identity_from_header(None), None);
        assert_eq!(auth.identity_from_header(Some("Bearer ")), None);
        assert_eq!(auth.identity_from_header(Some(&token)), None);
    }

    #[test]
    fn expired_tokens_are_anonymous() {
        let auth = Authenticator::new(b"test-secret", Duration::hours(-2), 4);
        let token = auth.issue(&user()).unwrap();
        assert_eq!(auth.verify(&token), None);
    }

    #[test]
    fn expiry_overflow_is_an_error() {
        let auth = Authenticator::new(b"test-secret", Duration::days(1_000_000_000), 4);
        assert!(matches!(auth.issue(&user()), Err(Error::TokenExpiry)));

        let mut config = crate::config::test_config();
        config.token_ttl_hours = 10_000_000_000;
        let auth = Authenticator::from_config(&config);
        let token = auth.issue(&user()).unwrap();
        assert!(auth.verify(&token).is_some());
    }

    #[test]
    fn passwords_are_hashed() {
        let auth = authenticator();
        let hash = auth.hash_password("123").unwrap();
        assert_ne!(hash, "123");
        assert!(auth.check_password("123", &hash));
        assert!(!auth.check_password("1234", &hash));
        assert!(!auth.check_password("123", "garbage"));
    }
}
