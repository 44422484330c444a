use async_graphql::ErrorExtensions;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Storage(#[from] sled::Error),
    #[error("encoding error: {0}")]
    Codec(#[from] bincode::Error),
    #[error("a {entity} with this {field} already exists")]
    Duplicate {
        entity: &'static str,
        field: &'static str,
    },
    #[error("malformed key in tree {0}")]
    CorruptKey(&'static str),
}

impl From<sled::transaction::TransactionError<StoreError>> for StoreError {
    fn from(err: sled::transaction::TransactionError<StoreError>) -> Self {
        match err {
            sled::transaction::TransactionError::Abort(e) => e,
            sled::transaction::TransactionError::Storage(e) => StoreError::Storage(e),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum TmdbError {
    #[error("metadata provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("metadata provider answered with status {0}")]
    Status(u16),
}

/// Stable classification behind every error message, so clients never have
/// to match on text.
#[derive(async_graphql::Enum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Duplicate,
    NotFound,
    InvalidCredentials,
    Unauthenticated,
    Validation,
    Upstream,
    Internal,
}

impl ErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::Duplicate => "DUPLICATE",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::InvalidCredentials => "INVALID_CREDENTIALS",
            ErrorKind::Unauthenticated => "UNAUTHENTICATED",
            ErrorKind::Validation => "VALIDATION",
            ErrorKind::Upstream => "UPSTREAM",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("A {entity} with this {field} already exists.")]
    Duplicate {
        entity: &'static str,
        field: &'static str,
    },
    #[error("Unable to find {0}.")]
    NotFound(&'static str),
    #[error("Invalid email / password combination.")]
    InvalidCredentials,
    #[error("Unauthenticated!")]
    Unauthenticated,
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Upstream(#[from] TmdbError),
    #[error(transparent)]
    Store(StoreError),
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("token signing failed: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
    #[error("token expiry is out of range")]
    TokenExpiry,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Duplicate { .. } => ErrorKind::Duplicate,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::InvalidCredentials => ErrorKind::InvalidCredentials,
            Error::Unauthenticated => ErrorKind::Unauthenticated,
            Error::Validation(_) => ErrorKind::Validation,
            Error::Upstream(_) => ErrorKind::Upstream,
            Error::Store(_) | Error::Hash(_) | Error::Token(_) | Error::TokenExpiry => {
                ErrorKind::Internal
            }
        }
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate { entity, field } => Error::Duplicate { entity, field },
            other => Error::Store(other),
        }
    }
}

impl ErrorExtensions for Error {
    fn extend(&self) -> async_graphql::Error {
        let code = self.kind().code();
        async_graphql::Error::new(self.to_string()).extend_with(|_, e| e.set("code", code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_storage_error_keeps_its_kind() {
        let err: Error = StoreError::Duplicate {
            entity: "movie",
            field: "title",
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Duplicate);
        assert_eq!(err.to_string(), "A movie with this title already exists.");
    }

    #[test]
    fn raised_errors_carry_a_code() {
        let err = Error::NotFound("list").extend();
        assert_eq!(err.message, "Unable to find list.");
        let code = err
            .extensions
            .as_ref()
            .and_then(|ext| ext.get("code"))
            .cloned();
        assert_eq!(code, Some(async_graphql::Value::from("NOT_FOUND")));
    }
}
