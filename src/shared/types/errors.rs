use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Validation: {0}")]
    Validation(String),

    #[error("Not found: {entity} with {field}={value}")]
    NotFound {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error("Invalid transition: {role} may not move a '{from}' request to '{to}'")]
    InvalidTransition {
        from: String,
        to: String,
        role: String,
    },

    #[error("Confirmation incomplete: missing {missing} confirmation")]
    ConfirmationIncomplete { missing: &'static str },

    #[error("Username '{0}' is already taken")]
    DuplicateUsername(String),

    #[error("Invalid username or password")]
    AuthFailure,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            field: "id",
            value: id.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum InfraError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Crypto error: {0}")]
    Crypto(#[from] bcrypt::BcryptError),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

impl From<InfraError> for DomainError {
    fn from(err: InfraError) -> Self {
        DomainError::Internal(err.to_string())
    }
}
