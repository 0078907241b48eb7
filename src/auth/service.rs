//! Auth service.

use async_trait::async_trait;
use mockall::automock;
use sqlx::PgPool;

use crate::auth::{
    AuthServiceError, IssuedToken, Role, Session, StaffTokenRecord, StaffTokenUuid,
    generate_token, hash_token, repository::PgAuthRepository,
};

#[derive(Debug, Clone)]
pub struct PgAuthService {
    repository: PgAuthRepository,
}

impl PgAuthService {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            repository: PgAuthRepository::new(pool),
        }
    }

    /// Issue a new staff token with the given role.
    ///
    /// The raw token is returned exactly once; only its hash is stored.
    ///
    /// # Errors
    ///
    /// Returns [`AuthServiceError::AlreadyExists`] when the username already
    /// holds a token, or a storage error.
    pub async fn issue_token(
        &self,
        username: &str,
        role: Role,
    ) -> Result<IssuedToken, AuthServiceError> {
        let token = generate_token();

        let metadata = self
            .repository
            .create_staff_token(StaffTokenUuid::new(), username, role, &hash_token(&token))
            .await
            .map_err(AuthServiceError::from)?;

        Ok(IssuedToken { token, metadata })
    }

    /// Revoke a token by UUID. Returns `true` if the token was active.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn revoke_token(&self, token: StaffTokenUuid) -> Result<bool, AuthServiceError> {
        self.repository
            .revoke_staff_token(token)
            .await
            .map(|record| record.is_some())
            .map_err(AuthServiceError::from)
    }

    /// List all issued tokens, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_tokens(&self) -> Result<Vec<StaffTokenRecord>, AuthServiceError> {
        self.repository
            .list_staff_tokens()
            .await
            .map_err(AuthServiceError::from)
    }
}

#[async_trait]
impl AuthService for PgAuthService {
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<Session, AuthServiceError> {
        let token = self
            .repository
            .find_active_token_by_hash(&hash_token(bearer_token))
            .await
            .map_err(AuthServiceError::from)?
            .ok_or(AuthServiceError::NotFound)?;

        Ok(Session {
            staff: token.uuid,
            role: token.role,
        })
    }
}

#[automock]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Exchange a raw bearer token for a verified caller identity and role.
    async fn authenticate_bearer(&self, bearer_token: &str) -> Result<Session, AuthServiceError>;
}
