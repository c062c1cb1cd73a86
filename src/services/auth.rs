//! Authentication and staff directory service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{
        account::{
            NewAccount, SessionInfo, SessionResponse, SignInRequest, SignUpRequest, UpdatePasswordRequest,
        },
        Account, Role, SessionClaims, StaffMember,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(repository: Repository, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Authenticate by e-mail and password and open a session
    pub async fn sign_in(&self, request: &SignInRequest) -> AppResult<SessionResponse> {
        let account = self
            .repository
            .accounts
            .get_by_email(request.email.trim())
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid email or password".to_string()))?;

        if !self.verify_password(&account, &request.password)? {
            return Err(AppError::Authentication("Invalid email or password".to_string()));
        }

        tracing::info!(account_id = %account.id, "Signed in");
        self.open_session(&account)
    }

    /// Register a barber account (when enabled) and open a session
    pub async fn sign_up(&self, request: &SignUpRequest) -> AppResult<SessionResponse> {
        if !self.config.allow_signup {
            return Err(AppError::Authorization("Sign-up is disabled".to_string()));
        }
        request.validate()?;
        self.check_new_password(&request.password, &request.password_confirmation)?;

        let account = self
            .repository
            .accounts
            .create(NewAccount {
                email: request.email.trim().to_string(),
                nombre: request.nombre.trim().to_string(),
                role: Role::Barbero,
                password_hash: self.hash_password(&request.password)?,
            })
            .await?;

        tracing::info!(account_id = %account.id, "Account created");
        self.open_session(&account)
    }

    /// Current session, re-read from the store so removed accounts drop out
    pub async fn get_session(&self, claims: &SessionClaims) -> AppResult<Option<SessionInfo>> {
        match self.repository.accounts.get_by_id(claims.account_id).await {
            Ok(account) => Ok(Some(SessionInfo {
                account_id: account.id,
                email: account.email,
                nombre: account.nombre,
                role: account.role,
            })),
            Err(AppError::NotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Sessions are stateless tokens; the client discards its copy
    pub fn sign_out(&self, claims: &SessionClaims) {
        tracing::info!(account_id = %claims.account_id, "Signed out");
    }

    pub async fn update_password(
        &self,
        claims: &SessionClaims,
        request: &UpdatePasswordRequest,
    ) -> AppResult<()> {
        self.check_new_password(&request.password, &request.password_confirmation)?;
        let hash = self.hash_password(&request.password)?;
        self.repository
            .accounts
            .update_password(claims.account_id, &hash)
            .await?;
        tracing::info!(account_id = %claims.account_id, "Password updated");
        Ok(())
    }

    /// Create the configured admin account if it does not exist yet
    pub async fn bootstrap_admin(&self) -> AppResult<()> {
        let (Some(email), Some(password)) = (
            self.config.bootstrap_admin_email.as_deref(),
            self.config.bootstrap_admin_password.as_deref(),
        ) else {
            return Ok(());
        };

        if self.repository.accounts.get_by_email(email).await?.is_some() {
            return Ok(());
        }

        let account = self
            .repository
            .accounts
            .create(NewAccount {
                email: email.to_string(),
                nombre: "Admin".to_string(),
                role: Role::Admin,
                password_hash: self.hash_password(password)?,
            })
            .await?;
        tracing::info!(account_id = %account.id, "Bootstrap admin account created");
        Ok(())
    }

    pub async fn list_staff(&self) -> AppResult<Vec<StaffMember>> {
        let barbers = self.repository.accounts.list_barbers().await?;
        Ok(barbers.iter().map(StaffMember::from).collect())
    }

    pub async fn get_staff(&self, id: Uuid) -> AppResult<StaffMember> {
        let account = self.repository.accounts.get_by_id(id).await?;
        if account.role != Role::Barbero {
            return Err(AppError::Validation(format!("Account {} is not a barber", id)));
        }
        Ok(StaffMember::from(&account))
    }

    fn open_session(&self, account: &Account) -> AppResult<SessionResponse> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = SessionClaims {
            sub: account.email.clone(),
            account_id: account.id,
            nombre: account.nombre.clone(),
            role: account.role,
            exp,
            iat: now,
        };

        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        Ok(SessionResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_at: exp,
            session: claims.info(),
        })
    }

    fn check_new_password(&self, password: &str, confirmation: &str) -> AppResult<()> {
        if password.chars().count() < self.config.min_password_length {
            return Err(AppError::Validation(format!(
                "Password must be at least {} characters",
                self.config.min_password_length
            )));
        }
        if password != confirmation {
            return Err(AppError::Validation("Passwords do not match".to_string()));
        }
        Ok(())
    }

    fn verify_password(&self, account: &Account, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&account.password_hash)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }
}
