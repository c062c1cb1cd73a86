//! Staff accounts and session claims

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Barbero,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Barbero => "barbero",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "barbero" => Ok(Role::Barbero),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// A dashboard account (admin or barber)
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub nombre: String,
    pub role: Role,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Database row for `accounts`
#[derive(Debug, Clone, FromRow)]
pub struct AccountRow {
    pub id: Uuid,
    pub email: String,
    pub nombre: String,
    pub role: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = AppError;

    fn try_from(row: AccountRow) -> AppResult<Self> {
        let role = row
            .role
            .parse::<Role>()
            .map_err(|e| AppError::Internal(format!("Account {}: {}", row.id, e)))?;
        Ok(Self {
            id: row.id,
            email: row.email,
            nombre: row.nombre,
            role,
            password_hash: row.password_hash,
            created_at: row.created_at,
        })
    }
}

/// Account data handed to the store
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub nombre: String,
    pub role: Role,
    pub password_hash: String,
}

/// Public staff directory entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StaffMember {
    pub id: Uuid,
    pub nombre: String,
}

impl From<&Account> for StaffMember {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            nombre: account.nombre.clone(),
        }
    }
}

/// Sign-in request
#[derive(Debug, Deserialize, ToSchema)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

/// Sign-up request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SignUpRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub nombre: String,
    pub password: String,
    pub password_confirmation: String,
}

/// Password update request
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdatePasswordRequest {
    pub password: String,
    pub password_confirmation: String,
}

/// Session returned on sign-in / sign-up
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub token: String,
    pub token_type: String,
    pub expires_at: i64,
    pub session: SessionInfo,
}

/// Identity carried by a session
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SessionInfo {
    pub account_id: Uuid,
    pub email: String,
    pub nombre: String,
    pub role: Role,
}

/// JWT claims for authenticated staff
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub account_id: Uuid,
    pub nombre: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl SessionClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            account_id: self.account_id,
            email: self.sub.clone(),
            nombre: self.nombre.clone(),
            role: self.role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Require admin privileges
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Authorization("Administrator privileges required".to_string()))
        }
    }

    /// Barbers may only act on appointments assigned to them
    pub fn require_access_to(&self, barbero_id: Option<Uuid>) -> Result<(), AppError> {
        match self.role {
            Role::Admin => Ok(()),
            Role::Barbero if barbero_id == Some(self.account_id) => Ok(()),
            Role::Barbero => Err(AppError::Authorization(
                "Appointment is assigned to another barber".to_string(),
            )),
        }
    }
}
