//! Authentication service
//!
//! Operator registration and login with bcrypt password hashing and JWT
//! access tokens

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::error::{AppError, AppResult};

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    access_token_expiry: i64,
}

/// Input for registering an operator account
#[derive(Debug, Deserialize)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

/// Input for logging in
#[derive(Debug, Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Operator account as returned to the client; never carries the hash
#[derive(Debug, Serialize)]
pub struct OperatorAccount {
    pub id: Uuid,
    pub email: String,
    pub display_name: String,
}

/// Successful login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub expires_in: i64,
    pub user: OperatorAccount,
}

/// JWT claims carried on access tokens
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    name: String,
    exp: i64,
    iat: i64,
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    display_name: String,
    password_hash: String,
    is_active: bool,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: PgPool, jwt: &JwtConfig) -> Self {
        Self {
            db,
            jwt_secret: jwt.secret.clone(),
            access_token_expiry: jwt.access_token_expiry,
        }
    }

    /// Register a new operator account
    pub async fn register(&self, input: RegisterInput) -> AppResult<OperatorAccount> {
        shared::validation::validate_email(&input.email).map_err(|msg| AppError::Validation {
            field: "email".to_string(),
            message: msg.to_string(),
        })?;
        shared::validation::validate_password(&input.password).map_err(|msg| {
            AppError::Validation {
                field: "password".to_string(),
                message: msg.to_string(),
            }
        })?;
        shared::validation::validate_name(&input.display_name).map_err(|msg| {
            AppError::Validation {
                field: "display_name".to_string(),
                message: msg.to_string(),
            }
        })?;

        let duplicate = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)",
        )
        .bind(&input.email)
        .fetch_one(&self.db)
        .await?;
        if duplicate {
            return Err(AppError::DuplicateEntry("email".to_string()));
        }

        let password_hash = bcrypt::hash(&input.password, bcrypt::DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing error: {}", e)))?;

        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (email, display_name, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, display_name, password_hash, is_active
            "#,
        )
        .bind(&input.email)
        .bind(&input.display_name)
        .bind(&password_hash)
        .fetch_one(&self.db)
        .await?;

        Ok(OperatorAccount {
            id: row.id,
            email: row.email,
            display_name: row.display_name,
        })
    }

    /// Log in with email and password, returning a signed access token
    pub async fn login(&self, input: LoginInput) -> AppResult<LoginResponse> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, display_name, password_hash, is_active FROM users WHERE email = $1",
        )
        .bind(&input.email)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

        let valid = bcrypt::verify(&input.password, &row.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification error: {}", e)))?;
        if !valid || !row.is_active {
            return Err(AppError::InvalidCredentials);
        }

        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(row.id)
            .execute(&self.db)
            .await?;

        let access_token = self.sign_token(row.id, &row.display_name)?;

        Ok(LoginResponse {
            access_token,
            expires_in: self.access_token_expiry,
            user: OperatorAccount {
                id: row.id,
                email: row.email,
                display_name: row.display_name,
            },
        })
    }

    fn sign_token(&self, user_id: Uuid, name: &str) -> AppResult<String> {
        use jsonwebtoken::{encode, EncodingKey, Header};

        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            name: name.to_string(),
            exp: now + self.access_token_expiry,
            iat: now,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token signing error: {}", e)))
    }
}
