// src/services/auth.rs

use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{db_utils::USUARIO_DUPLICADO, error::AppError},
    config::Config,
    db::repository::UserRepository,
    models::auth::{AuthResponse, Claims, LoginUserPayload, RegisterUserPayload, Role, User},
};

/// Decodifica e valida (assinatura e expiração) um token HS256.
pub fn decode_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(token, &DecodingKey::from_secret(secret.as_ref()), &Validation::default())
        .map(|data| data.claims)
        .map_err(|_| AppError::Unauthorized("Token inválido ou expirado".into()))
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    config: Arc<Config>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, config: Arc<Config>) -> Self {
        Self { users, config }
    }

    pub async fn register(&self, payload: RegisterUserPayload) -> Result<AuthResponse, AppError> {
        self.register_with_role(payload, Role::User).await
    }

    pub async fn register_with_role(
        &self,
        payload: RegisterUserPayload,
        role: Role,
    ) -> Result<AuthResponse, AppError> {
        let payload = payload.normalized();
        payload.validate()?;

        if self.users.find_by_email(&payload.email).await?.is_some()
            || self.users.find_by_username(&payload.username).await?.is_some()
        {
            return Err(AppError::Duplicate(USUARIO_DUPLICADO.into()));
        }

        // bcrypt é caro: roda fora do executor assíncrono
        let password = payload.password;
        let cost = self.config.bcrypt_cost;
        let password_hash = tokio::task::spawn_blocking(move || hash(&password, cost))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: payload.username,
            email: payload.email,
            password_hash,
            role,
            created_at: now,
            updated_at: now,
        };

        let user = self.users.create(&user).await?;
        tracing::info!(user_id = %user.id, username = %user.username, "Usuário registrado");

        let token = self.create_token(&user)?;
        Ok(AuthResponse { token, user })
    }

    pub async fn login(&self, payload: LoginUserPayload) -> Result<AuthResponse, AppError> {
        payload.validate()?;
        let email = payload.email.trim().to_lowercase();

        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password = payload.password;
        let password_hash = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || verify(&password, &password_hash))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        let token = self.create_token(&user)?;
        Ok(AuthResponse { token, user })
    }

    pub async fn profile(&self, user_id: Uuid) -> Result<User, AppError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Usuário não encontrado".into()))
    }

    /// Confere se o usuário do token ainda existe.
    pub async fn find_user(&self, user_id: Uuid) -> Result<Option<User>, AppError> {
        self.users.find_by_id(user_id).await
    }

    pub async fn has_users(&self) -> Result<bool, AppError> {
        Ok(self.users.count().await? > 0)
    }

    pub fn create_token(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + Duration::hours(self.config.jwt_expiration_hours);

        let claims = Claims {
            sub: user.id,
            username: user.username.clone(),
            role: user.role,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.config.jwt_secret.as_ref()),
        )?)
    }
}
