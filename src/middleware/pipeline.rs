// src/middleware/pipeline.rs
//
// A autenticação é uma sequência de etapas puras. Cada etapa recebe o contexto
// e devolve o contexto enriquecido ou um erro que interrompe a sequência.

use axum::http::HeaderMap;
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

use crate::{
    common::error::AppError,
    config::Config,
    models::auth::{Claims, Role},
    services::auth::decode_token,
};

#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    pub bearer: Option<String>,
    pub claims: Option<Claims>,
}

impl AuthContext {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let bearer = headers
            .typed_get::<Authorization<Bearer>>()
            .map(|auth| auth.token().to_string());
        AuthContext { bearer, claims: None }
    }

    fn token_invalido() -> AppError {
        AppError::Unauthorized("Token inválido ou expirado".into())
    }

    /// As claims verificadas; só existem depois de `verify_token`.
    pub fn into_claims(self) -> Result<Claims, AppError> {
        self.claims.ok_or_else(Self::token_invalido)
    }
}

pub type Stage = fn(&Config, AuthContext) -> Result<AuthContext, AppError>;

pub fn require_bearer(_config: &Config, ctx: AuthContext) -> Result<AuthContext, AppError> {
    match ctx.bearer.as_deref() {
        Some(token) if !token.is_empty() => Ok(ctx),
        _ => Err(AppError::Unauthorized("Acesso negado. Token não fornecido.".into())),
    }
}

pub fn verify_token(config: &Config, mut ctx: AuthContext) -> Result<AuthContext, AppError> {
    let token = ctx.bearer.as_deref().ok_or_else(AuthContext::token_invalido)?;
    ctx.claims = Some(decode_token(token, &config.jwt_secret)?);
    Ok(ctx)
}

pub fn require_admin(_config: &Config, ctx: AuthContext) -> Result<AuthContext, AppError> {
    match ctx.claims.as_ref().map(|c| c.role) {
        Some(Role::Admin) => Ok(ctx),
        _ => Err(AppError::Forbidden),
    }
}

pub const AUTHENTICATED: &[Stage] = &[require_bearer, verify_token];
pub const ADMIN: &[Stage] = &[require_bearer, verify_token, require_admin];

pub fn run(stages: &[Stage], config: &Config, ctx: AuthContext) -> Result<AuthContext, AppError> {
    stages.iter().try_fold(ctx, |ctx, stage| stage(config, ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::AUTHORIZATION;
    use chrono::Utc;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use uuid::Uuid;

    fn token(config: &Config, role: Role, exp_offset: i64) -> String {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4(),
            username: "maria".into(),
            role,
            iat: now as usize,
            exp: (now + exp_offset) as usize,
        };
        encode(&Header::default(), &claims, &EncodingKey::from_secret(config.jwt_secret.as_ref())).unwrap()
    }

    fn ctx_with(value: &str) -> AuthContext {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, value.parse().unwrap());
        AuthContext::from_headers(&headers)
    }

    #[test]
    fn missing_header_stops_at_first_stage() {
        let config = Config::for_tests();
        let err = run(AUTHENTICATED, &config, AuthContext::from_headers(&HeaderMap::new())).unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(msg) if msg.contains("Token não fornecido")));
    }

    #[test]
    fn non_bearer_scheme_is_treated_as_missing() {
        let config = Config::for_tests();
        assert!(ctx_with("Basic dXNlcjpwYXNz").bearer.is_none());
        assert!(run(AUTHENTICATED, &config, ctx_with("Basic dXNlcjpwYXNz")).is_err());
    }

    #[test]
    fn valid_token_yields_claims() {
        let config = Config::for_tests();
        let header = format!("Bearer {}", token(&config, Role::User, 3600));

        let claims = run(AUTHENTICATED, &config, ctx_with(&header)).unwrap().into_claims().unwrap();
        assert_eq!(claims.username, "maria");
    }

    #[test]
    fn expired_or_forged_tokens_are_rejected() {
        let config = Config::for_tests();

        let expirado = format!("Bearer {}", token(&config, Role::User, -3600));
        assert!(matches!(run(AUTHENTICATED, &config, ctx_with(&expirado)), Err(AppError::Unauthorized(_))));

        let mut outro = Config::for_tests();
        outro.jwt_secret = "outro-segredo".into();
        let forjado = format!("Bearer {}", token(&outro, Role::Admin, 3600));
        assert!(matches!(run(AUTHENTICATED, &config, ctx_with(&forjado)), Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn admin_stage_requires_admin_role() {
        let config = Config::for_tests();

        let user = format!("Bearer {}", token(&config, Role::User, 3600));
        assert!(matches!(run(ADMIN, &config, ctx_with(&user)), Err(AppError::Forbidden)));

        let admin = format!("Bearer {}", token(&config, Role::Admin, 3600));
        assert!(run(ADMIN, &config, ctx_with(&admin)).is_ok());
    }
}
