use crate::common::context::Context;
use crate::common::error::AppError;
use crate::common::init;
use crate::common::redis_pool::{PoolResult, RedisPool};
use crate::common::state::AppState;
use crate::models::sessions::Session;
use crate::settings::AppSettings;
use crate::usecases::sessions;
use async_trait::async_trait;
use axum::Router;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use sqlx::{MySql, Pool};
use std::net::SocketAddr;
use tracing::info;

pub mod v1;

pub struct RequestContext {
    pub db: Pool<MySql>,
    pub redis: RedisPool,
}

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/v1", v1::router())
}

pub async fn serve(settings: &AppSettings) -> anyhow::Result<()> {
    let state = init::initialize_state(settings).await?;
    let router = router().with_state(state);

    let addr = SocketAddr::from((settings.app_host, settings.app_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {addr}");
    axum::serve(listener, router).await?;
    Ok(())
}

impl FromRequestParts<AppState> for RequestContext {
    type Rejection = AppError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self {
            db: state.db.clone(),
            redis: state.redis.clone(),
        })
    }
}

#[async_trait]
impl Context for RequestContext {
    fn db(&self) -> &Pool<MySql> {
        &self.db
    }

    async fn redis(&self) -> PoolResult {
        self.redis.get().await
    }
}

impl FromRequestParts<AppState> for Session {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let ctx = RequestContext::from_request_parts(parts, state).await?;
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(AppError::Unauthorized)?;
        sessions::authenticate(&ctx, token).await
    }
}

/// Marker extractor for collaborator-facing endpoints guarded by the shared
/// internal key.
pub struct InternalKey;

impl FromRequestParts<AppState> for InternalKey {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let settings = AppSettings::get();
        let provided = parts
            .headers
            .get("x-internal-key")
            .and_then(|value| value.to_str().ok());
        match provided {
            Some(key) if key == settings.internal_api_key => Ok(Self),
            _ => Err(AppError::InternalInvalidKey),
        }
    }
}
