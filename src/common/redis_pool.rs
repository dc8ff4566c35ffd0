use crate::settings::AppSettings;
use deadpool::Runtime;
use deadpool::managed::{Manager, Metrics, Object, Pool, PoolError, RecycleResult};
use redis::{AsyncConnectionConfig, Commands, RedisError, RedisResult};

pub struct RedisConnectionManager {
    client: redis::Client,
    config: AsyncConnectionConfig,
}

impl Manager for RedisConnectionManager {
    type Type = redis::aio::MultiplexedConnection;
    type Error = RedisError;

    async fn create(&self) -> RedisResult<Self::Type> {
        self.client
            .get_multiplexed_async_connection_with_config(&self.config)
            .await
    }

    async fn recycle(
        &self,
        _obj: &mut Self::Type,
        _metrics: &Metrics,
    ) -> RecycleResult<Self::Error> {
        Ok(())
    }
}

pub type RedisPool = Pool<RedisConnectionManager>;
pub type Connection = Object<RedisConnectionManager>;
pub type Error = PoolError<RedisError>;
pub type PoolResult = Result<Connection, Error>;

pub fn connect(settings: &AppSettings) -> anyhow::Result<RedisPool> {
    let client = redis::Client::open(settings.redis_url.as_str())?;
    let mut conn = client.get_connection_with_timeout(settings.redis_wait_timeout)?;
    let _: () = conn.ping()?;

    let config = AsyncConnectionConfig::new()
        .set_connection_timeout(settings.redis_connection_timeout)
        .set_response_timeout(settings.redis_response_timeout);
    let manager = RedisConnectionManager { client, config };
    let pool = RedisPool::builder(manager)
        .max_size(settings.redis_max_connections)
        .wait_timeout(Some(settings.redis_wait_timeout))
        .runtime(Runtime::Tokio1)
        .build()?;
    Ok(pool)
}
