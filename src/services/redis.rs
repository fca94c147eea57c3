//! Redis service for per-visitor counters

use redis::{AsyncCommands, Client};

use crate::error::{AppError, AppResult};

/// Visit counters live as long as an idle session would (two weeks)
const VISIT_TTL_SECONDS: i64 = 14 * 24 * 3600;

#[derive(Clone)]
pub struct RedisService {
    client: Client,
}

impl RedisService {
    /// Create a new Redis service and check the server answers
    pub async fn new(url: &str) -> AppResult<Self> {
        let service = Self::open(url)?;
        let mut conn = service
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to connect to Redis: {}", e)))?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Redis connection test failed: {}", e)))?;

        Ok(service)
    }

    /// Parse the URL without connecting; connections are made per command
    pub fn open(url: &str) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Internal(format!("Failed to create Redis client: {}", e)))?;
        Ok(Self { client })
    }

    /// Count a visit and return how many visits preceded this one
    pub async fn record_visit(&self, visitor_id: &str) -> AppResult<i64> {
        let mut conn = self.get_connection().await?;

        let key = visit_key(visitor_id);
        let visits: i64 = conn
            .incr(&key, 1)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to count visit in Redis: {}", e)))?;

        conn.expire::<_, ()>(&key, VISIT_TTL_SECONDS)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to set visit expiry in Redis: {}", e)))?;

        Ok(visits - 1)
    }

    /// Get a Redis connection
    pub async fn get_connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get Redis connection: {}", e)))
    }
}

fn visit_key(visitor_id: &str) -> String {
    format!("visits:{}", visitor_id)
}
