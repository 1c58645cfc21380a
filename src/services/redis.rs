//! Redis service for short-lived login state

use redis::{AsyncCommands, Client};

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct RedisService {
    client: Client,
}

impl RedisService {
    /// Create a new Redis service. No connection is made until first use.
    pub fn new(url: &str) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Internal(format!("Failed to create Redis client: {}", e)))?;
        Ok(Self { client })
    }

    /// Test the connection
    pub async fn ping(&self) -> AppResult<()> {
        let mut conn = self.get_connection().await?;
        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Redis connection test failed: {}", e)))?;
        Ok(())
    }

    /// Remember an OAuth `state` issued by `/login` for `ttl_seconds`
    pub async fn store_login_state(&self, state: &str, ttl_seconds: u64) -> AppResult<()> {
        let mut conn = self.get_connection().await?;
        conn.set_ex::<_, _, ()>(login_state_key(state), "1", ttl_seconds)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to store login state in Redis: {}", e)))?;
        Ok(())
    }

    /// Consume a login state. Returns false if it was never issued, already
    /// used, or expired.
    pub async fn consume_login_state(&self, state: &str) -> AppResult<bool> {
        let mut conn = self.get_connection().await?;
        let removed: i64 = conn
            .del(login_state_key(state))
            .await
            .map_err(|e| AppError::Internal(format!("Failed to consume login state in Redis: {}", e)))?;
        Ok(removed == 1)
    }

    /// Get a Redis connection
    pub async fn get_connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get Redis connection: {}", e)))
    }
}

fn login_state_key(state: &str) -> String {
    format!("oidc:state:{}", state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_is_lazy() {
        // Nothing listens here; construction must still succeed
        assert!(RedisService::new("redis://127.0.0.1:1").is_ok());
        assert!(RedisService::new("not a url").is_err());
    }

    #[test]
    fn test_state_key() {
        assert_eq!(login_state_key("abc"), "oidc:state:abc");
    }
}
