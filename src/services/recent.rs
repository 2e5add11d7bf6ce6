use redis::AsyncCommands;

use crate::error::AppResult;

/// Per-owner "last visited repository" key. Written when someone navigates
/// into a repository, read by the list merge. Scoping by provider and owner
/// keeps tenants from seeing each other's entries.
#[derive(Clone)]
pub struct RecentVisits {
    conn: Option<redis::aio::MultiplexedConnection>,
}

fn visit_key(provider: &str, owner: &str) -> String {
    format!("recent-repo:{}:{}", provider, owner)
}

impl RecentVisits {
    pub async fn connect(url: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(url)?;
        let conn = client.get_multiplexed_tokio_connection().await?;
        Ok(Self { conn: Some(conn) })
    }

    /// A store that remembers nothing. Used when no Redis URL is configured;
    /// the list view simply renders without a recently-visited row.
    pub fn disabled() -> Self {
        Self { conn: None }
    }

    pub async fn last_visited(&self, provider: &str, owner: &str) -> AppResult<Option<String>> {
        let Some(conn) = &self.conn else {
            return Ok(None);
        };

        let mut conn = conn.clone();
        let name: Option<String> = conn.get(visit_key(provider, owner)).await?;
        Ok(name)
    }

    pub async fn record_visit(&self, provider: &str, owner: &str, repo: &str) -> AppResult<()> {
        let Some(conn) = &self.conn else {
            return Ok(());
        };

        let mut conn = conn.clone();
        let _: () = conn.set(visit_key(provider, owner), repo).await?;
        Ok(())
    }
}
