//! In-memory stand-in for a remote API, with artificial latency.
use std::time::Duration;
use tally::eyre;

const LATENCY: Duration = Duration::from_millis(5);

#[derive(Debug, Clone, PartialEq)]
pub struct Photo {
    pub id: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone)]
pub struct User {
    pub username: String,
    pub name: String,
}

impl User {
    pub async fn load_by_username(username: &str) -> eyre::Result<User> {
        tokio::time::sleep(LATENCY).await;
        match username {
            "crew" => Ok(User {
                username: "crew".to_string(),
                name: "Crew".to_string(),
            }),
            other => eyre::bail!("user '{other}' not found"),
        }
    }

    pub async fn load_photos(&self) -> eyre::Result<Vec<Photo>> {
        tokio::time::sleep(LATENCY).await;
        Ok((0..3)
            .map(|i| Photo {
                id: format!("{}-{i}", self.username),
                width: 4000,
                height: 3000,
            })
            .collect())
    }
}

#[derive(Debug, Clone)]
pub struct Stats {
    pub batch_downloads: f64,
    pub photo_downloads: f64,
}

impl Stats {
    pub async fn load() -> eyre::Result<Stats> {
        tokio::time::sleep(LATENCY).await;
        Ok(Stats {
            batch_downloads: 1_250_000.0,
            photo_downloads: 980_000_000.0,
        })
    }
}
