#![allow(dead_code)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use pet_records_api::auth::{generate_jwt, Claims};
use pet_records_api::config::AppConfig;
use pet_records_api::model::{Caller, PetFields, Role};
use pet_records_api::routes;
use pet_records_api::state::AppState;
use pet_records_api::store::{MemoryStore, PetStore};
use reqwest::{RequestBuilder, StatusCode};
use uuid::Uuid;

pub const SECRET: &str = "integration-test-secret";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub store: Arc<MemoryStore>,
    client: reqwest::Client,
}

impl TestServer {
    /// Start the router on a free port, backed by a fresh in-memory store
    pub async fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(store.clone(), SECRET);
        let mut config = AppConfig::development();
        config.api.enable_request_logging = false;
        let app = routes::app(state, &config);

        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        let server = Self {
            port,
            base_url,
            store,
            client: reqwest::Client::new(),
        };
        server.wait_ready(Duration::from_secs(5)).await?;
        Ok(server)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = self.client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn get(&self, path: &str, caller: &Caller) -> RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(token_for(caller))
    }

    pub fn post(&self, path: &str, caller: &Caller) -> RequestBuilder {
        self.client.post(self.url(path)).bearer_auth(token_for(caller))
    }

    pub fn put(&self, path: &str, caller: &Caller) -> RequestBuilder {
        self.client.put(self.url(path)).bearer_auth(token_for(caller))
    }

    pub fn delete(&self, path: &str, caller: &Caller) -> RequestBuilder {
        self.client.delete(self.url(path)).bearer_auth(token_for(caller))
    }

    pub fn anonymous(&self) -> &reqwest::Client {
        &self.client
    }

    /// Insert a pet named `name` directly into the store
    pub async fn seed_pet(&self, name: &str) -> Result<Uuid> {
        let pet = self
            .store
            .create_pet(PetFields {
                name: Some(name.to_string()),
                ..Default::default()
            })
            .await?;
        Ok(pet.id)
    }
}

pub fn token_for(caller: &Caller) -> String {
    let claims = Claims::new(caller.id, caller.role, caller.pets.iter().copied().collect(), 1);
    generate_jwt(&claims, SECRET).expect("test token")
}

pub fn admin() -> Caller {
    Caller::new(Uuid::new_v4(), Role::Admin, [])
}

pub fn owner_of(pet: Uuid) -> Caller {
    Caller::new(Uuid::new_v4(), Role::User, [pet])
}

pub fn stranger() -> Caller {
    Caller::new(Uuid::new_v4(), Role::User, [])
}
