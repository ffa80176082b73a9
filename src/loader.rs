//! One-shot loading of the user list.
//!
//! The request is sent exactly once per run. There is no timeout and no retry;
//! the outcome is delivered to the event loop as `Message::DataLoaded`.

use std::sync::mpsc::Sender;
use std::time::Instant;

use reqwest::Client;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::domain::{LoadError, Message};
use crate::users::UserRecord;

pub struct UserClient {
    url: String,
    client: Client,
}

impl UserClient {
    pub fn with_url(url: &str) -> Self {
        Self {
            url: url.to_string(),
            client: Client::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// GET the configured endpoint and decode the full body as `Vec<UserRecord>`.
    pub async fn fetch_users(&self) -> Result<Vec<UserRecord>, LoadError> {
        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .status()
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string();
            return Err(LoadError::Status { status, message });
        }

        let body = response.bytes().await?;
        let users: Vec<UserRecord> = serde_json::from_slice(&body)?;
        Ok(users)
    }
}

/// Runs the fetch on `runtime` and posts the result to `sender`.
pub fn spawn_load(runtime: &Handle, client: UserClient, sender: Sender<Message>) -> JoinHandle<()> {
    runtime.spawn(async move {
        let start_time = Instant::now();
        let result = client.fetch_users().await;
        let duration = start_time.elapsed().as_millis();
        match &result {
            Ok(users) => info!("Loaded {} users from {} in {duration}ms", users.len(), client.url()),
            Err(e) => error!("Loading users from {} failed after {duration}ms: {e}", client.url()),
        }
        if sender.send(Message::DataLoaded(result)).is_err() {
            error!("Event loop is gone, dropping load result");
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn server_with(template: ResponseTemplate) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(template)
            .expect(1)
            .mount(&mock_server)
            .await;
        mock_server
    }

    fn users_url(server: &MockServer) -> String {
        format!("{}/users", server.uri())
    }

    #[tokio::test]
    async fn test_fetch_users_success() {
        let server = server_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"username": "alice", "email": "a@x.com", "phone": "1"},
            {"username": "bob", "email": "b@x.com", "phone": "2",
             "address": {"street": "s", "suite": "1", "city": "c", "zipcode": "z",
                         "geo": {"lat": "0", "lng": "0"}}}
        ])))
        .await;

        let users = UserClient::with_url(&users_url(&server)).fetch_users().await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[0], UserRecord::new("alice", "a@x.com", "1"));
        assert_eq!(users[1].username, "bob");
    }

    #[tokio::test]
    async fn test_fetch_users_server_error() {
        let server = server_with(ResponseTemplate::new(503)).await;
        let result = UserClient::with_url(&users_url(&server)).fetch_users().await;
        match result {
            Err(LoadError::Status { status, .. }) => assert_eq!(status, 503),
            other => panic!("Expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_fetch_users_malformed_body() {
        let server = server_with(ResponseTemplate::new(200).set_body_string("{\"not\": \"a list\"}")).await;
        let result = UserClient::with_url(&users_url(&server)).fetch_users().await;
        assert!(matches!(result, Err(LoadError::Body(_))), "got {result:?}");
    }

    #[tokio::test]
    async fn test_fetch_users_network_error() {
        // Nothing listens on port 9 of localhost
        let result = UserClient::with_url("http://127.0.0.1:9/users").fetch_users().await;
        assert!(matches!(result, Err(LoadError::Network(_))), "got {result:?}");
    }

    #[tokio::test]
    async fn test_spawn_load_posts_message() {
        let server = server_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([{"username": "alice", "email": "a@x.com", "phone": "1"}])),
        )
        .await;
        let (tx, rx) = mpsc::channel();
        let handle = spawn_load(&Handle::current(), UserClient::with_url(&users_url(&server)), tx);
        handle.await.unwrap();

        match rx.try_recv() {
            Ok(Message::DataLoaded(Ok(users))) => assert_eq!(users.len(), 1),
            other => panic!("Expected loaded users, got {other:?}"),
        }
        assert!(rx.try_recv().is_err());
    }
}
