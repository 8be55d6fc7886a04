use async_trait::async_trait;
use serde_json::{Value, json};
use std::time::Duration;

use shared::config::QueueApiConfig;
use shared::models::{QueuePage, QueueSpec};

use crate::errors::{ClientError, ClientResult};

/// Remote queue API: bearer-token auth plus paginated listing.
#[async_trait]
pub trait QueueApi: Send + Sync {
    /// Obtains a bearer token. Any failure is fatal for the caller's fetch cycle.
    async fn authenticate(&self) -> ClientResult<String>;

    /// Fetches one page (1-based) of the listing for `queue`.
    async fn fetch_page(&self, token: &str, queue: &QueueSpec, page: u32) -> ClientResult<QueuePage>;
}

pub struct HttpQueueApi {
    client: reqwest::Client,
    config: QueueApiConfig,
}

impl HttpQueueApi {
    pub fn new(config: QueueApiConfig) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    fn listing_url(&self) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.queue_path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl QueueApi for HttpQueueApi {
    async fn authenticate(&self) -> ClientResult<String> {
        let response = self
            .client
            .post(&self.config.auth_url)
            .json(&json!({
                "client_id": self.config.client_id,
                "client_secret": self.config.client_secret,
                "grant_type": "client_credentials",
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(ClientError::Auth {
                status: status.as_u16(),
                message: if message.trim().is_empty() {
                    status.to_string()
                } else {
                    message
                },
            });
        }

        let payload: Value = response.json().await?;
        ["access_token", "token"]
            .iter()
            .find_map(|key| payload.get(*key).and_then(Value::as_str))
            .filter(|token| !token.trim().is_empty())
            .map(str::to_string)
            .ok_or_else(|| ClientError::Auth {
                status: status.as_u16(),
                message: "authentication response carries no token".to_string(),
            })
    }

    async fn fetch_page(&self, token: &str, queue: &QueueSpec, page: u32) -> ClientResult<QueuePage> {
        let response = self
            .client
            .get(self.listing_url())
            .bearer_auth(token)
            .query(&[
                ("tipo", queue.request_type.api_code().to_string()),
                ("page", page.to_string()),
                ("size", self.config.page_size.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Page {
                page,
                status: status.as_u16(),
            });
        }
        Ok(response.json::<QueuePage>().await?)
    }
}

#[cfg(test)]
pub(crate) mod stub {
    //! One-shot HTTP responder standing in for the queue API.

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    /// Serves `responses` in order, one per connection, and returns the base URL.
    pub async fn serve(responses: Vec<(u16, String)>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        tokio::spawn(async move {
            for (status, body) in responses {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                read_request(&mut socket).await;
                let reply = format!(
                    "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = socket.write_all(reply.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });
        format!("http://{}", address)
    }

    async fn read_request(socket: &mut TcpStream) {
        let mut buffer = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let read = socket.read(&mut chunk).await.unwrap_or(0);
            if read == 0 {
                return;
            }
            buffer.extend_from_slice(&chunk[..read]);
            if let Some(end) = buffer.windows(4).position(|window| window == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&buffer[..end]).to_lowercase();
                let length = head
                    .lines()
                    .find_map(|line| line.strip_prefix("content-length:"))
                    .and_then(|value| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buffer.len() >= end + 4 + length {
                    return;
                }
            }
        }
    }
}
