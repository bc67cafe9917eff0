//! Authenticated HTTP gateway
//!
//! One reqwest client per engine context. Every outbound request reads
//! the bearer credential from durable storage at send time (never from
//! a cache), and every failure is classified exactly once into
//! [`ApiError`]. A 401 is handled globally: the stored credential is
//! cleared, one session-expired event goes out, and the call fails with
//! [`ApiError::Unauthorized`].

use std::sync::Arc;
use std::time::Duration;

use ft_core::auth::{SessionEvent, SessionEventSender};
use ft_core::ports::TokenStorePort;
use ft_core::ApiError;
use reqwest::header::AUTHORIZATION;
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Per-request knobs. The default carries no deadline; clients are
/// expected to pass an explicit timeout for every interactive call.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestOptions {
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }

    /// Explicitly unbounded: the request runs until the transport gives
    /// up on its own.
    pub fn unbounded() -> Self {
        Self { timeout: None }
    }
}

pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
    token_store: Arc<dyn TokenStorePort>,
    session_tx: SessionEventSender,
}

impl HttpGateway {
    pub fn new(
        base_url: impl Into<String>,
        token_store: Arc<dyn TokenStorePort>,
        session_tx: SessionEventSender,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| anyhow::anyhow!("build HTTP client failed: {}", e))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token_store,
            session_tx,
        })
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let response = self.send(Method::GET, path, None::<&()>, options).await?;
        decode_json(response).await
    }

    pub async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let response = self.send(Method::POST, path, Some(body), options).await?;
        decode_json(response).await
    }

    /// POST where the response body carries nothing the caller needs.
    pub async fn post_unit<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<(), ApiError> {
        self.send(Method::POST, path, Some(body), options).await?;
        Ok(())
    }

    pub async fn patch_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let response = self.send(Method::PATCH, path, Some(body), options).await?;
        decode_json(response).await
    }

    /// PATCH where the response body carries nothing the caller needs.
    pub async fn patch_unit<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<(), ApiError> {
        self.send(Method::PATCH, path, Some(body), options).await?;
        Ok(())
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        options: RequestOptions,
    ) -> Result<Response, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "sending request");

        let mut builder = self.client.request(method, &url);
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        // Credential is read at send time so a token swapped mid-session
        // takes effect on the very next call.
        match self.token_store.load().await {
            Ok(Some(token)) => {
                builder = builder.header(AUTHORIZATION, format!("token {}", token.as_str()));
            }
            Ok(None) => {}
            Err(err) => {
                // Proceed unauthenticated; the backend's 401 will drive
                // the usual session-expiry path.
                warn!(error = %err, "credential storage read failed; sending without token");
            }
        }

        let response = builder.send().await.map_err(classify_transport)?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            self.handle_unauthorized().await;
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            return Err(classify_status(status, response).await);
        }
        Ok(response)
    }

    /// Global 401 handling: clear the stored credential, then emit one
    /// session-expired event for the shell's navigation reset.
    async fn handle_unauthorized(&self) {
        if let Err(err) = self.token_store.clear().await {
            warn!(error = %err, "failed to clear stored credential after 401");
        }
        warn!("session expired (401); credential cleared");
        // The receiver may be gone during teardown; nothing to do then.
        let _ = self.session_tx.send(SessionEvent::Expired);
    }
}

/// Error body shapes seen across the backend: `message`, `detail` or
/// `error`, all optional.
#[derive(Debug, Deserialize)]
struct ServerMessage {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    detail: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl ServerMessage {
    fn into_message(self) -> Option<String> {
        [self.message, self.detail, self.error]
            .into_iter()
            .flatten()
            .find(|m| !m.trim().is_empty())
    }
}

fn classify_transport(error: reqwest::Error) -> ApiError {
    if error.is_timeout() {
        ApiError::Timeout
    } else {
        ApiError::Network {
            detail: error.to_string(),
        }
    }
}

async fn classify_status(status: StatusCode, response: Response) -> ApiError {
    if status.is_server_error() {
        return ApiError::Server {
            status: status.as_u16(),
        };
    }
    // 4xx: surface the server's own message verbatim when it sent one.
    let message = response
        .json::<ServerMessage>()
        .await
        .ok()
        .and_then(ServerMessage::into_message);
    ApiError::Validation { message }
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    response.json::<T>().await.map_err(|e| {
        if e.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::Decode {
                detail: e.to_string(),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::FileKeyValueStore;
    use crate::token::KvTokenStore;
    use ft_core::auth::{session_channel, AuthToken, SessionEventReceiver};
    use ft_core::ports::TokenStorePort;
    use mockito::{Matcher, Server};
    use tempfile::TempDir;

    async fn gateway_with_token(
        url: String,
        temp_dir: &TempDir,
        token: Option<&str>,
    ) -> (HttpGateway, Arc<KvTokenStore>, SessionEventReceiver) {
        let kv = FileKeyValueStore::open(temp_dir.path().join("kv.json"))
            .await
            .unwrap();
        let tokens = Arc::new(KvTokenStore::new(Arc::new(kv)));
        if let Some(token) = token {
            tokens.store(&AuthToken::new(token)).await.unwrap();
        }
        let (tx, rx) = session_channel();
        let gateway = HttpGateway::new(url, tokens.clone(), tx).unwrap();
        (gateway, tokens, rx)
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Pong {
        ok: bool,
    }

    #[tokio::test]
    async fn test_token_attached_at_send_time() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/ping")
            .match_header("authorization", "token tok-1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ok": true}"#)
            .create_async()
            .await;

        let temp_dir = TempDir::new().unwrap();
        let (gateway, _, _rx) = gateway_with_token(server.url(), &temp_dir, Some("tok-1")).await;

        let pong: Pong = gateway
            .get_json("/ping", RequestOptions::with_timeout(Duration::from_secs(5)))
            .await
            .unwrap();
        assert!(pong.ok);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_no_token_sends_no_header() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/ping")
            .match_header("authorization", Matcher::Missing)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ok": true}"#)
            .create_async()
            .await;

        let temp_dir = TempDir::new().unwrap();
        let (gateway, _, _rx) = gateway_with_token(server.url(), &temp_dir, None).await;

        let _: Pong = gateway
            .get_json("/ping", RequestOptions::with_timeout(Duration::from_secs(5)))
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_token_swap_takes_effect_on_next_call() {
        let mut server = Server::new_async().await;
        let first = server
            .mock("GET", "/ping")
            .match_header("authorization", "token old")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ok": true}"#)
            .create_async()
            .await;
        let second = server
            .mock("GET", "/ping")
            .match_header("authorization", "token new")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"ok": true}"#)
            .create_async()
            .await;

        let temp_dir = TempDir::new().unwrap();
        let (gateway, tokens, _rx) = gateway_with_token(server.url(), &temp_dir, Some("old")).await;

        let options = RequestOptions::with_timeout(Duration::from_secs(5));
        let _: Pong = gateway.get_json("/ping", options).await.unwrap();
        tokens.store(&AuthToken::new("new")).await.unwrap();
        let _: Pong = gateway.get_json("/ping", options).await.unwrap();

        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn test_401_clears_token_and_emits_one_event() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/secure")
            .with_status(401)
            .create_async()
            .await;

        let temp_dir = TempDir::new().unwrap();
        let (gateway, tokens, mut rx) =
            gateway_with_token(server.url(), &temp_dir, Some("stale")).await;

        let result: Result<Pong, _> = gateway
            .get_json("/secure", RequestOptions::with_timeout(Duration::from_secs(5)))
            .await;
        assert_eq!(result.unwrap_err(), ApiError::Unauthorized);

        // Credential is gone and exactly one event went out
        assert_eq!(tokens.load().await.unwrap(), None);
        assert_eq!(rx.try_recv().ok(), Some(SessionEvent::Expired));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_4xx_surfaces_server_message() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/dealer/create/")
            .with_status(422)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message": "Phone number already registered"}"#)
            .create_async()
            .await;

        let temp_dir = TempDir::new().unwrap();
        let (gateway, _, _rx) = gateway_with_token(server.url(), &temp_dir, None).await;

        let err = gateway
            .post_unit(
                "/dealer/create/",
                &serde_json::json!({"name": "x"}),
                RequestOptions::with_timeout(Duration::from_secs(5)),
            )
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ApiError::Validation {
                message: Some("Phone number already registered".to_string())
            }
        );
    }

    #[tokio::test]
    async fn test_4xx_without_body_still_classified() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/missing")
            .with_status(404)
            .create_async()
            .await;

        let temp_dir = TempDir::new().unwrap();
        let (gateway, _, _rx) = gateway_with_token(server.url(), &temp_dir, None).await;

        let err = gateway
            .get_json::<Pong>("/missing", RequestOptions::with_timeout(Duration::from_secs(5)))
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::Validation { message: None });
    }

    #[tokio::test]
    async fn test_5xx_maps_to_server_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/boom")
            .with_status(502)
            .with_body("Bad Gateway")
            .create_async()
            .await;

        let temp_dir = TempDir::new().unwrap();
        let (gateway, _, _rx) = gateway_with_token(server.url(), &temp_dir, None).await;

        let err = gateway
            .get_json::<Pong>("/boom", RequestOptions::with_timeout(Duration::from_secs(5)))
            .await
            .unwrap_err();
        assert_eq!(err, ApiError::Server { status: 502 });
    }

    #[tokio::test]
    async fn test_malformed_success_body_is_decode_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/ping")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"unexpected": "shape"}"#)
            .create_async()
            .await;

        let temp_dir = TempDir::new().unwrap();
        let (gateway, _, _rx) = gateway_with_token(server.url(), &temp_dir, None).await;

        let err = gateway
            .get_json::<Pong>("/ping", RequestOptions::with_timeout(Duration::from_secs(5)))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        // Bind a listener, remember its address, then drop it so the
        // port refuses connections. (A pooled mockito server is not
        // used here: dropping its guard returns it to the pool with the
        // port still open, answering 501 instead of refusing.)
        let url = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            format!("http://{}", listener.local_addr().unwrap())
        };

        let temp_dir = TempDir::new().unwrap();
        let (gateway, _, _rx) = gateway_with_token(url, &temp_dir, None).await;

        let err = gateway
            .get_json::<Pong>("/ping", RequestOptions::with_timeout(Duration::from_secs(5)))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Network { .. }));
    }

    #[tokio::test]
    async fn test_patch_unit_accepts_204() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PATCH", "/track/end-visit/v-9/")
            .with_status(204)
            .create_async()
            .await;

        let temp_dir = TempDir::new().unwrap();
        let (gateway, _, _rx) = gateway_with_token(server.url(), &temp_dir, None).await;

        gateway
            .patch_unit(
                "/track/end-visit/v-9/",
                &serde_json::json!({"remark": "Discussed pricing"}),
                RequestOptions::with_timeout(Duration::from_secs(5)),
            )
            .await
            .unwrap();
        mock.assert_async().await;
    }
}
