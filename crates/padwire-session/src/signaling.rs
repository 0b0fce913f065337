use std::time::Duration;

use async_trait::async_trait;
use padwire_transport::SessionDescription;

use crate::error::{Result, SessionError};

/// Relays the local offer to the remote side and returns its answer.
///
/// One request, one response. No retries happen at this layer.
#[async_trait]
pub trait Signaling: Send + Sync {
    async fn exchange(&self, offer: &SessionDescription) -> Result<SessionDescription>;
}

/// Signaling over a single HTTP POST.
///
/// The offer is sent as `{"type", "sdp"}` JSON; the response body must be
/// the answer in the same shape. A non-2xx status or an unparseable body
/// fails the exchange.
#[derive(Debug, Clone)]
pub struct HttpSignaling {
    client: reqwest::Client,
    url: String,
}

impl HttpSignaling {
    /// Create a client for `url` with no request timeout.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(url, None)
    }

    /// Create a client for `url`, bounding each request by `timeout`.
    pub fn with_timeout(url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(SessionError::Signaling)?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Endpoint the offer is posted to.
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Signaling for HttpSignaling {
    async fn exchange(&self, offer: &SessionDescription) -> Result<SessionDescription> {
        tracing::debug!(url = %self.url, sdp_len = offer.sdp.len(), "posting offer");

        let response = self
            .client
            .post(&self.url)
            .json(offer)
            .send()
            .await
            .map_err(SessionError::Signaling)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SessionError::SignalingStatus(status.as_u16()));
        }

        let body = response.bytes().await.map_err(SessionError::Signaling)?;
        let answer: SessionDescription =
            serde_json::from_slice(&body).map_err(SessionError::MalformedAnswer)?;
        tracing::debug!(sdp_type = %answer.sdp_type, sdp_len = answer.sdp.len(), "answer received");
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::extract::State;
    use axum::http::{header, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::post;
    use axum::{Json, Router};
    use padwire_transport::SdpType;
    use tokio::net::TcpListener;

    use super::*;

    #[derive(Clone)]
    struct Canned {
        status: StatusCode,
        body: &'static str,
        seen: Arc<Mutex<Option<serde_json::Value>>>,
    }

    async fn offer_handler(
        State(canned): State<Canned>,
        Json(offer): Json<serde_json::Value>,
    ) -> impl IntoResponse {
        *canned.seen.lock().unwrap() = Some(offer);
        (
            canned.status,
            [(header::CONTENT_TYPE, "application/json")],
            canned.body,
        )
    }

    /// Serve a canned response on an ephemeral port and hand back the
    /// offer URL plus the last posted body.
    async fn serve(
        status: StatusCode,
        body: &'static str,
    ) -> (String, Arc<Mutex<Option<serde_json::Value>>>) {
        let seen = Arc::new(Mutex::new(None));
        let router = Router::new()
            .route("/webrtc/offer", post(offer_handler))
            .with_state(Canned {
                status,
                body,
                seen: Arc::clone(&seen),
            });

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        (format!("http://{addr}/webrtc/offer"), seen)
    }

    #[tokio::test]
    async fn posts_offer_and_parses_answer() {
        let (url, seen) = serve(
            StatusCode::OK,
            r#"{"sdp":"v=0\r\nanswer","type":"answer"}"#,
        )
        .await;
        let signaling = HttpSignaling::new(url).unwrap();

        let answer = signaling
            .exchange(&SessionDescription::offer("v=0\r\noffer"))
            .await
            .unwrap();

        assert_eq!(answer.sdp_type, SdpType::Answer);
        assert_eq!(answer.sdp, "v=0\r\nanswer");

        let posted = seen.lock().unwrap().clone().unwrap();
        assert_eq!(
            posted,
            serde_json::json!({ "type": "offer", "sdp": "v=0\r\noffer" })
        );
    }

    #[tokio::test]
    async fn non_success_status_fails() {
        let (url, _) = serve(StatusCode::INTERNAL_SERVER_ERROR, r#"{"detail":"boom"}"#).await;
        let signaling = HttpSignaling::new(url).unwrap();

        let result = signaling.exchange(&SessionDescription::offer("v=0")).await;
        assert!(matches!(result, Err(SessionError::SignalingStatus(500))));
    }

    #[tokio::test]
    async fn malformed_body_fails() {
        let (url, _) = serve(StatusCode::OK, r#"{"sdp":"v=0"}"#).await;
        let signaling = HttpSignaling::new(url).unwrap();

        let result = signaling.exchange(&SessionDescription::offer("v=0")).await;
        assert!(matches!(result, Err(SessionError::MalformedAnswer(_))));
    }

    #[tokio::test]
    async fn unreachable_endpoint_fails() {
        // Bind then drop to get a port nothing listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let signaling = HttpSignaling::with_timeout(
            format!("http://{addr}/webrtc/offer"),
            Some(Duration::from_secs(2)),
        )
        .unwrap();

        let result = signaling.exchange(&SessionDescription::offer("v=0")).await;
        assert!(matches!(result, Err(SessionError::Signaling(_))));
    }
}
