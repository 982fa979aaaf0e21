//! Reqwest-backed notification dispatcher.
//!
//! Posts the subscription document once per fire. There is no retry; the
//! scheduler logs failures and moves on.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::debug;

use crate::domain::SubscriptionDocument;
use crate::domain::ports::{NotificationDispatchError, NotificationDispatcher};
use crate::outbound::body_preview;

/// Dispatcher POSTing JSON documents to subscriber callback URLs.
#[derive(Clone)]
pub struct HttpNotificationDispatcher {
    client: Client,
}

impl HttpNotificationDispatcher {
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("corona-backend-webhook/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

fn callback_url(raw: &str) -> Result<Url, NotificationDispatchError> {
    let url =
        Url::parse(raw).map_err(|err| NotificationDispatchError::invalid_url(err.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(NotificationDispatchError::invalid_url(format!(
            "unsupported scheme '{other}'"
        ))),
    }
}

fn map_transport_error(error: reqwest::Error) -> NotificationDispatchError {
    if error.is_timeout() {
        NotificationDispatchError::timeout(error.to_string())
    } else {
        NotificationDispatchError::transport(error.to_string())
    }
}

#[async_trait]
impl NotificationDispatcher for HttpNotificationDispatcher {
    async fn dispatch(
        &self,
        document: &SubscriptionDocument,
    ) -> Result<(), NotificationDispatchError> {
        let url = callback_url(&document.url)?;
        let response = self
            .client
            .post(url)
            .json(document)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| NotificationDispatchError::body(err.to_string()))?;
        if !status.is_success() {
            return Err(NotificationDispatchError::status(
                status.as_u16(),
                body_preview(body.as_ref()),
            ));
        }

        debug!(
            subscription_id = %document.id,
            status = status.as_u16(),
            "notification delivered"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use serde_json::Value;

    use crate::domain::{MonitoredField, NotificationTrigger, SubscriptionId};

    /// Captured request: head lines and decoded JSON body.
    struct CapturedRequest {
        head: String,
        body: Value,
    }

    /// Accept one connection, answer with `status_line`, and return the request.
    fn serve_once(status_line: &'static str) -> (String, JoinHandle<CapturedRequest>) {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind callback listener");
        let addr = listener.local_addr().expect("listener address");
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept callback");
            let mut raw = Vec::new();
            let mut chunk = [0_u8; 1024];
            let (head, body_start, content_length) = loop {
                let read = stream.read(&mut chunk).expect("read request");
                assert!(read > 0, "connection closed before headers");
                raw.extend_from_slice(&chunk[..read]);
                if let Some(pos) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
                    let head = String::from_utf8_lossy(&raw[..pos]).into_owned();
                    let length = head
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    break (head, pos + 4, length);
                }
            };
            while raw.len() < body_start + content_length {
                let read = stream.read(&mut chunk).expect("read body");
                assert!(read > 0, "connection closed before body");
                raw.extend_from_slice(&chunk[..read]);
            }
            let body = serde_json::from_slice(&raw[body_start..body_start + content_length])
                .expect("json body");
            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-length: 2\r\nconnection: close\r\n\r\nok"
            );
            stream
                .write_all(response.as_bytes())
                .expect("write response");
            CapturedRequest { head, body }
        });
        (format!("http://{addr}/hook"), handle)
    }

    fn document(url: String) -> SubscriptionDocument {
        SubscriptionDocument {
            id: SubscriptionId::random(),
            url,
            timeout: 10.0,
            time: Utc
                .with_ymd_and_hms(2021, 3, 1, 12, 11, 0)
                .single()
                .expect("valid time"),
            field: MonitoredField::Confirmed,
            country: "Norway".to_owned(),
            trigger: NotificationTrigger::OnTimeout,
            occurrences: 100.0,
        }
    }

    fn dispatcher() -> HttpNotificationDispatcher {
        HttpNotificationDispatcher::new(Duration::from_secs(5)).expect("client builds")
    }

    #[tokio::test]
    async fn posts_document_as_json() {
        let (url, server) = serve_once("200 OK");
        let document = document(url);

        dispatcher()
            .dispatch(&document)
            .await
            .expect("delivery succeeds");

        let captured = server.join().expect("callback server");
        let request_line = captured.head.lines().next().unwrap_or_default();
        assert_eq!(request_line, "POST /hook HTTP/1.1");
        assert!(
            captured
                .head
                .lines()
                .any(|line| line.eq_ignore_ascii_case("content-type: application/json")),
            "missing json content type in {}",
            captured.head
        );
        assert_eq!(captured.body["occurrences"], 100.0);
        assert_eq!(captured.body["time"], "2021-03-01T12:11:00Z");
        assert_eq!(captured.body["trigger"], "ON_TIMEOUT");
        assert_eq!(captured.body["id"], document.id.to_string());
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let (url, server) = serve_once("500 Internal Server Error");

        let err = dispatcher()
            .dispatch(&document(url))
            .await
            .expect_err("500 must fail");

        server.join().expect("callback server");
        assert!(
            matches!(err, NotificationDispatchError::Status { status: 500, .. }),
            "unexpected error {err:?}"
        );
    }

    #[rstest]
    #[case("https://hooks.example.invalid/covid")]
    #[case("http://127.0.0.1:8080/hook?token=abc")]
    fn accepts_http_callbacks(#[case] raw: &str) {
        assert!(callback_url(raw).is_ok());
    }

    #[rstest]
    #[case("not a url")]
    #[case("ftp://files.example.invalid/drop")]
    #[case("")]
    fn rejects_unusable_callbacks(#[case] raw: &str) {
        let err = callback_url(raw).expect_err("rejected");
        assert!(matches!(err, NotificationDispatchError::InvalidUrl { .. }));
    }
}
