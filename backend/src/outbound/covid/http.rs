//! Transport helpers shared by the provider adapters.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;

use crate::domain::ports::MetricSourceError;
use crate::outbound::body_preview;

/// Build a client with an explicit whole-request timeout.
///
/// # Errors
///
/// Returns an error when the reqwest client cannot be constructed.
pub(super) fn build_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("corona-backend/", env!("CARGO_PKG_VERSION")))
        .build()
}

/// Append path segments to `base`, percent-encoding each one.
pub(super) fn endpoint(base: &Url, segments: &[&str]) -> Result<Url, MetricSourceError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| MetricSourceError::transport(format!("{base} cannot be a base url")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// GET `url` and decode a JSON body.
///
/// A `404` is reported as `Ok(None)` so adapters can translate it into a
/// country lookup miss.
pub(super) async fn get_json<T>(client: &Client, url: Url) -> Result<Option<T>, MetricSourceError>
where
    T: DeserializeOwned,
{
    let response = client
        .get(url)
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await
        .map_err(map_transport_error)?;

    let status = response.status();
    let body = response.bytes().await.map_err(map_transport_error)?;
    if status == StatusCode::NOT_FOUND {
        return Ok(None);
    }
    if !status.is_success() {
        return Err(map_status_error(status, body.as_ref()));
    }

    serde_json::from_slice(body.as_ref())
        .map(Some)
        .map_err(|err| MetricSourceError::decode(format!("invalid JSON payload: {err}")))
}

pub(super) fn map_transport_error(error: reqwest::Error) -> MetricSourceError {
    if error.is_timeout() {
        MetricSourceError::timeout(error.to_string())
    } else {
        MetricSourceError::transport(error.to_string())
    }
}

pub(super) fn map_status_error(status: StatusCode, body: &[u8]) -> MetricSourceError {
    let preview = body_preview(body);
    let message = if preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {preview}", status.as_u16())
    };

    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            MetricSourceError::timeout(message)
        }
        _ => MetricSourceError::transport(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn base(raw: &str) -> Url {
        Url::parse(raw).expect("valid url")
    }

    #[rstest]
    #[case("https://restcountries.eu/rest/v2/name/", &["Norway"], "https://restcountries.eu/rest/v2/name/Norway")]
    #[case("https://restcountries.eu/rest/v2/name", &["United States"], "https://restcountries.eu/rest/v2/name/United%20States")]
    #[case("https://tracker.invalid/actions/", &["NOR", "2021-03-01"], "https://tracker.invalid/actions/NOR/2021-03-01")]
    #[case("https://restcountries.eu/name/", &["a/b"], "https://restcountries.eu/name/a%2Fb")]
    fn endpoint_appends_encoded_segments(
        #[case] raw: &str,
        #[case] segments: &[&str],
        #[case] expected: &str,
    ) {
        let url = endpoint(&base(raw), segments).expect("endpoint");
        assert_eq!(url.as_str(), expected);
    }

    #[rstest]
    fn endpoint_rejects_opaque_base() {
        let err = endpoint(&base("mailto:ops@example.invalid"), &["x"]).expect_err("opaque");
        assert!(matches!(err, MetricSourceError::Transport { .. }));
    }

    #[rstest]
    #[case(StatusCode::GATEWAY_TIMEOUT, true)]
    #[case(StatusCode::REQUEST_TIMEOUT, true)]
    #[case(StatusCode::INTERNAL_SERVER_ERROR, false)]
    #[case(StatusCode::BAD_REQUEST, false)]
    fn status_errors_classify_timeouts(#[case] status: StatusCode, #[case] timeout: bool) {
        let err = map_status_error(status, b"  upstream \n busy ");
        assert_eq!(matches!(err, MetricSourceError::Timeout { .. }), timeout);
        assert!(err.to_string().contains("upstream busy"));
    }
}
