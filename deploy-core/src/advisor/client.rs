use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use crate::{
    AdvisoryError, AdvisoryResult, RequestParameters,
    error::ErrorEnvelope,
};

use super::Advisor;

pub const DEFAULT_ENDPOINT: &str = "https://shouldideploy.today/api";

/// HTTP client for the shouldideploy.today API.
#[derive(Debug, Clone)]
pub struct AdvisoryClient {
    endpoint: String,
    http: Client,
}

impl Default for AdvisoryClient {
    fn default() -> Self {
        Self::new(DEFAULT_ENDPOINT)
    }
}

impl AdvisoryClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http: Client::new(),
        }
    }

    /// Query string values are appended as given; the service expects raw
    /// timezone names like `America/New_York`.
    pub fn request_url(&self, params: &RequestParameters) -> String {
        let mut url = format!("{}?tz={}", self.endpoint, params.timezone);

        if let Some(date) = params.date.as_deref().filter(|d| !d.is_empty()) {
            url.push_str("&date=");
            url.push_str(date);
        }

        url
    }

    pub async fn fetch(&self, params: &RequestParameters) -> Result<AdvisoryResult, AdvisoryError> {
        let url = self.request_url(params);
        debug!(%url, "requesting advisory");

        let res = self
            .http
            .get(url.as_str())
            .send()
            .await
            .map_err(|err| {
                warn!(error = %err, "advisory request failed");
                AdvisoryError::Transport(err)
            })?;

        let status = res.status();
        debug!(status = status.as_u16(), "advisory response received");

        let body = res.text().await.map_err(AdvisoryError::BodyRead)?;

        classify(status, &body)
    }
}

fn classify(status: StatusCode, body: &str) -> Result<AdvisoryResult, AdvisoryError> {
    if status.is_client_error()
        && let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(body)
    {
        warn!(status = status.as_u16(), "advisory service reported an error");
        return Err(envelope.into());
    }

    if status.as_u16() > 299 {
        warn!(status = status.as_u16(), "advisory service returned an unexpected status");
        return Err(AdvisoryError::Unstructured {
            status: status.as_u16(),
            body: body.to_string(),
        });
    }

    serde_json::from_str(body).map_err(AdvisoryError::MalformedResponse)
}

#[async_trait]
impl Advisor for AdvisoryClient {
    async fn advise(&self, params: &RequestParameters) -> Result<AdvisoryResult, AdvisoryError> {
        self.fetch(params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path, query_param},
    };

    fn client_for(server: &MockServer) -> AdvisoryClient {
        AdvisoryClient::new(format!("{}/api", server.uri()))
    }

    #[test]
    fn url_omits_empty_date() {
        let client = AdvisoryClient::default();

        let url = client.request_url(&RequestParameters::new("UTC", None));
        assert_eq!(url, "https://shouldideploy.today/api?tz=UTC");

        let url = client.request_url(&RequestParameters {
            timezone: "UTC".into(),
            date: Some(String::new()),
        });
        assert!(!url.contains("date"));
    }

    #[test]
    fn url_keeps_values_verbatim() {
        let client = AdvisoryClient::default();
        let params =
            RequestParameters::new("America/New_York", Some("2024-12-24T10:00:00+01:00".into()));

        assert_eq!(
            client.request_url(&params),
            "https://shouldideploy.today/api?tz=America/New_York&date=2024-12-24T10:00:00+01:00"
        );
    }

    #[tokio::test]
    async fn success_body_becomes_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api"))
            .and(query_param("tz", "UTC"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"Message":"Ship it","Shouldideploy":true}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let result = client_for(&server)
            .fetch(&RequestParameters::new("UTC", None))
            .await
            .expect("fetch should succeed");

        assert_eq!(result.message, "Ship it");
        assert!(result.should_deploy);
    }

    #[tokio::test]
    async fn date_is_forwarded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api"))
            .and(query_param("tz", "Europe/Paris"))
            .and(query_param("date", "2024-12-24"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"Timezone":"Europe/Paris","Date":"2024-12-24","Message":"Nope","Shouldideploy":false}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let result = client_for(&server)
            .fetch(&RequestParameters::new("Europe/Paris", Some("2024-12-24".into())))
            .await
            .expect("fetch should succeed");

        assert_eq!(result.timezone, "Europe/Paris");
        assert_eq!(result.date, "2024-12-24");
        assert!(!result.should_deploy);
    }

    #[tokio::test]
    async fn client_error_with_envelope_is_structured() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_string(
                r#"{"Error":{"Message":"bad tz","Code":4001,"Type":"validation"}}"#,
            ))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch(&RequestParameters::new("Mars/Olympus", None))
            .await
            .unwrap_err();

        match &err {
            AdvisoryError::Structured { message, code, kind } => {
                assert_eq!(message, "bad tz");
                assert_eq!(*code, 4001);
                assert_eq!(kind, "validation");
            }
            other => panic!("expected structured error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn client_error_without_envelope_is_unstructured() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch(&RequestParameters::new("UTC", None))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AdvisoryError::Unstructured { status: 404, ref body } if body == "not here"
        ));
    }

    #[tokio::test]
    async fn server_error_is_unstructured() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch(&RequestParameters::new("UTC", None))
            .await
            .unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("500"));
        assert!(msg.contains("<html>oops</html>"));
    }

    #[tokio::test]
    async fn non_json_success_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("maybe?"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .fetch(&RequestParameters::new("UTC", None))
            .await
            .unwrap_err();

        assert!(matches!(err, AdvisoryError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn refused_connection_is_transport() {
        let client = AdvisoryClient::new("http://127.0.0.1:1/api");

        let err = client
            .fetch(&RequestParameters::new("UTC", None))
            .await
            .unwrap_err();

        assert!(
            matches!(err, AdvisoryError::Transport(_)),
            "expected transport error, got {err:?}"
        );
    }
}
