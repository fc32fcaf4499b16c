//! ip-api.com Geolocation Provider
//!
//! Implements GeoProvider against an ip-api.com compatible JSON endpoint
//! (`GET {base_url}/{ip}`).

use crate::domain::entities::IpLocation;
use crate::domain::errors::ProviderError;
use crate::domain::ports::GeoProvider;
use async_trait::async_trait;
use serde::Deserialize;

/// Default public endpoint.
pub const DEFAULT_IP_API_URL: &str = "http://ip-api.com/json";

const RESPONSE_FIELDS: &str = "status,message,country,city,query";

/// ip-api.com response body.
///
/// Failed lookups still answer 200 with `"status": "fail"`.
#[derive(Debug, Deserialize)]
struct IpApiResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    country: String,
    #[serde(default)]
    city: String,
}

/// Geolocation provider backed by the ip-api.com HTTP API.
pub struct IpApiGeoProvider {
    client: reqwest::Client,
    base_url: String,
}

impl IpApiGeoProvider {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Append `ip` to the base URL as a single, escaped path segment.
    fn lookup_url(&self, ip: &str) -> Result<reqwest::Url, ProviderError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| ProviderError::Unavailable(format!("invalid base url: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| ProviderError::Unavailable("base url cannot carry a path".to_string()))?
            .pop_if_empty()
            .push(ip);
        Ok(url)
    }

    /// Decode a 2xx response body into a location for `ip`.
    fn parse_body(ip: &str, body: &str) -> Result<IpLocation, ProviderError> {
        let data: IpApiResponse =
            serde_json::from_str(body).map_err(|e| ProviderError::Malformed(e.to_string()))?;

        if data.status.as_deref() == Some("fail") {
            let reason = data.message.unwrap_or_else(|| "unknown reason".to_string());
            return Err(ProviderError::Rejected(reason));
        }

        Ok(IpLocation::new(ip, data.country, data.city))
    }
}

#[async_trait]
impl GeoProvider for IpApiGeoProvider {
    async fn fetch(&self, ip: &str) -> Result<IpLocation, ProviderError> {
        let url = self.lookup_url(ip)?;
        tracing::debug!("requesting location from {}", url);

        let response = self
            .client
            .get(url)
            .query(&[("fields", RESPONSE_FIELDS)])
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::Unavailable(format!(
                "unexpected status {status}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        Self::parse_body(ip, &body)
    }

    fn name(&self) -> &'static str {
        "ip-api"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(server: &MockServer) -> IpApiGeoProvider {
        IpApiGeoProvider::new(reqwest::Client::new(), format!("{}/json", server.uri()))
    }

    #[test]
    fn test_lookup_url_strips_trailing_slash() {
        let p = IpApiGeoProvider::new(reqwest::Client::new(), "http://ip-api.com/json/");
        assert_eq!(
            p.lookup_url("8.8.8.8").unwrap().as_str(),
            "http://ip-api.com/json/8.8.8.8"
        );
    }

    #[test]
    fn test_lookup_url_escapes_ip_as_one_segment() {
        let p = IpApiGeoProvider::new(reqwest::Client::new(), "http://ip-api.com/json");

        let traversal = p.lookup_url("../admin").unwrap();
        assert_eq!(traversal.path(), "/json/..%2Fadmin");

        let fragment = p.lookup_url("8.8.8.8#junk").unwrap();
        assert_eq!(fragment.path(), "/json/8.8.8.8%23junk");
        assert_eq!(fragment.fragment(), None);
    }

    #[test]
    fn test_lookup_url_invalid_base() {
        let p = IpApiGeoProvider::new(reqwest::Client::new(), "not a url");
        assert!(matches!(
            p.lookup_url("8.8.8.8").unwrap_err(),
            ProviderError::Unavailable(_)
        ));
    }

    #[test]
    fn test_parse_body_success() {
        let body = r#"{"status":"success","country":"United States","city":"Ashburn","query":"8.8.8.8"}"#;
        let loc = IpApiGeoProvider::parse_body("8.8.8.8", body).unwrap();

        assert_eq!(loc, IpLocation::new("8.8.8.8", "United States", "Ashburn"));
    }

    #[test]
    fn test_parse_body_missing_fields_are_empty() {
        let loc = IpApiGeoProvider::parse_body("8.8.8.8", r#"{"status":"success"}"#).unwrap();
        assert!(loc.is_unresolved());
    }

    #[test]
    fn test_parse_body_fail_status() {
        let body = r#"{"status":"fail","message":"private range","query":"10.0.0.1"}"#;
        let err = IpApiGeoProvider::parse_body("10.0.0.1", body).unwrap_err();

        assert_eq!(err, ProviderError::Rejected("private range".to_string()));
    }

    #[test]
    fn test_parse_body_not_json() {
        let err = IpApiGeoProvider::parse_body("8.8.8.8", "<html>oops</html>").unwrap_err();
        assert!(matches!(err, ProviderError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/5.6.7.8"))
            .and(query_param("fields", RESPONSE_FIELDS))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "country": "A",
                "city": "B",
                "query": "5.6.7.8"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let loc = provider(&server).fetch("5.6.7.8").await.unwrap();

        assert_eq!(loc, IpLocation::new("5.6.7.8", "A", "B"));
    }

    #[tokio::test]
    async fn test_fetch_ipv6() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/2001:4860:4860::8888"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "success",
                "country": "United States",
                "city": "Mountain View"
            })))
            .mount(&server)
            .await;

        let loc = provider(&server).fetch("2001:4860:4860::8888").await.unwrap();

        assert_eq!(loc.ip, "2001:4860:4860::8888");
        assert_eq!(loc.city, "Mountain View");
    }

    #[tokio::test]
    async fn test_fetch_non_2xx_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/5.6.7.8"))
            .respond_with(ResponseTemplate::new(429).set_body_string("{\"not\": \"decoded\"}"))
            .expect(1)
            .mount(&server)
            .await;

        let err = provider(&server).fetch("5.6.7.8").await.unwrap_err();

        assert!(matches!(err, ProviderError::Unavailable(msg) if msg.contains("429")));
    }

    #[tokio::test]
    async fn test_fetch_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/5.6.7.8"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = provider(&server).fetch("5.6.7.8").await.unwrap_err();

        assert!(matches!(err, ProviderError::Malformed(_)));
    }

    #[tokio::test]
    async fn test_fetch_rejected_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/192.168.1.1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "fail",
                "message": "private range",
                "query": "192.168.1.1"
            })))
            .mount(&server)
            .await;

        let err = provider(&server).fetch("192.168.1.1").await.unwrap_err();

        assert_eq!(err, ProviderError::Rejected("private range".to_string()));
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        // Nothing listens on the discard port
        let p = IpApiGeoProvider::new(reqwest::Client::new(), "http://127.0.0.1:9/json");

        let err = p.fetch("5.6.7.8").await.unwrap_err();

        assert!(matches!(err, ProviderError::Unavailable(_)));
    }
}
