//! Open Trivia Database adapter.

use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, instrument, warn};

use super::QuestionProvider;
use crate::error::ProviderError;
use crate::model::{Question, Settings};

pub const DEFAULT_BASE_URL: &str = "https://opentdb.com";
const API_PATH: &str = "/api.php";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Blocking HTTP client for the question bank's `api.php` endpoint.
#[derive(Debug, Clone)]
pub struct OpenTdbProvider {
    base_url: String,
    client: reqwest::blocking::Client,
}

#[derive(Deserialize)]
struct BankResponse {
    response_code: u8,
    #[serde(default)]
    results: Vec<Question>,
}

impl OpenTdbProvider {
    pub fn new(base_url: &str) -> Result<Self, ProviderError> {
        let base = if base_url.trim().is_empty() {
            DEFAULT_BASE_URL
        } else {
            base_url.trim_end_matches('/')
        };

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        Ok(Self {
            base_url: base.to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Query pairs for a request; only multiple-choice questions are asked for
    pub fn query(settings: &Settings) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("amount", settings.amount.to_string()),
            ("type", "multiple".to_string()),
        ];
        if let Some(category) = &settings.category {
            query.push(("category", category.clone()));
        }
        if let Some(difficulty) = settings.difficulty {
            query.push(("difficulty", difficulty.to_string()));
        }
        query
    }
}

/// Meaning of the bank's non-zero response codes
pub fn response_code_reason(code: u8) -> &'static str {
    match code {
        1 => "no results for the requested settings",
        2 => "invalid parameter",
        3 => "session token not found",
        4 => "session token exhausted",
        5 => "rate limited",
        _ => "unknown response code",
    }
}

impl QuestionProvider for OpenTdbProvider {
    fn name(&self) -> &str {
        "opentdb"
    }

    #[instrument(skip(self), fields(amount = settings.amount))]
    fn fetch(&self, settings: &Settings) -> Result<Vec<Question>, ProviderError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, API_PATH))
            .query(&Self::query(settings))
            .send()
            .map_err(|e| {
                warn!(error = %e, "question request failed");
                if e.is_timeout() {
                    ProviderError::Transport(format!(
                        "request timed out after {DEFAULT_TIMEOUT_SECS}s"
                    ))
                } else {
                    ProviderError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "question bank returned HTTP error");
            return Err(ProviderError::Http {
                status: status.as_u16(),
            });
        }

        let body: BankResponse = response
            .json()
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        if body.response_code != 0 {
            warn!(code = body.response_code, "question bank refused request");
            return Err(ProviderError::ResponseCode {
                code: body.response_code,
                reason: response_code_reason(body.response_code),
            });
        }

        debug!(count = body.results.len(), "fetched questions");
        Ok(body.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Difficulty;
    use assert_matches::assert_matches;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn fetch_blocking(
        uri: String,
        settings: Settings,
    ) -> Result<Vec<Question>, ProviderError> {
        tokio::task::spawn_blocking(move || {
            let provider = OpenTdbProvider::new(&uri).unwrap();
            provider.fetch(&settings)
        })
        .await
        .unwrap()
    }

    #[test]
    fn test_query_omits_any_values() {
        let q = OpenTdbProvider::query(&Settings::default());
        assert_eq!(
            q,
            vec![
                ("amount", "10".to_string()),
                ("type", "multiple".to_string())
            ]
        );
    }

    #[test]
    fn test_query_includes_category_and_difficulty() {
        let s = Settings::new(Some("18".into()), Some(Difficulty::Hard), 5);
        let q = OpenTdbProvider::query(&s);
        assert!(q.contains(&("category", "18".to_string())));
        assert!(q.contains(&("difficulty", "hard".to_string())));
    }

    #[test]
    fn test_base_url_defaults_and_trims() {
        let p = OpenTdbProvider::new("").unwrap();
        assert_eq!(p.base_url(), DEFAULT_BASE_URL);
        let p = OpenTdbProvider::new("http://localhost:9000/").unwrap();
        assert_eq!(p.base_url(), "http://localhost:9000");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn successful_fetch() {
        let server = MockServer::start().await;

        let body = serde_json::json!({
            "response_code": 0,
            "results": [
                {
                    "type": "multiple",
                    "difficulty": "easy",
                    "category": "General Knowledge",
                    "question": "What is &quot;H2O&quot;?",
                    "correct_answer": "Water",
                    "incorrect_answers": ["Fire", "Earth", "Air"]
                },
                {
                    "type": "multiple",
                    "difficulty": "easy",
                    "category": "General Knowledge",
                    "question": "2 + 2?",
                    "correct_answer": "4",
                    "incorrect_answers": ["3", "5", "22"]
                }
            ]
        });

        Mock::given(method("GET"))
            .and(path("/api.php"))
            .and(query_param("amount", "2"))
            .and(query_param("type", "multiple"))
            .respond_with(ResponseTemplate::new(200).set_body_json(&body))
            .mount(&server)
            .await;

        let questions = fetch_blocking(server.uri(), Settings::from_form("", "", "2"))
            .await
            .unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[0].text, "What is &quot;H2O&quot;?");
        assert_eq!(questions[1].incorrect_answers, vec!["3", "5", "22"]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn non_zero_response_code_is_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api.php"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"response_code": 1, "results": []})),
            )
            .mount(&server)
            .await;

        let err = fetch_blocking(server.uri(), Settings::default())
            .await
            .unwrap_err();
        assert_matches!(err, ProviderError::ResponseCode { code: 1, .. });
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn http_error_status_is_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api.php"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = fetch_blocking(server.uri(), Settings::default())
            .await
            .unwrap_err();
        assert_matches!(err, ProviderError::Http { status: 503 });
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn malformed_body_is_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api.php"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = fetch_blocking(server.uri(), Settings::default())
            .await
            .unwrap_err();
        assert_matches!(err, ProviderError::Decode(_));
    }

    #[test]
    fn unreachable_host_is_transport_error() {
        // port 9 (discard) on localhost is expected to refuse connections
        let provider = OpenTdbProvider::new("http://127.0.0.1:9").unwrap();
        let err = provider.fetch(&Settings::default()).unwrap_err();
        assert_matches!(err, ProviderError::Transport(_));
    }
}
