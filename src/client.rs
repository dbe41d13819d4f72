use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use serde::Deserialize;

use crate::client_logger::ClientLogger;
use crate::error::{Error, Result};
use crate::observability::{CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS};
use crate::sse::process_sse;
use crate::stream::{ChatBackend, ChatStream, ChunkStream};
use crate::types::{ChatCompletionRequest, ModelListResponse};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for OpenAI-compatible chat APIs.
///
/// Only the connection phase is bounded by a timeout; a streamed answer may
/// take as long as the model needs.
#[derive(Clone)]
pub struct OpenAi {
    api_key: String,
    client: ReqwestClient,
    base_url: String,
    logger: Option<Arc<dyn ClientLogger>>,
}

impl OpenAi {
    /// Create a new client for `base_url`.
    ///
    /// An empty `api_key` sends no `Authorization` header at all.
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        url::Url::parse(&base_url).map_err(|e| {
            Error::url(format!("Invalid base URL {base_url:?}: {e}"), Some(e))
        })?;

        let client = ReqwestClient::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| {
                Error::http_client(
                    format!("Failed to build HTTP client: {}", e),
                    Some(Box::new(e)),
                )
            })?;

        Ok(Self {
            api_key: api_key.into(),
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            logger: None,
        })
    }

    /// Set a logger to capture requests and streamed chunks.
    pub fn with_logger(mut self, logger: Arc<dyn ClientLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// The base URL requests are sent to, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// Create and return default headers for API requests.
    fn default_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        if !self.api_key.is_empty() {
            let bearer = HeaderValue::from_str(&format!("Bearer {}", self.api_key)).map_err(|_| {
                Error::validation(
                    "API key contains characters that cannot be sent in a header",
                    Some("apikey".to_string()),
                )
            })?;
            headers.insert(header::AUTHORIZATION, bearer);
        }
        Ok(headers)
    }

    /// Process API response errors and convert to our Error type
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();

        let request_id = response
            .headers()
            .get("x-request-id")
            .and_then(|val| val.to_str().ok())
            .map(String::from);

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|val| val.to_str().ok())
            .and_then(|val| val.parse::<u64>().ok());

        #[derive(Deserialize)]
        struct ErrorResponse {
            error: Option<ErrorDetail>,
        }

        #[derive(Deserialize)]
        struct ErrorDetail {
            #[serde(rename = "type")]
            error_type: Option<String>,
            message: Option<String>,
            param: Option<String>,
        }

        let error_body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::http_client(
                    format!("Failed to read error response: {}", e),
                    Some(Box::new(e)),
                );
            }
        };

        let detail = serde_json::from_str::<ErrorResponse>(&error_body)
            .ok()
            .and_then(|e| e.error);
        let (error_type, error_message, error_param) = match detail {
            Some(detail) => (
                detail.error_type,
                detail.message.unwrap_or_else(|| error_body.clone()),
                detail.param,
            ),
            None => (None, error_body, None),
        };

        match status_code {
            400 => Error::bad_request(error_message, error_param),
            401 => Error::authentication(error_message),
            403 => Error::permission(error_message),
            404 => Error::not_found(error_message),
            408 => Error::timeout(error_message, None),
            429 => Error::rate_limit(error_message, retry_after),
            500 => Error::internal_server(error_message, request_id),
            502..=504 => Error::service_unavailable(error_message, retry_after),
            _ => Error::api(status_code, error_type, error_message, request_id),
        }
    }

    fn send_error(e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::timeout(
                format!("Request timed out: {}", e),
                Some(CONNECT_TIMEOUT.as_secs_f64()),
            )
        } else if e.is_connect() {
            Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
        } else {
            Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
        }
    }

    async fn check(response: Response) -> Result<Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::process_error_response(response).await)
        }
    }

    /// Open a streaming chat completion.
    ///
    /// Returns once the server accepted the request; chunks are read from the
    /// returned stream.
    pub async fn stream_chat(&self, request: &ChatCompletionRequest) -> Result<ChatStream> {
        let mut request = request.clone();
        request.stream = true;
        if let Some(logger) = &self.logger {
            logger.log_request(&request);
        }

        let mut headers = self.default_headers()?;
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("text/event-stream"),
        );

        let start = Instant::now();
        CLIENT_REQUESTS.click();
        let response = self
            .client
            .post(self.endpoint("chat/completions"))
            .headers(headers)
            .json(&request)
            .send()
            .await
            .map_err(Self::send_error);
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());
        let response = match response {
            Ok(response) => Self::check(response).await,
            Err(err) => Err(err),
        }
        .inspect_err(|_| CLIENT_REQUEST_ERRORS.click())?;

        let chunks = process_sse(response.bytes_stream());
        Ok(ChatStream::new(chunks).with_logger(self.logger.clone()))
    }

    /// List the models the server offers.
    pub async fn list_models(&self) -> Result<ModelListResponse> {
        let start = Instant::now();
        CLIENT_REQUESTS.click();
        let result = self.fetch_models().await;
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());
        let models = result.inspect_err(|_| CLIENT_REQUEST_ERRORS.click())?;
        if let Some(logger) = &self.logger {
            logger.log_models(&models);
        }
        Ok(models)
    }

    async fn fetch_models(&self) -> Result<ModelListResponse> {
        let response = self
            .client
            .get(self.endpoint("models"))
            .headers(self.default_headers()?)
            .send()
            .await
            .map_err(Self::send_error)?;
        let response = Self::check(response).await?;

        response.json::<ModelListResponse>().await.map_err(|e| {
            Error::serialization(
                format!("Failed to parse response: {}", e),
                Some(Box::new(e)),
            )
        })
    }
}

impl fmt::Debug for OpenAi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAi")
            .field("base_url", &self.base_url)
            .field("has_api_key", &!self.api_key.is_empty())
            .field("has_logger", &self.logger.is_some())
            .finish()
    }
}

#[async_trait::async_trait]
impl ChatBackend for OpenAi {
    async fn open_stream(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<Box<dyn ChunkStream>> {
        Ok(Box::new(self.stream_chat(request).await?))
    }
}
