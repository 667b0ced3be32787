// GitLab API HTTP client.
// Handles authentication, timeouts, and response status mapping.

use reqwest::{
    Client, RequestBuilder, Response, StatusCode,
    header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT},
};

use crate::config::Config;
use crate::error::{GlError, Result};

const TOKEN_HEADER: &str = "PRIVATE-TOKEN";

/// GitLab REST client bound to one instance.
pub struct GitLabClient {
    client: Client,
    api_url: String,
}

impl GitLabClient {
    /// Create a client for the instance and token in `config`.
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();

        let mut token = HeaderValue::from_str(&config.token)
            .map_err(|e| GlError::InvalidToken(e.to_string()))?;
        token.set_sensitive(true);
        headers.insert(TOKEN_HEADER, token);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("glpipes-tui"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .build()
            .map_err(GlError::Api)?;

        Ok(Self {
            client,
            api_url: config.api_url(),
        })
    }

    /// Make a GET request to the GitLab API.
    pub async fn get(&self, endpoint: &str) -> Result<Response> {
        let request = self.client.get(self.url(endpoint));
        self.send(request).await
    }

    /// Make a GET request with query parameters.
    pub async fn get_with_params<T: serde::Serialize + ?Sized>(
        &self,
        endpoint: &str,
        params: &T,
    ) -> Result<Response> {
        let request = self.client.get(self.url(endpoint)).query(params);
        self.send(request).await
    }

    /// Make a POST request without a body.
    pub async fn post(&self, endpoint: &str) -> Result<Response> {
        let request = self.client.post(self.url(endpoint));
        self.send(request).await
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.api_url, endpoint)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.map_err(map_transport_error)?;
        check_response(response).await
    }
}

/// Map reqwest failures, singling out timeouts.
pub(crate) fn map_transport_error(error: reqwest::Error) -> GlError {
    if error.is_timeout() {
        GlError::Timeout
    } else {
        GlError::Api(error)
    }
}

/// Check response status and convert errors.
async fn check_response(response: Response) -> Result<Response> {
    match response.status() {
        StatusCode::OK | StatusCode::CREATED | StatusCode::ACCEPTED => Ok(response),
        StatusCode::UNAUTHORIZED => Err(GlError::Unauthorized),
        StatusCode::NOT_FOUND => {
            let url = response.url().to_string();
            Err(GlError::NotFound(url))
        }
        status => Err(GlError::Http {
            status: status.as_u16(),
            message: response.text().await.unwrap_or_default(),
        }),
    }
}
