use reqwest::{Client, Error as ReqwestError};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use url::Url;

/// JSON client for the backend service.
#[derive(Debug, Clone)]
pub struct Relay {
    client: Client,
    base_url: Url,
}

/// Errors for relay requests.
#[derive(Error, Debug)]
pub enum RelayError {
    /// The request failed.
    #[error(transparent)]
    RequestError(#[from] ReqwestError),
    #[error(transparent)]
    InvalidUrl(#[from] url::ParseError),
    /// The request parameters were invalid.
    #[error("Client error: {text}")]
    ClientError { text: String },
    /// The response could not be deserialized.
    #[error("Deserialization error: {err}. Response: {text}")]
    ResponseSerdeJson {
        err: serde_json::Error,
        text: String,
    },
}

impl Relay {
    pub fn new(base_url: &str) -> Result<Self, RelayError> {
        // Url::join drops the last path segment unless it ends with '/'
        let base_url = if base_url.ends_with('/') {
            Url::parse(base_url)?
        } else {
            Url::parse(&format!("{}/", base_url))?
        };
        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn endpoint(&self, path: &str) -> Result<Url, RelayError> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// POST `body` as JSON to `path` and decode the JSON answer.
    pub async fn post<T: Serialize + Send + Sync, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<R, RelayError> {
        let res = self.client.post(self.endpoint(path)?).json(body).send().await?;

        if res.status().is_client_error() {
            let text = res.text().await?;
            return Err(RelayError::ClientError { text });
        }
        // server errors (500-599) surface as the request error
        let res = res.error_for_status()?;
        let text = res.text().await?;
        serde_json::from_str(&text).map_err(|err| RelayError::ResponseSerdeJson { err, text })
    }
}
