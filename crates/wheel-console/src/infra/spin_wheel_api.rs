use hyper::header::{AUTHORIZATION, CONTENT_TYPE};
use log::{debug, error};
use reqwest_middleware::{
    self,
    reqwest::{Method, StatusCode, Url},
    ClientWithMiddleware,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;
use wheel_core::{
    CoreError, Envelope, SpinRecord, Wheel, WheelPayload, WheelUpdate, WonSection,
    GENERIC_FAILURE,
};

#[derive(Error, Debug)]
pub enum Error {
    #[error("item not found: {0}")]
    NotFound(String),
    #[error("problem sending request to backend: {0}")]
    Send(#[from] reqwest_middleware::reqwest::Error),
    #[error("problem sending request to backend: {0}")]
    SendMiddleware(#[from] reqwest_middleware::Error),
    #[error("problem requesting backend: {0}")]
    Request(String),
    /// The backend answered but refused, `status` was not true
    #[error("{0}")]
    Rejected(String),
    #[error("unexpected response from backend: {0}")]
    Decode(#[from] CoreError),
}

impl Error {
    /// Text safe to put in front of an operator
    pub fn user_message(&self) -> String {
        match self {
            Error::Rejected(message) | Error::NotFound(message) => message.clone(),
            _ => GENERIC_FAILURE.to_string(),
        }
    }
}

/// Spin wheel endpoints of the external commerce backend
#[async_trait::async_trait]
pub trait SpinWheelApi: Send + Sync {
    async fn list_wheels(&self) -> Result<Vec<Wheel>, Error>;
    async fn get_wheel(&self, id: &str) -> Result<Wheel, Error>;
    /// The backend may omit the created wheel from its answer
    async fn create_wheel(&self, payload: WheelPayload) -> Result<Option<Wheel>, Error>;
    async fn update_wheel(&self, id: &str, update: WheelUpdate) -> Result<Option<Wheel>, Error>;
    async fn delete_wheel(&self, id: &str) -> Result<(), Error>;
    /// Ask the backend to draw a section, staking `tokens_to_use`
    async fn spin(&self, id: &str, tokens_to_use: u32) -> Result<WonSection, Error>;
    async fn list_spin_records(&self) -> Result<Vec<SpinRecord>, Error>;
}

#[derive(Clone)]
pub struct SpinWheelClient {
    pub base_url: Url,
    pub client: ClientWithMiddleware,
    api_token: Option<String>,
}

impl SpinWheelClient {
    pub fn new(
        client: ClientWithMiddleware,
        base_url: &Url,
        api_token: Option<String>,
    ) -> Self {
        // without the trailing slash Url::join would drop the last segment
        let mut base_url = base_url.to_owned();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Self {
            base_url,
            client,
            api_token: api_token.filter(|token| !token.trim().is_empty()),
        }
    }

    fn url(&self, path: &str) -> Result<Url, Error> {
        self.base_url
            .join(path)
            .map_err(|e| Error::Request(e.to_string()))
    }

    /// Send a request and hand back the raw envelope body.
    ///
    /// Failing statuses still carry an envelope most of the time, so the
    /// body is decoded before giving up on the server's message.
    async fn send_request<B: Serialize>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
        not_found_message: String,
    ) -> Result<Value, Error> {
        let mut request = self.client.request(method, url);
        if let Some(token) = &self.api_token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        if let Some(body) = body {
            let body = serde_json::to_vec(body)
                .map_err(|e| Error::Request(format!("Failed to serialize body: {}", e)))?;
            request = request
                .header(CONTENT_TYPE, "application/json")
                .body(body);
        }

        let response = request.send().await.map_err(|e| {
            error!("error sending to backend: {}", e);
            Error::SendMiddleware(e)
        })?;

        let status = response.status();
        let text = response.text().await?;
        let body: Option<Value> = serde_json::from_str(&text).ok();
        debug!("backend answered {} with {} bytes", status, text.len());

        if status.is_success() {
            return body.ok_or_else(|| {
                Error::Request(format!("response body was not json: {:?}", text))
            });
        }

        let server_message = body
            .as_ref()
            .and_then(|b| b.get("message"))
            .and_then(Value::as_str)
            .filter(|m| !m.trim().is_empty())
            .map(String::from);

        match (status, server_message) {
            (_, Some(message)) => Err(Error::Rejected(message)),
            (StatusCode::NOT_FOUND, None) => Err(Error::NotFound(not_found_message)),
            (status, None) => Err(Error::Request(format!(
                "error response from backend with status {}: {:?}",
                status, text
            ))),
        }
    }

    async fn send_enveloped<T, B>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
        failure: &str,
    ) -> Result<Option<T>, Error>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let body = self
            .send_request(method, url, body, failure.to_string())
            .await?;
        unwrap_envelope(body, failure)
    }
}

/// The single place backend envelopes are interpreted.
///
/// `status` and `message` are read before `data` is decoded, a failure
/// envelope carrying an odd `data` still surfaces the server's message.
pub fn unwrap_envelope<T: DeserializeOwned>(body: Value, failure: &str) -> Result<Option<T>, Error> {
    let envelope: Envelope<Value> = serde_json::from_value(body).map_err(CoreError::from)?;
    match envelope.into_data(failure).map_err(Error::Rejected)? {
        None | Some(Value::Null) => Ok(None),
        Some(data) => Ok(Some(
            serde_json::from_value(data).map_err(CoreError::from)?,
        )),
    }
}

#[async_trait::async_trait]
impl SpinWheelApi for SpinWheelClient {
    async fn list_wheels(&self) -> Result<Vec<Wheel>, Error> {
        let url = self.url("spin-wheel")?;
        let wheels = self
            .send_enveloped::<Vec<Wheel>, ()>(Method::GET, url, None, "Failed to fetch spin wheels")
            .await?;
        Ok(wheels.unwrap_or_default())
    }

    async fn get_wheel(&self, id: &str) -> Result<Wheel, Error> {
        let url = self.url(&format!("spin-wheel/{}", id))?;
        self.send_enveloped::<Wheel, ()>(Method::GET, url, None, "Failed to fetch spin wheel")
            .await?
            .ok_or_else(|| Error::NotFound(format!("spin wheel {} not found", id)))
    }

    async fn create_wheel(&self, payload: WheelPayload) -> Result<Option<Wheel>, Error> {
        let url = self.url("spin-wheel")?;
        self.send_enveloped(Method::POST, url, Some(&payload), "Failed to create wheel")
            .await
    }

    async fn update_wheel(&self, id: &str, update: WheelUpdate) -> Result<Option<Wheel>, Error> {
        let url = self.url(&format!("spin-wheel/{}", id))?;
        self.send_enveloped(Method::PUT, url, Some(&update), "Failed to update wheel")
            .await
    }

    async fn delete_wheel(&self, id: &str) -> Result<(), Error> {
        let url = self.url(&format!("spin-wheel/{}", id))?;
        self.send_enveloped::<Value, ()>(Method::DELETE, url, None, "Failed to delete wheel")
            .await?;
        Ok(())
    }

    async fn spin(&self, id: &str, tokens_to_use: u32) -> Result<WonSection, Error> {
        let mut url = self.url(&format!("spin-wheel/{}", id))?;
        url.query_pairs_mut()
            .append_pair("tokensToUse", &tokens_to_use.to_string());

        let body = self
            .send_request::<()>(Method::GET, url, None, format!("spin wheel {} not found", id))
            .await?;
        // status is checked before the section is dug out of the body
        unwrap_envelope::<Value>(body.clone(), "Failed to spin the wheel")?;
        Ok(WonSection::from_spin_body(&body)?)
    }

    async fn list_spin_records(&self) -> Result<Vec<SpinRecord>, Error> {
        let url = self.url("spin-wheel/records")?;
        let records = self
            .send_enveloped::<Vec<SpinRecord>, ()>(
                Method::GET,
                url,
                None,
                "Failed to fetch spin records",
            )
            .await?;
        Ok(records.unwrap_or_default())
    }
}
