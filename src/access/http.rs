//! A [RemoteRecords] implementation that talks to the REST API over HTTP.

use reqwest::{
    Client, Method, RequestBuilder, Response,
    header::{COOKIE, HeaderValue, SET_COOKIE},
};
use serde::de::DeserializeOwned;

use crate::{
    Error,
    access::RemoteRecords,
    auth::NewSession,
    database_id::RecordId,
    endpoints::{self, format_endpoint},
    error::ErrorBody,
    record::{NewRecord, Record, RecordPatch},
};

/// The REST API's record routes, called with [reqwest].
#[derive(Debug, Clone)]
pub struct HttpRecords {
    client: Client,
    base_url: String,
    session_cookie: Option<HeaderValue>,
}

impl HttpRecords {
    /// A client for the API at `base_url`, e.g. `http://localhost:3001`, acting
    /// as the anonymous owner.
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_owned(),
            session_cookie: None,
        }
    }

    /// Open a session for `owner_id` and return a client that sends its cookie.
    ///
    /// # Errors
    /// Returns [Error::Remote] if the request fails, the server rejects the
    /// owner ID or the response does not set a cookie.
    pub async fn sign_in(base_url: &str, owner_id: &str) -> Result<Self, Error> {
        let mut records = Self::new(base_url);

        let response = records
            .request(Method::POST, endpoints::SESSION)
            .json(&NewSession {
                owner_id: owner_id.to_owned(),
            })
            .send()
            .await
            .map_err(remote_error)?;
        let response = check_status(response).await?;

        let set_cookie = response
            .headers()
            .get(SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| Error::Remote("sign in response did not set a cookie".to_owned()))?;

        // Only the name=value pair is sent back, the attributes are for the browser.
        let pair = set_cookie.split(';').next().unwrap_or_default().trim();
        let cookie = HeaderValue::from_str(pair)
            .map_err(|error| Error::Remote(format!("invalid session cookie: {error}")))?;

        records.session_cookie = Some(cookie);

        Ok(records)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self
            .client
            .request(method, format!("{}{path}", self.base_url));

        match &self.session_cookie {
            Some(cookie) => request.header(COOKIE, cookie.clone()),
            None => request,
        }
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, Error> {
        let response = request.send().await.map_err(remote_error)?;

        check_status(response)
            .await?
            .json()
            .await
            .map_err(remote_error)
    }
}

impl RemoteRecords for HttpRecords {
    async fn list(&self) -> Result<Vec<Record>, Error> {
        Self::send_json(self.request(Method::GET, endpoints::RECORDS)).await
    }

    async fn create(&self, new_record: &NewRecord) -> Result<Record, Error> {
        Self::send_json(self.request(Method::POST, endpoints::RECORDS).json(new_record)).await
    }

    async fn update(&self, id: RecordId, patch: &RecordPatch) -> Result<Record, Error> {
        let path = format_endpoint(endpoints::RECORD, id);

        Self::send_json(self.request(Method::PUT, &path).json(patch)).await
    }

    async fn delete(&self, id: RecordId) -> Result<(), Error> {
        let path = format_endpoint(endpoints::RECORD, id);

        let response = self
            .request(Method::DELETE, &path)
            .send()
            .await
            .map_err(remote_error)?;
        check_status(response).await?;

        Ok(())
    }
}

/// Turn an error status into [Error::Remote], using the message from the body if there is one.
async fn check_status(response: Response) -> Result<Response, Error> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.message,
        Err(_) => status.canonical_reason().unwrap_or("unknown error").to_owned(),
    };

    Err(Error::Remote(format!("{status}: {message}")))
}

fn remote_error(error: reqwest::Error) -> Error {
    tracing::warn!("Request to the record service failed: {error}");
    Error::Remote(error.to_string())
}
