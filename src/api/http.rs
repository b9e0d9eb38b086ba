use super::{AdminApi, Payload, Resource};
use crate::error::AdminError;
use crate::model::UserProfile;
use async_trait::async_trait;
use list_sync::{ListQuery, QueryError};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

/// [`AdminApi`] over HTTP.
///
/// Sessions ride on the cookie store; a bearer token is added when one is
/// configured.
#[derive(Clone)]
pub struct HttpApi {
    client: Client,
    base: Url,
    token: Option<String>,
}

impl HttpApi {
    pub fn new(base: Url, token: Option<String>, timeout: Duration) -> Result<Self, AdminError> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .map_err(|e| AdminError::Http(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base: with_trailing_slash(base),
            token,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, QueryError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| QueryError::Network(format!("invalid endpoint {path}: {e}")))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn with_payload(builder: RequestBuilder, payload: Payload) -> Result<RequestBuilder, QueryError> {
        match payload {
            Payload::Json(body) => Ok(builder.json(&body)),
            Payload::Multipart { fields, cover } => {
                let mut form = Form::new();
                for (name, value) in fields {
                    form = form.text(name, value);
                }
                if let Some(cover) = cover {
                    let part = Part::bytes(cover.bytes)
                        .file_name(cover.file_name)
                        .mime_str(&cover.mime)
                        .map_err(|e| QueryError::invalid_field("cover", e.to_string()))?;
                    form = form.part("cover", part);
                }
                Ok(builder.multipart(form))
            }
        }
    }

    async fn send(&self, builder: RequestBuilder, what: &str) -> Result<Value, QueryError> {
        let response = builder.send().await.map_err(network)?;
        read_body(response, what).await
    }
}

#[async_trait]
impl AdminApi for HttpApi {
    #[instrument(skip(self, query), fields(query = %query.to_query_string()))]
    async fn list(&self, resource: Resource, query: &ListQuery) -> Result<Value, QueryError> {
        let mut url = self.endpoint(resource.path())?;
        url.query_pairs_mut().extend_pairs(query.encode());
        debug!(%url, "GET list");
        self.send(self.request(Method::GET, url), resource.name()).await
    }

    #[instrument(skip(self))]
    async fn get(&self, resource: Resource, id: &str) -> Result<Value, QueryError> {
        let url = self.endpoint(&format!("{}/{}", resource.path(), id))?;
        self.send(self.request(Method::GET, url), &format!("{resource}/{id}"))
            .await
    }

    #[instrument(skip(self, payload))]
    async fn create(&self, resource: Resource, payload: Payload) -> Result<Value, QueryError> {
        let url = self.endpoint(resource.path())?;
        let builder = Self::with_payload(self.request(Method::POST, url), payload)?;
        self.send(builder, resource.name()).await
    }

    #[instrument(skip(self, payload))]
    async fn update(
        &self,
        resource: Resource,
        id: &str,
        payload: Payload,
    ) -> Result<Value, QueryError> {
        let url = self.endpoint(&format!("{}/{}", resource.path(), id))?;
        // Multipart updates go over POST, JSON ones over PUT.
        let method = match payload {
            Payload::Multipart { .. } => Method::POST,
            Payload::Json(_) => Method::PUT,
        };
        let builder = Self::with_payload(self.request(method, url), payload)?;
        self.send(builder, &format!("{resource}/{id}")).await
    }

    #[instrument(skip(self))]
    async fn delete(&self, resource: Resource, id: &str) -> Result<(), QueryError> {
        let url = self.endpoint(&format!("{}/{}", resource.path(), id))?;
        self.send(self.request(Method::DELETE, url), &format!("{resource}/{id}"))
            .await
            .map(|_| ())
    }

    #[instrument(skip(self))]
    async fn profile(&self) -> Result<UserProfile, QueryError> {
        let url = self.endpoint("/auth/profile")?;
        let body = self.send(self.request(Method::GET, url), "profile").await?;
        let profile = match body {
            Value::Object(mut map) if map.contains_key("user") => {
                map.remove("user").unwrap_or(Value::Null)
            }
            other => other,
        };
        Ok(serde_json::from_value(profile)?)
    }

    #[instrument(skip(self))]
    async fn logout(&self) -> Result<(), QueryError> {
        let url = self.endpoint("/auth/logout")?;
        self.send(self.request(Method::POST, url), "logout")
            .await
            .map(|_| ())
    }
}

fn with_trailing_slash(mut base: Url) -> Url {
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base
}

fn network(e: reqwest::Error) -> QueryError {
    if e.is_timeout() {
        QueryError::Network(format!("request timed out: {e}"))
    } else {
        QueryError::Network(e.to_string())
    }
}

async fn read_body(response: Response, what: &str) -> Result<Value, QueryError> {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(QueryError::NotFound(what.to_string()));
    }
    let body = response.text().await.map_err(network)?;
    if !status.is_success() {
        return Err(QueryError::Server {
            status: status.as_u16(),
            body,
        });
    }
    if status == StatusCode::NO_CONTENT || body.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&body)?)
}
