use super::error::ApiError;
use super::models::{Coffee, Order, OrderItemRequest, SignInRequest, SignInResponse};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client as HttpClient, ClientBuilder, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use url::Url;

/// HashiCups API client. Authenticated clients send their token on every call.
#[derive(Clone)]
pub struct Client {
    http: HttpClient,
    base_url: String,
    token: Option<String>,
}

impl Client {
    /// Unauthenticated client for `host`, e.g. `http://localhost:19090`
    pub fn new(host: &str) -> Result<Self, ApiError> {
        let parsed = Url::parse(host).map_err(|e| ApiError::InvalidUrl(format!("{host}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl(format!(
                "{host}: scheme must be http or https"
            )));
        }

        let http = ClientBuilder::new()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http,
            base_url: host.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Build a client and sign in with the given credentials
    pub async fn connect(host: &str, username: &str, password: &str) -> Result<Self, ApiError> {
        let mut client = Self::new(host)?;
        client.sign_in(username, password).await?;
        Ok(client)
    }

    pub async fn sign_in(&mut self, username: &str, password: &str) -> Result<(), ApiError> {
        let body = SignInRequest { username, password };
        let response: SignInResponse = self.send(Method::POST, "/signin", Some(&body)).await?;

        if response.token.is_empty() {
            return Err(ApiError::AuthError(format!(
                "sign in for user {} returned an empty token",
                response.username
            )));
        }

        tracing::debug!(user_id = response.user_id, "Signed in to HashiCups");
        self.token = Some(response.token);
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub async fn get_coffees(&self) -> Result<Vec<Coffee>, ApiError> {
        self.send(Method::GET, "/coffees", None::<&()>).await
    }

    pub async fn create_order(&self, items: &[OrderItemRequest]) -> Result<Order, ApiError> {
        self.send(Method::POST, "/orders", Some(items)).await
    }

    pub async fn get_order(&self, order_id: &str) -> Result<Order, ApiError> {
        let path = format!("/orders/{}", urlencoding::encode(order_id));
        self.send(Method::GET, &path, None::<&()>).await
    }

    pub async fn update_order(
        &self,
        order_id: &str,
        items: &[OrderItemRequest],
    ) -> Result<Order, ApiError> {
        let path = format!("/orders/{}", urlencoding::encode(order_id));
        self.send(Method::PUT, &path, Some(items)).await
    }

    async fn send<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("{} {}", method, url);

        let mut request = self.http.request(method, url);
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        Self::parse_response(response).await
    }

    async fn parse_response<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let status = response.status();
        tracing::debug!("Response status: {}", status);

        let body = response.text().await?;
        if status != StatusCode::OK {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| ApiError::ParseError(e.to_string()))
    }
}
