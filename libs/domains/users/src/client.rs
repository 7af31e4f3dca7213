//! HTTP client adapter speaking the same wire model as [`handlers`](crate::handlers).

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::context::RequestContext;
use crate::error::{ResultExt, UserError, UserResult};
use crate::models::{CreateUser, UpdateUser, User};
use crate::service::UserApi;

/// Remote [`UserApi`] backed by a running users server.
#[derive(Debug, Clone)]
pub struct UserClient {
    http_client: reqwest::Client,
    users_url: Url,
}

impl UserClient {
    /// `base_url` is the mount point of the users router, e.g.
    /// `http://localhost:42873/api/users`.
    pub fn new(base_url: &str) -> UserResult<Self> {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http_client: reqwest::Client, base_url: &str) -> UserResult<Self> {
        let mut users_url = Url::parse(base_url)
            .map_err(|_| UserError::InvalidDependency("base_url"))
            .context("UserClient.new")?;

        if users_url.cannot_be_a_base() {
            return Err(UserError::InvalidDependency("base_url").context("UserClient.new"));
        }
        if users_url.path().ends_with('/') && users_url.path() != "/" {
            let path = users_url.path().trim_end_matches('/').to_string();
            users_url.set_path(&path);
        }

        Ok(Self {
            http_client,
            users_url,
        })
    }

    fn request(&self, method: Method, id: Option<Uuid>) -> UserResult<RequestBuilder> {
        let mut url = self.users_url.clone();
        if let Some(id) = id {
            url.path_segments_mut()
                .map_err(|_| UserError::InvalidDependency("base_url"))?
                .pop_if_empty()
                .push(&id.to_string());
        }
        Ok(self.http_client.request(method, url))
    }

    /// Send within the bounds of `ctx`.
    async fn send(&self, ctx: &RequestContext, request: RequestBuilder) -> UserResult<Response> {
        let request = match ctx.remaining() {
            Some(remaining) => request.timeout(remaining),
            None => request,
        };

        ctx.run(request.send())
            .await?
            .map_err(|e| UserError::Transport(e.to_string()))
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> UserResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| UserError::Transport(format!("Failed to decode response: {}", e)))
    }

    async fn unexpected(response: Response) -> UserError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        UserError::UnexpectedStatus { status, body }
    }
}

#[async_trait]
impl UserApi for UserClient {
    async fn list_users(&self, ctx: &RequestContext) -> UserResult<Vec<User>> {
        let result: UserResult<Vec<User>> = async {
            let response = self.send(ctx, self.request(Method::GET, None)?).await?;
            match response.status() {
                StatusCode::OK => Self::decode(response).await,
                _ => Err(Self::unexpected(response).await),
            }
        }
        .await;
        result.context("UserClient.list_users")
    }

    async fn create_user(&self, ctx: &RequestContext, input: CreateUser) -> UserResult<User> {
        let result: UserResult<User> = async {
            let request = self.request(Method::POST, None)?.json(&input);
            let response = self.send(ctx, request).await?;
            match response.status() {
                StatusCode::CREATED | StatusCode::OK => Self::decode(response).await,
                _ => Err(Self::unexpected(response).await),
            }
        }
        .await;
        result.context("UserClient.create_user")
    }

    async fn get_user(&self, ctx: &RequestContext, id: Uuid) -> UserResult<User> {
        let result: UserResult<User> = async {
            let response = self.send(ctx, self.request(Method::GET, Some(id))?).await?;
            match response.status() {
                StatusCode::OK => Self::decode(response).await,
                StatusCode::NOT_FOUND => Err(UserError::NotFound(id)),
                _ => Err(Self::unexpected(response).await),
            }
        }
        .await;
        result.context("UserClient.get_user")
    }

    async fn update_user(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        input: UpdateUser,
    ) -> UserResult<User> {
        let result: UserResult<User> = async {
            let request = self.request(Method::PATCH, Some(id))?.json(&input);
            let response = self.send(ctx, request).await?;
            match response.status() {
                StatusCode::OK => Self::decode(response).await,
                StatusCode::NOT_FOUND => Err(UserError::NotFound(id)),
                _ => Err(Self::unexpected(response).await),
            }
        }
        .await;
        result.context("UserClient.update_user")
    }

    async fn delete_user(&self, ctx: &RequestContext, id: Uuid) -> UserResult<()> {
        let result: UserResult<()> = async {
            let response = self
                .send(ctx, self.request(Method::DELETE, Some(id))?)
                .await?;
            match response.status() {
                StatusCode::NO_CONTENT | StatusCode::OK => Ok(()),
                StatusCode::NOT_FOUND => Err(UserError::NotFound(id)),
                _ => Err(Self::unexpected(response).await),
            }
        }
        .await;
        result.context("UserClient.delete_user")
    }
}
