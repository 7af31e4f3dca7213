use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    UuidPath,
    errors::responses::{BadRequestUuidResponse, InternalServerErrorResponse, NotFoundResponse},
};
use std::sync::Arc;
use std::time::Duration;
use utoipa::OpenApi;

use crate::context::RequestContext;
use crate::error::UserResult;
use crate::models::{CreateUser, UpdateUser, User};
use crate::service::UserApi;

const TAG: &str = "users";

/// OpenAPI documentation for the Users API
#[derive(OpenApi)]
#[openapi(
    paths(list_users, create_user, get_user, update_user, delete_user),
    components(
        schemas(User, CreateUser, UpdateUser),
        responses(NotFoundResponse, BadRequestUuidResponse, InternalServerErrorResponse)
    ),
    tags((name = TAG, description = "User management endpoints"))
)]
pub struct ApiDoc;

/// Transport settings applied to every request
#[derive(Debug, Clone, Copy)]
pub struct HandlerConfig {
    /// Deadline given to each request's call context
    pub request_timeout: Duration,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(15),
        }
    }
}

struct HandlerState<S> {
    service: Arc<S>,
    config: HandlerConfig,
}

impl<S> Clone for HandlerState<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            config: self.config,
        }
    }
}

impl<S> HandlerState<S> {
    fn context(&self) -> RequestContext {
        RequestContext::with_timeout(self.config.request_timeout)
    }
}

/// Create the users router with all HTTP endpoints
pub fn router<S: UserApi + 'static>(service: S, config: HandlerConfig) -> Router {
    let state = HandlerState {
        service: Arc::new(service),
        config,
    };

    Router::new()
        .route("/", get(list_users::<S>).post(create_user::<S>))
        .route(
            "/{id}",
            get(get_user::<S>)
                .patch(update_user::<S>)
                .put(update_user::<S>)
                .delete(delete_user::<S>),
        )
        .with_state(state)
}

/// List all users
#[utoipa::path(
    get,
    path = "",
    tag = TAG,
    responses(
        (status = 200, description = "All users, unordered", body = Vec<User>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_users<S: UserApi>(
    State(state): State<HandlerState<S>>,
) -> UserResult<Json<Vec<User>>> {
    let users = state.service.list_users(&state.context()).await?;
    Ok(Json(users))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "",
    tag = TAG,
    request_body = CreateUser,
    responses(
        (status = 201, description = "User created", body = User),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_user<S: UserApi>(
    State(state): State<HandlerState<S>>,
    Json(input): Json<CreateUser>,
) -> UserResult<impl IntoResponse> {
    let user = state.service.create_user(&state.context(), input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_user<S: UserApi>(
    State(state): State<HandlerState<S>>,
    UuidPath(id): UuidPath,
) -> UserResult<Json<User>> {
    let user = state.service.get_user(&state.context(), id).await?;
    Ok(Json(user))
}

/// Update the supplied fields of a user
#[utoipa::path(
    patch,
    path = "/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "User ID")),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_user<S: UserApi>(
    State(state): State<HandlerState<S>>,
    UuidPath(id): UuidPath,
    Json(input): Json<UpdateUser>,
) -> UserResult<Json<User>> {
    let user = state.service.update_user(&state.context(), id, input).await?;
    Ok(Json(user))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = TAG,
    params(("id" = Uuid, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 400, response = BadRequestUuidResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_user<S: UserApi>(
    State(state): State<HandlerState<S>>,
    UuidPath(id): UuidPath,
) -> UserResult<impl IntoResponse> {
    state.service.delete_user(&state.context(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
