//! User Service - the only path between transports and the repository

use async_trait::async_trait;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::context::RequestContext;
use crate::error::{ResultExt, UserError, UserResult};
use crate::models::{CreateUser, UpdateUser, User};
use crate::repository::UserRepository;

/// Service capability consumed by transport adapters.
///
/// Implemented by [`UserService`] in-process and by
/// [`UserClient`](crate::client::UserClient) over HTTP.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserApi: Send + Sync {
    async fn list_users(&self, ctx: &RequestContext) -> UserResult<Vec<User>>;

    async fn create_user(&self, ctx: &RequestContext, input: CreateUser) -> UserResult<User>;

    async fn get_user(&self, ctx: &RequestContext, id: Uuid) -> UserResult<User>;

    async fn update_user(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        input: UpdateUser,
    ) -> UserResult<User>;

    async fn delete_user(&self, ctx: &RequestContext, id: Uuid) -> UserResult<()>;
}

/// Service layer for users.
///
/// Holds no state of its own. Errors from the repository keep their kind and
/// gain the call site as context.
pub struct UserService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    pub fn builder() -> UserServiceBuilder<R> {
        UserServiceBuilder { repository: None }
    }
}

impl<R: UserRepository> Clone for UserService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

/// Builder that fails fast when the repository was never supplied.
pub struct UserServiceBuilder<R: UserRepository> {
    repository: Option<Arc<R>>,
}

impl<R: UserRepository> UserServiceBuilder<R> {
    pub fn repository(mut self, repository: R) -> Self {
        self.repository = Some(Arc::new(repository));
        self
    }

    pub fn build(self) -> UserResult<UserService<R>> {
        let repository = self
            .repository
            .ok_or(UserError::InvalidDependency("repository"))
            .context("UserServiceBuilder.build")?;
        Ok(UserService { repository })
    }
}

#[async_trait]
impl<R: UserRepository> UserApi for UserService<R> {
    #[instrument(skip(self, ctx))]
    async fn list_users(&self, ctx: &RequestContext) -> UserResult<Vec<User>> {
        self.repository
            .list(ctx)
            .await
            .context("UserService.list_users")
    }

    #[instrument(skip(self, ctx, input))]
    async fn create_user(&self, ctx: &RequestContext, input: CreateUser) -> UserResult<User> {
        ctx.check().context("UserService.create_user")?;

        self.repository
            .create(ctx, input)
            .await
            .context("UserService.create_user")
    }

    #[instrument(skip(self, ctx))]
    async fn get_user(&self, ctx: &RequestContext, id: Uuid) -> UserResult<User> {
        self.repository
            .get(ctx, id)
            .await
            .context("UserService.get_user")
    }

    #[instrument(skip(self, ctx, input))]
    async fn update_user(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        input: UpdateUser,
    ) -> UserResult<User> {
        ctx.check().context("UserService.update_user")?;

        self.repository
            .update(ctx, id, input)
            .await
            .context("UserService.update_user")
    }

    #[instrument(skip(self, ctx))]
    async fn delete_user(&self, ctx: &RequestContext, id: Uuid) -> UserResult<()> {
        self.repository
            .delete(ctx, id)
            .await
            .context("UserService.delete_user")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::repository::{InMemoryUserRepository, MockUserRepository};
    use mockall::predicate::eq;

    fn canceled() -> RequestContext {
        let ctx = RequestContext::new();
        ctx.cancel();
        ctx
    }

    #[test]
    fn test_builder_without_repository_fails() {
        let result = UserService::<InMemoryUserRepository>::builder().build();
        let err = result.err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidDependency);
    }

    #[test]
    fn test_builder_with_repository_succeeds() {
        let result = UserService::builder()
            .repository(InMemoryUserRepository::new())
            .build();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_create_checks_context_before_repository() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo.expect_create().never();

        let service = UserService::new(mock_repo);
        let err = service
            .create_user(&canceled(), CreateUser::new("Ann", "ann1"))
            .await
            .unwrap_err();

        assert!(err.is_canceled());
        assert!(err.to_string().starts_with("UserService.create_user"));
    }

    #[tokio::test]
    async fn test_update_checks_context_before_repository() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo.expect_update().never();

        let service = UserService::new(mock_repo);
        let err = service
            .update_user(&canceled(), Uuid::new_v4(), UpdateUser::default().name("X"))
            .await
            .unwrap_err();

        assert!(err.is_canceled());
    }

    #[tokio::test]
    async fn test_get_delegates_cancellation_to_repository() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_get()
            .times(1)
            .returning(|ctx, _| ctx.check().map(|_| unreachable!()));

        let service = UserService::new(mock_repo);
        let err = service.get_user(&canceled(), Uuid::new_v4()).await.unwrap_err();
        assert!(err.is_canceled());
    }

    #[tokio::test]
    async fn test_not_found_is_wrapped_but_still_classifiable() {
        let id = Uuid::new_v4();
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_delete()
            .with(mockall::predicate::always(), eq(id))
            .returning(|_, id| Err(UserError::NotFound(id)));

        let service = UserService::new(mock_repo);
        let err = service
            .delete_user(&RequestContext::new(), id)
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert!(matches!(err, UserError::Context { context: "UserService.delete_user", .. }));
    }

    #[tokio::test]
    async fn test_update_forwards_partial_input_unchanged() {
        let id = Uuid::new_v4();
        let mut mock_repo = MockUserRepository::new();
        mock_repo
            .expect_update()
            .withf(move |_, got_id, input| {
                *got_id == id && input.name.is_none() && input.username.as_deref() == Some("ann2")
            })
            .returning(|_, id, _| {
                Ok(User {
                    id,
                    name: "Ann".to_string(),
                    username: "ann2".to_string(),
                })
            });

        let service = UserService::new(mock_repo);
        let user = service
            .update_user(&RequestContext::new(), id, UpdateUser::default().username("ann2"))
            .await
            .unwrap();

        assert_eq!(user.username, "ann2");
    }

    #[tokio::test]
    async fn test_list_passes_through_results() {
        let mut mock_repo = MockUserRepository::new();
        mock_repo.expect_list().returning(|_| Ok(Vec::new()));

        let service = UserService::new(mock_repo);
        let users = service.list_users(&RequestContext::new()).await.unwrap();
        assert!(users.is_empty());
    }

    #[tokio::test]
    async fn test_scenario_against_in_memory_repository() {
        let service = UserService::new(InMemoryUserRepository::new());
        let ctx = RequestContext::new();

        let a = service
            .create_user(&ctx, CreateUser::new("Ann", "ann1"))
            .await
            .unwrap();
        let b = service
            .create_user(&ctx, CreateUser::new("Bo", "bo1"))
            .await
            .unwrap();

        let updated = service
            .update_user(&ctx, a.id, UpdateUser::default().username("ann2"))
            .await
            .unwrap();
        assert_eq!(
            updated,
            User {
                id: a.id,
                name: "Ann".to_string(),
                username: "ann2".to_string(),
            }
        );

        service.delete_user(&ctx, b.id).await.unwrap();

        let users = service.list_users(&ctx).await.unwrap();
        assert_eq!(users, vec![updated]);

        let err = service.get_user(&ctx, b.id).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
