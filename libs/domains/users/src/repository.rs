use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::context::RequestContext;
use crate::error::{ResultExt, UserError, UserResult};
use crate::models::{CreateUser, UpdateUser, User};

/// Repository trait for User persistence
///
/// Every method checks `ctx` before touching state and returns owned copies.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// List all users, in no particular order
    async fn list(&self, ctx: &RequestContext) -> UserResult<Vec<User>>;

    /// Create a new user with a freshly generated id
    async fn create(&self, ctx: &RequestContext, input: CreateUser) -> UserResult<User>;

    /// Get a user by ID
    async fn get(&self, ctx: &RequestContext, id: Uuid) -> UserResult<User>;

    /// Overwrite the supplied fields of an existing user
    async fn update(&self, ctx: &RequestContext, id: Uuid, input: UpdateUser)
    -> UserResult<User>;

    /// Delete a user by ID
    async fn delete(&self, ctx: &RequestContext, id: Uuid) -> UserResult<()>;
}

/// In-memory implementation of UserRepository.
///
/// A single reader/writer lock guards the whole map, so writes are totally
/// ordered and readers never see a half-applied update. Clones share state.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn list(&self, ctx: &RequestContext) -> UserResult<Vec<User>> {
        let users = ctx
            .run(self.users.read())
            .await
            .context("InMemoryUserRepository.list")?;

        Ok(users.values().cloned().collect())
    }

    async fn create(&self, ctx: &RequestContext, input: CreateUser) -> UserResult<User> {
        let mut users = ctx
            .run(self.users.write())
            .await
            .context("InMemoryUserRepository.create")?;

        // v4 collisions are practically impossible, but never overwrite a live entry
        let mut user = User::new(input);
        while users.contains_key(&user.id) {
            user.id = Uuid::new_v4();
        }
        users.insert(user.id, user.clone());

        tracing::info!(user_id = %user.id, "Created user");
        Ok(user)
    }

    async fn get(&self, ctx: &RequestContext, id: Uuid) -> UserResult<User> {
        let users = ctx
            .run(self.users.read())
            .await
            .context("InMemoryUserRepository.get")?;

        users.get(&id).cloned().ok_or(UserError::NotFound(id))
    }

    async fn update(
        &self,
        ctx: &RequestContext,
        id: Uuid,
        input: UpdateUser,
    ) -> UserResult<User> {
        let mut users = ctx
            .run(self.users.write())
            .await
            .context("InMemoryUserRepository.update")?;

        let user = users.get_mut(&id).ok_or(UserError::NotFound(id))?;
        user.apply_update(input);

        tracing::info!(user_id = %id, "Updated user");
        Ok(user.clone())
    }

    async fn delete(&self, ctx: &RequestContext, id: Uuid) -> UserResult<()> {
        let mut users = ctx
            .run(self.users.write())
            .await
            .context("InMemoryUserRepository.delete")?;

        if users.remove(&id).is_some() {
            tracing::info!(user_id = %id, "Deleted user");
            Ok(())
        } else {
            Err(UserError::NotFound(id))
        }
    }
}
