//! Users Domain
//!
//! In-memory user management behind a ports/adapters layering.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐
//! │  Handlers   │     │   Client    │  ← HTTP adapters (inbound / outbound)
//! └──────┬──────┘     └──────┬──────┘
//!        │      UserApi      │
//! ┌──────▼───────────────────┘
//! │   Service   │  ← Call-context checks, error context
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Concurrency-safe in-memory store
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entity, DTOs
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_users::{
//!     handlers::{self, HandlerConfig},
//!     repository::InMemoryUserRepository,
//!     service::UserService,
//! };
//!
//! // Create repository and service
//! let repository = InMemoryUserRepository::new();
//! let service = UserService::new(repository);
//!
//! // Create Axum router
//! let router = handlers::router(service, HandlerConfig::default());
//! ```

pub mod client;
pub mod context;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

// Re-export commonly used types
pub use client::UserClient;
pub use context::RequestContext;
pub use error::{ErrorKind, ResultExt, UserError, UserResult};
pub use handlers::{ApiDoc, HandlerConfig};
pub use models::{CreateUser, UpdateUser, User};
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::{UserApi, UserService, UserServiceBuilder};
