//! Subscription persistence adapters.
//!
//! Two implementations of [`crate::domain::ports::SubscriptionRepository`]:
//!
//! - **Diesel/PostgreSQL**: rows live in the `subscriptions` table, accessed
//!   through a `bb8` pool of `diesel-async` connections. Row structs
//!   (`models.rs`) and the schema (`schema.rs`) stay internal to this module.
//! - **In-memory**: a lock-guarded map used when no database is configured.
//!
//! # Example
//!
//! ```ignore
//! use corona_backend::outbound::persistence::{
//!     DbPool, DieselSubscriptionRepository, PoolConfig, run_migrations,
//! };
//!
//! run_migrations("postgres://localhost/corona").await?;
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/corona")).await?;
//! let repo = DieselSubscriptionRepository::new(pool);
//! ```

mod diesel_subscription_repository;
mod in_memory_subscription_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_subscription_repository::DieselSubscriptionRepository;
pub use in_memory_subscription_repository::InMemorySubscriptionRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
