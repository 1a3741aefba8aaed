//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repositories implement the domain storage ports over a shared `bb8` pool
//! of `diesel-async` connections. Row structs (`models.rs`) and table
//! definitions (`schema.rs`) stay private to this module; every database
//! failure is mapped into the owning port's error type.
//!
//! # Example
//!
//! ```ignore
//! use backend::outbound::persistence::{DbPool, DieselOfferRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/lunch")).await?;
//! let offers = DieselOfferRepository::new(pool);
//! ```

mod diesel_basic_error_mapping;
mod diesel_group_post_repository;
mod diesel_offer_repository;
mod diesel_registration_token_repository;
mod diesel_restaurant_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_group_post_repository::DieselGroupPostRepository;
pub use diesel_offer_repository::DieselOfferRepository;
pub use diesel_registration_token_repository::DieselRegistrationTokenRepository;
pub use diesel_restaurant_repository::{DieselRegionRepository, DieselRestaurantRepository};
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
