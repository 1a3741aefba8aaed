//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **facebook**: Graph API login, page tokens and page posts via reqwest
//! - **persistence**: PostgreSQL repositories using Diesel ORM
//!
//! Adapters only translate between domain types and infrastructure
//! representations; they contain no business rules.

pub mod facebook;
pub mod persistence;
