//! Service layer: a generic CRUD façade over SeaORM and the per-entity services built on it.
//! - `database` holds the entity-agnostic operations.
//! - `query` and `params` describe list reads, typed and textual.
//! - `user_service` and `profile_service` fix the entity and add business rules.

pub mod database;
pub mod errors;
pub mod pagination;
pub mod params;
pub mod password;
pub mod profile_service;
pub mod query;
#[cfg(test)]
pub mod test_support;
pub mod user_service;
