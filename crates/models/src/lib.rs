//! SeaORM entities, their partial-input payloads and connection helpers.

pub mod db;
pub mod profile;
pub mod user;
