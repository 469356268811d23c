//! Pieces shared by every crate in the workspace: log initialisation and the
//! small wire types that are not tied to an entity.

pub mod types;
pub mod utils;
