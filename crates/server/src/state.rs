use configs::PasswordHashing;
use sea_orm::DatabaseConnection;
use service::{
    database::DatabaseService, password::PasswordPolicy, profile_service::ProfileService, user_service::UserService,
};

/// Shared handler state; cloning only clones the pool handle.
#[derive(Clone, Debug)]
pub struct ServerState {
    pub users: UserService,
    pub profiles: ProfileService,
}

impl ServerState {
    pub fn new(db: DatabaseConnection, password_hashing: PasswordHashing) -> Self {
        let db = DatabaseService::new(db);
        Self {
            users: UserService::new(db.clone(), PasswordPolicy::new(password_hashing)),
            profiles: ProfileService::new(db),
        }
    }
}
