use models::{
    profile,
    user::{self, UserInput},
};
use sea_orm::{IntoActiveModel, Value};
use serde_json::Value as JsonValue;
use tracing::{info, instrument};

use crate::{
    database::DatabaseService,
    errors::ServiceError,
    password::PasswordPolicy,
    query::{Conditions, HasMany, Includable, ListQuery, QueryOptions, RelationLoader},
};

impl Includable for user::Entity {
    fn relation(name: &str) -> Option<Box<dyn RelationLoader<Self>>> {
        match name {
            "profiles" => Some(Box::new(HasMany::<profile::Entity>::new("profiles"))),
            _ => None,
        }
    }

    fn is_private(column: &user::Column) -> bool {
        matches!(column, user::Column::Password)
    }
}

/// User operations: the generic façade with the entity fixed to `user`, plus the
/// password policy applied on every write that carries a password.
#[derive(Clone, Debug)]
pub struct UserService {
    db: DatabaseService,
    passwords: PasswordPolicy,
}

impl UserService {
    pub fn new(db: DatabaseService, passwords: PasswordPolicy) -> Self {
        Self { db, passwords }
    }

    pub fn passwords(&self) -> PasswordPolicy {
        self.passwords
    }

    /// Create a user. Missing fields are left to storage constraints.
    ///
    /// # Examples
    /// ```
    /// use migration::MigratorTrait;
    /// use models::user::UserInput;
    /// use service::{database::DatabaseService, password::PasswordPolicy, user_service::UserService};
    ///
    /// tokio_test::block_on(async {
    ///     let conn = models::db::connect_url("sqlite::memory:").await.unwrap();
    ///     migration::Migrator::up(&conn, None).await.unwrap();
    ///     let users = UserService::new(DatabaseService::new(conn), PasswordPolicy::default());
    ///     let ann = users.create_user(UserInput::new("Ann", "a@x.com", "secret")).await.unwrap();
    ///     assert_eq!(ann.id, 1);
    ///     assert_ne!(ann.password, "secret");
    /// });
    /// ```
    #[instrument(skip(self, input), fields(email = ?input.email))]
    pub async fn create_user(&self, input: UserInput) -> Result<user::Model, ServiceError> {
        let input = self.protect(input)?;
        let created = self.db.create(input.into_active_model()).await?;
        info!(user_id = created.id, "user_created");
        Ok(created)
    }

    /// Partially update a user; `None` when no user has this id.
    #[instrument(skip(self, input))]
    pub async fn update_user(&self, id: i32, input: UserInput) -> Result<Option<user::Model>, ServiceError> {
        let input = self.protect(input)?;
        let updated = self.db.update(id, input.into_active_model()).await?;
        if updated.is_some() {
            info!(user_id = id, "user_updated");
        }
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: i32) -> Result<(), ServiceError> {
        self.db.delete::<user::Entity>(id).await?;
        info!(user_id = id, "user_deleted");
        Ok(())
    }

    pub async fn find_one_user(&self, conditions: Conditions<user::Entity>) -> Result<Option<user::Model>, ServiceError> {
        Ok(self.db.find_one(conditions).await?)
    }

    pub async fn find_user(&self, id: i32) -> Result<Option<user::Model>, ServiceError> {
        self.find_one_user(Conditions::eq(user::Column::Id, id)).await
    }

    pub async fn find_users_by_field<V>(&self, field: user::Column, value: V) -> Result<Vec<user::Model>, ServiceError>
    where
        V: Into<Value> + Send,
    {
        Ok(self.db.find_by_field::<user::Entity, V>(field, value).await?)
    }

    pub async fn list_users(&self, query: ListQuery<user::Entity>) -> Result<Vec<user::Model>, ServiceError> {
        Ok(self.db.find_many(query).await?)
    }

    pub async fn find_many_users(&self, options: QueryOptions<user::Entity>) -> Result<Vec<JsonValue>, ServiceError> {
        Ok(self.db.query_list(options).await?)
    }

    fn protect(&self, mut input: UserInput) -> Result<UserInput, ServiceError> {
        if let Some(raw) = input.password.take() {
            input.password = Some(self.passwords.protect(raw)?);
        }
        Ok(input)
    }
}
