use models::{
    profile::{self, ProfileInput},
    user,
};
use sea_orm::{IntoActiveModel, Order};
use serde_json::Value as JsonValue;
use tracing::{info, instrument};

use crate::{
    database::DatabaseService,
    errors::ServiceError,
    query::{BelongsTo, Conditions, Includable, ListQuery, QueryOptions, RelationLoader},
};

impl Includable for profile::Entity {
    fn relation(name: &str) -> Option<Box<dyn RelationLoader<Self>>> {
        match name {
            "user" => Some(Box::new(BelongsTo::<user::Entity>::new("user"))),
            _ => None,
        }
    }
}

/// Profile operations over the generic façade.
#[derive(Clone, Debug)]
pub struct ProfileService {
    db: DatabaseService,
}

impl ProfileService {
    pub fn new(db: DatabaseService) -> Self {
        Self { db }
    }

    /// Fails with a foreign-key violation when `user_id` names no user.
    #[instrument(skip(self, input), fields(user_id = ?input.user_id))]
    pub async fn create_profile(&self, input: ProfileInput) -> Result<profile::Model, ServiceError> {
        let created = self.db.create(input.into_active_model()).await?;
        info!(profile_id = created.id, user_id = created.user_id, "profile_created");
        Ok(created)
    }

    #[instrument(skip(self, input))]
    pub async fn update_profile(&self, id: i32, input: ProfileInput) -> Result<Option<profile::Model>, ServiceError> {
        let updated = self.db.update(id, input.into_active_model()).await?;
        if updated.is_some() {
            info!(profile_id = id, "profile_updated");
        }
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete_profile(&self, id: i32) -> Result<(), ServiceError> {
        self.db.delete::<profile::Entity>(id).await?;
        info!(profile_id = id, "profile_deleted");
        Ok(())
    }

    pub async fn find_one_profile(
        &self,
        conditions: Conditions<profile::Entity>,
    ) -> Result<Option<profile::Model>, ServiceError> {
        Ok(self.db.find_one(conditions).await?)
    }

    pub async fn find_profile(&self, id: i32) -> Result<Option<profile::Model>, ServiceError> {
        self.find_one_profile(Conditions::eq(profile::Column::Id, id)).await
    }

    /// Every profile owned by `user_id`, oldest first.
    pub async fn find_profiles_by_user(&self, user_id: i32) -> Result<Vec<profile::Model>, ServiceError> {
        let query = ListQuery::<profile::Entity>::new()
            .filter(Conditions::eq(profile::Column::UserId, user_id))
            .order_by(profile::Column::Id, Order::Asc);
        Ok(self.db.find_many(query).await?)
    }

    pub async fn find_many_profiles(
        &self,
        options: QueryOptions<profile::Entity>,
    ) -> Result<Vec<JsonValue>, ServiceError> {
        Ok(self.db.query_list(options).await?)
    }
}
