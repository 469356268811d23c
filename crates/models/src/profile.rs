use sea_orm::{entity::prelude::*, ActiveValue::NotSet, IntoActiveModel, Set};
use serde::{Deserialize, Serialize};

use crate::user;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "profile")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub bio: Option<String>,
    pub photo: Option<String>,
    pub user_id: i32,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    User,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::User => Entity::belongs_to(user::Entity).from(Column::UserId).to(user::Column::Id).into(),
        }
    }
}

impl Related<user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Partial profile payload; `None` leaves the column untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileInput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i32>,
}

impl ProfileInput {
    pub fn for_user(user_id: i32, bio: impl Into<String>) -> Self {
        Self { bio: Some(bio.into()), photo: None, user_id: Some(user_id) }
    }
}

impl IntoActiveModel<ActiveModel> for ProfileInput {
    fn into_active_model(self) -> ActiveModel {
        ActiveModel {
            id: NotSet,
            bio: self.bio.map_or(NotSet, |bio| Set(Some(bio))),
            photo: self.photo.map_or(NotSet, |photo| Set(Some(photo))),
            user_id: self.user_id.map_or(NotSet, Set),
        }
    }
}
