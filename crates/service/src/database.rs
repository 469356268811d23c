//! Entity-agnostic CRUD façade over a SeaORM connection.
//!
//! Every method is generic over the entity (or its active model) it operates on and
//! returns the ORM's own `DbErr` untouched; callers decide how to classify failures.

use sea_orm::{
    sea_query::IntoValueTuple, ActiveModelBehavior, ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr,
    EntityTrait, IntoActiveModel, Iterable, PrimaryKeyToColumn, PrimaryKeyTrait, QueryFilter, Value,
};
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{debug, instrument};

use crate::query::{self, Conditions, ListQuery, QueryOptions};

/// Model type produced by an active model.
pub type ModelOf<A> = <<A as ActiveModelTrait>::Entity as EntityTrait>::Model;
/// Primary key value of an entity (`i32` for both shipped entities).
pub type PrimaryKeyOf<E> = <<E as EntityTrait>::PrimaryKey as PrimaryKeyTrait>::ValueType;

/// Generic data-access service shared by every per-entity service.
///
/// # Examples
/// ```
/// use migration::MigratorTrait;
/// use models::user::{self, UserInput};
/// use sea_orm::IntoActiveModel;
/// use service::{database::DatabaseService, query::Conditions};
///
/// tokio_test::block_on(async {
///     let conn = models::db::connect_url("sqlite::memory:").await.unwrap();
///     migration::Migrator::up(&conn, None).await.unwrap();
///     let db = DatabaseService::new(conn);
///
///     let ann = db.create(UserInput::new("Ann", "a@x.com", "p").into_active_model()).await.unwrap();
///     assert_eq!(ann.id, 1);
///     let found = db.find_one::<user::Entity>(Conditions::eq(user::Column::Email, "a@x.com")).await.unwrap();
///     assert_eq!(found, Some(ann));
/// });
/// ```
#[derive(Clone, Debug)]
pub struct DatabaseService {
    db: DatabaseConnection,
}

impl DatabaseService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Insert one row and return it as stored, generated id included.
    ///
    /// Unset columns are left to storage defaults and constraints.
    #[instrument(level = "debug", skip_all, fields(entity = %entity_name::<A::Entity>()))]
    pub async fn create<A>(&self, data: A) -> Result<ModelOf<A>, DbErr>
    where
        A: ActiveModelTrait + ActiveModelBehavior + Send,
        ModelOf<A>: IntoActiveModel<A>,
    {
        let created = data.insert(&self.db).await?;
        debug!("row inserted");
        Ok(created)
    }

    /// First row matching every condition, or `None`.
    pub async fn find_one<E: EntityTrait>(&self, conditions: Conditions<E>) -> Result<Option<E::Model>, DbErr> {
        conditions.apply(E::find()).one(&self.db).await
    }

    /// Every row whose `field` equals `value`. No match yields an empty list.
    pub async fn find_by_field<E, V>(&self, field: E::Column, value: V) -> Result<Vec<E::Model>, DbErr>
    where
        E: EntityTrait,
        V: Into<Value> + Send,
    {
        E::find().filter(field.eq(value)).all(&self.db).await
    }

    /// Apply the set columns of `data` to the row with primary key `id`, then re-read it.
    ///
    /// Zero matched rows is not an error: the re-read simply yields `None`. A payload
    /// without any set column skips the write.
    #[instrument(level = "debug", skip_all, fields(entity = %entity_name::<A::Entity>()))]
    pub async fn update<A>(&self, id: PrimaryKeyOf<A::Entity>, data: A) -> Result<Option<ModelOf<A>>, DbErr>
    where
        A: ActiveModelTrait + Send,
    {
        let key = primary_key_condition::<A::Entity>(id);
        if has_changes(&data) {
            let res = A::Entity::update_many().set(data).filter(key.clone()).exec(&self.db).await?;
            debug!(rows_affected = res.rows_affected, "rows updated");
        }
        A::Entity::find().filter(key).one(&self.db).await
    }

    /// Remove the row with primary key `id`. Removing an absent row succeeds.
    #[instrument(level = "debug", skip_all, fields(entity = %entity_name::<E>()))]
    pub async fn delete<E: EntityTrait>(&self, id: PrimaryKeyOf<E>) -> Result<(), DbErr> {
        let res = E::delete_by_id(id).exec(&self.db).await?;
        debug!(rows_affected = res.rows_affected, "rows deleted");
        Ok(())
    }

    /// Filtered, searched, sorted and paginated read returning typed models.
    pub async fn find_many<E: EntityTrait>(&self, query: ListQuery<E>) -> Result<Vec<E::Model>, DbErr> {
        query.apply(E::find()).all(&self.db).await
    }

    /// Like [`Self::find_many`], but each row becomes a JSON record restricted to the
    /// selected columns, with every requested relation attached under its own key.
    #[instrument(level = "debug", skip_all, fields(entity = %entity_name::<E>()))]
    pub async fn query_list<E>(&self, options: QueryOptions<E>) -> Result<Vec<JsonValue>, DbErr>
    where
        E: EntityTrait,
        E::Model: Serialize + Sync,
    {
        let QueryOptions { select, relations, query } = options;
        let rows = query.apply(E::find()).all(&self.db).await?;

        let mut included = Vec::with_capacity(relations.len());
        for relation in &relations {
            let values = relation.load(&self.db, &rows).await?;
            included.push((relation.name().to_owned(), values.into_iter()));
        }

        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut record = match query::to_json(row)? {
                JsonValue::Object(map) => map,
                other => return Err(DbErr::Json(format!("model did not serialize to an object: {other}"))),
            };
            query::project(&mut record, &select);
            for (name, values) in included.iter_mut() {
                record.insert(name.clone(), values.next().unwrap_or_default());
            }
            records.push(JsonValue::Object(record));
        }
        debug!(rows = records.len(), relations = relations.len(), "list loaded");
        Ok(records)
    }
}

fn entity_name<E: EntityTrait>() -> String {
    E::default().table_name().to_owned()
}

fn primary_key_condition<E: EntityTrait>(id: PrimaryKeyOf<E>) -> Condition {
    E::PrimaryKey::iter()
        .zip(id.into_value_tuple())
        .fold(Condition::all(), |cond, (key, value)| cond.add(key.into_column().eq(value)))
}

fn has_changes<A: ActiveModelTrait>(data: &A) -> bool {
    <A::Entity as EntityTrait>::Column::iter().any(|column| data.get(column).is_set())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{BelongsTo, HasMany};
    use crate::test_support::get_db;
    use models::{
        profile::{self, ProfileInput},
        user::{self, UserInput},
    };
    use sea_orm::{Order, PaginatorTrait};

    type Users = user::Entity;

    async fn seed(db: &DatabaseService, names: &[&str]) -> anyhow::Result<Vec<user::Model>> {
        let mut out = Vec::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            let email = format!("{}{}@x.com", name.to_lowercase(), i);
            out.push(db.create(UserInput::new(*name, email, "p").into_active_model()).await?);
        }
        Ok(out)
    }

    fn names(rows: &[user::Model]) -> Vec<&str> {
        rows.iter().map(|u| u.name.as_str()).collect()
    }

    #[tokio::test]
    async fn create_read_update_delete_round_trip() -> anyhow::Result<()> {
        let db = get_db().await?;

        let ann = db.create(UserInput::new("Ann", "a@x.com", "p").into_active_model()).await?;
        assert_eq!(ann.id, 1);
        assert_eq!((ann.name.as_str(), ann.email.as_str(), ann.password.as_str()), ("Ann", "a@x.com", "p"));

        let found = db.find_one::<Users>(Conditions::eq(user::Column::Id, 1)).await?;
        assert_eq!(found.as_ref(), Some(&ann));

        let anne = db.update(1, UserInput::name("Anne").into_active_model()).await?.unwrap();
        assert_eq!(anne.name, "Anne");
        assert_eq!(anne.email, "a@x.com");

        let by_name = db.find_by_field::<Users, _>(user::Column::Name, "Anne").await?;
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].id, 1);

        db.delete::<Users>(1).await?;
        assert!(db.find_one::<Users>(Conditions::eq(user::Column::Id, 1)).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn absent_rows_read_and_update_as_none() -> anyhow::Result<()> {
        let db = get_db().await?;
        seed(&db, &["Ann"]).await?;

        assert!(db.find_one::<Users>(Conditions::eq(user::Column::Id, 999)).await?.is_none());
        assert!(db.find_by_field::<Users, _>(user::Column::Name, "Nobody").await?.is_empty());
        assert!(db.update(999, UserInput::name("Ghost").into_active_model()).await?.is_none());
        assert_eq!(Users::find().count(db.connection()).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn delete_is_idempotent() -> anyhow::Result<()> {
        let db = get_db().await?;
        seed(&db, &["Ann"]).await?;
        db.delete::<Users>(1).await?;
        db.delete::<Users>(1).await?;
        db.delete::<Users>(999).await?;
        assert_eq!(Users::find().count(db.connection()).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_and_first_row_kept() -> anyhow::Result<()> {
        let db = get_db().await?;
        let first = db.create(UserInput::new("Ann", "dup@x.com", "p").into_active_model()).await?;

        let err = db
            .create(UserInput::new("Other", "dup@x.com", "q").into_active_model())
            .await
            .expect_err("unique email");
        assert!(matches!(err.sql_err(), Some(sea_orm::SqlErr::UniqueConstraintViolation(_))), "{err:?}");

        let rows = db.find_by_field::<Users, _>(user::Column::Email, "dup@x.com").await?;
        assert_eq!(rows, vec![first]);
        Ok(())
    }

    #[tokio::test]
    async fn empty_update_returns_current_row() -> anyhow::Result<()> {
        let db = get_db().await?;
        let ann = seed(&db, &["Ann"]).await?.remove(0);
        let same = db.update(ann.id, UserInput::default().into_active_model()).await?;
        assert_eq!(same, Some(ann));
        Ok(())
    }

    #[tokio::test]
    async fn limit_and_offset_select_a_window() -> anyhow::Result<()> {
        let db = get_db().await?;
        seed(&db, &["A", "B", "C", "D", "E"]).await?;

        let page = db
            .find_many(ListQuery::<Users>::new().order_by(user::Column::Id, Order::Asc).limit(2).offset(2))
            .await?;
        assert_eq!(page.iter().map(|u| u.id).collect::<Vec<_>>(), vec![3, 4]);

        let past_end = db.find_many(ListQuery::<Users>::new().limit(2).offset(10)).await?;
        assert!(past_end.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn search_matches_substrings() -> anyhow::Result<()> {
        let db = get_db().await?;
        seed(&db, &["John", "Major", "Amy"]).await?;

        let rows = db
            .find_many(
                ListQuery::<Users>::new()
                    .search(user::Column::Name, "jo")
                    .order_by(user::Column::Id, Order::Asc),
            )
            .await?;
        assert_eq!(names(&rows), vec!["John", "Major"]);
        Ok(())
    }

    #[tokio::test]
    async fn filter_and_search_must_both_hold() -> anyhow::Result<()> {
        let db = get_db().await?;
        let seeded = seed(&db, &["John", "Major", "Amy"]).await?;

        let hit = db
            .find_many(
                ListQuery::<Users>::new()
                    .filter(Conditions::eq(user::Column::Email, seeded[1].email.clone()))
                    .search(user::Column::Name, "jo"),
            )
            .await?;
        assert_eq!(names(&hit), vec!["Major"]);

        let miss = db
            .find_many(
                ListQuery::<Users>::new()
                    .filter(Conditions::eq(user::Column::Email, seeded[2].email.clone()))
                    .search(user::Column::Name, "jo"),
            )
            .await?;
        assert!(miss.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn alternative_filters_match_any() -> anyhow::Result<()> {
        let db = get_db().await?;
        seed(&db, &["Ann", "Bob", "Cid"]).await?;

        let rows = db
            .find_many(
                ListQuery::<Users>::new()
                    .filter(Conditions::eq(user::Column::Name, "Ann"))
                    .filter(Conditions::eq(user::Column::Name, "Cid"))
                    .order_by(user::Column::Id, Order::Asc),
            )
            .await?;
        assert_eq!(names(&rows), vec!["Ann", "Cid"]);
        Ok(())
    }

    #[tokio::test]
    async fn sort_keys_apply_in_sequence() -> anyhow::Result<()> {
        let db = get_db().await?;
        seed(&db, &["B", "A", "B", "A"]).await?;

        let rows = db
            .find_many(
                ListQuery::<Users>::new()
                    .order_by(user::Column::Name, Order::Asc)
                    .order_by(user::Column::Id, Order::Desc),
            )
            .await?;
        assert_eq!(rows.iter().map(|u| u.id).collect::<Vec<_>>(), vec![4, 2, 3, 1]);
        Ok(())
    }

    #[tokio::test]
    async fn query_list_attaches_has_many_relation() -> anyhow::Result<()> {
        let db = get_db().await?;
        seed(&db, &["Ann", "Bob"]).await?;
        db.create(ProfileInput::for_user(1, "first").into_active_model()).await?;
        db.create(ProfileInput::for_user(1, "second").into_active_model()).await?;

        let records = db
            .query_list(
                QueryOptions::<Users>::new()
                    .include(HasMany::<profile::Entity>::new("profiles"))
                    .order_by(user::Column::Id, Order::Asc),
            )
            .await?;
        assert_eq!(records.len(), 2);

        let ann_profiles = records[0]["profiles"].as_array().unwrap();
        assert_eq!(ann_profiles.len(), 2);
        assert_eq!(ann_profiles[0]["user_id"], 1);
        assert_eq!(records[1]["profiles"], serde_json::json!([]));
        Ok(())
    }

    #[tokio::test]
    async fn query_list_projects_selected_columns() -> anyhow::Result<()> {
        let db = get_db().await?;
        seed(&db, &["Ann"]).await?;

        let records = db
            .query_list(
                QueryOptions::<Users>::new()
                    .select([user::Column::Id, user::Column::Name])
                    .include(HasMany::<profile::Entity>::new("profiles")),
            )
            .await?;
        let record = records[0].as_object().unwrap();
        let mut keys: Vec<_> = record.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(keys, vec!["id", "name", "profiles"]);
        assert_eq!(record["name"], "Ann");
        Ok(())
    }

    #[tokio::test]
    async fn query_list_attaches_owner_object() -> anyhow::Result<()> {
        let db = get_db().await?;
        seed(&db, &["Ann"]).await?;
        db.create(ProfileInput::for_user(1, "bio").into_active_model()).await?;

        let records = db
            .query_list(QueryOptions::<profile::Entity>::new().include(BelongsTo::<user::Entity>::new("user")))
            .await?;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["bio"], "bio");
        assert_eq!(records[0]["user"]["name"], "Ann");
        Ok(())
    }

    #[tokio::test]
    async fn profile_for_missing_user_is_a_foreign_key_violation() -> anyhow::Result<()> {
        let db = get_db().await?;
        let err = db
            .create(ProfileInput::for_user(42, "orphan").into_active_model())
            .await
            .expect_err("dangling user_id");
        assert!(matches!(err.sql_err(), Some(sea_orm::SqlErr::ForeignKeyConstraintViolation(_))), "{err:?}");
        Ok(())
    }
}
