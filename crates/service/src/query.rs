//! Typed options for the generic façade.
//!
//! Every field name is an entity `Column`, so a query can only mention columns the
//! entity actually has. Text coming from the outside world is turned into these types
//! by [`crate::params`].

use std::marker::PhantomData;

use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, LoaderTrait, Order, QueryFilter,
    QueryOrder, QuerySelect, Related, Select, Value,
};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

/// Exact-equality conditions on one entity, AND-combined.
#[derive(Clone, Debug)]
pub struct Conditions<E: EntityTrait> {
    pairs: Vec<(E::Column, Value)>,
}

impl<E: EntityTrait> Default for Conditions<E> {
    fn default() -> Self {
        Self { pairs: Vec::new() }
    }
}

impl<E: EntityTrait> Conditions<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a set with `column = value`.
    pub fn eq(column: E::Column, value: impl Into<Value>) -> Self {
        Self::new().and(column, value)
    }

    /// Add `column = value` to the set.
    pub fn and(mut self, column: E::Column, value: impl Into<Value>) -> Self {
        self.pairs.push((column, value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn into_condition(self) -> Condition {
        self.pairs
            .into_iter()
            .fold(Condition::all(), |cond, (column, value)| cond.add(column.eq(value)))
    }

    /// Restrict `select` to rows matching every pair. An empty set matches everything.
    pub fn apply(self, select: Select<E>) -> Select<E> {
        if self.is_empty() {
            select
        } else {
            select.filter(self.into_condition())
        }
    }
}

/// Largest limit or offset a backend accepts; both are bound as signed 64-bit integers.
pub const MAX_WINDOW: u64 = i64::MAX as u64;

/// Filter, substring search, sort and pagination for a list read.
#[derive(Clone, Debug)]
pub struct ListQuery<E: EntityTrait> {
    /// Alternative condition sets, OR-combined.
    pub filter: Vec<Conditions<E>>,
    /// `column LIKE '%fragment%'`, AND-combined with everything else.
    pub search: Vec<(E::Column, String)>,
    /// Applied left to right; nothing is appended after the last key.
    pub order: Vec<(E::Column, Order)>,
    /// `Some(0)` is treated as unset; capped at [`MAX_WINDOW`].
    pub limit: Option<u64>,
    /// `Some(0)` is treated as unset; capped at [`MAX_WINDOW`].
    pub offset: Option<u64>,
}

impl<E: EntityTrait> Default for ListQuery<E> {
    fn default() -> Self {
        Self { filter: Vec::new(), search: Vec::new(), order: Vec::new(), limit: None, offset: None }
    }
}

impl<E: EntityTrait> ListQuery<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an alternative condition set; rows matching any one set are kept.
    pub fn filter(mut self, conditions: Conditions<E>) -> Self {
        self.filter.push(conditions);
        self
    }

    pub fn search(mut self, column: E::Column, fragment: impl Into<String>) -> Self {
        self.search.push((column, fragment.into()));
        self
    }

    pub fn order_by(mut self, column: E::Column, order: Order) -> Self {
        self.order.push((column, order));
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Forward every option to the SeaORM select builder.
    pub fn apply(self, mut select: Select<E>) -> Select<E> {
        // an empty alternative matches every row, which makes the whole OR trivially true
        if !self.filter.is_empty() && self.filter.iter().all(|c| !c.is_empty()) {
            let any = self
                .filter
                .into_iter()
                .fold(Condition::any(), |any, conditions| any.add(conditions.into_condition()));
            select = select.filter(any);
        }
        for (column, fragment) in self.search {
            select = select.filter(column.contains(&fragment));
        }
        for (column, order) in self.order {
            select = select.order_by(column, order);
        }
        if let Some(limit) = self.limit.filter(|n| *n > 0) {
            select = select.limit(limit.min(MAX_WINDOW));
        }
        if let Some(offset) = self.offset.filter(|n| *n > 0) {
            select = select.offset(offset.min(MAX_WINDOW));
        }
        select
    }
}

/// Eagerly loads one named relation for a page of parent rows.
#[async_trait]
pub trait RelationLoader<E: EntityTrait>: Send + Sync {
    /// Key under which the loaded value is attached to each parent record.
    fn name(&self) -> &str;

    /// Exactly one JSON value per parent, in parent order.
    async fn load(&self, db: &DatabaseConnection, parents: &[E::Model]) -> Result<Vec<JsonValue>, DbErr>;
}

/// One-to-many relation, attached as an array (empty when there are no children).
pub struct HasMany<R> {
    name: &'static str,
    related: PhantomData<fn() -> R>,
}

impl<R> HasMany<R> {
    pub fn new(name: &'static str) -> Self {
        Self { name, related: PhantomData }
    }
}

#[async_trait]
impl<E, R> RelationLoader<E> for HasMany<R>
where
    E: EntityTrait + Related<R>,
    E::Model: Sync,
    R: EntityTrait,
    R::Model: Serialize + Sync,
{
    fn name(&self) -> &str {
        self.name
    }

    async fn load(&self, db: &DatabaseConnection, parents: &[E::Model]) -> Result<Vec<JsonValue>, DbErr> {
        let children = parents.load_many(R::default(), db).await?;
        children.iter().map(to_json).collect()
    }
}

/// Many-to-one relation, attached as an object or `null`.
pub struct BelongsTo<R> {
    name: &'static str,
    related: PhantomData<fn() -> R>,
}

impl<R> BelongsTo<R> {
    pub fn new(name: &'static str) -> Self {
        Self { name, related: PhantomData }
    }
}

#[async_trait]
impl<E, R> RelationLoader<E> for BelongsTo<R>
where
    E: EntityTrait + Related<R>,
    E::Model: Sync,
    R: EntityTrait,
    R::Model: Serialize + Sync,
{
    fn name(&self) -> &str {
        self.name
    }

    async fn load(&self, db: &DatabaseConnection, parents: &[E::Model]) -> Result<Vec<JsonValue>, DbErr> {
        let owners = parents.load_one(R::default(), db).await?;
        owners.iter().map(to_json).collect()
    }
}

/// Entities whose relations can be requested by name.
pub trait Includable: EntityTrait {
    fn relation(name: &str) -> Option<Box<dyn RelationLoader<Self>>>;

    /// Columns that never leave the service: they cannot be selected, filtered,
    /// searched or sorted on through textual list parameters.
    fn is_private(_column: &Self::Column) -> bool {
        false
    }
}

/// Full option set of [`crate::database::DatabaseService::query_list`].
pub struct QueryOptions<E: EntityTrait> {
    /// Columns kept in each record; empty keeps all of them.
    pub select: Vec<E::Column>,
    pub relations: Vec<Box<dyn RelationLoader<E>>>,
    pub query: ListQuery<E>,
}

impl<E: EntityTrait> Default for QueryOptions<E> {
    fn default() -> Self {
        Self { select: Vec::new(), relations: Vec::new(), query: ListQuery::default() }
    }
}

impl<E: EntityTrait> QueryOptions<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(mut self, columns: impl IntoIterator<Item = E::Column>) -> Self {
        self.select.extend(columns);
        self
    }

    pub fn include(self, loader: impl RelationLoader<E> + 'static) -> Self {
        self.include_boxed(Box::new(loader))
    }

    pub fn include_boxed(mut self, loader: Box<dyn RelationLoader<E>>) -> Self {
        self.relations.push(loader);
        self
    }

    pub fn query(mut self, query: ListQuery<E>) -> Self {
        self.query = query;
        self
    }

    pub fn filter(mut self, conditions: Conditions<E>) -> Self {
        self.query = self.query.filter(conditions);
        self
    }

    pub fn search(mut self, column: E::Column, fragment: impl Into<String>) -> Self {
        self.query = self.query.search(column, fragment);
        self
    }

    pub fn order_by(mut self, column: E::Column, order: Order) -> Self {
        self.query = self.query.order_by(column, order);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.query = self.query.limit(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.query = self.query.offset(offset);
        self
    }
}

pub(crate) fn to_json<T: Serialize>(value: &T) -> Result<JsonValue, DbErr> {
    serde_json::to_value(value).map_err(|e| DbErr::Json(e.to_string()))
}

/// Keep only the selected columns. Serialized field names equal column names.
pub(crate) fn project<C: ColumnTrait>(record: &mut Map<String, JsonValue>, select: &[C]) {
    if select.is_empty() {
        return;
    }
    record.retain(|key, _| select.iter().any(|column| column.as_str() == key));
}
