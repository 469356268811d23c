//! Textual list parameters (as found in a query string) turned into [`QueryOptions`].
//!
//! Every field and relation name is checked against the entity before any SQL is built.
//! Recognised keys: `select`, `relations`, `search`, `order`, `limit`, `offset`, `page`,
//! `per_page`. Every other key is an exact-match condition on the column of that name.

use std::{collections::HashMap, str::FromStr};

use sea_orm::{ColumnTrait, ColumnType, EntityTrait, Order, Value};

use crate::{
    errors::ServiceError,
    pagination::Pagination,
    query::{Conditions, Includable, QueryOptions, MAX_WINDOW},
};

const RESERVED: &[&str] = &["select", "relations", "search", "order", "limit", "offset", "page", "per_page"];

pub fn parse_list_params<E: Includable>(params: &HashMap<String, String>) -> Result<QueryOptions<E>, ServiceError> {
    let mut options = QueryOptions::<E>::new();

    if let Some(raw) = params.get("select") {
        let columns = split_list(raw).map(column::<E>).collect::<Result<Vec<_>, _>>()?;
        options = options.select(columns);
    }

    if let Some(raw) = params.get("relations") {
        for name in split_list(raw) {
            let loader =
                E::relation(name).ok_or_else(|| ServiceError::validation(format!("unknown relation `{name}`")))?;
            options = options.include_boxed(loader);
        }
    }

    // sorted so the generated SQL does not depend on map iteration order
    let mut filters: Vec<(&String, &String)> =
        params.iter().filter(|(key, _)| !RESERVED.contains(&key.as_str())).collect();
    filters.sort();
    let mut conditions = Conditions::<E>::new();
    for (key, raw) in filters {
        let col = column::<E>(key)?;
        conditions = conditions.and(col, typed_value(col, raw)?);
    }
    if !conditions.is_empty() {
        options = options.filter(conditions);
    }

    if let Some(raw) = params.get("search") {
        for item in split_list(raw) {
            let (name, fragment) = item
                .split_once(':')
                .ok_or_else(|| ServiceError::validation(format!("search term `{item}` must look like field:text")))?;
            options = options.search(column::<E>(name.trim())?, fragment);
        }
    }

    if let Some(raw) = params.get("order") {
        for item in split_list(raw) {
            let (name, direction) = item.split_once(':').unwrap_or((item, "asc"));
            let order = match direction.trim().to_ascii_lowercase().as_str() {
                "asc" => Order::Asc,
                "desc" => Order::Desc,
                other => return Err(ServiceError::validation(format!("unknown sort direction `{other}`"))),
            };
            options = options.order_by(column::<E>(name.trim())?, order);
        }
    }

    let limit = window(params, "limit")?;
    let offset = window(params, "offset")?;
    if limit.is_none() && offset.is_none() && (params.contains_key("page") || params.contains_key("per_page")) {
        let defaults = Pagination::default();
        let pagination = Pagination {
            page: number(params, "page")?.unwrap_or(defaults.page),
            per_page: number(params, "per_page")?.unwrap_or(defaults.per_page),
        };
        let (limit, offset) = pagination.limit_offset();
        options = options.limit(limit).offset(offset);
    } else {
        if let Some(limit) = limit {
            options = options.limit(limit);
        }
        if let Some(offset) = offset {
            options = options.offset(offset);
        }
    }

    Ok(options)
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|s| !s.is_empty())
}

fn column<E: Includable>(name: &str) -> Result<E::Column, ServiceError> {
    name.parse::<E::Column>()
        .ok()
        .filter(|col| !E::is_private(col))
        .ok_or_else(|| ServiceError::validation(format!("unknown field `{name}`")))
}

fn window(params: &HashMap<String, String>, key: &str) -> Result<Option<u64>, ServiceError> {
    match number::<u64>(params, key)? {
        Some(n) if n > MAX_WINDOW => Err(ServiceError::validation(format!("`{key}` must be at most {MAX_WINDOW}"))),
        n => Ok(n),
    }
}

fn number<T: FromStr>(params: &HashMap<String, String>, key: &str) -> Result<Option<T>, ServiceError> {
    params
        .get(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|_| ServiceError::validation(format!("`{key}` must be a non-negative integer")))
        })
        .transpose()
}

/// Parse a raw value according to the column's declared type.
fn typed_value<C: ColumnTrait>(column: C, raw: &str) -> Result<Value, ServiceError> {
    let value = match column.def().get_column_type() {
        ColumnType::TinyInteger => raw.parse::<i8>().ok().map(Value::from),
        ColumnType::SmallInteger => raw.parse::<i16>().ok().map(Value::from),
        ColumnType::Integer => raw.parse::<i32>().ok().map(Value::from),
        ColumnType::BigInteger => raw.parse::<i64>().ok().map(Value::from),
        ColumnType::Boolean => raw.parse::<bool>().ok().map(Value::from),
        _ => Some(Value::from(raw.to_owned())),
    };
    value.ok_or_else(|| ServiceError::validation(format!("`{raw}` is not a valid value for `{}`", column.as_str())))
}
