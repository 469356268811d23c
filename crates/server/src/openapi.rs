use utoipa::{IntoParams, OpenApi, ToSchema};

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

/// The stored password is never returned.
#[derive(ToSchema)]
pub struct UserDoc { pub id: i32, pub name: String, pub email: String }

/// Every field is optional; absent fields are not written.
#[derive(ToSchema)]
pub struct UserInputDoc { pub name: Option<String>, pub email: Option<String>, pub password: Option<String> }

#[derive(ToSchema)]
pub struct ProfileDoc { pub id: i32, pub bio: Option<String>, pub photo: Option<String>, pub user_id: i32 }

#[derive(ToSchema)]
pub struct ProfileInputDoc { pub bio: Option<String>, pub photo: Option<String>, pub user_id: Option<i32> }

#[derive(ToSchema)]
pub struct ErrorBody { pub error: String, pub detail: Option<String> }

/// List parameters. Any other key is an exact-match condition on the column of that name.
#[allow(dead_code)]
#[derive(IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParamsDoc {
    /// Comma-separated columns to keep, e.g. `id,name`; `password` is not selectable
    select: Option<String>,
    /// Comma-separated relations to attach (`profiles` on users, `user` on profiles)
    relations: Option<String>,
    /// `field:text` pairs matched with LIKE '%text%'
    search: Option<String>,
    /// `field:asc|desc` pairs, applied in order
    order: Option<String>,
    /// At most 9223372036854775807
    limit: Option<u64>,
    /// At most 9223372036854775807
    offset: Option<u64>,
    /// 1-based page; used only when neither limit nor offset is given
    page: Option<u32>,
    per_page: Option<u32>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::users::create,
        crate::routes::users::list,
        crate::routes::users::get,
        crate::routes::users::update,
        crate::routes::users::delete,
        crate::routes::profiles::create,
        crate::routes::profiles::list,
        crate::routes::profiles::get,
        crate::routes::profiles::update,
        crate::routes::profiles::delete,
    ),
    components(
        schemas(
            HealthResponse,
            UserDoc,
            UserInputDoc,
            ProfileDoc,
            ProfileInputDoc,
            ErrorBody,
        )
    ),
    tags(
        (name = "health"),
        (name = "users"),
        (name = "profiles")
    )
)]
pub struct ApiDoc;
