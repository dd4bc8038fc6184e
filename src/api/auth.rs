use chrono::Utc;
use rocket::State;
use rocket::http::{Cookie, CookieJar, SameSite, Status};
use rocket::response::status::Custom;
use rocket::serde::{Deserialize, Serialize, json::Json};
use sqlx::{Pool, Sqlite};
use validator::Validate;

use crate::auth::{
    NewPerson, Permission, Person, Registration, Role, SESSION_COOKIE, UserSession,
};
use crate::db::{authenticate_person, create_person, create_session, invalidate_session};
use crate::env::PortalConfig;
use crate::error::AppError;
use crate::validation::{ApiResult, JsonValidateExt};

#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    role: String,
    #[validate(length(min = 1, message = "Identifier is required"))]
    identifier: String,
    #[validate(length(min = 1, message = "Password is required"))]
    password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub user: Option<Person>,
    pub error: Option<String>,
}

#[post("/login", data = "<login>")]
pub async fn api_login(
    login: Json<LoginRequest>,
    cookies: &CookieJar<'_>,
    db: &State<Pool<Sqlite>>,
    config: &State<PortalConfig>,
) -> ApiResult<Json<LoginResponse>> {
    let validated = login.validate_custom()?;
    let role: Role = validated.role.parse()?;

    match authenticate_person(db, role, validated.identifier.trim(), &validated.password).await? {
        Some(person) => {
            let token = UserSession::generate_token();
            let expires_at = Utc::now() + chrono::Duration::hours(config.session_ttl_hours);

            create_session(db, person.id, &token, expires_at.naive_utc()).await?;

            let cookie = Cookie::build((SESSION_COOKIE, token))
                .same_site(SameSite::Lax)
                .http_only(true)
                .max_age(rocket::time::Duration::hours(config.session_ttl_hours));
            cookies.add_private(cookie);

            Ok(Json(LoginResponse {
                success: true,
                user: Some(person),
                error: None,
            }))
        }
        None => Ok(Json(LoginResponse {
            success: false,
            user: None,
            error: Some("Invalid credentials".to_string()),
        })),
    }
}

#[post("/logout")]
pub async fn api_logout(cookies: &CookieJar<'_>, db: &State<Pool<Sqlite>>) -> Status {
    let token = cookies
        .get_private(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string());

    if let Some(token) = token {
        if let Err(err) = invalidate_session(db, &token).await {
            err.log_and_record("Logout");
        }
    }

    cookies.remove_private(Cookie::build(SESSION_COOKIE));

    Status::NoContent
}

#[get("/me")]
pub async fn api_me(person: Person) -> ApiResult<Json<Person>> {
    person.require_permission(Permission::ViewOwnProfile)?;
    Ok(Json(person))
}

#[get("/me", rank = 2)]
pub async fn api_me_unauthorized() -> Status {
    Status::Unauthorized
}

/// Open self-registration. Only students may sign themselves up; staff
/// accounts are created by an admin.
#[post("/register", data = "<registration>")]
pub async fn api_register(
    registration: Json<Registration>,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Custom<Json<Person>>> {
    let registration = registration.into_inner();

    let role: Role = registration.role.parse()?;
    if role != Role::Student {
        return Err(AppError::Authorization(
            "Only students can self-register".to_string(),
        )
        .into());
    }

    let new_person = NewPerson::try_from(&registration)?;
    let person = create_person(db, &new_person, &registration.password).await?;

    Ok(Custom(Status::Created, Json(person)))
}

#[get("/health")]
pub fn health() -> &'static str {
    "OK"
}
