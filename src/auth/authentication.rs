use rocket::Request;
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use serde_json::{Value, json};
use sqlx::SqlitePool;

use crate::db::{get_person, get_session_by_token};

use super::Person;

pub const SESSION_COOKIE: &str = "session_token";

/// The caller is re-read from the store on every request, so role and
/// cohort changes made by an admin take effect immediately.
#[rocket::async_trait]
impl<'r> FromRequest<'r> for Person {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let auth_span = tracing::info_span!("person_auth_guard");
        let _guard = auth_span.enter();

        let token = request
            .cookies()
            .get_private(SESSION_COOKIE)
            .map(|c| c.value().to_string());

        let Some(token) = token else {
            return Outcome::Error((Status::Unauthorized, ()));
        };

        let Some(db) = request.rocket().state::<SqlitePool>() else {
            tracing::error!("Database pool not found in managed state");
            return Outcome::Error((Status::InternalServerError, ()));
        };

        let session = match get_session_by_token(db, &token).await {
            Ok(session) => session,
            Err(err) => {
                tracing::warn!(error = ?err, "Invalid session token");
                return Outcome::Error((Status::Unauthorized, ()));
            }
        };

        if !session.is_valid() {
            tracing::warn!(session_id = %session.id, "Session token expired");
            return Outcome::Error((Status::Unauthorized, ()));
        }

        match get_person(db, session.user_id).await {
            Ok(person) if person.is_active() => {
                tracing::info!(person_id = %person.id, role = %person.role(), "Person authenticated via session token");
                Outcome::Success(person)
            }
            Ok(person) => {
                tracing::warn!(person_id = %person.id, "Inactive person presented a session");
                Outcome::Error((Status::Forbidden, ()))
            }
            Err(err) => {
                tracing::warn!(user_id = %session.user_id, error = ?err, "Session refers to a missing person");
                Outcome::Error((Status::Unauthorized, ()))
            }
        }
    }
}

#[catch(401)]
pub fn unauthorized_api(_req: &Request) -> Custom<Json<Value>> {
    let error_json = json!({
        "error": "Unauthorized",
        "message": "Authentication required"
    });

    Custom(Status::Unauthorized, Json(error_json))
}

#[catch(403)]
pub fn forbidden_api(_req: &Request) -> Custom<Json<Value>> {
    tracing::warn!("Forbidden access attempt");
    let error_json = json!({
        "error": "Forbidden",
        "message": "You don't have permission to perform this action"
    });

    Custom(Status::Forbidden, Json(error_json))
}

#[catch(404)]
pub fn not_found_api(req: &Request) -> Custom<Json<Value>> {
    let error_json = json!({
        "error": "NotFound",
        "message": format!("No route for {}", req.uri())
    });

    Custom(Status::NotFound, Json(error_json))
}
