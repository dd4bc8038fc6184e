use rocket::State;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::{Deserialize, json::Json};
use sqlx::{Pool, Sqlite};

use super::resolve_cohort;
use crate::auth::{
    Action, NewPerson, Permission, Person, PersonStatus, Registration, Role, normalize_department,
    normalize_year,
};
use crate::db::{PersonFilter, create_person, delete_person, list_persons, set_person_status};
use crate::error::AppError;
use crate::validation::ApiResult;

#[derive(FromForm, Debug)]
pub struct UserQueryParams {
    role: Option<String>,
    department: Option<String>,
    year: Option<String>,
    division: Option<String>,
    status: Option<String>,
    search: Option<String>,
}

impl TryFrom<UserQueryParams> for PersonFilter {
    type Error = AppError;

    fn try_from(params: UserQueryParams) -> Result<Self, Self::Error> {
        Ok(Self {
            role: params.role.as_deref().map(str::parse).transpose()?,
            department: params.department.as_deref().map(normalize_department),
            year: params.year.as_deref().map(normalize_year),
            division: params.division,
            status: params.status.as_deref().map(str::parse).transpose()?,
            search: params.search,
        })
    }
}

#[get("/admin/users?<params..>")]
pub async fn api_list_users(
    params: UserQueryParams,
    person: Person,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Json<Vec<Person>>> {
    person.require_permission(Permission::ManageUsers)?;

    let filter = PersonFilter::try_from(params)?;
    let persons = list_persons(db, &filter).await?;

    Ok(Json(persons))
}

#[post("/admin/users", data = "<registration>")]
pub async fn api_create_user(
    registration: Json<Registration>,
    person: Person,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Custom<Json<Person>>> {
    person.require_permission(Permission::RegisterUsers)?;

    let registration = registration.into_inner();
    let new_person = NewPerson::try_from(&registration)?;
    let created = create_person(db, &new_person, &registration.password).await?;

    tracing::info!(
        admin_id = %person.id,
        person_id = %created.id,
        role = %created.role(),
        "Admin registered person"
    );

    Ok(Custom(Status::Created, Json(created)))
}

#[derive(Deserialize)]
pub struct StatusUpdateRequest {
    status: String,
}

#[put("/admin/users/<id>/status", data = "<update>")]
pub async fn api_set_user_status(
    id: i64,
    update: Json<StatusUpdateRequest>,
    person: Person,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Json<Person>> {
    person.require_permission(Permission::ManageUsers)?;

    let status: PersonStatus = update.status.parse()?;
    if id == person.id && status == PersonStatus::Inactive {
        return Err(AppError::Validation("Admins cannot deactivate themselves".to_string()).into());
    }

    let updated = set_person_status(db, id, status).await?;

    Ok(Json(updated))
}

#[delete("/admin/users/<id>")]
pub async fn api_delete_user(
    id: i64,
    person: Person,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Status> {
    person.require_permission(Permission::ManageUsers)?;

    if id == person.id {
        return Err(AppError::Validation("Admins cannot delete themselves".to_string()).into());
    }

    delete_person(db, id).await?;

    Ok(Status::NoContent)
}

#[derive(FromForm, Debug)]
pub struct StudentQueryParams {
    department: Option<String>,
    year: Option<String>,
    division: Option<String>,
    search: Option<String>,
}

/// Active students visible to the caller: a teacher's own cohort, or any
/// cohort for an admin. A teacher naming another cohort is refused.
#[get("/students?<params..>")]
pub async fn api_list_students(
    params: StudentQueryParams,
    person: Person,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Json<Vec<Person>>> {
    person.require_permission(Permission::ViewCohortStudents)?;

    let mut filter = match person.role() {
        Role::Admin => PersonFilter {
            role: Some(Role::Student),
            department: params.department.as_deref().map(normalize_department),
            year: params.year.as_deref().map(normalize_year),
            division: params.division,
            status: Some(PersonStatus::Active),
            search: None,
        },
        _ => {
            let cohort = resolve_cohort(
                &person,
                params.department.as_deref(),
                params.year.as_deref(),
                params.division.as_deref(),
            )?;
            PersonFilter::active_students(&cohort.department, &cohort.year, &cohort.division)
        }
    };
    filter.search = params.search;

    let students = list_persons(db, &filter).await?;
    for student in &students {
        person.require_access(Action::Read, student)?;
    }

    Ok(Json(students))
}
