use rocket::State;
use rocket::serde::{Deserialize, json::Json};
use sqlx::{Pool, Sqlite};
use validator::Validate;

use crate::auth::{Action, Permission, Person, RecordScope, Role};
use crate::db::{get_person, list_marks, upsert_marks};
use crate::error::AppError;
use crate::models::MarksRecord;
use crate::stats::MarksComponents;
use crate::validation::{ApiResult, FieldErrors, JsonValidateExt};

#[derive(Deserialize, Validate, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RecordMarksRequest {
    student_id: i64,
    subject: Option<String>,
    #[validate(length(min = 1, message = "Term is required"))]
    term: String,
    term_test1: i64,
    term_test2: i64,
    end_sem: i64,
}

#[post("/marks", data = "<request>")]
pub async fn api_record_marks(
    request: Json<RecordMarksRequest>,
    person: Person,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Json<MarksRecord>> {
    person.require_permission(Permission::RecordMarks)?;
    let request = request.validate_custom()?;

    let term = request.term.trim();
    if term.is_empty() {
        let mut errors = FieldErrors::new();
        errors.add("term", "required", "Term is required");
        errors.into_result()?;
    }

    let components =
        MarksComponents::new(request.term_test1, request.term_test2, request.end_sem)?;

    let student = get_person(db, request.student_id).await?;
    if student.role() != Role::Student {
        return Err(AppError::Validation(format!("Person {} is not a student", student.id)).into());
    }

    let subject = request
        .subject
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or(person.subject())
        .ok_or_else(|| AppError::Validation("subject is required".to_string()))?;

    person.require_access(
        Action::Write,
        &RecordScope::for_student(&student, Some(subject)),
    )?;

    let record = upsert_marks(
        db,
        person.id,
        &student,
        subject,
        term,
        components,
    )
    .await?;

    Ok(Json(record))
}

#[derive(FromForm, Debug)]
pub struct StudentMarksParams {
    term: Option<String>,
}

#[get("/students/<id>/marks?<params..>")]
pub async fn api_student_marks(
    id: i64,
    params: StudentMarksParams,
    person: Person,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Json<Vec<MarksRecord>>> {
    if person.id == id {
        person.require_permission(Permission::ViewOwnMarks)?;
    }

    let student = get_person(db, id).await?;
    person.require_access(Action::Read, &student)?;

    let marks = list_marks(db, student.id, params.term.as_deref()).await?;
    for record in &marks {
        person.require_access(Action::Read, record)?;
    }

    Ok(Json(marks))
}
