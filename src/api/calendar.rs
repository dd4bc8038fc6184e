use rocket::State;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::{Deserialize, json::Json};
use sqlx::{Pool, Sqlite};
use validator::Validate;

use super::{parse_date, resolve_cohort};
use crate::auth::{Permission, Person, Role, normalize_department, normalize_year};
use crate::db::{
    create_important_date, create_syllabus, create_timetable_entry, delete_important_date,
    delete_syllabus, delete_timetable_entry, get_person, get_syllabus, list_important_dates,
    list_timetable, update_syllabus_subjects,
};
use crate::error::AppError;
use crate::models::{
    DateCategory, ImportantDate, NewImportantDate, NewTimetableEntry, Syllabus, SyllabusSubject,
    TimetableEntry,
};
use crate::validation::{ApiResult, JsonValidateExt};

const DAYS: [&str; 6] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

const TERM_TESTS: [&str; 2] = ["TT1", "TT2"];

fn check_term_test(term_test: &str) -> Result<String, AppError> {
    let term_test = term_test.trim().to_ascii_uppercase();
    if TERM_TESTS.contains(&term_test.as_str()) {
        Ok(term_test)
    } else {
        Err(AppError::Validation(
            "termTest must be TT1 or TT2".to_string(),
        ))
    }
}

#[derive(FromForm, Debug)]
pub struct CohortParams {
    department: Option<String>,
    year: Option<String>,
    division: Option<String>,
}

#[get("/important-dates?<category>&<cohort..>")]
pub async fn api_list_important_dates(
    category: Option<&str>,
    cohort: CohortParams,
    person: Person,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Json<Vec<ImportantDate>>> {
    person.require_permission(Permission::ViewCohortCalendar)?;

    let cohort = resolve_cohort(
        &person,
        cohort.department.as_deref(),
        cohort.year.as_deref(),
        cohort.division.as_deref(),
    )?;
    let category = category.map(str::parse::<DateCategory>).transpose()?;

    let dates = list_important_dates(
        db,
        &cohort.department,
        &cohort.year,
        &cohort.division,
        category,
    )
    .await?;

    Ok(Json(dates))
}

#[derive(Deserialize, Validate, Debug)]
pub struct ImportantDateRequest {
    department: String,
    year: String,
    #[validate(length(min = 1, message = "Division is required"))]
    division: String,
    date: String,
    #[validate(length(min = 1, message = "Event is required"))]
    event: String,
    category: DateCategory,
    #[serde(default)]
    description: String,
}

#[post("/important-dates", data = "<request>")]
pub async fn api_create_important_date(
    request: Json<ImportantDateRequest>,
    person: Person,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Custom<Json<ImportantDate>>> {
    person.require_permission(Permission::ManageCalendar)?;
    let request = request.validate_custom()?;

    let date = parse_date("date", Some(&request.date))?
        .ok_or_else(|| AppError::Validation("date is required".to_string()))?;

    let created = create_important_date(
        db,
        &NewImportantDate {
            department: normalize_department(&request.department),
            year: normalize_year(&request.year),
            division: request.division.trim().to_string(),
            date,
            event: request.event,
            category: request.category,
            description: request.description,
        },
    )
    .await?;

    Ok(Custom(Status::Created, Json(created)))
}

#[delete("/important-dates/<id>")]
pub async fn api_delete_important_date(
    id: i64,
    person: Person,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Status> {
    person.require_permission(Permission::ManageCalendar)?;
    delete_important_date(db, id).await?;
    Ok(Status::NoContent)
}

#[get("/timetable?<day>&<cohort..>")]
pub async fn api_list_timetable(
    day: Option<&str>,
    cohort: CohortParams,
    person: Person,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Json<Vec<TimetableEntry>>> {
    person.require_permission(Permission::ViewCohortCalendar)?;

    let cohort = resolve_cohort(
        &person,
        cohort.department.as_deref(),
        cohort.year.as_deref(),
        cohort.division.as_deref(),
    )?;

    let entries = list_timetable(
        db,
        &cohort.department,
        &cohort.year,
        &cohort.division,
        day,
    )
    .await?;

    Ok(Json(entries))
}

#[derive(Deserialize, Validate, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TimetableRequest {
    department: String,
    year: String,
    #[validate(length(min = 1, message = "Division is required"))]
    division: String,
    day: String,
    #[validate(length(min = 1, message = "Time is required"))]
    time: String,
    #[validate(length(min = 1, message = "Subject is required"))]
    subject: String,
    teacher_id: Option<i64>,
    #[serde(default)]
    room: String,
}

#[post("/timetable", data = "<request>")]
pub async fn api_create_timetable_entry(
    request: Json<TimetableRequest>,
    person: Person,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Custom<Json<Vec<TimetableEntry>>>> {
    person.require_permission(Permission::ManageCalendar)?;
    let request = request.validate_custom()?;

    if !DAYS.contains(&request.day.as_str()) {
        return Err(AppError::Validation("day must be Monday to Saturday".to_string()).into());
    }

    if let Some(teacher_id) = request.teacher_id {
        let teacher = get_person(db, teacher_id).await?;
        if teacher.role() != Role::Teacher {
            return Err(
                AppError::Validation(format!("Person {} is not a teacher", teacher_id)).into(),
            );
        }
    }

    let entry = NewTimetableEntry {
        department: normalize_department(&request.department),
        year: normalize_year(&request.year),
        division: request.division.trim().to_string(),
        day: request.day,
        time: request.time,
        subject: request.subject,
        teacher_id: request.teacher_id,
        room: request.room,
    };
    create_timetable_entry(db, &entry).await?;

    let day_entries = list_timetable(
        db,
        &entry.department,
        &entry.year,
        &entry.division,
        Some(&entry.day),
    )
    .await?;

    Ok(Custom(Status::Created, Json(day_entries)))
}

#[delete("/timetable/<id>")]
pub async fn api_delete_timetable_entry(
    id: i64,
    person: Person,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Status> {
    person.require_permission(Permission::ManageCalendar)?;
    delete_timetable_entry(db, id).await?;
    Ok(Status::NoContent)
}

#[get("/syllabus/<department>/<year>/<term_test>")]
pub async fn api_get_syllabus(
    department: &str,
    year: &str,
    term_test: &str,
    person: Person,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Json<Syllabus>> {
    person.require_permission(Permission::ViewSyllabus)?;

    let syllabus = get_syllabus(
        db,
        &normalize_department(department),
        &normalize_year(year),
        &check_term_test(term_test)?,
    )
    .await?;

    Ok(Json(syllabus))
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SyllabusRequest {
    department: String,
    year: String,
    term_test: String,
    #[serde(default)]
    subjects: Vec<SyllabusSubject>,
}

#[post("/syllabus", data = "<request>")]
pub async fn api_create_syllabus(
    request: Json<SyllabusRequest>,
    person: Person,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Custom<Json<Syllabus>>> {
    person.require_permission(Permission::ManageCalendar)?;

    let syllabus = create_syllabus(
        db,
        &normalize_department(&request.department),
        &normalize_year(&request.year),
        &check_term_test(&request.term_test)?,
        &request.subjects,
    )
    .await?;

    Ok(Custom(Status::Created, Json(syllabus)))
}

#[derive(Deserialize, Debug)]
pub struct SyllabusSubjectsRequest {
    subjects: Vec<SyllabusSubject>,
}

#[put("/syllabus/<department>/<year>/<term_test>", data = "<request>")]
pub async fn api_update_syllabus(
    department: &str,
    year: &str,
    term_test: &str,
    request: Json<SyllabusSubjectsRequest>,
    person: Person,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Json<Syllabus>> {
    person.require_permission(Permission::ManageCalendar)?;

    let syllabus = update_syllabus_subjects(
        db,
        &normalize_department(department),
        &normalize_year(year),
        &check_term_test(term_test)?,
        &request.subjects,
    )
    .await?;

    Ok(Json(syllabus))
}

#[delete("/syllabus/<department>/<year>/<term_test>")]
pub async fn api_delete_syllabus(
    department: &str,
    year: &str,
    term_test: &str,
    person: Person,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Status> {
    person.require_permission(Permission::ManageCalendar)?;

    delete_syllabus(
        db,
        &normalize_department(department),
        &normalize_year(year),
        &check_term_test(term_test)?,
    )
    .await?;

    Ok(Status::NoContent)
}
