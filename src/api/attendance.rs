use rocket::State;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::{Deserialize, Serialize, json::Json};
use sqlx::{Pool, Sqlite};
use validator::Validate;

use super::{parse_date, resolve_cohort};
use crate::auth::{Action, Permission, Person, RecordScope, Role};
use crate::db::{
    AttendanceQuery, get_attendance_record, get_person, insert_attendance_batch, list_attendance,
    update_attendance_status,
};
use crate::error::AppError;
use crate::models::{AttendanceRecord, AttendanceStatus, NewAttendance};
use crate::stats::{
    AttendanceFilter, AttendanceStats, SubjectStats, compute_student_stats,
    compute_subject_breakdown,
};
use crate::validation::{ApiResult, JsonValidateExt};

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEntry {
    student_id: i64,
    status: AttendanceStatus,
    date: String,
    subject: Option<String>,
}

#[derive(Deserialize, Validate, Debug)]
pub struct MarkAttendanceRequest {
    #[validate(length(min = 1, message = "At least one entry is required"))]
    entries: Vec<AttendanceEntry>,
}

/// Marks a batch of attendance. Every entry must pass the access gate for
/// writing before anything is stored, and the batch is stored all or nothing.
#[post("/attendance", data = "<request>")]
pub async fn api_mark_attendance(
    request: Json<MarkAttendanceRequest>,
    person: Person,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Custom<Json<Vec<AttendanceRecord>>>> {
    person.require_permission(Permission::MarkAttendance)?;
    let request = request.validate_custom()?;

    let mut entries = Vec::with_capacity(request.entries.len());

    for entry in &request.entries {
        let student = get_person(db, entry.student_id).await?;
        if student.role() != Role::Student {
            return Err(AppError::Validation(format!(
                "Person {} is not a student",
                student.id
            ))
            .into());
        }

        let subject = entry
            .subject
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .or(person.subject())
            .ok_or_else(|| AppError::Validation("subject is required".to_string()))?
            .to_string();

        let date = parse_date("date", Some(&entry.date))?
            .ok_or_else(|| AppError::Validation("date is required".to_string()))?;

        person.require_access(
            Action::Write,
            &RecordScope::for_student(&student, Some(&subject)),
        )?;

        entries.push(NewAttendance {
            student_id: student.id,
            subject,
            date,
            status: entry.status,
            department: student.department.clone(),
            year: student.year.clone(),
            division: student.division.clone(),
        });
    }

    let records = insert_attendance_batch(db, person.id, &entries).await?;

    Ok(Custom(Status::Created, Json(records)))
}

#[derive(Deserialize)]
pub struct EditAttendanceRequest {
    status: AttendanceStatus,
}

#[put("/attendance/<id>", data = "<update>")]
pub async fn api_edit_attendance(
    id: i64,
    update: Json<EditAttendanceRequest>,
    person: Person,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Json<AttendanceRecord>> {
    person.require_permission(Permission::EditAttendance)?;

    let record = get_attendance_record(db, id).await?;
    person.require_access(Action::Write, &record)?;

    let updated = update_attendance_status(db, id, update.status).await?;

    Ok(Json(updated))
}

#[derive(FromForm, Debug)]
pub struct ClassAttendanceParams {
    department: Option<String>,
    year: Option<String>,
    division: Option<String>,
    subject: Option<String>,
    date: Option<String>,
    from: Option<String>,
    to: Option<String>,
}

/// Attendance of one cohort, optionally narrowed to a subject and a day or
/// date range.
#[get("/attendance?<params..>")]
pub async fn api_class_attendance(
    params: ClassAttendanceParams,
    person: Person,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Json<Vec<AttendanceRecord>>> {
    person.require_permission(Permission::ViewCohortStudents)?;

    let cohort = resolve_cohort(
        &person,
        params.department.as_deref(),
        params.year.as_deref(),
        params.division.as_deref(),
    )?;

    let date = parse_date("date", params.date.as_deref())?;
    let query = AttendanceQuery {
        student_id: None,
        department: Some(cohort.department),
        year: Some(cohort.year),
        division: Some(cohort.division),
        subject: params.subject,
        from: date.or(parse_date("from", params.from.as_deref())?),
        to: date.or(parse_date("to", params.to.as_deref())?),
        semester: None,
    };

    let records = list_attendance(db, &query).await?;
    for record in &records {
        person.require_access(Action::Read, record)?;
    }

    Ok(Json(records))
}

#[derive(FromForm, Debug)]
pub struct StudentAttendanceParams {
    subject: Option<String>,
    from: Option<String>,
    to: Option<String>,
    semester: Option<String>,
}

#[derive(Serialize)]
pub struct StudentAttendanceResponse {
    pub student: Person,
    pub records: Vec<AttendanceRecord>,
    pub statistics: AttendanceStats,
    pub subjects: Vec<SubjectStats>,
}

#[get("/students/<id>/attendance?<params..>")]
pub async fn api_student_attendance(
    id: i64,
    params: StudentAttendanceParams,
    person: Person,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Json<StudentAttendanceResponse>> {
    if person.id == id {
        person.require_permission(Permission::ViewOwnAttendance)?;
    }

    let student = get_person(db, id).await?;
    person.require_access(Action::Read, &student)?;

    let filter = AttendanceFilter {
        subject: params.subject,
        from: parse_date("from", params.from.as_deref())?,
        to: parse_date("to", params.to.as_deref())?,
        semester: params.semester.as_deref().map(str::parse).transpose()?,
    };

    let all_records = list_attendance(
        db,
        &AttendanceQuery {
            student_id: Some(student.id),
            ..AttendanceQuery::default()
        },
    )
    .await?;

    let statistics = compute_student_stats(&all_records, &filter);
    let records: Vec<AttendanceRecord> = all_records
        .into_iter()
        .filter(|record| filter.matches(record))
        .collect();
    let subjects = compute_subject_breakdown(&records);

    Ok(Json(StudentAttendanceResponse {
        student,
        records,
        statistics,
        subjects,
    }))
}
