use chrono::NaiveDate;
use rocket::Request;
use rocket::Route;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;

use crate::auth::{Person, Role, normalize_department, normalize_year};
use crate::error::AppError;
use crate::validation::{ToValidationResponse, ValidationResponse};

pub mod attendance;
pub mod auth;
pub mod calendar;
pub mod marks;
pub mod reports;
pub mod users;

pub fn routes() -> Vec<Route> {
    routes![
        auth::api_login,
        auth::api_logout,
        auth::api_me,
        auth::api_me_unauthorized,
        auth::api_register,
        auth::health,
        users::api_list_users,
        users::api_create_user,
        users::api_set_user_status,
        users::api_delete_user,
        users::api_list_students,
        attendance::api_mark_attendance,
        attendance::api_edit_attendance,
        attendance::api_class_attendance,
        attendance::api_student_attendance,
        marks::api_record_marks,
        marks::api_student_marks,
        reports::api_attendance_report,
        reports::api_department_roster,
        reports::api_user_report,
        calendar::api_list_important_dates,
        calendar::api_create_important_date,
        calendar::api_delete_important_date,
        calendar::api_list_timetable,
        calendar::api_create_timetable_entry,
        calendar::api_delete_timetable_entry,
        calendar::api_get_syllabus,
        calendar::api_create_syllabus,
        calendar::api_update_syllabus,
        calendar::api_delete_syllabus,
    ]
}

#[catch(400)]
pub fn bad_request_api(_req: &Request) -> Custom<Json<ValidationResponse>> {
    Status::BadRequest.to_validation_response()
}

#[catch(422)]
pub fn unprocessable_api(_req: &Request) -> Custom<Json<ValidationResponse>> {
    Status::UnprocessableEntity.to_validation_response()
}

pub(crate) fn parse_date(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    value
        .filter(|v| !v.trim().is_empty())
        .map(|v| {
            NaiveDate::parse_from_str(v.trim(), "%Y-%m-%d").map_err(|_| {
                AppError::Validation(format!("{} must be a date formatted YYYY-MM-DD", field))
            })
        })
        .transpose()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Cohort {
    pub department: String,
    pub year: String,
    pub division: String,
}

/// Teachers and students always see their own cohort; asking for another
/// one is refused. Admins must name the cohort they want.
pub(crate) fn resolve_cohort(
    caller: &Person,
    department: Option<&str>,
    year: Option<&str>,
    division: Option<&str>,
) -> Result<Cohort, AppError> {
    let department = department.map(normalize_department);
    let year = year.map(normalize_year);
    let division = division.map(|d| d.trim().to_string());

    if caller.role() == Role::Admin {
        return match (department, year, division) {
            (Some(department), Some(year), Some(division)) => Ok(Cohort {
                department,
                year,
                division,
            }),
            _ => Err(AppError::Validation(
                "department, year and division are required".to_string(),
            )),
        };
    }

    let own = Cohort {
        department: caller.department.clone(),
        year: caller.year.clone(),
        division: caller.division.clone(),
    };

    let differs = department.is_some_and(|d| d != own.department)
        || year.is_some_and(|y| y != own.year)
        || division.is_some_and(|d| d != own.division);

    if differs {
        return Err(AppError::Authorization(format!(
            "{} {} may only view their own cohort",
            caller.role(),
            caller.id
        )));
    }

    Ok(own)
}
