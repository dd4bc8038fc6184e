use rocket::State;
use rocket::serde::{Serialize, json::Json};
use sqlx::{Pool, Sqlite};

use super::parse_date;
use crate::auth::{Permission, Person, PersonStatus, Role, normalize_department};
use crate::db::{AttendanceQuery, PersonFilter, list_attendance, list_persons};
use crate::error::AppError;
use crate::models::Semester;
use crate::stats::{
    GroupBy, GroupStats, RosterEntry, UserReport, compute_group_stats, compute_roster,
    compute_user_report,
};
use crate::validation::ApiResult;

#[derive(FromForm, Debug)]
pub struct PeriodParams {
    semester: Option<String>,
    from: Option<String>,
    to: Option<String>,
}

impl PeriodParams {
    fn into_query(self, department: Option<String>) -> Result<AttendanceQuery, AppError> {
        Ok(AttendanceQuery {
            department,
            from: parse_date("from", self.from.as_deref())?,
            to: parse_date("to", self.to.as_deref())?,
            semester: self
                .semester
                .as_deref()
                .map(str::parse::<Semester>)
                .transpose()?,
            ..AttendanceQuery::default()
        })
    }
}

#[get("/reports/attendance?<group_by>&<period..>")]
pub async fn api_attendance_report(
    group_by: Option<&str>,
    period: PeriodParams,
    person: Person,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Json<Vec<GroupStats>>> {
    person.require_permission(Permission::ViewReports)?;

    let group_by: GroupBy = group_by.unwrap_or("department").parse()?;
    let query = period.into_query(None)?;

    let students = list_persons(
        db,
        &PersonFilter {
            role: Some(Role::Student),
            status: Some(PersonStatus::Active),
            ..PersonFilter::default()
        },
    )
    .await?;
    let records = list_attendance(db, &query).await?;

    Ok(Json(compute_group_stats(group_by, &students, &records)))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentRoster {
    pub department: String,
    pub students: Vec<RosterEntry>,
}

#[get("/reports/departments/<department>/students?<period..>")]
pub async fn api_department_roster(
    department: &str,
    period: PeriodParams,
    person: Person,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Json<DepartmentRoster>> {
    person.require_permission(Permission::ViewReports)?;

    let department = normalize_department(department);
    let query = period.into_query(Some(department.clone()))?;

    let students = list_persons(db, &PersonFilter::active_students(&department, "", "")).await?;
    let records = list_attendance(db, &query).await?;

    Ok(Json(DepartmentRoster {
        students: compute_roster(&students, &records),
        department,
    }))
}

#[get("/reports/users")]
pub async fn api_user_report(
    person: Person,
    db: &State<Pool<Sqlite>>,
) -> ApiResult<Json<UserReport>> {
    person.require_permission(Permission::ViewReports)?;

    let persons = list_persons(db, &PersonFilter::default()).await?;

    Ok(Json(compute_user_report(&persons)))
}
