use crate::{
    auth::{DbPerson, DbUserSession, NewPerson, Person, PersonStatus, Profile, Role, UserSession},
    error::AppError,
};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use sqlx::{Pool, QueryBuilder, Sqlite};
use tracing::{info, instrument, warn};

use crate::models::{
    AttendanceRecord, AttendanceStatus, DateCategory, DbAttendanceRecord, DbImportantDate,
    DbMarksRecord, DbSyllabus, ImportantDate, MarksRecord, NewAttendance, NewImportantDate,
    NewTimetableEntry, Semester, Syllabus, SyllabusSubject, TimetableEntry,
};
use crate::stats::MarksComponents;

#[cfg(not(test))]
const PASSWORD_COST: u32 = bcrypt::DEFAULT_COST;
#[cfg(test)]
const PASSWORD_COST: u32 = 4;

const PERSON_COLUMNS: &str =
    "id, role, name, department, year, division, subject, username, sap_id, status";

const ATTENDANCE_COLUMNS: &str =
    "id, student_id, marked_by, subject, date, status, department, year, division, semester";

const MARKS_COLUMNS: &str = "id, student_id, marked_by, subject, term, term_test1, term_test2, \
     end_sem, total, grade, department, year, division, last_updated";

#[instrument(skip_all, fields(name = %person.name, role = %person.profile.role()))]
pub async fn create_person(
    pool: &Pool<Sqlite>,
    person: &NewPerson,
    password: &str,
) -> Result<Person, AppError> {
    info!("Creating new person");

    let (username, sap_id, subject) = match &person.profile {
        Profile::Admin { username } => (Some(username.as_str()), None, None),
        Profile::Teacher { username, subject } => {
            (Some(username.as_str()), None, Some(subject.as_str()))
        }
        Profile::Student { sap_id } => (None, Some(sap_id.as_str()), None),
    };

    if let Some(username) = username {
        let existing = sqlx::query_scalar::<_, i64>("SELECT id FROM persons WHERE username = ?")
            .bind(username)
            .fetch_optional(pool)
            .await?;

        if existing.is_some() {
            return Err(AppError::Conflict(format!(
                "Username '{}' already exists",
                username
            )));
        }
    }

    if let Some(sap_id) = sap_id {
        let existing = sqlx::query_scalar::<_, i64>("SELECT id FROM persons WHERE sap_id = ?")
            .bind(sap_id)
            .fetch_optional(pool)
            .await?;

        if existing.is_some() {
            return Err(AppError::Conflict(format!(
                "SAP ID '{}' already exists",
                sap_id
            )));
        }
    }

    let hashed_password = bcrypt::hash(password, PASSWORD_COST)?;

    let res = sqlx::query(
        "INSERT INTO persons (role, name, department, year, division, subject, username, sap_id, password)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(person.profile.role().as_str())
    .bind(&person.name)
    .bind(&person.department)
    .bind(&person.year)
    .bind(&person.division)
    .bind(subject)
    .bind(username)
    .bind(sap_id)
    .bind(hashed_password)
    .execute(pool)
    .await?;

    get_person(pool, res.last_insert_rowid()).await
}

#[instrument]
pub async fn get_person(pool: &Pool<Sqlite>, id: i64) -> Result<Person, AppError> {
    info!("Fetching person by ID");
    let row = sqlx::query_as::<_, DbPerson>(&format!(
        "SELECT {} FROM persons WHERE id = ?",
        PERSON_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(person) => Person::try_from(person),
        _ => Err(AppError::NotFound(format!(
            "Person with id {} not found in database",
            id
        ))),
    }
}

/// Checks a login. Staff are looked up by username, students by SAP ID.
/// Unknown identifiers, wrong passwords and inactive accounts all yield `None`.
#[instrument(skip_all, fields(role = %role, identifier))]
pub async fn authenticate_person(
    pool: &Pool<Sqlite>,
    role: Role,
    identifier: &str,
    password: &str,
) -> Result<Option<Person>, AppError> {
    info!("Authenticating person");

    let query = match role {
        Role::Student => "SELECT id, password FROM persons WHERE role = ? AND sap_id = ?",
        Role::Admin | Role::Teacher => {
            "SELECT id, password FROM persons WHERE role = ? AND username = ?"
        }
    };

    let row = sqlx::query_as::<_, (i64, String)>(query)
        .bind(role.as_str())
        .bind(identifier)
        .fetch_optional(pool)
        .await?;

    let Some((id, hashed_password)) = row else {
        return Ok(None);
    };

    // A stored hash bcrypt cannot parse is a store defect, not a bad password.
    if !bcrypt::verify(password, &hashed_password)? {
        return Ok(None);
    }

    let person = get_person(pool, id).await?;
    if !person.is_active() {
        warn!(person_id = %id, "Inactive person attempted to log in");
        return Ok(None);
    }

    Ok(Some(person))
}

#[instrument]
pub async fn admin_exists(pool: &Pool<Sqlite>) -> Result<bool, AppError> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM persons WHERE role = 'Admin'")
        .fetch_one(pool)
        .await?;

    Ok(count > 0)
}

#[derive(Debug, Clone, Default)]
pub struct PersonFilter {
    pub role: Option<Role>,
    pub department: Option<String>,
    pub year: Option<String>,
    pub division: Option<String>,
    pub status: Option<PersonStatus>,
    pub search: Option<String>,
}

impl PersonFilter {
    /// Active students of one cohort. Empty parts are not filtered on.
    pub fn active_students(department: &str, year: &str, division: &str) -> Self {
        let part = |value: &str| (!value.is_empty()).then(|| value.to_string());
        Self {
            role: Some(Role::Student),
            department: part(department),
            year: part(year),
            division: part(division),
            status: Some(PersonStatus::Active),
            search: None,
        }
    }
}

#[instrument]
pub async fn list_persons(
    pool: &Pool<Sqlite>,
    filter: &PersonFilter,
) -> Result<Vec<Person>, AppError> {
    info!("Listing persons");

    let mut query = QueryBuilder::<Sqlite>::new(format!(
        "SELECT {} FROM persons WHERE 1 = 1",
        PERSON_COLUMNS
    ));

    if let Some(role) = filter.role {
        query.push(" AND role = ").push_bind(role.as_str());
    }
    if let Some(department) = &filter.department {
        query.push(" AND department = ").push_bind(department.clone());
    }
    if let Some(year) = &filter.year {
        query.push(" AND year = ").push_bind(year.clone());
    }
    if let Some(division) = &filter.division {
        query.push(" AND division = ").push_bind(division.clone());
    }
    if let Some(status) = filter.status {
        query.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(search) = filter.search.as_deref().filter(|s| !s.trim().is_empty()) {
        let pattern = format!("%{}%", search.trim());
        query
            .push(" AND (name LIKE ")
            .push_bind(pattern.clone())
            .push(" OR username LIKE ")
            .push_bind(pattern.clone())
            .push(" OR sap_id LIKE ")
            .push_bind(pattern)
            .push(")");
    }

    query.push(" ORDER BY role, department, year, division, name");

    let rows = query.build_query_as::<DbPerson>().fetch_all(pool).await?;

    rows.into_iter().map(Person::try_from).collect()
}

#[instrument]
pub async fn set_person_status(
    pool: &Pool<Sqlite>,
    person_id: i64,
    status: PersonStatus,
) -> Result<Person, AppError> {
    info!("Setting person status");

    let res = sqlx::query("UPDATE persons SET status = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(person_id)
        .execute(pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "Person with id {} not found in database",
            person_id
        )));
    }

    if status == PersonStatus::Inactive {
        sqlx::query("DELETE FROM sessions WHERE user_id = ?")
            .bind(person_id)
            .execute(pool)
            .await?;
    }

    get_person(pool, person_id).await
}

/// Removes a person together with their sessions and ledger rows.
#[instrument]
pub async fn delete_person(pool: &Pool<Sqlite>, person_id: i64) -> Result<(), AppError> {
    info!("Deleting person");

    let res = sqlx::query("DELETE FROM persons WHERE id = ?")
        .bind(person_id)
        .execute(pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "Person with id {} not found in database",
            person_id
        )));
    }

    Ok(())
}

#[instrument(skip(pool, token))]
pub async fn create_session(
    pool: &Pool<Sqlite>,
    user_id: i64,
    token: &str,
    expires_at: NaiveDateTime,
) -> Result<i64, AppError> {
    info!("Creating user session");

    let res = sqlx::query("INSERT INTO sessions (user_id, token, expires_at) VALUES (?, ?, ?)")
        .bind(user_id)
        .bind(token)
        .bind(expires_at)
        .execute(pool)
        .await?;

    Ok(res.last_insert_rowid())
}

#[instrument(skip(pool, token))]
pub async fn get_session_by_token(
    pool: &Pool<Sqlite>,
    token: &str,
) -> Result<UserSession, AppError> {
    info!("Getting session by token");

    let session = sqlx::query_as::<_, DbUserSession>(
        "SELECT id, user_id, token, created_at, expires_at FROM sessions WHERE token = ?",
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    match session {
        Some(session) => Ok(UserSession::from(session)),
        _ => Err(AppError::Authentication(
            "Invalid session token".to_string(),
        )),
    }
}

#[instrument(skip(pool, token))]
pub async fn invalidate_session(pool: &Pool<Sqlite>, token: &str) -> Result<(), AppError> {
    info!("Invalidating session");

    sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;

    Ok(())
}

#[instrument(skip(pool))]
pub async fn clean_expired_sessions(pool: &Pool<Sqlite>) -> Result<u64, AppError> {
    info!("Cleaning expired sessions");

    let now = Utc::now().naive_utc();

    let result = sqlx::query("DELETE FROM sessions WHERE expires_at < ?")
        .bind(now)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Inserts a batch of attendance rows in one transaction. A duplicate
/// (student, subject, date), whether already stored or repeated inside the
/// batch, rolls the whole batch back.
#[instrument(skip(pool, entries), fields(count = entries.len()))]
pub async fn insert_attendance_batch(
    pool: &Pool<Sqlite>,
    marked_by: i64,
    entries: &[NewAttendance],
) -> Result<Vec<AttendanceRecord>, AppError> {
    info!("Inserting attendance batch");

    let mut tx = pool.begin().await?;
    let mut records = Vec::with_capacity(entries.len());

    for entry in entries {
        let semester = Semester::from_date(entry.date);

        let res = sqlx::query(
            "INSERT INTO attendance
             (student_id, marked_by, subject, date, status, department, year, division, semester)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(entry.student_id)
        .bind(marked_by)
        .bind(&entry.subject)
        .bind(entry.date)
        .bind(entry.status.as_str())
        .bind(&entry.department)
        .bind(&entry.year)
        .bind(&entry.division)
        .bind(semester.as_str())
        .execute(&mut *tx)
        .await
        .map_err(|err| match AppError::from(err) {
            AppError::Conflict(_) => AppError::Conflict(format!(
                "Attendance already marked for student {} in {} on {}",
                entry.student_id, entry.subject, entry.date
            )),
            other => other,
        })?;

        records.push(AttendanceRecord {
            id: res.last_insert_rowid(),
            student_id: entry.student_id,
            marked_by,
            subject: entry.subject.clone(),
            date: entry.date,
            status: entry.status,
            department: entry.department.clone(),
            year: entry.year.clone(),
            division: entry.division.clone(),
            semester,
        });
    }

    tx.commit().await?;

    info!(count = records.len(), "Attendance batch committed");
    Ok(records)
}

#[instrument]
pub async fn get_attendance_record(
    pool: &Pool<Sqlite>,
    id: i64,
) -> Result<AttendanceRecord, AppError> {
    info!("Getting attendance record");

    let row = sqlx::query_as::<_, DbAttendanceRecord>(&format!(
        "SELECT {} FROM attendance WHERE id = ?",
        ATTENDANCE_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(record) => AttendanceRecord::try_from(record),
        _ => Err(AppError::NotFound(format!(
            "Attendance record {} not found",
            id
        ))),
    }
}

/// Changes only the status of a stored record.
#[instrument]
pub async fn update_attendance_status(
    pool: &Pool<Sqlite>,
    id: i64,
    status: AttendanceStatus,
) -> Result<AttendanceRecord, AppError> {
    info!("Updating attendance status");

    let res = sqlx::query("UPDATE attendance SET status = ? WHERE id = ?")
        .bind(status.as_str())
        .bind(id)
        .execute(pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "Attendance record {} not found",
            id
        )));
    }

    get_attendance_record(pool, id).await
}

#[derive(Debug, Clone, Default)]
pub struct AttendanceQuery {
    pub student_id: Option<i64>,
    pub department: Option<String>,
    pub year: Option<String>,
    pub division: Option<String>,
    pub subject: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub semester: Option<Semester>,
}

#[instrument]
pub async fn list_attendance(
    pool: &Pool<Sqlite>,
    filter: &AttendanceQuery,
) -> Result<Vec<AttendanceRecord>, AppError> {
    info!("Listing attendance");

    let mut query = QueryBuilder::<Sqlite>::new(format!(
        "SELECT {} FROM attendance WHERE 1 = 1",
        ATTENDANCE_COLUMNS
    ));

    if let Some(student_id) = filter.student_id {
        query.push(" AND student_id = ").push_bind(student_id);
    }
    if let Some(department) = &filter.department {
        query.push(" AND department = ").push_bind(department.clone());
    }
    if let Some(year) = &filter.year {
        query.push(" AND year = ").push_bind(year.clone());
    }
    if let Some(division) = &filter.division {
        query.push(" AND division = ").push_bind(division.clone());
    }
    if let Some(subject) = &filter.subject {
        query.push(" AND subject = ").push_bind(subject.clone());
    }
    if let Some(from) = filter.from {
        query.push(" AND date >= ").push_bind(from);
    }
    if let Some(to) = filter.to {
        query.push(" AND date <= ").push_bind(to);
    }
    if let Some(semester) = filter.semester {
        query.push(" AND semester = ").push_bind(semester.as_str());
    }

    query.push(" ORDER BY date, subject, student_id");

    let rows = query
        .build_query_as::<DbAttendanceRecord>()
        .fetch_all(pool)
        .await?;

    rows.into_iter().map(AttendanceRecord::try_from).collect()
}

/// Writes one marks row, replacing any earlier entry for the same
/// (student, subject, term). Total and grade are derived in the same write.
#[instrument(skip(pool, student), fields(student_id = %student.id))]
pub async fn upsert_marks(
    pool: &Pool<Sqlite>,
    marked_by: i64,
    student: &Person,
    subject: &str,
    term: &str,
    components: MarksComponents,
) -> Result<MarksRecord, AppError> {
    info!("Upserting marks");

    let row = sqlx::query_as::<_, DbMarksRecord>(&format!(
        "INSERT INTO marks
         (student_id, marked_by, subject, term, term_test1, term_test2, end_sem, total, grade,
          department, year, division, last_updated)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP)
         ON CONFLICT (student_id, subject, term) DO UPDATE SET
             marked_by = excluded.marked_by,
             term_test1 = excluded.term_test1,
             term_test2 = excluded.term_test2,
             end_sem = excluded.end_sem,
             total = excluded.total,
             grade = excluded.grade,
             department = excluded.department,
             year = excluded.year,
             division = excluded.division,
             last_updated = CURRENT_TIMESTAMP
         RETURNING {}",
        MARKS_COLUMNS
    ))
    .bind(student.id)
    .bind(marked_by)
    .bind(subject)
    .bind(term)
    .bind(components.term_test1)
    .bind(components.term_test2)
    .bind(components.end_sem)
    .bind(components.total())
    .bind(components.grade().as_str())
    .bind(&student.department)
    .bind(&student.year)
    .bind(&student.division)
    .fetch_one(pool)
    .await?;

    MarksRecord::try_from(row)
}

#[instrument]
pub async fn list_marks(
    pool: &Pool<Sqlite>,
    student_id: i64,
    term: Option<&str>,
) -> Result<Vec<MarksRecord>, AppError> {
    info!("Listing marks");

    let mut query = QueryBuilder::<Sqlite>::new(format!(
        "SELECT {} FROM marks WHERE student_id = ",
        MARKS_COLUMNS
    ));
    query.push_bind(student_id);

    if let Some(term) = term {
        query.push(" AND term = ").push_bind(term.to_string());
    }

    query.push(" ORDER BY term, subject");

    let rows = query
        .build_query_as::<DbMarksRecord>()
        .fetch_all(pool)
        .await?;

    rows.into_iter().map(MarksRecord::try_from).collect()
}

#[instrument(skip(pool))]
pub async fn create_important_date(
    pool: &Pool<Sqlite>,
    date: &NewImportantDate,
) -> Result<ImportantDate, AppError> {
    info!("Creating important date");

    let res = sqlx::query(
        "INSERT INTO important_dates (department, year, division, date, event, category, description)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&date.department)
    .bind(&date.year)
    .bind(&date.division)
    .bind(date.date)
    .bind(&date.event)
    .bind(date.category.as_str())
    .bind(&date.description)
    .execute(pool)
    .await?;

    Ok(ImportantDate {
        id: res.last_insert_rowid(),
        department: date.department.clone(),
        year: date.year.clone(),
        division: date.division.clone(),
        date: date.date,
        event: date.event.clone(),
        category: date.category,
        description: date.description.clone(),
    })
}

#[instrument]
pub async fn list_important_dates(
    pool: &Pool<Sqlite>,
    department: &str,
    year: &str,
    division: &str,
    category: Option<DateCategory>,
) -> Result<Vec<ImportantDate>, AppError> {
    info!("Listing important dates");

    let mut query = QueryBuilder::<Sqlite>::new(
        "SELECT id, department, year, division, date, event, category, description
         FROM important_dates WHERE department = ",
    );
    query
        .push_bind(department.to_string())
        .push(" AND year = ")
        .push_bind(year.to_string())
        .push(" AND division = ")
        .push_bind(division.to_string());

    if let Some(category) = category {
        query.push(" AND category = ").push_bind(category.as_str());
    }

    query.push(" ORDER BY date");

    let rows = query
        .build_query_as::<DbImportantDate>()
        .fetch_all(pool)
        .await?;

    rows.into_iter().map(ImportantDate::try_from).collect()
}

#[instrument]
pub async fn delete_important_date(pool: &Pool<Sqlite>, id: i64) -> Result<(), AppError> {
    info!("Deleting important date");

    let res = sqlx::query("DELETE FROM important_dates WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Important date {} not found", id)));
    }

    Ok(())
}

#[instrument(skip(pool))]
pub async fn create_timetable_entry(
    pool: &Pool<Sqlite>,
    entry: &NewTimetableEntry,
) -> Result<i64, AppError> {
    info!("Creating timetable entry");

    let res = sqlx::query(
        "INSERT INTO timetable (department, year, division, day, time, subject, teacher_id, room)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&entry.department)
    .bind(&entry.year)
    .bind(&entry.division)
    .bind(&entry.day)
    .bind(&entry.time)
    .bind(&entry.subject)
    .bind(entry.teacher_id)
    .bind(&entry.room)
    .execute(pool)
    .await?;

    Ok(res.last_insert_rowid())
}

#[instrument]
pub async fn list_timetable(
    pool: &Pool<Sqlite>,
    department: &str,
    year: &str,
    division: &str,
    day: Option<&str>,
) -> Result<Vec<TimetableEntry>, AppError> {
    info!("Listing timetable");

    let mut query = QueryBuilder::<Sqlite>::new(
        "SELECT t.id, t.department, t.year, t.division, t.day, t.time, t.subject,
                t.teacher_id, p.name AS teacher_name, t.room
         FROM timetable t
         LEFT JOIN persons p ON p.id = t.teacher_id
         WHERE t.department = ",
    );
    query
        .push_bind(department.to_string())
        .push(" AND t.year = ")
        .push_bind(year.to_string())
        .push(" AND t.division = ")
        .push_bind(division.to_string());

    if let Some(day) = day {
        query.push(" AND t.day = ").push_bind(day.to_string());
    }

    query.push(" ORDER BY t.day, t.time");

    let entries = query
        .build_query_as::<TimetableEntry>()
        .fetch_all(pool)
        .await?;

    Ok(entries)
}

#[instrument]
pub async fn delete_timetable_entry(pool: &Pool<Sqlite>, id: i64) -> Result<(), AppError> {
    info!("Deleting timetable entry");

    let res = sqlx::query("DELETE FROM timetable WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(format!("Timetable entry {} not found", id)));
    }

    Ok(())
}

#[instrument(skip(pool, subjects))]
pub async fn create_syllabus(
    pool: &Pool<Sqlite>,
    department: &str,
    year: &str,
    term_test: &str,
    subjects: &[SyllabusSubject],
) -> Result<Syllabus, AppError> {
    info!("Creating syllabus");

    let subjects_json = serde_json::to_string(subjects)?;

    sqlx::query("INSERT INTO syllabi (department, year, term_test, subjects) VALUES (?, ?, ?, ?)")
        .bind(department)
        .bind(year)
        .bind(term_test)
        .bind(subjects_json)
        .execute(pool)
        .await
        .map_err(|err| match AppError::from(err) {
            AppError::Conflict(_) => AppError::Conflict(format!(
                "Syllabus for {} {} {} already exists",
                department, year, term_test
            )),
            other => other,
        })?;

    get_syllabus(pool, department, year, term_test).await
}

#[instrument]
pub async fn get_syllabus(
    pool: &Pool<Sqlite>,
    department: &str,
    year: &str,
    term_test: &str,
) -> Result<Syllabus, AppError> {
    info!("Getting syllabus");

    let row = sqlx::query_as::<_, DbSyllabus>(
        "SELECT id, department, year, term_test, subjects, updated_at
         FROM syllabi WHERE department = ? AND year = ? AND term_test = ?",
    )
    .bind(department)
    .bind(year)
    .bind(term_test)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(syllabus) => Syllabus::try_from(syllabus),
        _ => Err(AppError::NotFound(format!(
            "Syllabus for {} {} {} not found",
            department, year, term_test
        ))),
    }
}

#[instrument(skip(pool, subjects))]
pub async fn update_syllabus_subjects(
    pool: &Pool<Sqlite>,
    department: &str,
    year: &str,
    term_test: &str,
    subjects: &[SyllabusSubject],
) -> Result<Syllabus, AppError> {
    info!("Updating syllabus subjects");

    let subjects_json = serde_json::to_string(subjects)?;

    let res = sqlx::query(
        "UPDATE syllabi SET subjects = ?, updated_at = CURRENT_TIMESTAMP
         WHERE department = ? AND year = ? AND term_test = ?",
    )
    .bind(subjects_json)
    .bind(department)
    .bind(year)
    .bind(term_test)
    .execute(pool)
    .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "Syllabus for {} {} {} not found",
            department, year, term_test
        )));
    }

    get_syllabus(pool, department, year, term_test).await
}

#[instrument]
pub async fn delete_syllabus(
    pool: &Pool<Sqlite>,
    department: &str,
    year: &str,
    term_test: &str,
) -> Result<(), AppError> {
    info!("Deleting syllabus");

    let res =
        sqlx::query("DELETE FROM syllabi WHERE department = ? AND year = ? AND term_test = ?")
            .bind(department)
            .bind(year)
            .bind(term_test)
            .execute(pool)
            .await?;

    if res.rows_affected() == 0 {
        return Err(AppError::NotFound(format!(
            "Syllabus for {} {} {} not found",
            department, year, term_test
        )));
    }

    Ok(())
}
