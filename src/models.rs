use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::auth::Scoped;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttendanceStatus {
    Present,
    Absent,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "Present",
            AttendanceStatus::Absent => "Absent",
        }
    }
}

impl FromStr for AttendanceStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Present" => Ok(AttendanceStatus::Present),
            "Absent" => Ok(AttendanceStatus::Absent),
            _ => Err(AppError::Validation(format!(
                "Unknown attendance status: {}",
                s
            ))),
        }
    }
}

/// Quarter of the calendar year used to scope attendance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Semester {
    #[serde(rename = "Jan-Mar")]
    JanMar,
    #[serde(rename = "Apr-Jun")]
    AprJun,
    #[serde(rename = "Jul-Sep")]
    JulSep,
    #[serde(rename = "Oct-Dec")]
    OctDec,
}

impl Semester {
    pub fn from_date(date: NaiveDate) -> Self {
        match date.month() {
            1..=3 => Semester::JanMar,
            4..=6 => Semester::AprJun,
            7..=9 => Semester::JulSep,
            _ => Semester::OctDec,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Semester::JanMar => "Jan-Mar",
            Semester::AprJun => "Apr-Jun",
            Semester::JulSep => "Jul-Sep",
            Semester::OctDec => "Oct-Dec",
        }
    }
}

impl FromStr for Semester {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Jan-Mar" => Ok(Semester::JanMar),
            "Apr-Jun" => Ok(Semester::AprJun),
            "Jul-Sep" => Ok(Semester::JulSep),
            "Oct-Dec" => Ok(Semester::OctDec),
            _ => Err(AppError::Validation(format!("Unknown semester: {}", s))),
        }
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: i64,
    pub student_id: i64,
    pub marked_by: i64,
    pub subject: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub department: String,
    pub year: String,
    pub division: String,
    pub semester: Semester,
}

#[derive(sqlx::FromRow, Clone, Default)]
pub struct DbAttendanceRecord {
    pub id: Option<i64>,
    pub student_id: Option<i64>,
    pub marked_by: Option<i64>,
    pub subject: Option<String>,
    pub date: Option<NaiveDate>,
    pub status: Option<String>,
    pub department: Option<String>,
    pub year: Option<String>,
    pub division: Option<String>,
    pub semester: Option<String>,
}

impl TryFrom<DbAttendanceRecord> for AttendanceRecord {
    type Error = AppError;

    fn try_from(row: DbAttendanceRecord) -> Result<Self, Self::Error> {
        let id = row.id.unwrap_or_default();
        let date = row
            .date
            .ok_or_else(|| AppError::Internal(format!("Attendance {} has no date", id)))?;

        Ok(Self {
            id,
            student_id: row.student_id.unwrap_or_default(),
            marked_by: row.marked_by.unwrap_or_default(),
            subject: row.subject.unwrap_or_default(),
            date,
            status: row.status.unwrap_or_default().parse()?,
            department: row.department.unwrap_or_default(),
            year: row.year.unwrap_or_default(),
            division: row.division.unwrap_or_default(),
            semester: match row.semester {
                Some(semester) => semester.parse()?,
                None => Semester::from_date(date),
            },
        })
    }
}

impl Scoped for AttendanceRecord {
    fn owner_id(&self) -> i64 {
        self.student_id
    }

    fn department(&self) -> &str {
        &self.department
    }

    fn year(&self) -> &str {
        &self.year
    }

    fn division(&self) -> &str {
        &self.division
    }

    fn subject(&self) -> Option<&str> {
        Some(&self.subject)
    }
}

/// An attendance row about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAttendance {
    pub student_id: i64,
    pub subject: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    pub department: String,
    pub year: String,
    pub division: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Grade {
    O,
    #[serde(rename = "A+")]
    APlus,
    A,
    #[serde(rename = "B+")]
    BPlus,
    B,
    C,
    F,
}

impl Grade {
    /// Lower bounds are inclusive: 90 is O, 89 is A+.
    pub fn from_total(total: i64) -> Self {
        match total {
            t if t >= 90 => Grade::O,
            t if t >= 80 => Grade::APlus,
            t if t >= 70 => Grade::A,
            t if t >= 60 => Grade::BPlus,
            t if t >= 50 => Grade::B,
            t if t >= 40 => Grade::C,
            _ => Grade::F,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grade::O => "O",
            Grade::APlus => "A+",
            Grade::A => "A",
            Grade::BPlus => "B+",
            Grade::B => "B",
            Grade::C => "C",
            Grade::F => "F",
        }
    }
}

impl FromStr for Grade {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "O" => Ok(Grade::O),
            "A+" => Ok(Grade::APlus),
            "A" => Ok(Grade::A),
            "B+" => Ok(Grade::BPlus),
            "B" => Ok(Grade::B),
            "C" => Ok(Grade::C),
            "F" => Ok(Grade::F),
            _ => Err(AppError::Internal(format!("Unknown grade: {}", s))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarksRecord {
    pub id: i64,
    pub student_id: i64,
    pub marked_by: i64,
    pub subject: String,
    pub term: String,
    pub term_test1: i64,
    pub term_test2: i64,
    pub end_sem: i64,
    pub total: i64,
    pub grade: Grade,
    pub department: String,
    pub year: String,
    pub division: String,
    pub last_updated: Option<NaiveDateTime>,
}

#[derive(sqlx::FromRow, Clone, Default)]
pub struct DbMarksRecord {
    pub id: Option<i64>,
    pub student_id: Option<i64>,
    pub marked_by: Option<i64>,
    pub subject: Option<String>,
    pub term: Option<String>,
    pub term_test1: Option<i64>,
    pub term_test2: Option<i64>,
    pub end_sem: Option<i64>,
    pub total: Option<i64>,
    pub grade: Option<String>,
    pub department: Option<String>,
    pub year: Option<String>,
    pub division: Option<String>,
    pub last_updated: Option<NaiveDateTime>,
}

impl TryFrom<DbMarksRecord> for MarksRecord {
    type Error = AppError;

    fn try_from(row: DbMarksRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id.unwrap_or_default(),
            student_id: row.student_id.unwrap_or_default(),
            marked_by: row.marked_by.unwrap_or_default(),
            subject: row.subject.unwrap_or_default(),
            term: row.term.unwrap_or_default(),
            term_test1: row.term_test1.unwrap_or_default(),
            term_test2: row.term_test2.unwrap_or_default(),
            end_sem: row.end_sem.unwrap_or_default(),
            total: row.total.unwrap_or_default(),
            grade: row.grade.as_deref().unwrap_or("F").parse()?,
            department: row.department.unwrap_or_default(),
            year: row.year.unwrap_or_default(),
            division: row.division.unwrap_or_default(),
            last_updated: row.last_updated,
        })
    }
}

impl Scoped for MarksRecord {
    fn owner_id(&self) -> i64 {
        self.student_id
    }

    fn department(&self) -> &str {
        &self.department
    }

    fn year(&self) -> &str {
        &self.year
    }

    fn division(&self) -> &str {
        &self.division
    }

    fn subject(&self) -> Option<&str> {
        Some(&self.subject)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateCategory {
    Exam,
    Assignment,
    Event,
    Holiday,
}

impl DateCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DateCategory::Exam => "exam",
            DateCategory::Assignment => "assignment",
            DateCategory::Event => "event",
            DateCategory::Holiday => "holiday",
        }
    }
}

impl FromStr for DateCategory {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "exam" => Ok(DateCategory::Exam),
            "assignment" => Ok(DateCategory::Assignment),
            "event" => Ok(DateCategory::Event),
            "holiday" => Ok(DateCategory::Holiday),
            _ => Err(AppError::Validation(format!("Unknown category: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportantDate {
    pub id: i64,
    pub department: String,
    pub year: String,
    pub division: String,
    pub date: NaiveDate,
    pub event: String,
    pub category: DateCategory,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct NewImportantDate {
    pub department: String,
    pub year: String,
    pub division: String,
    pub date: NaiveDate,
    pub event: String,
    pub category: DateCategory,
    pub description: String,
}

#[derive(sqlx::FromRow, Clone, Default)]
pub struct DbImportantDate {
    pub id: Option<i64>,
    pub department: Option<String>,
    pub year: Option<String>,
    pub division: Option<String>,
    pub date: Option<NaiveDate>,
    pub event: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
}

impl TryFrom<DbImportantDate> for ImportantDate {
    type Error = AppError;

    fn try_from(row: DbImportantDate) -> Result<Self, Self::Error> {
        let id = row.id.unwrap_or_default();
        Ok(Self {
            id,
            department: row.department.unwrap_or_default(),
            year: row.year.unwrap_or_default(),
            division: row.division.unwrap_or_default(),
            date: row
                .date
                .ok_or_else(|| AppError::Internal(format!("Important date {} has no date", id)))?,
            event: row.event.unwrap_or_default(),
            category: row.category.unwrap_or_default().parse()?,
            description: row.description.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct TimetableEntry {
    pub id: i64,
    pub department: String,
    pub year: String,
    pub division: String,
    pub day: String,
    pub time: String,
    pub subject: String,
    pub teacher_id: Option<i64>,
    pub teacher_name: Option<String>,
    pub room: String,
}

#[derive(Debug, Clone)]
pub struct NewTimetableEntry {
    pub department: String,
    pub year: String,
    pub division: String,
    pub day: String,
    pub time: String,
    pub subject: String,
    pub teacher_id: Option<i64>,
    pub room: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyllabusSubject {
    pub subject_name: String,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub reference_books: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Syllabus {
    pub id: i64,
    pub department: String,
    pub year: String,
    pub term_test: String,
    pub subjects: Vec<SyllabusSubject>,
    pub updated_at: Option<NaiveDateTime>,
}

#[derive(sqlx::FromRow, Clone, Default)]
pub struct DbSyllabus {
    pub id: Option<i64>,
    pub department: Option<String>,
    pub year: Option<String>,
    pub term_test: Option<String>,
    pub subjects: Option<String>,
    pub updated_at: Option<NaiveDateTime>,
}

impl TryFrom<DbSyllabus> for Syllabus {
    type Error = AppError;

    fn try_from(row: DbSyllabus) -> Result<Self, Self::Error> {
        let subjects = match row.subjects.as_deref() {
            Some(json) => serde_json::from_str(json)?,
            None => Vec::new(),
        };

        Ok(Self {
            id: row.id.unwrap_or_default(),
            department: row.department.unwrap_or_default(),
            year: row.year.unwrap_or_default(),
            term_test: row.term_test.unwrap_or_default(),
            subjects,
            updated_at: row.updated_at,
        })
    }
}
