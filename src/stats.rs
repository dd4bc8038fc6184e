//! Attendance aggregation and marks derivation.
//!
//! Everything here is pure: callers fetch the rows, these functions fold them.
//! Percentages are whole numbers rounded half up, and every division is
//! guarded so an empty input yields zeros.

use chrono::NaiveDate;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::auth::{Person, PersonStatus, Role};
use crate::error::AppError;
use crate::models::{AttendanceRecord, AttendanceStatus, Grade, Semester};
use crate::validation::FieldErrors;

pub const TERM_TEST_MAX: i64 = 25;
pub const END_SEM_MAX: i64 = 50;

/// `round(100 * present / total)`, 0 when there were no classes.
pub fn percentage(present: i64, total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    (200 * present + total) / (2 * total)
}

/// Classes that must be attended for 75%: `ceil(0.75 * total)`.
pub fn required_for_75(total: i64) -> i64 {
    if total <= 0 {
        return 0;
    }
    (3 * total + 3) / 4
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceStats {
    #[serde(rename = "totalLectures")]
    pub total_classes: i64,
    pub present_count: i64,
    #[serde(rename = "attendancePercentage")]
    pub percentage: i64,
    #[serde(rename = "requiredFor75")]
    pub required_for_75: i64,
    pub remaining_required: i64,
}

impl AttendanceStats {
    pub fn from_counts(total_classes: i64, present_count: i64) -> Self {
        let required = required_for_75(total_classes);
        Self {
            total_classes,
            present_count,
            percentage: percentage(present_count, total_classes),
            required_for_75: required,
            remaining_required: (required - present_count).max(0),
        }
    }

    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a AttendanceRecord>) -> Self {
        let (total, present) = records.into_iter().fold((0, 0), |(total, present), record| {
            let present = present + i64::from(record.status == AttendanceStatus::Present);
            (total + 1, present)
        });
        Self::from_counts(total, present)
    }
}

/// Optional narrowing applied before a student's records are folded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttendanceFilter {
    pub subject: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub semester: Option<Semester>,
}

impl AttendanceFilter {
    pub fn matches(&self, record: &AttendanceRecord) -> bool {
        self.subject.as_deref().is_none_or(|s| record.subject == s)
            && self.from.is_none_or(|from| record.date >= from)
            && self.to.is_none_or(|to| record.date <= to)
            && self.semester.is_none_or(|semester| record.semester == semester)
    }
}

pub fn compute_student_stats(
    records: &[AttendanceRecord],
    filter: &AttendanceFilter,
) -> AttendanceStats {
    AttendanceStats::from_records(records.iter().filter(|r| filter.matches(r)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    Department,
    Year,
    Division,
}

impl GroupBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupBy::Department => "department",
            GroupBy::Year => "year",
            GroupBy::Division => "division",
        }
    }

    fn key<'a>(&self, department: &'a str, year: &'a str, division: &'a str) -> &'a str {
        match self {
            GroupBy::Department => department,
            GroupBy::Year => year,
            GroupBy::Division => division,
        }
    }
}

impl FromStr for GroupBy {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "department" => Ok(GroupBy::Department),
            "year" => Ok(GroupBy::Year),
            "division" => Ok(GroupBy::Division),
            _ => Err(AppError::Validation(format!(
                "groupBy must be department, year or division, got {}",
                s
            ))),
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of a grouped attendance report. Serialized with the group value
/// under the grouping's own name, e.g. `{"department": "EXTC", ...}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupStats {
    pub group_by: GroupBy,
    pub key: String,
    pub total_students: i64,
    pub total_attendance: i64,
    pub present_count: i64,
    pub percentage: i64,
}

impl Serialize for GroupStats {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(5))?;
        map.serialize_entry(self.group_by.as_str(), &self.key)?;
        map.serialize_entry("totalStudents", &self.total_students)?;
        map.serialize_entry("totalAttendance", &self.total_attendance)?;
        map.serialize_entry("presentCount", &self.present_count)?;
        map.serialize_entry("attendancePercentage", &self.percentage)?;
        map.end()
    }
}

#[derive(Default)]
struct GroupTally {
    students: i64,
    attendance: i64,
    present: i64,
}

/// Rows come out ordered by group value. A group appears if any active
/// student or any record falls in it.
pub fn compute_group_stats(
    group_by: GroupBy,
    students: &[Person],
    records: &[AttendanceRecord],
) -> Vec<GroupStats> {
    let mut groups: BTreeMap<&str, GroupTally> = BTreeMap::new();

    for student in students
        .iter()
        .filter(|p| p.role() == Role::Student && p.is_active())
    {
        let key = group_by.key(&student.department, &student.year, &student.division);
        groups.entry(key).or_default().students += 1;
    }

    for record in records {
        let key = group_by.key(&record.department, &record.year, &record.division);
        let tally = groups.entry(key).or_default();
        tally.attendance += 1;
        if record.status == AttendanceStatus::Present {
            tally.present += 1;
        }
    }

    groups
        .into_iter()
        .map(|(key, tally)| GroupStats {
            group_by,
            key: key.to_string(),
            total_students: tally.students,
            total_attendance: tally.attendance,
            present_count: tally.present,
            percentage: percentage(tally.present, tally.attendance),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectStats {
    pub subject: String,
    #[serde(flatten)]
    pub stats: AttendanceStats,
}

/// Per-subject statistics, ordered by subject name.
pub fn compute_subject_breakdown(records: &[AttendanceRecord]) -> Vec<SubjectStats> {
    let mut by_subject: BTreeMap<&str, Vec<&AttendanceRecord>> = BTreeMap::new();
    for record in records {
        by_subject.entry(&record.subject).or_default().push(record);
    }

    by_subject
        .into_iter()
        .map(|(subject, rows)| SubjectStats {
            subject: subject.to_string(),
            stats: AttendanceStats::from_records(rows),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterEntry {
    pub id: i64,
    pub name: String,
    pub sap_id: String,
    pub year: String,
    pub division: String,
    #[serde(flatten)]
    pub stats: AttendanceStats,
}

/// Each active student with the statistics of their own records, ordered by
/// year, division and name.
pub fn compute_roster(students: &[Person], records: &[AttendanceRecord]) -> Vec<RosterEntry> {
    let mut by_student: BTreeMap<i64, Vec<&AttendanceRecord>> = BTreeMap::new();
    for record in records {
        by_student.entry(record.student_id).or_default().push(record);
    }

    let mut roster: Vec<RosterEntry> = students
        .iter()
        .filter(|p| p.role() == Role::Student && p.is_active())
        .map(|student| RosterEntry {
            id: student.id,
            name: student.name.clone(),
            sap_id: student.sap_id().unwrap_or_default().to_string(),
            year: student.year.clone(),
            division: student.division.clone(),
            stats: AttendanceStats::from_records(
                by_student.get(&student.id).into_iter().flatten().copied(),
            ),
        })
        .collect();

    roster.sort_by(|a, b| {
        (&a.year, &a.division, &a.name).cmp(&(&b.year, &b.division, &b.name))
    });
    roster
}

/// Validated marks components for one (student, subject, term).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarksComponents {
    pub term_test1: i64,
    pub term_test2: i64,
    pub end_sem: i64,
}

impl MarksComponents {
    pub fn new(term_test1: i64, term_test2: i64, end_sem: i64) -> Result<Self, AppError> {
        let mut errors = FieldErrors::new();

        if !(0..=TERM_TEST_MAX).contains(&term_test1) {
            errors.add("termTest1", "range", "Term test 1 must be between 0 and 25");
        }
        if !(0..=TERM_TEST_MAX).contains(&term_test2) {
            errors.add("termTest2", "range", "Term test 2 must be between 0 and 25");
        }
        if !(0..=END_SEM_MAX).contains(&end_sem) {
            errors.add("endSem", "range", "End semester must be between 0 and 50");
        }

        errors.into_result()?;

        Ok(Self {
            term_test1,
            term_test2,
            end_sem,
        })
    }

    pub fn total(&self) -> i64 {
        self.term_test1 + self.term_test2 + self.end_sem
    }

    pub fn grade(&self) -> Grade {
        Grade::from_total(self.total())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserReport {
    pub total_users: i64,
    pub active: i64,
    pub inactive: i64,
    pub by_role: BTreeMap<String, i64>,
    pub by_department: BTreeMap<String, i64>,
    pub by_year: BTreeMap<String, i64>,
    pub by_division: BTreeMap<String, i64>,
}

/// Head counts over every stored person. Admins without a cohort are counted
/// by role and status only.
pub fn compute_user_report(persons: &[Person]) -> UserReport {
    let mut report = UserReport::default();

    for person in persons {
        report.total_users += 1;
        match person.status {
            PersonStatus::Active => report.active += 1,
            PersonStatus::Inactive => report.inactive += 1,
        }

        *report
            .by_role
            .entry(person.role().to_string())
            .or_default() += 1;

        for (field, map) in [
            (&person.department, &mut report.by_department),
            (&person.year, &mut report.by_year),
            (&person.division, &mut report.by_division),
        ] {
            if !field.is_empty() {
                *map.entry(field.clone()).or_default() += 1;
            }
        }
    }

    report
}
