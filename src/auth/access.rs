//! Per-record access gate.
//!
//! Role permissions decide *which operations* a caller may attempt; the gate
//! decides whether a caller may read or write one particular record.

use super::{Person, Role};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Write,
}

/// Anything the gate can be asked about: ledger rows and people.
pub trait Scoped {
    /// The student the record belongs to.
    fn owner_id(&self) -> i64;
    fn department(&self) -> &str;
    fn year(&self) -> &str;
    fn division(&self) -> &str;
    fn subject(&self) -> Option<&str>;
}

/// The scope of a record that does not exist yet, e.g. an attendance entry
/// about to be marked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordScope {
    pub student_id: i64,
    pub department: String,
    pub year: String,
    pub division: String,
    pub subject: Option<String>,
}

impl RecordScope {
    pub fn for_student(student: &Person, subject: Option<&str>) -> Self {
        Self {
            student_id: student.id,
            department: student.department.clone(),
            year: student.year.clone(),
            division: student.division.clone(),
            subject: subject.map(String::from),
        }
    }
}

impl Scoped for RecordScope {
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
        self.subject.as_deref()
    }
}

impl Scoped for Person {
    fn owner_id(&self) -> i64 {
        self.id
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
        Person::subject(self)
    }
}

pub fn can_access(caller: &Person, action: Action, target: &impl Scoped) -> bool {
    match caller.role() {
        Role::Admin => true,
        Role::Teacher => {
            let same_cohort = target.department() == caller.department
                && target.year() == caller.year
                && target.division() == caller.division;

            match action {
                Action::Read => same_cohort,
                Action::Write => {
                    same_cohort
                        && caller
                            .subject()
                            .is_some_and(|subject| target.subject() == Some(subject))
                }
            }
        }
        Role::Student => action == Action::Read && target.owner_id() == caller.id,
    }
}

impl Person {
    pub fn require_access(&self, action: Action, target: &impl Scoped) -> Result<(), AppError> {
        if can_access(self, action, target) {
            return Ok(());
        }

        tracing::warn!(
            person_id = %self.id,
            role = %self.role(),
            action = ?action,
            target_owner = %target.owner_id(),
            target_department = %target.department(),
            target_year = %target.year(),
            target_division = %target.division(),
            "Access denied"
        );

        Err(AppError::Authorization(format!(
            "{} {} cannot {:?} records of {}/{}/{}",
            self.role(),
            self.id,
            action,
            target.department(),
            target.year(),
            target.division()
        )))
    }
}
