use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

use super::{Permission, Role};
use crate::error::AppError;
use crate::validation::FieldErrors;

static SAP_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{11}$").expect("SAP ID pattern compiles"));

pub const DEPARTMENTS: [&str; 4] = ["EXTC", "COMP", "IT", "MECH"];
pub const YEARS: [&str; 4] = ["FE", "SE", "TE", "BE"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PersonStatus {
    Active,
    Inactive,
}

impl PersonStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PersonStatus::Active => "Active",
            PersonStatus::Inactive => "Inactive",
        }
    }
}

impl FromStr for PersonStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Active" => Ok(PersonStatus::Active),
            "Inactive" => Ok(PersonStatus::Inactive),
            _ => Err(AppError::Validation(format!("Unknown status: {}", s))),
        }
    }
}

impl fmt::Display for PersonStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role-specific identity. Admins and teachers log in by username,
/// students by SAP ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "role")]
pub enum Profile {
    Admin {
        username: String,
    },
    Teacher {
        username: String,
        subject: String,
    },
    Student {
        #[serde(rename = "sapId")]
        sap_id: String,
    },
}

impl Profile {
    pub fn role(&self) -> Role {
        match self {
            Profile::Admin { .. } => Role::Admin,
            Profile::Teacher { .. } => Role::Teacher,
            Profile::Student { .. } => Role::Student,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id: i64,
    pub name: String,
    pub department: String,
    pub year: String,
    pub division: String,
    pub status: PersonStatus,
    #[serde(flatten)]
    pub profile: Profile,
}

#[derive(sqlx::FromRow, Clone, Default)]
pub struct DbPerson {
    pub id: Option<i64>,
    pub role: Option<String>,
    pub name: Option<String>,
    pub department: Option<String>,
    pub year: Option<String>,
    pub division: Option<String>,
    pub subject: Option<String>,
    pub username: Option<String>,
    pub sap_id: Option<String>,
    pub status: Option<String>,
}

impl TryFrom<DbPerson> for Person {
    type Error = AppError;

    fn try_from(row: DbPerson) -> Result<Self, Self::Error> {
        let id = row.id.unwrap_or_default();
        let role: Role = row.role.unwrap_or_default().parse()?;

        let missing = |field: &str| {
            AppError::Internal(format!("Stored person {} has no {}", id, field))
        };

        let profile = match role {
            Role::Admin => Profile::Admin {
                username: row.username.ok_or_else(|| missing("username"))?,
            },
            Role::Teacher => Profile::Teacher {
                username: row.username.ok_or_else(|| missing("username"))?,
                subject: row.subject.ok_or_else(|| missing("subject"))?,
            },
            Role::Student => Profile::Student {
                sap_id: row.sap_id.ok_or_else(|| missing("sap_id"))?,
            },
        };

        Ok(Self {
            id,
            name: row.name.unwrap_or_default(),
            department: row.department.unwrap_or_default(),
            year: row.year.unwrap_or_default(),
            division: row.division.unwrap_or_default(),
            status: row.status.as_deref().unwrap_or("Active").parse()?,
            profile,
        })
    }
}

impl Person {
    pub fn role(&self) -> Role {
        self.profile.role()
    }

    pub fn subject(&self) -> Option<&str> {
        match &self.profile {
            Profile::Teacher { subject, .. } => Some(subject),
            _ => None,
        }
    }

    pub fn username(&self) -> Option<&str> {
        match &self.profile {
            Profile::Admin { username } | Profile::Teacher { username, .. } => Some(username),
            Profile::Student { .. } => None,
        }
    }

    pub fn sap_id(&self) -> Option<&str> {
        match &self.profile {
            Profile::Student { sap_id } => Some(sap_id),
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == PersonStatus::Active
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.role().has_permission(permission)
    }

    pub fn require_permission(&self, permission: Permission) -> Result<(), AppError> {
        if self.has_permission(permission) {
            Ok(())
        } else {
            tracing::warn!(
                person_id = %self.id,
                role = %self.role(),
                permission = ?permission,
                "Permission denied"
            );
            Err(AppError::Authorization(format!(
                "{} role cannot {:?}",
                self.role(),
                permission
            )))
        }
    }
}

/// Registration input shared by self-registration and admin user creation.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub role: String,
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub username: Option<String>,
    pub sap_id: Option<String>,
    pub department: Option<String>,
    pub year: Option<String>,
    pub division: Option<String>,
    pub subject: Option<String>,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// A validated person ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPerson {
    pub name: String,
    pub department: String,
    pub year: String,
    pub division: String,
    pub profile: Profile,
}

impl TryFrom<&Registration> for NewPerson {
    type Error = AppError;

    fn try_from(registration: &Registration) -> Result<Self, Self::Error> {
        registration.validate()?;

        let role: Role = registration.role.parse()?;
        let mut errors = FieldErrors::new();

        let department = registration
            .department
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(normalize_department);
        let year = registration
            .year
            .as_deref()
            .map(str::trim)
            .filter(|y| !y.is_empty())
            .map(normalize_year);
        let division = non_empty(&registration.division);
        let username = non_empty(&registration.username);
        let subject = non_empty(&registration.subject);
        let sap_id = non_empty(&registration.sap_id);

        if let Some(department) = &department {
            if !DEPARTMENTS.contains(&department.as_str()) {
                errors.add(
                    "department",
                    "unknown_department",
                    "Department must be one of EXTC, COMP, IT, MECH",
                );
            }
        }
        if let Some(year) = &year {
            if !YEARS.contains(&year.as_str()) {
                errors.add("year", "unknown_year", "Year must be one of FE, SE, TE, BE");
            }
        }

        if role != Role::Admin {
            if department.is_none() {
                errors.add("department", "required", "Department is required");
            }
            if year.is_none() {
                errors.add("year", "required", "Year is required");
            }
            if division.is_none() {
                errors.add("division", "required", "Division is required");
            }
        }

        let profile = match role {
            Role::Admin | Role::Teacher => {
                if username.is_none() {
                    errors.add("username", "required", "Username is required");
                }
                if sap_id.is_some() {
                    errors.add("sapId", "not_allowed", "Only students have a SAP ID");
                }
                if role == Role::Teacher && subject.is_none() {
                    errors.add("subject", "required", "Subject is required for teachers");
                }

                match (role, username, subject) {
                    (Role::Teacher, Some(username), Some(subject)) => {
                        Some(Profile::Teacher { username, subject })
                    }
                    (Role::Admin, Some(username), _) => Some(Profile::Admin { username }),
                    _ => None,
                }
            }
            Role::Student => match sap_id {
                Some(sap_id) if SAP_ID_PATTERN.is_match(&sap_id) => {
                    Some(Profile::Student { sap_id })
                }
                Some(_) => {
                    errors.add("sapId", "sap_id_format", "SAP ID must be exactly 11 digits");
                    None
                }
                None => {
                    errors.add("sapId", "required", "SAP ID is required for students");
                    None
                }
            },
        };

        errors.into_result()?;

        let profile = profile.ok_or_else(|| {
            AppError::Internal("Registration passed validation without a profile".to_string())
        })?;

        Ok(Self {
            name: registration.name.trim().to_string(),
            department: department.unwrap_or_default(),
            year: year.unwrap_or_default(),
            division: division.unwrap_or_default(),
            profile,
        })
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// Maps display names ("Computer Engineering") onto department codes.
pub fn normalize_department(value: &str) -> String {
    match value.trim() {
        "Computer Engineering" => "COMP".to_string(),
        "Information Technology" => "IT".to_string(),
        "Electronics & Telecommunication" => "EXTC".to_string(),
        "Mechanical Engineering" => "MECH".to_string(),
        other => other.to_ascii_uppercase(),
    }
}

/// Maps display names ("Final Year") onto year codes.
pub fn normalize_year(value: &str) -> String {
    match value.trim() {
        "First Year" => "FE".to_string(),
        "Second Year" => "SE".to_string(),
        "Third Year" => "TE".to_string(),
        "Final Year" | "Fourth Year" => "BE".to_string(),
        other => other.to_ascii_uppercase(),
    }
}
