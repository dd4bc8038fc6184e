use crate::auth::{NewPerson, PersonStatus, Registration};
use crate::db::{create_person, insert_attendance_batch, set_person_status};
use crate::error::AppError;
use crate::init_rocket;
use crate::models::{AttendanceStatus, NewAttendance};
use chrono::NaiveDate;
use rocket::http::{ContentType, Cookie, Status};
use rocket::local::asynchronous::Client;
use serde_json::json;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Sqlite};
use std::collections::HashMap;
use std::sync::Once;
use tracing::log::LevelFilter;

static INIT: Once = Once::new();
pub static STANDARD_PASSWORD: &str = "password123";

#[derive(Default)]
pub struct TestDbBuilder {
    persons: Vec<TestPerson>,
    attendance: Vec<TestAttendance>,
}

pub struct TestPerson {
    pub key: String,
    pub registration: Registration,
    pub active: bool,
}

pub struct TestAttendance {
    pub student: String,
    pub marker: String,
    pub subject: String,
    pub date: NaiveDate,
    pub status: AttendanceStatus,
}

fn registration(role: &str, name: &str) -> Registration {
    Registration {
        role: role.to_string(),
        name: name.to_string(),
        username: None,
        sap_id: None,
        department: None,
        year: None,
        division: None,
        subject: None,
        password: STANDARD_PASSWORD.to_string(),
    }
}

impl TestDbBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn admin(mut self, username: &str) -> Self {
        let mut registration = registration("Admin", "Admin User");
        registration.username = Some(username.to_string());
        self.persons.push(TestPerson {
            key: username.to_string(),
            registration,
            active: true,
        });
        self
    }

    pub fn teacher(
        mut self,
        username: &str,
        department: &str,
        year: &str,
        division: &str,
        subject: &str,
    ) -> Self {
        let mut registration = registration("Teacher", &format!("Teacher {}", username));
        registration.username = Some(username.to_string());
        registration.department = Some(department.to_string());
        registration.year = Some(year.to_string());
        registration.division = Some(division.to_string());
        registration.subject = Some(subject.to_string());
        self.persons.push(TestPerson {
            key: username.to_string(),
            registration,
            active: true,
        });
        self
    }

    /// Students are keyed by `name` in the resulting id map.
    pub fn student(
        mut self,
        name: &str,
        sap_id: &str,
        department: &str,
        year: &str,
        division: &str,
    ) -> Self {
        let mut registration = registration("Student", name);
        registration.sap_id = Some(sap_id.to_string());
        registration.department = Some(department.to_string());
        registration.year = Some(year.to_string());
        registration.division = Some(division.to_string());
        self.persons.push(TestPerson {
            key: name.to_string(),
            registration,
            active: true,
        });
        self
    }

    pub fn inactive(mut self, key: &str) -> Self {
        if let Some(person) = self.persons.iter_mut().find(|p| p.key == key) {
            person.active = false;
        }
        self
    }

    pub fn attendance(
        mut self,
        student: &str,
        marker: &str,
        subject: &str,
        date: &str,
        status: AttendanceStatus,
    ) -> Self {
        self.attendance.push(TestAttendance {
            student: student.to_string(),
            marker: marker.to_string(),
            subject: subject.to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("Invalid test date"),
            status,
        });
        self
    }

    pub async fn build(self) -> Result<TestDb, AppError> {
        INIT.call_once(|| {
            let _ = env_logger::builder()
                .filter_level(LevelFilter::Debug)
                .is_test(true)
                .try_init();
        });

        // Every connection to :memory: is its own database, so the pool is
        // pinned to one connection that never expires.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        let mut person_id_map: HashMap<String, i64> = HashMap::new();
        let mut persons = HashMap::new();

        for test_person in &self.persons {
            let new_person = NewPerson::try_from(&test_person.registration)?;
            let person =
                create_person(&pool, &new_person, &test_person.registration.password).await?;

            if !test_person.active {
                set_person_status(&pool, person.id, PersonStatus::Inactive).await?;
            }

            person_id_map.insert(test_person.key.clone(), person.id);
            persons.insert(test_person.key.clone(), person);
        }

        for entry in &self.attendance {
            let student = persons
                .get(&entry.student)
                .ok_or_else(|| AppError::NotFound(entry.student.clone()))?;
            let marker_id = person_id_map
                .get(&entry.marker)
                .copied()
                .ok_or_else(|| AppError::NotFound(entry.marker.clone()))?;

            insert_attendance_batch(
                &pool,
                marker_id,
                &[NewAttendance {
                    student_id: student.id,
                    subject: entry.subject.clone(),
                    date: entry.date,
                    status: entry.status,
                    department: student.department.clone(),
                    year: student.year.clone(),
                    division: student.division.clone(),
                }],
            )
            .await?;
        }

        Ok(TestDb {
            pool,
            person_id_map,
        })
    }
}

pub struct TestDb {
    pub pool: Pool<Sqlite>,
    pub person_id_map: HashMap<String, i64>,
}

impl TestDb {
    pub fn person_id(&self, key: &str) -> i64 {
        self.person_id_map
            .get(key)
            .copied()
            .unwrap_or_else(|| panic!("No test person keyed {}", key))
    }
}

/// Admin `admin`; EXTC/BE/BE-2 teachers `wn_teacher` (Wireless Networks) and
/// `lens_teacher` (Lens); COMP/SE/SE-1 teacher `comp_teacher`; students
/// `alice` (EXTC/BE/BE-2), `bob` (EXTC/BE/BE-1) and `carol` (COMP/SE/SE-1).
pub async fn create_standard_test_db() -> TestDb {
    TestDbBuilder::new()
        .admin("admin")
        .teacher("wn_teacher", "EXTC", "BE", "BE-2", "Wireless Networks")
        .teacher("lens_teacher", "EXTC", "BE", "BE-2", "Lens")
        .teacher("comp_teacher", "COMP", "SE", "SE-1", "Data Structures")
        .student("alice", "12345678901", "EXTC", "BE", "BE-2")
        .student("bob", "12345678902", "EXTC", "BE", "BE-1")
        .student("carol", "12345678903", "COMP", "SE", "SE-1")
        .build()
        .await
        .expect("Failed to build standard test database")
}

pub async fn setup_test_client(test_db: TestDb) -> (Client, TestDb) {
    let rocket = init_rocket(test_db.pool.clone()).await;
    let client = Client::untracked(rocket)
        .await
        .expect("Failed to build rocket client");

    (client, test_db)
}

/// Logs in and returns the session cookies to attach to later requests.
pub async fn login_test_user(
    client: &Client,
    role: &str,
    identifier: &str,
    password: &str,
) -> Vec<Cookie<'static>> {
    let response = client
        .post("/api/login")
        .header(ContentType::JSON)
        .body(
            json!({
                "role": role,
                "identifier": identifier,
                "password": password
            })
            .to_string(),
        )
        .dispatch()
        .await;

    assert_eq!(response.status(), Status::Ok);

    response.cookies().iter().cloned().collect()
}

pub async fn login_as(client: &Client, role: &str, identifier: &str) -> Vec<Cookie<'static>> {
    let cookies = login_test_user(client, role, identifier, STANDARD_PASSWORD).await;
    assert!(
        !cookies.is_empty(),
        "Login for {} {} did not set a session cookie",
        role,
        identifier
    );
    cookies
}
