#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::auth::{
        Action, Permission, Person, PersonStatus, Profile, RecordScope, Role, can_access,
    };
    use crate::models::{AttendanceRecord, AttendanceStatus, Grade, MarksRecord, Semester};

    fn person(id: i64, profile: Profile, cohort: (&str, &str, &str)) -> Person {
        Person {
            id,
            name: format!("Person {}", id),
            department: cohort.0.to_string(),
            year: cohort.1.to_string(),
            division: cohort.2.to_string(),
            status: PersonStatus::Active,
            profile,
        }
    }

    fn teacher(id: i64, subject: &str, cohort: (&str, &str, &str)) -> Person {
        person(
            id,
            Profile::Teacher {
                username: format!("teacher{}", id),
                subject: subject.to_string(),
            },
            cohort,
        )
    }

    fn student(id: i64, cohort: (&str, &str, &str)) -> Person {
        person(
            id,
            Profile::Student {
                sap_id: format!("{:011}", id),
            },
            cohort,
        )
    }

    fn admin() -> Person {
        person(
            1,
            Profile::Admin {
                username: "admin".to_string(),
            },
            ("", "", ""),
        )
    }

    fn attendance(student: &Person, subject: &str) -> AttendanceRecord {
        let date = NaiveDate::from_ymd_opt(2025, 1, 10).unwrap();
        AttendanceRecord {
            id: 1,
            student_id: student.id,
            marked_by: 2,
            subject: subject.to_string(),
            date,
            status: AttendanceStatus::Present,
            department: student.department.clone(),
            year: student.year.clone(),
            division: student.division.clone(),
            semester: Semester::from_date(date),
        }
    }

    fn marks(student: &Person, subject: &str) -> MarksRecord {
        MarksRecord {
            id: 1,
            student_id: student.id,
            marked_by: 2,
            subject: subject.to_string(),
            term: "2025-26".to_string(),
            term_test1: 20,
            term_test2: 22,
            end_sem: 45,
            total: 87,
            grade: Grade::APlus,
            department: student.department.clone(),
            year: student.year.clone(),
            division: student.division.clone(),
            last_updated: None,
        }
    }

    const BE2: (&str, &str, &str) = ("EXTC", "BE", "BE-2");
    const BE1: (&str, &str, &str) = ("EXTC", "BE", "BE-1");

    #[test]
    fn test_teacher_write_requires_own_subject() {
        let wn = teacher(10, "Wireless Networks", BE2);
        let alice = student(20, BE2);

        let lens_record = attendance(&alice, "Lens");
        let wn_record = attendance(&alice, "Wireless Networks");

        assert!(!can_access(&wn, Action::Write, &lens_record));
        assert!(can_access(&wn, Action::Write, &wn_record));
        assert!(can_access(&wn, Action::Read, &lens_record));
    }

    #[test]
    fn test_teacher_denied_other_division() {
        let wn = teacher(10, "Wireless Networks", BE2);
        let bob = student(21, BE1);

        let record = attendance(&bob, "Wireless Networks");

        assert!(!can_access(&wn, Action::Read, &record));
        assert!(!can_access(&wn, Action::Write, &record));
        assert!(!can_access(&wn, Action::Read, &bob));
    }

    #[test]
    fn test_teacher_write_on_new_record_scope() {
        let wn = teacher(10, "Wireless Networks", BE2);
        let alice = student(20, BE2);

        let own = RecordScope::for_student(&alice, Some("Wireless Networks"));
        let other = RecordScope::for_student(&alice, Some("Lens"));
        let unspecified = RecordScope::for_student(&alice, None);

        assert!(can_access(&wn, Action::Write, &own));
        assert!(!can_access(&wn, Action::Write, &other));
        assert!(!can_access(&wn, Action::Write, &unspecified));
    }

    #[test]
    fn test_student_reads_only_own_records() {
        let alice = student(20, BE2);
        let classmate = student(22, BE2);

        assert!(can_access(&alice, Action::Read, &attendance(&alice, "Lens")));
        assert!(can_access(&alice, Action::Read, &marks(&alice, "Lens")));
        assert!(can_access(&alice, Action::Read, &alice));
        assert!(!can_access(&alice, Action::Read, &attendance(&classmate, "Lens")));
        assert!(!can_access(&alice, Action::Read, &classmate));
    }

    #[test]
    fn test_student_never_writes() {
        let alice = student(20, BE2);

        assert!(!can_access(&alice, Action::Write, &attendance(&alice, "Lens")));
        assert!(!can_access(&alice, Action::Write, &marks(&alice, "Lens")));
    }

    #[test]
    fn test_admin_always_allowed() {
        let admin = admin();
        let bob = student(21, BE1);

        assert!(can_access(&admin, Action::Read, &attendance(&bob, "Lens")));
        assert!(can_access(&admin, Action::Write, &marks(&bob, "Lens")));
        assert!(can_access(&admin, Action::Write, &bob));
    }

    #[test]
    fn test_require_access_is_authorization_error() {
        let wn = teacher(10, "Wireless Networks", BE2);
        let bob = student(21, BE1);

        let err = wn
            .require_access(Action::Read, &attendance(&bob, "Wireless Networks"))
            .unwrap_err();

        assert_eq!(err.status_code(), rocket::http::Status::Forbidden);
    }

    #[test]
    fn test_role_permissions() {
        assert!(Role::Admin.has_permission(Permission::ViewReports));
        assert!(Role::Admin.has_permission(Permission::MarkAttendance));
        assert!(Role::Teacher.has_permission(Permission::MarkAttendance));
        assert!(!Role::Teacher.has_permission(Permission::EditAttendance));
        assert!(!Role::Teacher.has_permission(Permission::ViewReports));
        assert!(!Role::Student.has_permission(Permission::MarkAttendance));
        assert!(Role::Student.has_permission(Permission::ViewOwnAttendance));
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("teacher".parse::<Role>().unwrap(), Role::Teacher);
        assert_eq!("ADMIN".parse::<Role>().unwrap(), Role::Admin);
        assert!("coach".parse::<Role>().is_err());
    }
}
