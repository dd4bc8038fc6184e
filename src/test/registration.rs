#[cfg(test)]
mod tests {
    use crate::auth::{NewPerson, Profile, Registration, normalize_department, normalize_year};
    use crate::error::AppError;

    fn registration(role: &str) -> Registration {
        Registration {
            role: role.to_string(),
            name: "Test Person".to_string(),
            username: None,
            sap_id: None,
            department: None,
            year: None,
            division: None,
            subject: None,
            password: "password123".to_string(),
        }
    }

    fn student(sap_id: &str) -> Registration {
        let mut registration = registration("Student");
        registration.sap_id = Some(sap_id.to_string());
        registration.department = Some("EXTC".to_string());
        registration.year = Some("BE".to_string());
        registration.division = Some("BE-2".to_string());
        registration
    }

    fn failing_fields(result: Result<NewPerson, AppError>) -> Vec<String> {
        match result {
            Err(AppError::InvalidInput(errors)) => {
                let mut fields: Vec<String> = errors
                    .field_errors()
                    .keys()
                    .map(|field| field.to_string())
                    .collect();
                fields.sort();
                fields
            }
            other => panic!("Expected invalid input, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_student() {
        let person = NewPerson::try_from(&student("12345678901")).unwrap();

        assert_eq!(
            person.profile,
            Profile::Student {
                sap_id: "12345678901".to_string()
            }
        );
        assert_eq!(person.department, "EXTC");
        assert_eq!(person.division, "BE-2");
    }

    #[test]
    fn test_ten_digit_sap_id_rejected() {
        let result = NewPerson::try_from(&student("1234567890"));

        match result {
            Err(AppError::InvalidInput(errors)) => {
                let field_errors = errors.field_errors();
                let sap_errors = field_errors.get("sapId").expect("sapId error");
                assert_eq!(sap_errors[0].code, "sap_id_format");
            }
            other => panic!("Expected sap_id_format error, got {:?}", other),
        }
    }

    #[test]
    fn test_non_numeric_sap_id_rejected() {
        assert_eq!(
            failing_fields(NewPerson::try_from(&student("1234567890a"))),
            vec!["sapId"]
        );
    }

    #[test]
    fn test_student_requires_cohort() {
        let mut registration = student("12345678901");
        registration.year = None;
        registration.division = Some("  ".to_string());

        assert_eq!(
            failing_fields(NewPerson::try_from(&registration)),
            vec!["division", "year"]
        );
    }

    #[test]
    fn test_teacher_requires_subject_and_username() {
        let mut registration = registration("Teacher");
        registration.department = Some("EXTC".to_string());
        registration.year = Some("BE".to_string());
        registration.division = Some("BE-2".to_string());

        assert_eq!(
            failing_fields(NewPerson::try_from(&registration)),
            vec!["subject", "username"]
        );

        registration.username = Some("wn_teacher".to_string());
        registration.subject = Some("Wireless Networks".to_string());
        let person = NewPerson::try_from(&registration).unwrap();
        assert_eq!(
            person.profile,
            Profile::Teacher {
                username: "wn_teacher".to_string(),
                subject: "Wireless Networks".to_string()
            }
        );
    }

    #[test]
    fn test_admin_needs_only_username() {
        let mut registration = registration("Admin");
        registration.username = Some("root".to_string());

        let person = NewPerson::try_from(&registration).unwrap();

        assert_eq!(person.department, "");
        assert_eq!(
            person.profile,
            Profile::Admin {
                username: "root".to_string()
            }
        );
    }

    #[test]
    fn test_staff_cannot_carry_sap_id() {
        let mut registration = registration("Admin");
        registration.username = Some("root".to_string());
        registration.sap_id = Some("12345678901".to_string());

        assert_eq!(failing_fields(NewPerson::try_from(&registration)), vec!["sapId"]);
    }

    #[test]
    fn test_short_password_rejected() {
        let mut registration = student("12345678901");
        registration.password = "short".to_string();

        assert_eq!(
            failing_fields(NewPerson::try_from(&registration)),
            vec!["password"]
        );
    }

    #[test]
    fn test_unknown_role_rejected() {
        let result = NewPerson::try_from(&registration("Coach"));
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_display_names_normalised() {
        let mut registration = student("12345678901");
        registration.department = Some("Computer Engineering".to_string());
        registration.year = Some("Final Year".to_string());

        let person = NewPerson::try_from(&registration).unwrap();

        assert_eq!(person.department, "COMP");
        assert_eq!(person.year, "BE");
        assert_eq!(normalize_department("it"), "IT");
        assert_eq!(normalize_year("Fourth Year"), "BE");
    }

    #[test]
    fn test_unknown_department_rejected() {
        let mut registration = student("12345678901");
        registration.department = Some("Civil".to_string());

        assert_eq!(
            failing_fields(NewPerson::try_from(&registration)),
            vec!["department"]
        );
    }
}
