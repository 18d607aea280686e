use attendance_core::db::open_db_in_memory;
use attendance_core::{
    AttendanceStore, FixedClock, NewStudent, RepoError, SqliteStudentRepository, StoreError,
    StudentRepository, StudentValidationError,
};
use chrono::NaiveDate;

fn store() -> AttendanceStore<FixedClock> {
    let date = NaiveDate::from_ymd_opt(2024, 9, 2).unwrap();
    AttendanceStore::with_clock(open_db_in_memory().unwrap(), FixedClock::at(date, 8 * 3600))
        .unwrap()
}

#[test]
fn register_trims_fields_and_stores_blank_department_as_null() {
    let store = store();
    store
        .register_student("  Asha Rao ", " R100 ", "   ")
        .unwrap();

    let student = store.find_student("R100").unwrap().unwrap();
    assert_eq!(student.name, "Asha Rao");
    assert_eq!(student.roll_number, "R100");
    assert_eq!(student.department, None);
}

#[test]
fn duplicate_roll_is_rejected_and_count_unchanged() {
    let store = store();
    let first = store.register_student("Asha Rao", "R100", "CS").unwrap();

    let err = store
        .register_student("Someone Else", " R100", "EE")
        .unwrap_err();
    assert!(matches!(err, StoreError::DuplicateKey(ref roll) if roll == "R100"));

    assert_eq!(store.compute_daily_counts().unwrap().total_students, 1);
    let kept = store.find_student("R100").unwrap().unwrap();
    assert_eq!(kept.id, first);
    assert_eq!(kept.name, "Asha Rao");
    assert_eq!(kept.department.as_deref(), Some("CS"));
}

#[test]
fn blank_required_fields_are_rejected_without_writes() {
    let store = store();

    let name_err = store.register_student("   ", "R1", "CS").unwrap_err();
    assert!(matches!(
        name_err,
        StoreError::Validation(StudentValidationError::EmptyName)
    ));

    let roll_err = store.register_student("Asha", "\t", "").unwrap_err();
    assert!(matches!(
        roll_err,
        StoreError::Validation(StudentValidationError::EmptyRollNumber)
    ));

    assert!(store.list_students().unwrap().is_empty());
}

#[test]
fn resolve_uses_exact_trimmed_roll() {
    let store = store();
    let id = store.register_student("Asha Rao", "R100", "CS").unwrap();

    assert_eq!(store.resolve_student_by_roll(" R100 ").unwrap(), Some(id));
    assert_eq!(store.resolve_student_by_roll("r100").unwrap(), None);
    assert_eq!(store.resolve_student_by_roll("R10").unwrap(), None);
}

#[test]
fn list_students_orders_by_roll() {
    let store = store();
    store.register_student("Chen Li", "R300", "").unwrap();
    store.register_student("Asha Rao", "R100", "CS").unwrap();
    store.register_student("Bea Moss", "R200", "EE").unwrap();

    let rolls: Vec<String> = store
        .list_students()
        .unwrap()
        .into_iter()
        .map(|student| student.roll_number)
        .collect();
    assert_eq!(rolls, vec!["R100", "R200", "R300"]);
}

#[test]
fn repository_reports_duplicates_and_missing_deletes() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteStudentRepository::try_new(&conn).unwrap();

    let id = repo
        .create_student(&NewStudent::new("Asha Rao", "R100", Some("CS")))
        .unwrap();
    let err = repo
        .create_student(&NewStudent::new("Asha Rao", "R100", None))
        .unwrap_err();
    assert!(matches!(err, RepoError::DuplicateRollNumber(_)));
    assert_eq!(repo.count_students().unwrap(), 1);

    repo.delete_student(id).unwrap();
    let missing = repo.delete_student(id).unwrap_err();
    assert!(matches!(missing, RepoError::StudentNotFound(gone) if gone == id));
}

#[test]
fn try_new_rejects_connection_without_schema() {
    let conn = rusqlite::Connection::open_in_memory().unwrap();
    let err = SqliteStudentRepository::try_new(&conn).unwrap_err();
    assert!(matches!(err, RepoError::MissingRequiredTable("students")));
}
