use attendance_core::db::open_db_in_memory;
use attendance_core::{AttendanceStatus, AttendanceStore, FixedClock, RecordFilter, StoreError};
use chrono::NaiveDate;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, d).unwrap()
}

/// Three students marked over two days, one minute apart.
fn seeded_store() -> AttendanceStore<FixedClock> {
    let store = AttendanceStore::with_clock(
        open_db_in_memory().unwrap(),
        FixedClock::at(day(2), 9 * 3600),
    )
    .unwrap();
    store.register_student("Asha Rao", "R100", "CS").unwrap();
    store.register_student("Bea Moss", "R200", "").unwrap();
    store.register_student("Chen Li", "R300", "EE").unwrap();

    store.mark_attendance("R100", AttendanceStatus::Present).unwrap();
    store.clock().advance_secs(60);
    store.mark_attendance("R200", AttendanceStatus::Absent).unwrap();

    store.clock().advance_secs(24 * 3600);
    store.mark_attendance("R300", AttendanceStatus::Present).unwrap();
    store.clock().advance_secs(60);
    store.mark_attendance("R100", AttendanceStatus::Absent).unwrap();
    store
}

#[test]
fn all_records_are_most_recent_first() {
    let store = seeded_store();
    let rows = store.list_records(RecordFilter::All).unwrap();

    let rolls: Vec<&str> = rows.iter().map(|row| row.roll_number.as_str()).collect();
    assert_eq!(rolls, vec!["R100", "R300", "R200", "R100"]);
    assert!(rows
        .windows(2)
        .all(|pair| pair[0].timestamp >= pair[1].timestamp));
    assert_eq!(rows[2].department, None);
}

#[test]
fn today_only_is_subset_dated_today() {
    let store = seeded_store();
    let all = store.list_records(RecordFilter::All).unwrap();
    let today = store.list_records(RecordFilter::TodayOnly).unwrap();

    assert_eq!(today.len(), 2);
    assert!(today.iter().all(|row| row.date == day(3)));
    assert!(today.iter().all(|row| all.contains(row)));
}

#[test]
fn same_second_marks_fall_back_to_newest_id_first() {
    let store = AttendanceStore::with_clock(
        open_db_in_memory().unwrap(),
        FixedClock::at(day(2), 9 * 3600),
    )
    .unwrap();
    store.register_student("Asha Rao", "R100", "CS").unwrap();
    store.register_student("Bea Moss", "R200", "EE").unwrap();

    store.mark_attendance("R100", AttendanceStatus::Present).unwrap();
    store.mark_attendance("R200", AttendanceStatus::Present).unwrap();

    let rows = store.list_records(RecordFilter::TodayOnly).unwrap();
    assert_eq!(rows[0].roll_number, "R200");
    assert_eq!(rows[1].roll_number, "R100");
}

#[test]
fn empty_store_lists_nothing() {
    let store = AttendanceStore::open_in_memory().unwrap();
    assert!(store.list_records(RecordFilter::All).unwrap().is_empty());
    assert!(store.list_records(RecordFilter::TodayOnly).unwrap().is_empty());
    assert_eq!(store.compute_daily_counts().unwrap().as_tuple(), (0, 0, 0, 0));
}

#[test]
fn history_and_summary_cover_one_student() {
    let store = seeded_store();

    let history = store.student_history("R100").unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].date, day(3));
    assert_eq!(history[0].status, AttendanceStatus::Absent);
    assert_eq!(history[1].date, day(2));

    let summary = store.student_summary("R100").unwrap();
    assert_eq!(summary.student.name, "Asha Rao");
    assert_eq!((summary.present_days, summary.absent_days), (1, 1));
    assert_eq!(summary.marked_days(), 2);

    let err = store.student_history("R404").unwrap_err();
    assert!(matches!(err, StoreError::StudentNotFound(_)));
    assert!(matches!(
        store.student_summary("R404").unwrap_err(),
        StoreError::StudentNotFound(_)
    ));
}

#[test]
fn views_serialize_with_plain_status_text() {
    let store = seeded_store();
    let rows = store.list_records(RecordFilter::TodayOnly).unwrap();

    let json = serde_json::to_value(&rows[0]).unwrap();
    assert_eq!(json["status"], "Absent");
    assert_eq!(json["date"], "2024-09-03");
    assert_eq!(json["roll_number"], "R100");
}

#[test]
fn file_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("attendance.db");

    let store = AttendanceStore::open(&path).unwrap();
    store.register_student("Asha Rao", "R100", "CS").unwrap();
    store.mark_attendance("R100", AttendanceStatus::Present).unwrap();
    store.close().unwrap();

    let reopened = AttendanceStore::open(&path).unwrap();
    assert_eq!(reopened.list_students().unwrap().len(), 1);
    assert_eq!(reopened.list_records(RecordFilter::All).unwrap().len(), 1);
}
