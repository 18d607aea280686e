//! Command-line shell over the attendance core.
//!
//! # Responsibility
//! - Parse one command per invocation and run it against the configured store.
//! - Print results as plain text; errors go to stderr with a non-zero exit.

use attendance_core::{
    init_logging, AppConfig, AttendanceStatus, AttendanceStore, AttendanceView, RecordFilter,
    StoreError,
};
use log::info;
use std::process::ExitCode;

const USAGE: &str = "usage: attendance_cli <command>

commands:
  add <name> <roll> [department]   register a student
  mark <roll> <present|absent>     mark today's attendance
  records [--today]                list attendance, most recent first
  counts                           today's totals
  students                         list registered students
  history <roll>                   all records of one student
  remove <roll>                    delete a student and its records
  ping                             check core linkage";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Add {
        name: String,
        roll: String,
        department: String,
    },
    Mark {
        roll: String,
        status: AttendanceStatus,
    },
    Records {
        filter: RecordFilter,
    },
    Counts,
    Students,
    History {
        roll: String,
    },
    Remove {
        roll: String,
    },
    Ping,
}

impl Command {
    fn parse(args: &[String]) -> Result<Self, String> {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        match args.as_slice() {
            ["add", name, roll] => Ok(Self::Add {
                name: name.to_string(),
                roll: roll.to_string(),
                department: String::new(),
            }),
            ["add", name, roll, department] => Ok(Self::Add {
                name: name.to_string(),
                roll: roll.to_string(),
                department: department.to_string(),
            }),
            ["mark", roll, status] => {
                let status = status.parse::<AttendanceStatus>().map_err(|err| err.to_string())?;
                Ok(Self::Mark {
                    roll: roll.to_string(),
                    status,
                })
            }
            ["records"] => Ok(Self::Records {
                filter: RecordFilter::All,
            }),
            ["records", "--today"] => Ok(Self::Records {
                filter: RecordFilter::TodayOnly,
            }),
            ["counts"] => Ok(Self::Counts),
            ["students"] => Ok(Self::Students),
            ["history", roll] => Ok(Self::History {
                roll: roll.to_string(),
            }),
            ["remove", roll] => Ok(Self::Remove {
                roll: roll.to_string(),
            }),
            ["ping"] => Ok(Self::Ping),
            _ => Err(USAGE.to_string()),
        }
    }
}

fn main() -> ExitCode {
    let config = AppConfig::from_env();
    if let Some(log_dir) = &config.log_dir {
        if let Err(err) = init_logging(&config.log_level, &log_dir.to_string_lossy()) {
            eprintln!("warning: file logging disabled: {err}");
        }
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match Command::parse(&args) {
        Ok(command) => command,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::from(2);
        }
    };

    match run(&config, command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::from(1)
        }
    }
}

fn run(config: &AppConfig, command: Command) -> Result<(), StoreError> {
    if command == Command::Ping {
        println!("attendance_core ping={}", attendance_core::ping());
        println!("attendance_core version={}", attendance_core::core_version());
        return Ok(());
    }

    let store = AttendanceStore::open(&config.db_path)?;
    info!(
        "event=cli_command module=cli status=start db_path={}",
        config.db_path.display()
    );

    match command {
        Command::Add {
            name,
            roll,
            department,
        } => {
            store.register_student(&name, &roll, &department)?;
            println!("Student added.");
        }
        Command::Mark { roll, status } => {
            let record = store.mark_attendance(&roll, status)?;
            println!(
                "Marked {} for roll {} on {}.",
                record.status,
                roll.trim(),
                record.date
            );
        }
        Command::Records { filter } => {
            let rows = store.list_records(filter)?;
            print_records(&rows);
        }
        Command::Counts => {
            let counts = store.compute_daily_counts()?;
            println!(
                "Total Students: {}  Present (today): {}  Absent (today): {}  Marked (today): {}",
                counts.total_students, counts.present_today, counts.absent_today, counts.marked_today
            );
        }
        Command::Students => {
            for student in store.list_students()? {
                println!(
                    "{:<12} {:<28} {}",
                    student.roll_number,
                    student.name,
                    student.department.as_deref().unwrap_or("-")
                );
            }
        }
        Command::History { roll } => {
            let summary = store.student_summary(&roll)?;
            println!(
                "{} ({}): present {} / absent {}",
                summary.student.name,
                summary.student.roll_number,
                summary.present_days,
                summary.absent_days
            );
            print_records(&store.student_history(&roll)?);
        }
        Command::Remove { roll } => {
            store.delete_student(&roll)?;
            println!("Student removed.");
        }
        Command::Ping => {}
    }

    store.close()
}

fn print_records(rows: &[AttendanceView]) {
    println!(
        "{:>5}  {:<24} {:<10} {:<12} {:<10} {:<7} {}",
        "ID", "Name", "Roll", "Department", "Date", "Status", "Timestamp"
    );
    for row in rows {
        println!("{}", format_record(row));
    }
}

fn format_record(row: &AttendanceView) -> String {
    format!(
        "{:>5}  {:<24} {:<10} {:<12} {:<10} {:<7} {}",
        row.id,
        row.name,
        row.roll_number,
        row.department.as_deref().unwrap_or("-"),
        row.date,
        row.status,
        row.timestamp
    )
}

#[cfg(test)]
mod tests {
    use super::{format_record, Command};
    use attendance_core::{AttendanceStatus, AttendanceView, RecordFilter};
    use chrono::NaiveDate;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn parses_add_with_optional_department() {
        assert_eq!(
            Command::parse(&args(&["add", "Asha Rao", "R100"])).unwrap(),
            Command::Add {
                name: "Asha Rao".to_string(),
                roll: "R100".to_string(),
                department: String::new(),
            }
        );
        assert!(matches!(
            Command::parse(&args(&["add", "Asha Rao", "R100", "CS"])).unwrap(),
            Command::Add { department, .. } if department == "CS"
        ));
    }

    #[test]
    fn parses_mark_status_and_rejects_unknown() {
        assert_eq!(
            Command::parse(&args(&["mark", "R100", "present"])).unwrap(),
            Command::Mark {
                roll: "R100".to_string(),
                status: AttendanceStatus::Present,
            }
        );
        let error = Command::parse(&args(&["mark", "R100", "late"])).unwrap_err();
        assert!(error.contains("late"));
    }

    #[test]
    fn parses_record_filters() {
        assert_eq!(
            Command::parse(&args(&["records", "--today"])).unwrap(),
            Command::Records {
                filter: RecordFilter::TodayOnly
            }
        );
        assert_eq!(
            Command::parse(&args(&["records"])).unwrap(),
            Command::Records {
                filter: RecordFilter::All
            }
        );
    }

    #[test]
    fn unknown_or_empty_input_prints_usage() {
        assert!(Command::parse(&[]).unwrap_err().starts_with("usage:"));
        assert!(Command::parse(&args(&["export"])).is_err());
    }

    #[test]
    fn record_line_shows_dash_for_missing_department() {
        let date = NaiveDate::from_ymd_opt(2024, 9, 2).unwrap();
        let row = AttendanceView {
            id: 7,
            name: "Asha Rao".to_string(),
            roll_number: "R100".to_string(),
            department: None,
            date,
            status: AttendanceStatus::Present,
            timestamp: date.and_hms_opt(9, 0, 0).unwrap(),
        };
        let line = format_record(&row);
        assert!(line.contains(" - "));
        assert!(line.contains("2024-09-02 09:00:00"));
        assert!(line.contains("Present"));
    }
}
