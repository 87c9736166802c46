use std::env;
use std::sync::{Mutex, OnceLock};

use serde_json::Value;
use tempfile::TempDir;

use slotbot_cli::commands::{availability, booking, migrate, schedule, service, specialist};
use slotbot_cli::{
    AddServiceArgs, AddSpecialistArgs, CancelArgs, DatesArgs, GenerateArgs, ListArgs,
    ListServicesArgs, MoveArgs, OverviewArgs, ReserveArgs, SlotArgs, TimesArgs,
};

#[test]
fn migrate_returns_success_with_valid_env() {
    let dir = TempDir::new().expect("temp dir");
    with_env(&[("SLOTBOT_DATABASE_URL", &file_db_url(&dir))], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 0, "expected successful migrate run");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["command"], "migrate");
        assert_eq!(payload["status"], "ok");
    });
}

#[test]
fn migrate_reports_config_failure_for_non_sqlite_url() {
    with_env(&[("SLOTBOT_DATABASE_URL", "postgres://nope")], || {
        let result = migrate::run();
        assert_eq!(result.exit_code, 2, "expected config validation failure code");

        let payload = parse_payload(&result.output);
        assert_eq!(payload["status"], "error");
        assert_eq!(payload["error_class"], "config_validation");
    });
}

#[test]
fn full_booking_flow_through_the_cli() {
    let dir = TempDir::new().expect("temp dir");
    with_env(&[("SLOTBOT_DATABASE_URL", &file_db_url(&dir))], || {
        assert_eq!(migrate::run().exit_code, 0);

        let added = specialist::add(AddSpecialistArgs {
            name: "Anna".to_string(),
            specialization: "massage".to_string(),
            timezone: "Europe/Berlin".to_string(),
        });
        assert_eq!(added.exit_code, 0);
        let specialist_id =
            parse_payload(&added.output)["data"]["id"].as_i64().expect("specialist id");

        // January 2099: Mondays are the 5th, 12th, 19th and 26th.
        let generated = schedule::generate(GenerateArgs {
            specialist: specialist_id,
            year: 2099,
            month: 1,
            days: vec!["mon".to_string()],
            start: Some("10:00".to_string()),
            end: Some("12:00".to_string()),
            break_minutes: Some(0),
            force: false,
        });
        assert_eq!(generated.exit_code, 0, "{}", generated.output);
        let payload = parse_payload(&generated.output);
        assert_eq!(payload["data"]["created"], 16);

        let dates = availability::dates(DatesArgs {
            specialist: specialist_id,
            year: 2099,
            month: 1,
            duration: 60,
        });
        let payload = parse_payload(&dates.output);
        assert_eq!(payload["data"]["dates"].as_array().expect("dates").len(), 4);

        let times = availability::times(TimesArgs {
            specialist: specialist_id,
            date: "2099-01-05".to_string(),
            duration: 60,
        });
        let payload = parse_payload(&times.output);
        let windows = payload["data"]["windows"].as_array().expect("windows");
        assert_eq!(windows.len(), 3);
        assert_eq!(windows[0]["start"], "10:00");

        let reserved = booking::reserve(ReserveArgs {
            specialist: specialist_id,
            date: "05.01.2099".to_string(),
            time: "10:00".to_string(),
            duration: 60,
            client: 42,
        });
        assert_eq!(reserved.exit_code, 0, "{}", reserved.output);
        let payload = parse_payload(&reserved.output);
        let anchor = payload["data"]["anchor"].as_i64().expect("anchor");

        let clash = booking::reserve(ReserveArgs {
            specialist: specialist_id,
            date: "2099-01-05".to_string(),
            time: "10:30".to_string(),
            duration: 60,
            client: 7,
        });
        assert_eq!(clash.exit_code, 1, "overlapping window must be refused");
        assert_eq!(parse_payload(&clash.output)["error_class"], "conflict");

        let moved = booking::move_appointment(MoveArgs {
            slot: anchor,
            specialist: specialist_id,
            date: "2099-01-12".to_string(),
            time: "11:00".to_string(),
            duration: 60,
            client: 42,
        });
        assert_eq!(moved.exit_code, 0, "{}", moved.output);
        let new_anchor =
            parse_payload(&moved.output)["data"]["anchor"].as_i64().expect("anchor");

        let listed = booking::list(ListArgs { client: 42 });
        let payload = parse_payload(&listed.output);
        let appointments = payload["data"]["appointments"].as_array().expect("appointments");
        assert_eq!(appointments.len(), 1);
        assert_eq!(appointments[0]["date"], "2099-01-12");

        let cancelled = booking::cancel(CancelArgs { slot: new_anchor });
        assert_eq!(cancelled.exit_code, 0);
        let again = booking::cancel(CancelArgs { slot: new_anchor });
        assert_eq!(again.exit_code, 1);
        assert_eq!(parse_payload(&again.output)["error_class"], "not_booked");
    });
}

#[test]
fn generate_refuses_to_drop_bookings_without_force() {
    let dir = TempDir::new().expect("temp dir");
    with_env(&[("SLOTBOT_DATABASE_URL", &file_db_url(&dir))], || {
        assert_eq!(migrate::run().exit_code, 0);
        let added = specialist::add(AddSpecialistArgs {
            name: "Boris".to_string(),
            specialization: String::new(),
            timezone: String::new(),
        });
        let specialist_id =
            parse_payload(&added.output)["data"]["id"].as_i64().expect("specialist id");

        let args = |force| GenerateArgs {
            specialist: specialist_id,
            year: 2099,
            month: 1,
            days: vec!["mon".to_string()],
            start: Some("10:00".to_string()),
            end: Some("11:00".to_string()),
            break_minutes: Some(0),
            force,
        };
        assert_eq!(schedule::generate(args(false)).exit_code, 0);

        let reserved = booking::reserve(ReserveArgs {
            specialist: specialist_id,
            date: "2099-01-05".to_string(),
            time: "10:00".to_string(),
            duration: 30,
            client: 42,
        });
        assert_eq!(reserved.exit_code, 0);

        let refused = schedule::generate(args(false));
        assert_eq!(refused.exit_code, 7, "{}", refused.output);
        assert_eq!(parse_payload(&refused.output)["error_class"], "booked_slots");

        let forced = schedule::generate(args(true));
        assert_eq!(forced.exit_code, 0, "{}", forced.output);
        assert_eq!(parse_payload(&forced.output)["data"]["cancelled"], 1);

        let listed = booking::list(ListArgs { client: 42 });
        assert!(parse_payload(&listed.output)["data"]["appointments"]
            .as_array()
            .expect("appointments")
            .is_empty());
    });
}

#[test]
fn overview_reports_day_statuses() {
    let dir = TempDir::new().expect("temp dir");
    with_env(&[("SLOTBOT_DATABASE_URL", &file_db_url(&dir))], || {
        assert_eq!(migrate::run().exit_code, 0);
        let added = specialist::add(AddSpecialistArgs {
            name: "Clara".to_string(),
            specialization: String::new(),
            timezone: String::new(),
        });
        let specialist_id =
            parse_payload(&added.output)["data"]["id"].as_i64().expect("specialist id");

        schedule::generate(GenerateArgs {
            specialist: specialist_id,
            year: 2099,
            month: 1,
            days: vec!["mon".to_string()],
            start: Some("10:00".to_string()),
            end: Some("11:00".to_string()),
            break_minutes: Some(0),
            force: false,
        });

        booking::reserve(ReserveArgs {
            specialist: specialist_id,
            date: "2099-01-05".to_string(),
            time: "10:00".to_string(),
            duration: 60,
            client: 42,
        });

        let overview = availability::overview(OverviewArgs {
            specialist: specialist_id,
            year: 2099,
            month: 1,
        });
        let payload = parse_payload(&overview.output);
        assert_eq!(payload["data"]["days"]["2099-01-05"], "busy");
        assert_eq!(payload["data"]["days"]["2099-01-12"], "open");
    });
}

#[test]
fn service_catalog_and_slot_blocking() {
    let dir = TempDir::new().expect("temp dir");
    with_env(&[("SLOTBOT_DATABASE_URL", &file_db_url(&dir))], || {
        assert_eq!(migrate::run().exit_code, 0);
        let added = specialist::add(AddSpecialistArgs {
            name: "Dana".to_string(),
            specialization: String::new(),
            timezone: String::new(),
        });
        let specialist_id =
            parse_payload(&added.output)["data"]["id"].as_i64().expect("specialist id");

        let bad_cost = service::add(AddServiceArgs {
            specialist: specialist_id,
            name: "Massage".to_string(),
            duration: 60,
            cost: "cheap".to_string(),
        });
        assert_eq!(bad_cost.exit_code, 2);
        assert_eq!(parse_payload(&bad_cost.output)["error_class"], "invalid_args");

        let added = service::add(AddServiceArgs {
            specialist: specialist_id,
            name: "Massage".to_string(),
            duration: 60,
            cost: "25.50".to_string(),
        });
        assert_eq!(added.exit_code, 0, "{}", added.output);

        let listed = service::list(ListServicesArgs { specialist: specialist_id });
        let payload = parse_payload(&listed.output);
        let services = payload["data"]["services"].as_array().expect("services");
        assert_eq!(services.len(), 1);
        assert_eq!(services[0]["slots_needed"], 2);
        assert_eq!(services[0]["cost"], "25.50");

        schedule::generate(GenerateArgs {
            specialist: specialist_id,
            year: 2099,
            month: 1,
            days: vec!["mon".to_string()],
            start: Some("10:00".to_string()),
            end: Some("11:00".to_string()),
            break_minutes: Some(0),
            force: false,
        });

        let times = availability::times(TimesArgs {
            specialist: specialist_id,
            date: "2099-01-05".to_string(),
            duration: 30,
        });
        let payload = parse_payload(&times.output);
        let slot =
            payload["data"]["windows"][0]["slot_ids"][0].as_i64().expect("slot id");

        assert_eq!(schedule::block_slot(SlotArgs { slot }).exit_code, 0);
        let blocked_again = schedule::block_slot(SlotArgs { slot });
        assert_eq!(blocked_again.exit_code, 1);
        assert_eq!(parse_payload(&blocked_again.output)["error_class"], "not_free");

        let times = availability::times(TimesArgs {
            specialist: specialist_id,
            date: "2099-01-05".to_string(),
            duration: 30,
        });
        let payload = parse_payload(&times.output);
        assert_eq!(payload["data"]["windows"][0]["start"], "10:30");

        assert_eq!(schedule::unblock_slot(SlotArgs { slot }).exit_code, 0);
        let reopened_again = schedule::unblock_slot(SlotArgs { slot });
        assert_eq!(reopened_again.exit_code, 1);
        assert_eq!(parse_payload(&reopened_again.output)["error_class"], "not_closed");
    });
}

fn file_db_url(dir: &TempDir) -> String {
    format!("sqlite://{}?mode=rwc", dir.path().join("slotbot.db").display())
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "SLOTBOT_DATABASE_URL",
        "SLOTBOT_DATABASE_MAX_CONNECTIONS",
        "SLOTBOT_DATABASE_TIMEOUT_SECS",
        "SLOTBOT_DATABASE_BUSY_TIMEOUT_MS",
        "SLOTBOT_SCHEDULE_DAY_START",
        "SLOTBOT_SCHEDULE_DAY_END",
        "SLOTBOT_SCHEDULE_BREAK_MINUTES",
        "SLOTBOT_LOGGING_LEVEL",
        "SLOTBOT_LOGGING_FORMAT",
        "SLOTBOT_LOG_LEVEL",
        "SLOTBOT_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, value) in previous_values {
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
    }
}
