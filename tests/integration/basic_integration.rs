/// Basic integration tests
use chrono::{Duration, NaiveDate};
use habit_streaks::tools::{self, CreateHabitParams, HabitIdParams, ToggleHabitParams, ToolError, UpdateHabitParams};
use habit_streaks::*;
use tempfile::NamedTempFile;

fn day(s: &str) -> NaiveDate {
    parse_calendar_date(s).expect("valid date")
}

fn create(storage: &SqliteStorage, user: &UserId, name: &str, reminder: Option<&str>, today: NaiveDate) -> String {
    tools::create_habit(
        storage,
        user,
        CreateHabitParams {
            name: name.to_string(),
            frequency_days: vec![0, 1, 2, 3, 4, 5, 6],
            color: None,
            reminder_time: reminder.map(str::to_string),
            start_date: None,
        },
        today,
    )
    .expect("habit created")
    .habit
    .id
}

#[cfg(test)]
mod basic_integration_tests {
    use super::*;

    #[test]
    fn test_week_of_completions() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let storage = SqliteStorage::new(temp_file.path()).expect("Failed to create storage");
        let user = UserId::new("alice").unwrap();
        let start = day("2024-04-01");
        let id = create(&storage, &user, "Meditate", None, start);

        let mut last = None;
        for offset in 0..7 {
            let today = start + Duration::days(offset);
            let response = tools::complete_habit(
                &storage,
                &user,
                ToggleHabitParams { habit_id: id.clone(), date: None },
                today,
            )
            .expect("completed");
            last = Some(response);
        }

        let last = last.unwrap();
        assert_eq!(last.stats.current_streak, 7);
        assert_eq!(last.stats.longest_streak, 7);
        assert_eq!(last.stats.total_days, 7);
        assert!((last.stats.completion_rate - 100.0).abs() < 1e-9);

        // skipping a day drops the current streak but keeps the record
        let later = day("2024-04-09");
        let stats = tools::habit_stats(
            &storage,
            &AnalyticsEngine::new(),
            &user,
            HabitIdParams { habit_id: id.clone() },
            later,
        )
        .unwrap();
        assert_eq!(stats.stats.current_streak, 0);
        assert_eq!(stats.stats.longest_streak, 7);
        assert_eq!(stats.stats.total_days, 9);
    }

    #[test]
    fn test_database_persistence() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let user = UserId::new("alice").unwrap();
        let today = day("2024-04-01");

        let id = {
            let server = HabitServer::new(temp_file.path(), user.clone()).expect("Failed to create first server");
            let id = create(server.storage(), &user, "Journal", Some("21:00"), today);
            tools::complete_habit(
                server.storage(),
                &user,
                ToggleHabitParams { habit_id: id.clone(), date: None },
                today,
            )
            .unwrap();
            id
        };

        let server = HabitServer::new(temp_file.path(), user.clone()).expect("Failed to create second server");
        let habits = server.storage().list_habits(&user).unwrap();
        assert_eq!(habits.len(), 1);
        assert_eq!(habits[0].id.to_string(), id);
        assert_eq!(habits[0].streak, 1);
        assert!(habits[0].is_completed_on(today));
        assert_eq!(server.storage().list_habits_with_reminders().unwrap().len(), 1);
    }

    #[test]
    fn test_rename_does_not_drop_completion_from_other_connection() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let editor = SqliteStorage::new(temp_file.path()).expect("Failed to create storage");
        let tracker = SqliteStorage::new(temp_file.path()).expect("Failed to open second handle");
        let user = UserId::new("alice").unwrap();
        let today = day("2024-04-01");
        let id = create(&editor, &user, "Read", None, today);

        tools::get_habit(&editor, &user, HabitIdParams { habit_id: id.clone() }, today).unwrap();
        tools::complete_habit(
            &tracker,
            &user,
            ToggleHabitParams { habit_id: id.clone(), date: None },
            today,
        )
        .unwrap();

        tools::update_habit(
            &editor,
            &user,
            UpdateHabitParams {
                habit_id: id.clone(),
                name: Some("Read fiction".to_string()),
                frequency_days: None,
                color: None,
                reminder_time: None,
            },
            today,
        )
        .unwrap();

        let habits = tracker.list_habits(&user).unwrap();
        assert_eq!(habits[0].name, "Read fiction");
        assert!(habits[0].is_completed_on(today));
        assert_eq!(habits[0].streak, 1);
        assert_eq!(habits[0].longest_streak, 1);
    }

    #[test]
    fn test_users_cannot_touch_each_others_habits() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let alice = UserId::new("alice").unwrap();
        let mallory = UserId::new("mallory").unwrap();
        let today = day("2024-04-01");
        let id = create(&storage, &alice, "Run", None, today);

        let result = tools::complete_habit(
            &storage,
            &mallory,
            ToggleHabitParams { habit_id: id.clone(), date: None },
            today,
        );
        assert!(matches!(result, Err(ToolError::Storage(StorageError::HabitNotFound { .. }))));

        let result = tools::delete_habit(&storage, &mallory, HabitIdParams { habit_id: id });
        assert!(result.is_err());
        assert_eq!(storage.list_habits(&alice).unwrap().len(), 1);
    }

    #[test]
    fn test_registry_follows_deletes() {
        let storage = SqliteStorage::open_in_memory().unwrap();
        let user = UserId::new("alice").unwrap();
        let today = day("2024-04-01");
        let keep = create(&storage, &user, "Stretch", Some("07:00"), today);
        let drop = create(&storage, &user, "Walk", Some("18:00"), today);

        let registry = ReminderRegistry::rebuild(&storage.list_habits_with_reminders().unwrap());
        assert_eq!(registry.len(), 2);

        tools::delete_habit(&storage, &user, HabitIdParams { habit_id: drop }).unwrap();
        let registry = ReminderRegistry::rebuild(&storage.list_habits_with_reminders().unwrap());

        let ids: Vec<String> = registry.reminders().iter().map(|r| r.habit_id.to_string()).collect();
        assert_eq!(ids, vec![keep]);
    }

    #[test]
    fn test_storage_interface() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let storage = SqliteStorage::new(temp_file.path()).expect("Failed to create storage");

        let dyn_storage: &dyn HabitStorage = &storage;
        let summary = tools::stats_summary(
            dyn_storage,
            &AnalyticsEngine::new(),
            &UserId::new("alice").unwrap(),
            day("2024-04-01"),
        )
        .unwrap();
        assert_eq!(summary.summary, UserSummary::default());
    }
}
