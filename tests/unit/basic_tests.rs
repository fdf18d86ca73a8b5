/// Basic unit tests to verify core functionality
use habit_streaks::*;
use tempfile::NamedTempFile;

#[cfg(test)]
mod basic_unit_tests {
    use super::*;

    fn day(s: &str) -> chrono::NaiveDate {
        parse_calendar_date(s).expect("valid date")
    }

    #[test]
    fn test_habit_creation() {
        let habit = HabitRecord::new(
            UserId::new("alice").unwrap(),
            "Test Habit".to_string(),
            FrequencyDays::new([1, 3, 5]).unwrap(),
            None,
            Some(ReminderTime::parse("07:30").unwrap()),
            Some(day("2024-01-01")),
        );

        assert!(habit.is_ok());
        let habit = habit.unwrap();
        assert_eq!(habit.name, "Test Habit");
        assert_eq!(habit.frequency_days.display(), "Mon, Wed, Fri");
        assert_eq!(habit.streak, 0);
    }

    #[test]
    fn test_habit_validation() {
        let user = UserId::new("alice").unwrap();
        let blank = HabitRecord::new(user.clone(), "   ".to_string(), FrequencyDays::daily(), None, None, None);
        assert!(matches!(blank, Err(DomainError::InvalidHabitName(_))));

        assert!(FrequencyDays::new([7]).is_err());
        assert!(ReminderTime::parse("7:30pm").is_err());
        assert!(UserId::new("  ").is_err());
    }

    #[test]
    fn test_calendar_dates() {
        assert!(parse_calendar_date("2024-02-29").is_ok());
        assert!(parse_calendar_date("2023-02-29").is_err());
        assert!(parse_calendar_date("2024-1-05").is_err());
        assert_eq!(parse_start_date("2024-03-01T10:00:00Z").unwrap(), day("2024-03-01"));
        assert_eq!(format_calendar_date(day("2024-03-01")), "2024-03-01");
    }

    #[test]
    fn test_completion_toggle_refreshes_cache() {
        let mut habit = HabitRecord::new(
            UserId::new("alice").unwrap(),
            "Floss".to_string(),
            FrequencyDays::daily(),
            None,
            None,
            Some(day("2024-01-01")),
        )
        .unwrap();

        assert!(habit.mark_complete(day("2024-01-01")));
        assert!(habit.mark_complete(day("2024-01-02")));
        assert!(!habit.mark_complete(day("2024-01-02")));
        let stats = habit.refresh_stats(day("2024-01-02"));

        assert_eq!(stats.current_streak, 2);
        assert_eq!(habit.streak, 2);
        assert_eq!(habit.longest_streak, 2);
        assert_eq!(habit.completed_dates.len(), 2);
    }

    #[test]
    fn test_avatar_rewards() {
        assert_eq!(Accessory::reward_for_streak(7), Accessory::Glasses);
        assert!(Avatar::new(None, None, Accessory::Bowtie, 14).is_err());
        assert!(Avatar::new(None, None, Accessory::Bowtie, 15).is_ok());
    }

    #[test]
    fn test_server_creation() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let server = HabitServer::new(temp_file.path(), UserId::new("alice").unwrap());
        assert!(server.is_ok());
        assert_eq!(server.unwrap().user_id().as_str(), "alice");
    }

    #[test]
    fn test_storage_creation() {
        let temp_file = NamedTempFile::new().expect("Failed to create temp file");
        let storage = SqliteStorage::new(temp_file.path()).expect("Failed to create storage");

        let habits = storage.list_habits(&UserId::new("alice").unwrap()).unwrap();
        assert!(habits.is_empty());
    }
}
