/// Daily habit reminders
///
/// The registry is a plain value rebuilt from the full habit set whenever
/// habits change. It is never patched in place, so a deleted or edited habit
/// can't leave a stale reminder behind.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::domain::{FrequencyDays, HabitId, HabitRecord, ReminderTime, UserId};

/// One habit's reminder
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reminder {
    pub habit_id: HabitId,
    pub user_id: UserId,
    pub habit_name: String,
    pub time: ReminderTime,
    pub days: FrequencyDays,
}

impl Reminder {
    /// When this reminder fires on `date`, if the habit is due that day
    pub fn fires_on(&self, date: NaiveDate) -> Option<NaiveDateTime> {
        self.days
            .is_scheduled(date)
            .then(|| date.and_time(self.time.time()))
    }
}

/// A reminder occurrence at a concrete local time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduledReminder<'a> {
    pub at: NaiveDateTime,
    pub reminder: &'a Reminder,
}

/// All reminders of the current habit set
#[derive(Debug, Clone, Default)]
pub struct ReminderRegistry {
    reminders: Vec<Reminder>,
}

impl ReminderRegistry {
    /// Build the registry from scratch
    ///
    /// Habits without a reminder time are skipped.
    pub fn rebuild(habits: &[HabitRecord]) -> Self {
        let mut reminders: Vec<Reminder> = habits
            .iter()
            .filter_map(|habit| {
                habit.reminder_time.map(|time| Reminder {
                    habit_id: habit.id.clone(),
                    user_id: habit.user_id.clone(),
                    habit_name: habit.name.clone(),
                    time,
                    days: habit.frequency_days.clone(),
                })
            })
            .collect();

        reminders.sort_by(|a, b| a.time.cmp(&b.time).then_with(|| a.habit_id.cmp(&b.habit_id)));

        tracing::debug!("Rebuilt reminder registry with {} reminders", reminders.len());
        Self { reminders }
    }

    pub fn len(&self) -> usize {
        self.reminders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reminders.is_empty()
    }

    pub fn reminders(&self) -> &[Reminder] {
        &self.reminders
    }

    /// Reminders firing in the half-open window `(from, to]`
    pub fn due_between(&self, from: NaiveDateTime, to: NaiveDateTime) -> Vec<ScheduledReminder<'_>> {
        let mut due = Vec::new();
        if to <= from {
            return due;
        }

        let mut date = from.date();
        while date <= to.date() {
            for reminder in &self.reminders {
                if let Some(at) = reminder.fires_on(date) {
                    if at > from && at <= to {
                        due.push(ScheduledReminder { at, reminder });
                    }
                }
            }
            date = match date.succ_opt() {
                Some(next) => next,
                None => break,
            };
        }

        due.sort_by(|a, b| a.at.cmp(&b.at));
        due
    }

    /// The next `limit` occurrences strictly after `after`
    pub fn upcoming(&self, after: NaiveDateTime, limit: usize) -> Vec<ScheduledReminder<'_>> {
        // every reminder fires at least once a week
        let mut next = self.due_between(after, after + Duration::days(8));
        next.truncate(limit);
        next
    }
}
