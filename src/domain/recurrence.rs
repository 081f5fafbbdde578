//! Recurrence matching for schedules and reminders.
//!
//! Two independent callers — the "today" agenda and the calendar-day detail
//! view — must agree on what "applies to this day" means, so the predicate
//! lives here once and is pure: literal rule in, calendar date in, boolean
//! out.

use chrono::{Datelike, NaiveDate};

use crate::domain::models::family::{Frequency, ReminderItem, ScheduleItem};

/// The fields recurrence matching needs, shared by schedules and reminders.
pub trait Recurrence {
    /// Target child; `None` means the rule applies to every child.
    fn child_id(&self) -> Option<&str>;
    fn frequency(&self) -> Frequency;
    /// Calendar date for `Once` rules.
    fn date(&self) -> Option<NaiveDate>;
    /// Sunday-first weekday (0-6) for `Weekly` rules.
    fn day_of_week(&self) -> Option<u8>;
}

impl Recurrence for ScheduleItem {
    fn child_id(&self) -> Option<&str> {
        self.child_id.as_deref()
    }
    fn frequency(&self) -> Frequency {
        self.frequency
    }
    fn date(&self) -> Option<NaiveDate> {
        self.date
    }
    fn day_of_week(&self) -> Option<u8> {
        self.day_of_week
    }
}

impl Recurrence for ReminderItem {
    fn child_id(&self) -> Option<&str> {
        self.child_id.as_deref()
    }
    fn frequency(&self) -> Frequency {
        self.frequency
    }
    fn date(&self) -> Option<NaiveDate> {
        self.date
    }
    fn day_of_week(&self) -> Option<u8> {
        self.day_of_week
    }
}

/// Does the rule apply on `target`, ignoring child scoping? Used by the
/// calendar month view, which marks days for the whole family.
///
/// Comparison is by calendar date and Sunday-first weekday number, never by
/// timestamp. A rule whose selected field is absent never matches.
pub fn matches_date<R: Recurrence + ?Sized>(rule: &R, target: NaiveDate) -> bool {
    match rule.frequency() {
        Frequency::Once => rule.date() == Some(target),
        Frequency::Weekly => {
            rule.day_of_week() == Some(target.weekday().num_days_from_sunday() as u8)
        }
    }
}

/// Does the rule apply on `target` for `child_id`? A scoped rule is
/// exclusive to its target child.
pub fn matches<R: Recurrence + ?Sized>(rule: &R, target: NaiveDate, child_id: &str) -> bool {
    if let Some(scoped) = rule.child_id() {
        if scoped != child_id {
            return false;
        }
    }
    matches_date(rule, target)
}
