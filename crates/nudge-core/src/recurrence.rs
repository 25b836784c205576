//! Recurrence engine
//!
//! Pure functions over a [`Reminder`] snapshot: when does it fire next, is it
//! due now, and how does its state move after a successful firing. Nothing
//! here touches the store or the clock.

use chrono::{DateTime, Datelike, Days, FixedOffset, NaiveDate};
use nudge_util::{combine, fixed_offset};

use crate::{Recurrence, Reminder};

/// Date of the occurrence after the current anchor, `None` for one-shot
/// reminders or when the date would leave the supported calendar range.
pub fn compute_next_occurrence(reminder: &Reminder) -> Option<NaiveDate> {
    let anchor = reminder.anchor();
    let interval = reminder.recurrence_interval;

    match reminder.recurrence {
        Recurrence::None => None,
        Recurrence::Daily => anchor.checked_add_days(Days::new(u64::from(interval))),
        Recurrence::Weekly => anchor.checked_add_days(Days::new(u64::from(interval) * 7)),
        Recurrence::Monthly => {
            let day = reminder.monthly_day.unwrap_or_else(|| anchor.day());
            add_months_clamped(anchor, interval, day)
        }
        Recurrence::Yearly => {
            let year = anchor.year().checked_add(i32::try_from(interval).ok()?)?;
            clamped_date(year, anchor.month(), anchor.day())
        }
    }
}

/// Whether the reminder should be delivered at `now`
pub fn is_ready_to_send(reminder: &Reminder, now: DateTime<FixedOffset>) -> bool {
    match reminder.recurrence {
        Recurrence::None => {
            reminder.is_active
                && !reminder.is_sent
                && combine(reminder.remind_date, reminder.remind_time).is_some_and(|at| now >= at)
        }
        Recurrence::Daily | Recurrence::Weekly | Recurrence::Monthly | Recurrence::Yearly => {
            if !reminder.is_active {
                return false;
            }

            if let Some(max) = reminder.max_occurrences
                && reminder.occurrence_count >= max
            {
                return false;
            }

            let today = now.with_timezone(&fixed_offset()).date_naive();
            if let Some(end) = reminder.end_date
                && today > end
            {
                return false;
            }

            combine(reminder.anchor(), reminder.remind_time).is_some_and(|at| now >= at)
        }
    }
}

/// Move a reminder past the occurrence that was just delivered.
///
/// Must run exactly once per successful delivery: one-shot reminders become
/// sent, recurring ones count the firing, move their anchor forward and
/// deactivate when the cap or the end date is passed.
pub fn advance_after_firing(reminder: &mut Reminder) {
    match reminder.recurrence {
        Recurrence::None => reminder.is_sent = true,
        Recurrence::Daily | Recurrence::Weekly | Recurrence::Monthly | Recurrence::Yearly => {
            reminder.occurrence_count = reminder.occurrence_count.saturating_add(1);
            reminder.next_occurrence = compute_next_occurrence(reminder);

            let exhausted = reminder
                .max_occurrences
                .is_some_and(|max| reminder.occurrence_count >= max);
            let past_end = match (reminder.end_date, reminder.next_occurrence) {
                (Some(end), Some(next)) => next > end,
                _ => false,
            };
            // No computable next date means the calendar ran out
            let stranded = reminder.next_occurrence.is_none();

            if exhausted || past_end || stranded {
                reminder.is_active = false;
            }
        }
    }
}

/// Human-readable cadence, e.g. "Every 2 weeks" or "Monthly on day 15"
pub fn describe_recurrence(reminder: &Reminder) -> String {
    let n = reminder.recurrence_interval;
    let every = |one: &str, many: &str| {
        if n == 1 {
            one.to_string()
        } else {
            format!("Every {n} {many}")
        }
    };

    match reminder.recurrence {
        Recurrence::None => "Once".to_string(),
        Recurrence::Daily => every("Daily", "days"),
        Recurrence::Weekly => every("Weekly", "weeks"),
        Recurrence::Monthly => {
            let base = every("Monthly", "months");
            match reminder.monthly_day {
                Some(day) => format!("{base} on day {day}"),
                None => base,
            }
        }
        Recurrence::Yearly => every("Yearly", "years"),
    }
}

fn add_months_clamped(anchor: NaiveDate, months: u32, day: u32) -> Option<NaiveDate> {
    let total = i64::from(anchor.year()) * 12 + i64::from(anchor.month0()) + i64::from(months);
    let year = i32::try_from(total.div_euclid(12)).ok()?;
    let month = u32::try_from(total.rem_euclid(12)).ok()? + 1;
    clamped_date(year, month, day)
}

/// `year-month-day`, with the day pulled back to the month's last day
fn clamped_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let last = last_day_of_month(year, month)?;
    NaiveDate::from_ymd_opt(year, month, day.min(last))
}

fn last_day_of_month(year: i32, month: u32) -> Option<u32> {
    let (next_year, next_month) = if month == 12 {
        (year.checked_add(1)?, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)?
        .pred_opt()
        .map(|d| d.day())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NewReminder, ReminderKind};
    use chrono::{NaiveTime, TimeZone};
    use nudge_util::OwnerId;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
        fixed_offset().with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn reminder(start: NaiveDate, recurrence: Recurrence, interval: u32) -> Reminder {
        let new = NewReminder::new(
            OwnerId::new(1),
            "test",
            ReminderKind::simple(""),
            start,
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        )
        .repeating(recurrence, interval);
        Reminder::from_new(new, at(2024, 1, 1, 0, 0))
    }

    #[test]
    fn one_shot_has_no_next_occurrence() {
        let r = reminder(date(2024, 1, 31), Recurrence::None, 1);
        assert_eq!(compute_next_occurrence(&r), None);
    }

    #[test]
    fn daily_crosses_month_boundary() {
        let mut r = reminder(date(2024, 1, 31), Recurrence::Daily, 1);
        assert_eq!(r.next_occurrence, Some(date(2024, 1, 31)));

        advance_after_firing(&mut r);
        assert_eq!(r.next_occurrence, Some(date(2024, 2, 1)));
        assert_eq!(r.occurrence_count, 1);
        assert!(r.is_active);
    }

    #[test]
    fn weekly_advances_whole_weeks_ignoring_weekdays() {
        let mut r = reminder(date(2024, 1, 1), Recurrence::Weekly, 2);
        r.weekly_days = Some(vec![2, 4]);
        assert_eq!(compute_next_occurrence(&r), Some(date(2024, 1, 15)));
    }

    #[test]
    fn monthly_day_31_clamps_to_end_of_february() {
        let leap = reminder(date(2024, 1, 31), Recurrence::Monthly, 1);
        assert_eq!(compute_next_occurrence(&leap), Some(date(2024, 2, 29)));

        let common = reminder(date(2023, 1, 31), Recurrence::Monthly, 1);
        assert_eq!(compute_next_occurrence(&common), Some(date(2023, 2, 28)));
    }

    #[test]
    fn monthly_explicit_day_and_year_carry() {
        let mut r = reminder(date(2024, 11, 5), Recurrence::Monthly, 3);
        r.monthly_day = Some(30);
        // Nov + 3 = Feb next year, day 30 clamps
        assert_eq!(compute_next_occurrence(&r), Some(date(2025, 2, 28)));

        r.monthly_day = Some(15);
        assert_eq!(compute_next_occurrence(&r), Some(date(2025, 2, 15)));

        let long = reminder(date(2024, 1, 10), Recurrence::Monthly, 25);
        assert_eq!(compute_next_occurrence(&long), Some(date(2026, 2, 10)));
    }

    #[test]
    fn monthly_without_day_follows_clamped_anchor() {
        let mut r = reminder(date(2024, 1, 31), Recurrence::Monthly, 1);
        advance_after_firing(&mut r);
        assert_eq!(r.next_occurrence, Some(date(2024, 2, 29)));
        advance_after_firing(&mut r);
        assert_eq!(r.next_occurrence, Some(date(2024, 3, 29)));
    }

    #[test]
    fn yearly_leap_day_clamps() {
        let r = reminder(date(2024, 2, 29), Recurrence::Yearly, 1);
        assert_eq!(compute_next_occurrence(&r), Some(date(2025, 2, 28)));

        let r = reminder(date(2024, 2, 29), Recurrence::Yearly, 4);
        assert_eq!(compute_next_occurrence(&r), Some(date(2028, 2, 29)));
    }

    #[test]
    fn future_reminder_is_not_ready() {
        let r = reminder(date(2024, 6, 1), Recurrence::None, 1);
        assert!(!is_ready_to_send(&r, at(2024, 6, 1, 8, 59)));
        assert!(is_ready_to_send(&r, at(2024, 6, 1, 9, 0)));
    }

    #[test]
    fn readiness_compares_instants_across_offsets() {
        let r = reminder(date(2024, 6, 1), Recurrence::None, 1);
        // 09:00 at UTC+3 is 06:00 UTC
        let utc = chrono::Utc.with_ymd_and_hms(2024, 6, 1, 5, 59, 0).unwrap();
        assert!(!is_ready_to_send(&r, utc.fixed_offset()));
        let utc = chrono::Utc.with_ymd_and_hms(2024, 6, 1, 6, 0, 0).unwrap();
        assert!(is_ready_to_send(&r, utc.fixed_offset()));
    }

    #[test]
    fn one_shot_firing_is_terminal_and_idempotent() {
        let mut r = reminder(date(2024, 6, 1), Recurrence::None, 1);
        let now = at(2024, 6, 2, 0, 0);
        assert!(is_ready_to_send(&r, now));

        advance_after_firing(&mut r);
        assert!(r.is_sent);
        assert_eq!(r.occurrence_count, 0);
        assert!(!is_ready_to_send(&r, now));
        assert!(!is_ready_to_send(&r, at(2030, 1, 1, 0, 0)));

        let snapshot = r.clone();
        advance_after_firing(&mut r);
        assert_eq!(r, snapshot);
    }

    #[test]
    fn inactive_one_shot_is_never_ready() {
        let mut r = reminder(date(2024, 6, 1), Recurrence::None, 1);
        r.is_active = false;
        assert!(!is_ready_to_send(&r, at(2024, 6, 2, 0, 0)));
    }

    #[test]
    fn recurring_uses_next_occurrence_as_anchor() {
        let mut r = reminder(date(2024, 6, 1), Recurrence::Daily, 1);
        advance_after_firing(&mut r);
        assert!(!is_ready_to_send(&r, at(2024, 6, 1, 23, 0)));
        assert!(is_ready_to_send(&r, at(2024, 6, 2, 9, 0)));
    }

    #[test]
    fn max_occurrences_deactivates_after_last_firing() {
        let mut r = reminder(date(2024, 6, 1), Recurrence::Daily, 1);
        r.max_occurrences = Some(3);

        for fired in 1..=3 {
            assert!(r.is_active);
            advance_after_firing(&mut r);
            assert_eq!(r.occurrence_count, fired);
        }

        assert!(!r.is_active);
        assert!(r.occurrence_count <= 3);
        assert!(!is_ready_to_send(&r, at(2024, 6, 10, 9, 0)));
        assert!(!is_ready_to_send(&r, at(2099, 1, 1, 0, 0)));
    }

    #[test]
    fn end_date_passed_by_next_occurrence_deactivates() {
        let mut r = reminder(date(2024, 6, 1), Recurrence::Weekly, 1);
        r.end_date = Some(date(2024, 6, 10));
        r.max_occurrences = Some(100);

        advance_after_firing(&mut r);
        assert_eq!(r.next_occurrence, Some(date(2024, 6, 8)));
        assert!(r.is_active);

        advance_after_firing(&mut r);
        assert_eq!(r.next_occurrence, Some(date(2024, 6, 15)));
        assert!(!r.is_active);
    }

    #[test]
    fn end_date_blocks_readiness_after_cutoff_day() {
        let mut r = reminder(date(2024, 6, 1), Recurrence::Daily, 1);
        r.end_date = Some(date(2024, 6, 1));
        assert!(is_ready_to_send(&r, at(2024, 6, 1, 23, 59)));
        assert!(!is_ready_to_send(&r, at(2024, 6, 2, 0, 0)));
    }

    #[test]
    fn next_occurrence_never_decreases() {
        for recurrence in [
            Recurrence::Daily,
            Recurrence::Weekly,
            Recurrence::Monthly,
            Recurrence::Yearly,
        ] {
            let mut r = reminder(date(2024, 1, 31), recurrence, 1);
            let mut previous = r.anchor();
            for _ in 0..30 {
                advance_after_firing(&mut r);
                let next = r.next_occurrence.unwrap();
                assert!(next >= previous, "{recurrence:?} went backwards");
                previous = next;
            }
        }
    }

    #[test]
    fn calendar_overflow_deactivates() {
        let mut r = reminder(NaiveDate::MAX, Recurrence::Daily, 1);
        advance_after_firing(&mut r);
        assert_eq!(r.next_occurrence, None);
        assert!(!r.is_active);
    }

    #[test]
    fn describes_cadence() {
        let mut r = reminder(date(2024, 1, 1), Recurrence::None, 1);
        assert_eq!(describe_recurrence(&r), "Once");

        r.recurrence = Recurrence::Daily;
        assert_eq!(describe_recurrence(&r), "Daily");
        r.recurrence_interval = 3;
        assert_eq!(describe_recurrence(&r), "Every 3 days");

        r.recurrence = Recurrence::Monthly;
        r.monthly_day = Some(15);
        assert_eq!(describe_recurrence(&r), "Every 3 months on day 15");

        r.recurrence_interval = 1;
        r.recurrence = Recurrence::Yearly;
        assert_eq!(describe_recurrence(&r), "Yearly");
    }

    #[test]
    fn instant_before_calendar_start_is_never_ready() {
        let mut r = reminder(NaiveDate::MIN, Recurrence::None, 1);
        r.remind_time = NaiveTime::MIN;
        assert!(!is_ready_to_send(&r, at(2024, 1, 1, 0, 0)));
    }
}
