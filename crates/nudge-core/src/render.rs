//! Plain-text notification bodies

use chrono::NaiveDate;
use nudge_util::{format_date, format_time};
use std::fmt::Write;

use crate::{Reminder, ReminderKind, advance_after_firing, describe_recurrence};

/// Date the reminder fires after the current occurrence, if it keeps recurring
pub fn upcoming_occurrence(reminder: &Reminder) -> Option<NaiveDate> {
    if !reminder.is_recurring() {
        return None;
    }
    let mut after = reminder.clone();
    advance_after_firing(&mut after);
    if after.is_active {
        after.next_occurrence
    } else {
        None
    }
}

/// Message for a plain reminder
pub fn simple_message(reminder: &Reminder) -> String {
    let mut text = format!("⏰ Reminder!\n\n📌 {}\n", reminder.title);
    if let ReminderKind::Simple { description } = &reminder.kind
        && !description.is_empty()
    {
        let _ = writeln!(text, "📝 {description}");
    }
    let _ = write!(
        text,
        "\n🗓 Date: {}\n🕐 Time: {}\n🔄 Repeats: {}",
        format_date(&reminder.anchor()),
        format_time(&reminder.remind_time),
        describe_recurrence(reminder)
    );
    push_next(&mut text, reminder, "Next reminder");
    text
}

/// Message carrying the AI responder's answer
pub fn ai_answer_message(reminder: &Reminder, answer: &str) -> String {
    let mut text = format!("🤖 AI reminder: {}\n\n", reminder.title);
    if let ReminderKind::AiQuery { prompt, role } = &reminder.kind {
        let _ = write!(text, "Query ({role}): {prompt}\n\n");
    }
    let _ = write!(
        text,
        "Answer:\n{answer}\n\n🔄 Repeats: {}",
        describe_recurrence(reminder)
    );
    push_next(&mut text, reminder, "Next AI query");
    text
}

/// Notice sent instead of an answer when the AI provider fails
pub fn ai_failure_message(reminder: &Reminder, error: &str) -> String {
    let mut text = format!(
        "❌ AI reminder failed: {}\n\nCould not get an answer: {error}",
        reminder.title
    );
    push_next(&mut text, reminder, "Next attempt");
    text
}

fn push_next(text: &mut String, reminder: &Reminder, label: &str) {
    if let Some(next) = upcoming_occurrence(reminder) {
        let _ = write!(
            text,
            "\n\n⏭ {label}: {} at {}",
            format_date(&next),
            format_time(&reminder.remind_time)
        );
    }
}
