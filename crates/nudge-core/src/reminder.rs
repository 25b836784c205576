//! Reminder entity and creation input

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use nudge_notify::AiRole;
use nudge_util::{NudgeError, NudgeResult, OwnerId, ReminderId};
use serde::{Deserialize, Serialize};

pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 500;
pub const AI_PROMPT_MAX_CHARS: usize = 1000;
pub const MAX_OCCURRENCES_LIMIT: u32 = 365;

/// What a reminder delivers when it fires
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReminderKind {
    /// Plain text reminder
    Simple {
        #[serde(default)]
        description: String,
    },

    /// Prompt sent to the AI responder at fire time; the answer is delivered
    AiQuery {
        prompt: String,
        #[serde(default)]
        role: AiRole,
    },
}

impl ReminderKind {
    pub fn simple(description: impl Into<String>) -> Self {
        Self::Simple {
            description: description.into(),
        }
    }

    pub fn ai_query(prompt: impl Into<String>, role: AiRole) -> Self {
        Self::AiQuery {
            prompt: prompt.into(),
            role,
        }
    }
}

/// Recurrence rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    /// Fires once
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Recurrence {
    pub fn is_recurring(&self) -> bool {
        !matches!(self, Recurrence::None)
    }
}

fn default_true() -> bool {
    true
}

fn default_interval() -> u32 {
    1
}

/// A stored reminder.
///
/// Callers only ever hold copies; mutations go back through
/// [`crate::ReminderManager`], which rewrites the whole record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: ReminderId,
    pub owner_id: OwnerId,
    pub title: String,
    pub kind: ReminderKind,

    /// First (or only) firing date, in the service offset
    pub remind_date: NaiveDate,
    /// Time of day every occurrence fires at
    pub remind_time: NaiveTime,
    pub created_at: DateTime<FixedOffset>,

    /// One-shot reminders only; terminal once true
    #[serde(default)]
    pub is_sent: bool,
    /// False is terminal for recurring reminders and marks deletion for all
    #[serde(default = "default_true")]
    pub is_active: bool,

    #[serde(default)]
    pub recurrence: Recurrence,
    #[serde(default = "default_interval")]
    pub recurrence_interval: u32,
    /// Day of month for monthly reminders (clamped to the month length)
    #[serde(default)]
    pub monthly_day: Option<u32>,
    /// Weekday indices, 0 = Monday. Stored only; weekly reminders advance by whole weeks.
    #[serde(default)]
    pub weekly_days: Option<Vec<u8>>,
    /// Inclusive cutoff date
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub max_occurrences: Option<u32>,
    #[serde(default)]
    pub occurrence_count: u32,
    /// Date of the next firing of a recurring reminder
    #[serde(default)]
    pub next_occurrence: Option<NaiveDate>,
}

impl Reminder {
    /// Build a fresh record from creation input
    pub fn from_new(new: NewReminder, created_at: DateTime<FixedOffset>) -> Self {
        let next_occurrence = new.recurrence.is_recurring().then_some(new.remind_date);

        Self {
            id: ReminderId::new(),
            owner_id: new.owner_id,
            title: new.title,
            kind: new.kind,
            remind_date: new.remind_date,
            remind_time: new.remind_time,
            created_at,
            is_sent: false,
            is_active: true,
            recurrence: new.recurrence,
            recurrence_interval: new.recurrence_interval,
            monthly_day: new.monthly_day,
            weekly_days: new.weekly_days,
            end_date: new.end_date,
            max_occurrences: new.max_occurrences,
            occurrence_count: 0,
            next_occurrence,
        }
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_recurring()
    }

    /// Base date for the next occurrence
    pub fn anchor(&self) -> NaiveDate {
        self.next_occurrence.unwrap_or(self.remind_date)
    }

    /// Check field lengths and ranges
    pub fn validate(&self) -> NudgeResult<()> {
        let title_len = self.title.chars().count();
        if self.title.trim().is_empty() {
            return Err(NudgeError::validation("title cannot be empty"));
        }
        if title_len > TITLE_MAX_CHARS {
            return Err(NudgeError::validation(format!(
                "title is {title_len} characters, maximum is {TITLE_MAX_CHARS}"
            )));
        }

        match &self.kind {
            ReminderKind::Simple { description } => {
                let len = description.chars().count();
                if len > DESCRIPTION_MAX_CHARS {
                    return Err(NudgeError::validation(format!(
                        "description is {len} characters, maximum is {DESCRIPTION_MAX_CHARS}"
                    )));
                }
            }
            ReminderKind::AiQuery { prompt, .. } => {
                let len = prompt.chars().count();
                if prompt.trim().is_empty() {
                    return Err(NudgeError::validation("AI prompt cannot be empty"));
                }
                if len > AI_PROMPT_MAX_CHARS {
                    return Err(NudgeError::validation(format!(
                        "AI prompt is {len} characters, maximum is {AI_PROMPT_MAX_CHARS}"
                    )));
                }
            }
        }

        if self.recurrence_interval == 0 {
            return Err(NudgeError::validation("recurrence interval must be at least 1"));
        }

        if let Some(day) = self.monthly_day
            && !(1..=31).contains(&day)
        {
            return Err(NudgeError::validation(format!(
                "monthly day must be between 1 and 31, got {day}"
            )));
        }

        if let Some(days) = &self.weekly_days
            && let Some(bad) = days.iter().find(|d| **d > 6)
        {
            return Err(NudgeError::validation(format!(
                "weekday index must be between 0 and 6, got {bad}"
            )));
        }

        if let Some(max) = self.max_occurrences
            && !(1..=MAX_OCCURRENCES_LIMIT).contains(&max)
        {
            return Err(NudgeError::validation(format!(
                "max occurrences must be between 1 and {MAX_OCCURRENCES_LIMIT}, got {max}"
            )));
        }

        if self.is_recurring()
            && let Some(end) = self.end_date
            && end < self.remind_date
        {
            return Err(NudgeError::validation(format!(
                "end date {end} is before the first reminder date {}",
                self.remind_date
            )));
        }

        Ok(())
    }
}

/// Input for [`crate::ReminderManager::create`]
#[derive(Debug, Clone, PartialEq)]
pub struct NewReminder {
    pub owner_id: OwnerId,
    pub title: String,
    pub kind: ReminderKind,
    pub remind_date: NaiveDate,
    pub remind_time: NaiveTime,
    pub recurrence: Recurrence,
    pub recurrence_interval: u32,
    pub monthly_day: Option<u32>,
    pub weekly_days: Option<Vec<u8>>,
    pub end_date: Option<NaiveDate>,
    pub max_occurrences: Option<u32>,
}

impl NewReminder {
    /// One-shot reminder with the given kind
    pub fn new(
        owner_id: OwnerId,
        title: impl Into<String>,
        kind: ReminderKind,
        remind_date: NaiveDate,
        remind_time: NaiveTime,
    ) -> Self {
        Self {
            owner_id,
            title: title.into(),
            kind,
            remind_date,
            remind_time,
            recurrence: Recurrence::None,
            recurrence_interval: 1,
            monthly_day: None,
            weekly_days: None,
            end_date: None,
            max_occurrences: None,
        }
    }

    pub fn simple(
        owner_id: OwnerId,
        title: impl Into<String>,
        description: impl Into<String>,
        remind_date: NaiveDate,
        remind_time: NaiveTime,
    ) -> Self {
        Self::new(
            owner_id,
            title,
            ReminderKind::simple(description),
            remind_date,
            remind_time,
        )
    }

    pub fn ai_query(
        owner_id: OwnerId,
        title: impl Into<String>,
        prompt: impl Into<String>,
        role: AiRole,
        remind_date: NaiveDate,
        remind_time: NaiveTime,
    ) -> Self {
        Self::new(
            owner_id,
            title,
            ReminderKind::ai_query(prompt, role),
            remind_date,
            remind_time,
        )
    }

    /// Repeat every `interval` units of `recurrence`
    pub fn repeating(mut self, recurrence: Recurrence, interval: u32) -> Self {
        self.recurrence = recurrence;
        self.recurrence_interval = interval;
        self
    }

    pub fn on_month_day(mut self, day: u32) -> Self {
        self.monthly_day = Some(day);
        self
    }

    pub fn on_weekdays(mut self, days: Vec<u8>) -> Self {
        self.weekly_days = Some(days);
        self
    }

    pub fn until(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    pub fn max_occurrences(mut self, max: u32) -> Self {
        self.max_occurrences = Some(max);
        self
    }
}
