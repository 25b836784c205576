//! Periodic delivery loop
//!
//! Every period the scheduler asks the manager for due reminders, delivers
//! them one at a time and records each successful firing. A reminder whose
//! delivery fails is left untouched and comes back on the next tick.

use chrono::{DateTime, FixedOffset};
use nudge_notify::{AiResponder, Notifier};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::{Reminder, ReminderKind, ReminderManager, render};

/// Default time between ticks
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(60);

/// Outcome of one pass over the due reminders
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Reminders found due
    pub due: usize,
    /// Messages handed to the notifier
    pub delivered: usize,
    /// Reminders left due because sending failed
    pub failed: usize,
}

struct SchedulerInner {
    manager: Arc<ReminderManager>,
    notifier: Arc<dyn Notifier>,
    responder: Arc<dyn AiResponder>,
}

struct RunningLoop {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Background firing loop with an explicit Stopped/Running state
pub struct Scheduler {
    inner: Arc<SchedulerInner>,
    period: Duration,
    running: Mutex<Option<RunningLoop>>,
}

impl Scheduler {
    pub fn new(
        manager: Arc<ReminderManager>,
        notifier: Arc<dyn Notifier>,
        responder: Arc<dyn AiResponder>,
        period: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                manager,
                notifier,
                responder,
            }),
            period,
            running: Mutex::new(None),
        }
    }

    /// Spawn the loop on the current tokio runtime.
    ///
    /// Returns `false` without spawning if a loop is already running.
    pub fn start(&self) -> bool {
        let Ok(mut running) = self.running.lock() else {
            error!("Scheduler state lock poisoned");
            return false;
        };

        if let Some(current) = running.as_ref()
            && !current.handle.is_finished()
        {
            debug!("Scheduler already running");
            return false;
        }

        let (shutdown, rx) = watch::channel(false);
        let inner = self.inner.clone();
        let period = self.period;
        let handle = tokio::spawn(async move { inner.run(period, rx).await });

        *running = Some(RunningLoop { shutdown, handle });
        info!(period_secs = self.period.as_secs_f64(), "Scheduler started");
        true
    }

    /// Signal the loop to stop and wait for it to exit.
    ///
    /// A tick in progress runs to completion first. No-op when stopped.
    pub async fn stop(&self) {
        let current = match self.running.lock() {
            Ok(mut running) => running.take(),
            Err(_) => {
                error!("Scheduler state lock poisoned");
                return;
            }
        };

        let Some(RunningLoop { shutdown, handle }) = current else {
            return;
        };

        let _ = shutdown.send(true);
        if let Err(e) = handle.await {
            error!(error = %e, "Scheduler task ended abnormally");
        }
        info!("Scheduler stopped");
    }

    pub fn is_running(&self) -> bool {
        self.running
            .lock()
            .map(|running| {
                running
                    .as_ref()
                    .is_some_and(|current| !current.handle.is_finished())
            })
            .unwrap_or(false)
    }

    /// Deliver everything due at `now`
    pub async fn tick(&self, now: DateTime<FixedOffset>) -> TickReport {
        self.inner.tick(now).await
    }
}

impl SchedulerInner {
    async fn run(&self, period: Duration, mut shutdown: watch::Receiver<bool>) {
        loop {
            let report = self.tick(nudge_util::now()).await;
            if report.due > 0 {
                info!(
                    due = report.due,
                    delivered = report.delivered,
                    failed = report.failed,
                    "Scheduler tick complete"
                );
            }

            tokio::select! {
                _ = tokio::time::sleep(period) => {}
                _ = shutdown.changed() => {
                    debug!("Scheduler received shutdown");
                    break;
                }
            }
        }
    }

    async fn tick(&self, now: DateTime<FixedOffset>) -> TickReport {
        let due = self.manager.due_reminders(now);
        let mut report = TickReport {
            due: due.len(),
            ..TickReport::default()
        };

        for reminder in due {
            if self.deliver(&reminder).await {
                report.delivered += 1;
                if !self.manager.mark_fired(&reminder.id) {
                    warn!(reminder_id = %reminder.id, "Delivered but firing not recorded");
                }
            } else {
                report.failed += 1;
            }
        }

        report
    }

    /// Render and send one reminder; `true` if the notifier accepted it
    async fn deliver(&self, reminder: &Reminder) -> bool {
        let text = match &reminder.kind {
            ReminderKind::Simple { .. } => render::simple_message(reminder),
            ReminderKind::AiQuery { prompt, role } => {
                match self
                    .responder
                    .respond(prompt, reminder.owner_id, *role)
                    .await
                {
                    Ok(answer) => render::ai_answer_message(reminder, &answer),
                    Err(e) => {
                        warn!(reminder_id = %reminder.id, error = %e, "AI responder failed");
                        render::ai_failure_message(reminder, &e.to_string())
                    }
                }
            }
        };

        match self.notifier.send(reminder.owner_id, &text).await {
            Ok(()) => {
                info!(
                    reminder_id = %reminder.id,
                    owner_id = %reminder.owner_id,
                    "Reminder delivered"
                );
                true
            }
            Err(e) => {
                error!(
                    reminder_id = %reminder.id,
                    owner_id = %reminder.owner_id,
                    error = %e,
                    "Reminder delivery failed"
                );
                false
            }
        }
    }
}
