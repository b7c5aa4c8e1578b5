//! Productivity intents
//!
//! Calendar, notes, tasks, email, news, and wake-on-lan. All stateless:
//! call the service, format a sentence, answer. Service failures degrade
//! to a spoken apology — a smart speaker cannot render a stack trace.

use chrono::{Duration, NaiveDate, Utc};

use crate::alexa::{Intent, ResponseEnvelope};
use crate::api::ApiState;
use crate::services::{CalendarEvent, EmailSummary};
use crate::Error;

use super::not_configured;

/// How many items a spoken list summary reads out
const SUMMARY_LIMIT: usize = 5;

fn service_failure(error: &Error, speech: &str) -> ResponseEnvelope {
    tracing::error!(error = %error, "service request failed");
    ResponseEnvelope::statement(speech)
}

/// Resolve the `event_date` slot, defaulting to today
fn slot_date(intent: &Intent) -> NaiveDate {
    intent
        .slot("event_date")
        .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
        .unwrap_or_else(|| Utc::now().date_naive())
}

fn format_events(events: &[CalendarEvent]) -> String {
    if events.is_empty() {
        return "nothing scheduled".to_string();
    }
    events
        .iter()
        .map(|e| e.summary.clone())
        .collect::<Vec<_>>()
        .join(", ")
}

async fn events_for_day(state: &ApiState, date: NaiveDate) -> crate::Result<Vec<CalendarEvent>> {
    let calendar = state
        .services
        .calendar
        .as_ref()
        .ok_or_else(|| Error::Calendar("not configured".into()))?;
    let start = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| Error::Calendar("invalid date".into()))?
        .and_utc();
    calendar.list_events(start, start + Duration::days(1)).await
}

/// `ListCalendarIntent` — events for a day (slot `event_date`, default today)
pub async fn list_calendar(state: &ApiState, intent: &Intent) -> ResponseEnvelope {
    if state.services.calendar.is_none() {
        return not_configured("calendar");
    }
    let date = slot_date(intent);
    match events_for_day(state, date).await {
        Ok(events) => {
            let speech = format!("Your events for {date} are: {}.", format_events(&events));
            ResponseEnvelope::statement(speech.clone()).with_card("Calendar", speech)
        }
        Err(e) => service_failure(&e, "Sorry, I could not reach your calendar."),
    }
}

/// `CreateCalendarIntent` — create an all-day event today (slot `event_query`)
pub async fn create_calendar(state: &ApiState, intent: &Intent) -> ResponseEnvelope {
    let Some(calendar) = &state.services.calendar else {
        return not_configured("calendar");
    };
    let summary = intent.slot("event_query").unwrap_or("No description");
    match calendar.create_event(summary, Utc::now().date_naive()).await {
        Ok(()) => {
            let speech = format!("Created event {summary}.");
            ResponseEnvelope::statement(speech.clone()).with_card("Create event", speech)
        }
        Err(e) => service_failure(&e, "Sorry, I could not create the event."),
    }
}

/// `ListTasksIntent` — next open tasks
pub async fn list_tasks(state: &ApiState) -> ResponseEnvelope {
    let Some(tasks) = &state.services.tasks else {
        return not_configured("tasks");
    };
    match tasks.list_open(SUMMARY_LIMIT).await {
        Ok(tasks) if tasks.is_empty() => {
            ResponseEnvelope::statement("You have no open tasks.")
        }
        Ok(tasks) => {
            let names: Vec<String> = tasks.into_iter().map(|t| t.summary).collect();
            let speech = format!("Your next {} tasks are: {}.", names.len(), names.join(", "));
            ResponseEnvelope::statement(speech.clone()).with_card("Tasks", speech)
        }
        Err(e) => service_failure(&e, "Sorry, I could not reach your tasks."),
    }
}

/// `CreateTaskIntent` — create a task (slot `task_name`)
pub async fn create_task(state: &ApiState, intent: &Intent) -> ResponseEnvelope {
    let Some(tasks) = &state.services.tasks else {
        return not_configured("tasks");
    };
    let name = intent.slot("task_name").unwrap_or("No description");
    match tasks.create(name).await {
        Ok(()) => {
            let speech = format!("Created task {name}.");
            ResponseEnvelope::statement(speech.clone()).with_card("Create task", speech)
        }
        Err(e) => service_failure(&e, "Sorry, I could not create the task."),
    }
}

/// `FinishTaskIntent` — complete a task by name (slot `task_name`)
pub async fn finish_task(state: &ApiState, intent: &Intent) -> ResponseEnvelope {
    let Some(tasks) = &state.services.tasks else {
        return not_configured("tasks");
    };
    let Some(name) = intent.slot("task_name") else {
        return ResponseEnvelope::question("Which task should I finish?");
    };
    match tasks.finish(name).await {
        Ok(task) => {
            let speech = format!("Finished task {}.", task.summary);
            ResponseEnvelope::statement(speech.clone()).with_card("Finish task", speech)
        }
        Err(e) => service_failure(&e, "Sorry, I could not find that task."),
    }
}

/// `ListNotesIntent` — titles of the first notes
pub async fn list_notes(state: &ApiState) -> ResponseEnvelope {
    let Some(notes) = &state.services.notes else {
        return not_configured("notes");
    };
    match notes.list().await {
        Ok(notes) if notes.is_empty() => ResponseEnvelope::statement("You have no notes."),
        Ok(notes) => {
            let titles: Vec<String> = notes
                .into_iter()
                .take(SUMMARY_LIMIT)
                .map(|n| n.title)
                .collect();
            let speech = format!(
                "Your first {} notes are: {}. Ask me to read a note for details.",
                titles.len(),
                titles.join(", ")
            );
            ResponseEnvelope::statement(speech.clone()).with_card("Notes", speech)
        }
        Err(e) => service_failure(&e, "Sorry, I could not reach your notes."),
    }
}

/// `ReadNoteIntent` — read one note by title (slot `note_name`)
pub async fn read_note(state: &ApiState, intent: &Intent) -> ResponseEnvelope {
    let Some(notes) = &state.services.notes else {
        return not_configured("notes");
    };
    let Some(name) = intent.slot("note_name") else {
        return ResponseEnvelope::question("Which note should I read?");
    };
    match notes.find_by_title(name).await {
        Ok(note) => {
            let speech = format!("{}. {}", note.title, note.content);
            ResponseEnvelope::statement(speech).with_card(note.title, note.content)
        }
        Err(e) => service_failure(&e, "Sorry, I could not find that note."),
    }
}

/// `CreateNoteIntent` — create a note (slot `note_content`)
pub async fn create_note(state: &ApiState, intent: &Intent) -> ResponseEnvelope {
    let Some(notes) = &state.services.notes else {
        return not_configured("notes");
    };
    let content = intent.slot("note_content").unwrap_or("No description");
    match notes.create(content).await {
        Ok(_) => ResponseEnvelope::statement("Note created!").with_card("Create note", content),
        Err(e) => service_failure(&e, "Sorry, I could not create the note."),
    }
}

fn format_emails(emails: &[EmailSummary]) -> String {
    emails
        .iter()
        .map(|e| e.subject.clone())
        .collect::<Vec<_>>()
        .join(", ")
}

/// `ListEmailsIntent` — subjects of the latest emails
pub async fn list_emails(state: &ApiState) -> ResponseEnvelope {
    let Some(email) = &state.services.email else {
        return not_configured("email");
    };
    match email.recent_summaries(SUMMARY_LIMIT).await {
        Ok(emails) if emails.is_empty() => {
            ResponseEnvelope::statement("Your inbox is empty.")
        }
        Ok(emails) => {
            let speech = format!(
                "Your last {} emails are: {}. Ask me to read an email for details.",
                emails.len(),
                format_emails(&emails)
            );
            ResponseEnvelope::statement(speech.clone()).with_card("Emails", speech)
        }
        Err(e) => service_failure(&e, "Sorry, I could not reach your mailbox."),
    }
}

/// `ReadEmailIntent` — read one email by subject (slot `email_subject`)
pub async fn read_email(state: &ApiState, intent: &Intent) -> ResponseEnvelope {
    let Some(email) = &state.services.email else {
        return not_configured("email");
    };
    let Some(subject) = intent.slot("email_subject") else {
        return ResponseEnvelope::question("Which email should I read?");
    };
    match email.read_by_subject(subject).await {
        Ok(body) => ResponseEnvelope::statement(body.clone()).with_card("Email", body),
        Err(e) => service_failure(&e, "Sorry, I could not find that email."),
    }
}

/// `ListNewsIntent` — latest headlines
pub async fn list_news(state: &ApiState) -> ResponseEnvelope {
    let Some(news) = &state.services.news else {
        return not_configured("news");
    };
    match news.latest_headlines().await {
        Ok(headlines) if headlines.is_empty() => {
            ResponseEnvelope::statement("There is no news right now.")
        }
        Ok(headlines) => {
            let speech = format!("Here are the latest headlines: {}.", headlines.join(". "));
            ResponseEnvelope::statement(speech)
        }
        Err(e) => service_failure(&e, "Sorry, I could not fetch the news."),
    }
}

/// `DailyDigestIntent` — one spoken summary across all configured services
///
/// Sections for unconfigured or failing services are skipped rather than
/// failing the whole digest.
pub async fn daily_digest(state: &ApiState) -> ResponseEnvelope {
    let mut sections = Vec::new();

    if state.services.calendar.is_some() {
        if let Ok(events) = events_for_day(state, Utc::now().date_naive()).await {
            sections.push(format!(
                "Your events for today are: {}",
                format_events(&events)
            ));
        }
    }
    if let Some(email) = &state.services.email {
        if let Ok(emails) = email.recent_summaries(SUMMARY_LIMIT).await {
            if !emails.is_empty() {
                sections.push(format!("Your last emails are: {}", format_emails(&emails)));
            }
        }
    }
    if let Some(tasks) = &state.services.tasks {
        if let Ok(tasks) = tasks.list_open(SUMMARY_LIMIT).await {
            if !tasks.is_empty() {
                let names: Vec<String> = tasks.into_iter().map(|t| t.summary).collect();
                sections.push(format!("Your next tasks are: {}", names.join(", ")));
            }
        }
    }
    if let Some(notes) = &state.services.notes {
        if let Ok(notes) = notes.list().await {
            if !notes.is_empty() {
                let titles: Vec<String> = notes
                    .into_iter()
                    .take(SUMMARY_LIMIT)
                    .map(|n| n.title)
                    .collect();
                sections.push(format!("Your first notes are: {}", titles.join(", ")));
            }
        }
    }

    if sections.is_empty() {
        return ResponseEnvelope::statement("I have nothing for your digest today.");
    }
    let speech = format!(
        "Here is your daily digest. {}. Have a good day!",
        sections.join(". ")
    );
    ResponseEnvelope::statement(speech.clone()).with_card("Daily digest", speech)
}

/// `WakeOnLanIntent` — wake the configured machine
pub async fn wake_machine(state: &ApiState) -> ResponseEnvelope {
    let Some(wol) = &state.services.wol else {
        return not_configured("wake on lan");
    };
    match wol.wake().await {
        Ok(()) => ResponseEnvelope::statement("Turning the computer on."),
        Err(e) => service_failure(&e, "Sorry, I could not wake the computer."),
    }
}

/// `SleepOnLanIntent` — put the configured machine to sleep
pub async fn sleep_machine(state: &ApiState) -> ResponseEnvelope {
    let Some(wol) = &state.services.wol else {
        return not_configured("wake on lan");
    };
    match wol.sleep().await {
        Ok(()) => ResponseEnvelope::statement("Putting the computer to sleep."),
        Err(e) => service_failure(&e, "Sorry, I could not reach the computer."),
    }
}
