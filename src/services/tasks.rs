//! Nextcloud tasks client (CalDAV VTODO)
//!
//! Tasks live in the same DAV tree as the calendar, as VTODO components.
//! Supports listing open tasks, creating one, and completing one by name.

use chrono::Utc;
use uuid::Uuid;

use super::ical;
use crate::config::NextcloudConfig;
use crate::{Error, Result};

/// An open task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub uid: String,
    pub summary: String,
}

/// Nextcloud CalDAV client for the user's default task list
pub struct TasksClient {
    base_url: String,
    username: String,
    password: String,
    client: reqwest::Client,
}

impl TasksClient {
    /// Create a client for a Nextcloud instance
    #[must_use]
    pub fn new(config: &NextcloudConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            password: config.password.clone(),
            client: reqwest::Client::new(),
        }
    }

    fn list_url(&self) -> String {
        format!(
            "{}/remote.php/dav/calendars/{}/tasks/",
            self.base_url, self.username
        )
    }

    /// Open (not completed) tasks, up to `limit`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Tasks`] when the CalDAV report fails.
    pub async fn list_open(&self, limit: usize) -> Result<Vec<Task>> {
        let body = r#"<?xml version="1.0" encoding="utf-8" ?>
<c:calendar-query xmlns:d="DAV:" xmlns:c="urn:ietf:params:xml:ns:caldav">
  <d:prop><c:calendar-data/></d:prop>
  <c:filter>
    <c:comp-filter name="VCALENDAR">
      <c:comp-filter name="VTODO"/>
    </c:comp-filter>
  </c:filter>
</c:calendar-query>"#;

        let response = self
            .client
            .request(report_method()?, self.list_url())
            .basic_auth(&self.username, Some(&self.password))
            .header("Depth", "1")
            .header("Content-Type", "application/xml; charset=utf-8")
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Tasks(format!(
                "task report failed with {}",
                response.status()
            )));
        }

        let xml = response.text().await?;
        let tasks: Vec<Task> = parse_open_todos(&xml).into_iter().take(limit).collect();
        tracing::debug!(count = tasks.len(), "listed open tasks");
        Ok(tasks)
    }

    /// Create a new task with the given summary
    ///
    /// # Errors
    ///
    /// Returns [`Error::Tasks`] when the server rejects the upload.
    pub async fn create(&self, summary: &str) -> Result<()> {
        let uid = Uuid::new_v4();
        let ics = format!(
            "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//perch-gateway//EN\r\n\
             BEGIN:VTODO\r\nUID:{uid}\r\nDTSTAMP:{stamp}\r\n\
             SUMMARY:{summary}\r\nSTATUS:NEEDS-ACTION\r\nEND:VTODO\r\nEND:VCALENDAR\r\n",
            stamp = Utc::now().format("%Y%m%dT%H%M%SZ"),
        );

        let url = format!("{}{uid}.ics", self.list_url());
        let response = self
            .client
            .put(&url)
            .basic_auth(&self.username, Some(&self.password))
            .header("Content-Type", "text/calendar; charset=utf-8")
            .body(ics)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Tasks(format!(
                "task creation failed with {}",
                response.status()
            )));
        }
        tracing::info!(summary, "created task");
        Ok(())
    }

    /// Mark the first open task whose summary contains `name` as completed
    ///
    /// # Errors
    ///
    /// Returns [`Error::Tasks`] when no open task matches or the update fails.
    pub async fn finish(&self, name: &str) -> Result<Task> {
        let needle = name.to_lowercase();
        let task = self
            .list_open(usize::MAX)
            .await?
            .into_iter()
            .find(|t| t.summary.to_lowercase().contains(&needle))
            .ok_or_else(|| Error::Tasks(format!("no open task matching '{name}'")))?;

        let ics = format!(
            "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//perch-gateway//EN\r\n\
             BEGIN:VTODO\r\nUID:{uid}\r\nDTSTAMP:{stamp}\r\nSUMMARY:{summary}\r\n\
             STATUS:COMPLETED\r\nCOMPLETED:{stamp}\r\nPERCENT-COMPLETE:100\r\n\
             END:VTODO\r\nEND:VCALENDAR\r\n",
            uid = task.uid,
            stamp = Utc::now().format("%Y%m%dT%H%M%SZ"),
            summary = task.summary,
        );

        let url = format!("{}{}.ics", self.list_url(), task.uid);
        let response = self
            .client
            .put(&url)
            .basic_auth(&self.username, Some(&self.password))
            .header("Content-Type", "text/calendar; charset=utf-8")
            .body(ics)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Tasks(format!(
                "task completion failed with {}",
                response.status()
            )));
        }
        tracing::info!(summary = %task.summary, "completed task");
        Ok(task)
    }
}

/// The non-standard CalDAV REPORT method
fn report_method() -> Result<reqwest::Method> {
    reqwest::Method::from_bytes(b"REPORT").map_err(|e| Error::Tasks(e.to_string()))
}

/// Pull open VTODOs out of a multistatus body
fn parse_open_todos(body: &str) -> Vec<Task> {
    let unfolded = ical::unfold(body);
    let mut tasks = Vec::new();
    let mut in_todo = false;
    let mut uid = None;
    let mut summary = None;
    let mut completed = false;

    for line in unfolded.lines() {
        let line = line.trim();
        if line.starts_with("BEGIN:VTODO") {
            in_todo = true;
            uid = None;
            summary = None;
            completed = false;
        } else if line.starts_with("END:VTODO") {
            if in_todo && !completed {
                if let (Some(uid), Some(summary)) = (uid.take(), summary.take()) {
                    tasks.push(Task { uid, summary });
                }
            }
            in_todo = false;
        } else if in_todo {
            if let Some(value) = ical::value(line, "UID") {
                uid = Some(value.to_string());
            } else if let Some(value) = ical::value(line, "SUMMARY") {
                summary = Some(ical::unescape(value));
            } else if let Some(value) = ical::value(line, "STATUS") {
                completed = value == "COMPLETED" || value == "CANCELLED";
            }
        }
    }
    tasks
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT_BODY: &str = "BEGIN:VCALENDAR\n\
BEGIN:VTODO\nUID:t-1\nSUMMARY:Water plants\nSTATUS:NEEDS-ACTION\nEND:VTODO\n\
BEGIN:VTODO\nUID:t-2\nSUMMARY:Old chore\nSTATUS:COMPLETED\nEND:VTODO\n\
BEGIN:VTODO\nUID:t-3\nSUMMARY:Buy coffee\nEND:VTODO\n\
END:VCALENDAR";

    #[test]
    fn completed_todos_are_filtered_out() {
        let tasks = parse_open_todos(REPORT_BODY);
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].summary, "Water plants");
        assert_eq!(tasks[1].uid, "t-3");
    }

    #[test]
    fn todo_without_uid_is_skipped() {
        let tasks = parse_open_todos("BEGIN:VTODO\nSUMMARY:No id\nEND:VTODO");
        assert!(tasks.is_empty());
    }
}
