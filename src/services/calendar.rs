//! Nextcloud calendar client (CalDAV)
//!
//! Lists events for a day window and creates simple events. CalDAV speaks
//! XML with embedded iCalendar payloads; only the handful of properties the
//! spoken summaries need (SUMMARY, DTSTART) are parsed out.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::ical;
use crate::config::NextcloudConfig;
use crate::{Error, Result};

/// A calendar event reduced to what a spoken summary needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarEvent {
    pub summary: String,
    pub start: Option<DateTime<Utc>>,
}

/// Nextcloud CalDAV client for the user's default calendar
pub struct CalendarClient {
    base_url: String,
    username: String,
    password: String,
    client: reqwest::Client,
}

impl CalendarClient {
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

    fn calendar_url(&self) -> String {
        format!(
            "{}/remote.php/dav/calendars/{}/personal/",
            self.base_url, self.username
        )
    }

    /// Events between `start` and `end`, ordered as the server returns them
    ///
    /// # Errors
    ///
    /// Returns [`Error::Calendar`] when the CalDAV report fails.
    pub async fn list_events(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<CalendarEvent>> {
        let body = format!(
            r#"<?xml version="1.0" encoding="utf-8" ?>
<c:calendar-query xmlns:d="DAV:" xmlns:c="urn:ietf:params:xml:ns:caldav">
  <d:prop><c:calendar-data/></d:prop>
  <c:filter>
    <c:comp-filter name="VCALENDAR">
      <c:comp-filter name="VEVENT">
        <c:time-range start="{}" end="{}"/>
      </c:comp-filter>
    </c:comp-filter>
  </c:filter>
</c:calendar-query>"#,
            start.format("%Y%m%dT%H%M%SZ"),
            end.format("%Y%m%dT%H%M%SZ")
        );

        let response = self
            .client
            .request(report_method()?, self.calendar_url())
            .basic_auth(&self.username, Some(&self.password))
            .header("Depth", "1")
            .header("Content-Type", "application/xml; charset=utf-8")
            .body(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Calendar(format!(
                "calendar report failed with {}",
                response.status()
            )));
        }

        let xml = response.text().await?;
        let mut events = parse_events(&xml);
        events.sort_by_key(|e| e.start);
        tracing::debug!(count = events.len(), "listed calendar events");
        Ok(events)
    }

    /// Create an all-day event for `date` with the given description
    ///
    /// # Errors
    ///
    /// Returns [`Error::Calendar`] when the server rejects the upload.
    pub async fn create_event(&self, summary: &str, date: NaiveDate) -> Result<()> {
        let uid = Uuid::new_v4();
        let ics = format!(
            "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//perch-gateway//EN\r\n\
             BEGIN:VEVENT\r\nUID:{uid}\r\nDTSTAMP:{stamp}\r\n\
             DTSTART;VALUE=DATE:{date}\r\nSUMMARY:{summary}\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n",
            stamp = Utc::now().format("%Y%m%dT%H%M%SZ"),
            date = date.format("%Y%m%d"),
        );

        let url = format!("{}{uid}.ics", self.calendar_url());
        let response = self
            .client
            .put(&url)
            .basic_auth(&self.username, Some(&self.password))
            .header("Content-Type", "text/calendar; charset=utf-8")
            .body(ics)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Calendar(format!(
                "event creation failed with {}",
                response.status()
            )));
        }
        tracing::info!(summary, "created calendar event");
        Ok(())
    }
}

/// The non-standard CalDAV REPORT method
fn report_method() -> Result<reqwest::Method> {
    reqwest::Method::from_bytes(b"REPORT").map_err(|e| Error::Calendar(e.to_string()))
}

/// Pull VEVENT summaries and start times out of a multistatus body
fn parse_events(body: &str) -> Vec<CalendarEvent> {
    let unfolded = ical::unfold(body);
    let mut events = Vec::new();
    let mut in_event = false;
    let mut summary = None;
    let mut start = None;

    for line in unfolded.lines() {
        let line = line.trim();
        if line.starts_with("BEGIN:VEVENT") {
            in_event = true;
            summary = None;
            start = None;
        } else if line.starts_with("END:VEVENT") {
            if in_event {
                events.push(CalendarEvent {
                    summary: summary.take().unwrap_or_else(|| "Untitled".to_string()),
                    start: start.take(),
                });
            }
            in_event = false;
        } else if in_event {
            if let Some(value) = ical::value(line, "SUMMARY") {
                summary = Some(ical::unescape(value));
            } else if let Some(value) = ical::value(line, "DTSTART") {
                start = ical::parse_datetime(value);
            }
        }
    }
    events
}
