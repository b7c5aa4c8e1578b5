//! IMAP email client
//!
//! Summarizes the most recent inbox messages and reads one by subject.
//! The `imap` crate is synchronous, so every mailbox session runs inside
//! `spawn_blocking`; sessions are short-lived (connect, fetch, logout).

use mailparse::MailHeaderMap;

use crate::config::EmailConfig;
use crate::{Error, Result};

/// Sender and subject of one inbox message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailSummary {
    pub from: String,
    pub subject: String,
}

/// IMAP inbox client
pub struct EmailClient {
    config: EmailConfig,
}

impl EmailClient {
    /// Create a client for an IMAP account
    #[must_use]
    pub fn new(config: &EmailConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Sender and subject of the `limit` most recent messages, newest first
    ///
    /// # Errors
    ///
    /// Returns [`Error::Email`] when the mailbox cannot be reached.
    pub async fn recent_summaries(&self, limit: usize) -> Result<Vec<EmailSummary>> {
        let config = self.config.clone();
        let limit = u32::try_from(limit).unwrap_or(u32::MAX);
        tokio::task::spawn_blocking(move || fetch_summaries(&config, limit))
            .await
            .map_err(|e| Error::Email(format!("mailbox task failed: {e}")))?
    }

    /// Body text of the most recent message whose subject contains `subject`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Email`] when no message matches or the mailbox
    /// cannot be reached.
    pub async fn read_by_subject(&self, subject: &str) -> Result<String> {
        let config = self.config.clone();
        let subject = subject.to_string();
        tokio::task::spawn_blocking(move || fetch_body(&config, &subject))
            .await
            .map_err(|e| Error::Email(format!("mailbox task failed: {e}")))?
    }
}

fn open_session(config: &EmailConfig) -> Result<imap::Session<native_tls::TlsStream<std::net::TcpStream>>> {
    let tls = native_tls::TlsConnector::builder()
        .build()
        .map_err(|e| Error::Email(e.to_string()))?;
    let client = imap::connect((config.host.as_str(), config.port), &config.host, &tls)
        .map_err(|e| Error::Email(e.to_string()))?;
    client
        .login(&config.username, &config.password)
        .map_err(|(e, _)| Error::Email(e.to_string()))
}

/// Sequence-set covering the last `limit` messages of a mailbox
fn recent_range(exists: u32, limit: u32) -> Option<String> {
    if exists == 0 {
        return None;
    }
    let start = exists.saturating_sub(limit.saturating_sub(1)).max(1);
    Some(format!("{start}:{exists}"))
}

fn fetch_summaries(config: &EmailConfig, limit: u32) -> Result<Vec<EmailSummary>> {
    let mut session = open_session(config)?;
    let mailbox = session
        .select("INBOX")
        .map_err(|e| Error::Email(e.to_string()))?;

    let Some(range) = recent_range(mailbox.exists, limit) else {
        return Ok(Vec::new());
    };

    let messages = session
        .fetch(range, "RFC822.HEADER")
        .map_err(|e| Error::Email(e.to_string()))?;

    let mut summaries: Vec<EmailSummary> = messages
        .iter()
        .filter_map(|m| m.header())
        .filter_map(|raw| summarize_header(raw).ok())
        .collect();
    summaries.reverse();

    session.logout().ok();
    tracing::debug!(count = summaries.len(), "fetched inbox summaries");
    Ok(summaries)
}

fn fetch_body(config: &EmailConfig, subject: &str) -> Result<String> {
    let mut session = open_session(config)?;
    let mailbox = session
        .select("INBOX")
        .map_err(|e| Error::Email(e.to_string()))?;

    // Scan a recent window rather than the whole mailbox
    let Some(range) = recent_range(mailbox.exists, 50) else {
        return Err(Error::Email("inbox is empty".to_string()));
    };

    let messages = session
        .fetch(range, "RFC822")
        .map_err(|e| Error::Email(e.to_string()))?;

    let needle = subject.to_lowercase();
    let body = messages
        .iter()
        .rev()
        .filter_map(|m| m.body())
        .filter_map(|raw| mailparse::parse_mail(raw).ok())
        .find(|mail| {
            mail.headers
                .get_first_value("Subject")
                .is_some_and(|s| s.to_lowercase().contains(&needle))
        })
        .and_then(|mail| plain_text_body(&mail));

    session.logout().ok();
    body.ok_or_else(|| Error::Email(format!("no recent email matching '{subject}'")))
}

fn summarize_header(raw: &[u8]) -> Result<EmailSummary> {
    let (headers, _) =
        mailparse::parse_headers(raw).map_err(|e| Error::Email(e.to_string()))?;
    Ok(EmailSummary {
        from: headers
            .get_first_value("From")
            .unwrap_or_else(|| "unknown sender".to_string()),
        subject: headers
            .get_first_value("Subject")
            .unwrap_or_else(|| "no subject".to_string()),
    })
}

/// First text/plain part of a message, or the top-level body for simple mails
fn plain_text_body(mail: &mailparse::ParsedMail) -> Option<String> {
    if mail.subparts.is_empty() {
        return mail.get_body().ok();
    }
    mail.subparts
        .iter()
        .find(|p| p.ctype.mimetype.starts_with("text/plain"))
        .and_then(|p| p.get_body().ok())
}
