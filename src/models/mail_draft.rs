use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::StringList;

/// An unsent outgoing message
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::mail_drafts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MailDraft {
    id: String,
    to_addresses: StringList,
    cc_addresses: StringList,
    subject: String,
    body_text: String,
    /// Row id of the message this draft answers
    reply_to_message_id: Option<String>,
    thread_id: Option<String>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl MailDraft {
    pub fn new(to_addresses: Vec<String>, cc_addresses: Vec<String>, subject: String, body_text: String) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            id: Uuid::new_v4().to_string(),
            to_addresses: StringList(to_addresses),
            cc_addresses: StringList(cc_addresses),
            subject,
            body_text,
            reply_to_message_id: None,
            thread_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Marks the draft as a reply to the stored message `message_row_id`
    pub fn replying_to(mut self, message_row_id: String, thread_id: String) -> Self {
        self.reply_to_message_id = Some(message_row_id);
        self.thread_id = Some(thread_id);
        self
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_to_addresses(&self) -> &[String] {
        self.to_addresses.as_slice()
    }

    pub fn get_cc_addresses(&self) -> &[String] {
        self.cc_addresses.as_slice()
    }

    pub fn get_subject(&self) -> String {
        self.subject.clone()
    }

    pub fn get_body_text(&self) -> String {
        self.body_text.clone()
    }

    pub fn get_reply_to_message_id(&self) -> Option<String> {
        self.reply_to_message_id.clone()
    }

    pub fn get_thread_id(&self) -> Option<String> {
        self.thread_id.clone()
    }

    pub fn get_updated_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.updated_at, Utc)
    }
}
