use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::text_enum::text_enum;
use super::StringList;

text_enum! {
    pub enum MailDirection {
        /// Received into the committee mailbox
        Inbound => "inbound",
        /// Sent by the committee
        Outbound => "outbound",
    }
}

/// A stored committee mail message
///
/// `message_id`, `in_reply_to` and `reference_ids` hold normalized
/// Message-IDs (no angle brackets); `thread_id` is the normalized id of
/// the conversation's root message.
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::mail_messages)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct MailMessage {
    id: String,
    direction: MailDirection,
    message_id: String,
    in_reply_to: Option<String>,
    reference_ids: StringList,
    thread_id: String,
    from_address: String,
    to_addresses: StringList,
    cc_addresses: StringList,
    subject: String,
    body_text: String,
    body_html: Option<String>,
    sent_at: NaiveDateTime,
    is_read: bool,
    created_at: NaiveDateTime,
}

/// Header and body fields of a message about to be stored
#[derive(Debug, Clone)]
pub struct NewMailMessage {
    pub direction: MailDirection,
    pub message_id: String,
    pub in_reply_to: Option<String>,
    pub references: Vec<String>,
    pub thread_id: String,
    pub from_address: String,
    pub to_addresses: Vec<String>,
    pub cc_addresses: Vec<String>,
    pub subject: String,
    pub body_text: String,
    pub body_html: Option<String>,
    pub sent_at: DateTime<Utc>,
}

impl MailMessage {
    /// Builds a message row from already-threaded fields
    ///
    /// Outbound messages start out read; inbound ones unread.
    pub fn new(fields: NewMailMessage) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            is_read: fields.direction == MailDirection::Outbound,
            direction: fields.direction,
            message_id: fields.message_id,
            in_reply_to: fields.in_reply_to,
            reference_ids: StringList(fields.references),
            thread_id: fields.thread_id,
            from_address: fields.from_address,
            to_addresses: StringList(fields.to_addresses),
            cc_addresses: StringList(fields.cc_addresses),
            subject: fields.subject,
            body_text: fields.body_text,
            body_html: fields.body_html,
            sent_at: fields.sent_at.naive_utc(),
            created_at: Utc::now().naive_utc(),
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_direction(&self) -> MailDirection {
        self.direction
    }

    pub fn get_message_id(&self) -> String {
        self.message_id.clone()
    }

    pub fn get_in_reply_to(&self) -> Option<String> {
        self.in_reply_to.clone()
    }

    pub fn get_references(&self) -> &[String] {
        self.reference_ids.as_slice()
    }

    pub fn get_thread_id(&self) -> String {
        self.thread_id.clone()
    }

    pub fn get_from_address(&self) -> String {
        self.from_address.clone()
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

    pub fn get_is_read(&self) -> bool {
        self.is_read
    }

    pub fn get_sent_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.sent_at, Utc)
    }

    /// Raw sent timestamp, used for ordering
    pub fn get_sent_at_raw(&self) -> NaiveDateTime {
        self.sent_at
    }
}
