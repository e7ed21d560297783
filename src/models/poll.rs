use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::text_enum::text_enum;

text_enum! {
    pub enum PollStatus {
        /// Being prepared; not visible for voting
        Draft => "draft",
        Open => "open",
        Closed => "closed",
    }
}

/// A poll put to the membership
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::polls)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Poll {
    id: String,
    title: String,
    description: Option<String>,
    status: PollStatus,
    /// Whether a ballot may select more than one option
    allow_multiple: bool,
    /// Votes are refused from this moment on
    deadline: Option<NaiveDateTime>,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl Poll {
    pub fn new(
        title: String,
        description: Option<String>,
        allow_multiple: bool,
        deadline: Option<DateTime<Utc>>,
    ) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            description,
            status: PollStatus::Draft,
            allow_multiple,
            deadline: deadline.map(|d| d.naive_utc()),
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether a ballot cast at `now` is accepted
    pub fn accepts_votes_at(&self, now: DateTime<Utc>) -> bool {
        self.status == PollStatus::Open
            && self.deadline.is_none_or(|deadline| now.naive_utc() < deadline)
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_title(&self) -> String {
        self.title.clone()
    }

    pub fn get_description(&self) -> Option<String> {
        self.description.clone()
    }

    pub fn get_status(&self) -> PollStatus {
        self.status
    }

    pub fn get_allow_multiple(&self) -> bool {
        self.allow_multiple
    }

    pub fn get_deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline.map(|d| DateTime::from_naive_utc_and_offset(d, Utc))
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }
}

/// One selectable answer of a poll
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::poll_options)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PollOption {
    id: String,
    poll_id: String,
    label: String,
    sort_order: i32,
}

impl PollOption {
    pub fn new(poll_id: &str, label: String, sort_order: i32) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            poll_id: poll_id.to_string(),
            label,
            sort_order,
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_poll_id(&self) -> String {
        self.poll_id.clone()
    }

    pub fn get_label(&self) -> String {
        self.label.clone()
    }

    pub fn get_sort_order(&self) -> i32 {
        self.sort_order
    }
}

/// One selected option of one voter's ballot
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::poll_votes)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct PollVote {
    poll_id: String,
    option_id: String,
    voter_id: String,
    created_at: NaiveDateTime,
}

impl PollVote {
    pub fn new(poll_id: &str, option_id: &str, voter_id: &str) -> Self {
        Self {
            poll_id: poll_id.to_string(),
            option_id: option_id.to_string(),
            voter_id: voter_id.to_string(),
            created_at: Utc::now().naive_utc(),
        }
    }

    pub fn get_option_id(&self) -> String {
        self.option_id.clone()
    }

    pub fn get_voter_id(&self) -> String {
        self.voter_id.clone()
    }
}
