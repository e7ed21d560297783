use chrono::{DateTime, NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A frequently asked question with its answer
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = crate::schema::faqs)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Faq {
    id: String,
    question: String,
    answer: String,
    /// Position in the public list, ascending
    sort_order: i32,
    created_at: NaiveDateTime,
    updated_at: NaiveDateTime,
}

impl Faq {
    pub fn new(question: String, answer: String, sort_order: i32) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            id: Uuid::new_v4().to_string(),
            question,
            answer,
            sort_order,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn get_id(&self) -> String {
        self.id.clone()
    }

    pub fn get_question(&self) -> String {
        self.question.clone()
    }

    pub fn get_answer(&self) -> String {
        self.answer.clone()
    }

    pub fn get_sort_order(&self) -> i32 {
        self.sort_order
    }

    pub fn get_created_at(&self) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(self.created_at, Utc)
    }
}
