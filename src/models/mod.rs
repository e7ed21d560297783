/// Data models module
///
/// This module defines the core data structures used throughout the application.
/// It includes database models that map to database tables, as well as methods
/// for creating and manipulating these models.

mod text_enum;

mod string_list;
pub use string_list::StringList;

mod inventory_item;
pub use inventory_item::{InventoryItem, ItemStatus};

mod inventory_link;
pub use inventory_link::InventoryLink;

mod transaction;
pub use transaction::{Transaction, TransactionKind, TransactionStatus};

mod purchase;
pub use purchase::{Purchase, PurchaseStatus};

mod receipt;
pub use receipt::Receipt;

mod mail_message;
pub use mail_message::{MailDirection, MailMessage, NewMailMessage};

mod mail_draft;
pub use mail_draft::MailDraft;

mod faq;
pub use faq::Faq;

mod user;
pub use user::{Permission, Role, User};

mod poll;
pub use poll::{Poll, PollOption, PollStatus, PollVote};
