/// Web API Handlers
///
/// This module contains the handlers for the RESTful API endpoints.
/// Each handler extracts what it needs from the request, calls the
/// repository layer and returns JSON. Errors raised by the repositories are
/// turned into status codes by [`crate::errors::ApiError`].

mod inventory_handlers;
mod transaction_handlers;
mod purchase_handlers;
mod mail_handlers;
mod faq_handlers;
mod user_handlers;
mod poll_handlers;

// Re-export all handlers
pub use inventory_handlers::*;
pub use transaction_handlers::*;
pub use purchase_handlers::*;
pub use mail_handlers::*;
pub use faq_handlers::*;
pub use user_handlers::*;
pub use poll_handlers::*;
