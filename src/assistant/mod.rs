//! A rule-based assistant that answers questions about the user's own records.
//!
//! Messages are matched against keyword lists in a fixed order and the first
//! matching topic is answered from a snapshot of the user's expenses, limits
//! and rewards.

mod intent;
mod page;
mod responses;

pub use intent::{Intent, classify};
pub use page::{assistant_message_endpoint, get_assistant_page};
pub use responses::respond;
