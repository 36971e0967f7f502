//! Static registry of meeting-type templates.
//!
//! Built-in types ship as embedded JSON (`meeting_types/*.json`) and are
//! parsed once on first access. Presentation (icons, colors) is mapped from
//! `MeetingType::id` by the host; the catalog carries data only.

pub mod embedded;
pub mod loader;
pub mod schema;

pub use loader::{get_meeting_type, list_meeting_types, load_custom_meeting_type};
pub use schema::MeetingType;
