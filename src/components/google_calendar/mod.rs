mod actor;
mod handle;
pub mod models;
pub mod time;
pub mod token;

pub use actor::{classify_http_failure, events_url, parse_events_response};
pub use handle::GoogleCalendarHandle;
pub use models::{retain_meetings, Event, ResponseStatus};
pub use token::{StoredToken, TokenManager};
