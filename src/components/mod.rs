// Export components
pub mod google_calendar;
pub mod meeting_alerts;

// Re-export Google Calendar handle
pub use google_calendar::GoogleCalendarHandle;
// Re-export the alert scheduler
pub use meeting_alerts::{Scheduler, SchedulerHandle};
