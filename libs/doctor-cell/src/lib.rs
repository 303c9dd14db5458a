pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{
    AvailabilityError, TimeWindow, Weekday, WeekSchedule, WeeklyAvailability,
};
pub use services::availability::AvailabilityService;
