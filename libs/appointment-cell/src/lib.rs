pub mod handlers;
pub mod models;
pub mod router;
pub mod services;

pub use models::{Appointment, AppointmentError, CreateAppointmentRequest};
pub use services::booking::AppointmentBookingService;
