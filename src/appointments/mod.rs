pub mod discount;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;
pub mod status_machine;
pub mod time_rules;

pub use error::AppointmentError;
pub use models::{Appointment, AppointmentStatus};
pub use repository::AppointmentsRepository;
pub use service::BookingService;
