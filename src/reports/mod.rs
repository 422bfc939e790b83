pub mod handlers;
pub mod models;
pub mod repository;

pub use models::PatientReport;
pub use repository::ReportsRepository;
