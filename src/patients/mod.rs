pub mod handlers;
pub mod models;
pub mod repository;

pub use models::Patient;
pub use repository::PatientsRepository;
