pub mod handlers;
pub mod models;
pub mod repository;

pub use models::Doctor;
pub use repository::DoctorsRepository;
