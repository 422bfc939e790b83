// Authentication module
// Provides JWT-based authentication shared by the patient and doctor surfaces

pub mod error;
pub mod middleware;
pub mod models;
pub mod password;
pub mod token;

// Re-export commonly used types
pub use error::AuthError;
pub use middleware::AuthenticatedUser;
pub use models::{AuthTokens, LoginRequest, Role};
pub use password::PasswordService;
pub use token::{Claims, TokenService};
