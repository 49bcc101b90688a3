pub mod course;
pub mod password_reset;
pub mod user;

pub use course::{Course, CoursePreview, Enrollment};
pub use password_reset::{PasswordReset, ResetStatus};
pub use user::{Role, TwoFactorState, User, UserResponse};
