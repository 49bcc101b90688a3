pub mod auth;
pub mod captcha;
pub mod course;
pub mod error;
pub mod jwt;
pub mod password_reset;
pub mod two_factor;

pub use auth::{AuthService, LoginOutcome};
pub use captcha::{BotCheck, CaptchaVerifier, MockBotCheck};
pub use course::CourseService;
pub use error::ServiceError;
pub use jwt::{JwtService, SessionClaims, TokenScope};
pub use password_reset::PasswordResetService;
pub use two_factor::TwoFactorService;
