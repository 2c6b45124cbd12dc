pub mod auth;
pub mod notification;
pub mod otp;
pub mod user;

mod router;
pub use router::get_router;
