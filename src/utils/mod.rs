pub mod clock;
pub mod database;
pub mod phone;
pub mod validation;
