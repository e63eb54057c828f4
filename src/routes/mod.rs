// routes/mod.rs
// Public re-exports of all route handlers.

pub mod admin;
pub mod app;
pub mod home;
pub mod login;
pub mod logout;
pub mod qrcode;
pub mod setup;
pub mod signup;

pub use admin::*;
pub use app::*;
pub use home::home;
pub use login::login;
pub use logout::logout;
pub use qrcode::qrcode;
pub use setup::setup;
pub use signup::signup;
