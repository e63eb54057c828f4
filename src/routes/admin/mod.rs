pub mod subscriptions;
pub mod users;

pub use subscriptions::*;
pub use users::*;
