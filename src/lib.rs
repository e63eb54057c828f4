pub mod dues;
pub mod entitlement;
pub mod filters;
pub mod models;
pub mod routes;
pub mod session;
pub mod state;
pub mod totp;
