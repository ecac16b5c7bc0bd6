pub mod auth;
pub mod department;
pub mod organization;
pub mod region;
pub mod risk;
pub mod server;
pub mod user;
