pub mod auth;
pub mod database;
pub mod response;
pub mod storage;
pub mod validation;
