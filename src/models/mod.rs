pub mod augment;
pub mod auth;
pub mod constraint;
pub mod export;
pub mod form;
pub mod request;
pub mod result;
pub mod schema;
