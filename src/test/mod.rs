mod access;
mod env;
mod registration;
pub mod utils;
