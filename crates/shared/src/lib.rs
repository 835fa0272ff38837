pub mod dilemmas;
pub mod domain;
pub mod error;
pub mod protocol;
