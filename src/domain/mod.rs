//! Domain modules.

pub mod catalog;
pub mod customers;
pub mod orders;
