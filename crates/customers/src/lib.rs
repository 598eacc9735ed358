//! Customers domain module.
//!
//! Customer records with their embedded postal address, implemented purely as
//! data plus search predicates (no IO, no HTTP, no storage).

pub mod customer;

pub use customer::{Address, Customer, CustomerField};
