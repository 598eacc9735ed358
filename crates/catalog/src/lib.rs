//! Catalog domain module (books and their authors).
//!
//! Plain records plus their search filter schemas. No IO, no storage.

pub mod author;
pub mod book;

pub use author::{Author, AuthorField};
pub use book::{Book, BookField};
