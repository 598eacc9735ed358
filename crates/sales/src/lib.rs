//! Sales domain module (orders, order items, book sales).
//!
//! Sales records embed copies of the catalog and customer records they refer
//! to. An embedded copy is frozen at write time: later changes to the original
//! book or customer do not reach records that already embed it.

pub mod book_sale;
pub mod order;

pub use book_sale::{BookSale, BookSaleField};
pub use order::{Order, OrderField, OrderItem, OrderItemField, OrderStatus};
