//! # Console Commands
//!
//! - [`list`] - `list <screen>`: fetch, filter, sort and page one screen
//! - [`promotions`] - `promotions`: status counts or offerable promotions

pub mod list;
pub mod promotions;
