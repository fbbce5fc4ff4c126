//! # Repository Implementations
//!
//! Entity-scoped database operations. Each repository holds a pool handle
//! and is cheap to construct from [`crate::Database`].
//!
//! - [`invoice`] - Invoice save transaction, paid flag, cascade delete
//! - [`customer`] - Customer (payor master) listing
//! - [`product`] - Product (line item master) listing
//! - [`settings`] - Per-account defaults

pub mod customer;
pub mod invoice;
pub mod product;
pub mod settings;
