//! Diagnostic-order lifecycle.
//!
//! An order moves through the fixed status sequence in `ldk-schemas`
//! one step at a time. [`Order::advance`] enforces transition legality;
//! [`OrderService`] adds per-order serialization, storage, and the
//! notification emitted on every successful transition.

mod order;
mod service;
mod store;

pub use order::{AdvanceError, Order, OrderPriority, StatusChange};
pub use service::{CreateError, OrderService};
pub use store::OrderStore;
