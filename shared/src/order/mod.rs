//! Order types
//!
//! The live kitchen pipeline treats orders as snapshots owned by the order
//! store; these types are the wire representation shared by the server and
//! the dashboard client.

pub mod eta;
pub mod snapshot;
pub mod types;

// Re-exports
pub use snapshot::{NewOrder, Order, OrderId};
pub use types::*;
