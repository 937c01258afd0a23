//! Ready-time estimation
//!
//! Server and dashboard share one fallback chain so that a countdown never
//! disagrees with what the server would have reported:
//!
//! 1. `estimated_ready_at` when present
//! 2. `created_at + estimated_prep_minutes`
//! 3. `created_at + DEFAULT_BASE_MINUTES + DEFAULT_PER_ITEM_MINUTES * Σqty`

use super::snapshot::Order;

pub const MINUTE_MILLIS: i64 = 60_000;

/// Base preparation time when no explicit estimate exists
pub const DEFAULT_BASE_MINUTES: i64 = 5;

/// Additional preparation time per item unit
pub const DEFAULT_PER_ITEM_MINUTES: i64 = 8;

/// Default prep minutes for an order with `item_count` units
pub fn default_prep_minutes(item_count: u32) -> i64 {
    DEFAULT_BASE_MINUTES + DEFAULT_PER_ITEM_MINUTES * i64::from(item_count)
}

impl Order {
    /// Effective ready time (Unix millis) after applying the fallback chain
    pub fn effective_ready_at(&self) -> i64 {
        if let Some(ready_at) = self.estimated_ready_at {
            return ready_at;
        }
        let minutes = match self.estimated_prep_minutes {
            Some(minutes) => i64::from(minutes),
            None => default_prep_minutes(self.item_count()),
        };
        self.created_at + minutes * MINUTE_MILLIS
    }

    /// Shift the ready time by `delta_minutes` from the current effective estimate
    pub fn shifted_ready_at(&self, delta_minutes: i64) -> i64 {
        self.effective_ready_at() + delta_minutes * MINUTE_MILLIS
    }
}
