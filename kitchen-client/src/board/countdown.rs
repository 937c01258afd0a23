//! Derived per-order timing, recomputed on every tick

use shared::Order;
use shared::order::eta::MINUTE_MILLIS;

/// Remaining time at or below which an order is flagged
pub const WARN_THRESHOLD_MILLIS: i64 = 3 * MINUTE_MILLIS;

/// 倒计时 (不存储，按 `now` 计算)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    /// Effective ready time (Unix millis)
    pub ready_at: i64,
    /// Time since creation
    pub elapsed_ms: i64,
    /// Time until ready, clamped at zero
    pub remaining_ms: i64,
    /// Remaining whole minutes, rounded
    pub remaining_minutes: i64,
    /// Ready time has passed
    pub due: bool,
    /// Three minutes or less remaining
    pub warn: bool,
}

impl Countdown {
    pub fn of(order: &Order, now: i64) -> Self {
        let ready_at = order.effective_ready_at();
        let until_ready = ready_at - now;
        let remaining_ms = until_ready.max(0);

        Self {
            ready_at,
            elapsed_ms: (now - order.created_at).max(0),
            remaining_ms,
            remaining_minutes: (remaining_ms + MINUTE_MILLIS / 2) / MINUTE_MILLIS,
            due: until_ready <= 0,
            warn: until_ready <= WARN_THRESHOLD_MILLIS,
        }
    }

    /// Remaining time as `mm:ss`
    pub fn remaining_label(&self) -> String {
        let secs = self.remaining_ms / 1000;
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }

    /// Elapsed time as `mm:ss`, or `h:mm:ss` past one hour
    pub fn elapsed_label(&self) -> String {
        let secs = self.elapsed_ms / 1000;
        let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
        if h > 0 {
            format!("{h}:{m:02}:{s:02}")
        } else {
            format!("{m:02}:{s:02}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::order::{DeliveryType, LineItem, OrderStatus};

    const T0: i64 = 1_700_000_000_000;

    fn order(ready_at: Option<i64>) -> Order {
        Order {
            id: 1,
            status: OrderStatus::Preparing,
            created_at: T0,
            updated_at: T0,
            estimated_ready_at: ready_at,
            estimated_prep_minutes: None,
            total: 13.0,
            items: vec![LineItem::new("Burger", 2, 6.5)],
            payment_method: None,
            paid_by: None,
            paid_at: None,
            customer: None,
            notes: None,
            delivery_type: DeliveryType::Pickup,
        }
    }

    #[test]
    fn falls_back_to_item_formula() {
        // 5 + 8 * 2 = 21 minutes
        let c = Countdown::of(&order(None), T0);
        assert_eq!(c.ready_at, T0 + 21 * MINUTE_MILLIS);
        assert_eq!(c.remaining_minutes, 21);
        assert!(!c.due);
        assert!(!c.warn);
    }

    #[test]
    fn explicit_estimate_and_labels() {
        let c = Countdown::of(&order(Some(T0 + 20 * MINUTE_MILLIS)), T0 + 17 * MINUTE_MILLIS + 30_000);
        assert_eq!(c.remaining_ms, 150_000);
        assert_eq!(c.remaining_minutes, 3);
        assert_eq!(c.remaining_label(), "02:30");
        assert_eq!(c.elapsed_label(), "17:30");
        assert!(c.warn);
        assert!(!c.due);
    }

    #[test]
    fn due_when_ready_time_passed() {
        let c = Countdown::of(&order(Some(T0)), T0 + 65 * MINUTE_MILLIS + 5_000);
        assert!(c.due);
        assert_eq!(c.remaining_ms, 0);
        assert_eq!(c.remaining_label(), "00:00");
        assert_eq!(c.elapsed_label(), "1:05:05");
    }
}
