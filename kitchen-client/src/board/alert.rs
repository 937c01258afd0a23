//! 报警状态机
//!
//! ```text
//!            有未确认的厨房订单
//!   Silent ───────────────────▶ Alarming
//!      ▲                            │
//!      └────────────────────────────┘
//!            未确认订单全部清空
//! ```

/// 报警状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlertState {
    #[default]
    Silent,
    Alarming,
}

/// 一次看板变更引起的报警状态变化
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertTransition {
    /// Silent → Alarming，立即播放
    Started,
    /// Alarming → Silent
    Stopped,
    Unchanged,
}

impl AlertState {
    pub fn is_alarming(&self) -> bool {
        matches!(self, AlertState::Alarming)
    }

    /// Move to the state implied by whether unacknowledged orders remain
    pub fn update(&mut self, has_pending: bool) -> AlertTransition {
        match (*self, has_pending) {
            (AlertState::Silent, true) => {
                *self = AlertState::Alarming;
                AlertTransition::Started
            }
            (AlertState::Alarming, false) => {
                *self = AlertState::Silent;
                AlertTransition::Stopped
            }
            _ => AlertTransition::Unchanged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions() {
        let mut state = AlertState::default();
        assert_eq!(state.update(false), AlertTransition::Unchanged);
        assert_eq!(state.update(true), AlertTransition::Started);
        assert!(state.is_alarming());
        assert_eq!(state.update(true), AlertTransition::Unchanged);
        assert_eq!(state.update(false), AlertTransition::Stopped);
        assert_eq!(state, AlertState::Silent);
    }
}
