//! Outcome of invoking a cooldown gate.

/// Decision made by a [`LimitedEvent`](crate::LimitedEvent) gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// The gate was open; the callback ran
    Executed,
    /// The gate was closed; the invocation was dropped
    Dropped,
}

impl GateDecision {
    /// Check if this decision is Executed.
    pub fn is_executed(&self) -> bool {
        matches!(self, GateDecision::Executed)
    }

    /// Check if this decision is Dropped.
    pub fn is_dropped(&self) -> bool {
        matches!(self, GateDecision::Dropped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_predicates() {
        assert!(GateDecision::Executed.is_executed());
        assert!(!GateDecision::Executed.is_dropped());
        assert!(GateDecision::Dropped.is_dropped());
        assert!(!GateDecision::Dropped.is_executed());
    }
}
