//! Run lifecycle notifications
//!
//! The runtime emits node and run lifecycle events to a caller-supplied
//! listener. Listeners exist for observability only; they cannot influence
//! evaluation.

use crate::result::{DecisionRunResult, EvaluationFailure};
use verdict_core::Value;

/// Receiver for decision-run lifecycle notifications
pub trait RuntimeListener {
    fn on_decision_started(&self, _name: &str) {}

    fn on_decision_succeeded(&self, _name: &str, _value: &Value) {}

    fn on_decision_failed(&self, _name: &str, _failure: &EvaluationFailure) {}

    fn on_run_completed(&self, _result: &DecisionRunResult) {}
}

/// Listener that ignores every event
#[derive(Debug, Default)]
pub struct NoopListener;

impl RuntimeListener for NoopListener {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::FailureKind;
    use std::cell::RefCell;

    struct Recording {
        events: RefCell<Vec<String>>,
    }

    impl RuntimeListener for Recording {
        fn on_decision_started(&self, name: &str) {
            self.events.borrow_mut().push(format!("started:{}", name));
        }

        fn on_decision_succeeded(&self, name: &str, _value: &Value) {
            self.events.borrow_mut().push(format!("succeeded:{}", name));
        }

        fn on_decision_failed(&self, name: &str, failure: &EvaluationFailure) {
            self.events
                .borrow_mut()
                .push(format!("failed:{}:{:?}", name, failure.kind));
        }
    }

    #[test]
    fn test_listener_receives_events() {
        let listener = Recording {
            events: RefCell::new(Vec::new()),
        };

        listener.on_decision_started("D1");
        listener.on_decision_succeeded("D1", &Value::number(1));
        listener.on_decision_failed(
            "D2",
            &EvaluationFailure::new(FailureKind::Evaluation, "boom"),
        );

        assert_eq!(
            *listener.events.borrow(),
            vec!["started:D1", "succeeded:D1", "failed:D2:Evaluation"]
        );
    }

    #[test]
    fn test_noop_listener_accepts_events() {
        let listener = NoopListener;
        listener.on_decision_started("D1");
        listener.on_run_completed(&DecisionRunResult::new("ns"));
    }
}
