use serde_json::Value;
use serde_json::json;

/// The operator channel's vocabulary, disjoint from the game bus.
#[derive(Debug, Clone)]
pub enum OperatorEvent {
    Connected,
    NewOrder(Value),
    OrderUpdated(Value),
    TestEvent(Value),
    Ping,
    Error(String),
}

impl OperatorEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            OperatorEvent::Connected => "connected",
            OperatorEvent::NewOrder(_) => "new-order",
            OperatorEvent::OrderUpdated(_) => "order-updated",
            OperatorEvent::TestEvent(_) => "test-event",
            OperatorEvent::Ping => "ping",
            OperatorEvent::Error(_) => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OperatorEvent::Error(_))
    }

    fn data(&self) -> Value {
        match self {
            OperatorEvent::Connected | OperatorEvent::Ping => json!({}),
            OperatorEvent::NewOrder(summary)
            | OperatorEvent::OrderUpdated(summary)
            | OperatorEvent::TestEvent(summary) => summary.clone(),
            OperatorEvent::Error(error) => json!({ "error": error }),
        }
    }

    pub fn envelope(&self) -> String {
        json!({
            "type": self.kind(),
            "data": self.data(),
            "timestamp": crate::now_ms(),
        })
        .to_string()
    }
}
