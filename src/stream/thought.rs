//! The immutable unit of data carried through the stream algebra

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::topology::Coordinate;

/// An immutable, timestamped, traceable unit of payload flowing between cells.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Thought<T> {
    pub payload: T,
    pub origin: Coordinate,
    pub timestamp: DateTime<Utc>,
    pub trace_id: Option<Uuid>,
    pub metadata: Option<HashMap<String, Value>>,
}

impl<T> Thought<T> {
    pub fn new(payload: T, origin: Coordinate) -> Self {
        Self {
            payload,
            origin,
            timestamp: Utc::now(),
            trace_id: None,
            metadata: None,
        }
    }

    pub fn with_trace_id(mut self, trace_id: Uuid) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    pub fn with_metadata(mut self, metadata: HashMap<String, Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Functorial map: transforms the payload, forwards every other field.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Thought<U> {
        Thought {
            payload: f(self.payload),
            origin: self.origin,
            timestamp: self.timestamp,
            trace_id: self.trace_id,
            metadata: self.metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_transforms_payload_only() {
        let origin = Coordinate::scalar(0);
        let thought = Thought::new(3, origin.clone()).with_trace_id(Uuid::nil());
        let mapped = thought.clone().map(|p| p * 2);
        assert_eq!(mapped.payload, 6);
        assert_eq!(mapped.origin, origin);
        assert_eq!(mapped.trace_id, thought.trace_id);
        assert_eq!(mapped.timestamp, thought.timestamp);
    }

    #[test]
    fn map_obeys_identity_law() {
        let thought = Thought::new("x".to_string(), Coordinate::scalar(1));
        let mapped = thought.clone().map(|p| p);
        assert_eq!(mapped.payload, thought.payload);
    }

    #[test]
    fn map_obeys_composition_law() {
        let thought = Thought::new(2, Coordinate::scalar(0));
        let f = |x: i32| x + 1;
        let g = |x: i32| x * 3;
        let composed = thought.clone().map(|x| g(f(x)));
        let sequential = thought.map(f).map(g);
        assert_eq!(composed.payload, sequential.payload);
    }
}
