//! State and event definitions as seen by a single transition.
//!
//! A machine definition owns its states and events. A transition looks them
//! up by name once, at construction, and keeps a copy of what it found.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Values stored in a state attribute.
///
/// Any cloneable, comparable, debuggable value works: strings, integers,
/// enums. The bound exists so transitions can be moved across threads and
/// compared for loopback detection.
pub trait StateValue: Clone + PartialEq + Debug + Send + Sync {}

impl<T> StateValue for T where T: Clone + PartialEq + Debug + Send + Sync {}

/// A named state together with the value written into the attribute.
///
/// # Example
///
/// ```rust
/// use waypoint::core::StateDef;
///
/// let parked = StateDef::new("parked", 0u8);
/// assert_eq!(parked.name, "parked");
/// assert_eq!(parked.qualified_name, "parked");
///
/// let namespaced = StateDef::new("parked", 0u8).with_namespace(Some("alarm"));
/// assert_eq!(namespaced.qualified_name, "alarm_parked");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateDef<V> {
    pub name: String,
    pub qualified_name: String,
    pub value: V,
}

impl<V: StateValue> StateDef<V> {
    /// Create a state whose qualified name equals its name.
    pub fn new(name: impl Into<String>, value: V) -> Self {
        let name = name.into();
        Self {
            qualified_name: name.clone(),
            name,
            value,
        }
    }

    /// Prefix the qualified name with the machine namespace.
    pub fn with_namespace(mut self, namespace: Option<&str>) -> Self {
        self.qualified_name = match namespace {
            Some(ns) => format!("{}_{}", ns, self.name),
            None => self.name.clone(),
        };
        self
    }
}

/// A named event.
///
/// Events qualify with the namespace as a suffix (`ignite_alarm`), states as
/// a prefix (`alarm_parked`), so that generated names read naturally.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventDef {
    pub name: String,
    pub qualified_name: String,
}

impl EventDef {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            qualified_name: name.clone(),
            name,
        }
    }

    pub fn with_namespace(mut self, namespace: Option<&str>) -> Self {
        self.qualified_name = match namespace {
            Some(ns) => format!("{}_{}", self.name, ns),
            None => self.name.clone(),
        };
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum Gear {
        Parked,
        Idling,
    }

    #[test]
    fn state_without_namespace_keeps_name() {
        let state = StateDef::new("parked", Gear::Parked);
        assert_eq!(state.name, "parked");
        assert_eq!(state.qualified_name, "parked");
        assert_eq!(state.value, Gear::Parked);
    }

    #[test]
    fn state_namespace_is_prefix() {
        let state = StateDef::new("idling", Gear::Idling).with_namespace(Some("engine"));
        assert_eq!(state.qualified_name, "engine_idling");
        assert_eq!(state.name, "idling");
    }

    #[test]
    fn event_namespace_is_suffix() {
        let event = EventDef::new("ignite").with_namespace(Some("engine"));
        assert_eq!(event.qualified_name, "ignite_engine");

        let plain = EventDef::new("ignite").with_namespace(None);
        assert_eq!(plain.qualified_name, "ignite");
    }

    #[test]
    fn state_serializes_correctly() {
        let state = StateDef::new("parked", Gear::Parked);
        let json = serde_json::to_string(&state).unwrap();
        let deserialized: StateDef<Gear> = serde_json::from_str(&json).unwrap();
        assert_eq!(state, deserialized);
    }
}
