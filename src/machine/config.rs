//! Machine-level configuration.

use serde::{Deserialize, Serialize};

/// Knobs shared by every transition of a machine.
///
/// # Example
///
/// ```rust
/// use waypoint::machine::MachineConfig;
///
/// let config: MachineConfig =
///     serde_json::from_str(r#"{"attribute": "status", "namespace": "alarm"}"#).unwrap();
/// assert_eq!(config.attribute, "status");
/// assert!(config.use_transactions);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// Name of the attribute holding the state value.
    pub attribute: String,

    /// Optional namespace used to build qualified state and event names.
    pub namespace: Option<String>,

    /// Run transitions inside the machine's transaction hook. Has no effect
    /// unless a hook is installed.
    pub use_transactions: bool,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            attribute: "state".to_string(),
            namespace: None,
            use_transactions: true,
        }
    }
}
