//! Waypoint: per-transition callback execution for state machines
//!
//! Waypoint runs the callbacks a state machine attaches to a single
//! transition of one attribute of one object. Before callbacks run first,
//! around callbacks wrap everything registered after them, the new state is
//! persisted, and after callbacks run last.
//!
//! # Core Concepts
//!
//! - **Machine**: States, events, callbacks and the attribute accessors
//! - **Callback**: Before, around or after step with a matcher, a success
//!   condition and optional guards
//! - **Transition**: One attempted state change, with `perform`, `persist`,
//!   `rollback` and `reset`
//! - **Halt**: Cooperative abort of the remaining steps of a phase
//! - **Pause/Resume**: Around callbacks whose second half is deferred until
//!   a surrounding transaction has committed
//!
//! # Example
//!
//! ```rust
//! use waypoint::builder::{CallbackBuilder, MachineBuilder};
//! use waypoint::transition::Transition;
//!
//! #[derive(Default)]
//! struct Vehicle {
//!     state: String,
//!     log: Vec<String>,
//! }
//!
//! let machine = MachineBuilder::new()
//!     .state("parked", "parked".to_string())
//!     .state("idling", "idling".to_string())
//!     .event("ignite")
//!     .reader(|v: &Vehicle| v.state.clone())
//!     .writer(|v: &mut Vehicle, value| v.state = value)
//!     .callback(CallbackBuilder::before().run(|v: &mut Vehicle, _| {
//!         v.log.push("igniting".to_string());
//!         Ok(())
//!     }))
//!     .unwrap()
//!     .callback(CallbackBuilder::after().run(|v: &mut Vehicle, _| {
//!         v.log.push("ignited".to_string());
//!         Ok(())
//!     }))
//!     .unwrap()
//!     .build()
//!     .unwrap();
//!
//! let mut vehicle = Vehicle {
//!     state: "parked".to_string(),
//!     ..Vehicle::default()
//! };
//! let mut transition =
//!     Transition::new(&vehicle, &machine, "ignite", "parked", "idling", false).unwrap();
//!
//! assert!(transition.perform(&mut vehicle).unwrap());
//! assert_eq!(vehicle.state, "idling");
//! assert_eq!(vehicle.log, vec!["igniting", "ignited"]);
//! ```

pub mod builder;
pub mod callbacks;
pub mod core;
pub mod machine;
pub mod transition;

// Re-export commonly used types
pub use builder::{CallbackBuilder, MachineBuilder};
pub use callbacks::{Callback, CallbackError, SuccessCondition};
pub use machine::{ActionOutcome, Machine, StateMachine};
pub use transition::{Transition, TransitionError};
