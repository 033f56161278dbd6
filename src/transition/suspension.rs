//! Pause/resume bookkeeping for around callbacks.
//!
//! An around callback is split at its yield point. When the before phase
//! finishes with after callbacks disabled, the second halves of every
//! around callback that yielded are not run; their positions in the machine's
//! before list are stored here instead. Resuming hands those positions back,
//! innermost last in the list, so the caller can unwind them in reverse.

use crate::transition::chain::Unwind;
use crate::transition::TransitionError;

/// Per-transition suspension state.
///
/// At most one of `paused` / `resuming` is active at a time, and finishing a
/// resume clears both.
#[derive(Debug, Default)]
pub(crate) struct Suspension {
    paused: Option<Vec<usize>>,
    resuming: bool,
}

/// What happened while paused halves were resumed.
#[derive(Debug)]
pub(crate) struct Resumption {
    pub halted: bool,
    pub error: Option<TransitionError>,
}

impl Suspension {
    pub fn is_paused(&self) -> bool {
        self.paused.is_some()
    }

    /// Defer the second halves of the given around callbacks.
    ///
    /// `frames` lists callback indices in the order their first halves ran.
    /// Only the chain walker pauses, with the around callbacks it just ran,
    /// and only when no pause or resume is active: a plain before callback
    /// has no second half to defer, so pausing outside an around callback
    /// cannot be expressed.
    pub fn pause(&mut self, frames: Vec<usize>) {
        debug_assert!(!frames.is_empty(), "pause without around callbacks");
        debug_assert!(
            self.paused.is_none() && !self.resuming,
            "pause while a pause or resume is active"
        );
        self.paused = Some(frames);
    }

    /// Take the paused frames, marking a resume as in flight.
    pub fn begin_resume(&mut self) -> Option<Vec<usize>> {
        let frames = self.paused.take()?;
        self.resuming = true;
        Some(frames)
    }

    /// Record the outcome of unwinding resumed frames and clear all state.
    pub fn finish_resume(&mut self, outcome: Result<Unwind, TransitionError>) -> Resumption {
        self.clear();
        match outcome {
            Ok(Unwind::Halted) => Resumption {
                halted: true,
                error: None,
            },
            Ok(Unwind::Completed | Unwind::Cancelled) => Resumption {
                halted: false,
                error: None,
            },
            Err(error) => Resumption {
                halted: false,
                error: Some(error),
            },
        }
    }

    pub fn clear(&mut self) {
        self.paused = None;
        self.resuming = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callbacks::Phase;

    #[test]
    fn resume_hands_back_frames_once() {
        let mut suspension = Suspension::default();
        suspension.pause(vec![0, 2]);
        assert!(suspension.is_paused());

        let frames = suspension.begin_resume().unwrap();
        assert_eq!(frames, vec![0, 2]);
        assert!(suspension.resuming);
        assert!(!suspension.is_paused());

        let resumption = suspension.finish_resume(Ok(Unwind::Completed));
        assert!(!resumption.halted);
        assert!(resumption.error.is_none());
        assert!(!suspension.resuming);
        assert!(suspension.begin_resume().is_none());
    }

    #[test]
    #[should_panic(expected = "pause without around callbacks")]
    #[cfg(debug_assertions)]
    fn pause_without_around_frames_panics() {
        Suspension::default().pause(Vec::new());
    }

    #[test]
    fn clear_discards_a_pause() {
        let mut suspension = Suspension::default();
        suspension.pause(vec![1]);
        suspension.clear();
        assert!(!suspension.is_paused());
        assert!(suspension.begin_resume().is_none());
    }

    #[test]
    fn finish_resume_reports_halts_and_errors() {
        let mut suspension = Suspension::default();

        suspension.pause(vec![0]);
        suspension.begin_resume();
        assert!(suspension.finish_resume(Ok(Unwind::Halted)).halted);

        suspension.pause(vec![0]);
        suspension.begin_resume();
        let resumption = suspension.finish_resume(Err(TransitionError::CallbackFault {
            callback: "audit".to_string(),
            phase: Phase::Before,
            message: "log unavailable".to_string(),
        }));
        assert!(!resumption.halted);
        assert!(matches!(
            resumption.error,
            Some(TransitionError::CallbackFault { .. })
        ));
        assert!(!suspension.is_paused());
    }
}
