//! The callback chain walker.
//!
//! Before and around callbacks share one ordered list. Walking it runs each
//! matching step in turn; an around step runs its first half and is pushed
//! onto a stack of frames. Once the list is exhausted the action body runs,
//! then the frames unwind innermost first, running each second half whose
//! success condition matches the outcome. This is the call-stack order an
//! around callback would produce by wrapping "everything after me".

use crate::callbacks::{Callback, CallbackError, CallbackType, Phase};
use crate::core::StateValue;
use crate::machine::ActionOutcome;
use crate::transition::{Transition, TransitionError, TransitionView};
use tracing::{debug, trace, warn};

/// How the before phase ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BeforeOutcome {
    Completed,
    Halted,
    Paused,
}

/// How unwinding around frames ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Unwind {
    /// Every pending second half ran.
    Completed,
    /// A success condition did not match; remaining second halves skipped.
    Cancelled,
    /// A second half halted.
    Halted,
}

impl<'m, O, V: StateValue> Transition<'m, O, V> {
    pub(crate) fn view(&self) -> TransitionView<'_, V> {
        TransitionView {
            context: &self.context,
            attribute: &self.attribute,
            event: &self.event,
            from: &self.from,
            to: &self.to_state.value,
            args: &self.run.args,
            result: self.run.result.as_ref(),
            success: self.run.success,
        }
    }

    fn applies(&self, callback: &Callback<O, V>, object: &O) -> bool {
        callback.matches(&self.context) && callback.allows(object)
    }

    fn fault(
        callback: &Callback<O, V>,
        phase: Phase,
        error: Box<dyn std::error::Error + Send + Sync>,
    ) -> TransitionError {
        TransitionError::CallbackFault {
            callback: callback.name().to_string(),
            phase,
            message: error.to_string(),
        }
    }

    /// Walk the before list, run the action, then unwind or pause.
    ///
    /// Steps only run once per reset cycle; a later call goes straight to the
    /// action body.
    pub(crate) fn run_before<F>(
        &mut self,
        object: &mut O,
        run_after: bool,
        action: F,
    ) -> Result<BeforeOutcome, TransitionError>
    where
        F: FnOnce(&mut Self, &mut O) -> Result<ActionOutcome, TransitionError>,
    {
        let machine = self.machine;
        let mut frames = Vec::new();

        if !self.run.before_run {
            debug!(event = %self.context.event, from = %self.context.from, to = %self.context.to, "running before callbacks");
            for (index, callback) in machine.callbacks(Phase::Before).iter().enumerate() {
                if !self.applies(callback, object) {
                    continue;
                }
                trace!(callback = callback.name(), kind = %callback.kind(), "invoking callback");
                match callback.invoke(object, &self.view()) {
                    Ok(()) => {
                        if callback.kind() == CallbackType::Around {
                            frames.push(index);
                        }
                    }
                    Err(CallbackError::Halt) => {
                        debug!(callback = callback.name(), "before phase halted");
                        return Ok(BeforeOutcome::Halted);
                    }
                    Err(CallbackError::Fault(error)) => {
                        return Err(Self::fault(callback, Phase::Before, error));
                    }
                }
            }
        }

        let outcome = action(self, object)?;
        debug!(success = outcome.success, "action finished");
        self.run.result = outcome.result;
        self.run.success = outcome.success;

        if self.run.before_run {
            return Ok(BeforeOutcome::Completed);
        }

        if !frames.is_empty() && self.run.success && !run_after {
            debug!(pending = frames.len(), "pausing around callbacks");
            self.suspension.pause(frames);
            return Ok(BeforeOutcome::Paused);
        }

        match self.unwind(object, frames)? {
            Unwind::Halted => Ok(BeforeOutcome::Halted),
            Unwind::Completed | Unwind::Cancelled => {
                self.run.before_run = true;
                Ok(BeforeOutcome::Completed)
            }
        }
    }

    /// Run pending second halves, innermost first.
    pub(crate) fn unwind(
        &mut self,
        object: &mut O,
        frames: Vec<usize>,
    ) -> Result<Unwind, TransitionError> {
        let callbacks = self.machine.callbacks(Phase::Before);

        for index in frames.into_iter().rev() {
            let Some(callback) = callbacks.get(index) else {
                continue;
            };
            if !callback.matches_success_condition(self.run.success) {
                debug!(callback = callback.name(), success = self.run.success, "around callback cancelled");
                return Ok(Unwind::Cancelled);
            }
            trace!(callback = callback.name(), "resuming around callback");
            match callback.invoke_after_yield(object, &self.view()) {
                Ok(()) => {}
                Err(CallbackError::Halt) => {
                    debug!(callback = callback.name(), "around callback halted");
                    return Ok(Unwind::Halted);
                }
                Err(CallbackError::Fault(error)) => {
                    return Err(Self::fault(callback, Phase::Before, error));
                }
            }
        }

        Ok(Unwind::Completed)
    }

    /// Resume paused second halves. Returns `false` if one of them halted.
    ///
    /// Faults raised while resuming surface here, in the caller of
    /// [`Transition::after`], not in the call that paused.
    pub(crate) fn resume(&mut self, object: &mut O) -> Result<bool, TransitionError> {
        let Some(frames) = self.suspension.begin_resume() else {
            return Ok(true);
        };

        debug!(pending = frames.len(), "resuming paused around callbacks");
        let outcome = self.unwind(object, frames);
        let resumption = self.suspension.finish_resume(outcome);

        if let Some(error) = resumption.error {
            return Err(error);
        }
        if !resumption.halted {
            self.run.before_run = true;
        }
        Ok(!resumption.halted)
    }

    /// Run matching after callbacks. Halts and faults stop the remaining
    /// callbacks but never escape.
    pub(crate) fn run_after_callbacks(&mut self, object: &mut O) {
        let machine = self.machine;
        debug!(success = self.run.success, "running after callbacks");

        for callback in machine.callbacks(Phase::After) {
            if !self.applies(callback, object)
                || !callback.matches_success_condition(self.run.success)
            {
                continue;
            }
            trace!(callback = callback.name(), "invoking callback");
            match callback.invoke(object, &self.view()) {
                Ok(()) => {}
                Err(CallbackError::Halt) => {
                    debug!(callback = callback.name(), "after phase halted");
                    break;
                }
                Err(CallbackError::Fault(error)) => {
                    warn!(callback = callback.name(), error = %error, "after callback failed");
                    break;
                }
            }
        }
    }
}
