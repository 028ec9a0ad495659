use std::fmt;

use thiserror::Error;

/// Top-level screens of the quiz flow.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum View {
    #[default]
    Upload,
    Quiz,
    Result,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            View::Upload => "upload",
            View::Quiz => "quiz",
            View::Result => "result",
        })
    }
}

/// Session lifecycle events that drive the router.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewEvent {
    /// A question list was loaded into a fresh session.
    Loaded,
    /// A load attempt failed; the user stays put to retry.
    LoadFailed,
    /// The user submitted the quiz.
    Finished,
    /// The session was discarded.
    Reset,
    /// The session was discarded and a fresh one loaded without visiting upload.
    Reloaded,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RouterError {
    #[error("cannot apply {event:?} while in the {from} view")]
    InvalidTransition { from: View, event: ViewEvent },
}

/// Upload → quiz → result state machine. Cyclic: `Reset` always leads back to upload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ViewRouter {
    current: View,
}

impl ViewRouter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current(&self) -> View {
        self.current
    }

    /// The view reached from `from` on `event`, if that transition exists.
    #[must_use]
    pub const fn next(from: View, event: ViewEvent) -> Option<View> {
        match (from, event) {
            (View::Upload, ViewEvent::Loaded) => Some(View::Quiz),
            (View::Upload, ViewEvent::LoadFailed) => Some(View::Upload),
            (View::Quiz, ViewEvent::Finished) => Some(View::Result),
            (_, ViewEvent::Reset) => Some(View::Upload),
            (View::Quiz | View::Result, ViewEvent::Reloaded) => Some(View::Quiz),
            _ => None,
        }
    }

    /// Apply an event and return the new view.
    ///
    /// # Errors
    ///
    /// Returns `RouterError::InvalidTransition` and leaves the view unchanged when
    /// the event is not valid in the current view.
    pub fn apply(&mut self, event: ViewEvent) -> Result<View, RouterError> {
        let next = Self::next(self.current, event).ok_or(RouterError::InvalidTransition {
            from: self.current,
            event,
        })?;
        self.current = next;
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_on_upload() {
        assert_eq!(ViewRouter::new().current(), View::Upload);
    }

    #[test]
    fn full_cycle() {
        let mut router = ViewRouter::new();
        assert_eq!(router.apply(ViewEvent::LoadFailed), Ok(View::Upload));
        assert_eq!(router.apply(ViewEvent::Loaded), Ok(View::Quiz));
        assert_eq!(router.apply(ViewEvent::Finished), Ok(View::Result));
        assert_eq!(router.apply(ViewEvent::Reset), Ok(View::Upload));
        assert_eq!(router.apply(ViewEvent::Loaded), Ok(View::Quiz));
    }

    #[test]
    fn reset_is_valid_everywhere() {
        for view in [View::Upload, View::Quiz, View::Result] {
            assert_eq!(ViewRouter::next(view, ViewEvent::Reset), Some(View::Upload));
        }
    }

    #[test]
    fn reload_goes_straight_back_to_quiz() {
        assert_eq!(ViewRouter::next(View::Result, ViewEvent::Reloaded), Some(View::Quiz));
        assert_eq!(ViewRouter::next(View::Quiz, ViewEvent::Reloaded), Some(View::Quiz));
        assert_eq!(ViewRouter::next(View::Upload, ViewEvent::Reloaded), None);
    }

    #[test]
    fn invalid_events_leave_view_unchanged() {
        let mut router = ViewRouter::new();
        assert_eq!(
            router.apply(ViewEvent::Finished),
            Err(RouterError::InvalidTransition {
                from: View::Upload,
                event: ViewEvent::Finished
            })
        );
        assert_eq!(router.current(), View::Upload);

        router.apply(ViewEvent::Loaded).unwrap();
        assert!(router.apply(ViewEvent::Loaded).is_err());
        assert!(router.apply(ViewEvent::LoadFailed).is_err());
        assert_eq!(router.current(), View::Quiz);

        router.apply(ViewEvent::Finished).unwrap();
        assert!(router.apply(ViewEvent::Finished).is_err());
        assert_eq!(router.current(), View::Result);
    }
}
