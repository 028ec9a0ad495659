use log::{debug, info, warn};
use url::Url;

use quiz_core::{
    Clock, Question, QuestionId, QuizReport, QuizSession, RouterError, Score, ShareToken, View,
    ViewEvent, ViewRouter,
};

use crate::config::QuizConfig;
use crate::error::{ControllerError, LoadError};
use crate::quiz_loader::LoadSource;
use crate::startup::StartupParams;

//
// ─── LOAD BOOKKEEPING ──────────────────────────────────────────────────────────
//

/// Who asked for a load. Automatic loads fail silently.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOrigin {
    Interactive,
    Automatic,
}

/// Identifies one load attempt; results carrying an outdated ticket are discarded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    origin: LoadOrigin,
}

impl LoadTicket {
    #[must_use]
    pub fn origin(&self) -> LoadOrigin {
        self.origin
    }
}

/// A load the caller must run and report back through [`QuizController::complete_load`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadRequest {
    pub ticket: LoadTicket,
    pub source: LoadSource,
}

/// What `complete_load` did with a result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A new session was started and the quiz view entered.
    Loaded,
    /// The load failed and `error` now describes why.
    Failed,
    /// An automatic load failed; nothing is shown to the user.
    Suppressed,
    /// The result belonged to a load that was superseded and was ignored.
    Stale,
}

//
// ─── CONTROLLER ────────────────────────────────────────────────────────────────
//

/// Single owner of the quiz flow: view, current session, load status and error.
///
/// Loads are split in two halves so the caller can run them asynchronously:
/// `request_load` hands out a [`LoadRequest`], `complete_load` applies its result.
pub struct QuizController {
    clock: Clock,
    config: QuizConfig,
    router: ViewRouter,
    session: Option<QuizSession>,
    in_flight: Option<LoadTicket>,
    generation: u64,
    error: Option<String>,
}

impl QuizController {
    #[must_use]
    pub fn new(config: QuizConfig) -> Self {
        Self {
            clock: Clock::default(),
            config,
            router: ViewRouter::new(),
            session: None,
            in_flight: None,
            generation: 0,
            error: None,
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn view(&self) -> View {
        self.router.current()
    }

    #[must_use]
    pub fn session(&self) -> Option<&QuizSession> {
        self.session.as_ref()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Message describing the last interactive load failure.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Apply launch parameters.
    ///
    /// A direct URL wins over a share token. A share token that fails to decode is
    /// ignored without an error. Without either, the configured default source is
    /// loaded automatically.
    pub fn start(&mut self, params: StartupParams) -> Option<LoadRequest> {
        if let Some(url) = params.direct_url {
            return self.request_load(LoadSource::Url(url), LoadOrigin::Interactive);
        }

        if let Some(token) = params.share_token {
            match token.decode() {
                Ok(questions) => {
                    if let Err(err) = self.enter_quiz(questions) {
                        debug!("ignoring shared quiz: {err}");
                    }
                }
                Err(err) => debug!("ignoring malformed share token: {err}"),
            }
            return None;
        }

        self.auto_load()
    }

    /// Begin a load. Returns `None` while another load is in flight or outside
    /// the upload view.
    pub fn request_load(&mut self, source: LoadSource, origin: LoadOrigin) -> Option<LoadRequest> {
        if let Some(pending) = self.in_flight {
            debug!(
                "ignoring load of {source}: load {} still in flight",
                pending.generation
            );
            return None;
        }
        if self.router.current() != View::Upload {
            debug!("ignoring load of {source} from the {} view", self.router.current());
            return None;
        }

        Some(self.begin_load(source, origin))
    }

    /// Apply the result of a load started by `request_load`.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<Question>, LoadError>,
    ) -> LoadOutcome {
        if self.in_flight != Some(ticket) {
            debug!("discarding result of stale load {}", ticket.generation);
            return LoadOutcome::Stale;
        }
        self.in_flight = None;

        let (message, detail) = match result {
            Ok(questions) => match self.enter_quiz(questions) {
                Ok(()) => return LoadOutcome::Loaded,
                Err(err) => (err.user_message(), err.to_string()),
            },
            Err(err) => (err.user_message(), err.to_string()),
        };

        if ticket.origin == LoadOrigin::Automatic {
            warn!("automatic load {} failed: {detail}", ticket.generation);
            if self.router.current() != View::Upload {
                self.return_to_upload();
            }
            return LoadOutcome::Suppressed;
        }

        warn!("load {} failed: {detail}", ticket.generation);
        if let Err(err) = self.router.apply(ViewEvent::LoadFailed) {
            debug!("{err}");
        }
        self.error = Some(message.to_string());
        LoadOutcome::Failed
    }

    /// Select an option for the current question. Returns the replaced option.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::NoSession` without a quiz and
    /// `ControllerError::Session` for invalid or late selections.
    pub fn select_answer(&mut self, option_index: usize) -> Result<Option<usize>, ControllerError> {
        Ok(self.session_mut()?.select_current(option_index)?)
    }

    /// # Errors
    ///
    /// Same as [`QuizController::select_answer`], plus unknown question ids.
    pub fn select_answer_for(
        &mut self,
        question_id: &QuestionId,
        option_index: usize,
    ) -> Result<Option<usize>, ControllerError> {
        Ok(self
            .session_mut()?
            .select_answer(question_id, option_index)?)
    }

    /// # Errors
    ///
    /// Returns `ControllerError::NoSession` without a quiz.
    pub fn advance(&mut self) -> Result<usize, ControllerError> {
        Ok(self.session_mut()?.advance())
    }

    /// # Errors
    ///
    /// Returns `ControllerError::NoSession` without a quiz.
    pub fn retreat(&mut self) -> Result<usize, ControllerError> {
        Ok(self.session_mut()?.retreat())
    }

    /// Submit the quiz and move to the result view.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::Router` outside the quiz view and
    /// `ControllerError::Session` when nothing has been answered.
    pub fn finish(&mut self) -> Result<Score, ControllerError> {
        if ViewRouter::next(self.router.current(), ViewEvent::Finished).is_none() {
            return Err(RouterError::InvalidTransition {
                from: self.router.current(),
                event: ViewEvent::Finished,
            }
            .into());
        }
        let finished_at = self.clock.now();
        let score = self.session_mut()?.finish(finished_at)?;
        self.router.apply(ViewEvent::Finished)?;
        info!(
            "quiz finished: {}/{} correct ({}%)",
            score.correct_count(),
            score.total(),
            score.percentage()
        );
        Ok(score)
    }

    /// # Errors
    ///
    /// Returns `ControllerError::NoSession` without a quiz and
    /// `ControllerError::Session` before the quiz is finished.
    pub fn report(&self) -> Result<QuizReport, ControllerError> {
        Ok(self.session_ref()?.report()?)
    }

    /// Link that reopens the current quiz (without images) for someone else.
    ///
    /// # Errors
    ///
    /// Returns `ControllerError::NoSession` without a quiz and
    /// `ControllerError::Share` if encoding fails.
    pub fn share_link(&self) -> Result<Url, ControllerError> {
        let token = ShareToken::encode(self.session_ref()?.questions())?;
        Ok(token.share_link(self.config.share_base()))
    }

    /// Discard the session and any in-flight load.
    ///
    /// Without a default source this returns to the upload view. With one, the
    /// current view is kept while the default source reloads: success goes
    /// straight to the quiz view, failure falls back to upload silently.
    pub fn reset(&mut self) -> Option<LoadRequest> {
        if let Some(pending) = self.in_flight.take() {
            info!("abandoning in-flight load {}", pending.generation);
        }
        self.generation += 1;
        self.session = None;
        self.error = None;

        let Some(source) = self.config.default_source().map(str::to_string) else {
            self.return_to_upload();
            return None;
        };
        if self.router.current() == View::Upload {
            return self.request_load(LoadSource::Url(source), LoadOrigin::Automatic);
        }
        Some(self.begin_load(LoadSource::Url(source), LoadOrigin::Automatic))
    }

    fn auto_load(&mut self) -> Option<LoadRequest> {
        let source = self.config.default_source()?.to_string();
        self.request_load(LoadSource::Url(source), LoadOrigin::Automatic)
    }

    fn begin_load(&mut self, source: LoadSource, origin: LoadOrigin) -> LoadRequest {
        self.generation += 1;
        let ticket = LoadTicket {
            generation: self.generation,
            origin,
        };
        self.in_flight = Some(ticket);
        self.error = None;
        info!("load {} started for {source}", ticket.generation);

        LoadRequest { ticket, source }
    }

    fn return_to_upload(&mut self) {
        if let Err(err) = self.router.apply(ViewEvent::Reset) {
            debug!("{err}");
        }
    }

    fn enter_quiz(&mut self, questions: Vec<Question>) -> Result<(), ControllerError> {
        let session = QuizSession::new(questions, self.clock.now())?;
        let event = if self.router.current() == View::Upload {
            ViewEvent::Loaded
        } else {
            ViewEvent::Reloaded
        };
        self.router.apply(event)?;
        info!("quiz started with {} questions", session.total_questions());
        self.session = Some(session);
        self.error = None;
        Ok(())
    }

    fn session_ref(&self) -> Result<&QuizSession, ControllerError> {
        self.session.as_ref().ok_or(ControllerError::NoSession)
    }

    fn session_mut(&mut self) -> Result<&mut QuizSession, ControllerError> {
        self.session.as_mut().ok_or(ControllerError::NoSession)
    }
}

impl std::fmt::Debug for QuizController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuizController")
            .field("view", &self.router.current())
            .field("session", &self.session)
            .field("in_flight", &self.in_flight)
            .field("generation", &self.generation)
            .field("error", &self.error)
            .finish_non_exhaustive()
    }
}
