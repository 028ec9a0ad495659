#![forbid(unsafe_code)]

pub mod error;
pub mod model;
pub mod score;
pub mod session;
pub mod share;
pub mod time;
pub mod view;

pub use error::Error;
pub use model::{AnswerSheet, Question, QuestionError, QuestionId, option_label};
pub use score::{QuestionOutcome, Score, ScoreError};
pub use session::{QuizProgress, QuizReport, QuizSession, SessionError};
pub use share::{DecodeError, ShareError, ShareToken};
pub use time::Clock;
pub use view::{RouterError, View, ViewEvent, ViewRouter};
