mod answers;
mod ids;
mod question;

pub use answers::AnswerSheet;
pub use ids::QuestionId;
pub use question::{Question, QuestionError, ensure_unique_ids, option_label};
