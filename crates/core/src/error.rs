use thiserror::Error;

use crate::model::QuestionError;
use crate::score::ScoreError;
use crate::session::SessionError;
use crate::share::{DecodeError, ShareError};
use crate::view::RouterError;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Score(#[from] ScoreError),
    #[error(transparent)]
    Share(#[from] ShareError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Router(#[from] RouterError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuestionId;
    use crate::share::ShareToken;

    fn decode_first_id(raw: &str) -> Result<QuestionId, Error> {
        let questions = ShareToken::from_raw(raw).decode()?;
        Ok(questions[0].id().clone())
    }

    #[test]
    fn layer_errors_convert_into_crate_error() {
        assert!(matches!(
            decode_first_id(" "),
            Err(Error::Decode(DecodeError::Empty))
        ));
        assert!(matches!(
            Error::from(QuestionError::EmptyId),
            Error::Question(QuestionError::EmptyId)
        ));
    }
}
