use std::collections::HashMap;

use super::QuestionId;

/// Selected option per question. A missing entry means the question is unanswered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSheet {
    selections: HashMap<QuestionId, usize>,
}

impl AnswerSheet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a selection, returning the option it replaced.
    pub fn record(&mut self, question_id: QuestionId, option_index: usize) -> Option<usize> {
        self.selections.insert(question_id, option_index)
    }

    #[must_use]
    pub fn get(&self, question_id: &QuestionId) -> Option<usize> {
        self.selections.get(question_id).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.selections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }
}

impl FromIterator<(QuestionId, usize)> for AnswerSheet {
    fn from_iter<T: IntoIterator<Item = (QuestionId, usize)>>(iter: T) -> Self {
        Self {
            selections: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_overwrites_and_keeps_other_entries() {
        let q1 = QuestionId::new("q1").unwrap();
        let q2 = QuestionId::new("q2").unwrap();
        let mut sheet = AnswerSheet::new();

        assert_eq!(sheet.record(q1.clone(), 0), None);
        assert_eq!(sheet.record(q2.clone(), 3), None);
        assert_eq!(sheet.record(q1.clone(), 2), Some(0));

        assert_eq!(sheet.get(&q1), Some(2));
        assert_eq!(sheet.get(&q2), Some(3));
        assert_eq!(sheet.len(), 2);
    }
}
