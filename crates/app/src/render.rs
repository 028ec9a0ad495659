//! Plain-text rendering of the three views.

use std::fmt::Write as _;

use quiz_core::{Question, QuizReport, QuizSession, View, option_label};
use quiz_services::QuizController;

#[must_use]
pub fn render(controller: &QuizController) -> String {
    match (controller.view(), controller.session()) {
        (View::Quiz, Some(session)) => render_quiz(session),
        (View::Result, Some(session)) => match controller.report() {
            Ok(report) => render_result(session.questions(), &report),
            Err(err) => format!("{err}\n"),
        },
        _ => render_upload(controller),
    }
}

fn render_upload(controller: &QuizController) -> String {
    let mut out = String::from("== Load a quiz ==\n");
    out.push_str("Open a Word document whose correct answers are underlined.\n");
    out.push_str("  file <path.docx>  or  url <link>\n");
    if controller.is_loading() {
        out.push_str("Analysing document...\n");
    }
    if let Some(error) = controller.error() {
        let _ = writeln!(out, "error: {error}");
    }
    out
}

fn render_quiz(session: &QuizSession) -> String {
    let mut out = String::new();
    let progress = session.progress();
    let _ = writeln!(
        out,
        "== Question {}/{} ({}% through, {} answered) ==",
        progress.position, progress.total, progress.percent_through, progress.answered
    );

    let Some(question) = session.current_question() else {
        return out;
    };
    if let Some(image) = question.image_url() {
        let _ = writeln!(out, "[image: {}]", describe_image(image));
    }
    let _ = writeln!(out, "{}", question.text());

    let selected = session.current_selection();
    for (index, option) in question.options().iter().enumerate() {
        let marker = if selected == Some(index) { '*' } else { ' ' };
        let _ = writeln!(out, " {marker} {}. {option}", option_label(index));
    }

    let mut hints = Vec::new();
    if !progress.is_first {
        hints.push("prev");
    }
    if !progress.is_last {
        hints.push("next");
    }
    if progress.answered > 0 {
        hints.push("finish");
    }
    let _ = writeln!(out, "select <A|n> | {}", hints.join(" | "));
    out
}

fn render_result(questions: &[Question], report: &QuizReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "== Result: {}% ==", report.score.percentage());
    let _ = writeln!(
        out,
        "{}/{} correct",
        report.score.correct_count(),
        report.score.total()
    );

    for (number, (question, outcome)) in questions.iter().zip(&report.outcomes).enumerate() {
        let verdict = if outcome.is_correct { "RIGHT" } else { "WRONG" };
        let _ = writeln!(out, "\n{}. [{verdict}] {}", number + 1, question.text());
        for (index, option) in question.options().iter().enumerate() {
            let marker = if index == outcome.correct_index {
                '+'
            } else if outcome.selected == Some(index) {
                'x'
            } else {
                ' '
            };
            let _ = writeln!(out, " {marker} {}. {option}", option_label(index));
        }
        if outcome.selected.is_none() {
            out.push_str("   (not answered)\n");
        }
    }
    out.push_str("\nshare | reset\n");
    out
}

fn describe_image(image: &str) -> String {
    match image.split_once(";base64,") {
        Some((kind, data)) => format!(
            "{} ({} bytes)",
            kind.trim_start_matches("data:"),
            data.len() * 3 / 4
        ),
        None => image.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::QuestionId;
    use quiz_core::time::fixed_clock;
    use quiz_services::{LoadOrigin, LoadSource, QuizConfig};
    use url::Url;

    fn controller_with_quiz() -> QuizController {
        let mut controller = QuizController::new(QuizConfig::new(
            Url::parse("http://localhost:8080/").unwrap(),
        ))
        .with_clock(fixed_clock());
        let request = controller
            .request_load(LoadSource::Document(vec![1]), LoadOrigin::Interactive)
            .unwrap();
        let questions = vec![
            Question::new(
                QuestionId::new("q1").unwrap(),
                "Pick B",
                vec!["a".into(), "b".into()],
                1,
            )
            .unwrap()
            .with_image_url(Some("data:image/png;base64,AAAA".into())),
            Question::new(
                QuestionId::new("q2").unwrap(),
                "Pick A",
                vec!["a".into(), "b".into()],
                0,
            )
            .unwrap(),
        ];
        controller.complete_load(request.ticket, Ok(questions));
        controller
    }

    #[test]
    fn upload_view_shows_error() {
        let mut controller =
            QuizController::new(QuizConfig::new(Url::parse("http://localhost:8080/").unwrap()));
        let request = controller
            .request_load(LoadSource::Document(vec![1]), LoadOrigin::Interactive)
            .unwrap();
        assert!(render(&controller).contains("Analysing"));

        controller.complete_load(request.ticket, Ok(Vec::new()));
        let text = render(&controller);
        assert!(text.contains("== Load a quiz =="));
        assert!(text.contains("error: the document does not contain any questions."));
    }

    #[test]
    fn quiz_view_marks_selection_and_image() {
        let mut controller = controller_with_quiz();
        controller.select_answer(1).unwrap();
        let text = render(&controller);

        assert!(text.contains("== Question 1/2 (50% through, 1 answered) =="));
        assert!(text.contains("[image: image/png (3 bytes)]"));
        assert!(text.contains(" * B. b"));
        assert!(text.contains("   A. a"));
        assert!(text.contains("select <A|n> | next | finish"));
    }

    #[test]
    fn result_view_lists_outcomes() {
        let mut controller = controller_with_quiz();
        controller.select_answer(1).unwrap();
        controller.finish().unwrap();
        let text = render(&controller);

        assert!(text.contains("== Result: 50% =="));
        assert!(text.contains("1/2 correct"));
        assert!(text.contains("1. [RIGHT] Pick B"));
        assert!(text.contains("2. [WRONG] Pick A"));
        assert!(text.contains("(not answered)"));
    }
}
