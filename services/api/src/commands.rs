use body_climate::error::AppError;
use body_climate::survey::display::{quadrant_label, signed};
use body_climate::survey::narrative::summarize_answers;
use body_climate::survey::{score, AnswerSet, Axis, QuestionBank, ScoreResult, SurveyVersion};
use body_climate::survey::questions::LIKERT_LABELS;
use clap::Args;
use std::io::Read;
use std::path::PathBuf;

#[derive(Args, Debug, Default)]
pub(crate) struct ScoreArgs {
    /// JSON file holding an object of question id to intensity (0-4). Reads stdin when omitted.
    pub(crate) file: Option<PathBuf>,
    /// Question bank to score against (short or mini). Defaults to short.
    #[arg(long)]
    pub(crate) survey_version: Option<SurveyVersion>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct QuestionsArgs {
    /// Question bank to print (short or mini). Defaults to short.
    #[arg(long)]
    pub(crate) survey_version: Option<SurveyVersion>,
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let raw = match args.file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };

    let bank = args.survey_version.unwrap_or_default().bank();
    let (result, answers) = score_json(&bank, &raw)?;
    print!("{}", render_score(&bank, &result, &answers));
    Ok(())
}

pub(crate) fn run_questions(args: QuestionsArgs) -> Result<(), AppError> {
    let bank = args.survey_version.unwrap_or_default().bank();
    print!("{}", render_questions(&bank));
    Ok(())
}

fn score_json(bank: &QuestionBank, raw: &str) -> Result<(ScoreResult, AnswerSet), AppError> {
    let payload: serde_json::Value = serde_json::from_str(raw)?;
    let answers = AnswerSet::from_json(&payload)?;
    Ok((score(bank, &answers), answers))
}

fn render_score(bank: &QuestionBank, result: &ScoreResult, answers: &AnswerSet) -> String {
    let profile = result.type_code.profile();
    let answered = bank
        .all_questions()
        .iter()
        .filter(|question| answers.contains(question.id))
        .count();

    let lines = [
        format!(
            "{} {} ({}) [{}]",
            profile.emoji, profile.name, profile.name_en, profile.code
        ),
        format!(
            "  CH {}  DD {}  ({})",
            signed(result.ch),
            signed(result.dd),
            quadrant_label(result.ch, result.dd)
        ),
        format!("  {}", profile.definition),
        format!("  주의: {}", profile.warning),
        format!("  오늘 미션: {}", profile.mission),
        String::new(),
        format!(
            "Answered {answered} of {} questions ({} bank)",
            bank.len(),
            bank.version()
        ),
        summarize_answers(bank, answers),
    ];
    lines.join("\n") + "\n"
}

fn render_questions(bank: &QuestionBank) -> String {
    let scale = LIKERT_LABELS
        .iter()
        .enumerate()
        .map(|(value, label)| format!("{value}={label}"))
        .collect::<Vec<_>>()
        .join(", ");

    let mut out = format!(
        "{} bank: {} questions\nscale: {scale}\n",
        bank.version(),
        bank.len()
    );
    for axis in Axis::ALL {
        out.push_str(&format!("\n[{}] {}\n", axis.code(), axis.label()));
        for question in bank.on_axis(axis) {
            out.push_str(&format!("  {:<4} {}\n", question.id, question.text));
        }
    }
    out
}
