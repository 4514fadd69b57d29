use log::{debug, info, warn};

use policy_matching::builder::Builder;
use policy_matching::*;
use snafu::{prelude::*, Snafu};

use std::fs;

use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::quiz::config_reader::*;

mod config_reader;
mod io_csv;
mod io_json;

#[derive(Debug, Snafu)]
pub enum QuizError {
    #[snafu(display("Error opening file {path}"))]
    OpeningFile {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the JSON content of {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error writing to {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error serializing the result"))]
    SerializingResult { source: serde_json::Error },
    #[snafu(display("Invalid dataset: {source}"))]
    InvalidDataset { source: ScoringErrors },
    #[snafu(display("Invalid priority categories: {source}"))]
    InvalidPriorities { source: ScoringErrors },
    #[snafu(display("Invalid question id {value:?}"))]
    InvalidQuestionId { value: String },
    #[snafu(display("Invalid selection for question {question}: {value}"))]
    InvalidSelection { question: String, value: JSValue },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error reading CSV line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("Invalid value {value:?} on CSV line {lineno}"))]
    CsvValue { lineno: usize, value: String },
    #[snafu(display(
        "No target candidate: use the --target option or set targetCandidate in the dataset"
    ))]
    MissingTarget {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type PmResult<T> = Result<T, QuizError>;

/// Answers, as parsed by the readers.
/// This is before checking them against the dataset.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ParsedAnswers {
    // An empty list of selections is a skipped question.
    pub selections: Vec<(QuestionId, Vec<usize>)>,
    pub selected_categories: Option<Vec<String>>,
}

fn read_answers(path: &str, answers_type: Option<&str>) -> PmResult<ParsedAnswers> {
    info!("Attempting to read answers file {:?}", path);
    match answers_type.unwrap_or("json") {
        "json" => io_json::read_json_answers(path),
        "csv" => io_csv::read_csv_answers(path),
        x => whatever!("Answers type not implemented {:?}", x),
    }
}

fn validate_rules(
    rules_config: Option<&RulesConfig>,
    tiebreak_override: Option<&str>,
) -> PmResult<ScoringRules> {
    let mut rules = ScoringRules::DEFAULT_RULES;
    let tiebreak = tiebreak_override.or_else(|| rules_config.and_then(|r| r.tiebreak_mode.as_deref()));
    if let Some(mode) = tiebreak {
        rules.tiebreak_mode = match mode {
            "useCandidateOrder" => TieBreakMode::UseCandidateOrder,
            "matchingPoints" => TieBreakMode::MatchingPoints,
            x => {
                whatever!("Cannot use tiebreak mode {:?} (currently not implemented)", x)
            }
        };
    }
    if let Some(rc) = rules_config {
        match rc.priority_weight {
            Some(0) => whatever!("priorityWeight must be at least 1"),
            Some(w) if w > ScoringRules::MAX_PRIORITY_WEIGHT => whatever!(
                "priorityWeight must be at most {}, got {}",
                ScoringRules::MAX_PRIORITY_WEIGHT,
                w
            ),
            Some(w) => rules.priority_weight = w,
            None => {}
        }
        // The file can only lower the number of priority categories.
        match rc.max_priority_categories {
            Some(max) if max > ScoringRules::MAX_PRIORITY_CATEGORIES => whatever!(
                "maxPriorityCategories must be at most {}, got {}",
                ScoringRules::MAX_PRIORITY_CATEGORIES,
                max
            ),
            Some(max) => rules.max_priority_categories = max,
            None => {}
        }
    }
    debug!("validate_rules: {:?}", rules);
    Ok(rules)
}

/// Removes the fields that change from one run to the next.
fn comparable(js: &JSValue) -> JSValue {
    let mut res = js.clone();
    if let Some(obj) = res.as_object_mut() {
        obj.remove("timestamp");
    }
    res
}

fn check_reference(reference_path: &str, result_js: &JSValue) -> PmResult<()> {
    let contents = fs::read_to_string(reference_path).context(OpeningFileSnafu {
        path: reference_path,
    })?;
    let reference: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {
        path: reference_path,
    })?;
    let expected = comparable(&reference);
    let computed = comparable(result_js);
    if expected != computed {
        warn!("Found differences with the reference result");
        let pretty_expected =
            serde_json::to_string_pretty(&expected).context(SerializingResultSnafu {})?;
        let pretty_computed =
            serde_json::to_string_pretty(&computed).context(SerializingResultSnafu {})?;
        print_diff(pretty_expected.as_str(), pretty_computed.as_str(), "\n");
        whatever!("Difference detected between the computed result and the reference result")
    }
    info!("The result matches the reference {:?}", reference_path);
    Ok(())
}

fn write_output(out: Option<&str>, contents: &str) -> PmResult<()> {
    match out {
        None | Some("stdout") => {
            println!("{}", contents);
        }
        Some("") => {
            debug!("write_output: output disabled");
        }
        Some(path) => {
            info!("Writing result to {:?}", path);
            fs::write(path, contents).context(WritingOutputSnafu { path })?;
        }
    }
    Ok(())
}

pub fn run_quiz(args: &Args) -> PmResult<()> {
    let config = read_dataset_config(&args.dataset)?;
    let dataset = config.to_dataset().context(InvalidDatasetSnafu {})?;
    info!(
        "Dataset: {} questions, {} candidates, {} categories",
        dataset.questions().len(),
        dataset.candidates().len(),
        dataset.categories().len()
    );
    let rules = validate_rules(config.rules.as_ref(), args.tiebreak.as_deref())?;

    let parsed = read_answers(&args.answers, args.answers_type.as_deref())?;
    debug!("parsed answers: {:?}", parsed);

    let target = args
        .target
        .clone()
        .or_else(|| config.target_candidate.clone())
        .context(MissingTargetSnafu {})?;

    // The priorities on the command line take precedence over the stored ones.
    let raw_priorities: Vec<String> = args
        .priorities
        .clone()
        .or_else(|| parsed.selected_categories.clone())
        .unwrap_or_default();

    let mut builder = Builder::new(&dataset, &rules)
        .priorities(raw_priorities.as_slice())
        .context(InvalidPrioritiesSnafu {})?;
    for (question_id, selections) in parsed.selections.iter() {
        builder.add_answer(*question_id, selections);
    }

    let result = builder.assemble(&target);
    info!(
        "Target {:?}: {}% alignment, {} alignments, {} divergences",
        target,
        result.target_match_percentage,
        result.policy_alignment.alignments.len(),
        result.policy_alignment.divergences.len()
    );

    let result_js = serde_json::to_value(&result).context(SerializingResultSnafu {})?;
    let pretty_js = serde_json::to_string_pretty(&result_js).context(SerializingResultSnafu {})?;
    write_output(args.out.as_deref(), &pretty_js)?;

    // The reference result, if provided for comparison
    if let Some(reference_path) = args.reference.as_deref() {
        check_reference(reference_path, &result_js)?;
    }
    Ok(())
}
