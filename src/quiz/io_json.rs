// Answers in JSON format.

use log::debug;
use policy_matching::QuestionId;
use serde_json::Value as JSValue;
use snafu::prelude::*;
use std::fs;

use crate::quiz::*;

/// Reads the selections of one question: a list of indices, a single index,
/// or null for a skipped question.
fn read_selection(question: &str, value: &JSValue) -> PmResult<Vec<usize>> {
    let as_index = |v: &JSValue| -> PmResult<usize> {
        v.as_u64().map(|x| x as usize).context(InvalidSelectionSnafu {
            question,
            value: value.clone(),
        })
    };
    match value {
        JSValue::Null => Ok(vec![]),
        JSValue::Number(_) => Ok(vec![as_index(value)?]),
        JSValue::Array(l) => l.iter().map(as_index).collect(),
        _ => InvalidSelectionSnafu {
            question,
            value: value.clone(),
        }
        .fail(),
    }
}

fn parse_answers(js: &JSValue) -> PmResult<ParsedAnswers> {
    // Older files only store the map of the answers.
    let answers_js = js.get("answers").unwrap_or(js);
    let answers_map = match answers_js.as_object() {
        Some(m) => m,
        None => whatever!("The answers must be an object keyed by question id"),
    };

    let mut selections: Vec<(QuestionId, Vec<usize>)> = Vec::new();
    for (key, value) in answers_map.iter() {
        let question_id = key
            .trim()
            .parse::<QuestionId>()
            .ok()
            .context(InvalidQuestionIdSnafu { value: key })?;
        selections.push((question_id, read_selection(key, value)?));
    }
    selections.sort_by_key(|(qid, _)| *qid);

    let selected_categories = match js.get("selectedCategories") {
        None | Some(JSValue::Null) => None,
        Some(JSValue::Array(l)) => {
            let mut res: Vec<String> = Vec::new();
            for v in l.iter() {
                match v.as_str() {
                    Some(s) => res.push(s.to_string()),
                    None => whatever!("Invalid selected category {}", v),
                }
            }
            Some(res)
        }
        Some(x) => whatever!("selectedCategories must be a list, got {}", x),
    };

    Ok(ParsedAnswers {
        selections,
        selected_categories,
    })
}

pub fn read_json_answers(path: &str) -> PmResult<ParsedAnswers> {
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    let parsed = parse_answers(&js)?;
    debug!(
        "read_json_answers: {} answered questions in {:?}",
        parsed.selections.len(),
        path
    );
    Ok(parsed)
}
