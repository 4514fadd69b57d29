// Primitives for reading answers in CSV format.

use std::collections::BTreeMap;
use std::io::Read;

use log::debug;
use policy_matching::QuestionId;
use snafu::prelude::*;

use crate::quiz::*;

pub fn read_csv_answers(path: &str) -> PmResult<ParsedAnswers> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    parse_csv_answers(rdr)
}

fn parse_csv_answers<R: Read>(rdr: csv::Reader<R>) -> PmResult<ParsedAnswers> {
    let mut selections: BTreeMap<QuestionId, Vec<usize>> = BTreeMap::new();
    for (idx, line_r) in rdr.into_records().enumerate() {
        let lineno = idx + 1;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        debug!("parse_csv_answers: lineno: {:?} row: {:?}", lineno, line);
        let question_s = line.get(0).unwrap_or("");
        let option_s = line.get(1).unwrap_or("");

        let question_id = match question_s.parse::<QuestionId>() {
            Ok(x) => x,
            // The header is optional.
            Err(_) if lineno == 1 => {
                debug!("parse_csv_answers: skipping header {:?}", line);
                continue;
            }
            Err(_) => {
                return CsvValueSnafu {
                    lineno,
                    value: question_s,
                }
                .fail()
            }
        };

        let entry = selections.entry(question_id).or_insert_with(Vec::new);
        if !option_s.is_empty() {
            let option_index = option_s
                .parse::<usize>()
                .ok()
                .context(CsvValueSnafu {
                    lineno,
                    value: option_s,
                })?;
            entry.push(option_index);
        }
    }
    Ok(ParsedAnswers {
        selections: selections.into_iter().collect(),
        selected_categories: None,
    })
}
