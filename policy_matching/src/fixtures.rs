// Small datasets shared by the unit tests.

use chrono::{DateTime, TimeZone, Utc};

use crate::config::*;

pub const RULES: ScoringRules = ScoringRules::DEFAULT_RULES;

pub const C1: &str = "Candidate1";
pub const C2: &str = "Candidate2";
pub const C3: &str = "Candidate3";

pub const ALI: &str = "Mussab Ali";
pub const SOLOMON: &str = "James Solomon";
pub const ODEA: &str = "Bill Odea";

pub const HOUSING: &str = "housing";
pub const SAFETY: &str = "safety";

pub fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 10, 18, 30, 0).unwrap()
}

pub fn answers(entries: &[(QuestionId, &[usize])]) -> Answers {
    let mut res = Answers::new();
    for (qid, sel) in entries.iter() {
        res.select(*qid, sel);
    }
    res
}

pub fn opt(text: &str, candidates: &[&str]) -> QuizOption {
    QuizOption {
        text: text.to_string(),
        candidates: candidates.iter().map(|c| c.to_string()).collect(),
        explanations: candidates
            .iter()
            .map(|c| Explanation {
                candidate: c.to_string(),
                explanation: format!("{} supports: {}", c, text),
                remark: None,
                source: Some(format!("{}'s platform", c)),
                source_link: None,
                source_title: None,
            })
            .collect(),
    }
}

pub fn question(id: QuestionId, category: &str, options: Vec<QuizOption>) -> Question {
    Question {
        id,
        subtopic: format!("Subtopic {}", id),
        prompt: format!("Question {}?", id),
        category: category.to_string(),
        options,
    }
}

pub fn candidate(id: &str) -> CandidateMetadata {
    CandidateMetadata {
        id: id.to_string(),
        name: id.to_string(),
        image_url: format!("https://example.org/{}.png", id.replace(' ', "_")),
        bio: None,
        website: None,
        social_links: SocialLinks::default(),
    }
}

pub fn category(id: &str, name: &str, aliases: &[&str]) -> Category {
    Category {
        id: id.to_string(),
        name: name.to_string(),
        description: String::new(),
        aliases: aliases.iter().map(|a| a.to_string()).collect(),
    }
}

fn three_candidates() -> Vec<CandidateMetadata> {
    vec![candidate(C1), candidate(C2), candidate(C3)]
}

/// One question: A is supported by C1 alone, B by C1 and C2.
pub fn single_question_dataset() -> Dataset {
    Dataset::new(
        vec![question(
            0,
            "general",
            vec![opt("A", &[C1]), opt("B", &[C1, C2])],
        )],
        three_candidates(),
        vec![category("general", "General", &[])],
    )
    .unwrap()
}

/// q0 (housing): A {C1}, B {C1, C2}
/// q1 (safety): X {C1}, Y {C2}, Z {}
pub fn two_question_dataset() -> Dataset {
    Dataset::new(
        vec![
            question(0, HOUSING, vec![opt("A", &[C1]), opt("B", &[C1, C2])]),
            question(
                1,
                SAFETY,
                vec![opt("X", &[C1]), opt("Y", &[C2]), opt("Z", &[])],
            ),
        ],
        three_candidates(),
        vec![
            category(HOUSING, "Housing & Development", &["Housing"]),
            category(SAFETY, "Public Safety", &["Safety"]),
        ],
    )
    .unwrap()
}

pub fn dataset_with_unknown_supporter() -> Dataset {
    Dataset::new(
        vec![question(
            0,
            "general",
            vec![opt("A", &[C1, "Ghost"]), opt("B", &[C2])],
        )],
        three_candidates(),
        vec![category("general", "General", &[])],
    )
    .unwrap()
}

pub fn policy_dataset() -> Dataset {
    Dataset::new(
        vec![
            question(
                0,
                "transportation",
                vec![
                    opt("Protected bike lanes", &[ALI]),
                    opt("Traffic enforcement units", &[SOLOMON]),
                    opt("Repave roads and add parking", &[ODEA, SOLOMON]),
                ],
            ),
            question(
                1,
                "transportation",
                vec![
                    opt("Expand public transit", &[ALI, SOLOMON]),
                    opt("Ease car traffic", &[ODEA]),
                    opt("Pedestrian walkways", &[SOLOMON, ALI]),
                    opt("Transit-oriented development", &[ALI]),
                ],
            ),
            question(
                2,
                HOUSING,
                vec![
                    opt("Inclusionary zoning", &[SOLOMON]),
                    opt("Social housing", &[ALI]),
                    opt("Tax abatements", &[ODEA]),
                ],
            ),
            question(
                3,
                SAFETY,
                vec![
                    opt("Crisis response teams", &[ALI]),
                    opt("More officers", &[ODEA]),
                    opt("Community policing", &[ALI, ODEA]),
                    opt("Something else", &[]),
                ],
            ),
        ],
        vec![candidate(ALI), candidate(SOLOMON), candidate(ODEA)],
        vec![
            category(
                "transportation",
                "Transportation & Street Design",
                &["Street Design"],
            ),
            category(HOUSING, "Housing & Development", &["Housing"]),
            category(SAFETY, "Public Safety & Emergency Response", &["Safety"]),
        ],
    )
    .unwrap()
}
