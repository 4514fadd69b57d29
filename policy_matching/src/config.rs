// ********* Input data structures ***********

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::error::Error;
use std::fmt::Display;

use log::{debug, warn};
use serde::Serialize;

pub type QuestionId = u32;

/// Metadata attached to an option. It is not used by the scoring and is passed
/// through to the outputs as-is.
#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Explanation {
    pub candidate: String,
    pub explanation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remark: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_title: Option<String>,
}

/// One selectable answer to a question.
///
/// An option may be supported by no candidate at all. It can still be
/// selected, but it never gives points to anyone.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct QuizOption {
    pub text: String,
    pub candidates: Vec<String>,
    pub explanations: Vec<Explanation>,
}

impl QuizOption {
    pub fn is_supported_by(&self, candidate: &str) -> bool {
        self.candidates.iter().any(|c| c == candidate)
    }

    /// True if the given candidate is the only supporter of this option.
    pub fn is_exclusive_to(&self, candidate: &str) -> bool {
        matches!(self.candidates.as_slice(), [c] if c == candidate)
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Question {
    pub id: QuestionId,
    pub subtopic: String,
    pub prompt: String,
    /// The canonical category id. This is unrelated to the subtopic.
    pub category: String,
    pub options: Vec<QuizOption>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize)]
pub struct SocialLinks {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub twitter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facebook: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
}

impl SocialLinks {
    pub fn is_empty(&self) -> bool {
        self.twitter.is_none() && self.facebook.is_none() && self.instagram.is_none()
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CandidateMetadata {
    /// The join key used by the options.
    pub id: String,
    pub name: String,
    pub image_url: String,
    pub bio: Option<String>,
    pub website: Option<String>,
    pub social_links: SocialLinks,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Other labels that designate this category, for example the labels
    /// stored by older versions of the quiz.
    pub aliases: Vec<String>,
}

/// The questionnaire, the candidates and the categories.
///
/// A dataset is validated once when it is built and is never mutated afterwards.
/// It can be shared freely between scoring runs.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Dataset {
    questions: Vec<Question>,
    candidates: Vec<CandidateMetadata>,
    categories: Vec<Category>,
}

impl Dataset {
    pub fn new(
        questions: Vec<Question>,
        candidates: Vec<CandidateMetadata>,
        categories: Vec<Category>,
    ) -> Result<Dataset, ScoringErrors> {
        let mut candidate_ids: HashSet<String> = HashSet::new();
        for c in candidates.iter() {
            if !candidate_ids.insert(c.id.clone()) {
                return Err(ScoringErrors::DuplicateCandidate(c.id.clone()));
            }
        }

        // Every label (id, name or alias) must point to a single category.
        let mut category_labels: HashSet<String> = HashSet::new();
        for cat in categories.iter() {
            let mut own_labels: HashSet<String> = HashSet::new();
            own_labels.insert(normalize_label(&cat.id));
            own_labels.insert(normalize_label(&cat.name));
            for alias in cat.aliases.iter() {
                own_labels.insert(normalize_label(alias));
            }
            for label in own_labels {
                if !category_labels.insert(label) {
                    return Err(ScoringErrors::DuplicateCategory(cat.id.clone()));
                }
            }
        }
        let category_ids: HashSet<&str> = categories.iter().map(|c| c.id.as_str()).collect();

        let mut checked_questions: Vec<Question> = Vec::with_capacity(questions.len());
        for (idx, mut q) in questions.into_iter().enumerate() {
            if q.id as usize != idx {
                return Err(ScoringErrors::NonDenseQuestionIds {
                    expected: idx as QuestionId,
                    found: q.id,
                });
            }
            if !category_ids.contains(q.category.as_str()) {
                return Err(ScoringErrors::UnknownCategory(q.category));
            }
            for (opt_idx, opt) in q.options.iter_mut().enumerate() {
                let mut seen: HashSet<String> = HashSet::new();
                opt.candidates.retain(|c| seen.insert(c.clone()));
                for c in opt.candidates.iter() {
                    if !candidate_ids.contains(c) {
                        warn!(
                            "Dataset::new: question {} option {} references unknown candidate {:?}",
                            q.id, opt_idx, c
                        );
                    }
                }
            }
            checked_questions.push(q);
        }

        debug!(
            "Dataset::new: {} questions, {} candidates, {} categories",
            checked_questions.len(),
            candidates.len(),
            categories.len()
        );
        Ok(Dataset {
            questions: checked_questions,
            candidates,
            categories,
        })
    }

    /// The questions, in display order.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// The candidates, in declaration order.
    pub fn candidates(&self) -> &[CandidateMetadata] {
        &self.candidates
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn question(&self, id: QuestionId) -> Option<&Question> {
        self.questions.get(id as usize)
    }

    pub fn candidate(&self, id: &str) -> Option<&CandidateMetadata> {
        self.candidates.iter().find(|c| c.id == id)
    }

    /// The questions that belong to a category, in question order.
    pub fn category_question_ids(&self, category: &str) -> Vec<QuestionId> {
        self.questions
            .iter()
            .filter(|q| q.category == category)
            .map(|q| q.id)
            .collect()
    }

    /// Finds the category designated by a raw label.
    ///
    /// The label may be the canonical id, the display name or one of the aliases.
    /// The comparison ignores case and surrounding whitespace.
    pub fn resolve_category(&self, raw: &str) -> Option<&Category> {
        let label = normalize_label(raw);
        self.categories.iter().find(|cat| {
            normalize_label(&cat.id) == label
                || normalize_label(&cat.name) == label
                || cat.aliases.iter().any(|a| normalize_label(a) == label)
        })
    }

    /// Turns the raw labels picked by a user into a set of priority categories.
    ///
    /// Repeated labels (or different labels for the same category) are counted once.
    pub fn resolve_priorities<S: AsRef<str>>(
        &self,
        raw: &[S],
        rules: &ScoringRules,
    ) -> Result<PriorityCategories, ScoringErrors> {
        let mut ids: Vec<String> = Vec::new();
        for r in raw.iter() {
            let cat = self
                .resolve_category(r.as_ref())
                .ok_or_else(|| ScoringErrors::UnknownCategory(r.as_ref().to_string()))?;
            if !ids.contains(&cat.id) {
                ids.push(cat.id.clone());
            }
        }
        let max = rules
            .max_priority_categories
            .min(ScoringRules::MAX_PRIORITY_CATEGORIES);
        if ids.len() > max {
            return Err(ScoringErrors::TooManyPriorityCategories {
                given: ids.len(),
                max,
            });
        }
        Ok(PriorityCategories { ids })
    }
}

fn normalize_label(s: &str) -> String {
    s.trim().to_lowercase()
}

/// The categories that a user marked as most important.
///
/// Only built through [Dataset::resolve_priorities], so every entry is a
/// canonical category id.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct PriorityCategories {
    ids: Vec<String>,
}

impl PriorityCategories {
    /// No weighting at all.
    pub fn none() -> PriorityCategories {
        PriorityCategories { ids: Vec::new() }
    }

    pub fn contains(&self, category: &str) -> bool {
        self.ids.iter().any(|id| id == category)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The canonical ids, in the order they were selected.
    pub fn ids(&self) -> &[String] {
        &self.ids
    }
}

/// The selections of a user.
///
/// For each question, the indices of the selected options, sorted and without
/// duplicates. A missing entry or an empty list means that the question was skipped.
///
/// It is simpler to build it with the [crate::builder::Builder].
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Answers(BTreeMap<QuestionId, Vec<usize>>);

impl Answers {
    pub fn new() -> Answers {
        Answers(BTreeMap::new())
    }

    /// Replaces the selections for one question.
    pub fn select(&mut self, question_id: QuestionId, option_indices: &[usize]) {
        let indices: BTreeSet<usize> = option_indices.iter().cloned().collect();
        self.0.insert(question_id, indices.into_iter().collect());
    }

    pub fn skip(&mut self, question_id: QuestionId) {
        self.0.remove(&question_id);
    }

    /// The raw selections for a question. It may contain indices that are not
    /// valid for the current version of the questionnaire.
    pub fn selections(&self, question_id: QuestionId) -> &[usize] {
        self.0.get(&question_id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&QuestionId, &Vec<usize>)> {
        self.0.iter()
    }
}

// ******** Output data structures *********

#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateMatch {
    pub candidate: String,
    pub name: String,
    pub image_url: String,
    /// Integer between 0 and 100.
    pub match_percentage: u32,
    pub matching_points: u64,
    /// Informational only, it does not enter the percentage.
    pub total_possible_points: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "SocialLinks::is_empty")]
    pub social_links: SocialLinks,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionRef {
    pub option_index: usize,
    pub text: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetOption {
    pub option_index: usize,
    pub text: String,
    pub explanations: Vec<Explanation>,
}

/// A question on which the user picked at least one option of the target candidate.
#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyAlignment {
    pub question_id: QuestionId,
    pub question_text: String,
    pub subtopic: String,
    pub user_target_selections: Vec<OptionRef>,
    /// The options of the target candidate that the user did not pick.
    pub other_target_options: Vec<TargetOption>,
}

/// A question the user answered without picking any option of the target candidate.
#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyDivergence {
    pub question_id: QuestionId,
    pub question_text: String,
    pub subtopic: String,
    pub user_selections: Vec<OptionRef>,
    pub target_options: Vec<TargetOption>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize)]
pub struct AlignmentBreakdown {
    pub alignments: Vec<PolicyAlignment>,
    pub divergences: Vec<PolicyDivergence>,
}

/// Progress of the user through one category.
#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
pub struct CategoryProgress {
    pub category: String,
    pub name: String,
    pub answered: usize,
    pub total: usize,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub candidate_matches: Vec<CandidateMatch>,
    pub total_questions: usize,
    pub answered_questions: usize,
    pub completion_percentage: u32,
    pub target_candidate: String,
    pub target_match_percentage: u32,
    pub policy_alignment: AlignmentBreakdown,
    pub category_progress: Vec<CategoryProgress>,
    /// ISO-8601, UTC.
    pub timestamp: String,
    pub answers: Answers,
    pub selected_categories: Vec<String>,
}

/// Errors raised when the dataset or the user inputs break the contract of the engine.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum ScoringErrors {
    /// Question ids must be 0, 1, 2... in the order of the questions.
    NonDenseQuestionIds {
        expected: QuestionId,
        found: QuestionId,
    },
    DuplicateCandidate(String),
    /// Two categories share an id, a name or an alias.
    DuplicateCategory(String),
    UnknownCategory(String),
    TooManyPriorityCategories {
        given: usize,
        max: usize,
    },
}

impl Error for ScoringErrors {}

impl Display for ScoringErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoringErrors::NonDenseQuestionIds { expected, found } => write!(
                f,
                "question ids must be dense from 0: expected {}, found {}",
                expected, found
            ),
            ScoringErrors::DuplicateCandidate(id) => write!(f, "duplicate candidate {:?}", id),
            ScoringErrors::DuplicateCategory(id) => {
                write!(f, "category {:?} reuses a label of another category", id)
            }
            ScoringErrors::UnknownCategory(label) => write!(f, "unknown category {:?}", label),
            ScoringErrors::TooManyPriorityCategories { given, max } => write!(
                f,
                "{} priority categories selected, at most {} are allowed",
                given, max
            ),
        }
    }
}

// ********* Configuration **********

/// How to order candidates that have the same match percentage.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum TieBreakMode {
    /// Keep the order in which the candidates are declared in the dataset.
    UseCandidateOrder,
    /// More matching points first, then the declaration order.
    MatchingPoints,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ScoringRules {
    pub tiebreak_mode: TieBreakMode,
    /// The weight of a question that belongs to a priority category.
    /// Other questions have a weight of 1.
    pub priority_weight: u64,
    pub max_priority_categories: usize,
}

impl ScoringRules {
    pub const DEFAULT_RULES: ScoringRules = ScoringRules {
        tiebreak_mode: TieBreakMode::UseCandidateOrder,
        priority_weight: 2,
        max_priority_categories: 3,
    };

    /// Upper bound accepted for `priority_weight` when rules are read from a file.
    pub const MAX_PRIORITY_WEIGHT: u64 = 1000;

    /// A user never selects more than this number of priority categories.
    pub const MAX_PRIORITY_CATEGORIES: usize = 3;
}

impl Default for ScoringRules {
    fn default() -> Self {
        ScoringRules::DEFAULT_RULES
    }
}
