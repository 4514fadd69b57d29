pub use crate::config::*;

use log::warn;

/// A builder for recording the answers of a user.
///
/// It normalizes the answers (single selections, repeated selections) before
/// they reach the scoring functions.
///
/// ```
/// use policy_matching::builder::Builder;
/// use policy_matching::*;
///
/// let option = |text: &str, who: &str| QuizOption {
///     text: text.to_string(),
///     candidates: vec![who.to_string()],
///     explanations: vec![],
/// };
/// let candidate = |id: &str| CandidateMetadata {
///     id: id.to_string(),
///     name: id.to_string(),
///     image_url: String::new(),
///     bio: None,
///     website: None,
///     social_links: SocialLinks::default(),
/// };
/// let dataset = Dataset::new(
///     vec![Question {
///         id: 0,
///         subtopic: "Transit".to_string(),
///         prompt: "What should come first?".to_string(),
///         category: "transportation".to_string(),
///         options: vec![option("Buses", "Anna"), option("Parking", "Bob")],
///     }],
///     vec![candidate("Anna"), candidate("Bob")],
///     vec![Category {
///         id: "transportation".to_string(),
///         name: "Transportation".to_string(),
///         description: String::new(),
///         aliases: vec![],
///     }],
/// )?;
///
/// let mut builder =
///     Builder::new(&dataset, &ScoringRules::DEFAULT_RULES).priorities(&["transportation"])?;
/// builder.add_answer_simple(0, 0);
///
/// let result = builder.assemble("Anna");
/// assert_eq!(result.candidate_matches[0].candidate, "Anna");
/// assert_eq!(result.target_match_percentage, 100);
///
/// # Ok::<(), ScoringErrors>(())
/// ```
pub struct Builder<'a> {
    pub(crate) _dataset: &'a Dataset,
    pub(crate) _rules: ScoringRules,
    pub(crate) _priorities: PriorityCategories,
    pub(crate) _answers: Answers,
}

impl<'a> Builder<'a> {
    pub fn new(dataset: &'a Dataset, rules: &ScoringRules) -> Builder<'a> {
        Builder {
            _dataset: dataset,
            _rules: rules.clone(),
            _priorities: PriorityCategories::none(),
            _answers: Answers::new(),
        }
    }

    /// Sets the priority categories, given as ids, names or aliases.
    pub fn priorities<S: AsRef<str>>(self, raw: &[S]) -> Result<Builder<'a>, ScoringErrors> {
        let priorities = self._dataset.resolve_priorities(raw, &self._rules)?;
        Ok(Builder {
            _dataset: self._dataset,
            _rules: self._rules,
            _priorities: priorities,
            _answers: self._answers,
        })
    }

    /// Records a single selection for a question.
    ///
    /// This is the format of the answers recorded before multiple selections were allowed.
    pub fn add_answer_simple(&mut self, question_id: QuestionId, option_index: usize) {
        self.add_answer(question_id, &[option_index])
    }

    /// Records the selections for a question, replacing any previous ones.
    ///
    /// Selections do not need to be unique or sorted. An empty list marks the
    /// question as skipped.
    pub fn add_answer(&mut self, question_id: QuestionId, option_indices: &[usize]) {
        if self._dataset.question(question_id).is_none() {
            warn!(
                "add_answer: question {} is not in the dataset, its selections will be ignored",
                question_id
            );
        }
        if option_indices.is_empty() {
            self._answers.skip(question_id);
        } else {
            self._answers.select(question_id, option_indices);
        }
    }

    pub fn skip(&mut self, question_id: QuestionId) {
        self._answers.skip(question_id);
    }

    pub fn answers(&self) -> &Answers {
        &self._answers
    }

    pub fn priority_categories(&self) -> &PriorityCategories {
        &self._priorities
    }

    pub fn candidate_matches(&self) -> Vec<CandidateMatch> {
        crate::compute_candidate_matches(
            &self._answers,
            self._dataset,
            &self._priorities,
            &self._rules,
        )
    }

    pub fn assemble(&self, target: &str) -> QuizResult {
        crate::assemble_result(
            &self._answers,
            self._dataset,
            &self._priorities,
            &self._rules,
            target,
        )
    }
}
