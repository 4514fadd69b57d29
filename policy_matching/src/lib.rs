/*!
Scoring engine for candidate matching questionnaires.

A user answers a fixed questionnaire in which every option is tagged with the
candidates who hold that position. This crate turns those answers into:
- a ranked list of candidates with their share of the points ([compute_candidate_matches])
- the alignment percentage with one target candidate ([compute_target_alignment])
- the questions on which the user agrees or disagrees with the target candidate
  ([compute_alignment_breakdown])

Everything is packaged into a [QuizResult] by [assemble_result].

All the functions are pure: the [Dataset] is never mutated and can be shared
between threads without locking.

See the [manual] for the file formats and the scoring rules.
*/

mod config;
pub mod builder;
pub mod manual;

#[cfg(test)]
mod fixtures;

use chrono::{DateTime, SecondsFormat, Utc};
use log::{debug, info, warn};

use std::{
    collections::HashMap,
    ops::{Add, AddAssign},
};

pub use crate::config::*;

// **** Private structures ****

// Position of a candidate in the declaration order of the dataset.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
struct CandidateIdx(usize);

#[derive(Eq, PartialEq, Debug, Clone, Copy, PartialOrd, Ord, Hash)]
struct Points(u64);

impl Points {
    const EMPTY: Points = Points(0);
}

impl std::iter::Sum for Points {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Points(iter.map(|p| p.0).sum())
    }
}

impl AddAssign for Points {
    fn add_assign(&mut self, rhs: Points) {
        self.0 += rhs.0;
    }
}

impl Add for Points {
    type Output = Points;
    fn add(self: Points, rhs: Points) -> Points {
        Points(self.0 + rhs.0)
    }
}

/// Running totals for all the candidates, indexed by CandidateIdx.
#[derive(Eq, PartialEq, Debug, Clone)]
struct Tally {
    earned: Vec<Points>,
    possible: Vec<Points>,
}

impl Tally {
    fn empty(num_candidates: usize) -> Tally {
        Tally {
            earned: vec![Points::EMPTY; num_candidates],
            possible: vec![Points::EMPTY; num_candidates],
        }
    }

    /// Returns the tally after accounting for one question.
    ///
    /// Every option of the question counts towards the possible points of its
    /// supporters, selected or not. Only the selected options give points.
    fn with_question(
        mut self,
        question: &Question,
        selected: &[usize],
        weight: Points,
        index: &HashMap<&str, CandidateIdx>,
    ) -> Tally {
        for opt in question.options.iter() {
            for cid in supporters(opt, index) {
                self.possible[cid.0] += weight;
            }
        }
        for &opt_idx in selected.iter() {
            for cid in supporters(&question.options[opt_idx], index) {
                self.earned[cid.0] += weight;
            }
        }
        self
    }

    fn total_earned(&self) -> Points {
        self.earned.iter().cloned().sum()
    }
}

/// The credit that one question gives to the target candidate.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
enum Credit {
    Zero,
    Partial,
    Full,
}

impl Credit {
    // Expressed in half credits to keep the arithmetic exact.
    fn half_units(self) -> u64 {
        match self {
            Credit::Zero => 0,
            Credit::Partial => 1,
            Credit::Full => 2,
        }
    }
}

fn candidate_index(dataset: &Dataset) -> HashMap<&str, CandidateIdx> {
    dataset
        .candidates()
        .iter()
        .enumerate()
        .map(|(idx, c)| (c.id.as_str(), CandidateIdx(idx)))
        .collect()
}

// Candidates that are not declared in the dataset are skipped.
fn supporters<'a>(
    option: &'a QuizOption,
    index: &'a HashMap<&'a str, CandidateIdx>,
) -> impl Iterator<Item = CandidateIdx> + 'a {
    option
        .candidates
        .iter()
        .filter_map(move |c| index.get(c.as_str()).cloned())
}

/// The selected options of a question that are valid for this dataset.
///
/// Indices beyond the list of options (for example recorded with an older
/// version of the questionnaire) are dropped.
fn selected_options(question: &Question, answers: &Answers) -> Vec<usize> {
    let raw = answers.selections(question.id);
    let valid: Vec<usize> = raw
        .iter()
        .cloned()
        .filter(|idx| *idx < question.options.len())
        .collect();
    if valid.len() != raw.len() {
        debug!(
            "selected_options: question {}: dropping stale selections {:?}",
            question.id,
            raw.iter()
                .filter(|idx| **idx >= question.options.len())
                .collect::<Vec<_>>()
        );
    }
    valid
}

fn target_option_indices(question: &Question, target: &str) -> Vec<usize> {
    question
        .options
        .iter()
        .enumerate()
        .filter_map(|(idx, opt)| {
            if opt.is_supported_by(target) {
                Some(idx)
            } else {
                None
            }
        })
        .collect()
}

fn question_weight(
    question: &Question,
    priorities: &PriorityCategories,
    rules: &ScoringRules,
) -> Points {
    if priorities.contains(&question.category) {
        Points(rules.priority_weight)
    } else {
        Points(1)
    }
}

/// round(part / whole * 100), with ties rounded up. Returns 0 when whole is 0.
fn percentage(part: u64, whole: u64) -> u32 {
    if whole == 0 {
        return 0;
    }
    // Widened so that large point totals cannot overflow.
    let (part, whole) = (part as u128, whole as u128);
    ((200 * part + whole) / (2 * whole)) as u32
}

fn sort_matches(matches: &mut [CandidateMatch], tiebreak: TieBreakMode) {
    // The sort is stable: equal elements keep the declaration order.
    match tiebreak {
        TieBreakMode::UseCandidateOrder => {
            matches.sort_by(|a, b| b.match_percentage.cmp(&a.match_percentage));
        }
        TieBreakMode::MatchingPoints => {
            matches.sort_by(|a, b| {
                b.match_percentage
                    .cmp(&a.match_percentage)
                    .then(b.matching_points.cmp(&a.matching_points))
            });
        }
    }
}

/// Number of questions with at least one valid selection.
pub fn count_answered_questions(answers: &Answers, dataset: &Dataset) -> usize {
    dataset
        .questions()
        .iter()
        .filter(|q| !selected_options(q, answers).is_empty())
        .count()
}

/// Computes the share of points of every candidate.
///
/// Every selected option gives the weight of its question to each of its
/// supporters. The weight is `rules.priority_weight` for the questions in a
/// priority category, 1 otherwise. The percentage of a candidate is its share
/// of all the points given to all the candidates.
///
/// All the candidates of the dataset are returned, sorted by decreasing
/// percentage. Ties are resolved following `rules.tiebreak_mode`.
pub fn compute_candidate_matches(
    answers: &Answers,
    dataset: &Dataset,
    priorities: &PriorityCategories,
    rules: &ScoringRules,
) -> Vec<CandidateMatch> {
    let index = candidate_index(dataset);
    let tally = dataset
        .questions()
        .iter()
        .fold(Tally::empty(dataset.candidates().len()), |tally, q| {
            let weight = question_weight(q, priorities, rules);
            let selected = selected_options(q, answers);
            tally.with_question(q, &selected, weight, &index)
        });

    let total = tally.total_earned();
    debug!(
        "compute_candidate_matches: total points: {:?} tally: {:?}",
        total, tally
    );

    let mut matches: Vec<CandidateMatch> = dataset
        .candidates()
        .iter()
        .enumerate()
        .map(|(idx, c)| CandidateMatch {
            candidate: c.id.clone(),
            name: c.name.clone(),
            image_url: c.image_url.clone(),
            match_percentage: percentage(tally.earned[idx].0, total.0),
            matching_points: tally.earned[idx].0,
            total_possible_points: tally.possible[idx].0,
            bio: c.bio.clone(),
            website: c.website.clone(),
            social_links: c.social_links.clone(),
        })
        .collect();
    sort_matches(&mut matches, rules.tiebreak_mode);
    matches
}

fn question_credit(
    question: &Question,
    selected: &[usize],
    priorities: &PriorityCategories,
    target: &str,
) -> Credit {
    let target_selections: Vec<&QuizOption> = selected
        .iter()
        .map(|idx| &question.options[*idx])
        .filter(|opt| opt.is_supported_by(target))
        .collect();
    if target_selections.is_empty() {
        // Skipped, no position of the target, or only other positions picked.
        Credit::Zero
    } else if target_selections
        .iter()
        .all(|opt| opt.is_exclusive_to(target))
    {
        Credit::Full
    } else if priorities.contains(&question.category) {
        Credit::Full
    } else {
        Credit::Partial
    }
}

/// Computes how closely the answers follow one candidate, between 0 and 100.
///
/// Each question is worth `100 / N` points for N questions in the dataset:
/// - full credit if all the selected options of the target are supported by
///   the target alone
/// - half credit if one of them is shared with other candidates, or full
///   credit if the question belongs to a priority category
/// - nothing otherwise.
///
/// An empty dataset gives 0.
pub fn compute_target_alignment(
    answers: &Answers,
    dataset: &Dataset,
    priorities: &PriorityCategories,
    target: &str,
) -> u32 {
    let num_questions = dataset.questions().len() as u64;
    let half_units: u64 = dataset
        .questions()
        .iter()
        .map(|q| {
            let credit = question_credit(q, &selected_options(q, answers), priorities, target);
            debug!(
                "compute_target_alignment: question {}: {:?}",
                q.id, credit
            );
            credit.half_units()
        })
        .sum();
    percentage(half_units, 2 * num_questions)
}

fn option_ref(question: &Question, idx: usize) -> OptionRef {
    OptionRef {
        option_index: idx,
        text: question.options[idx].text.clone(),
    }
}

fn target_option(question: &Question, idx: usize) -> TargetOption {
    let opt = &question.options[idx];
    TargetOption {
        option_index: idx,
        text: opt.text.clone(),
        explanations: opt.explanations.clone(),
    }
}

/// Splits the answered questions into alignments and divergences with the target.
///
/// Only questions on which the target candidate supports at least one option
/// are considered. Both lists follow the order of the questions.
pub fn compute_alignment_breakdown(
    answers: &Answers,
    dataset: &Dataset,
    target: &str,
) -> AlignmentBreakdown {
    let mut breakdown = AlignmentBreakdown::default();
    for q in dataset.questions().iter() {
        let selected = selected_options(q, answers);
        if selected.is_empty() {
            continue;
        }
        let target_options = target_option_indices(q, target);
        if target_options.is_empty() {
            continue;
        }
        let (picked, not_picked): (Vec<usize>, Vec<usize>) = target_options
            .iter()
            .cloned()
            .partition(|idx| selected.contains(idx));
        if picked.is_empty() {
            breakdown.divergences.push(PolicyDivergence {
                question_id: q.id,
                question_text: q.prompt.clone(),
                subtopic: q.subtopic.clone(),
                user_selections: selected.iter().map(|idx| option_ref(q, *idx)).collect(),
                target_options: target_options
                    .iter()
                    .map(|idx| target_option(q, *idx))
                    .collect(),
            });
        } else {
            breakdown.alignments.push(PolicyAlignment {
                question_id: q.id,
                question_text: q.prompt.clone(),
                subtopic: q.subtopic.clone(),
                user_target_selections: picked.iter().map(|idx| option_ref(q, *idx)).collect(),
                other_target_options: not_picked
                    .iter()
                    .map(|idx| target_option(q, *idx))
                    .collect(),
            });
        }
    }
    debug!(
        "compute_alignment_breakdown: target {:?}: {} alignments, {} divergences",
        target,
        breakdown.alignments.len(),
        breakdown.divergences.len()
    );
    breakdown
}

/// For each category, in declaration order, how many of its questions were answered.
pub fn compute_category_progress(answers: &Answers, dataset: &Dataset) -> Vec<CategoryProgress> {
    dataset
        .categories()
        .iter()
        .map(|cat| {
            let questions: Vec<&Question> = dataset
                .questions()
                .iter()
                .filter(|q| q.category == cat.id)
                .collect();
            let answered = questions
                .iter()
                .filter(|q| !selected_options(q, answers).is_empty())
                .count();
            CategoryProgress {
                category: cat.id.clone(),
                name: cat.name.clone(),
                answered,
                total: questions.len(),
            }
        })
        .collect()
}

/// Runs all the computations and packages them into a result, stamped with the current time.
pub fn assemble_result(
    answers: &Answers,
    dataset: &Dataset,
    priorities: &PriorityCategories,
    rules: &ScoringRules,
    target: &str,
) -> QuizResult {
    assemble_result_at(answers, dataset, priorities, rules, target, Utc::now())
}

/// Same as [assemble_result] with an explicit timestamp.
pub fn assemble_result_at(
    answers: &Answers,
    dataset: &Dataset,
    priorities: &PriorityCategories,
    rules: &ScoringRules,
    target: &str,
    timestamp: DateTime<Utc>,
) -> QuizResult {
    let total_questions = dataset.questions().len();
    let answered_questions = count_answered_questions(answers, dataset);
    info!(
        "assemble_result: {} of {} questions answered, priorities: {:?}, target: {:?}",
        answered_questions,
        total_questions,
        priorities.ids(),
        target
    );
    if dataset.candidate(target).is_none() {
        warn!(
            "assemble_result: target candidate {:?} is not declared in the dataset",
            target
        );
    }

    let candidate_matches = compute_candidate_matches(answers, dataset, priorities, rules);
    for (rank, m) in candidate_matches.iter().enumerate() {
        info!(
            "{}. {} {}% ({} points)",
            rank + 1,
            m.name,
            m.match_percentage,
            m.matching_points
        );
    }

    QuizResult {
        candidate_matches,
        total_questions,
        answered_questions,
        completion_percentage: percentage(answered_questions as u64, total_questions as u64),
        target_candidate: target.to_string(),
        target_match_percentage: compute_target_alignment(answers, dataset, priorities, target),
        policy_alignment: compute_alignment_breakdown(answers, dataset, target),
        category_progress: compute_category_progress(answers, dataset),
        timestamp: timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
        answers: answers.clone(),
        selected_categories: priorities.ids().to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn match_of<'a>(matches: &'a [CandidateMatch], id: &str) -> &'a CandidateMatch {
        matches.iter().find(|m| m.candidate == id).unwrap()
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage(1, 8), 13);
        assert_eq!(percentage(1, 200), 1);
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(5, 5), 100);
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(u64::MAX / 2, u64::MAX), 50);
        assert_eq!(percentage(u64::MAX, u64::MAX), 100);
    }

    #[test]
    fn exclusive_selection() {
        init();
        let ds = single_question_dataset();
        let ans = answers(&[(0, &[0])]);
        let matches = compute_candidate_matches(&ans, &ds, &PriorityCategories::none(), &RULES);
        assert_eq!(matches[0].candidate, C1);
        assert_eq!(matches[0].match_percentage, 100);
        assert_eq!(matches[1].candidate, C2);
        assert_eq!(matches[1].match_percentage, 0);
        assert_eq!(
            compute_target_alignment(&ans, &ds, &PriorityCategories::none(), C1),
            100
        );

        let breakdown = compute_alignment_breakdown(&ans, &ds, C1);
        assert!(breakdown.divergences.is_empty());
        assert_eq!(breakdown.alignments.len(), 1);
        let alignment = &breakdown.alignments[0];
        assert_eq!(
            alignment.user_target_selections,
            vec![OptionRef {
                option_index: 0,
                text: "A".to_string()
            }]
        );
        // The shared option is also a position of the target.
        let others: Vec<usize> = alignment
            .other_target_options
            .iter()
            .map(|o| o.option_index)
            .collect();
        assert_eq!(others, vec![1]);
    }

    #[test]
    fn shared_selection() {
        init();
        let ds = single_question_dataset();
        let ans = answers(&[(0, &[1])]);
        let matches = compute_candidate_matches(&ans, &ds, &PriorityCategories::none(), &RULES);
        assert_eq!(match_of(&matches, C1).match_percentage, 50);
        assert_eq!(match_of(&matches, C2).match_percentage, 50);
        assert_eq!(match_of(&matches, C1).matching_points, 1);
        assert_eq!(match_of(&matches, C2).matching_points, 1);
        assert_eq!(
            compute_target_alignment(&ans, &ds, &PriorityCategories::none(), C1),
            50
        );
    }

    #[test]
    fn possible_points_count_every_option() {
        let ds = single_question_dataset();
        let matches =
            compute_candidate_matches(&Answers::new(), &ds, &PriorityCategories::none(), &RULES);
        assert_eq!(match_of(&matches, C1).total_possible_points, 2);
        assert_eq!(match_of(&matches, C2).total_possible_points, 1);
        assert_eq!(match_of(&matches, C3).total_possible_points, 0);
        assert!(matches.iter().all(|m| m.match_percentage == 0));
    }

    #[test]
    fn shared_selection_with_skipped_question() {
        let ds = two_question_dataset();
        let ans = answers(&[(0, &[1])]);
        assert_eq!(
            compute_target_alignment(&ans, &ds, &PriorityCategories::none(), C1),
            25
        );
    }

    #[test]
    fn priority_upgrades_shared_selection() {
        let ds = two_question_dataset();
        let ans = answers(&[(0, &[1])]);
        let prio = ds.resolve_priorities(&[HOUSING], &RULES).unwrap();
        assert_eq!(compute_target_alignment(&ans, &ds, &prio, C1), 50);
        // Not the category of the answered question: no change.
        let prio = ds.resolve_priorities(&[SAFETY], &RULES).unwrap();
        assert_eq!(compute_target_alignment(&ans, &ds, &prio, C1), 25);
    }

    #[test]
    fn priority_doubles_weight() {
        let ds = two_question_dataset();
        // q0: C1 alone, q1: C2 alone
        let ans = answers(&[(0, &[0]), (1, &[1])]);
        let matches = compute_candidate_matches(&ans, &ds, &PriorityCategories::none(), &RULES);
        assert_eq!(match_of(&matches, C1).match_percentage, 50);
        assert_eq!(match_of(&matches, C2).match_percentage, 50);

        let prio = ds.resolve_priorities(&["Housing & Development"], &RULES).unwrap();
        let matches = compute_candidate_matches(&ans, &ds, &prio, &RULES);
        assert_eq!(matches[0].candidate, C1);
        assert_eq!(matches[0].match_percentage, 67);
        assert_eq!(matches[0].matching_points, 2);
        assert_eq!(matches[1].candidate, C2);
        assert_eq!(matches[1].match_percentage, 33);
    }

    #[test]
    fn unsupported_option() {
        let ds = two_question_dataset();
        // q1 option 2 has no supporter, and C1 has a position on q1.
        let ans = answers(&[(1, &[2])]);
        let matches = compute_candidate_matches(&ans, &ds, &PriorityCategories::none(), &RULES);
        assert!(matches.iter().all(|m| m.matching_points == 0));
        assert!(matches.iter().all(|m| m.match_percentage == 0));
        assert_eq!(count_answered_questions(&ans, &ds), 1);

        let breakdown = compute_alignment_breakdown(&ans, &ds, C1);
        assert!(breakdown.alignments.is_empty());
        assert_eq!(breakdown.divergences.len(), 1);
        assert_eq!(breakdown.divergences[0].question_id, 1);
        assert_eq!(breakdown.divergences[0].user_selections[0].option_index, 2);

        // C3 has no position on q1: nothing to report.
        let breakdown = compute_alignment_breakdown(&ans, &ds, C3);
        assert!(breakdown.alignments.is_empty());
        assert!(breakdown.divergences.is_empty());
    }

    #[test]
    fn stale_indices_are_ignored() {
        let ds = single_question_dataset();
        let ans = answers(&[(0, &[0, 7])]);
        let matches = compute_candidate_matches(&ans, &ds, &PriorityCategories::none(), &RULES);
        assert_eq!(match_of(&matches, C1).matching_points, 1);

        // Only stale selections: the question counts as skipped.
        let ans = answers(&[(0, &[9])]);
        assert_eq!(count_answered_questions(&ans, &ds), 0);
        let res = assemble_result_at(
            &ans,
            &ds,
            &PriorityCategories::none(),
            &RULES,
            C1,
            fixed_time(),
        );
        assert_eq!(res.completion_percentage, 0);
        assert!(res.policy_alignment.alignments.is_empty());
        assert!(res.policy_alignment.divergences.is_empty());
    }

    #[test]
    fn unknown_candidate_in_option() {
        init();
        let ds = dataset_with_unknown_supporter();
        let ans = answers(&[(0, &[0])]);
        let matches = compute_candidate_matches(&ans, &ds, &PriorityCategories::none(), &RULES);
        assert_eq!(matches.len(), 3);
        assert_eq!(match_of(&matches, C1).match_percentage, 100);
    }

    #[test]
    fn empty_dataset() {
        let ds = Dataset::new(vec![], vec![], vec![]).unwrap();
        let res = assemble_result_at(
            &answers(&[(0, &[1])]),
            &ds,
            &PriorityCategories::none(),
            &RULES,
            C1,
            fixed_time(),
        );
        assert!(res.candidate_matches.is_empty());
        assert_eq!(res.total_questions, 0);
        assert_eq!(res.answered_questions, 0);
        assert_eq!(res.completion_percentage, 0);
        assert_eq!(res.target_match_percentage, 0);
    }

    #[test]
    fn points_are_conserved() {
        let ds = policy_dataset();
        let ans = answers(&[(0, &[0, 2]), (1, &[1]), (2, &[0, 1, 2]), (3, &[3])]);
        let prio = ds.resolve_priorities(&["transportation"], &RULES).unwrap();
        let index = candidate_index(&ds);
        let tally = ds
            .questions()
            .iter()
            .fold(Tally::empty(ds.candidates().len()), |tally, q| {
                tally.with_question(
                    q,
                    &selected_options(q, &ans),
                    question_weight(q, &prio, &RULES),
                    &index,
                )
            });
        let matches = compute_candidate_matches(&ans, &ds, &prio, &RULES);
        let sum: u64 = matches.iter().map(|m| m.matching_points).sum();
        assert_eq!(Points(sum), tally.total_earned());
        assert!(matches.iter().all(|m| m.match_percentage <= 100));
    }

    #[test]
    fn skipping_never_adds_points() {
        let ds = policy_dataset();
        let full = answers(&[(0, &[0]), (1, &[1]), (2, &[2]), (3, &[0])]);
        let before = compute_candidate_matches(&full, &ds, &PriorityCategories::none(), &RULES);
        let mut skipped = full.clone();
        skipped.skip(2);
        let after = compute_candidate_matches(&skipped, &ds, &PriorityCategories::none(), &RULES);
        for m in after.iter() {
            assert!(m.matching_points <= match_of(&before, &m.candidate).matching_points);
        }
        assert!(count_answered_questions(&skipped, &ds) < count_answered_questions(&full, &ds));
    }

    #[test]
    fn exclusive_answers_reach_100() {
        let ds = policy_dataset();
        // The options supported by Ali alone.
        let ans = answers(&[(0, &[0]), (1, &[3]), (2, &[1]), (3, &[0])]);
        assert_eq!(
            compute_target_alignment(&ans, &ds, &PriorityCategories::none(), ALI),
            100
        );
    }

    #[test]
    fn priorities_never_lower_alignment() {
        let ds = policy_dataset();
        let ans = answers(&[(0, &[0, 2]), (1, &[0]), (2, &[1]), (3, &[2])]);
        let base = compute_target_alignment(&ans, &ds, &PriorityCategories::none(), ALI);
        for cat in ds.categories().iter() {
            let prio = ds.resolve_priorities(&[cat.id.as_str()], &RULES).unwrap();
            assert!(compute_target_alignment(&ans, &ds, &prio, ALI) >= base);
        }
        let all: Vec<&str> = ds.categories().iter().map(|c| c.id.as_str()).collect();
        let prio = ds.resolve_priorities(&all, &RULES).unwrap();
        assert!(compute_target_alignment(&ans, &ds, &prio, ALI) >= base);
    }

    #[test]
    fn alignments_and_divergences_partition_questions() {
        let ds = policy_dataset();
        let ans = answers(&[(0, &[1]), (1, &[0]), (2, &[2]), (3, &[1, 3])]);
        for c in ds.candidates().iter() {
            let breakdown = compute_alignment_breakdown(&ans, &ds, &c.id);
            for q in ds.questions().iter() {
                let in_alignments = breakdown
                    .alignments
                    .iter()
                    .filter(|a| a.question_id == q.id)
                    .count();
                let in_divergences = breakdown
                    .divergences
                    .iter()
                    .filter(|d| d.question_id == q.id)
                    .count();
                let has_target = q.options.iter().any(|o| o.is_supported_by(&c.id));
                let answered = !ans.selections(q.id).is_empty();
                let expected = if has_target && answered { 1 } else { 0 };
                assert_eq!(in_alignments + in_divergences, expected);
            }
            // Question order is preserved.
            let ids: Vec<QuestionId> = breakdown.alignments.iter().map(|a| a.question_id).collect();
            let mut sorted = ids.clone();
            sorted.sort();
            assert_eq!(ids, sorted);
        }
    }

    #[test]
    fn ties_keep_declaration_order() {
        let ds = policy_dataset();
        let matches =
            compute_candidate_matches(&Answers::new(), &ds, &PriorityCategories::none(), &RULES);
        let ids: Vec<&str> = matches.iter().map(|m| m.candidate.as_str()).collect();
        let declared: Vec<&str> = ds.candidates().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, declared);
    }

    #[test]
    fn tiebreak_on_matching_points() {
        let mk = |id: &str, pct: u32, pts: u64| CandidateMatch {
            candidate: id.to_string(),
            name: id.to_string(),
            image_url: String::new(),
            match_percentage: pct,
            matching_points: pts,
            total_possible_points: 0,
            bio: None,
            website: None,
            social_links: SocialLinks::default(),
        };
        let initial = vec![mk("a", 0, 1), mk("b", 0, 2), mk("c", 10, 3), mk("d", 0, 2)];

        let mut by_order = initial.clone();
        sort_matches(&mut by_order, TieBreakMode::UseCandidateOrder);
        let ids: Vec<&str> = by_order.iter().map(|m| m.candidate.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b", "d"]);

        let mut by_points = initial;
        sort_matches(&mut by_points, TieBreakMode::MatchingPoints);
        let ids: Vec<&str> = by_points.iter().map(|m| m.candidate.as_str()).collect();
        assert_eq!(ids, vec!["c", "b", "d", "a"]);
    }

    #[test]
    fn category_progress() {
        let ds = policy_dataset();
        let ans = answers(&[(0, &[0]), (2, &[1])]);
        let progress = compute_category_progress(&ans, &ds);
        let summary: Vec<(&str, usize, usize)> = progress
            .iter()
            .map(|p| (p.category.as_str(), p.answered, p.total))
            .collect();
        assert_eq!(
            summary,
            vec![("transportation", 1, 2), ("housing", 1, 1), ("safety", 0, 1)]
        );
    }

    #[test]
    fn assembled_result() {
        init();
        let ds = policy_dataset();
        let ans = answers(&[(0, &[0]), (1, &[1]), (3, &[1])]);
        let prio = ds.resolve_priorities(&["Transportation"], &RULES).unwrap();
        let res = assemble_result_at(&ans, &ds, &prio, &RULES, ALI, fixed_time());
        assert_eq!(res.total_questions, 4);
        assert_eq!(res.answered_questions, 3);
        assert_eq!(res.completion_percentage, 75);
        assert_eq!(res.timestamp, "2025-06-10T18:30:00.000Z");
        assert_eq!(res.selected_categories, vec!["transportation".to_string()]);
        assert_eq!(res.target_candidate, ALI);
        assert_eq!(res.answers, ans);
        assert_eq!(res.candidate_matches.len(), 3);
        assert!(res
            .candidate_matches
            .windows(2)
            .all(|w| w[0].match_percentage >= w[1].match_percentage));
    }

    #[test]
    fn serialized_field_names() {
        let ds = single_question_dataset();
        let res = assemble_result_at(
            &answers(&[(0, &[0])]),
            &ds,
            &PriorityCategories::none(),
            &RULES,
            C1,
            fixed_time(),
        );
        let js = serde_json::to_value(&res).unwrap();
        assert_eq!(js["targetMatchPercentage"], 100);
        assert_eq!(js["candidateMatches"][0]["matchPercentage"], 100);
        assert_eq!(js["answers"]["0"][0], 0);
        assert_eq!(
            js["policyAlignment"]["alignments"][0]["userTargetSelections"][0]["optionIndex"],
            0
        );
    }
}
