// Data structures for reading the dataset in JSON format.

use log::debug;
use policy_matching::*;
use serde::{Deserialize, Serialize};
use snafu::prelude::*;
use std::fs;

use crate::quiz::{OpeningFileSnafu, ParsingJsonSnafu, PmResult};

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    #[serde(rename = "tiebreakMode")]
    pub tiebreak_mode: Option<String>,
    #[serde(rename = "priorityWeight")]
    pub priority_weight: Option<u64>,
    #[serde(rename = "maxPriorityCategories")]
    pub max_priority_categories: Option<usize>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ExplanationConfig {
    pub candidate: String,
    pub explanation: String,
    pub remark: Option<String>,
    pub source: Option<String>,
    #[serde(rename = "sourceLink")]
    pub source_link: Option<String>,
    #[serde(rename = "sourceTitle")]
    pub source_title: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OptionConfig {
    pub text: String,
    #[serde(default)]
    pub candidates: Vec<String>,
    pub explanations: Option<Vec<ExplanationConfig>>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct QuestionConfig {
    pub id: QuestionId,
    pub subtopic: String,
    pub question: String,
    pub category: String,
    pub options: Vec<OptionConfig>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct SocialMediaConfig {
    pub twitter: Option<String>,
    pub facebook: Option<String>,
    pub instagram: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct CandidateConfig {
    // When missing, the name is used as the id.
    pub id: Option<String>,
    pub name: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    pub bio: Option<String>,
    pub website: Option<String>,
    #[serde(rename = "socialMedia")]
    pub social_media: Option<SocialMediaConfig>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    #[serde(rename = "targetCandidate")]
    pub target_candidate: Option<String>,
    pub rules: Option<RulesConfig>,
    pub candidates: Vec<CandidateConfig>,
    pub categories: Vec<CategoryConfig>,
    pub questions: Vec<QuestionConfig>,
}

impl ExplanationConfig {
    fn to_explanation(&self) -> Explanation {
        Explanation {
            candidate: self.candidate.clone(),
            explanation: self.explanation.clone(),
            remark: self.remark.clone(),
            source: self.source.clone(),
            source_link: self.source_link.clone(),
            source_title: self.source_title.clone(),
        }
    }
}

impl QuestionConfig {
    fn to_question(&self) -> Question {
        let options = self
            .options
            .iter()
            .map(|o| QuizOption {
                text: o.text.clone(),
                candidates: o.candidates.clone(),
                explanations: o
                    .explanations
                    .iter()
                    .flatten()
                    .map(|e| e.to_explanation())
                    .collect(),
            })
            .collect();
        Question {
            id: self.id,
            subtopic: self.subtopic.clone(),
            prompt: self.question.clone(),
            category: self.category.clone(),
            options,
        }
    }
}

impl CandidateConfig {
    fn to_candidate(&self) -> CandidateMetadata {
        let social_links = match &self.social_media {
            Some(sm) => SocialLinks {
                twitter: sm.twitter.clone(),
                facebook: sm.facebook.clone(),
                instagram: sm.instagram.clone(),
            },
            None => SocialLinks::default(),
        };
        CandidateMetadata {
            id: self.id.clone().unwrap_or_else(|| self.name.clone()),
            name: self.name.clone(),
            image_url: self.image_url.clone(),
            bio: self.bio.clone(),
            website: self.website.clone(),
            social_links,
        }
    }
}

impl CategoryConfig {
    fn to_category(&self) -> Category {
        Category {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone().unwrap_or_default(),
            aliases: self.aliases.clone(),
        }
    }
}

impl DatasetConfig {
    /// Checks the content of the file and builds the dataset used for scoring.
    pub fn to_dataset(&self) -> Result<Dataset, ScoringErrors> {
        Dataset::new(
            self.questions.iter().map(|q| q.to_question()).collect(),
            self.candidates.iter().map(|c| c.to_candidate()).collect(),
            self.categories.iter().map(|c| c.to_category()).collect(),
        )
    }
}

pub fn read_dataset_config(path: &str) -> PmResult<DatasetConfig> {
    debug!("read_dataset_config: {:?}", path);
    let contents = fs::read_to_string(path).context(OpeningFileSnafu { path })?;
    let config: DatasetConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    debug!(
        "read_dataset_config: {} questions, target {:?}, rules {:?}",
        config.questions.len(),
        config.target_candidate,
        config.rules
    );
    Ok(config)
}
