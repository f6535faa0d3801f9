//! Plan categories and their question sets

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::EngineError;

/// Which kind of plan the user asked for
///
/// Chosen once per session. The serde names are the wire names used by the
/// gateway (`"alimentacao"` / `"treino"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "alimentacao")]
    Nutrition,
    #[serde(rename = "treino")]
    Training,
}

impl Category {
    /// Every category, in menu order
    pub const ALL: [Category; 2] = [Category::Nutrition, Category::Training];

    /// Name used on the wire (`tipo` field)
    pub fn wire_name(self) -> &'static str {
        match self {
            Category::Nutrition => "alimentacao",
            Category::Training => "treino",
        }
    }

    /// Name used on the command line and in config files
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Nutrition => "nutrition",
            Category::Training => "training",
        }
    }

    /// Human readable label shown in menus
    pub fn label(self) -> &'static str {
        match self {
            Category::Nutrition => "Plano de Alimentação",
            Category::Training => "Plano de Treinamento",
        }
    }

    /// One-line description shown under the label
    pub fn blurb(self) -> &'static str {
        match self {
            Category::Nutrition => "Sugestões personalizadas de dieta para o seu dia a dia",
            Category::Training => "Rotinas de exercícios adaptadas ao seu objetivo",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = EngineError;

    /// Accepts both the CLI names and the wire names
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nutrition" | "alimentacao" | "alimentação" => Ok(Category::Nutrition),
            "training" | "treino" | "treinamento" => Ok(Category::Training),
            other => Err(EngineError::UnknownCategory(other.to_string())),
        }
    }
}

/// An ordered, non-empty list of questions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct QuestionSet(Vec<String>);

impl QuestionSet {
    /// Build a question set, rejecting empty lists and blank questions
    pub fn new<I, S>(questions: I) -> Result<Self, EngineError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let questions: Vec<String> = questions.into_iter().map(Into::into).collect();
        debug!(count = questions.len(), "QuestionSet::new: called");
        if questions.is_empty() || questions.iter().any(|q| q.trim().is_empty()) {
            return Err(EngineError::EmptyQuestionSet);
        }
        Ok(Self(questions))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for clippy's `len_without_is_empty`
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    /// Index of the final question
    pub fn last_index(&self) -> usize {
        self.0.len() - 1
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<'de> Deserialize<'de> for QuestionSet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let questions = Vec::<String>::deserialize(deserializer)?;
        QuestionSet::new(questions).map_err(serde::de::Error::custom)
    }
}

/// Question sets for every category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuestionSets {
    pub nutrition: QuestionSet,
    pub training: QuestionSet,
}

impl QuestionSets {
    /// The set that applies to `category`
    pub fn for_category(&self, category: Category) -> &QuestionSet {
        match category {
            Category::Nutrition => &self.nutrition,
            Category::Training => &self.training,
        }
    }
}

impl Default for QuestionSets {
    fn default() -> Self {
        Self {
            nutrition: QuestionSet(NUTRITION_QUESTIONS.iter().map(|q| q.to_string()).collect()),
            training: QuestionSet(TRAINING_QUESTIONS.iter().map(|q| q.to_string()).collect()),
        }
    }
}

const NUTRITION_QUESTIONS: &[&str] = &[
    "Qual sua idade, altura e peso atual?",
    "Você tem alguma restrição alimentar ou condição de saúde (como diabetes, hipertensão, intolerâncias)?",
    "Como é sua alimentação atualmente? (descreva café da manhã, almoço, jantar e lanches)",
    "Você costuma fazer uso de suplementos ou vitaminas?",
    "Qual é sua rotina diária? (trabalho, horários, atividade física, etc)",
];

const TRAINING_QUESTIONS: &[&str] = &[
    "Qual sua idade, altura e peso atual?",
    "Você já treina? Se sim, com que frequência e há quanto tempo?",
    "Tem alguma limitação física ou lesão?",
    "Qual seu principal objetivo? (ex: emagrecer, ganhar massa, melhorar o condicionamento)",
    "Onde pretende treinar? (academia, casa, ao ar livre)",
];
