//! Problems that gate combat strength, and the content service seam
//!
//! The engine never judges problem quality: a `ContentService` is an
//! opaque oracle that turns a request into a question with its answer.

use crate::core::{Card, ProblemCategory};
use crate::{DuelError, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha12Rng;
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// A generated question with its correct answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub question: String,
    pub correct_answer: String,
    pub category: ProblemCategory,
    pub difficulty: u8,
    /// Multiple-choice options, when the service provides them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

impl Problem {
    /// Trimmed, case-insensitive answer comparison
    pub fn is_correct(&self, answer: &str) -> bool {
        answer.trim().eq_ignore_ascii_case(self.correct_answer.trim())
    }

    /// Reject problems a service returned without usable content
    pub fn check_well_formed(&self) -> Result<()> {
        if self.question.trim().is_empty() {
            return Err(DuelError::ExternalService(
                "content service returned an empty question".to_string(),
            ));
        }
        if self.correct_answer.trim().is_empty() {
            return Err(DuelError::ExternalService(
                "content service returned a problem without an answer".to_string(),
            ));
        }
        if let Some(options) = &self.options {
            if !options.iter().any(|o| self.is_correct(o)) {
                return Err(DuelError::ExternalService(
                    "multiple-choice options do not include the answer".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Stats of the card a problem is requested for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CardStats {
    pub cost: u8,
    pub power: i32,
    pub defense: i32,
}

/// What the engine asks the content service for
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProblemRequest {
    pub category: ProblemCategory,
    pub difficulty: u8,
    /// Free-form theme (card name, keywords, subcategory)
    pub theme_context: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card_stats: Option<CardStats>,
}

impl ProblemRequest {
    /// Build the themed request for a card entering combat
    pub fn for_card(card: &Card) -> Self {
        let hints = &card.problem_hints;
        let mut theme = vec![card.name.clone(), card.element.to_string()];
        theme.extend(hints.keywords.iter().cloned());
        if let Some(sub) = &hints.subcategory {
            theme.push(sub.clone());
        }
        ProblemRequest {
            category: card.problem_category,
            difficulty: hints.difficulty,
            theme_context: theme.join(", "),
            card_stats: Some(CardStats {
                cost: card.cost,
                power: card.power,
                defense: card.defense,
            }),
        }
    }
}

/// Source of combat problems
///
/// Shared across request handlers, so implementations must be thread-safe.
pub trait ContentService: Send + Sync {
    fn generate_problem(&self, request: &ProblemRequest) -> Result<Problem>;
}

/// Offline problem generator
///
/// Produces arithmetic, sequence and science questions whose content is a
/// pure function of the request, so matches stay reproducible.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArithmeticContentService;

const SCIENCE_BANK: &[(&str, &str, [&str; 3])] = &[
    ("What gas do plants absorb from the air?", "carbon dioxide", ["oxygen", "nitrogen", "helium"]),
    ("What is the chemical symbol for water?", "H2O", ["O2", "CO2", "NaCl"]),
    ("Which planet is closest to the Sun?", "Mercury", ["Venus", "Mars", "Earth"]),
    ("At what temperature in Celsius does water boil at sea level?", "100", ["90", "0", "212"]),
    ("What force keeps us on the ground?", "gravity", ["magnetism", "friction", "inertia"]),
    ("How many legs does an insect have?", "6", ["8", "4", "10"]),
    ("What part of the cell holds its genetic material?", "nucleus", ["membrane", "ribosome", "wall"]),
    ("What is the hardest natural material?", "diamond", ["granite", "iron", "quartz"]),
];

impl ArithmeticContentService {
    fn rng_for(request: &ProblemRequest) -> ChaCha12Rng {
        let mut hasher = FxHasher::default();
        request.hash(&mut hasher);
        ChaCha12Rng::seed_from_u64(hasher.finish())
    }

    fn numeric_options(answer: i64, rng: &mut ChaCha12Rng) -> Vec<String> {
        let mut values = vec![answer];
        while values.len() < 4 {
            let offset = rng.gen_range(1..=5) * if rng.gen_bool(0.5) { 1 } else { -1 };
            let candidate = answer + offset;
            if !values.contains(&candidate) {
                values.push(candidate);
            }
        }
        values.sort_unstable();
        values.iter().map(|v| v.to_string()).collect()
    }

    fn math(request: &ProblemRequest, rng: &mut ChaCha12Rng) -> (String, i64) {
        let d = i64::from(request.difficulty.max(1));
        match request.difficulty {
            0..=3 => {
                let a = rng.gen_range(1..=10 * d);
                let b = rng.gen_range(1..=10 * d);
                (format!("What is {a} + {b}?"), a + b)
            }
            4..=6 => {
                let a = rng.gen_range(2..=d + 6);
                let b = rng.gen_range(2..=12);
                (format!("What is {a} x {b}?"), a * b)
            }
            _ => {
                let a = rng.gen_range(3..=d + 5);
                let b = rng.gen_range(3..=12);
                let c = rng.gen_range(1..=20);
                (format!("What is {a} x {b} - {c}?"), a * b - c)
            }
        }
    }

    fn logic(request: &ProblemRequest, rng: &mut ChaCha12Rng) -> (String, i64) {
        let start = rng.gen_range(1..=9);
        if request.difficulty <= 5 {
            let step = rng.gen_range(2..=i64::from(request.difficulty.max(1)) + 3);
            let seq: Vec<i64> = (0..4).map(|i| start + i * step).collect();
            (
                format!(
                    "What comes next: {}, {}, {}, {}, ?",
                    seq[0], seq[1], seq[2], seq[3]
                ),
                start + 4 * step,
            )
        } else {
            let ratio: i64 = rng.gen_range(2..=3);
            let seq: Vec<i64> = (0..4).map(|i| start * ratio.pow(i)).collect();
            (
                format!(
                    "What comes next: {}, {}, {}, {}, ?",
                    seq[0], seq[1], seq[2], seq[3]
                ),
                start * ratio.pow(4),
            )
        }
    }
}

impl ContentService for ArithmeticContentService {
    fn generate_problem(&self, request: &ProblemRequest) -> Result<Problem> {
        let mut rng = Self::rng_for(request);

        let (question, correct_answer, options) = match request.category {
            ProblemCategory::Math => {
                let (q, a) = Self::math(request, &mut rng);
                (q, a.to_string(), Self::numeric_options(a, &mut rng))
            }
            ProblemCategory::Logic => {
                let (q, a) = Self::logic(request, &mut rng);
                (q, a.to_string(), Self::numeric_options(a, &mut rng))
            }
            ProblemCategory::Science => {
                let (q, a, wrong) = SCIENCE_BANK[rng.gen_range(0..SCIENCE_BANK.len())];
                let mut options: Vec<String> =
                    std::iter::once(a).chain(wrong).map(str::to_string).collect();
                options.sort();
                (q.to_string(), a.to_string(), options)
            }
        };

        Ok(Problem {
            question,
            correct_answer,
            category: request.category,
            difficulty: request.difficulty,
            options: Some(options),
        })
    }
}
