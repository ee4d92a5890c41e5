use serde::{Deserialize, Serialize};

/// Number of questions requested when nothing else is specified
pub const DEFAULT_AMOUNT: u32 = 10;
/// Largest batch the question bank hands out in one request
pub const MAX_AMOUNT: u32 = 50;
/// Points awarded per correct answer, independent of difficulty or time left
pub const POINTS_PER_CORRECT: u32 = 100;
/// Length of the per-question answer window, in countdown units
pub const COUNTDOWN_UNITS: u32 = 30;
/// Recorded as the selected answer when the countdown runs out
pub const TIME_UP: &str = "Time up!";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Parses the wire token; anything unrecognised means "any difficulty"
    pub fn parse(token: &str) -> Option<Self> {
        match token.trim().to_ascii_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

/// Parameters of one session, captured at start and never changed afterwards
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub category: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub amount: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            category: None,
            difficulty: None,
            amount: DEFAULT_AMOUNT,
        }
    }
}

impl Settings {
    pub fn new(category: Option<String>, difficulty: Option<Difficulty>, amount: u32) -> Self {
        Self {
            category: category
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
            difficulty,
            amount: coerce_amount(amount),
        }
    }

    /// Builds settings from raw form values, where an empty string means "any"
    pub fn from_form(category: &str, difficulty: &str, amount: &str) -> Self {
        let amount = amount.trim().parse::<u32>().unwrap_or(DEFAULT_AMOUNT);
        Self::new(
            Some(category.to_string()),
            Difficulty::parse(difficulty),
            amount,
        )
    }
}

fn coerce_amount(amount: u32) -> u32 {
    amount.clamp(1, MAX_AMOUNT)
}

/// A multiple-choice question as delivered by the bank; text is still entity-encoded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    #[serde(rename = "question")]
    pub text: String,
    pub correct_answer: String,
    pub incorrect_answers: Vec<String>,
}

impl Question {
    pub fn new<S: Into<String>>(text: S, correct: S, incorrect: Vec<S>) -> Self {
        Self {
            text: text.into(),
            correct_answer: correct.into(),
            incorrect_answers: incorrect.into_iter().map(Into::into).collect(),
        }
    }

    /// Incorrect answers followed by the correct one, before shuffling
    pub fn answer_pool(&self) -> Vec<String> {
        let mut pool = self.incorrect_answers.clone();
        pool.push(self.correct_answer.clone());
        pool
    }
}

/// Outcome of one resolved question; appended once and never touched again
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerResult {
    pub question_text: String,
    pub was_correct: bool,
    pub selected_answer: String,
    pub correct_answer: String,
}

impl AnswerResult {
    pub fn timed_out(&self) -> bool {
        !self.was_correct && self.selected_answer == TIME_UP
    }
}

/// How a displayed choice is marked once the question is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceMark {
    Unmarked,
    Correct,
    Incorrect,
}

/// One row of the end-of-session breakdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakdownLine {
    pub number: usize,
    pub was_correct: bool,
    pub text: String,
}

impl BreakdownLine {
    pub fn marker(&self) -> char {
        if self.was_correct {
            '✓'
        } else {
            '✗'
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub score: u32,
    pub correct_count: u32,
    pub total: usize,
    pub accuracy: u32,
    pub is_new_high_score: bool,
    pub high_score: u32,
    pub breakdown: Vec<BreakdownLine>,
}

/// Rounded percentage of correct answers; 0 for an empty session
pub fn accuracy(correct_count: u32, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((correct_count as f64 / total as f64) * 100.0).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default_amount() {
        let s = Settings::default();
        assert_eq!(s.amount, 10);
        assert_eq!(s.category, None);
        assert_eq!(s.difficulty, None);
    }

    #[test]
    fn test_settings_empty_tokens_mean_any() {
        let s = Settings::from_form("", "", "2");
        assert_eq!(s.category, None);
        assert_eq!(s.difficulty, None);
        assert_eq!(s.amount, 2);
    }

    #[test]
    fn test_settings_amount_coerced_positive() {
        assert_eq!(Settings::new(None, None, 0).amount, 1);
        assert_eq!(Settings::new(None, None, 500).amount, MAX_AMOUNT);
        assert_eq!(Settings::from_form("", "", "abc").amount, DEFAULT_AMOUNT);
        assert_eq!(Settings::from_form("", "", "-3").amount, DEFAULT_AMOUNT);
    }

    #[test]
    fn test_settings_passes_category_through() {
        let s = Settings::from_form("18", "hard", "5");
        assert_eq!(s.category.as_deref(), Some("18"));
        assert_eq!(s.difficulty, Some(Difficulty::Hard));
    }

    #[test]
    fn test_difficulty_tokens() {
        assert_eq!(Difficulty::parse("Easy"), Some(Difficulty::Easy));
        assert_eq!(Difficulty::parse("nope"), None);
        assert_eq!(Difficulty::Medium.to_string(), "medium");
    }

    #[test]
    fn test_answer_pool_contains_all_answers() {
        let q = Question::new("q", "right", vec!["a", "b", "c"]);
        let pool = q.answer_pool();
        assert_eq!(pool.len(), 4);
        assert_eq!(pool.last().map(String::as_str), Some("right"));
    }

    #[test]
    fn test_accuracy_rounding() {
        assert_eq!(accuracy(1, 2), 50);
        assert_eq!(accuracy(2, 3), 67);
        assert_eq!(accuracy(1, 3), 33);
        assert_eq!(accuracy(0, 0), 0);
    }

    #[test]
    fn test_question_deserializes_from_bank_record() {
        let json = r#"{"type":"multiple","difficulty":"easy","category":"Science",
            "question":"What is H&lt;sub&gt;2&lt;/sub&gt;O?","correct_answer":"Water",
            "incorrect_answers":["Salt","Air","Fire"]}"#;
        let q: Question = serde_json::from_str(json).unwrap();
        assert_eq!(q.correct_answer, "Water");
        assert_eq!(q.incorrect_answers.len(), 3);
        assert!(q.text.contains("&lt;"));
    }
}
