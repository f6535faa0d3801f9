//! Prompt composition for plan generation

use questionnaire::Category;

/// Persona line that opens the prompt
fn persona(category: Category) -> &'static str {
    match category {
        Category::Nutrition => {
            "You are a nutritionist and personal trainer. Based on the answers below, \
             create a personalized meal plan."
        }
        Category::Training => {
            "You are a personal trainer and nutritionist. Based on the answers below, \
             create a personalized training plan."
        }
    }
}

const CLOSING: &str = "Respond in a structured, clear way with practical guidance for beginners. \
                       Write the plan in the same language as the answers.";

/// Build the single prompt sent to the provider
///
/// Deterministic: the persona preamble, one `Question N: <answer>` line per
/// answer in order (N starts at 1), then the closing instruction.
pub fn build_prompt(category: Category, answers: &[String]) -> String {
    let lines: Vec<String> = answers
        .iter()
        .enumerate()
        .map(|(i, answer)| format!("Question {}: {}", i + 1, answer))
        .collect();

    format!("{}\n\n{}\n\n{}", persona(category), lines.join("\n"), CLOSING)
}
