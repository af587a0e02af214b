//! Keyword to question generation
//!
//! Turns a search keyword into natural questions a person would ask an
//! assistant. Pure text transformation, no state.

use crate::core::question::Question;

/// Templates with `{keyword}`, `{persona}` and `{use_case}` placeholders
pub const QUESTION_TEMPLATES: [&str; 10] = [
    "What is the best {keyword}?",
    "What are the top {keyword} options?",
    "Which {keyword} should I choose?",
    "What {keyword} do you recommend?",
    "How do I find a good {keyword}?",
    "What's the best {keyword} for {persona}?",
    "Which {keyword} is best for {use_case}?",
    "What are the pros and cons of different {keyword}?",
    "How does {keyword} compare?",
    "What should I look for in a {keyword}?",
];

pub const DEFAULT_PERSONAS: [&str; 10] = [
    "beginners",
    "small businesses",
    "enterprises",
    "startups",
    "freelancers",
    "developers",
    "designers",
    "marketers",
    "agencies",
    "teams",
];

pub const DEFAULT_USE_CASES: [&str; 6] = [
    "getting started",
    "scaling",
    "budget-conscious users",
    "professional use",
    "personal projects",
    "collaboration",
];

const BASIC_TEMPLATES: usize = 5;
const VARIATIONS_PER_AXIS: usize = 3;

/// Which extra axes [`question_variations`] may draw from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariationOptions {
    pub personas: bool,
    pub use_cases: bool,
}

impl Default for VariationOptions {
    fn default() -> Self {
        Self {
            personas: true,
            use_cases: true,
        }
    }
}

fn render(template: &str, keyword: &str, persona: Option<&str>, use_case: Option<&str>) -> String {
    template
        .replace("{keyword}", keyword)
        .replace("{persona}", persona.unwrap_or("users"))
        .replace("{use_case}", use_case.unwrap_or("my needs"))
}

/// Render one template; the index wraps around the template list
pub fn keyword_to_question(
    keyword: &str,
    persona: Option<&str>,
    use_case: Option<&str>,
    template_index: usize,
) -> String {
    let template = QUESTION_TEMPLATES[template_index % QUESTION_TEMPLATES.len()];
    render(template, keyword.trim(), persona, use_case)
}

/// Up to `count` distinct questions for a keyword.
///
/// Basic templates come first, then persona and use-case variants.
pub fn question_variations(keyword: &str, count: usize, options: VariationOptions) -> Vec<Question> {
    let keyword = keyword.trim();
    if keyword.is_empty() || count == 0 {
        return Vec::new();
    }

    let basic = QUESTION_TEMPLATES[..BASIC_TEMPLATES]
        .iter()
        .map(|t| render(t, keyword, None, None));
    let personas = DEFAULT_PERSONAS[..VARIATIONS_PER_AXIS]
        .iter()
        .filter(|_| options.personas)
        .map(|p| render(QUESTION_TEMPLATES[5], keyword, Some(p), None));
    let use_cases = DEFAULT_USE_CASES[..VARIATIONS_PER_AXIS]
        .iter()
        .filter(|_| options.use_cases)
        .map(|u| render(QUESTION_TEMPLATES[6], keyword, None, Some(u)));

    basic
        .chain(personas)
        .chain(use_cases)
        .take(count)
        .map(|text| Question::new(text).with_source_keyword(keyword))
        .collect()
}
