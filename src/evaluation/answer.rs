// file: src/evaluation/answer.rs
// description: prompt construction and answer extraction/scoring
// reference: https://docs.rs/regex

use crate::models::{BenchmarkItem, SearchHit};
use lazy_static::lazy_static;
use regex::Regex;

pub const SYSTEM_PROMPT: &str = "You are a biomedical expert answering questions from the research literature. \
Use the provided PubMed abstracts when they are relevant.";

const YES_NO_MAYBE: [&str; 3] = ["yes", "no", "maybe"];

lazy_static! {
    static ref ANSWER_LETTER: Regex = Regex::new(
        r"(?i)\banswer\s*(?:is)?\s*[:\-]?\s*\(?([a-z])\b"
    ).expect("ANSWER_LETTER regex is valid");

    // a bare letter needs a delimiter, so the article "A" is not an option
    static ref LEADING_LETTER: Regex = Regex::new(
        r"^\s*\(?([A-Za-z])(?:[).:]|\s*$)"
    ).expect("LEADING_LETTER regex is valid");

    static ref ANSWER_VERDICT: Regex = Regex::new(
        r"(?i)\banswer\s*(?:is)?\s*[:\-]?\s*(yes|no|maybe)\b"
    ).expect("ANSWER_VERDICT regex is valid");

    static ref YES_NO_MAYBE_WORD: Regex = Regex::new(
        r"(?i)\b(yes|no|maybe)\b"
    ).expect("YES_NO_MAYBE_WORD regex is valid");
}

fn normalize(text: &str) -> String {
    text.trim().trim_end_matches('.').trim().to_lowercase()
}

fn is_yes_no_maybe(item: &BenchmarkItem) -> bool {
    !item.is_multiple_choice() && YES_NO_MAYBE.contains(&normalize(&item.answer).as_str())
}

fn option_key(item: &BenchmarkItem, letter: &str) -> Option<String> {
    item.options
        .keys()
        .find(|key| key.eq_ignore_ascii_case(letter))
        .cloned()
}

pub fn build_prompt(item: &BenchmarkItem, passages: &[SearchHit]) -> String {
    let mut prompt = String::new();

    if !passages.is_empty() || item.context.is_some() {
        prompt.push_str("Context:\n");
        if let Some(ref context) = item.context {
            prompt.push_str(context.trim());
            prompt.push_str("\n\n");
        }
        for (idx, hit) in passages.iter().enumerate() {
            prompt.push_str(&format!(
                "[{}] PMID {}: {}\n\n",
                idx + 1,
                hit.pmid(),
                hit.article.passage()
            ));
        }
    }

    prompt.push_str(&format!("Question: {}\n", item.question.trim()));

    if item.is_multiple_choice() {
        prompt.push_str("Options:\n");
        for (key, text) in &item.options {
            prompt.push_str(&format!("{}. {}\n", key, text));
        }
        prompt.push_str("\nAnswer with the letter of the correct option, as 'Answer: <letter>'.");
    } else if is_yes_no_maybe(item) {
        prompt.push_str("\nAnswer with yes, no, or maybe, as 'Answer: <yes|no|maybe>'.");
    } else {
        prompt.push_str("\nAnswer concisely.");
    }

    prompt
}

/// Pulls the model's final answer out of free text.
pub fn extract_answer(item: &BenchmarkItem, response: &str) -> Option<String> {
    if item.is_multiple_choice() {
        for captures in ANSWER_LETTER.captures_iter(response) {
            if let Some(key) = option_key(item, &captures[1]) {
                return Some(key);
            }
        }

        if let Some(captures) = LEADING_LETTER.captures(response)
            && let Some(key) = option_key(item, &captures[1])
        {
            return Some(key);
        }

        let lowered = response.to_lowercase();
        let mentioned: Vec<&String> = item
            .options
            .iter()
            .filter(|(_, text)| lowered.contains(&text.to_lowercase()))
            .map(|(key, _)| key)
            .collect();

        return match mentioned.as_slice() {
            [only] => Some((*only).clone()),
            _ => None,
        };
    }

    if is_yes_no_maybe(item) {
        let verdict = ANSWER_VERDICT
            .captures_iter(response)
            .last()
            .or_else(|| YES_NO_MAYBE_WORD.captures_iter(response).last());
        return verdict.map(|captures| captures[1].to_lowercase());
    }

    let trimmed = response.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Expected answer as an option key when the benchmark gives option text.
pub fn expected_answer(item: &BenchmarkItem) -> String {
    if item.is_multiple_choice() {
        if let Some(key) = option_key(item, item.answer.trim()) {
            return key;
        }
        let wanted = normalize(&item.answer);
        if let Some((key, _)) = item.options.iter().find(|(_, text)| normalize(text) == wanted) {
            return key.clone();
        }
    }
    item.answer.clone()
}

pub fn is_correct(item: &BenchmarkItem, predicted: Option<&str>) -> bool {
    match predicted {
        Some(predicted) => normalize(predicted) == normalize(&expected_answer(item)),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Article;
    use std::collections::BTreeMap;

    fn yes_no(answer: &str) -> BenchmarkItem {
        BenchmarkItem {
            id: "1".to_string(),
            question: "Does aspirin reduce stroke risk?".to_string(),
            options: BTreeMap::new(),
            answer: answer.to_string(),
            context: None,
        }
    }

    fn multiple_choice() -> BenchmarkItem {
        let mut options = BTreeMap::new();
        options.insert("A".to_string(), "Warfarin".to_string());
        options.insert("B".to_string(), "Heparin".to_string());
        options.insert("C".to_string(), "Aspirin".to_string());
        BenchmarkItem {
            id: "2".to_string(),
            question: "Which drug irreversibly inhibits COX?".to_string(),
            options,
            answer: "C".to_string(),
            context: None,
        }
    }

    #[test]
    fn test_extract_multiple_choice() {
        let item = multiple_choice();
        assert_eq!(extract_answer(&item, "Answer: C"), Some("C".to_string()));
        assert_eq!(extract_answer(&item, "The answer is (b)."), Some("B".to_string()));
        assert_eq!(extract_answer(&item, "C. Aspirin acetylates COX"), Some("C".to_string()));
        assert_eq!(
            extract_answer(&item, "It must be aspirin, given acetylation."),
            Some("C".to_string())
        );
        assert_eq!(extract_answer(&item, "Either heparin or warfarin"), None);
    }

    #[test]
    fn test_answer_letter_outside_options_ignored() {
        let item = multiple_choice();
        assert_eq!(extract_answer(&item, "Answer: Z, or maybe A"), None);
    }

    #[test]
    fn test_leading_article_is_not_an_option() {
        let item = multiple_choice();
        assert_eq!(
            extract_answer(&item, "A low dose of aspirin irreversibly acetylates COX-1."),
            Some("C".to_string())
        );
        assert_eq!(extract_answer(&item, "I think heparin works"), Some("B".to_string()));
        assert_eq!(extract_answer(&item, "(b) heparin"), Some("B".to_string()));
        assert_eq!(extract_answer(&item, " c "), Some("C".to_string()));
    }

    #[test]
    fn test_extract_yes_no_maybe() {
        let item = yes_no("yes");
        assert_eq!(
            extract_answer(&item, "Based on the trials, Answer: Yes."),
            Some("yes".to_string())
        );
        assert_eq!(extract_answer(&item, "Maybe; evidence is mixed"), Some("maybe".to_string()));
        assert_eq!(extract_answer(&item, "Unclear"), None);
    }

    #[test]
    fn test_yes_no_maybe_prefers_answer_marker() {
        let item = yes_no("yes");
        assert_eq!(
            extract_answer(
                &item,
                "No randomized trials exist, but cohort data are consistent. Answer: yes"
            ),
            Some("yes".to_string())
        );
        assert_eq!(
            extract_answer(&item, "The answer is Maybe, though no trial settles it."),
            Some("maybe".to_string())
        );
    }

    #[test]
    fn test_yes_no_maybe_falls_back_to_last_word() {
        let item = yes_no("no");
        assert_eq!(
            extract_answer(&item, "Yes, early data looked promising; the final verdict is no."),
            Some("no".to_string())
        );
    }

    #[test]
    fn test_free_form_answer() {
        let item = yes_no("cyclooxygenase");
        assert_eq!(extract_answer(&item, "  cyclooxygenase \n"), Some("cyclooxygenase".to_string()));
        assert!(is_correct(&item, Some("Cyclooxygenase.")));
    }

    #[test]
    fn test_expected_answer_from_option_text() {
        let mut item = multiple_choice();
        item.answer = "aspirin".to_string();
        assert_eq!(expected_answer(&item), "C");
        assert!(is_correct(&item, Some("C")));
        assert!(!is_correct(&item, Some("A")));
        assert!(!is_correct(&item, None));
    }

    #[test]
    fn test_build_prompt_with_context() {
        let item = multiple_choice();
        let hits = vec![SearchHit::new(
            3.2,
            Article::new(
                "42".to_string(),
                Some("COX inhibition".to_string()),
                Some("Aspirin acetylates COX-1.".to_string()),
            ),
        )];

        let prompt = build_prompt(&item, &hits);
        assert!(prompt.starts_with("Context:\n[1] PMID 42: COX inhibition\nAspirin acetylates COX-1."));
        assert!(prompt.contains("Options:\nA. Warfarin\nB. Heparin\nC. Aspirin\n"));
        assert!(prompt.ends_with("as 'Answer: <letter>'."));
    }

    #[test]
    fn test_build_prompt_without_context() {
        let prompt = build_prompt(&yes_no("no"), &[]);
        assert!(prompt.starts_with("Question: Does aspirin"));
        assert!(prompt.contains("yes, no, or maybe"));
    }
}
