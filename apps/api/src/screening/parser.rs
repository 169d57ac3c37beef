//! Resume Parser — extracts structured attributes from raw résumé text.
//!
//! `parse_resume` is total: malformed or sparse text degrades to sentinels
//! (`years_experience = unknown`, `skills = []`), never an error. One
//! unparsable résumé must never abort a screening batch.

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Years of professional experience, or the "unknown" sentinel when the text
/// yields no usable signal. Serializes as a number or the string `"unknown"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum YearsExperience {
    Known(f32),
    Unknown,
}

impl Serialize for YearsExperience {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            YearsExperience::Known(v) => serializer.serialize_f32(*v),
            YearsExperience::Unknown => serializer.serialize_str("unknown"),
        }
    }
}

impl<'de> Deserialize<'de> for YearsExperience {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Num(f32),
            Text(String),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Num(v) => Ok(YearsExperience::Known(v)),
            Raw::Text(_) => Ok(YearsExperience::Unknown),
        }
    }
}

/// Structured per-candidate view of a résumé. Derived fresh per request —
/// résumé text can change between corpus refreshes, so parses are never
/// cached across requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedResume {
    pub years_experience: YearsExperience,
    /// Distinct skills in extraction order.
    pub skills: Vec<String>,
}

impl ParsedResume {
    /// The fully degraded parse: all sentinels.
    pub fn unknown() -> Self {
        Self {
            years_experience: YearsExperience::Unknown,
            skills: Vec::new(),
        }
    }
}

/// Common technology skills matched against résumé text when no explicit
/// skills section is present. Matching is word-boundary aware.
const SKILL_LEXICON: &[&str] = &[
    "python",
    "java",
    "rust",
    "c++",
    "c#",
    "javascript",
    "typescript",
    "golang",
    "kotlin",
    "swift",
    "ruby",
    "scala",
    "sql",
    "nosql",
    "postgresql",
    "mysql",
    "mongodb",
    "redis",
    "kafka",
    "spark",
    "hadoop",
    "react",
    "vue",
    "angular",
    "node.js",
    "django",
    "spring",
    "docker",
    "kubernetes",
    "terraform",
    "aws",
    "azure",
    "gcp",
    "linux",
    "git",
    "ci/cd",
    "graphql",
    "grpc",
    "tensorflow",
    "pytorch",
    "machine learning",
    "deep learning",
    "data analysis",
    "distributed systems",
    "microservices",
];

/// Parses raw résumé text into structured attributes. Total — returns
/// sentinel values instead of failing on garbled input.
pub fn parse_resume(raw_text: &str) -> ParsedResume {
    let mut skills = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for skill in section_skills(raw_text) {
        if seen.insert(skill.to_lowercase()) {
            skills.push(skill);
        }
    }
    for skill in lexicon_skills(raw_text) {
        if seen.insert(skill.to_lowercase()) {
            skills.push(skill);
        }
    }

    ParsedResume {
        years_experience: extract_years(raw_text),
        skills,
    }
}

/// Finds the largest plausible "N years" mention (bounded at 60 to discard
/// phone numbers and dates that happen to precede the word).
fn extract_years(text: &str) -> YearsExperience {
    let lower = text.to_lowercase();
    let tokens: Vec<&str> = lower.split_whitespace().collect();

    let mut best: Option<f32> = None;
    let mut consider = |value: f32| {
        if (0.0..=60.0).contains(&value) && best.map_or(true, |b| value > b) {
            best = Some(value);
        }
    };

    for (i, token) in tokens.iter().enumerate() {
        // "5 years" / "5+ years" / "3.5 yrs"
        if let Some(value) = parse_number(token) {
            if let Some(next) = tokens.get(i + 1) {
                if next.starts_with("year") || next.starts_with("yr") {
                    consider(value);
                }
            }
        }
        // "5years" / "10+yrs" as a single token
        for suffix in ["years", "year", "yrs", "yr"] {
            if let Some(prefix) = token.strip_suffix(suffix) {
                if let Some(value) = parse_number(prefix) {
                    consider(value);
                }
            }
        }
    }

    match best {
        Some(v) => YearsExperience::Known(v),
        None => YearsExperience::Unknown,
    }
}

/// Parses "5", "5+", "3.5" after trimming surrounding punctuation.
fn parse_number(token: &str) -> Option<f32> {
    let trimmed = token
        .trim_matches(|c: char| !c.is_ascii_digit() && c != '.' && c != '+')
        .trim_end_matches('+');
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f32>().ok()
}

/// Skills listed on an explicit "Skills:" line, split on common separators,
/// in listed order.
fn section_skills(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    for line in text.lines() {
        let lower = line.trim().to_lowercase();
        let is_skills_line = lower.starts_with("skills")
            || lower.starts_with("technical skills")
            || lower.starts_with("core skills");
        if !is_skills_line {
            continue;
        }
        let Some(idx) = line.find(':') else { continue };
        for item in line[idx + 1..].split([',', ';', '|', '/']) {
            let item = item.trim();
            if !item.is_empty() && item.len() <= 40 {
                out.push(item.to_string());
            }
        }
    }
    out
}

/// Lexicon skills evidenced anywhere in the text, ordered by first occurrence.
fn lexicon_skills(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    let mut found: Vec<(usize, &str)> = SKILL_LEXICON
        .iter()
        .filter_map(|skill| find_word(&lower, skill).map(|pos| (pos, *skill)))
        .collect();
    found.sort_by_key(|(pos, _)| *pos);
    found.into_iter().map(|(_, s)| s.to_string()).collect()
}

/// First word-boundary occurrence of `term` in `text` (both lowercase).
/// Boundaries are non-alphanumeric so "golang" does not match inside "erlang"
/// nor "java" inside "javascript".
fn find_word(text: &str, term: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(rel) = text[from..].find(term) {
        let start = from + rel;
        let end = start + term.len();
        let left_ok = start == 0
            || !text[..start]
                .chars()
                .next_back()
                .is_some_and(|c| c.is_alphanumeric());
        let right_ok = end == text.len()
            || !text[end..].chars().next().is_some_and(|c| c.is_alphanumeric());
        if left_ok && right_ok {
            return Some(start);
        }
        from = end;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_years_basic() {
        let parsed = parse_resume("Senior engineer with 7 years of backend experience.");
        assert_eq!(parsed.years_experience, YearsExperience::Known(7.0));
    }

    #[test]
    fn test_extract_years_plus_and_fraction() {
        let parsed = parse_resume("3.5+ years Python, previously 2 years support.");
        assert_eq!(parsed.years_experience, YearsExperience::Known(3.5));
    }

    #[test]
    fn test_extract_years_takes_maximum_mention() {
        let parsed = parse_resume("2 years at Acme, 10 years total experience.");
        assert_eq!(parsed.years_experience, YearsExperience::Known(10.0));
    }

    #[test]
    fn test_extract_years_ignores_implausible_values() {
        let parsed = parse_resume("Founded in 1998, years of history.");
        assert_eq!(parsed.years_experience, YearsExperience::Unknown);
    }

    #[test]
    fn test_empty_text_degrades_to_sentinels() {
        let parsed = parse_resume("");
        assert_eq!(parsed.years_experience, YearsExperience::Unknown);
        assert!(parsed.skills.is_empty());
    }

    #[test]
    fn test_garbled_text_degrades_to_sentinels() {
        let parsed = parse_resume("@@@@ ???? \u{fffd}\u{fffd} 123123123");
        assert_eq!(parsed.years_experience, YearsExperience::Unknown);
        assert!(parsed.skills.is_empty());
    }

    #[test]
    fn test_skills_section_preserves_listed_order() {
        let parsed = parse_resume("Skills: Rust, Kafka, PostgreSQL\nOther text");
        assert_eq!(parsed.skills[..3], ["Rust", "Kafka", "PostgreSQL"]);
    }

    #[test]
    fn test_lexicon_skills_ordered_by_occurrence() {
        let parsed = parse_resume("Built services in rust, deployed with docker on aws.");
        assert_eq!(parsed.skills, vec!["rust", "docker", "aws"]);
    }

    #[test]
    fn test_skills_deduplicated_across_sources() {
        let parsed = parse_resume("Skills: Rust\nShipped rust tooling for years.");
        let rust_count = parsed
            .skills
            .iter()
            .filter(|s| s.eq_ignore_ascii_case("rust"))
            .count();
        assert_eq!(rust_count, 1);
        assert_eq!(parsed.skills[0], "Rust", "section casing wins");
    }

    #[test]
    fn test_word_boundary_blocks_substring_matches() {
        let parsed = parse_resume("Expert in javascript applications.");
        assert_eq!(parsed.skills, vec!["javascript"]);
        assert!(!parsed.skills.iter().any(|s| s == "java"));
    }

    #[test]
    fn test_years_experience_serializes_number_or_sentinel() {
        assert_eq!(
            serde_json::to_string(&YearsExperience::Known(5.0)).unwrap(),
            "5.0"
        );
        assert_eq!(
            serde_json::to_string(&YearsExperience::Unknown).unwrap(),
            "\"unknown\""
        );
    }

    #[test]
    fn test_years_experience_roundtrips_from_json() {
        let known: YearsExperience = serde_json::from_str("4.5").unwrap();
        assert_eq!(known, YearsExperience::Known(4.5));
        let unknown: YearsExperience = serde_json::from_str("\"unknown\"").unwrap();
        assert_eq!(unknown, YearsExperience::Unknown);
    }
}
