use anyhow::{Result, anyhow};
use isolang::Language;

/// Language utilities for ISO language code handling
///
/// Subtitle and translation services take BCP 47 style tags such as `ja`,
/// `zh-CN` or `zh-TW`. The primary subtag is checked against ISO 639-1 and
/// ISO 639-2; region subtags are only checked for shape.
/// Language code type
#[derive(Debug, PartialEq, Eq)]
pub enum LanguageCodeType {
    /// ISO 639-1 (2-letter) code
    Part1,
    /// ISO 639-2/T (3-letter) code
    Part2T,
    /// ISO 639-2/B (3-letter) code
    Part2B,
}

// @const: ISO 639-2/B codes that differ from their 639-2/T form
const PART2B_TO_PART2T: [(&str, &str); 18] = [
    ("fre", "fra"),
    ("ger", "deu"),
    ("dut", "nld"),
    ("gre", "ell"),
    ("chi", "zho"),
    ("cze", "ces"),
    ("ice", "isl"),
    ("alb", "sqi"),
    ("arm", "hye"),
    ("baq", "eus"),
    ("bur", "mya"),
    ("per", "fas"),
    ("geo", "kat"),
    ("may", "msa"),
    ("mac", "mkd"),
    ("rum", "ron"),
    ("slo", "slk"),
    ("wel", "cym"),
];

fn part2b_to_part2t(code: &str) -> Option<&'static str> {
    PART2B_TO_PART2T
        .iter()
        .find(|(b, _)| *b == code)
        .map(|(_, t)| *t)
}

/// Split a tag like `zh-CN` or `pt_BR` into its language and region subtags
pub fn split_language_tag(tag: &str) -> (String, Option<String>) {
    let mut parts = tag.trim().splitn(2, ['-', '_']);
    let language = parts.next().unwrap_or_default().to_lowercase();
    let region = parts.next().map(|r| r.to_string()).filter(|r| !r.is_empty());
    (language, region)
}

/// Validate if a language code is a valid ISO 639-1 or ISO 639-2 code
pub fn validate_language_code(code: &str) -> Result<LanguageCodeType> {
    let normalized_code = code.trim().to_lowercase();

    if normalized_code.len() == 2 && Language::from_639_1(&normalized_code).is_some() {
        return Ok(LanguageCodeType::Part1);
    }

    if normalized_code.len() == 3 {
        if Language::from_639_3(&normalized_code).is_some() {
            return Ok(LanguageCodeType::Part2T);
        }
        if part2b_to_part2t(&normalized_code).is_some() {
            return Ok(LanguageCodeType::Part2B);
        }
    }

    Err(anyhow!("Invalid language code: {}", code))
}

/// Validate a language tag with an optional region subtag
pub fn validate_language_tag(tag: &str) -> Result<()> {
    let (language, region) = split_language_tag(tag);
    validate_language_code(&language)
        .map_err(|_| anyhow!("Invalid language tag: {:?}", tag))?;

    if let Some(region) = region {
        let well_formed = (region.len() == 2 && region.chars().all(|c| c.is_ascii_alphabetic()))
            || (region.len() == 3 && region.chars().all(|c| c.is_ascii_digit()))
            || ((4..=8).contains(&region.len()) && region.chars().all(|c| c.is_ascii_alphanumeric()));
        if !well_formed {
            return Err(anyhow!("Invalid region subtag in language tag: {:?}", tag));
        }
    }

    Ok(())
}

/// Normalize a language code to ISO 639-2/T (3-letter) format
pub fn normalize_to_part2t(code: &str) -> Result<String> {
    let (normalized_code, _) = split_language_tag(code);

    if normalized_code.len() == 2 {
        if let Some(lang) = Language::from_639_1(&normalized_code) {
            return Ok(lang.to_639_3().to_string());
        }
    } else if normalized_code.len() == 3 {
        if Language::from_639_3(&normalized_code).is_some() {
            return Ok(normalized_code);
        }
        if let Some(part2t) = part2b_to_part2t(&normalized_code) {
            return Ok(part2t.to_string());
        }
    }

    Err(anyhow!("Cannot normalize invalid language code: {}", code))
}

/// Get the language name from a code
pub fn get_language_name(code: &str) -> Result<String> {
    let normalized = normalize_to_part2t(code)?;
    let lang = Language::from_639_3(&normalized)
        .ok_or_else(|| anyhow!("Failed to get language from code: {}", normalized))?;

    Ok(lang.to_name().to_string())
}

/// Human-readable label for logs, e.g. "Chinese (zh-CN)"
pub fn language_label(tag: &str) -> String {
    match get_language_name(tag) {
        Ok(name) => format!("{} ({})", name, tag),
        Err(_) => tag.to_string(),
    }
}
