//! Text cleanup shared by the platform feeds: display-count parsing and
//! feed-boilerplate filtering.

use std::sync::OnceLock;

use regex::Regex;

use snscrawl_common::MAX_CONTENT_CHARS;

/// Button/header labels that are never post content, regardless of
/// platform. Matched against whole lines only, so a post that merely
/// mentions "share" survives.
pub const COMMON_BOILERPLATE: &[&str] = &[
    "Like",
    "Comment",
    "Reply",
    "Repost",
    "Share",
    "More",
    "Translate",
    "Follow",
    "Following",
    "For you",
];

fn time_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // "3h", "12m", "2w" and Korean relative forms like "3시간 전"
    RE.get_or_init(|| Regex::new(r"^\d+[smhdw]$|^\d+\s?(시간|분|일|주)").expect("valid regex"))
}

fn count_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+(\.\d+)?[KMB]?$").expect("valid regex"))
}

/// Parse a display count like "7", "2,431", "1.2K", "3M". Returns None when
/// there is no digit at all.
pub fn parse_count(text: &str) -> Option<i64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let plain: String = text.chars().filter(|c| *c != ',').collect();
    if plain.chars().all(|c| c.is_ascii_digit()) && !plain.is_empty() {
        return plain.parse().ok();
    }

    let (number, multiplier) = match plain.chars().last() {
        Some('K') | Some('k') => (&plain[..plain.len() - 1], 1_000f64),
        Some('M') | Some('m') => (&plain[..plain.len() - 1], 1_000_000f64),
        Some('B') | Some('b') => (&plain[..plain.len() - 1], 1_000_000_000f64),
        _ => ("", 0f64),
    };
    if !number.is_empty() {
        if let Ok(value) = number.parse::<f64>() {
            return Some((value * multiplier) as i64);
        }
    }

    // Fall back to the first digit run anywhere in the text ("1,024 reactions")
    let digits: String = text
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit() || *c == ',')
        .filter(|c| *c != ',')
        .collect();
    digits.parse().ok()
}

/// A parsed count, with zero treated as unknown. Feeds report 0 both for
/// "no interactions" and "count not rendered"; the original data model keeps
/// those as absent.
pub fn parse_count_nonzero(text: Option<&str>) -> Option<i64> {
    parse_count(text?).filter(|n| *n > 0)
}

/// Strip feed boilerplate from a block of innerText: drops short lines,
/// digit-only lines, relative-time lines, count lines, lines that ARE a
/// button label (exact match against [`COMMON_BOILERPLATE`]), and lines
/// CONTAINING any of the platform's `skip_keywords`. Then collapses
/// whitespace and caps the length.
pub fn clean_content(content: &str, skip_keywords: &[&str]) -> String {
    let mut kept: Vec<&str> = Vec::new();

    for line in content.lines() {
        let line = line.trim();
        if line.len() <= 5 {
            continue;
        }
        if line.chars().all(|c| c.is_ascii_digit()) {
            continue;
        }
        if time_pattern().is_match(line) || count_pattern().is_match(line) {
            continue;
        }
        if COMMON_BOILERPLATE
            .iter()
            .any(|label| line.eq_ignore_ascii_case(label))
        {
            continue;
        }
        let lowered = line.to_lowercase();
        if skip_keywords
            .iter()
            .any(|kw| lowered.contains(&kw.to_lowercase()))
        {
            continue;
        }
        kept.push(line);
    }

    let joined = kept.join(" ");
    let collapsed = joined.split_whitespace().collect::<Vec<_>>().join(" ");
    cap_chars(&collapsed, MAX_CONTENT_CHARS)
}

/// Char-boundary-safe prefix.
pub fn cap_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Resolve a possibly-relative href against a platform origin.
pub fn absolutize(href: &str, base: &str) -> Option<String> {
    if href.starts_with("http://") || href.starts_with("https://") {
        return Some(href.to_string());
    }
    let base = url::Url::parse(base).ok()?;
    base.join(href).ok().map(|u| u.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_count_plain_digits() {
        assert_eq!(parse_count("7"), Some(7));
        assert_eq!(parse_count("2,431"), Some(2431));
    }

    #[test]
    fn test_parse_count_suffixes() {
        assert_eq!(parse_count("1.2K"), Some(1200));
        assert_eq!(parse_count("3M"), Some(3_000_000));
        assert_eq!(parse_count("2B"), Some(2_000_000_000));
    }

    #[test]
    fn test_parse_count_embedded() {
        assert_eq!(parse_count("1,024 reactions"), Some(1024));
        assert_eq!(parse_count("likes: 15"), Some(15));
    }

    #[test]
    fn test_parse_count_no_digits() {
        assert_eq!(parse_count("Like"), None);
        assert_eq!(parse_count(""), None);
    }

    #[test]
    fn test_parse_count_nonzero_drops_zero() {
        assert_eq!(parse_count_nonzero(Some("0")), None);
        assert_eq!(parse_count_nonzero(Some("5")), Some(5));
        assert_eq!(parse_count_nonzero(None), None);
    }

    #[test]
    fn test_clean_content_filters_boilerplate() {
        let raw = "3h\nThe actual post body goes here\n1.2K\nComment\nTranslate";
        let cleaned = clean_content(raw, &[]);
        assert_eq!(cleaned, "The actual post body goes here");
    }

    #[test]
    fn test_clean_content_keeps_lines_mentioning_button_words() {
        let raw = "Please like and share this with your followers";
        assert_eq!(clean_content(raw, &[]), raw);
    }

    #[test]
    fn test_clean_content_skip_keywords_match_substrings() {
        let raw = "A genuine post line\n500+ connection requests";
        assert_eq!(clean_content(raw, &["connection"]), "A genuine post line");
    }

    #[test]
    fn test_clean_content_caps_length() {
        let long = "x".repeat(2000);
        let cleaned = clean_content(&long, &[]);
        assert_eq!(cleaned.chars().count(), MAX_CONTENT_CHARS);
    }

    #[test]
    fn test_clean_content_multibyte_safe() {
        let korean = "요즘 러스트로 크롤러를 다시 쓰고 있는데 생각보다 재밌습니다 ".repeat(40);
        let cleaned = clean_content(&korean, &[]);
        assert!(cleaned.chars().count() <= MAX_CONTENT_CHARS);
    }

    #[test]
    fn test_absolutize() {
        assert_eq!(
            absolutize("/topic/12345", "https://news.hada.io").as_deref(),
            Some("https://news.hada.io/topic/12345")
        );
        assert_eq!(
            absolutize("https://x.com/a/status/1", "https://x.com").as_deref(),
            Some("https://x.com/a/status/1")
        );
    }
}
