/// Canonical Treasury phrasings, kept ahead of everything else when the
/// keyword list has to be truncated to the provider's cap.
const PRIORITY_TERMS: [&str; 6] = [
    "United States Treasury",
    "U.S. Treasury",
    "Treasury Department",
    "Treasury Secretary",
    "Federal Reserve",
    "IRS",
];

const DEFAULT_TERM: &str = "United States Treasury";

/// Turn a human-authored boolean-OR search expression into an ordered,
/// de-duplicated keyword list of at most `limit` terms.
///
/// Comma and pipe separators are folded into `OR`, connectives are matched
/// case-insensitively, surrounding quotes are stripped per term, and when
/// the list overflows the cap, priority terms win their slots first.
pub fn build_keywords(raw: &str, limit: usize) -> Vec<String> {
    let folded = raw.replace(',', " OR ").replace('|', " OR ");

    let mut terms: Vec<String> = Vec::new();
    let mut current: Vec<String> = Vec::new();
    for word in folded.split_whitespace() {
        if word.eq_ignore_ascii_case("or") {
            push_term(&mut terms, &current.join(" "));
            current.clear();
        } else if word.eq_ignore_ascii_case("and") || word.eq_ignore_ascii_case("not") {
            // Other connectives stay inside the term, normalized to uppercase.
            current.push(word.to_ascii_uppercase());
        } else {
            current.push(word.to_string());
        }
    }
    push_term(&mut terms, &current.join(" "));

    if terms.len() > limit {
        let mut selected: Vec<String> = Vec::new();
        for priority in PRIORITY_TERMS {
            if selected.len() == limit {
                break;
            }
            if terms.iter().any(|t| t == priority) {
                selected.push(priority.to_string());
            }
        }
        for term in &terms {
            if selected.len() == limit {
                break;
            }
            if !selected.contains(term) {
                selected.push(term.clone());
            }
        }
        terms = selected;
    }

    if terms.is_empty() {
        terms.push(DEFAULT_TERM.to_string());
    }

    terms
}

fn push_term(terms: &mut Vec<String>, raw: &str) {
    let term = strip_quotes(raw.trim());
    if !term.is_empty() && !terms.iter().any(|t| t == term) {
        terms.push(term.to_string());
    }
}

/// Strip one layer of matching single or double quotes.
fn strip_quotes(term: &str) -> &str {
    let bytes = term.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'"' && last == b'"') || (first == b'\'' && last == b'\'') {
            return term[1..term.len() - 1].trim();
        }
    }
    term
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_on_or_and_strips_quotes() {
        let terms = build_keywords(r#""U.S. Treasury" OR 'bond market' OR yields"#, 10);
        assert_eq!(terms, vec!["U.S. Treasury", "bond market", "yields"]);
    }

    #[test]
    fn test_folds_comma_and_pipe_separators() {
        let terms = build_keywords("treasury, bonds | yields", 10);
        assert_eq!(terms, vec!["treasury", "bonds", "yields"]);
    }

    #[test]
    fn test_mixed_case_connective() {
        let terms = build_keywords("treasury or bonds Or yields", 10);
        assert_eq!(terms, vec!["treasury", "bonds", "yields"]);
    }

    #[test]
    fn test_uppercases_embedded_connectives() {
        let terms = build_keywords("debt ceiling and default OR bonds not bills", 10);
        assert_eq!(terms, vec!["debt ceiling AND default", "bonds NOT bills"]);
    }

    #[test]
    fn test_dedupes_preserving_first_seen_order() {
        let terms = build_keywords("bonds OR treasury OR bonds", 10);
        assert_eq!(terms, vec!["bonds", "treasury"]);
    }

    #[test]
    fn test_priority_terms_survive_truncation() {
        let terms = build_keywords(r#"A OR B OR "United States Treasury" OR C"#, 2);
        assert_eq!(terms, vec!["United States Treasury", "A"]);
    }

    #[test]
    fn test_truncation_fills_from_original_order() {
        let terms = build_keywords(r#"A OR "Federal Reserve" OR B OR "IRS" OR C"#, 3);
        assert_eq!(terms, vec!["Federal Reserve", "IRS", "A"]);
    }

    #[test]
    fn test_output_never_exceeds_limit() {
        let terms = build_keywords("a OR b OR c OR d OR e OR f OR g", 4);
        assert_eq!(terms.len(), 4);
        assert_eq!(terms, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_empty_expression_yields_default_term() {
        assert_eq!(build_keywords("", 5), vec![DEFAULT_TERM]);
        assert_eq!(build_keywords("  OR  ", 5), vec![DEFAULT_TERM]);
    }

    #[test]
    fn test_drops_empty_quoted_terms() {
        let terms = build_keywords(r#""" OR treasury"#, 5);
        assert_eq!(terms, vec!["treasury"]);
    }
}
