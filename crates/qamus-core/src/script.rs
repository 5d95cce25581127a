//! Query script detection.
//!
//! Ranking depends on which script the user typed: Arabic queries are
//! ranked against the normalized lemma, everything else against the
//! English gloss.

/// First code point of the Arabic Unicode block.
pub const ARABIC_BLOCK_START: char = '\u{0600}';
/// Last code point of the Arabic Unicode block.
pub const ARABIC_BLOCK_END: char = '\u{06FF}';

/// Script family of a search query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Script {
    Arabic,
    Latin,
}

impl Script {
    /// Arabic if any character falls in U+0600..=U+06FF, Latin otherwise.
    pub fn detect(query: &str) -> Script {
        if query.chars().any(is_arabic) {
            Script::Arabic
        } else {
            Script::Latin
        }
    }
}

/// True for characters in the Arabic Unicode block.
pub fn is_arabic(c: char) -> bool {
    (ARABIC_BLOCK_START..=ARABIC_BLOCK_END).contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn detects_plain_scripts() {
        assert_eq!(Script::detect("house"), Script::Latin);
        assert_eq!(Script::detect("بيت"), Script::Arabic);
        assert_eq!(Script::detect(""), Script::Latin);
    }

    #[test]
    fn mixed_query_is_arabic() {
        assert_eq!(Script::detect("the بيت"), Script::Arabic);
    }

    #[test]
    fn block_edges_are_inclusive() {
        assert!(is_arabic('\u{0600}'));
        assert!(is_arabic('\u{06FF}'));
        assert!(!is_arabic('\u{05FF}'));
        assert!(!is_arabic('\u{0700}'));
    }

    proptest! {
        #[test]
        fn ascii_is_never_arabic(s in "[ -~]*") {
            prop_assert_eq!(Script::detect(&s), Script::Latin);
        }

        #[test]
        fn any_arabic_char_wins(
            prefix in "[a-z ]{0,8}",
            c in proptest::char::range('\u{0600}', '\u{06FF}'),
            suffix in "[a-z ]{0,8}",
        ) {
            let query = format!("{prefix}{c}{suffix}");
            prop_assert_eq!(Script::detect(&query), Script::Arabic);
        }
    }
}
