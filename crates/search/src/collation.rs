//! Korean-aware string ordering for display names.
//!
//! Ordering, from most to least significant:
//! 1. Leading whitespace is ignored.
//! 2. Characters are grouped: punctuation and symbols, digits, Hangul, Han,
//!    Latin, then any other script.
//! 3. Within a group, Latin letters compare case-insensitively and everything
//!    else by code point. Precomposed Hangul syllables are laid out in
//!    dictionary order, so code point order is the Korean order. A bare
//!    initial consonant (`ㄱ`, or conjoining `ᄀ`) sorts just before the
//!    syllables that start with it; other jamo follow all syllables.
//! 4. Lowercase sorts before uppercase.
//! 5. Anything still equal falls back to the raw strings.

use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Script {
    Symbol,
    Digit,
    Hangul,
    Han,
    Latin,
    Other,
}

fn script(c: char) -> Script {
    match c {
        '0'..='9' => Script::Digit,
        '\u{AC00}'..='\u{D7A3}' | '\u{1100}'..='\u{11FF}' | '\u{3130}'..='\u{318F}' => {
            Script::Hangul
        }
        '\u{3400}'..='\u{4DBF}' | '\u{4E00}'..='\u{9FFF}' | '\u{F900}'..='\u{FAFF}' => Script::Han,
        'a'..='z' | 'A'..='Z' | '\u{00C0}'..='\u{024F}' if c.is_alphabetic() => Script::Latin,
        _ if c.is_numeric() => Script::Digit,
        _ if c.is_alphabetic() => Script::Other,
        _ => Script::Symbol,
    }
}

const SYLLABLE_BASE: u32 = 0xAC00;
const SYLLABLES_PER_INITIAL: u32 = 21 * 28;

/// Compatibility jamo for the 19 initial consonants, in syllable order.
const COMPAT_INITIALS: [char; 19] = [
    'ㄱ', 'ㄲ', 'ㄴ', 'ㄷ', 'ㄸ', 'ㄹ', 'ㅁ', 'ㅂ', 'ㅃ', 'ㅅ', 'ㅆ', 'ㅇ', 'ㅈ', 'ㅉ', 'ㅊ', 'ㅋ', 'ㅌ', 'ㅍ', 'ㅎ',
];

/// Sort key inside the Hangul group. Syllables get odd keys; a lone initial
/// gets the even key right below its first syllable.
fn hangul_key(c: char) -> u32 {
    let initial = match c {
        '\u{AC00}'..='\u{D7A3}' => return (c as u32 - SYLLABLE_BASE) * 2 + 1,
        '\u{1100}'..='\u{1112}' => Some(c as u32 - 0x1100),
        _ => COMPAT_INITIALS.iter().position(|&j| j == c).map(|i| i as u32),
    };
    match initial {
        Some(index) => index * SYLLABLES_PER_INITIAL * 2,
        None => 0x2_0000 + c as u32,
    }
}

fn primary(c: char) -> (Script, u32) {
    let script = script(c);
    let key = match script {
        Script::Latin => c.to_lowercase().next().unwrap_or(c) as u32,
        Script::Hangul => hangul_key(c),
        _ => c as u32,
    };
    (script, key)
}

/// Compares two display names in Korean collation order.
///
/// # Example
/// ```
/// use seoul_services_search::korean_cmp;
/// use std::cmp::Ordering;
///
/// assert_eq!(korean_cmp("가람도서관", "나래도서관"), Ordering::Less);
/// assert_eq!(korean_cmp("Zoo", "apple"), Ordering::Greater);
/// assert_eq!(korean_cmp("123", "가"), Ordering::Less);
/// ```
pub fn korean_cmp(a: &str, b: &str) -> Ordering {
    let (ta, tb) = (a.trim_start(), b.trim_start());

    ta.chars()
        .map(primary)
        .cmp(tb.chars().map(primary))
        .then_with(|| {
            ta.chars()
                .map(char::is_uppercase)
                .cmp(tb.chars().map(char::is_uppercase))
        })
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sorted(mut names: Vec<&str>) -> Vec<&str> {
        names.sort_by(|a, b| korean_cmp(a, b));
        names
    }

    #[test]
    fn test_hangul_dictionary_order() {
        assert_eq!(
            sorted(vec!["하늘도서관", "가람도서관", "마포중앙도서관", "강남도서관"]),
            vec!["가람도서관", "강남도서관", "마포중앙도서관", "하늘도서관"]
        );
    }

    #[test]
    fn test_bare_jamo_sorts_with_its_initial() {
        assert_eq!(
            sorted(vec!["나래", "ㅎ", "ㄴ", "가람", "ㅏ", "ᄂ", "하늘"]),
            vec!["가람", "ᄂ", "ㄴ", "나래", "ㅎ", "하늘", "ㅏ"]
        );
    }

    #[test]
    fn test_script_groups() {
        assert_eq!(
            sorted(vec!["Seoul Museum", "서울도서관", "2025 축제", "(재)문화재단", "國立"]),
            vec!["(재)문화재단", "2025 축제", "서울도서관", "國立", "Seoul Museum"]
        );
    }

    #[test]
    fn test_latin_case_handling() {
        assert_eq!(sorted(vec!["beta", "Alpha", "alpha"]), vec!["alpha", "Alpha", "beta"]);
    }

    #[test]
    fn test_leading_whitespace_ignored() {
        assert_eq!(korean_cmp("  가", "나"), Ordering::Less);
        assert_ne!(korean_cmp(" 가", "가"), Ordering::Equal);
    }

    #[test]
    fn test_prefix_first() {
        assert_eq!(korean_cmp("서울", "서울도서관"), Ordering::Less);
    }

    proptest! {
        #[test]
        fn prop_antisymmetric(a in "\\PC{0,8}", b in "\\PC{0,8}") {
            prop_assert_eq!(korean_cmp(&a, &b), korean_cmp(&b, &a).reverse());
        }

        #[test]
        fn prop_equal_only_when_identical(a in "\\PC{0,8}", b in "\\PC{0,8}") {
            prop_assert_eq!(korean_cmp(&a, &b) == Ordering::Equal, a == b);
        }
    }
}
