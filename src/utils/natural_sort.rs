//! Natural ("human") ordering of channel names
//!
//! A name is split into alternating text and ASCII digit runs. Text runs
//! compare case-insensitively, digit runs compare by numeric value without
//! any integer conversion, so arbitrarily long runs never overflow. Every key
//! starts and ends with a text run (possibly empty), which keeps text and
//! number runs at fixed positions.

use std::cmp::Ordering;

/// A run of ASCII digits compared by numeric value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NumericRun {
    /// Digits with leading zeros removed; empty means zero
    significant: String,
}

impl NumericRun {
    fn new(digits: &str) -> Self {
        Self {
            significant: digits.trim_start_matches('0').to_string(),
        }
    }
}

impl Ord for NumericRun {
    fn cmp(&self, other: &Self) -> Ordering {
        self.significant
            .len()
            .cmp(&other.significant.len())
            .then_with(|| self.significant.cmp(&other.significant))
    }
}

impl PartialOrd for NumericRun {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NaturalSegment {
    Text(String),
    Number(NumericRun),
}

/// Sort key produced by [`natural_sort_key`]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NaturalKey(Vec<NaturalSegment>);

impl NaturalKey {
    pub fn segments(&self) -> &[NaturalSegment] {
        &self.0
    }
}

/// Build the natural sort key for a name
pub fn natural_sort_key(name: &str) -> NaturalKey {
    let mut segments = Vec::new();
    let mut text = String::new();
    let mut chars = name.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        if c.is_ascii_digit() {
            let mut end = start + c.len_utf8();
            while let Some(&(idx, next)) = chars.peek() {
                if !next.is_ascii_digit() {
                    break;
                }
                end = idx + next.len_utf8();
                chars.next();
            }
            segments.push(NaturalSegment::Text(std::mem::take(&mut text).to_lowercase()));
            segments.push(NaturalSegment::Number(NumericRun::new(&name[start..end])));
        } else {
            text.push(c);
        }
    }
    segments.push(NaturalSegment::Text(text.to_lowercase()));

    NaturalKey(segments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn natural_cmp(a: &str, b: &str) -> Ordering {
        natural_sort_key(a).cmp(&natural_sort_key(b))
    }

    fn sorted(names: &[&str]) -> Vec<String> {
        let mut names: Vec<String> = names.iter().map(|s| s.to_string()).collect();
        names.sort_by_cached_key(|name| natural_sort_key(name));
        names
    }

    #[test]
    fn test_numbers_sort_by_value() {
        assert_eq!(
            sorted(&["Channel 10", "Channel 2", "channel 1"]),
            vec!["channel 1", "Channel 2", "Channel 10"]
        );
    }

    #[test]
    fn test_key_alternates_text_and_numbers() {
        let key = natural_sort_key("BBC 1 HD");
        assert_eq!(
            key.segments(),
            &[
                NaturalSegment::Text("bbc ".to_string()),
                NaturalSegment::Number(NumericRun::new("1")),
                NaturalSegment::Text(" hd".to_string()),
            ]
        );

        let key = natural_sort_key("24");
        assert_eq!(key.segments().len(), 3);
        assert_eq!(key.segments()[0], NaturalSegment::Text(String::new()));
    }

    #[rstest]
    #[case("a2", "a10", Ordering::Less)]
    #[case("a02", "a2", Ordering::Equal)]
    #[case("News", "news", Ordering::Equal)]
    #[case("", "a", Ordering::Less)]
    #[case("a", "a1", Ordering::Less)]
    #[case("9", "a", Ordering::Less)]
    #[case("x99999999999999999999999999", "x100000000000000000000000000", Ordering::Less)]
    fn test_natural_cmp(#[case] a: &str, #[case] b: &str, #[case] expected: Ordering) {
        assert_eq!(natural_cmp(a, b), expected);
    }

    #[test]
    fn test_non_ascii_digits_are_text() {
        // Arabic-Indic digits stay part of the text run
        let key = natural_sort_key("قناة ٣");
        assert_eq!(key.segments().len(), 1);
    }

    proptest! {
        #[test]
        fn prop_numeric_suffix_orders_by_value(prefix in "[a-zA-Z ]{0,8}", a in 0u64..1_000_000, b in 0u64..1_000_000) {
            let left = format!("{prefix}{a}");
            let right = format!("{prefix}{b}");
            prop_assert_eq!(natural_cmp(&left, &right), a.cmp(&b));
        }

        #[test]
        fn prop_ordering_is_antisymmetric(a in "[a-c0-9 ]{0,10}", b in "[a-c0-9 ]{0,10}") {
            prop_assert_eq!(natural_cmp(&a, &b), natural_cmp(&b, &a).reverse());
        }

        #[test]
        fn prop_leading_zeros_do_not_matter(n in 0u64..100_000, zeros in 0usize..5) {
            let padded = format!("ch{}{}", "0".repeat(zeros), n);
            prop_assert_eq!(natural_cmp(&padded, &format!("ch{n}")), Ordering::Equal);
        }
    }
}
