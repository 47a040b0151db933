//! Natural ordering for version-like strings.
//!
//! Strings are split into runs of ASCII digits and runs of everything else.
//! Digit runs compare by numeric value, other runs compare lexically, so
//! `item2` sorts before `item10`. Ties between numerically equal runs
//! (`01` and `1`) fall back to a plain comparison of the whole strings,
//! keeping the ordering total.

use std::cmp::Ordering;

/// Compare two strings in natural order.
pub fn compare(a: &str, b: &str) -> Ordering {
    let mut left = Chunks::new(a);
    let mut right = Chunks::new(b);

    loop {
        match (left.next(), right.next()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                let ordering = compare_chunks(x, y);
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
        }
    }
}

fn compare_chunks(x: &str, y: &str) -> Ordering {
    if is_digit_run(x) && is_digit_run(y) {
        let x = x.trim_start_matches('0');
        let y = y.trim_start_matches('0');
        x.len().cmp(&y.len()).then_with(|| x.cmp(y))
    } else {
        x.cmp(y)
    }
}

fn is_digit_run(chunk: &str) -> bool {
    chunk.as_bytes().first().is_some_and(u8::is_ascii_digit)
}

/// Iterator over alternating digit and non-digit runs
struct Chunks<'a> {
    rest: &'a str,
}

impl<'a> Chunks<'a> {
    fn new(s: &'a str) -> Self {
        Self { rest: s }
    }
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let first = self.rest.chars().next()?;
        let digits = first.is_ascii_digit();
        let end = self
            .rest
            .char_indices()
            .find(|(_, c)| c.is_ascii_digit() != digits)
            .map(|(idx, _)| idx)
            .unwrap_or(self.rest.len());

        let (chunk, rest) = self.rest.split_at(end);
        self.rest = rest;
        Some(chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_compare_by_value() {
        assert_eq!(compare("item2", "item10"), Ordering::Less);
        assert_eq!(compare("item10", "item2"), Ordering::Greater);
        assert_eq!(compare("1.9.0", "1.10.0"), Ordering::Less);
        assert_eq!(compare("app-1.2.3", "app-1.2.3"), Ordering::Equal);
    }

    #[test]
    fn test_text_and_prefixes() {
        assert_eq!(compare("alpha", "beta"), Ordering::Less);
        assert_eq!(compare("app", "app-1"), Ordering::Less);
        assert_eq!(compare("", "a"), Ordering::Less);
        assert_eq!(compare("1.0", "1.0-SNAPSHOT"), Ordering::Less);
    }

    #[test]
    fn test_leading_zeros_stay_total() {
        assert_eq!(compare("v01", "v1"), Ordering::Less);
        assert_eq!(compare("v1", "v01"), Ordering::Greater);
        assert_eq!(compare("v007", "v8"), Ordering::Less);
    }

    #[test]
    fn test_sorts_mixed_list() {
        let mut items = vec!["item10", "item1", "item2", "item02b", "itemA"];
        items.sort_by(|a, b| compare(a, b));
        assert_eq!(items, vec!["item1", "item2", "item02b", "item10", "itemA"]);
    }

    #[test]
    fn test_huge_numbers_do_not_overflow() {
        assert_eq!(
            compare("build-99999999999999999999999", "build-100000000000000000000000"),
            Ordering::Less
        );
    }
}
