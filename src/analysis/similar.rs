//! Similar-name search
//!
//! Scores are the matching-blocks ratio of `difflib.SequenceMatcher`, with
//! the same candidate ordering as `difflib.get_close_matches`.

use std::collections::HashMap;

/// `2 * matches / (len(a) + len(b))`
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let b2j = index_chars(&b);
    ratio_indexed(&a, &b, &b2j)
}

fn index_chars(b: &[char]) -> HashMap<char, Vec<usize>> {
    let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, c) in b.iter().enumerate() {
        b2j.entry(*c).or_default().push(j);
    }
    b2j
}

fn ratio_indexed(a: &[char], b: &[char], b2j: &HashMap<char, Vec<usize>>) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(a, b, b2j) as f64 / total as f64
}

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]`, earliest in `a`
/// on ties, as `(i, j, size)`.
fn find_longest_match(
    a: &[char],
    b2j: &HashMap<char, Vec<usize>>,
    (alo, ahi): (usize, usize),
    (blo, bhi): (usize, usize),
) -> (usize, usize, usize) {
    let mut best = (alo, blo, 0);
    let mut j2len: HashMap<usize, usize> = HashMap::new();
    for (i, c) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut next: HashMap<usize, usize> = HashMap::new();
        if let Some(positions) = b2j.get(c) {
            for &j in positions {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let k = j.checked_sub(1).and_then(|p| j2len.get(&p)).copied().unwrap_or(0) + 1;
                next.insert(j, k);
                if k > best.2 {
                    best = (i + 1 - k, j + 1 - k, k);
                }
            }
        }
        j2len = next;
    }
    best
}

fn matching_chars(a: &[char], b: &[char], b2j: &HashMap<char, Vec<usize>>) -> usize {
    let mut queue = vec![(0, a.len(), 0, b.len())];
    let mut matched = 0;
    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, k) = find_longest_match(a, b2j, (alo, ahi), (blo, bhi));
        if k == 0 {
            continue;
        }
        matched += k;
        if alo < i && blo < j {
            queue.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            queue.push((i + k, ahi, j + k, bhi));
        }
    }
    matched
}

/// Up to `n` of `possibilities` scoring at least `cutoff` against `word`,
/// best first. Equal scores are ordered by reverse string order.
pub fn get_close_matches<S: AsRef<str>>(word: &str, possibilities: &[S], n: usize, cutoff: f64) -> Vec<String> {
    if n == 0 {
        return Vec::new();
    }
    let b: Vec<char> = word.chars().collect();
    let b2j = index_chars(&b);
    let mut scored: Vec<(f64, &str)> = possibilities
        .iter()
        .filter_map(|candidate| {
            let candidate = candidate.as_ref();
            let a: Vec<char> = candidate.chars().collect();
            let score = ratio_indexed(&a, &b, &b2j);
            (score >= cutoff).then_some((score, candidate))
        })
        .collect();
    scored.sort_by(|x, y| y.0.total_cmp(&x.0).then_with(|| y.1.cmp(x.1)));
    scored.into_iter().take(n).map(|(_, word)| word.to_string()).collect()
}

/// Candidate corrections for `word` among `words`.
///
/// Single-character names are never matched. The cutoff grows with the
/// length of the word; failing a direct match, the lower and upper case
/// forms are tried, then two-letter words get a looser search restricted to
/// short candidates.
pub fn get_similar_words<S: AsRef<str>>(word: &str, words: &[S]) -> Vec<String> {
    let length = word.chars().count();
    if length == 1 {
        return Vec::new();
    }
    let words: Vec<&str> = words
        .iter()
        .map(AsRef::as_ref)
        .filter(|w| w.chars().count() > 1)
        .collect();

    let cutoff = (0.63 + 0.01 * length as f64).min(0.8);
    if length > 2 {
        let result = get_close_matches(word, &words, 5, cutoff);
        if !result.is_empty() {
            return result;
        }
    }
    let result = get_close_matches(&word.to_lowercase(), &words, 1, cutoff);
    if !result.is_empty() {
        return result;
    }
    let result = get_close_matches(&word.to_uppercase(), &words, 1, cutoff);
    if !result.is_empty() {
        return result;
    }

    if length == 2 {
        let short: Vec<&str> = words.into_iter().filter(|w| w.chars().count() <= 3).collect();
        return get_close_matches(word, &short, 5, 0.5);
    }
    Vec::new()
}

/// `['a', 'b']` → `a, b`, dropping quotes.
pub fn list_to_string<S: AsRef<str>>(items: &[S], sep: &str) -> String {
    items
        .iter()
        .map(|item| item.as_ref().replace('\'', ""))
        .collect::<Vec<_>>()
        .join(sep)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio() {
        assert_eq!(ratio("abcd", "abcd"), 1.0);
        assert_eq!(ratio("", ""), 1.0);
        assert_eq!(ratio("abcd", "bcde"), 0.75);
        assert_eq!(ratio("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_close_matches_like_difflib() {
        let words = ["ape", "apple", "peach", "puppy"];
        assert_eq!(get_close_matches("appel", &words, 3, 0.6), vec!["apple", "ape"]);
    }

    #[test]
    fn test_similar_words() {
        let words = ["cos", "cosh", "acos", "acosh"];
        assert_eq!(get_similar_words("cost", &words), vec!["cos", "cosh", "acos"]);
        assert_eq!(get_similar_words("foo", &["foo2", "bar"]), vec!["foo2"]);
        assert!(get_similar_words("x", &["xx", "x"]).is_empty());
    }

    #[test]
    fn test_case_fallback() {
        assert_eq!(get_similar_words("Pi", &["pi", "tau"]), vec!["pi"]);
    }

    #[test]
    fn test_two_letters() {
        assert_eq!(get_similar_words("it", &["if", "in", "while"]), vec!["in", "if"]);
    }

    #[test]
    fn test_list_to_string() {
        assert_eq!(list_to_string(&["'a'", "b"], ", "), "a, b");
    }
}
