//! Sampling-based regex-subset and trivial-pattern detection.
//!
//! Builds on `regex-syntax`'s HIR (the same crate `regex` itself compiles through) to
//! enumerate witness strings for a pattern, rather than doing ad hoc string surgery.
use regex_syntax::hir::{Hir, HirKind, Literal, RepetitionKind, RepetitionRange};
use regex_syntax::Parser;

/// How many witness strings we try to generate per pattern before giving up.
const SAMPLE_SIZE: usize = 200;
/// Repetitions with an upper bound above this are treated as unbounded for sampling purposes.
const MAX_BOUNDED_REPETITION: u32 = 8;

/// `true` if `pattern` matches essentially every string (`.*`, `.+` and anchored/grouped
/// variants of those, or the empty pattern).
pub(crate) fn is_trivial_pattern(pattern: &str) -> bool {
    let trimmed = pattern.trim_start_matches('^').trim_end_matches('$');
    let trimmed = strip_wrapping_group(trimmed);
    matches!(trimmed, "" | ".*" | ".+")
}

fn strip_wrapping_group(pattern: &str) -> &str {
    if pattern.starts_with("(?:") && pattern.ends_with(')') && pattern.len() > 4 {
        &pattern[3..pattern.len() - 1]
    } else if pattern.starts_with('(') && pattern.ends_with(')') && pattern.len() > 2 {
        &pattern[1..pattern.len() - 1]
    } else {
        pattern
    }
}

/// `true` iff every string matching `p` also matches `q`, decided by sampling witnesses of
/// `p` and testing them against `q`. Invalid regexes or an empty witness set are treated
/// conservatively as "unknown" and reported as *not* a subset.
pub(crate) fn is_pattern_subset(p: &str, q: &str) -> bool {
    if p == q || is_trivial_pattern(q) {
        return true;
    }
    let q_re = match regex::Regex::new(q) {
        Ok(re) => re,
        Err(_) => return false,
    };
    let witnesses = match sample_witnesses(p) {
        Some(witnesses) if !witnesses.is_empty() => witnesses,
        _ => return false,
    };
    witnesses.iter().all(|witness| q_re.is_match(witness))
}

/// `isPatternSubset(p, q) ∧ isPatternSubset(q, p)`.
pub(crate) fn are_patterns_equivalent(p: &str, q: &str) -> bool {
    is_pattern_subset(p, q) && is_pattern_subset(q, p)
}

/// Enumerate up to `SAMPLE_SIZE` witness strings matched by `pattern`, or `None` when the
/// pattern fails to parse or contains a construct we decline to expand exhaustively
/// (unbounded repetition, look-around).
fn sample_witnesses(pattern: &str) -> Option<Vec<String>> {
    let hir = Parser::new().parse(pattern).ok()?;
    let mut witnesses = vec![String::new()];
    expand(&hir, &mut witnesses)?;
    witnesses.truncate(SAMPLE_SIZE);
    Some(witnesses)
}

/// Expand `hir` onto every prefix already present in `witnesses`, in place.
/// Returns `None` when the HIR contains a shape we refuse to enumerate.
fn expand(hir: &Hir, witnesses: &mut Vec<String>) -> Option<()> {
    match hir.kind() {
        HirKind::Empty => Some(()),
        HirKind::Literal(literal) => {
            let text = literal_to_string(literal)?;
            for witness in witnesses.iter_mut() {
                witness.push_str(&text);
            }
            Some(())
        }
        HirKind::Class(class) => {
            let mut ranges = Vec::new();
            if let regex_syntax::hir::Class::Unicode(unicode) = class {
                for range in unicode.iter().take(4) {
                    ranges.push(range.start());
                }
            } else if let regex_syntax::hir::Class::Bytes(bytes) = class {
                for range in bytes.iter().take(4) {
                    ranges.push(range.start() as char);
                }
            }
            if ranges.is_empty() {
                return None;
            }
            let mut expanded = Vec::with_capacity(witnesses.len() * ranges.len());
            for witness in witnesses.iter() {
                for ch in &ranges {
                    let mut next = witness.clone();
                    next.push(*ch);
                    expanded.push(next);
                    if expanded.len() >= SAMPLE_SIZE {
                        break;
                    }
                }
            }
            *witnesses = expanded;
            Some(())
        }
        HirKind::Concat(parts) => {
            for part in parts {
                expand(part, witnesses)?;
            }
            Some(())
        }
        HirKind::Alternation(branches) => {
            let base = witnesses.clone();
            let mut expanded = Vec::new();
            for branch in branches {
                let mut branch_witnesses = base.clone();
                expand(branch, &mut branch_witnesses)?;
                expanded.extend(branch_witnesses);
                if expanded.len() >= SAMPLE_SIZE {
                    break;
                }
            }
            *witnesses = expanded;
            Some(())
        }
        HirKind::Repetition(repetition) => {
            let (min, max) = match repetition.kind {
                RepetitionKind::ZeroOrOne => (0, Some(1)),
                RepetitionKind::ZeroOrMore => (0, None),
                RepetitionKind::OneOrMore => (1, None),
                RepetitionKind::Range(RepetitionRange::Exactly(n)) => (n, Some(n)),
                RepetitionKind::Range(RepetitionRange::AtLeast(n)) => (n, None),
                RepetitionKind::Range(RepetitionRange::Bounded(a, b)) => (a, Some(b)),
            };
            match max {
                Some(max) if max <= MAX_BOUNDED_REPETITION => {
                    // Expand the minimal accepted repetition count: every witness of `pattern`
                    // must still match, and the minimal count is always a valid witness.
                    for _ in 0..min {
                        expand(&repetition.hir, witnesses)?;
                    }
                    Some(())
                }
                _ => None,
            }
        }
        HirKind::Group(group) => expand(&group.hir, witnesses),
        HirKind::Anchor(_) | HirKind::WordBoundary(_) => Some(()),
    }
}

fn literal_to_string(literal: &Literal) -> Option<String> {
    match literal {
        Literal::Unicode(ch) => Some(ch.to_string()),
        Literal::Byte(byte) if byte.is_ascii() => Some((*byte as char).to_string()),
        Literal::Byte(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{are_patterns_equivalent, is_pattern_subset, is_trivial_pattern};
    use test_case::test_case;

    #[test_case(".*" => true)]
    #[test_case(".+" => true)]
    #[test_case("^.*$" => true)]
    #[test_case("" => true)]
    #[test_case("(?:.*)" => true)]
    #[test_case("abc" => false)]
    fn test_is_trivial_pattern(pattern: &str) -> bool {
        is_trivial_pattern(pattern)
    }

    #[test_case("^[0-9]+$", "^[0-9]+$" => true)]
    #[test_case("^[0-9]+$", ".*" => true)]
    #[test_case("abc", "a.c" => true)]
    #[test_case("a.c", "abc" => false)]
    fn test_is_pattern_subset(p: &str, q: &str) -> bool {
        is_pattern_subset(p, q)
    }

    #[test_case("abc", "abc" => true)]
    #[test_case("abc", "a.c" => false)]
    fn test_are_patterns_equivalent(p: &str, q: &str) -> bool {
        are_patterns_equivalent(p, q)
    }
}
