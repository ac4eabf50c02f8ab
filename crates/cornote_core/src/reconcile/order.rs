//! Natural ordering for footnote refs.

use std::cmp::Ordering;

/// Compares two refs treating digit runs as numbers, so `c2` sorts before
/// `c10`. Ties on equal numeric value fall back to the shorter run (fewer
/// leading zeros) first, then byte order.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut left = a.as_bytes();
    let mut right = b.as_bytes();

    loop {
        match (left.first(), right.first()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(&l), Some(&r)) => {
                if l.is_ascii_digit() && r.is_ascii_digit() {
                    let (l_run, l_rest) = split_digit_run(left);
                    let (r_run, r_rest) = split_digit_run(right);
                    let by_value = compare_digit_runs(l_run, r_run);
                    if by_value != Ordering::Equal {
                        return by_value;
                    }
                    left = l_rest;
                    right = r_rest;
                } else {
                    if l != r {
                        return l.cmp(&r);
                    }
                    left = &left[1..];
                    right = &right[1..];
                }
            }
        }
    }
}

fn split_digit_run(bytes: &[u8]) -> (&[u8], &[u8]) {
    let len = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
    bytes.split_at(len)
}

fn compare_digit_runs(a: &[u8], b: &[u8]) -> Ordering {
    let a_trimmed = trim_leading_zeros(a);
    let b_trimmed = trim_leading_zeros(b);
    a_trimmed
        .len()
        .cmp(&b_trimmed.len())
        .then_with(|| a_trimmed.cmp(b_trimmed))
        .then_with(|| a.len().cmp(&b.len()))
}

fn trim_leading_zeros(bytes: &[u8]) -> &[u8] {
    let zeros = bytes.iter().take_while(|b| **b == b'0').count();
    // Keep one digit for an all-zero run.
    &bytes[zeros.min(bytes.len().saturating_sub(1))..]
}

#[cfg(test)]
mod tests {
    use super::natural_cmp;
    use std::cmp::Ordering;

    #[test]
    fn numeric_runs_compare_by_value() {
        assert_eq!(natural_cmp("c2", "c10"), Ordering::Less);
        assert_eq!(natural_cmp("10", "9"), Ordering::Greater);
        assert_eq!(natural_cmp("a1b2", "a1b10"), Ordering::Less);
    }

    #[test]
    fn plain_text_compares_bytewise() {
        assert_eq!(natural_cmp("alpha", "beta"), Ordering::Less);
        assert_eq!(natural_cmp("same", "same"), Ordering::Equal);
    }

    #[test]
    fn leading_zeros_break_value_ties() {
        assert_eq!(natural_cmp("c01", "c1"), Ordering::Greater);
        assert_eq!(natural_cmp("c001", "c01"), Ordering::Greater);
        assert_eq!(natural_cmp("0", "0"), Ordering::Equal);
    }

    #[test]
    fn sorting_a_mixed_set_is_stable_and_human_friendly() {
        let mut refs = vec!["c10", "c2", "note", "c1", "9"];
        refs.sort_by(|a, b| natural_cmp(a, b));
        assert_eq!(refs, ["9", "c1", "c2", "c10", "note"]);
    }
}
