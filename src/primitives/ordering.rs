//! Small ordering helpers shared by the parser, extractor and merge planner.
//!
//! These are thin compositions over `std::cmp::Ordering` and iterator adapters,
//! kept in one place so the merge code reads as a sequence of named steps.

use std::cmp::Ordering;

/// Build a comparator that orders values by a projected key.
///
/// Multi-key orders project to a tuple, which compares lexicographically.
pub fn cmp_by<T, K, F>(key: F) -> impl Fn(&T, &T) -> Ordering
where
    K: Ord,
    F: Fn(&T) -> K,
{
    move |l, r| key(l).cmp(&key(r))
}

/// Pair up two sequences, stopping as soon as either one runs out.
pub fn zip_shortest<L, R>(
    left: L,
    right: R,
) -> impl Iterator<Item = (L::Item, R::Item)>
where
    L: IntoIterator,
    R: IntoIterator,
{
    let mut right = right.into_iter();
    left.into_iter()
        .map_while(move |l| right.next().map(|r| (l, r)))
}

/// Split `items` into `(rejected, accepted)` by `predicate`, preserving order
/// within each half.
pub fn partition_by<T, F>(items: impl IntoIterator<Item = T>, predicate: F) -> (Vec<T>, Vec<T>)
where
    F: Fn(&T) -> bool,
{
    let mut rejected = Vec::new();
    let mut accepted = Vec::new();
    for item in items {
        if predicate(&item) {
            accepted.push(item);
        } else {
            rejected.push(item);
        }
    }
    (rejected, accepted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmp_by_projects_key() {
        let mut v = vec![(3, "c"), (1, "a"), (2, "b")];
        v.sort_by(cmp_by(|x: &(i32, &str)| x.0));
        assert_eq!(v, vec![(1, "a"), (2, "b"), (3, "c")]);
    }

    #[test]
    fn test_cmp_by_tuple_key_is_lexicographic() {
        let mut v = vec![(1, 1), (0, 5), (1, 3)];
        v.sort_by(cmp_by(|x: &(i32, i32)| (x.0, std::cmp::Reverse(x.1))));
        assert_eq!(v, vec![(0, 5), (1, 3), (1, 1)]);
    }

    #[test]
    fn test_zip_shortest_stops_at_shorter() {
        let pairs: Vec<_> = zip_shortest(vec![1, 2, 3], vec!['a', 'b']).collect();
        assert_eq!(pairs, vec![(1, 'a'), (2, 'b')]);

        let pairs: Vec<_> = zip_shortest(Vec::<i32>::new(), vec!['a']).collect();
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_partition_by_keeps_order() {
        let (odd, even) = partition_by(1..=6, |x| x % 2 == 0);
        assert_eq!(odd, vec![1, 3, 5]);
        assert_eq!(even, vec![2, 4, 6]);
    }
}
