//! String-distance predicates exposed to generated SQL.
//!
//! Storage is exact; retrieval is approximate. These functions only run
//! at query time, inside WHERE clauses of generated metadata queries.

/// Case-insensitive Levenshtein edit distance.
pub fn levenshtein(a: &str, b: &str) -> usize {
    strsim::levenshtein(&a.to_lowercase(), &b.to_lowercase())
}

/// Edit distance between a stored author name and a query name,
/// tolerant of "Given Family" vs "Family Given" ordering.
///
/// - single-token query: compared against the last token of the stored
///   name (whole-string fallback when the stored name has no space);
/// - two-token query: minimum of the natural-order and swapped-order
///   pairwise distance sums;
/// - anything else: whole-string distance.
pub fn author_name_distance(stored_name: &str, query_name: &str) -> usize {
    let stored = stored_name.to_lowercase();
    let query = query_name.to_lowercase();

    let stored_parts: Vec<&str> = stored.split_whitespace().collect();
    let query_parts: Vec<&str> = query.split_whitespace().collect();

    match query_parts.len() {
        1 => {
            if stored_parts.len() > 1 {
                // Bare query token is assumed to be a family name.
                levenshtein(stored_parts[stored_parts.len() - 1], &query)
            } else {
                levenshtein(&stored, &query)
            }
        }
        2 => {
            if stored_parts.len() >= 2 {
                let stored_first = stored_parts[0];
                let stored_last = stored_parts[stored_parts.len() - 1];
                let natural = levenshtein(stored_first, query_parts[0])
                    + levenshtein(stored_last, query_parts[1]);
                let swapped = levenshtein(stored_first, query_parts[1])
                    + levenshtein(stored_last, query_parts[0]);
                natural.min(swapped)
            } else {
                let swapped_query = format!("{} {}", query_parts[1], query_parts[0]);
                levenshtein(&stored, &query).min(levenshtein(&stored, &swapped_query))
            }
        }
        _ => levenshtein(&stored, &query),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levenshtein_is_case_insensitive() {
        assert_eq!(levenshtein("Smith", "smith"), 0);
        assert_eq!(levenshtein("Smith", "Smyth"), 1);
    }

    #[test]
    fn test_swapped_name_order_matches_exactly() {
        assert_eq!(author_name_distance("Robert Kennedy", "Kennedy Robert"), 0);
        assert_eq!(author_name_distance("Robert Kennedy", "Robert Kennedy"), 0);
    }

    #[test]
    fn test_two_token_query_takes_minimum_pairing() {
        // Natural: lev(john, smith) + lev(smith, john); swapped: 0 + 0.
        assert_eq!(author_name_distance("John Smith", "Smith John"), 0);
        assert_eq!(author_name_distance("John Smith", "Jon Smith"), 1);
    }

    #[test]
    fn test_single_token_query_compares_last_token() {
        assert_eq!(author_name_distance("Albert Smith", "Smith"), 0);
        assert_eq!(author_name_distance("Albert Smith", "Smyth"), 1);
        // Stored name without internal space: whole-string comparison.
        assert_eq!(author_name_distance("Smith", "Smith"), 0);
    }

    #[test]
    fn test_middle_names_compare_first_and_last() {
        assert_eq!(author_name_distance("John Maynard Smith", "John Smith"), 0);
        assert_eq!(author_name_distance("John Maynard Smith", "Smith John"), 0);
    }

    #[test]
    fn test_three_token_query_falls_back_to_whole_string() {
        assert_eq!(
            author_name_distance("john maynard smith", "john maynard smith"),
            0
        );
        assert!(author_name_distance("John Maynard Smith", "Smith John Maynard") > 0);
    }
}
