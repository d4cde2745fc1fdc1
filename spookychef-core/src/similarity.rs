//! Set-overlap similarity between ingredient lists.

use std::collections::HashSet;
use std::hash::Hash;

use crate::normalize::AliasTable;

/// Jaccard similarity `|a ∩ b| / |a ∪ b|`. Two empty sets score 0.
pub fn jaccard<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}

/// Score a user's ingredients against a recipe's, after normalizing both sides.
pub fn score<U: AsRef<str>, R: AsRef<str>>(
    aliases: &AliasTable,
    user_ingredients: &[U],
    recipe_ingredients: &[R],
) -> f64 {
    let user = aliases.canonical_set(user_ingredients);
    let recipe = aliases.canonical_set(recipe_ingredients);
    jaccard(&user, &recipe)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn aliases() -> AliasTable {
        AliasTable::new([("gul lök", "lök"), ("spaghetti", "pasta")]).unwrap()
    }

    const EMPTY: [&str; 0] = [];

    #[test]
    fn test_empty_sets_score_zero() {
        assert_eq!(score(&aliases(), &EMPTY, &EMPTY), 0.0);
        assert_eq!(score(&aliases(), &["pasta"], &EMPTY), 0.0);
    }

    #[test]
    fn test_identical_sets_score_one() {
        let a = ["pasta", "tomat", "vitlök"];
        assert_eq!(score(&aliases(), &a, &a), 1.0);
        // Aliases and case collapse onto the same set
        assert_eq!(
            score(&aliases(), &["Spaghetti", "GUL LÖK"], &["pasta", "lök"]),
            1.0
        );
    }

    #[test]
    fn test_symmetric() {
        let cases: [(&[&str], &[&str]); 4] = [
            (&["pasta", "tomat", "vitlök"], &["pasta", "tomat"]),
            (&["kyckling"], &["ris", "kyckling", "curry"]),
            (&["a", "b"], &["c"]),
            (&[], &["x"]),
        ];
        for (a, b) in cases {
            assert_eq!(score(&aliases(), a, b), score(&aliases(), b, a));
        }
    }

    #[test]
    fn test_bounded_and_duplicates_ignored() {
        let user = ["pasta", "pasta", "Pasta ", "tomat", "vitlök"];
        let recipe = ["pasta", "tomat"];
        let s = score(&aliases(), &user, &recipe);
        assert!((0.0..=1.0).contains(&s));
        assert!((s - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_disjoint_scores_zero() {
        assert_eq!(score(&aliases(), &["kyckling", "ris"], &["pasta", "tomat"]), 0.0);
    }
}
