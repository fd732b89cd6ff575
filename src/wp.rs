//! Weakest-precondition annotations.
//!
//! Explains why one loop step preserves the invariant by pairing the
//! obligation `(I ∧ B) ⇒ wp(S, I)` with the instantiated precondition.
//! The precondition comes from a fixed pattern table: one entry per
//! supported loop body plus the bare index-increment substitution.
//! Anything else is reported as an uninstantiated `wp(S, Q)`; this is a
//! lookup, not a predicate-transformer calculus.

use crate::r#loop::mode::{LoopMode, LOOP_GUARD};
use serde::{Deserialize, Serialize};

/// Annotation shown alongside a mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WpAnnotation {
    pub mode: LoopMode,
    /// Loop body `S`.
    pub statement: String,
    /// Postcondition `Q` (the invariant).
    pub postcondition: String,
    /// `(I ∧ B) ⇒ wp(S, I)` with `wp` instantiated.
    pub symbolic_formula: String,
    /// Plain-English reading of the obligation.
    pub natural_language: String,
}

/// How a table row produces its precondition.
enum Precondition {
    Fixed(&'static str),
    /// Replace every `j` in the postcondition with `j+1`.
    AdvanceIndex,
}

struct WpRule {
    statement: &'static str,
    postcondition: &'static str,
    precondition: Precondition,
}

const INDEX_INCREMENT: &str = "j := j + 1";

/// Ordered pattern table. A row matches when the statement contains its
/// statement marker and the postcondition contains its postcondition
/// marker.
const WP_TABLE: &[WpRule] = &[
    WpRule {
        statement: "res := res + a[j]; j := j + 1",
        postcondition: "res = Σ_{i=0}^{j-1} a[i]",
        precondition: Precondition::Fixed("res + a[j] = Σ_{i=0}^{j} a[i] ∧ 0 ≤ j+1 ≤ n"),
    },
    WpRule {
        statement: "if a[j] > T then res := res + 1; j := j + 1",
        postcondition: "res = |{i < j : a[i] > T}|",
        precondition: Precondition::Fixed(
            "((a[j] > T) → (res + 1 = |{i ≤ j : a[i] > T}|)) ∧ ((a[j] ≤ T) → (res = |{i ≤ j : a[i] > T}|)) ∧ 0 ≤ j+1 ≤ n",
        ),
    },
    WpRule {
        statement: "if j = 0 then res := a[0] else res := max(res, a[j]); j := j + 1",
        postcondition: "res = max(a[0..j))",
        precondition: Precondition::Fixed(
            "((j = 0) → (a[0] = max(a[0..1)))) ∧ ((j > 0) → (max(res, a[j]) = max(a[0..j]))) ∧ 0 ≤ j+1 ≤ n",
        ),
    },
    WpRule {
        statement: INDEX_INCREMENT,
        postcondition: "j",
        precondition: Precondition::AdvanceIndex,
    },
];

/// Weakest precondition of `statement` with respect to `postcondition`.
///
/// Returns `true` when either side is empty and the literal
/// `wp(statement, postcondition)` when no table row matches.
///
/// # Example
///
/// ```
/// use loopcheck::wp::calculate_wp;
///
/// assert_eq!(calculate_wp("j := j + 1", "0 ≤ j ≤ n"), "0 ≤ j+1 ≤ n");
/// assert_eq!(calculate_wp("x := 2", "x > 1"), "wp(x := 2, x > 1)");
/// assert_eq!(calculate_wp("", "x > 1"), "true");
/// ```
#[must_use]
pub fn calculate_wp(statement: &str, postcondition: &str) -> String {
    if statement.trim().is_empty() || postcondition.trim().is_empty() {
        return "true".to_string();
    }

    for rule in WP_TABLE {
        let statement_matches = match rule.precondition {
            // The bare increment must be the whole statement.
            Precondition::AdvanceIndex => statement.trim() == rule.statement,
            Precondition::Fixed(_) => statement.contains(rule.statement),
        };
        if statement_matches && postcondition.contains(rule.postcondition) {
            return match rule.precondition {
                Precondition::Fixed(pre) => pre.to_string(),
                Precondition::AdvanceIndex => advance_index(postcondition),
            };
        }
    }

    format!("wp({}, {})", statement, postcondition)
}

/// Substitute `j+1` for each free-standing `j`.
fn advance_index(formula: &str) -> String {
    let chars: Vec<char> = formula.chars().collect();
    let mut out = String::with_capacity(formula.len() + 8);
    for (i, &c) in chars.iter().enumerate() {
        let prev_is_ident = i > 0 && is_ident(chars[i - 1]);
        let next_is_ident = chars.get(i + 1).is_some_and(|&n| is_ident(n));
        if c == 'j' && !prev_is_ident && !next_is_ident {
            out.push_str("j+1");
        } else {
            out.push(c);
        }
    }
    out
}

fn is_ident(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// English reading of an obligation, keyed on the invariant it mentions.
///
/// Formulas outside the table are returned unchanged.
#[must_use]
pub fn paraphrase(formula: &str) -> String {
    if formula.contains("Σ_{i=0}^{j-1} a[i]") {
        return "If res equals the sum of a[0] through a[j-1] and j < n, then after \
                adding a[j] to res and advancing j, res again equals the sum of a[0] \
                through a[j-1]."
            .to_string();
    }
    if formula.contains("|{i < j : a[i] > T}|") {
        return "If res equals the number of elements greater than T among a[0] through \
                a[j-1] and j < n, then after counting a[j] when it exceeds T and advancing j, \
                res again equals that number for the new j."
            .to_string();
    }
    if formula.contains("max(a[0..j))") {
        return "If res equals the largest of a[0] through a[j-1] and j < n, then after \
                taking a[j] (or the larger of res and a[j] once j > 0) and advancing j, res \
                again equals the largest element seen so far."
            .to_string();
    }
    formula.to_string()
}

/// Build the annotation for `mode`.
///
/// # Example
///
/// ```
/// use loopcheck::r#loop::mode::LoopMode;
/// use loopcheck::wp::annotate;
///
/// let a = annotate(LoopMode::PrefixSum);
/// assert!(a.symbolic_formula.starts_with("(res = Σ_{i=0}^{j-1} a[i] ∧ 0 ≤ j ≤ n ∧ j < n) ⇒ "));
/// assert!(!a.symbolic_formula.contains("wp("));
/// ```
#[must_use]
pub fn annotate(mode: LoopMode) -> WpAnnotation {
    let statement = mode.loop_body();
    let postcondition = mode.invariant_formula();
    let precondition = calculate_wp(statement, postcondition);
    let symbolic_formula = format!("({} ∧ {}) ⇒ {}", postcondition, LOOP_GUARD, precondition);
    let natural_language = paraphrase(&symbolic_formula);

    WpAnnotation {
        mode,
        statement: statement.to_string(),
        postcondition: postcondition.to_string(),
        symbolic_formula,
        natural_language,
    }
}
