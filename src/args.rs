// =============================================================================
// Indicator argument list parser
// =============================================================================
//
// Grammar of the free-text field on the dashboard:
//
//   "20,2.5;14"      ->  [[Int 20, Float 2.5], [Int 14]]
//   "(5,3);(10)"     ->  [[Int 5, Int 3], [Int 10]]
//   "20;;9"          ->  [[Int 20], [], [Int 9]]
//
// `;` separates indicators (positional), `,` separates arguments, parentheses
// and surrounding whitespace are ignored. Tokens are typed int -> float ->
// text, so parsing itself never fails.
// =============================================================================

use serde::{Deserialize, Serialize};

/// One positional argument handed to an indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParsedArg {
    Int(i64),
    Float(f64),
    Text(String),
}

impl ParsedArg {
    /// Classify a single token.
    pub fn classify(token: &str) -> Self {
        let token = token.trim();
        if let Ok(i) = token.parse::<i64>() {
            Self::Int(i)
        } else if let Ok(f) = token.parse::<f64>() {
            Self::Float(f)
        } else {
            Self::Text(token.to_string())
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            Self::Text(_) => None,
        }
    }
}

impl std::fmt::Display for ParsedArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Text(s) => write!(f, "'{s}'"),
        }
    }
}

/// Parse the raw argument list into one argument vector per indicator
/// segment. `None` and `""` yield no segments at all.
pub fn parse_arglist(raw: Option<&str>) -> Vec<Vec<ParsedArg>> {
    let raw = match raw {
        Some(r) if !r.is_empty() => r,
        _ => return Vec::new(),
    };

    let cleaned: String = raw.chars().filter(|c| *c != '(' && *c != ')').collect();

    cleaned
        .split(';')
        .map(str::trim)
        .map(|segment| {
            if segment.is_empty() {
                Vec::new()
            } else {
                segment.split(',').map(ParsedArg::classify).collect()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ParsedArg::{Float, Int, Text};

    #[test]
    fn ints_and_floats_are_typed() {
        assert_eq!(
            parse_arglist(Some("5,3.2;10")),
            vec![vec![Int(5), Float(3.2)], vec![Int(10)]]
        );
    }

    #[test]
    fn empty_and_missing_yield_nothing() {
        assert!(parse_arglist(Some("")).is_empty());
        assert!(parse_arglist(None).is_empty());
    }

    #[test]
    fn parentheses_are_stripped() {
        assert_eq!(
            parse_arglist(Some("(5,3);(10)")),
            vec![vec![Int(5), Int(3)], vec![Int(10)]]
        );
    }

    #[test]
    fn whitespace_and_empty_segments() {
        assert_eq!(
            parse_arglist(Some(" 20 ; ; 9 , 2.5 ")),
            vec![vec![Int(20)], vec![], vec![Int(9), Float(2.5)]]
        );
        // Only whitespace still counts as one (empty) segment.
        assert_eq!(parse_arglist(Some("  ")), vec![Vec::<ParsedArg>::new()]);
    }

    #[test]
    fn unparseable_tokens_stay_text() {
        assert_eq!(
            parse_arglist(Some("20,red")),
            vec![vec![Int(20), Text("red".into())]]
        );
    }

    #[test]
    fn negative_and_exponent_numbers() {
        assert_eq!(ParsedArg::classify("-3"), Int(-3));
        assert_eq!(ParsedArg::classify("1e2"), Float(100.0));
        assert_eq!(Int(4).as_f64(), Some(4.0));
        assert_eq!(Text("x".into()).as_f64(), None);
    }
}
