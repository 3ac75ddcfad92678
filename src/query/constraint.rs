//! Comparison constraints parsed from `key="-op value"` parameters.

use crate::error::AppError;
use crate::query::ParsedParams;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Comparator {
    /// Operator token as written in a parameter value, e.g. `-eq`.
    pub fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "-eq" => Comparator::Eq,
            "-ne" => Comparator::Ne,
            "-lt" => Comparator::Lt,
            "-le" => Comparator::Le,
            "-gt" => Comparator::Gt,
            "-ge" => Comparator::Ge,
            _ => return None,
        })
    }

    pub fn token(&self) -> &'static str {
        match self {
            Comparator::Eq => "-eq",
            Comparator::Ne => "-ne",
            Comparator::Lt => "-lt",
            Comparator::Le => "-le",
            Comparator::Gt => "-gt",
            Comparator::Ge => "-ge",
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

/// One `property <comparator> value` test. A list of constraints is a conjunction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraint {
    pub property: String,
    pub value: String,
    pub comparator: Comparator,
}

/// Parse a comparison part such as `"-eq Sam"` (optionally quoted) into its comparator and operand.
pub fn parse_comparison(part: &str) -> Result<(Comparator, String), AppError> {
    let part = strip_quotes(part.trim());
    let tokens: Vec<&str> = part.split_whitespace().collect();
    if tokens.len() != 2 {
        return Err(AppError::Parse(format!(
            "expected 2 parts in comparison string, received {}. comparison string={:?}",
            tokens.len(),
            tokens
        )));
    }
    let comparator = Comparator::from_token(tokens[0]).ok_or_else(|| {
        AppError::Parse(format!("unknown comparison operator: \"{}\"", tokens[0]))
    })?;
    Ok((comparator, tokens[1].to_string()))
}

fn strip_quotes(s: &str) -> &str {
    let b = s.as_bytes();
    if b.len() >= 2 {
        let (first, last) = (b[0], b[b.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &s[1..s.len() - 1];
        }
    }
    s
}

/// Build constraints from every single-valued parameter.
///
/// Keys carrying zero or several values are ambiguous and skipped without error.
pub fn parse_constraints(params: &ParsedParams) -> Result<Vec<Constraint>, AppError> {
    let mut constraints = Vec::new();
    for (key, values) in params.iter() {
        let [value] = values else { continue };
        let (comparator, operand) = parse_comparison(value)?;
        constraints.push(Constraint {
            property: key.to_string(),
            value: operand,
            comparator,
        });
    }
    Ok(constraints)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constraints(raw: &str) -> Result<Vec<Constraint>, AppError> {
        parse_constraints(&ParsedParams::parse(raw)?)
    }

    #[test]
    fn quoted_comparison_round_trips() {
        let c = constraints("name=\"-eq value\"").unwrap();
        assert_eq!(
            c,
            vec![Constraint {
                property: "name".into(),
                value: "value".into(),
                comparator: Comparator::Eq,
            }]
        );
    }

    #[test]
    fn every_operator_maps() {
        for (token, expected) in [
            ("-eq", Comparator::Eq),
            ("-ne", Comparator::Ne),
            ("-lt", Comparator::Lt),
            ("-le", Comparator::Le),
            ("-gt", Comparator::Gt),
            ("-ge", Comparator::Ge),
        ] {
            let (cmp, operand) = parse_comparison(&format!("'{} 42'", token)).unwrap();
            assert_eq!(cmp, expected);
            assert_eq!(operand, "42");
            assert_eq!(cmp.token(), token);
        }
    }

    #[test]
    fn unquoted_and_padded_values_parse() {
        let (cmp, operand) = parse_comparison("   -gt    10  ").unwrap();
        assert_eq!(cmp, Comparator::Gt);
        assert_eq!(operand, "10");
    }

    #[test]
    fn mismatched_quotes_are_kept() {
        let (_, operand) = parse_comparison("-eq 'x\"").unwrap();
        assert_eq!(operand, "'x\"");
    }

    #[test]
    fn wrong_token_count_reports_count() {
        let err = parse_comparison("-eq John Smith").unwrap_err();
        assert!(matches!(err, AppError::Parse(_)));
        assert!(err.to_string().contains("received 3"));

        let err = parse_comparison("\"\"").unwrap_err();
        assert!(err.to_string().contains("received 0"));
    }

    #[test]
    fn unknown_operator_is_named() {
        let err = parse_comparison("-like John").unwrap_err();
        assert!(err.to_string().contains("unknown comparison operator: \"-like\""));
    }

    #[test]
    fn multi_valued_keys_are_skipped() {
        let c = constraints("name=-eq+a&name=-eq+b&location=-ne+Texas").unwrap();
        assert_eq!(c.len(), 1);
        assert_eq!(c[0].property, "location");
        assert_eq!(c[0].comparator, Comparator::Ne);
    }

    #[test]
    fn empty_params_give_no_constraints() {
        assert!(constraints("").unwrap().is_empty());
    }

    #[test]
    fn first_bad_value_fails_whole_parse() {
        assert!(constraints("a=-eq+1&b=oops").is_err());
    }
}
