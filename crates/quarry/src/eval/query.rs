// SPDX-License-Identifier: MIT OR Apache-2.0
//! Predicate evaluation

use serde_json::Value;

use super::compare;
use super::evaluate;
use crate::error::Result;
use crate::expression::{LogicalOperator, Operand, QueryExpression, QueryOperator};
use crate::settings::Settings;

impl QueryExpression {
    /// Test the predicate against `current`.
    ///
    /// Composites short-circuit left to right. A comparison reads only the
    /// first node of each path operand and is false when either side yields
    /// nothing.
    ///
    /// # Errors
    ///
    /// Errors raised by operand sub-paths and regex matching propagate.
    pub fn is_match(&self, root: &Value, current: &Value, settings: &Settings) -> Result<bool> {
        match self {
            Self::Composite {
                op: LogicalOperator::And,
                expressions,
            } => {
                for expression in expressions {
                    if !expression.is_match(root, current, settings)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Self::Composite {
                op: LogicalOperator::Or,
                expressions,
            } => {
                for expression in expressions {
                    if expression.is_match(root, current, settings)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            Self::Boolean { op, left, right } => {
                let Some(left_node) = first(left, root, current, settings)? else {
                    return Ok(false);
                };
                if *op == QueryOperator::Exists {
                    return Ok(true);
                }
                let Some(right) = right else {
                    return Ok(false);
                };
                let Some(right_node) = first(right, root, current, settings)? else {
                    return Ok(false);
                };
                let regex = match right {
                    Operand::Regex(regex) => Some(regex),
                    _ => None,
                };
                compare::match_tokens(*op, left_node, right_node, regex, settings)
            }
        }
    }
}

/// First node an operand resolves to.
fn first<'v>(
    operand: &'v Operand,
    root: &'v Value,
    current: &'v Value,
    settings: &Settings,
) -> Result<Option<&'v Value>> {
    match operand {
        Operand::Path(filters) => evaluate(filters, root, current, *settings)
            .next()
            .transpose(),
        Operand::Literal(_) | Operand::Regex(_) => Ok(operand.literal()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::PathFilter;
    use serde_json::json;

    fn field(name: &str) -> Operand {
        Operand::Path(vec![PathFilter::Field(Some(name.to_string()))])
    }

    fn compare(op: QueryOperator, left: Operand, right: Operand) -> QueryExpression {
        QueryExpression::Boolean {
            op,
            left,
            right: Some(right),
        }
    }

    #[test]
    fn test_exists() {
        let doc = json!({"a": null});
        let settings = Settings::default();
        let exists = |operand| QueryExpression::Boolean {
            op: QueryOperator::Exists,
            left: operand,
            right: None,
        };
        assert!(exists(field("a")).is_match(&doc, &doc, &settings).unwrap());
        assert!(!exists(field("b")).is_match(&doc, &doc, &settings).unwrap());
        assert!(
            exists(Operand::Literal(json!(false)))
                .is_match(&doc, &doc, &settings)
                .unwrap()
        );
    }

    #[test]
    fn test_missing_operand_is_false() {
        let doc = json!({"a": 1});
        let settings = Settings::default();
        let expr = compare(QueryOperator::NotEquals, field("missing"), Operand::Literal(json!(1)));
        assert!(!expr.is_match(&doc, &doc, &settings).unwrap());
        let expr = compare(QueryOperator::Equals, field("a"), field("missing"));
        assert!(!expr.is_match(&doc, &doc, &settings).unwrap());
    }

    #[test]
    fn test_composite_short_circuit() {
        let doc = json!({"a": 1});
        // the second term would fail in strict mode; it must never run
        let failing = compare(QueryOperator::Equals, field("missing"), Operand::Literal(json!(1)));
        let passing = compare(QueryOperator::Equals, field("a"), Operand::Literal(json!(1)));
        let settings = Settings::strict();

        let or = QueryExpression::Composite {
            op: LogicalOperator::Or,
            expressions: vec![passing.clone(), failing.clone()],
        };
        assert!(or.is_match(&doc, &doc, &settings).unwrap());

        let and = QueryExpression::Composite {
            op: LogicalOperator::And,
            expressions: vec![failing, passing],
        };
        assert!(and.is_match(&doc, &doc, &settings).is_err());
    }

    #[test]
    fn test_root_operand() {
        let doc = json!({"limit": 3, "items": [1, 5]});
        let limit = Operand::Path(vec![PathFilter::Root, PathFilter::Field(Some("limit".into()))]);
        let expr = compare(QueryOperator::GreaterThan, Operand::Path(vec![]), limit);
        let settings = Settings::default();
        assert!(!expr.is_match(&doc, &json!(1), &settings).unwrap());
        assert!(expr.is_match(&doc, &json!(5), &settings).unwrap());
    }
}
