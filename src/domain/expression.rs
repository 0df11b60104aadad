// Filter expression tree, shaped like the runtime's V1Expression JSON
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operation {
    #[serde(rename = "OPERATION_EQ")]
    Eq,
    #[serde(rename = "OPERATION_NEQ")]
    Neq,
    #[serde(rename = "OPERATION_LT")]
    Lt,
    #[serde(rename = "OPERATION_LTE")]
    Lte,
    #[serde(rename = "OPERATION_GT")]
    Gt,
    #[serde(rename = "OPERATION_GTE")]
    Gte,
    #[serde(rename = "OPERATION_OR")]
    Or,
    #[serde(rename = "OPERATION_AND")]
    And,
    #[serde(rename = "OPERATION_IN")]
    In,
    #[serde(rename = "OPERATION_NIN")]
    Nin,
    #[serde(rename = "OPERATION_LIKE")]
    Like,
    #[serde(rename = "OPERATION_NLIKE")]
    Nlike,
}

impl Operation {
    pub fn is_logical(self) -> bool {
        matches!(self, Operation::And | Operation::Or)
    }

    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            Operation::Eq
                | Operation::Neq
                | Operation::Lt
                | Operation::Lte
                | Operation::Gt
                | Operation::Gte
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Expression {
    Ident(String),
    Val(Value),
    Cond(Condition),
    Subquery(Box<Subquery>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub op: Operation,
    #[serde(default)]
    pub exprs: Vec<Expression>,
}

/// `dimension HAVING (...)`: the dimension values whose aggregated measures
/// satisfy `having`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subquery {
    pub dimension: String,
    #[serde(default)]
    pub measures: Vec<String>,
    #[serde(default, rename = "where", skip_serializing_if = "Option::is_none")]
    pub where_filter: Option<Expression>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub having: Option<Expression>,
}

impl Expression {
    pub fn ident(name: impl Into<String>) -> Self {
        Expression::Ident(name.into())
    }

    pub fn val(value: impl Into<Value>) -> Self {
        Expression::Val(value.into())
    }

    pub fn cond(op: Operation, exprs: Vec<Expression>) -> Self {
        Expression::Cond(Condition { op, exprs })
    }

    pub fn and(exprs: Vec<Expression>) -> Self {
        Self::cond(Operation::And, exprs)
    }

    pub fn as_cond(&self) -> Option<&Condition> {
        match self {
            Expression::Cond(cond) => Some(cond),
            _ => None,
        }
    }

    pub fn as_ident(&self) -> Option<&str> {
        match self {
            Expression::Ident(name) => Some(name),
            _ => None,
        }
    }

    /// Root operator if this is a condition node.
    pub fn op(&self) -> Option<Operation> {
        self.as_cond().map(|c| c.op)
    }

    pub fn is_logical(&self) -> bool {
        self.op().is_some_and(Operation::is_logical)
    }

    /// Wraps anything that is not already an AND/OR node in an implicit AND.
    pub fn into_logical_root(self) -> Self {
        if self.is_logical() {
            self
        } else {
            Expression::and(vec![self])
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serializes_like_runtime_expression() {
        let expr = Expression::and(vec![Expression::cond(
            Operation::In,
            vec![Expression::ident("country"), Expression::val("US")],
        )]);

        let value = serde_json::to_value(&expr).unwrap();
        assert_eq!(
            value,
            json!({
                "cond": {
                    "op": "OPERATION_AND",
                    "exprs": [{
                        "cond": {
                            "op": "OPERATION_IN",
                            "exprs": [{"ident": "country"}, {"val": "US"}]
                        }
                    }]
                }
            })
        );
    }

    #[test]
    fn test_into_logical_root_wraps_comparisons_only() {
        let cmp = Expression::cond(
            Operation::Gt,
            vec![Expression::ident("revenue"), Expression::val(10)],
        );
        let wrapped = cmp.clone().into_logical_root();
        assert_eq!(wrapped.op(), Some(Operation::And));
        assert_eq!(wrapped.as_cond().unwrap().exprs, vec![cmp]);

        let or = Expression::cond(Operation::Or, vec![]);
        assert_eq!(or.clone().into_logical_root(), or);
    }
}
