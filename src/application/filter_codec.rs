// Filter codec - compact URL filter syntax <-> expression tree
//
// Syntax: `country IN ('US','CA') AND (revenue > 10 OR domain LIKE '%shop%')`
// plus `publisher HAVING (impressions >= 1000)` for dimension thresholds.
use crate::domain::dashboard::{DimensionThresholdFilter, MeasureFilterEntry};
use crate::domain::expression::{Condition, Expression, Operation, Subquery};
use serde_json::{Number, Value};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterParseError {
    #[error("unexpected character '{found}' at position {position}")]
    UnexpectedChar { found: char, position: usize },
    #[error("unterminated quote starting at position {0}")]
    UnterminatedQuote(usize),
    #[error("invalid number '{literal}' at position {position}")]
    InvalidNumber { literal: String, position: usize },
    #[error("expected {expected} at position {position}, found {found}")]
    Expected {
        expected: &'static str,
        found: String,
        position: usize,
    },
    #[error("unexpected end of filter, expected {0}")]
    UnexpectedEnd(&'static str),
    #[error("filter nests deeper than {} groups at position {position}", MAX_DEPTH)]
    TooDeep { position: usize },
}

/// Deepest run of parenthesized groups and HAVING bodies accepted in `f`.
pub const MAX_DEPTH: usize = 64;

/// Where filter and dimension thresholds decoded from a single `f` token.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFilters {
    pub where_filter: Expression,
    pub dimension_threshold_filters: Vec<DimensionThresholdFilter>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    And,
    Or,
    In,
    Nin,
    Like,
    Nlike,
    Having,
    True,
    False,
    Null,
}

impl Keyword {
    fn lookup(word: &str) -> Option<Self> {
        match word.to_ascii_uppercase().as_str() {
            "AND" => Some(Keyword::And),
            "OR" => Some(Keyword::Or),
            "IN" => Some(Keyword::In),
            "NIN" => Some(Keyword::Nin),
            "LIKE" => Some(Keyword::Like),
            "NLIKE" => Some(Keyword::Nlike),
            "HAVING" => Some(Keyword::Having),
            "TRUE" => Some(Keyword::True),
            "FALSE" => Some(Keyword::False),
            "NULL" => Some(Keyword::Null),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Str(String),
    Number(Number),
    Keyword(Keyword),
    Compare(Operation),
    LParen,
    RParen,
    Comma,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Ident(name) => format!("identifier '{}'", name),
            Token::Str(s) => format!("string '{}'", s),
            Token::Number(n) => format!("number {}", n),
            Token::Keyword(k) => format!("keyword {:?}", k).to_uppercase(),
            Token::Compare(op) => format!("operator '{}'", compare_symbol(*op)),
            Token::LParen => "'('".to_string(),
            Token::RParen => "')'".to_string(),
            Token::Comma => "','".to_string(),
        }
    }
}

fn compare_symbol(op: Operation) -> &'static str {
    match op {
        Operation::Eq => "=",
        Operation::Neq => "!=",
        Operation::Lt => "<",
        Operation::Lte => "<=",
        Operation::Gt => ">",
        Operation::Gte => ">=",
        Operation::Like => "LIKE",
        Operation::Nlike => "NLIKE",
        Operation::In => "IN",
        Operation::Nin => "NIN",
        Operation::And => "AND",
        Operation::Or => "OR",
    }
}

fn tokenize(input: &str) -> Result<Vec<(Token, usize)>, FilterParseError> {
    let chars: Vec<(usize, char)> = input.char_indices().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let (pos, c) = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '(' => {
                tokens.push((Token::LParen, pos));
                i += 1;
            }
            ')' => {
                tokens.push((Token::RParen, pos));
                i += 1;
            }
            ',' => {
                tokens.push((Token::Comma, pos));
                i += 1;
            }
            '=' => {
                tokens.push((Token::Compare(Operation::Eq), pos));
                i += 1;
            }
            '!' => {
                if chars.get(i + 1).map(|(_, c)| *c) == Some('=') {
                    tokens.push((Token::Compare(Operation::Neq), pos));
                    i += 2;
                } else {
                    return Err(FilterParseError::UnexpectedChar { found: c, position: pos });
                }
            }
            '<' | '>' => {
                let or_equal = chars.get(i + 1).map(|(_, c)| *c) == Some('=');
                let op = match (c, or_equal) {
                    ('<', false) => Operation::Lt,
                    ('<', true) => Operation::Lte,
                    ('>', false) => Operation::Gt,
                    _ => Operation::Gte,
                };
                tokens.push((Token::Compare(op), pos));
                i += if or_equal { 2 } else { 1 };
            }
            '\'' | '"' => {
                let (text, next) = read_quoted(&chars, i)?;
                let token = if c == '\'' {
                    Token::Str(text)
                } else {
                    Token::Ident(text)
                };
                tokens.push((token, pos));
                i = next;
            }
            c if c.is_ascii_digit()
                || (c == '-'
                    && chars
                        .get(i + 1)
                        .is_some_and(|(_, n)| n.is_ascii_digit() || *n == '.')) =>
            {
                let start = i;
                i += 1;
                while let Some((_, n)) = chars.get(i) {
                    let after_exponent = matches!(chars[i - 1].1, 'e' | 'E');
                    if n.is_ascii_digit()
                        || matches!(*n, '.' | 'e' | 'E')
                        || (after_exponent && matches!(*n, '+' | '-'))
                    {
                        i += 1;
                    } else {
                        break;
                    }
                }
                let literal: String = chars[start..i].iter().map(|(_, c)| *c).collect();
                tokens.push((Token::Number(parse_number(&literal, pos)?), pos));
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while let Some((_, n)) = chars.get(i) {
                    if n.is_alphanumeric() || matches!(*n, '_' | '.') {
                        i += 1;
                    } else {
                        break;
                    }
                }
                let word: String = chars[start..i].iter().map(|(_, c)| *c).collect();
                let token = match Keyword::lookup(&word) {
                    Some(keyword) => Token::Keyword(keyword),
                    None => Token::Ident(word),
                };
                tokens.push((token, pos));
            }
            _ => return Err(FilterParseError::UnexpectedChar { found: c, position: pos }),
        }
    }

    Ok(tokens)
}

/// Reads a quoted run starting at `start`; backslash escapes the next char.
fn read_quoted(chars: &[(usize, char)], start: usize) -> Result<(String, usize), FilterParseError> {
    let (open_pos, quote) = chars[start];
    let mut text = String::new();
    let mut i = start + 1;
    while let Some((_, c)) = chars.get(i) {
        match *c {
            '\\' => {
                let (_, escaped) = chars
                    .get(i + 1)
                    .ok_or(FilterParseError::UnterminatedQuote(open_pos))?;
                text.push(*escaped);
                i += 2;
            }
            c if c == quote => return Ok((text, i + 1)),
            c => {
                text.push(c);
                i += 1;
            }
        }
    }
    Err(FilterParseError::UnterminatedQuote(open_pos))
}

fn parse_number(literal: &str, position: usize) -> Result<Number, FilterParseError> {
    let invalid = || FilterParseError::InvalidNumber {
        literal: literal.to_string(),
        position,
    };
    if let Ok(int) = literal.parse::<i64>() {
        return Ok(Number::from(int));
    }
    literal
        .parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .ok_or_else(invalid)
}

struct Parser {
    tokens: Vec<(Token, usize)>,
    pos: usize,
    end: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(t, _)| t)
    }

    fn position(&self) -> usize {
        self.tokens.get(self.pos).map(|(_, p)| *p).unwrap_or(self.end)
    }

    fn next(&mut self, expected: &'static str) -> Result<Token, FilterParseError> {
        let token = self
            .tokens
            .get(self.pos)
            .map(|(t, _)| t.clone())
            .ok_or(FilterParseError::UnexpectedEnd(expected))?;
        self.pos += 1;
        Ok(token)
    }

    fn unexpected(&self, expected: &'static str) -> FilterParseError {
        match self.peek() {
            Some(token) => FilterParseError::Expected {
                expected,
                found: token.describe(),
                position: self.position(),
            },
            None => FilterParseError::UnexpectedEnd(expected),
        }
    }

    fn expect(&mut self, token: Token, expected: &'static str) -> Result<(), FilterParseError> {
        if self.peek() == Some(&token) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn parse_or(&mut self) -> Result<Expression, FilterParseError> {
        if self.depth == MAX_DEPTH {
            return Err(FilterParseError::TooDeep {
                position: self.position(),
            });
        }
        self.depth += 1;
        let expr = self.parse_or_terms();
        self.depth -= 1;
        expr
    }

    fn parse_or_terms(&mut self) -> Result<Expression, FilterParseError> {
        let mut exprs = vec![self.parse_and()?];
        while self.peek() == Some(&Token::Keyword(Keyword::Or)) {
            self.pos += 1;
            exprs.push(self.parse_and()?);
        }
        Ok(collapse(Operation::Or, exprs))
    }

    fn parse_and(&mut self) -> Result<Expression, FilterParseError> {
        let mut exprs = vec![self.parse_primary()?];
        while self.peek() == Some(&Token::Keyword(Keyword::And)) {
            self.pos += 1;
            exprs.push(self.parse_primary()?);
        }
        Ok(collapse(Operation::And, exprs))
    }

    fn parse_primary(&mut self) -> Result<Expression, FilterParseError> {
        if self.peek() == Some(&Token::LParen) {
            self.pos += 1;
            let inner = self.parse_or()?;
            self.expect(Token::RParen, "')'")?;
            return Ok(inner);
        }
        self.parse_condition()
    }

    fn parse_condition(&mut self) -> Result<Expression, FilterParseError> {
        let ident = match self.peek() {
            Some(Token::Ident(name)) => name.clone(),
            _ => return Err(self.unexpected("dimension or measure name")),
        };
        self.pos += 1;

        match self.next("operator")? {
            Token::Keyword(keyword @ (Keyword::In | Keyword::Nin)) => {
                let op = if keyword == Keyword::In {
                    Operation::In
                } else {
                    Operation::Nin
                };
                self.expect(Token::LParen, "'('")?;
                let mut exprs = vec![Expression::Ident(ident)];
                if self.peek() != Some(&Token::RParen) {
                    exprs.push(Expression::val(self.parse_value()?));
                    while self.peek() == Some(&Token::Comma) {
                        self.pos += 1;
                        exprs.push(Expression::val(self.parse_value()?));
                    }
                }
                self.expect(Token::RParen, "')'")?;
                Ok(Expression::cond(op, exprs))
            }
            Token::Keyword(Keyword::Having) => {
                self.expect(Token::LParen, "'('")?;
                let having = self.parse_or()?;
                self.expect(Token::RParen, "')'")?;
                let subquery = Subquery {
                    dimension: ident.clone(),
                    measures: measures_in(&having),
                    where_filter: None,
                    having: Some(having),
                };
                Ok(Expression::cond(
                    Operation::In,
                    vec![Expression::Ident(ident), Expression::Subquery(Box::new(subquery))],
                ))
            }
            Token::Keyword(Keyword::Like) => self.finish_comparison(ident, Operation::Like),
            Token::Keyword(Keyword::Nlike) => self.finish_comparison(ident, Operation::Nlike),
            Token::Compare(op) => self.finish_comparison(ident, op),
            other => {
                self.pos -= 1;
                Err(FilterParseError::Expected {
                    expected: "operator",
                    found: other.describe(),
                    position: self.position(),
                })
            }
        }
    }

    fn finish_comparison(&mut self, ident: String, op: Operation) -> Result<Expression, FilterParseError> {
        let value = self.parse_value()?;
        Ok(Expression::cond(
            op,
            vec![Expression::Ident(ident), Expression::val(value)],
        ))
    }

    fn parse_value(&mut self) -> Result<Value, FilterParseError> {
        let value = match self.peek() {
            Some(Token::Str(s)) => Value::String(s.clone()),
            Some(Token::Number(n)) => Value::Number(n.clone()),
            Some(Token::Keyword(Keyword::True)) => Value::Bool(true),
            Some(Token::Keyword(Keyword::False)) => Value::Bool(false),
            Some(Token::Keyword(Keyword::Null)) => Value::Null,
            _ => return Err(self.unexpected("value")),
        };
        self.pos += 1;
        Ok(value)
    }
}

fn collapse(op: Operation, mut exprs: Vec<Expression>) -> Expression {
    if exprs.len() == 1 {
        exprs.remove(0)
    } else {
        Expression::cond(op, exprs)
    }
}

fn measures_in(having: &Expression) -> Vec<String> {
    let mut measures = Vec::new();
    collect_measures(having, &mut measures);
    measures
}

fn collect_measures(expr: &Expression, out: &mut Vec<String>) {
    let Some(cond) = expr.as_cond() else { return };
    if cond.op.is_logical() {
        for child in &cond.exprs {
            collect_measures(child, out);
        }
    } else if let Some(name) = cond.exprs.first().and_then(Expression::as_ident) {
        if !out.iter().any(|m| m == name) {
            out.push(name.to_string());
        }
    }
}

/// Parses a filter token into an expression tree as written.
pub fn parse_filter(input: &str) -> Result<Expression, FilterParseError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        end: input.len(),
        depth: 0,
    };
    let expr = parser.parse_or()?;
    if parser.peek().is_some() {
        return Err(parser.unexpected("end of filter"));
    }
    Ok(expr)
}

/// Decodes the `f` URL token. The root is always AND/OR; blank input is an
/// empty AND.
pub fn decode_filter_param(input: &str) -> Result<DecodedFilters, FilterParseError> {
    let expr = if input.trim().is_empty() {
        Expression::and(Vec::new())
    } else {
        parse_filter(input)?.into_logical_root()
    };
    let (where_filter, dimension_threshold_filters) = split_where_filter(expr);
    Ok(DecodedFilters {
        where_filter,
        dimension_threshold_filters,
    })
}

/// Moves `dim HAVING (...)` children of the root into threshold filters.
pub fn split_where_filter(expr: Expression) -> (Expression, Vec<DimensionThresholdFilter>) {
    let (op, exprs) = logical_parts(expr);

    let mut thresholds = Vec::new();
    let mut remaining = Vec::new();
    for child in exprs {
        match threshold_from(&child) {
            Some(threshold) => thresholds.push(threshold),
            None => remaining.push(child),
        }
    }

    (Expression::cond(op, remaining), thresholds)
}

/// Root operator and children, with a non-logical root as the single child of
/// an AND.
fn logical_parts(expr: Expression) -> (Operation, Vec<Expression>) {
    match expr {
        Expression::Cond(Condition { op, exprs }) if op.is_logical() => (op, exprs),
        other => (Operation::And, vec![other]),
    }
}

fn threshold_from(expr: &Expression) -> Option<DimensionThresholdFilter> {
    let cond = expr.as_cond()?;
    if cond.op != Operation::In {
        return None;
    }
    let Some(Expression::Subquery(subquery)) = cond.exprs.get(1) else {
        return None;
    };
    let name = cond
        .exprs
        .first()
        .and_then(Expression::as_ident)
        .unwrap_or(subquery.dimension.as_str())
        .to_string();

    if subquery.where_filter.is_some() {
        return None;
    }
    // Thresholds are a conjunction; OR bodies and anything that is not a plain
    // measure comparison stay in the where filter.
    let having = subquery.having.as_ref()?;
    let filters = match having.as_cond() {
        Some(c) if c.op == Operation::Or => return None,
        Some(c) if c.op == Operation::And => c
            .exprs
            .iter()
            .map(measure_filter_from)
            .collect::<Option<Vec<MeasureFilterEntry>>>()?,
        _ => vec![measure_filter_from(having)?],
    };
    if filters.is_empty() {
        return None;
    }

    Some(DimensionThresholdFilter { name, filters })
}

fn measure_filter_from(expr: &Expression) -> Option<MeasureFilterEntry> {
    let cond = expr.as_cond()?;
    if !cond.op.is_comparison() {
        return None;
    }
    match cond.exprs.as_slice() {
        [Expression::Ident(measure), Expression::Val(value)] => Some(MeasureFilterEntry {
            measure: measure.clone(),
            operation: cond.op,
            value: value.clone(),
        }),
        _ => None,
    }
}

/// Inverse of [`split_where_filter`].
pub fn merge_where_filter(
    where_filter: &Expression,
    thresholds: &[DimensionThresholdFilter],
) -> Expression {
    let (op, mut exprs) = logical_parts(where_filter.clone());

    for threshold in thresholds.iter().filter(|t| !t.filters.is_empty()) {
        let comparisons = threshold
            .filters
            .iter()
            .map(|f| {
                Expression::cond(
                    f.operation,
                    vec![Expression::ident(&f.measure), Expression::val(f.value.clone())],
                )
            })
            .collect();
        let having = Expression::and(comparisons);
        let subquery = Subquery {
            dimension: threshold.name.clone(),
            measures: measures_in(&having),
            where_filter: None,
            having: Some(having),
        };
        exprs.push(Expression::cond(
            Operation::In,
            vec![
                Expression::ident(&threshold.name),
                Expression::Subquery(Box::new(subquery)),
            ],
        ));
    }

    Expression::cond(op, exprs)
}

/// Serializes an expression into the URL filter syntax.
pub fn encode_filter(expr: &Expression) -> String {
    let mut out = String::new();
    write_expr(expr, &mut out);
    out
}

fn write_expr(expr: &Expression, out: &mut String) {
    match expr {
        Expression::Ident(name) => write_ident(name, out),
        Expression::Val(value) => write_value(value, out),
        Expression::Subquery(subquery) => write_having(subquery, out),
        Expression::Cond(cond) if cond.op.is_logical() => {
            let joiner = if cond.op == Operation::And { " AND " } else { " OR " };
            let mut first = true;
            for child in &cond.exprs {
                if child.as_cond().is_some_and(|c| c.op.is_logical() && c.exprs.is_empty()) {
                    continue;
                }
                if !first {
                    out.push_str(joiner);
                }
                first = false;
                if child.is_logical() {
                    out.push('(');
                    write_expr(child, out);
                    out.push(')');
                } else {
                    write_expr(child, out);
                }
            }
        }
        Expression::Cond(cond) => write_condition(cond, out),
    }
}

fn write_condition(cond: &Condition, out: &mut String) {
    let Some(first) = cond.exprs.first() else { return };
    if let Some(Expression::Subquery(subquery)) = cond.exprs.get(1) {
        write_having(subquery, out);
        return;
    }
    write_expr(first, out);
    match cond.op {
        Operation::In | Operation::Nin => {
            out.push(' ');
            out.push_str(compare_symbol(cond.op));
            out.push_str(" (");
            for (i, value) in cond.exprs[1..].iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_expr(value, out);
            }
            out.push(')');
        }
        op => {
            out.push(' ');
            out.push_str(compare_symbol(op));
            out.push(' ');
            if let Some(value) = cond.exprs.get(1) {
                write_expr(value, out);
            }
        }
    }
}

fn write_having(subquery: &Subquery, out: &mut String) {
    write_ident(&subquery.dimension, out);
    out.push_str(" HAVING (");
    if let Some(having) = &subquery.having {
        write_expr(having, out);
    }
    out.push(')');
}

fn write_ident(name: &str, out: &mut String) {
    let bare = name
        .chars()
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_alphanumeric() || matches!(c, '_' | '.'))
        && Keyword::lookup(name).is_none();
    if bare {
        out.push_str(name);
    } else {
        write_quoted(name, '"', out);
    }
}

fn write_value(value: &Value, out: &mut String) {
    match value {
        Value::String(s) => write_quoted(s, '\'', out),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Null => out.push_str("null"),
        other => write_quoted(&other.to_string(), '\'', out),
    }
}

fn write_quoted(text: &str, quote: char, out: &mut String) {
    out.push(quote);
    for c in text.chars() {
        if c == quote || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push(quote);
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn in_list(dim: &str, values: &[&str]) -> Expression {
        let mut exprs = vec![Expression::ident(dim)];
        exprs.extend(values.iter().map(|v| Expression::val(*v)));
        Expression::cond(Operation::In, exprs)
    }

    #[test]
    fn test_parse_in_list_and_comparison() {
        let expr = parse_filter("country IN ('US','CA') AND revenue > 10.5").unwrap();
        assert_eq!(
            expr,
            Expression::and(vec![
                in_list("country", &["US", "CA"]),
                Expression::cond(
                    Operation::Gt,
                    vec![Expression::ident("revenue"), Expression::val(json!(10.5))]
                ),
            ])
        );
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let expr = parse_filter("a = 1 or b = 2 and c = 3").unwrap();
        let root = expr.as_cond().unwrap();
        assert_eq!(root.op, Operation::Or);
        assert_eq!(root.exprs.len(), 2);
        assert_eq!(root.exprs[1].op(), Some(Operation::And));
    }

    #[test]
    fn test_decode_wraps_bare_comparison_in_and() {
        let decoded = decode_filter_param("domain NLIKE '%test%'").unwrap();
        assert_eq!(decoded.where_filter.op(), Some(Operation::And));
        assert_eq!(decoded.where_filter.as_cond().unwrap().exprs.len(), 1);
        assert!(decoded.dimension_threshold_filters.is_empty());
    }

    #[test]
    fn test_decode_keeps_or_root() {
        let decoded = decode_filter_param("a = 'x' OR b != 'y'").unwrap();
        assert_eq!(decoded.where_filter.op(), Some(Operation::Or));
    }

    #[test]
    fn test_blank_filter_is_empty_and() {
        let decoded = decode_filter_param("  ").unwrap();
        assert_eq!(decoded.where_filter, Expression::and(vec![]));
    }

    #[test]
    fn test_having_becomes_threshold_filter() {
        let decoded = decode_filter_param(
            "country IN ('US') AND publisher HAVING (impressions >= 1000 AND ctr < 0.5)",
        )
        .unwrap();

        assert_eq!(
            decoded.where_filter,
            Expression::and(vec![in_list("country", &["US"])])
        );
        assert_eq!(decoded.dimension_threshold_filters.len(), 1);
        let threshold = &decoded.dimension_threshold_filters[0];
        assert_eq!(threshold.name, "publisher");
        assert_eq!(
            threshold.filters,
            vec![
                MeasureFilterEntry {
                    measure: "impressions".to_string(),
                    operation: Operation::Gte,
                    value: json!(1000),
                },
                MeasureFilterEntry {
                    measure: "ctr".to_string(),
                    operation: Operation::Lt,
                    value: json!(0.5),
                },
            ]
        );
    }

    #[test]
    fn test_or_having_stays_in_where_filter() {
        let input = "publisher HAVING (impressions > 10 OR ctr < 0.5)";
        let decoded = decode_filter_param(input).unwrap();
        assert!(decoded.dimension_threshold_filters.is_empty());
        assert_eq!(decoded.where_filter.as_cond().unwrap().exprs.len(), 1);

        let merged = merge_where_filter(&decoded.where_filter, &decoded.dimension_threshold_filters);
        assert_eq!(encode_filter(&merged), input);
        assert_eq!(decode_filter_param(&encode_filter(&merged)).unwrap(), decoded);

        let mixed = decode_filter_param("publisher HAVING (impressions > 10 AND domain LIKE 'a%')").unwrap();
        assert!(mixed.dimension_threshold_filters.is_empty());
    }

    #[test]
    fn test_parse_errors_carry_position() {
        assert_eq!(
            parse_filter("country IN ('US'"),
            Err(FilterParseError::UnexpectedEnd("')'"))
        );
        assert_eq!(
            parse_filter("country = 'US"),
            Err(FilterParseError::UnterminatedQuote(10))
        );
        assert!(matches!(
            parse_filter("country # 1"),
            Err(FilterParseError::UnexpectedChar { found: '#', position: 8 })
        ));
        assert!(matches!(
            parse_filter("country = 'US' extra"),
            Err(FilterParseError::Expected { expected: "end of filter", .. })
        ));
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        let deep = format!("{}a = 1{}", "(".repeat(10_000), ")".repeat(10_000));
        assert!(matches!(
            decode_filter_param(&deep),
            Err(FilterParseError::TooDeep { position: 64 })
        ));
        assert!(matches!(
            parse_filter(&"(".repeat(10_000)),
            Err(FilterParseError::TooDeep { .. })
        ));

        let nested = format!("{}a = 1{}", "(".repeat(MAX_DEPTH - 1), ")".repeat(MAX_DEPTH - 1));
        assert!(parse_filter(&nested).is_ok());
    }

    #[test]
    fn test_quoted_identifiers_and_escapes() {
        let expr = parse_filter(r#""order date" = 'it\'s'"#).unwrap();
        assert_eq!(
            expr,
            Expression::cond(
                Operation::Eq,
                vec![Expression::ident("order date"), Expression::val("it's")]
            )
        );
        assert_eq!(encode_filter(&expr), r#""order date" = 'it\'s'"#);
    }

    #[test]
    fn test_encoded_filters_decode_to_logical_root() {
        let samples = [
            "country IN ('US','CA')",
            "a = 1 OR (b > 2 AND c NIN ('x'))",
            "publisher HAVING (impressions > 10)",
            "device LIKE '%mobile%' AND os != null",
        ];
        for sample in samples {
            let decoded = decode_filter_param(sample).unwrap();
            let merged = merge_where_filter(
                &decoded.where_filter,
                &decoded.dimension_threshold_filters,
            );
            let reencoded = encode_filter(&merged);
            let again = decode_filter_param(&reencoded).unwrap();
            assert!(again.where_filter.is_logical(), "{}", reencoded);
            assert_eq!(again, decoded, "{}", reencoded);
        }
    }

    #[test]
    fn test_keyword_named_dimension_is_quoted() {
        let expr = Expression::cond(
            Operation::Eq,
            vec![Expression::ident("in"), Expression::val(true)],
        );
        assert_eq!(encode_filter(&expr), r#""in" = true"#);
    }
}
