//! Formula parser
//!
//! A recursive descent parser for arithmetic formulas with cell references
//! and aggregate function calls.
//!
//! Grammar (lowest precedence first):
//!
//! ```text
//! expression := term (('+' | '-') term)*
//! term       := unary (('*' | '/') unary)*
//! unary      := ('-' | '+') unary | primary
//! primary    := NUMBER | CELLREF | NAME '(' raw-args ')' | '(' expression ')'
//! ```

use crate::ast::{BinaryOperator, FormulaExpr, UnaryOperator};
use crate::error::{FormulaError, FormulaResult};
use gridcalc_core::CellAddress;

/// Deepest run of parentheses and prefix signs the parser descends into
const MAX_NESTING: usize = 256;

/// Deepest expression tree the parser builds
///
/// Evaluation and reference collection recurse once per level, so long
/// operator chains are capped too.
const MAX_TREE_DEPTH: usize = 1024;

/// Parsed subexpression with its tree depth
type Parsed = (FormulaExpr, usize);

/// Parse a formula string into an AST
///
/// The formula must start with `=`. Cell references and function names are
/// case-insensitive.
///
/// # Example
/// ```rust
/// use gridcalc_formula::parse_formula;
///
/// let ast = parse_formula("=1+2").unwrap();
/// let ast = parse_formula("=SUM(A1:A10)/2").unwrap();
/// assert!(parse_formula("=A1+*2").is_err());
/// ```
pub fn parse_formula(formula: &str) -> FormulaResult<FormulaExpr> {
    let formula = formula.trim();

    let formula = formula
        .strip_prefix('=')
        .ok_or_else(|| FormulaError::Parse("Formula must start with '='".into()))?;

    let mut parser = FormulaParser::new(formula)?;
    let (expr, _) = parser.parse_expression()?;

    // Make sure we consumed all input
    if parser.current_token() != &Token::Eof {
        return Err(FormulaError::Parse(format!(
            "Unexpected {:?} after expression",
            parser.current_token()
        )));
    }

    Ok(expr)
}

/// Token types
#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    CellRef(CellAddress),
    /// Function name with its raw argument text
    Call(String, String),

    Plus,
    Minus,
    Star,
    Slash,
    LeftParen,
    RightParen,

    Eof,
}

/// Formula parser
struct FormulaParser<'a> {
    input: &'a str,
    pos: usize,
    current_token: Token,
    nesting: usize,
}

impl<'a> FormulaParser<'a> {
    fn new(input: &'a str) -> FormulaResult<Self> {
        let mut parser = Self {
            input,
            pos: 0,
            current_token: Token::Eof,
            nesting: 0,
        };
        parser.advance_token()?;
        Ok(parser)
    }

    // === Token scanning ===

    fn advance_token(&mut self) -> FormulaResult<()> {
        self.current_token = self.scan_token()?;
        Ok(())
    }

    fn scan_token(&mut self) -> FormulaResult<Token> {
        self.skip_whitespace();

        let c = match self.peek_char() {
            Some(c) => c,
            None => return Ok(Token::Eof),
        };

        let single = match c {
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '*' => Some(Token::Star),
            '/' => Some(Token::Slash),
            '(' => Some(Token::LeftParen),
            ')' => Some(Token::RightParen),
            _ => None,
        };
        if let Some(token) = single {
            self.advance();
            return Ok(token);
        }

        if c.is_ascii_digit()
            || (c == '.' && self.peek_char_at(1).map_or(false, |c| c.is_ascii_digit()))
        {
            return self.scan_number();
        }

        if c.is_ascii_alphabetic() || c == '_' {
            return self.scan_identifier_or_ref();
        }

        Err(FormulaError::Parse(format!(
            "Unexpected character '{}' at position {}",
            c, self.pos
        )))
    }

    fn scan_number(&mut self) -> FormulaResult<Token> {
        let start = self.pos;

        // Integer part
        self.skip_digits();

        // Decimal part
        if self.peek_char() == Some('.') {
            self.advance();
            self.skip_digits();
        }

        // Exponent part, only when digits follow
        if self.peek_char().map_or(false, |c| c == 'e' || c == 'E') {
            let digit_offset = match self.peek_char_at(1) {
                Some('+') | Some('-') => 2,
                _ => 1,
            };
            if self
                .peek_char_at(digit_offset)
                .map_or(false, |c| c.is_ascii_digit())
            {
                for _ in 0..digit_offset {
                    self.advance();
                }
                self.skip_digits();
            }
        }

        let num_str = &self.input[start..self.pos];
        let num: f64 = num_str
            .parse()
            .map_err(|_| FormulaError::Parse(format!("Invalid number '{}'", num_str)))?;
        if !num.is_finite() {
            return Err(FormulaError::Parse(format!("Number out of range '{}'", num_str)));
        }
        Ok(Token::Number(num))
    }

    fn scan_identifier_or_ref(&mut self) -> FormulaResult<Token> {
        let input = self.input;
        let start = self.pos;

        while self
            .peek_char()
            .map_or(false, |c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
        {
            self.advance();
        }

        let text = &input[start..self.pos];

        // A name directly followed by '(' is a function call, even if it
        // looks like a cell reference (e.g. LOG10)
        if self.peek_char() == Some('(') {
            let args = self.scan_call_arguments()?;
            return Ok(Token::Call(text.to_ascii_uppercase(), args.to_string()));
        }

        CellAddress::parse(text)
            .map(Token::CellRef)
            .map_err(|_| FormulaError::Parse(format!("Unknown identifier '{}'", text)))
    }

    /// Capture the raw text between a call's parentheses, honoring nesting
    fn scan_call_arguments(&mut self) -> FormulaResult<&'a str> {
        let input = self.input;
        self.advance(); // Skip '('
        let start = self.pos;
        let mut depth = 0usize;

        while let Some(c) = self.peek_char() {
            match c {
                '(' => depth += 1,
                ')' if depth == 0 => {
                    let args = &input[start..self.pos];
                    self.advance();
                    return Ok(args);
                }
                ')' => depth -= 1,
                _ => {}
            }
            self.advance();
        }

        Err(FormulaError::Parse("Unclosed function call".into()))
    }

    // === Helper methods ===

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_at(&self, offset: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(offset)
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_digits(&mut self) {
        while self.peek_char().map_or(false, |c| c.is_ascii_digit()) {
            self.advance();
        }
    }

    fn skip_whitespace(&mut self) {
        while self.peek_char().map_or(false, |c| c.is_whitespace()) {
            self.advance();
        }
    }

    fn current_token(&self) -> &Token {
        &self.current_token
    }

    fn consume(&mut self) -> FormulaResult<Token> {
        let token = std::mem::replace(&mut self.current_token, Token::Eof);
        self.advance_token()?;
        Ok(token)
    }

    fn expect(&mut self, expected: &Token) -> FormulaResult<()> {
        if self.current_token() == expected {
            self.consume()?;
            Ok(())
        } else {
            Err(FormulaError::Parse(format!(
                "Expected {:?}, got {:?}",
                expected,
                self.current_token()
            )))
        }
    }

    fn enter(&mut self) -> FormulaResult<()> {
        self.nesting += 1;
        if self.nesting > MAX_NESTING {
            return Err(FormulaError::Parse(format!(
                "Formula nests deeper than {} levels",
                MAX_NESTING
            )));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.nesting -= 1;
    }

    fn tree_depth(depth: usize) -> FormulaResult<usize> {
        if depth > MAX_TREE_DEPTH {
            return Err(FormulaError::Parse(format!(
                "Formula is deeper than {} operations",
                MAX_TREE_DEPTH
            )));
        }
        Ok(depth)
    }

    // === Expression parsing with precedence ===

    fn parse_expression(&mut self) -> FormulaResult<Parsed> {
        self.parse_additive()
    }

    fn parse_additive(&mut self) -> FormulaResult<Parsed> {
        let (mut left, mut depth) = self.parse_multiplicative()?;

        loop {
            let op = match self.current_token() {
                Token::Plus => BinaryOperator::Add,
                Token::Minus => BinaryOperator::Subtract,
                _ => break,
            };

            self.consume()?;
            let (right, right_depth) = self.parse_multiplicative()?;
            depth = Self::tree_depth(depth.max(right_depth) + 1)?;
            left = FormulaExpr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok((left, depth))
    }

    fn parse_multiplicative(&mut self) -> FormulaResult<Parsed> {
        let (mut left, mut depth) = self.parse_unary()?;

        loop {
            let op = match self.current_token() {
                Token::Star => BinaryOperator::Multiply,
                Token::Slash => BinaryOperator::Divide,
                _ => break,
            };

            self.consume()?;
            let (right, right_depth) = self.parse_unary()?;
            depth = Self::tree_depth(depth.max(right_depth) + 1)?;
            left = FormulaExpr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok((left, depth))
    }

    fn parse_unary(&mut self) -> FormulaResult<Parsed> {
        match self.current_token() {
            Token::Minus => {
                self.enter()?;
                self.consume()?;
                let (operand, depth) = self.parse_unary()?;
                self.leave();
                let expr = FormulaExpr::UnaryOp {
                    op: UnaryOperator::Negate,
                    operand: Box::new(operand),
                };
                Ok((expr, Self::tree_depth(depth + 1)?))
            }
            // Prefix plus (no-op)
            Token::Plus => {
                self.enter()?;
                self.consume()?;
                let parsed = self.parse_unary()?;
                self.leave();
                Ok(parsed)
            }
            _ => self.parse_primary(),
        }
    }

    fn parse_primary(&mut self) -> FormulaResult<Parsed> {
        match self.current_token().clone() {
            Token::Number(n) => {
                self.consume()?;
                Ok((FormulaExpr::Number(n), 1))
            }

            Token::CellRef(address) => {
                self.consume()?;
                Ok((FormulaExpr::CellRef(address), 1))
            }

            Token::Call(name, args) => {
                self.consume()?;
                Ok((FormulaExpr::Function { name, args }, 1))
            }

            Token::LeftParen => {
                self.enter()?;
                self.consume()?;
                let parsed = self.parse_expression()?;
                self.expect(&Token::RightParen)?;
                self.leave();
                Ok(parsed)
            }

            other => Err(FormulaError::Parse(format!("Unexpected token: {:?}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn cell(s: &str) -> FormulaExpr {
        FormulaExpr::CellRef(CellAddress::parse(s).unwrap())
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_formula("=42").unwrap(), FormulaExpr::Number(42.0));
        assert_eq!(parse_formula("=3.14").unwrap(), FormulaExpr::Number(3.14));
        assert_eq!(parse_formula("=.5").unwrap(), FormulaExpr::Number(0.5));
        assert_eq!(parse_formula("=1e3").unwrap(), FormulaExpr::Number(1000.0));
        assert_eq!(parse_formula("=2.5E-1").unwrap(), FormulaExpr::Number(0.25));
    }

    #[test]
    fn test_parse_arithmetic_precedence() {
        // 1+(2*3)
        let ast = parse_formula("=1+2*3").unwrap();
        assert_eq!(
            ast,
            FormulaExpr::BinaryOp {
                op: BinaryOperator::Add,
                left: Box::new(FormulaExpr::Number(1.0)),
                right: Box::new(FormulaExpr::BinaryOp {
                    op: BinaryOperator::Multiply,
                    left: Box::new(FormulaExpr::Number(2.0)),
                    right: Box::new(FormulaExpr::Number(3.0)),
                }),
            }
        );

        // (1-2)-3, left associative
        let ast = parse_formula("=1-2-3").unwrap();
        if let FormulaExpr::BinaryOp { op, left, right } = ast {
            assert_eq!(op, BinaryOperator::Subtract);
            assert!(matches!(*left, FormulaExpr::BinaryOp { .. }));
            assert_eq!(*right, FormulaExpr::Number(3.0));
        } else {
            panic!("Expected BinaryOp");
        }
    }

    #[test]
    fn test_parse_unary() {
        assert_eq!(
            parse_formula("=-A1").unwrap(),
            FormulaExpr::UnaryOp {
                op: UnaryOperator::Negate,
                operand: Box::new(cell("A1")),
            }
        );
        assert_eq!(parse_formula("=+5").unwrap(), FormulaExpr::Number(5.0));
        assert!(parse_formula("=--5").is_ok());
    }

    #[test]
    fn test_parse_cell_reference_case_insensitive() {
        assert_eq!(parse_formula("=b12").unwrap(), cell("B12"));
        assert_eq!(parse_formula("= AA3 ").unwrap(), cell("AA3"));
    }

    #[test]
    fn test_parse_function_keeps_raw_args() {
        assert_eq!(
            parse_formula("=sum(A1:A3, B1)").unwrap(),
            FormulaExpr::Function {
                name: "SUM".into(),
                args: "A1:A3, B1".into(),
            }
        );

        // Nested parentheses stay inside the argument text
        assert_eq!(
            parse_formula("=SUM(A1,(B2))").unwrap(),
            FormulaExpr::Function {
                name: "SUM".into(),
                args: "A1,(B2)".into(),
            }
        );

        assert_eq!(
            parse_formula("=LOG10(5)").unwrap(),
            FormulaExpr::Function {
                name: "LOG10".into(),
                args: "5".into(),
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_formula("1+2").is_err());
        assert!(parse_formula("=").is_err());
        assert!(parse_formula("=A1+*2").is_err());
        assert!(parse_formula("=(1+2").is_err());
        assert!(parse_formula("=1+2)").is_err());
        assert!(parse_formula("=1 2").is_err());
        assert!(parse_formula("=SUM(A1").is_err());
        assert!(parse_formula("=foo").is_err());
        assert!(parse_formula("=A0").is_err());
        assert!(parse_formula("=$A$1").is_err());
        assert!(parse_formula("=1^2").is_err());
        assert!(parse_formula("=\"text\"").is_err());
        assert!(parse_formula("=1e999").is_err());
    }

    #[test]
    fn test_parse_nesting_limit() {
        let nested = |n: usize| format!("={}1{}", "(".repeat(n), ")".repeat(n));
        assert_eq!(parse_formula(&nested(100)).unwrap(), FormulaExpr::Number(1.0));
        assert!(parse_formula(&nested(MAX_NESTING + 1)).is_err());
        assert!(parse_formula(&nested(100_000)).is_err());

        let signs = |sign: &str, n: usize| format!("={}1", sign.repeat(n));
        assert!(parse_formula(&signs("-", 100)).is_ok());
        assert!(parse_formula(&signs("-", 100_000)).is_err());
        assert!(parse_formula(&signs("+", 100_000)).is_err());
    }

    #[test]
    fn test_parse_chain_limit() {
        let chain = |n: usize| format!("=1{}", "+1".repeat(n));
        assert!(parse_formula(&chain(500)).is_ok());
        assert!(parse_formula(&chain(MAX_TREE_DEPTH)).is_err());
        assert!(parse_formula(&chain(100_000)).is_err());
    }
}
