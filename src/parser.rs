use std::collections::HashMap;

use crate::ast::{ASTNode, Expression, Function, Prototype};
use crate::lexer::{lex, Token};

#[derive(Debug, PartialEq, Clone, thiserror::Error)]
pub enum ParserError {
    #[error("unknown token when expecting an expression")]
    ExpectedExpression,
    #[error("expected ')'")]
    MissingCloseParen,
    #[error("expected ')' or ',' in argument list")]
    MalformedArgumentList,
    #[error("expected function name in prototype")]
    ExpectedFunctionName,
    #[error("expected '(' in prototype")]
    MissingPrototypeOpenParen,
    #[error("expected ')' in prototype")]
    MissingPrototypeCloseParen,
}

pub type PartialParseResult = Result<Expression, ParserError>;

#[derive(Debug, Clone)]
pub struct Parser {
    pub operator_precedence: HashMap<char, u32>,
}

impl std::default::Default for Parser {
    fn default() -> Self {
        let mut operator_precedence = HashMap::new();
        operator_precedence.insert('*', 40);
        operator_precedence.insert('/', 40);
        operator_precedence.insert('+', 20);
        operator_precedence.insert('-', 20);
        Self {
            operator_precedence,
        }
    }
}

impl Parser {
    fn parse_number(&self, input: &mut Vec<Token>) -> PartialParseResult {
        if let Some(Token::Number(num)) = input.pop() {
            Ok(Expression::Number(num))
        } else {
            unreachable!("dispatched on a number token")
        }
    }

    /// identifier, or identifier '(' expression,* ')' for a call
    fn parse_identifier(&self, input: &mut Vec<Token>) -> PartialParseResult {
        let name = if let Some(Token::Ident(ident)) = input.pop() {
            ident
        } else {
            unreachable!("dispatched on an identifier token")
        };

        if input.last() != Some(&Token::OpenParen) {
            return Ok(Expression::Variable(name));
        }
        input.pop(); // eat '('

        let mut args = Vec::new();
        if input.last() != Some(&Token::CloseParen) {
            loop {
                args.push(self.parse_expr(input)?);

                match input.last() {
                    Some(Token::CloseParen) => break,
                    Some(Token::Comma) => {
                        input.pop();
                    }
                    _ => return Err(ParserError::MalformedArgumentList),
                }
            }
        }
        input.pop(); // eat ')'

        Ok(Expression::Call(name, args))
    }

    /// '(' expression ')' - the parentheses don't produce a node
    fn parse_nested(&self, input: &mut Vec<Token>) -> PartialParseResult {
        input.pop(); // eat '('
        let inner = self.parse_expr(input)?;
        if input.last() != Some(&Token::CloseParen) {
            return Err(ParserError::MissingCloseParen);
        }
        input.pop(); // eat ')'
        Ok(inner)
    }

    fn parse_primary(&self, input: &mut Vec<Token>) -> PartialParseResult {
        match input.last() {
            Some(Token::Number(_)) => self.parse_number(input),
            Some(Token::Ident(_)) => self.parse_identifier(input),
            Some(Token::OpenParen) => self.parse_nested(input),
            _ => Err(ParserError::ExpectedExpression),
        }
    }

    /// precedence climbing: fold (operator, primary) pairs into `lhs` while
    /// the operator binds at least as tightly as `expr_precedence`;
    /// equal-precedence operators associate left
    fn parse_rhs(
        &self,
        input: &mut Vec<Token>,
        expr_precedence: u32,
        mut lhs: Expression,
    ) -> PartialParseResult {
        loop {
            let (operator, precedence) = match input.last() {
                Some(&Token::Operator(op)) => match self.operator_precedence.get(&op) {
                    Some(&pr) if pr >= expr_precedence => (op, pr),
                    _ => return Ok(lhs),
                },
                _ => return Ok(lhs),
            };
            input.pop(); // eat the operator

            let mut rhs = self.parse_primary(input)?;

            // if the next operator binds tighter, it takes rhs as its lhs
            if let Some(&Token::Operator(next)) = input.last() {
                if let Some(&next_precedence) = self.operator_precedence.get(&next) {
                    if precedence < next_precedence {
                        rhs = self.parse_rhs(input, precedence + 1, rhs)?;
                    }
                }
            }

            lhs = Expression::Binary(operator, Box::new(lhs), Box::new(rhs));
        }
    }

    pub fn parse_expr(&self, input: &mut Vec<Token>) -> PartialParseResult {
        let lhs = self.parse_primary(input)?;
        self.parse_rhs(input, 0, lhs)
    }

    /// identifier '(' identifier* ')' - parameters are not comma-separated
    fn parse_prototype(&self, input: &mut Vec<Token>) -> Result<Prototype, ParserError> {
        let name = match input.last() {
            Some(Token::Ident(name)) => name.clone(),
            _ => return Err(ParserError::ExpectedFunctionName),
        };
        input.pop(); // eat the name

        if input.last() != Some(&Token::OpenParen) {
            return Err(ParserError::MissingPrototypeOpenParen);
        }
        input.pop(); // eat '('

        let mut args = Vec::new();
        while matches!(input.last(), Some(Token::Ident(_))) {
            if let Some(Token::Ident(arg)) = input.pop() {
                args.push(arg);
            }
        }

        if input.last() != Some(&Token::CloseParen) {
            return Err(ParserError::MissingPrototypeCloseParen);
        }
        input.pop(); // eat ')'

        Ok(Prototype { name, args })
    }

    /// 'def' prototype expression
    fn parse_definition(&self, input: &mut Vec<Token>) -> Result<Function, ParserError> {
        input.pop(); // eat 'def'
        let prototype = self.parse_prototype(input)?;
        let body = self.parse_expr(input)?;
        Ok(Function { prototype, body })
    }

    /// 'extern' prototype
    fn parse_extern(&self, input: &mut Vec<Token>) -> Result<Prototype, ParserError> {
        input.pop(); // eat 'extern'
        self.parse_prototype(input)
    }

    /// a bare expression becomes the body of an anonymous zero-arg function
    fn parse_top_level_expr(&self, input: &mut Vec<Token>) -> Result<Function, ParserError> {
        let body = self.parse_expr(input)?;
        let prototype = Prototype {
            name: String::new(),
            args: Vec::new(),
        };
        Ok(Function { prototype, body })
    }

    /// parse every top-level unit in the stack; a failed unit yields its
    /// error and the parse resumes one token past the failure point
    pub fn parse(&self, input: &mut Vec<Token>) -> Vec<Result<ASTNode, ParserError>> {
        let mut units = Vec::new();

        while let Some(token) = input.last() {
            let unit = match token {
                Token::Delimiter => {
                    input.pop();
                    continue;
                }
                Token::Def => self.parse_definition(input).map(ASTNode::Function),
                Token::Extern => self.parse_extern(input).map(ASTNode::Extern),
                _ => self.parse_top_level_expr(input).map(ASTNode::Function),
            };

            if unit.is_err() {
                input.pop(); // skip the offending token and resync
            }
            units.push(unit);
        }

        units
    }

    pub fn parse_str(&self, source: &str) -> Vec<Result<ASTNode, ParserError>> {
        let mut tokens = lex(source);
        self.parse(&mut tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse_single_expr(input: &str) -> Expression {
        let parser = Parser::default();
        let mut tokens = lex(input);
        let expr = parser.parse_expr(&mut tokens).unwrap();
        assert!(tokens.is_empty(), "expression did not consume all tokens");
        expr
    }

    fn number(value: f64) -> Box<Expression> {
        Box::new(Expression::Number(value))
    }

    #[test]
    fn parse_expr_works() {
        let res = parse_single_expr("x + 1 * (2 - 3)");
        let target = Expression::Binary(
            '+',
            Box::new(Expression::Variable("x".to_string())),
            Box::new(Expression::Binary(
                '*',
                number(1.0),
                Box::new(Expression::Binary('-', number(2.0), number(3.0))),
            )),
        );
        assert_eq!(res, target);
    }

    #[test]
    fn multiplication_binds_tighter() {
        assert_eq!(
            parse_single_expr("1+2*3"),
            Expression::Binary('+', number(1.0), Box::new(Expression::Binary('*', number(2.0), number(3.0)))),
        );
    }

    #[test]
    fn equal_precedence_associates_left() {
        assert_eq!(
            parse_single_expr("1-2-3"),
            Expression::Binary('-', Box::new(Expression::Binary('-', number(1.0), number(2.0))), number(3.0)),
        );
    }

    #[test]
    fn parentheses_override_precedence() {
        assert_eq!(
            parse_single_expr("(1+2)*3"),
            Expression::Binary('*', Box::new(Expression::Binary('+', number(1.0), number(2.0))), number(3.0)),
        );
    }

    #[test]
    fn zero_argument_call_is_a_call() {
        assert_eq!(
            parse_single_expr("f()"),
            Expression::Call("f".to_string(), vec![])
        );
    }

    #[test]
    fn call_arguments_are_full_expressions() {
        assert_eq!(
            parse_single_expr("f(1, x+2)"),
            Expression::Call(
                "f".to_string(),
                vec![
                    Expression::Number(1.0),
                    Expression::Binary(
                        '+',
                        Box::new(Expression::Variable("x".to_string())),
                        number(2.0)
                    ),
                ]
            )
        );
    }

    fn eval(expr: &Expression) -> f64 {
        match expr {
            Expression::Number(value) => *value,
            Expression::Binary(op, lhs, rhs) => {
                let (lhs, rhs) = (eval(lhs), eval(rhs));
                match op {
                    '+' => lhs + rhs,
                    '-' => lhs - rhs,
                    '*' => lhs * rhs,
                    '/' => lhs / rhs,
                    op => panic!("unknown operator {}", op),
                }
            }
            expr => panic!("not a constant expression: {:?}", expr),
        }
    }

    #[test]
    fn arithmetic_matches_reference_evaluation() {
        for (input, expected) in [
            ("2*3+4/2-1", 2.0 * 3.0 + 4.0 / 2.0 - 1.0),
            ("8/4/2", 8.0 / 4.0 / 2.0),
            ("1+2*3-4", 1.0 + 2.0 * 3.0 - 4.0),
            ("(1+2)*(3-4)/5", (1.0 + 2.0) * (3.0 - 4.0) / 5.0),
        ]
        .iter()
        {
            assert_eq!(eval(&parse_single_expr(input)), *expected, "{}", input);
        }
    }

    #[test]
    fn parse_definition_works() {
        let parser = Parser::default();
        let units = parser.parse_str("def add(x y) x+y");
        let target = ASTNode::Function(Function {
            prototype: Prototype {
                name: "add".to_string(),
                args: vec!["x".to_string(), "y".to_string()],
            },
            body: Expression::Binary(
                '+',
                Box::new(Expression::Variable("x".to_string())),
                Box::new(Expression::Variable("y".to_string())),
            ),
        });
        assert_eq!(units, [Ok(target)]);
    }

    #[test]
    fn parse_extern_works() {
        let parser = Parser::default();
        let units = parser.parse_str("extern sin(x)");
        let target = ASTNode::Extern(Prototype {
            name: "sin".to_string(),
            args: vec!["x".to_string()],
        });
        assert_eq!(units, [Ok(target)]);
    }

    #[test]
    fn top_level_expression_gets_anonymous_prototype() {
        let parser = Parser::default();
        let units = parser.parse_str("4*2");
        let target = ASTNode::Function(Function {
            prototype: Prototype {
                name: String::new(),
                args: vec![],
            },
            body: Expression::Binary('*', number(4.0), number(2.0)),
        });
        assert_eq!(units, [Ok(target)]);
    }

    #[test]
    fn semicolons_separate_units() {
        let parser = Parser::default();
        let units = parser.parse_str("extern sin(x); def thing(x) sin(x) * x;");
        assert_eq!(units.len(), 2);
        assert!(units.iter().all(|unit| unit.is_ok()));
    }

    #[test]
    fn unterminated_paren_is_reported() {
        let parser = Parser::default();
        let units = parser.parse_str("(1+2");
        assert_eq!(units, [Err(ParserError::MissingCloseParen)]);
    }

    #[test]
    fn parse_recovers_after_a_failed_unit() {
        let parser = Parser::default();
        let units = parser.parse_str(") extern sin(x)");
        assert_eq!(units.len(), 2);
        assert_eq!(units[0], Err(ParserError::ExpectedExpression));
        assert_eq!(
            units[1],
            Ok(ASTNode::Extern(Prototype {
                name: "sin".to_string(),
                args: vec!["x".to_string()],
            }))
        );
    }

    #[test]
    fn malformed_argument_list_is_reported() {
        let parser = Parser::default();
        let units = parser.parse_str("f(1 2)");
        assert_eq!(units[0], Err(ParserError::MalformedArgumentList));
    }

    #[test]
    fn prototype_errors_are_reported() {
        let parser = Parser::default();
        assert_eq!(
            parser.parse_str("def 1(x) x")[0],
            Err(ParserError::ExpectedFunctionName)
        );
        assert_eq!(
            parser.parse_str("def f x")[0],
            Err(ParserError::MissingPrototypeOpenParen)
        );
        assert_eq!(
            parser.parse_str("def f(x")[0],
            Err(ParserError::MissingPrototypeCloseParen)
        );
    }

    #[test]
    fn parsing_is_deterministic() {
        let parser = Parser::default();
        let input = "def add(x y) x+y; extern sin(x); add(1, 2) * sin(3)";
        assert_eq!(parser.parse_str(input), parser.parse_str(input));
    }
}
