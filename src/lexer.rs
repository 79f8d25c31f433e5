use lazy_static::lazy_static;
use regex::Regex;

#[derive(Debug, PartialEq, Clone)]
pub enum Token {
    Def,
    Extern,
    Delimiter,
    OpenParen,
    CloseParen,
    Comma,
    Ident(String),
    Operator(char),
    Number(f64),
}

lazy_static! {
    static ref IGNORE_RE: Regex = Regex::new(r"(?m)#.*$").unwrap();
    static ref TOKEN_RE: Regex = Regex::new(&[
        r"(?P<ident>[A-Za-z][A-Za-z0-9]*)",
        r"(?P<number>[0-9.]+)",
        r"(?P<delimiter>;)",
        r"(?P<oppar>\()",
        r"(?P<clpar>\))",
        r"(?P<comma>,)",
        r"(?P<operator>\S)"
    ].join("|"))
    .unwrap();
}

fn preprocess(input: &str) -> String {
    IGNORE_RE.replace_all(input, "").to_string()
}

/// Convert a maximal `[0-9.]+` run to a value. A run with a malformed dot
/// arrangement (`1.2.3`) is coerced to its longest valid prefix, the way
/// `strtod` would; a run with no valid prefix (`.`) is 0.0.
fn parse_number_lossy(text: &str) -> f64 {
    text.parse().unwrap_or_else(|_| {
        let mut end = text.len();
        while end > 0 {
            if let Ok(n) = text[..end].parse() {
                return n;
            }
            end -= 1;
        }
        0.0
    })
}

/// lex the given input string - returns a stack, so first-on last-off
pub fn lex(input: &str) -> Vec<Token> {
    let preprocessed = preprocess(input);

    let mut res = Vec::new();
    for cap in TOKEN_RE.captures_iter(&preprocessed) {
        let token = if let Some(ident) = cap.name("ident") {
            match ident.as_str() {
                "def" => Token::Def,
                "extern" => Token::Extern,
                text => Token::Ident(text.to_string()),
            }
        } else if let Some(number) = cap.name("number") {
            Token::Number(parse_number_lossy(number.as_str()))
        } else if let Some(_) = cap.name("delimiter") {
            Token::Delimiter
        } else if let Some(_) = cap.name("oppar") {
            Token::OpenParen
        } else if let Some(_) = cap.name("clpar") {
            Token::CloseParen
        } else if let Some(_) = cap.name("comma") {
            Token::Comma
        } else if let Some(op) = cap.name("operator") {
            Token::Operator(op.as_str().chars().next().unwrap())
        } else {
            unreachable!("token regex has no other groups");
        };

        res.push(token);
    }
    res.reverse();
    res
}
