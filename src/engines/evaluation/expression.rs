use crate::error::{BitgaError, EvaluationError, Result};
use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

/// Source text of the fixed objective: `((x^3)/100) * sin(x) + (x^2) * cos(x)`
pub const DEFAULT_FORMULA: &str = "((x^3)/100) * sin(x) + (x^2) * cos(x)";

/// Single-argument functions a formula may call.
///
/// Anything not listed here is rejected at parse time, so a formula can never
/// reach beyond plain arithmetic on `x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Exp,
    Ln,
    Log10,
    Log2,
    Sqrt,
    Abs,
    Floor,
    Ceil,
}

impl Function {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "sin" => Function::Sin,
            "cos" => Function::Cos,
            "tan" => Function::Tan,
            "asin" => Function::Asin,
            "acos" => Function::Acos,
            "atan" => Function::Atan,
            "sinh" => Function::Sinh,
            "cosh" => Function::Cosh,
            "tanh" => Function::Tanh,
            "exp" => Function::Exp,
            // `log` is the natural logarithm, as in most symbolic math packages
            "ln" | "log" => Function::Ln,
            "log10" => Function::Log10,
            "log2" => Function::Log2,
            "sqrt" => Function::Sqrt,
            "abs" => Function::Abs,
            "floor" => Function::Floor,
            "ceil" => Function::Ceil,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Tan => "tan",
            Function::Asin => "asin",
            Function::Acos => "acos",
            Function::Atan => "atan",
            Function::Sinh => "sinh",
            Function::Cosh => "cosh",
            Function::Tanh => "tanh",
            Function::Exp => "exp",
            Function::Ln => "ln",
            Function::Log10 => "log10",
            Function::Log2 => "log2",
            Function::Sqrt => "sqrt",
            Function::Abs => "abs",
            Function::Floor => "floor",
            Function::Ceil => "ceil",
        }
    }

    fn apply(self, arg: f64) -> std::result::Result<f64, EvaluationError> {
        let domain = |ok: bool, value: f64| {
            if ok {
                Ok(value)
            } else {
                Err(EvaluationError::Domain { function: self.name(), arg })
            }
        };

        match self {
            Function::Sin => Ok(arg.sin()),
            Function::Cos => Ok(arg.cos()),
            Function::Tan => Ok(arg.tan()),
            Function::Asin => domain((-1.0..=1.0).contains(&arg), arg.asin()),
            Function::Acos => domain((-1.0..=1.0).contains(&arg), arg.acos()),
            Function::Atan => Ok(arg.atan()),
            Function::Sinh => Ok(arg.sinh()),
            Function::Cosh => Ok(arg.cosh()),
            Function::Tanh => Ok(arg.tanh()),
            Function::Exp => Ok(arg.exp()),
            Function::Ln => domain(arg > 0.0, arg.ln()),
            Function::Log10 => domain(arg > 0.0, arg.log10()),
            Function::Log2 => domain(arg > 0.0, arg.log2()),
            Function::Sqrt => domain(arg >= 0.0, arg.sqrt()),
            Function::Abs => Ok(arg.abs()),
            Function::Floor => Ok(arg.floor()),
            Function::Ceil => Ok(arg.ceil()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinaryOp {
    fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
        }
    }
}

/// Expression tree over the single free variable `x`
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Const(f64),
    Var,
    Neg(Box<Expr>),
    Call {
        function: Function,
        arg: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
}

impl Expr {
    pub fn eval(&self, x: f64) -> std::result::Result<f64, EvaluationError> {
        match self {
            Expr::Const(value) => Ok(*value),
            Expr::Var => Ok(x),
            Expr::Neg(inner) => Ok(-inner.eval(x)?),
            Expr::Call { function, arg } => function.apply(arg.eval(x)?),
            Expr::Binary { op, lhs, rhs } => {
                let a = lhs.eval(x)?;
                let b = rhs.eval(x)?;
                match op {
                    BinaryOp::Add => Ok(a + b),
                    BinaryOp::Sub => Ok(a - b),
                    BinaryOp::Mul => Ok(a * b),
                    BinaryOp::Div => {
                        if b == 0.0 {
                            Err(EvaluationError::DivisionByZero { x })
                        } else {
                            Ok(a / b)
                        }
                    }
                    BinaryOp::Pow => Ok(a.powf(b)),
                }
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Const(value) => write!(f, "{}", value),
            Expr::Var => write!(f, "x"),
            Expr::Neg(inner) => write!(f, "-({})", inner),
            Expr::Call { function, arg } => write!(f, "{}({})", function.name(), arg),
            Expr::Binary { op, lhs, rhs } => write!(f, "({} {} {})", lhs, op.symbol(), rhs),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
}

fn tokenize(source: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars: Peekable<Chars<'_>> = source.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '0'..='9' | '.' => tokens.push(Token::Number(read_number(&mut chars)?)),
            c if c.is_ascii_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        ident.push(c);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident));
            }
            '+' => {
                chars.next();
                tokens.push(Token::Plus);
            }
            '-' => {
                chars.next();
                tokens.push(Token::Minus);
            }
            '*' => {
                chars.next();
                if chars.peek() == Some(&'*') {
                    chars.next();
                    tokens.push(Token::Caret);
                } else {
                    tokens.push(Token::Star);
                }
            }
            '/' => {
                chars.next();
                tokens.push(Token::Slash);
            }
            '^' => {
                chars.next();
                tokens.push(Token::Caret);
            }
            '(' => {
                chars.next();
                tokens.push(Token::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Token::RParen);
            }
            other => {
                return Err(BitgaError::Formula(format!(
                    "unexpected character '{}'",
                    other
                )))
            }
        }
    }

    Ok(tokens)
}

fn read_number(chars: &mut Peekable<Chars<'_>>) -> Result<f64> {
    let mut text = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_ascii_digit() || c == '.' {
            text.push(c);
            chars.next();
        } else {
            break;
        }
    }

    // Scientific notation: 1e-3, 2.5E4
    if matches!(chars.peek(), Some('e') | Some('E')) {
        let mut lookahead = chars.clone();
        lookahead.next();
        let mut exponent = String::from("e");
        if let Some(&sign) = lookahead.peek() {
            if sign == '+' || sign == '-' {
                exponent.push(sign);
                lookahead.next();
            }
        }
        if lookahead.peek().is_some_and(|c| c.is_ascii_digit()) {
            while let Some(&c) = lookahead.peek() {
                if c.is_ascii_digit() {
                    exponent.push(c);
                    lookahead.next();
                } else {
                    break;
                }
            }
            text.push_str(&exponent);
            *chars = lookahead;
        }
    }

    text.parse::<f64>()
        .map_err(|_| BitgaError::Formula(format!("invalid number literal '{}'", text)))
}

/// Deepest parenthesis, call, sign or exponent nesting a formula may use
const MAX_NESTING: usize = 64;
/// Bounds the depth of left-leaning operator chains such as `x+x+...+x`
const MAX_TOKENS: usize = 4096;

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.depth >= MAX_NESTING {
            return Err(BitgaError::Formula(format!(
                "formula nests deeper than {} levels",
                MAX_NESTING
            )));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn expect(&mut self, expected: Token) -> Result<()> {
        match self.advance() {
            Some(token) if token == expected => Ok(()),
            Some(token) => Err(BitgaError::Formula(format!(
                "expected {:?}, found {:?}",
                expected, token
            ))),
            None => Err(BitgaError::Formula(format!(
                "expected {:?}, found end of input",
                expected
            ))),
        }
    }

    // expr := term (('+' | '-') term)*
    fn expression(&mut self) -> Result<Expr> {
        let mut lhs = self.term()?;
        loop {
            let op = match self.peek() {
                Some(Token::Plus) => BinaryOp::Add,
                Some(Token::Minus) => BinaryOp::Sub,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.term()?;
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
    }

    // term := unary (('*' | '/') unary)*
    fn term(&mut self) -> Result<Expr> {
        let mut lhs = self.unary()?;
        loop {
            let op = match self.peek() {
                Some(Token::Star) => BinaryOp::Mul,
                Some(Token::Slash) => BinaryOp::Div,
                _ => return Ok(lhs),
            };
            self.advance();
            let rhs = self.unary()?;
            lhs = Expr::Binary { op, lhs: Box::new(lhs), rhs: Box::new(rhs) };
        }
    }

    // Unary minus binds looser than '^', so -x^2 == -(x^2)
    fn unary(&mut self) -> Result<Expr> {
        match self.peek() {
            Some(Token::Minus) => {
                self.advance();
                let operand = self.nested(Self::unary)?;
                Ok(Expr::Neg(Box::new(operand)))
            }
            Some(Token::Plus) => {
                self.advance();
                self.nested(Self::unary)
            }
            _ => self.power(),
        }
    }

    // power := primary ('^' unary)?, right-associative
    fn power(&mut self) -> Result<Expr> {
        let base = self.primary()?;
        if self.peek() == Some(&Token::Caret) {
            self.advance();
            let exponent = self.nested(Self::unary)?;
            return Ok(Expr::Binary {
                op: BinaryOp::Pow,
                lhs: Box::new(base),
                rhs: Box::new(exponent),
            });
        }
        Ok(base)
    }

    fn primary(&mut self) -> Result<Expr> {
        match self.advance() {
            Some(Token::Number(value)) => Ok(Expr::Const(value)),
            Some(Token::LParen) => {
                let inner = self.nested(Self::expression)?;
                self.expect(Token::RParen)?;
                Ok(inner)
            }
            Some(Token::Ident(name)) => match name.as_str() {
                "x" => Ok(Expr::Var),
                "pi" => Ok(Expr::Const(std::f64::consts::PI)),
                "e" => Ok(Expr::Const(std::f64::consts::E)),
                _ => {
                    let function = Function::from_name(&name).ok_or_else(|| {
                        BitgaError::Formula(format!("unknown symbol '{}'", name))
                    })?;
                    self.expect(Token::LParen)?;
                    let arg = self.nested(Self::expression)?;
                    self.expect(Token::RParen)?;
                    Ok(Expr::Call { function, arg: Box::new(arg) })
                }
            },
            Some(token) => Err(BitgaError::Formula(format!("unexpected token {:?}", token))),
            None => Err(BitgaError::Formula("unexpected end of input".to_string())),
        }
    }
}

/// A parsed single-variable formula
#[derive(Debug, Clone)]
pub struct Formula {
    source: String,
    root: Expr,
}

impl Formula {
    pub fn parse(source: &str) -> Result<Self> {
        let tokens = tokenize(source)?;
        if tokens.is_empty() {
            return Err(BitgaError::Formula("formula is empty".to_string()));
        }
        if tokens.len() > MAX_TOKENS {
            return Err(BitgaError::Formula(format!(
                "formula has {} tokens, at most {} are allowed",
                tokens.len(),
                MAX_TOKENS
            )));
        }

        let mut parser = Parser { tokens, pos: 0, depth: 0 };
        let root = parser.expression()?;
        if let Some(token) = parser.peek() {
            return Err(BitgaError::Formula(format!(
                "unexpected trailing token {:?}",
                token
            )));
        }

        Ok(Self { source: source.trim().to_string(), root })
    }

    /// The fixed objective the search targets unless configured otherwise
    pub fn default_objective() -> Self {
        Self {
            source: DEFAULT_FORMULA.to_string(),
            root: default_expr(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn as_expr(&self) -> &Expr {
        &self.root
    }
}

// Built by hand so the default objective needs no fallible parse
fn default_expr() -> Expr {
    let pow = |exp: f64| Expr::Binary {
        op: BinaryOp::Pow,
        lhs: Box::new(Expr::Var),
        rhs: Box::new(Expr::Const(exp)),
    };
    let call = |function: Function| Expr::Call { function, arg: Box::new(Expr::Var) };
    let bin = |op: BinaryOp, lhs: Expr, rhs: Expr| Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    };

    bin(
        BinaryOp::Add,
        bin(
            BinaryOp::Mul,
            bin(BinaryOp::Div, pow(3.0), Expr::Const(100.0)),
            call(Function::Sin),
        ),
        bin(BinaryOp::Mul, pow(2.0), call(Function::Cos)),
    )
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(source: &str, x: f64) -> f64 {
        Formula::parse(source).unwrap().as_expr().eval(x).unwrap()
    }

    #[test]
    fn test_precedence_and_associativity() {
        assert_eq!(eval("1 + 2 * 3", 0.0), 7.0);
        assert_eq!(eval("(1 + 2) * 3", 0.0), 9.0);
        assert_eq!(eval("2 ^ 3 ^ 2", 0.0), 512.0);
        assert_eq!(eval("2 ** 3", 0.0), 8.0);
        assert_eq!(eval("10 - 4 - 3", 0.0), 3.0);
        assert_eq!(eval("-x^2", 3.0), -9.0);
        assert_eq!(eval("2^-1", 0.0), 0.5);
    }

    #[test]
    fn test_variables_constants_and_functions() {
        assert_eq!(eval("x * 2", 4.5), 9.0);
        assert!((eval("cos(pi)", 0.0) + 1.0).abs() < 1e-12);
        assert!((eval("ln(e)", 0.0) - 1.0).abs() < 1e-12);
        assert_eq!(eval("sqrt(abs(x))", -16.0), 4.0);
        assert_eq!(eval("1e2 + 2.5E-1", 0.0), 100.25);
    }

    #[test]
    fn test_default_objective_matches_parsed_source() {
        let parsed = Formula::parse(DEFAULT_FORMULA).unwrap();
        let built = Formula::default_objective();
        for x in [-4.0, -1.3, 0.0, 0.7, 2.2, 4.0] {
            let a = parsed.as_expr().eval(x).unwrap();
            let b = built.as_expr().eval(x).unwrap();
            assert!((a - b).abs() < 1e-12, "mismatch at {}: {} vs {}", x, a, b);
            let expected = (x * x * x / 100.0) * x.sin() + x * x * x.cos();
            assert!((a - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(Formula::parse(""), Err(BitgaError::Formula(_))));
        assert!(matches!(Formula::parse("x +"), Err(BitgaError::Formula(_))));
        assert!(matches!(Formula::parse("(x"), Err(BitgaError::Formula(_))));
        assert!(matches!(Formula::parse("y * 2"), Err(BitgaError::Formula(_))));
        assert!(matches!(Formula::parse("system(x)"), Err(BitgaError::Formula(_))));
        assert!(matches!(Formula::parse("x $ 2"), Err(BitgaError::Formula(_))));
        assert!(matches!(Formula::parse("x x"), Err(BitgaError::Formula(_))));
    }

    #[test]
    fn test_deep_nesting_is_rejected() {
        let parens = format!("{}x{}", "(".repeat(10_000), ")".repeat(10_000));
        assert!(matches!(Formula::parse(&parens), Err(BitgaError::Formula(_))));

        let signs = format!("{}x", "-".repeat(10_000));
        assert!(matches!(Formula::parse(&signs), Err(BitgaError::Formula(_))));

        let calls = format!("{}x{}", "sin(".repeat(1_000), ")".repeat(1_000));
        assert!(matches!(Formula::parse(&calls), Err(BitgaError::Formula(_))));

        let powers = vec!["2"; 1_000].join("^");
        assert!(matches!(Formula::parse(&powers), Err(BitgaError::Formula(_))));

        let chain = vec!["x"; 10_000].join("+");
        assert!(matches!(Formula::parse(&chain), Err(BitgaError::Formula(_))));

        // moderate nesting still parses
        let shallow = format!("{}x{}", "(".repeat(40), ")".repeat(40));
        assert_eq!(eval(&shallow, 3.0), 3.0);
        assert_eq!(eval("--x", 2.0), 2.0);
    }

    #[test]
    fn test_evaluation_errors() {
        let div = Formula::parse("1 / x").unwrap();
        assert_eq!(
            div.as_expr().eval(0.0),
            Err(EvaluationError::DivisionByZero { x: 0.0 })
        );

        let ln = Formula::parse("ln(x)").unwrap();
        assert!(matches!(
            ln.as_expr().eval(-1.0),
            Err(EvaluationError::Domain { function: "ln", .. })
        ));
    }
}
