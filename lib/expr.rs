//! Symbolic phases: rational-linear expressions over named variables.
//!
//! A [`PhaseExpr`] is a sum *c*₁*x*₁ + *c*₂*x*₂ + … + *k* where each *cᵢ* is a
//! nonzero rational coefficient, each *xᵢ* a named variable, and *k* a concrete
//! [`Phase`]. Expressions without variables are concrete.
//!
//! Expressions can be written and read in a small text syntax:
//! ```
//! # use zx_rewrite::expr::PhaseExpr;
//! # use zx_rewrite::phase::Phase;
//! let ex: PhaseExpr = "a + 2b + 1/4".parse().unwrap();
//! assert_eq!(ex.to_string(), "a + 2b + 1/4");
//! assert_eq!(ex.constant_part(), Phase::new(1, 4));
//!
//! // `pi` is half a turn; plain numbers are fractions of a full turn
//! let ex: PhaseExpr = "3pi/4".parse().unwrap();
//! assert_eq!(ex.as_phase(), Some(Phase::new(3, 8)));
//! ```

use std::{ collections::BTreeMap, fmt, str::FromStr };
use num_rational::Rational64 as R64;
use num_traits::{ CheckedAdd, CheckedMul, One, Signed, Zero };
use thiserror::Error;
use crate::{ phase::Phase, rewrite::Assignment };

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ExprError {
    #[error("empty phase expression")]
    Empty,

    #[error("unexpected character {0:?} at position {1}")]
    UnexpectedChar(char, usize),

    #[error("unexpected {0} at position {1}")]
    UnexpectedToken(String, usize),

    #[error("unexpected end of phase expression")]
    UnexpectedEnd,

    #[error("number at position {0} is out of range")]
    Overflow(usize),

    #[error("division by zero at position {0}")]
    ZeroDenominator(usize),

    #[error("product at position {0} is not linear in its variables")]
    NonLinear(usize),

    #[error("division by a symbolic quantity at position {0}")]
    SymbolicDivisor(usize),
}
pub type ExprResult<T> = Result<T, ExprError>;

/// Return `true` if `name` may be used as a variable name.
///
/// Names must be identifiers (`[A-Za-z_][A-Za-z0-9_]*`) and may not be `pi`.
pub fn is_valid_var_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && name != "pi"
}

/// A phase given as a rational-linear expression in named variables.
///
/// Terms with zero coefficient are never stored and the constant term is
/// reduced modulo 2π, so structural equality is equality of expressions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct PhaseExpr {
    terms: BTreeMap<String, R64>,
    constant: Phase,
}

impl From<Phase> for PhaseExpr {
    fn from(ph: Phase) -> Self { Self::constant(ph) }
}

impl PhaseExpr {
    /// The zero phase.
    pub fn zero() -> Self { Self::default() }

    /// A concrete phase.
    pub fn constant(ph: Phase) -> Self {
        Self { terms: BTreeMap::new(), constant: ph }
    }

    /// A single variable with unit coefficient.
    pub fn var<S>(name: S) -> Self
    where S: Into<String>
    {
        Self::term(R64::one(), name)
    }

    /// A single variable with the given coefficient.
    pub fn term<S>(coeff: R64, name: S) -> Self
    where S: Into<String>
    {
        let mut terms = BTreeMap::new();
        if !coeff.is_zero() { terms.insert(name.into(), coeff); }
        Self { terms, constant: Phase::zero() }
    }

    /// Return `true` if the expression contains no variables.
    pub fn is_concrete(&self) -> bool { self.terms.is_empty() }

    /// Return `true` if the expression is exactly the zero phase.
    pub fn is_zero(&self) -> bool {
        self.terms.is_empty() && self.constant.is_zero()
    }

    /// Return the concrete value of the expression if it has no variables.
    pub fn as_phase(&self) -> Option<Phase> {
        self.is_concrete().then_some(self.constant)
    }

    /// Return the constant term.
    pub fn constant_part(&self) -> Phase { self.constant }

    /// Return the coefficient of a variable, zero if it does not appear.
    pub fn coeff(&self, name: &str) -> R64 {
        self.terms.get(name).copied().unwrap_or_else(R64::zero)
    }

    /// Return an iterator over all variables and their coefficients, in name
    /// order.
    pub fn terms(&self) -> impl Iterator<Item = (&str, R64)> + '_ {
        self.terms.iter().map(|(name, c)| (name.as_str(), *c))
    }

    /// Return an iterator over the names of all variables, in name order.
    pub fn free_vars(&self) -> impl Iterator<Item = &str> + '_ {
        self.terms.keys().map(|name| name.as_str())
    }

    /// If the expression is `c·x + k` for a single variable `x`, return `(x, c,
    /// k)`.
    pub fn as_single_var(&self) -> Option<(&str, R64, Phase)> {
        let mut iter = self.terms.iter();
        match (iter.next(), iter.next()) {
            (Some((name, c)), None) => Some((name.as_str(), *c, self.constant)),
            _ => None,
        }
    }

    /// Replace every variable with a value in `asg` by that value.
    ///
    /// Variables without a value are left in place.
    pub fn substitute(&self, asg: &Assignment) -> Self {
        self.substitute_with(|name| asg.get(name).cloned())
    }

    /// Replace every variable for which `lookup` returns `Some` by the returned
    /// expression.
    pub fn substitute_with<F>(&self, mut lookup: F) -> Self
    where F: FnMut(&str) -> Option<PhaseExpr>
    {
        let mut acc = Linear::constant(self.constant.turns());
        for (name, c) in self.terms.iter() {
            match lookup(name) {
                Some(value) => acc.add_scaled(&Linear::from(&value), *c),
                None => acc.add_term(name, *c),
            }
        }
        acc.into()
    }
}

impl fmt::Display for PhaseExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, c) in self.terms.iter() {
            let neg = *c < R64::zero();
            let mag = c.abs();
            match (first, neg) {
                (true, false) => { },
                (true, true) => { write!(f, "-")?; },
                (false, false) => { write!(f, " + ")?; },
                (false, true) => { write!(f, " - ")?; },
            }
            if mag.is_one() {
                write!(f, "{}", name)?;
            } else if mag.is_integer() {
                write!(f, "{}{}", mag, name)?;
            } else {
                write!(f, "{}*{}", mag, name)?;
            }
            first = false;
        }
        if first {
            write!(f, "{}", self.constant)
        } else if !self.constant.is_zero() {
            write!(f, " + {}", self.constant)
        } else {
            Ok(())
        }
    }
}

impl FromStr for PhaseExpr {
    type Err = ExprError;

    fn from_str(s: &str) -> ExprResult<Self> {
        let tokens = lex(s)?;
        if tokens.is_empty() { return Err(ExprError::Empty); }
        let mut parser = Parser { tokens: &tokens, pos: 0 };
        let lin = parser.expr()?;
        match parser.peek() {
            None => Ok(lin.into()),
            Some((tok, at)) => Err(ExprError::UnexpectedToken(tok.describe(), at)),
        }
    }
}

impl std::ops::Neg for PhaseExpr {
    type Output = PhaseExpr;

    fn neg(self) -> Self::Output {
        let mut lin = Linear::from(&self);
        lin.scale(-R64::one());
        lin.into()
    }
}

macro_rules! impl_addsub_expr {
    ( $trait:ident, $fun:ident, $sign:expr ) => {
        impl std::ops::$trait<PhaseExpr> for PhaseExpr {
            type Output = PhaseExpr;

            fn $fun(self, rhs: PhaseExpr) -> Self::Output {
                let mut lin = Linear::from(&self);
                lin.add_scaled(&Linear::from(&rhs), $sign);
                lin.into()
            }
        }

        impl std::ops::$trait<Phase> for PhaseExpr {
            type Output = PhaseExpr;

            fn $fun(self, rhs: Phase) -> Self::Output {
                std::ops::$trait::$fun(self, PhaseExpr::constant(rhs))
            }
        }
    }
}
impl_addsub_expr!(Add, add, R64::one());
impl_addsub_expr!(Sub, sub, -R64::one());

impl std::ops::Mul<R64> for PhaseExpr {
    type Output = PhaseExpr;

    fn mul(self, rhs: R64) -> Self::Output {
        let mut lin = Linear::from(&self);
        lin.scale(rhs);
        lin.into()
    }
}

impl std::ops::Mul<i64> for PhaseExpr {
    type Output = PhaseExpr;

    fn mul(self, rhs: i64) -> Self::Output { self * R64::from_integer(rhs) }
}

// unreduced linear form used internally where reduction modulo 2π would break
// exactness (elimination, parsing)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Linear {
    pub(crate) terms: BTreeMap<String, R64>,
    pub(crate) constant: R64,
}

impl From<&PhaseExpr> for Linear {
    fn from(ex: &PhaseExpr) -> Self {
        Self { terms: ex.terms.clone(), constant: ex.constant.turns() }
    }
}

impl From<Linear> for PhaseExpr {
    fn from(lin: Linear) -> Self {
        let Linear { mut terms, constant } = lin;
        terms.retain(|_, c| !c.is_zero());
        Self { terms, constant: constant.into() }
    }
}

impl Linear {
    pub(crate) fn constant(k: R64) -> Self {
        Self { terms: BTreeMap::new(), constant: k }
    }

    pub(crate) fn is_constant(&self) -> bool {
        self.terms.values().all(|c| c.is_zero())
    }

    pub(crate) fn add_term(&mut self, name: &str, c: R64) {
        let entry = self.terms.entry(name.to_string()).or_insert_with(R64::zero);
        *entry += c;
        if entry.is_zero() { self.terms.remove(name); }
    }

    // self += k * other
    pub(crate) fn add_scaled(&mut self, other: &Linear, k: R64) {
        if k.is_zero() { return; }
        other.terms.iter()
            .for_each(|(name, c)| { self.add_term(name, *c * k); });
        self.constant += other.constant * k;
    }

    pub(crate) fn scale(&mut self, k: R64) {
        if k.is_zero() {
            self.terms.clear();
            self.constant = R64::zero();
        } else {
            self.terms.values_mut().for_each(|c| { *c *= k; });
            self.constant *= k;
        }
    }

    // checked versions of the above for caller-supplied numbers; `None` on
    // overflow, after which `self` must be discarded

    pub(crate) fn try_add_term(&mut self, name: &str, c: R64) -> Option<()> {
        let entry = self.terms.entry(name.to_string()).or_insert_with(R64::zero);
        *entry = entry.checked_add(&c)?;
        if entry.is_zero() { self.terms.remove(name); }
        Some(())
    }

    pub(crate) fn try_add_scaled(&mut self, other: &Linear, k: R64)
        -> Option<()>
    {
        if k.is_zero() { return Some(()); }
        for (name, c) in other.terms.iter() {
            self.try_add_term(name, c.checked_mul(&k)?)?;
        }
        self.constant = self.constant.checked_add(&other.constant.checked_mul(&k)?)?;
        Some(())
    }

    pub(crate) fn try_scale(&mut self, k: R64) -> Option<()> {
        if k.is_zero() {
            self.scale(k);
            return Some(());
        }
        for c in self.terms.values_mut() {
            *c = c.checked_mul(&k)?;
        }
        self.constant = self.constant.checked_mul(&k)?;
        Some(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Token {
    Int(i64),
    Ident(String),
    Pi,
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Self::Int(n) => format!("integer {}", n),
            Self::Ident(s) => format!("name '{}'", s),
            Self::Pi => "'pi'".to_string(),
            Self::Plus => "'+'".to_string(),
            Self::Minus => "'-'".to_string(),
            Self::Star => "'*'".to_string(),
            Self::Slash => "'/'".to_string(),
            Self::LParen => "'('".to_string(),
            Self::RParen => "')'".to_string(),
        }
    }

    fn starts_factor(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Ident(_) | Self::Pi | Self::LParen)
    }
}

fn lex(s: &str) -> ExprResult<Vec<(Token, usize)>> {
    let chars: Vec<(usize, char)> = s.char_indices().collect();
    let mut tokens: Vec<(Token, usize)> = Vec::new();
    let mut k: usize = 0;
    while let Some(&(at, c)) = chars.get(k) {
        if c.is_whitespace() {
            k += 1;
            continue;
        }
        let single = match c {
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '*' => Some(Token::Star),
            '/' => Some(Token::Slash),
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            _ => None,
        };
        if let Some(tok) = single {
            tokens.push((tok, at));
            k += 1;
        } else if c.is_ascii_digit() {
            let start = k;
            while chars.get(k).is_some_and(|(_, c)| c.is_ascii_digit()) {
                k += 1;
            }
            let end = chars.get(k).map(|(i, _)| *i).unwrap_or(s.len());
            let n: i64 = s[at..end].parse()
                .map_err(|_| ExprError::Overflow(chars[start].0))?;
            tokens.push((Token::Int(n), at));
        } else if c.is_ascii_alphabetic() || c == '_' || c == 'π' {
            if c == 'π' {
                tokens.push((Token::Pi, at));
                k += 1;
                continue;
            }
            while chars.get(k)
                .is_some_and(|(_, c)| c.is_ascii_alphanumeric() || *c == '_')
            {
                k += 1;
            }
            let end = chars.get(k).map(|(i, _)| *i).unwrap_or(s.len());
            let word = &s[at..end];
            if word == "pi" {
                tokens.push((Token::Pi, at));
            } else {
                tokens.push((Token::Ident(word.to_string()), at));
            }
        } else {
            return Err(ExprError::UnexpectedChar(c, at));
        }
    }
    Ok(tokens)
}

// expr   := ['+'|'-'] term (('+'|'-') term)*
// term   := factor (['*'|'/'] factor)*
// factor := INT | NAME | 'pi' | '(' expr ')'
struct Parser<'a> {
    tokens: &'a [(Token, usize)],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<(&'a Token, usize)> {
        self.tokens.get(self.pos).map(|(tok, at)| (tok, *at))
    }

    fn bump(&mut self) -> Option<(&'a Token, usize)> {
        let next = self.peek();
        if next.is_some() { self.pos += 1; }
        next
    }

    fn expr(&mut self) -> ExprResult<Linear> {
        let mut acc =
            match self.peek() {
                Some((Token::Minus, at)) => {
                    self.bump();
                    let mut neg = self.term()?;
                    neg.try_scale(-R64::one()).ok_or(ExprError::Overflow(at))?;
                    neg
                },
                Some((Token::Plus, _)) => {
                    self.bump();
                    self.term()?
                },
                _ => self.term()?,
            };
        loop {
            let (sign, at) = match self.peek() {
                Some((Token::Plus, at)) => (R64::one(), at),
                Some((Token::Minus, at)) => (-R64::one(), at),
                _ => { return Ok(acc); },
            };
            self.bump();
            let rhs = self.term()?;
            acc.try_add_scaled(&rhs, sign).ok_or(ExprError::Overflow(at))?;
        }
    }

    fn term(&mut self) -> ExprResult<Linear> {
        let mut acc = self.factor()?;
        loop {
            match self.peek() {
                Some((Token::Star, at)) => {
                    self.bump();
                    let rhs = self.factor()?;
                    acc = mul(acc, rhs, at)?;
                },
                Some((Token::Slash, at)) => {
                    self.bump();
                    let rhs = self.factor()?;
                    if !rhs.is_constant() {
                        return Err(ExprError::SymbolicDivisor(at));
                    }
                    if rhs.constant.is_zero() {
                        return Err(ExprError::ZeroDenominator(at));
                    }
                    acc.try_scale(rhs.constant.recip())
                        .ok_or(ExprError::Overflow(at))?;
                },
                // juxtaposition, as in `2a` or `3pi`
                Some((tok, at)) if tok.starts_factor() => {
                    let rhs = self.factor()?;
                    acc = mul(acc, rhs, at)?;
                },
                _ => { return Ok(acc); },
            }
        }
    }

    fn factor(&mut self) -> ExprResult<Linear> {
        match self.bump() {
            Some((Token::Int(n), _)) => Ok(Linear::constant(R64::from_integer(*n))),
            Some((Token::Pi, _)) => Ok(Linear::constant(R64::new(1, 2))),
            Some((Token::Ident(name), _)) => {
                let mut lin = Linear::default();
                lin.add_term(name, R64::one());
                Ok(lin)
            },
            Some((Token::LParen, _)) => {
                let inner = self.expr()?;
                match self.bump() {
                    Some((Token::RParen, _)) => Ok(inner),
                    Some((tok, at)) => {
                        Err(ExprError::UnexpectedToken(tok.describe(), at))
                    },
                    None => Err(ExprError::UnexpectedEnd),
                }
            },
            Some((tok, at)) => Err(ExprError::UnexpectedToken(tok.describe(), at)),
            None => Err(ExprError::UnexpectedEnd),
        }
    }
}

fn mul(a: Linear, b: Linear, at: usize) -> ExprResult<Linear> {
    let (k, mut lin) =
        match (a.is_constant(), b.is_constant()) {
            (true, _) => (a.constant, b),
            (false, true) => (b.constant, a),
            (false, false) => { return Err(ExprError::NonLinear(at)); },
        };
    lin.try_scale(k).ok_or(ExprError::Overflow(at))?;
    Ok(lin)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> PhaseExpr { s.parse().unwrap() }

    #[test]
    fn parse_linear() {
        let ex = parse("a + 2b + 1/4");
        assert_eq!(ex.coeff("a"), R64::one());
        assert_eq!(ex.coeff("b"), R64::from_integer(2));
        assert_eq!(ex.coeff("c"), R64::zero());
        assert_eq!(ex.constant_part(), Phase::new(1, 4));
        assert_eq!(ex.free_vars().collect::<Vec<_>>(), vec!["a", "b"]);

        assert_eq!(parse("-a + a"), PhaseExpr::zero());
        assert_eq!(parse("2 * (a - 1/8)"), PhaseExpr::term(R64::from_integer(2), "a") + Phase::new(3, 4));
        assert_eq!(parse("a/2"), PhaseExpr::term(R64::new(1, 2), "a"));
        assert_eq!(parse("1/2a"), PhaseExpr::term(R64::new(1, 2), "a"));
        assert_eq!(parse("x_1 - y"), PhaseExpr::var("x_1") - PhaseExpr::var("y"));
    }

    #[test]
    fn parse_pi() {
        assert_eq!(parse("pi").as_phase(), Some(Phase::pi()));
        assert_eq!(parse("π/4").as_phase(), Some(Phase::pi4()));
        assert_eq!(parse("3pi/4").as_phase(), Some(Phase::new(3, 8)));
        assert_eq!(parse("a + pi/2"), PhaseExpr::var("a") + Phase::pi2());
        assert_eq!(parse("5/4").as_phase(), Some(Phase::new(1, 4)));
        assert_eq!(parse("0").as_phase(), Some(Phase::zero()));
    }

    #[test]
    fn parse_errors() {
        assert_eq!("".parse::<PhaseExpr>(), Err(ExprError::Empty));
        assert_eq!("a +".parse::<PhaseExpr>(), Err(ExprError::UnexpectedEnd));
        assert_eq!("a * b".parse::<PhaseExpr>(), Err(ExprError::NonLinear(2)));
        assert_eq!("1/0".parse::<PhaseExpr>(), Err(ExprError::ZeroDenominator(1)));
        assert_eq!("1/a".parse::<PhaseExpr>(), Err(ExprError::SymbolicDivisor(1)));
        assert_eq!("a & b".parse::<PhaseExpr>(), Err(ExprError::UnexpectedChar('&', 2)));
        assert!(matches!(
            "(a + b".parse::<PhaseExpr>(), Err(ExprError::UnexpectedEnd)));
        assert!(matches!(
            "a )".parse::<PhaseExpr>(), Err(ExprError::UnexpectedToken(_, 2))));
        assert!(matches!(
            "99999999999999999999".parse::<PhaseExpr>(), Err(ExprError::Overflow(0))));
    }

    #[test]
    fn arithmetic_overflow() {
        assert_eq!(
            "9223372036854775807 + 1".parse::<PhaseExpr>(),
            Err(ExprError::Overflow(20)),
        );
        assert_eq!(
            "a - 9223372036854775807a - 9223372036854775807a".parse::<PhaseExpr>(),
            Err(ExprError::Overflow(25)),
        );
        assert_eq!(
            "9223372036854775807 * 4611686018427387904".parse::<PhaseExpr>(),
            Err(ExprError::Overflow(20)),
        );
        assert_eq!(
            "1/9223372036854775807/9223372036854775807".parse::<PhaseExpr>(),
            Err(ExprError::Overflow(21)),
        );
        // large but representable values are fine
        assert_eq!(
            parse("9223372036854775807a - 9223372036854775806a"),
            PhaseExpr::var("a"),
        );
    }

    #[test]
    fn display_roundtrip() {
        for s in ["a + 2b + 1/4", "-a + 3/4", "1/2*a - 3b", "0", "1/8", "x"] {
            let ex = parse(s);
            assert_eq!(ex.to_string(), s);
            assert_eq!(parse(&ex.to_string()), ex);
        }
    }

    #[test]
    fn substitution() {
        let ex = parse("a + 2b + 1/4");
        let sub = ex.substitute_with(|name| {
            (name == "a").then(|| parse("3/4 - b"))
        });
        assert_eq!(sub, parse("b"));
        let sub = sub.substitute_with(|_| Some(parse("1/2")));
        assert_eq!(sub.as_phase(), Some(Phase::pi()));
    }

    #[test]
    fn single_var() {
        let ex = parse("3a + 1/2");
        assert_eq!(ex.as_single_var(), Some(("a", R64::from_integer(3), Phase::pi())));
        assert_eq!(parse("a + b").as_single_var(), None);
        assert_eq!(parse("1/2").as_single_var(), None);
    }

    #[test]
    fn var_names() {
        assert!(is_valid_var_name("alpha"));
        assert!(is_valid_var_name("_x1"));
        assert!(!is_valid_var_name("1x"));
        assert!(!is_valid_var_name(""));
        assert!(!is_valid_var_name("pi"));
        assert!(!is_valid_var_name("a b"));
    }
}
