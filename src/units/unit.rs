use std::fmt;

use super::UnitError;

// ---------------------------------------------------------------------------
// Dimensions – exponents over the base quantities we care about
// ---------------------------------------------------------------------------

/// Exponents of length, mass, time and photon count.
///
/// Photon count is kept as its own base so photon flux densities
/// (`photon / (Angstrom cm2 s)`) are never mistaken for energy fluxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Dimensions {
    pub length: i8,
    pub mass: i8,
    pub time: i8,
    pub photon: i8,
}

impl Dimensions {
    pub const NONE: Dimensions = Dimensions::new(0, 0, 0, 0);

    pub const fn new(length: i8, mass: i8, time: i8, photon: i8) -> Self {
        Dimensions {
            length,
            mass,
            time,
            photon,
        }
    }

    /// `self * other^power`, or `None` when an exponent leaves `i8`.
    fn combine(self, other: Dimensions, power: i32) -> Option<Self> {
        let add = |a: i8, b: i8| -> Option<i8> {
            let sum = i32::from(a).checked_add(i32::from(b).checked_mul(power)?)?;
            i8::try_from(sum).ok()
        };
        Some(Dimensions {
            length: add(self.length, other.length)?,
            mass: add(self.mass, other.mass)?,
            time: add(self.time, other.time)?,
            photon: add(self.photon, other.photon)?,
        })
    }

    fn scaled(self, power: i32) -> Option<Self> {
        Dimensions::NONE.combine(self, power)
    }

    pub fn is_dimensionless(&self) -> bool {
        *self == Dimensions::NONE
    }
}

// ---------------------------------------------------------------------------
// Registry of named units
// ---------------------------------------------------------------------------

struct UnitDef {
    symbol: &'static str,
    aliases: &'static [&'static str],
    long_name: &'static str,
    /// Size of one unit in SI base units (m, kg, s, photon).
    scale: f64,
    dims: Dimensions,
    prefixable: bool,
}

const LENGTH: Dimensions = Dimensions::new(1, 0, 0, 0);
const MASS: Dimensions = Dimensions::new(0, 1, 0, 0);
const TIME: Dimensions = Dimensions::new(0, 0, 1, 0);
const FREQUENCY: Dimensions = Dimensions::new(0, 0, -1, 0);
const ENERGY: Dimensions = Dimensions::new(2, 1, -2, 0);
const POWER: Dimensions = Dimensions::new(2, 1, -3, 0);
const SPECTRAL_FLUX: Dimensions = Dimensions::new(0, 1, -2, 0);
const PHOTON: Dimensions = Dimensions::new(0, 0, 0, 1);

const REGISTRY: &[UnitDef] = &[
    UnitDef {
        symbol: "m",
        aliases: &[],
        long_name: "meter",
        scale: 1.0,
        dims: LENGTH,
        prefixable: true,
    },
    UnitDef {
        symbol: "Angstrom",
        aliases: &["AA", "A", "Å", "angstrom"],
        long_name: "angstrom",
        scale: 1e-10,
        dims: LENGTH,
        prefixable: false,
    },
    UnitDef {
        symbol: "micron",
        aliases: &[],
        long_name: "micron",
        scale: 1e-6,
        dims: LENGTH,
        prefixable: false,
    },
    UnitDef {
        symbol: "s",
        aliases: &["sec"],
        long_name: "second",
        scale: 1.0,
        dims: TIME,
        prefixable: true,
    },
    UnitDef {
        symbol: "Hz",
        aliases: &[],
        long_name: "hertz",
        scale: 1.0,
        dims: FREQUENCY,
        prefixable: true,
    },
    UnitDef {
        symbol: "g",
        aliases: &[],
        long_name: "gram",
        scale: 1e-3,
        dims: MASS,
        prefixable: true,
    },
    UnitDef {
        symbol: "J",
        aliases: &[],
        long_name: "joule",
        scale: 1.0,
        dims: ENERGY,
        prefixable: true,
    },
    UnitDef {
        symbol: "erg",
        aliases: &[],
        long_name: "erg",
        scale: 1e-7,
        dims: ENERGY,
        prefixable: false,
    },
    UnitDef {
        symbol: "eV",
        aliases: &[],
        long_name: "electronvolt",
        scale: 1.602_176_634e-19,
        dims: ENERGY,
        prefixable: true,
    },
    UnitDef {
        symbol: "W",
        aliases: &[],
        long_name: "watt",
        scale: 1.0,
        dims: POWER,
        prefixable: true,
    },
    UnitDef {
        symbol: "Jy",
        aliases: &[],
        long_name: "jansky",
        scale: 1e-26,
        dims: SPECTRAL_FLUX,
        prefixable: true,
    },
    UnitDef {
        symbol: "photon",
        aliases: &["ph"],
        long_name: "photon",
        scale: 1.0,
        dims: PHOTON,
        prefixable: false,
    },
];

struct Prefix {
    symbol: &'static str,
    canonical: &'static str,
    long_name: &'static str,
    factor: f64,
}

const PREFIXES: &[Prefix] = &[
    Prefix { symbol: "f", canonical: "f", long_name: "femto", factor: 1e-15 },
    Prefix { symbol: "p", canonical: "p", long_name: "pico", factor: 1e-12 },
    Prefix { symbol: "n", canonical: "n", long_name: "nano", factor: 1e-9 },
    Prefix { symbol: "u", canonical: "u", long_name: "micro", factor: 1e-6 },
    Prefix { symbol: "µ", canonical: "u", long_name: "micro", factor: 1e-6 },
    Prefix { symbol: "m", canonical: "m", long_name: "milli", factor: 1e-3 },
    Prefix { symbol: "c", canonical: "c", long_name: "centi", factor: 1e-2 },
    Prefix { symbol: "d", canonical: "d", long_name: "deci", factor: 1e-1 },
    Prefix { symbol: "k", canonical: "k", long_name: "kilo", factor: 1e3 },
    Prefix { symbol: "M", canonical: "M", long_name: "mega", factor: 1e6 },
    Prefix { symbol: "G", canonical: "G", long_name: "giga", factor: 1e9 },
    Prefix { symbol: "T", canonical: "T", long_name: "tera", factor: 1e12 },
];

/// A single resolved name such as `cm` or `keV`.
struct Resolved {
    symbol: String,
    long_name: String,
    scale: f64,
    dims: Dimensions,
}

impl Resolved {
    fn plain(def: &UnitDef) -> Self {
        Resolved {
            symbol: def.symbol.to_string(),
            long_name: def.long_name.to_string(),
            scale: def.scale,
            dims: def.dims,
        }
    }

    fn prefixed(prefix: &Prefix, def: &UnitDef) -> Self {
        Resolved {
            symbol: format!("{}{}", prefix.canonical, def.symbol),
            long_name: format!("{}{}", prefix.long_name, def.long_name),
            scale: prefix.factor * def.scale,
            dims: def.dims,
        }
    }
}

/// Resolve a bare name: exact symbol or alias first, then prefixed symbol,
/// then (case-insensitive) long name, with or without a prefix.
fn resolve_name(name: &str) -> Option<Resolved> {
    if let Some(def) = REGISTRY
        .iter()
        .find(|d| d.symbol == name || d.aliases.contains(&name))
    {
        return Some(Resolved::plain(def));
    }

    for prefix in PREFIXES {
        if let Some(rest) = name.strip_prefix(prefix.symbol) {
            if let Some(def) = REGISTRY.iter().find(|d| d.prefixable && d.symbol == rest) {
                return Some(Resolved::prefixed(prefix, def));
            }
        }
    }

    let lower = name.to_lowercase();
    if let Some(def) = REGISTRY.iter().find(|d| d.long_name == lower) {
        return Some(Resolved::plain(def));
    }
    for prefix in PREFIXES {
        if let Some(rest) = lower.strip_prefix(prefix.long_name) {
            if let Some(def) = REGISTRY.iter().find(|d| d.prefixable && d.long_name == rest) {
                return Some(Resolved::prefixed(prefix, def));
            }
        }
    }
    None
}

/// Every spelling the parser accepts without a prefix, plus the prefixed
/// symbols. Used to propose near misses.
fn known_spellings() -> Vec<String> {
    let mut names = Vec::new();
    for def in REGISTRY {
        names.push(def.symbol.to_string());
        names.extend(def.aliases.iter().map(|a| a.to_string()));
        names.push(def.long_name.to_string());
        if def.prefixable {
            for prefix in PREFIXES.iter().filter(|p| p.symbol == p.canonical) {
                names.push(format!("{}{}", prefix.symbol, def.symbol));
            }
        }
    }
    names.dedup();
    names
}

fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    for (i, ca) in a.chars().enumerate() {
        let mut row = Vec::with_capacity(b.len() + 1);
        row.push(i + 1);
        for (j, cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != *cb);
            row.push(substitution.min(prev[j + 1] + 1).min(row[j] + 1));
        }
        prev = row;
    }
    prev[b.len()]
}

/// Up to three registry spellings within edit distance 2 of `name`,
/// formatted as `a`, `a or b`, `a, b or c`.
fn suggest(name: &str) -> Option<String> {
    let mut scored: Vec<(usize, String)> = known_spellings()
        .into_iter()
        .map(|s| (edit_distance(name, &s), s))
        .filter(|(d, _)| *d <= 2)
        .collect();
    let best = scored.iter().map(|(d, _)| *d).min()?;
    scored.retain(|(d, _)| *d == best);
    let mut names: Vec<String> = Vec::new();
    for (_, s) in scored {
        if !names.contains(&s) {
            names.push(s);
        }
    }
    names.truncate(3);
    Some(match names.as_slice() {
        [one] => one.clone(),
        [head @ .., last] => format!("{} or {}", head.join(", "), last),
        [] => return None,
    })
}

// ---------------------------------------------------------------------------
// Unit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
struct Term {
    symbol: String,
    power: i32,
}

/// A physical unit: an optional numeric factor times a product of named
/// terms. Terms are kept sorted by symbol so equal units compare equal
/// however they were spelled.
#[derive(Debug, Clone)]
pub struct Unit {
    factor: f64,
    terms: Vec<Term>,
    scale: f64,
    dims: Dimensions,
}

impl PartialEq for Unit {
    fn eq(&self, other: &Self) -> bool {
        self.factor == other.factor && self.terms == other.terms
    }
}

impl Default for Unit {
    fn default() -> Self {
        Unit::dimensionless()
    }
}

impl Unit {
    /// The empty unit. Data tagged with it skips all unit validation.
    pub fn dimensionless() -> Self {
        Unit {
            factor: 1.0,
            terms: Vec::new(),
            scale: 1.0,
            dims: Dimensions::NONE,
        }
    }

    fn number(value: f64) -> Self {
        Unit {
            factor: value,
            terms: Vec::new(),
            scale: value,
            dims: Dimensions::NONE,
        }
    }

    fn named(resolved: Resolved) -> Self {
        Unit {
            factor: 1.0,
            terms: vec![Term {
                symbol: resolved.symbol,
                power: 1,
            }],
            scale: resolved.scale,
            dims: resolved.dims,
        }
    }

    /// Parse free-text unit entry such as `erg / (s cm2 Angstrom)`,
    /// `W m-2 Hz-1`, `1e-17 erg/s/cm^2/AA` or a long name like `Nanometer`.
    pub fn parse(text: &str) -> Result<Unit, UnitError> {
        let tokens = lex(text).map_err(|reason| UnitError::InvalidUnit {
            text: text.to_string(),
            reason,
            suggestion: None,
        })?;
        if tokens.is_empty() {
            return Ok(Unit::dimensionless());
        }
        let mut parser = Parser { tokens, pos: 0 };
        let result = parser.division().and_then(|unit| match parser.peek() {
            None => Ok(unit),
            Some(tok) => Err(ParseFailure::Syntax(format!("unexpected {tok}"))),
        });
        result.map_err(|failure| match failure {
            ParseFailure::Syntax(reason) => UnitError::InvalidUnit {
                text: text.to_string(),
                reason,
                suggestion: None,
            },
            ParseFailure::Unknown(name) => UnitError::InvalidUnit {
                text: text.to_string(),
                reason: format!("'{name}' is not a recognized unit"),
                suggestion: suggest(&name),
            },
        })
    }

    /// True for the empty unit (no terms, unit factor).
    pub fn is_dimensionless(&self) -> bool {
        self.terms.is_empty() && self.factor == 1.0
    }

    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    /// Size of this unit expressed in SI base units.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Product of two units; `None` when an exponent overflows.
    fn multiply(&self, other: &Unit) -> Option<Unit> {
        let mut terms = self.terms.clone();
        for term in &other.terms {
            match terms.iter_mut().find(|t| t.symbol == term.symbol) {
                Some(existing) => existing.power = existing.power.checked_add(term.power)?,
                None => terms.push(term.clone()),
            }
        }
        terms.retain(|t| t.power != 0);
        terms.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        Some(Unit {
            factor: self.factor * other.factor,
            terms,
            scale: self.scale * other.scale,
            dims: self.dims.combine(other.dims, 1)?,
        })
    }

    fn divide(&self, other: &Unit) -> Option<Unit> {
        self.multiply(&other.powi(-1)?)
    }

    fn powi(&self, power: i32) -> Option<Unit> {
        let mut terms = Vec::with_capacity(self.terms.len());
        for t in &self.terms {
            terms.push(Term {
                symbol: t.symbol.clone(),
                power: t.power.checked_mul(power)?,
            });
        }
        terms.retain(|t| t.power != 0);
        Some(Unit {
            factor: self.factor.powi(power),
            terms,
            scale: self.scale.powi(power),
            dims: self.dims.scaled(power)?,
        })
    }

    /// Lower-case long name for single named units (`nanometer`), if any.
    pub fn long_name(&self) -> Option<String> {
        match self.terms.as_slice() {
            [term] if term.power == 1 && self.factor == 1.0 => {
                resolve_name(&term.symbol).map(|r| r.long_name)
            }
            _ => None,
        }
    }

    /// Title-cased long name when one exists, else the canonical string.
    /// The result always parses back to `self`.
    pub fn humanize(&self) -> String {
        match self.long_name() {
            Some(name) => title_case(&name),
            None => self.to_string(),
        }
    }
}

fn title_case(name: &str) -> String {
    name.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn format_factor(factor: f64) -> String {
    if factor.fract() == 0.0 && factor.abs() < 1e6 {
        format!("{factor}")
    } else {
        format!("{factor:e}")
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let render = |t: &Term| {
            let p = t.power.abs();
            if p == 1 {
                t.symbol.clone()
            } else {
                format!("{}{}", t.symbol, p)
            }
        };
        let numerator: Vec<String> = self.terms.iter().filter(|t| t.power > 0).map(render).collect();
        let denominator: Vec<String> = self.terms.iter().filter(|t| t.power < 0).map(render).collect();

        let body = match (numerator.is_empty(), denominator.is_empty()) {
            (true, true) => String::new(),
            (false, true) => numerator.join(" "),
            (no_numerator, false) => {
                let top = if no_numerator {
                    "1".to_string()
                } else {
                    numerator.join(" ")
                };
                if denominator.len() == 1 {
                    format!("{top} / {}", denominator[0])
                } else {
                    format!("{top} / ({})", denominator.join(" "))
                }
            }
        };

        if self.factor == 1.0 {
            write!(f, "{body}")
        } else if body.is_empty() {
            write!(f, "{}", format_factor(self.factor))
        } else {
            write!(f, "{} {body}", format_factor(self.factor))
        }
    }
}

impl std::str::FromStr for Unit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Unit::parse(s)
    }
}

// ---------------------------------------------------------------------------
// Lexer / parser
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Name(String, i32),
    Number(f64),
    Star,
    Slash,
    Caret,
    LParen,
    RParen,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Name(n, _) => write!(f, "'{n}'"),
            Token::Number(v) => write!(f, "'{v}'"),
            Token::Star => write!(f, "'*'"),
            Token::Slash => write!(f, "'/'"),
            Token::Caret => write!(f, "'^'"),
            Token::LParen => write!(f, "'('"),
            Token::RParen => write!(f, "')'"),
        }
    }
}

fn lex(text: &str) -> Result<Vec<Token>, String> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    let signed_digit_at = |i: usize| -> bool {
        match chars.get(i) {
            Some(c) if c.is_ascii_digit() => true,
            Some('-') | Some('+') => chars.get(i + 1).is_some_and(|c| c.is_ascii_digit()),
            _ => false,
        }
    };

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
        } else if c.is_alphabetic() {
            let start = i;
            while i < chars.len() && chars[i].is_alphabetic() {
                i += 1;
            }
            let name: String = chars[start..i].iter().collect();
            let mut power = 1;
            if signed_digit_at(i) {
                let p_start = i;
                i += 1;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
                let digits: String = chars[p_start..i].iter().collect();
                power = digits
                    .parse::<i32>()
                    .map_err(|_| format!("bad power '{digits}' on '{name}'"))?;
            }
            tokens.push(Token::Name(name, power));
        } else if c.is_ascii_digit() || ((c == '-' || c == '+') && signed_digit_at(i)) {
            let start = i;
            i += 1;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            if matches!(chars.get(i), Some('e') | Some('E')) && signed_digit_at(i + 1) {
                i += 2;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
            }
            let literal: String = chars[start..i].iter().collect();
            let value = literal
                .parse::<f64>()
                .map_err(|_| format!("bad number '{literal}'"))?;
            tokens.push(Token::Number(value));
        } else {
            let token = match c {
                '*' if chars.get(i + 1) == Some(&'*') => {
                    i += 1;
                    Token::Caret
                }
                '*' | '.' => Token::Star,
                '/' => Token::Slash,
                '^' => Token::Caret,
                '(' => Token::LParen,
                ')' => Token::RParen,
                other => return Err(format!("unexpected character '{other}'")),
            };
            i += 1;
            tokens.push(token);
        }
    }
    Ok(tokens)
}

enum ParseFailure {
    Syntax(String),
    Unknown(String),
}

fn in_range(unit: Option<Unit>) -> Result<Unit, ParseFailure> {
    unit.ok_or_else(|| ParseFailure::Syntax("power out of range".to_string()))
}

/// Products bind tighter than division, so `erg / s cm2` is
/// `erg / (s cm2)` and `erg / s / cm2` divides twice.
struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn division(&mut self) -> Result<Unit, ParseFailure> {
        let mut unit = self.product()?;
        while self.eat(&Token::Slash) {
            let rhs = self.product()?;
            unit = in_range(unit.divide(&rhs))?;
        }
        Ok(unit)
    }

    fn product(&mut self) -> Result<Unit, ParseFailure> {
        let mut unit = self.factor()?;
        loop {
            if self.eat(&Token::Star) {
                unit = in_range(unit.multiply(&self.factor()?))?;
            } else if matches!(
                self.peek(),
                Some(Token::Name(..)) | Some(Token::Number(_)) | Some(Token::LParen)
            ) {
                unit = in_range(unit.multiply(&self.factor()?))?;
            } else {
                return Ok(unit);
            }
        }
    }

    fn factor(&mut self) -> Result<Unit, ParseFailure> {
        let base = self.atom()?;
        if self.eat(&Token::Caret) {
            let power = match self.tokens.get(self.pos).cloned() {
                Some(Token::Number(p)) if p.fract() == 0.0 => p as i32,
                Some(tok) => return Err(ParseFailure::Syntax(format!("expected integer power, found {tok}"))),
                None => return Err(ParseFailure::Syntax("expected integer power".to_string())),
            };
            self.pos += 1;
            return in_range(base.powi(power));
        }
        Ok(base)
    }

    fn atom(&mut self) -> Result<Unit, ParseFailure> {
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or_else(|| ParseFailure::Syntax("unexpected end of input".to_string()))?;
        self.pos += 1;
        match token {
            Token::Name(name, power) => {
                let resolved = resolve_name(&name).ok_or(ParseFailure::Unknown(name))?;
                in_range(Unit::named(resolved).powi(power))
            }
            Token::Number(value) => Ok(Unit::number(value)),
            Token::LParen => {
                let inner = self.division()?;
                if !self.eat(&Token::RParen) {
                    return Err(ParseFailure::Syntax("missing ')'".to_string()));
                }
                Ok(inner)
            }
            other => Err(ParseFailure::Syntax(format!("unexpected {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_compound_forms_agree() {
        let a = Unit::parse("erg / (s cm2 Angstrom)").unwrap();
        let b = Unit::parse("erg/s/cm^2/AA").unwrap();
        let c = Unit::parse("erg s-1 cm-2 Angstrom-1").unwrap();
        assert_eq!(a, b);
        assert_eq!(a, c);
        assert_eq!(a.to_string(), "erg / (Angstrom cm2 s)");
        assert_eq!(a.dimensions(), Dimensions::new(-1, 1, -3, 0));
        assert_relative_eq!(a.scale(), 1e-7 / 1e-4 / 1e-10);
    }

    #[test]
    fn test_product_binds_tighter_than_division() {
        let unit = Unit::parse("W / m2 Hz").unwrap();
        assert_eq!(unit.to_string(), "W / (Hz m2)");
    }

    #[test]
    fn test_prefixes_and_aliases() {
        let nm = Unit::parse("nm").unwrap();
        assert_relative_eq!(nm.scale(), 1e-9);
        assert_eq!(Unit::parse("µm").unwrap(), Unit::parse("um").unwrap());
        assert_eq!(Unit::parse("Å").unwrap().to_string(), "Angstrom");
        assert_relative_eq!(Unit::parse("keV").unwrap().scale(), 1.602_176_634e-16);
        assert_relative_eq!(Unit::parse("mJy").unwrap().scale(), 1e-29);
    }

    #[test]
    fn test_scaled_unit_round_trips() {
        let unit = Unit::parse("1e-17 erg / (s cm2 AA)").unwrap();
        assert_eq!(unit.to_string(), "1e-17 erg / (Angstrom cm2 s)");
        assert_eq!(Unit::parse(&unit.to_string()).unwrap(), unit);
    }

    #[test]
    fn test_inverse_unit() {
        let unit = Unit::parse("cm-1").unwrap();
        assert_eq!(unit.to_string(), "1 / cm");
        assert_eq!(Unit::parse("1 / cm").unwrap(), unit);
    }

    #[test]
    fn test_empty_text_is_dimensionless() {
        assert!(Unit::parse("").unwrap().is_dimensionless());
        assert!(Unit::parse("   ").unwrap().is_dimensionless());
        assert_eq!(Unit::dimensionless().to_string(), "");
    }

    #[test]
    fn test_humanize_uses_title_cased_long_names() {
        assert_eq!(Unit::parse("nm").unwrap().humanize(), "Nanometer");
        assert_eq!(Unit::parse("AA").unwrap().humanize(), "Angstrom");
        assert_eq!(Unit::parse("GHz").unwrap().humanize(), "Gigahertz");
        assert_eq!(Unit::parse("W / m2").unwrap().humanize(), "W / m2");
    }

    #[test]
    fn test_long_names_parse_back() {
        for text in ["Nanometer", "Micron", "Kiloelectronvolt", "Millijansky", "Photon", "Erg"] {
            let unit = Unit::parse(text).unwrap();
            assert_eq!(unit.humanize(), text);
        }
    }

    #[test]
    fn test_unknown_unit_suggests_near_miss() {
        let err = Unit::parse("Jansy").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Did you mean"), "{message}");
        assert!(message.contains("jansky"), "{message}");
    }

    #[test]
    fn test_garbage_has_no_suggestion() {
        match Unit::parse("qqqqqqqq").unwrap_err() {
            UnitError::InvalidUnit { suggestion, .. } => assert!(suggestion.is_none()),
            other => panic!("unexpected error {other:?}"),
        }
        assert!(Unit::parse("erg / (s").is_err());
        assert!(Unit::parse("m ^ x").is_err());
        assert!(Unit::parse("m $").is_err());
    }

    #[test]
    fn test_extreme_powers_are_rejected() {
        for text in ["m100 m100", "m^200", "m200", "(m^100)^100", "m2147483647 m2147483647"] {
            match Unit::parse(text) {
                Err(UnitError::InvalidUnit { reason, .. }) => {
                    assert_eq!(reason, "power out of range", "{text}")
                }
                other => panic!("{text} parsed as {other:?}"),
            }
        }
        assert_eq!(Unit::parse("m100 m-100").unwrap(), Unit::dimensionless());
        assert_eq!(Unit::parse("m^127").unwrap().dimensions().length, 127);
    }
}
