/// Tokenizer for path expressions
///
/// Pure functional parsing of a path expression such as
/// `home/:userId/something/:?somethingId` into literal text and
/// placeholder tokens. Every placeholder owns exactly one capture group
/// in the compiled matcher; the group index is assigned here, once.

/// A single piece of a path expression
///
/// # Examples
///
/// ```
/// use waypoint_router::pattern::token::{tokenize, PatternToken};
///
/// let tokens = tokenize("users/:id/:?tab");
/// assert!(matches!(&tokens[0], PatternToken::Literal(text) if text == "users/"));
/// assert!(matches!(&tokens[1], PatternToken::Param(p) if p.name == "id" && !p.optional));
/// assert!(matches!(&tokens[3], PatternToken::Param(p) if p.name == "tab" && p.optional));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternToken {
    /// Literal text copied verbatim
    Literal(String),
    /// `:name` (required) or `:?name` (optional) placeholder
    Param(ParamToken),
}

/// A placeholder with the capture group it is bound to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamToken {
    pub name: String,
    pub optional: bool,
    /// 1-based capture group index in the compiled matcher
    pub capture: usize,
}

impl PatternToken {
    /// Returns the placeholder, if this token is one
    pub fn as_param(&self) -> Option<&ParamToken> {
        match self {
            PatternToken::Param(param) => Some(param),
            PatternToken::Literal(_) => None,
        }
    }

    /// Whether this is literal text ending with a path separator
    pub fn ends_with_separator(&self) -> bool {
        matches!(self, PatternToken::Literal(text) if text.ends_with('/'))
    }
}

/// Characters allowed in a placeholder name
pub fn is_param_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Splits an expression into literal and placeholder tokens (pure function)
///
/// A `:` (or `:?`) not followed by a name character is kept as literal text.
/// Adjacent literal characters are merged into one token.
pub fn tokenize(expression: &str) -> Vec<PatternToken> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut captures = 0;
    let mut rest = expression;

    while let Some(position) = rest.find(':') {
        literal.push_str(&rest[..position]);
        let after_colon = &rest[position + 1..];
        let (optional, candidate) = match after_colon.strip_prefix('?') {
            Some(stripped) => (true, stripped),
            None => (false, after_colon),
        };

        let name_len = candidate
            .find(|c: char| !is_param_char(c))
            .unwrap_or(candidate.len());

        if name_len == 0 {
            literal.push(':');
            rest = after_colon;
            continue;
        }

        if !literal.is_empty() {
            tokens.push(PatternToken::Literal(std::mem::take(&mut literal)));
        }

        captures += 1;
        tokens.push(PatternToken::Param(ParamToken {
            name: candidate[..name_len].to_string(),
            optional,
            capture: captures,
        }));
        rest = &candidate[name_len..];
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        tokens.push(PatternToken::Literal(literal));
    }

    tokens
}
