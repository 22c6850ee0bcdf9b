use regex::Regex;
use lazy_static::lazy_static;
use crate::utils::quote;
use crate::error::TlError;

lazy_static! {
    static ref FLAG_GATE_RX: Regex = Regex::new(r"^flags\.(\d+)\?(.+)$").unwrap();
    static ref VECTOR_RX:    Regex = Regex::new(r"^(?i:vector)<(%?)(\w+)>$").unwrap();
}

/// Highest bit a flag indicator can carry.
pub const MAX_FLAG_INDEX: u8 = 31;

/// One grammar marker of an argument type, in the order it appears.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TypeToken<'a> {
    /// `#`: the argument is the bitmask carrier.
    FlagIndicator,
    /// `!T`: a reference to a generic type parameter.
    GenericRef,
    /// `flags.N?T`: present only when bit `N` is set.
    FlagGate(u8),
    /// `Vector<T>` (`boxed`) or `vector<T>`; `bare` is the `%` element sigil.
    Vector { boxed: bool, bare: bool },
    /// The innermost type name.
    Name(&'a str),
}

/// Splits an argument type such as `flags.3?Vector<MessageEntity>` into its
/// markers. Anything that does not match a marker is kept as a plain name,
/// so `Vector<Vector<int>>` is a single `Name`.
pub fn tokenize_type(text: &str) -> Result<Vec<TypeToken<'_>>, TlError> {
    if text == "#" {
        return Ok(vec![TypeToken::FlagIndicator]);
    }

    let mut tokens = Vec::new();
    let mut rest = text;

    if rest.starts_with('!') {
        tokens.push(TypeToken::GenericRef);
        rest = rest.trim_start_matches('!');
    }

    if let Some(caps) = FLAG_GATE_RX.captures(rest) {
        let index = caps[1]
            .parse::<u8>()
            .ok()
            .filter(|i| *i <= MAX_FLAG_INDEX)
            .ok_or_else(|| {
                TlError::grammar(format!("Flag index out of range in {}", quote(text)))
            })?;
        tokens.push(TypeToken::FlagGate(index));
        rest = caps.get(2).map_or("", |m| m.as_str());
    }

    if let Some(caps) = VECTOR_RX.captures(rest) {
        tokens.push(TypeToken::Vector {
            boxed: rest.starts_with('V'),
            bare:  &caps[1] == "%",
        });
        rest = caps.get(2).map_or("", |m| m.as_str());
    }

    if rest.is_empty() {
        return Err(TlError::grammar(format!("Missing type name in {}", quote(text))));
    }
    tokens.push(TypeToken::Name(rest));
    Ok(tokens)
}
