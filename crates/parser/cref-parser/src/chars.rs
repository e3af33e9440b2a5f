//! Escape decoding
//!
//! Reference text arrives exactly as written inside a markup attribute, so it may contain
//! numeric character references (`&#64;`, `&#x40;`) and the predefined XML entities. The
//! parser works on decoded characters, each remembering the raw span it came from.

use cref_span::Span;

/// One decoded character and the raw text it was decoded from
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DecodedChar {
    /// The decoded character
    pub ch: char,
    /// Raw span, longer than one character for an escape
    pub span: Span,
}

/// Decode `text` into characters
///
/// An `&` that does not start a well-formed reference stays a literal `&`.
pub fn decode(text: &str) -> Vec<DecodedChar> {
    let mut decoded = Vec::with_capacity(text.len());
    let mut offset = 0;

    while offset < text.len() {
        let rest = &text[offset..];
        if let Some((ch, consumed)) = decode_reference(rest) {
            decoded.push(DecodedChar {
                ch,
                span: Span::new(offset as u32, (offset + consumed) as u32),
            });
            offset += consumed;
            continue;
        }

        let Some(ch) = rest.chars().next() else {
            break;
        };
        decoded.push(DecodedChar {
            ch,
            span: Span::new(offset as u32, (offset + ch.len_utf8()) as u32),
        });
        offset += ch.len_utf8();
    }

    decoded
}

/// Decode a character or entity reference at the start of `rest`, returning the
/// character and the number of bytes consumed
fn decode_reference(rest: &str) -> Option<(char, usize)> {
    let body = rest.strip_prefix('&')?;
    let end = body.find(';')?;
    let name = &body[..end];
    let consumed = end + 2;

    let ch = match name {
        "lt" => '<',
        "gt" => '>',
        "amp" => '&',
        "quot" => '"',
        "apos" => '\'',
        _ => {
            let digits = name.strip_prefix('#')?;
            let value = match digits
                .strip_prefix('x')
                .or_else(|| digits.strip_prefix('X'))
            {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => digits.parse::<u32>().ok()?,
            };
            char::from_u32(value)?
        }
    };

    Some((ch, consumed))
}
