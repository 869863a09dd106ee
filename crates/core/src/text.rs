//! Character repertoire shared by form input and invoice rendering.

/// Printable ASCII and the Latin-1 supplement; the invoice font covers
/// exactly this range.
pub fn is_printable(ch: char) -> bool {
    matches!(ch, ' '..='~' | '\u{A0}'..='\u{FF}')
}

/// First character of `text` that is neither whitespace nor printable.
pub fn first_unprintable(text: &str) -> Option<char> {
    text.chars().find(|c| !c.is_whitespace() && !is_printable(*c))
}
