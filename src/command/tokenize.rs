//! Quote-aware tokenizer for message text.
//!
//! Tokens are separated by runs of whitespace. A span opened by `"` or `'`
//! runs to the matching close quote (or to the end of the text when there is
//! none) and becomes a single token with the quotes stripped. There is no
//! escaping: backslashes are kept verbatim.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenizeError {
    #[error("quoted span starting at byte {position} runs across a line break")]
    MultilineQuote { position: usize },
}

/// Split `text` into tokens.
///
/// ```
/// use parley::command::tokenize;
///
/// let tokens = tokenize(r#"a "b c" d"#).unwrap();
/// assert_eq!(tokens, vec!["a", "b c", "d"]);
/// ```
pub fn tokenize(text: &str) -> Result<Vec<String>, TokenizeError> {
    let mut tokens = Vec::new();
    let mut chars = text.char_indices().peekable();

    while let Some(&(start, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        if is_quote(c) {
            chars.next();
            let mut content = String::new();
            let mut closed = false;
            for (_, ch) in chars.by_ref() {
                if ch == c {
                    closed = true;
                    break;
                }
                content.push(ch);
            }

            // A closed double-quoted span must stay on one line.
            if closed && c == '"' && content.contains('\n') {
                return Err(TokenizeError::MultilineQuote { position: start });
            }

            tokens.push(content);
            continue;
        }

        let mut word = String::new();
        while let Some(&(_, ch)) = chars.peek() {
            if ch.is_whitespace() || is_quote(ch) {
                break;
            }
            word.push(ch);
            chars.next();
        }
        tokens.push(word);
    }

    Ok(tokens)
}

fn is_quote(c: char) -> bool {
    c == '"' || c == '\''
}
