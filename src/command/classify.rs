//! Command classification from tokens.

use super::CommandKind;

/// Classify a token sequence against the command prefix.
///
/// Returns the command kind and the arguments that follow the command word.
/// Anything that is not a recognized command carries no arguments.
pub fn classify(mut tokens: Vec<String>, prefix: char) -> (CommandKind, Vec<String>) {
    let word = match tokens.first().and_then(|first| first.strip_prefix(prefix)) {
        Some(word) => word,
        None => return (CommandKind::None, Vec::new()),
    };

    let kind = CommandKind::from_word(word);
    if kind == CommandKind::Unrecognized {
        return (kind, Vec::new());
    }

    tokens.remove(0);
    (kind, tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_recognized_command() {
        let (kind, args) = classify(toks(&["&dq", "add", "x"]), '&');
        assert_eq!(kind, CommandKind::Queue);
        assert_eq!(args, vec!["add", "x"]);

        let (kind, args) = classify(toks(&["&help"]), '&');
        assert_eq!(kind, CommandKind::Help);
        assert!(args.is_empty());
    }

    #[test]
    fn test_unrecognized_drops_args() {
        let (kind, args) = classify(toks(&["&bogus"]), '&');
        assert_eq!(kind, CommandKind::Unrecognized);
        assert!(args.is_empty());

        let (kind, args) = classify(toks(&["&bogus", "with", "trailing"]), '&');
        assert_eq!(kind, CommandKind::Unrecognized);
        assert!(args.is_empty());

        // A bare prefix is an empty command word.
        let (kind, _) = classify(toks(&["&"]), '&');
        assert_eq!(kind, CommandKind::Unrecognized);
    }

    #[test]
    fn test_not_a_command() {
        assert_eq!(classify(vec![], '&').0, CommandKind::None);
        assert_eq!(classify(toks(&["hello", "&dq"]), '&').0, CommandKind::None);
        assert_eq!(classify(toks(&[""]), '&').0, CommandKind::None);
        assert_eq!(classify(toks(&["!dq", "list"]), '&').0, CommandKind::None);
    }

    #[test]
    fn test_custom_prefix() {
        let (kind, args) = classify(toks(&["!dq", "list"]), '!');
        assert_eq!(kind, CommandKind::Queue);
        assert_eq!(args, vec!["list"]);

        assert_eq!(classify(toks(&["&dq", "list"]), '!').0, CommandKind::None);
    }
}
