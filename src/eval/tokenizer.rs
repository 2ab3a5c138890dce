use std::fmt::{Display, Formatter};

const SPACE: char = ' ';
const TAB: char = '\t';
const SINGLE_QUOTE: char = '\'';
const DOUBLE_QUOTE: char = '"';
const BACKSLASH: char = '\\';

/// One shell word with quoting and escaping already resolved
/// * `quoted` records whether any part of the word was quoted or escaped,
/// * which is what keeps `"|"` or `'&&'` from being treated as operators later on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    text: String,
    quoted: bool,
}

impl Token {
    /// Creates a token that was written without any quoting
    pub fn bare(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quoted: false,
        }
    }

    /// Creates a token that contained quotes or escapes
    pub fn quoted(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            quoted: true,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_quoted(&self) -> bool {
        self.quoted
    }

    /// Returns the text of the token only if it could be an operator
    pub fn as_operator(&self) -> Option<&str> {
        match self.quoted {
            true => None,
            false => Some(&self.text),
        }
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text)
    }
}

impl PartialEq<&str> for Token {
    fn eq(&self, other: &&str) -> bool {
        self.text == *other
    }
}

impl PartialEq<str> for Token {
    fn eq(&self, other: &str) -> bool {
        self.text == other
    }
}

/// Splits a line into words, honoring single quotes, double quotes and backslash escapes
/// * Unterminated quotes are closed implicitly at the end of the line
pub fn tokenize(input: &str) -> Vec<Token> {
    let mut tokens: Vec<Token> = Vec::new();
    let mut curr_token = TokenBuilder::default();

    let mut characters = input.chars().peekable();
    let mut in_double_quotes = false;
    let mut in_single_quotes = false;

    while let Some(character) = characters.next() {
        match character {
            SPACE | TAB if !in_single_quotes && !in_double_quotes => {
                curr_token.delimit(&mut tokens);
            }
            SINGLE_QUOTE if !in_double_quotes => {
                in_single_quotes = !in_single_quotes;
                curr_token.mark_quoted();
            }
            DOUBLE_QUOTE if !in_single_quotes => {
                in_double_quotes = !in_double_quotes;
                curr_token.mark_quoted();
            }
            BACKSLASH if in_single_quotes => curr_token.push(character),
            BACKSLASH if in_double_quotes => match characters.peek() {
                // Inside double quotes only a quote or another backslash can be escaped
                Some(&(escaped @ (DOUBLE_QUOTE | BACKSLASH))) => {
                    curr_token.push(escaped);
                    characters.next();
                }
                _ => curr_token.push(character),
            },
            BACKSLASH => {
                curr_token.mark_quoted();
                // * A trailing backslash has nothing to escape and is dropped
                if let Some(escaped) = characters.next() {
                    curr_token.push(escaped);
                }
            }
            _ => curr_token.push(character),
        }
    }

    curr_token.delimit(&mut tokens);
    tokens
}

// Accumulates the characters of the token currently being scanned
// * A token exists as soon as it has any character or any quote, so `''` yields an empty word
#[derive(Default)]
struct TokenBuilder {
    text: String,
    quoted: bool,
}

impl TokenBuilder {
    fn push(&mut self, character: char) {
        self.text.push(character);
    }

    fn mark_quoted(&mut self) {
        self.quoted = true;
    }

    fn delimit(&mut self, tokens: &mut Vec<Token>) {
        if !self.text.is_empty() || self.quoted {
            let builder = std::mem::take(self);
            tokens.push(Token {
                text: builder.text,
                quoted: builder.quoted,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(line: &str) -> Vec<String> {
        tokenize(line).into_iter().map(Token::into_string).collect()
    }

    #[test]
    fn simple_command_no_quotes() {
        assert_eq!(words("echo Hello world!"), vec!["echo", "Hello", "world!"]);
    }

    #[test]
    fn mixed_quoting_and_escapes() {
        let tokens = tokenize(r#"echo 'a b' "c\"d" e\ f"#);
        assert_eq!(tokens, vec!["echo", "a b", "c\"d", "e f"]);
    }

    #[test]
    fn empty_and_whitespace_lines() {
        assert!(tokenize("").is_empty());
        assert!(tokenize(" \t  ").is_empty());
    }

    #[test]
    fn whitespace_runs_collapse() {
        assert_eq!(words("  ls \t -l   /tmp  "), vec!["ls", "-l", "/tmp"]);
    }

    #[test]
    fn adjacent_quoted_segments_concatenate() {
        assert_eq!(words(r#"a'b'"c""#), vec!["abc"]);
        assert_eq!(words(r#"pre"mid"'post' x"#), vec!["premidpost", "x"]);
    }

    #[test]
    fn backslash_outside_quotes() {
        assert_eq!(words(r"a\\b"), vec![r"a\b"]);
        assert_eq!(words(r"\'x\'"), vec!["'x'"]);
        assert_eq!(words(r"\n"), vec!["n"]);
        assert_eq!(words(r"trailing\"), vec!["trailing"]);
    }

    #[test]
    fn backslash_inside_double_quotes() {
        assert_eq!(words(r#""a\\b""#), vec![r"a\b"]);
        assert_eq!(words(r#""a\nb""#), vec![r"a\nb"]);
        assert_eq!(words(r#""a\'b""#), vec![r"a\'b"]);
    }

    #[test]
    fn backslash_inside_single_quotes_is_literal() {
        assert_eq!(words(r"'a\b\'"), vec![r"a\b\"]);
    }

    #[test]
    fn quotes_inside_the_other_quote_are_literal() {
        assert_eq!(words(r#""it's""#), vec!["it's"]);
        assert_eq!(words(r#"'say "hi"'"#), vec![r#"say "hi""#]);
    }

    #[test]
    fn unterminated_quotes_close_at_end_of_line() {
        assert_eq!(words("echo 'abc def"), vec!["echo", "abc def"]);
        assert_eq!(words("echo \"abc"), vec!["echo", "abc"]);
    }

    #[test]
    fn empty_quotes_produce_an_empty_word() {
        assert_eq!(words("echo '' \"\""), vec!["echo", "", ""]);
    }

    #[test]
    fn quoted_operators_are_not_operators() {
        let tokens = tokenize(r#"a | "|" '&&' \>"#);
        assert_eq!(tokens[1].as_operator(), Some("|"));
        assert_eq!(tokens[2].as_operator(), None);
        assert_eq!(tokens[3].as_operator(), None);
        assert_eq!(tokens[4].as_operator(), None);
        assert_eq!(tokens[4], ">");
    }

    #[test]
    fn operators_need_whitespace() {
        assert_eq!(words("a|b"), vec!["a|b"]);
        assert_eq!(words("a && b"), vec!["a", "&&", "b"]);
    }
}
