use proptest::prelude::*;

use pipesh::eval::{extract_redirections, split_pipeline, tokenize, Token};

fn word() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_./=-]{1,8}"
}

fn token() -> impl Strategy<Value = Token> {
    prop_oneof![
        4 => word().prop_map(Token::bare),
        1 => prop::sample::select(vec!["<", ">", "1>", ">>", "1>>", "2>", "2>>"]).prop_map(Token::bare),
        1 => "[ a-z|&]{0,6}".prop_map(Token::quoted),
    ]
}

proptest! {
    #[test]
    fn plain_words_split_on_whitespace(words in prop::collection::vec(word(), 0..8), gap in "[ \t]{1,3}") {
        let line = words.join(&gap);
        let tokens = tokenize(&line);
        prop_assert_eq!(tokens.iter().map(Token::as_str).collect::<Vec<_>>(), words);
    }

    #[test]
    fn single_quotes_preserve_everything(text in "[^']{0,20}") {
        let tokens = tokenize(&format!("'{}'", text));
        prop_assert_eq!(tokens.len(), 1);
        prop_assert_eq!(tokens[0].as_str(), text.as_str());
        prop_assert!(tokens[0].is_quoted());
    }

    #[test]
    fn redirection_extraction_is_idempotent(tokens in prop::collection::vec(token(), 0..12)) {
        let (first, _) = extract_redirections(tokens);
        let survivors = first.args.iter().cloned().map(Token::bare).collect();
        let (second, removed) = extract_redirections(survivors);
        prop_assert_eq!(&second.args, &first.args);
        prop_assert!(removed.is_empty());
        prop_assert!(!second.has_redirections());
    }

    #[test]
    fn lines_without_pipes_are_one_command(words in prop::collection::vec(word(), 1..8)) {
        let commands = split_pipeline(tokenize(&words.join(" ")));
        prop_assert_eq!(commands.len(), 1);
        prop_assert_eq!(&commands[0].args, &words);
    }
}
