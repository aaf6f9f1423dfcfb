#[cfg(test)]
mod lexer_tests {
    use crate::error::DiagnosticKind;
    use crate::lexer::token::TokenKind;
    use crate::lexer::tokenize;

    fn lex_ok(input: &str) -> Vec<TokenKind> {
        let result = tokenize(input);
        assert!(
            result.diagnostics.is_empty(),
            "unexpected diagnostics: {:?}",
            result.diagnostics
        );
        result.tokens.into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn empty_input_yields_trailing_newline_only() {
        assert_eq!(lex_ok(""), vec![TokenKind::Newline]);
    }

    #[test]
    fn indent_carries_tab_count() {
        let result = tokenize("\t\tfoo\n");
        assert!(result.diagnostics.is_empty());
        assert_eq!(result.tokens[0].kind, TokenKind::Indent);
        assert_eq!(result.tokens[0].indent, 2);
        assert_eq!(result.tokens[1].kind, TokenKind::Id);
        assert_eq!(result.tokens[1].lexeme, "foo");
    }

    #[test]
    fn identifier_allows_trailing_digits() {
        let result = tokenize("value1\n");
        assert_eq!(result.tokens[0].kind, TokenKind::Id);
        assert_eq!(result.tokens[0].lexeme, "value1");
    }

    #[test]
    fn number_letter_split_into_two_tokens() {
        // "123abc" is not itself valid JG, but the lexer is purely
        // lexical: a letter right after digits closes the number and
        // opens a fresh identifier rather than erroring.
        let kinds = lex_ok("123abc\n");
        assert_eq!(
            kinds,
            vec![TokenKind::Number, TokenKind::Id, TokenKind::Newline]
        );
    }

    #[test]
    fn string_literal_keeps_escape_sequence_literal() {
        let result = tokenize("\"hi\\nthere\"\n");
        assert!(result.diagnostics.is_empty());
        assert_eq!(result.tokens[0].kind, TokenKind::String);
        assert_eq!(result.tokens[0].lexeme, "hi\\nthere");
    }

    #[test]
    fn unterminated_string_aborts_the_lex() {
        let result = tokenize("\"oops\n");
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].kind, DiagnosticKind::LexError);
    }

    #[test]
    fn tab_mid_identifier_aborts_the_lex() {
        let result = tokenize("fo\to\n");
        assert_eq!(result.diagnostics.len(), 1);
        assert_eq!(result.diagnostics[0].kind, DiagnosticKind::LexError);
    }

    #[test]
    fn symbols_are_single_char_terminals() {
        let kinds = lex_ok("< * > : ~ ( )\n");
        assert_eq!(
            kinds,
            vec![
                TokenKind::Terminal,
                TokenKind::Terminal,
                TokenKind::Terminal,
                TokenKind::Terminal,
                TokenKind::Terminal,
                TokenKind::Terminal,
                TokenKind::Terminal,
                TokenKind::Newline,
            ]
        );
    }

    #[test]
    fn func_signature_line() {
        let kinds = lex_ok("func add <int a> <int b> : int\n");
        use TokenKind::*;
        assert_eq!(
            kinds,
            vec![
                Id, Id, Terminal, Id, Id, Terminal, Terminal, Id, Id, Terminal, Terminal, Id,
                Newline
            ]
        );
    }
}
