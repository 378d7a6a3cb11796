//! Language definitions and the tree-sitter tokenizer the highlighter runs on every layout.

use std::cell::RefCell;
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::ops::Range;

use color_eyre::eyre::WrapErr;
use tree_sitter::{Language, Node, Parser, Query, QueryCursor, StreamingIterator, Tree};

use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Default,
    Keyword,
    Number,
    String,
    CharLiteral,
    Punctuation,
    Preprocessor,
    Identifier,
    KnownIdentifier,
    PreprocIdentifier,
    Comment,
    MultiLineComment,
}

impl TokenKind {
    /// Later layers paint over earlier ones: directives cover their whole line, comments win
    /// everywhere.
    fn layer(self) -> u8 {
        match self {
            TokenKind::Preprocessor => 1,
            TokenKind::Comment | TokenKind::MultiLineComment => 2,
            _ => 0,
        }
    }
}

/// A classified byte range of the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub range: Range<usize>,
}

/// Parser and highlight query for one tree-sitter grammar
pub struct Grammar {
    parser: RefCell<Parser>,
    query: Query,
}

impl Grammar {
    pub fn new(language: Language, highlights_query: &str) -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&language)
            .wrap_err("grammar was built for an incompatible tree-sitter version")?;
        let query =
            Query::new(&language, highlights_query).wrap_err("invalid highlight query")?;
        Ok(Self {
            parser: RefCell::new(parser),
            query,
        })
    }

    fn parse(&self, text: &str) -> Option<Tree> {
        self.parser.borrow_mut().parse(text, None)
    }

    /// Maps highlight query capture names to token kinds
    fn capture_kind(name: &str, text: &str) -> Option<TokenKind> {
        match name {
            "comment" if text.starts_with("/*") => Some(TokenKind::MultiLineComment),
            "comment" => Some(TokenKind::Comment),
            "number" => Some(TokenKind::Number),
            "string" => Some(TokenKind::String),
            "character" => Some(TokenKind::CharLiteral),
            "preprocessor" => Some(TokenKind::Preprocessor),
            _ => None,
        }
    }
}

impl std::fmt::Debug for Grammar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grammar")
            .field("captures", &self.query.capture_names())
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct LanguageDefinition {
    pub name: String,
    pub keywords: HashSet<String>,
    /// Identifier name to the declaration shown on hover
    pub identifiers: HashMap<String, String>,
    pub preproc_identifiers: HashMap<String, String>,
    grammar: Grammar,
}

#[rustfmt::skip]
const CPP_KEYWORDS: &[&str] = &[
    "alignas", "alignof", "and", "and_eq", "asm", "atomic_cancel", "atomic_commit",
    "atomic_noexcept", "auto", "bitand", "bitor", "bool", "break", "case", "catch", "char",
    "char16_t", "char32_t", "class", "compl", "concept", "const", "constexpr", "const_cast",
    "continue", "decltype", "default", "delete", "do", "double", "dynamic_cast", "else", "enum",
    "explicit", "export", "extern", "false", "float", "for", "friend", "goto", "if", "import",
    "inline", "int", "long", "module", "mutable", "namespace", "new", "noexcept", "not",
    "not_eq", "nullptr", "operator", "or", "or_eq", "private", "protected", "public",
    "register", "reinterpret_cast", "requires", "return", "short", "signed", "sizeof", "static",
    "static_assert", "static_cast", "struct", "switch", "synchronized", "template", "this",
    "thread_local", "throw", "true", "try", "typedef", "typeid", "typename", "union",
    "unsigned", "using", "virtual", "void", "volatile", "wchar_t", "while", "xor", "xor_eq",
];

#[rustfmt::skip]
const CPP_BUILTINS: &[&str] = &[
    "abort", "abs", "acos", "asin", "atan", "atexit", "atof", "atoi", "atol", "ceil", "clock",
    "cosh", "ctime", "div", "exit", "fabs", "floor", "fmod", "getchar", "getenv", "isalnum",
    "isalpha", "isdigit", "isgraph", "ispunct", "isspace", "isupper", "kbhit", "log10", "log2",
    "log", "memcmp", "modf", "pow", "printf", "sprintf", "snprintf", "putchar", "putenv", "puts",
    "rand", "remove", "rename", "sinh", "sqrt", "srand", "strcat", "strcmp", "strerror", "time",
    "tolower", "toupper", "std", "string", "vector", "map", "unordered_map", "set",
    "unordered_set", "min", "max",
];

impl LanguageDefinition {
    pub fn cplusplus() -> Result<Self> {
        Ok(Self {
            name: "C++".to_string(),
            keywords: CPP_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            identifiers: CPP_BUILTINS
                .iter()
                .map(|id| (id.to_string(), "Built-in function".to_string()))
                .collect(),
            preproc_identifiers: HashMap::new(),
            grammar: Grammar::new(
                tree_sitter_cpp::LANGUAGE.into(),
                include_str!("../../../assets/grammars/cpp/highlights.scm"),
            )
            .wrap_err("failed to load the C++ grammar")?,
        })
    }

    pub fn with_identifiers<'a>(
        mut self,
        entries: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        self.identifiers.extend(
            entries
                .into_iter()
                .map(|(name, decl)| (name.to_string(), decl.to_string())),
        );
        self
    }

    pub fn with_preproc_identifiers<'a>(
        mut self,
        entries: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        self.preproc_identifiers.extend(
            entries
                .into_iter()
                .map(|(name, decl)| (name.to_string(), decl.to_string())),
        );
        self
    }

    /// Hover text for a known or preprocessor identifier.
    pub fn declaration(&self, word: &str) -> Option<&str> {
        self.identifiers
            .get(word)
            .or_else(|| self.preproc_identifiers.get(word))
            .map(String::as_str)
    }

    fn classify_word(&self, word: &str) -> TokenKind {
        if self.keywords.contains(word) {
            TokenKind::Keyword
        } else if self.identifiers.contains_key(word) {
            TokenKind::KnownIdentifier
        } else if self.preproc_identifiers.contains_key(word) {
            TokenKind::PreprocIdentifier
        } else {
            TokenKind::Identifier
        }
    }

    fn classify_leaf(&self, text: &str) -> TokenKind {
        let mut chars = text.chars();
        match chars.next() {
            Some(c) if is_identifier_start(c) && chars.all(is_identifier_char) => {
                self.classify_word(text)
            }
            Some(_) if text.chars().all(|c| c.is_ascii_punctuation()) => TokenKind::Punctuation,
            _ => TokenKind::Default,
        }
    }

    /// Splits `text` into tokens that cover it without gaps or overlaps.
    ///
    /// Words and punctuation come from the syntax tree's leaves. The highlight query then paints
    /// literals, comments and directives over them.
    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut kinds = vec![TokenKind::Default; text.len()];

        if let Some(tree) = self.grammar.parse(text) {
            for_each_leaf(&tree, |node| {
                let range = node.byte_range();
                if !range.is_empty() {
                    kinds[range.clone()].fill(self.classify_leaf(&text[range]));
                }
            });

            let mut painted = Vec::new();
            let capture_names = self.grammar.query.capture_names();
            let mut cursor = QueryCursor::new();
            let mut matches = cursor.matches(&self.grammar.query, tree.root_node(), text.as_bytes());
            while let Some(match_) = matches.next() {
                for capture in match_.captures {
                    let range = capture.node.byte_range();
                    let name = capture_names[capture.index as usize];
                    if let Some(kind) = Grammar::capture_kind(name, &text[range.clone()]) {
                        painted.push((kind, range));
                    }
                }
            }
            // Outer nodes first so nested literals keep their own kind
            painted.sort_by_key(|(kind, range)| (kind.layer(), range.start, Reverse(range.end)));
            for (kind, range) in painted {
                kinds[range].fill(kind);
            }
        }

        let mut tokens: Vec<Token> = Vec::new();
        for (i, kind) in kinds.into_iter().enumerate() {
            match tokens.last_mut() {
                Some(last) if last.kind == kind => last.range.end = i + 1,
                _ => tokens.push(Token {
                    kind,
                    range: i..i + 1,
                }),
            }
        }
        tokens
    }
}

/// Visits every leaf of `tree` in source order.
fn for_each_leaf(tree: &Tree, mut visit: impl FnMut(Node)) {
    let mut cursor = tree.walk();
    loop {
        if cursor.goto_first_child() {
            continue;
        }
        visit(cursor.node());
        loop {
            if cursor.goto_next_sibling() {
                break;
            }
            if !cursor.goto_parent() {
                return;
            }
        }
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

pub fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(lang: &LanguageDefinition, text: &str) -> Vec<(TokenKind, String)> {
        lang.tokenize(text)
            .into_iter()
            .filter(|t| !text[t.range.clone()].trim().is_empty())
            .map(|t| (t.kind, text[t.range].trim().to_string()))
            .collect()
    }

    fn demo_language() -> LanguageDefinition {
        LanguageDefinition::cplusplus()
            .unwrap()
            .with_identifiers([("HWND", "typedef HWND_* HWND")])
            .with_preproc_identifiers([("NULL", "#define NULL ((void*)0)")])
    }

    fn assert_covers(lang: &LanguageDefinition, text: &str) {
        let mut expected_start = 0;
        for token in lang.tokenize(text) {
            assert_eq!(token.range.start, expected_start);
            assert!(token.range.end > token.range.start);
            expected_start = token.range.end;
        }
        assert_eq!(expected_start, text.len());
    }

    #[test]
    fn tokens_cover_text_without_gaps() {
        let lang = demo_language();
        assert_covers(
            &lang,
            "#include <x>\nint main() {\n  /* multi\nline */ return 0x1F; // done\n}\nconst char* s = \"a\\\"b\"; char c = 'c'; // é",
        );
        assert!(lang.tokenize("").is_empty());
    }

    #[test]
    fn malformed_input_still_covers_text() {
        let lang = demo_language();
        assert_covers(&lang, "\"open\nnext");
        assert_covers(&lang, "int x = /* never closed");
        assert_covers(&lang, "}} ((( é #");
    }

    #[test]
    fn classifies_words() {
        let lang = demo_language();
        assert_eq!(
            kinds(&lang, "int value = sqrt(NULL); HWND h;"),
            vec![
                (TokenKind::Keyword, "int".into()),
                (TokenKind::Identifier, "value".into()),
                (TokenKind::Punctuation, "=".into()),
                (TokenKind::KnownIdentifier, "sqrt".into()),
                (TokenKind::Punctuation, "(".into()),
                (TokenKind::PreprocIdentifier, "NULL".into()),
                (TokenKind::Punctuation, ");".into()),
                (TokenKind::KnownIdentifier, "HWND".into()),
                (TokenKind::Identifier, "h".into()),
                (TokenKind::Punctuation, ";".into()),
            ]
        );
    }

    #[test]
    fn comments_strings_and_numbers() {
        let lang = demo_language();
        let k = kinds(
            &lang,
            "void f() {\n  float x = 1.5e-3f; // note\n  auto s = \"str\\\"ing\";\n  char c = 'c'; /* a\nb */\n}",
        );
        for expected in [
            (TokenKind::Keyword, "void"),
            (TokenKind::Number, "1.5e-3f"),
            (TokenKind::Comment, "// note"),
            (TokenKind::String, "\"str\\\"ing\""),
            (TokenKind::CharLiteral, "'c'"),
            (TokenKind::MultiLineComment, "/* a\nb */"),
        ] {
            assert!(
                k.contains(&(expected.0, expected.1.to_string())),
                "{expected:?} missing from {k:?}"
            );
        }
    }

    #[test]
    fn digit_separators_and_raw_strings_are_single_literals() {
        let lang = demo_language();
        let k = kinds(&lang, "int n = 1'000'000;");
        assert!(k.contains(&(TokenKind::Number, "1'000'000".into())), "{k:?}");
        assert!(!k.iter().any(|(kind, _)| *kind == TokenKind::CharLiteral));

        let k = kinds(&lang, "auto s = R\"(a \" b)\";");
        assert!(k.contains(&(TokenKind::String, "R\"(a \" b)\"".into())), "{k:?}");
        assert_eq!(k.last(), Some(&(TokenKind::Punctuation, ";".into())));
    }

    #[test]
    fn directives_cover_their_line() {
        let lang = demo_language();
        let k = kinds(&lang, "  #define A 1\nint x;");
        assert_eq!(k[0], (TokenKind::Preprocessor, "#define A 1".into()));
        assert_eq!(k[1], (TokenKind::Keyword, "int".into()));

        let k = kinds(&lang, "#include <vector>\n#include \"TextEditor.h\"\n");
        assert!(!k.is_empty());
        assert!(k.iter().all(|(kind, _)| *kind == TokenKind::Preprocessor), "{k:?}");
    }

    #[test]
    fn declarations_for_hover() {
        let lang = demo_language();
        assert_eq!(lang.declaration("HWND"), Some("typedef HWND_* HWND"));
        assert_eq!(lang.declaration("NULL"), Some("#define NULL ((void*)0)"));
        assert_eq!(lang.declaration("int"), None);
    }
}
