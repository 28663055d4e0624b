//! Import specifier extraction from module sources.
//!
//! A lightweight token scan, not a full parser: sources are split into
//! identifiers, string literals, and punctuation (comments and string
//! interiors skipped), then specifier positions are recognized from the
//! token stream. This covers `import`/`export ... from`/`require()` in
//! scripts and `@import` in stylesheets. Specifiers are returned in
//! declaration order; duplicates are kept (the graph deduplicates edges).

use lode_common::ModuleKind;

/// A token from the lightweight source scan.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    /// An identifier or keyword.
    Ident(String),
    /// The contents of a string literal (quotes stripped, escapes kept raw).
    Str(String),
    /// A single punctuation character.
    Punct(char),
}

/// Extracts import specifiers from a module's content.
///
/// Asset modules never declare imports and always yield an empty list.
pub fn scan_imports(kind: ModuleKind, content: &str) -> Vec<String> {
    match kind {
        ModuleKind::Script => scan_script(&lex(content)),
        ModuleKind::Style => scan_style(&lex(content)),
        ModuleKind::Asset => Vec::new(),
    }
}

/// Tokenizes source text, skipping whitespace and comments.
fn lex(src: &str) -> Vec<Token> {
    let bytes = src.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let c = bytes[i] as char;

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        // Line comment
        if c == '/' && bytes.get(i + 1) == Some(&b'/') {
            while i < bytes.len() && bytes[i] != b'\n' {
                i += 1;
            }
            continue;
        }

        // Block comment
        if c == '/' && bytes.get(i + 1) == Some(&b'*') {
            i += 2;
            while i + 1 < bytes.len() && !(bytes[i] == b'*' && bytes[i + 1] == b'/') {
                i += 1;
            }
            i = (i + 2).min(bytes.len());
            continue;
        }

        // String literal (single, double, or template quote)
        if c == '\'' || c == '"' || c == '`' {
            let quote = bytes[i];
            i += 1;
            let start = i;
            while i < bytes.len() && bytes[i] != quote {
                if bytes[i] == b'\\' {
                    i += 1;
                }
                i += 1;
            }
            let end = i.min(bytes.len());
            tokens.push(Token::Str(
                String::from_utf8_lossy(&bytes[start..end]).into_owned(),
            ));
            i = (i + 1).min(bytes.len());
            continue;
        }

        // Identifier
        if c.is_ascii_alphabetic() || c == '_' || c == '$' || c == '-' || c == '@' {
            let start = i;
            i += 1;
            while i < bytes.len() {
                let b = bytes[i] as char;
                if b.is_ascii_alphanumeric() || b == '_' || b == '$' || b == '-' {
                    i += 1;
                } else {
                    break;
                }
            }
            tokens.push(Token::Ident(
                String::from_utf8_lossy(&bytes[start..i]).into_owned(),
            ));
            continue;
        }

        tokens.push(Token::Punct(c));
        i += 1;
    }

    tokens
}

/// Recognizes `import`, `export ... from`, and `require()` specifiers.
fn scan_script(tokens: &[Token]) -> Vec<String> {
    let mut specs = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        match &tokens[i] {
            Token::Ident(name) if name == "import" => {
                // Dynamic form: import("x")
                if let (Some(Token::Punct('(')), Some(Token::Str(s))) =
                    (tokens.get(i + 1), tokens.get(i + 2))
                {
                    specs.push(s.clone());
                    i += 3;
                    continue;
                }
                // Static forms: import "x" / import a from "x" / import {a} from "x"
                if let Some((spec, next)) = first_string_in_statement(tokens, i + 1) {
                    specs.push(spec);
                    i = next;
                    continue;
                }
                i += 1;
            }
            Token::Ident(name) if name == "export" => {
                // Only re-exports declare a dependency: export ... from "x"
                if let Some((spec, next)) = from_clause_in_statement(tokens, i + 1) {
                    specs.push(spec);
                    i = next;
                    continue;
                }
                i += 1;
            }
            Token::Ident(name) if name == "require" => {
                if let (Some(Token::Punct('(')), Some(Token::Str(s))) =
                    (tokens.get(i + 1), tokens.get(i + 2))
                {
                    specs.push(s.clone());
                    i += 3;
                    continue;
                }
                i += 1;
            }
            _ => i += 1,
        }
    }

    specs
}

/// Finds the first string literal before the end of the current statement.
fn first_string_in_statement(tokens: &[Token], start: usize) -> Option<(String, usize)> {
    for (offset, token) in tokens[start..].iter().enumerate() {
        match token {
            Token::Str(s) => return Some((s.clone(), start + offset + 1)),
            Token::Punct(';') => return None,
            _ => {}
        }
    }
    None
}

/// Finds a `from "x"` clause before the end of the current statement.
fn from_clause_in_statement(tokens: &[Token], start: usize) -> Option<(String, usize)> {
    for (offset, token) in tokens[start..].iter().enumerate() {
        match token {
            Token::Ident(kw) if kw == "from" => {
                if let Some(Token::Str(s)) = tokens.get(start + offset + 1) {
                    return Some((s.clone(), start + offset + 2));
                }
                return None;
            }
            Token::Punct(';') => return None,
            _ => {}
        }
    }
    None
}

/// Recognizes `@import "x"` and `@import url("x")` specifiers.
fn scan_style(tokens: &[Token]) -> Vec<String> {
    let mut specs = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        if matches!(&tokens[i], Token::Ident(name) if name == "@import") {
            match (tokens.get(i + 1), tokens.get(i + 2), tokens.get(i + 3)) {
                (Some(Token::Str(s)), _, _) => {
                    specs.push(s.clone());
                    i += 2;
                    continue;
                }
                (Some(Token::Ident(url)), Some(Token::Punct('(')), Some(Token::Str(s)))
                    if url == "url" =>
                {
                    specs.push(s.clone());
                    i += 4;
                    continue;
                }
                _ => {}
            }
        }
        i += 1;
    }

    specs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_js(src: &str) -> Vec<String> {
        scan_imports(ModuleKind::Script, src)
    }

    fn scan_css(src: &str) -> Vec<String> {
        scan_imports(ModuleKind::Style, src)
    }

    #[test]
    fn bare_import() {
        assert_eq!(scan_js(r#"import "./style.css";"#), vec!["./style.css"]);
    }

    #[test]
    fn default_import() {
        assert_eq!(scan_js(r#"import app from "./app";"#), vec!["./app"]);
    }

    #[test]
    fn named_import() {
        assert_eq!(
            scan_js(r#"import { a, b } from './util.js';"#),
            vec!["./util.js"]
        );
    }

    #[test]
    fn dynamic_import() {
        assert_eq!(scan_js(r#"import("./lazy.js")"#), vec!["./lazy.js"]);
    }

    #[test]
    fn require_call() {
        assert_eq!(scan_js(r#"const x = require("lodash");"#), vec!["lodash"]);
    }

    #[test]
    fn reexport() {
        assert_eq!(scan_js(r#"export { a } from "./a";"#), vec!["./a"]);
    }

    #[test]
    fn plain_export_is_not_an_import() {
        assert!(scan_js("export const x = 1;").is_empty());
    }

    #[test]
    fn declaration_order_preserved() {
        let src = r#"
import "./first";
const x = require("./second");
import third from "./third";
"#;
        assert_eq!(scan_js(src), vec!["./first", "./second", "./third"]);
    }

    #[test]
    fn comments_ignored() {
        let src = r#"
// import "./commented";
/* import "./blocked"; */
import "./real";
"#;
        assert_eq!(scan_js(src), vec!["./real"]);
    }

    #[test]
    fn string_contents_ignored() {
        let src = r#"const s = "import './fake'"; import "./real";"#;
        assert_eq!(scan_js(src), vec!["./real"]);
    }

    #[test]
    fn css_import() {
        assert_eq!(scan_css(r#"@import "./base.css";"#), vec!["./base.css"]);
    }

    #[test]
    fn css_import_url() {
        assert_eq!(
            scan_css(r#"@import url("./theme.css");"#),
            vec!["./theme.css"]
        );
    }

    #[test]
    fn css_other_at_rules_ignored() {
        assert!(scan_css("@media (min-width: 600px) { body { color: red } }").is_empty());
    }

    #[test]
    fn assets_never_scanned() {
        assert!(scan_imports(ModuleKind::Asset, r#"import "./x";"#).is_empty());
    }

    #[test]
    fn duplicates_kept_in_order() {
        let src = r#"import "./a"; import "./a";"#;
        assert_eq!(scan_js(src), vec!["./a", "./a"]);
    }
}
