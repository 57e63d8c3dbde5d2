//! PHP Declaration Scanner
//!
//! A small logos lexer and declaration parser for component source files.
//! It understands just enough PHP to answer four questions without loading
//! any code: which names a file imports, which classes and traits it
//! declares (with their parent, interfaces and used traits), and which
//! public, non-static members each of them declares. Method bodies and
//! expressions are skipped wholesale.

use logos::{Lexer, Logos};
use std::collections::HashMap;

// ═══════════════════════════════════════════════════════════════════════════════
// TOKENS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Logos, Debug, Clone, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"#([^\[\n][^\n]*)?")]
#[logos(skip r"'([^'\\]|\\(.|\n))*'")]
#[logos(skip r#""([^"\\]|\\(.|\n))*""#)]
#[logos(skip r"`([^`\\]|\\(.|\n))*`")]
#[logos(skip r"[0-9][0-9a-zA-Z_.]*")]
pub enum Token {
    /// Identifier, keyword or namespace-qualified name (`Livewire\Component`).
    /// A trailing `\` is kept for group imports.
    #[regex(
        r"\\?[a-zA-Z_\x{80}-\x{10FFFF}][a-zA-Z0-9_\x{80}-\x{10FFFF}]*(\\[a-zA-Z_\x{80}-\x{10FFFF}][a-zA-Z0-9_\x{80}-\x{10FFFF}]*)*\\?",
        |lex| lex.slice().to_string()
    )]
    Name(String),

    /// `$name`, stored without the dollar sign.
    #[regex(r"\$[a-zA-Z_\x{80}-\x{10FFFF}][a-zA-Z0-9_\x{80}-\x{10FFFF}]*", |lex| lex.slice()[1..].to_string())]
    Variable(String),

    #[regex(r"[!$%&()*+,\-./:;<=>?@\[\\\]^{|}~]", |lex| lex.slice().chars().next())]
    Punct(char),

    /// Block comment, `#[...]` attribute or heredoc/nowdoc body. Dropped by
    /// [`tokenize`].
    #[token("/*", block_comment)]
    #[token("#[", attribute)]
    #[token("<<<", heredoc)]
    Skipped,
}

impl Token {
    fn is_name(&self, expected: &str) -> bool {
        matches!(self, Token::Name(n) if n.eq_ignore_ascii_case(expected))
    }

    fn is_punct(&self, expected: char) -> bool {
        matches!(self, Token::Punct(c) if *c == expected)
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || !c.is_ascii()
}

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Consume a `/* ... */` comment; `false` when it is never closed.
fn block_comment(lex: &mut Lexer<Token>) -> bool {
    match lex.remainder().find("*/") {
        Some(end) => {
            lex.bump(end + 2);
            true
        }
        None => false,
    }
}

fn attribute(lex: &mut Lexer<Token>) -> bool {
    match attribute_len(lex.remainder()) {
        Some(len) => {
            lex.bump(len);
            true
        }
        None => false,
    }
}

fn heredoc(lex: &mut Lexer<Token>) -> bool {
    match heredoc_len(lex.remainder()) {
        Some(len) => {
            lex.bump(len);
            true
        }
        None => false,
    }
}

/// Length of an attribute body after `#[`, through its closing `]`.
fn attribute_len(rest: &str) -> Option<usize> {
    let mut depth = 1usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (i, c) in rest.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Length of a heredoc after `<<<`: the `ID`, `'ID'` or `"ID"` opener, the
/// body, and the (possibly indented) closing label.
fn heredoc_len(rest: &str) -> Option<usize> {
    let opener = rest.trim_start_matches(is_blank);
    let opener = opener
        .strip_prefix('\'')
        .or_else(|| opener.strip_prefix('"'))
        .unwrap_or(opener);
    let label_len = opener
        .find(|c: char| !is_ident_char(c))
        .unwrap_or(opener.len());
    if label_len == 0 {
        return None;
    }
    let label = &opener[..label_len];

    // Body starts on the next line
    let label_end = rest.len() - opener.len() + label_len;
    let mut newline = label_end + rest[label_end..].find('\n')?;

    loop {
        let line = &rest[newline + 1..];
        if let Some(after) = line.trim_start_matches(is_blank).strip_prefix(label) {
            if !after.starts_with(is_ident_char) {
                return Some(rest.len() - after.len());
            }
        }
        newline = newline + 1 + line.find('\n')?;
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// LEXER
// ═══════════════════════════════════════════════════════════════════════════════

/// Tokenize PHP source, dropping comments, string literals, heredocs and
/// `#[...]` attributes. Fails only on unterminated constructs and stray
/// characters.
pub fn tokenize(source: &str) -> Result<Vec<Token>, String> {
    let mut lexer = Token::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        match result {
            Ok(Token::Skipped) => {}
            Ok(token) => tokens.push(token),
            Err(()) => return Err(describe_error(lexer.slice(), lexer.span().start)),
        }
    }

    Ok(tokens)
}

fn describe_error(slice: &str, offset: usize) -> String {
    let what = if slice.starts_with("/*") {
        "unterminated block comment"
    } else if slice.starts_with("#[") {
        "unterminated attribute"
    } else if slice.starts_with("<<<") {
        "unterminated heredoc"
    } else if slice.starts_with(|c: char| matches!(c, '\'' | '"' | '`')) {
        "unterminated string literal"
    } else {
        "unexpected character"
    };
    format!("{} at byte {}", what, offset)
}

// ═══════════════════════════════════════════════════════════════════════════════
// DECLARATIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// A class or trait declaration with names as written in the source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassDecl {
    pub name: String,
    pub parent: Option<String>,
    pub interfaces: Vec<String>,
    /// Traits pulled in with `use` inside the body.
    pub traits: Vec<String>,
    /// Public, non-static properties in declaration order.
    pub properties: Vec<String>,
    /// Public, non-static methods in declaration order.
    pub methods: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct FileDecls {
    pub namespace: Option<String>,
    /// Lowercased alias → fully qualified class name.
    pub imports: HashMap<String, String>,
    pub classes: Vec<ClassDecl>,
    pub traits: Vec<ClassDecl>,
}

impl FileDecls {
    /// Resolve a class reference the way PHP does for class names: leading
    /// `\` is absolute, a first segment matching an import is replaced,
    /// anything else is relative to the file's namespace.
    pub fn resolve(&self, name: &str) -> String {
        if let Some(absolute) = name.strip_prefix('\\') {
            return absolute.to_string();
        }

        let (first, rest) = match name.split_once('\\') {
            Some((first, rest)) => (first, Some(rest)),
            None => (name, None),
        };

        if let Some(imported) = self.imports.get(&first.to_ascii_lowercase()) {
            return match rest {
                Some(rest) => format!("{}\\{}", imported, rest),
                None => imported.clone(),
            };
        }

        match &self.namespace {
            Some(ns) => format!("{}\\{}", ns, name),
            None => name.to_string(),
        }
    }
}

const MODIFIERS: &[&str] = &[
    "public",
    "protected",
    "private",
    "static",
    "readonly",
    "var",
    "abstract",
    "final",
];

#[derive(Debug, Default)]
struct Modifiers {
    any: bool,
    public: bool,
    hidden: bool,
    is_static: bool,
    readonly: bool,
}

impl Modifiers {
    fn push(&mut self, word: &str) {
        self.any = true;
        match word.to_ascii_lowercase().as_str() {
            "public" | "var" => self.public = true,
            "protected" | "private" => self.hidden = true,
            "static" => self.is_static = true,
            "readonly" => self.readonly = true,
            _ => {}
        }
    }

    /// Methods without a visibility keyword are public.
    fn exposes_method(&self) -> bool {
        !self.hidden && !self.is_static
    }

    /// Properties need `public`, `var` or at least a modifier that implies a
    /// declaration (`readonly`, `static`) without a hiding keyword.
    fn exposes_property(&self) -> bool {
        self.any && !self.hidden && !self.is_static
    }

    /// Promoted constructor parameters need an explicit visibility or
    /// `readonly`.
    fn promotes(&self) -> bool {
        (self.public || self.readonly) && !self.hidden
    }
}

struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn prev(&self) -> Option<&'a Token> {
        self.pos.checked_sub(1).and_then(|p| self.tokens.get(p))
    }

    fn bump(&mut self) -> Option<&'a Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn eat_punct(&mut self, c: char) -> bool {
        if self.peek().is_some_and(|t| t.is_punct(c)) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_name(&mut self) -> Option<&'a str> {
        match self.peek() {
            Some(Token::Name(n)) => {
                self.pos += 1;
                Some(n.as_str())
            }
            _ => None,
        }
    }

    /// Cursor on an opening delimiter; moves past its matching closer.
    fn skip_balanced(&mut self, open: char, close: char) -> Result<(), String> {
        let mut depth = 0usize;
        while let Some(tok) = self.bump() {
            if tok.is_punct(open) {
                depth += 1;
            } else if tok.is_punct(close) {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Ok(());
                }
            }
        }
        Err(format!("unbalanced '{}'", open))
    }

    /// Moves past the next `;` at nesting depth zero.
    fn skip_statement(&mut self) -> Result<(), String> {
        while let Some(tok) = self.peek() {
            match tok {
                Token::Punct(';') => {
                    self.pos += 1;
                    return Ok(());
                }
                Token::Punct('(') => self.skip_balanced('(', ')')?,
                Token::Punct('[') => self.skip_balanced('[', ']')?,
                Token::Punct('{') => self.skip_balanced('{', '}')?,
                _ => self.pos += 1,
            }
        }
        Ok(())
    }

    fn skip_to_block(&mut self) -> Result<(), String> {
        while let Some(tok) = self.peek() {
            if tok.is_punct('{') {
                return self.skip_balanced('{', '}');
            }
            self.pos += 1;
        }
        Err("declaration without body".to_string())
    }
}

/// `Foo::class`, `$x->class`, `$x?->use`
fn is_member_access(prev: Option<&Token>) -> bool {
    matches!(prev, Some(Token::Punct(':')) | Some(Token::Punct('>')))
}

/// Parse the declarations of one PHP file.
pub fn parse_declarations(source: &str) -> Result<FileDecls, String> {
    let tokens = tokenize(source)?;
    let mut decls = FileDecls::default();
    let mut cur = Cursor::new(&tokens);

    while let Some(tok) = cur.peek() {
        let prev = cur.prev();
        let Token::Name(word) = tok else {
            cur.bump();
            continue;
        };

        if is_member_access(prev) {
            cur.bump();
            continue;
        }

        match word.to_ascii_lowercase().as_str() {
            "namespace" => {
                cur.bump();
                if let Some(ns) = cur.eat_name() {
                    if decls.namespace.is_none() {
                        decls.namespace = Some(ns.trim_start_matches('\\').to_string());
                    }
                }
            }
            "use" => {
                cur.bump();
                parse_use(&mut cur, &mut decls.imports)?;
            }
            "class" => {
                let anonymous = prev.is_some_and(|t| t.is_name("new"));
                cur.bump();
                if anonymous {
                    cur.skip_to_block()?;
                } else if let Some(class) = parse_class(&mut cur)? {
                    decls.classes.push(class);
                }
            }
            "trait" => {
                cur.bump();
                if let Some(decl) = parse_class(&mut cur)? {
                    decls.traits.push(decl);
                }
            }
            "interface" | "enum" => {
                cur.bump();
                if matches!(cur.peek(), Some(Token::Name(_))) {
                    cur.skip_to_block()?;
                }
            }
            _ => {
                cur.bump();
            }
        }
    }

    Ok(decls)
}

fn parse_use(cur: &mut Cursor, imports: &mut HashMap<String, String>) -> Result<(), String> {
    // Closure `use (...)` or `use function` / `use const` imports
    match cur.peek() {
        Some(Token::Name(n))
            if n.eq_ignore_ascii_case("function") || n.eq_ignore_ascii_case("const") =>
        {
            return cur.skip_statement();
        }
        Some(Token::Name(_)) => {}
        _ => return Ok(()),
    }

    loop {
        let Some(name) = cur.eat_name() else {
            return cur.skip_statement();
        };
        let name = name.trim_start_matches('\\');

        if name.ends_with('\\') && cur.eat_punct('{') {
            // Group use: `use App\Models\{User, Post as Article};`
            let prefix = name.to_string();
            loop {
                let Some(member) = cur.eat_name() else { break };
                let alias = parse_alias(cur);
                add_import(imports, &format!("{}{}", prefix, member), alias);
                if !cur.eat_punct(',') {
                    break;
                }
            }
            cur.eat_punct('}');
        } else {
            let alias = parse_alias(cur);
            add_import(imports, name, alias);
        }

        if !cur.eat_punct(',') {
            break;
        }
    }

    cur.skip_statement()
}

fn parse_alias<'a>(cur: &mut Cursor<'a>) -> Option<&'a str> {
    if cur.peek().is_some_and(|t| t.is_name("as")) {
        cur.bump();
        cur.eat_name()
    } else {
        None
    }
}

fn add_import(imports: &mut HashMap<String, String>, fqn: &str, alias: Option<&str>) {
    let alias = alias.unwrap_or_else(|| fqn.rsplit('\\').next().unwrap_or(fqn));
    imports.insert(alias.to_ascii_lowercase(), fqn.to_string());
}

/// Cursor just past the `class` keyword.
fn parse_class(cur: &mut Cursor) -> Result<Option<ClassDecl>, String> {
    let Some(name) = cur.eat_name() else {
        return Ok(None);
    };
    let mut class = ClassDecl {
        name: name.to_string(),
        ..Default::default()
    };

    loop {
        match cur.peek() {
            Some(t) if t.is_name("extends") => {
                cur.bump();
                class.parent = cur.eat_name().map(str::to_string);
            }
            Some(t) if t.is_name("implements") => {
                cur.bump();
                while let Some(iface) = cur.eat_name() {
                    class.interfaces.push(iface.to_string());
                    if !cur.eat_punct(',') {
                        break;
                    }
                }
            }
            Some(Token::Punct('{')) => break,
            Some(_) => {
                cur.bump();
            }
            None => return Err(format!("class {} has no body", class.name)),
        }
    }

    parse_class_body(cur, &mut class)?;
    Ok(Some(class))
}

/// Cursor on the opening brace of a class body; consumes through the
/// closing brace.
fn parse_class_body(cur: &mut Cursor, class: &mut ClassDecl) -> Result<(), String> {
    cur.bump();
    let mut mods = Modifiers::default();

    loop {
        let Some(tok) = cur.peek() else {
            return Err(format!("class {} body is not closed", class.name));
        };

        match tok {
            Token::Punct('}') => {
                cur.bump();
                return Ok(());
            }
            Token::Name(word) if MODIFIERS.iter().any(|m| word.eq_ignore_ascii_case(m)) => {
                mods.push(word);
                cur.bump();
            }
            Token::Name(word) if word.eq_ignore_ascii_case("function") => {
                cur.bump();
                cur.eat_punct('&');
                let name = cur.eat_name().map(str::to_string);
                if let Some(name) = &name {
                    if mods.exposes_method() {
                        class.methods.push(name.clone());
                    }
                }
                if cur.peek().is_some_and(|t| t.is_punct('(')) {
                    if name
                        .as_deref()
                        .is_some_and(|n| n.eq_ignore_ascii_case("__construct"))
                    {
                        parse_promoted_params(cur, &mut class.properties)?;
                    } else {
                        cur.skip_balanced('(', ')')?;
                    }
                }
                skip_method_rest(cur)?;
                mods = Modifiers::default();
            }
            Token::Name(word) if word.eq_ignore_ascii_case("use") => {
                cur.bump();
                parse_trait_use(cur, class)?;
                mods = Modifiers::default();
            }
            Token::Name(word)
                if word.eq_ignore_ascii_case("const") || word.eq_ignore_ascii_case("case") =>
            {
                cur.bump();
                skip_member_statement(cur)?;
                mods = Modifiers::default();
            }
            Token::Variable(_) if mods.any => {
                let exposed = mods.exposes_property();
                parse_property_list(cur, exposed, &mut class.properties)?;
                mods = Modifiers::default();
            }
            Token::Punct('{') => {
                cur.skip_balanced('{', '}')?;
                mods = Modifiers::default();
            }
            // Type declarations between modifiers and the property name
            Token::Name(_) | Token::Punct('?') | Token::Punct('|') | Token::Punct('&')
                if mods.any =>
            {
                cur.bump();
            }
            Token::Punct('(') if mods.any => {
                cur.skip_balanced('(', ')')?;
            }
            _ => {
                cur.bump();
                mods = Modifiers::default();
            }
        }
    }
}

/// After a method's parameter list: optional return type, then `;` or body.
fn skip_method_rest(cur: &mut Cursor) -> Result<(), String> {
    while let Some(tok) = cur.peek() {
        match tok {
            Token::Punct(';') => {
                cur.bump();
                return Ok(());
            }
            Token::Punct('{') => return cur.skip_balanced('{', '}'),
            Token::Punct('}') => return Ok(()),
            Token::Punct('(') => cur.skip_balanced('(', ')')?,
            _ => {
                cur.bump();
            }
        }
    }
    Ok(())
}

/// Cursor just past `use` inside a class or trait body. Records the used
/// traits; a public alias from the adaptation block (`sort as sortBy;`)
/// becomes a method of the using class.
fn parse_trait_use(cur: &mut Cursor, class: &mut ClassDecl) -> Result<(), String> {
    while let Some(name) = cur.eat_name() {
        class.traits.push(name.to_string());
        if !cur.eat_punct(',') {
            break;
        }
    }

    if !cur.peek().is_some_and(|t| t.is_punct('{')) {
        return skip_member_statement(cur);
    }
    cur.bump();

    loop {
        let Some(tok) = cur.bump() else {
            return Err(format!("trait adaptations in {} are not closed", class.name));
        };
        match tok {
            Token::Punct('}') => return Ok(()),
            Token::Name(word) if word.eq_ignore_ascii_case("as") => {
                let mut mods = Modifiers::default();
                while let Some(Token::Name(m)) = cur.peek() {
                    if !MODIFIERS.iter().any(|k| m.eq_ignore_ascii_case(k)) {
                        break;
                    }
                    mods.push(m);
                    cur.bump();
                }
                if let Some(alias) = cur.eat_name() {
                    if mods.exposes_method() {
                        class.methods.push(alias.to_string());
                    }
                }
            }
            _ => {}
        }
    }
}

/// `const` and enum `case` statements, or a trait `use` without an
/// adaptation block.
fn skip_member_statement(cur: &mut Cursor) -> Result<(), String> {
    while let Some(tok) = cur.peek() {
        match tok {
            Token::Punct(';') => {
                cur.bump();
                return Ok(());
            }
            Token::Punct('{') => return cur.skip_balanced('{', '}'),
            Token::Punct('}') => return Ok(()),
            Token::Punct('(') => cur.skip_balanced('(', ')')?,
            Token::Punct('[') => cur.skip_balanced('[', ']')?,
            _ => {
                cur.bump();
            }
        }
    }
    Ok(())
}

/// Cursor on the first `$name` of `public $a = [..], $b;`.
fn parse_property_list(
    cur: &mut Cursor,
    exposed: bool,
    properties: &mut Vec<String>,
) -> Result<(), String> {
    let mut expect_name = true;
    while let Some(tok) = cur.peek() {
        match tok {
            Token::Variable(name) if expect_name => {
                if exposed {
                    properties.push(name.clone());
                }
                expect_name = false;
                cur.bump();
            }
            Token::Punct(',') => {
                expect_name = true;
                cur.bump();
            }
            Token::Punct(';') => {
                cur.bump();
                return Ok(());
            }
            // Property hooks end the declaration without a semicolon
            Token::Punct('{') => return cur.skip_balanced('{', '}'),
            Token::Punct('}') => return Ok(()),
            Token::Punct('(') => cur.skip_balanced('(', ')')?,
            Token::Punct('[') => cur.skip_balanced('[', ']')?,
            _ => {
                cur.bump();
            }
        }
    }
    Ok(())
}

/// Cursor on the `(` of a constructor. Records promoted parameters that are
/// publicly visible.
fn parse_promoted_params(cur: &mut Cursor, properties: &mut Vec<String>) -> Result<(), String> {
    cur.bump();
    let mut mods = Modifiers::default();

    loop {
        let Some(tok) = cur.bump() else {
            return Err("unbalanced '('".to_string());
        };
        match tok {
            Token::Punct(')') => return Ok(()),
            Token::Punct(',') => mods = Modifiers::default(),
            Token::Name(word) if MODIFIERS.iter().any(|m| word.eq_ignore_ascii_case(m)) => {
                mods.push(word);
            }
            Token::Variable(name) => {
                if mods.promotes() {
                    properties.push(name.clone());
                }
                // Default value up to the next parameter
                while let Some(next) = cur.peek() {
                    match next {
                        Token::Punct(',') | Token::Punct(')') => break,
                        Token::Punct('(') => cur.skip_balanced('(', ')')?,
                        Token::Punct('[') => cur.skip_balanced('[', ']')?,
                        _ => {
                            cur.bump();
                        }
                    }
                }
            }
            Token::Punct('(') => {
                cur.pos -= 1;
                cur.skip_balanced('(', ')')?;
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class<'a>(decls: &'a FileDecls, name: &str) -> &'a ClassDecl {
        decls.classes.iter().find(|c| c.name == name).unwrap()
    }

    #[test]
    fn test_tokenize_skips_comments_strings_and_attributes() {
        let src = r#"<?php
            // class Fake
            # class AlsoFake
            /* public $hidden; */
            #[Layout('layouts.app')]
            $x = "class Quoted";
            $y = 'it\'s';
        "#;
        let tokens = tokenize(src).unwrap();
        assert!(!tokens.iter().any(|t| t.is_name("Fake")));
        assert!(!tokens.iter().any(|t| t.is_name("AlsoFake")));
        assert!(!tokens.iter().any(|t| t.is_name("hidden")));
        assert!(!tokens.iter().any(|t| t.is_name("Layout")));
        assert!(!tokens.iter().any(|t| t.is_name("Quoted")));
        assert!(tokens.contains(&Token::Variable("x".to_string())));
        assert!(tokens.contains(&Token::Variable("y".to_string())));
    }

    #[test]
    fn test_tokenize_heredoc() {
        let src = "<?php\n$s = <<<EOT\n  public function fake() {\n  EOT;\n$after = 1;\n";
        let tokens = tokenize(src).unwrap();
        assert!(!tokens.iter().any(|t| t.is_name("fake")));
        assert!(tokens.contains(&Token::Variable("after".to_string())));
    }

    #[test]
    fn test_tokenize_unterminated_string_fails() {
        assert!(tokenize("<?php $x = 'oops;").is_err());
        assert!(tokenize("<?php /* never closed").is_err());
    }

    #[test]
    fn test_qualified_names_are_single_tokens() {
        let tokens = tokenize(r"class A extends \Livewire\Component {}").unwrap();
        assert!(tokens.contains(&Token::Name(r"\Livewire\Component".to_string())));
    }

    #[test]
    fn test_parse_use_forms() {
        let src = r#"<?php
            namespace App\Livewire;
            use Livewire\Component;
            use Livewire\Component as LW, App\Models\User;
            use App\Support\{Money, Clock as Timer};
            use function strlen;
        "#;
        let decls = parse_declarations(src).unwrap();
        assert_eq!(decls.namespace.as_deref(), Some(r"App\Livewire"));
        assert_eq!(decls.imports.get("component").unwrap(), r"Livewire\Component");
        assert_eq!(decls.imports.get("lw").unwrap(), r"Livewire\Component");
        assert_eq!(decls.imports.get("user").unwrap(), r"App\Models\User");
        assert_eq!(decls.imports.get("money").unwrap(), r"App\Support\Money");
        assert_eq!(decls.imports.get("timer").unwrap(), r"App\Support\Clock");
        assert!(!decls.imports.contains_key("strlen"));
    }

    #[test]
    fn test_resolve_names() {
        let src = "<?php namespace App\\Livewire; use Livewire\\Component; use App\\Base as B;";
        let decls = parse_declarations(src).unwrap();
        assert_eq!(decls.resolve("Component"), r"Livewire\Component");
        assert_eq!(decls.resolve(r"\Livewire\Component"), r"Livewire\Component");
        assert_eq!(decls.resolve(r"B\Table"), r"App\Base\Table");
        assert_eq!(decls.resolve("Sibling"), r"App\Livewire\Sibling");
    }

    #[test]
    fn test_parse_class_members() {
        let src = r#"<?php
            namespace App\Livewire;

            use Livewire\Component;

            class Counter extends Component implements HasForms, \Stringable
            {
                use WithPagination;

                const MAX = 10;
                public int $count = 0;
                public ?array $filters = ['a' => 1, 'b' => [2, 3]], $sort;
                protected $secret;
                private string $token = '';
                public static $registry = [];
                var $legacy;
                public readonly string $label;

                public function increment(): void
                {
                    $this->count++;
                    $fn = function () { return 1; };
                }

                function implicitPublic() {}
                protected function guarded() {}
                private function hidden() {}
                public static function make() {}
                abstract public function shape(): string;
                final public function &reference() { return $this->count; }
            }
        "#;
        let decls = parse_declarations(src).unwrap();
        let class = class(&decls, "Counter");
        assert_eq!(class.parent.as_deref(), Some("Component"));
        assert_eq!(class.interfaces, vec!["HasForms".to_string(), r"\Stringable".to_string()]);
        assert_eq!(
            class.properties,
            vec!["count", "filters", "sort", "legacy", "label"]
        );
        assert_eq!(
            class.methods,
            vec!["increment", "implicitPublic", "shape", "reference"]
        );
    }

    #[test]
    fn test_promoted_constructor_params() {
        let src = r#"<?php
            class Widget {
                public function __construct(
                    public string $title,
                    protected int $size = 3,
                    private array $opts = [],
                    readonly int $id = 0,
                    $plain = null,
                ) {}
            }
        "#;
        let decls = parse_declarations(src).unwrap();
        let class = class(&decls, "Widget");
        assert_eq!(class.properties, vec!["title", "id"]);
        assert_eq!(class.methods, vec!["__construct"]);
    }

    #[test]
    fn test_class_constant_and_anonymous_class_are_not_declarations() {
        let src = r#"<?php
            $name = Counter::class;
            $obj = new class extends Base { public function fake() {} };
            class Real { public function ok() {} }
        "#;
        let decls = parse_declarations(src).unwrap();
        assert_eq!(decls.classes.len(), 1);
        assert_eq!(decls.classes[0].name, "Real");
        assert_eq!(decls.classes[0].methods, vec!["ok"]);
    }

    #[test]
    fn test_trait_bodies_do_not_leak_imports() {
        let src = r#"<?php
            trait Helpers { use Other; public function help() {} }
            class Real {}
        "#;
        let decls = parse_declarations(src).unwrap();
        assert!(decls.imports.is_empty());
        assert_eq!(decls.classes.len(), 1);
        assert_eq!(decls.traits.len(), 1);
        assert_eq!(decls.traits[0].traits, vec!["Other"]);
    }

    #[test]
    fn test_trait_declarations_collect_public_members() {
        let src = r#"<?php
            namespace App\Livewire\Concerns;
            trait HasSorting
            {
                public $sortField = 'id';
                protected $sortCache;
                public function sortBy($field) {}
                protected function applySort($query) {}
                public static function defaults() {}
            }
        "#;
        let decls = parse_declarations(src).unwrap();
        assert!(decls.classes.is_empty());
        let sorting = &decls.traits[0];
        assert_eq!(sorting.name, "HasSorting");
        assert_eq!(sorting.properties, vec!["sortField"]);
        assert_eq!(sorting.methods, vec!["sortBy"]);
    }

    #[test]
    fn test_trait_use_inside_class_body() {
        let src = r#"<?php
            class Table extends Component
            {
                use WithPagination, Concerns\HasSorting;
                use HasFilters {
                    HasFilters::apply as applyFilters;
                    clear as protected clearFilters;
                    reset as public;
                }

                public $rows;
            }
        "#;
        let decls = parse_declarations(src).unwrap();
        let table = class(&decls, "Table");
        assert_eq!(
            table.traits,
            vec!["WithPagination", r"Concerns\HasSorting", "HasFilters"]
        );
        assert_eq!(table.methods, vec!["applyFilters"]);
        assert_eq!(table.properties, vec!["rows"]);
    }

    #[test]
    fn test_tokenize_reports_stray_characters() {
        let err = tokenize("<?php $x = 'fine'; \u{7}").unwrap_err();
        assert!(err.contains("unexpected character"), "got {}", err);
    }

    #[test]
    fn test_unclosed_class_body_fails() {
        let src = "<?php class Broken { public function a() {}";
        assert!(parse_declarations(src).is_err());
    }
}
