//! LaTeX-flavoured markup for poster text.
//!
//! Source is tokenized, user macros from the preamble are expanded,
//! and the result is parsed into styled paragraphs for
//! [`crate::textflow`]. The supported subset covers font switches,
//! sizes, `itemize`/`center` environments and simple macros.

use std::collections::HashMap;

use crate::error::MarkupError;
use crate::fonts::{win_ansi_byte, BuiltinFont, FontFamily};
use crate::typeset::TextEncoding;

/// Maximum nesting of macro expansions before giving up.
pub const MAX_EXPANSION_DEPTH: usize = 32;

/// Maximum number of tokens produced by macro bodies in one document.
pub const MAX_EXPANDED_TOKENS: usize = 200_000;

/// Size of `\normalsize` in points (10pt document class).
pub const NORMAL_SIZE: f64 = 10.0;

/// Character style of a text piece.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub family: FontFamily,
    pub bold: bool,
    pub italic: bool,
    /// Font size in points.
    pub size: f64,
}

impl Style {
    pub fn normal(family: FontFamily) -> Self {
        Style {
            family,
            bold: false,
            italic: false,
            size: NORMAL_SIZE,
        }
    }

    pub fn font(&self) -> BuiltinFont {
        BuiltinFont::select(self.family, self.bold, self.italic)
    }
}

/// Inline content of a paragraph.
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    /// Text without breakable spaces. Adjacent `Text` items with no
    /// `Space` between them form one unbreakable word.
    Text { text: String, style: Style },
    Space,
    LineBreak,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

/// A paragraph ready for line breaking.
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub inlines: Vec<Inline>,
    pub align: Align,
    /// List nesting level (0 outside any list).
    pub depth: usize,
    /// Starts with an `\item` bullet.
    pub bullet: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum TokenKind {
    Command(String),
    Char(char),
    BeginGroup,
    EndGroup,
    Space,
    ParBreak,
    Param(usize),
}

#[derive(Debug, Clone, PartialEq)]
struct Token {
    kind: TokenKind,
    pos: usize,
}

fn tokenize(source: &str) -> Result<Vec<Token>, MarkupError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some((pos, ch)) = chars.next() {
        let kind = match ch {
            '\\' => {
                let Some(&(_, next)) = chars.peek() else {
                    return Err(MarkupError::UnknownCommand(String::new()));
                };
                if next.is_ascii_alphabetic() {
                    let mut name = String::new();
                    while let Some(&(_, c)) = chars.peek() {
                        if !c.is_ascii_alphabetic() {
                            break;
                        }
                        name.push(c);
                        chars.next();
                    }
                    tokens.push(Token {
                        kind: TokenKind::Command(name),
                        pos,
                    });
                    // Spaces after a control word are swallowed; a
                    // blank line still ends the paragraph.
                    while matches!(chars.peek(), Some(&(_, ' ' | '\t'))) {
                        chars.next();
                    }
                    if let Some(&(_, '\n')) = chars.peek() {
                        chars.next();
                        while matches!(chars.peek(), Some(&(_, ' ' | '\t'))) {
                            chars.next();
                        }
                        if let Some(&(p, '\n')) = chars.peek() {
                            while matches!(chars.peek(), Some(&(_, c)) if c.is_whitespace()) {
                                chars.next();
                            }
                            tokens.push(Token {
                                kind: TokenKind::ParBreak,
                                pos: p,
                            });
                        }
                    }
                    continue;
                }
                chars.next();
                match next {
                    '%' | '&' | '$' | '#' | '_' | '{' | '}' => TokenKind::Char(next),
                    ',' => TokenKind::Char('\u{A0}'),
                    ' ' => TokenKind::Char(' '),
                    _ => TokenKind::Command(next.to_string()),
                }
            }
            '{' => TokenKind::BeginGroup,
            '}' => TokenKind::EndGroup,
            '%' => {
                for (_, c) in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
                while matches!(chars.peek(), Some(&(_, ' ' | '\t'))) {
                    chars.next();
                }
                continue;
            }
            '#' => match chars.peek() {
                Some(&(_, d @ '1'..='9')) => {
                    chars.next();
                    TokenKind::Param(d as usize - '0' as usize)
                }
                _ => TokenKind::Char('#'),
            },
            '~' => TokenKind::Char('\u{A0}'),
            c if c.is_whitespace() => {
                let mut newlines = usize::from(c == '\n');
                while let Some(&(_, w)) = chars.peek() {
                    if !w.is_whitespace() {
                        break;
                    }
                    if w == '\n' {
                        newlines += 1;
                    }
                    chars.next();
                }
                if newlines >= 2 {
                    TokenKind::ParBreak
                } else {
                    TokenKind::Space
                }
            }
            c => TokenKind::Char(c),
        };
        tokens.push(Token { kind, pos });
    }
    Ok(tokens)
}

#[derive(Debug, Clone)]
struct MacroDef {
    params: usize,
    body: Vec<Token>,
}

/// User macros collected from the preamble.
#[derive(Debug, Clone, Default)]
pub struct Macros {
    defs: HashMap<String, MacroDef>,
}

impl Macros {
    /// Read `\newcommand`, `\renewcommand`, `\providecommand` and
    /// `\usepackage` declarations. Anything else is rejected.
    pub fn from_preamble(preamble: &str) -> Result<Self, MarkupError> {
        let tokens = tokenize(preamble)?;
        let mut macros = Macros::default();
        let mut i = 0;
        while i < tokens.len() {
            match &tokens[i].kind {
                TokenKind::Space | TokenKind::ParBreak => i += 1,
                TokenKind::Command(cmd) if cmd == "usepackage" => {
                    i += 1;
                    i = skip_optional(&tokens, i);
                    let (package, next) = group_text(&tokens, i, "usepackage")?;
                    tracing::debug!(package = %package, "ignoring package");
                    i = next;
                }
                TokenKind::Command(cmd)
                    if cmd == "newcommand" || cmd == "renewcommand" || cmd == "providecommand" =>
                {
                    let keep_existing = cmd == "providecommand";
                    let (name, def, next) = read_definition(&tokens, i + 1)?;
                    i = next;
                    if keep_existing && macros.defs.contains_key(&name) {
                        continue;
                    }
                    macros.defs.insert(name, def);
                }
                other => {
                    return Err(MarkupError::PreambleContent(describe(other)));
                }
            }
        }
        Ok(macros)
    }

    /// Font family selected by `\renewcommand{\familydefault}{...}`,
    /// Roman when not set.
    pub fn default_family(&self) -> FontFamily {
        let Some(def) = self.defs.get("familydefault") else {
            return FontFamily::Roman;
        };
        let body: Vec<_> = def
            .body
            .iter()
            .filter(|t| t.kind != TokenKind::Space)
            .collect();
        match body.as_slice() {
            [t] => match &t.kind {
                TokenKind::Command(c) if c == "sfdefault" => FontFamily::Sans,
                TokenKind::Command(c) if c == "ttdefault" => FontFamily::Mono,
                _ => FontFamily::Roman,
            },
            _ => FontFamily::Roman,
        }
    }

    fn expand(
        &self,
        tokens: Vec<Token>,
        depth: usize,
        produced: &mut usize,
    ) -> Result<Vec<Token>, MarkupError> {
        let mut out = Vec::with_capacity(tokens.len());
        let mut i = 0;
        while i < tokens.len() {
            let def = match &tokens[i].kind {
                TokenKind::Command(name) => self.defs.get(name).map(|d| (name, d)),
                _ => None,
            };
            let Some((name, def)) = def else {
                out.push(tokens[i].clone());
                i += 1;
                continue;
            };
            if depth >= MAX_EXPANSION_DEPTH {
                return Err(MarkupError::RunawayMacro(MAX_EXPANSION_DEPTH));
            }
            i += 1;
            let mut args = Vec::with_capacity(def.params);
            for _ in 0..def.params {
                let (arg, next) = read_argument(&tokens, i)
                    .ok_or_else(|| MarkupError::MissingArgument(name.clone()))?;
                args.push(arg);
                i = next;
            }
            let mut body = Vec::with_capacity(def.body.len());
            for t in &def.body {
                match t.kind {
                    TokenKind::Param(n) => body.extend(args[n - 1].iter().cloned()),
                    _ => body.push(t.clone()),
                }
            }
            *produced += body.len();
            if *produced > MAX_EXPANDED_TOKENS {
                return Err(MarkupError::RunawayMacro(MAX_EXPANDED_TOKENS));
            }
            out.extend(self.expand(body, depth + 1, produced)?);
        }
        Ok(out)
    }
}

fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Command(c) => format!("\\{}", c),
        TokenKind::Char(c) => c.to_string(),
        TokenKind::BeginGroup => "{".into(),
        TokenKind::EndGroup => "}".into(),
        TokenKind::Param(n) => format!("#{}", n),
        TokenKind::Space | TokenKind::ParBreak => " ".into(),
    }
}

fn skip_spaces(tokens: &[Token], mut i: usize) -> usize {
    while i < tokens.len() && tokens[i].kind == TokenKind::Space {
        i += 1;
    }
    i
}

/// Skip a `[...]` optional argument if present.
fn skip_optional(tokens: &[Token], i: usize) -> usize {
    let start = skip_spaces(tokens, i);
    if tokens.get(start).map(|t| &t.kind) != Some(&TokenKind::Char('[')) {
        return i;
    }
    let mut j = start + 1;
    while j < tokens.len() {
        if tokens[j].kind == TokenKind::Char(']') {
            return j + 1;
        }
        j += 1;
    }
    i
}

/// Read a macro argument: a balanced brace group (without its braces)
/// or a single token. Returns the tokens and the index after them.
fn read_argument(tokens: &[Token], i: usize) -> Option<(Vec<Token>, usize)> {
    let i = skip_spaces(tokens, i);
    let first = tokens.get(i)?;
    match first.kind {
        TokenKind::BeginGroup => {
            let mut depth = 0usize;
            for (j, t) in tokens.iter().enumerate().skip(i) {
                match t.kind {
                    TokenKind::BeginGroup => depth += 1,
                    TokenKind::EndGroup => {
                        depth -= 1;
                        if depth == 0 {
                            return Some((tokens[i + 1..j].to_vec(), j + 1));
                        }
                    }
                    _ => {}
                }
            }
            None
        }
        TokenKind::EndGroup | TokenKind::ParBreak => None,
        _ => Some((vec![first.clone()], i + 1)),
    }
}

/// Read a `{name}` group consisting only of characters.
fn group_text(tokens: &[Token], i: usize, cmd: &str) -> Result<(String, usize), MarkupError> {
    let missing = || MarkupError::MissingArgument(cmd.to_string());
    let i = skip_spaces(tokens, i);
    if tokens.get(i).map(|t| &t.kind) != Some(&TokenKind::BeginGroup) {
        return Err(missing());
    }
    let (arg, next) = read_argument(tokens, i).ok_or_else(missing)?;
    let mut text = String::new();
    for t in arg {
        match t.kind {
            TokenKind::Char(c) => text.push(c),
            TokenKind::Space => {}
            _ => return Err(missing()),
        }
    }
    Ok((text.trim().to_string(), next))
}

/// Parse `{\name}[n]{body}` or `\name[n]{body}` after a
/// `\newcommand`-style command.
fn read_definition(tokens: &[Token], i: usize) -> Result<(String, MacroDef, usize), MarkupError> {
    let bad = |msg: &str| MarkupError::BadDefinition(msg.to_string());
    let (name_tokens, mut i) =
        read_argument(tokens, i).ok_or_else(|| bad("missing macro name"))?;
    let name = match name_tokens.as_slice() {
        [Token {
            kind: TokenKind::Command(name),
            ..
        }] => name.clone(),
        _ => return Err(bad("macro name must be a single command")),
    };

    let mut params = 0;
    let j = skip_spaces(tokens, i);
    if tokens.get(j).map(|t| &t.kind) == Some(&TokenKind::Char('[')) {
        let mut digits = String::new();
        let mut k = j + 1;
        loop {
            match tokens.get(k).map(|t| &t.kind) {
                Some(TokenKind::Char(']')) => break,
                Some(TokenKind::Char(c)) if c.is_ascii_digit() => digits.push(*c),
                _ => return Err(bad(&format!("bad parameter count for \\{}", name))),
            }
            k += 1;
        }
        params = digits
            .parse::<usize>()
            .ok()
            .filter(|n| (1..=9).contains(n))
            .ok_or_else(|| bad(&format!("bad parameter count for \\{}", name)))?;
        i = k + 1;
    }

    let j = skip_spaces(tokens, i);
    if tokens.get(j).map(|t| &t.kind) != Some(&TokenKind::BeginGroup) {
        return Err(bad(&format!("missing body for \\{}", name)));
    }
    let (body, next) =
        read_argument(tokens, j).ok_or_else(|| bad(&format!("unclosed body for \\{}", name)))?;
    if let Some(n) = body.iter().find_map(|t| match t.kind {
        TokenKind::Param(n) if n > params => Some(n),
        _ => None,
    }) {
        return Err(bad(&format!("\\{} uses #{} but takes {} arguments", name, n, params)));
    }
    Ok((name, MacroDef { params, body }, next))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Env {
    Itemize,
    Center,
}

impl Env {
    fn from_name(name: &str) -> Option<Env> {
        match name {
            "itemize" => Some(Env::Itemize),
            "center" => Some(Env::Center),
            _ => None,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Env::Itemize => "itemize",
            Env::Center => "center",
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum FrameKind {
    Brace,
    Env(Env),
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    kind: FrameKind,
    saved: Style,
    pos: usize,
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    encoding: TextEncoding,
    base: Style,
    style: Style,
    frames: Vec<Frame>,
    current: Vec<Inline>,
    pending_bullet: bool,
    paragraphs: Vec<Paragraph>,
}

/// Parse markup into paragraphs, expanding `macros` and starting from
/// `base` style.
pub fn parse(
    source: &str,
    macros: &Macros,
    base: Style,
    encoding: TextEncoding,
) -> Result<Vec<Paragraph>, MarkupError> {
    let tokens = macros.expand(tokenize(source)?, 0, &mut 0)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        encoding,
        base,
        style: base,
        frames: Vec::new(),
        current: Vec::new(),
        pending_bullet: false,
        paragraphs: Vec::new(),
    };
    parser.run()?;
    Ok(parser.paragraphs)
}

impl Parser {
    fn run(&mut self) -> Result<(), MarkupError> {
        while self.pos < self.tokens.len() {
            let token = self.tokens[self.pos].clone();
            self.pos += 1;
            match token.kind {
                TokenKind::Char(c) => self.push_char(c)?,
                TokenKind::Space => self.push_space(),
                TokenKind::ParBreak => self.flush(),
                TokenKind::BeginGroup => self.frames.push(Frame {
                    kind: FrameKind::Brace,
                    saved: self.style,
                    pos: token.pos,
                }),
                TokenKind::EndGroup => match self.frames.last() {
                    Some(Frame {
                        kind: FrameKind::Brace,
                        saved,
                        ..
                    }) => {
                        self.style = *saved;
                        self.frames.pop();
                    }
                    _ => return Err(MarkupError::UnexpectedCloseBrace(token.pos)),
                },
                TokenKind::Param(n) => {
                    self.push_char('#')?;
                    self.push_char(char::from(b'0' + n as u8))?;
                }
                TokenKind::Command(name) => self.command(&name, token.pos)?,
            }
        }
        self.flush();
        match self.frames.last() {
            None => Ok(()),
            Some(Frame {
                kind: FrameKind::Brace,
                pos,
                ..
            }) => Err(MarkupError::UnclosedGroup(*pos)),
            Some(Frame {
                kind: FrameKind::Env(env),
                ..
            }) => Err(MarkupError::UnclosedEnvironment(env.name().to_string())),
        }
    }

    fn command(&mut self, name: &str, pos: usize) -> Result<(), MarkupError> {
        let base = self.base.family;
        let style = &mut self.style;
        match name {
            "\\" | "newline" => {
                if self.current.last() == Some(&Inline::Space) {
                    self.current.pop();
                }
                self.current.push(Inline::LineBreak);
            }
            "par" => self.flush(),
            "noindent" | "centering" | "relax" => {}
            "bfseries" => style.bold = true,
            "mdseries" => style.bold = false,
            "itshape" | "slshape" => style.italic = true,
            "upshape" => style.italic = false,
            "rmfamily" => style.family = FontFamily::Roman,
            "sffamily" => style.family = FontFamily::Sans,
            "ttfamily" => style.family = FontFamily::Mono,
            "normalfont" => {
                style.bold = false;
                style.italic = false;
                style.family = base;
            }
            "ldots" | "dots" => self.push_char('\u{2026}')?,
            "textbullet" => self.push_char('\u{2022}')?,
            "textendash" => self.push_char('\u{2013}')?,
            "textemdash" => self.push_char('\u{2014}')?,
            "euro" => self.push_char('\u{20AC}')?,
            "item" => {
                if !self.in_env(Env::Itemize) {
                    return Err(MarkupError::ItemOutsideList);
                }
                self.flush();
                self.pending_bullet = true;
            }
            "begin" => {
                let env_name = self.group_text(name)?;
                let env = Env::from_name(&env_name)
                    .ok_or(MarkupError::UnknownEnvironment(env_name))?;
                self.flush();
                self.frames.push(Frame {
                    kind: FrameKind::Env(env),
                    saved: self.style,
                    pos,
                });
            }
            "end" => {
                let env_name = self.group_text(name)?;
                match self.frames.last().copied() {
                    Some(Frame {
                        kind: FrameKind::Env(env),
                        saved,
                        ..
                    }) if env.name() == env_name => {
                        self.flush();
                        self.frames.pop();
                        self.style = saved;
                    }
                    Some(Frame {
                        kind: FrameKind::Env(env),
                        ..
                    }) => {
                        return Err(MarkupError::MismatchedEnd {
                            expected: env.name().to_string(),
                            found: env_name,
                        })
                    }
                    Some(Frame {
                        kind: FrameKind::Brace,
                        pos,
                        ..
                    }) => return Err(MarkupError::UnclosedGroup(pos)),
                    None => {
                        return Err(MarkupError::MismatchedEnd {
                            expected: String::new(),
                            found: env_name,
                        })
                    }
                }
            }
            _ => {
                if let Some(size) = size_command(name) {
                    style.size = size;
                } else if let Some(apply) = argument_command(name) {
                    self.open_argument(name)?;
                    apply(&mut self.style, base);
                } else {
                    return Err(MarkupError::UnknownCommand(name.to_string()));
                }
            }
        }
        Ok(())
    }

    fn in_env(&self, env: Env) -> bool {
        self.frames
            .iter()
            .any(|f| matches!(f.kind, FrameKind::Env(e) if e == env))
    }

    fn list_depth(&self) -> usize {
        self.frames
            .iter()
            .filter(|f| matches!(f.kind, FrameKind::Env(Env::Itemize)))
            .count()
    }

    /// Consume the `{` that opens a command argument and push a group
    /// frame for it.
    fn open_argument(&mut self, cmd: &str) -> Result<(), MarkupError> {
        let i = skip_spaces(&self.tokens, self.pos);
        match self.tokens.get(i) {
            Some(Token {
                kind: TokenKind::BeginGroup,
                pos,
            }) => {
                self.frames.push(Frame {
                    kind: FrameKind::Brace,
                    saved: self.style,
                    pos: *pos,
                });
                self.pos = i + 1;
                Ok(())
            }
            _ => Err(MarkupError::MissingArgument(cmd.to_string())),
        }
    }

    fn group_text(&mut self, cmd: &str) -> Result<String, MarkupError> {
        let (text, next) = group_text(&self.tokens, self.pos, cmd)?;
        self.pos = next;
        Ok(text)
    }

    fn push_char(&mut self, c: char) -> Result<(), MarkupError> {
        let c = if win_ansi_byte(c).is_some() {
            c
        } else {
            match self.encoding {
                TextEncoding::Latin1 => return Err(MarkupError::Unencodable(c)),
                TextEncoding::Utf8 => {
                    tracing::warn!(character = ?c, "substituting unencodable character");
                    '?'
                }
            }
        };
        let style = self.style;
        if let Some(Inline::Text { text, style: s }) = self.current.last_mut() {
            if *s == style {
                if style.family != FontFamily::Mono {
                    let ligature = match (text.chars().last(), c) {
                        (Some('-'), '-') => Some('\u{2013}'),
                        (Some('\u{2013}'), '-') => Some('\u{2014}'),
                        (Some('`'), '`') => Some('\u{201C}'),
                        (Some('\''), '\'') => Some('\u{201D}'),
                        _ => None,
                    };
                    if let Some(lig) = ligature {
                        text.pop();
                        text.push(lig);
                        return Ok(());
                    }
                }
                text.push(c);
                return Ok(());
            }
        }
        self.current.push(Inline::Text {
            text: c.to_string(),
            style,
        });
        Ok(())
    }

    fn push_space(&mut self) {
        if matches!(self.current.last(), Some(Inline::Text { .. })) {
            self.current.push(Inline::Space);
        }
    }

    fn flush(&mut self) {
        while matches!(
            self.current.last(),
            Some(Inline::Space | Inline::LineBreak)
        ) {
            self.current.pop();
        }
        if self.current.is_empty() && !self.pending_bullet {
            return;
        }
        let align = if self.in_env(Env::Center) {
            Align::Center
        } else {
            Align::Left
        };
        self.paragraphs.push(Paragraph {
            inlines: std::mem::take(&mut self.current),
            align,
            depth: self.list_depth(),
            bullet: self.pending_bullet,
        });
        self.pending_bullet = false;
    }
}

/// Point sizes of the LaTeX 10pt size commands.
fn size_command(name: &str) -> Option<f64> {
    let size = match name {
        "tiny" => 5.0,
        "scriptsize" => 7.0,
        "footnotesize" => 8.0,
        "small" => 9.0,
        "normalsize" => NORMAL_SIZE,
        "large" => 12.0,
        "Large" => 14.4,
        "LARGE" => 17.28,
        "huge" => 20.74,
        "Huge" => 24.88,
        _ => return None,
    };
    Some(size)
}

type StyleChange = fn(&mut Style, FontFamily);

/// Commands that style their single braced argument.
fn argument_command(name: &str) -> Option<StyleChange> {
    let apply: StyleChange = match name {
        "textbf" => |s, _| s.bold = true,
        "textit" | "textsl" => |s, _| s.italic = true,
        "emph" => |s, _| s.italic = !s.italic,
        "texttt" => |s, _| s.family = FontFamily::Mono,
        "textsf" => |s, _| s.family = FontFamily::Sans,
        "textrm" => |s, _| s.family = FontFamily::Roman,
        "textmd" => |s, _| s.bold = false,
        "textup" => |s, _| s.italic = false,
        "textnormal" => |s, base| {
            s.bold = false;
            s.italic = false;
            s.family = base;
        },
        _ => return None,
    };
    Some(apply)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_plain(src: &str) -> Result<Vec<Paragraph>, MarkupError> {
        parse(
            src,
            &Macros::default(),
            Style::normal(FontFamily::Roman),
            TextEncoding::Utf8,
        )
    }

    fn texts(p: &Paragraph) -> Vec<String> {
        p.inlines
            .iter()
            .filter_map(|i| match i {
                Inline::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn words_and_paragraphs() {
        let paras = parse_plain("Hello   world\n\nSecond\n paragraph").unwrap();
        assert_eq!(paras.len(), 2);
        assert_eq!(texts(&paras[0]), vec!["Hello", "world"]);
        assert_eq!(
            paras[0].inlines,
            vec![
                Inline::Text {
                    text: "Hello".into(),
                    style: Style::normal(FontFamily::Roman)
                },
                Inline::Space,
                Inline::Text {
                    text: "world".into(),
                    style: Style::normal(FontFamily::Roman)
                },
            ]
        );
        assert_eq!(texts(&paras[1]), vec!["Second", "paragraph"]);
    }

    #[test]
    fn switches_are_scoped_by_groups() {
        let paras = parse_plain("a {\\bfseries b} c").unwrap();
        let styles: Vec<bool> = paras[0]
            .inlines
            .iter()
            .filter_map(|i| match i {
                Inline::Text { style, .. } => Some(style.bold),
                _ => None,
            })
            .collect();
        assert_eq!(styles, vec![false, true, false]);
    }

    #[test]
    fn argument_command_styles_only_its_argument() {
        let paras = parse_plain("x\\textbf{y}z").unwrap();
        let inl = &paras[0].inlines;
        assert_eq!(inl.len(), 3, "no spaces inside one word: {:?}", inl);
        match &inl[1] {
            Inline::Text { text, style } => {
                assert_eq!(text, "y");
                assert!(style.bold);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn size_switch() {
        let paras = parse_plain("\\large\\bfseries Title").unwrap();
        match &paras[0].inlines[0] {
            Inline::Text { style, .. } => {
                assert_eq!(style.size, 12.0);
                assert!(style.bold);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn itemize_produces_bullets() {
        let src = "\\begin{itemize}\n\\item one\n\\item two\n\\end{itemize}\nafter";
        let paras = parse_plain(src).unwrap();
        assert_eq!(paras.len(), 3);
        assert!(paras[0].bullet && paras[1].bullet);
        assert_eq!(paras[0].depth, 1);
        assert!(!paras[2].bullet);
        assert_eq!(paras[2].depth, 0);
    }

    #[test]
    fn center_environment_aligns() {
        let paras = parse_plain("\\begin{center}mid\\end{center}left").unwrap();
        assert_eq!(paras[0].align, Align::Center);
        assert_eq!(paras[1].align, Align::Left);
    }

    #[test]
    fn comments_and_escapes() {
        let paras = parse_plain("50\\% done % hidden\nnext").unwrap();
        assert_eq!(texts(&paras[0]), vec!["50%", "done", "next"]);
    }

    #[test]
    fn dash_and_quote_ligatures() {
        let paras = parse_plain("a--b---c ``q''").unwrap();
        assert_eq!(texts(&paras[0]), vec!["a\u{2013}b\u{2014}c", "\u{201C}q\u{201D}"]);
    }

    #[test]
    fn line_break_command() {
        let paras = parse_plain("a \\\\ b").unwrap();
        assert_eq!(paras[0].inlines[1], Inline::LineBreak);
    }

    #[test]
    fn malformed_markup_errors() {
        assert_eq!(
            parse_plain("a } b").unwrap_err(),
            MarkupError::UnexpectedCloseBrace(2)
        );
        assert_eq!(
            parse_plain("{open").unwrap_err(),
            MarkupError::UnclosedGroup(0)
        );
        assert_eq!(
            parse_plain("\\frobnicate").unwrap_err(),
            MarkupError::UnknownCommand("frobnicate".into())
        );
        assert_eq!(
            parse_plain("\\textbf x").unwrap_err(),
            MarkupError::MissingArgument("textbf".into())
        );
        assert_eq!(
            parse_plain("\\begin{itemize}\\item a\\end{center}").unwrap_err(),
            MarkupError::MismatchedEnd {
                expected: "itemize".into(),
                found: "center".into()
            }
        );
        assert_eq!(
            parse_plain("\\begin{center}x").unwrap_err(),
            MarkupError::UnclosedEnvironment("center".into())
        );
        assert_eq!(parse_plain("\\item x").unwrap_err(), MarkupError::ItemOutsideList);
        assert_eq!(
            parse_plain("\\begin{tabular}").unwrap_err(),
            MarkupError::UnknownEnvironment("tabular".into())
        );
    }

    #[test]
    fn preamble_macros_expand() {
        let macros = Macros::from_preamble(
            "\\usepackage[utf8]{inputenc}\n\\newcommand{\\hl}[1]{\\textbf{#1}}\n\
             \\newcommand\\me{Ada}",
        )
        .unwrap();
        let paras = parse(
            "\\hl{Hi} \\me",
            &macros,
            Style::normal(FontFamily::Roman),
            TextEncoding::Utf8,
        )
        .unwrap();
        match &paras[0].inlines[0] {
            Inline::Text { text, style } => {
                assert_eq!(text, "Hi");
                assert!(style.bold);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(texts(&paras[0]), vec!["Hi", "Ada"]);
    }

    #[test]
    fn runaway_macro_is_reported() {
        let macros = Macros::from_preamble("\\newcommand{\\loop}{\\loop}").unwrap();
        let err = parse(
            "\\loop",
            &macros,
            Style::normal(FontFamily::Roman),
            TextEncoding::Utf8,
        )
        .unwrap_err();
        assert_eq!(err, MarkupError::RunawayMacro(MAX_EXPANSION_DEPTH));
    }

    #[test]
    fn doubling_macros_hit_the_token_limit() {
        let mut preamble = String::from("\\newcommand{\\ma}{xx}");
        let names: Vec<String> = (b'b'..=b'z').map(|c| format!("m{}", c as char)).collect();
        let mut prev = "ma".to_string();
        for name in &names {
            preamble.push_str(&format!(
                "\\newcommand{{\\{n}}}{{\\{p}\\{p}}}",
                n = name,
                p = prev
            ));
            prev = name.clone();
        }
        let macros = Macros::from_preamble(&preamble).unwrap();
        let err = parse(
            &format!("\\{}", prev),
            &macros,
            Style::normal(FontFamily::Roman),
            TextEncoding::Utf8,
        )
        .unwrap_err();
        assert_eq!(err, MarkupError::RunawayMacro(MAX_EXPANDED_TOKENS));
    }

    #[test]
    fn preamble_rejects_body_text() {
        assert_eq!(
            Macros::from_preamble("hello").unwrap_err(),
            MarkupError::PreambleContent("h".into())
        );
        assert!(matches!(
            Macros::from_preamble("\\newcommand{\\x}{#2}").unwrap_err(),
            MarkupError::BadDefinition(_)
        ));
    }

    #[test]
    fn family_default_from_preamble() {
        let macros =
            Macros::from_preamble("\\renewcommand{\\familydefault}{\\sfdefault}").unwrap();
        assert_eq!(macros.default_family(), FontFamily::Sans);
        assert_eq!(Macros::default().default_family(), FontFamily::Roman);
    }

    #[test]
    fn encoding_policies() {
        let base = Style::normal(FontFamily::Roman);
        let strict = parse("\u{4E2D}", &Macros::default(), base, TextEncoding::Latin1);
        assert_eq!(strict.unwrap_err(), MarkupError::Unencodable('\u{4E2D}'));
        let lenient = parse("\u{4E2D}é", &Macros::default(), base, TextEncoding::Utf8).unwrap();
        assert_eq!(texts(&lenient[0]), vec!["?é"]);
    }
}
