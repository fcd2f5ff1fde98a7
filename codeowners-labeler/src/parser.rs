use std::{fs::File, io::Read, path::Path};

use crate::{
    observer::{NoopObserver, Observer},
    ruleset::{Rule, RuleSet},
};

/// Parse a CODEOWNERS file from a string, returning a `ParseResult` containing
/// the parsed rules and any warnings encountered.
pub fn parse(source: &str) -> ParseResult {
    Parser::new(source, &NoopObserver).parse()
}

/// Like [`parse`], but reports each parsed rule and warning to `observer`.
pub fn parse_with_observer(source: &str, observer: &dyn Observer) -> ParseResult {
    Parser::new(source, observer).parse()
}

/// Parse a CODEOWNERS file from a file path, reading the contents of the file
/// and returning a `ParseResult` containing the parsed rules and any warnings
/// encountered.
pub fn parse_file(path: &Path) -> std::io::Result<ParseResult> {
    let mut file = File::open(path)?;
    let mut source = String::new();
    file.read_to_string(&mut source)?;
    Ok(parse(&source))
}

/// The result of parsing a CODEOWNERS file. Parsing never fails: lines that
/// can't be fully understood still produce a rule, and a `ParseWarning`
/// describes what was off about them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResult {
    pub rules: Vec<Rule>,
    pub warnings: Vec<ParseWarning>,
}

impl ParseResult {
    /// Convert the `ParseResult` into a `RuleSet`. Warnings are dropped.
    pub fn into_ruleset(self) -> RuleSet {
        RuleSet::new(self.rules)
    }
}

/// An advisory message about a CODEOWNERS line, with its 1-based line number
/// and the byte span it refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWarning {
    pub message: String,
    pub line: usize,
    pub span: Span,
}

impl ParseWarning {
    fn new(message: impl Into<String>, line: usize, span: impl Into<Span>) -> ParseWarning {
        ParseWarning {
            message: message.into(),
            line,
            span: span.into(),
        }
    }
}

/// A span of text in a CODEOWNERS file. Contains the start and end byte offsets
/// of the span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span(pub usize, pub usize);

impl From<(usize, usize)> for Span {
    fn from((start, end): (usize, usize)) -> Self {
        Span(start, end)
    }
}

struct Parser<'a> {
    source: &'a str,
    observer: &'a dyn Observer,
    warnings: Vec<ParseWarning>,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, observer: &'a dyn Observer) -> Self {
        Self {
            source,
            observer,
            warnings: Vec::new(),
        }
    }

    fn parse(mut self) -> ParseResult {
        let mut rules = Vec::new();
        let mut offset = 0;
        for (idx, line) in self.source.split('\n').enumerate() {
            let line_start = offset;
            offset += line.len() + 1;

            if let Some(rule) = self.parse_line(line.trim_end_matches('\r'), idx + 1, line_start) {
                self.observer.rule_parsed(&rule);
                rules.push(rule);
            }
        }

        ParseResult {
            rules,
            warnings: self.warnings,
        }
    }

    // Blank lines and comments produce nothing. Everything else is a pattern
    // followed by zero or more whitespace-separated owners.
    fn parse_line(&mut self, line: &str, line_number: usize, line_start: usize) -> Option<Rule> {
        let content = line.trim_start();
        if content.is_empty() || content.starts_with('#') {
            return None;
        }

        let mut tokens = content.split_whitespace();
        let pattern = tokens.next()?;
        let owners = tokens.map(str::to_owned).collect::<Vec<_>>();

        if owners.is_empty() {
            let start = line_start + (line.len() - content.len());
            let warning = ParseWarning::new(
                format!("pattern `{}` has no owners", pattern),
                line_number,
                (start, start + pattern.len()),
            );
            self.observer.parse_warning(&warning);
            self.warnings.push(warning);
        }

        Some(Rule::new(pattern, owners, line_number))
    }
}
