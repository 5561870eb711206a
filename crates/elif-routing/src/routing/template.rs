//! Route template parsing
//!
//! A template such as `api/{controller=Home}/{id:int?}` is parsed once into an
//! immutable list of segments. Each segment is one or more parts, and every part
//! is either literal text or a parameter.
//!
//! Supported parameter syntax:
//! - `{name}` required parameter
//! - `{name?}` optional parameter
//! - `{name=value}` parameter with a default value
//! - `{*name}` catch-all, slashes in generated values are encoded
//! - `{**name}` catch-all, slashes in generated values are kept
//! - `{name:int:range(1,10)}` inline constraints, evaluated in declared order
//!
//! `{{` and `}}` escape literal braces.

use crate::errors::TemplateError;
use std::collections::HashSet;
use std::fmt;

/// How a parameter binds path tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    Standard,
    Optional,
    CatchAll { encode_slashes: bool },
}

/// An inline constraint as written in the template, e.g. `range(1,10)`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineConstraint {
    pub text: String,
}

/// A parameter part of a template segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterPart {
    name: String,
    kind: ParameterKind,
    default_value: Option<String>,
    inline_constraints: Vec<InlineConstraint>,
}

impl ParameterPart {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ParameterKind {
        self.kind
    }

    pub fn is_optional(&self) -> bool {
        self.kind == ParameterKind::Optional
    }

    pub fn is_catch_all(&self) -> bool {
        matches!(self.kind, ParameterKind::CatchAll { .. })
    }

    /// Whether generated values should have `/` percent-encoded
    pub fn encode_slashes(&self) -> bool {
        !matches!(self.kind, ParameterKind::CatchAll { encode_slashes: false })
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    pub fn inline_constraints(&self) -> &[InlineConstraint] {
        &self.inline_constraints
    }
}

/// One part of a template segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplatePart {
    Literal(String),
    Parameter(ParameterPart),
}

impl TemplatePart {
    pub fn is_literal(&self) -> bool {
        matches!(self, TemplatePart::Literal(_))
    }

    pub fn as_parameter(&self) -> Option<&ParameterPart> {
        match self {
            TemplatePart::Parameter(parameter) => Some(parameter),
            TemplatePart::Literal(_) => None,
        }
    }
}

/// A `/`-delimited segment of a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSegment {
    parts: Vec<TemplatePart>,
}

impl TemplateSegment {
    pub fn parts(&self) -> &[TemplatePart] {
        &self.parts
    }

    /// A simple segment holds exactly one literal or one parameter
    pub fn is_simple(&self) -> bool {
        self.parts.len() == 1
    }

    pub fn simple_part(&self) -> Option<&TemplatePart> {
        if self.is_simple() {
            self.parts.first()
        } else {
            None
        }
    }
}

/// Parsed route template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTemplate {
    text: String,
    segments: Vec<TemplateSegment>,
    parameters: Vec<ParameterPart>,
}

impl RouteTemplate {
    /// Parse a route template
    pub fn parse(text: &str) -> Result<Self, TemplateError> {
        Parser { template: text }.parse()
    }

    /// The template text exactly as registered
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn segments(&self) -> &[TemplateSegment] {
        &self.segments
    }

    /// Parameters in declaration order
    pub fn parameters(&self) -> &[ParameterPart] {
        &self.parameters
    }

    /// Find a parameter by name (case-insensitive)
    pub fn parameter(&self, name: &str) -> Option<&ParameterPart> {
        self.parameters.iter().find(|p| p.name.eq_ignore_ascii_case(name))
    }

    pub fn has_catch_all(&self) -> bool {
        self.parameters.iter().any(ParameterPart::is_catch_all)
    }
}

impl fmt::Display for RouteTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

struct Parser<'a> {
    template: &'a str,
}

impl<'a> Parser<'a> {
    fn parse(&self) -> Result<RouteTemplate, TemplateError> {
        let mut body = self.template;
        if let Some(rest) = body.strip_prefix("~/") {
            body = rest;
        } else if let Some(rest) = body.strip_prefix('/') {
            body = rest;
        }
        if let Some(rest) = body.strip_suffix('/') {
            body = rest;
        }

        let mut segments = Vec::new();
        if !body.is_empty() {
            for raw in self.split_segments(body)? {
                if raw.is_empty() {
                    return Err(TemplateError::EmptySegment {
                        template: self.template.to_string(),
                    });
                }
                segments.push(self.parse_segment(raw)?);
            }
        }

        let parameters = self.validate(&segments)?;
        Ok(RouteTemplate {
            text: self.template.to_string(),
            segments,
            parameters,
        })
    }

    /// Split on `/` outside of parameters so constraint arguments may contain slashes
    fn split_segments(&self, body: &'a str) -> Result<Vec<&'a str>, TemplateError> {
        let mut segments = Vec::new();
        let mut start = 0;
        let mut in_parameter = false;
        let bytes = body.as_bytes();
        let mut i = 0;

        while i < bytes.len() {
            let c = bytes[i];
            let doubled = bytes.get(i + 1) == Some(&c);
            if in_parameter {
                match c {
                    b'{' | b'}' if doubled => i += 1,
                    b'}' => in_parameter = false,
                    _ => {}
                }
            } else {
                match c {
                    b'{' | b'}' if doubled => i += 1,
                    b'{' => in_parameter = true,
                    b'/' => {
                        segments.push(&body[start..i]);
                        start = i + 1;
                    }
                    _ => {}
                }
            }
            i += 1;
        }

        if in_parameter {
            return Err(self.unbalanced());
        }
        segments.push(&body[start..]);
        Ok(segments)
    }

    fn parse_segment(&self, raw: &str) -> Result<TemplateSegment, TemplateError> {
        let mut parts = Vec::new();
        let mut literal = String::new();
        let mut chars = raw.char_indices().peekable();

        while let Some((index, c)) = chars.next() {
            match c {
                '{' if matches!(chars.peek(), Some((_, '{'))) => {
                    chars.next();
                    literal.push('{');
                }
                '}' if matches!(chars.peek(), Some((_, '}'))) => {
                    chars.next();
                    literal.push('}');
                }
                '}' => return Err(self.unbalanced()),
                '{' => {
                    let end = self.parameter_end(raw, index + 1)?;
                    if !literal.is_empty() {
                        parts.push(TemplatePart::Literal(std::mem::take(&mut literal)));
                    }
                    let parameter = self.parse_parameter(&raw[index + 1..end])?;
                    parts.push(TemplatePart::Parameter(parameter));
                    while matches!(chars.peek(), Some((i, _)) if *i <= end) {
                        chars.next();
                    }
                }
                _ => literal.push(c),
            }
        }
        if !literal.is_empty() {
            parts.push(TemplatePart::Literal(literal));
        }

        Ok(TemplateSegment {
            parts: self.split_optional_separator(parts),
        })
    }

    /// Byte index of the `}` closing the parameter starting at `start`.
    ///
    /// Inside a parameter braces are written doubled; a single `{` is an error.
    fn parameter_end(&self, raw: &str, start: usize) -> Result<usize, TemplateError> {
        let bytes = raw.as_bytes();
        let mut i = start;
        while i < bytes.len() {
            let doubled = bytes.get(i + 1) == Some(&bytes[i]);
            match bytes[i] {
                b'{' | b'}' if doubled => i += 2,
                b'{' => return Err(self.unescaped_brace()),
                b'}' => return Ok(i),
                _ => i += 1,
            }
        }
        Err(self.unbalanced())
    }

    fn parse_parameter(&self, raw: &str) -> Result<ParameterPart, TemplateError> {
        let unescaped = raw.replace("{{", "{").replace("}}", "}");
        let inner = unescaped.as_str();
        let (kind, rest) = if let Some(rest) = inner.strip_prefix("**") {
            (ParameterKind::CatchAll { encode_slashes: false }, rest)
        } else if let Some(rest) = inner.strip_prefix('*') {
            (ParameterKind::CatchAll { encode_slashes: true }, rest)
        } else {
            (ParameterKind::Standard, inner)
        };

        let name_end = rest.find([':', '=', '?']).unwrap_or(rest.len());
        let name = &rest[..name_end];
        if name.is_empty() || name.contains(['{', '}', '/', '*', '(', ')', '.']) {
            return Err(TemplateError::InvalidParameterName {
                template: self.template.to_string(),
                name: name.to_string(),
            });
        }

        let mut remainder = &rest[name_end..];
        let mut inline_constraints = Vec::new();
        while let Some(after_colon) = remainder.strip_prefix(':') {
            let end = constraint_end(after_colon);
            let text = &after_colon[..end];
            if text.is_empty() {
                return Err(self.invalid_parameter(inner));
            }
            inline_constraints.push(InlineConstraint { text: text.to_string() });
            remainder = &after_colon[end..];
        }

        let mut kind = kind;
        let mut default_value = None;
        if let Some(default) = remainder.strip_prefix('=') {
            if default.ends_with('?') {
                return Err(TemplateError::OptionalWithDefault {
                    template: self.template.to_string(),
                    name: name.to_string(),
                });
            }
            default_value = Some(default.to_string());
        } else if remainder == "?" {
            if matches!(kind, ParameterKind::CatchAll { .. }) {
                return Err(TemplateError::OptionalCatchAll {
                    template: self.template.to_string(),
                });
            }
            kind = ParameterKind::Optional;
        } else if !remainder.is_empty() {
            return Err(self.invalid_parameter(inner));
        }

        Ok(ParameterPart {
            name: name.to_string(),
            kind,
            default_value,
            inline_constraints,
        })
    }

    /// `{p1}x.{p2?}` keeps the period as its own part so it can be dropped with the optional value
    fn split_optional_separator(&self, mut parts: Vec<TemplatePart>) -> Vec<TemplatePart> {
        let len = parts.len();
        if len < 2 {
            return parts;
        }
        let trailing_optional =
            matches!(&parts[len - 1], TemplatePart::Parameter(p) if p.is_optional());
        if let TemplatePart::Literal(text) = &mut parts[len - 2] {
            if trailing_optional && text.len() > 1 && text.ends_with('.') {
                text.pop();
                parts.insert(len - 1, TemplatePart::Literal(".".to_string()));
            }
        }
        parts
    }

    fn validate(&self, segments: &[TemplateSegment]) -> Result<Vec<ParameterPart>, TemplateError> {
        let mut parameters = Vec::new();
        let mut seen = HashSet::new();

        for (index, segment) in segments.iter().enumerate() {
            let parts = segment.parts();
            for (position, part) in parts.iter().enumerate() {
                let parameter = match part {
                    TemplatePart::Parameter(parameter) => parameter,
                    TemplatePart::Literal(_) => continue,
                };

                if !seen.insert(parameter.name.to_ascii_lowercase()) {
                    return Err(TemplateError::DuplicateParameter {
                        template: self.template.to_string(),
                        name: parameter.name.clone(),
                    });
                }

                if parameter.is_catch_all() {
                    if !segment.is_simple() {
                        return Err(TemplateError::CatchAllInComplexSegment {
                            template: self.template.to_string(),
                        });
                    }
                    if index + 1 != segments.len() {
                        return Err(TemplateError::CatchAllNotLast {
                            template: self.template.to_string(),
                        });
                    }
                }

                if !segment.is_simple() {
                    if matches!(parts.get(position + 1), Some(TemplatePart::Parameter(_))) {
                        return Err(TemplateError::ConsecutiveParameters {
                            template: self.template.to_string(),
                        });
                    }
                    if parameter.is_optional() {
                        if position + 1 != parts.len() {
                            return Err(TemplateError::OptionalNotLast {
                                template: self.template.to_string(),
                                name: parameter.name.clone(),
                            });
                        }
                        let after_period = matches!(
                            &parts[position - 1],
                            TemplatePart::Literal(text) if text == "."
                        );
                        if !after_period {
                            return Err(TemplateError::OptionalNotAfterPeriod {
                                template: self.template.to_string(),
                                name: parameter.name.clone(),
                            });
                        }
                    }
                }

                parameters.push(parameter.clone());
            }
        }

        Ok(parameters)
    }

    fn unbalanced(&self) -> TemplateError {
        TemplateError::Unbalanced {
            template: self.template.to_string(),
        }
    }

    fn unescaped_brace(&self) -> TemplateError {
        TemplateError::UnescapedBrace {
            template: self.template.to_string(),
        }
    }

    fn invalid_parameter(&self, inner: &str) -> TemplateError {
        TemplateError::InvalidParameter {
            template: self.template.to_string(),
            parameter: inner.to_string(),
        }
    }
}

/// Length of a constraint token: up to the next `:` or `=` outside parentheses,
/// or a trailing `?`
fn constraint_end(text: &str) -> usize {
    let mut depth = 0usize;
    for (index, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ':' | '=' if depth == 0 => return index,
            '?' if depth == 0 && index + 1 == text.len() => return index,
            _ => {}
        }
    }
    text.len()
}
