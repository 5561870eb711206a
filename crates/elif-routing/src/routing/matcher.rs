//! Binding a request path against a single route template

use crate::routing::template::{ParameterPart, RouteTemplate, TemplatePart, TemplateSegment};
use crate::routing::tokenizer::PathTokens;
use crate::routing::values::RouteValues;
use std::sync::Arc;

/// Matches tokenized paths against one template and extracts route values
#[derive(Debug, Clone)]
pub struct TemplateMatcher {
    template: Arc<RouteTemplate>,
    defaults: RouteValues,
}

impl TemplateMatcher {
    /// `defaults` holds both inline template defaults and explicit defaults
    pub fn new(template: Arc<RouteTemplate>, defaults: RouteValues) -> Self {
        Self { template, defaults }
    }

    pub fn template(&self) -> &RouteTemplate {
        &self.template
    }

    pub fn defaults(&self) -> &RouteValues {
        &self.defaults
    }

    /// Try to bind the path; `None` when the template does not fit
    pub fn try_match(&self, tokens: &PathTokens<'_>) -> Option<RouteValues> {
        let segments = self.template.segments();
        if tokens.len() > segments.len() && !self.template.has_catch_all() {
            return None;
        }

        let mut values = RouteValues::with_capacity(self.defaults.len() + segments.len());
        for (key, value) in self.defaults.iter() {
            if self.template.parameter(key).is_none() {
                values.insert(key, value);
            }
        }

        for (index, segment) in segments.iter().enumerate() {
            match tokens.get(index) {
                Some(token) => {
                    if token.is_empty() {
                        return None;
                    }
                    match segment.simple_part() {
                        Some(TemplatePart::Literal(text)) => {
                            if !text.eq_ignore_ascii_case(token) {
                                return None;
                            }
                        }
                        Some(TemplatePart::Parameter(parameter)) if parameter.is_catch_all() => {
                            values.insert(parameter.name(), tokens.remainder(index));
                            break;
                        }
                        Some(TemplatePart::Parameter(parameter)) => {
                            values.insert(parameter.name(), token);
                        }
                        None => {
                            if !match_complex_segment(segment, token, &mut values) {
                                return None;
                            }
                        }
                    }
                }
                None => {
                    let parameter = segment.simple_part().and_then(TemplatePart::as_parameter)?;
                    self.fill_missing(parameter, &mut values)?;
                }
            }
        }

        Some(values)
    }

    /// A segment past the end of the path binds only when it may be left out
    fn fill_missing(&self, parameter: &ParameterPart, values: &mut RouteValues) -> Option<()> {
        match self.defaults.get(parameter.name()) {
            Some(default) => {
                values.insert(parameter.name(), default);
                Some(())
            }
            None if parameter.is_optional() || parameter.is_catch_all() => Some(()),
            None => None,
        }
    }
}

/// Match a multi-part segment such as `{name}.{ext?}`
fn match_complex_segment(
    segment: &TemplateSegment,
    request: &str,
    values: &mut RouteValues,
) -> bool {
    let parts = segment.parts();
    let last = parts.len() - 1;

    let trailing_optional = matches!(&parts[last], TemplatePart::Parameter(p) if p.is_optional());
    let after_period =
        last >= 1 && matches!(&parts[last - 1], TemplatePart::Literal(text) if text == ".");
    if !(trailing_optional && after_period) {
        return match_complex_parts(parts, last, request, values);
    }

    if match_complex_parts(parts, last, request, values) {
        return true;
    }
    // retry without the optional parameter and its period
    if last < 2 || request.ends_with('.') {
        return false;
    }
    match_complex_parts(parts, last - 2, request, values)
}

/// Walk the parts right to left, locating each literal by its last occurrence
fn match_complex_parts(
    parts: &[TemplatePart],
    last_part: usize,
    request: &str,
    values: &mut RouteValues,
) -> bool {
    let folded = request.to_ascii_lowercase();
    let mut last_index = request.len();
    let mut needs_value: Option<&ParameterPart> = None;
    let mut last_literal: Option<&str> = None;
    let mut captured: Vec<(&str, &str)> = Vec::new();

    for index in (0..=last_part).rev() {
        let part = &parts[index];
        let mut new_last_index = last_index;

        match part {
            TemplatePart::Parameter(parameter) => needs_value = Some(parameter),
            TemplatePart::Literal(text) => {
                last_literal = Some(text.as_str());
                // a pending parameter needs at least one character after the literal
                let reserved = if needs_value.is_some() { 1 } else { 0 };
                let end = match last_index.checked_sub(reserved) {
                    Some(end) if end > 0 => floor_char_boundary(request, end),
                    _ => return false,
                };
                let found = match folded[..end].rfind(&text.to_ascii_lowercase()) {
                    Some(found) => found,
                    None => return false,
                };
                if index == last_part && found + text.len() != request.len() {
                    return false;
                }
                new_last_index = found;
            }
        }

        if let Some(parameter) = needs_value {
            if (last_literal.is_some() && part.is_literal()) || index == 0 {
                let start = match last_literal {
                    Some(literal) if part.is_literal() => new_last_index + literal.len(),
                    _ => 0,
                };
                let value = &request[start..last_index.max(start)];
                if value.is_empty() {
                    return false;
                }
                captured.push((parameter.name(), value));
                needs_value = None;
                last_literal = None;
            }
        }

        last_index = new_last_index;
    }

    if last_index != 0 && parts[0].is_literal() {
        return false;
    }
    for (name, value) in captured {
        values.insert(name, value);
    }
    true
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    while index > 0 && !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}
