//! Binding route values back into a URL
//!
//! Generation runs in two steps. [`TemplateBinder::get_values`] decides which
//! explicit, ambient and default values a template would use, then
//! [`TemplateBinder::bind_values`] renders those values into a path plus a query
//! string for whatever is left over.

use crate::config::RouterOptions;
use crate::routing::template::{RouteTemplate, TemplatePart};
use crate::routing::values::{route_parts_equal, RouteValues};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use std::sync::Arc;

/// Characters escaped in generated path segments, slashes excluded
const PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b':')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Characters escaped in a single path segment
const PATH_SEGMENT: &AsciiSet = &PATH.add(b'/');

/// Values selected for generating a link from one template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateValuesResult {
    /// Values that end up in the path or the query string
    pub accepted_values: RouteValues,
    /// Accepted values plus ambient values that are not parameters, visible to constraints
    pub combined_values: RouteValues,
}

/// Rendered path and query string, both still without a leading separator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundUrl {
    pub path: String,
    pub query: String,
}

impl BoundUrl {
    /// Final URL with a leading `/`, shaped by the router options
    pub fn render(&self, options: &RouterOptions) -> String {
        let mut url = String::with_capacity(self.path.len() + self.query.len() + 2);
        if !self.path.starts_with('/') {
            url.push('/');
        }
        url.push_str(&self.path);
        if options.lowercase_urls {
            url.make_ascii_lowercase();
        }
        if options.append_trailing_slash && !url.ends_with('/') {
            url.push('/');
        }
        if !self.query.is_empty() {
            url.push('?');
            if options.lowercase_urls && options.lowercase_query_strings {
                url.push_str(&self.query.to_ascii_lowercase());
            } else {
                url.push_str(&self.query);
            }
        }
        url
    }
}

/// Generates URLs for a single template
#[derive(Debug, Clone)]
pub struct TemplateBinder {
    template: Arc<RouteTemplate>,
    defaults: RouteValues,
}

impl TemplateBinder {
    pub fn new(template: Arc<RouteTemplate>, defaults: RouteValues) -> Self {
        Self { template, defaults }
    }

    pub fn template(&self) -> &RouteTemplate {
        &self.template
    }

    /// Select the values used for generation.
    ///
    /// Ambient values are reused parameter by parameter until an explicit value
    /// differs from its ambient counterpart. Returns `None` when a required
    /// parameter has no value or an explicit value conflicts with a
    /// non-parameter default.
    pub fn get_values(
        &self,
        ambient: Option<&RouteValues>,
        values: &RouteValues,
    ) -> Option<TemplateValuesResult> {
        let parameters = self.template.parameters();
        let mut accepted = RouteValues::with_capacity(values.len() + parameters.len());

        for parameter in parameters {
            let name = parameter.name();
            let explicit = values.get(name);
            let current = ambient.and_then(|ambient| ambient.get(name));

            match (explicit, current) {
                (Some(explicit), Some(current))
                    if !route_parts_equal(Some(explicit), Some(current)) =>
                {
                    break
                }
                (Some(explicit), _) => {
                    if !explicit.is_empty() {
                        accepted.accept(name, explicit);
                    }
                }
                (None, Some(current)) => accepted.accept(name, current),
                (None, None) => {}
            }
        }

        for (key, value) in values.iter() {
            if !value.is_empty() {
                accepted.accept(key, value);
            }
        }

        for parameter in parameters {
            if parameter.is_optional()
                || parameter.is_catch_all()
                || accepted.contains_key(parameter.name())
            {
                continue;
            }
            match self.defaults.get(parameter.name()) {
                Some(default) => accepted.accept(parameter.name(), default),
                None => return None,
            }
        }

        for (key, default) in self.defaults.iter() {
            if self.template.parameter(key).is_some() {
                continue;
            }
            if let Some(value) = values.get(key) {
                if !route_parts_equal(Some(value), Some(default)) {
                    return None;
                }
            }
        }

        let mut combined = accepted.clone();
        if let Some(ambient) = ambient {
            for (key, value) in ambient.iter() {
                if !value.is_empty() && self.template.parameter(key).is_none() {
                    combined.accept(key, value);
                }
            }
        }

        Some(TemplateValuesResult {
            accepted_values: accepted,
            combined_values: combined,
        })
    }

    /// Render accepted values into a path and query string
    pub fn bind_values(&self, accepted: &RouteValues) -> Option<BoundUrl> {
        let mut remaining = accepted.clone();
        let mut writer = PathWriter::new();

        for segment in self.template.segments() {
            let parts = segment.parts();
            for (index, part) in parts.iter().enumerate() {
                let parameter = match part {
                    TemplatePart::Literal(text) => {
                        if !writer.accept(text, PATH_SEGMENT) {
                            return None;
                        }
                        continue;
                    }
                    TemplatePart::Parameter(parameter) => parameter,
                };

                let value = remaining.remove(parameter.name());
                let text = value.as_deref().unwrap_or("");
                let escape = if parameter.encode_slashes() { PATH_SEGMENT } else { PATH };
                let same_as_default = self
                    .defaults
                    .get(parameter.name())
                    .map(|default| route_parts_equal(value.as_deref(), Some(default)))
                    .unwrap_or(false);

                if same_as_default {
                    if !writer.buffer(text, escape) {
                        return None;
                    }
                } else if !writer.accept(text, escape) {
                    // `{name}.{ext?}` without an extension drops the period again
                    let after_period = index > 0
                        && parameter.is_optional()
                        && matches!(
                            &parts[index - 1],
                            TemplatePart::Literal(period) if period == "."
                        );
                    if !after_period {
                        return None;
                    }
                    writer.remove_last();
                }
            }
            writer.end_segment();
        }

        let query_values: Vec<(&str, &str)> = remaining
            .iter()
            .filter(|(key, value)| !value.is_empty() && !self.defaults.contains_key(key))
            .collect();
        let query = if query_values.is_empty() {
            String::new()
        } else {
            serde_urlencoded::to_string(&query_values).ok()?
        };

        Some(BoundUrl {
            path: writer.finish(),
            query,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SegmentState {
    Beginning,
    Inside,
}

/// Incremental path builder.
///
/// Values equal to their default are buffered and only written once a later
/// value forces them out, which keeps trailing default segments out of the URL.
#[derive(Debug)]
struct PathWriter {
    uri: String,
    buffer: Vec<(String, Option<&'static AsciiSet>)>,
    uri_state: SegmentState,
    buffer_state: SegmentState,
    has_empty_segment: bool,
    last_value_offset: Option<usize>,
}

impl PathWriter {
    fn new() -> Self {
        Self {
            uri: String::new(),
            buffer: Vec::new(),
            uri_state: SegmentState::Beginning,
            buffer_state: SegmentState::Beginning,
            has_empty_segment: false,
            last_value_offset: None,
        }
    }

    fn accept(&mut self, value: &str, escape: &'static AsciiSet) -> bool {
        if value.is_empty() {
            // an empty part inside a segment cannot be written
            if self.uri_state == SegmentState::Inside || self.buffer_state == SegmentState::Inside {
                return false;
            }
            self.has_empty_segment = true;
            return true;
        }
        if self.has_empty_segment {
            return false;
        }

        for (text, escape) in std::mem::take(&mut self.buffer) {
            match escape {
                Some(escape) => self.uri.extend(utf8_percent_encode(&text, escape)),
                None => self.uri.push_str(&text),
            }
        }

        if self.uri_state == SegmentState::Beginning
            && self.buffer_state == SegmentState::Beginning
            && !self.uri.is_empty()
        {
            self.uri.push('/');
        }
        self.uri_state = SegmentState::Inside;
        self.buffer_state = SegmentState::Inside;
        self.last_value_offset = Some(self.uri.len());

        match value.strip_prefix('/') {
            Some(rest) if self.uri.is_empty() => {
                self.uri.push('/');
                self.uri.extend(utf8_percent_encode(rest, escape));
            }
            _ => self.uri.extend(utf8_percent_encode(value, escape)),
        }
        true
    }

    fn buffer(&mut self, value: &str, escape: &'static AsciiSet) -> bool {
        if value.is_empty() {
            if self.buffer_state == SegmentState::Inside {
                return false;
            }
            self.has_empty_segment = true;
            return true;
        }
        if self.has_empty_segment {
            return false;
        }
        if self.uri_state == SegmentState::Inside {
            return self.accept(value, escape);
        }

        if self.buffer_state == SegmentState::Beginning {
            if !self.uri.is_empty() || !self.buffer.is_empty() {
                self.buffer.push(("/".to_string(), None));
            }
            self.buffer_state = SegmentState::Inside;
        }
        self.buffer.push((value.to_string(), Some(escape)));
        true
    }

    /// Drop the most recently accepted value
    fn remove_last(&mut self) {
        if let Some(offset) = self.last_value_offset.take() {
            self.uri.truncate(offset);
        }
    }

    fn end_segment(&mut self) {
        self.uri_state = SegmentState::Beginning;
        self.buffer_state = SegmentState::Beginning;
    }

    fn finish(self) -> String {
        self.uri
    }
}
