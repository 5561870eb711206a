//! Route parameter constraints
//!
//! Constraints are evaluated against the full value set of a candidate match,
//! both for incoming requests and for link generation. Inline constraints such
//! as `{id:int:range(1,100)}` are turned into constraint objects by a
//! [`ConstraintResolver`], which also accepts custom registrations.

use crate::errors::ConstraintError;
use crate::routing::values::{fold, RouteValues};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use regex::{Regex, RegexBuilder};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Why a constraint is being evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDirection {
    IncomingRequest,
    UrlGeneration,
}

/// A predicate over the route values of a candidate route
pub trait RouteConstraint: Send + Sync + fmt::Debug {
    fn matches(&self, parameter: &str, values: &RouteValues, direction: RouteDirection) -> bool;
}

/// Constraints available to inline template syntax out of the box
#[derive(Debug, Clone)]
pub enum BuiltinConstraint {
    /// 32-bit signed integer
    Int,
    /// 64-bit signed integer
    Long,
    Bool,
    DateTime,
    Decimal,
    Double,
    Float,
    Guid,
    /// ASCII letters only
    Alpha,
    Min(i64),
    Max(i64),
    Range(i64, i64),
    MinLength(usize),
    MaxLength(usize),
    Length(usize),
    LengthBetween(usize, usize),
    /// Case-insensitive regular expression
    Regex(Regex),
    /// Value must be present and non-empty
    Required,
}

impl BuiltinConstraint {
    /// Check a single value
    pub fn validate(&self, value: &str) -> bool {
        match self {
            BuiltinConstraint::Int => value.parse::<i32>().is_ok(),
            BuiltinConstraint::Long => value.parse::<i64>().is_ok(),
            BuiltinConstraint::Bool => {
                value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false")
            }
            BuiltinConstraint::DateTime => parse_datetime(value),
            BuiltinConstraint::Decimal | BuiltinConstraint::Double => {
                value.parse::<f64>().map(f64::is_finite).unwrap_or(false)
            }
            BuiltinConstraint::Float => value.parse::<f32>().map(f32::is_finite).unwrap_or(false),
            BuiltinConstraint::Guid => uuid::Uuid::parse_str(value).is_ok(),
            BuiltinConstraint::Alpha => {
                !value.is_empty() && value.chars().all(|c| c.is_ascii_alphabetic())
            }
            BuiltinConstraint::Min(min) => value.parse::<i64>().map(|v| v >= *min).unwrap_or(false),
            BuiltinConstraint::Max(max) => value.parse::<i64>().map(|v| v <= *max).unwrap_or(false),
            BuiltinConstraint::Range(min, max) => {
                value.parse::<i64>().map(|v| v >= *min && v <= *max).unwrap_or(false)
            }
            BuiltinConstraint::MinLength(min) => value.chars().count() >= *min,
            BuiltinConstraint::MaxLength(max) => value.chars().count() <= *max,
            BuiltinConstraint::Length(length) => value.chars().count() == *length,
            BuiltinConstraint::LengthBetween(min, max) => {
                let count = value.chars().count();
                count >= *min && count <= *max
            }
            BuiltinConstraint::Regex(regex) => regex.is_match(value),
            BuiltinConstraint::Required => !value.is_empty(),
        }
    }
}

impl RouteConstraint for BuiltinConstraint {
    fn matches(&self, parameter: &str, values: &RouteValues, _direction: RouteDirection) -> bool {
        match values.get(parameter) {
            Some(value) => self.validate(value),
            None => false,
        }
    }
}

fn parse_datetime(value: &str) -> bool {
    DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").is_ok()
        || NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// Wraps the constraints of an optional parameter: a missing value always passes
#[derive(Debug, Clone)]
pub struct OptionalRouteConstraint {
    inner: Arc<dyn RouteConstraint>,
}

impl OptionalRouteConstraint {
    pub fn new(inner: Arc<dyn RouteConstraint>) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &Arc<dyn RouteConstraint> {
        &self.inner
    }
}

impl RouteConstraint for OptionalRouteConstraint {
    fn matches(&self, parameter: &str, values: &RouteValues, direction: RouteDirection) -> bool {
        match values.get(parameter) {
            None | Some("") => true,
            Some(_) => self.inner.matches(parameter, values, direction),
        }
    }
}

/// Ordered constraints for every constrained parameter of one route
#[derive(Debug, Clone, Default)]
pub struct RouteConstraints {
    entries: Vec<(String, Vec<Arc<dyn RouteConstraint>>)>,
}

impl RouteConstraints {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a constraint to a parameter, after any already registered for it
    pub fn add(&mut self, parameter: &str, constraint: Arc<dyn RouteConstraint>) {
        match self
            .entries
            .iter_mut()
            .find(|(name, _)| name.eq_ignore_ascii_case(parameter))
        {
            Some((_, list)) => list.push(constraint),
            None => self.entries.push((parameter.to_string(), vec![constraint])),
        }
    }

    /// Whether the parameter has at least one constraint
    pub fn contains(&self, parameter: &str) -> bool {
        self.get(parameter).is_some()
    }

    pub fn get(&self, parameter: &str) -> Option<&[Arc<dyn RouteConstraint>]> {
        self.entries
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(parameter))
            .map(|(_, list)| list.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Arc<dyn RouteConstraint>])> {
        self.entries.iter().map(|(name, list)| (name.as_str(), list.as_slice()))
    }

    /// Evaluate every constraint in declared order, stopping at the first failure
    pub fn matches(&self, template: &str, values: &RouteValues, direction: RouteDirection) -> bool {
        for (parameter, list) in &self.entries {
            for constraint in list {
                if !constraint.matches(parameter, values, direction) {
                    debug!(
                        target: "elif::routing",
                        template,
                        parameter = parameter.as_str(),
                        value = values.get(parameter).unwrap_or_default(),
                        ?direction,
                        ?constraint,
                        "Route constraint rejected value"
                    );
                    return false;
                }
            }
        }
        true
    }
}

type ConstraintFactory =
    Arc<dyn Fn(Option<&str>) -> Result<Arc<dyn RouteConstraint>, ConstraintError> + Send + Sync>;

/// Turns inline constraint text such as `range(1,10)` into constraint objects
#[derive(Clone)]
pub struct ConstraintResolver {
    factories: HashMap<String, ConstraintFactory>,
}

impl fmt::Debug for ConstraintResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.factories.keys().collect();
        names.sort();
        f.debug_struct("ConstraintResolver").field("constraints", &names).finish()
    }
}

impl Default for ConstraintResolver {
    fn default() -> Self {
        let mut resolver = Self::empty();
        resolver.register_builtins();
        resolver
    }
}

impl ConstraintResolver {
    /// A resolver with the built-in constraints registered
    pub fn new() -> Self {
        Self::default()
    }

    /// A resolver without any registrations
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Register a constraint factory; the factory receives the text between parentheses
    pub fn register<F>(&mut self, name: &str, factory: F) -> &mut Self
    where
        F: Fn(Option<&str>) -> Result<Arc<dyn RouteConstraint>, ConstraintError>
            + Send
            + Sync
            + 'static,
    {
        self.factories.insert(fold(name), Arc::new(factory));
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(&fold(name))
    }

    /// Resolve `name` or `name(arguments)`
    pub fn resolve(&self, text: &str) -> Result<Arc<dyn RouteConstraint>, ConstraintError> {
        let (name, arguments) = match text.find('(') {
            Some(open) if text.ends_with(')') => {
                (&text[..open], Some(&text[open + 1..text.len() - 1]))
            }
            Some(_) => return Err(ConstraintError::Unknown(text.to_string())),
            None => (text, None),
        };

        let factory = self
            .factories
            .get(&fold(name.trim()))
            .ok_or_else(|| ConstraintError::Unknown(text.to_string()))?;
        factory(arguments)
    }

    fn register_builtins(&mut self) {
        self.simple("int", BuiltinConstraint::Int);
        self.simple("long", BuiltinConstraint::Long);
        self.simple("bool", BuiltinConstraint::Bool);
        self.simple("datetime", BuiltinConstraint::DateTime);
        self.simple("decimal", BuiltinConstraint::Decimal);
        self.simple("double", BuiltinConstraint::Double);
        self.simple("float", BuiltinConstraint::Float);
        self.simple("guid", BuiltinConstraint::Guid);
        self.simple("uuid", BuiltinConstraint::Guid);
        self.simple("alpha", BuiltinConstraint::Alpha);
        self.simple("required", BuiltinConstraint::Required);

        self.register("min", |args| {
            let [min] = integer_arguments::<1>("min", args)?;
            Ok(Arc::new(BuiltinConstraint::Min(min)))
        });
        self.register("max", |args| {
            let [max] = integer_arguments::<1>("max", args)?;
            Ok(Arc::new(BuiltinConstraint::Max(max)))
        });
        self.register("range", |args| {
            let [min, max] = integer_arguments::<2>("range", args)?;
            if min > max {
                return Err(invalid("range", "minimum is greater than maximum"));
            }
            Ok(Arc::new(BuiltinConstraint::Range(min, max)))
        });
        self.register("minlength", |args| {
            let [min] = length_arguments::<1>("minlength", args)?;
            Ok(Arc::new(BuiltinConstraint::MinLength(min)))
        });
        self.register("maxlength", |args| {
            let [max] = length_arguments::<1>("maxlength", args)?;
            Ok(Arc::new(BuiltinConstraint::MaxLength(max)))
        });
        self.register("length", |args| {
            let parts = args.map(|a| a.split(',').count()).unwrap_or(0);
            if parts == 2 {
                let [min, max] = length_arguments::<2>("length", args)?;
                if min > max {
                    return Err(invalid("length", "minimum is greater than maximum"));
                }
                Ok(Arc::new(BuiltinConstraint::LengthBetween(min, max)))
            } else {
                let [length] = length_arguments::<1>("length", args)?;
                Ok(Arc::new(BuiltinConstraint::Length(length)))
            }
        });
        self.register("regex", |args| {
            let pattern = args
                .filter(|p| !p.is_empty())
                .ok_or_else(|| invalid("regex", "a pattern is required"))?;
            let regex = RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| invalid("regex", &e.to_string()))?;
            Ok(Arc::new(BuiltinConstraint::Regex(regex)))
        });
    }

    fn simple(&mut self, name: &'static str, constraint: BuiltinConstraint) {
        self.register(name, move |args| match args {
            None => Ok(Arc::new(constraint.clone()) as Arc<dyn RouteConstraint>),
            Some(_) => Err(invalid(name, "takes no arguments")),
        });
    }
}

fn invalid(name: &str, reason: &str) -> ConstraintError {
    ConstraintError::InvalidArguments {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

fn split_arguments<'a, const N: usize>(
    name: &str,
    args: Option<&'a str>,
) -> Result<[&'a str; N], ConstraintError> {
    let parts: Vec<&str> = args.map(|a| a.split(',').map(str::trim).collect()).unwrap_or_default();
    parts
        .try_into()
        .map_err(|_| invalid(name, &format!("expected {} argument(s)", N)))
}

fn integer_arguments<const N: usize>(
    name: &str,
    args: Option<&str>,
) -> Result<[i64; N], ConstraintError> {
    let mut parsed = [0i64; N];
    for (slot, text) in parsed.iter_mut().zip(split_arguments::<N>(name, args)?) {
        *slot = text
            .parse()
            .map_err(|_| invalid(name, &format!("'{}' is not an integer", text)))?;
    }
    Ok(parsed)
}

fn length_arguments<const N: usize>(
    name: &str,
    args: Option<&str>,
) -> Result<[usize; N], ConstraintError> {
    let mut parsed = [0usize; N];
    for (slot, text) in parsed.iter_mut().zip(split_arguments::<N>(name, args)?) {
        *slot = text
            .parse()
            .map_err(|_| invalid(name, &format!("'{}' is not a valid length", text)))?;
    }
    Ok(parsed)
}
