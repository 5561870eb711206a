//! Route precedence
//!
//! Precedence orders routes that share the same `order` by how specific their
//! templates are. Each segment contributes one decimal digit, the first segment
//! being the integer digit, so `products/{id}` becomes `1.4`. Values are kept as
//! exact digit vectors to avoid any floating point comparison issues.

use crate::errors::ParsePrecedenceError;
use crate::routing::constraints::RouteConstraints;
use crate::routing::template::{ParameterPart, RouteTemplate, TemplatePart, TemplateSegment};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Exact decimal precedence value `d0.d1d2d3...`
///
/// Trailing zeros are trimmed so that `1.40` and `1.4` compare equal; the
/// derived lexicographic ordering then matches decimal ordering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Precedence {
    digits: Vec<u8>,
}

impl Precedence {
    pub fn from_digits(digits: impl Into<Vec<u8>>) -> Self {
        let mut digits = digits.into();
        while digits.last() == Some(&0) {
            digits.pop();
        }
        Self { digits }
    }

    pub fn digits(&self) -> &[u8] {
        &self.digits
    }

    /// Precedence for matching incoming paths; lower values are tried first
    pub fn compute_inbound(template: &RouteTemplate) -> Self {
        Self::compute_inbound_with(template, &RouteConstraints::default())
    }

    /// Inbound precedence taking explicitly registered constraints into account
    pub fn compute_inbound_with(template: &RouteTemplate, constraints: &RouteConstraints) -> Self {
        Self::from_digits(
            template
                .segments()
                .iter()
                .map(|segment| inbound_digit(segment, constraints))
                .collect::<Vec<_>>(),
        )
    }

    /// Precedence for link generation; higher values are tried first
    pub fn compute_outbound(template: &RouteTemplate) -> Self {
        Self::compute_outbound_with(template, &RouteConstraints::default())
    }

    pub fn compute_outbound_with(template: &RouteTemplate, constraints: &RouteConstraints) -> Self {
        Self::from_digits(
            template
                .segments()
                .iter()
                .map(|segment| 9 - inbound_digit(segment, constraints))
                .collect::<Vec<_>>(),
        )
    }
}

fn inbound_digit(segment: &TemplateSegment, constraints: &RouteConstraints) -> u8 {
    match segment.simple_part() {
        None => 2,
        Some(TemplatePart::Literal(_)) => 1,
        Some(TemplatePart::Parameter(parameter)) => {
            let constrained = is_constrained(parameter, constraints);
            let digit = if parameter.is_catch_all() {
                8
            } else if parameter.is_optional() {
                6
            } else {
                4
            };
            if constrained {
                digit - 1
            } else {
                digit
            }
        }
    }
}

fn is_constrained(parameter: &ParameterPart, constraints: &RouteConstraints) -> bool {
    !parameter.inline_constraints().is_empty() || constraints.contains(parameter.name())
}

impl fmt::Display for Precedence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.digits.split_first() {
            None => f.write_str("0"),
            Some((first, rest)) => {
                write!(f, "{}", first)?;
                if !rest.is_empty() {
                    f.write_str(".")?;
                    for digit in rest {
                        write!(f, "{}", digit)?;
                    }
                }
                Ok(())
            }
        }
    }
}

impl FromStr for Precedence {
    type Err = ParsePrecedenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let error = || ParsePrecedenceError(s.to_string());
        let (integer, fraction) = match s.split_once('.') {
            Some((integer, fraction)) => (integer, fraction),
            None => (s, ""),
        };
        if integer.len() != 1 {
            return Err(error());
        }

        integer
            .chars()
            .chain(fraction.chars())
            .map(|c| c.to_digit(10).map(|d| d as u8).ok_or_else(error))
            .collect::<Result<Vec<u8>, _>>()
            .map(Self::from_digits)
    }
}

impl Serialize for Precedence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
