//! Parameter schema and typed parameter values.
//!
//! A [`ParameterDef`] is the registry's static description of one tunable
//! knob on a primitive kind. A [`ParamValue`] is the closed set of values a
//! primitive instance can hold for it. Untyped collaborator input is
//! converted with [`ParamValue::from_json`] against the declared
//! [`ParamType`], and range/enum rules are enforced by
//! [`ParameterDef::check`].

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The declared type of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParamType {
    Number,
    String,
    Boolean,
    Enum,
    /// A token symbol such as `USDC`.
    Asset,
    /// An account address. Treated as opaque text.
    Address,
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParamType::Number => "number",
            ParamType::String => "string",
            ParamType::Boolean => "boolean",
            ParamType::Enum => "enum",
            ParamType::Asset => "asset",
            ParamType::Address => "address",
        };
        f.write_str(name)
    }
}

/// The current value of one parameter on a primitive instance.
///
/// `Unset` and any textual variant holding an empty string count as
/// "missing" (see [`ParamValue::is_empty`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum ParamValue {
    Number(f64),
    Text(String),
    Boolean(bool),
    EnumTag(String),
    Asset(String),
    Address(String),
    Unset,
}

impl ParamValue {
    /// Returns `true` if the value is missing or an empty string.
    pub fn is_empty(&self) -> bool {
        match self {
            ParamValue::Unset => true,
            ParamValue::Text(s)
            | ParamValue::EnumTag(s)
            | ParamValue::Asset(s)
            | ParamValue::Address(s) => s.is_empty(),
            ParamValue::Number(_) | ParamValue::Boolean(_) => false,
        }
    }

    /// The declared type this variant belongs to. `None` for `Unset`.
    pub fn param_type(&self) -> Option<ParamType> {
        match self {
            ParamValue::Number(_) => Some(ParamType::Number),
            ParamValue::Text(_) => Some(ParamType::String),
            ParamValue::Boolean(_) => Some(ParamType::Boolean),
            ParamValue::EnumTag(_) => Some(ParamType::Enum),
            ParamValue::Asset(_) => Some(ParamType::Asset),
            ParamValue::Address(_) => Some(ParamType::Address),
            ParamValue::Unset => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            ParamValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string payload of a textual variant.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s)
            | ParamValue::EnumTag(s)
            | ParamValue::Asset(s)
            | ParamValue::Address(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Builds the textual variant matching `ty`.
    ///
    /// Number and Boolean have no textual form; an attempt to build one from
    /// text yields `Unset` for the empty string and a mismatch otherwise.
    pub fn text(ty: ParamType, s: impl Into<String>) -> Result<ParamValue, ParamError> {
        let s = s.into();
        match ty {
            ParamType::String => Ok(ParamValue::Text(s)),
            ParamType::Enum => Ok(ParamValue::EnumTag(s)),
            ParamType::Asset => Ok(ParamValue::Asset(s)),
            ParamType::Address => Ok(ParamValue::Address(s)),
            ParamType::Number | ParamType::Boolean if s.is_empty() => Ok(ParamValue::Unset),
            ParamType::Number => s
                .trim()
                .parse::<f64>()
                .map(ParamValue::Number)
                .map_err(|_| ParamError::TypeMismatch {
                    expected: ty,
                    found: s,
                }),
            ParamType::Boolean => {
                let flag = match s.trim() {
                    "true" => Some(true),
                    "false" => Some(false),
                    _ => None,
                };
                flag.map(ParamValue::Boolean)
                    .ok_or(ParamError::TypeMismatch {
                        expected: ty,
                        found: s,
                    })
            }
        }
    }

    /// Converts an untyped JSON value into the variant for `ty`.
    ///
    /// `null` becomes `Unset`. Strings are accepted for every type (numbers
    /// and booleans are parsed). JSON numbers and booleans are only accepted
    /// for their own type.
    pub fn from_json(ty: ParamType, raw: &serde_json::Value) -> Result<ParamValue, ParamError> {
        use serde_json::Value;

        match raw {
            Value::Null => Ok(ParamValue::Unset),
            Value::String(s) => ParamValue::text(ty, s.as_str()),
            Value::Number(n) if ty == ParamType::Number => n
                .as_f64()
                .map(ParamValue::Number)
                .ok_or_else(|| ParamError::TypeMismatch {
                    expected: ty,
                    found: n.to_string(),
                }),
            Value::Bool(b) if ty == ParamType::Boolean => Ok(ParamValue::Boolean(*b)),
            other => Err(ParamError::TypeMismatch {
                expected: ty,
                found: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Number(n) => write!(f, "{}", n),
            ParamValue::Boolean(b) => write!(f, "{}", b),
            ParamValue::Text(s)
            | ParamValue::EnumTag(s)
            | ParamValue::Asset(s)
            | ParamValue::Address(s) => f.write_str(s),
            ParamValue::Unset => Ok(()),
        }
    }
}

/// A compile-time default for a parameter definition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Literal {
    Number(f64),
    Text(&'static str),
    Boolean(bool),
}

/// Validation rules attached to a parameter definition.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Constraints {
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    /// Permitted tags for enum parameters. Empty means unrestricted.
    pub allowed: &'static [&'static str],
    pub required: bool,
}

impl Constraints {
    /// A required parameter with no further bounds.
    pub const REQUIRED: Constraints = Constraints {
        minimum: None,
        maximum: None,
        allowed: &[],
        required: true,
    };

    /// A required numeric parameter bounded to `[minimum, maximum]`.
    pub const fn range(minimum: f64, maximum: f64) -> Constraints {
        Constraints {
            minimum: Some(minimum),
            maximum: Some(maximum),
            allowed: &[],
            required: true,
        }
    }

    /// A required enum parameter restricted to `allowed`.
    pub const fn one_of(allowed: &'static [&'static str]) -> Constraints {
        Constraints {
            minimum: None,
            maximum: None,
            allowed,
            required: true,
        }
    }
}

/// Static description of one parameter of a primitive kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParameterDef {
    pub id: &'static str,
    pub name: &'static str,
    #[serde(rename = "type")]
    pub ty: ParamType,
    pub description: &'static str,
    pub default: Literal,
    pub constraints: Constraints,
}

impl ParameterDef {
    /// The typed value a fresh instance starts with.
    pub fn default_value(&self) -> ParamValue {
        match (self.ty, self.default) {
            (ParamType::Number, Literal::Number(n)) => ParamValue::Number(n),
            (ParamType::Boolean, Literal::Boolean(b)) => ParamValue::Boolean(b),
            (ty, Literal::Text(s)) => ParamValue::text(ty, s).unwrap_or(ParamValue::Unset),
            _ => ParamValue::Unset,
        }
    }

    /// Checks `value` against this definition's type and constraints.
    pub fn check(&self, value: &ParamValue) -> Result<(), ConstraintViolation> {
        if value.is_empty() {
            if self.constraints.required {
                return Err(ConstraintViolation::Required {
                    parameter: self.id.to_string(),
                });
            }
            return Ok(());
        }

        if value.param_type() != Some(self.ty) {
            return Err(ConstraintViolation::WrongType {
                parameter: self.id.to_string(),
                expected: self.ty,
            });
        }

        if let Some(n) = value.as_number() {
            if let Some(minimum) = self.constraints.minimum {
                if n < minimum {
                    return Err(ConstraintViolation::BelowMinimum {
                        parameter: self.id.to_string(),
                        minimum,
                        value: n,
                    });
                }
            }
            if let Some(maximum) = self.constraints.maximum {
                if n > maximum {
                    return Err(ConstraintViolation::AboveMaximum {
                        parameter: self.id.to_string(),
                        maximum,
                        value: n,
                    });
                }
            }
        }

        if let ParamValue::EnumTag(tag) = value {
            let allowed = self.constraints.allowed;
            if !allowed.is_empty() && !allowed.contains(&tag.as_str()) {
                return Err(ConstraintViolation::NotAllowed {
                    parameter: self.id.to_string(),
                    value: tag.clone(),
                    allowed: allowed.iter().map(|s| s.to_string()).collect(),
                });
            }
        }

        Ok(())
    }
}

/// Failure to convert raw input into a [`ParamValue`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    #[error("expected a {expected} value, got {found}")]
    TypeMismatch { expected: ParamType, found: String },

    #[error("parameter '{parameter}' is not defined for {kind}")]
    UnknownParameter { kind: String, parameter: String },
}

/// A parameter value that breaks its definition's rules.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConstraintViolation {
    #[error("parameter '{parameter}' is required")]
    Required { parameter: String },

    #[error("parameter '{parameter}' must be at least {minimum} (got {value})")]
    BelowMinimum {
        parameter: String,
        minimum: f64,
        value: f64,
    },

    #[error("parameter '{parameter}' must be at most {maximum} (got {value})")]
    AboveMaximum {
        parameter: String,
        maximum: f64,
        value: f64,
    },

    #[error("parameter '{parameter}' must be one of {allowed:?} (got '{value}')")]
    NotAllowed {
        parameter: String,
        value: String,
        allowed: Vec<String>,
    },

    #[error("parameter '{parameter}' expects a {expected} value")]
    WrongType { parameter: String, expected: ParamType },
}

impl ConstraintViolation {
    /// The parameter the violation is about.
    pub fn parameter(&self) -> &str {
        match self {
            ConstraintViolation::Required { parameter }
            | ConstraintViolation::BelowMinimum { parameter, .. }
            | ConstraintViolation::AboveMaximum { parameter, .. }
            | ConstraintViolation::NotAllowed { parameter, .. }
            | ConstraintViolation::WrongType { parameter, .. } => parameter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const RATE: ParameterDef = ParameterDef {
        id: "rate",
        name: "Rate",
        ty: ParamType::Number,
        description: "",
        default: Literal::Number(5.0),
        constraints: Constraints::range(0.0, 100.0),
    };

    const MODE: ParameterDef = ParameterDef {
        id: "mode",
        name: "Mode",
        ty: ParamType::Enum,
        description: "",
        default: Literal::Text("slow"),
        constraints: Constraints::one_of(&["slow", "fast"]),
    };

    // -----------------------------------------------------------------------
    // Emptiness
    // -----------------------------------------------------------------------

    #[test]
    fn unset_and_empty_text_are_empty() {
        assert!(ParamValue::Unset.is_empty());
        assert!(ParamValue::Asset(String::new()).is_empty());
        assert!(ParamValue::EnumTag(String::new()).is_empty());
        assert!(!ParamValue::Number(0.0).is_empty());
        assert!(!ParamValue::Boolean(false).is_empty());
        assert!(!ParamValue::Asset("USDC".into()).is_empty());
    }

    // -----------------------------------------------------------------------
    // Conversion at the update boundary
    // -----------------------------------------------------------------------

    #[test]
    fn from_json_numbers() {
        assert_eq!(
            ParamValue::from_json(ParamType::Number, &json!(0.3)).unwrap(),
            ParamValue::Number(0.3)
        );
        assert_eq!(
            ParamValue::from_json(ParamType::Number, &json!(" 42 ")).unwrap(),
            ParamValue::Number(42.0)
        );
        assert_eq!(
            ParamValue::from_json(ParamType::Number, &json!("")).unwrap(),
            ParamValue::Unset
        );
        assert!(matches!(
            ParamValue::from_json(ParamType::Number, &json!("lots")),
            Err(ParamError::TypeMismatch { expected: ParamType::Number, .. })
        ));
    }

    #[test]
    fn from_json_text_keeps_declared_variant() {
        assert_eq!(
            ParamValue::from_json(ParamType::Asset, &json!("DAI")).unwrap(),
            ParamValue::Asset("DAI".into())
        );
        assert_eq!(
            ParamValue::from_json(ParamType::Enum, &json!("aggressive")).unwrap(),
            ParamValue::EnumTag("aggressive".into())
        );
        assert_eq!(
            ParamValue::from_json(ParamType::Asset, &json!("")).unwrap(),
            ParamValue::Asset(String::new())
        );
        assert!(ParamValue::from_json(ParamType::Asset, &json!(12)).is_err());
    }

    #[test]
    fn from_json_booleans_and_null() {
        assert_eq!(
            ParamValue::from_json(ParamType::Boolean, &json!(true)).unwrap(),
            ParamValue::Boolean(true)
        );
        assert_eq!(
            ParamValue::from_json(ParamType::Boolean, &json!("false")).unwrap(),
            ParamValue::Boolean(false)
        );
        assert_eq!(
            ParamValue::from_json(ParamType::String, &json!(null)).unwrap(),
            ParamValue::Unset
        );
    }

    // -----------------------------------------------------------------------
    // Constraint checking
    // -----------------------------------------------------------------------

    #[test]
    fn defaults_satisfy_their_own_constraints() {
        assert_eq!(RATE.default_value(), ParamValue::Number(5.0));
        assert_eq!(MODE.default_value(), ParamValue::EnumTag("slow".into()));
        assert!(RATE.check(&RATE.default_value()).is_ok());
        assert!(MODE.check(&MODE.default_value()).is_ok());
    }

    #[test]
    fn range_bounds_are_inclusive() {
        assert!(RATE.check(&ParamValue::Number(0.0)).is_ok());
        assert!(RATE.check(&ParamValue::Number(100.0)).is_ok());
        assert!(matches!(
            RATE.check(&ParamValue::Number(-1.0)),
            Err(ConstraintViolation::BelowMinimum { .. })
        ));
        assert!(matches!(
            RATE.check(&ParamValue::Number(100.5)),
            Err(ConstraintViolation::AboveMaximum { .. })
        ));
    }

    #[test]
    fn required_rejects_empty() {
        let err = RATE.check(&ParamValue::Unset).unwrap_err();
        assert_eq!(err.parameter(), "rate");
        assert!(matches!(err, ConstraintViolation::Required { .. }));
    }

    #[test]
    fn enum_tags_are_restricted() {
        let err = MODE.check(&ParamValue::EnumTag("reckless".into())).unwrap_err();
        assert!(matches!(err, ConstraintViolation::NotAllowed { .. }));
        assert!(err.to_string().contains("reckless"));
    }

    #[test]
    fn wrong_variant_is_reported() {
        assert!(matches!(
            RATE.check(&ParamValue::Text("5".into())),
            Err(ConstraintViolation::WrongType { expected: ParamType::Number, .. })
        ));
    }

    #[test]
    fn display_drops_trailing_zero() {
        assert_eq!(ParamValue::Number(5.0).to_string(), "5");
        assert_eq!(ParamValue::Number(0.3).to_string(), "0.3");
        assert_eq!(ParamValue::Asset("USDC".into()).to_string(), "USDC");
    }

    #[test]
    fn serde_roundtrip() {
        for value in [
            ParamValue::Number(1.5),
            ParamValue::Asset("APT".into()),
            ParamValue::Boolean(true),
            ParamValue::Unset,
        ] {
            let json = serde_json::to_string(&value).unwrap();
            let back: ParamValue = serde_json::from_str(&json).unwrap();
            assert_eq!(value, back);
        }
    }
}
