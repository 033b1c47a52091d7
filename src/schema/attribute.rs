//! DAS attribute values.

use super::SchemaNode;
use std::collections::HashMap;
use std::fmt;

/// Attribute name to value mapping.
pub type Attributes = HashMap<String, AttrValue>;

/// The value of one DAS attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// A `String` attribute, quotes stripped.
    Str(String),
    /// A `Url` attribute, as written.
    Url(String),
    /// A numeric attribute. Every numeric DAS type widens to `f64`.
    Number(f64),
    /// Two or more values, in declaration order.
    List(Vec<AttrValue>),
    /// A free-standing metadata container with no schema counterpart.
    Container(Attributes),
    /// An alias resolved to a schema node.
    Node(Box<SchemaNode>),
}

impl AttrValue {
    /// Collapse parsed values: one value stays scalar, more become a list.
    pub fn collapse(mut values: Vec<AttrValue>) -> Self {
        if values.len() == 1 {
            values.remove(0)
        } else {
            Self::List(values)
        }
    }

    /// Numeric content, if this is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Text content, if this is a string or url.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) | Self::Url(s) => Some(s),
            _ => None,
        }
    }

    /// Nested attributes, if this is a metadata container.
    pub fn as_container(&self) -> Option<&Attributes> {
        match self {
            Self::Container(attrs) => Some(attrs),
            _ => None,
        }
    }

    /// Schema node, if this is a resolved alias.
    pub fn as_node(&self) -> Option<&SchemaNode> {
        match self {
            Self::Node(node) => Some(node),
            _ => None,
        }
    }
}

impl fmt::Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{:?}", s),
            Self::Url(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{}", n),
            Self::List(values) => {
                f.write_str("[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", value)?;
                }
                f.write_str("]")
            },
            Self::Container(attrs) => {
                let mut keys: Vec<_> = attrs.keys().collect();
                keys.sort();
                f.write_str("{")?;
                for (i, key) in keys.into_iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, attrs[key])?;
                }
                f.write_str("}")
            },
            Self::Node(node) => write!(f, "-> {}", node.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapse_single_value_to_scalar() {
        assert_eq!(
            AttrValue::collapse(vec![AttrValue::Number(1.5)]),
            AttrValue::Number(1.5)
        );
        assert_eq!(
            AttrValue::collapse(vec![AttrValue::Number(1.0), AttrValue::Number(2.0)]),
            AttrValue::List(vec![AttrValue::Number(1.0), AttrValue::Number(2.0)])
        );
    }

    #[test]
    fn display_is_compact() {
        let mut attrs = Attributes::new();
        attrs.insert("b".to_string(), AttrValue::Str("x".to_string()));
        attrs.insert("a".to_string(), AttrValue::Number(2.0));
        assert_eq!(AttrValue::Container(attrs).to_string(), "{a: 2, b: \"x\"}");
    }
}
