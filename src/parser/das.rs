//! DAS (dataset attribute) parser.
//!
//! ```text
//! attributes      := "Attributes" "{" attr_container* "}"
//! attr_container  := attribute | named_container
//! named_container := name "{" (attribute | metadata)* "}"
//! attribute       := type name value ("," value)* ";"
//! ```
//!
//! Containers whose name matches a schema node descend into it; all
//! others become free-standing metadata on the current node.

use super::cursor::{Cursor, Pattern};
use super::literal::parse_literal;
use super::{CLOSE_BRACE, COMMA, OPEN_BRACE, SEMICOLON, TYPE_NAME};
use crate::error::ParseError;
use crate::schema::{AttrValue, Attributes, NodeKind, SchemaNode};
use tracing::{debug, trace};

static ATTRIBUTES: Pattern = Pattern::new("'attributes'", "attributes");
static ATTRIBUTE_NAME: Pattern = Pattern::new("attribute name", r"(?:\\\s|[^\s])+");
static CONTAINER_NAME: Pattern = Pattern::new("container name", r"(?:\\\{|[^{])+");
static STRING_VALUE: Pattern = Pattern::new("quoted string", r#""(?:\\\\|\\"|[^"])*""#);
static RAW_VALUE: Pattern = Pattern::new("attribute value", r#"".*?[^\\]"|[^;,]+"#);

/// Parse DAS text and merge its attributes into `dataset`.
///
/// Pass [`SchemaNode::empty_dataset`] when no DDS is available.
pub fn parse_das(text: &str, dataset: SchemaNode) -> Result<SchemaNode, ParseError> {
    DasParser::new(text, dataset).parse()
}

/// Recursive-descent parser for the DAS grammar.
#[derive(Debug)]
pub struct DasParser<'a> {
    cursor: Cursor<'a>,
    dataset: SchemaNode,
    // Member names leading from the dataset root to the current target.
    target: Vec<String>,
    aliases: Vec<AliasLink>,
}

/// Where a resolved alias was stored, and how to resolve it again once
/// the whole DAS has been merged.
#[derive(Debug)]
struct AliasLink {
    node: Vec<String>,
    keys: Vec<String>,
    index: Option<usize>,
    reference: String,
}

/// Intermediate state of alias resolution.
enum Resolved<'n> {
    Node(&'n SchemaNode),
    Attr(&'n AttrValue),
}

impl<'a> DasParser<'a> {
    /// Create a parser that merges into `dataset`.
    pub fn new(text: &'a str, dataset: SchemaNode) -> Self {
        Self {
            cursor: Cursor::new(text),
            dataset,
            target: Vec::new(),
            aliases: Vec::new(),
        }
    }

    /// Parse the whole DAS and return the enriched schema.
    pub fn parse(mut self) -> Result<SchemaNode, ParseError> {
        self.cursor.consume(&ATTRIBUTES)?;
        self.cursor.consume(&OPEN_BRACE)?;
        while !self.cursor.at(&CLOSE_BRACE) {
            self.attr_container()?;
        }
        self.cursor.consume(&CLOSE_BRACE)?;
        self.refresh_aliases()?;
        Ok(self.dataset)
    }

    /// Re-resolve every alias against the fully merged tree, so node
    /// aliases see attributes declared after them.
    fn refresh_aliases(&mut self) -> Result<(), ParseError> {
        for link in std::mem::take(&mut self.aliases) {
            let value = self.resolve_alias(&link.node, &link.reference)?;
            if let Some(slot) = alias_slot(&mut self.dataset, &link) {
                *slot = value;
            }
        }
        Ok(())
    }

    /// Drop pending aliases stored at or below `keys` on the current target.
    fn forget_aliases(&mut self, keys: &[String]) {
        let node = &self.target;
        self.aliases
            .retain(|link| !(&link.node == node && link.keys.starts_with(keys)));
    }

    fn attr_container(&mut self) -> Result<(), ParseError> {
        if !self.at_attribute() {
            return self.container();
        }
        let (name, value) = self.attribute(&[])?;
        let target = self.target_mut()?;
        target.attributes.insert(name.clone(), value.clone());
        if target.kind == NodeKind::Grid {
            self.copy_to_maps(&name, &value)?;
        } else if let Some(variable) = self.mirrored_variable() {
            trace!("Mirroring {} onto {}", name, variable);
            if let Some(node) = self.dataset.child_mut(&variable) {
                node.attributes.insert(name, value);
            }
        }
        Ok(())
    }

    /// Copy a grid attribute onto its maps that have a dataset-level namesake.
    fn copy_to_maps(&mut self, name: &str, value: &AttrValue) -> Result<(), ParseError> {
        let dataset = &self.dataset;
        let shared: Vec<String> = self
            .target()?
            .maps
            .iter()
            .filter(|m| dataset.child(&m.name).is_some())
            .map(|m| m.name.clone())
            .collect();
        let grid = self.target_mut()?;
        for map in grid.maps.iter_mut().filter(|m| shared.contains(&m.name)) {
            trace!("Copying {} onto map {}", name, map.name);
            map.attributes.insert(name.to_string(), value.clone());
        }
        Ok(())
    }

    /// Name of the dataset-level variable that mirrors the current target,
    /// when the target is a grid map with such a namesake.
    fn mirrored_variable(&self) -> Option<String> {
        let (name, parent) = self.target.split_last()?;
        if parent.is_empty() {
            return None;
        }
        let grid = self.dataset.descend(parent)?;
        if grid.kind != NodeKind::Grid || grid.map(name).is_none() {
            return None;
        }
        self.dataset.child(name).map(|_| name.clone())
    }

    fn container(&mut self) -> Result<(), ParseError> {
        let name = self.cursor.consume(&CONTAINER_NAME)?.trim().to_string();
        self.cursor.consume(&OPEN_BRACE)?;

        let steps: Vec<String> = if name.contains('.') {
            name.split('.').map(str::to_string).collect()
        } else if self.target()?.kind.is_container() && self.target()?.child(&name).is_some() {
            vec![name.clone()]
        } else {
            Vec::new()
        };

        if !steps.is_empty() && self.target()?.descend(&steps).is_some() {
            debug!("Entering attribute container {}", name);
            let depth = self.target.len();
            self.target.extend(steps);
            while !self.cursor.at(&CLOSE_BRACE) {
                self.attr_container()?;
            }
            self.cursor.consume(&CLOSE_BRACE)?;
            self.target.truncate(depth);
        } else {
            trace!("Reading metadata container {}", name);
            let scope = [name.clone()];
            self.forget_aliases(&scope);
            let metadata = self.metadata(&scope)?;
            self.cursor.consume(&CLOSE_BRACE)?;
            self.target_mut()?
                .attributes
                .insert(name, AttrValue::Container(metadata));
        }
        Ok(())
    }

    fn metadata(&mut self, scope: &[String]) -> Result<Attributes, ParseError> {
        let mut output = Attributes::new();
        while !self.cursor.at(&CLOSE_BRACE) {
            if self.at_attribute() {
                let (name, value) = self.attribute(scope)?;
                output.insert(name, value);
            } else {
                let name = self.cursor.consume(&CONTAINER_NAME)?.trim().to_string();
                self.cursor.consume(&OPEN_BRACE)?;
                let mut nested_scope = scope.to_vec();
                nested_scope.push(name.clone());
                self.forget_aliases(&nested_scope);
                let nested = self.metadata(&nested_scope)?;
                self.cursor.consume(&CLOSE_BRACE)?;
                output.insert(name, AttrValue::Container(nested));
            }
        }
        Ok(output)
    }

    /// Parse one attribute. `scope` holds the metadata container names
    /// enclosing it on the current target.
    fn attribute(&mut self, scope: &[String]) -> Result<(String, AttrValue), ParseError> {
        let kind = NodeKind::from_token(self.cursor.consume(&TYPE_NAME)?);
        let name = self.cursor.consume(&ATTRIBUTE_NAME)?.trim().to_string();
        let mut keys = scope.to_vec();
        keys.push(name.clone());
        self.forget_aliases(&keys);
        let mut values = Vec::new();
        let mut references = Vec::new();
        while !self.cursor.at(&SEMICOLON) {
            let value = match kind {
                NodeKind::String => {
                    let quoted = self.cursor.consume(&STRING_VALUE)?.trim();
                    AttrValue::Str(unquote(quoted))
                },
                NodeKind::Url => AttrValue::Url(self.cursor.consume(&RAW_VALUE)?.trim().to_string()),
                NodeKind::Alias => {
                    let reference = self.cursor.consume(&RAW_VALUE)?.trim();
                    let reference = reference.trim_matches('"').to_string();
                    let value = self.resolve_alias(&self.target, &reference)?;
                    references.push((values.len(), reference));
                    value
                },
                _ => numeric_value(self.cursor.consume_value()?.trim())?,
            };
            values.push(value);
            if self.cursor.at(&COMMA) {
                self.cursor.consume(&COMMA)?;
            }
        }
        self.cursor.consume(&SEMICOLON)?;
        trace!("Attribute {} {} ({} values)", kind, name, values.len());
        let listed = values.len() > 1;
        for (index, reference) in references {
            self.aliases.push(AliasLink {
                node: self.target.clone(),
                keys: keys.clone(),
                index: listed.then_some(index),
                reference,
            });
        }
        Ok((name, AttrValue::collapse(values)))
    }

    /// Resolve a dotted reference from the node at `base`. A leading `.`
    /// starts at the dataset root.
    fn resolve_alias(&self, base: &[String], reference: &str) -> Result<AttrValue, ParseError> {
        let (start, path) = match reference.strip_prefix('.') {
            Some(path) => (&self.dataset, path),
            None => (
                self.dataset
                    .descend(base)
                    .ok_or_else(|| self.cursor.error("attribute container"))?,
                reference,
            ),
        };
        let mut current = Resolved::Node(start);
        for token in path.split('.') {
            let next = match current {
                Resolved::Node(node) => node
                    .member(token)
                    .map(Resolved::Node)
                    .or_else(|| node.attributes.get(token).map(Resolved::Attr)),
                Resolved::Attr(AttrValue::Container(attrs)) => attrs.get(token).map(Resolved::Attr),
                Resolved::Attr(AttrValue::Node(node)) => node
                    .member(token)
                    .map(Resolved::Node)
                    .or_else(|| node.attributes.get(token).map(Resolved::Attr)),
                Resolved::Attr(_) => None,
            };
            current = next.ok_or_else(|| ParseError::unresolved_alias(reference))?;
        }
        debug!("Resolved alias {}", reference);
        Ok(match current {
            Resolved::Node(node) => AttrValue::Node(Box::new(node.clone())),
            Resolved::Attr(value) => value.clone(),
        })
    }

    fn at_attribute(&self) -> bool {
        self.cursor
            .peek(&TYPE_NAME)
            .is_some_and(|token| is_attribute_type(token))
    }

    fn target(&self) -> Result<&SchemaNode, ParseError> {
        self.dataset
            .descend(&self.target)
            .ok_or_else(|| self.cursor.error("attribute container"))
    }

    fn target_mut(&mut self) -> Result<&mut SchemaNode, ParseError> {
        let missing = self.cursor.error("attribute container");
        self.dataset.descend_mut(&self.target).ok_or(missing)
    }
}

/// The attribute value a pending alias was stored in.
fn alias_slot<'d>(dataset: &'d mut SchemaNode, link: &AliasLink) -> Option<&'d mut AttrValue> {
    let (first, rest) = link.keys.split_first()?;
    let slot = dataset.descend_mut(&link.node)?.attributes.get_mut(first)?;
    let slot = rest.iter().try_fold(slot, |slot, key| match slot {
        AttrValue::Container(attrs) => attrs.get_mut(key),
        _ => None,
    })?;
    match (link.index, slot) {
        (None, slot) => Some(slot),
        (Some(i), AttrValue::List(items)) => items.get_mut(i),
        _ => None,
    }
}

fn is_attribute_type(token: &str) -> bool {
    matches!(
        NodeKind::from_token(token),
        NodeKind::Byte
            | NodeKind::Int
            | NodeKind::UInt
            | NodeKind::Int16
            | NodeKind::UInt16
            | NodeKind::Int32
            | NodeKind::UInt32
            | NodeKind::Float32
            | NodeKind::Float64
            | NodeKind::String
            | NodeKind::Url
            | NodeKind::Alias
    )
}

fn numeric_value(text: &str) -> Result<AttrValue, ParseError> {
    let value = match text.to_ascii_lowercase().as_str() {
        "nan" => AttrValue::Number(f64::NAN),
        "inf" => AttrValue::Number(f64::INFINITY),
        "-inf" => AttrValue::Number(f64::NEG_INFINITY),
        _ => parse_literal(text)?,
    };
    Ok(value)
}

/// Strip the surrounding quotes and undo `\"` and `\\` escapes.
fn unquote(quoted: &str) -> String {
    let inner = quoted
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(quoted);
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match (c, chars.clone().next()) {
            ('\\', Some(next @ ('"' | '\\'))) => {
                out.push(next);
                chars.next();
            },
            _ => out.push(c),
        }
    }
    out
}
