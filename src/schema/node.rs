//! Schema node types and structures.

use super::{AttrValue, Attributes};
use std::fmt;

/// Declared type of a node in the DAP2 hierarchy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Unsigned 8-bit byte.
    Byte,
    /// Legacy alias of `Int32`.
    Int,
    /// Legacy alias of `UInt32`.
    UInt,
    /// Signed 8-bit integer.
    Int8,
    /// Unsigned 8-bit integer.
    UInt8,
    /// Signed 16-bit integer.
    Int16,
    /// Unsigned 16-bit integer.
    UInt16,
    /// Signed 32-bit integer.
    Int32,
    /// Unsigned 32-bit integer.
    UInt32,
    /// IEEE 754 single precision float.
    Float32,
    /// IEEE 754 double precision float.
    Float64,
    /// Character string.
    String,
    /// URL string.
    Url,
    /// Reference to another node or attribute.
    Alias,
    /// Record of named fields.
    Structure,
    /// Rows of named fields, closed by a sentinel.
    Sequence,
    /// Dataset root.
    Dataset,
    /// Data array with coordinate maps.
    Grid,
    /// A type token the grammar does not know.
    Unknown(String),
}

impl NodeKind {
    /// Map a DDS/DAS type token to a kind, ignoring case.
    pub fn from_token(token: &str) -> Self {
        match token.to_ascii_lowercase().as_str() {
            "byte" => Self::Byte,
            "int" => Self::Int,
            "uint" => Self::UInt,
            "int8" => Self::Int8,
            "uint8" => Self::UInt8,
            "int16" => Self::Int16,
            "uint16" => Self::UInt16,
            "int32" => Self::Int32,
            "uint32" => Self::UInt32,
            "float32" => Self::Float32,
            "float64" => Self::Float64,
            "string" => Self::String,
            "url" => Self::Url,
            "alias" => Self::Alias,
            "structure" => Self::Structure,
            "sequence" => Self::Sequence,
            "dataset" => Self::Dataset,
            "grid" => Self::Grid,
            _ => Self::Unknown(token.to_string()),
        }
    }

    /// Canonical spelling of the kind as it appears in a DDS.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Byte => "Byte",
            Self::Int => "Int",
            Self::UInt => "UInt",
            Self::Int8 => "Int8",
            Self::UInt8 => "UInt8",
            Self::Int16 => "Int16",
            Self::UInt16 => "UInt16",
            Self::Int32 => "Int32",
            Self::UInt32 => "UInt32",
            Self::Float32 => "Float32",
            Self::Float64 => "Float64",
            Self::String => "String",
            Self::Url => "Url",
            Self::Alias => "Alias",
            Self::Structure => "Structure",
            Self::Sequence => "Sequence",
            Self::Dataset => "Dataset",
            Self::Grid => "Grid",
            Self::Unknown(token) => token,
        }
    }

    /// Check if this kind holds named child fields.
    pub fn is_container(&self) -> bool {
        matches!(self, Self::Structure | Self::Sequence | Self::Dataset)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A declared variable or container in a DAP2 schema tree.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    /// Declared type.
    pub kind: NodeKind,
    /// Local name.
    pub name: String,
    /// Dotted path from the dataset root.
    pub id: String,
    /// Named dimensions, empty when anonymous.
    pub dimensions: Vec<String>,
    /// Dimension sizes, row-major. Empty for scalars.
    pub shape: Vec<usize>,
    /// DAS attributes.
    pub attributes: Attributes,
    /// Fields of a `Structure`, `Sequence` or `Dataset`, in declaration order.
    pub children: Vec<SchemaNode>,
    /// Data array of a `Grid`.
    pub array: Option<Box<SchemaNode>>,
    /// Coordinate maps of a `Grid`, in declaration order.
    pub maps: Vec<SchemaNode>,
}

impl SchemaNode {
    /// Create a new schema node.
    pub fn new(kind: NodeKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            id: String::new(),
            dimensions: Vec::new(),
            shape: Vec::new(),
            attributes: Attributes::new(),
            children: Vec::new(),
            array: None,
            maps: Vec::new(),
        }
    }

    /// Create an empty dataset root, used when no DDS is available.
    pub fn empty_dataset() -> Self {
        Self::new(NodeKind::Dataset, "")
    }

    /// Check if this node is a scalar.
    pub fn is_scalar(&self) -> bool {
        self.shape.is_empty()
    }

    /// Get a child field by name.
    pub fn child(&self, name: &str) -> Option<&SchemaNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Get a mutable child field by name.
    pub fn child_mut(&mut self, name: &str) -> Option<&mut SchemaNode> {
        self.children.iter_mut().find(|c| c.name == name)
    }

    /// Get a grid map by name.
    pub fn map(&self, name: &str) -> Option<&SchemaNode> {
        self.maps.iter().find(|m| m.name == name)
    }

    /// Add a child field. A field with the same name is replaced in place.
    pub fn insert_child(&mut self, child: SchemaNode) {
        upsert(&mut self.children, child);
    }

    /// Add a grid map. A map with the same name is replaced in place.
    pub fn insert_map(&mut self, map: SchemaNode) {
        upsert(&mut self.maps, map);
    }

    /// Resolve one path step: child field, then grid array, then grid map.
    pub fn member(&self, name: &str) -> Option<&SchemaNode> {
        self.child(name)
            .or_else(|| self.array.as_deref().filter(|a| a.name == name))
            .or_else(|| self.map(name))
    }

    /// Mutable counterpart of [`SchemaNode::member`].
    pub fn member_mut(&mut self, name: &str) -> Option<&mut SchemaNode> {
        if let Some(i) = self.children.iter().position(|c| c.name == name) {
            return Some(&mut self.children[i]);
        }
        if self.array.as_ref().is_some_and(|a| a.name == name) {
            return self.array.as_deref_mut();
        }
        self.maps.iter_mut().find(|m| m.name == name)
    }

    /// Walk a sequence of member names down from this node.
    pub fn descend<S: AsRef<str>>(&self, path: &[S]) -> Option<&SchemaNode> {
        path.iter()
            .try_fold(self, |node, step| node.member(step.as_ref()))
    }

    /// Mutable counterpart of [`SchemaNode::descend`].
    pub fn descend_mut<S: AsRef<str>>(&mut self, path: &[S]) -> Option<&mut SchemaNode> {
        let mut node = self;
        for step in path {
            node = node.member_mut(step.as_ref())?;
        }
        Some(node)
    }

    /// Find a node anywhere below this one by its dotted id.
    pub fn find_by_id(&self, id: &str) -> Option<&SchemaNode> {
        self.members().find_map(|m| {
            if m.id == id {
                Some(m)
            } else {
                m.find_by_id(id)
            }
        })
    }

    /// Iterate children, then the grid array, then grid maps.
    pub fn members(&self) -> impl Iterator<Item = &SchemaNode> {
        self.children
            .iter()
            .chain(self.array.as_deref())
            .chain(self.maps.iter())
    }

    /// Assign dotted ids to every node below this dataset root.
    ///
    /// The root's own id is its name; it never prefixes its children.
    pub fn assign_ids(&mut self) {
        self.id = self.name.clone();
        for child in self.members_mut() {
            child.assign_ids_under(None);
        }
    }

    fn assign_ids_under(&mut self, parent_id: Option<&str>) {
        self.id = match parent_id {
            Some(parent) => format!("{}.{}", parent, self.name),
            None => self.name.clone(),
        };
        let id = self.id.clone();
        for child in self.members_mut() {
            child.assign_ids_under(Some(&id));
        }
    }

    fn members_mut(&mut self) -> impl Iterator<Item = &mut SchemaNode> {
        self.children
            .iter_mut()
            .chain(self.array.as_deref_mut())
            .chain(self.maps.iter_mut())
    }

    /// Number of declared variables below this node, grid parts included.
    pub fn variable_count(&self) -> usize {
        self.members().map(|m| 1 + m.variable_count()).sum()
    }

    /// Depth of the deepest nesting below this node; a leaf has depth 0.
    pub fn depth(&self) -> usize {
        self.members().map(|m| 1 + m.depth()).max().unwrap_or(0)
    }

    /// Attribute lookup.
    pub fn attribute(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    /// Get display name with kind and dimension info.
    pub fn display_name(&self) -> String {
        let mut text = format!("{} {}", self.kind, self.name);
        for (i, size) in self.shape.iter().enumerate() {
            match self.dimensions.get(i) {
                Some(dim) => text.push_str(&format!("[{} = {}]", dim, size)),
                None => text.push_str(&format!("[{}]", size)),
            }
        }
        if self.kind.is_container() || self.kind == NodeKind::Grid {
            text.push_str(&format!(" ({})", self.members().count()));
        }
        text
    }

    /// Re-serialize this tree as DDS text.
    pub fn to_dds(&self) -> String {
        let mut out = String::new();
        if self.kind == NodeKind::Dataset {
            out.push_str("Dataset {\n");
            for child in &self.children {
                child.write_declaration(&mut out, 1);
            }
            out.push_str(&format!("}} {};\n", self.name));
        } else {
            self.write_declaration(&mut out, 0);
        }
        out
    }

    fn write_declaration(&self, out: &mut String, level: usize) {
        let indent = "    ".repeat(level);
        match self.kind {
            NodeKind::Grid => {
                out.push_str(&format!("{}Grid {{\n{}  Array:\n", indent, indent));
                if let Some(array) = &self.array {
                    array.write_declaration(out, level + 1);
                }
                out.push_str(&format!("{}  Maps:\n", indent));
                for map in &self.maps {
                    map.write_declaration(out, level + 1);
                }
                out.push_str(&format!("{}}} {};\n", indent, self.name));
            },
            NodeKind::Structure | NodeKind::Sequence | NodeKind::Dataset => {
                out.push_str(&format!("{}{} {{\n", indent, self.kind));
                for child in &self.children {
                    child.write_declaration(out, level + 1);
                }
                out.push_str(&format!("{}}} {};\n", indent, self.name));
            },
            _ => {
                out.push_str(&format!("{}{}", indent, self.display_name()));
                out.push_str(";\n");
            },
        }
    }
}

fn upsert(nodes: &mut Vec<SchemaNode>, node: SchemaNode) {
    match nodes.iter_mut().find(|n| n.name == node.name) {
        Some(slot) => *slot = node,
        None => nodes.push(node),
    }
}
