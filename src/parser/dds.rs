//! DDS (dataset structure) parser.
//!
//! ```text
//! dataset     := "dataset" "{" declaration* "}" id ";"
//! declaration := grid | structure | sequence | base_decl
//! grid        := "grid" "{" "array" ":" base_decl "maps" ":" base_decl* "}" name ";"
//! structure   := ("structure"|"sequence") "{" declaration* "}" name ";"
//! base_decl   := type name ("[" (dim "=")? size "]")* ";"
//! ```

use super::cursor::{Cursor, Pattern};
use super::{CLOSE_BRACE, OPEN_BRACE, SEMICOLON, TYPE_NAME};
use crate::error::ParseError;
use crate::schema::{NodeKind, SchemaNode};
use tracing::{debug, trace};

static DATASET: Pattern = Pattern::new("'dataset'", "dataset");
static GRID: Pattern = Pattern::new("'grid'", "grid");
static STRUCTURE: Pattern = Pattern::new("'structure'", "structure");
static SEQUENCE: Pattern = Pattern::new("'sequence'", "sequence");
static ARRAY: Pattern = Pattern::new("'array'", "array");
static MAPS: Pattern = Pattern::new("'maps'", "maps");
static COLON: Pattern = Pattern::new("':'", ":");
static OPEN_BRACKET: Pattern = Pattern::new("'['", r"\[");
static CLOSE_BRACKET: Pattern = Pattern::new("']'", r"\]");
static EQUALS: Pattern = Pattern::new("'='", "=");

// Names run up to an unescaped terminator.
static DATASET_ID: Pattern = Pattern::new("dataset id", r"(?:\\;|[^;])+");
static DECLARED_NAME: Pattern = Pattern::new("name", r"(?:\\;|[^;])+");
static VARIABLE_NAME: Pattern = Pattern::new("variable name", r"(?:\\;|\\\[|[^\[;])+");
static DIMENSION: Pattern = Pattern::new("dimension name or size", r"(?:\\=|\\\]|[^\]=])+");
static DIMENSION_SIZE: Pattern = Pattern::new("dimension size", r"\d+");

/// Parse DDS text into a schema tree.
pub fn parse_dds(text: &str) -> Result<SchemaNode, ParseError> {
    DdsParser::new(text).parse()
}

/// Recursive-descent parser for the DDS grammar.
#[derive(Debug)]
pub struct DdsParser<'a> {
    cursor: Cursor<'a>,
}

impl<'a> DdsParser<'a> {
    /// Create a parser over DDS text.
    pub fn new(text: &'a str) -> Self {
        Self {
            cursor: Cursor::new(text),
        }
    }

    /// Parse the whole dataset and assign ids.
    pub fn parse(mut self) -> Result<SchemaNode, ParseError> {
        let mut dataset = self.dataset()?;
        dataset.assign_ids();
        debug!(
            "Parsed DDS for {:?}: {} variables, depth {}",
            dataset.name,
            dataset.variable_count(),
            dataset.depth()
        );
        Ok(dataset)
    }

    fn dataset(&mut self) -> Result<SchemaNode, ParseError> {
        self.cursor.consume(&DATASET)?;
        self.cursor.consume(&OPEN_BRACE)?;
        let mut dataset = SchemaNode::new(NodeKind::Dataset, "");
        while !self.cursor.at(&CLOSE_BRACE) {
            dataset.insert_child(self.declaration()?);
        }
        self.cursor.consume(&CLOSE_BRACE)?;
        dataset.name = self.cursor.consume(&DATASET_ID)?.trim().to_string();
        self.cursor.consume(&SEMICOLON)?;
        Ok(dataset)
    }

    fn declaration(&mut self) -> Result<SchemaNode, ParseError> {
        let token = self
            .cursor
            .peek(&TYPE_NAME)
            .ok_or_else(|| self.cursor.error(TYPE_NAME.name()))?;
        match NodeKind::from_token(token) {
            NodeKind::Grid => self.grid(),
            NodeKind::Structure => self.structure(NodeKind::Structure, &STRUCTURE),
            NodeKind::Sequence => self.structure(NodeKind::Sequence, &SEQUENCE),
            _ => self.base_declaration(),
        }
    }

    fn base_declaration(&mut self) -> Result<SchemaNode, ParseError> {
        let kind = NodeKind::from_token(self.cursor.consume(&TYPE_NAME)?);
        let name = self.cursor.consume(&VARIABLE_NAME)?.trim();
        let mut node = SchemaNode::new(kind, name);
        while !self.cursor.at(&SEMICOLON) {
            self.cursor.consume(&OPEN_BRACKET)?;
            let mut token = self.cursor.consume(&DIMENSION)?.trim();
            if self.cursor.at(&EQUALS) {
                node.dimensions.push(token.to_string());
                self.cursor.consume(&EQUALS)?;
                token = self.cursor.consume(&DIMENSION_SIZE)?.trim();
            }
            let size = token
                .parse::<usize>()
                .map_err(|_| ParseError::invalid_number(token))?;
            node.shape.push(size);
            self.cursor.consume(&CLOSE_BRACKET)?;
        }
        self.cursor.consume(&SEMICOLON)?;
        trace!("Declared {}", node.display_name());
        Ok(node)
    }

    fn grid(&mut self) -> Result<SchemaNode, ParseError> {
        self.cursor.consume(&GRID)?;
        self.cursor.consume(&OPEN_BRACE)?;
        self.cursor.consume(&ARRAY)?;
        self.cursor.consume(&COLON)?;
        let mut grid = SchemaNode::new(NodeKind::Grid, "");
        grid.array = Some(Box::new(self.base_declaration()?));
        self.cursor.consume(&MAPS)?;
        self.cursor.consume(&COLON)?;
        while !self.cursor.at(&CLOSE_BRACE) {
            grid.insert_map(self.base_declaration()?);
        }
        self.cursor.consume(&CLOSE_BRACE)?;
        grid.name = self.name()?;
        Ok(grid)
    }

    fn structure(&mut self, kind: NodeKind, keyword: &Pattern) -> Result<SchemaNode, ParseError> {
        self.cursor.consume(keyword)?;
        self.cursor.consume(&OPEN_BRACE)?;
        let mut structure = SchemaNode::new(kind, "");
        while !self.cursor.at(&CLOSE_BRACE) {
            structure.insert_child(self.declaration()?);
        }
        self.cursor.consume(&CLOSE_BRACE)?;
        structure.name = self.name()?;
        Ok(structure)
    }

    fn name(&mut self) -> Result<String, ParseError> {
        let name = self.cursor.consume(&DECLARED_NAME)?.trim().to_string();
        self.cursor.consume(&SEMICOLON)?;
        Ok(name)
    }
}
