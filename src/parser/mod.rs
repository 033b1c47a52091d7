//! DDS and DAS text parsing.
//!
//! Both grammars share one tokenizer ([`Cursor`]) and are parsed by
//! recursive descent, one function per grammar rule.

pub mod cursor;
mod das;
mod dds;
mod literal;

pub use cursor::{Cursor, Pattern};
pub use das::{parse_das, DasParser};
pub use dds::{parse_dds, DdsParser};
pub use literal::parse_literal;

static OPEN_BRACE: Pattern = Pattern::new("'{'", r"\{");
static CLOSE_BRACE: Pattern = Pattern::new("'}'", r"\}");
static SEMICOLON: Pattern = Pattern::new("';'", ";");
static COMMA: Pattern = Pattern::new("','", ",");
static TYPE_NAME: Pattern = Pattern::new("type name", r"\w+");
