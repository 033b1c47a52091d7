//! Text rendering of schema and value trees.

use crate::schema::SchemaNode;
use crate::xdr::{ArrayStats, Value};

/// Render a schema as an indented box-drawing tree.
pub fn format_schema_tree(root: &SchemaNode, with_attributes: bool) -> String {
    let mut text = format!("Dataset: {}\n", root.name);
    text.push_str(&"=".repeat(80));
    text.push('\n');
    if with_attributes {
        text.push_str(&format_attributes(root, ""));
    }
    let members: Vec<_> = root.members().collect();
    for (i, member) in members.iter().enumerate() {
        let is_last = i == members.len() - 1;
        text.push_str(&format_tree_recursive(member, "", is_last, with_attributes));
    }
    text
}

fn format_tree_recursive(node: &SchemaNode, prefix: &str, is_last: bool, with_attributes: bool) -> String {
    let mut result = String::new();

    let connector = if is_last { "└── " } else { "├── " };
    result.push_str(&format!("{}{}{}\n", prefix, connector, node.display_name()));

    let new_prefix = format!("{}{}   ", prefix, if is_last { " " } else { "│" });

    if with_attributes {
        result.push_str(&format_attributes(node, &new_prefix));
    }

    let members: Vec<_> = node.members().collect();
    for (i, child) in members.iter().enumerate() {
        let is_last_child = i == members.len() - 1;
        result.push_str(&format_tree_recursive(child, &new_prefix, is_last_child, with_attributes));
    }

    result
}

fn format_attributes(node: &SchemaNode, prefix: &str) -> String {
    let mut names: Vec<_> = node.attributes.keys().collect();
    names.sort();
    names
        .into_iter()
        .map(|name| format!("{}  @{} = {}\n", prefix, name, node.attributes[name]))
        .collect()
}

/// Render each top-level value of a decoded dataset on its own line.
pub fn format_values(values: &Value, with_stats: bool) -> String {
    match values {
        Value::Structure(fields) => fields
            .iter()
            .map(|(name, value)| format_named_value(name, value, with_stats))
            .collect(),
        other => format_named_value("value", other, with_stats),
    }
}

fn format_named_value(name: &str, value: &Value, with_stats: bool) -> String {
    let mut line = format!("{} = {}\n", name, value);
    if with_stats {
        if let Some(array) = value.to_ndarray() {
            let stats = ArrayStats::compute(&array);
            line.push_str(&format!("  shape: {:?}, valid: {}", array.shape(), stats.valid_count));
            if let (Some((min, max)), Some(mean)) = (stats.min_max, stats.mean) {
                line.push_str(&format!(", min: {}, max: {}, mean: {}", min, max, mean));
            }
            line.push('\n');
        }
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_das, parse_dds};
    use crate::xdr::Scalar;

    #[test]
    fn schema_tree_lists_every_member() {
        let schema = parse_dds(
            "Dataset { Structure { Int32 a; Byte b[4]; } s; Float64 t[time = 3]; } demo;",
        )
        .unwrap();
        let text = format_schema_tree(&schema, false);
        assert!(text.starts_with("Dataset: demo\n"));
        assert!(text.contains("├── Structure s (2)\n"));
        assert!(text.contains("│   ├── Int32 a\n"));
        assert!(text.contains("│   └── Byte b[4]\n"));
        assert!(text.contains("└── Float64 t[time = 3]\n"));
    }

    #[test]
    fn schema_tree_shows_attributes() {
        let schema = parse_das(
            "Attributes { t { String units \"s\"; } }",
            parse_dds("Dataset { Float64 t; } d;").unwrap(),
        )
        .unwrap();
        let text = format_schema_tree(&schema, true);
        assert!(text.contains("@units = \"s\""));
    }

    #[test]
    fn values_with_stats() {
        let values = Value::Structure(vec![(
            "x".to_string(),
            Value::reshape(vec![Scalar::Int32(1), Scalar::Int32(3)], &[2]),
        )]);
        let text = format_values(&values, true);
        assert_eq!(
            text,
            "x = [1, 3]\n  shape: [2], valid: 2, min: 1, max: 3, mean: 2\n"
        );
    }
}
