use crate::SchemaNode;

/// Trait for schema introspection
///
/// Paths use the same segments as column paths: list items and embedded
/// structs add no segment of their own.
pub trait SchemaInspector {
    /// Get the total number of named fields below the root
    fn field_count(&self) -> usize;

    /// Get field by path (e.g., "names.languages.code")
    fn get_field_by_path(&self, path: &str) -> Option<&SchemaNode>;

    /// Check if schema contains a specific field
    fn has_field(&self, name: &str) -> bool;

    /// Get all field paths in the schema, parents before children
    fn all_field_paths(&self) -> Vec<String>;
}

impl SchemaInspector for crate::Schema {
    fn field_count(&self) -> usize {
        fields_of(&self.root).map(count_fields).sum()
    }

    fn get_field_by_path(&self, path: &str) -> Option<&SchemaNode> {
        let parts: Vec<&str> = path.split('.').collect();
        get_field_by_path_parts(&self.root, &parts)
    }

    fn has_field(&self, name: &str) -> bool {
        self.get_field_by_path(name).is_some()
    }

    fn all_field_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        for field in fields_of(&self.root) {
            collect_field_paths(field, "", &mut paths);
        }
        paths
    }
}

/// Named fields directly below `node`, looking through list items and
/// embedded structs
fn fields_of<'a>(node: &'a SchemaNode) -> Box<dyn Iterator<Item = &'a SchemaNode> + 'a> {
    match node {
        SchemaNode::Struct { fields, .. } | SchemaNode::Embedded { fields, .. } => Box::new(
            fields
                .iter()
                .flat_map(|f| -> Box<dyn Iterator<Item = &'a SchemaNode> + 'a> {
                    match f {
                        SchemaNode::Embedded { .. } => fields_of(f),
                        _ => Box::new(std::iter::once(f)),
                    }
                }),
        ),
        SchemaNode::List { item, .. } => fields_of(item),
        SchemaNode::Primitive { .. } => Box::new(std::iter::empty()),
    }
}

fn count_fields(node: &SchemaNode) -> usize {
    1 + fields_of(node).map(count_fields).sum::<usize>()
}

fn get_field_by_path_parts<'a>(node: &'a SchemaNode, parts: &[&str]) -> Option<&'a SchemaNode> {
    let Some((first, rest)) = parts.split_first() else {
        return Some(node);
    };
    fields_of(node)
        .find(|f| f.name() == *first)
        .and_then(|f| get_field_by_path_parts(f, rest))
}

fn collect_field_paths(node: &SchemaNode, prefix: &str, paths: &mut Vec<String>) {
    let current_path = if prefix.is_empty() {
        node.name().to_string()
    } else {
        format!("{}.{}", prefix, node.name())
    };
    paths.push(current_path.clone());
    for field in fields_of(node) {
        collect_field_paths(field, &current_path, paths);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::test::document_schema;
    use crate::{PrimitiveType, SchemaBuilder as CoreSchemaBuilder};

    #[test]
    fn test_schema_inspector() {
        let schema = CoreSchemaBuilder::new()
            .with_root(SchemaNode::Struct {
                name: "root".to_string(),
                nullable: false,
                fields: vec![
                    SchemaNode::Embedded {
                        name: "Base".to_string(),
                        fields: vec![SchemaNode::required("id", PrimitiveType::Int64)],
                    },
                    SchemaNode::Struct {
                        name: "address".to_string(),
                        nullable: true,
                        fields: vec![SchemaNode::optional("city", PrimitiveType::String)],
                    },
                ],
            })
            .build()
            .unwrap();

        // id, address, city
        assert_eq!(schema.field_count(), 3);

        assert!(schema.has_field("id"));
        assert!(schema.has_field("address"));
        assert!(schema.has_field("address.city"));
        assert!(!schema.has_field("Base"));
        assert!(!schema.has_field("missing"));

        let city = schema.get_field_by_path("address.city").unwrap();
        assert_eq!(city.name(), "city");
    }

    #[test]
    fn test_list_items_add_no_segment() {
        let schema = document_schema();
        assert_eq!(
            schema.all_field_paths(),
            vec![
                "docid",
                "links",
                "links.backward",
                "links.forward",
                "names",
                "names.languages",
                "names.languages.code",
                "names.languages.country",
                "names.url",
            ]
        );
        assert_eq!(schema.field_count(), 9);
        assert!(matches!(
            schema.get_field_by_path("names.languages"),
            Some(SchemaNode::List { .. })
        ));
    }
}
