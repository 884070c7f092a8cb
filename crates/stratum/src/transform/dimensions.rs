//! Per-kind render dimensions.

use stratum_core::{geometry::Size, model::ElementKind};

/// Size used for element kinds without an entry.
pub const DEFAULT_NODE_SIZE: Size = Size::new(180.0, 100.0);

/// Width of list-style nodes (schemas, tables).
pub const LIST_NODE_WIDTH: f32 = 220.0;
/// Height of the title band of a list-style node.
pub const LIST_HEADER_HEIGHT: f32 = 40.0;
/// Height of one field or column row.
pub const LIST_ITEM_HEIGHT: f32 = 24.0;

/// Fixed size for `kind`, or `None` when the kind has no entry.
///
/// List-style kinds grow with their items:
/// `height = LIST_HEADER_HEIGHT + items * LIST_ITEM_HEIGHT`.
pub fn dimensions_for(kind: &ElementKind) -> Option<Size> {
    let (width, height) = match kind {
        ElementKind::Stakeholder | ElementKind::Driver | ElementKind::Assessment => (180.0, 80.0),
        ElementKind::Goal | ElementKind::Outcome => (200.0, 90.0),
        ElementKind::Principle | ElementKind::Requirement | ElementKind::Constraint => {
            (200.0, 90.0)
        }
        ElementKind::Actor | ElementKind::Role => (160.0, 80.0),
        ElementKind::Service | ElementKind::Function | ElementKind::Process => (200.0, 100.0),
        ElementKind::Event => (180.0, 80.0),
        ElementKind::BusinessObject | ElementKind::DataObject => (180.0, 90.0),
        ElementKind::Component => (220.0, 110.0),
        ElementKind::Interface => (160.0, 70.0),
        ElementKind::Node | ElementKind::Device => (220.0, 120.0),
        ElementKind::SystemSoftware => (200.0, 100.0),
        ElementKind::Artifact => (160.0, 80.0),
        ElementKind::Permission | ElementKind::Policy => (170.0, 80.0),
        ElementKind::Zone => (240.0, 140.0),
        ElementKind::Objective => (200.0, 90.0),
        ElementKind::Operation | ElementKind::Endpoint => (220.0, 80.0),
        ElementKind::Schema { fields: items } | ElementKind::Table { columns: items } => (
            LIST_NODE_WIDTH,
            LIST_HEADER_HEIGHT + items.len() as f32 * LIST_ITEM_HEIGHT,
        ),
        ElementKind::Database => (180.0, 110.0),
        ElementKind::View | ElementKind::Route => (200.0, 100.0),
        ElementKind::Flow => (180.0, 80.0),
        ElementKind::Metric => (160.0, 70.0),
        ElementKind::Other(_) => return None,
    };
    Some(Size::new(width, height))
}

#[cfg(test)]
mod tests {
    use float_cmp::assert_approx_eq;
    use stratum_core::model::Field;

    use super::*;

    #[test]
    fn test_fixed_kind() {
        let size = dimensions_for(&ElementKind::Goal).unwrap();
        assert_approx_eq!(f32, size.width(), 200.0);
        assert_approx_eq!(f32, size.height(), 90.0);
    }

    #[test]
    fn test_list_kind_grows_with_items() {
        let fields = (0..5).map(|i| Field::new(format!("f{i}"), None)).collect();
        let size = dimensions_for(&ElementKind::Schema { fields }).unwrap();
        assert_approx_eq!(f32, size.width(), LIST_NODE_WIDTH);
        assert_approx_eq!(f32, size.height(), LIST_HEADER_HEIGHT + 5.0 * LIST_ITEM_HEIGHT);
    }

    #[test]
    fn test_empty_table_is_header_only() {
        let size = dimensions_for(&ElementKind::Table { columns: vec![] }).unwrap();
        assert_approx_eq!(f32, size.height(), LIST_HEADER_HEIGHT);
    }

    #[test]
    fn test_unknown_kind_has_no_entry() {
        assert!(dimensions_for(&ElementKind::Other("widget".to_string())).is_none());
    }
}
