use crate::models::{ProcessorProfile, ITEM_ENTITY};
use crate::types::{EntityNode, ItemCell, ItemRow, EMPTY_DISPLAY};

/// Resolve one column from an item's properties; the first property of that type wins.
fn resolve_cell(item: &EntityNode, key: &str) -> ItemCell {
    let matches = item.properties.iter().filter(|p| p.entity_type == key).count();
    if matches > 1 {
        tracing::warn!("item has {} '{}' properties; using the first", matches, key);
    }
    match item.property(key) {
        Some(prop) => ItemCell {
            key: key.to_string(),
            value: prop.display_value().to_string(),
            confidence: Some(prop.confidence),
            page: Some(prop.page),
        },
        None => ItemCell {
            key: key.to_string(),
            value: EMPTY_DISPLAY.to_string(),
            confidence: None,
            page: None,
        },
    }
}

/// One row per top-level `item` entity, in document order, cells in column order.
pub fn build_item_rows(entities: &[EntityNode], profile: &ProcessorProfile) -> Vec<ItemRow> {
    let rows: Vec<ItemRow> = entities
        .iter()
        .filter(|e| e.entity_type == ITEM_ENTITY)
        .map(|item| ItemRow {
            cells: profile
                .item_columns
                .iter()
                .map(|col| resolve_cell(item, col.key))
                .collect(),
        })
        .collect();
    tracing::debug!("built {} item rows", rows.len());
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProcessorKind, ITEM_COLUMNS};

    fn leaf(t: &str, value: &str, normalized: &str) -> EntityNode {
        EntityNode {
            entity_type: t.to_string(),
            value: value.to_string(),
            confidence: 0.8,
            normalized_value: normalized.to_string(),
            page: 2,
            properties: vec![],
        }
    }

    fn item(props: Vec<EntityNode>) -> EntityNode {
        EntityNode {
            entity_type: "item".to_string(),
            value: String::new(),
            confidence: 0.0,
            normalized_value: String::new(),
            page: 1,
            properties: props,
        }
    }

    #[test]
    fn rows_follow_item_order_and_column_order() {
        let profile = ProcessorProfile::new(ProcessorKind::Standard, "p");
        let entities = vec![
            item(vec![leaf("quantity", "12", ""), leaf("product_code", "2160", "")]),
            leaf("order_date", "2024-01-15", ""),
            item(vec![leaf("product_code", "3100", "")]),
        ];
        let rows = build_item_rows(&entities, &profile);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].value("product_code"), "2160");
        assert_eq!(rows[0].value("quantity"), "12");
        assert_eq!(rows[1].value("product_code"), "3100");
        let keys: Vec<&str> = rows[0].cells.iter().map(|c| c.key.as_str()).collect();
        let expected: Vec<&str> = ITEM_COLUMNS.iter().map(|c| c.key).collect();
        assert_eq!(keys, expected);
    }

    #[test]
    fn missing_column_is_dash_without_metadata() {
        let profile = ProcessorProfile::new(ProcessorKind::Standard, "p");
        let rows = build_item_rows(&[item(vec![])], &profile);
        let cell = rows[0].cell("unit_price").unwrap();
        assert_eq!(cell.value, "-");
        assert_eq!(cell.confidence, None);
        assert_eq!(cell.page, None);
    }

    #[test]
    fn normalized_value_used_when_value_empty() {
        let profile = ProcessorProfile::new(ProcessorKind::Standard, "p");
        let rows = build_item_rows(&[item(vec![leaf("delivery_date", "", "2024-02-01")])], &profile);
        let cell = rows[0].cell("delivery_date").unwrap();
        assert_eq!(cell.value, "2024-02-01");
        assert_eq!(cell.page, Some(2));
        assert_eq!(cell.confidence, Some(0.8));
    }

    #[test]
    fn duplicate_properties_take_first() {
        let profile = ProcessorProfile::new(ProcessorKind::Standard, "p");
        let rows = build_item_rows(
            &[item(vec![leaf("amount", "1000", ""), leaf("amount", "2000", "")])],
            &profile,
        );
        assert_eq!(rows[0].value("amount"), "1000");
    }

    #[test]
    fn nested_items_are_not_rows() {
        let profile = ProcessorProfile::new(ProcessorKind::Standard, "p");
        let wrapper = EntityNode {
            properties: vec![item(vec![])],
            ..leaf("table", "", "")
        };
        assert!(build_item_rows(&[wrapper], &profile).is_empty());
    }
}
