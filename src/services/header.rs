use crate::models::{ProcessorProfile, RECIPIENT_COMPANY, RECIPIENT_COMPANY_FIELDS};
use crate::types::{EntityNode, HeaderField};

fn to_header_field(node: &EntityNode) -> HeaderField {
    HeaderField {
        field_type: node.entity_type.clone(),
        value: node.display_value().to_string(),
        confidence: node.confidence,
        page: node.page,
    }
}

/// Header fields: top-level matches of the profile's header set in document order,
/// then `name`/`address` of the first `recipient_company` entity.
pub fn resolve_header(entities: &[EntityNode], profile: &ProcessorProfile) -> Vec<HeaderField> {
    let mut fields: Vec<HeaderField> = entities
        .iter()
        .filter(|e| profile.is_header_field(&e.entity_type))
        .map(to_header_field)
        .collect();

    let mut companies = entities.iter().filter(|e| e.entity_type == RECIPIENT_COMPANY);
    if let Some(company) = companies.next() {
        fields.extend(
            company
                .properties
                .iter()
                .filter(|p| RECIPIENT_COMPANY_FIELDS.contains(&p.entity_type.as_str()))
                .map(to_header_field),
        );
    }
    let ignored = companies.count();
    if ignored > 0 {
        tracing::warn!("{} additional recipient_company entities ignored", ignored);
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProcessorKind;

    fn node(t: &str, value: &str, props: Vec<EntityNode>) -> EntityNode {
        EntityNode {
            entity_type: t.to_string(),
            value: value.to_string(),
            confidence: 0.9,
            normalized_value: String::new(),
            page: 1,
            properties: props,
        }
    }

    fn pairs(fields: &[HeaderField]) -> Vec<(&str, &str)> {
        fields.iter().map(|f| (f.field_type.as_str(), f.value.as_str())).collect()
    }

    #[test]
    fn promoted_company_fields_follow_direct_matches() {
        let profile = ProcessorProfile::new(ProcessorKind::Standard, "p");
        let entities = vec![
            node("recipient_company", "", vec![
                node("name", "ACME", vec![]),
                node("phone", "03-0000", vec![]),
                node("address", "Tokyo", vec![]),
            ]),
            node("order_date", "2024-01-15", vec![]),
            node("item", "", vec![]),
            node("order_number", "PO-1", vec![]),
        ];
        assert_eq!(
            pairs(&resolve_header(&entities, &profile)),
            vec![
                ("order_date", "2024-01-15"),
                ("order_number", "PO-1"),
                ("name", "ACME"),
                ("address", "Tokyo"),
            ]
        );
    }

    #[test]
    fn display_value_falls_back_to_normalized_then_dash() {
        let profile = ProcessorProfile::new(ProcessorKind::Standard, "p");
        let mut dated = node("order_date", "", vec![]);
        dated.normalized_value = "2024-01-15".to_string();
        let entities = vec![dated, node("delivery_date", "", vec![])];
        assert_eq!(
            pairs(&resolve_header(&entities, &profile)),
            vec![("order_date", "2024-01-15"), ("delivery_date", "-")]
        );
    }

    #[test]
    fn only_first_recipient_company_is_promoted() {
        let profile = ProcessorProfile::new(ProcessorKind::Standard, "p");
        let entities = vec![
            node("recipient_company", "", vec![node("name", "First", vec![])]),
            node("recipient_company", "", vec![node("name", "Second", vec![])]),
        ];
        assert_eq!(pairs(&resolve_header(&entities, &profile)), vec![("name", "First")]);
    }

    #[test]
    fn header_set_depends_on_processor_kind() {
        let entities = vec![node("remarks", "至急", vec![])];
        let standard = ProcessorProfile::new(ProcessorKind::Standard, "p");
        let detailed = ProcessorProfile::new(ProcessorKind::Detailed, "p");
        assert!(resolve_header(&entities, &standard).is_empty());
        assert_eq!(resolve_header(&entities, &detailed).len(), 1);
    }
}
