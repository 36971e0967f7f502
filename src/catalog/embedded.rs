const DISCOVERY_CALL: &str = include_str!("../../meeting_types/discovery-call.json");
const PRODUCT_DEMO: &str = include_str!("../../meeting_types/product-demo.json");
const TECHNICAL_DEEP_DIVE: &str = include_str!("../../meeting_types/technical-deep-dive.json");
const PROPOSAL_REVIEW: &str = include_str!("../../meeting_types/proposal-review.json");
const NEGOTIATION: &str = include_str!("../../meeting_types/negotiation.json");
const CHECK_IN: &str = include_str!("../../meeting_types/check-in.json");

/// All embedded meeting types in display order.
const ALL_TYPES: &[(&str, &str)] = &[
    ("discovery-call", DISCOVERY_CALL),
    ("product-demo", PRODUCT_DEMO),
    ("technical-deep-dive", TECHNICAL_DEEP_DIVE),
    ("proposal-review", PROPOSAL_REVIEW),
    ("negotiation", NEGOTIATION),
    ("check-in", CHECK_IN),
];

/// Look up an embedded meeting type by ID.
pub fn get_embedded(id: &str) -> Option<&'static str> {
    ALL_TYPES
        .iter()
        .find(|(type_id, _)| *type_id == id)
        .map(|(_, json)| *json)
}

/// All embedded (id, json) pairs in display order.
pub fn all_embedded() -> &'static [(&'static str, &'static str)] {
    ALL_TYPES
}
