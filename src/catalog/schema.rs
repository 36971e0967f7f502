use serde::{Deserialize, Serialize};

/// A meeting-type template: how long the follow-up runs, what it covers,
/// and what to prepare beforehand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingType {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub duration_minutes: u32,
    /// Ordered agenda lines seeded into the session's agenda text.
    #[serde(default)]
    pub default_agenda: Vec<String>,
    /// Ordered checklist seeded into the session, all unchecked.
    #[serde(default)]
    pub preparation_items: Vec<String>,
}

impl MeetingType {
    /// Default agenda as the editable text block (one line per item).
    pub fn agenda_text(&self) -> String {
        self.default_agenda.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_demo_deserializes() {
        let json = include_str!("../../meeting_types/product-demo.json");
        let meeting_type: MeetingType =
            serde_json::from_str(json).expect("product demo should parse");
        assert_eq!(meeting_type.id, "product-demo");
        assert_eq!(meeting_type.name, "Product Demo");
        assert_eq!(meeting_type.duration_minutes, 60);
        assert_eq!(meeting_type.default_agenda.len(), 5);
        assert_eq!(meeting_type.preparation_items.len(), 4);
    }

    #[test]
    fn test_agenda_text_joins_lines() {
        let meeting_type = MeetingType {
            id: "x".into(),
            name: "X".into(),
            description: String::new(),
            duration_minutes: 15,
            default_agenda: vec!["One".into(), "Two".into()],
            preparation_items: vec![],
        };
        assert_eq!(meeting_type.agenda_text(), "One\nTwo");
    }

    #[test]
    fn test_optional_lists_default_empty() {
        let meeting_type: MeetingType = serde_json::from_str(
            r#"{ "id": "quick", "name": "Quick Sync", "durationMinutes": 10 }"#,
        )
        .unwrap();
        assert!(meeting_type.default_agenda.is_empty());
        assert!(meeting_type.preparation_items.is_empty());
        assert_eq!(meeting_type.agenda_text(), "");
    }
}
