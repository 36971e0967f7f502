use std::sync::OnceLock;

use super::embedded;
use super::schema::MeetingType;

/// Parse an embedded meeting type by ID.
pub fn load_meeting_type(id: &str) -> Result<MeetingType, String> {
    if let Some(json) = embedded::get_embedded(id) {
        let meeting_type: MeetingType = serde_json::from_str(json)
            .map_err(|e| format!("Failed to parse embedded meeting type '{}': {}", id, e))?;
        validate_meeting_type(&meeting_type)?;
        return Ok(meeting_type);
    }
    Err(format!("Unknown meeting type: {}", id))
}

/// Load a custom meeting type from a file path.
pub fn load_custom_meeting_type(path: &std::path::Path) -> Result<MeetingType, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read meeting type file: {}", e))?;
    let meeting_type: MeetingType = serde_json::from_str(&content)
        .map_err(|e| format!("Failed to parse meeting type: {}", e))?;
    validate_meeting_type(&meeting_type)?;
    Ok(meeting_type)
}

/// Validate a meeting type has required fields and a usable duration.
pub fn validate_meeting_type(meeting_type: &MeetingType) -> Result<(), String> {
    if meeting_type.id.trim().is_empty() {
        return Err("Meeting type id is required".into());
    }
    if meeting_type.name.trim().is_empty() {
        return Err("Meeting type name is required".into());
    }
    if meeting_type.duration_minutes == 0 {
        return Err(format!(
            "Meeting type '{}' must have a positive duration",
            meeting_type.id
        ));
    }
    Ok(())
}

fn catalog() -> &'static [MeetingType] {
    static CATALOG: OnceLock<Vec<MeetingType>> = OnceLock::new();
    CATALOG.get_or_init(|| {
        embedded::all_embedded()
            .iter()
            .filter_map(|(id, _)| match load_meeting_type(id) {
                Ok(meeting_type) => Some(meeting_type),
                Err(e) => {
                    log::warn!("Skipping embedded meeting type: {}", e);
                    None
                }
            })
            .collect()
    })
}

/// All built-in meeting types in display order. Fixed for the process lifetime.
pub fn list_meeting_types() -> &'static [MeetingType] {
    catalog()
}

/// Look up a built-in meeting type by ID.
pub fn get_meeting_type(id: &str) -> Option<&'static MeetingType> {
    catalog().iter().find(|t| t.id == id)
}
