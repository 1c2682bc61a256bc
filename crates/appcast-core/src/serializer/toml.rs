use super::{ManifestDocument, ManifestError, ManifestSerializer};

/// Manifests as TOML, one `[[items]]` table per release.
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlSerializer;

impl ManifestSerializer for TomlSerializer {
    fn extension(&self) -> &'static str {
        "toml"
    }

    fn encode(&self, doc: &ManifestDocument) -> Result<String, ManifestError> {
        Ok(toml::to_string_pretty(doc)?)
    }

    fn decode(&self, text: &str) -> Result<ManifestDocument, ManifestError> {
        Ok(toml::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use appcast_schema::ManifestItem;
    use chrono::{TimeZone, Utc};

    #[test]
    fn keeps_every_item_field() {
        let item = ManifestItem {
            title: "App 1.4".to_string(),
            version: "1.4".to_string(),
            short_version: Some("1.4".to_string()),
            download_link: "https://example.com/1.4/App%201.4.exe".to_string(),
            operating_system: Some("macos".to_string()),
            update_size: 42,
            mime_type: "application/octet-stream".to_string(),
            download_signature: None,
            publication_date: Utc.with_ymd_and_hms(2023, 1, 2, 3, 4, 5).unwrap(),
            description: "Fixed a crash\nImproved startup".to_string(),
            release_notes_link: None,
            release_notes_signature: None,
            channel: None,
            is_critical: false,
        };
        let doc = ManifestDocument {
            title: None,
            items: vec![item.clone()],
        };

        let text = TomlSerializer.encode(&doc).unwrap();
        assert!(text.contains("[[items]]"));
        assert!(!text.contains("signature"));
        let back = TomlSerializer.decode(&text).unwrap();
        assert!(back.title.is_none());
        assert_eq!(back.items, [item]);
    }
}
