use super::{ManifestDocument, ManifestError, ManifestSerializer};

/// Manifests as pretty-printed JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl ManifestSerializer for JsonSerializer {
    fn extension(&self) -> &'static str {
        "json"
    }

    fn encode(&self, doc: &ManifestDocument) -> Result<String, ManifestError> {
        let mut text = serde_json::to_string_pretty(doc)?;
        text.push('\n');
        Ok(text)
    }

    fn decode(&self, text: &str) -> Result<ManifestDocument, ManifestError> {
        Ok(serde_json::from_str(text)?)
    }
}
