// file: src/models/dataset.rs
// description: knowledge-base dataset listing model
// reference: internal data structures

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub document_count: Option<u64>,
    #[serde(default)]
    pub word_count: Option<u64>,
}

impl Dataset {
    /// Dataset id to display name lookup.
    pub fn name_map(datasets: &[Dataset]) -> HashMap<String, String> {
        datasets
            .iter()
            .map(|d| (d.id.clone(), d.name.clone()))
            .collect()
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_numeric_and_text_ids() {
        let json = r#"[
            {"id": "3f2a", "name": "Manuals", "document_count": 4},
            {"id": 17, "name": "Policies"}
        ]"#;
        let datasets: Vec<Dataset> = serde_json::from_str(json).unwrap();
        assert_eq!(datasets[0].id, "3f2a");
        assert_eq!(datasets[0].document_count, Some(4));
        assert_eq!(datasets[1].id, "17");

        let names = Dataset::name_map(&datasets);
        assert_eq!(names.get("17").map(String::as_str), Some("Policies"));
    }
}
