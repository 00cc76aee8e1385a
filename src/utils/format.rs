// file: src/utils/format.rs
// description: human readable sizes, dataset names and retrieval curl snippets
// reference: display helpers

use std::collections::HashMap;
use url::Url;

pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }

    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    let mut exponent = 0;
    let mut value = bytes as f64;
    while value >= 1024.0 && exponent < UNITS.len() - 1 {
        value /= 1024.0;
        exponent += 1;
    }

    let rounded = (value * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[exponent])
}

/// Joins dataset names for the given ids, falling back to the raw id.
pub fn dataset_names(knowledge_ids: &[String], names: &HashMap<String, String>) -> String {
    knowledge_ids
        .iter()
        .map(|id| names.get(id).map(String::as_str).unwrap_or(id))
        .collect::<Vec<_>>()
        .join(", ")
}

/// cURL command that runs a sample retrieval against a connection.
pub fn retrieve_curl(api_base_url: &str, connection_id: i64) -> String {
    let origin = Url::parse(api_base_url)
        .map(|u| u.origin().ascii_serialization())
        .unwrap_or_else(|_| api_base_url.trim_end_matches('/').to_string());

    format!(
        "curl -X 'POST' \\\n  '{origin}/api/dify/retrieveChunks' \\\n  -H 'accept: application/json' \\\n  -H 'Content-Type: application/json' \\\n  -d '{{\n  \"query\": \"hi\",\n  \"top_k\": 3,\n  \"connection_id\": {connection_id}\n}}'"
    )
}
