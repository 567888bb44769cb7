use std::collections::BTreeMap;

use serde_json::Value;

use crate::extract::normalize;

/// Picks the credentials of one service out of a flat credentials object.
///
/// Keys of the form `<tag>_<label>_<key>` are collected under `<key>`;
/// other keys are ignored. Watson's `apikey` is renamed to `iam_apikey`.
/// Input that is not a JSON object yields an empty map.
pub fn get_credentials_for_service(
    service_tag: &str,
    service_label: &str,
    credentials: &str,
) -> BTreeMap<String, String> {
    let Ok(Value::Object(flat)) = serde_json::from_str::<Value>(credentials) else {
        return BTreeMap::new();
    };

    let prefix = format!("{service_tag}_{service_label}_");
    flat.iter()
        .filter_map(|(key, value)| {
            let cred_key = key.strip_prefix(&prefix)?;
            let cred_key = if cred_key == "apikey" && service_tag == "watson" {
                "iam_apikey".to_string()
            } else {
                cred_key.to_string()
            };
            Some((cred_key, normalize(value)))
        })
        .collect()
}
