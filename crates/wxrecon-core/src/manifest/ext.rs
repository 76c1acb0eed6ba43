//! Extension (third-party platform) side file.

use serde_json::{json, Value};

/// Builds the `ext.json` body when both the extension app id and the
/// extension object were present.
pub fn ext_config(ext_appid: Option<Value>, ext: Option<Value>) -> Option<Value> {
    match (ext_appid, ext) {
        (Some(ext_appid), Some(ext)) => Some(json!({
            "extEnable": true,
            "extAppid": ext_appid,
            "ext": ext,
        })),
        _ => None,
    }
}
