use serde::Deserialize;

/// Recognized `optimize` options. Deserializable so an embedder's own HTTP
/// layer can decode it directly, without this crate depending on any HTTP
/// framework.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct PickingConfig {
    pub start_id: String,
    pub dest_id: String,
    pub num_routes: usize,
    pub debug: Option<bool>,
    pub is_testing: bool,
}

impl Default for PickingConfig {
    fn default() -> Self {
        Self {
            start_id: "start".to_string(),
            dest_id: "dest1".to_string(),
            num_routes: 1,
            debug: None,
            is_testing: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let config = PickingConfig::default();
        assert_eq!(config.start_id, "start");
        assert_eq!(config.dest_id, "dest1");
        assert_eq!(config.num_routes, 1);
        assert_eq!(config.debug, None);
        assert!(!config.is_testing);
    }

    #[test]
    fn partial_json_fills_remaining_fields_from_default() {
        let config: PickingConfig = serde_json::from_str(r#"{"num_routes": 3}"#).unwrap();
        assert_eq!(config.num_routes, 3);
        assert_eq!(config.start_id, "start");
    }
}
