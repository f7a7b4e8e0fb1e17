#[derive(Debug, Clone)]
pub struct TelemetryLabels {
    pub platform: String,
    pub extra: Vec<(String, String)>,
}

impl TelemetryLabels {
    pub fn new(platform: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            extra: Vec::new(),
        }
    }

    /// Metric labels. Routing tokens and message ids are high-cardinality and belong on spans
    /// (see [`with_common_fields`](crate::with_common_fields)), never here.
    pub fn tags(&self) -> Vec<(String, String)> {
        let mut tags = Vec::with_capacity(1 + self.extra.len());
        tags.push(("platform".into(), self.platform.clone()));
        for (key, value) in &self.extra {
            tags.push((key.clone(), value.clone()));
        }
        tags
    }
}
