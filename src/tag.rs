use serde::{Deserialize, Serialize};

string_id!(TagId);

const DEFAULT_COLOR: &str = "#6366f1";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_color_uses_default() {
        let tag: Tag = serde_json::from_value(json!({"id": "t1", "name": "bug"})).unwrap();
        assert_eq!(tag.color, "#6366f1");
    }
}
