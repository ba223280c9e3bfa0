use serde::{Deserialize, Serialize};

string_id!(BoardId);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub id: BoardId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub post_count: u64,
}

#[derive(Serialize, Debug)]
pub struct CreateBoard<'a> {
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'a str>,
}
