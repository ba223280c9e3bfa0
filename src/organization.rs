use serde::{Deserialize, Serialize};

string_id!(OrgId);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Organization {
    pub id: OrgId,
    pub name: String,
    pub slug: String,
    pub logo_url: Option<String>,
    /// The caller's role in this organization, e.g. `admin` or `member`.
    pub role: String,
}

impl Organization {
    pub fn is_admin(&self) -> bool {
        self.role == "admin" || self.role == "owner"
    }
}
