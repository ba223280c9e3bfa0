macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(serde::Serialize, serde::Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                $name(id.into())
            }

            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                $name(id.to_string())
            }
        }
    };
}

pub mod api;
pub mod app;
pub mod board;
pub mod client;
pub mod comment;
pub mod config;
pub mod observable;
pub mod organization;
pub mod post;
pub mod store;
pub mod tag;
pub mod user;

#[cfg(test)]
mod testing;

pub use crate::api::{Api, ApiRequest};
pub use crate::app::App;
pub use crate::client::{Client, Error, Result, Transport};
pub use crate::config::Config;
pub use crate::observable::{Publisher, Subscription};
pub use crate::store::{BoardStore, OrgStore, PostStore, SessionStore};
