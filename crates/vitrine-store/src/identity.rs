//! Principals, roles and edit authorization.
//!
//! Authentication itself belongs to an external identity provider. The
//! builder only needs to turn a bearer token into a [`Principal`] and to read
//! its role.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Client,
}

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub uid: String,
    pub role: Role,
    /// The site a client principal owns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Check that this principal may edit the site of `client_id`.
    ///
    /// Admins edit any site; clients only their own.
    pub fn authorize_edit(&self, client_id: &str) -> Result<(), AccessError> {
        match self.role {
            Role::Admin => Ok(()),
            Role::Client if self.client_id.as_deref() == Some(client_id) => Ok(()),
            Role::Client => Err(AccessError::Forbidden {
                uid: self.uid.clone(),
                client_id: client_id.to_string(),
            }),
        }
    }

    /// The site id to operate on: the requested one for admins, the owned
    /// one for clients.
    pub fn site_id<'a>(&'a self, requested: Option<&'a str>) -> Result<&'a str, AccessError> {
        match (self.role, requested) {
            (Role::Admin, Some(id)) => Ok(id),
            (Role::Admin, None) => Err(AccessError::MissingSite),
            (Role::Client, requested) => {
                let own = self.client_id.as_deref().ok_or(AccessError::MissingSite)?;
                if let Some(id) = requested {
                    self.authorize_edit(id)?;
                }
                Ok(own)
            }
        }
    }
}

/// Errors raised by authorization checks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccessError {
    #[error("User {uid} may not edit site {client_id}")]
    Forbidden { uid: String, client_id: String },

    #[error("No site selected")]
    MissingSite,
}

/// Resolves bearer tokens to principals.
pub trait IdentityProvider: Send + Sync {
    fn principal(&self, token: &str) -> Option<Principal>;
}

/// A configured user, as listed in `vitrine.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEntry {
    pub token: String,
    pub uid: String,
    pub role: Role,
    #[serde(default)]
    pub client_id: Option<String>,
}

/// Identity provider backed by a fixed token table.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    users: HashMap<String, Principal>,
}

impl StaticIdentity {
    pub fn new(entries: impl IntoIterator<Item = UserEntry>) -> Self {
        let users = entries
            .into_iter()
            .map(|entry| {
                let principal = Principal {
                    uid: entry.uid,
                    role: entry.role,
                    client_id: entry.client_id,
                };
                (entry.token, principal)
            })
            .collect();
        Self { users }
    }
}

impl IdentityProvider for StaticIdentity {
    fn principal(&self, token: &str) -> Option<Principal> {
        self.users.get(token).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(id: &str) -> Principal {
        Principal {
            uid: format!("u-{}", id),
            role: Role::Client,
            client_id: Some(id.to_string()),
        }
    }

    fn admin() -> Principal {
        Principal {
            uid: "root".to_string(),
            role: Role::Admin,
            client_id: None,
        }
    }

    #[test]
    fn admins_edit_any_site() {
        assert!(admin().authorize_edit("ana").is_ok());
        assert_eq!(admin().site_id(Some("ana")), Ok("ana"));
        assert_eq!(admin().site_id(None), Err(AccessError::MissingSite));
    }

    #[test]
    fn clients_edit_only_their_site() {
        let ana = client("ana");

        assert!(ana.authorize_edit("ana").is_ok());
        assert!(matches!(
            ana.authorize_edit("bob"),
            Err(AccessError::Forbidden { .. })
        ));
        assert_eq!(ana.site_id(None), Ok("ana"));
        assert!(ana.site_id(Some("bob")).is_err());
    }

    #[test]
    fn resolves_configured_tokens() {
        let identity = StaticIdentity::new(vec![UserEntry {
            token: "secret".to_string(),
            uid: "ana".to_string(),
            role: Role::Client,
            client_id: Some("ana".to_string()),
        }]);

        assert_eq!(identity.principal("secret"), Some(client_ana()));
        assert_eq!(identity.principal("nope"), None);
    }

    fn client_ana() -> Principal {
        Principal {
            uid: "ana".to_string(),
            role: Role::Client,
            client_id: Some("ana".to_string()),
        }
    }
}
