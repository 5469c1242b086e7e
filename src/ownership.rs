//! Who may see and who may edit a Wh object.
//!
//! Everything here works on the `{owner, shared}` envelope only, never on the
//! payload of a particular kind.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::claims::{Claims, Identity};
use crate::error::{ServiceError, ServiceResult};
use crate::id::UserId;

const CANONICAL: &str = "admin";

/// Owner of a Wh object. `Canonical` content belongs to nobody in particular
/// and is visible to everyone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Owner {
    User(UserId),
    Canonical,
}

impl Owner {
    pub fn as_str(&self) -> &str {
        match self {
            Owner::User(id) => id.as_str(),
            Owner::Canonical => CANONICAL,
        }
    }

    fn user(&self) -> Option<&UserId> {
        match self {
            Owner::User(id) => Some(id),
            Owner::Canonical => None,
        }
    }
}

impl From<String> for Owner {
    fn from(value: String) -> Self {
        if value == CANONICAL {
            Owner::Canonical
        } else {
            Owner::User(UserId::from(value))
        }
    }
}

impl From<Owner> for String {
    fn from(value: Owner) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set-based form of the visibility rule, handed to repositories so a listing
/// is a single query. Canonical content is always admitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerFilter {
    All,
    Scoped {
        owners: Vec<UserId>,
        shared_owners: Vec<UserId>,
    },
}

impl OwnerFilter {
    pub fn for_claims(claims: &Claims) -> Self {
        match claims.identity() {
            Identity::System => OwnerFilter::All,
            Identity::Anonymous => OwnerFilter::Scoped {
                owners: Vec::new(),
                shared_owners: Vec::new(),
            },
            Identity::User(id) => OwnerFilter::Scoped {
                owners: vec![id.clone()],
                shared_owners: claims.shared_accounts().to_vec(),
            },
        }
    }

    pub fn admits(&self, owner: &Owner, shared: bool) -> bool {
        match (self, owner) {
            (OwnerFilter::All, _) => true,
            (OwnerFilter::Scoped { .. }, Owner::Canonical) => true,
            (
                OwnerFilter::Scoped {
                    owners,
                    shared_owners,
                },
                Owner::User(id),
            ) => owners.contains(id) || (shared && shared_owners.contains(id)),
        }
    }
}

pub fn is_visible(claims: &Claims, owner: &Owner, shared: bool) -> bool {
    OwnerFilter::for_claims(claims).admits(owner, shared)
}

/// Edit rights. Sharing grants read access only, so a shared owner blocks the
/// admin override; the rules are evaluated in this order.
pub fn can_edit(claims: &Claims, owner: &Owner) -> bool {
    let caller = match claims.identity() {
        Identity::Anonymous => return false,
        Identity::System => return true,
        Identity::User(id) => id,
    };

    let owned = owner.user() == Some(caller);
    if !owned
        && owner
            .user()
            .is_some_and(|id| claims.shared_accounts().contains(id))
    {
        return false;
    }
    if claims.is_admin() {
        return true;
    }
    owned
}

/// Owner stamped on a newly created object.
pub fn owner_for_new(claims: &Claims) -> ServiceResult<Owner> {
    match claims.identity() {
        Identity::Anonymous => Err(ServiceError::Unauthorized),
        Identity::System => Ok(Owner::Canonical),
        Identity::User(_) if claims.is_admin() => Ok(Owner::Canonical),
        Identity::User(id) => Ok(Owner::User(id.clone())),
    }
}
