use std::fmt;

use serde::{Deserialize, Serialize};

/// Blockchain account identifier as issued by the wallet provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub String);

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The wallet identity observed by the client. Populated from the provider's
/// persisted session at startup and mutated only by explicit connect and
/// disconnect actions; the client never persists it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalletIdentity {
    #[default]
    SignedOut,
    SignedIn {
        account_id: AccountId,
    },
}

impl WalletIdentity {
    pub fn signed_in(&self) -> bool {
        matches!(self, WalletIdentity::SignedIn { .. })
    }

    pub fn account_id(&self) -> Option<&AccountId> {
        match self {
            WalletIdentity::SignedIn { account_id } => Some(account_id),
            WalletIdentity::SignedOut => None,
        }
    }
}
