//! Name/password login against the people store.
//!
//! There are no accounts beyond participant records:
//! - unknown name: the participant is created with the given password
//! - known name without a password (seeded): the first login claims it
//! - known name with a password: the password must match exactly
//!
//! Passwords are stored and compared in plaintext.

use tracing::info;

use crate::notify::Toast;
use crate::store::{PeopleStore, PersonRecord, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    Created,
    Claimed,
    Welcome,
}

impl LoginOutcome {
    #[must_use]
    pub fn toast(self, name: &str) -> Toast {
        match self {
            Self::Created => Toast::success("🎄 Account created!"),
            Self::Claimed => Toast::success("🎁 Password saved!"),
            Self::Welcome => Toast::success(format!("✨ Welcome {name}!")),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("name is required")]
    MissingName,
    #[error("password is required")]
    MissingPassword,
    #[error("wrong password")]
    WrongPassword,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl AuthError {
    #[must_use]
    pub fn toast(&self) -> Toast {
        match self {
            Self::MissingName => Toast::error("Choose a name"),
            Self::MissingPassword => Toast::error("Enter the password"),
            Self::WrongPassword => Toast::error("❌ Wrong password!"),
            Self::Store(_) => Toast::error("Login failed"),
        }
    }
}

/// Log in as `name`, creating or claiming the participant as needed.
/// Returns the normalized name the session should use.
///
/// # Errors
///
/// Validation errors for empty input, `WrongPassword` on mismatch, and
/// `Store` if the store is unreachable.
pub async fn login(store: &dyn PeopleStore, name: &str, password: &str) -> Result<(String, LoginOutcome), AuthError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AuthError::MissingName);
    }
    if password.is_empty() {
        return Err(AuthError::MissingPassword);
    }

    let record = match store.get(name).await? {
        Some(record) => record,
        None => match store.create(name, PersonRecord::new(Some(password.to_owned()))).await {
            Ok(()) => {
                info!(%name, "auth: participant created");
                return Ok((name.to_owned(), LoginOutcome::Created));
            }
            // Lost a creation race; verify against the winner's record.
            Err(StoreError::AlreadyExists(_)) => store
                .get(name)
                .await?
                .ok_or_else(|| StoreError::NotFound(name.to_owned()))?,
            Err(e) => return Err(e.into()),
        },
    };

    let stored = match record.password {
        Some(stored) => stored,
        None => {
            if store.claim_password(name, password).await? {
                info!(%name, "auth: participant claimed");
                return Ok((name.to_owned(), LoginOutcome::Claimed));
            }
            // Another login claimed it first; verify against theirs.
            store
                .get(name)
                .await?
                .and_then(|record| record.password)
                .ok_or_else(|| StoreError::NotFound(name.to_owned()))?
        }
    };

    if stored == password {
        Ok((name.to_owned(), LoginOutcome::Welcome))
    } else {
        Err(AuthError::WrongPassword)
    }
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
