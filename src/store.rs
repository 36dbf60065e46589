//! In-memory user record store
//!
//! `UserStore` exclusively owns the record collection and the id counter.
//! Each operation takes the lock once, so concurrent requests never observe
//! a half-applied mutation or receive duplicate ids.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;

use crate::error::{Result, UserError};
use crate::types::User;

/// Validation message for a create without both fields
pub const MISSING_FIELDS_MESSAGE: &str = "Name and email are required";

struct Inner {
    /// Records in insertion order
    users: Vec<User>,
    /// Next id to hand out; only ever increases
    next_id: u64,
}

/// Thread-safe, process-scoped store of user records.
pub struct UserStore {
    inner: RwLock<Inner>,
}

impl UserStore {
    /// Create an empty store. The first record receives id 1.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                users: Vec::new(),
                next_id: 1,
            }),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Inner>> {
        self.inner
            .read()
            .map_err(|e| UserError::Internal(format!("Failed to acquire store read lock: {e}")))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Inner>> {
        self.inner
            .write()
            .map_err(|e| UserError::Internal(format!("Failed to acquire store write lock: {e}")))
    }

    /// All records in insertion order.
    pub fn list(&self) -> Result<Vec<User>> {
        Ok(self.read()?.users.clone())
    }

    /// Look up a record by id.
    pub fn get(&self, id: u64) -> Result<User> {
        self.read()?
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or(UserError::NotFound)
    }

    /// Validate, assign the next id, stamp `createdAt` and append.
    pub fn create(&self, name: Option<String>, email: Option<String>) -> Result<User> {
        let (name, email) = match (non_empty(name), non_empty(email)) {
            (Some(name), Some(email)) => (name, email),
            _ => return Err(UserError::Validation(MISSING_FIELDS_MESSAGE.to_string())),
        };

        let mut inner = self.write()?;
        let user = User {
            id: inner.next_id,
            name,
            email,
            created_at: Utc::now(),
            updated_at: None,
        };
        inner.next_id += 1;
        inner.users.push(user.clone());

        tracing::debug!(user_id = user.id, "User created");
        Ok(user)
    }

    /// Replace the provided fields and stamp `updatedAt`.
    ///
    /// Absent or empty fields keep their previous value.
    pub fn update(&self, id: u64, name: Option<String>, email: Option<String>) -> Result<User> {
        let mut inner = self.write()?;
        let user = inner
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(UserError::NotFound)?;

        if let Some(name) = non_empty(name) {
            user.name = name;
        }
        if let Some(email) = non_empty(email) {
            user.email = email;
        }
        user.updated_at = Some(Utc::now());

        tracing::debug!(user_id = id, "User updated");
        Ok(user.clone())
    }

    /// Remove a record. Its id is never handed out again.
    pub fn delete(&self, id: u64) -> Result<()> {
        let mut inner = self.write()?;
        let index = inner
            .users
            .iter()
            .position(|u| u.id == id)
            .ok_or(UserError::NotFound)?;
        inner.users.remove(index);

        tracing::debug!(user_id = id, "User deleted");
        Ok(())
    }

    /// Number of stored records.
    pub fn count(&self) -> usize {
        self.inner.read().map(|i| i.users.len()).unwrap_or(0)
    }
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
