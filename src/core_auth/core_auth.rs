use crate::constants::USERNAME_REGEX;
use crate::core_auth::error::{AuthError, CredentialError};
use crate::core_auth::helper::verify_password;
use crate::core_perm::Permissions;
use log::{debug, info};
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// A configured account. Immutable once the server has started.
#[derive(Clone)]
pub struct User {
    pub username: String,
    /// Cleartext, or a bcrypt hash (`$2…`).
    pub password: String,
    pub home_dir: PathBuf,
    pub permissions: Permissions,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("username", &self.username)
            .field("home_dir", &self.home_dir)
            .field("permissions", &self.permissions.to_string())
            .finish()
    }
}

/// In-memory credential table shared read-only by every session.
#[derive(Debug, Default)]
pub struct CredentialStore {
    users: HashMap<String, Arc<User>>,
}

impl CredentialStore {
    /// Builds the store, rejecting duplicate or malformed usernames and
    /// home directories that do not exist.
    pub fn from_users(users: Vec<User>) -> Result<Self, CredentialError> {
        let username_regex = Regex::new(USERNAME_REGEX)?;
        let mut table = HashMap::with_capacity(users.len());

        for user in users {
            if !username_regex.is_match(&user.username) {
                return Err(CredentialError::InvalidUsername(user.username));
            }
            if !user.home_dir.is_dir() {
                return Err(CredentialError::MissingHome {
                    username: user.username,
                    path: user.home_dir,
                });
            }
            if table.contains_key(&user.username) {
                return Err(CredentialError::DuplicateUser(user.username));
            }
            debug!(
                "Registered user {} (home {:?}, perms {})",
                user.username, user.home_dir, user.permissions
            );
            table.insert(user.username.clone(), Arc::new(user));
        }

        info!("Credential store loaded with {} user(s)", table.len());
        Ok(Self { users: table })
    }

    /// Checks a username/password pair.
    ///
    /// # Returns
    ///
    /// The matching user, or [`AuthError::LoginIncorrect`] whether the
    /// username was unknown or the password wrong.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Arc<User>, AuthError> {
        match self.users.get(username) {
            Some(user) if verify_password(password, &user.password) => Ok(Arc::clone(user)),
            _ => Err(AuthError::LoginIncorrect),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_auth::helper::hash_password_with_cost;
    use tempfile::TempDir;

    fn user(name: &str, password: &str, home: &TempDir) -> User {
        User {
            username: name.to_string(),
            password: password.to_string(),
            home_dir: home.path().to_path_buf(),
            permissions: Permissions::all(),
        }
    }

    #[test]
    fn test_authenticate_success() {
        let home = TempDir::new().unwrap();
        let store = CredentialStore::from_users(vec![user("alice", "password", &home)]).unwrap();
        let alice = store.authenticate("alice", "password").unwrap();
        assert_eq!(alice.username, "alice");
    }

    #[test]
    fn test_failures_are_indistinguishable() {
        let home = TempDir::new().unwrap();
        let store = CredentialStore::from_users(vec![user("alice", "password", &home)]).unwrap();
        let wrong_password = store.authenticate("alice", "nope").unwrap_err();
        let unknown_user = store.authenticate("mallory", "password").unwrap_err();
        assert_eq!(wrong_password, unknown_user);
        assert_eq!(wrong_password.to_ftp_response(), "530 Login incorrect.");
    }

    #[test]
    fn test_username_is_case_sensitive() {
        let home = TempDir::new().unwrap();
        let store = CredentialStore::from_users(vec![user("alice", "password", &home)]).unwrap();
        assert!(store.authenticate("Alice", "password").is_err());
    }

    #[test]
    fn test_bcrypt_hashed_password() {
        let home = TempDir::new().unwrap();
        let hashed = hash_password_with_cost("s3cret", 4).unwrap();
        let store = CredentialStore::from_users(vec![user("bob", &hashed, &home)]).unwrap();
        assert!(store.authenticate("bob", "s3cret").is_ok());
        assert!(store.authenticate("bob", &hashed).is_err());
    }

    #[test]
    fn test_duplicate_user_rejected() {
        let home = TempDir::new().unwrap();
        let result = CredentialStore::from_users(vec![
            user("alice", "a", &home),
            user("alice", "b", &home),
        ]);
        assert!(matches!(result, Err(CredentialError::DuplicateUser(name)) if name == "alice"));
    }

    #[test]
    fn test_missing_home_rejected() {
        let home = TempDir::new().unwrap();
        let mut ghost = user("ghost", "x", &home);
        ghost.home_dir = home.path().join("does-not-exist");
        let result = CredentialStore::from_users(vec![ghost]);
        assert!(matches!(result, Err(CredentialError::MissingHome { .. })));
    }

    #[test]
    fn test_invalid_username_rejected() {
        let home = TempDir::new().unwrap();
        let result = CredentialStore::from_users(vec![user("bad name", "x", &home)]);
        assert!(matches!(result, Err(CredentialError::InvalidUsername(_))));
    }
}
