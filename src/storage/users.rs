use super::db::{Store, StoreError};
use super::models::User;

impl Store {
    // ========================================================================
    // User operations
    // ========================================================================

    /// Create a user. Emails are unique (case-sensitive exact match).
    pub fn create_user(&self, email: &str, hashed_password: &str) -> Result<User, StoreError> {
        self.write(|doc| {
            if doc.users.values().any(|u| u.email == email) {
                return Err(StoreError::AlreadyExists);
            }

            let user = User {
                email: email.to_string(),
                hashed_password: hashed_password.to_string(),
                id: doc.next_user_id(),
                is_chirpy_red: false,
            };
            doc.users.insert(user.id, user.clone());
            Ok(user)
        })
    }

    pub fn get_user(&self, id: u64) -> Result<User, StoreError> {
        self.read(|doc| doc.users.get(&id).cloned().ok_or(StoreError::NotFound))
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<User, StoreError> {
        self.read(|doc| {
            doc.users
                .values()
                .find(|u| u.email == email)
                .cloned()
                .ok_or(StoreError::NotFound)
        })
    }

    /// Overwrite both email and password hash.
    ///
    /// There is no partial update: callers keeping a field must pass its
    /// current value. Taking another user's email fails with `AlreadyExists`.
    pub fn update_user(
        &self,
        id: u64,
        email: &str,
        hashed_password: &str,
    ) -> Result<User, StoreError> {
        self.write(|doc| {
            if doc.users.values().any(|u| u.id != id && u.email == email) {
                return Err(StoreError::AlreadyExists);
            }

            let user = doc.users.get_mut(&id).ok_or(StoreError::NotFound)?;
            user.email = email.to_string();
            user.hashed_password = hashed_password.to_string();
            Ok(user.clone())
        })
    }

    /// Set the upgraded flag. Idempotent.
    pub fn upgrade_account(&self, id: u64) -> Result<User, StoreError> {
        self.write(|doc| {
            let user = doc.users.get_mut(&id).ok_or(StoreError::NotFound)?;
            user.is_chirpy_red = true;
            Ok(user.clone())
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::StoreError;
    use crate::testutil::setup_store;

    #[test]
    fn test_create_and_get_user() {
        let (store, _temp) = setup_store();

        let user = store.create_user("a@example.com", "hash-a").unwrap();
        assert_eq!(user.id, 1);
        assert!(!user.is_chirpy_red);

        let fetched = store.get_user_by_email("a@example.com").unwrap();
        assert_eq!(fetched, user);
        assert_eq!(store.get_user(1).unwrap(), user);
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let (store, _temp) = setup_store();

        store.create_user("a@example.com", "hash-a").unwrap();
        let result = store.create_user("a@example.com", "hash-b");
        assert!(matches!(result, Err(StoreError::AlreadyExists)));

        let doc = store.document().unwrap();
        assert_eq!(doc.users.len(), 1);
        assert_eq!(doc.users[&1].hashed_password, "hash-a");
    }

    #[test]
    fn test_email_match_is_case_sensitive() {
        let (store, _temp) = setup_store();

        store.create_user("a@example.com", "hash").unwrap();
        store.create_user("A@example.com", "hash").unwrap();

        assert!(matches!(
            store.get_user_by_email("a@EXAMPLE.com"),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn test_unknown_user_not_found() {
        let (store, _temp) = setup_store();

        assert!(matches!(
            store.get_user_by_email("nobody@example.com"),
            Err(StoreError::NotFound)
        ));
        assert!(matches!(store.get_user(7), Err(StoreError::NotFound)));
        assert!(matches!(
            store.update_user(7, "x@example.com", "hash"),
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            store.upgrade_account(7),
            Err(StoreError::NotFound)
        ));
    }

    #[test]
    fn test_update_overwrites_both_fields() {
        let (store, _temp) = setup_store();
        let user = store.create_user("a@example.com", "hash-a").unwrap();

        let updated = store.update_user(user.id, "b@example.com", "hash-b").unwrap();
        assert_eq!(updated.email, "b@example.com");
        assert_eq!(updated.hashed_password, "hash-b");

        assert!(store.get_user_by_email("a@example.com").is_err());
        assert_eq!(store.get_user_by_email("b@example.com").unwrap().id, user.id);
    }

    #[test]
    fn test_update_to_taken_email_rejected() {
        let (store, _temp) = setup_store();
        store.create_user("a@example.com", "hash").unwrap();
        let b = store.create_user("b@example.com", "hash").unwrap();

        assert!(matches!(
            store.update_user(b.id, "a@example.com", "hash"),
            Err(StoreError::AlreadyExists)
        ));
        // Keeping your own email is fine
        store.update_user(b.id, "b@example.com", "new-hash").unwrap();
    }

    #[test]
    fn test_upgrade_is_idempotent() {
        let (store, _temp) = setup_store();
        let user = store.create_user("a@example.com", "hash").unwrap();

        assert!(store.upgrade_account(user.id).unwrap().is_chirpy_red);
        assert!(store.upgrade_account(user.id).unwrap().is_chirpy_red);
        assert!(store.get_user(user.id).unwrap().is_chirpy_red);
    }
}
