use super::db::{Store, StoreError};
use super::models::Post;

impl Store {
    // ========================================================================
    // Post operations
    // ========================================================================

    /// Create a post. The author id is trusted, not checked against users.
    pub fn create_post(&self, body: &str, author_id: u64) -> Result<Post, StoreError> {
        self.write(|doc| {
            let post = Post {
                author_id,
                body: body.to_string(),
                id: doc.next_post_id(),
            };
            doc.posts.insert(post.id, post.clone());
            Ok(post)
        })
    }

    /// All posts. Callers must not rely on the order.
    pub fn get_posts(&self) -> Result<Vec<Post>, StoreError> {
        self.read(|doc| Ok(doc.posts.values().cloned().collect()))
    }

    pub fn get_post(&self, id: u64) -> Result<Post, StoreError> {
        self.read(|doc| doc.posts.get(&id).cloned().ok_or(StoreError::NotFound))
    }

    /// Delete a post. Authorization is the caller's job.
    pub fn delete_post(&self, id: u64) -> Result<(), StoreError> {
        self.write(|doc| {
            doc.posts.remove(&id).ok_or(StoreError::NotFound)?;
            Ok(())
        })
    }
}
