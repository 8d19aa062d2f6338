use crate::db::{Collection, RecordStore};
use crate::users::repo_types::User;

impl User {
    pub async fn load_all(store: &RecordStore) -> anyhow::Result<Vec<User>> {
        store.load(Collection::Users).await
    }

    pub async fn save_all(store: &RecordStore, users: &[User]) -> anyhow::Result<()> {
        store.save(Collection::Users, users).await
    }

    /// First user whose username matches exactly.
    pub fn find<'a>(users: &'a [User], username: &str) -> Option<&'a User> {
        users.iter().find(|u| u.username == username)
    }

    pub fn find_mut<'a>(users: &'a mut [User], username: &str) -> Option<&'a mut User> {
        users.iter_mut().find(|u| u.username == username)
    }

    pub async fn find_by_username(
        store: &RecordStore,
        username: &str,
    ) -> anyhow::Result<Option<User>> {
        let users = Self::load_all(store).await?;
        Ok(Self::find(&users, username).cloned())
    }
}
