use std::sync::Mutex;

use async_trait::async_trait;

use crate::users::repo::{RepoError, UserRepo};
use crate::users::repo_types::{User, UserFields};

fn row(id: i32, fields: &UserFields) -> User {
    User {
        id,
        user_name: fields.user_name.clone(),
        first_name: fields.first_name.clone(),
        last_name: fields.last_name.clone(),
        email: fields.email.clone(),
        user_status: fields.user_status.clone(),
        department: fields.department.clone(),
    }
}

#[derive(Default)]
struct Table {
    rows: Vec<User>,
    next_id: i32,
}

/// Vec-backed repo for handler tests. `failing()` makes every call a database error.
#[derive(Default)]
pub struct InMemoryUserRepo {
    table: Mutex<Table>,
    failing: bool,
}

impl InMemoryUserRepo {
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.table.lock().unwrap().rows.len()
    }

    fn check(&self) -> Result<(), RepoError> {
        if self.failing {
            return Err(RepoError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepo for InMemoryUserRepo {
    async fn create(&self, fields: &UserFields) -> Result<User, RepoError> {
        self.check()?;
        let mut table = self.table.lock().unwrap();
        if table.rows.iter().any(|u| u.user_name == fields.user_name) {
            return Err(RepoError::Duplicate);
        }
        table.next_id += 1;
        let user = row(table.next_id, fields);
        table.rows.push(user.clone());
        Ok(user)
    }

    async fn list(&self) -> Result<Vec<User>, RepoError> {
        self.check()?;
        Ok(self.table.lock().unwrap().rows.clone())
    }

    async fn find(&self, id: i32) -> Result<Option<User>, RepoError> {
        self.check()?;
        let table = self.table.lock().unwrap();
        Ok(table.rows.iter().find(|u| u.id == id).cloned())
    }

    async fn update(&self, id: i32, fields: &UserFields) -> Result<Option<User>, RepoError> {
        self.check()?;
        let mut table = self.table.lock().unwrap();
        if !table.rows.iter().any(|u| u.id == id) {
            return Ok(None);
        }
        if table
            .rows
            .iter()
            .any(|u| u.id != id && u.user_name == fields.user_name)
        {
            return Err(RepoError::Duplicate);
        }
        let Some(slot) = table.rows.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        *slot = row(id, fields);
        Ok(Some(slot.clone()))
    }

    async fn delete(&self, id: i32) -> Result<bool, RepoError> {
        self.check()?;
        let mut table = self.table.lock().unwrap();
        let before = table.rows.len();
        table.rows.retain(|u| u.id != id);
        Ok(table.rows.len() < before)
    }
}
