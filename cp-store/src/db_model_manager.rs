use sqlx::{Pool, Sqlite};

#[derive(Clone, Debug)]
pub struct DbModelManager {
    pool: Pool<Sqlite>,
}

impl DbModelManager {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}
