// Task service: storage rows in, public DTOs out

use anyhow::Result;
use std::sync::Arc;
use taskboard_contracts::Task;
use taskboard_storage::{
    models::{CreateTask, UpdateTask},
    Database, TaskRow,
};

pub struct TaskService {
    db: Arc<Database>,
}

impl TaskService {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    pub async fn create(&self, input: CreateTask) -> Result<Task> {
        let row = self.db.create_task(input).await?;
        Ok(Self::row_to_task(row))
    }

    pub async fn get(&self, id: i32) -> Result<Option<Task>> {
        let row = self.db.get_task(id).await?;
        Ok(row.map(Self::row_to_task))
    }

    pub async fn list(&self) -> Result<Vec<Task>> {
        let rows = self.db.list_tasks().await?;
        Ok(rows.into_iter().map(Self::row_to_task).collect())
    }

    pub async fn update(&self, id: i32, input: UpdateTask) -> Result<Option<Task>> {
        let row = self.db.update_task(id, input).await?;
        Ok(row.map(Self::row_to_task))
    }

    pub async fn delete(&self, id: i32) -> Result<bool> {
        self.db.delete_task(id).await
    }

    fn row_to_task(row: TaskRow) -> Task {
        Task {
            id: row.id,
            title: row.title,
            description: row.description,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
