//! Task resource CRUD.
//!
//! Task bodies are opaque JSON objects; everything except the embedded `id`
//! belongs to the client. Update and delete address a task by the `id` field
//! of the request body.

use serde_json::Value;
use tracing::debug;

use crate::context::Context;
use crate::error::Error;
use crate::response::{Outcome, Payload};
use crate::services::SharedTaskService;

pub struct TaskController {
    tasks: SharedTaskService,
}

impl TaskController {
    pub fn new(tasks: SharedTaskService) -> Self {
        Self { tasks }
    }

    pub async fn find_all(&self) -> Result<Outcome, Error> {
        let tasks = self.tasks.find_all().await?;
        Ok(Outcome::Success(Payload::Json(Value::Array(tasks))))
    }

    pub async fn create(&self, ctx: &Context) -> Result<Outcome, Error> {
        let task = match parse_task(ctx) {
            Ok(task) => task,
            Err(outcome) => return Ok(outcome),
        };
        let created = self.tasks.create(task).await?;
        debug!(id = created["id"].as_u64(), "task created");
        Ok(Outcome::Success(Payload::Json(created)))
    }

    pub async fn update(&self, ctx: &Context) -> Result<Outcome, Error> {
        let task = match parse_task(ctx) {
            Ok(task) => task,
            Err(outcome) => return Ok(outcome),
        };
        let Some(id) = task["id"].as_u64() else {
            return Ok(Outcome::error(400, "Task body has no numeric `id`"));
        };
        match self.tasks.update(id, task).await {
            Ok(updated) => Ok(Outcome::Success(Payload::Json(updated))),
            Err(Error::TaskMissing(id)) => Ok(Outcome::error(404, format!("No task with id {id}"))),
            Err(e) => Err(e),
        }
    }

    pub async fn delete(&self, ctx: &Context) -> Result<Outcome, Error> {
        let task = match parse_task(ctx) {
            Ok(task) => task,
            Err(outcome) => return Ok(outcome),
        };
        let Some(id) = task["id"].as_u64() else {
            return Ok(Outcome::error(400, "Task body has no numeric `id`"));
        };
        match self.tasks.delete(id).await {
            Ok(()) => Ok(Outcome::Empty(204)),
            Err(Error::TaskMissing(id)) => Ok(Outcome::error(404, format!("No task with id {id}"))),
            Err(e) => Err(e),
        }
    }
}

fn parse_task(ctx: &Context) -> Result<Value, Outcome> {
    if ctx.body().is_empty() {
        debug!("request body is empty");
        return Err(Outcome::error(400, "Got no JSON data from the request"));
    }
    match serde_json::from_slice::<Value>(ctx.body()) {
        Ok(task) if task.is_object() => Ok(task),
        Ok(_) => Err(Outcome::error(400, "Task body must be a JSON object")),
        Err(e) => {
            debug!(error = %e, "task body is not JSON");
            Err(Outcome::error(400, "Malformed JSON body"))
        }
    }
}
