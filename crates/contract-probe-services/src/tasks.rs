// crates/contract-probe-services/src/tasks.rs
// ============================================================================
// Module: Tasks Service
// Description: Typed client and contract suite for the task-management API.
// Purpose: Pin the task lifecycle contracts, including the DONE invariant.
// Dependencies: contract-probe-core, contract-probe-runner, serde
// ============================================================================

//! ## Overview
//! The tasks service stores `{ id, title, description, status }` records
//! under its base URL (`.../tasks`). Ids are server-assigned and opaque.
//! Success paths answer with JSON; empty, not-found, deletion, and rule
//! violation paths answer with fixed plain-text messages, which is why reads
//! return a [`TaskReply`].
//!
//! A task in `DONE` cannot move back to `OPEN`.

// ============================================================================
// SECTION: Imports
// ============================================================================

use contract_probe_core::ExpectedOutcome;
use contract_probe_core::Scenario;
use contract_probe_runner::Case;
use contract_probe_runner::HookFailurePolicy;
use contract_probe_runner::Suite;
use reqwest::Method;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use serde_json::json;

use crate::client::ClientError;
use crate::client::NoBody;
use crate::client::ServiceClient;

// ============================================================================
// SECTION: Contract Constants
// ============================================================================

/// Service key in the stage environment.
pub const SERVICE: &str = "tasks";
/// Listing with no tasks.
pub const ARRAY_IS_EMPTY: &str = "Array is empty!";
/// Lookup of an unknown id.
pub const CANT_FIND_TASK: &str = "Can't find task with given id";
/// Bulk deletion acknowledgement.
pub const ALL_TASKS_DELETED: &str = "All tasks were deleted!";
/// Single deletion acknowledgement (spelling is part of the contract).
pub const TASK_DELETED: &str = "Task has been deleted succesfully!";
/// Rejection when reopening a finished task.
pub const DONE_TASK_CANNOT_REOPEN: &str = "A task in Done status cannot be reopened";
/// Id that no server ever assigns.
pub const NON_EXISTING_ID: &str = "nonExistingID";
/// First fixture title.
pub const TITLE_ONE: &str = "Test Title1";
/// Second fixture title.
pub const TITLE_TWO: &str = "Test Title2";
/// Shared fixture description.
pub const DESCRIPTION: &str = "Test description";

// ============================================================================
// SECTION: Wire Types
// ============================================================================

/// Task lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskStatus {
    /// Newly created.
    #[default]
    Open,
    /// Finished; terminal.
    Done,
}

impl TaskStatus {
    /// Returns the wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Done => "DONE",
        }
    }
}

/// Fields submitted when creating a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
}

impl NewTask {
    /// Creates a task payload.
    #[must_use]
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }

    /// Returns the payload as a JSON object.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({"title": self.title, "description": self.description})
    }
}

/// A stored task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Server-assigned opaque id.
    pub id: String,
    /// Title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Lifecycle status; new tasks start `OPEN`.
    #[serde(default)]
    pub status: TaskStatus,
}

/// `PUT /tasks/{id}` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    /// Requested status.
    #[serde(rename = "newStatus")]
    pub new_status: TaskStatus,
}

/// Response that is either JSON of type `T` or a plain-text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskReply<T> {
    /// JSON payload.
    Json(T),
    /// Plain-text message such as [`CANT_FIND_TASK`].
    Message(String),
}

impl<T: DeserializeOwned> TaskReply<T> {
    /// Classifies a response body.
    ///
    /// Bodies that look like JSON must fit `T`; anything else is a message.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Parse`] for JSON that does not fit `T`.
    pub fn from_body(body: &str) -> Result<Self, ClientError> {
        let trimmed = body.trim_start();
        if trimmed.starts_with('{') || trimmed.starts_with('[') {
            serde_json::from_str(body)
                .map(Self::Json)
                .map_err(|err| ClientError::Parse(err.to_string()))
        } else {
            Ok(Self::Message(body.to_string()))
        }
    }
}

impl<T> TaskReply<T> {
    /// Returns the JSON payload, if any.
    #[must_use]
    pub fn into_json(self) -> Option<T> {
        match self {
            Self::Json(value) => Some(value),
            Self::Message(_) => None,
        }
    }

    /// Returns the message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Json(_) => None,
            Self::Message(message) => Some(message),
        }
    }
}

// ============================================================================
// SECTION: Client
// ============================================================================

/// Typed tasks service client.
#[derive(Debug, Clone)]
pub struct TasksClient {
    /// Shared HTTP client.
    inner: ServiceClient,
}

impl TasksClient {
    /// Wraps a service client bound to the tasks base URL.
    #[must_use]
    pub const fn new(inner: ServiceClient) -> Self {
        Self {
            inner,
        }
    }

    /// Creates a task.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure or a non-task body.
    pub async fn create(&self, task: &NewTask) -> Result<Task, ClientError> {
        self.inner.send(Method::POST, &[], &[], Some(task)).await?.json()
    }

    /// Lists every task.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure or malformed JSON.
    pub async fn list(&self) -> Result<TaskReply<Vec<Task>>, ClientError> {
        let response = self.inner.send(Method::GET, &[], &[], None::<&NoBody>).await?;
        TaskReply::from_body(&response.body)
    }

    /// Fetches one task.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure or malformed JSON.
    pub async fn get(&self, id: &str) -> Result<TaskReply<Task>, ClientError> {
        let response = self.inner.send(Method::GET, &[id], &[], None::<&NoBody>).await?;
        TaskReply::from_body(&response.body)
    }

    /// Requests a status change.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure or malformed JSON.
    pub async fn update_status(
        &self,
        id: &str,
        status: TaskStatus,
    ) -> Result<TaskReply<Task>, ClientError> {
        let body = StatusUpdate {
            new_status: status,
        };
        let response = self.inner.send(Method::PUT, &[id], &[], Some(&body)).await?;
        TaskReply::from_body(&response.body)
    }

    /// Deletes one task and returns the acknowledgement text.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure.
    pub async fn delete(&self, id: &str) -> Result<String, ClientError> {
        Ok(self.inner.send(Method::DELETE, &[id], &[], None::<&NoBody>).await?.body)
    }

    /// Deletes every task and returns the acknowledgement text.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure.
    pub async fn delete_all(&self) -> Result<String, ClientError> {
        Ok(self.inner.send(Method::DELETE, &[], &[], None::<&NoBody>).await?.body)
    }
}

// ============================================================================
// SECTION: Contract Suite
// ============================================================================

/// Fixture body for a task with `title`.
fn task_body(title: &str) -> Value {
    NewTask::new(title, DESCRIPTION).to_json()
}

/// Creates a task and captures its id as `task_id`.
fn create_task(name: &str, title: &str) -> Scenario {
    Scenario::post(name, "", task_body(title), ExpectedOutcome::shape(task_body(title)))
        .capture("task_id", "id")
}

/// Moves the captured task to `status`.
fn move_task(name: &str, status: TaskStatus, expect: ExpectedOutcome) -> Scenario {
    Scenario::put(name, "{{task_id}}", json!({"newStatus": status.as_str()}), expect)
}

/// Moves the captured task to DONE and checks the returned record.
fn move_to_done() -> Scenario {
    move_task(
        "move OPEN to DONE",
        TaskStatus::Done,
        ExpectedOutcome::all_of(vec![
            ExpectedOutcome::shape(task_body(TITLE_ONE)),
            ExpectedOutcome::field_equals("status", json!(TaskStatus::Done.as_str())),
        ]),
    )
}

/// Reads the captured task back and checks its status.
fn read_status(name: &str, status: TaskStatus) -> Scenario {
    Scenario::get(
        name,
        "{{task_id}}",
        ExpectedOutcome::field_equals("status", json!(status.as_str())),
    )
}

/// Builds the tasks contract suite; every case starts from `DELETE /tasks`.
#[must_use]
pub fn tasks_suite() -> Suite {
    let reset = Scenario::delete("reset tasks", "", ExpectedOutcome::contains(""));
    Suite::new(
        "tasks",
        SERVICE,
        vec![
            Case::new("POST adds one task", vec![create_task("create task", TITLE_ONE)]),
            Case::new(
                "GET on an empty list reports it",
                vec![Scenario::get("list empty", "", ExpectedOutcome::contains(ARRAY_IS_EMPTY))],
            ),
            Case::new(
                "GET lists every task in order",
                vec![
                    create_task("create first task", TITLE_ONE),
                    create_task("create second task", TITLE_TWO),
                    Scenario::get(
                        "list both",
                        "",
                        ExpectedOutcome::shape(json!([task_body(TITLE_ONE), task_body(TITLE_TWO)])),
                    ),
                ],
            ),
            Case::new(
                "GET by unknown id is not found",
                vec![Scenario::get(
                    "get unknown id",
                    NON_EXISTING_ID,
                    ExpectedOutcome::exact_text(CANT_FIND_TASK),
                )],
            ),
            Case::new(
                "GET by id returns the created task",
                vec![
                    create_task("create task", TITLE_ONE),
                    Scenario::get(
                        "get created task",
                        "{{task_id}}",
                        ExpectedOutcome::all_of(vec![
                            ExpectedOutcome::shape(task_body(TITLE_ONE)),
                            ExpectedOutcome::field_equals("id", json!("{{task_id}}")),
                        ]),
                    ),
                ],
            ),
            Case::new(
                "DELETE removes every task",
                vec![Scenario::delete(
                    "delete all",
                    "",
                    ExpectedOutcome::exact_text(ALL_TASKS_DELETED),
                )],
            ),
            Case::new(
                "DELETE by id removes one task",
                vec![
                    create_task("create task", TITLE_ONE),
                    Scenario::delete(
                        "delete task",
                        "{{task_id}}",
                        ExpectedOutcome::exact_text(TASK_DELETED),
                    ),
                    Scenario::get(
                        "get deleted task",
                        "{{task_id}}",
                        ExpectedOutcome::exact_text(CANT_FIND_TASK),
                    ),
                ],
            ),
            Case::new(
                "PUT moves a task from OPEN to DONE",
                vec![
                    create_task("create task", TITLE_ONE),
                    move_to_done(),
                    read_status("read DONE status", TaskStatus::Done),
                ],
            ),
            Case::new(
                "PUT refuses to reopen a DONE task",
                vec![
                    create_task("create task", TITLE_ONE),
                    move_to_done(),
                    move_task(
                        "move DONE to OPEN",
                        TaskStatus::Open,
                        ExpectedOutcome::exact_text(DONE_TASK_CANNOT_REOPEN),
                    ),
                    read_status("status stays DONE", TaskStatus::Done),
                ],
            ),
        ],
    )
    .with_reset(reset)
    .with_hook_policy(HookFailurePolicy::FailCase)
}
