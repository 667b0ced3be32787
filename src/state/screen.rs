// Declarative screen description handed to the renderer.
// Built from navigator state only; holds no widget handles.

use std::fmt;

use chrono::Local;

use crate::gitlab::{Job, Pipeline, Status};

use super::navigation::{BreadcrumbNode, GroupNode, View, ViewItems, ViewKind, ViewParams};

/// Navigation key carried by a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRef {
    Group(u64),
    Project(u64),
    Pipeline(u64),
    Job(u64),
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRef::Group(id) => write!(f, "group {}", id),
            NodeRef::Project(id) => write!(f, "project {}", id),
            NodeRef::Pipeline(id) => write!(f, "pipeline {}", id),
            NodeRef::Job(id) => write!(f, "job {}", id),
        }
    }
}

/// Colour hint for a row; the renderer picks actual colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hint {
    Group,
    Project,
    Status(Status),
    RetryFailed,
}

/// One line of a tree or list.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub label: String,
    /// Tree indentation level.
    pub depth: u16,
    pub reference: Option<NodeRef>,
    pub hint: Hint,
}

/// Main content of a screen.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Tree(Vec<Row>),
    List(Vec<Row>),
    Text(String),
    /// Nothing fetched yet, or nothing to show.
    Empty(String),
}

impl Body {
    pub fn rows(&self) -> &[Row] {
        match self {
            Body::Tree(rows) | Body::List(rows) => rows.as_slice(),
            _ => &[],
        }
    }
}

/// Choices offered by the job action dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobAction {
    Logs,
    Retry,
    Cancel,
}

impl JobAction {
    pub const ALL: [JobAction; 3] = [JobAction::Logs, JobAction::Retry, JobAction::Cancel];

    pub fn label(&self) -> &'static str {
        match self {
            JobAction::Logs => "Logs",
            JobAction::Retry => "Retry",
            JobAction::Cancel => "Cancel",
        }
    }
}

/// An open ephemeral dialog.
#[derive(Debug, Clone, PartialEq)]
pub enum DialogView {
    BranchSelect {
        title: String,
        branches: Vec<String>,
        /// Index of the repository's default branch, if listed.
        default_index: Option<usize>,
    },
    JobAction {
        title: String,
    },
}

/// Severity of the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Error,
}

/// Inline message shown under the content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub level: StatusLevel,
    pub message: String,
}

impl StatusLine {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == StatusLevel::Error
    }
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Screen {
    pub kind: ViewKind,
    /// Stack depth of the shown view, 1 at the group list.
    pub depth: usize,
    pub title: String,
    pub breadcrumbs: Vec<BreadcrumbNode>,
    pub body: Body,
    pub dialog: Option<DialogView>,
    pub status: Option<StatusLine>,
    /// Whether the shown items were invalidated and not yet refetched.
    pub stale: bool,
}

/// Title for the content block of a view.
pub fn view_title(view: &View) -> String {
    match &view.params {
        ViewParams::GroupList { filter } if filter.is_empty() => "Groups".to_string(),
        ViewParams::GroupList { filter } => format!("Groups matching \"{}\"", filter),
        ViewParams::PipelineList { branch, .. } => format!("Pipelines on {}", branch),
        ViewParams::JobList { pipeline_id, .. } => format!("Jobs of pipeline {}", pipeline_id),
        ViewParams::JobLogs { job_id, .. } => format!("Log of job {}", job_id),
    }
}

/// Build the body of a view from its cached items.
pub fn view_body(view: &View) -> Body {
    match &view.items {
        None => Body::Empty("Nothing loaded".to_string()),
        Some(ViewItems::Groups(nodes)) if nodes.is_empty() => {
            Body::Empty("No groups found".to_string())
        }
        Some(ViewItems::Groups(nodes)) => Body::Tree(group_rows(nodes)),
        Some(ViewItems::Pipelines(pipelines)) if pipelines.is_empty() => {
            Body::Empty("No pipelines on this branch".to_string())
        }
        Some(ViewItems::Pipelines(pipelines)) => {
            Body::List(pipelines.iter().map(pipeline_row).collect())
        }
        Some(ViewItems::Jobs(jobs)) if jobs.is_empty() => {
            Body::Empty("No jobs in this pipeline".to_string())
        }
        Some(ViewItems::Jobs(jobs)) => Body::List(
            jobs.iter()
                .map(|job| job_row(job, view.is_retry_failed(job.id)))
                .collect(),
        ),
        Some(ViewItems::Log(text)) => Body::Text(text.clone()),
    }
}

fn group_rows(nodes: &[GroupNode]) -> Vec<Row> {
    let mut rows = Vec::new();
    for node in nodes {
        rows.push(Row {
            label: format!("Group: {}", node.group.name),
            depth: 0,
            reference: Some(NodeRef::Group(node.group.id)),
            hint: Hint::Group,
        });
        for project in &node.projects {
            rows.push(Row {
                label: format!("Project: {}", project.name),
                depth: 1,
                reference: Some(NodeRef::Project(project.id)),
                hint: Hint::Project,
            });
        }
    }
    rows
}

fn pipeline_row(pipeline: &Pipeline) -> Row {
    let updated = pipeline
        .updated_at
        .map(|dt| {
            dt.with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|| "-".to_string());
    Row {
        label: format!(
            "#{}  {}  ref {}  source {}  updated {}",
            pipeline.id,
            pipeline.status,
            pipeline.ref_name,
            pipeline.source.as_deref().unwrap_or("-"),
            updated
        ),
        depth: 0,
        reference: Some(NodeRef::Pipeline(pipeline.id)),
        hint: Hint::Status(pipeline.status),
    }
}

fn job_row(job: &Job, retry_failed: bool) -> Row {
    let duration = match job.duration {
        Some(secs) => {
            let secs = secs.max(0.0).round() as u64;
            format!("{}m {}s", secs / 60, secs % 60)
        }
        None => "-".to_string(),
    };
    let mut label = format!(
        "{}  {}  [{}]  {}  {}",
        job.id, job.name, job.stage, job.status, duration
    );
    if retry_failed {
        label.push_str("  (retry failed)");
    }
    Row {
        label,
        depth: 0,
        reference: Some(NodeRef::Job(job.id)),
        hint: if retry_failed {
            Hint::RetryFailed
        } else {
            Hint::Status(job.status)
        },
    }
}
