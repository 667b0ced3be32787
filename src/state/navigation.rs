// Navigation state management.
// Views are identified by kind plus the minimal parameters needed to refetch them.

use crate::gitlab::{Group, Job, Pipeline, Project};

/// A node in the navigation breadcrumb trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreadcrumbNode {
    /// Display label for the breadcrumb.
    pub label: String,
    /// The kind of view this node represents.
    pub kind: ViewKind,
}

/// Resource level a view (or open dialog) sits at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    /// Group tree with each group's projects
    GroupList,
    /// A project was picked, waiting for a branch choice (dialog only)
    BranchSelect,
    /// Pipelines of one project on one branch
    PipelineList,
    /// Jobs of one pipeline
    JobList,
    /// Trace of one job
    JobLogs,
}

/// Everything needed to regenerate a view with one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewParams {
    GroupList {
        filter: String,
    },
    PipelineList {
        project_id: u64,
        branch: String,
    },
    JobList {
        project_id: u64,
        branch: String,
        pipeline_id: u64,
    },
    JobLogs {
        project_id: u64,
        job_id: u64,
    },
}

impl ViewParams {
    pub fn kind(&self) -> ViewKind {
        match self {
            ViewParams::GroupList { .. } => ViewKind::GroupList,
            ViewParams::PipelineList { .. } => ViewKind::PipelineList,
            ViewParams::JobList { .. } => ViewKind::JobList,
            ViewParams::JobLogs { .. } => ViewKind::JobLogs,
        }
    }
}

/// A group together with the projects shown beneath it.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupNode {
    pub group: Group,
    pub projects: Vec<Project>,
}

/// Fetched contents of a view.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewItems {
    Groups(Vec<GroupNode>),
    Pipelines(Vec<Pipeline>),
    Jobs(Vec<Job>),
    Log(String),
}

/// One entry of the navigation stack.
#[derive(Debug, Clone)]
pub struct View {
    pub params: ViewParams,
    /// Breadcrumb text; display only, never used to refetch.
    pub label: String,
    /// Last fetched contents, if any fetch succeeded yet.
    pub items: Option<ViewItems>,
    /// Set when a mutation made `items` untrustworthy.
    pub stale: bool,
    /// Jobs whose last retry attempt failed.
    pub retry_failed: Vec<u64>,
}

impl View {
    /// A view whose contents have not been fetched yet.
    pub fn new(params: ViewParams, label: impl Into<String>) -> Self {
        Self {
            params,
            label: label.into(),
            items: None,
            stale: false,
            retry_failed: Vec::new(),
        }
    }

    /// A view with freshly fetched contents.
    pub fn loaded(params: ViewParams, label: impl Into<String>, items: ViewItems) -> Self {
        let mut view = Self::new(params, label);
        view.items = Some(items);
        view
    }

    pub fn kind(&self) -> ViewKind {
        self.params.kind()
    }

    /// Replace contents after a successful refetch.
    pub fn set_items(&mut self, items: ViewItems) {
        self.items = Some(items);
        self.stale = false;
    }

    /// Mark contents as invalidated by a mutation.
    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    pub fn mark_retry_failed(&mut self, job_id: u64) {
        if !self.retry_failed.contains(&job_id) {
            self.retry_failed.push(job_id);
        }
    }

    pub fn clear_retry_failed(&mut self, job_id: u64) {
        self.retry_failed.retain(|id| *id != job_id);
    }

    pub fn is_retry_failed(&self, job_id: u64) -> bool {
        self.retry_failed.contains(&job_id)
    }

    /// Find a project in a group tree view.
    pub fn find_project(&self, project_id: u64) -> Option<&Project> {
        match &self.items {
            Some(ViewItems::Groups(nodes)) => nodes
                .iter()
                .flat_map(|node| node.projects.iter())
                .find(|p| p.id == project_id),
            _ => None,
        }
    }

    /// Find a pipeline in a pipeline list view.
    pub fn find_pipeline(&self, pipeline_id: u64) -> Option<&Pipeline> {
        match &self.items {
            Some(ViewItems::Pipelines(pipelines)) => {
                pipelines.iter().find(|p| p.id == pipeline_id)
            }
            _ => None,
        }
    }

    /// Find a job in a job list view.
    pub fn find_job(&self, job_id: u64) -> Option<&Job> {
        match &self.items {
            Some(ViewItems::Jobs(jobs)) => jobs.iter().find(|j| j.id == job_id),
            _ => None,
        }
    }

    /// Create a breadcrumb node for this view.
    pub fn to_breadcrumb(&self) -> BreadcrumbNode {
        BreadcrumbNode {
            label: self.label.clone(),
            kind: self.kind(),
        }
    }
}

/// Case-insensitive substring match on group name; an empty filter keeps all.
pub fn filter_groups(groups: Vec<Group>, filter: &str) -> Vec<Group> {
    let needle = filter.trim().to_lowercase();
    if needle.is_empty() {
        return groups;
    }
    groups
        .into_iter()
        .filter(|g| g.name.to_lowercase().contains(&needle))
        .collect()
}

/// Navigation stack. The root is always a group list and is never popped.
#[derive(Debug, Clone)]
pub struct NavigationStack {
    root: View,
    /// Views above the root (bottom = first drill-down, top = current)
    above: Vec<View>,
}

impl NavigationStack {
    /// Create a stack holding only the group list with `filter`.
    pub fn new(filter: impl Into<String>) -> Self {
        Self {
            root: View::new(
                ViewParams::GroupList {
                    filter: filter.into(),
                },
                "Groups",
            ),
            above: Vec::new(),
        }
    }

    /// Get the current view.
    pub fn current(&self) -> &View {
        self.above.last().unwrap_or(&self.root)
    }

    pub fn current_mut(&mut self) -> &mut View {
        self.above.last_mut().unwrap_or(&mut self.root)
    }

    /// The bottom group list view.
    pub fn root(&self) -> &View {
        &self.root
    }

    /// Push a drill-down view. Group lists can only live at the root.
    pub fn push(&mut self, view: View) -> bool {
        if view.kind() == ViewKind::GroupList {
            return false;
        }
        self.above.push(view);
        true
    }

    /// Swap the current non-root view for another one (e.g. a branch switch).
    pub fn replace_top(&mut self, view: View) -> bool {
        if view.kind() == ViewKind::GroupList || self.above.is_empty() {
            return false;
        }
        self.above.pop();
        self.above.push(view);
        true
    }

    /// Replace the root group list and drop everything above it.
    pub fn replace_root(&mut self, view: View) -> bool {
        if view.kind() != ViewKind::GroupList {
            return false;
        }
        self.above.clear();
        self.root = view;
        true
    }

    /// Pop the current view (go back). Returns false if at root.
    pub fn pop(&mut self) -> bool {
        self.above.pop().is_some()
    }

    /// Check if we can go back (not at root).
    pub fn can_go_back(&self) -> bool {
        !self.above.is_empty()
    }

    /// Get the breadcrumb trail.
    pub fn breadcrumbs(&self) -> Vec<BreadcrumbNode> {
        std::iter::once(&self.root)
            .chain(self.above.iter())
            .map(View::to_breadcrumb)
            .collect()
    }

    /// Reset to root level.
    pub fn reset(&mut self) {
        self.above.clear();
    }

    /// Get the depth of the navigation stack.
    pub fn depth(&self) -> usize {
        self.above.len() + 1
    }
}

impl Default for NavigationStack {
    fn default() -> Self {
        Self::new("")
    }
}
