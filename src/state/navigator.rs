// Navigator state machine.
// Owns the view stack and the ephemeral dialogs; every transition fetches through
// the resource client and either fully applies or leaves state untouched.

use log::{debug, info, warn};

use crate::error::{GlError, Result};
use crate::gitlab::Branch;
use crate::gitlab::trace::clean_trace;

use super::navigation::{
    GroupNode, NavigationStack, View, ViewItems, ViewKind, ViewParams, filter_groups,
};
use super::resource::ResourceClient;
use super::screen::{DialogView, JobAction, NodeRef, Screen, StatusLine, view_body, view_title};

/// Where a chosen branch's pipeline list goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchTarget {
    /// Drill down from the group tree.
    Push,
    /// Switch branch on the current pipeline list.
    Replace,
}

/// Transient decision that never sits on the stack.
#[derive(Debug, Clone, PartialEq)]
pub enum Dialog {
    BranchSelect {
        project_id: u64,
        project_name: String,
        branches: Vec<Branch>,
        target: BranchTarget,
    },
    JobAction {
        project_id: u64,
        job_id: u64,
        job_name: String,
    },
}

/// Drives navigation over the group / project / pipeline / job hierarchy.
pub struct Navigator<C> {
    client: C,
    stack: NavigationStack,
    dialog: Option<Dialog>,
    status: Option<StatusLine>,
}

impl<C: ResourceClient> Navigator<C> {
    /// Create a navigator sitting on an unloaded group list.
    pub fn new(client: C) -> Self {
        Self {
            client,
            stack: NavigationStack::default(),
            dialog: None,
            status: None,
        }
    }

    #[cfg(test)]
    pub fn client(&self) -> &C {
        &self.client
    }

    #[cfg(test)]
    pub fn stack(&self) -> &NavigationStack {
        &self.stack
    }

    pub fn current(&self) -> &View {
        self.stack.current()
    }

    pub fn dialog(&self) -> Option<&Dialog> {
        self.dialog.as_ref()
    }

    pub fn status(&self) -> Option<&StatusLine> {
        self.status.as_ref()
    }

    /// The level the user is at, counting an open branch dialog.
    pub fn kind(&self) -> ViewKind {
        match self.dialog {
            Some(Dialog::BranchSelect { .. }) => ViewKind::BranchSelect,
            _ => self.stack.current().kind(),
        }
    }

    /// Initial fetch of the unfiltered group list.
    pub async fn launch(&mut self) {
        info!("Loading group list");
        self.reload_current().await;
    }

    /// Activate a row of the current view.
    pub async fn enter(&mut self, selection: Option<NodeRef>) {
        if let Err(e) = self.try_enter(selection).await {
            self.report(e);
        }
    }

    /// Fetch groups with a new filter and make that the root, dropping deeper views.
    pub async fn replace_root(&mut self, filter: &str) {
        let params = ViewParams::GroupList {
            filter: filter.trim().to_string(),
        };
        match self.load(&params).await {
            Ok(items) => {
                debug!("Replacing root with {:?}", params);
                self.dialog = None;
                self.stack
                    .replace_root(View::loaded(params, "Groups", items));
                self.status = None;
            }
            Err(e) => self.report(e),
        }
    }

    /// Resolve an open branch dialog.
    pub async fn choose_branch(&mut self, branch: &str) {
        if let Err(e) = self.try_choose_branch(branch).await {
            self.report(e);
        }
    }

    /// Resolve an open job action dialog. The dialog closes whatever the outcome.
    pub async fn choose_job_action(&mut self, action: JobAction) {
        let (project_id, job_id, job_name) = match self.dialog.take() {
            Some(Dialog::JobAction {
                project_id,
                job_id,
                job_name,
            }) => (project_id, job_id, job_name),
            other => {
                self.dialog = other;
                self.report(GlError::Reference("no job is selected".to_string()));
                return;
            }
        };

        match action {
            JobAction::Cancel => {
                self.status = None;
            }
            JobAction::Logs => self.open_logs(project_id, job_id, job_name).await,
            JobAction::Retry => self.retry(project_id, job_id).await,
        }
    }

    /// Close an open dialog, or pop one level and refetch the revealed view.
    ///
    /// A no-op at the root.
    pub async fn back(&mut self) {
        if self.dialog.take().is_some() {
            self.status = None;
            return;
        }
        if !self.stack.can_go_back() {
            return;
        }
        self.stack.pop();
        debug!("Back to {:?}", self.stack.current().params);
        self.status = None;
        self.reload_current().await;
    }

    /// Reset to the root group list, keeping its filter, and refetch it.
    pub async fn return_to_groups(&mut self) {
        self.dialog = None;
        self.stack.reset();
        self.status = None;
        self.reload_current().await;
    }

    /// Refetch the current view.
    pub async fn refresh(&mut self) {
        if self.dialog.is_some() {
            return;
        }
        self.reload_current().await;
    }

    /// Offer a different branch for the current pipeline list.
    pub async fn switch_branch(&mut self) {
        if self.dialog.is_some() {
            return;
        }
        let ViewParams::PipelineList { project_id, .. } = self.stack.current().params else {
            self.report(GlError::Reference(
                "branches can only be switched on a pipeline list".to_string(),
            ));
            return;
        };
        let project_name = self.project_name(project_id);
        if let Err(e) = self
            .open_branch_select(project_id, project_name, BranchTarget::Replace)
            .await
        {
            self.report(e);
        }
    }

    /// Describe the current state for the renderer.
    pub fn screen(&self) -> Screen {
        let view = self.current();
        Screen {
            kind: self.kind(),
            depth: self.stack.depth(),
            title: view_title(view),
            breadcrumbs: self.stack.breadcrumbs(),
            body: view_body(view),
            dialog: self.dialog().map(dialog_view),
            status: self.status().cloned(),
            stale: view.stale,
        }
    }

    async fn try_enter(&mut self, selection: Option<NodeRef>) -> Result<()> {
        if self.dialog.is_some() {
            return Err(GlError::Reference("a dialog is open".to_string()));
        }
        let node = selection.ok_or_else(|| {
            GlError::Reference("the selected row carries no reference".to_string())
        })?;
        let params = self.stack.current().params.clone();

        match (params, node) {
            // Groups are always expanded; activating one does nothing.
            (ViewParams::GroupList { .. }, NodeRef::Group(_)) => Ok(()),
            (ViewParams::GroupList { .. }, NodeRef::Project(project_id)) => {
                let project = self
                    .stack
                    .current()
                    .find_project(project_id)
                    .ok_or_else(|| not_listed(node))?;
                let project_name = project.name.clone();
                self.open_branch_select(project_id, project_name, BranchTarget::Push)
                    .await
            }
            (
                ViewParams::PipelineList { project_id, branch },
                NodeRef::Pipeline(pipeline_id),
            ) => {
                self.stack
                    .current()
                    .find_pipeline(pipeline_id)
                    .ok_or_else(|| not_listed(node))?;
                let params = ViewParams::JobList {
                    project_id,
                    branch,
                    pipeline_id,
                };
                let items = self.load(&params).await?;
                debug!("Push {:?}", params);
                self.stack.push(View::loaded(
                    params,
                    format!("#{}", pipeline_id),
                    items,
                ));
                self.status = None;
                Ok(())
            }
            (ViewParams::JobList { project_id, .. }, NodeRef::Job(job_id)) => {
                let job = self
                    .stack
                    .current()
                    .find_job(job_id)
                    .ok_or_else(|| not_listed(node))?;
                self.dialog = Some(Dialog::JobAction {
                    project_id,
                    job_id,
                    job_name: job.name.clone(),
                });
                Ok(())
            }
            (params, node) => Err(GlError::Reference(format!(
                "{} cannot be opened from {:?}",
                node,
                params.kind()
            ))),
        }
    }

    async fn try_choose_branch(&mut self, branch: &str) -> Result<()> {
        let Some(Dialog::BranchSelect {
            project_id,
            project_name,
            branches,
            target,
        }) = self.dialog.clone()
        else {
            return Err(GlError::Reference("no branch selection is open".to_string()));
        };
        if !branches.iter().any(|b| b.name == branch) {
            return Err(GlError::Reference(format!(
                "branch {} is not offered for project {}",
                branch, project_id
            )));
        }

        let params = ViewParams::PipelineList {
            project_id,
            branch: branch.to_string(),
        };
        // On failure the dialog stays open so another branch can be picked.
        let items = self.load(&params).await?;
        let view = View::loaded(params, format!("{} @ {}", project_name, branch), items);

        debug!("{:?} {:?}", target, view.params);
        match target {
            BranchTarget::Push => self.stack.push(view),
            BranchTarget::Replace => self.stack.replace_top(view),
        };
        self.dialog = None;
        self.status = None;
        Ok(())
    }

    async fn open_branch_select(
        &mut self,
        project_id: u64,
        project_name: String,
        target: BranchTarget,
    ) -> Result<()> {
        let branches = self.client.list_branches(project_id).await?;
        debug!(
            "{} branches for project {}",
            branches.len(),
            project_id
        );
        self.dialog = Some(Dialog::BranchSelect {
            project_id,
            project_name,
            branches,
            target,
        });
        self.status = None;
        Ok(())
    }

    async fn open_logs(&mut self, project_id: u64, job_id: u64, job_name: String) {
        let params = ViewParams::JobLogs { project_id, job_id };
        match self.load(&params).await {
            Ok(items) => {
                debug!("Push {:?}", params);
                self.stack.push(View::loaded(params, job_name, items));
                self.status = None;
            }
            Err(e) => self.report(e),
        }
    }

    async fn retry(&mut self, project_id: u64, job_id: u64) {
        if let Err(e) = self.client.retry_job(project_id, job_id).await {
            warn!("Retry of job {} failed: {}", job_id, e);
            self.stack.current_mut().mark_retry_failed(job_id);
            self.status = Some(StatusLine::error(format!(
                "Retry of job {} failed: {}",
                job_id, e
            )));
            return;
        }

        info!("Retried job {} in project {}", job_id, project_id);
        let view = self.stack.current_mut();
        view.clear_retry_failed(job_id);
        view.invalidate();

        let params = view.params.clone();
        match self.load(&params).await {
            Ok(items) => {
                self.stack.current_mut().set_items(items);
                self.status = Some(StatusLine::info(format!("Job {} retried", job_id)));
            }
            Err(e) => {
                warn!("Refreshing jobs after retry failed: {}", e);
                self.status = Some(StatusLine::error(format!(
                    "Job {} retried, but refreshing jobs failed: {}",
                    job_id, e
                )));
            }
        }
    }

    /// Refetch the current view; on failure its previous items stay visible.
    async fn reload_current(&mut self) {
        let params = self.stack.current().params.clone();
        match self.load(&params).await {
            Ok(items) => {
                self.stack.current_mut().set_items(items);
            }
            Err(e) => self.report(e),
        }
    }

    /// Fetch the contents a view's params describe.
    async fn load(&self, params: &ViewParams) -> Result<ViewItems> {
        match params {
            ViewParams::GroupList { filter } => {
                let groups = filter_groups(self.client.list_groups().await?, filter);
                let mut nodes = Vec::with_capacity(groups.len());
                for group in groups {
                    let projects = self.client.list_projects(group.id).await?;
                    nodes.push(GroupNode { group, projects });
                }
                Ok(ViewItems::Groups(nodes))
            }
            ViewParams::PipelineList { project_id, branch } => {
                let pipelines = self.client.list_pipelines(*project_id, branch).await?;
                Ok(ViewItems::Pipelines(pipelines))
            }
            ViewParams::JobList {
                project_id,
                pipeline_id,
                ..
            } => {
                let jobs = self.client.list_jobs(*project_id, *pipeline_id).await?;
                Ok(ViewItems::Jobs(jobs))
            }
            ViewParams::JobLogs { project_id, job_id } => {
                let raw = self.client.fetch_job_log(*project_id, *job_id).await?;
                Ok(ViewItems::Log(clean_trace(&raw)))
            }
        }
    }

    fn project_name(&self, project_id: u64) -> String {
        self.stack
            .root()
            .find_project(project_id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| format!("project {}", project_id))
    }

    /// Surface an aborted transition; state is left as it was.
    fn report(&mut self, error: GlError) {
        if error.is_remote() {
            warn!("Fetch failed on {:?}: {}", self.kind(), error);
        } else {
            warn!("Action aborted on {:?}: {}", self.kind(), error);
        }
        self.status = Some(StatusLine::error(error.to_string()));
    }
}

fn not_listed(node: NodeRef) -> GlError {
    GlError::Reference(format!("{} is not in the current view", node))
}

fn dialog_view(dialog: &Dialog) -> DialogView {
    match dialog {
        Dialog::BranchSelect {
            project_name,
            branches,
            ..
        } => DialogView::BranchSelect {
            title: format!("Select branch of {}", project_name),
            branches: branches.iter().map(|b| b.name.clone()).collect(),
            default_index: branches.iter().position(|b| b.default),
        },
        Dialog::JobAction {
            job_id, job_name, ..
        } => DialogView::JobAction {
            title: format!("Select action for job {} ({})", job_id, job_name),
        },
    }
}
