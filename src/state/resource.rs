// Resource access seam used by the navigator.
// Every call is an explicit suspension point, awaited in place by one transition.

use crate::error::Result;
use crate::gitlab::{Branch, GitLabClient, Group, Job, Pipeline, Project};

/// Remote listings and the retry mutation the navigator depends on.
///
/// Listings return every item; implementations exhaust pagination.
#[allow(async_fn_in_trait)]
pub trait ResourceClient {
    async fn list_groups(&self) -> Result<Vec<Group>>;

    async fn list_projects(&self, group_id: u64) -> Result<Vec<Project>>;

    async fn list_branches(&self, project_id: u64) -> Result<Vec<Branch>>;

    async fn list_pipelines(&self, project_id: u64, branch: &str) -> Result<Vec<Pipeline>>;

    async fn list_jobs(&self, project_id: u64, pipeline_id: u64) -> Result<Vec<Job>>;

    /// Raw job trace bytes.
    async fn fetch_job_log(&self, project_id: u64, job_id: u64) -> Result<Vec<u8>>;

    async fn retry_job(&self, project_id: u64, job_id: u64) -> Result<()>;
}

impl ResourceClient for GitLabClient {
    async fn list_groups(&self) -> Result<Vec<Group>> {
        self.get_groups().await
    }

    async fn list_projects(&self, group_id: u64) -> Result<Vec<Project>> {
        self.get_group_projects(group_id).await
    }

    async fn list_branches(&self, project_id: u64) -> Result<Vec<Branch>> {
        self.get_branches(project_id).await
    }

    async fn list_pipelines(&self, project_id: u64, branch: &str) -> Result<Vec<Pipeline>> {
        self.get_pipelines(project_id, branch).await
    }

    async fn list_jobs(&self, project_id: u64, pipeline_id: u64) -> Result<Vec<Job>> {
        self.get_pipeline_jobs(project_id, pipeline_id).await
    }

    async fn fetch_job_log(&self, project_id: u64, job_id: u64) -> Result<Vec<u8>> {
        self.get_job_trace(project_id, job_id).await
    }

    async fn retry_job(&self, project_id: u64, job_id: u64) -> Result<()> {
        GitLabClient::retry_job(self, project_id, job_id).await
    }
}
