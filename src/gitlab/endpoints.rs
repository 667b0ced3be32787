// GitLab API endpoint functions.
// Typed methods for the listings and the one mutation the browser needs.

use serde::de::DeserializeOwned;

use crate::error::Result;

use super::client::{GitLabClient, map_transport_error};
use super::pagination::{PER_PAGE, Page, collect_all_pages};
use super::types::{Branch, Group, Job, Pipeline, Project};

impl GitLabClient {
    /// Fetch one page of a JSON list endpoint.
    async fn get_page<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        extra: &[(&str, &str)],
        page: u32,
    ) -> Result<Page<T>> {
        let page_param = page.to_string();
        let per_page = PER_PAGE.to_string();
        let mut params: Vec<(&str, &str)> =
            vec![("page", page_param.as_str()), ("per_page", per_page.as_str())];
        params.extend_from_slice(extra);

        let response = self.get_with_params(endpoint, &params).await?;
        let headers = response.headers().clone();
        let body = response.text().await.map_err(map_transport_error)?;
        let items: Vec<T> = serde_json::from_str(&body)?;
        Ok(Page::from_headers(items, &headers, page))
    }

    /// Fetch every page of a JSON list endpoint.
    async fn get_all<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        extra: &[(&str, &str)],
    ) -> Result<Vec<T>> {
        collect_all_pages(|page| self.get_page(endpoint, extra, page)).await
    }

    /// Get all groups visible to the token.
    pub async fn get_groups(&self) -> Result<Vec<Group>> {
        self.get_all("/groups", &[]).await
    }

    /// Get projects belonging to a group.
    pub async fn get_group_projects(&self, group_id: u64) -> Result<Vec<Project>> {
        self.get_all(&format!("/groups/{}/projects", group_id), &[])
            .await
    }

    /// Get repository branches for a project.
    pub async fn get_branches(&self, project_id: u64) -> Result<Vec<Branch>> {
        self.get_all(&format!("/projects/{}/repository/branches", project_id), &[])
            .await
    }

    /// Get pipelines for a project, restricted to one ref.
    pub async fn get_pipelines(&self, project_id: u64, branch: &str) -> Result<Vec<Pipeline>> {
        self.get_all(
            &format!("/projects/{}/pipelines", project_id),
            &[("ref", branch)],
        )
        .await
    }

    /// Get jobs for a pipeline.
    pub async fn get_pipeline_jobs(&self, project_id: u64, pipeline_id: u64) -> Result<Vec<Job>> {
        self.get_all(
            &format!("/projects/{}/pipelines/{}/jobs", project_id, pipeline_id),
            &[],
        )
        .await
    }

    /// Get the raw trace (log) of a job.
    pub async fn get_job_trace(&self, project_id: u64, job_id: u64) -> Result<Vec<u8>> {
        let response = self
            .get(&format!("/projects/{}/jobs/{}/trace", project_id, job_id))
            .await?;
        let bytes = response.bytes().await.map_err(map_transport_error)?;
        Ok(bytes.to_vec())
    }

    /// Retry a job. The returned new job is not needed by callers.
    pub async fn retry_job(&self, project_id: u64, job_id: u64) -> Result<()> {
        self.post(&format!("/projects/{}/jobs/{}/retry", project_id, job_id))
            .await?;
        Ok(())
    }
}
