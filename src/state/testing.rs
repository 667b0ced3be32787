// In-memory resource client for navigator tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use chrono::{TimeZone, Utc};

use crate::error::{GlError, Result};
use crate::gitlab::{Branch, Group, Job, Pipeline, Project, Status};

use super::resource::ResourceClient;

#[derive(Default)]
pub struct FakeClient {
    groups: Vec<Group>,
    projects: HashMap<u64, Vec<Project>>,
    branches: HashMap<u64, Vec<Branch>>,
    pipelines: HashMap<(u64, String), Vec<Pipeline>>,
    jobs: RefCell<HashMap<(u64, u64), Vec<Job>>>,
    logs: HashMap<(u64, u64), Vec<u8>>,

    fail_groups: Cell<bool>,
    fail_projects: Cell<bool>,
    fail_branches: Cell<bool>,
    fail_pipelines: Cell<bool>,
    fail_jobs: Cell<bool>,
    fail_logs: Cell<bool>,
    fail_retry: Cell<bool>,

    group_calls: Cell<usize>,
    project_calls: RefCell<Vec<u64>>,
    branch_calls: Cell<usize>,
    pipeline_calls: Cell<usize>,
    job_calls: Cell<usize>,
    retried: RefCell<Vec<(u64, u64)>>,
}

fn network_down() -> GlError {
    GlError::Http {
        status: 503,
        message: "network unreachable".to_string(),
    }
}

fn pipeline(id: u64, status: Status, branch: &str) -> Pipeline {
    Pipeline {
        id,
        status,
        ref_name: branch.to_string(),
        source: Some("push".to_string()),
        updated_at: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).single(),
    }
}

fn job(id: u64, name: &str, stage: &str, status: Status) -> Job {
    Job {
        id,
        name: name.to_string(),
        stage: stage.to_string(),
        status,
        duration: Some(42.0),
    }
}

impl FakeClient {
    /// Two groups (Alpha with project 42 "api", beta with project 43 "web").
    /// Project 42 has branches develop and main (default); pipeline 7 on main
    /// holds failed job 99 "test" and succeeded job 98 "build".
    pub fn sample() -> Self {
        let mut fake = FakeClient {
            groups: vec![
                Group {
                    id: 1,
                    name: "Alpha".to_string(),
                },
                Group {
                    id: 2,
                    name: "beta".to_string(),
                },
            ],
            ..Default::default()
        };
        fake.projects.insert(
            1,
            vec![Project {
                id: 42,
                name: "api".to_string(),
            }],
        );
        fake.projects.insert(
            2,
            vec![Project {
                id: 43,
                name: "web".to_string(),
            }],
        );
        fake.branches.insert(
            42,
            vec![
                Branch {
                    name: "develop".to_string(),
                    default: false,
                },
                Branch {
                    name: "main".to_string(),
                    default: true,
                },
            ],
        );
        fake.pipelines.insert(
            (42, "main".to_string()),
            vec![
                pipeline(7, Status::Failed, "main"),
                pipeline(6, Status::Success, "main"),
                pipeline(5, Status::Success, "main"),
            ],
        );
        fake.pipelines.insert(
            (42, "develop".to_string()),
            vec![pipeline(8, Status::Running, "develop")],
        );
        fake.jobs.get_mut().insert(
            (42, 7),
            vec![
                job(99, "test", "test", Status::Failed),
                job(98, "build", "build", Status::Success),
            ],
        );
        fake.logs.insert(
            (42, 99),
            b"\x1b[32;1m$ make test\x1b[0;m\nFAIL\n".to_vec(),
        );
        fake
    }

    pub fn fail_groups(&self, fail: bool) {
        self.fail_groups.set(fail);
    }

    pub fn fail_projects(&self, fail: bool) {
        self.fail_projects.set(fail);
    }

    pub fn fail_branches(&self, fail: bool) {
        self.fail_branches.set(fail);
    }

    pub fn fail_pipelines(&self, fail: bool) {
        self.fail_pipelines.set(fail);
    }

    pub fn fail_jobs(&self, fail: bool) {
        self.fail_jobs.set(fail);
    }

    pub fn fail_logs(&self, fail: bool) {
        self.fail_logs.set(fail);
    }

    pub fn fail_retry(&self, fail: bool) {
        self.fail_retry.set(fail);
    }

    pub fn group_calls(&self) -> usize {
        self.group_calls.get()
    }

    /// Group ids whose projects were listed, in call order.
    pub fn project_calls(&self) -> Vec<u64> {
        self.project_calls.borrow().clone()
    }

    pub fn branch_calls(&self) -> usize {
        self.branch_calls.get()
    }

    pub fn pipeline_calls(&self) -> usize {
        self.pipeline_calls.get()
    }

    pub fn job_calls(&self) -> usize {
        self.job_calls.get()
    }

    pub fn retried(&self) -> Vec<(u64, u64)> {
        self.retried.borrow().clone()
    }
}

impl ResourceClient for FakeClient {
    async fn list_groups(&self) -> Result<Vec<Group>> {
        self.group_calls.set(self.group_calls.get() + 1);
        if self.fail_groups.get() {
            return Err(network_down());
        }
        Ok(self.groups.clone())
    }

    async fn list_projects(&self, group_id: u64) -> Result<Vec<Project>> {
        self.project_calls.borrow_mut().push(group_id);
        if self.fail_projects.get() {
            return Err(network_down());
        }
        Ok(self.projects.get(&group_id).cloned().unwrap_or_default())
    }

    async fn list_branches(&self, project_id: u64) -> Result<Vec<Branch>> {
        self.branch_calls.set(self.branch_calls.get() + 1);
        if self.fail_branches.get() {
            return Err(network_down());
        }
        self.branches
            .get(&project_id)
            .cloned()
            .ok_or_else(|| GlError::NotFound(format!("project {}", project_id)))
    }

    async fn list_pipelines(&self, project_id: u64, branch: &str) -> Result<Vec<Pipeline>> {
        self.pipeline_calls.set(self.pipeline_calls.get() + 1);
        if self.fail_pipelines.get() {
            return Err(network_down());
        }
        Ok(self
            .pipelines
            .get(&(project_id, branch.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn list_jobs(&self, project_id: u64, pipeline_id: u64) -> Result<Vec<Job>> {
        self.job_calls.set(self.job_calls.get() + 1);
        if self.fail_jobs.get() {
            return Err(network_down());
        }
        Ok(self
            .jobs
            .borrow()
            .get(&(project_id, pipeline_id))
            .cloned()
            .unwrap_or_default())
    }

    async fn fetch_job_log(&self, project_id: u64, job_id: u64) -> Result<Vec<u8>> {
        if self.fail_logs.get() {
            return Err(GlError::Timeout);
        }
        self.logs
            .get(&(project_id, job_id))
            .cloned()
            .ok_or_else(|| GlError::NotFound(format!("trace of job {}", job_id)))
    }

    /// A successful retry puts the job back in the pending state.
    async fn retry_job(&self, project_id: u64, job_id: u64) -> Result<()> {
        if self.fail_retry.get() {
            return Err(GlError::Http {
                status: 403,
                message: "403 Forbidden".to_string(),
            });
        }
        self.retried.borrow_mut().push((project_id, job_id));
        for jobs in self.jobs.borrow_mut().values_mut() {
            if let Some(job) = jobs.iter_mut().find(|j| j.id == job_id) {
                job.status = Status::Pending;
                job.duration = None;
            }
        }
        Ok(())
    }
}
