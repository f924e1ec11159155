//! Reconciliation between the local tracker and one provider.
//!
//! Each direction asks a single question per issue: did this side change
//! since its own last recorded sync? There is no merge. When both sides
//! changed, whichever of [`SyncEngine::pull`] and [`SyncEngine::push`] runs
//! last overwrites the other.
//!
//! Every pass loads the provider's state once, updates entries as issues
//! succeed, and saves once at the end. Per-issue failures are collected in
//! [`SyncResult::errors`] and the pass moves on.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::context::ServiceContext;
use crate::error::SyncError;
use crate::model::{LocalIssue, RemoteIssue, Status, SyncResult};
use crate::ports::{IssueChanges, NewLocalIssue};
use crate::sync::mapper::Mapper;
use crate::sync::provider::Provider;
use crate::sync::state::{load_state, save_state, SyncState, SyncStateEntry};

/// Runs sync passes for one provider in one project.
pub struct SyncEngine<'a> {
    ctx: &'a ServiceContext,
    provider: &'a dyn Provider,
    mapper: &'a dyn Mapper,
    work_dir: &'a Path,
    state_dir: PathBuf,
}

impl<'a> SyncEngine<'a> {
    /// Creates an engine. `state_dir` holds the `<provider>-sync.json` files.
    #[must_use]
    pub fn new(
        ctx: &'a ServiceContext,
        provider: &'a dyn Provider,
        mapper: &'a dyn Mapper,
        work_dir: &'a Path,
        state_dir: impl Into<PathBuf>,
    ) -> Self {
        Self { ctx, provider, mapper, work_dir, state_dir: state_dir.into() }
    }

    /// Brings remote changes into the local tracker.
    ///
    /// # Errors
    ///
    /// Fails without touching state if the state cannot be loaded or the
    /// remote cannot be listed. Returns [`SyncError::Persist`] with the
    /// pass's counters if the final save fails.
    pub async fn pull(&self) -> Result<SyncResult, SyncError> {
        let mut state = self.load()?;
        let remote = self.provider.list(self.work_dir).await?;
        debug!(provider = self.provider.id(), count = remote.len(), "pulling");

        let mut result = SyncResult::default();
        for ext in &remote {
            match self.pull_issue(ext, &mut state, &mut result) {
                Ok(true) => result.pulled += 1,
                Ok(false) => {}
                Err(err) => {
                    warn!(
                        provider = self.provider.id(),
                        external_id = %ext.id,
                        error = %err,
                        "pull failed"
                    );
                    result.errors.push(format!("{}: {err}", ext.id));
                }
            }
        }
        self.finish(&state, result)
    }

    /// Sends local changes to the provider.
    ///
    /// # Errors
    ///
    /// Fails without touching state if the state cannot be loaded or the
    /// local tracker cannot be listed. Returns [`SyncError::Persist`] with
    /// the pass's counters if the final save fails.
    pub async fn push(&self) -> Result<SyncResult, SyncError> {
        let mut state = self.load()?;
        let issues = self
            .ctx
            .tracker
            .list(self.work_dir)
            .map_err(|source| SyncError::Tracker { operation: "list", source })?;
        debug!(provider = self.provider.id(), count = issues.len(), "pushing");

        let mut result = SyncResult::default();
        for td in &issues {
            match self.push_issue(td, &mut state, &mut result).await {
                Ok(true) => result.pushed += 1,
                Ok(false) => {}
                Err(err) => {
                    warn!(
                        provider = self.provider.id(),
                        issue = %td.id,
                        error = %err,
                        "push failed"
                    );
                    result.errors.push(format!("{}: {err}", td.id));
                }
            }
        }
        self.finish(&state, result)
    }

    /// Pushes a single local issue.
    ///
    /// # Errors
    ///
    /// Unlike [`SyncEngine::push`], a failure of the primary step (show,
    /// create or update) is returned directly and no state is saved.
    /// Failures of follow-up steps end up in [`SyncResult::errors`].
    pub async fn push_one(&self, local_id: &str) -> Result<SyncResult, SyncError> {
        let mut state = self.load()?;
        let td = self
            .ctx
            .tracker
            .show(self.work_dir, local_id)
            .map_err(|source| SyncError::Tracker { operation: "show", source })?;

        let mut result = SyncResult::default();
        if self.push_issue(&td, &mut state, &mut result).await? {
            result.pushed = 1;
        }
        self.finish(&state, result)
    }

    fn load(&self) -> Result<SyncState, SyncError> {
        load_state(self.ctx.fs.as_ref(), &self.state_dir, self.provider.id())
    }

    fn finish(&self, state: &SyncState, result: SyncResult) -> Result<SyncResult, SyncError> {
        let saved = save_state(self.ctx.fs.as_ref(), &self.state_dir, self.provider.id(), state);
        if let Err(err) = saved {
            return Err(SyncError::Persist { partial: Box::new(result), source: Box::new(err) });
        }
        info!(
            provider = self.provider.id(),
            pulled = result.pulled,
            pushed = result.pushed,
            errors = result.errors.len(),
            "sync pass finished"
        );
        Ok(result)
    }

    /// Applies one remote issue locally. Returns whether anything changed.
    fn pull_issue(
        &self,
        ext: &RemoteIssue,
        state: &mut SyncState,
        result: &mut SyncResult,
    ) -> Result<bool, SyncError> {
        let sync_label = self.mapper.sync_label(&ext.id);
        let mut mapped = self.mapper.external_to_td(ext);

        if let Some((local_id, entry)) = state.find_by_external_id(&ext.id) {
            if ext.updated_at <= entry.remote_updated_at {
                return Ok(false);
            }
            let local_id = local_id.to_string();
            let local = self
                .ctx
                .tracker
                .show(self.work_dir, &local_id)
                .map_err(|source| SyncError::Tracker { operation: "show", source })?;
            // Keep markers of other providers pairing the same issue.
            for label in local.labels {
                if self.mapper.is_internal_label(&label) && !self.mapper.owns_label(&label) {
                    mapped.add_label(label);
                }
            }
            mapped.add_label(sync_label);
            self.ctx
                .tracker
                .update(self.work_dir, &local_id, &IssueChanges::overwrite_with(&mapped))
                .map_err(|source| SyncError::Tracker { operation: "update", source })?;
            debug!(
                provider = self.provider.id(),
                issue = %local_id,
                external_id = %ext.id,
                "pulled update"
            );
            self.record(state, local_id, &ext.id, ext.updated_at);
            return Ok(true);
        }

        let new_issue = NewLocalIssue {
            title: mapped.title.clone(),
            description: mapped.description.clone(),
            issue_type: mapped.issue_type.clone(),
            priority: mapped.priority.clone(),
            labels: mapped.labels.clone(),
        };
        let local_id = self
            .ctx
            .tracker
            .create(self.work_dir, &new_issue)
            .map_err(|source| SyncError::Tracker { operation: "create", source })?;

        mapped.add_label(sync_label);
        let follow_up = IssueChanges {
            status: (mapped.status != Status::Open).then_some(mapped.status),
            ..IssueChanges::labels(mapped.labels)
        };
        if let Err(source) = self.ctx.tracker.update(self.work_dir, &local_id, &follow_up) {
            let err = SyncError::Tracker { operation: "update", source };
            warn!(
                provider = self.provider.id(),
                issue = %local_id,
                error = %err,
                "could not finish pulled issue"
            );
            result.errors.push(format!("{}: {err}", ext.id));
        }
        debug!(
            provider = self.provider.id(),
            issue = %local_id,
            external_id = %ext.id,
            "pulled new issue"
        );
        self.record(state, local_id, &ext.id, ext.updated_at);
        Ok(true)
    }

    /// Applies one local issue remotely. Returns whether anything changed.
    async fn push_issue(
        &self,
        td: &LocalIssue,
        state: &mut SyncState,
        result: &mut SyncResult,
    ) -> Result<bool, SyncError> {
        let ext = self.mapper.td_to_external(td);
        let closed = self.mapper.is_closed(&ext);

        if let Some(entry) = state.find_by_td_id(&td.id) {
            if td.updated_at <= entry.local_updated_at {
                return Ok(false);
            }
            let external_id = entry.external_id.clone();
            self.provider.update(self.work_dir, &external_id, &ext).await?;
            if closed {
                self.close(td, &external_id, result).await;
            } else if let Err(err) = self.provider.reopen(self.work_dir, &external_id).await {
                // Remotes reject reopening an open issue; that is not a failure.
                debug!(
                    provider = self.provider.id(),
                    external_id = %external_id,
                    error = %err,
                    "reopen ignored"
                );
            }
            debug!(
                provider = self.provider.id(),
                issue = %td.id,
                external_id = %external_id,
                "pushed update"
            );
            let now = self.ctx.clock.now();
            self.record(state, td.id.clone(), &external_id, now);
            return Ok(true);
        }

        let external_id = self.provider.create(self.work_dir, &ext).await?;
        if closed {
            self.close(td, &external_id, result).await;
        }

        let sync_label = self.mapper.sync_label(&external_id);
        if !td.has_label(&sync_label) {
            let mut labels = td.labels.clone();
            labels.push(sync_label);
            if let Err(source) =
                self.ctx.tracker.update(self.work_dir, &td.id, &IssueChanges::labels(labels))
            {
                let err = SyncError::Tracker { operation: "update", source };
                warn!(
                    provider = self.provider.id(),
                    issue = %td.id,
                    error = %err,
                    "could not label pushed issue"
                );
                result.errors.push(format!("{}: {err}", td.id));
            }
        }
        debug!(
            provider = self.provider.id(),
            issue = %td.id,
            external_id = %external_id,
            "pushed new issue"
        );
        let now = self.ctx.clock.now();
        self.record(state, td.id.clone(), &external_id, now);
        Ok(true)
    }

    async fn close(&self, td: &LocalIssue, external_id: &str, result: &mut SyncResult) {
        if let Err(err) = self.provider.close(self.work_dir, external_id).await {
            warn!(provider = self.provider.id(), external_id, error = %err, "close failed");
            result.errors.push(format!("{}: close {external_id}: {err}", td.id));
        }
    }

    /// Stores the entry for `local_id`. The local side is stamped with the
    /// clock so the tracker's own write during this pass is not seen as a
    /// new local edit.
    fn record(
        &self,
        state: &mut SyncState,
        local_id: String,
        external_id: &str,
        remote_updated_at: DateTime<Utc>,
    ) {
        let entry = SyncStateEntry {
            external_id: external_id.to_string(),
            local_updated_at: self.ctx.clock.now(),
            remote_updated_at,
        };
        state.issues.insert(local_id, entry);
    }
}
