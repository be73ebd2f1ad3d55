use chrono::{DateTime, Utc};
use log::{error, info};

use gdman_backend::ManagerError;

use super::{Activation, VersionManager};
use crate::events::ManagerEvent;
use crate::reconcile::{LatestCheck, check_latest, gather_releases};
use crate::schedule::{ActivationPlan, plan_activation};

const CONNECTION_ERROR_TITLE: &str = "Github Connection Error";

impl VersionManager {
    /// Called when the engine panel becomes the active view.
    pub async fn activate(&self) -> Result<Activation, ManagerError> {
        self.activate_at(Utc::now()).await
    }

    pub async fn activate_at(&self, now: DateTime<Utc>) -> Result<Activation, ManagerError> {
        let plan = self.store.read(|db| plan_activation(db, now)).await;
        info!("Engine panel activated: {:?}", plan);

        let activation = match plan {
            ActivationPlan::FullFetch => Activation::FirstLoad {
                fetched: self.gather_releases().await?,
            },
            ActivationPlan::CheckLatest => Activation::Checked(self.check_for_updates_at(now).await?),
            ActivationPlan::Idle => Activation::Idle,
        };

        self.refresh_list().await;
        Ok(activation)
    }

    /// Fetches the full catalog and appends it to the remote set.
    pub async fn gather_releases(&self) -> Result<usize, ManagerError> {
        let _guard = self.fetch_lock.lock().await;
        let progress = self.events.progress_fn();

        gather_releases(self.api.as_ref(), &self.store, &progress)
            .await
            .inspect_err(|e| self.report_fetch_error(e))
    }

    /// Manual "check now"; also the periodic path of [`Self::activate`].
    pub async fn check_for_updates(&self) -> Result<LatestCheck, ManagerError> {
        self.check_for_updates_at(Utc::now()).await
    }

    pub async fn check_for_updates_at(
        &self,
        now: DateTime<Utc>,
    ) -> Result<LatestCheck, ManagerError> {
        let result = {
            let _guard = self.fetch_lock.lock().await;
            let progress = self.events.progress_fn();
            check_latest(self.api.as_ref(), &self.store, &progress).await
        };

        let check = result.inspect_err(|e| self.report_fetch_error(e))?;

        if let LatestCheck::UpdateAvailable { version, release } = &check {
            info!("Update available: {}", version.name);
            self.refresh_list().await;
            self.events.emit(ManagerEvent::UpdateAvailable {
                version: version.clone(),
                release: release.clone(),
            });
        }

        self.store
            .write(|db| {
                db.settings.last_check = Some(now);
                Ok(())
            })
            .await?;

        Ok(check)
    }

    fn report_fetch_error(&self, e: &ManagerError) {
        error!("Release fetch failed: {}", e);
        self.events.alert(
            CONNECTION_ERROR_TITLE,
            format!("Failed to get Release information from Github: {}", e),
        );
    }
}
