use log::{debug, info};

use gdman_backend::{
    ManagerError, ProgressFn, RawRelease, ReleaseApi, ReleaseSource, RemoteVersion,
};

use crate::assets::{platform_keys, select_assets};
use crate::fetch::fetch_all_releases;
use crate::store::{Database, Store};

#[derive(Debug, Clone, PartialEq)]
pub enum LatestCheck {
    UpToDate(RemoteVersion),
    UpdateAvailable {
        version: RemoteVersion,
        release: RawRelease,
    },
}

pub fn normalize(raw: &RawRelease, source: ReleaseSource) -> RemoteVersion {
    let (standard, mono) = select_assets(&raw.assets, platform_keys());
    RemoteVersion {
        name: raw.display_name().to_string(),
        tag: raw.tag_name.clone(),
        source,
        published_at: raw.published_at,
        standard,
        mono,
    }
}

/// Appends every release to the remote set. Releases sharing a name are all
/// kept.
pub fn reconcile(db: &mut Database, releases: &[RawRelease], source: ReleaseSource) -> usize {
    db.remote_versions
        .extend(releases.iter().map(|raw| normalize(raw, source)));
    debug!(
        "Reconciled {} releases, {} remote versions known",
        releases.len(),
        db.remote_versions.len()
    );
    releases.len()
}

/// Fetches the whole catalog and appends it in a single save.
pub async fn gather_releases(
    api: &dyn ReleaseApi,
    store: &Store,
    progress: &ProgressFn,
) -> Result<usize, ManagerError> {
    let releases = fetch_all_releases(api, progress).await?;
    let source = api.source();
    store
        .write(|db| Ok(reconcile(db, &releases, source)))
        .await
}

/// Compares the newest published release against the remote set by name.
/// An unknown name rebuilds the remote set from a full fetch; the set is
/// only replaced once that fetch has succeeded.
pub async fn check_latest(
    api: &dyn ReleaseApi,
    store: &Store,
    progress: &ProgressFn,
) -> Result<LatestCheck, ManagerError> {
    let release = api.latest_release(progress).await?;
    let source = api.source();
    let latest = normalize(&release, source);

    if store.read(|db| db.has_remote_named(&latest.name)).await {
        debug!("Latest release {} already known", latest.name);
        return Ok(LatestCheck::UpToDate(latest));
    }

    info!("New release {} found, rebuilding catalog", latest.name);
    let releases = fetch_all_releases(api, progress).await?;
    store
        .write(|db| {
            db.remote_versions.clear();
            reconcile(db, &releases, source);
            Ok(())
        })
        .await?;

    Ok(LatestCheck::UpdateAvailable {
        version: latest,
        release,
    })
}
