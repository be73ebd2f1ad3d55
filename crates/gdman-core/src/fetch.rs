use log::{debug, info, warn};

use gdman_backend::{ManagerError, ProgressFn, RawRelease, ReleaseApi};

pub const PAGE_SIZE: usize = 30;

/// Walks the release pages in order until an empty page. Any failed page
/// aborts the whole walk; nothing fetched so far is returned.
pub async fn fetch_all_releases(
    api: &dyn ReleaseApi,
    progress: &ProgressFn,
) -> Result<Vec<RawRelease>, ManagerError> {
    let mut releases = Vec::new();
    let mut page = 1;

    loop {
        let batch = match api.releases(PAGE_SIZE, page, progress).await {
            Ok(batch) => batch,
            Err(e) => {
                warn!("Fetching release page {} failed: {}", page, e);
                return Err(e);
            }
        };

        if batch.is_empty() {
            break;
        }

        debug!("Release page {}: {} releases", page, batch.len());
        releases.extend(batch);
        page += 1;
    }

    info!(
        "Fetched {} releases from {} in {} pages",
        releases.len(),
        api.source(),
        page - 1
    );
    Ok(releases)
}
