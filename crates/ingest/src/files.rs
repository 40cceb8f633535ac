use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use radiotv_repository::error::ErrorKind as RepositoryErrorKind;
use radiotv_repository::{Pid, RepositoryClient};
use url::Url;

/// File object PIDs for every file URL, in order.
///
/// Stops at the first URL that doesn't parse or has no file object, so a bad
/// record never gets as far as touching the repository.
pub(crate) async fn resolve(client: &dyn RepositoryClient, urls: &[String]) -> Result<Vec<Pid>> {
    let mut pids = Vec::with_capacity(urls.len());
    for raw in urls {
        tracing::debug!(url = %raw, "Found file URL in metadata");
        let url = Url::parse(raw).or_raise(|| ErrorKind::MalformedUrl(raw.clone()))?;
        let pid = match client.file_object_pid(&url).await {
            Ok(pid) => pid,
            Err(e) if matches!(&*e, RepositoryErrorKind::NotFound(_)) => {
                return Err(e).or_raise(|| ErrorKind::FileNotFound(raw.clone()));
            },
            Err(e) => return Err(e).or_raise(|| ErrorKind::Repository),
        };
        tracing::debug!(url = %url, %pid, "Found file object");
        pids.push(pid);
    }
    Ok(pids)
}
