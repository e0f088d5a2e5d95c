use crate::error::{Error, Result};
use crate::http::{CatalogueOps, Session};
use crate::progress::ProgressHelper;
use crate::selection::FilteredRecord;
use futures_util::TryStreamExt;
use reqwest::Response;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    product_id: String,
    identifier: String,
    output: PathBuf,
}

impl DownloadTask {
    pub fn new(product_id: &str, identifier: &str, save_dir: &Path) -> Self {
        DownloadTask {
            product_id: product_id.to_string(),
            identifier: identifier.to_string(),
            output: save_dir.join(format!("{identifier}.zip")),
        }
    }

    pub fn product_id(self: &Self) -> &str {
        &self.product_id
    }

    pub fn identifier(self: &Self) -> &str {
        &self.identifier
    }

    pub fn output(self: &Self) -> &Path {
        &self.output
    }
}

/// Outcome of a download loop. Failed items are kept with their cause.
#[derive(Debug, Default)]
pub struct DownloadReport {
    pub succeeded: Vec<PathBuf>,
    pub failed: Vec<Error>,
}

impl DownloadReport {
    pub fn attempted(self: &Self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

#[derive(Debug)]
pub struct DownloadPlan {
    tasks: Vec<DownloadTask>,
}

impl DownloadPlan {
    pub fn new(tasks: Vec<DownloadTask>) -> Self {
        Self { tasks }
    }

    pub fn from_records(records: &[FilteredRecord], save_dir: &Path) -> Self {
        let tasks = records
            .iter()
            .map(|r| DownloadTask::new(r.id(), &r.identifier, save_dir))
            .collect();
        Self { tasks }
    }

    pub fn tasks(self: &Self) -> &[DownloadTask] {
        &self.tasks
    }

    /// Download every task in order. A failing task is logged and skipped, it never stops the
    /// remaining ones.
    pub async fn execute(
        self: &Self,
        provider: &impl CatalogueOps,
        session: &Session,
    ) -> DownloadReport {
        let mut report = DownloadReport::default();
        let progress = ProgressHelper::create(self.tasks.len() as u64);

        for task in self.tasks.iter() {
            progress.set_message(task.identifier.clone());
            debug!("Current task: {:?}", task);

            let result = match provider.product_url(&task.product_id) {
                Ok(url) => try_download(session, url, &task.output).await,
                Err(e) => Err(e),
            };

            match result {
                Ok(bytes) => {
                    info!(identifier = %task.identifier, bytes, "Download complete");
                    report.succeeded.push(task.output.clone());
                }
                Err(e) => {
                    warn!(identifier = %task.identifier, "Problem with server, skipping product: {e}");
                    report.failed.push(Error::Download {
                        identifier: task.identifier.clone(),
                        source: Box::new(e),
                    });
                }
            }
            progress.inc(1);
        }

        progress.finish_with_message(format!(
            "{} downloaded, {} failed",
            report.succeeded.len(),
            report.failed.len()
        ));
        report
    }
}

/// Resolve the redirect chain behind `url`, then stream the content into `output`, replacing
/// whatever was there before. Returns the number of bytes written.
///
/// Content goes to `<output>.partial` and is renamed once complete. The partial file is removed
/// when the transfer fails.
pub async fn try_download(session: &Session, url: Url, output: &Path) -> Result<u64> {
    let (location, hops) = session.resolve(url).await?;
    debug!(%location, hops, "Resolved content location");

    let response = session.fetch(location).await?;

    let partial = partial_path(output);
    let byte_count = match write_body(response, &partial).await {
        Ok(byte_count) => byte_count,
        Err(e) => {
            if let Err(cleanup) = fs::remove_file(&partial) {
                debug!(path = %partial.display(), "Unable to remove partial file: {cleanup}");
            }
            return Err(e);
        }
    };

    // Rename the file to remove .partial suffix
    fs::rename(&partial, output)?;
    Ok(byte_count)
}

fn partial_path(output: &Path) -> PathBuf {
    let mut partial = output.as_os_str().to_owned();
    partial.push(".partial");
    PathBuf::from(partial)
}

async fn write_body(response: Response, path: &Path) -> Result<u64> {
    let mut file = File::create(path)?;
    let mut byte_count = 0_u64;
    let mut stream = response.bytes_stream();
    while let Some(bytes) = stream.try_next().await? {
        file.write_all(&bytes)?;
        byte_count += bytes.len() as u64;
    }
    file.flush()?;
    Ok(byte_count)
}
