use crate::config::Config;
use crate::copernicus::{CatalogueQuery, Provider};
use crate::download_plan::{DownloadPlan, DownloadReport};
use crate::error::{Error, Result};
use crate::http::{CatalogueOps, Session};
use crate::selection::{self, FilteredRecord};
use tracing::{debug, info};

/// Progress of a run. `NoData` and `NoTiles` are terminal: the run stops there with
/// [`crate::Error::NoData`] or [`crate::Error::NoTiles`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ConfigLoaded,
    Queried,
    NoData,
    Filtered,
    NoTiles,
    Authenticated,
    Downloading,
    Done,
}

pub struct Pipeline<P> {
    config: Config,
    provider: P,
    stage: Stage,
}

impl Pipeline<Provider> {
    pub fn from_config(config: Config) -> Result<Self> {
        let provider = Provider::from_endpoints(config.endpoints.clone())?;
        Ok(Self::new(config, provider))
    }
}

impl<P: CatalogueOps> Pipeline<P> {
    pub fn new(config: Config, provider: P) -> Self {
        Self {
            config,
            provider,
            stage: Stage::ConfigLoaded,
        }
    }

    pub fn stage(self: &Self) -> Stage {
        self.stage
    }

    fn advance(self: &mut Self, stage: Stage) {
        debug!("{:?} -> {:?}", self.stage, stage);
        self.stage = stage;
    }

    /// Query the catalogue and keep the products worth downloading.
    pub async fn select(self: &mut Self) -> Result<Vec<FilteredRecord>> {
        let query = CatalogueQuery::build(
            &self.config.data_collection,
            &self.config.area,
            &self.config.period,
            &self.config.attributes,
        );
        debug!(filter = query.filter(), "Built catalogue query");

        let records = match self.provider.search(&query).await {
            Ok(records) => records,
            Err(Error::NoData) => {
                self.advance(Stage::NoData);
                return Err(Error::NoData);
            }
            Err(e) => return Err(e),
        };
        self.advance(Stage::Queried);

        let selected = match selection::filter_records(records) {
            Ok(selected) => selected,
            Err(Error::NoTiles) => {
                self.advance(Stage::NoTiles);
                return Err(Error::NoTiles);
            }
            Err(e) => return Err(e),
        };
        self.advance(Stage::Filtered);
        Ok(selected)
    }

    /// Query, filter, authenticate once, then download every selected product.
    pub async fn run(self: &mut Self) -> Result<DownloadReport> {
        let selected = self.select().await?;

        let token = self.provider.get_token(&self.config.user).await?;
        self.advance(Stage::Authenticated);

        self.config.ensure_save_dir()?;
        let session = Session::with_bearer(&token)?;
        let plan = DownloadPlan::from_records(&selected, &self.config.save_dir);

        self.advance(Stage::Downloading);
        info!(
            "Downloading {} products to {}",
            plan.tasks().len(),
            self.config.save_dir.display()
        );
        let report = plan.execute(&self.provider, &session).await;
        self.advance(Stage::Done);

        info!(
            "Finished: {} of {} products downloaded",
            report.succeeded.len(),
            report.attempted()
        );
        Ok(report)
    }
}
