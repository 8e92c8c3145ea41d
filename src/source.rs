use crate::error::SourceError;
use crate::model::{FishRecord, Snapshot};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::future::Future;
use std::path::PathBuf;

/// Where fish snapshots come from. One call per poll cycle.
pub trait SnapshotSource: Send + 'static {
    fn fetch(&mut self) -> impl Future<Output = Result<Vec<FishRecord>, SourceError>> + Send;
}

/// Re-reads a JSON snapshot file every cycle.
#[derive(Clone, Debug)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SnapshotSource for FileSource {
    async fn fetch(&mut self) -> Result<Vec<FishRecord>, SourceError> {
        let text = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| SourceError::Io {
                path: self.path.clone(),
                source,
            })?;
        Ok(Snapshot::parse(&text)?)
    }
}

/// GETs a JSON endpoint that answers with a snapshot envelope.
#[derive(Clone, Debug)]
pub struct HttpSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

impl SnapshotSource for HttpSource {
    async fn fetch(&mut self) -> Result<Vec<FishRecord>, SourceError> {
        let resp = self.client.get(&self.url).send().await?;
        if !resp.status().is_success() {
            return Err(SourceError::Status(resp.status()));
        }
        let snap: Snapshot = resp.json().await?;
        Ok(snap.into_records())
    }
}

const DEMO_NAMES: [&str; 16] = [
    "Nemo", "Dory", "Bubbles", "Gill", "Finnegan", "Marlin", "Goldie", "Wanda", "Squirt",
    "Bloat", "Peach", "Jacques", "Deb", "Gurgle", "Pearl", "Sheldon",
];

/// Synthetic contract: fish get adopted over time and occasionally die.
#[derive(Debug)]
pub struct DemoSource {
    rng: StdRng,
    roster: Vec<FishRecord>,
    capacity: usize,
    next_id: u64,
}

impl DemoSource {
    pub fn new(capacity: usize, initial: usize, seed: u64) -> Self {
        let mut demo = Self {
            rng: StdRng::seed_from_u64(seed),
            roster: Vec::new(),
            capacity: capacity.max(1),
            next_id: 1,
        };
        for _ in 0..initial.min(demo.capacity) {
            demo.adopt();
        }
        demo
    }

    pub fn roster(&self) -> &[FishRecord] {
        &self.roster
    }

    fn adopt(&mut self) {
        let id = self.next_id;
        self.next_id += 1;
        let base = DEMO_NAMES[self.rng.gen_range(0..DEMO_NAMES.len())];
        let name = if id as usize > DEMO_NAMES.len() {
            format!("{base} {id}")
        } else {
            base.to_string()
        };
        let mut rec = FishRecord::new(id, name, self.rng.gen_range(0..360));
        rec.age = Some(0);
        rec.seconds_since_fed = Some(0);
        self.roster.push(rec);
    }

    fn advance(&mut self) {
        for fish in &mut self.roster {
            if let Some(age) = fish.age.as_mut() {
                *age += 3;
            }
            if let Some(fed) = fish.seconds_since_fed.as_mut() {
                *fed += 3;
            }
        }

        let living = self.roster.iter().filter(|f| !f.dead).count();
        if living < self.capacity && self.rng.gen_bool(0.35) {
            self.adopt();
        }
        if living > 1 && self.rng.gen_bool(0.04) {
            let ix = self.rng.gen_range(0..self.roster.len());
            self.roster[ix].dead = true;
        }
        if !self.roster.is_empty() && self.rng.gen_bool(0.2) {
            // someone fed their fish
            let ix = self.rng.gen_range(0..self.roster.len());
            self.roster[ix].seconds_since_fed = Some(0);
        }
        // dead fish drop out of the query eventually
        if self.roster.len() > self.capacity * 2 {
            self.roster.retain(|f| !f.dead);
        }
    }
}

impl SnapshotSource for DemoSource {
    async fn fetch(&mut self) -> Result<Vec<FishRecord>, SourceError> {
        self.advance();
        Ok(self.roster.clone())
    }
}
