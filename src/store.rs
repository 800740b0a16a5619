//! Two level orbit model storage: in-memory day cache + per day records.
use crate::{error::Error, fit::SvWindows, time::GpsDay};

use log::warn;
use serde::{Deserialize, Serialize};

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use gnss::prelude::SV;

/// One calendar day orbit model: per vehicle ordered window maps.
/// Once built, a day is immutable history for the process lifetime.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayOrbits {
    /// Window maps per vehicle, each ordered by ascending midpoint
    pub satellites: BTreeMap<SV, SvWindows>,
}

impl DayOrbits {
    /// True if no vehicle could be fit on this day.
    pub fn is_empty(&self) -> bool {
        self.satellites.is_empty()
    }

    /// Iterates the vehicles tracked on this day, in [SV] order.
    pub fn sv(&self) -> impl Iterator<Item = SV> + '_ {
        self.satellites.keys().copied()
    }

    /// Window map of one vehicle.
    pub fn windows(&self, sv: SV) -> Option<&SvWindows> {
        self.satellites.get(&sv)
    }

    /// Total number of windows on this day, all vehicles.
    pub fn nb_windows(&self) -> usize {
        self.satellites.values().map(|w| w.len()).sum()
    }
}

/// Durable form of [DayOrbits]: vehicles keyed by their "G01" style
/// name, so the record is self describing JSON.
#[derive(Serialize, Deserialize)]
struct DayRecord {
    satellites: BTreeMap<String, SvWindows>,
}

impl From<&DayOrbits> for DayRecord {
    fn from(model: &DayOrbits) -> Self {
        Self {
            satellites: model
                .satellites
                .iter()
                .map(|(sv, windows)| (sv.to_string(), windows.clone()))
                .collect(),
        }
    }
}

impl DayRecord {
    fn into_model(self) -> Result<DayOrbits, Error> {
        let mut satellites = BTreeMap::new();
        for (name, windows) in self.satellites {
            let sv = SV::from_str(&name).or(Err(Error::RecordSv(name)))?;
            satellites.insert(sv, windows);
        }
        Ok(DayOrbits { satellites })
    }
}

/// Orbit model store: a lazily populated, never evicted in-memory day
/// cache, backed by one JSON record per built day so models survive
/// process runs. Records are written once at creation and read only
/// afterwards.
pub struct OrbitStore {
    /// Record directory
    storage_dir: PathBuf,
    /// In-memory models
    days: HashMap<GpsDay, DayOrbits>,
}

impl OrbitStore {
    /// Opens (creating if needed) a store over `storage_dir`.
    pub fn new<P: AsRef<Path>>(storage_dir: P) -> Result<Self, Error> {
        let storage_dir = storage_dir.as_ref().to_path_buf();
        fs::create_dir_all(&storage_dir)?;
        Ok(Self {
            storage_dir,
            days: HashMap::new(),
        })
    }

    /// In-memory model for this day, if any.
    pub fn get(&self, day: GpsDay) -> Option<&DayOrbits> {
        self.days.get(&day)
    }

    /// True if this day is already in memory (possibly as an empty
    /// model, when it could not be built).
    pub fn contains(&self, day: GpsDay) -> bool {
        self.days.contains_key(&day)
    }

    /// Places a day model in memory.
    pub fn insert(&mut self, day: GpsDay, model: DayOrbits) {
        self.days.insert(day, model);
    }

    /// Days with a durable record, from file names only: no record
    /// content is loaded. A scan failure degrades to "nothing
    /// persisted", which only costs a rebuild.
    pub fn persisted_days(&self) -> HashSet<GpsDay> {
        let entries = match fs::read_dir(&self.storage_dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("cannot scan {}: {}", self.storage_dir.display(), e);
                return HashSet::new();
            },
        };
        entries
            .filter_map(|entry| {
                let name = entry.ok()?.file_name().into_string().ok()?;
                let day = name.strip_prefix("orbits_")?.strip_suffix(".json")?;
                GpsDay::from_str(day).ok()
            })
            .collect()
    }

    /// Writes the full model for one day as a single record.
    pub fn persist(&self, day: GpsDay, model: &DayOrbits) -> Result<(), Error> {
        let record = DayRecord::from(model);
        let contents = serde_json::to_string_pretty(&record)?;
        fs::write(self.record_path(day), contents)?;
        Ok(())
    }

    /// Reads one day model back from its record. A missing record is a
    /// normal outcome: the day has never been built.
    pub fn load_persisted(&self, day: GpsDay) -> Result<Option<DayOrbits>, Error> {
        let path = self.record_path(day);
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(path)?;
        let record: DayRecord = serde_json::from_str(&contents)?;
        Ok(Some(record.into_model()?))
    }

    fn record_path(&self, day: GpsDay) -> PathBuf {
        self.storage_dir.join(format!("orbits_{}.json", day))
    }
}
