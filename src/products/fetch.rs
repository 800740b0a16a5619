//! SP3 product retrieval from analysis center archives.
use crate::{sample::OrbitSample, time::GpsDay};

use super::{sp3, FetchError, ProductSource, ProductTier};

use flate2::read::GzDecoder;
use log::{debug, info};
use serde::Deserialize;

use std::fs;
use std::io::Read;
use std::path::PathBuf;

fn default_final_base() -> String {
    "http://navigation-office.esa.int/products/gnss-products".to_string()
}

fn default_rapid_base() -> String {
    "https://ftp.gfz-potsdam.de/GNSS/products/mgnss".to_string()
}

fn default_ultra_base() -> String {
    "http://navigation-office.esa.int/products/gnss-products".to_string()
}

fn default_cache_dir() -> PathBuf {
    std::env::temp_dir().join("gnss-orbits").join("sp3")
}

/// Product archive parametrization. Defaults point at the ESA and GFZ
/// open archives; override for site local mirrors. Archives lay
/// products out as `<base>/<gps week>/<file name>`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FetchConfig {
    /// Final tier archive base URL
    #[serde(default = "default_final_base")]
    pub final_base: String,
    /// Rapid tier archive base URL
    #[serde(default = "default_rapid_base")]
    pub rapid_base: String,
    /// Ultra rapid tier archive base URL
    #[serde(default = "default_ultra_base")]
    pub ultra_base: String,
    /// Directory keeping the raw compressed products, so each one is
    /// transferred at most once across process runs
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            final_base: default_final_base(),
            rapid_base: default_rapid_base(),
            ultra_base: default_ultra_base(),
            cache_dir: default_cache_dir(),
        }
    }
}

impl FetchConfig {
    /// Published file name for this (day, tier).
    fn filename(&self, day: GpsDay, tier: ProductTier) -> String {
        match tier {
            ProductTier::Final => format!("ESA0MGNFIN_{}0000_01D_05M_ORB.SP3.gz", day),
            ProductTier::Rapid => format!("GBM0MGXRAP_{}0000_01D_05M_ORB.SP3.gz", day),
            ProductTier::Ultra => format!("ESA0OPSULT_{}0000_02D_15M_ORB.SP3.gz", day),
        }
    }

    fn url(&self, day: GpsDay, tier: ProductTier) -> String {
        let base = match tier {
            ProductTier::Final => &self.final_base,
            ProductTier::Rapid => &self.rapid_base,
            ProductTier::Ultra => &self.ultra_base,
        };
        let (week, _) = day.gps_week();
        format!("{}/{}/{}", base, week, self.filename(day, tier))
    }
}

/// Downloads, caches and parses SP3 products: the built-in
/// [ProductSource] over public IGS analysis center archives.
pub struct Sp3Fetcher {
    cfg: FetchConfig,
    client: reqwest::blocking::Client,
}

impl Sp3Fetcher {
    pub fn new(cfg: FetchConfig) -> Self {
        Self {
            cfg,
            client: reqwest::blocking::Client::new(),
        }
    }

    /// Local copy of the raw (still compressed) product, transferring
    /// it first unless a previous run already did.
    fn raw_product(&self, day: GpsDay, tier: ProductTier) -> Result<PathBuf, FetchError> {
        fs::create_dir_all(&self.cfg.cache_dir)?;

        let local = self.cfg.cache_dir.join(self.cfg.filename(day, tier));
        if local.exists() {
            debug!("{} ({}) using cached {}", day, tier, local.display());
            return Ok(local);
        }

        let url = self.cfg.url(day, tier);
        info!("{} ({}) transferring {}", day, tier, url);

        let bytes = self
            .client
            .get(&url)
            .send()?
            .error_for_status()?
            .bytes()?;

        fs::write(&local, &bytes)?;
        Ok(local)
    }
}

impl ProductSource for Sp3Fetcher {
    fn acquire(&self, day: GpsDay, tier: ProductTier) -> Result<Vec<OrbitSample>, FetchError> {
        let path = self.raw_product(day, tier)?;
        let compressed = fs::read(&path)?;

        let mut content = String::new();
        GzDecoder::new(&compressed[..]).read_to_string(&mut content)?;

        Ok(sp3::parse(&content)?)
    }
}

#[cfg(test)]
mod test {
    use super::{FetchConfig, ProductTier};
    use crate::prelude::GpsDay;

    #[test]
    fn archive_layout() {
        let cfg = FetchConfig::default();
        let day = GpsDay::new(2020, 42).unwrap();
        assert_eq!(
            cfg.url(day, ProductTier::Final),
            "http://navigation-office.esa.int/products/gnss-products/2092/ESA0MGNFIN_20200420000_01D_05M_ORB.SP3.gz"
        );
        assert_eq!(
            cfg.url(day, ProductTier::Rapid),
            "https://ftp.gfz-potsdam.de/GNSS/products/mgnss/2092/GBM0MGXRAP_20200420000_01D_05M_ORB.SP3.gz"
        );
        assert!(cfg.url(day, ProductTier::Ultra).ends_with("_02D_15M_ORB.SP3.gz"));
    }
}
