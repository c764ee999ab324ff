//! # Build Log
//!
//! The build log records, for one build run, every generated file with the
//! module that owns it and the template it came from. It is the only
//! arbiter of output-path ownership: adding a path that is already present
//! fails with [`Error::BuildConflict`].
//!
//! The log is shared between build workers behind a `Mutex`, so insertion is
//! a single serialization point. After a successful build it is persisted
//! as XML next to the project configuration:
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <buildlog>
//!   <outpath>/home/user/project/generated</outpath>
//!   <file>
//!     <module>repo1:gpio</module>
//!     <source>gpio.hpp.in</source>
//!     <destination>src/gpio.hpp</destination>
//!   </file>
//! </buildlog>
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Suffix appended to the configuration file name for the persisted log.
pub const LOG_SUFFIX: &str = ".log";

/// One generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildLogEntry {
    /// Normalized absolute path of the file.
    pub path: PathBuf,
    /// Fully-qualified name of the owning module.
    pub module: String,
    /// Template or source identifier.
    pub template: String,
}

/// Ledger of the files produced by one build run.
#[derive(Debug, Default)]
pub struct BuildLog {
    outpath: PathBuf,
    entries: Mutex<BTreeMap<PathBuf, BuildLogEntry>>,
}

impl BuildLog {
    pub fn new(outpath: impl Into<PathBuf>) -> Self {
        Self {
            outpath: outpath.into(),
            entries: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn outpath(&self) -> &Path {
        &self.outpath
    }

    /// Record a file, failing if another entry already owns its path.
    pub fn add(&self, entry: BuildLogEntry) -> Result<()> {
        let mut entries = self.entries.lock().map_err(|_| Error::LockPoisoned {
            context: "build log".to_string(),
        })?;
        if let Some(existing) = entries.get(&entry.path) {
            return Err(Error::BuildConflict {
                path: entry.path,
                first: existing.module.clone(),
                second: entry.module,
            });
        }
        entries.insert(entry.path.clone(), entry);
        Ok(())
    }

    /// Entries sorted by path.
    pub fn entries(&self) -> Result<Vec<BuildLogEntry>> {
        let entries = self.entries.lock().map_err(|_| Error::LockPoisoned {
            context: "build log".to_string(),
        })?;
        Ok(entries.values().cloned().collect())
    }

    /// Entries owned by `module`.
    pub fn files_of(&self, module: &str) -> Result<Vec<BuildLogEntry>> {
        Ok(self
            .entries()?
            .into_iter()
            .filter(|entry| entry.module == module)
            .collect())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn to_xml(&self) -> Result<String> {
        let files = self
            .entries()?
            .into_iter()
            .map(|entry| XmlFile {
                destination: entry
                    .path
                    .strip_prefix(&self.outpath)
                    .unwrap_or(&entry.path)
                    .to_string_lossy()
                    .into_owned(),
                module: entry.module,
                source: entry.template,
            })
            .collect();
        let document = XmlBuildLog {
            outpath: self.outpath.to_string_lossy().into_owned(),
            files,
        };

        let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        let mut serializer = quick_xml::se::Serializer::new(&mut xml);
        serializer.indent(' ', 2);
        document
            .serialize(serializer)
            .map_err(|e| Error::Serialization {
                message: format!("cannot serialize build log: {}", e),
            })?;
        xml.push('\n');
        Ok(xml)
    }

    pub fn from_xml(xml: &str) -> Result<Self> {
        let document: XmlBuildLog =
            quick_xml::de::from_str(xml).map_err(|e| Error::Serialization {
                message: format!("cannot read build log: {}", e),
            })?;
        let log = BuildLog::new(&document.outpath);
        for file in document.files {
            log.add(BuildLogEntry {
                path: log.outpath.join(&file.destination),
                module: file.module,
                template: file.source,
            })?;
        }
        Ok(log)
    }

    /// Persist the log as XML at `path`.
    pub fn write(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_xml()?)?;
        Ok(())
    }

    pub fn read(path: &Path) -> Result<Self> {
        Self::from_xml(&fs::read_to_string(path)?)
    }
}

/// Path of the persisted log for a configuration file.
pub fn log_path(config: &Path) -> PathBuf {
    let mut name = config.as_os_str().to_owned();
    name.push(LOG_SUFFIX);
    PathBuf::from(name)
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename = "buildlog")]
struct XmlBuildLog {
    outpath: String,
    #[serde(rename = "file", default)]
    files: Vec<XmlFile>,
}

#[derive(Debug, Serialize, Deserialize)]
struct XmlFile {
    module: String,
    source: String,
    destination: String,
}
