//! Description of what an installation does
//!
//! Plans are usually loaded from JSON:
//!
//! ```
//! use ja2_install::plan::InstallationPlan;
//!
//! let plan = InstallationPlan::from_json(r#"{
//!     "unpack": ["Maps"],
//!     "extract": [{ "resource": "b_map.sti" }],
//!     "convert": [{ "source": "Interface/b_map.sti" }]
//! }"#)?;
//!
//! assert_eq!(plan.convert[0].colors, 8);
//! assert_eq!(plan.required_archives().len(), 1);
//! # Ok::<(), ja2_install::error::Error>(())
//! ```

use bon::Builder;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Everything an installation run unpacks, extracts, deletes, converts and swaps
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[serde(default)]
pub struct InstallationPlan {
    /// Archives copied as a whole into a directory of the same name
    #[builder(default)]
    pub unpack: Vec<String>,

    /// Single resources to copy out of an archive
    #[builder(default)]
    pub extract: Vec<ExtractRequest>,

    /// Files below the destination removed after extraction
    #[builder(default)]
    pub delete: Vec<String>,

    /// Images converted to an indexed format next to the original
    #[builder(default)]
    pub convert: Vec<ConvertRequest>,

    /// Alternate files moved over their canonical counterpart
    #[builder(default)]
    pub replace: Vec<ReplaceRequest>,
}

impl InstallationPlan {
    /// Parse a plan from JSON, omitted lists are empty
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Archives that have to be present before anything is installed, in plan order
    ///
    /// Archives only reachable through discovery are not included.
    pub fn required_archives(&self) -> IndexSet<&str> {
        self.unpack
            .iter()
            .map(String::as_str)
            .chain(self.extract.iter().filter_map(|r| r.archive.as_deref()))
            .collect()
    }
}

/// A resource copied out of a single archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
pub struct ExtractRequest {
    /// Archive holding the resource, every archive in the source is searched when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub archive: Option<String>,

    /// Name of the resource inside the archive
    #[builder(into)]
    pub resource: String,
}

/// An STI image converted to PCX
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
pub struct ConvertRequest {
    /// Image below the destination
    #[builder(into)]
    pub source: String,

    /// Extension of the written file
    #[serde(default = "default_extension")]
    #[builder(into, default = default_extension())]
    pub extension: String,

    /// Palette size of the written file
    #[serde(default = "default_colors")]
    #[builder(default = default_colors())]
    pub colors: usize,
}

fn default_extension() -> String {
    "pcx".to_owned()
}

fn default_colors() -> usize {
    ja2_sti::quantize::DEFAULT_PALETTE_SIZE
}

/// An alternate file that takes the place of a canonical one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
pub struct ReplaceRequest {
    /// Alternate file below the destination, moved away by the swap
    #[builder(into)]
    pub from: String,

    /// Canonical file below the destination
    #[builder(into)]
    pub to: String,

    /// Hex MD5 of the alternate content, used to recognise a swap applied by an earlier run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub md5: Option<String>,
}
