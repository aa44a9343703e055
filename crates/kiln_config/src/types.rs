//! Configuration types deserialized from `kiln.toml`.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// The top-level site configuration parsed from `kiln.toml`.
#[derive(Debug, Deserialize)]
pub struct SiteConfig {
    /// Core site settings.
    pub site: SiteMeta,
    /// Listing pages generated from groups of pages.
    #[serde(default)]
    pub listings: Vec<ListingConfig>,
}

/// Core site settings required in every `kiln.toml`.
#[derive(Debug, Deserialize)]
pub struct SiteMeta {
    /// The site name, available to templates as `$site$`.
    pub name: String,
    /// Directory holding page files, relative to the project root.
    #[serde(default = "default_source")]
    pub source: String,
    /// Template chain applied to every page.
    #[serde(default, deserialize_with = "deserialize_string_or_vec")]
    pub templates: Vec<String>,
    /// Directory holding cached build results.
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,
    /// Directory receiving rendered output.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

/// A page that lists a group of other pages.
#[derive(Debug, Deserialize)]
pub struct ListingConfig {
    /// Output URL of the listing, e.g. `"index.html"`.
    pub url: String,
    /// Subdirectory of the source directory whose pages are listed.
    /// Empty lists every page.
    #[serde(default)]
    pub pages: String,
    /// Template chain each listed page is rendered with.
    #[serde(default, deserialize_with = "deserialize_string_or_vec")]
    pub item_templates: Vec<String>,
    /// Template chain applied to the finished listing.
    #[serde(default, deserialize_with = "deserialize_string_or_vec")]
    pub templates: Vec<String>,
    /// Order of listed pages by source path.
    #[serde(default)]
    pub order: SortOrder,
    /// Extra literal fields set on the listing.
    #[serde(default)]
    pub fields: BTreeMap<String, String>,
}

/// Order in which a listing presents its pages.
#[derive(Debug, Default, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Ascending by source path (default).
    #[default]
    Ascending,
    /// Descending by source path.
    Descending,
}

fn default_source() -> String {
    "pages".to_string()
}

fn default_cache_dir() -> String {
    "_cache".to_string()
}

fn default_output_dir() -> String {
    "_site".to_string()
}

/// Deserializes a field that can be either a single string or a list of strings.
///
/// Allows `templates = "templates/default.html"` as well as
/// `templates = ["templates/post.html", "templates/default.html"]`.
fn deserialize_string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut vec = Vec::new();
            while let Some(val) = seq.next_element::<String>()? {
                vec.push(val);
            }
            Ok(vec)
        }
    }

    deserializer.deserialize_any(StringOrVec)
}
