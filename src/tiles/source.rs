use rand::Rng;

use crate::core::geo::TileKey;
use crate::core::projection::{tile_to_quadkey, TileAlgorithm};

/// A remote tile provider: URL template, optional subdomain pool, and the
/// tile-mapping algorithm the provider uses.
///
/// Template placeholders: `{x}` `{y}` `{z}` for slippy-map paths, `{q}` for
/// Bing-style quadkeys, and `{s}` for a subdomain picked uniformly at random
/// per request (load distribution only; replaced by the empty string when no
/// subdomains are configured).
#[derive(Debug, Clone, PartialEq)]
pub struct TileSource {
    url_template: String,
    subdomains: Vec<String>,
    algorithm: TileAlgorithm,
}

impl TileSource {
    pub fn new(
        url_template: impl Into<String>,
        subdomains: Vec<String>,
        algorithm: TileAlgorithm,
    ) -> Self {
        Self {
            url_template: url_template.into(),
            subdomains,
            algorithm,
        }
    }

    /// The default OpenStreetMap tile server.
    pub fn openstreetmap() -> Self {
        Self::new(
            "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
            vec!["a".into(), "b".into(), "c".into()],
            TileAlgorithm::Standard,
        )
    }

    pub fn algorithm(&self) -> TileAlgorithm {
        self.algorithm
    }

    pub fn url_template(&self) -> &str {
        &self.url_template
    }

    /// Build the request URL for `key`.
    pub fn url(&self, key: TileKey) -> String {
        let mut url = if self.url_template.contains("{q}") {
            self.url_template
                .replace("{q}", &tile_to_quadkey(key))
        } else {
            self.url_template
                .replace("{x}", &key.x.to_string())
                .replace("{y}", &key.y.to_string())
                .replace("{z}", &key.z.to_string())
        };

        if url.contains("{s}") {
            let subdomain = if self.subdomains.is_empty() {
                ""
            } else {
                let idx = rand::rng().random_range(0..self.subdomains.len());
                self.subdomains[idx].as_str()
            };
            url = url.replace("{s}", subdomain);
        }

        url
    }
}
