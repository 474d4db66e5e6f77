use lazy_static::lazy_static;
use std::collections::HashMap;

/// Regions in display order. `overall` is the pipeline-wide aggregate.
pub const REGIONS: [&str; 5] = ["overall", "au", "ca", "or", "us"];

lazy_static! {
    pub static ref STATUS_URLS: HashMap<&'static str, &'static str> = HashMap::from([
        ("overall", "https://content.fcsuite.com/deploy/deploy"),
        ("au", "https://content.fcsuite.com/deploy/deploy-au"),
        ("ca", "https://content.fcsuite.com/deploy/deploy-ca"),
        ("or", "https://content.fcsuite.com/deploy/deploy-or"),
        ("us", "https://content.fcsuite.com/deploy/deploy-us"),
    ]);
}

pub fn url_for(region: &str) -> Option<&'static str> {
    STATUS_URLS.get(region).copied()
}
