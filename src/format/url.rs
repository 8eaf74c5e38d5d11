//! Map URL formatter

use crate::config::Config;
use crate::error::Result;
use crate::format::OutputFormatter;
use crate::session::AnalysisReport;

/// URL formatter - outputs a map link to the analyzed site
pub struct UrlFormatter;

impl OutputFormatter for UrlFormatter {
    fn name(&self) -> &str {
        "url"
    }

    fn description(&self) -> &str {
        "Map URL for the analyzed site"
    }

    fn format(&self, report: &AnalysisReport, config: &Config) -> Result<String> {
        config.format_url(None, report.location.lat, report.location.lng)
    }
}
