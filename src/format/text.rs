//! Human-readable text output formatter

use crate::config::Config;
use crate::error::Result;
use crate::features::Category;
use crate::format::OutputFormatter;
use crate::session::AnalysisReport;

/// Text formatter - outputs human-readable summary
pub struct TextFormatter;

impl OutputFormatter for TextFormatter {
    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "Human-readable text"
    }

    fn format(&self, report: &AnalysisReport, config: &Config) -> Result<String> {
        let mut output = String::new();
        let forecast = &report.forecast;

        // Header
        output.push_str(&format!("Analysis: {}\n", report.persona.label()));
        output.push_str(&format!("Coords: {}\n", report.location));
        output.push_str(&format!("Radius: {}m\n", report.radius));
        if let Ok(url) = config.format_url(None, report.location.lat, report.location.lng) {
            output.push_str(&format!("Map: {}\n", url));
        }
        output.push('\n');

        output.push_str("Features:\n");
        for category in Category::ALL {
            let label = format!("{}:", capitalize(&category.to_string()));
            output.push_str(&format!(
                "  {:<12} {:<4} ({})\n",
                label,
                report.counts.get(category),
                report.persona.impact(category)
            ));
        }
        output.push('\n');

        output.push_str(&format!(
            "Est. Monthly Sales: {}\n",
            format_money(forecast.predicted_revenue)
        ));
        output.push_str(&format!(
            "Verdict: {} - {}\n",
            forecast.verdict,
            forecast.verdict.summary(report.counts.drivers)
        ));

        if !report.advisories.is_empty() {
            output.push_str("\nNotices:\n");
            for advisory in &report.advisories {
                output.push_str(&format!("  ! {}\n", advisory.message()));
            }
        }

        Ok(output)
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Whole dollars with thousands separators, e.g. `$9,512` or `-$300`
fn format_money(amount: f64) -> String {
    let rounded = amount.round();
    let digits = format!("{}", rounded.abs() as u64);

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if rounded < 0.0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::Persona;
    use crate::format::tests::sample_report;
    use crate::session::Advisory;

    #[test]
    fn test_text_format() {
        let output = TextFormatter
            .format(&sample_report(), &Config::default())
            .unwrap();

        assert!(output.contains("Analysis: Premium Cafe"));
        assert!(output.contains("Coords: 40.7282, -74.0776"));
        assert!(output.contains("Radius: 500m"));
        assert!(output.contains("Competitors: 2    (Neutral)"));
        assert!(output.contains("Drivers:     30   (+Good)"));
        assert!(output.contains("Leisure:     5    (+Premium)"));
        assert!(output.contains("Est. Monthly Sales: $9,512"));
        assert!(output.contains(
            "Verdict: PRIME - High traffic (30) matches your business model perfectly"
        ));
        assert!(output.contains("Map: https://www.openstreetmap.org/"));
        assert!(!output.contains("Notices:"));
    }

    #[test]
    fn test_text_format_advisories() {
        let mut report = sample_report();
        report.advisories.push(Advisory::NoDemandDrivers);

        let output = TextFormatter.format(&report, &Config::default()).unwrap();
        assert!(output.contains("Notices:"));
        assert!(output.contains("No drivers found"));
    }

    #[test]
    fn test_text_format_budget_competitors() {
        let mut report = sample_report();
        report.persona = Persona::Budget;

        let output = TextFormatter.format(&report, &Config::default()).unwrap();
        assert!(output.contains("Analysis: Budget Tea Stall"));
        assert!(output.contains("Competitors: 2    (-Bad)"));
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(0.0), "$0");
        assert_eq!(format_money(999.4), "$999");
        assert_eq!(format_money(1000.0), "$1,000");
        assert_eq!(format_money(9512.4), "$9,512");
        assert_eq!(format_money(1234567.0), "$1,234,567");
        assert_eq!(format_money(-300.0), "-$300");
    }

    #[test]
    fn test_text_formatter_info() {
        assert_eq!(TextFormatter.name(), "text");
        assert!(!TextFormatter.description().is_empty());
    }
}
