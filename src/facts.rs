//! Display model for the flag of the day.
//! Turns a snapshot and optional extended facts into ready-to-print strings.

use crate::country::{CountryRecord, ExtendedFacts};
use crate::gateway::FlagSnapshot;
use std::fmt;

/// Shown for a field nothing is known about
const PLACEHOLDER: &str = "-";

/// Text for each field of the flag card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactSheet {
    pub country: String,
    pub emoji: String,
    pub updated: String,
    pub capital: String,
    pub population: Option<String>,
    pub region: Option<String>,
    pub languages: Option<String>,
    pub currencies: Option<String>,
    pub timezones: Option<String>,
}

impl FactSheet {
    /// Builds the card from the snapshot, preferring extended facts per field
    /// wherever they carry a value.
    pub fn new(snapshot: &FlagSnapshot, facts: Option<&ExtendedFacts>) -> Self {
        let sheet = FactSheet {
            country: snapshot.country.clone(),
            emoji: snapshot.emoji.clone(),
            updated: format!("Updated: {}", snapshot.timestamp),
            capital: snapshot
                .capital()
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            population: None,
            region: None,
            languages: None,
            currencies: None,
            timezones: None,
        };
        sheet.with_facts(facts)
    }

    /// Card for a country picked from the directory, with no snapshot behind it
    pub fn for_country(record: &CountryRecord, facts: Option<&ExtendedFacts>) -> Self {
        let sheet = FactSheet {
            country: record.name.clone(),
            emoji: record.emoji.clone(),
            updated: String::new(),
            capital: PLACEHOLDER.to_string(),
            population: None,
            region: record.region.clone(),
            languages: None,
            currencies: None,
            timezones: None,
        };
        sheet.with_facts(facts)
    }

    fn with_facts(mut self, facts: Option<&ExtendedFacts>) -> Self {
        let Some(facts) = facts else {
            return self;
        };
        let sheet = &mut self;

        if !facts.capital.is_empty() {
            sheet.capital = facts.capital.join(", ");
        }

        if let Some(population) = facts.population.filter(|&p| p > 0) {
            sheet.population = Some(format_number(population));
        }

        if let Some(region) = facts.region.as_deref().filter(|r| !r.is_empty()) {
            sheet.region = Some(match facts.subregion.as_deref() {
                Some(sub) if !sub.is_empty() => format!("{} ({})", region, sub),
                _ => region.to_string(),
            });
        }

        if !facts.languages.is_empty() {
            sheet.languages = Some(
                facts
                    .languages
                    .values()
                    .cloned()
                    .collect::<Vec<_>>()
                    .join(", "),
            );
        }

        if !facts.currencies.is_empty() {
            sheet.currencies = Some(
                facts
                    .currencies
                    .values()
                    .map(|c| format!("{} ({})", c.name, c.symbol.as_deref().unwrap_or("")))
                    .collect::<Vec<_>>()
                    .join(", "),
            );
        }

        if !facts.timezones.is_empty() {
            sheet.timezones = Some(facts.timezones.join(", "));
        }

        self
    }
}

impl fmt::Display for FactSheet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let or_placeholder = |value: &Option<String>| {
            value.clone().unwrap_or_else(|| PLACEHOLDER.to_string())
        };

        writeln!(f, "{} {}", self.emoji, self.country)?;
        writeln!(f, "  Capital:    {}", self.capital)?;
        writeln!(f, "  Population: {}", or_placeholder(&self.population))?;
        writeln!(f, "  Region:     {}", or_placeholder(&self.region))?;
        writeln!(f, "  Languages:  {}", or_placeholder(&self.languages))?;
        writeln!(f, "  Currency:   {}", or_placeholder(&self.currencies))?;
        write!(f, "  Timezones:  {}", or_placeholder(&self.timezones))?;
        if !self.updated.is_empty() {
            write!(f, "\n  {}", self.updated)?;
        }
        Ok(())
    }
}

/// Formats a number with comma thousands separators (5379475 -> "5,379,475")
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::country::Currency;

    fn snapshot() -> FlagSnapshot {
        FlagSnapshot {
            country: "Norway".to_string(),
            emoji: "🇳🇴".to_string(),
            timestamp: "2025-05-01 10:00:00".to_string(),
            info: Some("Capital: Oslo".to_string()),
        }
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(5379475), "5,379,475");
        assert_eq!(format_number(1_000_000_000), "1,000,000,000");
    }

    #[test]
    fn test_snapshot_only() {
        let sheet = FactSheet::new(&snapshot(), None);
        assert_eq!(sheet.capital, "Oslo");
        assert_eq!(sheet.updated, "Updated: 2025-05-01 10:00:00");
        assert_eq!(sheet.population, None);
        assert_eq!(sheet.region, None);

        let text = sheet.to_string();
        assert!(text.contains("Capital:    Oslo"));
        assert!(text.contains("Population: -"));
    }

    #[test]
    fn test_missing_info_uses_placeholder() {
        let mut snap = snapshot();
        snap.info = None;
        assert_eq!(FactSheet::new(&snap, None).capital, "-");
    }

    #[test]
    fn test_extended_facts_take_precedence() {
        let mut facts = ExtendedFacts {
            capital: vec!["Oslo".to_string(), "Longyearbyen".to_string()],
            population: Some(5379475),
            region: Some("Europe".to_string()),
            subregion: Some("Northern Europe".to_string()),
            timezones: vec!["UTC+01:00".to_string()],
            ..Default::default()
        };
        facts
            .languages
            .insert("nno".to_string(), "Norwegian Nynorsk".to_string());
        facts
            .languages
            .insert("nob".to_string(), "Norwegian Bokmål".to_string());
        facts.currencies.insert(
            "NOK".to_string(),
            Currency {
                name: "Norwegian krone".to_string(),
                symbol: Some("kr".to_string()),
            },
        );

        let sheet = FactSheet::new(&snapshot(), Some(&facts));
        assert_eq!(sheet.capital, "Oslo, Longyearbyen");
        assert_eq!(sheet.population.as_deref(), Some("5,379,475"));
        assert_eq!(sheet.region.as_deref(), Some("Europe (Northern Europe)"));
        assert_eq!(
            sheet.languages.as_deref(),
            Some("Norwegian Nynorsk, Norwegian Bokmål")
        );
        assert_eq!(sheet.currencies.as_deref(), Some("Norwegian krone (kr)"));
        assert_eq!(sheet.timezones.as_deref(), Some("UTC+01:00"));
    }

    #[test]
    fn test_for_country() {
        let record = CountryRecord::new("Chad", "🇹🇩").with_region("Africa");
        let sheet = FactSheet::for_country(&record, None);
        assert_eq!(sheet.capital, "-");
        assert_eq!(sheet.region.as_deref(), Some("Africa"));
        assert!(!sheet.to_string().contains("Updated"));

        let facts = ExtendedFacts {
            capital: vec!["N'Djamena".to_string()],
            region: Some("Africa".to_string()),
            subregion: Some("Middle Africa".to_string()),
            ..Default::default()
        };
        let sheet = FactSheet::for_country(&record, Some(&facts));
        assert_eq!(sheet.capital, "N'Djamena");
        assert_eq!(sheet.region.as_deref(), Some("Africa (Middle Africa)"));
    }

    #[test]
    fn test_partial_facts() {
        let facts = ExtendedFacts {
            population: Some(0),
            region: Some("Antarctic".to_string()),
            subregion: Some(String::new()),
            ..Default::default()
        };
        let sheet = FactSheet::new(&snapshot(), Some(&facts));
        assert_eq!(sheet.capital, "Oslo");
        assert_eq!(sheet.population, None);
        assert_eq!(sheet.region.as_deref(), Some("Antarctic"));
        assert_eq!(sheet.currencies, None);
    }
}
