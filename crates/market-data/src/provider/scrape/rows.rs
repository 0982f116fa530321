//! Row interpretation for the scrape tier.
//!
//! The economy table's markup changes without notice, so the reading of
//! one row is isolated behind [`RowInterpreter`]. The default
//! implementation carries the keyword and column heuristics; swapping it
//! out does not touch the page driver or the provider.

use lazy_static::lazy_static;
use regex::Regex;

use crate::constants::{CURRENCY_KEYWORDS, UI_SUFFIX_NOISE};

lazy_static! {
    /// A price figure with an optional thousands/millions/billions suffix.
    static ref PRICE_RE: Regex = Regex::new(r"([\d]+(?:\.\d+)?)\s*([kmbKMB])?")
        .expect("Invalid regex pattern");

    /// A signed percentage figure.
    static ref PERCENT_RE: Regex = Regex::new(r"([+-]?\d+(?:\.\d+)?)\s*%")
        .expect("Invalid regex pattern");
}

/// Cell texts of one table row, in document order.
#[derive(Clone, Debug)]
pub struct ScrapedRow {
    pub cells: Vec<String>,
}

/// What a row yielded after interpretation.
#[derive(Clone, Debug, PartialEq)]
pub struct RowReading {
    pub name: String,
    /// Chaos-equivalent price, always positive.
    pub price: f64,
    pub change_percent: f64,
}

/// Turns one scraped row into a reading, or discards it.
pub trait RowInterpreter: Send + Sync {
    fn interpret(&self, row: &ScrapedRow) -> Option<RowReading>;
}

/// Default interpreter.
///
/// Name: the first of the leading three cells whose text contains a
/// known currency keyword, trimmed to its first line with UI confidence
/// suffixes stripped.
///
/// Price: the first two numeric cells after the name are read as the two
/// orientations the table uses. Expensive instruments show
/// chaos-per-unit directly; cheap ones show units-per-chaos, which is
/// the larger of the two figures and gets inverted.
///
/// Change: the first signed-percentage figure anywhere in the row.
///
/// Rows with no recognizable name or a non-positive price are discarded;
/// the rest of the batch proceeds.
pub struct KeywordRowInterpreter;

impl KeywordRowInterpreter {
    fn find_name(&self, row: &ScrapedRow) -> Option<(usize, String)> {
        for (idx, cell) in row.cells.iter().take(3).enumerate() {
            let text = cell.trim();
            if !CURRENCY_KEYWORDS.iter().any(|kw| text.contains(kw)) {
                continue;
            }
            let mut name = text.lines().next().unwrap_or(text).trim();
            for noise in UI_SUFFIX_NOISE {
                name = name.strip_suffix(noise).unwrap_or(name).trim_end();
            }
            if name.is_empty() {
                continue;
            }
            return Some((idx, name.to_string()));
        }
        None
    }

    fn find_price(&self, row: &ScrapedRow, name_idx: usize) -> Option<f64> {
        let mut figures = row
            .cells
            .iter()
            .enumerate()
            .filter(|(idx, cell)| *idx != name_idx && !cell.contains('%'))
            .filter_map(|(_, cell)| parse_figure(cell));

        let first = figures.next()?;
        let price = match figures.next() {
            // The larger figure is units-per-chaos and inverts.
            Some(second) if second > first => 1.0 / second,
            _ => first,
        };
        (price > 0.0 && price.is_finite()).then_some(price)
    }

    fn find_change(&self, row: &ScrapedRow) -> f64 {
        row.cells
            .iter()
            .find_map(|cell| {
                let caps = PERCENT_RE.captures(cell)?;
                caps[1].parse::<f64>().ok()
            })
            .unwrap_or(0.0)
    }
}

impl RowInterpreter for KeywordRowInterpreter {
    fn interpret(&self, row: &ScrapedRow) -> Option<RowReading> {
        if row.cells.len() < 2 {
            return None;
        }
        let (name_idx, name) = self.find_name(row)?;
        let price = self.find_price(row, name_idx)?;
        Some(RowReading {
            name,
            price,
            change_percent: self.find_change(row),
        })
    }
}

/// Parse the first price figure in a cell, applying k/m/b multipliers.
fn parse_figure(text: &str) -> Option<f64> {
    let caps = PRICE_RE.captures(text)?;
    let value: f64 = caps[1].parse().ok()?;
    let multiplier = match caps.get(2).map(|m| m.as_str().to_ascii_lowercase()) {
        Some(s) if s == "k" => 1_000.0,
        Some(s) if s == "m" => 1_000_000.0,
        Some(s) if s == "b" => 1_000_000_000.0,
        _ => 1.0,
    };
    Some(value * multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> ScrapedRow {
        ScrapedRow {
            cells: cells.iter().map(|c| c.to_string()).collect(),
        }
    }

    fn interpret(cells: &[&str]) -> Option<RowReading> {
        KeywordRowInterpreter.interpret(&row(cells))
    }

    #[test]
    fn test_expensive_instrument_reads_direct_price() {
        // chaos-per-unit (180.5) exceeds the units-per-chaos column (0.0055
        // would be here for a cheap item); smaller second figure, no inversion.
        let reading = interpret(&["Divine Orb", "180.5", "0.0055", "+6.2%"]).unwrap();
        assert_eq!(reading.name, "Divine Orb");
        assert_eq!(reading.price, 180.5);
        assert_eq!(reading.change_percent, 6.2);
    }

    #[test]
    fn test_cheap_instrument_inverts_larger_figure() {
        // 8 units-per-chaos is larger than the 0.125 direct quote, so the
        // larger figure is inverted.
        let reading = interpret(&["Orb of Transmutation", "0.125", "8", "-1.5%"]).unwrap();
        assert!((reading.price - 0.125).abs() < 1e-9);
        assert_eq!(reading.change_percent, -1.5);
    }

    #[test]
    fn test_suffix_multipliers() {
        let reading = interpret(&["Mirror of Kalandra", "1.2k", "-3%"]).unwrap();
        assert_eq!(reading.price, 1200.0);
        assert_eq!(reading.change_percent, -3.0);
    }

    #[test]
    fn test_name_noise_is_stripped() {
        let reading = interpret(&["Vaal Orb (low confidence)", "2.5"]).unwrap();
        assert_eq!(reading.name, "Vaal Orb");

        // Multi-line cells keep only the first line.
        let reading = interpret(&["Regal Orb\n~b/o 3 chaos", "3.0"]).unwrap();
        assert_eq!(reading.name, "Regal Orb");
    }

    #[test]
    fn test_unrecognized_rows_are_discarded() {
        // No currency keyword in the leading cells.
        assert!(interpret(&["Tabula Rasa", "15.0"]).is_none());
        // No price figure at all.
        assert!(interpret(&["Chaos Orb", "n/a"]).is_none());
        // Too few cells.
        assert!(interpret(&["Chaos Orb"]).is_none());
    }

    #[test]
    fn test_percent_cells_are_not_prices() {
        // The percent cell comes first in the row but must not be read as
        // the price.
        let reading = interpret(&["Exalted Orb", "+12.5%", "45.0"]).unwrap();
        assert_eq!(reading.price, 45.0);
        assert_eq!(reading.change_percent, 12.5);
    }

    #[test]
    fn test_missing_percent_defaults_to_zero() {
        let reading = interpret(&["Chaos Orb", "1.0"]).unwrap();
        assert_eq!(reading.change_percent, 0.0);
    }
}
