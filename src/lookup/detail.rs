//! Country detail payloads and the trivia built from them

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One currency in use by a country
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub code: String,
    pub name: String,
    pub symbol: Option<String>,
}

/// Supplementary facts about a country
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryDetail {
    pub common_name: String,
    pub cca2: String,
    pub cca3: Option<String>,
    pub capital: Vec<String>,
    pub population: u64,
    pub languages: Vec<String>,
    pub currencies: Vec<Currency>,
    pub flag_png: String,
    pub flag_alt: Option<String>,
}

impl CountryDetail {
    /// True if `code` is this country's cca2 or cca3
    pub fn has_code(&self, code: &str) -> bool {
        let code = code.trim();
        self.cca2.eq_ignore_ascii_case(code)
            || self
                .cca3
                .as_deref()
                .is_some_and(|c| c.eq_ignore_ascii_case(code))
    }
}

// Wire shape of the REST Countries v3.1 API

#[derive(Debug, Deserialize)]
struct WireCountry {
    name: WireName,
    cca2: String,
    cca3: Option<String>,
    #[serde(default)]
    capital: Vec<String>,
    #[serde(default)]
    population: u64,
    #[serde(default)]
    languages: BTreeMap<String, String>,
    #[serde(default)]
    currencies: BTreeMap<String, WireCurrency>,
    flags: WireFlags,
}

#[derive(Debug, Deserialize)]
struct WireName {
    common: String,
}

#[derive(Debug, Deserialize)]
struct WireCurrency {
    name: String,
    symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireFlags {
    png: String,
    alt: Option<String>,
}

impl From<WireCountry> for CountryDetail {
    fn from(w: WireCountry) -> Self {
        Self {
            common_name: w.name.common,
            cca2: w.cca2,
            cca3: w.cca3,
            capital: w.capital,
            population: w.population,
            languages: w.languages.into_values().collect(),
            currencies: w
                .currencies
                .into_iter()
                .map(|(code, c)| Currency {
                    code,
                    name: c.name,
                    symbol: c.symbol,
                })
                .collect(),
            flag_png: w.flags.png,
            flag_alt: w.flags.alt,
        }
    }
}

/// Parse a lookup response and pick the entry matching `code`
///
/// The API answers with a list; an answer without a matching entry is
/// "no detail", not an error.
pub fn parse_response(json: &str, code: &str) -> serde_json::Result<Option<CountryDetail>> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let entries: Vec<WireCountry> = if value.is_array() {
        serde_json::from_value(value)?
    } else {
        vec![serde_json::from_value(value)?]
    };
    Ok(entries
        .into_iter()
        .map(CountryDetail::from)
        .find(|d| d.has_code(code)))
}

/// Trivia panel content for a found country
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trivia {
    pub name: String,
    pub capital: String,
    pub languages: String,
    pub population: String,
    pub currencies: String,
    pub flag_png: String,
    pub flag_alt: Option<String>,
}

impl Trivia {
    pub fn from_detail(detail: &CountryDetail) -> Self {
        Self {
            name: detail.common_name.clone(),
            capital: detail.capital.join(", "),
            languages: detail.languages.join(", "),
            population: format_population(detail.population),
            currencies: format_currencies(&detail.currencies),
            flag_png: detail.flag_png.clone(),
            flag_alt: detail.flag_alt.clone(),
        }
    }
}

/// `1234567` -> `1,234,567`
pub fn format_population(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `Euro (€), Swiss franc (Fr.)`
pub fn format_currencies(currencies: &[Currency]) -> String {
    currencies
        .iter()
        .map(|c| match &c.symbol {
            Some(sym) => format!("{} ({})", c.name, sym),
            None => c.name.clone(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}
