use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static STRIP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[\{\}\[\]"\\]"#).unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Raw company row as stored by the persistence collaborator. The category
/// field is free text: comma-separated, or a JSON-array-encoded string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub categories: String,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub companies: Vec<CompanyRecord>,
    #[serde(default)]
    pub categories: Vec<CategoryRecord>,
}

/// Outcome of normalizing a raw category field: the clean ordered token set,
/// plus a marker telling callers whether the well-formed JSON-array path was
/// used or the input had to be recovered by stripping and splitting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTokens {
    pub tokens: Vec<String>,
    pub recovered: bool,
}

impl CategoryTokens {
    fn clean(tokens: Vec<String>, recovered: bool) -> Self {
        let mut seen = Vec::new();
        for token in tokens {
            let token = clean_token(&token);
            if token.is_empty() || seen.contains(&token) {
                continue;
            }
            seen.push(token);
        }
        Self {
            tokens: seen,
            recovered,
        }
    }
}

fn clean_token(token: &str) -> String {
    let stripped = STRIP_RE.replace_all(token, "");
    WHITESPACE_RE.replace_all(&stripped, " ").trim().to_string()
}

/// Normalizes a raw category field. A JSON array parse is attempted first;
/// on failure the field is recovered by stripping brace/bracket/quote/
/// backslash characters and splitting on commas. Tokens are trimmed,
/// deduplicated, and kept in first-seen order. The result is idempotent:
/// re-normalizing the joined token list yields the same tokens.
pub fn parse_category_field(raw: &str) -> CategoryTokens {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return CategoryTokens {
            tokens: Vec::new(),
            recovered: false,
        };
    }

    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        if let Ok(parsed) = serde_json::from_str::<Vec<String>>(trimmed) {
            return CategoryTokens::clean(parsed, false);
        }
    }

    let recovered = trimmed.starts_with('[') || trimmed.starts_with('{');
    CategoryTokens::clean(
        trimmed.split(',').map(|token| token.to_string()).collect(),
        recovered,
    )
}

/// Company with normalized category membership, the read-only input to one
/// layout pass.
#[derive(Debug, Clone)]
pub struct Company {
    pub id: String,
    pub name: String,
    pub categories: Vec<String>,
    pub logo: Option<String>,
}

pub fn normalize_companies(records: &[CompanyRecord]) -> Vec<Company> {
    records
        .iter()
        .map(|record| Company {
            id: record.id.clone(),
            name: record.name.clone(),
            categories: parse_category_field(&record.categories).tokens,
            logo: record.logo.clone(),
        })
        .collect()
}

/// First-seen-ordered union of the category records and every normalized
/// company token. Category comparisons everywhere downstream are exact,
/// case-sensitive matches on these names.
pub fn category_universe(categories: &[CategoryRecord], companies: &[Company]) -> Vec<String> {
    let mut universe: Vec<String> = Vec::new();
    for record in categories {
        let name = clean_token(&record.name);
        if !name.is_empty() && !universe.contains(&name) {
            universe.push(name);
        }
    }
    for company in companies {
        for name in &company.categories {
            if !universe.contains(name) {
                universe.push(name.clone());
            }
        }
    }
    universe
}
