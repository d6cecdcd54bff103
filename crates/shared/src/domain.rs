use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

macro_rules! ref_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

ref_newtype!(PageCursor);
ref_newtype!(ResidentRef);

impl PageCursor {
    /// Page number carried in the cursor's `page` query parameter, if any.
    pub fn page_number(&self) -> Option<u32> {
        // Relative cursors are parsed against a throwaway base.
        let parsed = Url::parse(&self.0)
            .or_else(|_| Url::parse("http://cursor.invalid/").and_then(|base| base.join(&self.0)))
            .ok()?;
        parsed
            .query_pairs()
            .find(|(key, _)| key == "page")
            .and_then(|(_, value)| value.parse::<u32>().ok())
            .filter(|page| *page >= 1)
    }
}

/// Scalar field passed through verbatim from the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Attribute {
    Text(String),
    Number(serde_json::Number),
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(number) => write!(f, "{number}"),
        }
    }
}

impl From<&str> for Attribute {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Planet {
    pub name: String,
    #[serde(default)]
    pub climate: Option<Attribute>,
    #[serde(default)]
    pub population: Option<Attribute>,
    #[serde(default)]
    pub terrain: Option<Attribute>,
    #[serde(default)]
    pub diameter: Option<Attribute>,
    #[serde(default)]
    pub gravity: Option<Attribute>,
    /// Always present in the API shape; a missing array is a decode error.
    pub residents: Vec<ResidentRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Planet {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            climate: None,
            population: None,
            terrain: None,
            diameter: None,
            gravity: None,
            residents: Vec::new(),
            url: None,
        }
    }

    pub fn with_residents<I, R>(mut self, residents: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        self.residents = residents.into_iter().map(ResidentRef::new).collect();
        self
    }

    /// Whether a detail view can be opened for this planet.
    pub fn has_residents(&self) -> bool {
        !self.residents.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resident {
    pub name: String,
    #[serde(default)]
    pub height: Option<Attribute>,
    #[serde(default)]
    pub mass: Option<Attribute>,
    #[serde(default)]
    pub gender: Option<Attribute>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    #[serde(default)]
    pub next: Option<PageCursor>,
    #[serde(default)]
    pub previous: Option<PageCursor>,
    pub results: Vec<Planet>,
}

impl Page {
    pub fn find(&self, name: &str) -> Option<&Planet> {
        self.results.iter().find(|planet| planet.name == name)
    }
}

/// A planet together with its fetched residents, positionally aligned with
/// `planet.residents`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetDetail {
    pub planet: Planet,
    pub residents: Vec<Resident>,
}
