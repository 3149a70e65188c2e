//! JVM tunable catalog and random configuration sampling
//!
//! The catalog is fixed for the lifetime of the process. Sampling functions
//! take the random source as a parameter so callers decide between the
//! thread-local generator and a seeded one.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::sync::OnceLock;

/// A named JVM option that the experiment can vary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tunable {
    pub name: String,
    #[serde(flatten)]
    pub kind: TunableKind,
}

/// Value type and bounds of a tunable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "value_type", rename_all = "lowercase")]
pub enum TunableKind {
    /// Stepped integer range, both bounds inclusive
    Integer {
        lower_bound: i64,
        upper_bound: i64,
        step: i64,
    },
    /// One of a fixed, ordered set of string choices
    Categorical { choices: Vec<String> },
}

impl Tunable {
    pub fn integer(name: &str, lower_bound: i64, upper_bound: i64, step: i64) -> Self {
        Self {
            name: name.to_string(),
            kind: TunableKind::Integer {
                lower_bound,
                upper_bound,
                step,
            },
        }
    }

    pub fn categorical(name: &str, choices: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            kind: TunableKind::Categorical {
                choices: choices.iter().map(|c| c.to_string()).collect(),
            },
        }
    }

    /// Draw one value uniformly from the tunable's domain.
    ///
    /// Integer tunables pick among `lower_bound + k * step` for every `k`
    /// that keeps the value at or below `upper_bound`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> TunableValue {
        match &self.kind {
            TunableKind::Integer {
                lower_bound, step, ..
            } => {
                let k = rng.gen_range(0..self.candidate_count());
                TunableValue::Integer(lower_bound + k as i64 * step)
            }
            TunableKind::Categorical { choices } => {
                // Catalog choice lists are never empty
                let choice = choices.choose(rng).cloned().unwrap_or_default();
                TunableValue::Categorical(choice)
            }
        }
    }

    /// Number of distinct values the tunable can take
    pub fn candidate_count(&self) -> usize {
        match &self.kind {
            TunableKind::Integer {
                lower_bound,
                upper_bound,
                step,
            } => {
                if *step <= 0 || upper_bound < lower_bound {
                    1
                } else {
                    ((upper_bound - lower_bound) / step + 1) as usize
                }
            }
            TunableKind::Categorical { choices } => choices.len(),
        }
    }

    /// Returns true if `value` is a legal setting for this tunable
    pub fn admits(&self, value: &TunableValue) -> bool {
        match (&self.kind, value) {
            (
                TunableKind::Integer {
                    lower_bound,
                    upper_bound,
                    step,
                },
                TunableValue::Integer(v),
            ) => {
                *step > 0 && v >= lower_bound && v <= upper_bound && (v - lower_bound) % step == 0
            }
            (TunableKind::Categorical { choices }, TunableValue::Categorical(v)) => {
                choices.iter().any(|c| c == v)
            }
            _ => false,
        }
    }
}

static CATALOG: OnceLock<Vec<Tunable>> = OnceLock::new();

/// The JVM tunables every experiment explores, in rendering order
pub fn catalog() -> &'static [Tunable] {
    CATALOG.get_or_init(|| {
        vec![
            Tunable::integer("CompileThreshold", 1000, 10000, 100),
            Tunable::categorical("gc", &["G1GC", "ParallelGC", "ZGC"]),
            Tunable::categorical("TieredCompilation", &["true", "false"]),
            Tunable::integer("MinHeapFreeRatio", 5, 70, 5),
        ]
    })
}

/// A concrete setting chosen for a tunable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TunableValue {
    Integer(i64),
    Categorical(String),
}

impl fmt::Display for TunableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TunableValue::Integer(v) => write!(f, "{v}"),
            TunableValue::Categorical(v) => f.write_str(v),
        }
    }
}

/// Tunable name to value, kept in catalog order.
///
/// Serializes as a JSON object whose keys follow insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TunableConfig(Vec<(String, TunableValue)>);

impl TunableConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sample one value per catalog entry
    pub fn sample<R: Rng + ?Sized>(tunables: &[Tunable], rng: &mut R) -> Self {
        let mut config = Self::new();
        for tunable in tunables {
            config.insert(tunable.name.clone(), tunable.sample(rng));
        }
        config
    }

    /// Set a value, replacing an existing entry in place
    pub fn insert(&mut self, name: impl Into<String>, value: TunableValue) {
        let name = name.into();
        match self.0.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&TunableValue> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &TunableValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render as HotSpot `-XX:` flags separated by single spaces
    pub fn to_java_options(&self) -> String {
        self.iter()
            .map(|(name, value)| format!("-XX:{name}={value}"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Serialize for TunableConfig {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TunableConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ConfigVisitor;

        impl<'de> Visitor<'de> for ConfigVisitor {
            type Value = TunableConfig;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of tunable names to values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut config = TunableConfig::new();
                while let Some((name, value)) = access.next_entry::<String, TunableValue>()? {
                    config.insert(name, value);
                }
                Ok(config)
            }
        }

        deserializer.deserialize_map(ConfigVisitor)
    }
}
