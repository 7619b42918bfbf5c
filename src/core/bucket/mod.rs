//! # Bucket Module
//!
//! Turns effective dates into calendar folder names.
//!
//! | Granularity | Label        |
//! |-------------|--------------|
//! | Day         | `2024-01-15` |
//! | Week        | `2024-W03`   |
//! | Month       | `2024-01`    |
//! | Year        | `2024`       |
//!
//! Weeks follow ISO-8601, so the week-year can differ from the calendar year
//! around New Year (2024-12-30 is `2025-W01`).

use crate::core::scanner::{DateIndex, DatedFile};
use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Calendar unit a bucket covers
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Day,
    Week,
    #[default]
    Month,
    Year,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" | "dia" | "día" => Ok(Self::Day),
            "week" | "semana" => Ok(Self::Week),
            "month" | "mes" => Ok(Self::Month),
            "year" | "año" | "ano" => Ok(Self::Year),
            other => Err(format!("unknown granularity: {other}")),
        }
    }
}

/// Folder label for `timestamp` at the given granularity
pub fn bucket_label(timestamp: &NaiveDateTime, granularity: Granularity) -> String {
    match granularity {
        Granularity::Year => format!("{:04}", timestamp.year()),
        Granularity::Month => timestamp.format("%Y-%m").to_string(),
        Granularity::Day => timestamp.format("%Y-%m-%d").to_string(),
        Granularity::Week => {
            let week = timestamp.iso_week();
            format!("{:04}-W{:02}", week.year(), week.week())
        }
    }
}

/// Bucket label to the files it receives, each with its effective date
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BucketPlan {
    pub granularity: Granularity,
    buckets: BTreeMap<String, Vec<DatedFile>>,
}

impl BucketPlan {
    /// Assign every indexed file to exactly one bucket
    pub fn build(index: &DateIndex, granularity: Granularity) -> Self {
        let mut buckets: BTreeMap<String, Vec<DatedFile>> = BTreeMap::new();
        for entry in index.iter() {
            let label = bucket_label(&entry.timestamp.value, granularity);
            buckets.entry(label).or_default().push(entry.clone());
        }
        Self {
            granularity,
            buckets,
        }
    }

    /// Buckets in label order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[DatedFile])> {
        self.buckets
            .iter()
            .map(|(label, files)| (label.as_str(), files.as_slice()))
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.buckets.keys().map(String::as_str)
    }

    /// Files per bucket
    pub fn counts(&self) -> BTreeMap<String, usize> {
        self.buckets
            .iter()
            .map(|(label, files)| (label.clone(), files.len()))
            .collect()
    }

    pub fn total_files(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
