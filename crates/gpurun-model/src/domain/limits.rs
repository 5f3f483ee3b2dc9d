use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize, Serializer};

use crate::error::ModelError;

/// Wall-clock limit in scheduler notation: `HH:MM:SS` or `D-HH:MM:SS`.
///
/// Stored as the raw string after validation; the scheduler is the consumer,
/// so no arithmetic is done here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeLimit(String);

impl TimeLimit {
    pub fn new(s: impl Into<String>) -> Result<Self, ModelError> {
        Self::try_from(s.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for TimeLimit {
    fn default() -> Self {
        Self("00:05:00".to_string())
    }
}

impl FromStr for TimeLimit {
    type Err = ModelError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_owned())
    }
}

impl TryFrom<String> for TimeLimit {
    type Error = ModelError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        let clock = match s.split_once('-') {
            Some((days, rest)) => {
                if days.is_empty() || !days.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(ModelError::InvalidTimeLimit(s));
                }
                rest
            }
            None => s.as_str(),
        };

        let fields: Vec<&str> = clock.split(':').collect();
        let valid = fields.len() == 3
            && fields
                .iter()
                .all(|f| f.len() == 2 && f.bytes().all(|b| b.is_ascii_digit()))
            && fields[1].parse::<u8>().is_ok_and(|m| m < 60)
            && fields[2].parse::<u8>().is_ok_and(|sec| sec < 60);

        if valid {
            Ok(Self(s))
        } else {
            Err(ModelError::InvalidTimeLimit(s))
        }
    }
}

impl fmt::Display for TimeLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for TimeLimit {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TimeLimit {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::try_from(s).map_err(serde::de::Error::custom)
    }
}

/// Memory reservation in scheduler notation: `<n><K|M|G|T>[B]` (e.g. `16GB`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemSize(String);

impl MemSize {
    pub fn new(s: impl Into<String>) -> Result<Self, ModelError> {
        Self::try_from(s.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MemSize {
    fn default() -> Self {
        Self("16GB".to_string())
    }
}

impl FromStr for MemSize {
    type Err = ModelError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from(s.to_owned())
    }
}

impl TryFrom<String> for MemSize {
    type Error = ModelError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        let digits: String = s.chars().take_while(|c| c.is_ascii_digit()).collect();
        let suffix = &s[digits.len()..];

        let number_ok = !digits.is_empty() && digits.parse::<u64>().is_ok_and(|n| n > 0);
        let suffix_ok = matches!(
            suffix.to_ascii_uppercase().as_str(),
            "K" | "M" | "G" | "T" | "KB" | "MB" | "GB" | "TB"
        );

        if number_ok && suffix_ok {
            Ok(Self(s))
        } else {
            Err(ModelError::InvalidMemSize(s))
        }
    }
}

impl fmt::Display for MemSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for MemSize {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for MemSize {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::try_from(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::{MemSize, TimeLimit};

    #[test]
    fn time_limit_accepts_clock_forms() {
        for ok in ["00:05:00", "01:30:00", "23:59:59", "2-12:00:00"] {
            assert!(ok.parse::<TimeLimit>().is_ok(), "expected ok for {ok:?}");
        }
    }

    #[test]
    fn time_limit_rejects_malformed() {
        for bad in ["", "5m", "00:05", "00:60:00", "00:00:61", "-00:05:00", "1:5:0"] {
            assert!(bad.parse::<TimeLimit>().is_err(), "expected err for {bad:?}");
        }
    }

    #[test]
    fn time_limit_default_matches_original_directive() {
        assert_eq!(TimeLimit::default().as_str(), "00:05:00");
    }

    #[test]
    fn mem_size_accepts_common_forms() {
        for ok in ["16GB", "512M", "1T", "64K", "2gb"] {
            assert!(ok.parse::<MemSize>().is_ok(), "expected ok for {ok:?}");
        }
    }

    #[test]
    fn mem_size_rejects_malformed() {
        for bad in ["", "GB", "16", "0GB", "16XB", "sixteenGB"] {
            assert!(bad.parse::<MemSize>().is_err(), "expected err for {bad:?}");
        }
    }

    #[test]
    fn serde_roundtrip_as_strings() {
        let t: TimeLimit = "00:05:00".parse().unwrap();
        let m: MemSize = "16GB".parse().unwrap();

        assert_eq!(serde_json::to_string(&t).unwrap(), r#""00:05:00""#);
        assert_eq!(serde_json::to_string(&m).unwrap(), r#""16GB""#);

        let t2: TimeLimit = serde_json::from_str(r#""00:05:00""#).unwrap();
        let m2: MemSize = serde_json::from_str(r#""16GB""#).unwrap();
        assert_eq!(t, t2);
        assert_eq!(m, m2);
    }
}
