use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize, Serializer};

use crate::error::ModelError;

/// Accelerator reservation of the form `<name>:<count>` (e.g. `a100:4`).
///
/// This mirrors the value the scheduler injects into the job environment for
/// a per-node GPU reservation. A bare `<count>` is also accepted, in which
/// case the device name is empty; schedulers emit this form when the
/// reservation was requested without a device type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GresSpec {
    /// Device type (e.g. `a100`). Empty for untyped reservations.
    name: String,
    /// Number of reserved devices per node. Always positive.
    count: u32,
}

impl GresSpec {
    /// Create a reservation with an explicit device type.
    pub fn new(name: impl Into<String>, count: u32) -> Result<Self, ModelError> {
        let name = name.into();
        if count == 0 {
            return Err(ModelError::InvalidReservation(format!("{name}:{count}")));
        }
        Ok(Self { name, count })
    }

    /// Create an untyped reservation (`count` devices, no device name).
    pub fn untyped(count: u32) -> Result<Self, ModelError> {
        if count == 0 {
            return Err(ModelError::InvalidReservation(count.to_string()));
        }
        Ok(Self {
            name: String::new(),
            count,
        })
    }

    /// Device type, or the empty string for untyped reservations.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of reserved devices per node.
    ///
    /// This is the value that becomes the launcher's processes-per-node
    /// argument: one worker process per reserved device.
    pub fn count(&self) -> u32 {
        self.count
    }
}

impl FromStr for GresSpec {
    type Err = ModelError;

    /// Parse the scheduler-injected reservation string.
    ///
    /// The count is everything after the last `:`; everything before it is
    /// the device name. A string without `:` is treated as a bare count.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ModelError::InvalidReservation(s.to_string()));
        }

        let (name, count_str) = match s.rsplit_once(':') {
            Some((name, count)) => (name, count),
            None => ("", s),
        };

        if name.contains(char::is_whitespace) || count_str.is_empty() {
            return Err(ModelError::InvalidReservation(s.to_string()));
        }

        let count: u32 = count_str
            .parse()
            .map_err(|_| ModelError::InvalidReservation(s.to_string()))?;
        if count == 0 {
            return Err(ModelError::InvalidReservation(s.to_string()));
        }

        Ok(Self {
            name: name.to_string(),
            count,
        })
    }
}

impl fmt::Display for GresSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.count)
        } else {
            write!(f, "{}:{}", self.name, self.count)
        }
    }
}

impl Serialize for GresSpec {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for GresSpec {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::GresSpec;

    #[test]
    fn parses_typed_reservation() {
        let g: GresSpec = "a100:4".parse().unwrap();
        assert_eq!(g.name(), "a100");
        assert_eq!(g.count(), 4);
    }

    #[test]
    fn parses_bare_count() {
        let g: GresSpec = "2".parse().unwrap();
        assert_eq!(g.name(), "");
        assert_eq!(g.count(), 2);
    }

    #[test]
    fn count_is_taken_after_last_colon() {
        // Some schedulers prefix the resource class: gpu:a100:4.
        let g: GresSpec = "gpu:a100:4".parse().unwrap();
        assert_eq!(g.name(), "gpu:a100");
        assert_eq!(g.count(), 4);
    }

    #[test]
    fn rejects_malformed_inputs() {
        for bad in ["", "   ", "a100:", "a100:0", "a100:x", "0", ":-1", "a 100:4"] {
            assert!(
                bad.parse::<GresSpec>().is_err(),
                "expected parse failure for {bad:?}"
            );
        }
    }

    #[test]
    fn zero_count_is_rejected_by_constructors() {
        assert!(GresSpec::new("a100", 0).is_err());
        assert!(GresSpec::untyped(0).is_err());
        assert!(GresSpec::new("a100", 4).is_ok());
    }

    #[test]
    fn display_is_canonical() {
        let g: GresSpec = "A100:4".parse().unwrap();
        assert_eq!(g.to_string(), "A100:4");
        assert_eq!(GresSpec::untyped(2).unwrap().to_string(), "2");
    }

    #[test]
    fn serde_roundtrip_as_string() {
        let g: GresSpec = "a100:4".parse().unwrap();
        let json = serde_json::to_string(&g).unwrap();
        assert_eq!(json, r#""a100:4""#);

        let back: GresSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, g);
    }

    #[test]
    fn serde_rejects_malformed_string() {
        let err = serde_json::from_str::<GresSpec>(r#""a100:zero""#);
        assert!(err.is_err());
    }
}
