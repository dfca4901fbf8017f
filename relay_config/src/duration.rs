use std::ops::Deref;

use serde::Deserialize;

/// Human readable duration such as `"1d 2h 3m 4s"` or `"500ms"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Duration(pub std::time::Duration);

impl From<Duration> for std::time::Duration {
    fn from(value: Duration) -> Self {
        value.0
    }
}

impl Deref for Duration {
    type Target = std::time::Duration;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Duration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let mut out = std::time::Duration::default();
        for part in s.split_whitespace() {
            let split = part
                .find(|c: char| !c.is_ascii_digit())
                .ok_or_else(|| serde::de::Error::custom("Invalid duration"))?;
            let (value, unit) = part.split_at(split);
            let value = value
                .parse::<u64>()
                .map_err(|_| serde::de::Error::custom("Invalid duration"))?;
            let seconds_per_unit = match unit {
                "ms" => None,
                "s" => Some(1),
                "m" => Some(60),
                "h" => Some(60 * 60),
                "d" => Some(24 * 60 * 60),
                _ => return Err(serde::de::Error::custom("Invalid duration")),
            };
            let part = match seconds_per_unit {
                None => Some(std::time::Duration::from_millis(value)),
                Some(factor) => value
                    .checked_mul(factor)
                    .map(std::time::Duration::from_secs),
            };
            out = part
                .and_then(|part| out.checked_add(part))
                .ok_or_else(|| serde::de::Error::custom("Invalid duration"))?;
        }
        Ok(Self(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration() {
        for (input, expected) in [
            ("13s", Some(13_000)),
            ("42m", Some(42 * 60_000)),
            ("7h", Some(7 * 60 * 60_000)),
            ("20d", Some(20 * 24 * 60 * 60_000)),
            ("500ms", Some(500)),
            ("", Some(0)),
            ("1d 2h 3m 4s", Some((((24 + 2) * 60 + 3) * 60 + 4) * 1000)),
            ("1s 250ms", Some(1250)),
            ("xyz", None),
            ("7dd", None),
            ("12", None),
            ("s", None),
            ("99999999999999999d", None),
            ("18446744073709551615s 1s", None),
        ] {
            let input = serde_json::Value::String(input.into());
            let output = serde_json::from_value::<Duration>(input)
                .ok()
                .map(|x| x.0.as_millis());
            assert_eq!(output, expected);
        }
    }
}
