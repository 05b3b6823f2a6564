//! Serde helpers implementing the tolerant decode posture the WebAuthn types
//! need: values a newer peer sends must not fail the whole ceremony.

use serde::{Deserialize, Deserializer};

/// Deserialize `T`, falling back to its [`Default`] when the value is not
/// recognized.
pub(crate) fn ignore_unknown<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(T::deserialize(deserializer).unwrap_or_default())
}

/// Deserialize a list of `T`, dropping entries that fail to deserialize
/// rather than failing the whole list.
pub(crate) fn ignore_unknown_vec<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let items: Vec<serde_json::Value> = Deserialize::deserialize(deserializer)?;
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

/// [`ignore_unknown_vec`] for optional lists.
pub(crate) fn ignore_unknown_opt_vec<'de, D, T>(
    deserializer: D,
) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let items: Option<Vec<serde_json::Value>> = Deserialize::deserialize(deserializer)?;
    Ok(items.map(|items| {
        items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect()
    }))
}

/// Deserialize an optional millisecond count which some servers send as a
/// string, occasionally with a decimal point. Values that cannot be read as
/// a `u32` are ignored rather than failing the surrounding options.
pub(crate) fn maybe_stringified<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    struct NumberOrString;

    impl serde::de::Visitor<'_> for NumberOrString {
        type Value = Option<u32>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(formatter, "a number, or a number formatted as a string")
        }

        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(u32::try_from(v).ok())
        }

        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(u32::try_from(v).ok())
        }

        fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            self.visit_str(&v.to_string())
        }

        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(v.split('.').next().and_then(|whole| whole.parse().ok()))
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(None)
        }
    }

    deserializer.deserialize_any(NumberOrString)
}

/// Serialize and deserialize a [`coset::iana`] enumeration through its i64
/// wire value.
pub(crate) mod i64_to_iana {
    use coset::iana::EnumI64;
    use serde::{Deserialize, Serializer};

    pub(crate) fn serialize<S, T>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        T: EnumI64,
    {
        serializer.serialize_i64(value.to_i64())
    }

    pub(crate) fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: serde::Deserializer<'de>,
        T: EnumI64,
    {
        let value = i64::deserialize(deserializer)?;
        T::from_i64(value)
            .ok_or_else(|| serde::de::Error::custom(format!("{value} is not a known COSE value")))
    }
}
