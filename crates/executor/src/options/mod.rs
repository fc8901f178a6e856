//! Option bag decoding and validation
//!
//! Callers pass per-call configuration as a loosely typed [`Value`] mapping.
//! [`OptionBag`] reads it key by key into typed request fields:
//!
//! - an absent key, or a key holding `Null`, leaves the field at its default
//! - a present value of the wrong type is `invalid_argument` naming the key
//! - enumerated codes and literals must match a closed set exactly
//! - keys nobody asks for are ignored
//!
//! Decoding stops at the first invalid key. A request that failed to decode
//! must be discarded.

mod cluster;
mod profile;
mod request;

pub use cluster::{
    apply_cluster_options, build_origin, connection_string_options, extract_credentials,
};
pub use profile::ConnectionProfile;
pub use request::{design_document_namespace, ApplyOptions};

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use syncbase_core::{DurabilityLevel, Error, MutationToken, Result, Value};
use syncbase_engine::request::Durability;

/// Read-only view over one option mapping.
#[derive(Debug, Clone, Copy)]
pub struct OptionBag<'a> {
    entries: Option<&'a HashMap<String, Value>>,
}

impl<'a> OptionBag<'a> {
    /// Wrap `options`. `Null` is an empty bag; anything but a mapping is
    /// rejected.
    pub fn new(options: &'a Value) -> Result<Self> {
        match options {
            Value::Null => Ok(Self::empty()),
            Value::Object(entries) => Ok(Self {
                entries: Some(entries),
            }),
            _ => Err(Error::invalid_options("expected object for options argument")),
        }
    }

    pub fn empty() -> Self {
        Self { entries: None }
    }

    /// Value under `key`, treating `Null` as absent.
    pub fn raw(&self, key: &str) -> Option<&'a Value> {
        self.entries
            .and_then(|entries| entries.get(key))
            .filter(|value| !value.is_null())
    }

    /// Decode `key` into `T`.
    pub fn get<T: FromOption>(&self, key: &str) -> Result<Option<T>> {
        self.raw(key).map(|value| T::from_option(key, value)).transpose()
    }

    /// Overwrite `field` when `key` is present.
    pub fn assign<T: FromOption>(&self, key: &str, field: &mut T) -> Result<()> {
        if let Some(value) = self.get(key)? {
            *field = value;
        }
        Ok(())
    }

    /// Overwrite `field` with `Some` when `key` is present.
    pub fn assign_some<T: FromOption>(&self, key: &str, field: &mut Option<T>) -> Result<()> {
        if let Some(value) = self.get(key)? {
            *field = Some(value);
        }
        Ok(())
    }

    /// Decode an integer-coded enumeration. Code `0` means unset.
    pub fn coded<T: CodedOption>(&self, key: &str) -> Result<Option<T>> {
        match self.get::<i64>(key)? {
            None | Some(0) => Ok(None),
            Some(code) => T::from_code(code).map(Some).ok_or_else(|| {
                Error::invalid_argument(key, format!("invalid value used for {}: {}", T::NAME, code))
            }),
        }
    }

    /// Nested bag under `key`.
    pub fn nested(&self, key: &str) -> Result<Option<OptionBag<'a>>> {
        match self.raw(key) {
            None => Ok(None),
            Some(Value::Object(entries)) => Ok(Some(OptionBag {
                entries: Some(entries),
            })),
            Some(_) => Err(Error::invalid_argument(
                key,
                format!("expected {} to be an object in the options", key),
            )),
        }
    }

    /// `timeoutMilliseconds`.
    pub fn timeout(&self) -> Result<Option<Duration>> {
        const KEY: &str = "timeoutMilliseconds";
        match self.raw(KEY) {
            None => Ok(None),
            Some(Value::Int(ms)) if *ms >= 0 => Ok(Some(Duration::from_millis(*ms as u64))),
            Some(Value::Int(ms)) => Err(Error::invalid_argument(
                KEY,
                format!("expected {} to be a non-negative number in the options: {}", KEY, ms),
            )),
            Some(_) => Err(Error::invalid_argument(
                KEY,
                format!("expected {} to be a number in the options", KEY),
            )),
        }
    }

    /// `durabilityLevel`, plus `durabilityTimeoutSeconds` when the level is
    /// not `none`. `None` when no level was given.
    pub fn durability(&self) -> Result<Option<Durability>> {
        const LEVEL: &str = "durabilityLevel";
        const TIMEOUT: &str = "durabilityTimeoutSeconds";
        let Some(name) = self.raw(LEVEL) else {
            return Ok(None);
        };
        let name = name.as_str().ok_or_else(|| {
            Error::invalid_argument(LEVEL, format!("expected {} to be a string in the options", LEVEL))
        })?;
        let level = DurabilityLevel::from_name(name)
            .ok_or_else(|| Error::invalid_argument(LEVEL, format!("unknown durabilityLevel: {}", name)))?;
        if level.is_none() {
            return Ok(Some(Durability::new(level, None)));
        }
        let timeout = match self.raw(TIMEOUT) {
            None => None,
            Some(Value::Int(secs)) if *secs >= 0 => Some(Duration::from_secs(*secs as u64)),
            Some(Value::Int(secs)) => {
                return Err(Error::invalid_argument(
                    TIMEOUT,
                    format!("expected {} to be a non-negative number in the options: {}", TIMEOUT, secs),
                ))
            }
            Some(_) => {
                return Err(Error::invalid_argument(
                    TIMEOUT,
                    format!("expected {} to be a number in the options", TIMEOUT),
                ))
            }
        };
        Ok(Some(Durability::new(level, timeout)))
    }

    /// `consistentWith`: a sequence of mutation-token records.
    pub fn mutation_state(&self) -> Result<Option<Vec<MutationToken>>> {
        const KEY: &str = "consistentWith";
        let Some(items) = self.raw(KEY) else {
            return Ok(None);
        };
        let items = items.as_array().ok_or_else(|| {
            Error::invalid_argument(KEY, format!("expected array for options argument \"{}\"", KEY))
        })?;
        let mut tokens = Vec::with_capacity(items.len());
        for item in items {
            let token = OptionBag::new(item)
                .ok()
                .filter(|bag| bag.entries.is_some())
                .ok_or_else(|| {
                    Error::invalid_argument(KEY, format!("expected {} to hold mutation token objects", KEY))
                })?;
            tokens.push(token.mutation_token(KEY)?);
        }
        Ok(Some(tokens))
    }

    fn mutation_token(&self, key: &str) -> Result<MutationToken> {
        let bucket_name: String = self
            .get("bucketName")?
            .ok_or_else(|| Error::invalid_argument(key, "mutation token is missing bucketName"))?;
        let partition_id: u16 = self
            .get("partitionId")?
            .ok_or_else(|| Error::invalid_argument(key, "mutation token is missing partitionId"))?;
        let partition_uuid = self.counter("partitionUuid", key)?;
        let sequence_number = self.counter("sequenceNumber", key)?;
        Ok(MutationToken {
            bucket_name,
            partition_id,
            partition_uuid,
            sequence_number,
        })
    }

    /// 64-bit counter given as an integer or in its hex wire form.
    fn counter(&self, field: &str, key: &str) -> Result<u64> {
        match self.raw(field) {
            Some(Value::Int(n)) if *n >= 0 => Ok(*n as u64),
            Some(Value::String(hex)) => u64::from_str_radix(hex, 16).map_err(|_| {
                Error::invalid_argument(field, format!("expected {} to be a hex string: {}", field, hex))
            }),
            Some(_) => Err(Error::invalid_argument(
                field,
                format!("expected {} to be a non-negative integer or hex string", field),
            )),
            None => Err(Error::invalid_argument(
                key,
                format!("mutation token is missing {}", field),
            )),
        }
    }
}

/// A typed field decodable from one option value.
pub trait FromOption: Sized {
    fn from_option(key: &str, value: &Value) -> Result<Self>;
}

impl FromOption for bool {
    fn from_option(key: &str, value: &Value) -> Result<Self> {
        value.as_bool().ok_or_else(|| {
            Error::invalid_argument(key, format!("expected {} to be a boolean value in the options", key))
        })
    }
}

impl FromOption for i64 {
    fn from_option(key: &str, value: &Value) -> Result<Self> {
        value.as_int().ok_or_else(|| {
            Error::invalid_argument(key, format!("expected {} to be an integer value in the options", key))
        })
    }
}

macro_rules! bounded_integer {
    ($($ty:ty),+) => {
        $(
            impl FromOption for $ty {
                fn from_option(key: &str, value: &Value) -> Result<Self> {
                    let n = i64::from_option(key, value)?;
                    <$ty>::try_from(n).map_err(|_| {
                        Error::invalid_argument(key, format!("{} is out of range: {}", key, n))
                    })
                }
            }
        )+
    };
}

bounded_integer!(u16, u32, u64, usize);

impl FromOption for String {
    fn from_option(key: &str, value: &Value) -> Result<Self> {
        value.as_str().map(str::to_string).ok_or_else(|| {
            Error::invalid_argument(key, format!("expected {} to be a string value in the options", key))
        })
    }
}

impl FromOption for Vec<String> {
    fn from_option(key: &str, value: &Value) -> Result<Self> {
        let items = value.as_array().ok_or_else(|| {
            Error::invalid_argument(key, format!("expected array for options argument \"{}\"", key))
        })?;
        items
            .iter()
            .map(|item| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    Error::invalid_argument(
                        key,
                        format!("expected \"{}\" option to be an array of strings, detected non-string value", key),
                    )
                })
            })
            .collect()
    }
}

impl FromOption for BTreeMap<String, String> {
    fn from_option(key: &str, value: &Value) -> Result<Self> {
        let entries = value.as_object().ok_or_else(|| {
            Error::invalid_argument(key, format!("expected object for options argument \"{}\"", key))
        })?;
        entries
            .iter()
            .map(|(name, item)| match item.as_str() {
                Some(text) => Ok((name.clone(), text.to_string())),
                None => Err(Error::invalid_argument(
                    key,
                    format!("expected \"{}\" option to map names to strings, detected non-string value for {}", key, name),
                )),
            })
            .collect()
    }
}

/// Enumeration selected by an integer code.
pub trait CodedOption: Sized {
    /// Name used in the error message.
    const NAME: &'static str;

    fn from_code(code: i64) -> Option<Self>;
}
