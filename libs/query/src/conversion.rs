//! Value-to-string conversion service.
//!
//! Built once at startup, immutable afterwards and shared through `Arc` by
//! every compiler; it replaces any process-wide conversion registry.

use crate::error::{Error, Result};
use crate::value::{CustomValue, Value};
use chrono::SecondsFormat;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

type Converter = Arc<dyn Fn(&CustomValue) -> Option<String> + Send + Sync>;

/// Format a double the way Solr echoes them: shortest round-trip digits,
/// never exponent notation, integral values keep a trailing `.0`.
pub fn format_f64(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    let s = value.to_string();
    if s.contains('.') {
        s
    } else {
        format!("{}.0", s)
    }
}

/// Single precision variant of [`format_f64`], used for boosts and similarity.
pub fn format_f32(value: f32) -> String {
    if !value.is_finite() {
        return format_f64(f64::from(value));
    }
    let s = value.to_string();
    if s.contains('.') {
        s
    } else {
        format!("{}.0", s)
    }
}

fn seconds_format(fraction_digits: u8) -> Result<SecondsFormat> {
    match fraction_digits {
        0 => Ok(SecondsFormat::Secs),
        3 => Ok(SecondsFormat::Millis),
        6 => Ok(SecondsFormat::Micros),
        9 => Ok(SecondsFormat::Nanos),
        other => Err(Error::Config(format!(
            "date_fraction_digits must be one of 0, 3, 6, 9 (got {})",
            other
        ))),
    }
}

#[derive(Clone)]
pub struct ConversionService {
    converters: HashMap<TypeId, Converter>,
    date_format: SecondsFormat,
}

impl Default for ConversionService {
    fn default() -> Self {
        Self {
            converters: HashMap::new(),
            date_format: SecondsFormat::Millis,
        }
    }
}

impl fmt::Debug for ConversionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionService")
            .field("converters", &self.converters.len())
            .field("date_format", &self.date_format)
            .finish()
    }
}

impl ConversionService {
    pub fn builder() -> ConversionServiceBuilder {
        ConversionServiceBuilder::default()
    }

    /// `true` when a converter is registered for the custom value's type.
    pub fn can_convert(&self, value: &CustomValue) -> bool {
        self.converters.contains_key(&value.value_type_id())
    }

    /// Textual form of a value. `None` only for `Null`.
    ///
    /// Text is returned verbatim; escaping is the caller's concern.
    pub fn convert(&self, value: &Value) -> Option<String> {
        let converted = match value {
            Value::Null => return None,
            Value::Bool(b) => b.to_string(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => format_f64(*f),
            Value::Decimal(d) => d.to_string(),
            Value::Text(s) => s.clone(),
            Value::DateTime(dt) => dt.to_rfc3339_opts(self.date_format, true),
            Value::Point(p) => p.to_string(),
            Value::Distance(d) => d.to_string(),
            Value::Box(b) => format!("[{} TO {}]", b.first, b.second),
            Value::Custom(c) => self.convert_custom(c),
        };
        Some(converted)
    }

    fn convert_custom(&self, value: &CustomValue) -> String {
        self.converters
            .get(&value.value_type_id())
            .and_then(|converter| converter(value))
            .unwrap_or_else(|| value.to_string())
    }
}

#[derive(Default)]
pub struct ConversionServiceBuilder {
    converters: HashMap<TypeId, Converter>,
    date_fraction_digits: Option<u8>,
}

impl ConversionServiceBuilder {
    /// Register a converter for values wrapped with [`Value::custom`].
    pub fn register<T, F>(mut self, converter: F) -> Self
    where
        T: Any,
        F: Fn(&T) -> String + Send + Sync + 'static,
    {
        let erased: Converter = Arc::new(move |value: &CustomValue| {
            value.downcast_ref::<T>().map(&converter)
        });
        self.converters.insert(TypeId::of::<T>(), erased);
        self
    }

    /// Fractional second digits for rendered dates (0, 3, 6 or 9).
    pub fn date_fraction_digits(mut self, digits: u8) -> Self {
        self.date_fraction_digits = Some(digits);
        self
    }

    pub fn build(self) -> Result<ConversionService> {
        let date_format = match self.date_fraction_digits {
            Some(digits) => seconds_format(digits)?,
            None => SecondsFormat::Millis,
        };
        Ok(ConversionService {
            converters: self.converters,
            date_format,
        })
    }
}
