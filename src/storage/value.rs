// ============================================
// Block Value - Значение, привязанное к блоку
// ============================================
// Закрытый набор вариантов вместо "любого JSON".
// Null не представим: отсутствие значения = None на уровне API.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::StoreError;

/// Максимальная вложенность списков/карт. Глубже - декодер JSON
/// не прочитает запись обратно, поэтому такие значения не сохраняем.
pub const MAX_NESTING: usize = 64;

/// Структурированное значение блока
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BlockValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<BlockValue>),
    Map(BTreeMap<String, BlockValue>),
}

impl BlockValue {
    /// Пустая карта для построения вложенных значений
    pub fn map() -> Self {
        BlockValue::Map(BTreeMap::new())
    }

    /// Добавить поле (только для Map, иначе значение не меняется)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<BlockValue>) -> Self {
        if let BlockValue::Map(ref mut fields) = self {
            fields.insert(key.into(), value.into());
        }
        self
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            BlockValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            BlockValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            BlockValue::Float(v) => Some(*v),
            BlockValue::Integer(v) => Some(*v as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            BlockValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Поле карты по ключу
    pub fn get(&self, key: &str) -> Option<&BlockValue> {
        match self {
            BlockValue::Map(fields) => fields.get(key),
            _ => None,
        }
    }

    /// Первый непредставимый фрагмент (NaN / бесконечность / слишком глубокая
    /// вложенность), если есть
    pub(crate) fn find_unrepresentable(&self) -> Option<String> {
        self.find_unrepresentable_at(0)
    }

    fn find_unrepresentable_at(&self, depth: usize) -> Option<String> {
        match self {
            BlockValue::Float(v) if !v.is_finite() => Some(format!("non-finite float {}", v)),
            BlockValue::List(_) | BlockValue::Map(_) if depth >= MAX_NESTING => {
                Some(format!("nesting deeper than {} levels", MAX_NESTING))
            }
            BlockValue::List(items) => {
                items.iter().find_map(|v| v.find_unrepresentable_at(depth + 1))
            }
            BlockValue::Map(fields) => fields.iter().find_map(|(k, v)| {
                v.find_unrepresentable_at(depth + 1)
                    .map(|why| format!("{} (at key '{}')", why, k))
            }),
            _ => None,
        }
    }
}

impl fmt::Display for BlockValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(s) => f.write_str(&s),
            Err(_) => write!(f, "{:?}", self),
        }
    }
}

impl From<bool> for BlockValue {
    fn from(v: bool) -> Self {
        BlockValue::Bool(v)
    }
}

impl From<i64> for BlockValue {
    fn from(v: i64) -> Self {
        BlockValue::Integer(v)
    }
}

impl From<f64> for BlockValue {
    fn from(v: f64) -> Self {
        BlockValue::Float(v)
    }
}

impl From<&str> for BlockValue {
    fn from(v: &str) -> Self {
        BlockValue::String(v.to_string())
    }
}

impl From<String> for BlockValue {
    fn from(v: String) -> Self {
        BlockValue::String(v)
    }
}

impl<T: Into<BlockValue>> From<Vec<T>> for BlockValue {
    fn from(items: Vec<T>) -> Self {
        BlockValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<BTreeMap<String, BlockValue>> for BlockValue {
    fn from(fields: BTreeMap<String, BlockValue>) -> Self {
        BlockValue::Map(fields)
    }
}

/// Из произвольного JSON: null на любой глубине отклоняется
impl TryFrom<serde_json::Value> for BlockValue {
    type Error = StoreError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        use serde_json::Value;

        match value {
            Value::Null => Err(StoreError::UnsupportedValue("null is not a storable value".into())),
            Value::Bool(b) => Ok(BlockValue::Bool(b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(BlockValue::Integer(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(BlockValue::Float(f))
                } else {
                    Err(StoreError::UnsupportedValue(format!("number {} out of range", n)))
                }
            }
            Value::String(s) => Ok(BlockValue::String(s)),
            Value::Array(items) => items
                .into_iter()
                .map(BlockValue::try_from)
                .collect::<Result<Vec<_>, _>>()
                .map(BlockValue::List),
            Value::Object(fields) => fields
                .into_iter()
                .map(|(k, v)| BlockValue::try_from(v).map(|v| (k, v)))
                .collect::<Result<BTreeMap<_, _>, _>>()
                .map(BlockValue::Map),
        }
    }
}
