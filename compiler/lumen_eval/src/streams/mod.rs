//! Stream histories and the produce queue.
//!
//! Each builtin stream keeps a bounded, append-only history whose last
//! entry is its latest value. External sources never touch histories
//! directly: they queue values through a [`StreamSender`], and
//! [`Evaluator::tick`](crate::Evaluator::tick) drains the queue into the
//! histories and re-evaluates once, however many values arrived.

use std::collections::VecDeque;
use std::sync::Arc;

use lumen_types::{StreamKind, Unit};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::errors::ProduceError;
use crate::value::Number;
use crate::Value;

/// Value a stream holds before anything is produced.
pub fn initial_value(kind: StreamKind) -> Value {
    match kind {
        StreamKind::Time => Value::number(0.0, Unit::base("ms")),
        StreamKind::Key => Value::text(""),
        StreamKind::Pointer => {
            let zero = Value::number(0.0, Unit::base("px"));
            Value::list(vec![zero.clone(), zero])
        }
        StreamKind::Button => Value::Boolean(false),
        StreamKind::Mic => Value::unitless(0.0),
    }
}

/// Check `value` against what `kind` carries. Unitless numbers take the
/// stream's unit, so `Time` accepts `5` as `5ms`; numbers in another unit
/// of the same dimensions are scaled, so `2s` arrives as `2000ms`.
pub fn coerce(kind: StreamKind, value: Value) -> Result<Value, ProduceError> {
    let wrong = || ProduceError::WrongValue {
        stream: kind.name().to_string(),
        expected: kind.item_type().to_string(),
    };
    match (kind, value) {
        (StreamKind::Time, Value::Number(number)) => {
            measure(&number, &Unit::base("ms")).ok_or_else(wrong)
        }
        (StreamKind::Mic, Value::Number(number)) => {
            measure(&number, &Unit::unitless()).ok_or_else(wrong)
        }
        (StreamKind::Key, value @ Value::Text(_)) | (StreamKind::Button, value @ Value::Boolean(_)) => {
            Ok(value)
        }
        (StreamKind::Pointer, Value::List(items)) if items.len() == 2 => {
            let pixels = Unit::base("px");
            let position = items
                .iter()
                .map(|item| item.as_number().and_then(|number| measure(number, &pixels)))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(wrong)?;
            Ok(Value::list(position))
        }
        _ => Err(wrong()),
    }
}

/// `number` expressed in `unit`, if the two measure the same thing.
fn measure(number: &Number, unit: &Unit) -> Option<Value> {
    if number.unit.is_unitless() {
        return Some(Value::number(number.magnitude, unit.clone()));
    }
    let factor = number.unit.conversion_factor(unit)?;
    Some(Value::number(number.magnitude * factor, unit.clone()))
}

#[derive(Clone, Debug)]
struct History {
    values: VecDeque<Value>,
    /// Pass in which the newest value first becomes visible.
    updated: u64,
}

/// Every stream's retained history.
#[derive(Clone, Debug)]
pub struct StreamRegistry {
    histories: FxHashMap<StreamKind, History>,
    limit: usize,
}

impl StreamRegistry {
    /// Registry with each stream holding its initial value and keeping at
    /// most `limit` values (at least two, so `←` always has a prior value).
    pub fn new(limit: usize) -> Self {
        let histories = StreamKind::ALL
            .into_iter()
            .map(|kind| {
                let mut values = VecDeque::new();
                values.push_back(initial_value(kind));
                (kind, History { values, updated: 0 })
            })
            .collect();
        StreamRegistry {
            histories,
            limit: limit.max(2),
        }
    }

    /// Replace a stream's history with a single starting value.
    pub fn seed(&mut self, kind: StreamKind, value: Value) {
        if let Some(history) = self.histories.get_mut(&kind) {
            history.values.clear();
            history.values.push_back(value);
            history.updated = 0;
        }
    }

    /// Append a value that becomes visible in pass `pass`.
    pub fn push(&mut self, kind: StreamKind, value: Value, pass: u64) {
        let limit = self.limit;
        if let Some(history) = self.histories.get_mut(&kind) {
            history.values.push_back(value);
            while history.values.len() > limit {
                history.values.pop_front();
            }
            history.updated = pass;
        }
    }

    pub fn latest(&self, kind: StreamKind) -> Value {
        self.histories
            .get(&kind)
            .and_then(|history| history.values.back().cloned())
            .unwrap_or_else(|| initial_value(kind))
    }

    /// The value `offset` entries before the latest; `None` past the
    /// retained history.
    pub fn previous(&self, kind: StreamKind, offset: usize) -> Option<Value> {
        let history = self.histories.get(&kind)?;
        let index = history.values.len().checked_sub(offset.checked_add(1)?)?;
        history.values.get(index).cloned()
    }

    /// Whether a value arrived for pass `pass`.
    pub fn changed(&self, kind: StreamKind, pass: u64) -> bool {
        self.histories
            .get(&kind)
            .is_some_and(|history| history.updated == pass)
    }

    /// Retained values, oldest first.
    pub fn history(&self, kind: StreamKind) -> Vec<Value> {
        self.histories
            .get(&kind)
            .map(|history| history.values.iter().cloned().collect())
            .unwrap_or_default()
    }
}

/// Cloneable, thread-safe handle for queueing stream values.
#[derive(Clone, Debug, Default)]
pub struct StreamSender {
    queue: Arc<Mutex<Vec<(StreamKind, Value)>>>,
}

impl StreamSender {
    /// Queue `value` for the stream named `stream`.
    pub fn produce(&self, stream: &str, value: Value) -> Result<(), ProduceError> {
        let kind = StreamKind::from_name(stream)
            .ok_or_else(|| ProduceError::UnknownStream(stream.to_string()))?;
        self.produce_to(kind, value)
    }

    pub fn produce_to(&self, kind: StreamKind, value: Value) -> Result<(), ProduceError> {
        let value = coerce(kind, value)?;
        tracing::trace!(stream = kind.name(), %value, "queued stream value");
        self.queue.lock().push((kind, value));
        Ok(())
    }

    /// Values queued and not yet drained.
    pub fn pending(&self) -> usize {
        self.queue.lock().len()
    }

    pub(crate) fn drain(&self) -> Vec<(StreamKind, Value)> {
        std::mem::take(&mut *self.queue.lock())
    }
}
