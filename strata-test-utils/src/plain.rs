//! A deliberately simple column codec: one tag byte per value, fixed-width
//! payloads, no actual compression. Decoding validates the whole payload up
//! front so malformed bytes fail at iterator open.

use strata_decompress::{Codec, DecodeIterator};
use strata_result::{Error, Result};
use strata_types::{DataType, Direction, EncodedPayload, ScalarValue};

const TAG_NULL: u8 = 0;
const TAG_INT: u8 = 1;
const TAG_FLOAT: u8 = 2;
const TAG_STR: u8 = 3;
const TAG_BOOL: u8 = 4;

/// Encode a column of scalars into a plain payload.
pub fn encode_values(values: &[ScalarValue]) -> EncodedPayload {
    let mut out = Vec::new();
    for value in values {
        match value {
            ScalarValue::Null => out.push(TAG_NULL),
            ScalarValue::Int(v) => {
                out.push(TAG_INT);
                out.extend_from_slice(&v.to_le_bytes());
            }
            ScalarValue::Float(v) => {
                out.push(TAG_FLOAT);
                out.extend_from_slice(&v.to_le_bytes());
            }
            ScalarValue::Str(v) => {
                out.push(TAG_STR);
                out.extend_from_slice(&(v.len() as u32).to_le_bytes());
                out.extend_from_slice(v.as_bytes());
            }
            ScalarValue::Bool(v) => {
                out.push(TAG_BOOL);
                out.push(*v as u8);
            }
        }
    }
    out.into()
}

/// Codec over [`encode_values`] payloads.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainCodec;

impl Codec for PlainCodec {
    fn open_iterator(
        &self,
        payload: EncodedPayload,
        data_type: DataType,
        direction: Direction,
    ) -> Result<Box<dyn DecodeIterator>> {
        let values = decode_all(&payload, data_type)?;
        Ok(Box::new(PlainIterator {
            values,
            direction,
            pos: 0,
        }))
    }
}

struct PlainIterator {
    values: Vec<ScalarValue>,
    direction: Direction,
    pos: usize,
}

impl DecodeIterator for PlainIterator {
    fn try_next(&mut self) -> Result<Option<ScalarValue>> {
        if self.pos >= self.values.len() {
            return Ok(None);
        }
        let idx = match self.direction {
            Direction::Forward => self.pos,
            Direction::Reverse => self.values.len() - 1 - self.pos,
        };
        self.pos += 1;
        Ok(Some(self.values[idx].clone()))
    }
}

fn decode_all(payload: &[u8], data_type: DataType) -> Result<Vec<ScalarValue>> {
    let mut values = Vec::new();
    let mut at = 0usize;
    while at < payload.len() {
        let tag = payload[at];
        at += 1;
        let value = match tag {
            TAG_NULL => ScalarValue::Null,
            TAG_INT => ScalarValue::Int(i64::from_le_bytes(take::<8>(payload, &mut at)?)),
            TAG_FLOAT => ScalarValue::Float(f64::from_le_bytes(take::<8>(payload, &mut at)?)),
            TAG_STR => {
                let len = u32::from_le_bytes(take::<4>(payload, &mut at)?) as usize;
                let end = at
                    .checked_add(len)
                    .filter(|end| *end <= payload.len())
                    .ok_or_else(|| Error::CorruptData("plain payload truncated".into()))?;
                let s = std::str::from_utf8(&payload[at..end]).map_err(Error::corrupt_data)?;
                at = end;
                ScalarValue::Str(s.into())
            }
            TAG_BOOL => ScalarValue::Bool(take::<1>(payload, &mut at)?[0] != 0),
            other => {
                return Err(Error::CorruptData(format!(
                    "plain payload has unknown value tag {other}"
                )));
            }
        };
        if let Some(got) = value.data_type() {
            if got != data_type {
                return Err(Error::CorruptData(format!(
                    "plain payload holds {got:?} where {data_type:?} was declared"
                )));
            }
        }
        values.push(value);
    }
    Ok(values)
}

fn take<const N: usize>(payload: &[u8], at: &mut usize) -> Result<[u8; N]> {
    let end = at
        .checked_add(N)
        .filter(|end| *end <= payload.len())
        .ok_or_else(|| Error::CorruptData("plain payload truncated".into()))?;
    let mut buf = [0u8; N];
    buf.copy_from_slice(&payload[*at..end]);
    *at = end;
    Ok(buf)
}
