//! Field layout — bit allocation of identifier fields, resolved once per dictionary.
//!
//! Fields are packed from bit 63 downward in dictionary order:
//!
//! ```text
//! ┌──────────────┬──────────────┬─────┬──────────────┬───────────┐
//! │ field 0      │ field 1      │ ... │ field n-1    │ unused    │
//! │ [63:64-w0]   │ next w1 bits │     │ last wn bits │ zeros     │
//! └──────────────┴──────────────┴─────┴──────────────┴───────────┘
//! ```
//!
//! A field stores `value - bias`, where `bias` is `min(0, lowest legal
//! value)`. Positive fields therefore pack raw, and fields with negative
//! values (such as `eta_module = -1`) still sort in numeric order.

use std::collections::BTreeMap;

use detector_id_dict::Dictionary;

use crate::error::IdError;
use crate::{Context, Identifier};

/// Total identifier width.
pub const IDENTIFIER_BITS: u32 = 64;

/// Widest single field; values are `i32`.
const MAX_FIELD_BITS: u32 = 32;

/// One resolved field: name, bit position and value bias.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    name: String,
    offset: u32,
    width: u32,
    bias: i32,
    labels: BTreeMap<String, i32>,
}

impl Field {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position of the lowest bit.
    #[inline]
    pub const fn offset(&self) -> u32 {
        self.offset
    }

    #[inline]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Smallest encodable value.
    #[inline]
    pub const fn min_value(&self) -> i32 {
        self.bias
    }

    /// Largest encodable value.
    #[inline]
    pub const fn max_value(&self) -> i64 {
        self.bias as i64 + self.mask() as i64
    }

    /// Mask of the field bits, before shifting.
    #[inline]
    pub const fn mask(&self) -> u64 {
        (1u64 << self.width) - 1
    }

    /// Bits for `value`; values outside the field width wrap.
    #[inline]
    pub const fn encode(&self, value: i32) -> u64 {
        ((value as i64 - self.bias as i64) as u64) & self.mask()
    }

    #[inline]
    pub const fn decode(&self, bits: u64) -> i32 {
        (self.bias as i64 + (bits & self.mask()) as i64) as i32
    }

    /// Integer value of a named label.
    pub fn label(&self, label: &str) -> Option<i32> {
        self.labels.get(label).copied()
    }
}

/// Ordered fields of one dictionary with fixed offsets and widths.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldSchema {
    dictionary: String,
    fields: Vec<Field>,
    /// `context_masks[d]` keeps the bits of fields `0..=d`.
    context_masks: Vec<u64>,
    used_bits: u32,
}

impl FieldSchema {
    /// Resolve the dictionary layout and make sure every `required` field exists.
    ///
    /// Failing here is fatal for the detectors that need the missing field.
    pub fn resolve(dictionary: &Dictionary, required: &[&str]) -> Result<Self, IdError> {
        let schema = Self::from_dictionary(dictionary)?;
        for name in required {
            schema.require(name)?;
        }
        Ok(schema)
    }

    /// Compute offsets and widths for every dictionary field.
    ///
    /// Explicit widths are honored; otherwise a field gets just enough bits
    /// for the span of values used by regions and detector prefixes.
    pub fn from_dictionary(dictionary: &Dictionary) -> Result<Self, IdError> {
        let descs = dictionary.fields();

        // Start at zero so the bias never exceeds 0.
        let mut lowest = vec![0i64; descs.len()];
        let mut highest = vec![0i64; descs.len()];
        for region in dictionary.regions() {
            for (i, domain) in region.domains.iter().enumerate() {
                lowest[i] = lowest[i].min(domain.min() as i64);
                highest[i] = highest[i].max(domain.max() as i64);
            }
        }
        for detector in dictionary.detectors() {
            for (i, &value) in detector.prefix.iter().enumerate() {
                lowest[i] = lowest[i].min(value as i64);
                highest[i] = highest[i].max(value as i64);
            }
        }

        let mut widths = Vec::with_capacity(descs.len());
        for (i, desc) in descs.iter().enumerate() {
            let span = (highest[i] - lowest[i]) as u64;
            let needed = (u64::BITS - span.leading_zeros()).max(1);
            let width = match desc.bits {
                Some(bits) if (bits as u32) < needed => {
                    return Err(IdError::FieldTooNarrow {
                        field: desc.name.clone(),
                        bits: bits as u32,
                        span,
                    });
                }
                Some(bits) => bits as u32,
                None => needed,
            };
            if width > MAX_FIELD_BITS {
                return Err(IdError::FieldTooNarrow {
                    field: desc.name.clone(),
                    bits: MAX_FIELD_BITS,
                    span,
                });
            }
            widths.push(width);
        }

        let used_bits: u32 = widths.iter().sum();
        if used_bits > IDENTIFIER_BITS {
            return Err(IdError::LayoutTooWide { bits: used_bits });
        }

        let mut fields = Vec::with_capacity(descs.len());
        let mut context_masks = Vec::with_capacity(descs.len());
        let mut top = IDENTIFIER_BITS;
        let mut keep = 0u64;
        for (i, desc) in descs.iter().enumerate() {
            let field = Field {
                name: desc.name.clone(),
                offset: top - widths[i],
                width: widths[i],
                bias: lowest[i] as i32,
                labels: desc.labels.clone(),
            };
            top = field.offset;
            keep |= field.mask() << field.offset;
            context_masks.push(keep);
            fields.push(field);
        }

        Ok(Self {
            dictionary: dictionary.name.clone(),
            fields,
            context_masks,
            used_bits,
        })
    }

    /// Name of the dictionary this schema was resolved from.
    pub fn dictionary(&self) -> &str {
        &self.dictionary
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    #[inline]
    pub fn field(&self, index: usize) -> &Field {
        &self.fields[index]
    }

    /// Bits occupied by all fields together.
    pub fn used_bits(&self) -> u32 {
        self.used_bits
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Field index by name, or [`IdError::MissingField`].
    pub fn require(&self, name: &str) -> Result<usize, IdError> {
        self.field_index(name).ok_or_else(|| IdError::MissingField {
            dictionary: self.dictionary.clone(),
            field: name.to_string(),
        })
    }

    /// Context whose deepest field is `name`.
    pub fn context(&self, name: &str) -> Result<Context, IdError> {
        self.require(name).map(Context::new)
    }

    /// Set the bits of one field, masking the value to the field width.
    #[inline]
    pub fn pack(&self, field: usize, value: i32, id: &mut Identifier) {
        let f = &self.fields[field];
        let cleared = id.raw() & !(f.mask() << f.offset);
        *id = Identifier::new(cleared | (f.encode(value) << f.offset));
    }

    #[inline]
    pub fn unpack(&self, field: usize, id: Identifier) -> i32 {
        let f = &self.fields[field];
        f.decode(id.raw() >> f.offset)
    }

    /// Zero the bits of one field.
    #[inline]
    pub fn reset(&self, field: usize, id: &mut Identifier) {
        let f = &self.fields[field];
        *id = Identifier::new(id.raw() & !(f.mask() << f.offset));
    }

    /// Zero every field deeper than `context`.
    ///
    /// `None` if `context` lies past the deepest field.
    #[inline]
    pub fn truncate(&self, id: Identifier, context: Context) -> Option<Identifier> {
        self.context_masks
            .get(context.depth())
            .map(|&mask| Identifier::new(id.raw() & mask))
    }

    /// Pack `tuple[i]` into field `i`; `tuple` may stop before the deepest field.
    pub fn pack_tuple(&self, tuple: &[i32]) -> Identifier {
        debug_assert!(tuple.len() <= self.fields.len());
        let mut id = Identifier::default();
        for (field, &value) in tuple.iter().enumerate() {
            self.pack(field, value, &mut id);
        }
        id
    }

    /// Values of fields `0..=context`; `None` past the deepest field.
    pub fn unpack_tuple(&self, id: Identifier, context: Context) -> Option<Vec<i32>> {
        (context.depth() < self.fields.len()).then(|| {
            (0..context.field_count())
                .map(|field| self.unpack(field, id))
                .collect()
        })
    }
}
