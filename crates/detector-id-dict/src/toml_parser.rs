//! TOML parser for identifier dictionaries.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::fnv1a_64;

/// How identifier construction checks field tuples against the legal ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckMode {
    /// Pack without looking at the ranges.
    Fast,
    /// Match every tuple against the legal ranges before packing (default)
    #[default]
    Strict,
}

/// What a strict check does with a tuple outside the legal ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OnViolation {
    /// Log a warning and pack the tuple anyway (default)
    #[default]
    Warn,
    /// Refuse to build the identifier
    Error,
}

/// Validation settings, read from the `[checks]` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Checks {
    #[serde(default)]
    pub mode: CheckMode,
    #[serde(default)]
    pub on_violation: OnViolation,
}

impl Checks {
    /// No range checks.
    pub const FAST: Self = Self::new(CheckMode::Fast, OnViolation::Warn);
    /// Range checks that reject violating tuples.
    pub const REJECT: Self = Self::new(CheckMode::Strict, OnViolation::Error);

    pub const fn new(mode: CheckMode, on_violation: OnViolation) -> Self {
        Self { mode, on_violation }
    }
}

/// Topological navigation axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Z,
    Phi,
    Eta,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::Z, Axis::Phi, Axis::Eta];

    /// Dense index, usable for per-axis arrays.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            Axis::Z => "z",
            Axis::Phi => "phi",
            Axis::Eta => "eta",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Source structure (as written in the dictionary file)
// =============================================================================

/// Unresolved dictionary, as deserialized from TOML (or any serde format).
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DictionarySource {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub checks: Checks,
    #[serde(rename = "field", default)]
    pub fields: Vec<FieldSource>,
    /// Each region maps field names to domains.
    #[serde(rename = "region", default)]
    pub regions: Vec<BTreeMap<String, DomainSource>>,
    #[serde(rename = "detector", default)]
    pub detectors: Vec<DetectorSource>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldSource {
    pub name: String,
    /// Explicit bit width; derived from the value span when absent.
    #[serde(default)]
    pub bits: Option<u8>,
    #[serde(default)]
    pub labels: BTreeMap<String, i32>,
}

/// A field value: an integer or a label of the field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ValueSource {
    Int(i64),
    Label(String),
}

/// A field domain inside a region.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DomainSource {
    Single(ValueSource),
    Range { min: ValueSource, max: ValueSource },
    List(Vec<ValueSource>),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DetectorSource {
    pub name: String,
    #[serde(default)]
    pub prefix: BTreeMap<String, ValueSource>,
    pub hash_level: String,
    #[serde(default)]
    pub axes: Vec<AxisSource>,
    #[serde(default)]
    pub other_side: Option<String>,
    #[serde(default)]
    pub require_pairing: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AxisSource {
    pub axis: Axis,
    pub field: String,
    #[serde(default)]
    pub container: Option<String>,
}

// =============================================================================
// Resolved dictionary
// =============================================================================

/// A validated identifier dictionary with every label resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dictionary {
    pub name: String,
    /// Version tag (explicit or fingerprint-derived).
    pub version: String,
    pub checks: Checks,
    fields: Vec<FieldDesc>,
    regions: Vec<RegionDesc>,
    detectors: Vec<DetectorDesc>,
}

/// One identifier field, in schema order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDesc {
    pub name: String,
    pub bits: Option<u8>,
    pub labels: BTreeMap<String, i32>,
}

impl FieldDesc {
    /// Integer value of a named label.
    pub fn label(&self, label: &str) -> Option<i32> {
        self.labels.get(label).copied()
    }

    /// First label carrying `value`, if any.
    pub fn label_of(&self, value: i32) -> Option<&str> {
        self.labels
            .iter()
            .find(|&(_, &v)| v == value)
            .map(|(k, _)| k.as_str())
    }
}

/// Legal values of one field inside a region.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DomainDesc {
    /// Inclusive range.
    Range { min: i32, max: i32 },
    /// Sorted, deduplicated, non-empty.
    Values(Vec<i32>),
}

impl DomainDesc {
    pub fn min(&self) -> i32 {
        match self {
            Self::Range { min, .. } => *min,
            Self::Values(values) => values[0],
        }
    }

    pub fn max(&self) -> i32 {
        match self {
            Self::Range { max, .. } => *max,
            Self::Values(values) => values[values.len() - 1],
        }
    }
}

/// One Cartesian block; `domains[i]` belongs to field `i`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionDesc {
    pub domains: Vec<DomainDesc>,
}

/// A detector carved out of the dictionary by fixing its leading fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectorDesc {
    pub name: String,
    /// Values of fields `0..prefix.len()`.
    pub prefix: Vec<i32>,
    /// Field naming the primary (materialized) hash context.
    pub hash_level: String,
    pub axes: Vec<AxisDesc>,
    pub other_side: Option<String>,
    pub require_pairing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AxisDesc {
    pub axis: Axis,
    pub field: String,
    pub container: Option<String>,
}

impl Dictionary {
    /// Parse from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, DictionaryError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| DictionaryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_str(&content)
    }

    /// Parse from a TOML string.
    pub fn from_str(content: &str) -> Result<Self, DictionaryError> {
        let source: DictionarySource = toml::from_str(content)?;
        Self::from_source(source)
    }

    /// Resolve and validate an already deserialized description.
    pub fn from_source(source: DictionarySource) -> Result<Self, DictionaryError> {
        let name = source.name.trim().to_string();
        if name.is_empty() {
            return Err(DictionaryError::Validation {
                dictionary: "<unnamed>".into(),
                message: "dictionary name must not be empty".into(),
            });
        }
        let invalid = |message: String| DictionaryError::Validation {
            dictionary: name.clone(),
            message,
        };

        let fields = Self::resolve_fields(source.fields).map_err(&invalid)?;
        let index: HashMap<&str, usize> = fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name.as_str(), i))
            .collect();

        let mut regions = Vec::with_capacity(source.regions.len());
        for (n, raw) in source.regions.iter().enumerate() {
            regions.push(Self::resolve_region(n, raw, &fields, &index).map_err(&invalid)?);
        }

        let mut detectors: Vec<DetectorDesc> = Vec::with_capacity(source.detectors.len());
        for raw in source.detectors {
            if detectors.iter().any(|d| d.name == raw.name) {
                return Err(invalid(format!("duplicate detector '{}'", raw.name)));
            }
            detectors.push(Self::resolve_detector(raw, &fields, &index).map_err(&invalid)?);
        }

        let mut dictionary = Self {
            name,
            version: String::new(),
            checks: source.checks,
            fields,
            regions,
            detectors,
        };
        dictionary.version = match source.version.map(|v| v.trim().to_string()) {
            Some(v) if !v.is_empty() => v,
            _ => format!("{}@{:016x}", dictionary.name, dictionary.fingerprint()),
        };
        Ok(dictionary)
    }

    /// All fields, shallow to deep.
    pub fn fields(&self) -> &[FieldDesc] {
        &self.fields
    }

    /// Field index and description by name.
    pub fn field(&self, name: &str) -> Option<(usize, &FieldDesc)> {
        self.fields.iter().enumerate().find(|(_, f)| f.name == name)
    }

    pub fn regions(&self) -> &[RegionDesc] {
        &self.regions
    }

    pub fn detectors(&self) -> &[DetectorDesc] {
        &self.detectors
    }

    pub fn detector(&self, name: &str) -> Option<&DetectorDesc> {
        self.detectors.iter().find(|d| d.name == name)
    }

    /// FNV-1a hash over a canonical rendering of the resolved content.
    ///
    /// The version tag does not take part in it.
    pub fn fingerprint(&self) -> u64 {
        let mut canon = String::new();
        canon.push_str(&format!("dictionary {}\n", self.name));
        canon.push_str(&format!("checks {:?}\n", self.checks));
        for field in &self.fields {
            canon.push_str(&format!("field {} {:?} {:?}\n", field.name, field.bits, field.labels));
        }
        for region in &self.regions {
            canon.push_str(&format!("region {:?}\n", region.domains));
        }
        for detector in &self.detectors {
            canon.push_str(&format!("detector {:?}\n", detector));
        }
        fnv1a_64(canon.as_bytes())
    }

    fn resolve_fields(raw: Vec<FieldSource>) -> Result<Vec<FieldDesc>, String> {
        if raw.is_empty() {
            return Err("at least one field is required".into());
        }
        let mut seen: HashSet<String> = HashSet::new();
        let mut fields = Vec::with_capacity(raw.len());
        for field in raw {
            validate_name(&field.name)?;
            if !seen.insert(field.name.clone()) {
                return Err(format!("duplicate field '{}'", field.name));
            }
            if let Some(bits) = field.bits
                && !(1..=32).contains(&bits)
            {
                return Err(format!(
                    "field '{}' declares {} bits, expected 1 to 32",
                    field.name, bits
                ));
            }
            fields.push(FieldDesc {
                name: field.name,
                bits: field.bits,
                labels: field.labels,
            });
        }
        Ok(fields)
    }

    fn resolve_region(
        n: usize,
        raw: &BTreeMap<String, DomainSource>,
        fields: &[FieldDesc],
        index: &HashMap<&str, usize>,
    ) -> Result<RegionDesc, String> {
        if raw.is_empty() {
            return Err(format!("region #{} names no fields", n));
        }
        let mut slots: Vec<Option<DomainDesc>> = vec![None; fields.len()];
        for (key, domain) in raw {
            let &i = index
                .get(key.as_str())
                .ok_or_else(|| format!("region #{} uses unknown field '{}'", n, key))?;
            slots[i] = Some(resolve_domain(&fields[i], domain).map_err(|e| format!("region #{}: {}", n, e))?);
        }

        let len = raw.len();
        if let Some(gap) = slots[..len].iter().position(Option::is_none) {
            return Err(format!(
                "region #{} skips field '{}'; regions must name a contiguous run of fields from '{}'",
                n, fields[gap].name, fields[0].name
            ));
        }
        Ok(RegionDesc {
            domains: slots.into_iter().take(len).flatten().collect(),
        })
    }

    fn resolve_detector(
        raw: DetectorSource,
        fields: &[FieldDesc],
        index: &HashMap<&str, usize>,
    ) -> Result<DetectorDesc, String> {
        validate_name(&raw.name)?;

        let mut slots: Vec<Option<i32>> = vec![None; fields.len()];
        for (key, value) in &raw.prefix {
            let &i = index.get(key.as_str()).ok_or_else(|| {
                format!("detector '{}' prefix uses unknown field '{}'", raw.name, key)
            })?;
            slots[i] = Some(resolve_value(&fields[i], value)?);
        }
        let len = raw.prefix.len();
        if let Some(gap) = slots[..len].iter().position(Option::is_none) {
            return Err(format!(
                "detector '{}' prefix skips field '{}'",
                raw.name, fields[gap].name
            ));
        }

        let mut axes: Vec<AxisDesc> = Vec::with_capacity(raw.axes.len());
        for axis in raw.axes {
            if axes.iter().any(|a| a.axis == axis.axis) {
                return Err(format!(
                    "detector '{}' declares axis '{}' twice",
                    raw.name, axis.axis
                ));
            }
            axes.push(AxisDesc {
                axis: axis.axis,
                field: axis.field,
                container: axis.container,
            });
        }

        let require_pairing = raw.require_pairing.unwrap_or(raw.other_side.is_some());
        if require_pairing && raw.other_side.is_none() {
            return Err(format!(
                "detector '{}' requires pairing but names no other_side field",
                raw.name
            ));
        }

        Ok(DetectorDesc {
            name: raw.name,
            prefix: slots.into_iter().take(len).flatten().collect(),
            hash_level: raw.hash_level,
            axes,
            other_side: raw.other_side,
            require_pairing,
        })
    }
}

fn resolve_value(field: &FieldDesc, value: &ValueSource) -> Result<i32, String> {
    match value {
        ValueSource::Int(v) => i32::try_from(*v)
            .map_err(|_| format!("value {} for field '{}' does not fit in 32 bits", v, field.name)),
        ValueSource::Label(label) => field
            .label(label)
            .ok_or_else(|| format!("unknown label '{}' for field '{}'", label, field.name)),
    }
}

fn resolve_domain(field: &FieldDesc, domain: &DomainSource) -> Result<DomainDesc, String> {
    match domain {
        DomainSource::Single(value) => {
            let v = resolve_value(field, value)?;
            Ok(DomainDesc::Range { min: v, max: v })
        }
        DomainSource::Range { min, max } => {
            let (min, max) = (resolve_value(field, min)?, resolve_value(field, max)?);
            if min > max {
                return Err(format!(
                    "field '{}' has min {} greater than max {}",
                    field.name, min, max
                ));
            }
            Ok(DomainDesc::Range { min, max })
        }
        DomainSource::List(values) => {
            if values.is_empty() {
                return Err(format!("field '{}' has an empty value list", field.name));
            }
            let mut resolved = values
                .iter()
                .map(|v| resolve_value(field, v))
                .collect::<Result<Vec<_>, _>>()?;
            resolved.sort_unstable();
            resolved.dedup();
            Ok(DomainDesc::Values(resolved))
        }
    }
}

/// Names must start with a letter or underscore and contain only
/// alphanumerics and underscores.
fn validate_name(name: &str) -> Result<(), String> {
    let mut chars = name.chars();
    match chars.next() {
        None => return Err("empty name not allowed".into()),
        Some(first) if !first.is_alphabetic() && first != '_' => {
            return Err(format!(
                "invalid name '{}': must start with letter or underscore",
                name
            ));
        }
        Some(_) => {}
    }
    for c in chars {
        if !c.is_alphanumeric() && c != '_' {
            return Err(format!("invalid name '{}': contains invalid character '{}'", name, c));
        }
    }
    Ok(())
}

/// Errors during dictionary loading.
#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid dictionary '{dictionary}': {message}")]
    Validation { dictionary: String, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    const VETO: &str = r#"
name = "Scintillator"

[[field]]
name = "part"
labels = { Veto = 0, Trigger = 1 }

[[field]]
name = "station"

[[field]]
name = "plate"

[[region]]
part = "Veto"
station = { min = 0, max = 1 }
plate = [1, 0, 1]

[[region]]
part = "Trigger"
station = 0

[[detector]]
name = "Veto"
prefix = { part = "Veto" }
hash_level = "plate"
axes = [{ axis = "z", field = "plate", container = "station" }]
"#;

    fn with_body(body: &str) -> String {
        format!(
            r#"
name = "Test"

[[field]]
name = "part"
labels = {{ Veto = 0 }}

[[field]]
name = "station"

[[field]]
name = "plate"
{}
"#,
            body
        )
    }

    fn validation_message(result: Result<Dictionary, DictionaryError>) -> String {
        match result {
            Err(DictionaryError::Validation { message, .. }) => message,
            other => panic!("expected a validation error, got {:?}", other),
        }
    }

    #[test]
    fn parse_simple_dictionary() {
        let dict = Dictionary::from_str(VETO).unwrap();

        assert_eq!(dict.name, "Scintillator");
        assert_eq!(dict.fields().len(), 3);
        assert_eq!(dict.field("plate").map(|(i, _)| i), Some(2));
        assert_eq!(dict.regions().len(), 2);

        let veto = &dict.regions()[0];
        assert_eq!(
            veto.domains,
            vec![
                DomainDesc::Range { min: 0, max: 0 },
                DomainDesc::Range { min: 0, max: 1 },
                DomainDesc::Values(vec![0, 1]),
            ]
        );

        // Regions may stop before the deepest field.
        assert_eq!(dict.regions()[1].domains.len(), 2);
        assert_eq!(dict.regions()[1].domains[0], DomainDesc::Range { min: 1, max: 1 });
    }

    #[test]
    fn detector_is_resolved() {
        let dict = Dictionary::from_str(VETO).unwrap();
        let veto = dict.detector("Veto").unwrap();

        assert_eq!(veto.prefix, vec![0]);
        assert_eq!(veto.hash_level, "plate");
        assert_eq!(veto.axes.len(), 1);
        assert_eq!(veto.axes[0].axis, Axis::Z);
        assert_eq!(veto.axes[0].container.as_deref(), Some("station"));
        assert!(!veto.require_pairing);
    }

    #[test]
    fn labels_round_trip() {
        let dict = Dictionary::from_str(VETO).unwrap();
        let (_, part) = dict.field("part").unwrap();
        assert_eq!(part.label("Trigger"), Some(1));
        assert_eq!(part.label_of(0), Some("Veto"));
        assert_eq!(part.label("Nope"), None);
    }

    #[test]
    fn checks_default_to_strict_warn() {
        let dict = Dictionary::from_str(VETO).unwrap();
        assert_eq!(dict.checks.mode, CheckMode::Strict);
        assert_eq!(dict.checks.on_violation, OnViolation::Warn);
    }

    #[test]
    fn checks_explicit() {
        let toml = format!("{}\n[checks]\nmode = \"fast\"\non_violation = \"error\"\n", VETO);
        let dict = Dictionary::from_str(&toml).unwrap();
        assert_eq!(dict.checks, Checks::new(CheckMode::Fast, OnViolation::Error));
    }

    #[test]
    fn checks_invalid_value() {
        let toml = format!("{}\n[checks]\nmode = \"sloppy\"\n", VETO);
        let err = Dictionary::from_str(&toml).unwrap_err();
        assert!(matches!(err, DictionaryError::Parse(_)));
    }

    #[test]
    fn rejects_misspelled_keys() {
        // `axis` instead of `axes`.
        let toml = VETO.replace("axes = [", "axis = [");
        let err = Dictionary::from_str(&toml).unwrap_err();
        assert!(matches!(err, DictionaryError::Parse(_)));
        assert!(err.to_string().contains("axis"), "{}", err);

        let toml = VETO.replace("name = \"station\"", "name = \"station\"\nbit = 4");
        assert!(matches!(Dictionary::from_str(&toml), Err(DictionaryError::Parse(_))));

        let toml = VETO.replace("container = \"station\"", "containter = \"station\"");
        assert!(matches!(Dictionary::from_str(&toml), Err(DictionaryError::Parse(_))));
    }

    #[test]
    fn explicit_version_is_kept() {
        let toml = format!("version = \"v7\"\n{}", VETO);
        let dict = Dictionary::from_str(&toml).unwrap();
        assert_eq!(dict.version, "v7");
    }

    #[test]
    fn derived_version_tracks_content() {
        let a = Dictionary::from_str(VETO).unwrap();
        let b = Dictionary::from_str(VETO).unwrap();
        assert_eq!(a.version, b.version);
        assert!(a.version.starts_with("Scintillator@"));

        let c = Dictionary::from_str(&VETO.replace("max = 1 }", "max = 2 }")).unwrap();
        assert_ne!(a.version, c.version);
    }

    #[test]
    fn equivalent_spellings_share_a_version() {
        // [1, 0, 1] and [0, 1] resolve to the same domain.
        let a = Dictionary::from_str(VETO).unwrap();
        let b = Dictionary::from_str(&VETO.replace("plate = [1, 0, 1]", "plate = [0, 1]")).unwrap();
        assert_eq!(a.version, b.version);
    }

    #[test]
    fn rejects_unknown_region_field() {
        let msg = validation_message(Dictionary::from_str(&with_body(
            "[[region]]\npart = 0\nmodule = 3\n",
        )));
        assert!(msg.contains("unknown field 'module'"), "{}", msg);
    }

    #[test]
    fn rejects_region_gap() {
        let msg = validation_message(Dictionary::from_str(&with_body(
            "[[region]]\npart = 0\nplate = 3\n",
        )));
        assert!(msg.contains("skips field 'station'"), "{}", msg);
    }

    #[test]
    fn rejects_inverted_range() {
        let msg = validation_message(Dictionary::from_str(&with_body(
            "[[region]]\npart = 0\nstation = { min = 2, max = 1 }\n",
        )));
        assert!(msg.contains("greater than max"), "{}", msg);
    }

    #[test]
    fn rejects_empty_list() {
        let msg = validation_message(Dictionary::from_str(&with_body(
            "[[region]]\npart = 0\nstation = []\n",
        )));
        assert!(msg.contains("empty value list"), "{}", msg);
    }

    #[test]
    fn rejects_unknown_label() {
        let msg = validation_message(Dictionary::from_str(&with_body(
            "[[region]]\npart = \"Calorimeter\"\n",
        )));
        assert!(msg.contains("unknown label 'Calorimeter'"), "{}", msg);
    }

    #[test]
    fn rejects_duplicate_field() {
        let toml = r#"
name = "Dup"
[[field]]
name = "a"
[[field]]
name = "a"
"#;
        let msg = validation_message(Dictionary::from_str(toml));
        assert!(msg.contains("duplicate field 'a'"), "{}", msg);
    }

    #[test]
    fn rejects_invalid_field_names() {
        for case in ["1st", "plate-id", "with space", ""] {
            let toml = format!("name = \"Bad\"\n[[field]]\nname = \"{}\"\n", case);
            assert!(
                matches!(
                    Dictionary::from_str(&toml),
                    Err(DictionaryError::Validation { .. })
                ),
                "Should reject: {}",
                case
            );
        }
    }

    #[test]
    fn rejects_zero_width_field() {
        let toml = "name = \"Bad\"\n[[field]]\nname = \"a\"\nbits = 0\n";
        let msg = validation_message(Dictionary::from_str(toml));
        assert!(msg.contains("expected 1 to 32"), "{}", msg);
    }

    #[test]
    fn rejects_prefix_gap() {
        let msg = validation_message(Dictionary::from_str(&with_body(
            "[[detector]]\nname = \"X\"\nprefix = { station = 0 }\nhash_level = \"plate\"\n",
        )));
        assert!(msg.contains("prefix skips field 'part'"), "{}", msg);
    }

    #[test]
    fn rejects_duplicate_axis() {
        let msg = validation_message(Dictionary::from_str(&with_body(
            r#"[[detector]]
name = "X"
hash_level = "plate"
axes = [{ axis = "z", field = "plate" }, { axis = "z", field = "station" }]
"#,
        )));
        assert!(msg.contains("declares axis 'z' twice"), "{}", msg);
    }

    #[test]
    fn rejects_duplicate_detector() {
        let msg = validation_message(Dictionary::from_str(&with_body(
            "[[detector]]\nname = \"X\"\nhash_level = \"plate\"\n[[detector]]\nname = \"X\"\nhash_level = \"plate\"\n",
        )));
        assert!(msg.contains("duplicate detector 'X'"), "{}", msg);
    }

    #[test]
    fn pairing_defaults_follow_other_side() {
        let dict = Dictionary::from_str(&with_body(
            "[[detector]]\nname = \"X\"\nhash_level = \"plate\"\nother_side = \"plate\"\n",
        ))
        .unwrap();
        assert!(dict.detector("X").unwrap().require_pairing);

        let msg = validation_message(Dictionary::from_str(&with_body(
            "[[detector]]\nname = \"X\"\nhash_level = \"plate\"\nrequire_pairing = true\n",
        )));
        assert!(msg.contains("names no other_side field"), "{}", msg);
    }

    #[test]
    fn rejects_value_outside_i32() {
        let msg = validation_message(Dictionary::from_str(&with_body(
            "[[region]]\npart = 4294967296\n",
        )));
        assert!(msg.contains("does not fit in 32 bits"), "{}", msg);
    }
}
