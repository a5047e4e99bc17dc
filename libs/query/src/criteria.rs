//! Criteria tree: predicates on a field, chained into boolean groups.
//!
//! ```text
//! Node::Group ── Clause(AND) ── Node::Criteria(title: [$equals "rust"])
//!            └── Clause(OR)  ── Node::Group (rendered in parentheses)
//!                                   ├── Node::Criteria(price: [$between 10..20])
//!                                   └── Node::Raw("inStock:true")
//! ```
//!
//! Operation keys use the `$name` wire form (`$equals`, `$between`, ...).
//! Keys outside that table are kept as [`PredicateKey::Custom`] and rendered
//! by the default processor.

use crate::error::{Error, Result};
use crate::escape::contains_whitespace;
use crate::field::Field;
use crate::function::Function;
use crate::geo::{Distance, GeoBox, Point};
use crate::value::Value;
use phf::phf_map;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Well-known predicate operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKey {
    Equals,
    Between,
    Near,
    Within,
    Fuzzy,
    Sloppy,
    StartsWith,
    EndsWith,
    Contains,
    Expression,
    Function,
}

static OPERATION_KEYS: phf::Map<&'static str, OperationKey> = phf_map! {
    "$equals" => OperationKey::Equals,
    "$between" => OperationKey::Between,
    "$near" => OperationKey::Near,
    "$within" => OperationKey::Within,
    "$fuzzy" => OperationKey::Fuzzy,
    "$sloppy" => OperationKey::Sloppy,
    "$startsWith" => OperationKey::StartsWith,
    "$endsWith" => OperationKey::EndsWith,
    "$contains" => OperationKey::Contains,
    "$expression" => OperationKey::Expression,
    "$function" => OperationKey::Function,
};

impl OperationKey {
    pub const fn key(self) -> &'static str {
        match self {
            Self::Equals => "$equals",
            Self::Between => "$between",
            Self::Near => "$near",
            Self::Within => "$within",
            Self::Fuzzy => "$fuzzy",
            Self::Sloppy => "$sloppy",
            Self::StartsWith => "$startsWith",
            Self::EndsWith => "$endsWith",
            Self::Contains => "$contains",
            Self::Expression => "$expression",
            Self::Function => "$function",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        OPERATION_KEYS.get(key).copied()
    }

    /// Operations whose fragment names the field itself. One such predicate
    /// drops the `field:` prefix for the whole chain it belongs to.
    pub const fn references_field(self) -> bool {
        matches!(self, Self::Near | Self::Within | Self::Function)
    }
}

/// Predicate key: a known operation or an arbitrary string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PredicateKey {
    Known(OperationKey),
    Custom(String),
}

impl PredicateKey {
    pub fn parse(key: &str) -> Self {
        OperationKey::from_key(key).map_or_else(|| Self::Custom(key.to_string()), Self::Known)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Known(op) => op.key(),
            Self::Custom(key) => key,
        }
    }

    pub fn operation(&self) -> Option<OperationKey> {
        match self {
            Self::Known(op) => Some(*op),
            Self::Custom(_) => None,
        }
    }
}

impl From<String> for PredicateKey {
    fn from(key: String) -> Self {
        Self::parse(&key)
    }
}

impl From<PredicateKey> for String {
    fn from(key: PredicateKey) -> Self {
        match key {
            PredicateKey::Known(op) => op.key().to_string(),
            PredicateKey::Custom(key) => key,
        }
    }
}

impl From<OperationKey> for PredicateKey {
    fn from(op: OperationKey) -> Self {
        Self::Known(op)
    }
}

impl fmt::Display for PredicateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Range bounds; `None` is unbounded (`*`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Range {
    #[serde(default)]
    pub lower: Option<Value>,
    #[serde(default)]
    pub upper: Option<Value>,
    #[serde(default = "default_true")]
    pub include_lower: bool,
    #[serde(default = "default_true")]
    pub include_upper: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum GeoValue {
    Circle { center: Point, distance: Distance },
    Box { bounds: GeoBox },
}

/// Operator-specific predicate payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", content = "value", rename_all = "snake_case")]
pub enum PredicateValue {
    Null,
    Single(Value),
    Range(Range),
    Geo(GeoValue),
    Fuzzy {
        term: Value,
        #[serde(default)]
        similarity: Option<f32>,
    },
    Sloppy {
        phrase: Value,
        slop: u32,
    },
    Function(Function),
}

impl PredicateValue {
    /// Null payloads resolve to "omit this clause".
    pub fn is_null(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Single(v) => v.is_null(),
            Self::Fuzzy { term, .. } => term.is_null(),
            Self::Sloppy { phrase, .. } => phrase.is_null(),
            Self::Range(_) | Self::Geo(_) | Self::Function(_) => false,
        }
    }

    pub fn shape(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Single(_) => "single",
            Self::Range(_) => "range",
            Self::Geo(_) => "geo",
            Self::Fuzzy { .. } => "fuzzy",
            Self::Sloppy { .. } => "sloppy",
            Self::Function(_) => "function",
        }
    }
}

impl From<Value> for PredicateValue {
    fn from(value: Value) -> Self {
        if value.is_null() {
            Self::Null
        } else {
            Self::Single(value)
        }
    }
}

impl From<&str> for PredicateValue {
    fn from(value: &str) -> Self {
        Self::Single(Value::from(value))
    }
}

impl From<Range> for PredicateValue {
    fn from(range: Range) -> Self {
        Self::Range(range)
    }
}

impl From<GeoValue> for PredicateValue {
    fn from(geo: GeoValue) -> Self {
        Self::Geo(geo)
    }
}

impl From<Function> for PredicateValue {
    fn from(function: Function) -> Self {
        Self::Function(function)
    }
}

/// One condition node: `(key, value)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    #[serde(default)]
    key: Option<PredicateKey>,
    #[serde(default = "null_value")]
    value: PredicateValue,
}

fn null_value() -> PredicateValue {
    PredicateValue::Null
}

impl Predicate {
    pub fn new(key: OperationKey, value: impl Into<PredicateValue>) -> Self {
        Self {
            key: Some(PredicateKey::Known(key)),
            value: value.into(),
        }
    }

    /// Key given as a string; unknown keys are kept verbatim, `None` is a null key.
    pub fn with_key(key: Option<&str>, value: impl Into<PredicateValue>) -> Self {
        Self {
            key: key.map(PredicateKey::parse),
            value: value.into(),
        }
    }

    pub fn key(&self) -> Option<&PredicateKey> {
        self.key.as_ref()
    }

    pub fn operation(&self) -> Option<OperationKey> {
        self.key.as_ref().and_then(PredicateKey::operation)
    }

    pub fn value(&self) -> &PredicateValue {
        &self.value
    }

    /// Key label for logs and errors.
    pub(crate) fn key_label(&self) -> &str {
        self.key.as_ref().map_or("null", PredicateKey::as_str)
    }
}

/// A chain of predicates on one field, e.g. `title:(rust "systems\ language")^2.0`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Criteria {
    #[serde(default)]
    field: Option<Field>,
    #[serde(default)]
    predicates: Vec<Predicate>,
    #[serde(default)]
    negating: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    boost: Option<f32>,
}

impl Criteria {
    pub fn on(field: Field) -> Self {
        Self {
            field: Some(field),
            ..Self::default()
        }
    }

    pub fn where_field(name: impl Into<String>) -> Result<Self> {
        Field::new(name).map(Self::on)
    }

    /// Criteria without a field prefix (expressions, function queries).
    pub fn without_field() -> Self {
        Self::default()
    }

    pub fn field(&self) -> Option<&Field> {
        self.field.as_ref()
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn is_negating(&self) -> bool {
        self.negating
    }

    pub fn boost_value(&self) -> Option<f32> {
        self.boost
    }

    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    fn push(self, key: OperationKey, value: impl Into<PredicateValue>) -> Self {
        self.with_predicate(Predicate::new(key, value))
    }

    /// Equality. A null value is kept and later omitted from the query.
    pub fn is(self, value: impl Into<Value>) -> Self {
        self.push(OperationKey::Equals, value.into())
    }

    /// One equality predicate per value: `field:(a b c)`.
    pub fn is_in<I, V>(self, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let mut criteria = self;
        let mut count = 0usize;
        for value in values {
            criteria = criteria.is(value);
            count += 1;
        }
        if count == 0 {
            return Err(Error::invalid("Collection of values must not be empty"));
        }
        Ok(criteria)
    }

    pub fn contains(self, value: &str) -> Result<Self> {
        assert_no_blank_in_wildcard(value)?;
        Ok(self.push(OperationKey::Contains, value))
    }

    pub fn starts_with(self, value: &str) -> Result<Self> {
        assert_no_blank_in_wildcard(value)?;
        Ok(self.push(OperationKey::StartsWith, value))
    }

    pub fn ends_with(self, value: &str) -> Result<Self> {
        assert_no_blank_in_wildcard(value)?;
        Ok(self.push(OperationKey::EndsWith, value))
    }

    /// Raw query syntax, embedded without escaping.
    pub fn expression(self, raw: impl Into<String>) -> Self {
        self.push(OperationKey::Expression, Value::Text(raw.into()))
    }

    pub fn between(
        self,
        lower: impl Into<Value>,
        upper: impl Into<Value>,
        include_lower: bool,
        include_upper: bool,
    ) -> Self {
        let bound = |v: Value| if v.is_null() { None } else { Some(v) };
        self.push(
            OperationKey::Between,
            Range {
                lower: bound(lower.into()),
                upper: bound(upper.into()),
                include_lower,
                include_upper,
            },
        )
    }

    pub fn greater_than(self, value: impl Into<Value>) -> Self {
        self.between(value, Value::Null, false, true)
    }

    pub fn greater_than_equal(self, value: impl Into<Value>) -> Self {
        self.between(value, Value::Null, true, true)
    }

    pub fn less_than(self, value: impl Into<Value>) -> Self {
        self.between(Value::Null, value, true, false)
    }

    pub fn less_than_equal(self, value: impl Into<Value>) -> Self {
        self.between(Value::Null, value, true, true)
    }

    /// Any value present: `field:[* TO *]`.
    pub fn is_not_null(self) -> Self {
        self.between(Value::Null, Value::Null, true, true)
    }

    /// No value present: `-field:[* TO *]`.
    pub fn is_null(self) -> Self {
        self.is_not_null().not()
    }

    /// `similarity` must lie within `0.0..=1.0` when given.
    pub fn fuzzy(self, term: &str, similarity: Option<f32>) -> Result<Self> {
        if let Some(s) = similarity {
            check_similarity(s)?;
        }
        Ok(self.push(
            OperationKey::Fuzzy,
            PredicateValue::Fuzzy {
                term: Value::from(term),
                similarity,
            },
        ))
    }

    /// Proximity search; the phrase needs at least two terms.
    pub fn sloppy(self, phrase: &str, slop: u32) -> Result<Self> {
        check_slop(slop)?;
        if !phrase.trim().contains(' ') {
            return Err(Error::invalid(
                "Phrase must consist of multiple terms, separated with spaces",
            ));
        }
        Ok(self.push(
            OperationKey::Sloppy,
            PredicateValue::Sloppy {
                phrase: Value::from(phrase),
                slop,
            },
        ))
    }

    /// Bounding box around a point (`{!bbox}`).
    pub fn near(self, center: Point, distance: Distance) -> Result<Self> {
        assert_positive_distance(&distance)?;
        Ok(self.push(OperationKey::Near, GeoValue::Circle { center, distance }))
    }

    /// Points inside an explicit box: `field:[x,y TO x,y]`.
    pub fn near_box(self, bounds: GeoBox) -> Self {
        self.push(OperationKey::Near, GeoValue::Box { bounds })
    }

    /// Exact radius around a point (`{!geofilt}`).
    pub fn within(self, center: Point, distance: Distance) -> Result<Self> {
        assert_positive_distance(&distance)?;
        Ok(self.push(OperationKey::Within, GeoValue::Circle { center, distance }))
    }

    pub fn function(self, function: Function) -> Self {
        self.push(OperationKey::Function, function)
    }

    pub fn boost(mut self, boost: f32) -> Result<Self> {
        check_boost(boost)?;
        self.boost = Some(boost);
        Ok(self)
    }

    pub fn not(mut self) -> Self {
        self.negating = !self.negating;
        self
    }

    /// Deserialized criteria bypass the builders, so the compiler re-checks
    /// boost and predicate bounds before rendering.
    pub(crate) fn validate(&self) -> Result<()> {
        if let Some(boost) = self.boost {
            check_boost(boost)?;
        }
        for predicate in &self.predicates {
            match predicate.value() {
                PredicateValue::Fuzzy {
                    similarity: Some(similarity),
                    ..
                } => check_similarity(*similarity)?,
                PredicateValue::Sloppy { slop, .. } => check_slop(*slop)?,
                PredicateValue::Geo(GeoValue::Circle { distance, .. }) => {
                    assert_positive_distance(distance)?
                }
                _ => {}
            }
        }
        Ok(())
    }
}

fn check_boost(boost: f32) -> Result<()> {
    if !boost.is_finite() || boost < 0.0 {
        return Err(Error::invalid("Boost must be a non-negative number"));
    }
    Ok(())
}

fn check_similarity(similarity: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&similarity) {
        return Err(Error::invalid(
            "Levenshtein distance has to be within its bounds (0.0 - 1.0)",
        ));
    }
    Ok(())
}

fn check_slop(slop: u32) -> Result<()> {
    if slop == 0 {
        return Err(Error::invalid("Slop distance has to be greater than 0"));
    }
    Ok(())
}

fn assert_no_blank_in_wildcard(value: &str) -> Result<()> {
    if contains_whitespace(value) {
        return Err(Error::invalid(format!(
            "Cannot construct query '{}'. Use expression or multiple clauses instead",
            value
        )));
    }
    Ok(())
}

fn assert_positive_distance(distance: &Distance) -> Result<()> {
    if !distance.value.is_finite() || distance.value < 0.0 {
        return Err(Error::invalid("Distance must not be less than zero"));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Junction {
    #[default]
    And,
    Or,
}

impl Junction {
    pub const fn separator(self) -> &'static str {
        match self {
            Self::And => " AND ",
            Self::Or => " OR ",
        }
    }
}

/// Child of a [`Group`]; the junction links it to the preceding clause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clause {
    #[serde(default)]
    pub junction: Junction,
    pub node: Node,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Group {
    #[serde(default)]
    pub clauses: Vec<Clause>,
    #[serde(default)]
    pub negating: bool,
    /// Built by [`Node::and`]/[`Node::or`]; further joins extend it in place.
    /// Groups without this flag are explicit and keep their own precedence.
    #[serde(default)]
    pub chained: bool,
}

/// Criteria tree node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Node {
    Criteria(Criteria),
    /// Pre-rendered query string, passed through untouched.
    Raw { query: String },
    Group(Group),
}

impl Node {
    pub fn raw(query: impl Into<String>) -> Self {
        Self::Raw {
            query: query.into(),
        }
    }

    /// Explicitly grouped sub-tree; always rendered in parentheses when nested.
    pub fn group<I>(clauses: I) -> Self
    where
        I: IntoIterator<Item = (Junction, Node)>,
    {
        Self::Group(Group {
            clauses: clauses
                .into_iter()
                .map(|(junction, node)| Clause { junction, node })
                .collect(),
            negating: false,
            chained: false,
        })
    }

    pub fn and(self, other: impl Into<Node>) -> Self {
        self.join(Junction::And, other.into())
    }

    pub fn or(self, other: impl Into<Node>) -> Self {
        self.join(Junction::Or, other.into())
    }

    /// Extends a non-negated chain; anything else, explicit groups included,
    /// becomes the first clause of a new chain. A group passed as `other`
    /// stays nested.
    fn join(self, junction: Junction, other: Node) -> Self {
        match self {
            Self::Group(mut group) if group.chained && !group.negating => {
                group.clauses.push(Clause {
                    junction,
                    node: other,
                });
                Self::Group(group)
            }
            first => Self::Group(Group {
                clauses: vec![
                    Clause {
                        junction: Junction::And,
                        node: first,
                    },
                    Clause {
                        junction,
                        node: other,
                    },
                ],
                negating: false,
                chained: true,
            }),
        }
    }

    pub fn not(self) -> Self {
        match self {
            Self::Criteria(criteria) => Self::Criteria(criteria.not()),
            Self::Group(mut group) => {
                group.negating = !group.negating;
                Self::Group(group)
            }
            raw @ Self::Raw { .. } => Self::Group(Group {
                clauses: vec![Clause {
                    junction: Junction::And,
                    node: raw,
                }],
                negating: true,
                chained: false,
            }),
        }
    }
}

impl From<Criteria> for Node {
    fn from(criteria: Criteria) -> Self {
        Self::Criteria(criteria)
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::Group(Group::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_key_round_trip() {
        for op in [
            OperationKey::Equals,
            OperationKey::Between,
            OperationKey::Near,
            OperationKey::Within,
            OperationKey::Fuzzy,
            OperationKey::Sloppy,
            OperationKey::StartsWith,
            OperationKey::EndsWith,
            OperationKey::Contains,
            OperationKey::Expression,
            OperationKey::Function,
        ] {
            assert_eq!(OperationKey::from_key(op.key()), Some(op));
        }
        assert_eq!(OperationKey::from_key("invalid"), None);
    }

    #[test]
    fn test_unknown_key_kept_verbatim() {
        let predicate = Predicate::with_key(Some("invalid"), Value::Null);
        assert_eq!(
            predicate.key(),
            Some(&PredicateKey::Custom("invalid".to_string()))
        );
        assert_eq!(predicate.operation(), None);
        assert!(predicate.value().is_null());
    }

    #[test]
    fn test_wildcard_builders_reject_whitespace() {
        let criteria = Criteria::where_field("title").unwrap();
        assert!(criteria.clone().contains("two words").is_err());
        assert!(criteria.clone().starts_with("two\twords").is_err());
        assert!(criteria.ends_with("single").is_ok());
    }

    #[test]
    fn test_fuzzy_bounds() {
        let criteria = Criteria::where_field("title").unwrap();
        assert!(criteria.clone().fuzzy("rust", Some(1.5)).is_err());
        assert!(criteria.clone().fuzzy("rust", Some(0.5)).is_ok());
        assert!(criteria.fuzzy("rust", None).is_ok());
    }

    #[test]
    fn test_sloppy_requires_phrase() {
        let criteria = Criteria::where_field("title").unwrap();
        assert!(criteria.clone().sloppy("single", 2).is_err());
        assert!(criteria.clone().sloppy("two words", 0).is_err());
        assert!(criteria.sloppy("two words", 2).is_ok());
    }

    #[test]
    fn test_negative_distance_rejected() {
        let criteria = Criteria::where_field("store").unwrap();
        assert!(criteria
            .near(Point::new(1.0, 2.0), Distance::kilometers(-1.0))
            .is_err());
    }

    #[test]
    fn test_is_in_rejects_empty() {
        let criteria = Criteria::where_field("id").unwrap();
        assert!(criteria.clone().is_in(Vec::<i64>::new()).is_err());
        assert_eq!(criteria.is_in([1, 2, 3]).unwrap().predicates().len(), 3);
    }

    #[test]
    fn test_join_flattens_chain_and_nests_groups() {
        let a = Node::from(Criteria::where_field("a").unwrap().is("1"));
        let b = Node::from(Criteria::where_field("b").unwrap().is("2"));
        let c = Node::from(Criteria::where_field("c").unwrap().is("3"));

        let flat = a.clone().and(b.clone()).or(c.clone());
        match &flat {
            Node::Group(group) => assert_eq!(group.clauses.len(), 3),
            _ => panic!("Expected Group node"),
        }

        let nested = a.and(b.or(c));
        match nested {
            Node::Group(group) => {
                assert_eq!(group.clauses.len(), 2);
                assert!(matches!(group.clauses[1].node, Node::Group(_)));
            }
            _ => panic!("Expected Group node"),
        }
    }

    #[test]
    fn test_explicit_group_is_not_extended() {
        let a = Node::from(Criteria::where_field("a").unwrap().is("1"));
        let b = Node::from(Criteria::where_field("b").unwrap().is("2"));
        let c = Node::from(Criteria::where_field("c").unwrap().is("3"));

        let explicit = Node::group([(Junction::And, a), (Junction::Or, b)]);
        match explicit.clone().and(c) {
            Node::Group(group) => {
                assert!(group.chained);
                assert_eq!(group.clauses.len(), 2);
                assert_eq!(group.clauses[0].node, explicit);
            }
            _ => panic!("Expected Group node"),
        }
    }

    #[test]
    fn test_predicate_key_serde_as_string() {
        let predicate = Predicate::new(OperationKey::Equals, "x");
        let json = serde_json::to_value(&predicate).unwrap();
        assert_eq!(json["key"], "$equals");
        let back: Predicate = serde_json::from_value(json).unwrap();
        assert_eq!(back, predicate);
    }
}
