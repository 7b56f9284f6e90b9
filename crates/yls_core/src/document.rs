use std::fmt;

use serde::{Deserialize, Serialize};

use crate::layout::{ByteRange, FileLayout};
use crate::path::{FieldPath, PathSegment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScalarKind {
    Int,
    Float,
    Bool,
    Text,
}

impl ScalarKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Bool => "bool",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl ScalarValue {
    pub fn kind(&self) -> ScalarKind {
        match self {
            Self::Int(_) => ScalarKind::Int,
            Self::Float(_) => ScalarKind::Float,
            Self::Bool(_) => ScalarKind::Bool,
            Self::Text(_) => ScalarKind::Text,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }

    /// Infers a typed value from the text of one cell.
    pub fn infer(text: &str) -> Self {
        if text.eq_ignore_ascii_case("true") {
            return Self::Bool(true);
        }
        if text.eq_ignore_ascii_case("false") {
            return Self::Bool(false);
        }

        let unsigned = text.strip_prefix('-').unwrap_or(text);
        if !unsigned.is_empty() && unsigned.bytes().all(|b| b.is_ascii_digit()) {
            return match text.parse::<i64>() {
                Ok(v) => Self::Int(v),
                Err(_) => Self::Text(text.to_string()),
            };
        }

        if is_plain_decimal(unsigned) {
            if let Ok(v) = text.parse::<f64>() {
                return Self::Float(v);
            }
        }

        Self::Text(text.to_string())
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => f.write_str(&format_float(*v)),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

fn is_plain_decimal(s: &str) -> bool {
    let mut dots = 0;
    let mut digits = 0;
    for b in s.bytes() {
        match b {
            b'.' => dots += 1,
            b'0'..=b'9' => digits += 1,
            _ => return false,
        }
    }
    dots == 1 && digits > 0
}

pub(crate) fn format_float(v: f64) -> String {
    let mut out = v.to_string();
    if v.is_finite() && !out.contains('.') {
        out.push_str(".0");
    }
    out
}

fn format_bool(v: bool, previous: &str) -> String {
    let word = if v { "true" } else { "false" };
    let has_lower = previous.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = previous.bytes().any(|b| b.is_ascii_uppercase());
    match (has_lower, has_upper) {
        (true, false) => word.to_string(),
        (false, true) => word.to_ascii_uppercase(),
        _ => {
            let mut out = word.to_string();
            out[..1].make_ascii_uppercase();
            out
        }
    }
}

/// A typed leaf that remembers the exact text it was parsed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Scalar {
    value: ScalarValue,
    text: String,
}

impl Scalar {
    pub fn from_text(text: &str) -> Self {
        Self {
            value: ScalarValue::infer(text),
            text: text.to_string(),
        }
    }

    pub fn value(&self) -> &ScalarValue {
        &self.value
    }

    pub fn kind(&self) -> ScalarKind {
        self.value.kind()
    }

    /// Encoded form written back to the save.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Stores `value`, re-encoding the text only when the value differs.
    pub(crate) fn replace(&mut self, value: ScalarValue) {
        if value == self.value || same_number(&value, &self.value) {
            return;
        }
        self.text = match &value {
            ScalarValue::Int(v) => v.to_string(),
            ScalarValue::Float(v) => format_float(*v),
            ScalarValue::Bool(v) => format_bool(*v, &self.text),
            ScalarValue::Text(v) => v.clone(),
        };
        self.value = value;
    }
}

fn same_number(a: &ScalarValue, b: &ScalarValue) -> bool {
    match (a, b) {
        (ScalarValue::Int(_) | ScalarValue::Float(_), ScalarValue::Int(_) | ScalarValue::Float(_)) => {
            a.as_f64() == b.as_f64()
        }
        _ => false,
    }
}

/// Verbatim bytes the codec does not interpret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opaque {
    bytes: Vec<u8>,
    origin: ByteRange,
}

impl Opaque {
    pub(crate) fn new(bytes: Vec<u8>, origin: ByteRange) -> Self {
        Self { bytes, origin }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Span of these bytes in the decoded input they were read from.
    pub fn origin(&self) -> ByteRange {
        self.origin
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Framing {
    pub open: Vec<u8>,
    pub separator: Vec<u8>,
    pub close: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Name(String),
    Index(usize),
    /// Unaddressable filler such as blank lines or a preamble.
    Trivia,
}

impl Key {
    fn matches(&self, segment: &PathSegment) -> bool {
        match (self, segment) {
            (Self::Name(name), PathSegment::Key(key)) => name == key,
            (Self::Index(index), PathSegment::Index(wanted)) => index == wanted,
            (Self::Name(name), PathSegment::Index(wanted)) => *name == wanted.to_string(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Child {
    pub key: Key,
    pub node: Node,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Container {
    children: Vec<Child>,
    framing: Framing,
}

impl Container {
    pub(crate) fn new(framing: Framing) -> Self {
        Self {
            children: Vec::new(),
            framing,
        }
    }

    pub(crate) fn push(&mut self, key: Key, node: Node) {
        self.children.push(Child { key, node });
    }

    pub fn children(&self) -> &[Child] {
        &self.children
    }

    pub fn framing(&self) -> &Framing {
        &self.framing
    }

    pub fn get(&self, segment: &PathSegment) -> Option<&Node> {
        self.children
            .iter()
            .find(|child| child.key.matches(segment))
            .map(|child| &child.node)
    }

    pub fn get_mut(&mut self, segment: &PathSegment) -> Option<&mut Node> {
        self.children
            .iter_mut()
            .find(|child| child.key.matches(segment))
            .map(|child| &mut child.node)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Scalar(ScalarKind),
    Sequence,
    Mapping,
    Opaque,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Scalar(Scalar),
    Sequence(Container),
    Mapping(Container),
    Opaque(Opaque),
}

impl Node {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Scalar(scalar) => NodeKind::Scalar(scalar.kind()),
            Self::Sequence(_) => NodeKind::Sequence,
            Self::Mapping(_) => NodeKind::Mapping,
            Self::Opaque(_) => NodeKind::Opaque,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Self::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    pub fn as_scalar_mut(&mut self) -> Option<&mut Scalar> {
        match self {
            Self::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    pub fn as_container(&self) -> Option<&Container> {
        match self {
            Self::Sequence(container) | Self::Mapping(container) => Some(container),
            _ => None,
        }
    }

    fn child(&self, segment: &PathSegment) -> Option<&Node> {
        self.as_container()?.get(segment)
    }

    fn child_mut(&mut self, segment: &PathSegment) -> Option<&mut Node> {
        match self {
            Self::Sequence(container) | Self::Mapping(container) => container.get_mut(segment),
            _ => None,
        }
    }
}

fn descend<'a>(node: &'a Node, segments: &[PathSegment]) -> Option<&'a Node> {
    let Some((first, rest)) = segments.split_first() else {
        return Some(node);
    };
    descend(node.child(first)?, rest)
}

fn descend_mut<'a>(node: &'a mut Node, segments: &[PathSegment]) -> Option<&'a mut Node> {
    let Some((first, rest)) = segments.split_first() else {
        return Some(node);
    };
    descend_mut(node.child_mut(first)?, rest)
}

/// One decoded save: the node tree plus the layout it was read from.
#[derive(Debug, Clone)]
pub struct Document {
    root: Node,
    layout: FileLayout,
}

impl Document {
    pub(crate) fn from_parts(root: Node, layout: FileLayout) -> Self {
        Self { root, layout }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn layout(&self) -> &FileLayout {
        &self.layout
    }

    pub fn resolve(&self, path: &FieldPath) -> Option<&Node> {
        descend(&self.root, path.segments())
    }

    pub fn resolve_mut(&mut self, path: &FieldPath) -> Option<&mut Node> {
        descend_mut(&mut self.root, path.segments())
    }

    pub fn scalar(&self, path: &FieldPath) -> Option<&Scalar> {
        self.resolve(path)?.as_scalar()
    }

    /// Top-level tables in file order, opaque ones included.
    pub fn tables(&self) -> impl Iterator<Item = (&str, &Node)> + '_ {
        self.root
            .as_container()
            .into_iter()
            .flat_map(|root| root.children())
            .filter_map(|child| match &child.key {
                Key::Name(name) => Some((name.as_str(), &child.node)),
                _ => None,
            })
    }

    pub fn table(&self, name: &str) -> Option<Table<'_>> {
        match self.tables().find(|(table_name, _)| *table_name == name)? {
            (name, Node::Sequence(container)) => Some(Table { name, container }),
            _ => None,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        crate::serializer::serialize(self)
    }
}

/// Read-only view of a modeled table.
#[derive(Debug, Clone, Copy)]
pub struct Table<'a> {
    name: &'a str,
    container: &'a Container,
}

impl<'a> Table<'a> {
    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'a>> + 'a {
        self.container
            .children()
            .iter()
            .filter_map(|child| match (&child.key, &child.node) {
                (Key::Index(index), Node::Mapping(cells)) => Some(Row {
                    index: *index,
                    cells,
                }),
                _ => None,
            })
    }

    pub fn row_count(&self) -> usize {
        self.rows().count()
    }

    pub fn row(&self, index: usize) -> Option<Row<'a>> {
        self.rows().find(|row| row.index == index)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    index: usize,
    cells: &'a Container,
}

impl<'a> Row<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn get(&self, column: &str) -> Option<&'a Scalar> {
        self.cells
            .get(&PathSegment::Key(column.to_string()))?
            .as_scalar()
    }

    pub fn columns(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.cells.children().iter().filter_map(|child| match &child.key {
            Key::Name(name) => Some(name.as_str()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_cell_kinds() {
        assert_eq!(ScalarValue::infer("42"), ScalarValue::Int(42));
        assert_eq!(ScalarValue::infer("-7"), ScalarValue::Int(-7));
        assert_eq!(ScalarValue::infer("1.50"), ScalarValue::Float(1.5));
        assert_eq!(ScalarValue::infer("True"), ScalarValue::Bool(true));
        assert_eq!(ScalarValue::infer("false"), ScalarValue::Bool(false));
        assert_eq!(
            ScalarValue::infer("1.2.7"),
            ScalarValue::Text("1.2.7".to_string())
        );
        assert_eq!(ScalarValue::infer(""), ScalarValue::Text(String::new()));
        assert_eq!(ScalarValue::infer("-"), ScalarValue::Text("-".to_string()));
        assert_eq!(
            ScalarValue::infer("99999999999999999999"),
            ScalarValue::Text("99999999999999999999".to_string())
        );
    }

    #[test]
    fn scalar_keeps_original_text_until_replaced() {
        let mut scalar = Scalar::from_text("007");
        assert_eq!(scalar.value(), &ScalarValue::Int(7));
        assert_eq!(scalar.text(), "007");

        scalar.replace(ScalarValue::Int(7));
        assert_eq!(scalar.text(), "007");

        scalar.replace(ScalarValue::Int(8));
        assert_eq!(scalar.text(), "8");
    }

    #[test]
    fn float_replacement_keeps_decimal_point() {
        let mut scalar = Scalar::from_text("2.0");
        scalar.replace(ScalarValue::Float(25.0));
        assert_eq!(scalar.text(), "25.0");
        scalar.replace(ScalarValue::Float(0.125));
        assert_eq!(scalar.text(), "0.125");
    }

    #[test]
    fn numerically_equal_replacement_keeps_text() {
        let mut scalar = Scalar::from_text("1.50");
        scalar.replace(ScalarValue::Float(1.5));
        assert_eq!(scalar.text(), "1.50");

        let mut whole = Scalar::from_text("2");
        whole.replace(ScalarValue::Float(2.0));
        assert_eq!(whole.text(), "2");
    }

    #[test]
    fn bool_replacement_follows_previous_casing() {
        let mut title = Scalar::from_text("True");
        title.replace(ScalarValue::Bool(false));
        assert_eq!(title.text(), "False");

        let mut lower = Scalar::from_text("true");
        lower.replace(ScalarValue::Bool(false));
        assert_eq!(lower.text(), "false");

        let mut upper = Scalar::from_text("FALSE");
        upper.replace(ScalarValue::Bool(true));
        assert_eq!(upper.text(), "TRUE");
    }
}
