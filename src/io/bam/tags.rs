//! Alignment optional tags (auxiliary data).
//!
//! A tag is a `(key, type, value)` triple such as `NM:i:5` or `RG:Z:grp1`.
//! Records keep their tags as an ordered `Vec<Tag>`; keys are not required to
//! be unique.
//!
//! # Tag Types
//!
//! - **A**: Printable character
//! - **i**: Signed integer (BAM widths c, C, s, S, i, I all decode to `i`)
//! - **f**: Float (IEEE 754 single precision)
//! - **Z**: String
//! - **H**: Hex string
//! - **B**: Array of numeric values, with an element subtype
//!
//! # Equality and Ordering
//!
//! Float values compare by bit pattern and order with [`f32::total_cmp`], so
//! every value is equal to itself and tag collections have a total order.

use std::cmp::Ordering;
use std::fmt;
use std::io;

/// Element type of a `B` array tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArrayType {
    /// c: int8
    Int8,
    /// C: uint8
    UInt8,
    /// s: int16
    Int16,
    /// S: uint16
    UInt16,
    /// i: int32
    Int32,
    /// I: uint32
    UInt32,
    /// f: float
    Float,
}

impl ArrayType {
    /// SAM subtype code.
    pub fn code(&self) -> u8 {
        match self {
            ArrayType::Int8 => b'c',
            ArrayType::UInt8 => b'C',
            ArrayType::Int16 => b's',
            ArrayType::UInt16 => b'S',
            ArrayType::Int32 => b'i',
            ArrayType::UInt32 => b'I',
            ArrayType::Float => b'f',
        }
    }
}

/// Declared type of a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagType {
    /// A
    Char,
    /// i
    Int,
    /// f
    Float,
    /// Z
    String,
    /// H
    Hex,
    /// B with element subtype
    Array(ArrayType),
}

impl TagType {
    /// SAM type code.
    pub fn code(&self) -> u8 {
        match self {
            TagType::Char => b'A',
            TagType::Int => b'i',
            TagType::Float => b'f',
            TagType::String => b'Z',
            TagType::Hex => b'H',
            TagType::Array(_) => b'B',
        }
    }

    fn subtype_code(&self) -> u8 {
        match self {
            TagType::Array(array_type) => array_type.code(),
            _ => 0,
        }
    }
}

impl Ord for TagType {
    fn cmp(&self, other: &Self) -> Ordering {
        self.code()
            .cmp(&other.code())
            .then_with(|| self.subtype_code().cmp(&other.subtype_code()))
    }
}

impl PartialOrd for TagType {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for TagType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagType::Array(array_type) => write!(f, "B:{}", array_type.code() as char),
            other => write!(f, "{}", other.code() as char),
        }
    }
}

/// Tag values.
#[derive(Debug, Clone)]
pub enum TagValue {
    /// Character (A): Single printable character
    Char(u8),
    /// Integer (i): Signed integer (variable width in BAM)
    Int(i64),
    /// Float (f): IEEE 754 single-precision float
    Float(f32),
    /// String (Z)
    String(String),
    /// Hex string (H)
    Hex(String),
    /// Array (B): Typed array of numbers
    Array(ArrayValue),
}

/// Array value types for tag arrays (B type).
#[derive(Debug, Clone)]
pub enum ArrayValue {
    /// Array of signed 8-bit integers
    Int8(Vec<i8>),
    /// Array of unsigned 8-bit integers
    UInt8(Vec<u8>),
    /// Array of signed 16-bit integers
    Int16(Vec<i16>),
    /// Array of unsigned 16-bit integers
    UInt16(Vec<u16>),
    /// Array of signed 32-bit integers
    Int32(Vec<i32>),
    /// Array of unsigned 32-bit integers
    UInt32(Vec<u32>),
    /// Array of 32-bit floats
    Float(Vec<f32>),
}

impl ArrayValue {
    /// Element type of the array.
    pub fn array_type(&self) -> ArrayType {
        match self {
            ArrayValue::Int8(_) => ArrayType::Int8,
            ArrayValue::UInt8(_) => ArrayType::UInt8,
            ArrayValue::Int16(_) => ArrayType::Int16,
            ArrayValue::UInt16(_) => ArrayType::UInt16,
            ArrayValue::Int32(_) => ArrayType::Int32,
            ArrayValue::UInt32(_) => ArrayType::UInt32,
            ArrayValue::Float(_) => ArrayType::Float,
        }
    }
}

fn cmp_floats(a: &[f32], b: &[f32]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        match x.total_cmp(y) {
            Ordering::Equal => continue,
            other => return other,
        }
    }
    a.len().cmp(&b.len())
}

impl Ord for ArrayValue {
    fn cmp(&self, other: &Self) -> Ordering {
        use ArrayValue::*;
        match (self, other) {
            (Int8(a), Int8(b)) => a.cmp(b),
            (UInt8(a), UInt8(b)) => a.cmp(b),
            (Int16(a), Int16(b)) => a.cmp(b),
            (UInt16(a), UInt16(b)) => a.cmp(b),
            (Int32(a), Int32(b)) => a.cmp(b),
            (UInt32(a), UInt32(b)) => a.cmp(b),
            (Float(a), Float(b)) => cmp_floats(a, b),
            (a, b) => a.array_type().code().cmp(&b.array_type().code()),
        }
    }
}

impl PartialOrd for ArrayValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ArrayValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ArrayValue {}

impl TagValue {
    /// Declared type of this value.
    pub fn tag_type(&self) -> TagType {
        match self {
            TagValue::Char(_) => TagType::Char,
            TagValue::Int(_) => TagType::Int,
            TagValue::Float(_) => TagType::Float,
            TagValue::String(_) => TagType::String,
            TagValue::Hex(_) => TagType::Hex,
            TagValue::Array(array) => TagType::Array(array.array_type()),
        }
    }
}

impl Ord for TagValue {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (TagValue::Char(a), TagValue::Char(b)) => a.cmp(b),
            (TagValue::Int(a), TagValue::Int(b)) => a.cmp(b),
            (TagValue::Float(a), TagValue::Float(b)) => a.total_cmp(b),
            (TagValue::String(a), TagValue::String(b)) => a.cmp(b),
            (TagValue::Hex(a), TagValue::Hex(b)) => a.cmp(b),
            (TagValue::Array(a), TagValue::Array(b)) => a.cmp(b),
            (a, b) => a.tag_type().cmp(&b.tag_type()),
        }
    }
}

impl PartialOrd for TagValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for TagValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TagValue {}

fn join<T: ToString>(values: &[T]) -> String {
    values
        .iter()
        .map(|x| x.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

impl fmt::Display for TagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagValue::Char(c) => write!(f, "A:{}", *c as char),
            TagValue::Int(i) => write!(f, "i:{}", i),
            TagValue::Float(fl) => write!(f, "f:{}", fl),
            TagValue::String(s) => write!(f, "Z:{}", s),
            TagValue::Hex(h) => write!(f, "H:{}", h),
            TagValue::Array(arr) => {
                write!(f, "B:{}", arr.array_type().code() as char)?;
                let values = match arr {
                    ArrayValue::Int8(v) => join(v),
                    ArrayValue::UInt8(v) => join(v),
                    ArrayValue::Int16(v) => join(v),
                    ArrayValue::UInt16(v) => join(v),
                    ArrayValue::Int32(v) => join(v),
                    ArrayValue::UInt32(v) => join(v),
                    ArrayValue::Float(v) => join(v),
                };
                if values.is_empty() {
                    Ok(())
                } else {
                    write!(f, ",{}", values)
                }
            }
        }
    }
}

/// A single tag with name and value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Two-character tag name (e.g., "NM", "AS", "RG")
    pub name: [u8; 2],
    /// Tag value
    pub value: TagValue,
}

impl Tag {
    /// Create a tag.
    pub fn new(name: [u8; 2], value: TagValue) -> Self {
        Self { name, value }
    }

    /// Get tag name as a string slice.
    pub fn name_str(&self) -> &str {
        std::str::from_utf8(&self.name).unwrap_or("??")
    }

    /// Declared type of the tag.
    pub fn tag_type(&self) -> TagType {
        self.value.tag_type()
    }

    /// Canonical order: key, then type, then value.
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.name
            .cmp(&other.name)
            .then_with(|| self.tag_type().cmp(&other.tag_type()))
            .then_with(|| self.value.cmp(&other.value))
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name_str(), self.value)
    }
}

/// Parse the tag block at the end of a BAM record.
///
/// Duplicate keys are kept in file order.
pub fn parse_tags(data: &[u8]) -> io::Result<Vec<Tag>> {
    let mut tags = Vec::new();
    let mut cursor = 0;

    while cursor < data.len() {
        // Read tag name (2 bytes)
        if cursor + 2 > data.len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Incomplete tag name at offset {}", cursor),
            ));
        }
        let name = [data[cursor], data[cursor + 1]];
        cursor += 2;

        // Read tag type (1 byte)
        if cursor >= data.len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Missing tag type at offset {}", cursor),
            ));
        }
        let tag_type = data[cursor];
        cursor += 1;

        let (value, value_size) = parse_tag_value(&data[cursor..], tag_type)?;
        cursor += value_size;

        tags.push(Tag { name, value });
    }

    Ok(tags)
}

fn insufficient(what: &str) -> io::Error {
    io::Error::new(
        io::ErrorKind::InvalidData,
        format!("Insufficient data for {}", what),
    )
}

fn take<const N: usize>(data: &[u8], what: &str) -> io::Result<[u8; N]> {
    data.get(..N)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or_else(|| insufficient(what))
}

/// Read `count` fixed-width little-endian elements.
fn read_array<const N: usize, T>(
    data: &[u8],
    count: usize,
    what: &str,
    decode: fn([u8; N]) -> T,
) -> io::Result<(Vec<T>, usize)> {
    let bytes_needed = count.checked_mul(N).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Array size overflow: count={}", count),
        )
    })?;
    let bytes = data.get(..bytes_needed).ok_or_else(|| insufficient(what))?;
    let values = bytes
        .chunks_exact(N)
        .map(|chunk| {
            let mut buf = [0u8; N];
            buf.copy_from_slice(chunk);
            decode(buf)
        })
        .collect();
    Ok((values, bytes_needed))
}

/// Parse a single tag value from raw bytes.
///
/// Returns `(TagValue, bytes_consumed)`.
fn parse_tag_value(data: &[u8], type_code: u8) -> io::Result<(TagValue, usize)> {
    match type_code {
        b'A' => {
            let [c] = take::<1>(data, "character tag")?;
            Ok((TagValue::Char(c), 1))
        }
        b'c' => {
            let bytes = take::<1>(data, "int8 tag")?;
            Ok((TagValue::Int(i8::from_le_bytes(bytes) as i64), 1))
        }
        b'C' => {
            let [b] = take::<1>(data, "uint8 tag")?;
            Ok((TagValue::Int(b as i64), 1))
        }
        b's' => {
            let bytes = take::<2>(data, "int16 tag")?;
            Ok((TagValue::Int(i16::from_le_bytes(bytes) as i64), 2))
        }
        b'S' => {
            let bytes = take::<2>(data, "uint16 tag")?;
            Ok((TagValue::Int(u16::from_le_bytes(bytes) as i64), 2))
        }
        b'i' => {
            let bytes = take::<4>(data, "int32 tag")?;
            Ok((TagValue::Int(i32::from_le_bytes(bytes) as i64), 4))
        }
        b'I' => {
            let bytes = take::<4>(data, "uint32 tag")?;
            Ok((TagValue::Int(u32::from_le_bytes(bytes) as i64), 4))
        }
        b'f' => {
            let bytes = take::<4>(data, "float tag")?;
            Ok((TagValue::Float(f32::from_le_bytes(bytes)), 4))
        }
        b'Z' | b'H' => {
            let null_pos = data.iter().position(|&b| b == 0).ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    "Missing null terminator in string tag",
                )
            })?;

            let string = String::from_utf8(data[..null_pos].to_vec()).map_err(|_| {
                io::Error::new(io::ErrorKind::InvalidData, "Invalid UTF-8 in string tag")
            })?;

            let value = if type_code == b'Z' {
                TagValue::String(string)
            } else {
                TagValue::Hex(string)
            };

            Ok((value, null_pos + 1))
        }
        b'B' => {
            let [array_type] = take::<1>(data, "array tag type")?;
            let count_bytes = take::<4>(&data[1..], "array tag count")?;
            let count_u32 = u32::from_le_bytes(count_bytes);
            let count = usize::try_from(count_u32).map_err(|_| {
                io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("Array count too large: {}", count_u32),
                )
            })?;
            let body = &data[5..];

            let (array, used) = match array_type {
                b'c' => {
                    let (v, n) =
                        read_array::<1, i8>(body, count, "int8 array", i8::from_le_bytes)?;
                    (ArrayValue::Int8(v), n)
                }
                b'C' => {
                    let (v, n) =
                        read_array::<1, u8>(body, count, "uint8 array", u8::from_le_bytes)?;
                    (ArrayValue::UInt8(v), n)
                }
                b's' => {
                    let (v, n) =
                        read_array::<2, i16>(body, count, "int16 array", i16::from_le_bytes)?;
                    (ArrayValue::Int16(v), n)
                }
                b'S' => {
                    let (v, n) =
                        read_array::<2, u16>(body, count, "uint16 array", u16::from_le_bytes)?;
                    (ArrayValue::UInt16(v), n)
                }
                b'i' => {
                    let (v, n) =
                        read_array::<4, i32>(body, count, "int32 array", i32::from_le_bytes)?;
                    (ArrayValue::Int32(v), n)
                }
                b'I' => {
                    let (v, n) =
                        read_array::<4, u32>(body, count, "uint32 array", u32::from_le_bytes)?;
                    (ArrayValue::UInt32(v), n)
                }
                b'f' => {
                    let (v, n) =
                        read_array::<4, f32>(body, count, "float array", f32::from_le_bytes)?;
                    (ArrayValue::Float(v), n)
                }
                other => {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("Unknown array subtype: {}", other as char),
                    ))
                }
            };

            Ok((TagValue::Array(array), 5 + used))
        }
        other => Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Unknown tag type: {}", other as char),
        )),
    }
}

fn parse_list<T: std::str::FromStr>(items: &[&str], field: &str) -> Result<Vec<T>, String> {
    items
        .iter()
        .map(|item| {
            item.parse::<T>()
                .map_err(|_| format!("Invalid array element '{}' in tag {}", item, field))
        })
        .collect()
}

/// Parse one SAM optional field (`TG:TYPE:VALUE`).
pub fn parse_sam_tag(field: &str) -> Result<Tag, String> {
    let mut parts = field.splitn(3, ':');
    let (name, type_code, value) = match (parts.next(), parts.next(), parts.next()) {
        (Some(name), Some(type_code), Some(value)) => (name, type_code, value),
        _ => return Err(format!("Malformed tag: {}", field)),
    };

    let name: [u8; 2] = name
        .as_bytes()
        .try_into()
        .map_err(|_| format!("Tag name must be two characters: {}", field))?;

    let value = match type_code {
        "A" => {
            let bytes = value.as_bytes();
            if bytes.len() != 1 {
                return Err(format!("Character tag must hold one byte: {}", field));
            }
            TagValue::Char(bytes[0])
        }
        "i" => TagValue::Int(
            value
                .parse()
                .map_err(|_| format!("Invalid integer tag: {}", field))?,
        ),
        "f" => TagValue::Float(
            value
                .parse()
                .map_err(|_| format!("Invalid float tag: {}", field))?,
        ),
        "Z" => TagValue::String(value.to_string()),
        "H" => TagValue::Hex(value.to_string()),
        "B" => {
            let mut items = value.split(',');
            let subtype = items.next().unwrap_or_default();
            let items: Vec<&str> = items.collect();
            let array = match subtype {
                "c" => ArrayValue::Int8(parse_list(&items, field)?),
                "C" => ArrayValue::UInt8(parse_list(&items, field)?),
                "s" => ArrayValue::Int16(parse_list(&items, field)?),
                "S" => ArrayValue::UInt16(parse_list(&items, field)?),
                "i" => ArrayValue::Int32(parse_list(&items, field)?),
                "I" => ArrayValue::UInt32(parse_list(&items, field)?),
                "f" => ArrayValue::Float(parse_list(&items, field)?),
                _ => return Err(format!("Unknown array subtype in tag: {}", field)),
            };
            TagValue::Array(array)
        }
        _ => return Err(format!("Unknown tag type in: {}", field)),
    };

    Ok(Tag { name, value })
}
