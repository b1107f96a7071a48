//! Declarative parameter syntaxes.
//!
//! Every structured field, triplet and PTOCA function is described by a
//! syntax: an ordered list of parameter descriptors, possibly containing a
//! nested syntax for a repeating group.  The parser in `parser.rs` is a
//! generic interpreter of these descriptions; the tables live in
//! `fields.rs`, `triplets.rs` and `functions.rs`.

/// The wire type of one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// Unsigned big-endian integer used as an opaque identifier.
    Code,
    /// Raw byte (length 1) or byte sequence.
    Byte,
    /// Unsigned big-endian integer.
    Ubin,
    /// Signed big-endian two's-complement integer.
    Sbin,
    /// Fixed-length EBCDIC-CP-BE text, trailing whitespace trimmed.
    Char,
    /// Trailing sequence of triplet records.
    Triplet,
    /// Trailing sequence of presentation-text control sequences.
    Ptoca,
}

/// Markers that let a flat table express framing decisions the parser has
/// to act on mid-walk.  Interpreted inline by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preproc {
    /// This `Ubin` parameter holds the length of the upcoming repeating
    /// group.
    NextGroupLength,
    /// This `Ubin` parameter holds the length of the group it sits in; the
    /// group's buffer is truncated to that many bytes.
    ThisGroupLength,
    /// Skip this parameter when the SFI extension flag is clear.
    SuppressIfNoExtension,
    /// Decode with length `ExtLength - 1`; skip when the extension flag is
    /// clear.
    SetExtensionLength,
}

/// One parameter of a structured field, triplet or control sequence.
/// `length` 0 means "the rest of the record"; optional parameters sit at
/// the end of their syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parameter {
    pub offset: usize,
    pub length: usize,
    pub datatype: DataType,
    pub name: &'static str,
    pub mandatory: bool,
    pub preproc: Option<Preproc>,
}

#[derive(Debug, Clone, Copy)]
pub enum SyntaxElement {
    Param(Parameter),
    /// A repeating group: the nested syntax is applied to consecutive
    /// slices until the enclosing buffer is exhausted.
    Group(Syntax),
}

pub type Syntax = &'static [SyntaxElement];

pub const fn param(
    offset: usize,
    length: usize,
    datatype: DataType,
    name: &'static str,
    mandatory: bool,
) -> SyntaxElement {
    SyntaxElement::Param(Parameter {
        offset,
        length,
        datatype,
        name,
        mandatory,
        preproc: None,
    })
}

pub const fn param_with(
    offset: usize,
    length: usize,
    datatype: DataType,
    name: &'static str,
    mandatory: bool,
    preproc: Preproc,
) -> SyntaxElement {
    SyntaxElement::Param(Parameter {
        offset,
        length,
        datatype,
        name,
        mandatory,
        preproc: Some(preproc),
    })
}

pub const fn group(syntax: Syntax) -> SyntaxElement {
    SyntaxElement::Group(syntax)
}

/// Number of bytes covered by a syntax, or zero if that cannot be known up
/// front (an optional, open-ended or nested element).  A repeating group
/// whose length comes out zero must size itself from its own data.
pub fn syntax_length(syntax: Syntax) -> usize {
    let mut length = 0;
    for element in syntax {
        match element {
            SyntaxElement::Param(p) => {
                if !p.mandatory || p.length == 0 {
                    return 0;
                }
                length += p.length;
            }
            SyntaxElement::Group(_) => return 0,
        }
    }
    length
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXED: Syntax = &[
        param(0, 2, DataType::Ubin, "Startnum", true),
        param(2, 2, DataType::Ubin, "Stopnum", true),
        param(4, 1, DataType::Byte, "Reserved", true),
        param(5, 1, DataType::Code, "MMCid", true),
    ];

    const WITH_OPTIONAL_TAIL: Syntax = &[
        param(0, 2, DataType::Ubin, "A", true),
        param(2, 2, DataType::Code, "B", false),
    ];

    const OPEN_ENDED: Syntax = &[
        param(0, 2, DataType::Ubin, "Len", true),
        param(2, 0, DataType::Triplet, "Triplets", true),
    ];

    #[test]
    fn test_syntax_length_fixed() {
        assert_eq!(syntax_length(FIXED), 6);
    }

    #[test]
    fn test_syntax_length_unknowable() {
        assert_eq!(syntax_length(WITH_OPTIONAL_TAIL), 0);
        assert_eq!(syntax_length(OPEN_ENDED), 0);
    }
}
