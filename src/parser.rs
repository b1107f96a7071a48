//! The parser.
//!
//! One generic interpreter walks the declarative syntaxes from `fields.rs`,
//! `triplets.rs` and `functions.rs` against byte buffers; thin drivers
//! handle the triplet and PTOCA framing; `read_structured_field` frames one
//! structured field from the byte source and [`Stream`] turns that into a
//! lazy iterator of records.

use std::io::Read;

use log::{debug, warn};

use crate::buffer;
use crate::error::{ErrorKind, ParseError};
use crate::fields;
use crate::functions;
use crate::record::{NameCounters, Record, Value};
use crate::source::StreamSource;
use crate::syntax::{syntax_length, DataType, Parameter, Preproc, Syntax, SyntaxElement};
use crate::triplets;

/// Every structured field starts with this carriage control byte.
pub const CARRIAGE_CONTROL_CHAR: u8 = 0x5A;
/// Escape introducing each chain of presentation-text control sequences.
pub const PTX_ESCAPE_SEQUENCE: u16 = 0x2BD3;
/// MO:DCA structured field IDs carry this class byte.
pub const MODCA_CLASS_CODE: u32 = 0xD3;

/// Name under which repeating groups are stored.
pub const PNAME_REPEATING_GROUP: &str = "RepeatingGroup";

/// Holds the configuration of the parser.
///
/// The three `allow_unknown_*` options replace the fatal
/// `unrecognized-*` errors with a raw decode of the offending record.
/// When `strict` is false, missing-mandatory-parameter and
/// incomplete-parameter errors are accumulated on the record being parsed
/// instead of aborting the stream.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParserConfig {
    pub allow_unknown_fields: bool,
    pub allow_unknown_triplets: bool,
    pub allow_unknown_functions: bool,
    pub strict: bool,
}

fn ext_flag_set(record: &Record) -> bool {
    fields::sfi_ext_flag(record.num(fields::PNAME_FLAG_BYTE).unwrap_or(0) as u8)
}

/// Decode one parameter from `data`.  `Ok(None)` means the buffer was
/// already exhausted at the parameter's offset.
fn decode_value(
    data: &[u8],
    param: &Parameter,
    config: &ParserConfig,
) -> Result<Option<Value>, ParseError> {
    let value = match param.datatype {
        DataType::Code | DataType::Ubin => {
            buffer::ubin(data, param.offset, param.length)?.map(|v| Value::Num(v as i64))
        }
        DataType::Sbin => buffer::sbin(data, param.offset, param.length)?.map(Value::Num),
        DataType::Byte => buffer::take(data, param.offset, param.length)?.map(|b| {
            if param.length == 1 {
                Value::Num(b[0] as i64)
            } else {
                Value::Bytes(b.to_vec())
            }
        }),
        DataType::Char => buffer::chars(data, param.offset, param.length)?.map(Value::Text),
        DataType::Triplet => Some(Value::Records(parse_triplets(data, config, param.offset)?)),
        DataType::Ptoca => Some(Value::Records(parse_ptoca(data, config, param.offset)?)),
    };
    Ok(value)
}

/// Record a non-fatal error on `result`, or fail the parse in strict mode.
fn recoverable(
    kind: ErrorKind,
    config: &ParserConfig,
    result: &mut Record,
) -> Result<(), ParseError> {
    let e = ParseError::new(kind);
    if config.strict {
        return Err(e);
    }
    warn!("{}", e);
    result.push_exception(e.modca_code(), e.message());
    Ok(())
}

/// Parse a syntax - a structured field body, a triplet or a PTOCA function.
///
/// This is the heart of the parser.  Walks the syntax elements in order
/// against `data`, appending decoded parameters to `result` (names uniqued
/// through `counters`).  Returns the number of bytes the record covers,
/// which is the buffer length after any `ThisGroupLength` truncation.
fn parse_syntax(
    data: &[u8],
    syntax: Syntax,
    config: &ParserConfig,
    result: &mut Record,
    counters: &mut NameCounters,
) -> Result<usize, ParseError> {
    let mut data = data;
    // Length hint for an upcoming repeating group, set by a preprocessor.
    let mut next_group_length: usize = 0;
    // First byte not yet consumed by a fixed parameter.
    let mut next_field_offset: usize = 0;

    for element in syntax {
        match *element {
            SyntaxElement::Group(group_syntax) => {
                // Without a hint from an earlier parameter, the group length
                // is the sum of its parameter lengths.  That may still be
                // zero (optional or open-ended members), in which case the
                // group must terminate itself.
                let group_length = if next_group_length != 0 {
                    next_group_length
                } else {
                    syntax_length(group_syntax)
                };
                let mut groups = Vec::new();
                let mut group_offset = next_field_offset;
                while group_offset < data.len() {
                    let group_data = if group_length != 0 {
                        if group_offset + group_length > data.len() {
                            return Err(ErrorKind::RepeatingGroup(String::from(
                                "Repeating group length longer than available data",
                            ))
                            .into());
                        }
                        &data[group_offset..group_offset + group_length]
                    } else {
                        &data[group_offset..]
                    };
                    debug!(
                        "Parsing repeating group: offset {}; length {}",
                        group_offset, group_length
                    );
                    let mut group_record = Record::new();
                    let mut group_counters = NameCounters::new();
                    let consumed =
                        parse_syntax(group_data, group_syntax, config, &mut group_record, &mut group_counters)?;
                    groups.push(group_record);
                    if consumed == 0 {
                        return Err(ErrorKind::RepeatingGroup(String::from(
                            "Repeating group consumed no data",
                        ))
                        .into());
                    }
                    group_offset += consumed;
                }
                if !groups.is_empty() {
                    result.push_unique(PNAME_REPEATING_GROUP, Value::Records(groups), counters);
                }
                next_group_length = 0;
                next_field_offset = group_offset;
            }
            SyntaxElement::Param(p) => {
                let mut param = p;
                if let Some(preproc) = param.preproc {
                    match preproc {
                        Preproc::SuppressIfNoExtension => {
                            if !ext_flag_set(result) {
                                continue;
                            }
                        }
                        Preproc::SetExtensionLength => {
                            if !ext_flag_set(result) {
                                continue;
                            }
                            match result.num(fields::PNAME_EXT_LENGTH) {
                                // ExtLength counts itself plus its data.
                                Some(ext_length) if ext_length >= 1 => {
                                    param.length = (ext_length - 1) as usize;
                                    if param.length == 0 {
                                        result.push_unique(param.name, Value::Bytes(Vec::new()), counters);
                                        next_field_offset = param.offset;
                                        continue;
                                    }
                                }
                                _ => continue,
                            }
                        }
                        Preproc::NextGroupLength | Preproc::ThisGroupLength => {}
                    }
                }

                let value = match decode_value(data, &param, config) {
                    Ok(v) => v,
                    Err(e) if matches!(e.kind, ErrorKind::EndOfStream(_)) => {
                        // The buffer ran out partway through this parameter;
                        // the walk of this syntax is over either way.
                        let kind = if param.mandatory {
                            ErrorKind::RequiredParameterMissing(format!(
                                "Required parameter missing: {}",
                                param.name
                            ))
                        } else {
                            ErrorKind::IncompleteParameter(format!(
                                "Not enough data to parse parameter {}",
                                param.name
                            ))
                        };
                        recoverable(kind, config, result)?;
                        return Ok(data.len());
                    }
                    Err(e) => return Err(e),
                };

                if param.datatype == DataType::Ubin {
                    if let Some(&Value::Num(v)) = value.as_ref() {
                        match param.preproc {
                            Some(Preproc::NextGroupLength) => {
                                if v == 0 {
                                    return Err(ErrorKind::RepeatingGroup(String::from(
                                        "Repeating group length cannot be zero",
                                    ))
                                    .into());
                                }
                                next_group_length = v as usize;
                            }
                            Some(Preproc::ThisGroupLength) => {
                                if v == 0 {
                                    return Err(ErrorKind::RepeatingGroup(String::from(
                                        "Repeating group length cannot be zero",
                                    ))
                                    .into());
                                }
                                if v as usize > data.len() {
                                    return Err(ErrorKind::RepeatingGroup(String::from(
                                        "Repeating group length longer than available data",
                                    ))
                                    .into());
                                }
                                data = &data[0..v as usize];
                            }
                            _ => {}
                        }
                    }
                }

                let present = match &value {
                    None => false,
                    Some(Value::Records(list)) => !list.is_empty(),
                    Some(_) => true,
                };
                if present {
                    let value = value.unwrap_or(Value::Num(0));
                    debug!(
                        "Parameter: {} ({}, {}, {:?}) => <{}>",
                        param.name, param.offset, param.length, param.datatype, value
                    );
                    result.push_unique(param.name, value, counters);
                } else if param.mandatory {
                    recoverable(
                        ErrorKind::RequiredParameterMissing(format!(
                            "Required parameter missing: {}",
                            param.name
                        )),
                        config,
                        result,
                    )?;
                }
                next_field_offset = param.offset + param.length;
            }
        }
    }
    Ok(data.len())
}

/// Parse the trailing triplet area of a field body, starting at `offset`.
fn parse_triplets(
    data: &[u8],
    config: &ParserConfig,
    offset: usize,
) -> Result<Vec<Record>, ParseError> {
    let mut triplet_list = Vec::new();
    let mut p = offset;
    let mut i = 0;
    // Keep going until we run out of data; triplets are always the tail of
    // a structured field.
    while p < data.len() {
        debug!("Parsing triplet {}", i + 1);
        let t_length = match buffer::ubin(data, p, 1) {
            Ok(Some(v)) => v as usize,
            _ => {
                return Err(ErrorKind::InvalidTriplet(format!(
                    "Not enough data to parse triplet {} length",
                    i + 1
                ))
                .into())
            }
        };
        let t_id = match buffer::ubin(data, p + 1, 1) {
            Ok(Some(v)) => v as u8,
            _ => {
                return Err(ErrorKind::InvalidTriplet(format!(
                    "Not enough data to parse triplet {} Id",
                    i + 1
                ))
                .into())
            }
        };
        // A triplet length includes its own two header bytes.
        if t_length < 2 {
            return Err(ErrorKind::InvalidTriplet(format!(
                "Invalid length {} for triplet {}",
                t_length,
                i + 1
            ))
            .into());
        }
        let triplet_type = triplets::TRIPLET_TYPES.get(&t_id);
        if triplet_type.is_none() && !config.allow_unknown_triplets {
            return Err(
                ErrorKind::UnrecognizedTriplet(format!("Unrecognized triplet 0x{:02X}", t_id))
                    .into(),
            );
        }
        let contents: &[u8] = if t_length == 2 {
            &[]
        } else {
            match buffer::take(data, p + 2, t_length - 2) {
                Ok(Some(b)) => b,
                _ => {
                    return Err(ErrorKind::InvalidTriplet(format!(
                        "Not enough data to parse triplet {} contents",
                        i + 1
                    ))
                    .into())
                }
            }
        };
        if let Some(t) = triplet_type {
            debug!("Triplet length {} type 0x{:02X} ({})", t_length, t_id, t.name);
        } else {
            debug!("Triplet length {} type 0x{:02X}", t_length, t_id);
        }
        let syntax = triplet_type
            .map(|t| t.syntax)
            .unwrap_or(triplets::SYNTAX_TRIPLET_RAW);
        let mut triplet = Record::new();
        let mut counters = NameCounters::new();
        parse_syntax(contents, syntax, config, &mut triplet, &mut counters)?;
        triplet.push(triplets::PNAME_T_LENGTH, Value::Num(t_length as i64));
        triplet.push(triplets::PNAME_T_ID, Value::Num(t_id as i64));
        debug!("Triplet: {:?}", triplet);
        triplet_list.push(triplet);
        p += t_length;
        i += 1;
    }
    Ok(triplet_list)
}

/// Parse the PTOCA control-sequence area of a PTX body, starting at
/// `offset`.
fn parse_ptoca(
    data: &[u8],
    config: &ParserConfig,
    offset: usize,
) -> Result<Vec<Record>, ParseError> {
    let mut ctrl_sequences = Vec::new();
    // The first control sequence in a chain follows an escape; chained ones
    // follow each other directly.
    let mut chained = false;
    let mut p = offset;
    let mut i = 0;
    while p < data.len() {
        debug!("Parsing control sequence {}", i + 1);
        if !chained {
            let escape = match buffer::ubin(data, p, 2) {
                Ok(Some(v)) => v as u16,
                _ => {
                    return Err(ErrorKind::InvalidControlSequence(format!(
                        "Not enough data to parse control sequence {} escape sequence",
                        i + 1
                    ))
                    .into())
                }
            };
            p += 2;
            if escape != PTX_ESCAPE_SEQUENCE {
                return Err(ErrorKind::InvalidControlSequence(format!(
                    "Missing 0x{:X} escape sequence before control sequence {}",
                    PTX_ESCAPE_SEQUENCE,
                    i + 1
                ))
                .into());
            }
        }
        let length = match buffer::ubin(data, p, 1) {
            Ok(Some(v)) => v as usize,
            _ => {
                return Err(ErrorKind::InvalidControlSequence(format!(
                    "Not enough data to parse control sequence {} length",
                    i + 1
                ))
                .into())
            }
        };
        p += 1;
        let function = match buffer::ubin(data, p, 1) {
            Ok(Some(v)) => v as u8,
            _ => {
                return Err(ErrorKind::InvalidControlSequence(format!(
                    "Not enough data to parse control sequence {} function",
                    i + 1
                ))
                .into())
            }
        };
        p += 1;
        // A control sequence length includes the length and function bytes.
        if length < 2 {
            return Err(ErrorKind::InvalidControlSequence(format!(
                "Invalid length {} for control sequence {}",
                length,
                i + 1
            ))
            .into());
        }
        let fn_info = functions::FUNCTIONS.get(&function);
        if fn_info.is_none() && !config.allow_unknown_functions {
            return Err(
                ErrorKind::UnknownFunction(format!("Unknown function 0x{:X}", function)).into(),
            );
        }
        let function_data: &[u8] = if length == 2 {
            &[]
        } else {
            match buffer::take(data, p, length - 2) {
                Ok(Some(b)) => b,
                _ => {
                    return Err(ErrorKind::InvalidControlSequence(format!(
                        "Not enough data to parse control sequence {} function data",
                        i + 1
                    ))
                    .into())
                }
            }
        };
        p += length - 2;
        if let Some(f) = fn_info {
            debug!(
                "Function length {} type 0x{:02X} ({} {})",
                length, function, f.abbreviation, f.name
            );
        } else {
            debug!("Function length {} type 0x{:02X}", length, function);
        }
        let syntax = fn_info
            .map(|f| f.syntax)
            .unwrap_or(functions::SYNTAX_FUNCTION_RAW);
        let mut ctrl_sequence = Record::new();
        let mut counters = NameCounters::new();
        parse_syntax(function_data, syntax, config, &mut ctrl_sequence, &mut counters)?;
        ctrl_sequence.push(functions::PNAME_CS_LENGTH, Value::Num(length as i64));
        ctrl_sequence.push(functions::PNAME_CS_TYPE, Value::Num(function as i64));
        debug!("Control Sequence: {:?}", ctrl_sequence);
        ctrl_sequences.push(ctrl_sequence);
        chained = functions::chained_function(function);
        i += 1;
    }
    if chained {
        return Err(
            ErrorKind::InvalidControlSequence(String::from("Final function is chained")).into(),
        );
    }
    Ok(ctrl_sequences)
}

/// Read one structured field from the byte source.  `Ok(None)` means the
/// source ended cleanly at a field boundary.
fn read_structured_field<R: Read>(
    source: &mut StreamSource<R>,
    config: &ParserConfig,
) -> Result<Option<Record>, ParseError> {
    // Counters are shared between the SFI and the body so a body parameter
    // recurring an SFI name gets renamed.
    let mut counters = NameCounters::new();
    let b = match source.read_byte().map_err(ParseError::new)? {
        None => return Ok(None),
        Some(b) => b,
    };
    if b != CARRIAGE_CONTROL_CHAR {
        return Err(ErrorKind::InvalidStructuredField(format!(
            "Missing 0x{:02X} carriage control character",
            CARRIAGE_CONTROL_CHAR
        ))
        .into());
    }
    let sf_length = match source.read_ubin(2) {
        Ok(Some(v)) => v as usize,
        Ok(None) => {
            return Err(ErrorKind::InvalidStructuredField(String::from(
                "Missing structured field length",
            ))
            .into())
        }
        Err(ErrorKind::EndOfFile(_)) => {
            return Err(ErrorKind::InvalidStructuredField(String::from(
                "Not enough data to read structured field length",
            ))
            .into())
        }
        Err(e) => return Err(e.into()),
    };
    debug!("Reading structured field length {} bytes", sf_length);
    // The length includes its own two bytes.
    if sf_length < 2 {
        return Err(ErrorKind::InvalidStructuredField(format!(
            "Structured field length {} too small",
            sf_length
        ))
        .into());
    }
    let data = match source.read_bytes(sf_length - 2) {
        Ok(Some(d)) => d,
        Ok(None) => {
            return Err(ErrorKind::InvalidStructuredField(String::from(
                "Structured field incorrect length",
            ))
            .into())
        }
        Err(ErrorKind::EndOfFile(_)) => {
            return Err(ErrorKind::InvalidStructuredField(String::from(
                "Not enough data to read structured field",
            ))
            .into())
        }
        Err(e) => return Err(e.into()),
    };
    debug!("Structured Field data: {:02X?}", data);

    debug!("Parsing Structured Field Introducer");
    let mut sf = Record::new();
    parse_syntax(&data, fields::SYNTAX_SFI, config, &mut sf, &mut counters)?;
    sf.push(fields::PNAME_SF_LENGTH, Value::Num(sf_length as i64));

    let sf_type_id = sf.num(fields::PNAME_SF_TYPE_ID).unwrap_or(0) as u32;
    if (sf_type_id & 0xFF0000) >> 16 != MODCA_CLASS_CODE {
        return Err(ErrorKind::UnrecognizedIdentifierCode(format!(
            "Unrecognized class code 0x{:06X} - MO:DCA uses class code 0x{:02X}",
            sf_type_id, MODCA_CLASS_CODE
        ))
        .into());
    }
    let flag_byte = sf.num(fields::PNAME_FLAG_BYTE).unwrap_or(0) as u8;
    // Padded fields are not supported; segmented fields are surfaced as
    // independent records.
    if fields::sfi_pad_flag(flag_byte) {
        return Err(ErrorKind::PaddingNotImplemented(String::from(
            "Structured Field padding is not supported",
        ))
        .into());
    }
    let sf_type = fields::SF_TYPES.get(&sf_type_id);
    if sf_type.is_none() && !config.allow_unknown_fields {
        return Err(ErrorKind::UnrecognizedStructuredField(format!(
            "Unrecognized structured field 0x{:06X}",
            sf_type_id
        ))
        .into());
    }
    if let Some(t) = sf_type {
        debug!(
            "SFTypeID 0x{:06X} ({} {}); FlagByte 0x{:02X} ext {} seg {} pad {}",
            sf_type_id,
            t.abbreviation,
            t.name,
            flag_byte,
            fields::sfi_ext_flag(flag_byte),
            fields::sfi_seg_flag(flag_byte),
            fields::sfi_pad_flag(flag_byte)
        );
    }

    let mut field_data_start = 6;
    if fields::sfi_ext_flag(flag_byte) {
        field_data_start += sf.num(fields::PNAME_EXT_LENGTH).unwrap_or(0) as usize;
    }
    let field_data = data.get(field_data_start..).unwrap_or(&[]);
    let syntax = sf_type.map(|t| t.syntax).unwrap_or(fields::SYNTAX_FIELD_RAW);
    parse_syntax(field_data, syntax, config, &mut sf, &mut counters)?;
    debug!("Structured Field: {:?}", sf);
    Ok(Some(sf))
}

/// A lazy, finite sequence of structured fields decoded from `input`.
///
/// The sequence ends cleanly when the source reports end of input at a
/// field boundary.  A fatal error is yielded once, annotated with the
/// 1-based field ordinal and the byte offset at which that field starts,
/// and the iterator is exhausted afterwards.
pub struct Stream<R: Read> {
    source: StreamSource<R>,
    config: ParserConfig,
    field_no: u64,
    done: bool,
}

impl<R: Read> Stream<R> {
    pub fn new(input: R, config: ParserConfig) -> Stream<R> {
        Stream {
            source: StreamSource::new(input),
            config,
            field_no: 1,
            done: false,
        }
    }
}

impl<R: Read> Iterator for Stream<R> {
    type Item = Result<Record, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let field_start_offset = self.source.position();
        debug!(
            "Reading structured field {} at offset {}",
            self.field_no, field_start_offset
        );
        match read_structured_field(&mut self.source, &self.config) {
            Ok(Some(sf)) => {
                self.field_no += 1;
                Some(Ok(sf))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(mut e) => {
                self.done = true;
                e.field_no = Some(self.field_no);
                e.field_start_offset = Some(field_start_offset);
                log::error!("{}", e);
                Some(Err(e))
            }
        }
    }
}

/// Parse AFP from `input`, yielding structured fields one at a time.
///
/// ```no_run
/// use afpread::ParserConfig;
///
/// let f = std::fs::File::open("myfile.afp").unwrap();
/// for sf in afpread::stream(f, ParserConfig::default()) {
///     let sf = sf.unwrap();
///     // Do something with structured field sf
/// }
/// ```
pub fn stream<R: Read>(input: R, config: ParserConfig) -> Stream<R> {
    Stream::new(input, config)
}

/// Parse AFP from `input` into a list of structured fields.  This loads the
/// whole file; use [`stream`] for large inputs.
pub fn load<R: Read>(input: R, config: ParserConfig) -> Result<Vec<Record>, ParseError> {
    stream(input, config).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ebcdic;
    use crate::fields::{SF_BDT, SF_BPG, SF_MCC, SF_MCF, SF_MCF_1, SF_NOP, SF_PTX};
    use hex::FromHex;
    use std::io::Cursor;

    fn bytes(hex_str: &str) -> Vec<u8> {
        Vec::from_hex(hex_str.replace(' ', "")).unwrap()
    }

    /// Frame `body` (the part after the SFI) as a structured field.
    fn make_sf(type_id: u32, flag_byte: u8, body: &[u8]) -> Vec<u8> {
        let sf_length = 2 + 6 + body.len();
        let mut out = vec![
            CARRIAGE_CONTROL_CHAR,
            (sf_length >> 8) as u8,
            sf_length as u8,
            (type_id >> 16) as u8,
            (type_id >> 8) as u8,
            type_id as u8,
            flag_byte,
            0x00,
            0x00,
        ];
        out.extend_from_slice(body);
        out
    }

    fn load_one(input: &[u8], config: ParserConfig) -> Record {
        let mut fields = load(Cursor::new(input.to_vec()), config).unwrap();
        assert_eq!(fields.len(), 1);
        fields.remove(0)
    }

    fn load_err(input: &[u8], config: ParserConfig) -> ParseError {
        load(Cursor::new(input.to_vec()), config).unwrap_err()
    }

    #[test]
    fn test_minimal_bdt() {
        let mut body = ebcdic::encode("DOCNAME ");
        body.extend_from_slice(&[0x00, 0x00]);
        // Resource Local Identifier triplet: type 0x02, LID 0x05.
        body.extend_from_slice(&bytes("04 24 02 05"));
        let input = make_sf(SF_BDT, 0x00, &body);

        let config = ParserConfig {
            strict: true,
            ..Default::default()
        };
        let sf = load_one(&input, config);
        assert_eq!(sf.num("SFTypeID"), Some(0xD3A8A8));
        assert_eq!(sf.num("SFLength"), Some(input.len() as i64 - 1));
        assert_eq!(sf.num("FlagByte"), Some(0x00));
        assert_eq!(sf.bytes("Reserved"), Some(&[0x00, 0x00][..]));
        assert_eq!(sf.text("DocName"), Some("DOCNAME"));
        // The body's reserved bytes collide with the SFI's and get renamed.
        assert_eq!(sf.bytes("Reserved-2"), Some(&[0x00, 0x00][..]));
        let triplets = sf.records("Triplets").unwrap();
        assert_eq!(triplets.len(), 1);
        assert_eq!(triplets[0].num("Tlength"), Some(4));
        assert_eq!(triplets[0].num("Tid"), Some(0x24));
        assert_eq!(triplets[0].num("ResType"), Some(0x02));
        assert_eq!(triplets[0].num("ResLID"), Some(0x05));
        assert!(sf.exceptions().is_empty());
        // No extension, so no extension parameters.
        assert!(!sf.contains("ExtLength"));
        assert!(!sf.contains("ExtData"));
    }

    #[test]
    fn test_bdt_without_triplets_records_missing_mandatory() {
        let mut body = ebcdic::encode("DOCNAME ");
        body.extend_from_slice(&[0x00, 0x00]);
        let input = make_sf(SF_BDT, 0x00, &body);

        let sf = load_one(&input, ParserConfig::default());
        assert_eq!(sf.text("DocName"), Some("DOCNAME"));
        assert!(!sf.contains("Triplets"));
        assert_eq!(
            sf.exceptions(),
            &[(0x04, String::from("0x04 Required parameter missing: Triplets"))]
        );
    }

    #[test]
    fn test_truncated_bdt_lenient() {
        // The SFLength implies 8 DocName bytes but only 4 are present.
        let body = ebcdic::encode("DOCN");
        let input = make_sf(SF_BDT, 0x00, &body);

        let sf = load_one(&input, ParserConfig::default());
        assert!(!sf.contains("DocName"));
        assert_eq!(sf.exceptions().len(), 1);
        assert_eq!(sf.exceptions()[0].0, 0x04);
        assert!(sf.exceptions()[0].1.contains("DocName"));
    }

    #[test]
    fn test_truncated_bdt_strict() {
        let body = ebcdic::encode("DOCN");
        let input = make_sf(SF_BDT, 0x00, &body);

        let config = ParserConfig {
            strict: true,
            ..Default::default()
        };
        let e = load_err(&input, config);
        assert!(matches!(e.kind, ErrorKind::RequiredParameterMissing(_)));
        assert_eq!(e.modca_code(), 0x04);
        assert_eq!(e.field_no, Some(1));
        assert_eq!(e.field_start_offset, Some(0));
    }

    #[test]
    fn test_unknown_field_fatal() {
        let input = make_sf(0xD3FFFF, 0x00, &[]);
        let e = load_err(&input, ParserConfig::default());
        assert!(matches!(e.kind, ErrorKind::UnrecognizedStructuredField(_)));
        assert_eq!(e.modca_code(), 0x10);
        assert_eq!(e.field_no, Some(1));
        assert_eq!(e.field_start_offset, Some(0));
    }

    #[test]
    fn test_unknown_field_allowed() {
        let config = ParserConfig {
            allow_unknown_fields: true,
            ..Default::default()
        };
        // Empty body: nothing to capture.
        let sf = load_one(&make_sf(0xD3FFFF, 0x00, &[]), config);
        assert!(!sf.contains("Data"));
        assert!(sf.exceptions().is_empty());
        // Non-empty body comes back raw.
        let sf = load_one(&make_sf(0xD3FFFF, 0x00, &[0xAB, 0xCD]), config);
        assert_eq!(sf.bytes("Data"), Some(&[0xAB, 0xCD][..]));
    }

    #[test]
    fn test_wrong_class_code() {
        let e = load_err(&make_sf(0xD4A8A8, 0x00, &[]), ParserConfig::default());
        assert!(matches!(e.kind, ErrorKind::UnrecognizedIdentifierCode(_)));
        assert_eq!(e.modca_code(), 0x40);
    }

    #[test]
    fn test_padding_flag_is_fatal() {
        let e = load_err(&make_sf(SF_NOP, 0x08, &[]), ParserConfig::default());
        assert!(matches!(e.kind, ErrorKind::PaddingNotImplemented(_)));
    }

    #[test]
    fn test_segmented_flag_is_surfaced_unchanged() {
        let sf = load_one(&make_sf(SF_NOP, 0x20, &[0x01]), ParserConfig::default());
        assert_eq!(sf.num("FlagByte"), Some(0x20));
        assert_eq!(sf.bytes("UndfData"), Some(&[0x01][..]));
    }

    #[test]
    fn test_missing_carriage_control() {
        let e = load_err(&[0x00, 0x00, 0x08], ParserConfig::default());
        assert!(matches!(e.kind, ErrorKind::InvalidStructuredField(_)));
    }

    #[test]
    fn test_truncated_length_and_body() {
        // Only the framing byte.
        let e = load_err(&[0x5A], ParserConfig::default());
        assert!(matches!(e.kind, ErrorKind::InvalidStructuredField(_)));
        // Length present, one of its bytes missing.
        let e = load_err(&[0x5A, 0x00], ParserConfig::default());
        assert!(matches!(e.kind, ErrorKind::InvalidStructuredField(_)));
        // Body shorter than the length promises.
        let e = load_err(&bytes("5A 00 10 D3 EE EE 00"), ParserConfig::default());
        assert!(matches!(e.kind, ErrorKind::InvalidStructuredField(_)));
    }

    #[test]
    fn test_sfi_extension() {
        // NOP with a 3-byte extension (ExtLength 3 counts itself).
        let mut input = bytes("5A 00 0B D3 EE EE 80 00 00 03 AA BB");
        input.extend_from_slice(&[0x01, 0x02]);
        input[2] += 2; // account for the UndfData bytes
        let sf = load_one(&input, ParserConfig::default());
        assert_eq!(sf.num("ExtLength"), Some(3));
        assert_eq!(sf.bytes("ExtData"), Some(&[0xAA, 0xBB][..]));
        assert_eq!(sf.bytes("UndfData"), Some(&[0x01, 0x02][..]));
    }

    #[test]
    fn test_sfi_extension_length_one_yields_empty_ext_data() {
        let input = bytes("5A 00 0A D3 EE EE 80 00 00 01 07");
        let sf = load_one(&input, ParserConfig::default());
        assert_eq!(sf.num("ExtLength"), Some(1));
        assert_eq!(sf.bytes("ExtData"), Some(&[][..]));
        assert_eq!(sf.bytes("UndfData"), Some(&[0x07][..]));
    }

    #[test]
    fn test_bpg_triplet_stream() {
        let mut body = ebcdic::encode("PAGE0001");
        // Fully Qualified Name header (no name bytes) + Resource Local Id.
        body.extend_from_slice(&bytes("04 02 00 01 04 24 02 05"));
        let sf = load_one(&make_sf(SF_BPG, 0x00, &body), ParserConfig::default());
        assert_eq!(sf.text("PageName"), Some("PAGE0001"));
        let triplets = sf.records("Triplets").unwrap();
        assert_eq!(triplets.len(), 2);
        assert_eq!(triplets[0].num("Tlength"), Some(4));
        assert_eq!(triplets[0].num("Tid"), Some(0x02));
        assert_eq!(triplets[0].num("FQNType"), Some(0));
        assert_eq!(triplets[0].num("FQNFmt"), Some(1));
        // The name itself is absent, which the FQN syntax reports.
        assert_eq!(triplets[0].exceptions().len(), 1);
        assert_eq!(triplets[1].num("Tlength"), Some(4));
        assert_eq!(triplets[1].num("Tid"), Some(0x24));
        assert_eq!(triplets[1].num("ResType"), Some(0x02));
        assert_eq!(triplets[1].num("ResLID"), Some(0x05));
    }

    #[test]
    fn test_unknown_triplet() {
        let mut body = ebcdic::encode("PAGE0001");
        body.extend_from_slice(&bytes("04 99 01 02"));
        let input = make_sf(SF_BPG, 0x00, &body);

        let e = load_err(&input, ParserConfig::default());
        assert!(matches!(e.kind, ErrorKind::UnrecognizedTriplet(_)));
        assert_eq!(e.modca_code(), 0x10);

        let config = ParserConfig {
            allow_unknown_triplets: true,
            ..Default::default()
        };
        let sf = load_one(&input, config);
        let triplets = sf.records("Triplets").unwrap();
        assert_eq!(triplets[0].bytes("Contents"), Some(&[0x01, 0x02][..]));
        assert_eq!(triplets[0].num("Tid"), Some(0x99));
    }

    #[test]
    fn test_empty_body_unknown_triplet() {
        let config = ParserConfig {
            allow_unknown_triplets: true,
            ..Default::default()
        };
        let mut body = ebcdic::encode("PAGE0001");
        body.extend_from_slice(&bytes("02 00"));
        let sf = load_one(&make_sf(SF_BPG, 0x00, &body), config);
        let triplets = sf.records("Triplets").unwrap();
        assert_eq!(triplets.len(), 1);
        assert_eq!(triplets[0].num("Tlength"), Some(2));
        assert_eq!(triplets[0].num("Tid"), Some(0x00));
        assert!(!triplets[0].contains("Contents"));
    }

    #[test]
    fn test_bad_triplet_lengths() {
        // Tlength 1 cannot cover its own header.
        let mut body = ebcdic::encode("PAGE0001");
        body.extend_from_slice(&bytes("01 24"));
        let e = load_err(&make_sf(SF_BPG, 0x00, &body), ParserConfig::default());
        assert!(matches!(e.kind, ErrorKind::InvalidTriplet(_)));

        // Truncated triplet contents.
        let mut body = ebcdic::encode("PAGE0001");
        body.extend_from_slice(&bytes("05 24 02"));
        let e = load_err(&make_sf(SF_BPG, 0x00, &body), ParserConfig::default());
        assert!(matches!(e.kind, ErrorKind::InvalidTriplet(_)));

        // A lone length byte with no id.
        let mut body = ebcdic::encode("PAGE0001");
        body.extend_from_slice(&bytes("04"));
        let e = load_err(&make_sf(SF_BPG, 0x00, &body), ParserConfig::default());
        assert!(matches!(e.kind, ErrorKind::InvalidTriplet(_)));
    }

    #[test]
    fn test_ptoca_chain() {
        // Escape, chained TRN "ABC", then unchained TRN "D" ending the
        // chain.
        let body = bytes("2B D3 05 DB C1 C2 C3 03 DA C4");
        let sf = load_one(&make_sf(SF_PTX, 0x00, &body), ParserConfig::default());
        let cs = sf.records("PTOCAdat").unwrap();
        assert_eq!(cs.len(), 2);
        assert_eq!(cs[0].num("LENGTH"), Some(5));
        assert_eq!(cs[0].num("TYPE"), Some(0xDB));
        assert_eq!(cs[0].text("TRNDATA"), Some("ABC"));
        assert_eq!(cs[1].num("LENGTH"), Some(3));
        assert_eq!(cs[1].num("TYPE"), Some(0xDA));
        assert_eq!(cs[1].text("TRNDATA"), Some("D"));
    }

    #[test]
    fn test_ptoca_final_function_chained() {
        let body = bytes("2B D3 05 DB C1 C2 C3 03 DB C4");
        let e = load_err(&make_sf(SF_PTX, 0x00, &body), ParserConfig::default());
        assert!(matches!(e.kind, ErrorKind::InvalidControlSequence(_)));
        assert!(e.to_string().contains("Final function is chained"));
    }

    #[test]
    fn test_ptoca_missing_escape() {
        // The first TRN is unchained, so the second needs its own escape.
        let body = bytes("2B D3 05 DA C1 C2 C3 03 DA C4");
        let e = load_err(&make_sf(SF_PTX, 0x00, &body), ParserConfig::default());
        assert!(matches!(e.kind, ErrorKind::InvalidControlSequence(_)));
        assert!(e.to_string().contains("escape"));
    }

    #[test]
    fn test_ptoca_unknown_function() {
        let body = bytes("2B D3 03 AA 01");
        let e = load_err(&make_sf(SF_PTX, 0x00, &body), ParserConfig::default());
        assert!(matches!(e.kind, ErrorKind::UnknownFunction(_)));

        let config = ParserConfig {
            allow_unknown_functions: true,
            ..Default::default()
        };
        let sf = load_one(&make_sf(SF_PTX, 0x00, &body), config);
        let cs = sf.records("PTOCAdat").unwrap();
        assert_eq!(cs[0].bytes("DATA"), Some(&[0x01][..]));
        assert_eq!(cs[0].num("TYPE"), Some(0xAA));
    }

    #[test]
    fn test_ptoca_signed_displacement() {
        // AMB with displacement -100, then unchained NOP.
        let body = bytes("2B D3 04 D3 FF 9C 02 F8");
        let sf = load_one(&make_sf(SF_PTX, 0x00, &body), ParserConfig::default());
        let cs = sf.records("PTOCAdat").unwrap();
        assert_eq!(cs.len(), 2);
        assert_eq!(cs[0].num("DSPLCMNT"), Some(-100));
        assert_eq!(cs[1].num("TYPE"), Some(0xF8));
        assert!(!cs[1].contains("IGNDATA"));
    }

    #[test]
    fn test_mcc_fixed_length_groups() {
        // Two copy-count groups of six bytes each.
        let body = bytes("00 01 00 05 00 01 00 06 00 0A 00 02");
        let sf = load_one(&make_sf(SF_MCC, 0x00, &body), ParserConfig::default());
        let groups = sf.records("RepeatingGroup").unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].num("Startnum"), Some(1));
        assert_eq!(groups[0].num("Stopnum"), Some(5));
        assert_eq!(groups[0].num("MMCid"), Some(1));
        assert_eq!(groups[1].num("Startnum"), Some(6));
        assert_eq!(groups[1].num("Stopnum"), Some(10));
        assert_eq!(groups[1].num("MMCid"), Some(2));
    }

    #[test]
    fn test_mcc_partial_group_is_fatal() {
        let body = bytes("00 01 00 05 00 01 00 06 00");
        let e = load_err(&make_sf(SF_MCC, 0x00, &body), ParserConfig::default());
        assert!(matches!(e.kind, ErrorKind::RepeatingGroup(_)));
    }

    #[test]
    fn test_mcf1_header_counted_groups() {
        // RGLength 30 announced ahead of the group.
        let mut body = bytes("1E 00 00 00");
        for (lid, font) in [(0x01_u8, "FONT0001"), (0x02, "FONT0002")] {
            body.push(lid);
            body.push(0x00);
            body.push(0x01);
            body.push(0x00);
            body.extend_from_slice(&ebcdic::encode(font));
            body.extend_from_slice(&ebcdic::encode("T1CODEPG"));
            body.extend_from_slice(&ebcdic::encode("CHARSET1"));
            body.extend_from_slice(&[0x2D, 0x00]);
        }
        let sf = load_one(&make_sf(SF_MCF_1, 0x00, &body), ParserConfig::default());
        assert_eq!(sf.num("RGLength"), Some(30));
        let groups = sf.records("RepeatingGroup").unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].num("CFLid"), Some(1));
        assert_eq!(groups[0].text("CFName"), Some("FONT0001"));
        assert_eq!(groups[0].text("CPName"), Some("T1CODEPG"));
        assert_eq!(groups[0].text("FCSName"), Some("CHARSET1"));
        assert_eq!(groups[0].num("CharRot"), Some(0x2D00));
        assert_eq!(groups[1].num("CFLid"), Some(2));
        assert_eq!(groups[1].text("CFName"), Some("FONT0002"));
    }

    #[test]
    fn test_mcf1_short_groups_drop_optional_tail() {
        // RGLength 28 leaves no room for CharRot.
        let mut body = bytes("1C 00 00 00");
        body.push(0x01);
        body.push(0x00);
        body.push(0x01);
        body.push(0x00);
        body.extend_from_slice(&ebcdic::encode("FONT0001"));
        body.extend_from_slice(&ebcdic::encode("T1CODEPG"));
        body.extend_from_slice(&ebcdic::encode("CHARSET1"));
        let sf = load_one(&make_sf(SF_MCF_1, 0x00, &body), ParserConfig::default());
        let groups = sf.records("RepeatingGroup").unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].text("FCSName"), Some("CHARSET1"));
        assert!(!groups[0].contains("CharRot"));
        assert!(groups[0].exceptions().is_empty());
    }

    #[test]
    fn test_mcf1_zero_group_length_is_fatal() {
        let body = bytes("00 00 00 00 01 02");
        let e = load_err(&make_sf(SF_MCF_1, 0x00, &body), ParserConfig::default());
        assert!(matches!(e.kind, ErrorKind::RepeatingGroup(_)));
        assert!(e.to_string().contains("cannot be zero"));
    }

    #[test]
    fn test_mcf_self_counted_groups() {
        // Each group carries its own length, then triplets to the group
        // end: Resource Local Id + Medium Orientation.
        let one_group = bytes("00 09 04 24 02 05 03 68 01");
        let mut body = one_group.clone();
        body.extend_from_slice(&one_group);
        let sf = load_one(&make_sf(SF_MCF, 0x00, &body), ParserConfig::default());
        let groups = sf.records("RepeatingGroup").unwrap();
        assert_eq!(groups.len(), 2);
        for group in groups {
            assert_eq!(group.num("RGLength"), Some(9));
            let triplets = group.records("Triplets").unwrap();
            assert_eq!(triplets.len(), 2);
            assert_eq!(triplets[0].num("Tid"), Some(0x24));
            assert_eq!(triplets[0].num("ResLID"), Some(0x05));
            assert_eq!(triplets[1].num("Tid"), Some(0x68));
            assert_eq!(triplets[1].num("MedOrient"), Some(0x01));
        }
    }

    #[test]
    fn test_mcf_bad_group_lengths_are_fatal() {
        let e = load_err(
            &make_sf(SF_MCF, 0x00, &bytes("00 00 04 24 02 05")),
            ParserConfig::default(),
        );
        assert!(matches!(e.kind, ErrorKind::RepeatingGroup(_)));

        let e = load_err(
            &make_sf(SF_MCF, 0x00, &bytes("00 0A 04 24 02 05")),
            ParserConfig::default(),
        );
        assert!(matches!(e.kind, ErrorKind::RepeatingGroup(_)));
        assert!(e.to_string().contains("longer than available data"));
    }

    #[test]
    fn test_stream_annotates_second_field() {
        let mut input = make_sf(SF_NOP, 0x00, &[0x01]);
        let first_len = input.len();
        input.extend_from_slice(&[0x00, 0x00]);
        let mut s = stream(Cursor::new(input), ParserConfig::default());
        assert!(s.next().unwrap().is_ok());
        let e = s.next().unwrap().unwrap_err();
        assert!(matches!(e.kind, ErrorKind::InvalidStructuredField(_)));
        assert_eq!(e.field_no, Some(2));
        assert_eq!(e.field_start_offset, Some(first_len as u64));
        // The stream is exhausted after a fatal error.
        assert!(s.next().is_none());
    }

    #[test]
    fn test_load_matches_stream() {
        let mut input = make_sf(SF_NOP, 0x00, &[0x01]);
        input.extend_from_slice(&make_sf(SF_NOP, 0x00, &[0x02]));
        let loaded = load(Cursor::new(input.clone()), ParserConfig::default()).unwrap();
        let streamed: Vec<Record> = stream(Cursor::new(input), ParserConfig::default())
            .map(|sf| sf.unwrap())
            .collect();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded, streamed);
    }

    #[test]
    fn test_empty_input_is_empty_stream() {
        let fields = load(Cursor::new(Vec::new()), ParserConfig::default()).unwrap();
        assert!(fields.is_empty());
    }
}
