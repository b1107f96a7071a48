//! EBCDIC-CP-BE (IBM code page 500) decoding for text parameters.

/// Code page 500, one Unicode char per byte value.
#[rustfmt::skip]
const CP500: [char; 256] = [
    '\u{00}', '\u{01}', '\u{02}', '\u{03}', '\u{9c}', '\u{09}', '\u{86}', '\u{7f}',
    '\u{97}', '\u{8d}', '\u{8e}', '\u{0b}', '\u{0c}', '\u{0d}', '\u{0e}', '\u{0f}',
    '\u{10}', '\u{11}', '\u{12}', '\u{13}', '\u{9d}', '\u{85}', '\u{08}', '\u{87}',
    '\u{18}', '\u{19}', '\u{92}', '\u{8f}', '\u{1c}', '\u{1d}', '\u{1e}', '\u{1f}',
    '\u{80}', '\u{81}', '\u{82}', '\u{83}', '\u{84}', '\u{0a}', '\u{17}', '\u{1b}',
    '\u{88}', '\u{89}', '\u{8a}', '\u{8b}', '\u{8c}', '\u{05}', '\u{06}', '\u{07}',
    '\u{90}', '\u{91}', '\u{16}', '\u{93}', '\u{94}', '\u{95}', '\u{96}', '\u{04}',
    '\u{98}', '\u{99}', '\u{9a}', '\u{9b}', '\u{14}', '\u{15}', '\u{9e}', '\u{1a}',
    ' ',      '\u{a0}', 'â',      'ä',      'à',      'á',      'ã',      'å',
    'ç',      'ñ',      '[',      '.',      '<',      '(',      '+',      '!',
    '&',      'é',      'ê',      'ë',      'è',      'í',      'î',      'ï',
    'ì',      'ß',      ']',      '$',      '*',      ')',      ';',      '^',
    '-',      '/',      'Â',      'Ä',      'À',      'Á',      'Ã',      'Å',
    'Ç',      'Ñ',      '¦',      ',',      '%',      '_',      '>',      '?',
    'ø',      'É',      'Ê',      'Ë',      'È',      'Í',      'Î',      'Ï',
    'Ì',      '`',      ':',      '#',      '@',      '\'',     '=',      '"',
    'Ø',      'a',      'b',      'c',      'd',      'e',      'f',      'g',
    'h',      'i',      '«',      '»',      'ð',      'ý',      'þ',      '±',
    '°',      'j',      'k',      'l',      'm',      'n',      'o',      'p',
    'q',      'r',      'ª',      'º',      'æ',      '¸',      'Æ',      '¤',
    'µ',      '~',      's',      't',      'u',      'v',      'w',      'x',
    'y',      'z',      '¡',      '¿',      'Ð',      'Ý',      'Þ',      '®',
    '¢',      '£',      '¥',      '·',      '©',      '§',      '¶',      '¼',
    '½',      '¾',      '¬',      '|',      '¯',      '¨',      '´',      '×',
    '{',      'A',      'B',      'C',      'D',      'E',      'F',      'G',
    'H',      'I',      '\u{ad}', 'ô',      'ö',      'ò',      'ó',      'õ',
    '}',      'J',      'K',      'L',      'M',      'N',      'O',      'P',
    'Q',      'R',      '¹',      'û',      'ü',      'ù',      'ú',      'ÿ',
    '\\',     '÷',      'S',      'T',      'U',      'V',      'W',      'X',
    'Y',      'Z',      '²',      'Ô',      'Ö',      'Ò',      'Ó',      'Õ',
    '0',      '1',      '2',      '3',      '4',      '5',      '6',      '7',
    '8',      '9',      '³',      'Û',      'Ü',      'Ù',      'Ú',      '\u{9f}',
];

/// Decode an EBCDIC-CP-BE byte range to text, dropping trailing whitespace.
/// Text parameters are fixed-width fields padded with EBCDIC spaces (0x40).
pub fn decode(bytes: &[u8]) -> String {
    let s: String = bytes.iter().map(|&b| CP500[b as usize]).collect();
    s.trim_end().to_string()
}

/// Encode a str to EBCDIC-CP-BE.  Characters outside the code page become
/// 0x6F ('?').  Used by tests to build fixtures.
#[cfg(test)]
pub fn encode(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| {
            CP500
                .iter()
                .position(|&t| t == c)
                .map(|p| p as u8)
                .unwrap_or(0x6F)
        })
        .collect()
}

#[test]
fn test_decode_letters_and_digits() {
    assert_eq!(
        decode(&[0xC4, 0xD6, 0xC3, 0xD5, 0xC1, 0xD4, 0xC5]),
        "DOCNAME"
    );
    assert_eq!(decode(&[0xF0, 0xF1, 0xF9]), "019");
    assert_eq!(decode(&[0x81, 0x99, 0xA9]), "arz");
}

#[test]
fn test_decode_trims_trailing_space_only() {
    // 0x40 is the EBCDIC space.
    assert_eq!(decode(&[0x40, 0xC1, 0x40, 0x40]), " A");
    assert_eq!(decode(&[0x40, 0x40]), "");
}

#[test]
fn test_decode_keeps_embedded_nul() {
    assert_eq!(decode(&[0xC1, 0x00, 0xC2]), "A\u{00}B");
}

#[test]
fn test_encode_round_trip() {
    let text = "PAGE0001";
    assert_eq!(decode(&encode(text)), text);
}
