/// A single keyed Morse element
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MorseElement {
    Dit, // 1 unit tone
    Dah, // 3 units tone
}

impl MorseElement {
    fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            '.' => Some(MorseElement::Dit),
            '-' => Some(MorseElement::Dah),
            _ => None,
        }
    }
}

/// Look up the code pattern for a character (case-insensitive).
/// Space is a word boundary, not a code, so it returns `None` like any
/// unsupported character.
pub fn encode(ch: char) -> Option<&'static str> {
    let code = match ch.to_ascii_uppercase() {
        'A' => ".-",
        'B' => "-...",
        'C' => "-.-.",
        'D' => "-..",
        'E' => ".",
        'F' => "..-.",
        'G' => "--.",
        'H' => "....",
        'I' => "..",
        'J' => ".---",
        'K' => "-.-",
        'L' => ".-..",
        'M' => "--",
        'N' => "-.",
        'O' => "---",
        'P' => ".--.",
        'Q' => "--.-",
        'R' => ".-.",
        'S' => "...",
        'T' => "-",
        'U' => "..-",
        'V' => "...-",
        'W' => ".--",
        'X' => "-..-",
        'Y' => "-.--",
        'Z' => "--..",
        '0' => "-----",
        '1' => ".----",
        '2' => "..---",
        '3' => "...--",
        '4' => "....-",
        '5' => ".....",
        '6' => "-....",
        '7' => "--...",
        '8' => "---..",
        '9' => "----.",
        '.' => ".-.-.-",
        ',' => "--..--",
        '?' => "..--..",
        '/' => "-..-.",
        '=' => "-...-", // BT
        '\'' => ".----.",
        '!' => "-.-.--",
        '(' => "-.--.",
        ')' => "-.--.-",
        '&' => ".-...",
        ':' => "---...",
        ';' => "-.-.-.",
        '+' => ".-.-.", // AR
        '-' => "-....-",
        '_' => "..--.-",
        '"' => ".-..-.",
        '$' => "...-..-",
        '@' => ".--.-.",
        _ => return None,
    };

    Some(code)
}

/// Whether a character has a Morse mapping
pub fn is_supported(ch: char) -> bool {
    encode(ch).is_some()
}

/// Number of code elements for a character, 0 when unsupported
pub fn morse_length(ch: char) -> usize {
    encode(ch).map(str::len).unwrap_or(0)
}

/// Weight used by the practice generator: longer codes come up more often.
pub fn difficulty_weight(ch: char) -> f64 {
    1.0 + 0.15 * morse_length(ch) as f64
}

/// Convert a character to its keyed elements
pub fn char_to_elements(ch: char) -> Option<Vec<MorseElement>> {
    encode(ch).map(|code| code.chars().filter_map(MorseElement::from_symbol).collect())
}

/// Reverse lookup of a code pattern
pub fn decode(code: &str) -> Option<char> {
    if code.is_empty() {
        return None;
    }
    SUPPORTED_CHARS
        .iter()
        .copied()
        .find(|&ch| encode(ch) == Some(code))
}

/// Render text as dots and dashes for display: characters are separated by
/// a space and words by " / ". Unsupported characters are skipped.
pub fn text_to_code(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            word.chars()
                .filter_map(encode)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" / ")
}

/// Every character with a mapping, in table order
pub const SUPPORTED_CHARS: &[char] = &[
    'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P', 'Q', 'R',
    'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', '0', '1', '2', '3', '4', '5', '6', '7', '8', '9',
    '.', ',', '?', '/', '=', '\'', '!', '(', ')', '&', ':', ';', '+', '-', '_', '"', '$', '@',
];
