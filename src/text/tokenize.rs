use lazy_static::lazy_static;
use regex::Regex;

const URL_PATTERN: &str = r"(?:(?:https?://|www\.)[^\s<>]+)";

const EMOTICON_PATTERN: &str = r#"(?:[<>]?[:;=8][\-o\*']?[\)\]\(\[dDpP/:\}\{@\|\\]|[\)\]\(\[dDpP/:\}\{@\|\\][\-o\*']?[:;=8][<>]?|<3)"#;

const HANDLE_PATTERN: &str = r"(?:@\w+)";

const HASHTAG_PATTERN: &str = r"(?:#+\w+(?:['\-]\w+)*)";

const EMAIL_PATTERN: &str = r"(?:[\w.+\-]+@[\w\-]+\.(?:[\w\-]\.?)+[\w\-])";

const WORD_PATTERN: &str = concat!(
    // Words with apostrophes or dashes
    r"(?:[^\W\d_](?:[^\W\d_]|['\-_])+[^\W\d_])",
    // Numbers, including fractions and decimals
    r"|(?:[+\-]?\d+[,/.:\-]\d+[+\-]?)",
    // Words without apostrophes or dashes
    r"|(?:\w+)",
    // Ellipsis dots
    r"|(?:\.(?:\s*\.){1,})",
    // Anything else that isn't whitespace
    r"|(?:\S)"
);

lazy_static! {
    static ref TOKEN_RE: Regex = Regex::new(&format!(
        "{}|{}|{}|{}|{}|{}",
        URL_PATTERN, EMOTICON_PATTERN, EMAIL_PATTERN, HANDLE_PATTERN, HASHTAG_PATTERN, WORD_PATTERN
    ))
    .unwrap();
    static ref EMOTICON_RE: Regex = Regex::new(&format!("^{}$", EMOTICON_PATTERN)).unwrap();
    static ref HANDLE_RE: Regex = Regex::new(&format!("^{}$", HANDLE_PATTERN)).unwrap();
}

pub fn is_emoticon(token: &str) -> bool {
    EMOTICON_RE.is_match(token)
}

pub fn is_handle(token: &str) -> bool {
    HANDLE_RE.is_match(token)
}

/// URLs, emoticons, handles, hashtags and e-mail addresses come out as single tokens. Tokens are
/// lower-cased unless they are emoticons.
pub fn tokenize(text: &str) -> Vec<String> {
    TOKEN_RE
        .find_iter(text)
        .map(|m| {
            let token = m.as_str();
            if is_emoticon(token) {
                token.to_string()
            } else {
                token.to_lowercase()
            }
        })
        .collect()
}
