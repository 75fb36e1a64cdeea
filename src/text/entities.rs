use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

const HASHTAG_PATTERN: &str = r"(?:^|[^\w&/])[#＃](\w*[\p{L}_]\w*)";
const MENTION_PATTERN: &str = r"(?:^|[^\w@/!#$%&*.])[@＠](\w{1,20})";
const URL_PATTERN: &str = r#"(?:https?://|www\.)[^\s<>"]+"#;

const URL_TRAILING: &[char] = &['.', ',', ';', ':', '!', '?', ')', ']', '}', '\'', '"'];

lazy_static! {
    static ref HASHTAG_RE: Regex = Regex::new(HASHTAG_PATTERN).unwrap();
    static ref MENTION_RE: Regex = Regex::new(MENTION_PATTERN).unwrap();
    static ref URL_RE: Regex = Regex::new(URL_PATTERN).unwrap();
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Entities {
    pub hashtags: Vec<String>,
    pub mentions: Vec<String>,
    pub urls: Vec<String>,
}

/// Finds hashtags, mentions and URLs, keeping duplicates in order of appearance.
///
/// Matches are token-bounded: `#ff` is never found inside `#ffvi`, and the `@` in an e-mail
/// address is not a mention.
pub fn extract(text: &str) -> Entities {
    Entities {
        hashtags: hashtags(text),
        mentions: mentions(text),
        urls: urls(text),
    }
}

/// Hashtags as lower-cased keys with the `#` sigil.
pub fn hashtags(text: &str) -> Vec<String> {
    HASHTAG_RE
        .captures_iter(text)
        .filter_map(|groups| groups.get(1))
        .filter(|m| !continues_entity(text, m.end(), &['#', '＃']))
        .map(|m| hashtag_key(m.as_str()))
        .collect()
}

/// Mentioned screen names, lower-cased and without the `@` sigil.
pub fn mentions(text: &str) -> Vec<String> {
    MENTION_RE
        .captures_iter(text)
        .filter_map(|groups| groups.get(1))
        .filter(|m| !continues_entity(text, m.end(), &['@', '＠']))
        .map(|m| identifier_key(m.as_str()))
        .collect()
}

pub fn urls(text: &str) -> Vec<String> {
    URL_RE
        .find_iter(text)
        .filter(|m| {
            text[..m.start()]
                .chars()
                .next_back()
                .map_or(true, |c| !c.is_alphanumeric())
        })
        .map(|m| m.as_str().trim_end_matches(URL_TRAILING))
        .filter(|candidate| is_valid_url(candidate))
        .map(|candidate| candidate.to_string())
        .collect()
}

pub fn hashtag_key(tag: &str) -> String {
    let tag = tag.trim_start_matches(|c: char| c == '#' || c == '＃');
    format!("#{}", tag.to_lowercase())
}

pub fn identifier_key(name: &str) -> String {
    name.trim_start_matches(|c: char| c == '@' || c == '＠')
        .to_lowercase()
}

fn continues_entity(text: &str, end: usize, sigils: &[char]) -> bool {
    text[end..]
        .chars()
        .next()
        .map_or(false, |c| c.is_alphanumeric() || c == '_' || sigils.contains(&c))
}

fn is_valid_url(candidate: &str) -> bool {
    if candidate.starts_with("www.") {
        Url::parse(&format!("http://{}", candidate)).is_ok()
    } else {
        Url::parse(candidate).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_entities() {
        let entities = extract("RT @Alice: #Ferguson now, see https://t.co/abc. cc @bob @Alice");

        assert_eq!(entities.hashtags, vec!["#ferguson"]);
        assert_eq!(entities.mentions, vec!["alice", "bob", "alice"]);
        assert_eq!(entities.urls, vec!["https://t.co/abc"]);
    }

    #[test]
    fn hashtags_are_token_bounded() {
        assert_eq!(hashtags("#ffvi and #ff"), vec!["#ffvi", "#ff"]);
        assert_eq!(hashtags("a#b #123 #x#y"), Vec::<String>::new());
        assert_eq!(hashtags("(#Tag) #tag"), vec!["#tag", "#tag"]);
    }

    #[test]
    fn emails_are_not_mentions() {
        assert_eq!(mentions("mail me at someone@example.com"), Vec::<String>::new());
        assert_eq!(mentions("@abcdefghijklmnopqrstuvwxyz"), Vec::<String>::new());
        assert_eq!(mentions(".@carol said"), Vec::<String>::new());
        assert_eq!(mentions("(@carol) said"), vec!["carol"]);
    }

    #[test]
    fn urls_are_validated_and_trimmed() {
        assert_eq!(
            urls("see www.example.com/path, or (http://example.org/x)"),
            vec!["www.example.com/path", "http://example.org/x"]
        );
        assert_eq!(urls("nohttp://example.com"), Vec::<String>::new());
    }
}
