//! YAML front matter: splitting it off a markdown document and writing it back.
//!
//! ```md
//! ---
//! title: Hello, world!
//! date: 2024-04-16
//! tags: [greet]
//! ---
//! # Hello
//! ```
//!
//! A document without an opening fence has empty front matter and its whole
//! text is the body.

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

const FENCE: &str = "---";

#[derive(Debug, Error)]
pub enum FrontMatterError {
    /// The opening fence was found but the closing one was not.
    #[error("missing closing `---` for front matter")]
    MissingEndFence,

    #[error("invalid front matter")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, FrontMatterError>;

/// Split a document into its raw YAML header and body.
///
/// Fences must sit on their own line. Returns `None` for the header when the
/// document does not start with a fence.
pub fn split(input: &str) -> Result<(Option<&str>, &str)> {
    let Some(rest) = strip_fence_line(input) else {
        return Ok((None, input));
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == FENCE {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Ok((Some(yaml), body));
        }
        offset += line.len();
    }

    Err(FrontMatterError::MissingEndFence)
}

/// Text after the opening fence line, if the document starts with one.
fn strip_fence_line(input: &str) -> Option<&str> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let rest = input.strip_prefix(FENCE)?;
    let (line, rest) = match rest.find('\n') {
        Some(i) => (&rest[..i], &rest[i + 1..]),
        None => (rest, ""),
    };
    line.trim().is_empty().then_some(rest)
}

/// Parse front matter into `T` and return it together with the body.
pub fn parse<T>(input: &str) -> Result<(T, &str)>
where
    T: DeserializeOwned + Default,
{
    let (yaml, body) = split(input)?;
    let meta = match yaml {
        Some(yaml) if !yaml.trim().is_empty() => serde_yaml::from_str(yaml)?,
        _ => T::default(),
    };
    Ok((meta, body))
}

/// Re-assemble a document from metadata and body.
pub fn serialize<T: Serialize>(meta: &T, body: &str) -> Result<String> {
    let yaml = serde_yaml::to_string(meta)?;
    let mut out = String::with_capacity(yaml.len() + body.len() + 8);
    out.push_str(FENCE);
    out.push('\n');
    out.push_str(&yaml);
    if !yaml.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(FENCE);
    out.push('\n');
    out.push_str(body);
    Ok(out)
}
