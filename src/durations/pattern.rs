use std::{
    fs,
    path::{Component, Path, PathBuf},
};

use regex::Regex;

use crate::error::DurationsError;

/// A shell-style path pattern.
///
/// `*` matches any run of characters and `?` matches a single one, neither
/// crosses a `/`. `[...]` and `[!...]` match character sets. Wildcards do not
/// match names starting with a dot unless the pattern component starts with one
/// as well.
#[derive(Debug, Clone)]
pub(crate) struct PathPattern {
    root: PathBuf,
    components: Vec<Segment>,
}

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Wildcard { regex: Regex, dotted: bool },
}

impl Segment {
    fn parse(component: &str) -> Result<Self, regex::Error> {
        if !component.contains(['*', '?', '[']) {
            return Ok(Segment::Literal(component.to_string()));
        }

        let chars: Vec<char> = component.chars().collect();
        let mut regex = String::from("^");
        let mut idx = 0;
        while let Some(&c) = chars.get(idx) {
            idx += 1;
            match c {
                '*' => regex.push_str(".*"),
                '?' => regex.push('.'),
                '[' => match char_class(&chars[idx..]) {
                    Some((class, consumed)) => {
                        regex.push_str(&class);
                        idx += consumed;
                    }
                    None => regex.push_str(r"\["),
                },
                c => push_escaped(&mut regex, c),
            }
        }
        regex.push('$');

        Ok(Segment::Wildcard {
            regex: Regex::new(&regex)?,
            dotted: component.starts_with('.'),
        })
    }

    fn is_match(&self, name: &str) -> bool {
        match self {
            Segment::Literal(literal) => literal == name,
            Segment::Wildcard { regex, dotted } => {
                (*dotted || !name.starts_with('.')) && regex.is_match(name)
            }
        }
    }
}

impl PathPattern {
    pub fn new(pattern: &str) -> Result<Self, DurationsError> {
        let path = Path::new(pattern);
        let mut root = PathBuf::new();
        let mut components = Vec::new();
        for component in path.components() {
            match component {
                Component::Prefix(_) | Component::RootDir => root.push(component),
                Component::CurDir => {}
                Component::ParentDir => components.push(Segment::Literal("..".to_string())),
                Component::Normal(name) => {
                    let name = name.to_string_lossy();
                    let segment =
                        Segment::parse(&name).map_err(|source| DurationsError::InvalidPattern {
                            pattern: pattern.to_string(),
                            source,
                        })?;
                    components.push(segment);
                }
            }
        }

        Ok(Self { root, components })
    }

    /// All existing files matching the pattern, sorted by path.
    pub fn matches(&self) -> Vec<PathBuf> {
        let mut current = vec![self.root.clone()];
        for segment in &self.components {
            let mut next = Vec::new();
            for dir in &current {
                match segment {
                    Segment::Literal(name) => {
                        let path = dir.join(name);
                        if fs::symlink_metadata(readable(&path)).is_ok() {
                            next.push(path);
                        }
                    }
                    Segment::Wildcard { .. } => {
                        let Ok(entries) = fs::read_dir(readable(dir)) else {
                            continue;
                        };
                        for entry in entries.flatten() {
                            let name = entry.file_name();
                            let Some(name) = name.to_str() else {
                                continue;
                            };
                            if segment.is_match(name) {
                                next.push(dir.join(name));
                            }
                        }
                    }
                }
            }
            next.sort();
            current = next;
        }

        current.retain(|path| !self.components.is_empty() && path.is_file());
        current
    }
}

/// Translate the set following a `[` into a regex class.
///
/// Returns the class and the number of characters it used up, including the
/// closing `]`, or `None` if the set is never closed. A `]` right after `[` or
/// `[!` is a member.
fn char_class(chars: &[char]) -> Option<(String, usize)> {
    let negated = chars.first() == Some(&'!');
    let start = usize::from(negated);
    let close = start + 1 + chars.get(start + 1..)?.iter().position(|&c| c == ']')?;
    let members = &chars[start..close];

    let mut class = String::from(if negated { "[^" } else { "[" });
    let mut idx = 0;
    while let Some(&c) = members.get(idx) {
        push_escaped(&mut class, c);
        if let (Some('-'), Some(&end)) = (members.get(idx + 1), members.get(idx + 2)) {
            class.push('-');
            push_escaped(&mut class, end);
            idx += 3;
        } else {
            idx += 1;
        }
    }
    class.push(']');
    Some((class, close + 1))
}

fn push_escaped(regex: &mut String, c: char) {
    regex.push_str(&regex::escape(c.encode_utf8(&mut [0; 4])));
}

/// Relative patterns start from an empty path, which is the working directory.
fn readable(path: &Path) -> &Path {
    match path.as_os_str().is_empty() {
        true => Path::new("."),
        false => path,
    }
}
