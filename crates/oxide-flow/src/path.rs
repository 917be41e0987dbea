//! Path template compilation and matching.
//!
//! Template syntax:
//! - `/users` - literal path, matched exactly
//! - `/users/:id` - named segment, matches one or more non-`/` characters
//! - `/files/*` - wildcard, matches anything (including `/`), not bound to a name
//!
//! The compiled matcher is anchored at both ends, so templates match whole
//! paths and never prefixes.

use regex::Regex;

use crate::error::{Result, RouterError};
use crate::request::PathParams;

/// Returns true if a path fragment needs pattern matching rather than exact lookup.
#[must_use]
pub fn is_dynamic(fragment: &str) -> bool {
    fragment.contains(':') || fragment.contains('*')
}

/// A compiled path template.
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    /// The template this pattern was compiled from.
    template: String,
    /// Anchored matcher.
    regex: Regex,
    /// Named parameters, in template order.
    param_names: Vec<String>,
}

impl CompiledPattern {
    /// Compiles a path template.
    ///
    /// Literal characters are escaped, so `/files/c.png` only matches a
    /// literal dot.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::DuplicateParam`] if a parameter name is used
    /// twice, and [`RouterError::InvalidPattern`] if the generated matcher is
    /// rejected.
    ///
    /// # Example
    ///
    /// ```
    /// use oxide_flow::CompiledPattern;
    ///
    /// let pattern = CompiledPattern::compile("/posts/:id/comments/:comment_id").unwrap();
    /// let params = pattern.captures("/posts/123/comments/456").unwrap();
    /// assert_eq!(params.get("id"), Some("123"));
    /// assert_eq!(params.get("comment_id"), Some("456"));
    /// ```
    pub fn compile(template: &str) -> Result<Self> {
        let mut regex_str = String::with_capacity(template.len() + 16);
        let mut literal = String::new();
        let mut param_names = Vec::new();
        let mut chars = template.chars().peekable();

        regex_str.push('^');

        while let Some(c) = chars.next() {
            match c {
                ':' => {
                    let mut name = String::new();
                    while let Some(&next) = chars.peek() {
                        if next.is_ascii_alphanumeric() || next == '_' {
                            name.push(next);
                            chars.next();
                        } else {
                            break;
                        }
                    }

                    // A bare ':' is just a literal character
                    if name.is_empty() {
                        literal.push(':');
                        continue;
                    }

                    if param_names.contains(&name) {
                        return Err(RouterError::DuplicateParam {
                            pattern: template.to_string(),
                            name,
                        });
                    }

                    // Groups are numbered so names like `1st` stay valid
                    flush_literal(&mut regex_str, &mut literal);
                    regex_str.push_str("([^/]+)");
                    param_names.push(name);
                }
                '*' => {
                    flush_literal(&mut regex_str, &mut literal);
                    regex_str.push_str(".*");
                }
                other => literal.push(other),
            }
        }

        flush_literal(&mut regex_str, &mut literal);
        regex_str.push('$');

        let regex = Regex::new(&regex_str).map_err(|source| RouterError::InvalidPattern {
            pattern: template.to_string(),
            source,
        })?;

        Ok(Self {
            template: template.to_string(),
            regex,
            param_names,
        })
    }

    /// Returns true if the whole path matches this pattern.
    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Matches a path and extracts named parameters.
    ///
    /// Returns `None` if the path does not match. Wildcard-only patterns
    /// yield an empty parameter set.
    #[must_use]
    pub fn captures(&self, path: &str) -> Option<PathParams> {
        if !self.has_params() {
            return self.regex.is_match(path).then(PathParams::new);
        }

        let caps = self.regex.captures(path)?;
        let mut params = PathParams::new();

        for (name, value) in self.param_names.iter().zip(caps.iter().skip(1)) {
            if let Some(value) = value {
                params.insert(name.clone(), value.as_str());
            }
        }

        Some(params)
    }

    /// Returns true if the template declares at least one named parameter.
    #[must_use]
    pub fn has_params(&self) -> bool {
        !self.param_names.is_empty()
    }

    /// Returns the parameter names in template order.
    #[must_use]
    pub fn param_names(&self) -> &[String] {
        &self.param_names
    }

    /// Returns the template string as registered.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }
}

fn flush_literal(regex_str: &mut String, literal: &mut String) {
    if !literal.is_empty() {
        regex_str.push_str(&regex::escape(literal));
        literal.clear();
    }
}
