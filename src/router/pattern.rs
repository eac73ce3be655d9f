use crate::error::RouterError;
use std::fmt::Write;

#[derive(Clone, Debug)]
/// The pattern actually used to match a route against a path.
///
/// A pattern is compiled from a route template.  Templates consist of literal
/// segments and `:name` parameters, where a parameter matches any non-slash
/// run of characters.  A parameter may carry an inline constraint group,
/// `:name(alt1|alt2)`, restricting what it matches, and a trailing `?` marks
/// the parameter optional.  Parameter order is preserved left-to-right:
/// extraction maps positional capture groups back to names by index, so
/// compilation is deterministic.
///
/// # Examples
/// ```rust
/// # use junction::Pattern;
/// let pattern = Pattern::compile("/user/:id").unwrap();
/// assert!(pattern.is_match("/user/5"));
/// assert!(!pattern.is_match("/user/5/edit"));
/// assert_eq!(
///     pattern.extract("/user/5"),
///     vec![("id".to_owned(), "5".to_owned())]
/// );
/// ```
pub struct Pattern {
    template: String,
    regex: regex::Regex,
    params: Vec<ParamToken>,
}

#[derive(Clone, Debug)]
struct ParamToken {
    name: String,
    optional: bool,
}

lazy_static::lazy_static! {
    static ref TOKEN: regex::Regex =
        regex::Regex::new(r":([A-Za-z_][A-Za-z0-9_]*)(?:\(([^)]*)\))?(\?)?").unwrap();
}

impl Pattern {
    /// Compiles a route template into a pattern.  Fails only when an inline
    /// constraint group does not form a valid matcher.
    pub fn compile(template: &str) -> Result<Self, RouterError> {
        let mut buffer = String::with_capacity(template.len() + 2);
        let mut params = Vec::new();
        let mut start = 0;
        buffer.push('^');

        for caps in TOKEN.captures_iter(template) {
            let whole = caps.get(0).unwrap();
            buffer.push_str(&regex::escape(&template[start..whole.start()]));
            start = whole.end();

            let name = caps.get(1).unwrap().as_str();
            let optional = caps.get(3).is_some();
            match caps.get(2) {
                Some(constraint) => write!(buffer, "((?:{}))", constraint.as_str()).unwrap(),
                None => buffer.push_str("([^/]+)"),
            }
            if optional {
                buffer.push('?');
            }
            params.push(ParamToken {
                name: name.to_owned(),
                optional,
            });
        }

        buffer.push_str(&regex::escape(&template[start..]));
        buffer.push('$');

        let regex = regex::Regex::new(&buffer).map_err(|source| RouterError::InvalidTemplate {
            template: template.to_owned(),
            source,
        })?;

        Ok(Pattern {
            template: template.to_owned(),
            regex,
            params,
        })
    }

    /// The template this pattern was compiled from.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Tests the pattern against a full path.
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Extracts the named parameters from a matching path, in template order.
    /// Optional parameters that did not participate in the match are left
    /// out.  A non-matching path extracts nothing.
    pub fn extract(&self, path: &str) -> Vec<(String, String)> {
        let mut out = Vec::new();
        if let Some(caps) = self.regex.captures(path) {
            for (index, param) in self.params.iter().enumerate() {
                if let Some(value) = caps.get(index + 1) {
                    out.push((param.name.clone(), value.as_str().to_owned()));
                }
            }
        }
        out
    }

    /// Reverse compilation: substitutes the given parameters back into the
    /// template, producing a URL.  Optional parameters may be left out;
    /// a missing required parameter is an error.
    ///
    /// # Examples
    /// ```rust
    /// # use junction::Pattern;
    /// let pattern = Pattern::compile("/user/:id").unwrap();
    /// assert_eq!(pattern.to_url(&[("id", "5")]).unwrap(), "/user/5");
    /// ```
    pub fn to_url(&self, params: &[(&str, &str)]) -> Result<String, RouterError> {
        Self::expand(&self.template, params)
    }

    /// Substitutes parameters into a raw template without compiling it.  This
    /// backs the raw-template fallback of [`crate::Router::url_for`].
    pub fn expand(template: &str, params: &[(&str, &str)]) -> Result<String, RouterError> {
        let mut buffer = String::with_capacity(template.len());
        let mut start = 0;

        for caps in TOKEN.captures_iter(template) {
            let whole = caps.get(0).unwrap();
            buffer.push_str(&template[start..whole.start()]);
            start = whole.end();

            let name = caps.get(1).unwrap().as_str();
            let optional = caps.get(3).is_some();
            let value = params
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| *value);
            match value {
                Some(value) => buffer.push_str(value),
                None if optional => {}
                None => {
                    return Err(RouterError::MissingParameter {
                        template: template.to_owned(),
                        name: name.to_owned(),
                    })
                }
            }
        }

        buffer.push_str(&template[start..]);
        Ok(buffer)
    }

    /// The number of parameters in the template.
    pub fn param_count(&self) -> usize {
        self.params.len()
    }
}
