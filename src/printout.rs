//! Parsing textual working-memory printouts.
//!
//! The runtime's print command (`p S1 -d 3`) renders WMEs as
//!
//! ```text
//! (S1 ^io I1 ^name |block world| ^operator O2 +)
//!   (I1 ^input-link I2)
//! ```
//!
//! [`parse_wm_printout`] turns such text into WME triples grouped by
//! identifier. [`Printout`] wraps the result as a read-only [`WmRead`], so
//! everything that reads working memory (queries, graph extraction) also works
//! on a printout.

use std::collections::HashMap;

use crate::error::{PrintoutError, WmResult};
use crate::graph::{WmGraph, extract_wm_graph};
use crate::value::WmValue;
use crate::wm::{ChildValue, ChildWme, Handle, WmRead};

/// Operator preference markers that follow a value and carry no WME.
const PREFERENCE_TOKENS: [&str; 5] = ["+", ">", "<", "!", "="];

/// One `(id ^attribute value)` triple from a printout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintoutWme {
    pub id: String,
    pub attribute: String,
    pub value: String,
}

/// Parse a printout into WMEs keyed by identifier.
///
/// Closing parentheses and preference markers are ignored. A value starting
/// with `|` runs until a token ending with `|`, joined with single spaces.
/// Tokens that are neither identifiers nor attributes are logged and skipped.
pub fn parse_wm_printout(text: &str) -> HashMap<String, Vec<PrintoutWme>> {
    let cleaned = text.replace(')', "");
    let mut tokens = cleaned.split_whitespace();
    let mut wmes: HashMap<String, Vec<PrintoutWme>> = HashMap::new();
    let mut current: Option<String> = None;

    while let Some(token) = tokens.next() {
        if PREFERENCE_TOKENS.contains(&token) {
            continue;
        }
        if let Some(id) = token.strip_prefix('(') {
            wmes.entry(id.to_string()).or_default();
            current = Some(id.to_string());
            continue;
        }
        let (Some(id), Some(attribute)) = (current.as_ref(), token.strip_prefix('^')) else {
            tracing::warn!(token, id = ?current, "unexpected token in printout");
            continue;
        };
        let Some(first) = tokens.next() else {
            tracing::warn!(attribute, "printout ends before the value of an attribute");
            break;
        };

        let mut value = first.to_string();
        if first.starts_with('|') && (first.len() == 1 || !first.ends_with('|')) {
            for word in tokens.by_ref() {
                value.push(' ');
                value.push_str(word);
                if word.ends_with('|') {
                    break;
                }
            }
        }

        wmes.entry(id.clone()).or_default().push(PrintoutWme {
            id: id.clone(),
            attribute: attribute.to_string(),
            value,
        });
    }
    wmes
}

/// A parsed printout usable as read-only working memory.
#[derive(Debug, Clone)]
pub struct Printout {
    root: String,
    wmes: HashMap<String, Vec<PrintoutWme>>,
}

impl Printout {
    /// Parse the output of a print command. The first identifier is the root.
    pub fn parse(text: &str) -> Result<Self, PrintoutError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(PrintoutError::Empty);
        }
        if trimmed.starts_with("There is no identifier") {
            return Err(PrintoutError::NoSuchIdentifier {
                message: trimmed.lines().next().unwrap_or_default().to_string(),
            });
        }
        let first = trimmed.split_whitespace().next().unwrap_or_default();
        let root = first
            .strip_prefix('(')
            .map(|r| r.trim_end_matches(')'))
            .filter(|r| !r.is_empty())
            .ok_or_else(|| PrintoutError::MissingRoot {
                token: first.to_string(),
            })?;

        Ok(Self {
            root: root.to_string(),
            wmes: parse_wm_printout(trimmed),
        })
    }

    pub fn root(&self) -> Handle {
        Handle::new(self.root.clone())
    }

    /// WMEs of one identifier, in printed order.
    pub fn wmes_of(&self, id: &str) -> &[PrintoutWme] {
        self.wmes.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Whether `id` was printed with its own WMEs.
    pub fn has_identifier(&self, id: &str) -> bool {
        self.wmes.contains_key(id)
    }

    /// Snapshot the printout from its root.
    pub fn extract(&self, max_depth: Option<usize>) -> WmResult<WmGraph> {
        extract_wm_graph(self, &self.root(), max_depth)
    }

    fn classify(&self, value: &str) -> ChildValue {
        if self.wmes.contains_key(value) {
            return ChildValue::Identifier(Handle::new(value));
        }
        match value
            .strip_prefix('|')
            .and_then(|v| v.strip_suffix('|'))
        {
            Some(quoted) => ChildValue::Scalar(WmValue::Str(quoted.to_string())),
            None => ChildValue::Scalar(WmValue::parse_typed(value)),
        }
    }
}

impl WmRead for Printout {
    fn children(&self, id: &Handle) -> WmResult<Vec<ChildWme>> {
        Ok(self
            .wmes_of(id.as_str())
            .iter()
            .map(|w| ChildWme::new(w.attribute.clone(), self.classify(&w.value)))
            .collect())
    }

    fn symbol_of(&self, id: &Handle) -> String {
        id.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphValue;
    use crate::wm::query::WmQuery;

    const PRINTOUT: &str = "(S1 ^io I1 ^name |block world| ^operator O2 + ^operator O2 >)\n\
                            (I1 ^input-link I2 ^output-link I3)\n\
                            (I2 ^count 3 ^ratio 0.5 ^word |hi|)\n";

    #[test]
    fn parses_triples() {
        let wmes = parse_wm_printout(PRINTOUT);
        let s1 = &wmes["S1"];
        assert_eq!(s1.len(), 4);
        assert_eq!(s1[1].value, "|block world|");
        assert_eq!(s1[2].attribute, "operator");
        assert_eq!(s1[2].value, "O2");
        assert_eq!(wmes["I2"][0].id, "I2");
    }

    #[test]
    fn skips_stray_tokens() {
        let wmes = parse_wm_printout("stray (A1 ^x 1 junk ^y 2)");
        assert_eq!(wmes["A1"].len(), 2);
    }

    #[test]
    fn unterminated_quote_runs_to_end() {
        let wmes = parse_wm_printout("(A1 ^text |never closed");
        assert_eq!(wmes["A1"][0].value, "|never closed");
    }

    #[test]
    fn printout_as_working_memory() {
        let p = Printout::parse(PRINTOUT).unwrap();
        let root = p.root();
        assert_eq!(root.as_str(), "S1");

        let io = p.child_id(&root, "io").unwrap().unwrap();
        let input = p.child_id(&io, "input-link").unwrap().unwrap();
        assert_eq!(p.child_int(&input, "count").unwrap(), Some(3));
        assert_eq!(p.child_float(&input, "ratio").unwrap(), Some(0.5));
        assert_eq!(p.child_str(&input, "word").unwrap().as_deref(), Some("hi"));
        assert_eq!(p.child_str(&root, "name").unwrap().as_deref(), Some("block world"));
        // I3 was not printed with its own WMEs, so it reads as a plain value.
        assert_eq!(p.child_id(&io, "output-link").unwrap(), None);
        assert_eq!(p.child_str(&io, "output-link").unwrap().as_deref(), Some("I3"));
    }

    #[test]
    fn extract_from_printout() {
        let p = Printout::parse(PRINTOUT).unwrap();
        let g = p.extract(None).unwrap();
        assert_eq!(
            g.get_path(g.root(), "io.input-link.count"),
            Some(&GraphValue::Scalar(WmValue::Int(3)))
        );
        assert_eq!(g.len(), 3);
    }

    #[test]
    fn rejects_bad_printouts() {
        assert!(matches!(Printout::parse("   "), Err(PrintoutError::Empty)));
        assert!(matches!(
            Printout::parse("There is no identifier X9."),
            Err(PrintoutError::NoSuchIdentifier { .. })
        ));
        assert!(matches!(
            Printout::parse("^x 1"),
            Err(PrintoutError::MissingRoot { .. })
        ));
    }
}
