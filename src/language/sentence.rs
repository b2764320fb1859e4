//! Sentences as linked lists of words in working memory.
//!
//! `"Pick up the |red block|!"` numbered 3 becomes
//!
//! ```text
//! (<language> ^sentence <s>)
//!   (<s> ^sentence-number 3 ^complete-sentence |Pick up the |red block|!| ^spelling * ^next <w1>)
//!   (<w1> ^spelling pick ^next <w2>)
//!   (<w2> ^spelling up ^next <w3>)
//!   (<w3> ^spelling the ^next <w4>)
//!   (<w4> ^spelling |red block| ^quoted true ^next <w5>)
//!   (<w5> ^spelling ! ^next nil)
//! ```

use crate::error::WmResult;
use crate::sync::WmInterface;
use crate::value::WmValue;
use crate::wm::{Handle, WorkingMemory};

const TERMINATORS: [char; 3] = ['.', '!', '?'];

/// One element of the word list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    pub spelling: String,
    /// The word is a whole quoted span.
    pub quoted: bool,
}

impl Word {
    fn plain(text: &str) -> Self {
        Self {
            spelling: text.to_lowercase(),
            quoted: false,
        }
    }
}

/// Split a sentence into lower-cased words and its final punctuation.
///
/// A trailing `.`, `!` or `?` is split off (`.` when there is none). The first
/// span between two quote characters (`"` or `|`) becomes a single word.
pub fn tokenize(text: &str) -> (Vec<Word>, char) {
    let mut body = text.trim();
    let mut punctuation = '.';
    if let Some(last) = body.chars().last().filter(|c| TERMINATORS.contains(c)) {
        punctuation = last;
        body = &body[..body.len() - last.len_utf8()];
    }

    let body = body.replace('|', "\"");
    let plain = |words: &mut Vec<Word>, span: &str| {
        words.extend(span.split_whitespace().map(Word::plain));
    };

    let mut words = Vec::new();
    match quoted_span(&body) {
        Some((open, close)) => {
            plain(&mut words, &body[..open]);
            words.push(Word {
                spelling: body[open + 1..close].to_lowercase(),
                quoted: true,
            });
            plain(&mut words, &body[close + 1..]);
        }
        None => plain(&mut words, &body),
    }
    (words, punctuation)
}

/// Byte offsets of the first pair of `"`.
fn quoted_span(text: &str) -> Option<(usize, usize)> {
    let open = text.find('"')?;
    let close = open + 1 + text[open + 1..].find('"')?;
    Some((open, close))
}

/// A numbered natural-language sentence.
#[derive(Debug, Clone)]
pub struct Sentence {
    text: String,
    number: i64,
    sentence_id: Option<Handle>,
}

impl Sentence {
    pub fn new(text: impl Into<String>, number: i64) -> Self {
        Self {
            text: text.into().trim().to_string(),
            number,
            sentence_id: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn number(&self) -> i64 {
        self.number
    }

    /// The `^sentence` identifier while attached.
    pub fn sentence_id(&self) -> Option<&Handle> {
        self.sentence_id.as_ref()
    }
}

impl WmInterface for Sentence {
    fn is_added(&self) -> bool {
        self.sentence_id.is_some()
    }

    fn add_to_wm_impl(&mut self, wm: &mut dyn WorkingMemory, parent: &Handle) -> WmResult<()> {
        let sentence_id = wm.create_id_wme(parent, "sentence")?;
        wm.create_value_wme(&sentence_id, "sentence-number", &WmValue::Int(self.number))?;
        wm.create_value_wme(
            &sentence_id,
            "complete-sentence",
            &WmValue::Str(self.text.clone()),
        )?;
        wm.create_value_wme(&sentence_id, "spelling", &WmValue::from("*"))?;

        let (words, punctuation) = tokenize(&self.text);
        let mut next = wm.create_id_wme(&sentence_id, "next")?;
        for word in words {
            if word.quoted {
                wm.create_value_wme(&next, "quoted", &WmValue::from("true"))?;
            }
            wm.create_value_wme(&next, "spelling", &WmValue::Str(word.spelling))?;
            next = wm.create_id_wme(&next, "next")?;
        }
        wm.create_value_wme(&next, "spelling", &WmValue::Str(punctuation.to_string()))?;
        wm.create_value_wme(&next, "next", &WmValue::from("nil"))?;

        tracing::debug!(number = self.number, id = %sentence_id, "added sentence");
        self.sentence_id = Some(sentence_id);
        Ok(())
    }

    fn update_wm_impl(&mut self, _wm: &mut dyn WorkingMemory) -> WmResult<()> {
        Ok(())
    }

    fn remove_from_wm_impl(&mut self, wm: &mut dyn WorkingMemory) -> WmResult<()> {
        if let Some(id) = self.sentence_id.take() {
            wm.destroy_wme(&id)?;
        }
        Ok(())
    }
}
