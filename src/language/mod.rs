//! Natural-language input and output.
//!
//! Input: sentences from the host go onto the input link as linked lists of
//! words ([`Sentence`]), one current sentence at a time ([`SentenceQueue`]).
//!
//! Output: `send-message` commands on the output link are translated into
//! English ([`messages`]) and handed to registered callbacks.

pub mod messages;
pub mod sentence;

pub use messages::{parse_agent_message, process_send_message, translate_message};
pub use sentence::{Sentence, Word, tokenize};

use crate::config::LanguageConfig;
use crate::connector::Connector;
use crate::error::WmResult;
use crate::sync::WmInterface;
use crate::wm::{Handle, WorkingMemory};

/// Output-link command handled by [`LanguageConnector`].
pub const SEND_MESSAGE: &str = "send-message";

/// The sentence currently on the input link, plus the ones it replaced.
///
/// Sentences are numbered from 1 in the order they are pushed. Nothing is
/// written until [`SentenceQueue::sync_input`] runs.
#[derive(Debug)]
pub struct SentenceQueue {
    attribute: String,
    next_number: i64,
    current: Option<Sentence>,
    superseded: Vec<Sentence>,
    language_id: Option<Handle>,
}

impl SentenceQueue {
    pub fn new(config: &LanguageConfig) -> Self {
        Self {
            attribute: config.attribute.clone(),
            next_number: 1,
            current: None,
            superseded: Vec::new(),
            language_id: None,
        }
    }

    /// Queue a sentence, replacing the current one. Returns its number.
    pub fn push(&mut self, text: impl Into<String>) -> i64 {
        if let Some(old) = self.current.take() {
            self.superseded.push(old);
        }
        let number = self.next_number;
        self.current = Some(Sentence::new(text, number));
        self.next_number += 1;
        number
    }

    pub fn current(&self) -> Option<&Sentence> {
        self.current.as_ref()
    }

    /// The `^language` identifier once created.
    pub fn language_id(&self) -> Option<&Handle> {
        self.language_id.as_ref()
    }

    /// Write pending changes under `input_link`.
    ///
    /// Creates `^language` on first use, attaches the current sentence if it
    /// is new and removes the sentences it replaced.
    pub fn sync_input(&mut self, wm: &mut dyn WorkingMemory, input_link: &Handle) -> WmResult<()> {
        let language_id = match &self.language_id {
            Some(id) => id.clone(),
            None => {
                let id = wm.create_id_wme(input_link, &self.attribute)?;
                self.language_id = Some(id.clone());
                id
            }
        };

        if let Some(sentence) = self.current.as_mut().filter(|s| !s.is_added()) {
            sentence.attach(wm, &language_id)?;
        }
        for mut old in std::mem::take(&mut self.superseded) {
            old.detach(wm)?;
        }
        Ok(())
    }

    /// Remove everything from working memory and forget the current sentence.
    ///
    /// Numbering continues where it left off.
    pub fn reset(&mut self, wm: &mut dyn WorkingMemory) -> WmResult<()> {
        if let Some(mut sentence) = self.current.take() {
            sentence.detach(wm)?;
        }
        for mut old in std::mem::take(&mut self.superseded) {
            old.detach(wm)?;
        }
        if let Some(id) = self.language_id.take() {
            wm.destroy_wme(&id)?;
        }
        Ok(())
    }
}

impl Default for SentenceQueue {
    fn default() -> Self {
        Self::new(&LanguageConfig::default())
    }
}

/// Callback receiving each translated agent message.
pub type MessageCallback = Box<dyn FnMut(&str)>;

/// Sentences in through the input link, agent messages out.
#[derive(Default)]
pub struct LanguageConnector {
    queue: SentenceQueue,
    callbacks: Vec<MessageCallback>,
}

impl std::fmt::Debug for LanguageConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanguageConnector")
            .field("queue", &self.queue)
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}

impl LanguageConnector {
    pub fn new(config: &LanguageConfig) -> Self {
        Self {
            queue: SentenceQueue::new(config),
            callbacks: Vec::new(),
        }
    }

    pub fn register_message_callback(&mut self, callback: impl FnMut(&str) + 'static) {
        self.callbacks.push(Box::new(callback));
    }

    /// Queue a sentence for the next input phase. Returns its number.
    pub fn send_message(&mut self, text: impl Into<String>) -> i64 {
        self.queue.push(text)
    }

    pub fn queue(&self) -> &SentenceQueue {
        &self.queue
    }
}

impl Connector for LanguageConnector {
    fn name(&self) -> &str {
        "language"
    }

    fn output_commands(&self) -> Vec<String> {
        vec![SEND_MESSAGE.to_string()]
    }

    fn on_input_phase(&mut self, wm: &mut dyn WorkingMemory, input_link: &Handle) -> WmResult<()> {
        self.queue.sync_input(wm, input_link)
    }

    fn on_output_event(
        &mut self,
        wm: &mut dyn WorkingMemory,
        command: &str,
        root: &Handle,
    ) -> WmResult<()> {
        if command != SEND_MESSAGE {
            return Ok(());
        }
        if let Some(message) = process_send_message(wm, root)? {
            for callback in &mut self.callbacks {
                callback(&message);
            }
        }
        Ok(())
    }

    fn on_init_soar(&mut self, wm: &mut dyn WorkingMemory) -> WmResult<()> {
        self.queue.reset(wm)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::value::WmValue;
    use crate::wm::memory::MemoryStore;
    use crate::wm::query::WmQuery;

    #[test]
    fn queue_numbers_and_replaces() {
        let mut wm = MemoryStore::with_journal();
        let input = wm.root();
        let mut queue = SentenceQueue::default();

        assert_eq!(queue.push("first one"), 1);
        queue.sync_input(&mut wm, &input).unwrap();
        let language = wm.child_id(&input, "language").unwrap().unwrap();
        assert_eq!(queue.language_id(), Some(&language));
        assert_eq!(wm.all_child_ids(&language, Some("sentence")).unwrap().len(), 1);

        // Syncing again with nothing new writes nothing.
        wm.clear_journal();
        queue.sync_input(&mut wm, &input).unwrap();
        assert!(wm.journal().is_empty());

        assert_eq!(queue.push("second one"), 2);
        queue.sync_input(&mut wm, &input).unwrap();
        let sentences = wm.all_child_ids(&language, Some("sentence")).unwrap();
        assert_eq!(sentences.len(), 1);
        assert_eq!(wm.child_int(&sentences[0], "sentence-number").unwrap(), Some(2));
    }

    #[test]
    fn reset_clears_working_memory() {
        let mut wm = MemoryStore::new();
        let input = wm.root();
        let mut queue = SentenceQueue::default();
        queue.push("hello");
        queue.sync_input(&mut wm, &input).unwrap();
        queue.push("pending");

        queue.reset(&mut wm).unwrap();
        assert!(queue.current().is_none());
        assert!(queue.language_id().is_none());
        assert_eq!(wm.wme_count(), 0);
        assert_eq!(queue.push("again"), 3);
    }

    #[test]
    fn custom_attribute() {
        let mut wm = MemoryStore::new();
        let input = wm.root();
        let mut queue = SentenceQueue::new(&LanguageConfig {
            attribute: "speech".into(),
        });
        queue.push("hi");
        queue.sync_input(&mut wm, &input).unwrap();
        assert!(wm.child_id(&input, "speech").unwrap().is_some());
    }

    #[test]
    fn connector_reports_agent_messages() {
        let mut wm = MemoryStore::new();
        let root = wm.root();
        let heard = Rc::new(RefCell::new(Vec::new()));
        let mut connector = LanguageConnector::default();
        let sink = heard.clone();
        connector.register_message_callback(move |m| sink.borrow_mut().push(m.to_string()));

        let cmd = wm.create_id_wme(&root, SEND_MESSAGE).unwrap();
        wm.create_value_wme(&cmd, "type", &WmValue::from("your-turn"))
            .unwrap();
        connector.on_output_event(&mut wm, SEND_MESSAGE, &cmd).unwrap();
        assert_eq!(*heard.borrow(), vec!["Your turn.".to_string()]);

        let empty = wm.create_id_wme(&root, SEND_MESSAGE).unwrap();
        connector.on_output_event(&mut wm, SEND_MESSAGE, &empty).unwrap();
        assert_eq!(heard.borrow().len(), 1);
    }
}
