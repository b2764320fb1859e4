//! Input/output connectors driven once per agent cycle.
//!
//! # Architecture
//!
//! - [`Connector`] trait: per-phase hooks plus the output-link commands it handles
//! - [`ConnectorRegistry`]: holds connectors by name, runs input hooks, and
//!   dispatches newly added output-link commands to the connectors that claim them
//!
//! The registry never schedules anything itself. The host calls
//! [`ConnectorRegistry::input_phase`] before each input phase and
//! [`ConnectorRegistry::process_output_link`] after each output phase.

use std::collections::HashSet;
use std::fmt;

use crate::error::WmResult;
use crate::wm::{ChildValue, Handle, WorkingMemory};

/// Handles input and output for one concern of the agent.
pub trait Connector {
    /// Name used as the registry key and in logs.
    fn name(&self) -> &str;

    /// Output-link attributes this connector responds to.
    fn output_commands(&self) -> Vec<String> {
        Vec::new()
    }

    /// Write input for the coming cycle under `input_link`.
    fn on_input_phase(&mut self, _wm: &mut dyn WorkingMemory, _input_link: &Handle) -> WmResult<()> {
        Ok(())
    }

    /// Handle `(<output-link> ^command <root>)`, called once per new command.
    fn on_output_event(
        &mut self,
        _wm: &mut dyn WorkingMemory,
        _command: &str,
        _root: &Handle,
    ) -> WmResult<()> {
        Ok(())
    }

    /// The agent was reinitialized: its working memory is about to be cleared.
    fn on_init_soar(&mut self, _wm: &mut dyn WorkingMemory) -> WmResult<()> {
        Ok(())
    }
}

impl fmt::Debug for dyn Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Connector({})", self.name())
    }
}

/// Connectors keyed by name, in registration order.
#[derive(Default)]
pub struct ConnectorRegistry {
    connectors: Vec<Box<dyn Connector>>,
    /// Output commands already dispatched.
    seen: HashSet<Handle>,
}

impl fmt::Debug for ConnectorRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectorRegistry")
            .field("connectors", &self.names())
            .field("seen", &self.seen.len())
            .finish()
    }
}

impl ConnectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connector, replacing any earlier one with the same name.
    pub fn register(&mut self, connector: Box<dyn Connector>) {
        let name = connector.name().to_string();
        match self.connectors.iter().position(|c| c.name() == name) {
            Some(index) => self.connectors[index] = connector,
            None => self.connectors.push(connector),
        }
        tracing::debug!(connector = %name, "registered connector");
    }

    /// Remove and return the connector called `name`.
    pub fn unregister(&mut self, name: &str) -> Option<Box<dyn Connector>> {
        let index = self.connectors.iter().position(|c| c.name() == name)?;
        Some(self.connectors.remove(index))
    }

    pub fn get(&self, name: &str) -> Option<&dyn Connector> {
        self.connectors
            .iter()
            .find(|c| c.name() == name)
            .map(|c| c.as_ref())
    }

    pub fn len(&self) -> usize {
        self.connectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connectors.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.connectors.iter().map(|c| c.name()).collect()
    }

    /// Run every connector's input hook in registration order.
    pub fn input_phase(&mut self, wm: &mut dyn WorkingMemory, input_link: &Handle) -> WmResult<()> {
        for connector in &mut self.connectors {
            connector.on_input_phase(wm, input_link)?;
        }
        Ok(())
    }

    /// Dispatch identifier commands on `output_link` that were not seen before.
    ///
    /// A failing connector is logged and skipped so the remaining commands are
    /// still handled. Returns the number of commands dispatched.
    pub fn process_output_link(
        &mut self,
        wm: &mut dyn WorkingMemory,
        output_link: &Handle,
    ) -> WmResult<usize> {
        let commands: Vec<(String, Handle)> = wm
            .children(output_link)?
            .into_iter()
            .filter_map(|c| match c.value {
                ChildValue::Identifier(root) => Some((c.attribute, root)),
                _ => None,
            })
            .collect();

        // Forget commands the agent has removed.
        self.seen
            .retain(|h| commands.iter().any(|(_, root)| root == h));

        let mut dispatched = 0;
        for (command, root) in commands {
            if !self.seen.insert(root.clone()) {
                continue;
            }
            for connector in &mut self.connectors {
                if !connector.output_commands().iter().any(|c| *c == command) {
                    continue;
                }
                if let Err(e) = connector.on_output_event(wm, &command, &root) {
                    tracing::error!(
                        connector = connector.name(),
                        command = %command,
                        %root,
                        error = %e,
                        "output handler failed"
                    );
                }
                dispatched += 1;
            }
        }
        Ok(dispatched)
    }

    /// Notify every connector of a reinitialization and forget seen commands.
    pub fn init_soar(&mut self, wm: &mut dyn WorkingMemory) -> WmResult<()> {
        self.seen.clear();
        for connector in &mut self.connectors {
            connector.on_init_soar(wm)?;
        }
        Ok(())
    }
}
