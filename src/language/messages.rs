//! Turning agent `send-message` commands into English.

use crate::error::WmResult;
use crate::graph::{NodeId, WmGraph, extract_wm_graph};
use crate::value::WmValue;
use crate::wm::query::WmQuery;
use crate::wm::{Handle, WorkingMemory};

/// Canned replies for message types that carry no fields.
pub const SIMPLE_MESSAGES: &[(&str, &str)] = &[
    ("ok", "Ok"),
    ("unable-to-satisfy", "I couldn't do that"),
    ("unable-to-interpret-message", "I don't understand."),
    ("missing-object", "I lost the object I was using. Can you help me find it?"),
    ("index-object-failure", "I couldn't find the referenced object"),
    ("no-proposed-action", "I couldn't do that"),
    ("missing-argument", "I need more information to do that action"),
    ("learn-location-failure", "I don't know where I am."),
    ("get-goal-info", "What is the goal?"),
    ("get-next-goal", "What is the next goal or subtask?"),
    ("no-action-context-for-goal", "I don't know what action that goal is for"),
    ("get-next-task", "I'm ready for a new task"),
    ("get-next-subaction", "What do I do next?"),
    ("confirm-pick-up", "I have picked up the object."),
    ("confirm-put-down", "I have put down the object."),
    ("stop-leading", "You can stop following me"),
    ("retrospective-learning-failure", "I was unable to learn the task policy"),
    ("report-successful-training", "Ok"),
    // Games and puzzles.
    ("your-turn", "Your turn."),
    ("i-win", "I win!"),
    ("i-lose", "I lose."),
    ("easy", "That was easy!"),
    ("describe-game", "Please setup the game."),
    ("describe-puzzle", "Please setup the puzzle."),
    ("setup-goal", "Please setup the goal state."),
    ("tell-me-go", "Ok: tell me when to go."),
    ("setup-failure", "Please setup the failure condition."),
    ("define-actions", "Can you describe the legal actions?"),
    ("describe-action", "What are the conditions of the action."),
    ("describe-goal", "Please describe or demonstrate the goal."),
    ("describe-failure", "Please describe the failure condition."),
    ("learned-goal", "I have learned the goal."),
    ("learned-action", "I have learned the action."),
    ("learned-failure", "I have learned the failure condition."),
    ("learned-heuristic", "I have learned the heuristic."),
    ("already-learned-goal", "I know that goal and can recognize it."),
    ("already-learned-action", "I know that action and can recognize it."),
    ("already-learned-failure", "I know that failure condition and can recognize it."),
    ("gotit", "I've found a solution."),
];

/// The canned reply for `message_type`, if it has one.
pub fn simple_message(message_type: &str) -> Option<&'static str> {
    SIMPLE_MESSAGES
        .iter()
        .find(|(t, _)| *t == message_type)
        .map(|(_, text)| *text)
}

/// The canned reply for `message_type`, or the type itself.
pub fn translate_message(message_type: &str) -> String {
    simple_message(message_type)
        .unwrap_or(message_type)
        .to_string()
}

/// Translate a message whose `^fields` were extracted into `graph` at `node`.
///
/// Field-carrying types are rendered from their fields; a message missing the
/// fields it needs falls back to [`translate_message`].
pub fn parse_agent_message(graph: &WmGraph, node: NodeId, message_type: &str) -> String {
    let rendered = match message_type {
        "single-word-message" => field_text(graph, node, "fields.word"),
        "say-sentence" => field_text(graph, node, "fields.sentence"),
        "cant-find-object" => graph
            .get_path(node, "fields.object")
            .and_then(|v| v.as_node())
            .map(|object| format!("I can't find {}, can you help?", describe_object(graph, object))),
        _ => None,
    };
    rendered.unwrap_or_else(|| {
        if simple_message(message_type).is_none() {
            tracing::debug!(message_type, "no translation for message");
        }
        translate_message(message_type)
    })
}

fn field_text(graph: &WmGraph, node: NodeId, path: &str) -> Option<String> {
    graph
        .get_path(node, path)
        .and_then(|v| v.as_scalar())
        .map(ToString::to_string)
}

/// Short description of an object from its `^predicates`, e.g. `large red block`.
///
/// Uses size, color, modifier1 and shape, then the name (or the object's
/// root category). Digits are stripped, so `block1` reads as `block`.
pub fn describe_object(graph: &WmGraph, object: NodeId) -> String {
    let predicates = graph.get(object, "predicates").and_then(|v| v.as_node());
    let predicate = |attribute: &str| predicates.and_then(|p| graph.get_str(p, attribute));

    let mut words: Vec<String> = ["size", "color", "modifier1", "shape"]
        .into_iter()
        .filter_map(|attribute| predicate(attribute))
        .collect();
    if let Some(name) = predicate("name").or_else(|| graph.get_str(object, "root-category")) {
        words.push(name);
    }
    words
        .join(" ")
        .chars()
        .filter(|c| !c.is_ascii_digit())
        .collect()
}

/// Handle one `(<output-link> ^send-message <command>)` command.
///
/// Reads `^type`. Without one, marks the command with `^status error` and an
/// `^error-info` and returns `None`. Otherwise translates the message, marks
/// the command `^status complete` and returns the text.
pub fn process_send_message(
    wm: &mut dyn WorkingMemory,
    command: &Handle,
) -> WmResult<Option<String>> {
    let message_type = wm.child_str(command, "type")?;
    let Some(message_type) = message_type else {
        tracing::warn!(%command, "send-message has no type");
        wm.create_value_wme(command, "status", &WmValue::from("error"))?;
        wm.create_value_wme(command, "error-info", &WmValue::from("send-message has no type"))?;
        return Ok(None);
    };

    let graph = extract_wm_graph(&*wm, command, None)?;
    let message = parse_agent_message(&graph, graph.root(), &message_type);
    wm.create_value_wme(command, "status", &WmValue::from("complete"))?;
    tracing::debug!(%command, message_type = %message_type, "translated agent message");
    Ok(Some(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wm::memory::MemoryStore;

    fn command(wm: &mut MemoryStore) -> Handle {
        let root = wm.root();
        wm.create_id_wme(&root, "send-message").unwrap()
    }

    #[test]
    fn simple_and_unknown_types() {
        assert_eq!(translate_message("i-win"), "I win!");
        assert_eq!(translate_message("get-goal-info"), "What is the goal?");
        assert_eq!(translate_message("get-next-goal"), "What is the next goal or subtask?");
        assert_eq!(translate_message("made-up"), "made-up");
    }

    #[test]
    fn single_word_and_sentence_fields() {
        let mut wm = MemoryStore::new();
        let cmd = command(&mut wm);
        let fields = wm.create_id_wme(&cmd, "fields").unwrap();
        wm.create_value_wme(&fields, "word", &WmValue::from("yes")).unwrap();
        wm.create_value_wme(&fields, "sentence", &WmValue::from("I see a cup."))
            .unwrap();

        let graph = extract_wm_graph(&wm, &cmd, None).unwrap();
        assert_eq!(parse_agent_message(&graph, graph.root(), "single-word-message"), "yes");
        assert_eq!(parse_agent_message(&graph, graph.root(), "say-sentence"), "I see a cup.");
    }

    #[test]
    fn missing_fields_fall_back_to_type() {
        let mut wm = MemoryStore::new();
        let cmd = command(&mut wm);
        let graph = extract_wm_graph(&wm, &cmd, None).unwrap();
        assert_eq!(parse_agent_message(&graph, graph.root(), "say-sentence"), "say-sentence");
    }

    #[test]
    fn cant_find_object_describes_it() {
        let mut wm = MemoryStore::new();
        let cmd = command(&mut wm);
        let fields = wm.create_id_wme(&cmd, "fields").unwrap();
        let object = wm.create_id_wme(&fields, "object").unwrap();
        wm.create_value_wme(&object, "root-category", &WmValue::from("block1"))
            .unwrap();
        let preds = wm.create_id_wme(&object, "predicates").unwrap();
        wm.create_value_wme(&preds, "size", &WmValue::from("large1")).unwrap();
        wm.create_value_wme(&preds, "color", &WmValue::from("red1")).unwrap();

        let graph = extract_wm_graph(&wm, &cmd, None).unwrap();
        assert_eq!(
            parse_agent_message(&graph, graph.root(), "cant-find-object"),
            "I can't find large red block, can you help?"
        );
    }

    #[test]
    fn process_writes_status() {
        let mut wm = MemoryStore::new();
        let cmd = command(&mut wm);
        wm.create_value_wme(&cmd, "type", &WmValue::from("ok")).unwrap();
        let message = process_send_message(&mut wm, &cmd).unwrap();
        assert_eq!(message.as_deref(), Some("Ok"));
        assert_eq!(wm.child_str(&cmd, "status").unwrap().as_deref(), Some("complete"));
    }

    #[test]
    fn process_without_type_is_an_error_status() {
        let mut wm = MemoryStore::new();
        let cmd = command(&mut wm);
        assert_eq!(process_send_message(&mut wm, &cmd).unwrap(), None);
        assert_eq!(wm.child_str(&cmd, "status").unwrap().as_deref(), Some("error"));
        assert_eq!(
            wm.child_str(&cmd, "error-info").unwrap().as_deref(),
            Some("send-message has no type")
        );
    }
}
