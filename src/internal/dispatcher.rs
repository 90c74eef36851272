//! Groups of command trees processed in order, one handler per group.

use std::collections::BTreeMap;

use super::handler::{CommandNode, HandleResult, MatchVerdict};
use super::message::{CallbackContext, Message};

/// Group used by [`Dispatcher::add_handler`].
pub const DEFAULT_GROUP: i32 = 0;

/// The verdict one tree gave for a message.
pub struct TreeVerdict<'a, R> {
    pub group: i32,
    pub handler: &'a CommandNode<R>,
    pub verdict: MatchVerdict,
}

/// Routes messages through handler groups.
///
/// Groups run in ascending order. Within a group, the first tree whose
/// verdict is a match handles the message and the rest of the group is
/// skipped; trees that don't match or reject fall through to the next tree.
pub struct Dispatcher<R> {
    groups: BTreeMap<i32, Vec<CommandNode<R>>>,
}

impl<R> Default for Dispatcher<R> {
    fn default() -> Self {
        Self {
            groups: BTreeMap::new(),
        }
    }
}

impl<R> Dispatcher<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tree to the default group.
    pub fn add_handler(&mut self, handler: CommandNode<R>) {
        self.add_handler_to(handler, DEFAULT_GROUP);
    }

    pub fn add_handler_to(&mut self, handler: CommandNode<R>, group: i32) {
        self.groups.entry(group).or_default().push(handler);
    }

    /// Group numbers in processing order.
    pub fn groups(&self) -> impl Iterator<Item = i32> + '_ {
        self.groups.keys().copied()
    }

    pub fn handlers(&self, group: i32) -> &[CommandNode<R>] {
        self.groups.get(&group).map(Vec::as_slice).unwrap_or_default()
    }

    /// Match `message` against the trees in processing order.
    ///
    /// Each group reports every tree it tried; a group stops at its first
    /// match, which is then the group's last entry.
    pub fn verdicts(&self, message: &Message) -> Vec<TreeVerdict<'_, R>> {
        let mut verdicts = Vec::new();
        for (&group, handlers) in &self.groups {
            for handler in handlers {
                let verdict = handler.match_message(message);
                let matched = verdict.is_match();
                verdicts.push(TreeVerdict {
                    group,
                    handler,
                    verdict,
                });
                if matched {
                    break;
                }
            }
        }
        verdicts
    }

    /// Handle `message` with at most one tree per group.
    ///
    /// Returns one result per group that handled the message. Handling errors
    /// are logged and returned; they don't stop later groups.
    pub fn process(&self, message: &Message) -> Vec<HandleResult<R>> {
        let mut results = Vec::new();
        for entry in self.verdicts(message) {
            let Some(found) = entry.verdict.as_match() else {
                continue;
            };
            let group = entry.group;
            tracing::debug!(
                group,
                path = %found.path,
                handler = %entry.handler,
                "handling message"
            );
            let result = entry.handler.handle(found, message, &mut CallbackContext::new());
            if let Err(err) = &result {
                tracing::error!(group, message_id = message.id, error = %err, "handler failed");
            }
            results.push(result);
        }
        results
    }
}
