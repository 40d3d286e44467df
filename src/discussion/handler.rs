//! `dq` command handling: maps sub-commands onto queue operations and renders
//! the outcome into the command's reply.

use std::fmt;

use crate::command::{Command, CommandKind};
use crate::core::state::report_save_failure;
use crate::core::{BotState, Interceptor};
use crate::error::Result;
use crate::reply::{Reply, RichReply, TOPIC_COLOR};

use super::queue::{Queue, QueueError, Topic};

/// Sub-command given as the first `dq` argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueueCommand {
    Add,
    Remove,
    Next,
    Bump,
    Skip,
    Attach,
    Detach,
    List,
    /// Missing or unknown sub-command.
    Invalid,
}

impl QueueCommand {
    pub const ALL: [QueueCommand; 8] = [
        QueueCommand::Add,
        QueueCommand::Remove,
        QueueCommand::Next,
        QueueCommand::Bump,
        QueueCommand::Skip,
        QueueCommand::Attach,
        QueueCommand::Detach,
        QueueCommand::List,
    ];

    pub fn from_arg(arg: &str) -> Self {
        match arg {
            "add" => QueueCommand::Add,
            "remove" => QueueCommand::Remove,
            "next" => QueueCommand::Next,
            "bump" => QueueCommand::Bump,
            "skip" => QueueCommand::Skip,
            "attach" => QueueCommand::Attach,
            "detach" => QueueCommand::Detach,
            "list" => QueueCommand::List,
            _ => QueueCommand::Invalid,
        }
    }

    /// Invocation syntax for this sub-command.
    pub fn usage(&self, prefix: char) -> String {
        let rest = match self {
            QueueCommand::Add => "add [name] [description?]",
            QueueCommand::Remove => "remove [name]",
            QueueCommand::Next => "next",
            QueueCommand::Bump => "bump [name]",
            QueueCommand::Skip => "skip [name]",
            QueueCommand::Attach => "attach [name] [url]",
            QueueCommand::Detach => "detach [name] [number]",
            QueueCommand::List => "list",
            QueueCommand::Invalid => "[add|remove|next|bump|skip|attach|detach|list]",
        };
        format!("{}dq {}", prefix, rest)
    }

    /// Number of arguments required after the sub-command word.
    fn required_args(&self) -> usize {
        match self {
            QueueCommand::Add | QueueCommand::Remove | QueueCommand::Bump | QueueCommand::Skip => 1,
            QueueCommand::Attach | QueueCommand::Detach => 2,
            QueueCommand::Next | QueueCommand::List | QueueCommand::Invalid => 0,
        }
    }
}

impl fmt::Display for QueueCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueueCommand::Add => "add",
            QueueCommand::Remove => "remove",
            QueueCommand::Next => "next",
            QueueCommand::Bump => "bump",
            QueueCommand::Skip => "skip",
            QueueCommand::Attach => "attach",
            QueueCommand::Detach => "detach",
            QueueCommand::List => "list",
            QueueCommand::Invalid => "invalid",
        };
        write!(f, "{}", name)
    }
}

/// Result of applying one sub-command.
struct Applied {
    reply: Reply,
    /// The topic list changed and should be persisted.
    changed: bool,
}

impl Applied {
    fn changed(text: String) -> Self {
        Self {
            reply: Reply::Text(text),
            changed: true,
        }
    }

    fn unchanged(reply: RichReply) -> Self {
        Self {
            reply: Reply::Rich(reply),
            changed: false,
        }
    }
}

/// Interceptor for [`CommandKind::Queue`] commands.
pub struct QueueInterceptor {
    prefix: char,
}

impl QueueInterceptor {
    pub fn new(prefix: char) -> Self {
        Self { prefix }
    }

    fn apply(&self, sub: QueueCommand, args: &[String], author: &str, queue: &mut Queue) -> Applied {
        if args.len() < sub.required_args() {
            return Applied::unchanged(self.too_few_args(sub));
        }

        let outcome = match sub {
            QueueCommand::Add => {
                let description = (args.len() > 1).then(|| args[1..].join(" "));
                queue
                    .add(Topic::new(&args[0], description.as_deref(), author))
                    .map(|t| format!("Added `{}` to the discussion queue.", t.name))
            }
            QueueCommand::Remove => queue
                .remove(&args[0])
                .map(|t| format!("Removed `{}` from the discussion queue.", t.name)),
            QueueCommand::Next => {
                return match queue.next() {
                    Ok(topic) => Applied::unchanged(topic_reply(topic)),
                    Err(e) => Applied::unchanged(self.error_reply(sub, &e)),
                }
            }
            QueueCommand::Bump => queue
                .bump(&args[0])
                .map(|t| format!("Bumped `{}` to the front of the queue.", t.name)),
            QueueCommand::Skip => queue
                .skip(&args[0])
                .map(|t| format!("Moved `{}` to the back of the queue.", t.name)),
            QueueCommand::Attach => queue.attach(&args[0], &args[1]).map(|t| {
                format!(
                    "Attached source {} to `{}`.",
                    t.sources.len() - 1,
                    t.name
                )
            }),
            QueueCommand::Detach => {
                let index = match args[1].parse::<i64>() {
                    Ok(index) => index,
                    Err(_) => {
                        return Applied::unchanged(RichReply::error(
                            "Invalid Argument",
                            format!(
                                "`{}` is not a whole number.\n`{}`",
                                args[1],
                                sub.usage(self.prefix)
                            ),
                        ))
                    }
                };
                queue
                    .detach(&args[0], index)
                    .map(|url| format!("Detached {} from `{}`.", url, args[0]))
            }
            QueueCommand::List => return Applied::unchanged(list_reply(queue)),
            QueueCommand::Invalid => {
                return Applied::unchanged(RichReply::error(
                    "Unrecognized Command",
                    format!(
                        "The discussion queue did not recognize your command.\n`{}`",
                        sub.usage(self.prefix)
                    ),
                ))
            }
        };

        match outcome {
            Ok(text) => Applied::changed(text),
            Err(e) => Applied::unchanged(self.error_reply(sub, &e)),
        }
    }

    fn too_few_args(&self, sub: QueueCommand) -> RichReply {
        let need = match sub.required_args() {
            1 => "a topic name".to_string(),
            n => format!("{} arguments", n),
        };
        RichReply::error(
            "Too Few Arguments",
            format!("`{}` requires {}.\n`{}`", sub, need, sub.usage(self.prefix)),
        )
    }

    fn error_reply(&self, sub: QueueCommand, err: &QueueError) -> RichReply {
        let usage = match err {
            QueueError::EmptyQueue => format!("Add one with `{}`", QueueCommand::Add.usage(self.prefix)),
            _ => format!("`{}`", sub.usage(self.prefix)),
        };
        RichReply::error(err.title(), format!("{}\n{}", err.explanation(), usage))
    }
}

impl Interceptor for QueueInterceptor {
    fn intercept(&self, state: &mut BotState, cmd: &mut Command) -> Result<()> {
        if cmd.kind != CommandKind::Queue {
            return Ok(());
        }

        let sub = QueueCommand::from_arg(cmd.args.first().map(String::as_str).unwrap_or(""));
        let args = cmd.args.get(1..).unwrap_or_default();
        tracing::debug!(sub = %sub, args = args.len(), "Applying queue command");

        let applied = self.apply(sub, args, cmd.author_name(), &mut state.queue);
        cmd.set_reply(applied.reply);

        if applied.changed {
            if let Err(e) = state.persist_queue() {
                return report_save_failure(cmd, "queue", e);
            }
        }
        Ok(())
    }
}

/// Rich reply describing one topic.
pub fn topic_reply(topic: &Topic) -> RichReply {
    let mut lines = Vec::new();
    if let Some(description) = topic.description.as_deref().filter(|d| !d.is_empty()) {
        lines.push(description.to_string());
    }
    if !topic.sources.is_empty() {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        for (i, source) in topic.sources.iter().enumerate() {
            lines.push(format!("{}: {}", i, source));
        }
    }

    let mut reply = RichReply::new()
        .with_color(TOPIC_COLOR)
        .with_title(&topic.name)
        .with_footer(format!("Proposed by {}", topic.created_by))
        .with_timestamp(topic.created_at);
    if !lines.is_empty() {
        reply = reply.with_description(lines.join("\n"));
    }
    reply
}

/// Rich reply listing the whole queue in order.
pub fn list_reply(queue: &Queue) -> RichReply {
    let mut reply = RichReply::new()
        .with_color(TOPIC_COLOR)
        .with_title("Topics")
        .with_timestamp(queue.modified_at());

    if queue.is_empty() {
        return reply.with_description("The queue is empty.");
    }

    for topic in queue.list() {
        let mut value = topic
            .description
            .clone()
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| "No description".to_string());
        if !topic.sources.is_empty() {
            value.push_str(&format!("\n{} source(s)", topic.sources.len()));
        }
        reply = reply.with_field(&topic.name, value, false);
    }
    reply
}
