//! `meme` command handling.

use std::fmt;

use crate::command::{Command, CommandKind};
use crate::core::state::report_save_failure;
use crate::core::{BotState, Interceptor};
use crate::error::Result;
use crate::reply::{RichReply, MEME_COLOR};

use super::{Meme, Stash};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemeCommand {
    /// No sub-command: serve a random meme.
    Random,
    Add,
    Remove,
    List,
    Invalid,
}

impl MemeCommand {
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            None => MemeCommand::Random,
            Some("add") => MemeCommand::Add,
            Some("remove") => MemeCommand::Remove,
            Some("list") => MemeCommand::List,
            Some(_) => MemeCommand::Invalid,
        }
    }

    pub fn usage(&self, prefix: char) -> String {
        let rest = match self {
            MemeCommand::Random => "",
            MemeCommand::Add => " add [text]",
            MemeCommand::Remove => " remove [number]",
            MemeCommand::List => " list",
            MemeCommand::Invalid => " [add|remove|list]",
        };
        format!("{}meme{}", prefix, rest)
    }
}

impl fmt::Display for MemeCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MemeCommand::Random => "random",
            MemeCommand::Add => "add",
            MemeCommand::Remove => "remove",
            MemeCommand::List => "list",
            MemeCommand::Invalid => "invalid",
        };
        write!(f, "{}", name)
    }
}

/// Interceptor for [`CommandKind::Meme`] commands.
pub struct MemeInterceptor {
    prefix: char,
}

impl MemeInterceptor {
    pub fn new(prefix: char) -> Self {
        Self { prefix }
    }

    fn too_few_args(&self, sub: MemeCommand, what: &str) -> RichReply {
        RichReply::error(
            "Too Few Arguments",
            format!("`{}` requires {}.\n`{}`", sub, what, sub.usage(self.prefix)),
        )
    }

    fn remove(&self, stash: &mut Stash, arg: &str) -> std::result::Result<String, RichReply> {
        let usage = MemeCommand::Remove.usage(self.prefix);
        let index: usize = arg.parse().map_err(|_| {
            RichReply::error(
                "Invalid Argument",
                format!("`{}` is not a meme number.\n`{}`", arg, usage),
            )
        })?;

        let len = stash.len();
        stash
            .remove(index)
            .map(|meme| format!("Removed meme {}: {}", index, meme.text))
            .ok_or_else(|| {
                RichReply::error(
                    "Index Out of Range",
                    format!("There is no meme {} (the stash holds {}).\n`{}`", index, len, usage),
                )
            })
    }
}

impl Interceptor for MemeInterceptor {
    fn intercept(&self, state: &mut BotState, cmd: &mut Command) -> Result<()> {
        if cmd.kind != CommandKind::Meme {
            return Ok(());
        }

        let sub = MemeCommand::from_arg(cmd.args.first().map(String::as_str));
        tracing::debug!(sub = %sub, "Applying meme command");

        match sub {
            MemeCommand::Random => {
                let reply = match state.stash.random() {
                    Some(meme) => meme_reply(meme),
                    None => RichReply::error(
                        "Empty Stash",
                        format!("There are no memes yet.\nAdd one with `{}`", MemeCommand::Add.usage(self.prefix)),
                    ),
                };
                cmd.reply_rich(reply);
            }
            MemeCommand::Add => {
                if cmd.args.len() < 2 {
                    cmd.reply_rich(self.too_few_args(sub, "the meme text"));
                    return Ok(());
                }
                let text = cmd.args[1..].join(" ");
                state.stash.add(Meme::new(&text, cmd.author_name()));
                cmd.reply_text(format!("Added meme {}.", state.stash.len() - 1));
                if let Err(e) = state.persist_stash() {
                    return report_save_failure(cmd, "meme stash", e);
                }
            }
            MemeCommand::Remove => {
                let Some(arg) = cmd.args.get(1).cloned() else {
                    cmd.reply_rich(self.too_few_args(sub, "a meme number"));
                    return Ok(());
                };
                match self.remove(&mut state.stash, &arg) {
                    Ok(text) => {
                        cmd.reply_text(text);
                        if let Err(e) = state.persist_stash() {
                            return report_save_failure(cmd, "meme stash", e);
                        }
                    }
                    Err(reply) => cmd.reply_rich(reply),
                }
            }
            MemeCommand::List => cmd.reply_rich(list_reply(&state.stash)),
            MemeCommand::Invalid => cmd.reply_rich(RichReply::error(
                "Unrecognized Command",
                format!(
                    "The meme stash did not recognize your command.\n`{}`",
                    sub.usage(self.prefix)
                ),
            )),
        }
        Ok(())
    }
}

pub fn meme_reply(meme: &Meme) -> RichReply {
    RichReply::new()
        .with_color(MEME_COLOR)
        .with_title(&meme.text)
        .with_footer(format!("Added by {}", meme.added_by))
        .with_timestamp(meme.added_at)
}

/// Numbered list of every meme, in a code block.
pub fn list_reply(stash: &Stash) -> RichReply {
    let mut lines = vec!["```".to_string()];
    lines.extend(
        stash
            .list()
            .iter()
            .enumerate()
            .map(|(i, meme)| format!("{}: {}", i, meme.text)),
    );
    lines.push("```".to_string());

    RichReply::new()
        .with_color(MEME_COLOR)
        .with_title("Memes")
        .with_timestamp(chrono::Utc::now())
        .with_description(lines.join("\n"))
}
