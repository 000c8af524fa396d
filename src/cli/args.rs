//! Command-line argument parsing for the chatsync CLI.

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// List threads
    Threads,
    /// Create a thread and make it active
    New { title: Option<String> },
    /// Switch to a thread and print it
    Open { thread_id: String },
    /// Send one message in the active thread
    Send { text: String },
    Rename { thread_id: String, title: String },
    Delete { thread_id: String },
    /// Interactive session with background flushing
    Watch,
    /// Forget the user's session id
    Logout,
    /// Arguments could not be understood
    Invalid(String),
}

/// Command plus global options.
#[derive(Debug, Clone, PartialEq)]
pub struct CliArgs {
    /// `--user <name>`
    pub user: Option<String>,
    pub command: CliCommand,
}

/// Usage text printed by `--help` and on invalid arguments.
pub const USAGE: &str = "\
usage: chatsync [--user <name>] <command>

commands:
  threads                 list threads, most recent first
  new [title]             start a new thread
  open <thread-id>        switch to a thread and show it
  send <text>             send a message in the active thread
  rename <thread-id> <title>
  delete <thread-id>
  watch                   interactive mode; each input line is sent
  logout                  forget the session id for the user

options:
  --user <name>           user to act as (default: $CHATSYNC_USER)
  -V, --version           print version";

/// Parse command-line arguments.
///
/// # Examples
///
/// ```
/// use chatsync::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["chatsync".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()).command, CliCommand::Version);
/// ```
pub fn parse_args<I>(args: I) -> CliArgs
where
    I: Iterator<Item = String>,
{
    let mut user = None;
    let mut positional = Vec::new();

    // Skip the program name
    let mut args = args.skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => {
                return CliArgs {
                    user,
                    command: CliCommand::Version,
                }
            }
            "--help" | "-h" => {
                return CliArgs {
                    user,
                    command: CliCommand::Help,
                }
            }
            "--user" | "-u" => match args.next() {
                Some(name) => user = Some(name),
                None => {
                    return CliArgs {
                        user,
                        command: CliCommand::Invalid("--user needs a name".to_string()),
                    }
                }
            },
            _ => positional.push(arg),
        }
    }

    CliArgs {
        user,
        command: command_from(positional),
    }
}

fn command_from(positional: Vec<String>) -> CliCommand {
    let mut words = positional.into_iter();
    let Some(name) = words.next() else {
        return CliCommand::Help;
    };
    let rest: Vec<String> = words.collect();

    match (name.as_str(), rest.as_slice()) {
        ("threads" | "ls", []) => CliCommand::Threads,
        ("new", []) => CliCommand::New { title: None },
        ("new", title) => CliCommand::New {
            title: Some(title.join(" ")),
        },
        ("open", [id]) => CliCommand::Open {
            thread_id: id.clone(),
        },
        ("send", text) if !text.is_empty() => CliCommand::Send {
            text: text.join(" "),
        },
        ("rename", [id, title @ ..]) if !title.is_empty() => CliCommand::Rename {
            thread_id: id.clone(),
            title: title.join(" "),
        },
        ("delete" | "rm", [id]) => CliCommand::Delete {
            thread_id: id.clone(),
        },
        ("watch", []) => CliCommand::Watch,
        ("logout", []) => CliCommand::Logout,
        ("threads" | "ls" | "open" | "send" | "rename" | "delete" | "rm" | "watch" | "logout", _) => {
            CliCommand::Invalid(format!("wrong arguments for '{}'", name))
        }
        _ => CliCommand::Invalid(format!("unknown command '{}'", name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> CliArgs {
        let mut full = vec!["chatsync".to_string()];
        full.extend(args.iter().map(|a| a.to_string()));
        parse_args(full.into_iter())
    }

    #[test]
    fn test_parse_version_flag() {
        assert_eq!(parse(&["--version"]).command, CliCommand::Version);
        assert_eq!(parse(&["-V"]).command, CliCommand::Version);
    }

    #[test]
    fn test_parse_no_args_shows_help() {
        assert_eq!(parse(&[]).command, CliCommand::Help);
    }

    #[test]
    fn test_parse_user_anywhere() {
        let args = parse(&["threads", "--user", "alice"]);
        assert_eq!(args.user.as_deref(), Some("alice"));
        assert_eq!(args.command, CliCommand::Threads);

        let args = parse(&["-u", "bob", "watch"]);
        assert_eq!(args.user.as_deref(), Some("bob"));
        assert_eq!(args.command, CliCommand::Watch);
    }

    #[test]
    fn test_parse_user_without_name() {
        assert!(matches!(parse(&["--user"]).command, CliCommand::Invalid(_)));
    }

    #[test]
    fn test_parse_new_with_and_without_title() {
        assert_eq!(parse(&["new"]).command, CliCommand::New { title: None });
        assert_eq!(
            parse(&["new", "Trip", "plans"]).command,
            CliCommand::New {
                title: Some("Trip plans".to_string())
            }
        );
    }

    #[test]
    fn test_parse_send_joins_words() {
        assert_eq!(
            parse(&["send", "hello", "there"]).command,
            CliCommand::Send {
                text: "hello there".to_string()
            }
        );
        assert!(matches!(parse(&["send"]).command, CliCommand::Invalid(_)));
    }

    #[test]
    fn test_parse_rename() {
        assert_eq!(
            parse(&["rename", "t_1", "New", "name"]).command,
            CliCommand::Rename {
                thread_id: "t_1".to_string(),
                title: "New name".to_string()
            }
        );
        assert!(matches!(parse(&["rename", "t_1"]).command, CliCommand::Invalid(_)));
    }

    #[test]
    fn test_parse_open_delete_logout() {
        assert_eq!(
            parse(&["open", "t_1"]).command,
            CliCommand::Open {
                thread_id: "t_1".to_string()
            }
        );
        assert_eq!(
            parse(&["rm", "t_2"]).command,
            CliCommand::Delete {
                thread_id: "t_2".to_string()
            }
        );
        assert_eq!(parse(&["logout"]).command, CliCommand::Logout);
    }

    #[test]
    fn test_parse_unknown_command() {
        assert_eq!(
            parse(&["frobnicate"]).command,
            CliCommand::Invalid("unknown command 'frobnicate'".to_string())
        );
    }
}
